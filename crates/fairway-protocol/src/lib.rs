//! Wire protocol for Fairway.
//!
//! This crate defines the language the game server and its clients
//! speak:
//!
//! - **Types** ([`ClientMessage`], [`ServerMessage`], [`GameView`], ids,
//!   enums) — the structures that travel on the wire.
//! - **Codec** ([`Codec`] trait, [`JsonCodec`]) — how those messages are
//!   converted to and from bytes.
//! - **Errors** ([`ProtocolError`]).
//!
//! The protocol layer sits between the transport (raw frames) and the
//! session state machine (authoritative state). It knows nothing about
//! connections, rooms, or physics.

mod codec;
mod error;
mod types;

pub use codec::Codec;
#[cfg(feature = "json")]
pub use codec::JsonCodec;
pub use error::ProtocolError;
pub use types::{
    ClientMessage, Customization, GameId, GameMode, GameStatus, GameView, PlayerAction,
    PlayerView, Recipient, ServerMessage, UserId,
};
