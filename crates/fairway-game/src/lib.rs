//! The authoritative session state machine for Fairway.
//!
//! One [`Session`] per active game, owned by an actor task that
//! processes commands strictly one at a time — the per-session
//! serialization that keeps the turn and score invariants intact under
//! concurrent socket input. Key types:
//!
//! - [`Session`] — the in-memory state and its pure transitions
//! - [`GameHandle`] — send operations to a running session actor
//! - [`GameManager`] — lifecycle-scoped registry of live sessions
//! - [`GameError`] — the error taxonomy, with client-facing messages

mod actor;
mod error;
mod manager;
mod session;

pub use actor::{DisconnectInfo, GameHandle, LobbyInfo, PlayerSender};
pub use error::GameError;
pub use manager::GameManager;
pub use session::{PlayerState, Session};
