//! # Fairway
//!
//! Server-authoritative multiplayer mini-golf over WebSockets.
//!
//! This crate is the realtime gateway: it authenticates connections,
//! joins them to per-game rooms, translates inbound messages into
//! session state-machine operations, and fans resulting state snapshots
//! back out to every connection in the room. The authoritative rules
//! live in `fairway-game`; persistence goes through the `fairway-store`
//! repository trait.
//!
//! ```text
//! client ──frame──▶ gateway ──command──▶ session actor ──▶ repository
//!    ▲                                        │
//!    └───────────── broadcast snapshot ◀──────┘
//! ```

mod error;
mod handler;
mod server;

pub use error::GatewayError;
pub use server::{GatewayConfig, GatewayServer, GatewayServerBuilder};
