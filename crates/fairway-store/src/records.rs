//! The records the repository persists.
//!
//! These are storage shapes, not wire shapes: the session state machine
//! loads them once when a session comes into memory and writes
//! individual fields back as play progresses.

use std::collections::BTreeMap;

use fairway_protocol::{Customization, GameId, GameMode, GameStatus, UserId};

/// A registered user.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UserRecord {
    pub id: UserId,
    pub username: String,
}

/// One game session record.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GameRecord {
    pub id: GameId,
    pub host: UserId,
    pub name: String,
    pub mode: GameMode,
    pub course_style: u32,
    pub status: GameStatus,
}

/// One participant in a game.
///
/// `username` is denormalized from the user record at join time so a
/// single read returns everything the session needs.
#[derive(Debug, Clone, PartialEq)]
pub struct PlayerRecord {
    pub game_id: GameId,
    pub user_id: UserId,
    pub username: String,
    pub team: u8,
    pub ready: bool,
    pub customization: Customization,
    /// Committed strokes per finished hole.
    pub score: BTreeMap<usize, u32>,
}
