//! Error types for the repository layer.

use fairway_protocol::{GameId, UserId};

/// Errors that can occur during repository operations.
#[derive(Debug, thiserror::Error)]
pub enum StoreError {
    /// No user with this id is registered.
    #[error("user {0} not found")]
    UserNotFound(UserId),

    /// No game record with this id exists.
    #[error("game {0} not found")]
    GameNotFound(GameId),

    /// The user is not a player in this game.
    #[error("player {user} not found in game {game}")]
    PlayerNotFound { game: GameId, user: UserId },
}
