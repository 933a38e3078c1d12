//! Error taxonomy for session operations.
//!
//! Display strings double as the client-facing error messages, so the
//! gateway can forward them verbatim and a thin UI can show them
//! directly.

use fairway_store::StoreError;

/// Errors raised by the session state machine.
#[derive(Debug, thiserror::Error)]
pub enum GameError {
    /// The repository has no record of this game.
    #[error("Game not found")]
    GameNotFound,

    /// The acting user is not a player in this session.
    #[error("Player not found")]
    PlayerNotFound,

    /// An action that requires holding the turn, attempted out of turn.
    /// No state change happens.
    #[error("Not your turn")]
    NotYourTurn,

    /// A host-only action attempted by someone else.
    #[error("Only the host can start the game")]
    NotHost,

    /// The session is in the wrong lifecycle state for this operation
    /// (e.g. starting an already-started game). Carries the full
    /// human-readable message.
    #[error("{0}")]
    InvalidState(String),

    /// A repository write failed; the in-memory session was left
    /// unchanged. The underlying cause is logged, the client sees a
    /// generic message.
    #[error("Failed to access game storage")]
    Store(#[from] StoreError),

    /// The session actor is gone (removed or crashed); the command was
    /// not processed.
    #[error("Game session is unavailable")]
    Unavailable,
}
