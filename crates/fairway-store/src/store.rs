//! The `Store` trait — the repository seam the game core depends on.
//!
//! The session state machine treats storage opaquely: any implementation
//! of this trait (in-memory map, relational store, document store) is
//! interchangeable. Every method is a single atomic write or read of one
//! record; the core never assumes multi-step transactions.
//!
//! Methods return explicit `impl Future + Send` so that generic
//! consumers can hold a store across `tokio::spawn` boundaries.

use std::future::Future;

use fairway_protocol::{Customization, GameId, GameMode, GameStatus, UserId};

use crate::{GameRecord, PlayerRecord, StoreError, UserRecord};

/// Persistence operations consumed (never implemented) by the game core.
pub trait Store: Send + Sync + 'static {
    // -- Users --

    /// Looks up a registered user. `Ok(None)` means the id is unknown.
    fn get_user(
        &self,
        id: UserId,
    ) -> impl Future<Output = Result<Option<UserRecord>, StoreError>> + Send;

    /// Registers a new user and returns the created record.
    fn create_user(
        &self,
        username: &str,
    ) -> impl Future<Output = Result<UserRecord, StoreError>> + Send;

    // -- Games --

    /// Looks up a game record. `Ok(None)` means the id is unknown.
    fn get_game(
        &self,
        id: GameId,
    ) -> impl Future<Output = Result<Option<GameRecord>, StoreError>> + Send;

    /// Creates a game record in `waiting` status.
    fn create_game(
        &self,
        host: UserId,
        name: &str,
        mode: GameMode,
        course_style: u32,
    ) -> impl Future<Output = Result<GameRecord, StoreError>> + Send;

    /// Persists a status transition.
    fn update_game_status(
        &self,
        id: GameId,
        status: GameStatus,
    ) -> impl Future<Output = Result<(), StoreError>> + Send;

    /// Deletes a game record and every player row belonging to it.
    fn delete_game(&self, id: GameId) -> impl Future<Output = Result<(), StoreError>> + Send;

    // -- Players --

    /// Returns the players of a game in join order.
    fn players_for_game(
        &self,
        game: GameId,
    ) -> impl Future<Output = Result<Vec<PlayerRecord>, StoreError>> + Send;

    /// Adds a user to a game.
    fn add_player(
        &self,
        game: GameId,
        user: UserId,
        team: u8,
    ) -> impl Future<Output = Result<PlayerRecord, StoreError>> + Send;

    /// Removes a user from a game. Removing the last player deletes the
    /// game record too.
    fn remove_player(
        &self,
        game: GameId,
        user: UserId,
    ) -> impl Future<Output = Result<(), StoreError>> + Send;

    /// Persists a player's lobby-ready flag.
    fn update_player_ready(
        &self,
        game: GameId,
        user: UserId,
        ready: bool,
    ) -> impl Future<Output = Result<(), StoreError>> + Send;

    /// Persists a player's team assignment.
    fn update_player_team(
        &self,
        game: GameId,
        user: UserId,
        team: u8,
    ) -> impl Future<Output = Result<(), StoreError>> + Send;

    /// Persists a player's cosmetic selection.
    fn update_player_customization(
        &self,
        game: GameId,
        user: UserId,
        customization: Customization,
    ) -> impl Future<Output = Result<(), StoreError>> + Send;

    /// Persists a committed score for one hole.
    fn update_player_score(
        &self,
        game: GameId,
        user: UserId,
        hole: usize,
        strokes: u32,
    ) -> impl Future<Output = Result<(), StoreError>> + Send;
}
