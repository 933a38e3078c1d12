//! The session registry: maps game ids to running session actors.
//!
//! Constructed once at process start and injected where needed — never a
//! module-level singleton — so tests can run isolated instances side by
//! side.

use std::collections::HashMap;
use std::sync::Arc;

use fairway_protocol::GameId;
use fairway_store::Store;
use tokio::sync::Mutex;

use crate::actor::spawn_game;
use crate::{GameError, GameHandle, Session};

/// Command channel depth for each session actor.
const DEFAULT_CHANNEL_SIZE: usize = 64;

/// Tracks every session resident in memory.
///
/// The internal lock guards only the handle map — it is held across the
/// brief lookup/insert, never across a session operation, so unrelated
/// sessions don't serialize on each other.
pub struct GameManager<S: Store> {
    store: Arc<S>,
    games: Mutex<HashMap<GameId, GameHandle>>,
}

impl<S: Store> GameManager<S> {
    pub fn new(store: Arc<S>) -> Self {
        Self {
            store,
            games: Mutex::new(HashMap::new()),
        }
    }

    /// Returns the live session for `id`, creating it from the
    /// repository on first use.
    ///
    /// Idempotent under concurrency: the repository load happens outside
    /// the registry lock, and the insert re-checks the map — the first
    /// caller wins and everyone else gets that caller's handle, so two
    /// divergent in-memory sessions can never exist for one id.
    ///
    /// # Errors
    /// [`GameError::GameNotFound`] if the repository has no such game.
    pub async fn get_or_create(&self, id: GameId) -> Result<GameHandle, GameError> {
        if let Some(handle) = self.games.lock().await.get(&id) {
            return Ok(handle.clone());
        }

        let game = self
            .store
            .get_game(id)
            .await?
            .ok_or(GameError::GameNotFound)?;
        let players = self.store.players_for_game(id).await?;
        let session = Session::from_records(game, players);

        let mut games = self.games.lock().await;
        if let Some(handle) = games.get(&id) {
            // Lost the creation race; the winner's actor is canonical.
            return Ok(handle.clone());
        }
        let handle = spawn_game(session, Arc::clone(&self.store), DEFAULT_CHANNEL_SIZE);
        games.insert(id, handle.clone());
        tracing::info!(game_id = %id, "session loaded into memory");
        Ok(handle)
    }

    /// Returns the live session handle, if the session is resident.
    pub async fn get(&self, id: GameId) -> Option<GameHandle> {
        self.games.lock().await.get(&id).cloned()
    }

    /// Removes a session from memory and stops its actor. The
    /// repository record is untouched — deleting it is a separate,
    /// explicit operation.
    pub async fn remove(&self, id: GameId) {
        let handle = self.games.lock().await.remove(&id);
        if let Some(handle) = handle {
            let _ = handle.shutdown().await;
            tracing::info!(game_id = %id, "session removed from memory");
        }
    }

    /// Number of sessions currently resident.
    pub async fn count(&self) -> usize {
        self.games.lock().await.len()
    }
}
