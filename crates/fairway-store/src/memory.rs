//! In-memory [`Store`] implementation.
//!
//! Tables are plain `HashMap`s behind async mutexes; ids come from
//! atomic counters. Good enough for development and tests — a real
//! deployment would put a database behind the same trait.

use std::collections::HashMap;
use std::sync::atomic::{AtomicU64, Ordering};

use fairway_protocol::{Customization, GameId, GameMode, GameStatus, UserId};
use tokio::sync::Mutex;

use crate::{GameRecord, PlayerRecord, Store, StoreError, UserRecord};

/// An in-memory repository.
///
/// Player rows live in a `Vec` so join order falls out of insertion
/// order — the session relies on that ordering for turn rotation.
pub struct MemStore {
    users: Mutex<HashMap<UserId, UserRecord>>,
    games: Mutex<HashMap<GameId, GameRecord>>,
    players: Mutex<Vec<PlayerRecord>>,
    next_user_id: AtomicU64,
    next_game_id: AtomicU64,
}

impl MemStore {
    /// Creates an empty store.
    pub fn new() -> Self {
        Self {
            users: Mutex::new(HashMap::new()),
            games: Mutex::new(HashMap::new()),
            players: Mutex::new(Vec::new()),
            next_user_id: AtomicU64::new(1),
            next_game_id: AtomicU64::new(1),
        }
    }
}

impl Store for MemStore {
    async fn get_user(&self, id: UserId) -> Result<Option<UserRecord>, StoreError> {
        Ok(self.users.lock().await.get(&id).cloned())
    }

    async fn create_user(&self, username: &str) -> Result<UserRecord, StoreError> {
        let id = UserId(self.next_user_id.fetch_add(1, Ordering::Relaxed));
        let record = UserRecord {
            id,
            username: username.to_string(),
        };
        self.users.lock().await.insert(id, record.clone());
        tracing::debug!(user_id = %id, username, "user created");
        Ok(record)
    }

    async fn get_game(&self, id: GameId) -> Result<Option<GameRecord>, StoreError> {
        Ok(self.games.lock().await.get(&id).cloned())
    }

    async fn create_game(
        &self,
        host: UserId,
        name: &str,
        mode: GameMode,
        course_style: u32,
    ) -> Result<GameRecord, StoreError> {
        let id = GameId(self.next_game_id.fetch_add(1, Ordering::Relaxed));
        let record = GameRecord {
            id,
            host,
            name: name.to_string(),
            mode,
            course_style,
            status: GameStatus::Waiting,
        };
        self.games.lock().await.insert(id, record.clone());
        tracing::debug!(game_id = %id, %mode, "game record created");
        Ok(record)
    }

    async fn update_game_status(
        &self,
        id: GameId,
        status: GameStatus,
    ) -> Result<(), StoreError> {
        let mut games = self.games.lock().await;
        let game = games.get_mut(&id).ok_or(StoreError::GameNotFound(id))?;
        game.status = status;
        Ok(())
    }

    async fn delete_game(&self, id: GameId) -> Result<(), StoreError> {
        self.games.lock().await.remove(&id);
        self.players.lock().await.retain(|p| p.game_id != id);
        tracing::debug!(game_id = %id, "game record deleted");
        Ok(())
    }

    async fn players_for_game(&self, game: GameId) -> Result<Vec<PlayerRecord>, StoreError> {
        Ok(self
            .players
            .lock()
            .await
            .iter()
            .filter(|p| p.game_id == game)
            .cloned()
            .collect())
    }

    async fn add_player(
        &self,
        game: GameId,
        user: UserId,
        team: u8,
    ) -> Result<PlayerRecord, StoreError> {
        if !self.games.lock().await.contains_key(&game) {
            return Err(StoreError::GameNotFound(game));
        }
        let username = self
            .users
            .lock()
            .await
            .get(&user)
            .map(|u| u.username.clone())
            .ok_or(StoreError::UserNotFound(user))?;

        let record = PlayerRecord {
            game_id: game,
            user_id: user,
            username,
            team,
            ready: false,
            customization: Customization::default(),
            score: Default::default(),
        };
        self.players.lock().await.push(record.clone());
        Ok(record)
    }

    async fn remove_player(&self, game: GameId, user: UserId) -> Result<(), StoreError> {
        let remaining = {
            let mut players = self.players.lock().await;
            players.retain(|p| !(p.game_id == game && p.user_id == user));
            players.iter().filter(|p| p.game_id == game).count()
        };
        if remaining == 0 {
            self.delete_game(game).await?;
        }
        Ok(())
    }

    async fn update_player_ready(
        &self,
        game: GameId,
        user: UserId,
        ready: bool,
    ) -> Result<(), StoreError> {
        self.with_player(game, user, |p| p.ready = ready).await
    }

    async fn update_player_team(
        &self,
        game: GameId,
        user: UserId,
        team: u8,
    ) -> Result<(), StoreError> {
        self.with_player(game, user, |p| p.team = team).await
    }

    async fn update_player_customization(
        &self,
        game: GameId,
        user: UserId,
        customization: Customization,
    ) -> Result<(), StoreError> {
        self.with_player(game, user, |p| p.customization = customization)
            .await
    }

    async fn update_player_score(
        &self,
        game: GameId,
        user: UserId,
        hole: usize,
        strokes: u32,
    ) -> Result<(), StoreError> {
        self.with_player(game, user, |p| {
            p.score.insert(hole, strokes);
        })
        .await
    }
}

impl MemStore {
    /// Applies a mutation to one player row, or fails with
    /// `PlayerNotFound`.
    async fn with_player(
        &self,
        game: GameId,
        user: UserId,
        mutate: impl FnOnce(&mut PlayerRecord),
    ) -> Result<(), StoreError> {
        let mut players = self.players.lock().await;
        let player = players
            .iter_mut()
            .find(|p| p.game_id == game && p.user_id == user)
            .ok_or(StoreError::PlayerNotFound { game, user })?;
        mutate(player);
        Ok(())
    }
}

// =========================================================================
// Tests
// =========================================================================
