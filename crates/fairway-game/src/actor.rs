//! Session actor: an isolated Tokio task that owns one game session.
//!
//! Every operation that touches a session — including the ones that
//! await the repository — runs inside that session's actor task, one
//! command at a time. A repository write and its in-memory mirror are
//! therefore a single logical step relative to every other operation on
//! the same game id: two rapid `ready` toggles, or a swing racing a
//! disconnect, can never interleave mid-operation. Unrelated sessions
//! run in unrelated tasks and never contend.
//!
//! The actor also owns its room: the outbound channel of every
//! connection joined to the session. Successful mutations return
//! `(Recipient, ServerMessage)` pairs which the actor fans out itself.

use std::collections::HashMap;
use std::sync::Arc;

use fairway_course::simulate_shot;
use fairway_protocol::{
    Customization, GameId, GameMode, GameStatus, GameView, Recipient, ServerMessage, UserId,
};
use fairway_store::Store;
use tokio::sync::{mpsc, oneshot};

use crate::{GameError, Session};

/// Channel for delivering outbound messages to one connection.
pub type PlayerSender = mpsc::UnboundedSender<ServerMessage>;

/// What a successful mutation wants broadcast.
type Outbound = Vec<(Recipient, ServerMessage)>;

/// Lobby facts the gateway needs for `game:start` authorization and
/// its auto-ready convenience retry.
#[derive(Debug, Clone, Copy)]
pub struct LobbyInfo {
    pub host: UserId,
    pub status: GameStatus,
    pub mode: GameMode,
    pub player_count: usize,
    pub unready_count: usize,
    pub host_ready: bool,
    pub can_start: bool,
}

/// Facts about a disconnect, for the gateway's cleanup timers.
#[derive(Debug, Clone, Copy)]
pub struct DisconnectInfo {
    /// The departing user is the session host.
    pub is_host: bool,
    /// Session status at the moment of disconnect.
    pub status: GameStatus,
    /// Whether anyone is still connected afterwards.
    pub any_connected: bool,
}

/// Commands sent to a session actor through its channel.
pub(crate) enum GameCommand {
    Join {
        user: UserId,
        sender: PlayerSender,
        reply: oneshot::Sender<GameView>,
    },
    SetReady {
        user: UserId,
        ready: bool,
        customization: Option<Customization>,
        reply: oneshot::Sender<Result<(), GameError>>,
    },
    SetTeam {
        user: UserId,
        team: u8,
        reply: oneshot::Sender<Result<(), GameError>>,
    },
    LobbyInfo {
        reply: oneshot::Sender<LobbyInfo>,
    },
    Start {
        reply: oneshot::Sender<Result<(), GameError>>,
    },
    Swing {
        user: UserId,
        angle: f32,
        power: f32,
        reply: oneshot::Sender<Result<(), GameError>>,
    },
    FinishedHole {
        user: UserId,
        reply: oneshot::Sender<Result<(), GameError>>,
    },
    NextHoleReady {
        user: UserId,
        reply: oneshot::Sender<Result<(), GameError>>,
    },
    Snapshot {
        reply: oneshot::Sender<GameView>,
    },
    AnyConnected {
        reply: oneshot::Sender<bool>,
    },
    Disconnected {
        user: UserId,
        reply: oneshot::Sender<DisconnectInfo>,
    },
    /// Relay-only messages: no authoritative state is touched.
    RelayAim {
        user: UserId,
        angle: f32,
    },
    RelayChat {
        user: UserId,
        username: String,
        message: String,
    },
    RelayBallPosition {
        user: UserId,
        position: [f32; 3],
    },
    /// Gateway-issued room notice (e.g. cancellation).
    Broadcast {
        message: ServerMessage,
    },
    Shutdown,
}

/// Handle to a running session actor. Cheap to clone.
#[derive(Clone)]
pub struct GameHandle {
    game_id: GameId,
    tx: mpsc::Sender<GameCommand>,
}

impl GameHandle {
    pub fn game_id(&self) -> GameId {
        self.game_id
    }

    async fn request<R>(
        &self,
        build: impl FnOnce(oneshot::Sender<R>) -> GameCommand,
    ) -> Result<R, GameError> {
        let (reply_tx, reply_rx) = oneshot::channel();
        self.tx
            .send(build(reply_tx))
            .await
            .map_err(|_| GameError::Unavailable)?;
        reply_rx.await.map_err(|_| GameError::Unavailable)
    }

    /// Registers a connection's outbound channel and marks the player
    /// connected. Returns a snapshot for the joiner.
    pub async fn join(&self, user: UserId, sender: PlayerSender) -> Result<GameView, GameError> {
        self.request(|reply| GameCommand::Join {
            user,
            sender,
            reply,
        })
        .await
    }

    /// Persists and mirrors the lobby-ready flag (and cosmetics, when
    /// supplied). Idempotent: repeating the same value changes nothing
    /// beyond the write.
    pub async fn set_ready(
        &self,
        user: UserId,
        ready: bool,
        customization: Option<Customization>,
    ) -> Result<(), GameError> {
        self.request(|reply| GameCommand::SetReady {
            user,
            ready,
            customization,
            reply,
        })
        .await?
    }

    pub async fn set_team(&self, user: UserId, team: u8) -> Result<(), GameError> {
        self.request(|reply| GameCommand::SetTeam { user, team, reply })
            .await?
    }

    pub async fn lobby_info(&self) -> Result<LobbyInfo, GameError> {
        self.request(|reply| GameCommand::LobbyInfo { reply }).await
    }

    /// Transitions `waiting` → `playing`. Host authorization happens at
    /// the gateway; the state machine still rejects out-of-state starts.
    pub async fn start(&self) -> Result<(), GameError> {
        self.request(|reply| GameCommand::Start { reply }).await?
    }

    /// Processes a shot for the turn holder.
    pub async fn swing(&self, user: UserId, angle: f32, power: f32) -> Result<(), GameError> {
        self.request(|reply| GameCommand::Swing {
            user,
            angle,
            power,
            reply,
        })
        .await?
    }

    /// Client-signalled hole finish (`ball:in_hole`).
    pub async fn finished_hole(&self, user: UserId) -> Result<(), GameError> {
        self.request(|reply| GameCommand::FinishedHole { user, reply })
            .await?
    }

    /// Records a next-hole acknowledgement; advances the hole once every
    /// connected player has acknowledged.
    pub async fn next_hole_ready(&self, user: UserId) -> Result<(), GameError> {
        self.request(|reply| GameCommand::NextHoleReady { user, reply })
            .await?
    }

    pub async fn snapshot(&self) -> Result<GameView, GameError> {
        self.request(|reply| GameCommand::Snapshot { reply }).await
    }

    pub async fn any_connected(&self) -> Result<bool, GameError> {
        self.request(|reply| GameCommand::AnyConnected { reply })
            .await
    }

    /// Marks a player disconnected and rotates the turn off them.
    pub async fn disconnected(&self, user: UserId) -> Result<DisconnectInfo, GameError> {
        self.request(|reply| GameCommand::Disconnected { user, reply })
            .await
    }

    /// Relays a live aim preview to the rest of the room.
    pub async fn relay_aim(&self, user: UserId, angle: f32) -> Result<(), GameError> {
        self.tx
            .send(GameCommand::RelayAim { user, angle })
            .await
            .map_err(|_| GameError::Unavailable)
    }

    /// Relays a chat line to the room.
    pub async fn relay_chat(
        &self,
        user: UserId,
        username: String,
        message: String,
    ) -> Result<(), GameError> {
        self.tx
            .send(GameCommand::RelayChat {
                user,
                username,
                message,
            })
            .await
            .map_err(|_| GameError::Unavailable)
    }

    /// Relays a client-reported ball position to the rest of the room.
    pub async fn relay_ball_position(
        &self,
        user: UserId,
        position: [f32; 3],
    ) -> Result<(), GameError> {
        self.tx
            .send(GameCommand::RelayBallPosition { user, position })
            .await
            .map_err(|_| GameError::Unavailable)
    }

    /// Sends a server notice to every connection in the room.
    pub async fn broadcast(&self, message: ServerMessage) -> Result<(), GameError> {
        self.tx
            .send(GameCommand::Broadcast { message })
            .await
            .map_err(|_| GameError::Unavailable)
    }

    /// Tells the actor to stop. Outstanding commands already queued are
    /// processed first.
    pub async fn shutdown(&self) -> Result<(), GameError> {
        self.tx
            .send(GameCommand::Shutdown)
            .await
            .map_err(|_| GameError::Unavailable)
    }
}

/// The actor state: the session plus its room of outbound channels.
struct GameActor<S: Store> {
    session: Session,
    store: Arc<S>,
    senders: HashMap<UserId, PlayerSender>,
    rx: mpsc::Receiver<GameCommand>,
}

impl<S: Store> GameActor<S> {
    async fn run(mut self) {
        tracing::info!(game_id = %self.session.id, "session actor started");

        while let Some(cmd) = self.rx.recv().await {
            match cmd {
                GameCommand::Join {
                    user,
                    sender,
                    reply,
                } => {
                    self.handle_join(user, sender);
                    let _ = reply.send(self.session.view());
                }
                GameCommand::SetReady {
                    user,
                    ready,
                    customization,
                    reply,
                } => {
                    let result = self.handle_set_ready(user, ready, customization).await;
                    self.finish(result, reply);
                }
                GameCommand::SetTeam { user, team, reply } => {
                    let result = self.handle_set_team(user, team).await;
                    self.finish(result, reply);
                }
                GameCommand::LobbyInfo { reply } => {
                    let _ = reply.send(self.lobby_info());
                }
                GameCommand::Start { reply } => {
                    let result = self.handle_start().await;
                    self.finish(result, reply);
                }
                GameCommand::Swing {
                    user,
                    angle,
                    power,
                    reply,
                } => {
                    let result = self.handle_swing(user, angle, power).await;
                    self.finish(result, reply);
                }
                GameCommand::FinishedHole { user, reply } => {
                    let result = self.handle_finished_hole(user).await;
                    self.finish(result, reply);
                }
                GameCommand::NextHoleReady { user, reply } => {
                    let result = self.handle_next_hole_ready(user).await;
                    self.finish(result, reply);
                }
                GameCommand::Snapshot { reply } => {
                    let _ = reply.send(self.session.view());
                }
                GameCommand::AnyConnected { reply } => {
                    let _ = reply.send(self.session.any_connected());
                }
                GameCommand::Disconnected { user, reply } => {
                    let info = self.handle_disconnected(user);
                    let _ = reply.send(info);
                }
                GameCommand::RelayAim { user, angle } => {
                    self.dispatch(vec![(
                        Recipient::AllExcept(user),
                        ServerMessage::Aim {
                            player_id: user,
                            angle,
                        },
                    )]);
                }
                GameCommand::RelayChat {
                    user,
                    username,
                    message,
                } => {
                    self.dispatch(vec![(
                        Recipient::All,
                        ServerMessage::Chat {
                            player_id: user,
                            username,
                            message,
                        },
                    )]);
                }
                GameCommand::RelayBallPosition { user, position } => {
                    self.dispatch(vec![(
                        Recipient::AllExcept(user),
                        ServerMessage::BallMoved {
                            player_id: user,
                            position,
                        },
                    )]);
                }
                GameCommand::Broadcast { message } => {
                    self.dispatch(vec![(Recipient::All, message)]);
                }
                GameCommand::Shutdown => break,
            }
        }

        tracing::info!(game_id = %self.session.id, "session actor stopped");
    }

    /// Dispatches broadcasts and completes the command's reply, in that
    /// order — by the time a caller observes the result, the messages
    /// are queued on every recipient's channel.
    fn finish(
        &self,
        result: Result<Outbound, GameError>,
        reply: oneshot::Sender<Result<(), GameError>>,
    ) {
        match result {
            Ok(messages) => {
                self.dispatch(messages);
                let _ = reply.send(Ok(()));
            }
            Err(error) => {
                tracing::debug!(
                    game_id = %self.session.id,
                    %error,
                    "session operation rejected"
                );
                let _ = reply.send(Err(error));
            }
        }
    }

    fn dispatch(&self, messages: Outbound) {
        for (recipient, message) in messages {
            match recipient {
                Recipient::All => {
                    for sender in self.senders.values() {
                        let _ = sender.send(message.clone());
                    }
                }
                Recipient::Player(user) => {
                    if let Some(sender) = self.senders.get(&user) {
                        let _ = sender.send(message);
                    }
                }
                Recipient::AllExcept(excluded) => {
                    for (user, sender) in &self.senders {
                        if *user != excluded {
                            let _ = sender.send(message.clone());
                        }
                    }
                }
            }
        }
    }

    fn lobby_info(&self) -> LobbyInfo {
        LobbyInfo {
            host: self.session.host,
            status: self.session.status,
            mode: self.session.mode,
            player_count: self.session.players.len(),
            unready_count: self.session.players.iter().filter(|p| !p.ready).count(),
            host_ready: self
                .session
                .player(self.session.host)
                .is_some_and(|p| p.ready),
            can_start: self.session.can_start(),
        }
    }

    fn handle_join(&mut self, user: UserId, sender: PlayerSender) {
        // Latest connection wins; a replaced channel simply closes.
        self.senders.insert(user, sender);
        self.session.mark_connected(user);
        tracing::info!(
            game_id = %self.session.id,
            user_id = %user,
            connections = self.senders.len(),
            "connection joined session room"
        );
    }

    async fn handle_set_ready(
        &mut self,
        user: UserId,
        ready: bool,
        customization: Option<Customization>,
    ) -> Result<Outbound, GameError> {
        if self.session.player(user).is_none() {
            return Err(GameError::PlayerNotFound);
        }

        // Repository first; the mirror only happens once the write
        // stuck, so a failure leaves the session at its pre-call state.
        self.store
            .update_player_ready(self.session.id, user, ready)
            .await?;
        if let Some(customization) = customization {
            self.store
                .update_player_customization(self.session.id, user, customization)
                .await?;
        }

        let player = self
            .session
            .player_mut(user)
            .expect("player presence checked above");
        player.ready = ready;
        if let Some(customization) = customization {
            player.customization = customization;
        }

        Ok(vec![(
            Recipient::All,
            ServerMessage::PregameUpdate {
                game: self.session.view(),
            },
        )])
    }

    async fn handle_set_team(&mut self, user: UserId, team: u8) -> Result<Outbound, GameError> {
        if self.session.player(user).is_none() {
            return Err(GameError::PlayerNotFound);
        }

        self.store
            .update_player_team(self.session.id, user, team)
            .await?;
        self.session
            .player_mut(user)
            .expect("player presence checked above")
            .team = team;

        Ok(vec![(
            Recipient::All,
            ServerMessage::PregameUpdate {
                game: self.session.view(),
            },
        )])
    }

    async fn handle_start(&mut self) -> Result<Outbound, GameError> {
        if self.session.status != GameStatus::Waiting {
            return Err(GameError::InvalidState(format!(
                "Game is already {}",
                self.session.status
            )));
        }

        self.store
            .update_game_status(self.session.id, GameStatus::Playing)
            .await?;
        self.session.start();

        tracing::info!(
            game_id = %self.session.id,
            players = self.session.players.len(),
            "session started"
        );

        Ok(vec![
            (Recipient::All, ServerMessage::Starting),
            (
                Recipient::All,
                ServerMessage::State {
                    game: self.session.view(),
                },
            ),
        ])
    }

    async fn handle_swing(
        &mut self,
        user: UserId,
        angle: f32,
        power: f32,
    ) -> Result<Outbound, GameError> {
        let index = self
            .session
            .player_index(user)
            .ok_or(GameError::PlayerNotFound)?;
        if !self.session.players[index].is_current_turn {
            return Err(GameError::NotYourTurn);
        }

        let hole_index = self.session.current_hole;
        let hole = self.session.hole();
        let player = &self.session.players[index];
        let start = player.position.unwrap_or(hole.start);
        let strokes = player.strokes + 1;

        let shot = simulate_shot(start, angle, power, hole);

        // A holing shot commits the score exactly once, even when
        // rotation hands a finished player another swing.
        let finishes = shot.in_hole && !player.finished_hole;
        if finishes {
            self.store
                .update_player_score(self.session.id, user, hole_index, strokes)
                .await?;
        }

        let player = &mut self.session.players[index];
        player.strokes = strokes;
        player.position = Some(shot.position);

        let mut out: Outbound = Vec::new();
        if finishes {
            player.finished_hole = true;
            player.score.insert(hole_index, strokes);
            out.push((
                Recipient::All,
                ServerMessage::ScoreUpdate {
                    player_id: user,
                    hole: hole_index,
                    strokes,
                },
            ));
        }
        if !shot.in_hole {
            // Only a non-holing shot hands the turn off.
            self.session.rotate_turn();
        }

        tracing::debug!(
            game_id = %self.session.id,
            user_id = %user,
            angle,
            power,
            in_hole = shot.in_hole,
            in_water = shot.in_water,
            in_sand = shot.in_sand,
            "swing resolved"
        );

        out.push((
            Recipient::All,
            ServerMessage::UpdatePlayers {
                players: self.session.players_view(),
            },
        ));
        if shot.in_hole && self.session.all_finished_hole() {
            self.session.ready_for_next_hole.clear();
            out.push((Recipient::All, ServerMessage::HoleComplete));
        }
        Ok(out)
    }

    async fn handle_finished_hole(&mut self, user: UserId) -> Result<Outbound, GameError> {
        let index = self
            .session
            .player_index(user)
            .ok_or(GameError::PlayerNotFound)?;
        if self.session.players[index].finished_hole {
            // Score entries are immutable once committed; a repeated
            // finish signal is a no-op.
            return Ok(Vec::new());
        }

        let hole_index = self.session.current_hole;
        let strokes = self.session.players[index].strokes;
        self.store
            .update_player_score(self.session.id, user, hole_index, strokes)
            .await?;

        let player = &mut self.session.players[index];
        player.finished_hole = true;
        player.score.insert(hole_index, strokes);

        let mut out: Outbound = vec![(
            Recipient::All,
            ServerMessage::ScoreUpdate {
                player_id: user,
                hole: hole_index,
                strokes,
            },
        )];
        if self.session.all_finished_hole() {
            self.session.ready_for_next_hole.clear();
            out.push((Recipient::All, ServerMessage::HoleComplete));
        }
        Ok(out)
    }

    async fn handle_next_hole_ready(&mut self, user: UserId) -> Result<Outbound, GameError> {
        self.session.ready_for_next_hole.insert(user);
        if !self.session.all_ready_for_next_hole() {
            return Ok(Vec::new());
        }

        if self.session.on_final_hole() {
            self.store
                .update_game_status(self.session.id, GameStatus::Finished)
                .await?;
            self.session.status = GameStatus::Finished;
            tracing::info!(game_id = %self.session.id, "round finished");
        } else {
            self.session.advance_hole();
            tracing::info!(
                game_id = %self.session.id,
                hole = self.session.current_hole,
                "advanced to next hole"
            );
        }

        Ok(vec![
            (Recipient::All, ServerMessage::HoleComplete),
            (
                Recipient::All,
                ServerMessage::State {
                    game: self.session.view(),
                },
            ),
        ])
    }

    fn handle_disconnected(&mut self, user: UserId) -> DisconnectInfo {
        self.senders.remove(&user);
        self.session.mark_disconnected(user);
        tracing::info!(
            game_id = %self.session.id,
            user_id = %user,
            "player disconnected"
        );
        DisconnectInfo {
            is_host: user == self.session.host,
            status: self.session.status,
            any_connected: self.session.any_connected(),
        }
    }
}

/// Spawns a session actor task and returns its handle.
///
/// `channel_size` bounds the command queue; senders wait when it fills.
pub(crate) fn spawn_game<S: Store>(
    session: Session,
    store: Arc<S>,
    channel_size: usize,
) -> GameHandle {
    let game_id = session.id;
    let (tx, rx) = mpsc::channel(channel_size);

    let actor = GameActor {
        session,
        store,
        senders: HashMap::new(),
        rx,
    };
    tokio::spawn(actor.run());

    GameHandle { game_id, tx }
}
