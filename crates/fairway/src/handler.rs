//! Per-connection handler: connect-time auth, message routing, and the
//! disconnect timers.
//!
//! Flow for each accepted socket:
//!   1. Parse `gameId`/`userId` from the connect query and validate the
//!      user against the repository — refused before joining any room.
//!   2. Get-or-create the session actor and join its room.
//!   3. Pump session broadcasts to the socket from a writer task while
//!      the read loop decodes [`ClientMessage`] frames and dispatches
//!      them to the session handle.
//!   4. On close, mark the player disconnected and arm the appropriate
//!      cleanup timer.
//!
//! State-machine errors surface as a single-recipient `error` message to
//! whoever sent the offending request; they never tear the session down.

use std::sync::Arc;

use fairway_game::{GameError, GameHandle};
use fairway_protocol::{
    ClientMessage, Codec, GameId, GameMode, GameStatus, PlayerAction, ServerMessage, UserId,
};
use fairway_store::Store;
use fairway_transport::{Connection, WebSocketConnection};
use tokio::sync::mpsc;

use crate::GatewayError;
use crate::server::ServerState;

/// Handles one connection from accept to close.
pub(crate) async fn handle_connection<S: Store>(
    conn: WebSocketConnection,
    state: Arc<ServerState<S>>,
) -> Result<(), GatewayError> {
    let conn_id = conn.id();

    // --- Connect-time authentication ---

    let Some((game_id, user_id)) = parse_query(conn.path_and_query()) else {
        return refuse(&conn, &state, "Game ID and User ID are required").await;
    };

    let user = match state.store.get_user(user_id).await {
        Ok(Some(user)) => user,
        Ok(None) => return refuse(&conn, &state, "Invalid user").await,
        Err(e) => {
            tracing::warn!(%conn_id, error = %e, "user lookup failed during connect");
            return refuse(&conn, &state, "Authentication error").await;
        }
    };

    let handle = match state.games.get_or_create(game_id).await {
        Ok(handle) => handle,
        Err(e) => return refuse(&conn, &state, &e.to_string()).await,
    };

    tracing::info!(
        %conn_id,
        %game_id,
        %user_id,
        username = %user.username,
        "player connected"
    );

    // --- Room join and outbound pump ---

    let (tx, mut rx) = mpsc::unbounded_channel();
    let snapshot = handle.join(user_id, tx).await?;

    let writer = {
        let conn = conn.clone();
        let codec = state.codec;
        tokio::spawn(async move {
            while let Some(message) = rx.recv().await {
                let bytes = match codec.encode(&message) {
                    Ok(bytes) => bytes,
                    Err(e) => {
                        tracing::warn!(error = %e, "failed to encode broadcast");
                        continue;
                    }
                };
                if conn.send(&bytes).await.is_err() {
                    break;
                }
            }
        })
    };

    // --- Inbound loop ---
    //
    // Joined players always reach the disconnect handling below, even
    // when the initial snapshot cannot be delivered.

    let mut open = send_message(&conn, &state, &ServerMessage::State { game: snapshot })
        .await
        .is_ok();

    while open {
        let frame = match conn.recv().await {
            Ok(Some(frame)) => frame,
            Ok(None) => {
                tracing::info!(%conn_id, %user_id, "connection closed");
                open = false;
                continue;
            }
            Err(e) => {
                tracing::debug!(%conn_id, %user_id, error = %e, "recv error");
                open = false;
                continue;
            }
        };

        let message: ClientMessage = match state.codec.decode(&frame) {
            Ok(message) => message,
            Err(e) => {
                // Unknown tags and malformed payloads are rejected
                // explicitly, never silently dropped.
                tracing::debug!(%conn_id, %user_id, error = %e, "malformed message");
                let _ = send_message(
                    &conn,
                    &state,
                    &ServerMessage::Error {
                        message: format!("Invalid message: {e}"),
                    },
                )
                .await;
                continue;
            }
        };

        if let Err(error) = dispatch(&handle, user_id, &user.username, message).await {
            if let GameError::Store(cause) = &error {
                tracing::error!(%game_id, %user_id, error = %cause, "repository write failed");
            }
            let _ = send_message(
                &conn,
                &state,
                &ServerMessage::Error {
                    message: error.to_string(),
                },
            )
            .await;
        }
    }

    // --- Disconnect ---

    let info = handle.disconnected(user_id).await;
    writer.abort();
    let info = match info {
        Ok(info) => info,
        // Session already gone; nothing to clean up.
        Err(_) => return Ok(()),
    };

    if info.is_host && info.status == GameStatus::Waiting {
        // Host abandoned the lobby: tell the room, then take the
        // session (and its repository record) down after a short grace
        // so clients receive the notice.
        tracing::info!(%game_id, %user_id, "host left waiting session, cancelling");
        let _ = handle
            .broadcast(ServerMessage::Cancelled {
                reason: "The host has left the game".to_string(),
            })
            .await;

        let state = Arc::clone(&state);
        tokio::spawn(async move {
            tokio::time::sleep(state.config.cancel_grace).await;
            if let Err(e) = state.store.delete_game(game_id).await {
                tracing::warn!(%game_id, error = %e, "failed to delete cancelled game");
            }
            state.games.remove(game_id).await;
        });
    } else {
        // Otherwise the session lingers; it is removed only if nobody
        // reconnected by the time the long grace elapses.
        let state = Arc::clone(&state);
        tokio::spawn(async move {
            tokio::time::sleep(state.config.cleanup_grace).await;
            let Some(handle) = state.games.get(game_id).await else {
                return;
            };
            if !handle.any_connected().await.unwrap_or(false) {
                tracing::info!(%game_id, "all players disconnected, cleaning up");
                state.games.remove(game_id).await;
            }
        });
    }

    Ok(())
}

/// Routes one decoded message to the session state machine.
async fn dispatch(
    handle: &GameHandle,
    user: UserId,
    username: &str,
    message: ClientMessage,
) -> Result<(), GameError> {
    match message {
        ClientMessage::Ready {
            ready,
            customization,
        } => handle.set_ready(user, ready, customization).await,
        ClientMessage::Team { team } => handle.set_team(user, team).await,
        ClientMessage::Start => start_session(handle, user).await,
        ClientMessage::Action { action } => match action {
            PlayerAction::Swing { angle, power } => handle.swing(user, angle, power).await,
            PlayerAction::Aim { angle } => handle.relay_aim(user, angle).await,
            PlayerAction::Ready => handle.next_hole_ready(user).await,
            PlayerAction::Chat { message } => {
                handle.relay_chat(user, username.to_string(), message).await
            }
        },
        ClientMessage::BallPosition { position } => {
            handle.relay_ball_position(user, position).await
        }
        ClientMessage::BallInHole => handle.finished_hole(user).await,
    }
}

/// `game:start` with the gateway-level authorization rules: host-only,
/// waiting-only, with descriptive errors — plus the auto-ready retry
/// when the host themselves is the only unready player.
async fn start_session(handle: &GameHandle, user: UserId) -> Result<(), GameError> {
    let info = handle.lobby_info().await?;

    if info.host != user {
        return Err(GameError::NotHost);
    }
    if info.status != GameStatus::Waiting {
        return Err(GameError::InvalidState(format!(
            "Game is already {}",
            info.status
        )));
    }

    if !info.can_start {
        if info.mode != GameMode::Solo && info.player_count < 2 {
            return Err(GameError::InvalidState(format!(
                "Need at least 2 players to start {} mode",
                info.mode
            )));
        }

        if info.unready_count > 0 {
            // Start failed solely because the host isn't ready:
            // auto-ready them and retry once.
            if info.unready_count == 1 && !info.host_ready {
                handle.set_ready(user, true, None).await?;
                let retry = handle.lobby_info().await?;
                if retry.can_start {
                    return handle.start().await;
                }
            }
            return Err(GameError::InvalidState(
                "Cannot start game - not all players are ready".to_string(),
            ));
        }

        return Err(GameError::InvalidState(
            "Cannot start game - requirements not met".to_string(),
        ));
    }

    handle.start().await
}

/// Sends an `error` message and closes the connection, refusing it
/// before any room join.
async fn refuse<S: Store>(
    conn: &WebSocketConnection,
    state: &ServerState<S>,
    reason: &str,
) -> Result<(), GatewayError> {
    tracing::info!(conn_id = %conn.id(), reason, "connection refused");
    let _ = send_message(
        conn,
        state,
        &ServerMessage::Error {
            message: reason.to_string(),
        },
    )
    .await;
    let _ = conn.close().await;
    Ok(())
}

async fn send_message<S: Store>(
    conn: &WebSocketConnection,
    state: &ServerState<S>,
    message: &ServerMessage,
) -> Result<(), GatewayError> {
    let bytes = state.codec.encode(message)?;
    conn.send(&bytes).await.map_err(GatewayError::Transport)?;
    Ok(())
}

/// Extracts `gameId` and `userId` from the connect-time query string.
fn parse_query(path_and_query: &str) -> Option<(GameId, UserId)> {
    let (_, query) = path_and_query.split_once('?')?;

    let mut game_id = None;
    let mut user_id = None;
    for pair in query.split('&') {
        let Some((key, value)) = pair.split_once('=') else {
            continue;
        };
        match key {
            "gameId" => game_id = value.parse().ok().map(GameId),
            "userId" => user_id = value.parse().ok().map(UserId),
            _ => {}
        }
    }
    Some((game_id?, user_id?))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_query_extracts_both_ids() {
        assert_eq!(
            parse_query("/ws?gameId=3&userId=12"),
            Some((GameId(3), UserId(12)))
        );
    }

    #[test]
    fn test_parse_query_order_does_not_matter() {
        assert_eq!(
            parse_query("/?userId=12&foo=bar&gameId=3"),
            Some((GameId(3), UserId(12)))
        );
    }

    #[test]
    fn test_parse_query_missing_parameter_fails() {
        assert_eq!(parse_query("/ws?gameId=3"), None);
        assert_eq!(parse_query("/ws?userId=12"), None);
        assert_eq!(parse_query("/ws"), None);
    }

    #[test]
    fn test_parse_query_non_numeric_ids_fail() {
        assert_eq!(parse_query("/ws?gameId=abc&userId=12"), None);
    }
}
