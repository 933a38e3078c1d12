//! Core protocol types for Fairway's wire format.
//!
//! Everything in this module travels on the wire between the game server
//! and its clients. The JSON shapes are fixed: event names use the
//! `scope:event` convention (`"player:ready"`, `"game:state"`) and field
//! names are camelCase, so a thin browser client can consume broadcasts
//! without any translation layer.

use std::collections::BTreeMap;
use std::fmt;

use serde::{Deserialize, Serialize};

// ---------------------------------------------------------------------------
// Identity types
// ---------------------------------------------------------------------------

/// A unique identifier for a registered user.
///
/// Newtype over `u64` so a `UserId` can never be confused with a
/// [`GameId`] in a signature. `#[serde(transparent)]` keeps the JSON
/// representation a plain number.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct UserId(pub u64);

impl fmt::Display for UserId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "U-{}", self.0)
    }
}

/// A unique identifier for a game session.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct GameId(pub u64);

impl fmt::Display for GameId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "G-{}", self.0)
    }
}

// ---------------------------------------------------------------------------
// Game mode and status
// ---------------------------------------------------------------------------

/// How many people play, and how they are grouped.
///
/// The wire strings (`"2player"`, `"2v2"`, ...) are the values stored in
/// the game record, so the serde renames must never change.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum GameMode {
    #[serde(rename = "solo")]
    Solo,
    #[serde(rename = "2player")]
    TwoPlayer,
    #[serde(rename = "3player")]
    ThreePlayer,
    #[serde(rename = "4player")]
    FourPlayer,
    #[serde(rename = "2v2")]
    TwoVsTwo,
}

impl GameMode {
    /// Minimum number of ready players required before the session may
    /// start. Solo needs only the host.
    pub fn min_players(&self) -> usize {
        match self {
            GameMode::Solo => 1,
            GameMode::TwoPlayer | GameMode::TwoVsTwo => 2,
            GameMode::ThreePlayer => 3,
            GameMode::FourPlayer => 4,
        }
    }
}

impl fmt::Display for GameMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            GameMode::Solo => "solo",
            GameMode::TwoPlayer => "2player",
            GameMode::ThreePlayer => "3player",
            GameMode::FourPlayer => "4player",
            GameMode::TwoVsTwo => "2v2",
        };
        write!(f, "{name}")
    }
}

/// Lifecycle state of a game session.
///
/// Transitions only move forward:
///
/// ```text
/// waiting --start--> playing --(hole index reaches 9)--> finished
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum GameStatus {
    Waiting,
    Playing,
    Finished,
}

impl GameStatus {
    /// Returns `true` if moving from `self` to `target` follows the
    /// forward-only ordering.
    pub fn can_transition_to(self, target: GameStatus) -> bool {
        matches!(
            (self, target),
            (GameStatus::Waiting, GameStatus::Playing)
                | (GameStatus::Playing, GameStatus::Finished)
        )
    }
}

impl fmt::Display for GameStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            GameStatus::Waiting => "waiting",
            GameStatus::Playing => "playing",
            GameStatus::Finished => "finished",
        };
        write!(f, "{name}")
    }
}

// ---------------------------------------------------------------------------
// Cosmetics
// ---------------------------------------------------------------------------

/// Ball and club selection. Purely cosmetic: `club_type` is never
/// consumed by the physics simulation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Customization {
    pub ball_type: u32,
    pub club_type: u32,
}

// ---------------------------------------------------------------------------
// Inbound messages (client → server)
// ---------------------------------------------------------------------------

/// An in-game action carried by a `player:action` message.
///
/// Modeled as a tagged union with exhaustive matching; a payload with an
/// unknown `type` tag fails to decode and is reported back to the sender
/// rather than silently dropped.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "lowercase")]
pub enum PlayerAction {
    /// Take a shot. `angle` is in degrees (0° = +x, counter-clockwise),
    /// `power` in 0..=100.
    Swing { angle: f32, power: f32 },
    /// Live aim preview while charging a shot. Advisory only — relayed
    /// to the rest of the room, never touches authoritative state.
    Aim { angle: f32 },
    /// Acknowledge hole completion, i.e. ready for the next hole.
    Ready,
    /// Chat line for the room.
    Chat { message: String },
}

/// Messages a client can send to the server.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type")]
pub enum ClientMessage {
    /// Toggle lobby readiness, optionally updating cosmetics.
    #[serde(rename = "player:ready")]
    Ready {
        ready: bool,
        #[serde(default, skip_serializing_if = "Option::is_none")]
        customization: Option<Customization>,
    },

    /// Switch team (meaningful in 2v2 only).
    #[serde(rename = "player:team")]
    Team { team: u8 },

    /// Start the session. Host-only; rejected outside `waiting`.
    #[serde(rename = "game:start")]
    Start,

    /// An in-game action (swing / aim / ready / chat).
    #[serde(rename = "player:action")]
    Action { action: PlayerAction },

    /// Client-reported ball position, relayed to the rest of the room.
    /// Not authoritative — the server's own physics result wins.
    #[serde(rename = "ball:position")]
    BallPosition { position: [f32; 3] },

    /// Alternate hole-finish signal from the client's local simulation.
    #[serde(rename = "ball:in_hole")]
    BallInHole,
}

// ---------------------------------------------------------------------------
// Outbound messages (server → client)
// ---------------------------------------------------------------------------

/// Messages the server sends to clients.
///
/// Every broadcast that reports a state change carries a fully
/// materialized snapshot ([`GameView`] or the player list), so clients
/// reconstruct a consistent picture even if two broadcasts reorder in
/// transit.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type")]
pub enum ServerMessage {
    /// Lobby snapshot after a ready/team/cosmetic change.
    #[serde(rename = "pregame:update")]
    PregameUpdate { game: GameView },

    /// The host started the session; full state follows.
    #[serde(rename = "game:starting")]
    Starting,

    /// Full session snapshot.
    #[serde(rename = "game:state")]
    State { game: GameView },

    /// Player list snapshot after a swing resolved.
    #[serde(rename = "game:update_players")]
    UpdatePlayers { players: Vec<PlayerView> },

    /// Relayed client-side ball position.
    #[serde(rename = "game:ball_moved")]
    #[serde(rename_all = "camelCase")]
    BallMoved { player_id: UserId, position: [f32; 3] },

    /// A player committed a score for a hole.
    #[serde(rename = "game:score_update")]
    #[serde(rename_all = "camelCase")]
    ScoreUpdate {
        player_id: UserId,
        hole: usize,
        strokes: u32,
    },

    /// Every player has finished the current hole (or the session just
    /// advanced to the next one).
    #[serde(rename = "game:hole_complete")]
    HoleComplete,

    /// The session was cancelled (host left while waiting).
    #[serde(rename = "game:cancelled")]
    Cancelled { reason: String },

    /// Relayed live aim preview.
    #[serde(rename = "player:aim")]
    #[serde(rename_all = "camelCase")]
    Aim { player_id: UserId, angle: f32 },

    /// Relayed chat line.
    #[serde(rename = "chat:message")]
    #[serde(rename_all = "camelCase")]
    Chat {
        player_id: UserId,
        username: String,
        message: String,
    },

    /// Something went wrong with the sender's request. The message is a
    /// human-readable string the UI can display directly.
    #[serde(rename = "error")]
    Error { message: String },
}

// ---------------------------------------------------------------------------
// Snapshots
// ---------------------------------------------------------------------------

/// One player inside a [`GameView`] snapshot.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PlayerView {
    pub id: UserId,
    pub username: String,
    pub team: u8,
    /// Committed strokes per finished hole, keyed by hole index.
    #[serde(with = "hole_score_map")]
    pub score: BTreeMap<usize, u32>,
    pub customization: Customization,
    /// Last authoritative ball position, if the player has one.
    pub position: Option<[f32; 3]>,
    pub is_current_turn: bool,
}

/// A fully materialized session snapshot, as sent to clients.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GameView {
    pub id: GameId,
    pub mode: GameMode,
    pub status: GameStatus,
    pub current_hole: usize,
    pub course_style: u32,
    pub players: Vec<PlayerView>,
}

/// Serde adapter for [`PlayerView::score`].
///
/// The wire format keys the score map by hole index as a JSON string
/// (`{"0":3}`), exactly as serde_json's default integer-key handling
/// produces. Routing the keys through `String` explicitly keeps that
/// byte-identical output while letting the map survive the buffered
/// deserialization path used by the internally-tagged [`ServerMessage`]
/// enum, where integer map keys would otherwise arrive as strings and
/// fail to coerce back to `usize`.
mod hole_score_map {
    use std::collections::BTreeMap;

    use serde::{Deserialize, Deserializer, Serialize, Serializer};

    pub fn serialize<S>(map: &BTreeMap<usize, u32>, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        let stringed: BTreeMap<String, u32> =
            map.iter().map(|(k, v)| (k.to_string(), *v)).collect();
        stringed.serialize(serializer)
    }

    pub fn deserialize<'de, D>(deserializer: D) -> Result<BTreeMap<usize, u32>, D::Error>
    where
        D: Deserializer<'de>,
    {
        let stringed = BTreeMap::<String, u32>::deserialize(deserializer)?;
        stringed
            .into_iter()
            .map(|(k, v)| k.parse::<usize>().map(|k| (k, v)).map_err(serde::de::Error::custom))
            .collect()
    }
}

// ---------------------------------------------------------------------------
// Recipient — who should receive a message?
// ---------------------------------------------------------------------------

/// Fan-out selector for an outbound message within a session's room.
///
/// Never serialized; this is how the session actor tells its dispatch
/// loop where each [`ServerMessage`] goes.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Recipient {
    /// Every connection in the room.
    All,
    /// One specific player's connection.
    Player(UserId),
    /// Everyone except the named player (relays of their own input).
    AllExcept(UserId),
}

// =========================================================================
// Tests
// =========================================================================
