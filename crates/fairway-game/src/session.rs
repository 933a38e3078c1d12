//! The in-memory session: players, turn order, hole progress.
//!
//! `Session` is plain data plus the pure state transitions. Everything
//! async — persistence ordering, broadcast dispatch, serialization of
//! concurrent operations — lives in the actor ([`crate::GameActor`]);
//! keeping the rules synchronous makes them directly testable.
//!
//! Invariants maintained here:
//! - at most one player has `is_current_turn == true`, and exactly one
//!   while the session is `playing` with a connected player available;
//! - `current_hole` only moves forward, one step at a time;
//! - strokes only grow within a hole and reset on hole transitions.

use std::collections::{BTreeMap, HashSet};

use fairway_course::{COURSE_HOLES, CourseHole};
use fairway_protocol::{
    Customization, GameId, GameMode, GameStatus, GameView, PlayerView, UserId,
};
use fairway_store::{GameRecord, PlayerRecord};

/// One participant's live state.
#[derive(Debug, Clone)]
pub struct PlayerState {
    pub user_id: UserId,
    pub username: String,
    pub team: u8,
    pub ready: bool,
    pub customization: Customization,
    /// Committed strokes per finished hole. Written exactly once per
    /// hole, when the player finishes it.
    pub score: BTreeMap<usize, u32>,
    /// Authoritative ball position; `None` until the session starts.
    pub position: Option<[f32; 3]>,
    /// Running count for the current hole only.
    pub strokes: u32,
    pub finished_hole: bool,
    pub connected: bool,
    pub is_current_turn: bool,
}

/// The authoritative in-memory state of one game session.
#[derive(Debug, Clone)]
pub struct Session {
    pub id: GameId,
    pub name: String,
    pub host: UserId,
    pub mode: GameMode,
    pub course_style: u32,
    pub status: GameStatus,
    /// 0-based, bounded to the nine holes.
    pub current_hole: usize,
    /// Index into `players` of the turn holder.
    pub current_player_index: usize,
    /// Join order; turn rotation walks this order.
    pub players: Vec<PlayerState>,
    /// Players who acknowledged hole completion. Cleared on advance.
    pub ready_for_next_hole: HashSet<UserId>,
}

impl Session {
    /// Builds a live session from its repository records.
    ///
    /// Player order is the repository's join order; the first player
    /// holds the initial turn. Per-hole state (scores, strokes,
    /// positions) starts fresh regardless of what the records carry —
    /// a session resumes lobby state, not mid-round state.
    pub fn from_records(game: GameRecord, players: Vec<PlayerRecord>) -> Self {
        let players = players
            .into_iter()
            .enumerate()
            .map(|(index, record)| PlayerState {
                user_id: record.user_id,
                username: record.username,
                team: record.team,
                ready: record.ready,
                customization: record.customization,
                score: BTreeMap::new(),
                position: None,
                strokes: 0,
                finished_hole: false,
                connected: true,
                is_current_turn: index == 0,
            })
            .collect();

        Session {
            id: game.id,
            name: game.name,
            host: game.host,
            mode: game.mode,
            course_style: game.course_style,
            status: game.status,
            current_hole: 0,
            current_player_index: 0,
            players,
            ready_for_next_hole: HashSet::new(),
        }
    }

    /// The hole currently being played.
    pub fn hole(&self) -> &'static CourseHole {
        &COURSE_HOLES[self.current_hole]
    }

    pub fn player(&self, user: UserId) -> Option<&PlayerState> {
        self.players.iter().find(|p| p.user_id == user)
    }

    pub fn player_mut(&mut self, user: UserId) -> Option<&mut PlayerState> {
        self.players.iter_mut().find(|p| p.user_id == user)
    }

    pub fn player_index(&self, user: UserId) -> Option<usize> {
        self.players.iter().position(|p| p.user_id == user)
    }

    /// Whether the session satisfies its mode's start requirement.
    ///
    /// Solo needs only the host to be ready. Every other mode needs the
    /// ready *count* to reach the mode minimum — players beyond the
    /// minimum may still be unready.
    pub fn can_start(&self) -> bool {
        if self.mode == GameMode::Solo {
            return self
                .players
                .iter()
                .any(|p| p.user_id == self.host && p.ready);
        }
        let ready = self.players.iter().filter(|p| p.ready).count();
        ready >= self.mode.min_players()
    }

    /// Applies the start transition: everyone on the first tee, zero
    /// strokes, first player's turn. The caller has already validated
    /// the `waiting` status and persisted the transition.
    pub fn start(&mut self) {
        self.status = GameStatus::Playing;
        let start = self.hole().start;
        for player in &mut self.players {
            player.position = Some(start);
            player.strokes = 0;
            player.finished_hole = false;
            player.is_current_turn = false;
        }
        self.current_player_index = 0;
        if let Some(first) = self.players.first_mut() {
            first.is_current_turn = true;
        }
    }

    /// Hands the turn to the next player in join order, wrapping.
    ///
    /// Ignores `finished_hole`: a player who already holed out can be
    /// handed the turn again (their committed score is protected by the
    /// write-once commit in the swing path). Disconnected players are
    /// only skipped by the disconnect path, not here.
    pub fn rotate_turn(&mut self) {
        if self.players.is_empty() {
            return;
        }
        self.players[self.current_player_index].is_current_turn = false;
        self.current_player_index = (self.current_player_index + 1) % self.players.len();
        self.players[self.current_player_index].is_current_turn = true;
    }

    pub fn all_finished_hole(&self) -> bool {
        self.players.iter().all(|p| p.finished_hole)
    }

    /// Whether every *connected* player has acknowledged hole
    /// completion. Disconnected players cannot block advancement.
    pub fn all_ready_for_next_hole(&self) -> bool {
        self.players
            .iter()
            .filter(|p| p.connected)
            .all(|p| self.ready_for_next_hole.contains(&p.user_id))
    }

    pub fn any_connected(&self) -> bool {
        self.players.iter().any(|p| p.connected)
    }

    /// Whether the current hole is the last of the round.
    pub fn on_final_hole(&self) -> bool {
        self.current_hole >= COURSE_HOLES.len() - 1
    }

    /// Advances to the next hole: fresh per-hole state for everyone,
    /// acknowledgement set cleared, and the opening turn handed to the
    /// player with the worst cumulative score (ties broken by join
    /// order). Solo sessions always restart at index 0.
    ///
    /// Must not be called on the final hole; use the `finished` status
    /// transition instead.
    pub fn advance_hole(&mut self) {
        self.current_hole += 1;
        let start = self.hole().start;
        for player in &mut self.players {
            player.position = Some(start);
            player.strokes = 0;
            player.finished_hole = false;
        }
        self.ready_for_next_hole.clear();

        let opener = if self.players.len() > 1 {
            self.worst_scoring_player_index()
        } else {
            0
        };
        for player in &mut self.players {
            player.is_current_turn = false;
        }
        self.current_player_index = opener;
        if let Some(player) = self.players.get_mut(opener) {
            player.is_current_turn = true;
        }
    }

    /// Index of the player with the highest cumulative score over the
    /// holes played so far. Ties go to the earliest joiner.
    fn worst_scoring_player_index(&self) -> usize {
        let mut worst_index = 0;
        let mut worst_total = -1i64;
        for (index, player) in self.players.iter().enumerate() {
            let total: u32 = (0..self.current_hole)
                .map(|hole| player.score.get(&hole).copied().unwrap_or(0))
                .sum();
            if i64::from(total) > worst_total {
                worst_total = i64::from(total);
                worst_index = index;
            }
        }
        worst_index
    }

    /// Marks a player disconnected. If they held the turn, it rotates
    /// forward to the next connected player; with nobody left connected
    /// the turn stays unassigned until cleanup removes the session.
    pub fn mark_disconnected(&mut self, user: UserId) {
        let Some(index) = self.player_index(user) else {
            return;
        };
        self.players[index].connected = false;
        if !self.players[index].is_current_turn {
            return;
        }
        self.players[index].is_current_turn = false;
        for offset in 1..=self.players.len() {
            let next = (self.current_player_index + offset) % self.players.len();
            if self.players[next].connected {
                self.players[next].is_current_turn = true;
                self.current_player_index = next;
                return;
            }
        }
    }

    /// Marks a player (re)connected.
    pub fn mark_connected(&mut self, user: UserId) {
        if let Some(player) = self.player_mut(user) {
            player.connected = true;
        }
    }

    /// Full snapshot for broadcasting.
    pub fn view(&self) -> GameView {
        GameView {
            id: self.id,
            mode: self.mode,
            status: self.status,
            current_hole: self.current_hole,
            course_style: self.course_style,
            players: self.players_view(),
        }
    }

    /// Player-list snapshot for broadcasting.
    pub fn players_view(&self) -> Vec<PlayerView> {
        self.players
            .iter()
            .map(|p| PlayerView {
                id: p.user_id,
                username: p.username.clone(),
                team: p.team,
                score: p.score.clone(),
                customization: p.customization,
                position: p.position,
                is_current_turn: p.is_current_turn,
            })
            .collect()
    }
}

// =========================================================================
// Tests
// =========================================================================

#[cfg(test)]
mod tests {
    use super::*;

    fn game_record(mode: GameMode) -> GameRecord {
        GameRecord {
            id: GameId(1),
            host: UserId(1),
            name: "test round".into(),
            mode,
            course_style: 0,
            status: GameStatus::Waiting,
        }
    }

    fn player_record(user: u64, name: &str) -> PlayerRecord {
        PlayerRecord {
            game_id: GameId(1),
            user_id: UserId(user),
            username: name.into(),
            team: 0,
            ready: false,
            customization: Customization::default(),
            score: BTreeMap::new(),
        }
    }

    fn session(mode: GameMode, players: usize) -> Session {
        let records = (0..players)
            .map(|i| player_record(i as u64 + 1, &format!("player{}", i + 1)))
            .collect();
        Session::from_records(game_record(mode), records)
    }

    fn turn_holders(session: &Session) -> Vec<UserId> {
        session
            .players
            .iter()
            .filter(|p| p.is_current_turn)
            .map(|p| p.user_id)
            .collect()
    }

    // =====================================================================
    // from_records()
    // =====================================================================

    #[test]
    fn test_from_records_first_player_holds_the_turn() {
        let session = session(GameMode::TwoPlayer, 2);

        assert_eq!(turn_holders(&session), vec![UserId(1)]);
        assert_eq!(session.current_player_index, 0);
        assert_eq!(session.current_hole, 0);
    }

    #[test]
    fn test_from_records_players_start_fresh_and_connected() {
        let session = session(GameMode::FourPlayer, 4);

        for player in &session.players {
            assert!(player.connected);
            assert!(!player.finished_hole);
            assert_eq!(player.strokes, 0);
            assert!(player.score.is_empty());
            assert!(player.position.is_none());
        }
    }

    // =====================================================================
    // can_start()
    // =====================================================================

    #[test]
    fn test_can_start_solo_requires_only_host_ready() {
        let mut session = session(GameMode::Solo, 1);
        assert!(!session.can_start());

        session.players[0].ready = true;
        assert!(session.can_start());
    }

    #[test]
    fn test_can_start_solo_ignores_non_host_ready() {
        // A stray second player being ready doesn't satisfy solo mode.
        let mut session = session(GameMode::Solo, 2);
        session.players[1].ready = true;
        assert!(!session.can_start());
    }

    #[test]
    fn test_can_start_two_player_needs_two_ready() {
        let mut session = session(GameMode::TwoPlayer, 2);
        assert!(!session.can_start());

        session.players[0].ready = true;
        assert!(!session.can_start());

        session.players[1].ready = true;
        assert!(session.can_start());
    }

    #[test]
    fn test_can_start_counts_ready_players_not_fraction() {
        // Three present, only two ready: 2player mode is satisfied even
        // though someone is still unready.
        let mut session = session(GameMode::TwoPlayer, 3);
        session.players[0].ready = true;
        session.players[2].ready = true;

        assert!(session.can_start());
    }

    #[test]
    fn test_can_start_team_mode_needs_two_ready() {
        let mut session = session(GameMode::TwoVsTwo, 4);
        session.players[0].ready = true;
        assert!(!session.can_start());

        session.players[3].ready = true;
        assert!(session.can_start());
    }

    // =====================================================================
    // start()
    // =====================================================================

    #[test]
    fn test_start_puts_everyone_on_the_first_tee() {
        let mut session = session(GameMode::TwoPlayer, 2);
        session.start();

        let tee = COURSE_HOLES[0].start;
        assert_eq!(session.status, GameStatus::Playing);
        for player in &session.players {
            assert_eq!(player.position, Some(tee));
            assert_eq!(player.strokes, 0);
            assert!(!player.finished_hole);
        }
        assert_eq!(turn_holders(&session), vec![UserId(1)]);
    }

    // =====================================================================
    // rotate_turn()
    // =====================================================================

    #[test]
    fn test_rotate_turn_walks_join_order_and_wraps() {
        let mut session = session(GameMode::ThreePlayer, 3);
        session.start();

        session.rotate_turn();
        assert_eq!(turn_holders(&session), vec![UserId(2)]);

        session.rotate_turn();
        assert_eq!(turn_holders(&session), vec![UserId(3)]);

        session.rotate_turn();
        assert_eq!(turn_holders(&session), vec![UserId(1)]);
    }

    #[test]
    fn test_rotate_turn_does_not_skip_finished_players() {
        // A player who already holed out is still handed the turn.
        let mut session = session(GameMode::ThreePlayer, 3);
        session.start();
        session.players[1].finished_hole = true;

        session.rotate_turn();
        assert_eq!(turn_holders(&session), vec![UserId(2)]);
    }

    // =====================================================================
    // advance_hole()
    // =====================================================================

    #[test]
    fn test_advance_hole_resets_per_hole_state() {
        let mut session = session(GameMode::TwoPlayer, 2);
        session.start();
        session.players[0].strokes = 4;
        session.players[0].finished_hole = true;
        session.players[1].strokes = 2;
        session.players[1].finished_hole = true;
        session.ready_for_next_hole.insert(UserId(1));
        session.ready_for_next_hole.insert(UserId(2));

        session.advance_hole();

        assert_eq!(session.current_hole, 1);
        assert!(session.ready_for_next_hole.is_empty());
        let tee = COURSE_HOLES[1].start;
        for player in &session.players {
            assert_eq!(player.position, Some(tee));
            assert_eq!(player.strokes, 0);
            assert!(!player.finished_hole);
        }
    }

    #[test]
    fn test_advance_hole_worst_score_opens_the_next_hole() {
        let mut session = session(GameMode::TwoPlayer, 2);
        session.start();
        session.players[0].score.insert(0, 2);
        session.players[1].score.insert(0, 5);

        session.advance_hole();

        // Player 2 took five strokes — they tee off first.
        assert_eq!(turn_holders(&session), vec![UserId(2)]);
        assert_eq!(session.current_player_index, 1);
    }

    #[test]
    fn test_advance_hole_score_tie_breaks_by_join_order() {
        let mut session = session(GameMode::ThreePlayer, 3);
        session.start();
        for player in &mut session.players {
            player.score.insert(0, 3);
        }

        session.advance_hole();

        assert_eq!(turn_holders(&session), vec![UserId(1)]);
    }

    #[test]
    fn test_advance_hole_accumulates_across_holes() {
        let mut session = session(GameMode::TwoPlayer, 2);
        session.start();
        // Hole 0: p1 worse. Hole 1: p2 much worse overall.
        session.players[0].score.insert(0, 4);
        session.players[1].score.insert(0, 3);
        session.advance_hole();
        session.players[0].score.insert(1, 2);
        session.players[1].score.insert(1, 7);

        session.advance_hole();

        // Cumulative: p1 = 6, p2 = 10.
        assert_eq!(session.current_hole, 2);
        assert_eq!(turn_holders(&session), vec![UserId(2)]);
    }

    #[test]
    fn test_advance_hole_solo_keeps_first_player() {
        let mut session = session(GameMode::Solo, 1);
        session.start();
        session.players[0].score.insert(0, 9);

        session.advance_hole();

        assert_eq!(turn_holders(&session), vec![UserId(1)]);
        assert_eq!(session.current_player_index, 0);
    }

    #[test]
    fn test_on_final_hole_only_at_index_eight() {
        let mut session = session(GameMode::Solo, 1);
        session.start();
        for _ in 0..8 {
            assert!(!session.on_final_hole());
            session.advance_hole();
        }
        assert_eq!(session.current_hole, 8);
        assert!(session.on_final_hole());
    }

    // =====================================================================
    // Disconnects
    // =====================================================================

    #[test]
    fn test_disconnect_of_turn_holder_rotates_to_next_connected() {
        let mut session = session(GameMode::ThreePlayer, 3);
        session.start();

        session.mark_disconnected(UserId(1));

        assert_eq!(turn_holders(&session), vec![UserId(2)]);
        assert!(!session.players[0].connected);
    }

    #[test]
    fn test_disconnect_rotation_skips_disconnected_players() {
        let mut session = session(GameMode::ThreePlayer, 3);
        session.start();
        session.players[1].connected = false;

        session.mark_disconnected(UserId(1));

        assert_eq!(turn_holders(&session), vec![UserId(3)]);
        assert_eq!(session.current_player_index, 2);
    }

    #[test]
    fn test_disconnect_of_non_turn_holder_leaves_turn_alone() {
        let mut session = session(GameMode::ThreePlayer, 3);
        session.start();

        session.mark_disconnected(UserId(3));

        assert_eq!(turn_holders(&session), vec![UserId(1)]);
    }

    #[test]
    fn test_all_disconnected_leaves_turn_unassigned() {
        let mut session = session(GameMode::TwoPlayer, 2);
        session.start();

        session.mark_disconnected(UserId(2));
        session.mark_disconnected(UserId(1));

        assert!(turn_holders(&session).is_empty());
        assert!(!session.any_connected());
    }

    #[test]
    fn test_reconnect_restores_connected_flag() {
        let mut session = session(GameMode::TwoPlayer, 2);
        session.start();
        session.mark_disconnected(UserId(2));

        session.mark_connected(UserId(2));

        assert!(session.players[1].connected);
        // The turn does not move back on reconnection.
        assert_eq!(turn_holders(&session), vec![UserId(1)]);
    }

    // =====================================================================
    // Hole-completion acknowledgement
    // =====================================================================

    #[test]
    fn test_all_ready_for_next_hole_counts_connected_only() {
        let mut session = session(GameMode::ThreePlayer, 3);
        session.start();
        session.mark_disconnected(UserId(3));

        session.ready_for_next_hole.insert(UserId(1));
        assert!(!session.all_ready_for_next_hole());

        session.ready_for_next_hole.insert(UserId(2));
        // The disconnected third player cannot block advancement.
        assert!(session.all_ready_for_next_hole());
    }

    #[test]
    fn test_all_finished_hole_requires_everyone() {
        let mut session = session(GameMode::TwoPlayer, 2);
        session.start();
        session.players[0].finished_hole = true;
        assert!(!session.all_finished_hole());

        session.players[1].finished_hole = true;
        assert!(session.all_finished_hole());
    }

    // =====================================================================
    // Snapshots
    // =====================================================================

    #[test]
    fn test_view_mirrors_session_state() {
        let mut session = session(GameMode::TwoPlayer, 2);
        session.start();
        session.players[0].score.insert(0, 3);

        let view = session.view();

        assert_eq!(view.id, GameId(1));
        assert_eq!(view.status, GameStatus::Playing);
        assert_eq!(view.current_hole, 0);
        assert_eq!(view.players.len(), 2);
        assert_eq!(view.players[0].id, UserId(1));
        assert_eq!(view.players[0].score.get(&0), Some(&3));
        assert!(view.players[0].is_current_turn);
        assert!(!view.players[1].is_current_turn);
    }
}
