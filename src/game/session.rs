// Multiplayer session state machine
// One instance per game, owned by the game loop and handed to the UI by
// reference. Owns the board and turn cursor exclusively; the network layer
// only ferries the messages this module queues.

use super::board::{Board, PlayerSlot};
use crate::network::WireMessage;

/// Session lifecycle: Idle -> AwaitingPeer -> Active -> Ended
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SessionState {
    Idle,
    AwaitingPeer,
    Active,
    Ended,
}

/// Why the session left Active. A finished game can be restarted in
/// lock-step while the channel is up; a closed channel is final and a new
/// session instance is required.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EndReason {
    GameOver,
    ChannelClosed,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum GameOutcome {
    Winner(PlayerSlot),
    Draw,
}

/// Discrete events for the presentation layer, drained once per frame
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SessionEvent {
    MoveApplied {
        row: usize,
        col: usize,
        slot: PlayerSlot,
    },
    GameEnded {
        outcome: GameOutcome,
    },
    SessionEnded,
}

pub struct GameSession {
    state: SessionState,
    end_reason: Option<EndReason>,
    my_slot: Option<PlayerSlot>,
    board: Board,
    turn: PlayerSlot,
    outcome: Option<GameOutcome>,
    outgoing: Vec<WireMessage>,
    events: Vec<SessionEvent>,
}

impl GameSession {
    pub fn new() -> Self {
        Self {
            state: SessionState::Idle,
            end_reason: None,
            my_slot: None,
            board: Board::new(),
            turn: PlayerSlot::Slot1,
            outcome: None,
            outgoing: Vec::new(),
            events: Vec::new(),
        }
    }

    /// Role selection: host takes Slot1, guest Slot2. The slot is permanent
    /// for the session's lifetime.
    pub fn select_role(&mut self, slot: PlayerSlot) {
        if self.state == SessionState::Idle {
            self.my_slot = Some(slot);
            self.state = SessionState::AwaitingPeer;
        }
    }

    /// The transport reported channel-open; play begins with Slot1
    pub fn channel_opened(&mut self) {
        if self.state == SessionState::AwaitingPeer {
            self.state = SessionState::Active;
        }
    }

    /// The transport reported the channel closed or failed. Final; any
    /// further play needs a fresh session.
    pub fn channel_closed(&mut self) {
        match (self.state, self.end_reason) {
            (SessionState::Active, _) | (SessionState::AwaitingPeer, _) => {
                self.state = SessionState::Ended;
                self.end_reason = Some(EndReason::ChannelClosed);
                self.events.push(SessionEvent::SessionEnded);
            }
            (SessionState::Ended, Some(EndReason::GameOver)) => {
                // Game was already over; the session itself ends now
                self.end_reason = Some(EndReason::ChannelClosed);
                self.events.push(SessionEvent::SessionEnded);
            }
            _ => {}
        }
    }

    /// Try to drop a piece in `col` for the local player.
    ///
    /// Off-turn clicks, full columns and out-of-range columns are silent
    /// no-ops: the board stays untouched and nothing is broadcast. A valid
    /// move updates local state first, then queues exactly one move message.
    pub fn attempt_local_move(&mut self, col: usize) {
        if self.state != SessionState::Active {
            return;
        }
        let Some(me) = self.my_slot else {
            return;
        };
        if self.turn != me {
            return;
        }
        self.place(col, me, true);
    }

    /// Apply a move received from the peer.
    ///
    /// Identical placement logic to a local move, but never re-broadcast
    /// (that would echo forever) and no own-turn check: the alternation
    /// invariant makes the peer authoritative for its own moves.
    pub fn apply_remote_move(&mut self, col: usize, slot: PlayerSlot) {
        if self.state != SessionState::Active {
            return;
        }
        self.place(col, slot, false);
    }

    fn place(&mut self, col: usize, slot: PlayerSlot, broadcast: bool) {
        let Some(row) = self.board.drop_piece(col, slot) else {
            return;
        };

        self.events.push(SessionEvent::MoveApplied { row, col, slot });

        // Win check runs on every placement, before any turn flip
        if self.board.check_win(row, col, slot) {
            self.finish(GameOutcome::Winner(slot));
        } else if self.board.is_full() {
            self.finish(GameOutcome::Draw);
        } else {
            self.turn = self.turn.other();
        }

        if broadcast {
            self.outgoing.push(WireMessage::Move {
                col: col as u8,
                player: slot.as_wire(),
            });
        }
    }

    fn finish(&mut self, outcome: GameOutcome) {
        self.state = SessionState::Ended;
        self.end_reason = Some(EndReason::GameOver);
        self.outcome = Some(outcome);
        self.events.push(SessionEvent::GameEnded { outcome });
    }

    /// Restart the game locally and tell the peer to do the same, so both
    /// boards clear in lock-step. Only meaningful while the channel is
    /// still up: mid-game or after a win/draw.
    pub fn request_reset(&mut self) {
        if !self.can_reset() {
            return;
        }
        self.reset_board();
        self.outgoing.push(WireMessage::Restart);
    }

    /// Peer asked for a restart; apply the same reset without re-broadcasting
    pub fn apply_remote_reset(&mut self) {
        if !self.can_reset() {
            return;
        }
        self.reset_board();
    }

    fn can_reset(&self) -> bool {
        match self.state {
            SessionState::Active => true,
            SessionState::Ended => self.end_reason == Some(EndReason::GameOver),
            _ => false,
        }
    }

    fn reset_board(&mut self) {
        self.board.clear();
        self.turn = PlayerSlot::Slot1;
        self.state = SessionState::Active;
        self.end_reason = None;
        self.outcome = None;
    }

    // Read-only snapshots for the presentation layer

    pub fn state(&self) -> SessionState {
        self.state
    }

    pub fn end_reason(&self) -> Option<EndReason> {
        self.end_reason
    }

    pub fn board(&self) -> &Board {
        &self.board
    }

    pub fn turn(&self) -> PlayerSlot {
        self.turn
    }

    pub fn my_slot(&self) -> Option<PlayerSlot> {
        self.my_slot
    }

    pub fn outcome(&self) -> Option<GameOutcome> {
        self.outcome
    }

    pub fn is_my_turn(&self) -> bool {
        self.state == SessionState::Active && self.my_slot == Some(self.turn)
    }

    /// Take the messages queued for the peer since the last drain
    pub fn drain_outgoing(&mut self) -> Vec<WireMessage> {
        std::mem::take(&mut self.outgoing)
    }

    /// Take the UI events emitted since the last drain
    pub fn drain_events(&mut self) -> Vec<SessionEvent> {
        std::mem::take(&mut self.events)
    }
}

impl Default for GameSession {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::game::board::PlayerSlot::{Slot1, Slot2};
    use crate::game::board::{COLS, ROWS};

    fn active_session(slot: PlayerSlot) -> GameSession {
        let mut s = GameSession::new();
        s.select_role(slot);
        s.channel_opened();
        s
    }

    /// Two sessions wired back to back: every message one queues is applied
    /// to the other, the way the channel would deliver it.
    fn pump(from: &mut GameSession, to: &mut GameSession) {
        for msg in from.drain_outgoing() {
            match msg {
                WireMessage::Move { col, player } => {
                    to.apply_remote_move(col as usize, PlayerSlot::from_wire(player).unwrap());
                }
                WireMessage::Restart => to.apply_remote_reset(),
                WireMessage::Unknown => {}
            }
        }
    }

    #[test]
    fn test_lifecycle_states() {
        let mut s = GameSession::new();
        assert_eq!(s.state(), SessionState::Idle);
        s.select_role(Slot1);
        assert_eq!(s.state(), SessionState::AwaitingPeer);
        s.channel_opened();
        assert_eq!(s.state(), SessionState::Active);
        s.channel_closed();
        assert_eq!(s.state(), SessionState::Ended);
        assert_eq!(s.end_reason(), Some(EndReason::ChannelClosed));
    }

    #[test]
    fn test_moves_rejected_before_active() {
        let mut s = GameSession::new();
        s.select_role(Slot1);
        s.attempt_local_move(3);
        assert_eq!(s.board().cell(ROWS - 1, 3), None);
        assert!(s.drain_outgoing().is_empty());
    }

    #[test]
    fn test_local_move_places_flips_turn_and_broadcasts_once() {
        let mut s = active_session(Slot1);
        s.attempt_local_move(3);

        assert_eq!(s.board().cell(ROWS - 1, 3), Some(Slot1));
        assert_eq!(s.turn(), Slot2);
        assert_eq!(
            s.drain_outgoing(),
            vec![WireMessage::Move { col: 3, player: 1 }]
        );
        // Drained; a second drain must not replay the broadcast
        assert!(s.drain_outgoing().is_empty());
        assert!(s
            .drain_events()
            .contains(&SessionEvent::MoveApplied {
                row: ROWS - 1,
                col: 3,
                slot: Slot1
            }));
    }

    #[test]
    fn test_off_turn_move_is_silent_noop() {
        let mut s = active_session(Slot2);
        // Slot1 moves first; a Slot2 click now must change nothing
        s.attempt_local_move(0);
        assert_eq!(s.board().cell(ROWS - 1, 0), None);
        assert_eq!(s.turn(), Slot1);
        assert!(s.drain_outgoing().is_empty());
        assert!(s.drain_events().is_empty());
    }

    #[test]
    fn test_full_column_move_is_silent_noop() {
        let mut host = active_session(Slot1);
        let mut guest = active_session(Slot2);

        // Alternate in column 0 until it fills
        for _ in 0..3 {
            host.attempt_local_move(0);
            pump(&mut host, &mut guest);
            guest.attempt_local_move(0);
            pump(&mut guest, &mut host);
        }
        assert!(host.board().is_column_full(0));

        let board_before = host.board().clone();
        let turn_before = host.turn();
        host.drain_outgoing();
        host.attempt_local_move(0);
        assert_eq!(host.board(), &board_before);
        assert_eq!(host.turn(), turn_before);
        assert!(host.drain_outgoing().is_empty());
    }

    #[test]
    fn test_turn_parity_over_move_sequence() {
        let mut host = active_session(Slot1);
        let mut guest = active_session(Slot2);

        // After N accepted moves the cursor is Slot1 for even N, Slot2 for odd
        let columns = [0, 1, 2, 3, 4, 5, 6, 0, 1, 2];
        for (n, col) in columns.iter().enumerate() {
            let expected = if n % 2 == 0 { Slot1 } else { Slot2 };
            assert_eq!(host.turn(), expected, "before move {}", n);
            assert_eq!(guest.turn(), expected);

            if expected == Slot1 {
                host.attempt_local_move(*col);
                pump(&mut host, &mut guest);
            } else {
                guest.attempt_local_move(*col);
                pump(&mut guest, &mut host);
            }
        }
    }

    #[test]
    fn test_peers_replay_to_identical_boards() {
        let mut host = active_session(Slot1);
        let mut guest = active_session(Slot2);

        let columns = [3, 3, 4, 2, 5, 4, 1, 6, 0, 0, 2, 5];
        for (n, col) in columns.iter().enumerate() {
            if n % 2 == 0 {
                host.attempt_local_move(*col);
                pump(&mut host, &mut guest);
            } else {
                guest.attempt_local_move(*col);
                pump(&mut guest, &mut host);
            }
        }

        assert_eq!(host.board(), guest.board());
        assert_eq!(host.turn(), guest.turn());
    }

    #[test]
    fn test_remote_move_does_not_rebroadcast() {
        let mut guest = active_session(Slot2);
        guest.apply_remote_move(3, Slot1);
        assert_eq!(guest.board().cell(ROWS - 1, 3), Some(Slot1));
        assert_eq!(guest.turn(), Slot2);
        assert!(guest.drain_outgoing().is_empty());
    }

    #[test]
    fn test_win_ends_game_without_flipping_turn() {
        let mut host = active_session(Slot1);
        let mut guest = active_session(Slot2);

        // Slot1 builds 0..3 on the bottom row, Slot2 stacks in column 6
        for col in 0..3 {
            host.attempt_local_move(col);
            pump(&mut host, &mut guest);
            guest.attempt_local_move(6);
            pump(&mut guest, &mut host);
        }
        host.attempt_local_move(3);

        assert_eq!(host.state(), SessionState::Ended);
        assert_eq!(host.end_reason(), Some(EndReason::GameOver));
        assert_eq!(host.outcome(), Some(GameOutcome::Winner(Slot1)));
        assert_eq!(host.turn(), Slot1);
        assert!(host
            .drain_events()
            .contains(&SessionEvent::GameEnded {
                outcome: GameOutcome::Winner(Slot1)
            }));

        // The winning move still reaches the peer, which ends identically
        pump(&mut host, &mut guest);
        assert_eq!(guest.state(), SessionState::Ended);
        assert_eq!(guest.outcome(), Some(GameOutcome::Winner(Slot1)));
        assert_eq!(guest.board(), host.board());
    }

    #[test]
    fn test_reset_restores_play_on_both_peers() {
        let mut host = active_session(Slot1);
        let mut guest = active_session(Slot2);

        host.attempt_local_move(2);
        pump(&mut host, &mut guest);
        guest.attempt_local_move(2);
        pump(&mut guest, &mut host);

        host.request_reset();
        pump(&mut host, &mut guest);

        for s in [&host, &guest] {
            assert_eq!(s.state(), SessionState::Active);
            assert_eq!(s.turn(), Slot1);
            for row in 0..ROWS {
                for col in 0..COLS {
                    assert_eq!(s.board().cell(row, col), None);
                }
            }
        }
    }

    #[test]
    fn test_reset_after_game_over_returns_to_active() {
        let mut host = active_session(Slot1);
        let mut guest = active_session(Slot2);

        for col in 0..3 {
            host.attempt_local_move(col);
            pump(&mut host, &mut guest);
            guest.attempt_local_move(6);
            pump(&mut guest, &mut host);
        }
        host.attempt_local_move(3);
        pump(&mut host, &mut guest);
        assert_eq!(guest.state(), SessionState::Ended);

        guest.request_reset();
        pump(&mut guest, &mut host);
        assert_eq!(guest.state(), SessionState::Active);
        assert_eq!(host.state(), SessionState::Active);
        assert_eq!(host.turn(), Slot1);
        assert_eq!(host.outcome(), None);
    }

    #[test]
    fn test_no_reset_after_channel_closed() {
        let mut s = active_session(Slot1);
        s.attempt_local_move(0);
        s.channel_closed();

        s.request_reset();
        assert_eq!(s.state(), SessionState::Ended);
        assert_eq!(s.end_reason(), Some(EndReason::ChannelClosed));
        // Only the earlier move was ever queued; no restart goes out
        assert_eq!(
            s.drain_outgoing(),
            vec![WireMessage::Move { col: 0, player: 1 }]
        );
        assert_eq!(s.board().cell(ROWS - 1, 0), Some(Slot1));
    }

    #[test]
    fn test_channel_close_emits_session_ended() {
        let mut s = active_session(Slot1);
        s.channel_closed();
        assert!(s.drain_events().contains(&SessionEvent::SessionEnded));

        // Closing again changes nothing
        s.channel_closed();
        assert!(s.drain_events().is_empty());
    }

    #[test]
    fn test_channel_close_after_game_over_ends_session() {
        let mut s = active_session(Slot1);
        let mut peer = active_session(Slot2);
        for col in 0..3 {
            s.attempt_local_move(col);
            pump(&mut s, &mut peer);
            peer.attempt_local_move(6);
            pump(&mut peer, &mut s);
        }
        s.attempt_local_move(3);
        s.drain_events();

        s.channel_closed();
        assert_eq!(s.end_reason(), Some(EndReason::ChannelClosed));
        assert!(s.drain_events().contains(&SessionEvent::SessionEnded));
    }

    #[test]
    fn test_draw_when_board_fills() {
        let mut s = active_session(Slot1);

        // Fill bottom-up with slot = parity of (height/2 + col). Horizontal
        // runs are length 1, vertical and diagonal runs are length 2, so the
        // board fills completely without a winner.
        for height in 0..ROWS {
            for col in 0..COLS {
                let slot = if (height / 2 + col) % 2 == 0 { Slot1 } else { Slot2 };
                s.apply_remote_move(col, slot);
            }
        }

        assert!(s.board().is_full());
        assert_eq!(s.state(), SessionState::Ended);
        assert_eq!(s.end_reason(), Some(EndReason::GameOver));
        assert_eq!(s.outcome(), Some(GameOutcome::Draw));
        assert!(s
            .drain_events()
            .contains(&SessionEvent::GameEnded {
                outcome: GameOutcome::Draw
            }));
    }
}
