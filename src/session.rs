//! Game session orchestration: a [`Position`] plus the applied move history
//! and a set of event sinks, driving a game from user-level square pairs.

use crate::board::chess_types::{GameOutcome, Move, PieceKind, Square};
use crate::board::position::{MoveLookupError, Position};

/// Observer notified after every applied move. Sinks are how UIs, loggers,
/// and recorders follow a game without owning the position.
pub trait GameEventSink {
    fn on_move_applied(&mut self, mv: Move, outcome: GameOutcome);

    /// Called when a move is taken back. Default does nothing.
    fn on_move_undone(&mut self, _mv: Move) {}
}

/// A playable game: position, move history, and registered sinks.
pub struct GameSession {
    pub position: Position,
    history: Vec<Move>,
    sinks: Vec<Box<dyn GameEventSink>>,
}

impl GameSession {
    pub fn new_game() -> Self {
        Self {
            position: Position::new_game(),
            history: Vec::new(),
            sinks: Vec::new(),
        }
    }

    pub fn from_fen(fen: &str) -> Result<Self, String> {
        Ok(Self {
            position: Position::from_fen(fen)?,
            history: Vec::new(),
            sinks: Vec::new(),
        })
    }

    pub fn add_sink(&mut self, sink: Box<dyn GameEventSink>) {
        self.sinks.push(sink);
    }

    pub fn history(&self) -> &[Move] {
        &self.history
    }

    pub fn outcome(&self) -> GameOutcome {
        self.position.outcome
    }

    /// Resolve and apply the move from `start` to `end`. Promotions must
    /// name the piece to promote to.
    pub fn play(
        &mut self,
        start: Square,
        end: Square,
        promotion: Option<PieceKind>,
    ) -> Result<GameOutcome, MoveLookupError> {
        let mv = self.position.find_move(start, end, promotion)?;
        self.apply(mv);
        Ok(self.position.outcome)
    }

    /// Apply a move already resolved against the current legal move list,
    /// e.g. one chosen by the search engine.
    pub fn apply(&mut self, mv: Move) {
        self.position.make_move(mv);
        self.history.push(mv);
        let outcome = self.position.outcome;
        for sink in &mut self.sinks {
            sink.on_move_applied(mv, outcome);
        }
    }

    /// Take back the last move. Returns `false` on an empty history.
    pub fn undo(&mut self) -> bool {
        let Some(mv) = self.history.pop() else {
            return false;
        };
        let undone = self.position.undo_move();
        debug_assert!(undone, "history and undo stack out of sync");
        for sink in &mut self.sinks {
            sink.on_move_undone(mv);
        }
        true
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::cell::RefCell;
    use std::rc::Rc;

    struct Recorder {
        applied: Rc<RefCell<Vec<(Move, GameOutcome)>>>,
    }

    impl GameEventSink for Recorder {
        fn on_move_applied(&mut self, mv: Move, outcome: GameOutcome) {
            self.applied.borrow_mut().push((mv, outcome));
        }
    }

    #[test]
    fn playing_moves_builds_history_and_notifies_sinks() {
        let applied = Rc::new(RefCell::new(Vec::new()));
        let mut session = GameSession::new_game();
        session.add_sink(Box::new(Recorder {
            applied: Rc::clone(&applied),
        }));

        session.play(12, 28, None).expect("e4 should be legal");
        session.play(52, 36, None).expect("e5 should be legal");

        assert_eq!(session.history().len(), 2);
        let seen = applied.borrow();
        assert_eq!(seen.len(), 2);
        assert_eq!(seen[0].0, Move::new(12, 28));
        assert_eq!(seen[1].1, GameOutcome::InProgress);
    }

    #[test]
    fn illegal_requests_leave_the_session_unchanged() {
        let mut session = GameSession::new_game();
        let err = session.play(12, 44, None).expect_err("e2e6 is not legal");
        assert_eq!(err, MoveLookupError::NoSuchMove);
        assert!(session.history().is_empty());
        assert_eq!(session.outcome(), GameOutcome::InProgress);
    }

    #[test]
    fn promotion_requires_a_named_piece() {
        let mut session =
            GameSession::from_fen("8/P5k1/8/8/8/8/8/K7 w - - 0 1").expect("fen should parse");
        assert_eq!(
            session.play(48, 56, None),
            Err(MoveLookupError::AmbiguousPromotion)
        );
        session
            .play(48, 56, Some(PieceKind::Queen))
            .expect("promotion with a named piece should apply");
        assert_eq!(session.history().len(), 1);
    }

    #[test]
    fn undo_rewinds_history_and_position() {
        let mut session = GameSession::new_game();
        let start_fen = session.position.to_fen();
        session.play(12, 28, None).expect("e4 should be legal");
        assert!(session.undo());
        assert!(session.history().is_empty());
        assert_eq!(session.position.to_fen(), start_fen);
        assert!(!session.undo());
    }

    #[test]
    fn fools_mate_reports_the_win_through_the_session() {
        let mut session = GameSession::new_game();
        session.play(13, 21, None).expect("f3");
        session.play(52, 36, None).expect("e5");
        session.play(14, 30, None).expect("g4");
        let outcome = session.play(59, 31, None).expect("Qh4#");
        assert_eq!(outcome, GameOutcome::DarkWin);
    }
}
