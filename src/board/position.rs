//! The mutable game position: a 64-square mailbox plus derived bitboard
//! state, an incremental Zobrist key, and a delta stack that makes every
//! applied move reversible in place.
//!
//! `make_move` and `undo_move` are exact inverses. Search never copies the
//! position; it applies a move, recurses, and unwinds the same allocation,
//! usually through the [`MoveScope`] guard so an early return cannot leave
//! a move applied.

use std::collections::HashSet;
use std::error::Error;
use std::fmt;
use std::ops::{Deref, DerefMut};

use crate::board::chess_types::{
    absolute_type, is_light_piece, piece_color, square_file, Color, GameOutcome, Move, MoveKind,
    PieceCode, PieceKind, Square, CASTLE_DARK_KINGSIDE_LOST, CASTLE_DARK_QUEENSIDE_LOST,
    CASTLE_LIGHT_KINGSIDE_LOST, CASTLE_LIGHT_QUEENSIDE_LOST, EMPTY,
};
use crate::board::undo_state::UndoState;
use crate::movegen::generator::{self, MobilityCounters};
use crate::search::zobrist;

pub const STARTING_POSITION_FEN: &str =
    "rnbqkbnr/pppppppp/8/8/8/8/PPPPPPPP/RNBQKBNR w KQkq - 0 1";

/// Sparse endgame fixtures used across the generator and search tests.
pub const KING_PAWN_TEST_FEN: &str = "8/2KP4/8/8/8/8/8/kq6 b - - 1 1";
pub const LIGHT_KING_PAWN_TEST_FEN: &str = "KQ6/8/8/8/8/8/2kp4/8 w - - 0 1";

/// The fifty-move counter counts *down* from 100 ply and draws at zero.
pub const FIFTY_MOVE_START: u8 = 100;

/// Reasons `find_move` can reject a square pair.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MoveLookupError {
    /// No legal move connects the two squares.
    NoSuchMove,
    /// The squares describe a promotion but no promotion piece was given.
    AmbiguousPromotion,
}

impl fmt::Display for MoveLookupError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            MoveLookupError::NoSuchMove => write!(f, "no legal move between those squares"),
            MoveLookupError::AmbiguousPromotion => {
                write!(f, "promotion move requires a promotion piece")
            }
        }
    }
}

impl Error for MoveLookupError {}

#[derive(Debug, Clone)]
pub struct Position {
    /// Mailbox board, index 0 = a1 through 63 = h8.
    pub squares: [PieceCode; 64],
    /// Ply counter; even means light to move.
    pub turn: u16,
    /// Inverted castling rights: a set bit means the right is lost.
    pub castling_rights: u8,
    /// 1-based file of a pawn that just double-stepped, 0 when none.
    pub en_passant_file: u8,
    pub fifty_move_counter: u8,
    pub zobrist_key: u64,
    pub outcome: GameOutcome,

    // Derived state, rebuilt by the generator after every move.
    pub light_king: Square,
    pub dark_king: Square,
    pub occupancy: u64,
    pub occupancy_by_color: [u64; 2],
    /// Destinations of generated moves per color, pawn pushes excluded.
    pub attacked_by: [u64; 2],
    /// Reachable squares per color including defended own pieces and empty
    /// pawn-capture diagonals. This is the set king legality checks.
    pub coverage: [u64; 2],
    pub pawn_attacks: [u64; 2],
    pub pin_mask: u64,
    pub check_mask: u64,
    pub king_blocker_mask: u64,
    pub check_state: u8,
    pub checker: Option<Square>,
    pub is_check: bool,
    /// The side to move can capture a major piece or promote. Search uses
    /// this to extend tactically loaded lines.
    pub major_event: bool,
    pub insufficient_material: bool,
    pub mobility: MobilityCounters,
    /// Legal moves for the side to move.
    pub moves: Vec<Move>,

    /// Zobrist keys seen once / at least twice in this game line.
    pub seen_positions: HashSet<u64>,
    pub repeated_positions: HashSet<u64>,
    undo_stack: Vec<UndoState>,
}

impl Position {
    /// A zeroed position with no pieces. Only useful as a parse target;
    /// callers must fill the board and then run [`initialize_derived`].
    ///
    /// [`initialize_derived`]: Position::initialize_derived
    pub(crate) fn blank() -> Self {
        Position {
            squares: [EMPTY; 64],
            turn: 0,
            castling_rights: 0,
            en_passant_file: 0,
            fifty_move_counter: FIFTY_MOVE_START,
            zobrist_key: 0,
            outcome: GameOutcome::InProgress,
            light_king: 0,
            dark_king: 0,
            occupancy: 0,
            occupancy_by_color: [0; 2],
            attacked_by: [0; 2],
            coverage: [0; 2],
            pawn_attacks: [0; 2],
            pin_mask: 0,
            check_mask: 0,
            king_blocker_mask: 0,
            check_state: 0,
            checker: None,
            is_check: false,
            major_event: false,
            insufficient_material: false,
            mobility: MobilityCounters::default(),
            moves: Vec::new(),
            seen_positions: HashSet::new(),
            repeated_positions: HashSet::new(),
            undo_stack: Vec::new(),
        }
    }

    pub fn new_game() -> Self {
        Position::from_fen(STARTING_POSITION_FEN)
            .expect("the standard starting position FEN is well formed")
    }

    pub fn from_fen(fen: &str) -> Result<Self, String> {
        crate::utils::fen_parser::position_from_fen(fen)
    }

    pub fn to_fen(&self) -> String {
        crate::utils::fen_generator::fen_from_position(self)
    }

    /// Full initialization after the board fields have been set: key,
    /// repetition baseline, legal moves, and outcome.
    pub(crate) fn initialize_derived(&mut self) {
        self.zobrist_key = zobrist::compute_zobrist_key(self);
        self.seen_positions.insert(self.zobrist_key);
        self.moves = generator::generate_moves(self);
        self.update_game_state();
    }

    #[inline]
    pub fn side_to_move(&self) -> Color {
        if self.turn % 2 == 0 {
            Color::Light
        } else {
            Color::Dark
        }
    }

    #[inline]
    pub fn king_square(&self, color: Color) -> Square {
        match color {
            Color::Light => self.light_king,
            Color::Dark => self.dark_king,
        }
    }

    pub(crate) fn reset_derived_state(&mut self) {
        self.occupancy = 0;
        self.occupancy_by_color = [0; 2];
        self.attacked_by = [0; 2];
        self.coverage = [0; 2];
        self.pawn_attacks = [0; 2];
        self.pin_mask = 0;
        self.check_mask = 0;
        self.king_blocker_mask = 0;
        self.check_state = 0;
        self.checker = None;
        self.is_check = false;
        self.major_event = false;
        self.insufficient_material = false;
        self.mobility = MobilityCounters::default();
    }

    /// Look up the legal move connecting two squares. Promotions must name
    /// their piece; `promotion` is ignored for ordinary moves.
    pub fn find_move(
        &self,
        start: Square,
        end: Square,
        promotion: Option<PieceKind>,
    ) -> Result<Move, MoveLookupError> {
        let candidates: Vec<Move> = self
            .moves
            .iter()
            .copied()
            .filter(|m| m.start == start && m.end == end)
            .collect();
        let Some(first) = candidates.first() else {
            return Err(MoveLookupError::NoSuchMove);
        };
        if !first.kind.is_promotion() {
            return Ok(*first);
        }
        let Some(kind) = promotion else {
            return Err(MoveLookupError::AmbiguousPromotion);
        };
        candidates
            .into_iter()
            .find(|m| m.kind.promotion_kind() == Some(kind))
            .ok_or(MoveLookupError::NoSuchMove)
    }

    /// Apply a legal move. Passing a move that did not come from the
    /// current legal move list is a programming error and panics.
    pub fn make_move(&mut self, mv: Move) {
        let piece = self.squares[mv.start as usize];
        let mover = self.side_to_move();
        assert_eq!(
            piece_color(piece),
            Some(mover),
            "make_move: {mv:?} does not move a piece of the side to move",
        );
        debug_assert!(
            self.moves.contains(&mv),
            "make_move: {mv:?} is not in the legal move list",
        );

        let captured = self.squares[mv.end as usize];
        self.undo_stack.push(UndoState {
            mv,
            moved_piece: piece,
            captured_piece: captured,
            prev_castling_rights: self.castling_rights,
            prev_en_passant_file: self.en_passant_file,
            prev_fifty_move_counter: self.fifty_move_counter,
            prev_zobrist_key: self.zobrist_key,
        });

        if captured != EMPTY {
            self.zobrist_key ^= zobrist::piece_square_key(captured, mv.end);
        }

        self.zobrist_key ^= zobrist::en_passant_file_key(self.en_passant_file);
        let double_step =
            absolute_type(piece) == 6 && (i16::from(mv.end) - i16::from(mv.start)).abs() == 16;
        self.en_passant_file = if double_step { square_file(mv.start) + 1 } else { 0 };
        self.zobrist_key ^= zobrist::en_passant_file_key(self.en_passant_file);

        let old_rights = self.castling_rights;
        self.update_castling_rights(mv);
        if self.castling_rights != old_rights {
            self.zobrist_key ^=
                zobrist::castling_key(old_rights) ^ zobrist::castling_key(self.castling_rights);
        }

        self.squares[mv.end as usize] = piece;
        self.squares[mv.start as usize] = EMPTY;
        self.zobrist_key ^=
            zobrist::piece_square_key(piece, mv.start) ^ zobrist::piece_square_key(piece, mv.end);

        match mv.kind {
            MoveKind::EnPassant => {
                let captured_square = if mover == Color::Light { mv.end - 8 } else { mv.end + 8 };
                let captured_pawn = self.squares[captured_square as usize];
                self.squares[captured_square as usize] = EMPTY;
                self.zobrist_key ^= zobrist::piece_square_key(captured_pawn, captured_square);
            }
            MoveKind::CastleQueenside => self.shift_castling_rook(mv.start - 4, mv.start - 1),
            MoveKind::CastleKingside => self.shift_castling_rook(mv.start + 3, mv.start + 1),
            kind => {
                if let Some(promoted_kind) = kind.promotion_kind() {
                    let promoted = promoted_kind.code(mover);
                    self.squares[mv.end as usize] = promoted;
                    self.zobrist_key ^= zobrist::piece_square_key(piece, mv.end)
                        ^ zobrist::piece_square_key(promoted, mv.end);
                }
            }
        }

        self.turn += 1;
        self.zobrist_key ^= zobrist::side_to_move_key();

        if absolute_type(piece) == 6 || captured != EMPTY {
            self.fifty_move_counter = FIFTY_MOVE_START;
        } else {
            self.fifty_move_counter = self.fifty_move_counter.saturating_sub(1);
        }

        self.moves = generator::generate_moves(self);
        self.update_game_state();

        if self.seen_positions.contains(&self.zobrist_key) {
            self.repeated_positions.insert(self.zobrist_key);
        } else {
            self.seen_positions.insert(self.zobrist_key);
        }
    }

    fn shift_castling_rook(&mut self, from: Square, to: Square) {
        let rook = self.squares[from as usize];
        self.squares[from as usize] = EMPTY;
        self.squares[to as usize] = rook;
        self.zobrist_key ^=
            zobrist::piece_square_key(rook, from) ^ zobrist::piece_square_key(rook, to);
    }

    /// Rights are forfeited when a king or rook home square is vacated or
    /// its occupant captured.
    fn update_castling_rights(&mut self, mv: Move) {
        for square in [mv.start, mv.end] {
            self.castling_rights |= match square {
                0 => CASTLE_LIGHT_QUEENSIDE_LOST,
                4 => CASTLE_LIGHT_QUEENSIDE_LOST | CASTLE_LIGHT_KINGSIDE_LOST,
                7 => CASTLE_LIGHT_KINGSIDE_LOST,
                56 => CASTLE_DARK_QUEENSIDE_LOST,
                60 => CASTLE_DARK_QUEENSIDE_LOST | CASTLE_DARK_KINGSIDE_LOST,
                63 => CASTLE_DARK_KINGSIDE_LOST,
                _ => 0,
            };
        }
    }

    /// Unwind the most recent move. Returns false when no move has been
    /// applied.
    pub fn undo_move(&mut self) -> bool {
        let Some(undo) = self.undo_stack.pop() else {
            return false;
        };

        // A third-occurrence position inserted nothing into the repetition
        // sets, so a repetition draw unwinds without removing anything.
        if self.outcome != GameOutcome::RepetitionDraw {
            if !self.repeated_positions.remove(&self.zobrist_key) {
                self.seen_positions.remove(&self.zobrist_key);
            }
        }

        let mv = undo.mv;
        self.squares[mv.start as usize] = undo.moved_piece;
        self.squares[mv.end as usize] = undo.captured_piece;

        let light_moved = is_light_piece(undo.moved_piece);
        match mv.kind {
            MoveKind::EnPassant => {
                let captured_square = if light_moved { mv.end - 8 } else { mv.end + 8 };
                let pawn_color = if light_moved { Color::Dark } else { Color::Light };
                self.squares[captured_square as usize] = PieceKind::Pawn.code(pawn_color);
            }
            MoveKind::CastleQueenside => {
                self.squares[mv.start as usize - 4] = self.squares[mv.start as usize - 1];
                self.squares[mv.start as usize - 1] = EMPTY;
            }
            MoveKind::CastleKingside => {
                self.squares[mv.start as usize + 3] = self.squares[mv.start as usize + 1];
                self.squares[mv.start as usize + 1] = EMPTY;
            }
            _ => {}
        }

        self.turn -= 1;
        self.castling_rights = undo.prev_castling_rights;
        self.en_passant_file = undo.prev_en_passant_file;
        self.fifty_move_counter = undo.prev_fifty_move_counter;
        self.zobrist_key = undo.prev_zobrist_key;
        self.outcome = GameOutcome::InProgress;

        self.moves = generator::generate_moves(self);
        true
    }

    /// Settle the game outcome for the freshly reached position. Ordering
    /// matters: repetition outranks mate and stalemate, which outrank the
    /// fifty-move rule.
    fn update_game_state(&mut self) {
        if self.repeated_positions.contains(&self.zobrist_key) {
            self.outcome = GameOutcome::RepetitionDraw;
            return;
        }
        if self.moves.is_empty() {
            self.outcome = if self.is_check {
                match self.side_to_move() {
                    Color::Light => GameOutcome::DarkWin,
                    Color::Dark => GameOutcome::LightWin,
                }
            } else {
                GameOutcome::Stalemate
            };
            return;
        }
        self.outcome = if self.fifty_move_counter == 0 {
            GameOutcome::FiftyMoveDraw
        } else {
            GameOutcome::InProgress
        };
    }
}

/// Applies a move on construction and is guaranteed to undo it on drop, so
/// search recursion cannot leave the position altered on any exit path.
pub struct MoveScope<'a> {
    position: &'a mut Position,
}

impl<'a> MoveScope<'a> {
    pub fn apply(position: &'a mut Position, mv: Move) -> Self {
        position.make_move(mv);
        MoveScope { position }
    }
}

impl Deref for MoveScope<'_> {
    type Target = Position;

    fn deref(&self) -> &Position {
        self.position
    }
}

impl DerefMut for MoveScope<'_> {
    fn deref_mut(&mut self) -> &mut Position {
        self.position
    }
}

impl Drop for MoveScope<'_> {
    fn drop(&mut self) {
        let undone = self.position.undo_move();
        debug_assert!(undone, "a scoped move should always unwind");
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn make_then_undo_restores_everything() {
        let mut position = Position::new_game();
        let baseline_key = position.zobrist_key;
        let baseline_squares = position.squares;
        let baseline_rights = position.castling_rights;

        // e4 c5 Nf3, then unwind all three.
        for (start, end) in [(12u8, 28u8), (50, 34), (6, 21)] {
            let mv = position
                .find_move(start, end, None)
                .expect("opening moves should be legal");
            position.make_move(mv);
        }
        assert_ne!(position.zobrist_key, baseline_key);

        assert!(position.undo_move());
        assert!(position.undo_move());
        assert!(position.undo_move());
        assert!(!position.undo_move());

        assert_eq!(position.zobrist_key, baseline_key);
        assert_eq!(position.squares, baseline_squares);
        assert_eq!(position.castling_rights, baseline_rights);
        assert_eq!(position.turn, 0);
        assert_eq!(position.outcome, GameOutcome::InProgress);
    }

    #[test]
    fn move_scope_unwinds_on_drop() {
        let mut position = Position::new_game();
        let baseline_key = position.zobrist_key;
        let mv = position.find_move(12, 28, None).expect("e4 should be legal");
        {
            let scope = MoveScope::apply(&mut position, mv);
            assert_ne!(scope.zobrist_key, baseline_key);
        }
        assert_eq!(position.zobrist_key, baseline_key);
    }

    #[test]
    fn fools_mate_is_a_dark_win() {
        let mut position = Position::new_game();
        for (start, end) in [(13u8, 21u8), (52, 36), (14, 30), (59, 31)] {
            let mv = position
                .find_move(start, end, None)
                .expect("fools mate moves should be legal");
            position.make_move(mv);
        }
        assert_eq!(position.outcome, GameOutcome::DarkWin);
        assert!(position.is_check);
        assert!(position.moves.is_empty());
    }

    #[test]
    fn threefold_repetition_draws_on_the_third_occurrence() {
        let mut position = Position::new_game();
        let shuffle = [(6u8, 21u8), (62, 45), (21, 6), (45, 62)];
        for cycle in 0..2 {
            for (start, end) in shuffle {
                let mv = position
                    .find_move(start, end, None)
                    .expect("knight shuffle should be legal");
                position.make_move(mv);
            }
            if cycle == 0 {
                assert_eq!(position.outcome, GameOutcome::InProgress);
            }
        }
        assert_eq!(position.outcome, GameOutcome::RepetitionDraw);
    }

    #[test]
    fn fifty_move_counter_reaches_a_draw() {
        let mut position = Position::from_fen("8/8/8/8/8/4k3/8/4K2R w - - 99 60")
            .expect("endgame fen should parse");
        assert_eq!(position.fifty_move_counter, 1);
        let mv = position.find_move(7, 15, None).expect("Rh2 should be legal");
        position.make_move(mv);
        assert_eq!(position.outcome, GameOutcome::FiftyMoveDraw);
    }

    #[test]
    fn promotion_lookup_requires_a_piece() {
        let mut position = Position::from_fen("8/P5k1/8/8/8/8/8/K7 w - - 0 1")
            .expect("promotion fen should parse");
        assert_eq!(
            position.find_move(48, 56, None),
            Err(MoveLookupError::AmbiguousPromotion)
        );
        let mv = position
            .find_move(48, 56, Some(PieceKind::Queen))
            .expect("queen promotion should be legal");
        assert_eq!(mv.kind, MoveKind::PromoteQueen);
        position.make_move(mv);
        assert_eq!(
            position.squares[56],
            PieceKind::Queen.code(Color::Light)
        );
        assert!(position.undo_move());
        assert_eq!(position.squares[48], PieceKind::Pawn.code(Color::Light));
        assert_eq!(position.squares[56], EMPTY);
    }

    #[test]
    fn castling_moves_the_rook_and_unwinds() {
        let mut position = Position::from_fen("r3k2r/8/8/8/8/8/8/R3K2R w KQkq - 0 1")
            .expect("castling fen should parse");
        let mv = position
            .find_move(4, 6, None)
            .expect("kingside castle should be legal");
        assert_eq!(mv.kind, MoveKind::CastleKingside);
        position.make_move(mv);
        assert_eq!(position.squares[6], PieceKind::King.code(Color::Light));
        assert_eq!(position.squares[5], PieceKind::Rook.code(Color::Light));
        assert_eq!(position.squares[7], EMPTY);
        assert!(position.castling_rights & CASTLE_LIGHT_KINGSIDE_LOST != 0);
        assert!(position.undo_move());
        assert_eq!(position.squares[4], PieceKind::King.code(Color::Light));
        assert_eq!(position.squares[7], PieceKind::Rook.code(Color::Light));
        assert_eq!(position.castling_rights, 0);
    }
}
