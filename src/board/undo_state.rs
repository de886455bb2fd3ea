//! Per-move reversal records for the position's undo stack.

use crate::board::chess_types::{CastlingRights, Move, PieceCode};

/// Everything `undo_move` needs to exactly invert one `make_move`.
///
/// The position owns a stack of these; applied [`Move`]s stay small value
/// types and carry no board history of their own.
#[derive(Debug, Clone, Copy)]
pub struct UndoState {
    pub mv: Move,
    pub moved_piece: PieceCode,
    pub captured_piece: PieceCode,

    pub prev_castling_rights: CastlingRights,
    pub prev_en_passant_file: u8,
    pub prev_fifty_move_counter: u8,
    pub prev_zobrist_key: u64,
}
