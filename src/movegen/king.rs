//! King move generation, including castling candidates. Castle legality
//! (check and attacked transit squares) is settled later by the filter in
//! the generator.

use crate::board::chess_types::{
    is_light_piece, Color, Move, MoveKind, PieceKind, Square, EMPTY,
    CASTLE_DARK_KINGSIDE_LOST, CASTLE_DARK_QUEENSIDE_LOST, CASTLE_LIGHT_KINGSIDE_LOST,
    CASTLE_LIGHT_QUEENSIDE_LOST,
};
use crate::board::position::Position;
use crate::movegen::generator::GenScratch;
use crate::movegen::sliding::{generate_line_moves, DIAGONAL_OFFSETS, ORTHOGONAL_OFFSETS};

pub fn generate_king_moves(position: &Position, square: Square, scratch: &mut GenScratch) {
    generate_line_moves(position, square, 1, &ORTHOGONAL_OFFSETS, scratch);
    generate_line_moves(position, square, 1, &DIAGONAL_OFFSETS, scratch);
    generate_castle_moves(position, square, scratch);
}

fn generate_castle_moves(position: &Position, square: Square, scratch: &mut GenScratch) {
    let piece = position.squares[square as usize];
    let color = if is_light_piece(piece) { Color::Light } else { Color::Dark };
    let (home_square, base, queenside_lost, kingside_lost) = match color {
        Color::Light => (4, 0u8, CASTLE_LIGHT_QUEENSIDE_LOST, CASTLE_LIGHT_KINGSIDE_LOST),
        Color::Dark => (60, 56u8, CASTLE_DARK_QUEENSIDE_LOST, CASTLE_DARK_KINGSIDE_LOST),
    };
    if square != home_square {
        return;
    }

    let rook = PieceKind::Rook.code(color);
    let squares = &position.squares;

    if position.castling_rights & queenside_lost == 0
        && squares[base as usize] == rook
        && squares[base as usize + 1] == EMPTY
        && squares[base as usize + 2] == EMPTY
        && squares[base as usize + 3] == EMPTY
    {
        scratch.push(Move::with_kind(square, square - 2, MoveKind::CastleQueenside));
    }

    if position.castling_rights & kingside_lost == 0
        && squares[base as usize + 7] == rook
        && squares[base as usize + 5] == EMPTY
        && squares[base as usize + 6] == EMPTY
    {
        scratch.push(Move::with_kind(square, square + 2, MoveKind::CastleKingside));
    }
}
