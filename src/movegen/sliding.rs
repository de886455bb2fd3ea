//! Ray-walking move generation shared by rook, bishop, queen, and king.

use crate::board::chess_types::{is_light_piece, Move, Square, EMPTY};
use crate::board::position::Position;
use crate::movegen::generator::GenScratch;

/// Index deltas for rank/file rays.
pub const ORTHOGONAL_OFFSETS: [i8; 4] = [-1, 8, 1, -8];
/// Index deltas for diagonal rays.
pub const DIAGONAL_OFFSETS: [i8; 4] = [-9, 9, 7, -7];

/// Walk each offset direction up to `max_length` steps, stopping at board
/// edges (wraparound guarded by file discontinuity) and at the first
/// occupied square. Every reached square is added to the mover's coverage;
/// moves are generated onto empty and enemy-occupied squares.
pub fn generate_line_moves(
    position: &Position,
    square: Square,
    max_length: u8,
    offsets: &[i8],
    scratch: &mut GenScratch,
) {
    let piece = position.squares[square as usize];
    let mover_is_light = is_light_piece(piece);

    for &offset in offsets {
        let mut prev = square as i16;

        for _ in 0..max_length {
            let next = prev + i16::from(offset);
            if !(0..64).contains(&next) {
                break;
            }
            // A single ray step changes file by at most one; a larger jump
            // means the walk wrapped around a board edge.
            if (next % 8 - prev % 8).abs() > 1 {
                break;
            }

            let next_sq = next as Square;
            scratch.cover(mover_is_light, next_sq);

            let occupant = position.squares[next as usize];
            if occupant != EMPTY {
                if is_light_piece(occupant) != mover_is_light {
                    scratch.push(Move::new(square, next_sq));
                }
                break;
            }

            scratch.push(Move::new(square, next_sq));
            prev = next;
        }
    }
}

/// Full-length rook rays.
pub fn generate_rook_moves(position: &Position, square: Square, scratch: &mut GenScratch) {
    generate_line_moves(position, square, 7, &ORTHOGONAL_OFFSETS, scratch);
}

/// Full-length bishop rays.
pub fn generate_bishop_moves(position: &Position, square: Square, scratch: &mut GenScratch) {
    generate_line_moves(position, square, 7, &DIAGONAL_OFFSETS, scratch);
}

/// Queen rays are the union of the rook and bishop walks.
pub fn generate_queen_moves(position: &Position, square: Square, scratch: &mut GenScratch) {
    generate_line_moves(position, square, 7, &ORTHOGONAL_OFFSETS, scratch);
    generate_line_moves(position, square, 7, &DIAGONAL_OFFSETS, scratch);
}
