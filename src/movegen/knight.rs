//! Knight move generation.

use crate::board::chess_types::{is_light_piece, square_file, Move, Square, EMPTY};
use crate::board::position::Position;
use crate::movegen::generator::GenScratch;

/// Index deltas for the eight knight hops, paired with the file delta of
/// each hop so edge wraparound can be rejected.
const KNIGHT_OFFSETS: [i8; 8] = [-17, -15, -10, -6, 6, 10, 15, 17];
const KNIGHT_FILE_DELTAS: [i8; 8] = [-1, 1, -2, 2, -2, 2, -1, 1];

pub fn generate_knight_moves(position: &Position, square: Square, scratch: &mut GenScratch) {
    let piece = position.squares[square as usize];
    let mover_is_light = is_light_piece(piece);
    let file = square_file(square) as i8;

    for (offset, file_delta) in KNIGHT_OFFSETS.iter().zip(KNIGHT_FILE_DELTAS.iter()) {
        let target = square as i16 + i16::from(*offset);
        if !(0..64).contains(&target) {
            continue;
        }
        let target_file = file + file_delta;
        if !(0..8).contains(&target_file) {
            continue;
        }

        let target_sq = target as Square;
        scratch.cover(mover_is_light, target_sq);

        let occupant = position.squares[target as usize];
        if occupant == EMPTY || is_light_piece(occupant) != mover_is_light {
            scratch.push(Move::new(square, target_sq));
        }
    }
}
