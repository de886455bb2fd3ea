//! Pawn move generation: pushes, double steps, captures, promotions, and
//! en passant.

use crate::board::chess_types::{
    is_light_piece, square_file, square_rank, Move, MoveKind, Square, EMPTY,
};
use crate::board::position::Position;
use crate::movegen::generator::GenScratch;

const PROMOTION_KINDS: [MoveKind; 4] = [
    MoveKind::PromoteQueen,
    MoveKind::PromoteRook,
    MoveKind::PromoteBishop,
    MoveKind::PromoteKnight,
];

fn push_pawn_advance(scratch: &mut GenScratch, start: Square, end: Square) {
    if square_rank(end) == 0 || square_rank(end) == 7 {
        for kind in PROMOTION_KINDS {
            scratch.push(Move::with_kind(start, end, kind));
        }
    } else {
        scratch.push(Move::new(start, end));
    }
}

pub fn generate_pawn_moves(position: &Position, square: Square, scratch: &mut GenScratch) {
    let piece = position.squares[square as usize];
    let mover_is_light = is_light_piece(piece);
    let direction: i16 = if mover_is_light { 8 } else { -8 };
    let home_rank = if mover_is_light { 1 } else { 6 };
    let en_passant_rank = if mover_is_light { 5 } else { 2 };
    let file = square_file(square) as i16;

    // Forward pushes never attack anything, so they stay out of coverage.
    let one_ahead = square as i16 + direction;
    if (0..64).contains(&one_ahead) && position.squares[one_ahead as usize] == EMPTY {
        push_pawn_advance(scratch, square, one_ahead as Square);

        if square_rank(square) == home_rank {
            let two_ahead = one_ahead + direction;
            if position.squares[two_ahead as usize] == EMPTY {
                scratch.push(Move::new(square, two_ahead as Square));
            }
        }
    }

    // Diagonal squares are always covered, capture or not.
    for file_delta in [-1i16, 1] {
        if !(0..8).contains(&(file + file_delta)) {
            continue;
        }
        let target = square as i16 + direction + file_delta;
        if !(0..64).contains(&target) {
            continue;
        }

        let target_sq = target as Square;
        scratch.cover(mover_is_light, target_sq);
        scratch.cover_pawn(mover_is_light, target_sq);

        let occupant = position.squares[target as usize];
        if occupant != EMPTY {
            if is_light_piece(occupant) != mover_is_light {
                push_pawn_advance(scratch, square, target_sq);
            }
        } else if position.en_passant_file != 0
            && square_file(target_sq) == position.en_passant_file - 1
            && square_rank(target_sq) == en_passant_rank
        {
            scratch.push(Move::with_kind(square, target_sq, MoveKind::EnPassant));
        }
    }
}
