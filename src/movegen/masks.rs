//! Slider-ray analysis against the friendly king: absolute pins, check
//! rays, and the escape square hidden behind the king.
//!
//! For every enemy slider aligned with the king, the ray between the two is
//! walked once. Zero interposed pieces means the slider gives check; exactly
//! one means that piece is pinned; two or more blockers defuse the ray.

use crate::board::bitboard::square_mask;
use crate::board::chess_types::{
    absolute_type, piece_color, square_file, square_rank, Color, PieceCode, Square,
};

#[derive(Debug, Default, Clone, Copy)]
pub struct RayMasks {
    /// Union of all pin rays, including the pinning slider and the king.
    pub pin_mask: u64,
    /// Squares strictly between a checking slider and the king.
    pub check_mask: u64,
    /// The square one step beyond the king on a checking ray. The king may
    /// not retreat there even though the slider does not reach it yet.
    pub king_blocker_mask: u64,
}

/// Whether `attacker` attacks `target` on the given board. Slow full scan;
/// used only for the rare cases the bitboard masks cannot settle, such as
/// en-passant captures that remove two pieces from one rank.
pub fn square_attacked(squares: &[PieceCode; 64], target: Square, attacker: Color) -> bool {
    let target_file = square_file(target) as i8;
    let target_rank = square_rank(target) as i8;
    let at = |file: i8, rank: i8| squares[(rank * 8 + file) as usize];
    let owned = |piece: PieceCode| piece_color(piece) == Some(attacker);

    // Knights.
    const KNIGHT_HOPS: [(i8, i8); 8] = [
        (-2, -1), (-2, 1), (-1, -2), (-1, 2), (1, -2), (1, 2), (2, -1), (2, 1),
    ];
    for (df, dr) in KNIGHT_HOPS {
        let (file, rank) = (target_file + df, target_rank + dr);
        if (0..8).contains(&file) && (0..8).contains(&rank) {
            let piece = at(file, rank);
            if owned(piece) && absolute_type(piece) == 5 {
                return true;
            }
        }
    }

    // Pawns attack toward the enemy side.
    let pawn_rank = match attacker {
        Color::Light => target_rank - 1,
        Color::Dark => target_rank + 1,
    };
    if (0..8).contains(&pawn_rank) {
        for df in [-1i8, 1] {
            let file = target_file + df;
            if (0..8).contains(&file) {
                let piece = at(file, pawn_rank);
                if owned(piece) && absolute_type(piece) == 6 {
                    return true;
                }
            }
        }
    }

    // Sliders and the enemy king, walking outward in each direction.
    const DIRECTIONS: [(i8, i8); 8] = [
        (-1, 0), (1, 0), (0, -1), (0, 1), (-1, -1), (-1, 1), (1, -1), (1, 1),
    ];
    for (df, dr) in DIRECTIONS {
        let orthogonal = df == 0 || dr == 0;
        let mut file = target_file + df;
        let mut rank = target_rank + dr;
        let mut distance = 1;
        while (0..8).contains(&file) && (0..8).contains(&rank) {
            let piece = at(file, rank);
            if piece != 0 {
                if owned(piece) {
                    let reaches = match absolute_type(piece) {
                        1 => distance == 1,
                        2 => true,
                        3 => orthogonal,
                        4 => !orthogonal,
                        _ => false,
                    };
                    if reaches {
                        return true;
                    }
                }
                break;
            }
            file += df;
            rank += dr;
            distance += 1;
        }
    }

    false
}

pub fn analyze_slider_rays(
    squares: &[PieceCode; 64],
    king_square: Square,
    defender: Color,
) -> RayMasks {
    let mut masks = RayMasks::default();
    let king_file = square_file(king_square) as i8;
    let king_rank = square_rank(king_square) as i8;

    for sq in 0..64u8 {
        let piece = squares[sq as usize];
        if piece_color(piece) != Some(defender.opposite()) {
            continue;
        }
        let absolute = absolute_type(piece);

        let file = square_file(sq) as i8;
        let rank = square_rank(sq) as i8;
        let file_delta = king_file - file;
        let rank_delta = king_rank - rank;

        let orthogonal = (file_delta == 0) != (rank_delta == 0);
        let diagonal = file_delta != 0 && file_delta.abs() == rank_delta.abs();
        let relevant = match absolute {
            2 => orthogonal || diagonal,
            3 => orthogonal,
            4 => diagonal,
            _ => false,
        };
        if !relevant {
            continue;
        }

        let step_file = file_delta.signum();
        let step_rank = rank_delta.signum();

        let mut ray = square_mask(sq);
        let mut between = 0u64;
        let mut blockers = 0u32;
        let mut walk_file = file + step_file;
        let mut walk_rank = rank + step_rank;
        while walk_file != king_file || walk_rank != king_rank {
            let walked = (walk_rank * 8 + walk_file) as Square;
            ray |= square_mask(walked);
            between |= square_mask(walked);
            if squares[walked as usize] != 0 {
                blockers += 1;
            }
            walk_file += step_file;
            walk_rank += step_rank;
        }
        ray |= square_mask(king_square);

        match blockers {
            0 => {
                masks.check_mask |= between;
                let behind_file = king_file + step_file;
                let behind_rank = king_rank + step_rank;
                if (0..8).contains(&behind_file) && (0..8).contains(&behind_rank) {
                    masks.king_blocker_mask |=
                        square_mask((behind_rank * 8 + behind_file) as Square);
                }
            }
            1 => masks.pin_mask |= ray,
            _ => {}
        }
    }

    masks
}
