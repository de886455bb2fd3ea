//! Heuristic move ordering for alpha-beta search.
//!
//! Good orderings produce early cutoffs, so captures are pushed to the
//! front, split into winning and losing by whether the destination can be
//! recaptured, and promotions outrank everything but winning captures.
//! Quiet moves are ranked by their piece-square-table delta, discounted
//! when the destination square is threatened by the opponent.

use std::cmp::Reverse;

use crate::board::bitboard::bitboard_contains;
use crate::board::chess_types::{simplified_material_value, Move, MoveKind, EMPTY};
use crate::board::position::Position;
use crate::search::evaluation::{game_phase, piece_square_bonus};

const CAPTURE_BASE: i32 = 10_000;
const WINNING_CAPTURE_BIAS: i32 = 800_000;
const LOSING_CAPTURE_BIAS: i32 = 200_000;
const PROMOTION_BIAS: i32 = 600_000;

const PAWN_ATTACKED_PENALTY: i32 = 50;
const COVERED_SQUARE_PENALTY: i32 = 25;

/// The current legal moves, best guess first. Ties keep generation order,
/// so the ordering is deterministic.
pub fn ordered_moves(position: &Position) -> Vec<Move> {
    let opponent = position.side_to_move().opposite();
    let threats = Threats {
        // Coverage counts defended pieces, so it decides recaptures; the
        // attack bitboard decides whether an empty square is reachable.
        coverage: position.coverage[opponent.index()],
        attacks: position.attacked_by[opponent.index()],
        pawn_attacks: position.pawn_attacks[opponent.index()],
    };
    let interp = game_phase(position);

    let mut scored: Vec<(Move, i32)> = position
        .moves
        .iter()
        .map(|&mv| (mv, score_move(position, mv, &threats, interp)))
        .collect();
    scored.sort_by_key(|&(_, score)| Reverse(score));
    scored.into_iter().map(|(mv, _)| mv).collect()
}

struct Threats {
    coverage: u64,
    attacks: u64,
    pawn_attacks: u64,
}

fn score_move(position: &Position, mv: Move, threats: &Threats, interp: f64) -> i32 {
    let mut score = 0;
    let piece = position.squares[mv.start as usize];
    let captured = match mv.kind {
        // The en-passant victim is not on the destination square.
        MoveKind::EnPassant => 1,
        _ => simplified_material_value(position.squares[mv.end as usize]),
    };

    if captured != 0 || position.squares[mv.end as usize] != EMPTY {
        score += CAPTURE_BASE;
        let material_delta = captured - simplified_material_value(piece);
        if bitboard_contains(threats.coverage, mv.end) && material_delta < 0 {
            score += LOSING_CAPTURE_BIAS + material_delta;
        } else {
            score += WINNING_CAPTURE_BIAS + material_delta;
        }
    } else {
        let delta = piece_square_bonus(piece, mv.end, interp)
            - piece_square_bonus(piece, mv.start, interp);
        score += delta.round() as i32;

        if bitboard_contains(threats.pawn_attacks, mv.end) {
            score -= PAWN_ATTACKED_PENALTY;
        } else if bitboard_contains(threats.attacks, mv.end) {
            score -= COVERED_SQUARE_PENALTY;
        }
    }

    if mv.kind.is_promotion() {
        score += PROMOTION_BIAS;
    }

    score
}

#[cfg(test)]
mod tests {
    use super::ordered_moves;
    use crate::board::chess_types::MoveKind;
    use crate::board::position::Position;

    #[test]
    fn winning_capture_comes_first() {
        // Light pawn on e4 can take the dark queen on d5.
        let position = Position::from_fen("4k3/8/8/3q4/4P3/8/8/4K3 w - - 0 1")
            .expect("fen should parse");
        let moves = ordered_moves(&position);
        assert_eq!(moves[0].start, 28);
        assert_eq!(moves[0].end, 35);
    }

    #[test]
    fn promotion_outranks_quiet_moves() {
        let position = Position::from_fen("8/P5k1/8/8/8/8/8/K7 w - - 0 1")
            .expect("fen should parse");
        let moves = ordered_moves(&position);
        assert!(moves[0].kind.is_promotion());
        assert_eq!(moves[0].kind, MoveKind::PromoteQueen);
    }

    #[test]
    fn ordering_is_a_permutation_of_the_legal_moves() {
        let position = Position::new_game();
        let moves = ordered_moves(&position);
        assert_eq!(moves.len(), position.moves.len());
        for mv in &position.moves {
            assert!(moves.contains(mv));
        }
    }
}
