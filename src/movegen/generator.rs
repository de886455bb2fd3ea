//! Full legal move generation for the side to move.
//!
//! Generation is a single pass over the board that produces pseudo-legal
//! moves for *both* colors at once, then filters the side to move's moves
//! against check, pin, and king-safety constraints. All derived position
//! state (occupancy, attack and coverage bitboards, ray masks, mobility
//! tallies) is rebuilt from scratch on every call; nothing is maintained
//! incrementally.

use crate::board::bitboard::{bitboard_contains, square_mask};
use crate::board::chess_types::{
    absolute_type, piece_color, simplified_material_value, square_file, square_rank, Color, Move,
    MoveKind, Square, EMPTY,
};
use crate::board::position::Position;
use crate::movegen::{king, knight, pawn, sliding};

/// Pseudo-legal move counts tallied during generation, split so the
/// evaluator can exclude queen mobility.
#[derive(Debug, Default, Clone, Copy)]
pub struct MobilityCounters {
    pub friendly_all: i32,
    pub friendly_queen: i32,
    pub opponent_all: i32,
    pub opponent_queen: i32,
}

/// Accumulator the per-piece generators write into.
pub struct GenScratch {
    pub moves: Vec<Move>,
    /// Every square a color's pieces reach, defended own pieces and empty
    /// pawn-capture squares included. Indexed by `Color::index`.
    pub coverage: [u64; 2],
    /// Pawn diagonal coverage only.
    pub pawn_attacks: [u64; 2],
}

impl GenScratch {
    fn new() -> Self {
        GenScratch {
            moves: Vec::with_capacity(64),
            coverage: [0; 2],
            pawn_attacks: [0; 2],
        }
    }

    #[inline]
    pub fn push(&mut self, mv: Move) {
        self.moves.push(mv);
    }

    #[inline]
    pub fn cover(&mut self, mover_is_light: bool, square: Square) {
        self.coverage[if mover_is_light { 0 } else { 1 }] |= square_mask(square);
    }

    #[inline]
    pub fn cover_pawn(&mut self, mover_is_light: bool, square: Square) {
        self.pawn_attacks[if mover_is_light { 0 } else { 1 }] |= square_mask(square);
    }
}

/// Rebuild all derived state on `position` and return the legal moves for
/// the side to move. An empty result with `insufficient_material` set means
/// the position is a dead draw, not that the side is mated or stalemated.
pub fn generate_moves(position: &mut Position) -> Vec<Move> {
    position.reset_derived_state();
    scan_occupancy(position);

    let mut scratch = GenScratch::new();
    for square in 0..64u8 {
        match absolute_type(position.squares[square as usize]) {
            1 => king::generate_king_moves(position, square, &mut scratch),
            2 => sliding::generate_queen_moves(position, square, &mut scratch),
            3 => sliding::generate_rook_moves(position, square, &mut scratch),
            4 => sliding::generate_bishop_moves(position, square, &mut scratch),
            5 => knight::generate_knight_moves(position, square, &mut scratch),
            6 => pawn::generate_pawn_moves(position, square, &mut scratch),
            _ => {}
        }
    }

    build_attack_bitboards(position, &scratch);
    position.coverage = scratch.coverage;
    position.pawn_attacks = scratch.pawn_attacks;

    let us = position.side_to_move();
    let king_square = position.king_square(us);
    let masks =
        crate::movegen::masks::analyze_slider_rays(&position.squares, king_square, us);
    position.pin_mask = masks.pin_mask;
    position.check_mask = masks.check_mask;
    position.king_blocker_mask = masks.king_blocker_mask;

    detect_checkers(position, &scratch, king_square, us);

    if dead_material(position) {
        position.insufficient_material = true;
        return Vec::new();
    }

    filter_legal(position, scratch.moves, king_square, us)
}

fn scan_occupancy(position: &mut Position) {
    for square in 0..64u8 {
        let piece = position.squares[square as usize];
        let Some(color) = piece_color(piece) else { continue };
        position.occupancy_by_color[color.index()] |= square_mask(square);
        if absolute_type(piece) == 1 {
            match color {
                Color::Light => position.light_king = square,
                Color::Dark => position.dark_king = square,
            }
        }
    }
    position.occupancy =
        position.occupancy_by_color[0] | position.occupancy_by_color[1];
}

/// Attack bitboards hold the destinations of generated moves, minus pawn
/// forward pushes: a pawn advance occupies its destination but never
/// attacks it.
fn build_attack_bitboards(position: &mut Position, scratch: &GenScratch) {
    for mv in &scratch.moves {
        let piece = position.squares[mv.start as usize];
        if absolute_type(piece) == 6 && square_file(mv.start) == square_file(mv.end) {
            continue;
        }
        let Some(color) = piece_color(piece) else { continue };
        position.attacked_by[color.index()] |= square_mask(mv.end);
    }
}

/// A checker is any enemy piece with a pseudo-legal move onto the friendly
/// king square. Attacker squares are deduplicated so a promotion fan does
/// not count one pawn four times.
fn detect_checkers(position: &mut Position, scratch: &GenScratch, king_square: Square, us: Color) {
    let mut counted = 0u64;
    for mv in &scratch.moves {
        if mv.end != king_square {
            continue;
        }
        if piece_color(position.squares[mv.start as usize]) != Some(us.opposite()) {
            continue;
        }
        if bitboard_contains(counted, mv.start) {
            continue;
        }
        counted |= square_mask(mv.start);
        position.check_state += 1;
        position.checker = Some(mv.start);
    }
    position.is_check = position.check_state > 0;
}

/// Neither side can force mate once all pawns are gone and each side holds
/// at most a minor piece's worth of material.
fn dead_material(position: &Position) -> bool {
    let mut totals = [0i32; 2];
    for &piece in position.squares.iter() {
        let Some(color) = piece_color(piece) else { continue };
        if absolute_type(piece) == 6 {
            return false;
        }
        totals[color.index()] += simplified_material_value(piece);
    }
    totals[0] <= 3 && totals[1] <= 3
}

fn filter_legal(
    position: &mut Position,
    pseudo: Vec<Move>,
    king_square: Square,
    us: Color,
) -> Vec<Move> {
    let opponent = us.opposite();
    let king_invalid = position.coverage[opponent.index()]
        | position.check_mask
        | position.king_blocker_mask;
    let king_file = square_file(king_square);
    let king_rank = square_rank(king_square);

    let mut legal = Vec::with_capacity(pseudo.len());
    for mv in pseudo {
        let piece = position.squares[mv.start as usize];
        let absolute = absolute_type(piece);

        if piece_color(piece) != Some(us) {
            position.mobility.opponent_all += 1;
            if absolute == 2 {
                position.mobility.opponent_queen += 1;
            }
            continue;
        }

        if absolute == 1 {
            if bitboard_contains(king_invalid, mv.end) {
                continue;
            }
        } else if mv.kind == MoveKind::EnPassant {
            // An en-passant capture clears two squares at once, which the
            // pin and check masks cannot express (two blockers can sit on
            // one ray, or the checker can die off-square). Simulate it.
            let mut board = position.squares;
            board[mv.start as usize] = EMPTY;
            board[mv.end as usize] = piece;
            let captured_square = match us {
                Color::Light => mv.end - 8,
                Color::Dark => mv.end + 8,
            };
            board[captured_square as usize] = EMPTY;
            if crate::movegen::masks::square_attacked(&board, king_square, opponent) {
                continue;
            }
        } else {
            // Only the king can answer a double check.
            if position.check_state == 2 {
                continue;
            }
            if position.check_state == 1
                && !bitboard_contains(position.check_mask, mv.end)
                && position.checker != Some(mv.end)
            {
                continue;
            }
            if bitboard_contains(position.pin_mask, mv.start) {
                if !bitboard_contains(position.pin_mask, mv.end) {
                    continue;
                }
                // Several pins union into one mask; the direction buckets
                // relative to the king keep a piece on its own ray.
                let same_ray = square_file(mv.start).cmp(&king_file)
                    == square_file(mv.end).cmp(&king_file)
                    && square_rank(mv.start).cmp(&king_rank)
                        == square_rank(mv.end).cmp(&king_rank);
                if !same_ray {
                    continue;
                }
            }
        }

        match mv.kind {
            MoveKind::CastleQueenside | MoveKind::CastleKingside => {
                if position.check_state != 0 {
                    continue;
                }
                let transit = if mv.kind == MoveKind::CastleQueenside {
                    mv.start - 1
                } else {
                    mv.start + 1
                };
                if bitboard_contains(position.coverage[opponent.index()], transit) {
                    continue;
                }
            }
            _ => {}
        }

        if simplified_material_value(position.squares[mv.end as usize]) >= 3
            || mv.kind.is_promotion()
        {
            position.major_event = true;
        }

        position.mobility.friendly_all += 1;
        if absolute == 2 {
            position.mobility.friendly_queen += 1;
        }
        legal.push(mv);
    }

    legal
}
