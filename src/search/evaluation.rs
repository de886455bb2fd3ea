//! Static evaluation, always from light's perspective in centipawns.
//!
//! The score blends midgame and endgame piece-square tables by the
//! non-pawn material left on the board, then layers on mobility, pawn
//! structure, a trade incentive for the side that is ahead, mop-up terms
//! that walk the losing king to the edge, and king safety. All weights are
//! hand-tuned and deliberately kept as plain constants.

use crate::board::bitboard::flip_index;
use crate::board::chess_types::{
    absolute_type, is_light_piece, piece_color, simplified_material_value, square_file,
    square_rank, Color, GameOutcome, Move, PieceCode, EMPTY,
};
use crate::board::position::Position;

/// Mate scores are offset by the ply at which the mate was found so search
/// prefers the shortest path in and the longest path out.
pub const MATE_SCORE: i32 = 100_000;
pub const MATE_THRESHOLD: i32 = 90_000;

/// Simplified non-pawn material of one side with everything on the board:
/// queen 9, two rooks 10, two bishops 6, two knights 6.
const MAX_SIDE_MATERIAL: f64 = 31.0;
const MAX_TOTAL_MATERIAL: f64 = 62.0;

const MOBILITY_WEIGHT: f64 = 9.0;
const DOUBLED_PAWN_PENALTY: i32 = 35;
const ISOLATED_PAWN_PENALTY: i32 = 35;
const PASSED_PAWN_BONUS: i32 = 60;
const TRADE_WHEN_AHEAD_BONUS: f64 = 300.0;
const CASTLE_MOVE_BONUS: f64 = 50.0;

#[inline]
pub fn is_mate_score(score: i32) -> bool {
    score.abs() >= MATE_THRESHOLD
}

/// The first move of the line currently being searched. A couple of terms
/// (castling encouragement, king-activity amplification in the endgame)
/// reward the *decision* at the root rather than the resulting squares.
#[derive(Debug, Clone, Copy)]
pub struct RootMove {
    pub mv: Move,
    pub moved_piece: PieceCode,
}

struct MaterialTally {
    /// Simplified non-pawn totals per `Color::index`.
    non_pawn: [f64; 2],
    pawn_files: [[u8; 8]; 2],
}

impl MaterialTally {
    fn count(position: &Position) -> Self {
        let mut tally = MaterialTally {
            non_pawn: [0.0; 2],
            pawn_files: [[0u8; 8]; 2],
        };
        for square in 0..64u8 {
            let piece = position.squares[square as usize];
            let Some(color) = piece_color(piece) else { continue };
            if absolute_type(piece) == 6 {
                tally.pawn_files[color.index()][square_file(square) as usize] |=
                    1 << square_rank(square);
            } else {
                tally.non_pawn[color.index()] += f64::from(simplified_material_value(piece));
            }
        }
        tally
    }

    fn total(&self) -> f64 {
        self.non_pawn[0] + self.non_pawn[1]
    }
}

/// Midgame weight in `[0, 1]`: 1.0 with all non-pawn material on the
/// board, falling toward 0.0 as pieces come off.
pub fn game_phase(position: &Position) -> f64 {
    let mut total = 0.0;
    for &piece in position.squares.iter() {
        if piece != EMPTY && absolute_type(piece) != 6 {
            total += f64::from(simplified_material_value(piece));
        }
    }
    (total / MAX_TOTAL_MATERIAL).clamp(0.0, 1.0)
}

/// Phase-blended piece-square table bonus for one piece on one square,
/// base material value excluded. Used by move ordering for quiet deltas.
pub fn piece_square_bonus(piece: PieceCode, square: u8, interp: f64) -> f64 {
    let index = (absolute_type(piece) - 1) as usize;
    let table_square = if is_light_piece(piece) {
        flip_index(square) as usize
    } else {
        square as usize
    };
    let mg = f64::from(MG_TABLES[index][table_square]);
    let eg = f64::from(EG_TABLES[index][table_square]);
    interp * mg + (1.0 - interp) * eg
}

/// Evaluate from light's perspective. Decided games collapse to mate or
/// draw scores; `ply_from_root` pushes mates found deeper behind mates
/// found sooner.
pub fn evaluate(position: &Position, root_move: Option<RootMove>, ply_from_root: u8) -> i32 {
    match position.outcome {
        GameOutcome::LightWin => return MATE_SCORE - i32::from(ply_from_root),
        GameOutcome::DarkWin => return -(MATE_SCORE - i32::from(ply_from_root)),
        GameOutcome::Stalemate | GameOutcome::FiftyMoveDraw | GameOutcome::RepetitionDraw => {
            return 0
        }
        GameOutcome::InProgress => {}
    }

    let tally = MaterialTally::count(position);
    let interp = (tally.total() / MAX_TOTAL_MATERIAL).clamp(0.0, 1.0);

    let mut mg = 0i32;
    let mut eg = 0i32;
    for square in 0..64u8 {
        let piece = position.squares[square as usize];
        if piece == EMPTY {
            continue;
        }
        let sign = if is_light_piece(piece) { 1 } else { -1 };
        let index = (absolute_type(piece) - 1) as usize;
        let table_square = if is_light_piece(piece) {
            flip_index(square) as usize
        } else {
            square as usize
        };
        mg += sign * (MG_PIECE_VALUES[index] + MG_TABLES[index][table_square]);
        eg += sign * (EG_PIECE_VALUES[index] + EG_TABLES[index][table_square]);
    }

    let mut eval = interp * f64::from(mg) + (1.0 - interp) * f64::from(eg);

    // Mobility counts come out of the generator relative to the side to
    // move; queens are excluded so an early queen sortie is not rewarded.
    // Skipped in check, where the forced move count says nothing.
    if !position.is_check {
        let mobility = f64::from(
            (position.mobility.friendly_all - position.mobility.friendly_queen)
                - (position.mobility.opponent_all - position.mobility.opponent_queen),
        );
        let orientation = if position.side_to_move() == Color::Light { 1.0 } else { -1.0 };
        eval += orientation * mobility * MOBILITY_WEIGHT;
    }

    eval += f64::from(pawn_structure(
        &tally.pawn_files[Color::Light.index()],
        &tally.pawn_files[Color::Dark.index()],
        Color::Light,
    ));
    eval -= f64::from(pawn_structure(
        &tally.pawn_files[Color::Dark.index()],
        &tally.pawn_files[Color::Light.index()],
        Color::Dark,
    ));

    // When clearly ahead, reward every exchange that shrinks the
    // defender's army.
    let light_material = tally.non_pawn[Color::Light.index()];
    let dark_material = tally.non_pawn[Color::Dark.index()];
    if light_material > dark_material + 2.0 {
        eval += (MAX_SIDE_MATERIAL - dark_material) / MAX_SIDE_MATERIAL * TRADE_WHEN_AHEAD_BONUS;
    } else if dark_material > light_material + 2.0 {
        eval -= (MAX_SIDE_MATERIAL - light_material) / MAX_SIDE_MATERIAL * TRADE_WHEN_AHEAD_BONUS;
    }

    if interp < 0.4 {
        let endgame_weight = 1.0 - interp;
        eval += mop_up(position, Color::Light, &tally, root_move) * endgame_weight;
        eval -= mop_up(position, Color::Dark, &tally, root_move) * endgame_weight;
    }

    if interp > 0.3 {
        eval += king_safety(position, Color::Light) * interp;
        eval -= king_safety(position, Color::Dark) * interp;

        if let Some(root) = root_move {
            if root.mv.kind.is_castle() {
                // Sign follows whoever moved at the root of this line.
                let root_turn = position.turn - u16::from(ply_from_root);
                eval += CASTLE_MOVE_BONUS * if root_turn % 2 == 0 { 1.0 } else { -1.0 };
            }
        }
    }

    eval.round() as i32
}

/// Evaluation from the side to move's perspective, as negamax wants it.
pub fn relative_evaluate(
    position: &Position,
    root_move: Option<RootMove>,
    ply_from_root: u8,
) -> i32 {
    let score = evaluate(position, root_move, ply_from_root);
    if position.side_to_move() == Color::Light {
        score
    } else {
        -score
    }
}

/// Doubled and isolated pawns are penalized per file; a file whose front
/// pawn has no enemy pawn ahead of it on this or an adjacent file earns
/// the passed-pawn bonus.
fn pawn_structure(friendly: &[u8; 8], enemy: &[u8; 8], color: Color) -> i32 {
    let mut eval = 0;

    for file in 0..8usize {
        let structure = friendly[file];
        if structure == 0 {
            continue;
        }
        let pop = structure.count_ones() as i32;
        if pop > 1 {
            eval -= (pop - 1) * DOUBLED_PAWN_PENALTY;
        }

        let left = if file == 0 { 0 } else { friendly[file - 1] };
        let right = if file == 7 { 0 } else { friendly[file + 1] };
        if left == 0 && right == 0 {
            eval -= ISOLATED_PAWN_PENALTY;
        }

        let front_rank = match color {
            Color::Light => 7 - structure.leading_zeros() as u8,
            Color::Dark => structure.trailing_zeros() as u8,
        };
        let ahead_mask: u8 = match color {
            Color::Light => ((0xFFu16 << (front_rank + 1)) & 0xFF) as u8,
            Color::Dark => !(!0u8 << front_rank),
        };
        let enemy_left = if file == 0 { 0 } else { enemy[file - 1] };
        let enemy_right = if file == 7 { 0 } else { enemy[file + 1] };
        if (enemy[file] | enemy_left | enemy_right) & ahead_mask == 0 {
            eval += PASSED_PAWN_BONUS;
        }
    }

    eval
}

/// Push the defending king away from the centre and pull the attacking
/// king toward it. Only worth anything for the side with a clear material
/// lead, and amplified when the root move was a king move so the search
/// actually walks the king over.
fn mop_up(
    position: &Position,
    attacker: Color,
    tally: &MaterialTally,
    root_move: Option<RootMove>,
) -> f64 {
    let material = tally.non_pawn[attacker.index()];
    let opposition = tally.non_pawn[attacker.opposite().index()];
    if material < opposition + 2.0 {
        return 0.0;
    }

    let king = position.king_square(attacker);
    let enemy_king = position.king_square(attacker.opposite());

    let kx = f64::from(square_file(king));
    let ky = f64::from(square_rank(king));
    let ex = f64::from(square_file(enemy_king));
    let ey = f64::from(square_rank(enemy_king));

    // Enemy king distance from the centre, then king proximity.
    let mut score = ((3.0 - ex).max(ex - 4.0) + (3.0 - ey).max(ey - 4.0)) * 4.0;
    score += (14.0 - ((kx - ex).abs() + (ky - ey).abs())) * 10.0;

    if let Some(root) = root_move {
        if absolute_type(root.moved_piece) == 1 && opposition > 0.0 {
            score *= if material - opposition >= 5.0 && opposition <= 1.0 { 8.0 } else { 1.5 };
        }
    }

    score
}

/// Pawn-shield squares in front of a castled king, weighted toward the
/// centre file of the shield.
const PAWN_SHIELD: [[(u8, i32); 3]; 4] = [
    [(8, 4), (9, 7), (10, 4)],    // light queenside
    [(13, 4), (14, 7), (15, 4)],  // light kingside
    [(48, 4), (49, 7), (50, 4)],  // dark queenside
    [(53, 4), (54, 7), (55, 4)],  // dark kingside
];

fn king_safety(position: &Position, color: Color) -> f64 {
    let mut eval = 0i32;

    let king = position.king_square(color);
    let king_file = square_file(king);
    let king_rank = square_rank(king);

    if (2..=5).contains(&king_file) {
        // An uncastled king in the middle files; the d-file gets off
        // lighter since a queenside castle lands near it.
        eval -= if king_file == 3 { 15 } else { 70 };
    }
    let advanced = match color {
        Color::Light => king_rank >= 2,
        Color::Dark => king_rank <= 5,
    };
    if advanced {
        eval -= 90;
    }

    if (3..=5).contains(&king_file) {
        return f64::from(eval);
    }

    let shield_index = usize::from(king_file > 4) + 2 * color.index();
    let own_pawn = match color {
        Color::Light => 6,
        Color::Dark => 12,
    };
    let mut shield_penalty = 0i32;
    for (square, weight) in PAWN_SHIELD[shield_index] {
        if position.squares[square as usize] != own_pawn {
            shield_penalty += weight;
        }
    }
    // Squared so pushing several shield pawns hurts disproportionately.
    eval -= shield_penalty * shield_penalty;

    f64::from(eval)
}

// Value and table arrays are indexed by absolute piece type minus one:
// king, queen, rook, bishop, knight, pawn. Tables are written from light's
// visual perspective (first row = rank 8) and flipped for light pieces.
const MG_PIECE_VALUES: [i32; 6] = [0, 900, 500, 330, 320, 100];
const EG_PIECE_VALUES: [i32; 6] = [0, 910, 520, 330, 310, 120];

#[rustfmt::skip]
const KING_MG: [i32; 64] = [
    -30,-40,-40,-50,-50,-40,-40,-30,
    -30,-40,-40,-50,-50,-40,-40,-30,
    -30,-40,-40,-50,-50,-40,-40,-30,
    -30,-40,-40,-50,-50,-40,-40,-30,
    -20,-30,-30,-40,-40,-30,-30,-20,
    -10,-20,-20,-20,-20,-20,-20,-10,
     20, 20,  0,  0,  0,  0, 20, 20,
     20, 30, 10,  0,  0, 10, 30, 20,
];

#[rustfmt::skip]
const KING_EG: [i32; 64] = [
    -50,-40,-30,-20,-20,-30,-40,-50,
    -30,-20,-10,  0,  0,-10,-20,-30,
    -30,-10, 20, 30, 30, 20,-10,-30,
    -30,-10, 30, 40, 40, 30,-10,-30,
    -30,-10, 30, 40, 40, 30,-10,-30,
    -30,-10, 20, 30, 30, 20,-10,-30,
    -30,-30,  0,  0,  0,  0,-30,-30,
    -50,-30,-30,-30,-30,-30,-30,-50,
];

#[rustfmt::skip]
const QUEEN_TABLE: [i32; 64] = [
    -20,-10,-10, -5, -5,-10,-10,-20,
    -10,  0,  0,  0,  0,  0,  0,-10,
    -10,  0,  5,  5,  5,  5,  0,-10,
     -5,  0,  5,  5,  5,  5,  0, -5,
      0,  0,  5,  5,  5,  5,  0, -5,
    -10,  5,  5,  5,  5,  5,  0,-10,
    -10,  0,  5,  0,  0,  0,  0,-10,
    -20,-10,-10, -5, -5,-10,-10,-20,
];

#[rustfmt::skip]
const ROOK_TABLE: [i32; 64] = [
      0,  0,  0,  0,  0,  0,  0,  0,
      5, 10, 10, 10, 10, 10, 10,  5,
     -5,  0,  0,  0,  0,  0,  0, -5,
     -5,  0,  0,  0,  0,  0,  0, -5,
     -5,  0,  0,  0,  0,  0,  0, -5,
     -5,  0,  0,  0,  0,  0,  0, -5,
     -5,  0,  0,  0,  0,  0,  0, -5,
      0,  0,  0,  5,  5,  0,  0,  0,
];

#[rustfmt::skip]
const BISHOP_TABLE: [i32; 64] = [
    -20,-10,-10,-10,-10,-10,-10,-20,
    -10,  0,  0,  0,  0,  0,  0,-10,
    -10,  0,  5, 10, 10,  5,  0,-10,
    -10,  5,  5, 10, 10,  5,  5,-10,
    -10,  0, 10, 10, 10, 10,  0,-10,
    -10, 10, 10, 10, 10, 10, 10,-10,
    -10,  5,  0,  0,  0,  0,  5,-10,
    -20,-10,-10,-10,-10,-10,-10,-20,
];

#[rustfmt::skip]
const KNIGHT_TABLE: [i32; 64] = [
    -50,-40,-30,-30,-30,-30,-40,-50,
    -40,-20,  0,  0,  0,  0,-20,-40,
    -30,  0, 10, 15, 15, 10,  0,-30,
    -30,  5, 15, 20, 20, 15,  5,-30,
    -30,  0, 15, 20, 20, 15,  0,-30,
    -30,  5, 10, 15, 15, 10,  5,-30,
    -40,-20,  0,  5,  5,  0,-20,-40,
    -50,-40,-30,-30,-30,-30,-40,-50,
];

#[rustfmt::skip]
const PAWN_MG: [i32; 64] = [
      0,  0,  0,  0,  0,  0,  0,  0,
     50, 50, 50, 50, 50, 50, 50, 50,
     10, 10, 20, 30, 30, 20, 10, 10,
      5,  5, 10, 25, 25, 10,  5,  5,
      0,  0,  0, 20, 20,  0,  0,  0,
      5, -5,-10,  0,  0,-10, -5,  5,
      5, 10, 10,-20,-20, 10, 10,  5,
      0,  0,  0,  0,  0,  0,  0,  0,
];

#[rustfmt::skip]
const PAWN_EG: [i32; 64] = [
      0,  0,  0,  0,  0,  0,  0,  0,
     80, 80, 80, 80, 80, 80, 80, 80,
     50, 50, 50, 50, 50, 50, 50, 50,
     30, 30, 30, 30, 30, 30, 30, 30,
     15, 15, 15, 15, 15, 15, 15, 15,
      5,  5,  5,  5,  5,  5,  5,  5,
      0,  0,  0,  0,  0,  0,  0,  0,
      0,  0,  0,  0,  0,  0,  0,  0,
];

const MG_TABLES: [[i32; 64]; 6] = [
    KING_MG,
    QUEEN_TABLE,
    ROOK_TABLE,
    BISHOP_TABLE,
    KNIGHT_TABLE,
    PAWN_MG,
];

const EG_TABLES: [[i32; 64]; 6] = [
    KING_EG,
    QUEEN_TABLE,
    ROOK_TABLE,
    BISHOP_TABLE,
    KNIGHT_TABLE,
    PAWN_EG,
];
