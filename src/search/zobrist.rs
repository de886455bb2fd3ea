//! Zobrist hashing support for fast position identity and repetition tracking.
//!
//! The keys are generated from a fixed seed so hashes are deterministic across
//! runs, which is useful for testing and debugging. The position maintains its
//! key incrementally; `compute_zobrist_key` is the from-scratch reference the
//! incremental path must agree with bit-for-bit.

use std::sync::OnceLock;

use crate::board::chess_types::{CastlingRights, Color, PieceCode, Square, EMPTY};
use crate::board::position::Position;

#[derive(Debug)]
struct ZobristTables {
    // [piece_code - 1][square]
    piece_square: [[u64; 64]; 12],
    castling: [u64; 16],
    // Index 0 means "no en-passant file" and contributes nothing.
    en_passant_file: [u64; 9],
    side_to_move: u64,
}

static TABLES: OnceLock<ZobristTables> = OnceLock::new();

#[inline]
fn tables() -> &'static ZobristTables {
    TABLES.get_or_init(build_tables)
}

fn build_tables() -> ZobristTables {
    let mut seed: u64 = 0x9E37_79B9_7F4A_7C15;

    let mut piece_square = [[0u64; 64]; 12];
    for piece in &mut piece_square {
        for sq in piece {
            *sq = next_random_u64(&mut seed);
        }
    }

    let mut castling = [0u64; 16];
    for key in &mut castling {
        *key = next_random_u64(&mut seed);
    }

    let mut en_passant_file = [0u64; 9];
    for (file, key) in en_passant_file.iter_mut().enumerate() {
        *key = if file == 0 {
            0
        } else {
            next_random_u64(&mut seed)
        };
    }

    let side_to_move = next_random_u64(&mut seed);

    ZobristTables {
        piece_square,
        castling,
        en_passant_file,
        side_to_move,
    }
}

#[inline]
fn next_random_u64(state: &mut u64) -> u64 {
    // splitmix64
    *state = state.wrapping_add(0x9E37_79B9_7F4A_7C15);
    let mut z = *state;
    z = (z ^ (z >> 30)).wrapping_mul(0xBF58_476D_1CE4_E5B9);
    z = (z ^ (z >> 27)).wrapping_mul(0x94D0_49BB_1331_11EB);
    z ^ (z >> 31)
}

/// Zobrist key for a `(piece code, square)` occupancy term.
#[inline]
pub fn piece_square_key(piece: PieceCode, square: Square) -> u64 {
    debug_assert!((1..=12).contains(&piece));
    tables().piece_square[(piece - 1) as usize][square as usize]
}

/// Zobrist contribution for a castling-rights mask (`0..=15`).
#[inline]
pub fn castling_key(castling_rights: CastlingRights) -> u64 {
    tables().castling[(castling_rights & 0x0F) as usize]
}

/// Zobrist contribution for an en-passant file field (`0` = none, zero key).
#[inline]
pub fn en_passant_file_key(file: u8) -> u64 {
    tables().en_passant_file[file as usize]
}

/// Side-to-move toggle key (xor in when dark is to move).
#[inline]
pub fn side_to_move_key() -> u64 {
    tables().side_to_move
}

/// Compute the full position key from scratch.
pub fn compute_zobrist_key(position: &Position) -> u64 {
    let mut key = 0u64;

    for square in 0..64u8 {
        let piece = position.squares[square as usize];
        if piece != EMPTY {
            key ^= piece_square_key(piece, square);
        }
    }

    key ^= castling_key(position.castling_rights);
    key ^= en_passant_file_key(position.en_passant_file);

    if position.side_to_move() == Color::Dark {
        key ^= side_to_move_key();
    }

    key
}

#[cfg(test)]
mod tests {
    use super::{compute_zobrist_key, en_passant_file_key};
    use crate::board::position::Position;

    #[test]
    fn starting_position_hash_is_deterministic() {
        let a = Position::new_game();
        let b = Position::new_game();
        assert_eq!(a.zobrist_key, b.zobrist_key);
        assert_eq!(a.zobrist_key, compute_zobrist_key(&a));
    }

    #[test]
    fn no_en_passant_file_contributes_nothing() {
        assert_eq!(en_passant_file_key(0), 0);
        assert_ne!(en_passant_file_key(1), 0);
    }

    #[test]
    fn incremental_key_matches_full_recompute() {
        let mut position = Position::new_game();
        // e4 d5 exd5 Qxd5 covers capture, en-passant file set/clear, and
        // both side-to-move toggles.
        for (start, end) in [(12u8, 28u8), (51, 35), (28, 35), (59, 35)] {
            let mv = position.find_move(start, end, None).expect("legal move");
            position.make_move(mv);
            assert_eq!(position.zobrist_key, compute_zobrist_key(&position));
        }
    }

    #[test]
    fn side_to_move_changes_hash() {
        let w = Position::from_fen("4k3/8/8/8/8/8/8/4K3 w - - 0 1").expect("FEN should parse");
        let b = Position::from_fen("4k3/8/8/8/8/8/8/4K3 b - - 0 1").expect("FEN should parse");
        assert_ne!(w.zobrist_key, b.zobrist_key);
    }

    #[test]
    fn castling_rights_change_hash() {
        let with_rights =
            Position::from_fen("4k3/8/8/8/8/8/8/R3K2R w KQ - 0 1").expect("FEN should parse");
        let without_rights =
            Position::from_fen("4k3/8/8/8/8/8/8/R3K2R w - - 0 1").expect("FEN should parse");
        assert_ne!(with_rights.zobrist_key, without_rights.zobrist_key);
    }

    #[test]
    fn en_passant_file_changes_hash() {
        let no_ep =
            Position::from_fen("4k3/8/8/8/4P3/8/8/4K3 b - - 0 1").expect("FEN should parse");
        let ep =
            Position::from_fen("4k3/8/8/8/4P3/8/8/4K3 b - e3 0 1").expect("FEN should parse");
        assert_ne!(no_ep.zobrist_key, ep.zobrist_key);
    }
}
