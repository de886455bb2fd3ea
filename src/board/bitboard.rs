//! Bit-level helpers for 64-bit board sets.
//!
//! Bit `i` of a bitboard corresponds to square `i` (rank-major, `0 == a1`).

use crate::board::chess_types::Square;

/// Number of set bits in a bitboard.
#[inline]
pub const fn pop_count(bitboard: u64) -> u32 {
    bitboard.count_ones()
}

/// Mirror a square index across the horizontal board axis (`a1 <-> a8`).
///
/// Piece-square tables are written from the light side's point of view;
/// dark pieces index them through this flip.
#[inline]
pub const fn flip_index(square: Square) -> Square {
    square ^ 56
}

/// Whether the bit for `square` is set.
#[inline]
pub const fn bitboard_contains(bitboard: u64, square: Square) -> bool {
    (bitboard & (1u64 << square)) != 0
}

/// One-hot bitboard for a square.
#[inline]
pub const fn square_mask(square: Square) -> u64 {
    1u64 << square
}

#[cfg(test)]
mod tests {
    use super::{bitboard_contains, flip_index, pop_count, square_mask};

    #[test]
    fn pop_count_matches_hand_counted_masks() {
        assert_eq!(pop_count(0), 0);
        assert_eq!(pop_count(0b1011), 3);
        assert_eq!(pop_count(u64::MAX), 64);
    }

    #[test]
    fn flip_index_mirrors_ranks_and_preserves_files() {
        assert_eq!(flip_index(0), 56); // a1 -> a8
        assert_eq!(flip_index(63), 7); // h8 -> h1
        assert_eq!(flip_index(12), 52); // e2 -> e7
        assert_eq!(flip_index(flip_index(33)), 33);
    }

    #[test]
    fn contains_tracks_individual_bits() {
        let board = square_mask(4) | square_mask(60);
        assert!(bitboard_contains(board, 4));
        assert!(bitboard_contains(board, 60));
        assert!(!bitboard_contains(board, 5));
    }
}
