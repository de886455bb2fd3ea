//! Perft: exhaustive legal move-tree enumeration for validating the
//! generator and the make/undo machinery against published node counts.

use crate::board::chess_types::{MoveKind, EMPTY};
use crate::board::position::{MoveScope, Position};

#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub struct PerftCounts {
    pub nodes: u64,
    pub captures: u64,
    pub en_passant: u64,
    pub castles: u64,
    pub promotions: u64,
}

impl PerftCounts {
    fn absorb(&mut self, other: PerftCounts) {
        self.nodes += other.nodes;
        self.captures += other.captures;
        self.en_passant += other.en_passant;
        self.castles += other.castles;
        self.promotions += other.promotions;
    }
}

/// Count leaf nodes (and their move classifications) `depth` plies ahead.
pub fn perft(position: &mut Position, depth: u8) -> PerftCounts {
    let mut counts = PerftCounts::default();
    if depth == 0 {
        counts.nodes = 1;
        return counts;
    }

    for mv in position.moves.clone() {
        if depth == 1 {
            counts.nodes += 1;
            if position.squares[mv.end as usize] != EMPTY || mv.kind == MoveKind::EnPassant {
                counts.captures += 1;
            }
            match mv.kind {
                MoveKind::EnPassant => counts.en_passant += 1,
                MoveKind::CastleQueenside | MoveKind::CastleKingside => counts.castles += 1,
                kind if kind.is_promotion() => counts.promotions += 1,
                _ => {}
            }
            continue;
        }

        let mut scope = MoveScope::apply(position, mv);
        counts.absorb(perft(&mut scope, depth - 1));
    }

    counts
}

/// Leaf node count only.
pub fn perft_nodes(position: &mut Position, depth: u8) -> u64 {
    perft(position, depth).nodes
}

#[cfg(test)]
mod tests {
    use super::{perft, perft_nodes};
    use crate::board::position::Position;

    #[test]
    fn starting_position_node_counts() {
        let mut position = Position::new_game();
        assert_eq!(perft_nodes(&mut position, 1), 20);
        assert_eq!(perft_nodes(&mut position, 2), 400);
        assert_eq!(perft_nodes(&mut position, 3), 8_902);
    }

    #[test]
    fn starting_position_capture_breakdown() {
        let mut position = Position::new_game();
        let counts = perft(&mut position, 3);
        assert_eq!(counts.nodes, 8_902);
        assert_eq!(counts.captures, 34);
        assert_eq!(counts.en_passant, 0);
        assert_eq!(counts.castles, 0);
        assert_eq!(counts.promotions, 0);
    }

    #[test]
    fn kiwipete_node_counts() {
        let mut position = Position::from_fen(
            "r3k2r/p1ppqpb1/bn2pnp1/3PN3/1p2P3/2N2Q1p/PPPBBPPP/R3K2R w KQkq - 0 1",
        )
        .expect("kiwipete fen should parse");
        assert_eq!(perft_nodes(&mut position, 1), 48);
        assert_eq!(perft_nodes(&mut position, 2), 2_039);
    }

    #[test]
    fn en_passant_pin_position_node_counts() {
        // The rank-5 rook/king alignment makes several en-passant captures
        // illegal; a generator that misses that overcounts here.
        let mut position = Position::from_fen("8/2p5/3p4/KP5r/1R3p1k/8/4P1P1/8 w - - 0 1")
            .expect("fen should parse");
        assert_eq!(perft_nodes(&mut position, 1), 14);
        assert_eq!(perft_nodes(&mut position, 2), 191);
        assert_eq!(perft_nodes(&mut position, 3), 2_812);
    }

    #[test]
    fn promotion_heavy_position_node_counts() {
        let mut position =
            Position::from_fen("n1n5/PPPk4/8/8/8/8/4Kppp/5N1N b - - 0 1")
                .expect("fen should parse");
        assert_eq!(perft_nodes(&mut position, 1), 24);
        assert_eq!(perft_nodes(&mut position, 2), 496);
    }

    #[test]
    fn perft_leaves_the_position_untouched() {
        let mut position = Position::new_game();
        let key = position.zobrist_key;
        let squares = position.squares;
        let _ = perft(&mut position, 3);
        assert_eq!(position.zobrist_key, key);
        assert_eq!(position.squares, squares);
        assert_eq!(position.turn, 0);
    }
}
