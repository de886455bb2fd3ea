//! Fixed-size transposition table keyed by Zobrist hash.
//!
//! Entries are stored last-write-wins: the table is a cache, not an
//! archive, and a stale shallow entry is cheaper to recompute than the
//! bookkeeping to keep it. Correctness never depends on the table; with
//! lookups disabled the search returns the same root move, just slower.
//!
//! Mate scores are ply-corrected on the way in and out so that "mate in
//! three from here" reads the same no matter how deep in the tree the
//! position was first seen.

use crate::board::chess_types::Move;
use crate::search::evaluation::is_mate_score;

/// What the stored score means relative to the search window it was found
/// in.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Bound {
    /// Searched with a full window; the score is exact.
    Exact,
    /// Failed high; the real score is at least this.
    Lower,
    /// Failed low; the real score is at most this.
    Upper,
}

#[derive(Debug, Clone, Copy)]
pub struct TTEntry {
    pub key: u64,
    pub eval: i32,
    pub depth: u8,
    pub bound: Bound,
    pub best_move: Option<Move>,
}

#[derive(Debug, Default, Clone, Copy)]
pub struct TTStats {
    pub hits: u64,
    pub misses: u64,
    pub stores: u64,
}

pub struct TranspositionTable {
    entries: Vec<Option<TTEntry>>,
    stats: TTStats,
}

impl TranspositionTable {
    /// Size the table to roughly `megabytes` of entry storage.
    pub fn new_with_mb(megabytes: usize) -> Self {
        let entry_size = std::mem::size_of::<Option<TTEntry>>();
        let capacity = (megabytes * 1024 * 1024 / entry_size).max(1);
        TranspositionTable {
            entries: vec![None; capacity],
            stats: TTStats::default(),
        }
    }

    #[inline]
    fn index(&self, key: u64) -> usize {
        (key % self.entries.len() as u64) as usize
    }

    pub fn clear(&mut self) {
        self.entries.iter_mut().for_each(|slot| *slot = None);
        self.stats = TTStats::default();
    }

    pub fn stats(&self) -> TTStats {
        self.stats
    }

    /// Store a search result, overwriting whatever lived in the slot.
    pub fn store(
        &mut self,
        key: u64,
        depth: u8,
        ply_from_root: u8,
        eval: i32,
        bound: Bound,
        best_move: Option<Move>,
    ) {
        let index = self.index(key);
        let eval = correct_mate_score_for_storage(eval, ply_from_root);
        self.entries[index] = Some(TTEntry {
            key,
            eval,
            depth,
            bound,
            best_move,
        });
        self.stats.stores += 1;
    }

    /// A stored score is usable when it was searched at least as deep as
    /// the current request (mate scores are exempt; a mate is a mate at
    /// any depth) and its bound is conclusive against the current window.
    pub fn lookup(
        &mut self,
        key: u64,
        depth: u8,
        ply_from_root: u8,
        alpha: i32,
        beta: i32,
    ) -> Option<i32> {
        let slot = self.entries[self.index(key)];
        let usable = slot.and_then(|entry| {
            if entry.key != key {
                return None;
            }
            if entry.depth < depth && !is_mate_score(entry.eval) {
                return None;
            }
            let eval = correct_mate_score_for_retrieval(entry.eval, ply_from_root);
            match entry.bound {
                Bound::Exact => Some(eval),
                Bound::Upper if eval <= alpha => Some(eval),
                Bound::Lower if eval >= beta => Some(eval),
                _ => None,
            }
        });
        match usable {
            Some(eval) => {
                self.stats.hits += 1;
                Some(eval)
            }
            None => {
                self.stats.misses += 1;
                None
            }
        }
    }

    /// The stored best move for a position, bound and depth ignored. Used
    /// to recover the root move after a root-level table hit.
    pub fn stored_move(&self, key: u64) -> Option<Move> {
        self.entries[self.index(key)]
            .filter(|entry| entry.key == key)
            .and_then(|entry| entry.best_move)
    }
}

/// Convert a root-relative mate score to a node-relative one.
fn correct_mate_score_for_storage(eval: i32, ply_from_root: u8) -> i32 {
    if is_mate_score(eval) {
        eval + eval.signum() * i32::from(ply_from_root)
    } else {
        eval
    }
}

/// Convert a node-relative mate score back to root-relative at the ply
/// where the entry is being reused.
fn correct_mate_score_for_retrieval(eval: i32, ply_from_root: u8) -> i32 {
    if is_mate_score(eval) {
        eval - eval.signum() * i32::from(ply_from_root)
    } else {
        eval
    }
}

#[cfg(test)]
mod tests {
    use super::{Bound, TranspositionTable};
    use crate::board::chess_types::Move;
    use crate::search::evaluation::MATE_SCORE;

    #[test]
    fn store_then_lookup_round_trips() {
        let mut table = TranspositionTable::new_with_mb(1);
        let mv = Move::new(12, 28);
        table.store(0xABCD, 5, 0, 42, Bound::Exact, Some(mv));
        assert_eq!(table.lookup(0xABCD, 5, 0, -1000, 1000), Some(42));
        assert_eq!(table.stored_move(0xABCD), Some(mv));
        assert_eq!(table.stats().hits, 1);
    }

    #[test]
    fn shallower_entries_are_not_trusted() {
        let mut table = TranspositionTable::new_with_mb(1);
        table.store(7, 3, 0, 42, Bound::Exact, None);
        assert_eq!(table.lookup(7, 6, 0, -1000, 1000), None);
        assert_eq!(table.lookup(7, 3, 0, -1000, 1000), Some(42));
    }

    #[test]
    fn bounds_respect_the_window() {
        let mut table = TranspositionTable::new_with_mb(1);
        table.store(1, 4, 0, 10, Bound::Lower, None);
        // A lower bound of 10 only cuts when beta is already below it.
        assert_eq!(table.lookup(1, 4, 0, -100, 5), Some(10));
        assert_eq!(table.lookup(1, 4, 0, -100, 100), None);

        table.store(2, 4, 0, -10, Bound::Upper, None);
        assert_eq!(table.lookup(2, 4, 0, -5, 100), Some(-10));
        assert_eq!(table.lookup(2, 4, 0, -50, 100), None);
    }

    #[test]
    fn key_mismatch_in_a_shared_slot_misses() {
        let mut table = TranspositionTable::new_with_mb(1);
        let capacity_collision = {
            // Two keys that map to the same slot but differ.
            let a = 3u64;
            let b = 3u64 + table.entries.len() as u64;
            (a, b)
        };
        table.store(capacity_collision.0, 4, 0, 42, Bound::Exact, None);
        assert_eq!(
            table.lookup(capacity_collision.1, 4, 0, -1000, 1000),
            None
        );
        // Overwrite wins the slot.
        table.store(capacity_collision.1, 2, 0, 7, Bound::Exact, None);
        assert_eq!(table.lookup(capacity_collision.0, 1, 0, -1000, 1000), None);
        assert_eq!(table.lookup(capacity_collision.1, 2, 0, -1000, 1000), Some(7));
    }

    #[test]
    fn mate_scores_shift_with_ply() {
        let mut table = TranspositionTable::new_with_mb(1);
        // Mate found two plies from the root: root-relative MATE - 4.
        table.store(9, 3, 2, MATE_SCORE - 4, Bound::Exact, None);
        // Reused five plies from the root the mate is further away.
        assert_eq!(
            table.lookup(9, 3, 5, -MATE_SCORE, MATE_SCORE),
            Some(MATE_SCORE - 7)
        );
        // And at the original ply it reads back unchanged.
        assert_eq!(
            table.lookup(9, 3, 2, -MATE_SCORE, MATE_SCORE),
            Some(MATE_SCORE - 4)
        );
    }
}
