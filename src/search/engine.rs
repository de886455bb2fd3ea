//! Iterative deepening negamax with alpha-beta pruning, quiescence,
//! search extensions, late move reductions, and transposition caching.
//!
//! Search works on a single cloned position and walks the tree through
//! make/undo, guarded by [`MoveScope`] so every recursion level unwinds on
//! every exit path. Time control is coarse on purpose: a started depth
//! always runs to completion, and the elapsed check only decides whether
//! another full iteration begins.

use std::time::{Duration, Instant};

use rand::rngs::StdRng;
use rand::SeedableRng;

use crate::board::chess_types::{absolute_type, square_rank, Move, EMPTY};
use crate::board::position::{MoveScope, Position};
use crate::search::evaluation::{relative_evaluate, RootMove, MATE_SCORE};
use crate::search::move_ordering::ordered_moves;
use crate::search::transposition::{Bound, TranspositionTable};
use crate::tables::opening_book::OpeningBook;
use crate::utils::algebraic::parse_move_string;

/// Outside any reachable score, so the root window always tightens.
const INFINITY_SCORE: i32 = MATE_SCORE + 1_000;

/// Hard ceiling for iterative deepening; positions that search instantly
/// must not spin the depth counter forever.
const MAX_ITERATIVE_DEPTH: u8 = 64;

/// How long iterative deepening keeps starting new iterations.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum IterativeDeepeningMode {
    Off,
    Fast,
    Standard,
    Deep,
}

impl IterativeDeepeningMode {
    /// Elapsed-time threshold under which another full iteration starts.
    pub fn threshold(self) -> Option<Duration> {
        match self {
            IterativeDeepeningMode::Off => None,
            IterativeDeepeningMode::Fast => Some(Duration::from_millis(250)),
            IterativeDeepeningMode::Standard => Some(Duration::from_millis(1000)),
            IterativeDeepeningMode::Deep => Some(Duration::from_millis(2500)),
        }
    }
}

/// Opening book usage for a search.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum BookMode {
    Disabled,
    /// Always the most played continuation.
    BestPlayed,
    /// Sample by play count raised to `weight_pow`; 0.0 is uniform, large
    /// values converge on the most played move.
    Weighted { weight_pow: f64 },
}

#[derive(Debug, Clone, Copy)]
pub struct SearchConfig {
    /// Depth of the first iteration.
    pub depth: u8,
    pub iterative_deepening: IterativeDeepeningMode,
    pub book: BookMode,
    pub use_transposition_table: bool,
    /// Total extra plies one line may gain through extensions.
    pub max_extensions: u8,
}

impl Default for SearchConfig {
    fn default() -> Self {
        SearchConfig {
            depth: 4,
            iterative_deepening: IterativeDeepeningMode::Standard,
            book: BookMode::Disabled,
            use_transposition_table: true,
            max_extensions: 16,
        }
    }
}

/// Per-search observability counters. Read-only output; nothing in here
/// feeds back into move selection.
#[derive(Debug, Default, Clone, Copy)]
pub struct SearchDiagnostics {
    pub moves_searched: u64,
    pub transpositions: u64,
    pub depth: u8,
    pub eval: i32,
    pub elapsed: Duration,
    pub book_move: bool,
}

#[derive(Debug, Clone, Copy)]
pub struct SearchOutcome {
    pub best_move: Option<Move>,
    pub diagnostics: SearchDiagnostics,
}

pub struct SearchEngine {
    transposition_table: TranspositionTable,
    opening_book: Option<OpeningBook>,
    rng: StdRng,
}

impl SearchEngine {
    pub fn new(table_megabytes: usize) -> Self {
        SearchEngine {
            transposition_table: TranspositionTable::new_with_mb(table_megabytes),
            opening_book: None,
            rng: StdRng::from_os_rng(),
        }
    }

    pub fn with_opening_book(mut self, book: OpeningBook) -> Self {
        self.opening_book = Some(book);
        self
    }

    /// Deterministic weighted book sampling, mainly for tests.
    pub fn with_rng_seed(mut self, seed: u64) -> Self {
        self.rng = StdRng::seed_from_u64(seed);
        self
    }

    /// Forget everything learned from the previous game.
    pub fn new_game(&mut self) {
        self.transposition_table.clear();
    }

    /// Pick a move for the side to move. Returns `None` as the best move
    /// only when the game is already decided.
    pub fn choose_move(&mut self, position: &Position, config: &SearchConfig) -> SearchOutcome {
        let started = Instant::now();
        if position.turn == 0 {
            self.transposition_table.clear();
        }

        let mut diagnostics = SearchDiagnostics::default();
        if position.outcome.is_decided() {
            diagnostics.elapsed = started.elapsed();
            return SearchOutcome {
                best_move: None,
                diagnostics,
            };
        }

        if let Some(book_move) = self.try_book_move(position, config.book) {
            diagnostics.book_move = true;
            diagnostics.elapsed = started.elapsed();
            return SearchOutcome {
                best_move: Some(book_move),
                diagnostics,
            };
        }

        let mut scratch = position.clone();
        let mut worker = SearchWorker {
            table: &mut self.transposition_table,
            use_table: config.use_transposition_table,
            max_extensions: config.max_extensions,
            moves_searched: 0,
            transpositions: 0,
            root_move: None,
            best_move: None,
        };

        let mut depth = config.depth.max(1);
        let mut eval =
            worker.search(&mut scratch, depth, 0, -INFINITY_SCORE, INFINITY_SCORE, 0);

        if let Some(threshold) = config.iterative_deepening.threshold() {
            while started.elapsed() < threshold && depth < MAX_ITERATIVE_DEPTH {
                depth += 1;
                eval = worker.search(&mut scratch, depth, 0, -INFINITY_SCORE, INFINITY_SCORE, 0);
            }
        }

        diagnostics.moves_searched = worker.moves_searched;
        diagnostics.transpositions = worker.transpositions;
        diagnostics.depth = depth;
        diagnostics.eval = eval;
        diagnostics.elapsed = started.elapsed();

        SearchOutcome {
            best_move: worker.best_move,
            diagnostics,
        }
    }

    fn try_book_move(&mut self, position: &Position, mode: BookMode) -> Option<Move> {
        let book = self.opening_book.as_ref()?;
        let move_string = match mode {
            BookMode::Disabled => return None,
            BookMode::BestPlayed => book.best_played_move(position)?,
            BookMode::Weighted { weight_pow } => {
                book.weighted_move(position, &mut self.rng, weight_pow)?
            }
        };
        let (start, end) = parse_move_string(move_string).ok()?;
        position.find_move(start, end, None).ok()
    }
}

struct SearchWorker<'a> {
    table: &'a mut TranspositionTable,
    use_table: bool,
    max_extensions: u8,
    moves_searched: u64,
    transpositions: u64,
    /// First move of the line currently being explored.
    root_move: Option<RootMove>,
    best_move: Option<Move>,
}

impl SearchWorker<'_> {
    fn search(
        &mut self,
        position: &mut Position,
        ply_remaining: u8,
        ply_from_root: u8,
        mut alpha: i32,
        beta: i32,
        extensions: u8,
    ) -> i32 {
        if position.outcome.is_decided() {
            return relative_evaluate(position, self.root_move, ply_from_root);
        }
        // Inside the tree a position seen twice before is taken as drawn
        // without waiting for the third occurrence to be played out.
        if ply_from_root > 0 && position.repeated_positions.contains(&position.zobrist_key) {
            return 0;
        }

        if self.use_table {
            if let Some(table_eval) = self.table.lookup(
                position.zobrist_key,
                ply_remaining,
                ply_from_root,
                alpha,
                beta,
            ) {
                if ply_from_root == 0 {
                    if let Some(stored) = self.table.stored_move(position.zobrist_key) {
                        self.best_move = Some(stored);
                    }
                }
                self.transpositions += 1;
                return table_eval;
            }
        }

        if ply_remaining == 0 {
            // Tactically loaded horizons get the capture-resolution pass;
            // quiet ones stand on the static evaluation.
            if position.major_event || position.is_check {
                return self.quiescence(position, alpha, beta, ply_from_root);
            }
            return relative_evaluate(position, self.root_move, ply_from_root);
        }

        let ordered = ordered_moves(position);
        let mut bound = Bound::Upper;
        let mut best_in_position: Option<Move> = None;

        for (index, &mv) in ordered.iter().enumerate() {
            let piece = position.squares[mv.start as usize];
            let is_capture = position.squares[mv.end as usize] != EMPTY;

            if ply_from_root == 0 {
                self.root_move = Some(RootMove {
                    mv,
                    moved_piece: piece,
                });
            }
            self.moves_searched += 1;

            let eval;
            {
                let mut scope = MoveScope::apply(&mut *position, mv);

                let mut extend = 0u8;
                if extensions < self.max_extensions {
                    if scope.is_check {
                        // Checkmate could be close.
                        extend = 1;
                    } else if absolute_type(piece) == 6
                        && (square_rank(mv.end) == 6 || square_rank(mv.end) == 1)
                    {
                        // One step from promotion.
                        extend = 1;
                    }
                }

                let mut score = 0;
                let mut needs_full_search = true;
                if extend == 0 && ply_remaining >= 3 && index >= 3 && !is_capture {
                    // Late quiet move: probe with a reduced zero-width
                    // window, and only pay for the full search if it bites.
                    score = -self.search(
                        &mut scope,
                        ply_remaining - 2,
                        ply_from_root + 1,
                        -alpha - 1,
                        -alpha,
                        extensions,
                    );
                    needs_full_search = score > alpha;
                }
                if needs_full_search {
                    score = -self.search(
                        &mut scope,
                        ply_remaining - 1 + extend,
                        ply_from_root + 1,
                        -beta,
                        -alpha,
                        extensions + extend,
                    );
                }
                eval = score;
            }

            if eval >= beta {
                if self.use_table {
                    self.table.store(
                        position.zobrist_key,
                        ply_remaining,
                        ply_from_root,
                        beta,
                        Bound::Lower,
                        Some(mv),
                    );
                }
                return beta;
            }
            if eval > alpha {
                bound = Bound::Exact;
                best_in_position = Some(mv);
                alpha = eval;
                if ply_from_root == 0 {
                    self.best_move = Some(mv);
                }
            }
        }

        if self.use_table {
            self.table.store(
                position.zobrist_key,
                ply_remaining,
                ply_from_root,
                alpha,
                bound,
                best_in_position,
            );
        }
        alpha
    }

    /// Search only captures until the position goes quiet, with the static
    /// evaluation as a stand-pat floor.
    fn quiescence(
        &mut self,
        position: &mut Position,
        mut alpha: i32,
        beta: i32,
        ply_from_root: u8,
    ) -> i32 {
        let stand_pat = relative_evaluate(position, self.root_move, ply_from_root);
        if position.outcome.is_decided() {
            return stand_pat;
        }
        if stand_pat >= beta {
            return beta;
        }
        if stand_pat > alpha {
            alpha = stand_pat;
        }

        for mv in ordered_moves(position) {
            if position.squares[mv.end as usize] == EMPTY {
                continue;
            }
            self.moves_searched += 1;

            let eval;
            {
                let mut scope = MoveScope::apply(&mut *position, mv);
                eval = -self.quiescence(&mut scope, -beta, -alpha, ply_from_root + 1);
            }

            if eval >= beta {
                return beta;
            }
            if eval > alpha {
                alpha = eval;
            }
        }

        alpha
    }
}
