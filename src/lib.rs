//! Crate root module declarations for the Revi chess engine core.
//!
//! This file exposes all top-level subsystems (board state, move generation,
//! search, opening tables, and utility helpers) so binaries, tests, and
//! external tooling can import stable module paths.

pub mod board {
    pub mod bitboard;
    pub mod chess_types;
    pub mod position;
    pub mod undo_state;
}

pub mod movegen {
    pub mod generator;
    pub mod king;
    pub mod knight;
    pub mod masks;
    pub mod pawn;
    pub mod perft;
    pub mod sliding;
}

pub mod search {
    pub mod engine;
    pub mod evaluation;
    pub mod move_ordering;
    pub mod transposition;
    pub mod zobrist;
}

pub mod tables {
    pub mod opening_book;
}

pub mod utils {
    pub mod algebraic;
    pub mod fen_generator;
    pub mod fen_parser;
    pub mod pgn;
    pub mod render_position;
}

pub mod session;
