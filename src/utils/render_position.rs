//! Terminal-oriented Unicode board renderer.
//!
//! Creates a human-readable board view from the mailbox for debugging,
//! tests, and diagnostics in text environments.

use crate::board::chess_types::{absolute_type, is_light_piece, PieceCode, EMPTY};
use crate::board::position::Position;

/// Render the board to a Unicode string for terminal output.
///
/// Assumes square indexing where `0 == a1`, `7 == h1`, and `63 == h8`.
pub fn render_position(position: &Position) -> String {
    let mut out = String::new();

    out.push_str("  a b c d e f g h\n");

    for rank in (0..8).rev() {
        out.push(char::from(b'1' + rank as u8));
        out.push(' ');

        for file in 0..8 {
            let piece = position.squares[rank * 8 + file];
            match piece_to_unicode(piece) {
                Some(symbol) => out.push(symbol),
                None => out.push('·'),
            }

            if file < 7 {
                out.push(' ');
            }
        }

        out.push(' ');
        out.push(char::from(b'1' + rank as u8));
        out.push('\n');
    }

    out.push_str("  a b c d e f g h");

    out
}

fn piece_to_unicode(piece: PieceCode) -> Option<char> {
    if piece == EMPTY {
        return None;
    }
    let light = is_light_piece(piece);
    Some(match (absolute_type(piece), light) {
        (1, true) => '♔',
        (2, true) => '♕',
        (3, true) => '♖',
        (4, true) => '♗',
        (5, true) => '♘',
        (6, true) => '♙',
        (1, false) => '♚',
        (2, false) => '♛',
        (3, false) => '♜',
        (4, false) => '♝',
        (5, false) => '♞',
        _ => '♟',
    })
}
