//! Algebraic square names and four-character coordinate move strings.

use crate::board::chess_types::{square_file, square_rank, Square};

/// Convert a square name such as `e4` to its board index. Case-insensitive.
pub fn algebraic_to_square(text: &str) -> Result<Square, String> {
    let mut chars = text.chars();
    let (Some(file_char), Some(rank_char), None) = (chars.next(), chars.next(), chars.next())
    else {
        return Err(format!("square '{text}' must be exactly two characters"));
    };

    let file_char = file_char.to_ascii_lowercase();
    if !('a'..='h').contains(&file_char) {
        return Err(format!("invalid file '{file_char}' in square '{text}'"));
    }
    let Some(rank_digit) = rank_char.to_digit(10).filter(|r| (1..=8).contains(r)) else {
        return Err(format!("invalid rank '{rank_char}' in square '{text}'"));
    };

    let file = file_char as u8 - b'a';
    let rank = rank_digit as u8 - 1;
    Ok(rank * 8 + file)
}

/// Board index back to its square name.
pub fn square_to_algebraic(square: Square) -> String {
    let file = (b'a' + square_file(square)) as char;
    let rank = square_rank(square) + 1;
    format!("{file}{rank}")
}

/// Parse a coordinate move string like `e2e4` into its square pair.
/// Promotion pieces are chosen out-of-band, never encoded in the string.
pub fn parse_move_string(text: &str) -> Result<(Square, Square), String> {
    if text.len() != 4 || !text.is_ascii() {
        return Err(format!("move '{text}' must be exactly four characters"));
    }
    let start = algebraic_to_square(&text[..2])?;
    let end = algebraic_to_square(&text[2..])?;
    Ok((start, end))
}

/// Format a square pair as a coordinate move string.
pub fn move_string(start: Square, end: Square) -> String {
    format!("{}{}", square_to_algebraic(start), square_to_algebraic(end))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn squares_map_both_ways() {
        assert_eq!(algebraic_to_square("a1").expect("a1 should parse"), 0);
        assert_eq!(algebraic_to_square("h8").expect("h8 should parse"), 63);
        assert_eq!(algebraic_to_square("E4").expect("E4 should parse"), 28);
        assert_eq!(square_to_algebraic(0), "a1");
        assert_eq!(square_to_algebraic(28), "e4");
        assert_eq!(square_to_algebraic(63), "h8");
    }

    #[test]
    fn move_strings_parse() {
        assert_eq!(parse_move_string("e2e4").expect("should parse"), (12, 28));
        assert_eq!(move_string(12, 28), "e2e4");
        assert!(parse_move_string("e2e").is_err());
        assert!(parse_move_string("i2e4").is_err());
        assert!(parse_move_string("e9e4").is_err());
    }

    #[test]
    fn bad_squares_are_rejected() {
        assert!(algebraic_to_square("a0").is_err());
        assert!(algebraic_to_square("z5").is_err());
        assert!(algebraic_to_square("e44").is_err());
    }
}
