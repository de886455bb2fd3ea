//! Opening book parsing and probing.
//!
//! The book is plain text: a `pos` marker line, the position key on the
//! next line, then one `<moveString> <playCount>` record per known
//! continuation. Keys are simplified FEN strings with the move clocks and
//! en-passant square stripped, so positions that differ only in clock
//! bookkeeping share one entry.

use std::collections::HashMap;

use rand::Rng;

use crate::board::position::Position;

#[derive(Debug, Clone)]
pub struct BookMove {
    pub move_string: String,
    pub play_count: u64,
}

#[derive(Debug, Clone, Default)]
pub struct OpeningBook {
    positions: HashMap<String, Vec<BookMove>>,
}

impl OpeningBook {
    pub fn parse(text: &str) -> Result<Self, String> {
        let mut positions: HashMap<String, Vec<BookMove>> = HashMap::new();
        let mut current_key: Option<String> = None;
        let mut expecting_key = false;

        for (line_number, raw_line) in text.lines().enumerate() {
            let line = raw_line.trim();
            if line.is_empty() {
                continue;
            }
            if line == "pos" {
                expecting_key = true;
                continue;
            }
            if expecting_key {
                current_key = Some(line.to_owned());
                positions.entry(line.to_owned()).or_default();
                expecting_key = false;
                continue;
            }

            let Some(key) = current_key.as_ref() else {
                return Err(format!(
                    "line {}: move record before any pos marker",
                    line_number + 1
                ));
            };
            let mut parts = line.split_whitespace();
            let (Some(move_string), Some(count_text), None) =
                (parts.next(), parts.next(), parts.next())
            else {
                return Err(format!(
                    "line {}: expected '<move> <playCount>', found '{line}'",
                    line_number + 1
                ));
            };
            let play_count: u64 = count_text
                .parse()
                .map_err(|_| format!("line {}: invalid play count '{count_text}'", line_number + 1))?;
            if let Some(moves) = positions.get_mut(key) {
                moves.push(BookMove {
                    move_string: move_string.to_owned(),
                    play_count,
                });
            }
        }

        Ok(OpeningBook { positions })
    }

    pub fn is_empty(&self) -> bool {
        self.positions.is_empty()
    }

    pub fn position_count(&self) -> usize {
        self.positions.len()
    }

    /// All known continuations for a position, if any.
    pub fn lookup(&self, position: &Position) -> Option<&[BookMove]> {
        let key = simplified_fen(&position.to_fen());
        self.positions
            .get(&key)
            .filter(|moves| !moves.is_empty())
            .map(Vec::as_slice)
    }

    /// The most played continuation.
    pub fn best_played_move(&self, position: &Position) -> Option<&str> {
        self.lookup(position)?
            .iter()
            .max_by_key(|book_move| book_move.play_count)
            .map(|book_move| book_move.move_string.as_str())
    }

    /// Sample a continuation with probability proportional to
    /// `play_count^weight_pow`. A power of zero plays all book moves
    /// uniformly; higher powers lean ever harder on the main lines.
    pub fn weighted_move<R: Rng + ?Sized>(
        &self,
        position: &Position,
        rng: &mut R,
        weight_pow: f64,
    ) -> Option<&str> {
        let moves = self.lookup(position)?;
        let weights: Vec<f64> = moves
            .iter()
            .map(|book_move| (book_move.play_count as f64).powf(weight_pow))
            .collect();
        let total: f64 = weights.iter().sum();
        if total <= 0.0 {
            return moves.first().map(|book_move| book_move.move_string.as_str());
        }

        let mut pick = rng.random_range(0.0..total);
        for (book_move, weight) in moves.iter().zip(weights) {
            if pick < weight {
                return Some(book_move.move_string.as_str());
            }
            pick -= weight;
        }
        moves.last().map(|book_move| book_move.move_string.as_str())
    }
}

/// Strip the en-passant square and both move clocks from a FEN string,
/// leaving `<placement> <side> <castling> -`.
pub fn simplified_fen(fen: &str) -> String {
    let mut fields = fen.split_whitespace();
    let (Some(placement), Some(side), Some(castling)) =
        (fields.next(), fields.next(), fields.next())
    else {
        return fen.trim().to_owned();
    };
    format!("{placement} {side} {castling} -")
}

#[cfg(test)]
mod tests {
    use rand::rngs::StdRng;
    use rand::SeedableRng;

    use super::{simplified_fen, OpeningBook};
    use crate::board::position::Position;

    const BOOK_TEXT: &str = "\
pos
rnbqkbnr/pppppppp/8/8/8/8/PPPPPPPP/RNBQKBNR w KQkq -
e2e4 120
d2d4 80
c2c4 10
pos
rnbqkbnr/pppppppp/8/8/4P3/8/PPPP1PPP/RNBQKBNR b KQkq -
e7e5 90
c7c5 60
";

    #[test]
    fn parses_positions_and_moves() {
        let book = OpeningBook::parse(BOOK_TEXT).expect("book should parse");
        assert_eq!(book.position_count(), 2);
        let start = Position::new_game();
        let moves = book.lookup(&start).expect("start position should be known");
        assert_eq!(moves.len(), 3);
        assert_eq!(book.best_played_move(&start), Some("e2e4"));
    }

    #[test]
    fn clock_differences_hit_the_same_entry() {
        let book = OpeningBook::parse(BOOK_TEXT).expect("book should parse");
        // Same shape as after 1. e4 but with nonsense clocks.
        let position = Position::from_fen(
            "rnbqkbnr/pppppppp/8/8/4P3/8/PPPP1PPP/RNBQKBNR b KQkq - 7 31",
        )
        .expect("fen should parse");
        assert_eq!(book.best_played_move(&position), Some("e7e5"));
    }

    #[test]
    fn weighted_sampling_only_returns_book_moves() {
        let book = OpeningBook::parse(BOOK_TEXT).expect("book should parse");
        let start = Position::new_game();
        let mut rng = StdRng::seed_from_u64(7);
        for _ in 0..50 {
            let picked = book
                .weighted_move(&start, &mut rng, 0.5)
                .expect("a book move should be picked");
            assert!(["e2e4", "d2d4", "c2c4"].contains(&picked));
        }
    }

    #[test]
    fn unknown_positions_miss() {
        let book = OpeningBook::parse(BOOK_TEXT).expect("book should parse");
        let position = Position::from_fen("4k3/8/8/8/8/8/8/4K3 w - - 0 1")
            .expect("fen should parse");
        assert!(book.lookup(&position).is_none());
        assert!(book.best_played_move(&position).is_none());
    }

    #[test]
    fn malformed_records_are_rejected() {
        assert!(OpeningBook::parse("e2e4 12\n").is_err());
        assert!(OpeningBook::parse("pos\nkey\ne2e4\n").is_err());
        assert!(OpeningBook::parse("pos\nkey\ne2e4 many\n").is_err());
    }

    #[test]
    fn simplified_fen_strips_the_tail() {
        assert_eq!(
            simplified_fen("rnbqkbnr/pppppppp/8/8/8/8/PPPPPPPP/RNBQKBNR w KQkq e3 4 12"),
            "rnbqkbnr/pppppppp/8/8/8/8/PPPPPPPP/RNBQKBNR w KQkq -"
        );
    }
}
