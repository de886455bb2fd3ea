//! PGN export for game history interchange.
//!
//! Serializes a move history and headers to PGN movetext, replaying the
//! moves against a copy of the initial position so an illegal history is
//! rejected instead of silently written out.

use std::collections::BTreeMap;

use chrono::Local;

use crate::board::chess_types::{GameOutcome, Move, MoveKind};
use crate::board::position::{Position, STARTING_POSITION_FEN};
use crate::utils::algebraic::move_string;

pub fn write_pgn(
    initial_position: &Position,
    move_history: &[Move],
    result: &str,
) -> Result<String, String> {
    let mut headers = BTreeMap::<String, String>::new();
    headers.insert("Event".to_owned(), "Revi Chess Game".to_owned());
    headers.insert("Site".to_owned(), "Local".to_owned());
    headers.insert("Date".to_owned(), Local::now().format("%Y.%m.%d").to_string());
    headers.insert("Round".to_owned(), "-".to_owned());
    headers.insert("White".to_owned(), "White".to_owned());
    headers.insert("Black".to_owned(), "Black".to_owned());
    headers.insert("Result".to_owned(), normalize_result(result).to_owned());

    let initial_fen = initial_position.to_fen();
    if initial_fen != STARTING_POSITION_FEN {
        headers.insert("SetUp".to_owned(), "1".to_owned());
        headers.insert("FEN".to_owned(), initial_fen);
    }

    write_pgn_with_headers(initial_position, move_history, &headers)
}

pub fn write_pgn_with_headers(
    initial_position: &Position,
    move_history: &[Move],
    headers: &BTreeMap<String, String>,
) -> Result<String, String> {
    let mut out = String::new();

    for (key, value) in headers {
        out.push_str(&format!("[{} \"{}\"]\n", key, escape_pgn_value(value)));
    }
    out.push('\n');

    let mut position = initial_position.clone();
    let mut movetext_parts = Vec::<String>::with_capacity(move_history.len() + 1);
    for (offset, mv) in move_history.iter().enumerate() {
        if !position.moves.contains(mv) {
            return Err(format!(
                "move {} ({}) is not legal in its position",
                offset + 1,
                move_text(*mv)
            ));
        }
        let ply = usize::from(position.turn);
        if ply % 2 == 0 {
            movetext_parts.push(format!("{}. {}", (ply / 2) + 1, move_text(*mv)));
        } else {
            movetext_parts.push(move_text(*mv));
        }
        position.make_move(*mv);
    }

    let result = headers
        .get("Result")
        .map(|x| normalize_result(x))
        .unwrap_or("*");
    movetext_parts.push(result.to_owned());
    out.push_str(&movetext_parts.join(" "));
    out.push('\n');

    Ok(out)
}

/// Standard PGN result token for a finished or running game.
pub fn result_token(outcome: GameOutcome) -> &'static str {
    match outcome {
        GameOutcome::LightWin => "1-0",
        GameOutcome::DarkWin => "0-1",
        GameOutcome::Stalemate | GameOutcome::FiftyMoveDraw | GameOutcome::RepetitionDraw => {
            "1/2-1/2"
        }
        GameOutcome::InProgress => "*",
    }
}

fn move_text(mv: Move) -> String {
    let mut text = move_string(mv.start, mv.end);
    match mv.kind {
        MoveKind::PromoteQueen => text.push('q'),
        MoveKind::PromoteRook => text.push('r'),
        MoveKind::PromoteBishop => text.push('b'),
        MoveKind::PromoteKnight => text.push('n'),
        _ => {}
    }
    text
}

fn normalize_result(result: &str) -> &str {
    match result {
        "1-0" | "0-1" | "1/2-1/2" => result,
        _ => "*",
    }
}

fn escape_pgn_value(value: &str) -> String {
    value.replace('\\', "\\\\").replace('"', "\\\"")
}

#[cfg(test)]
mod tests {
    use super::{result_token, write_pgn};
    use crate::board::chess_types::GameOutcome;
    use crate::board::position::Position;

    #[test]
    fn short_game_writes_numbered_movetext() {
        let mut position = Position::new_game();
        let mut history = Vec::new();
        for (start, end) in [(12u8, 28u8), (52, 36), (6, 21)] {
            let mv = position.find_move(start, end, None).expect("legal opening move");
            history.push(mv);
            position.make_move(mv);
        }

        let pgn = write_pgn(&Position::new_game(), &history, "*").expect("pgn should write");
        assert!(pgn.contains("1. e2e4 e7e5 2. g1f3 *"));
        assert!(pgn.contains("[Event \"Revi Chess Game\"]"));
        assert!(!pgn.contains("[SetUp"));
    }

    #[test]
    fn custom_start_positions_include_a_fen_header() {
        let position = Position::from_fen("4k3/8/8/8/8/8/8/4K2R w K - 0 1")
            .expect("fen should parse");
        let pgn = write_pgn(&position, &[], "1/2-1/2").expect("pgn should write");
        assert!(pgn.contains("[SetUp \"1\"]"));
        assert!(pgn.contains("[FEN \"4k3/8/8/8/8/8/8/4K2R w K - 0 1\"]"));
        assert!(pgn.ends_with("1/2-1/2\n"));
    }

    #[test]
    fn illegal_history_is_rejected() {
        let position = Position::new_game();
        let bogus = position.moves[0];
        let pgn = write_pgn(&position, &[bogus, bogus], "*");
        assert!(pgn.is_err());
    }

    #[test]
    fn outcome_tokens() {
        let mut position = Position::new_game();
        assert_eq!(result_token(position.outcome), "*");
        for (start, end) in [(13u8, 21u8), (52, 36), (14, 30), (59, 31)] {
            let mv = position.find_move(start, end, None).expect("legal move");
            position.make_move(mv);
        }
        assert_eq!(result_token(position.outcome), "0-1");
        assert_eq!(result_token(GameOutcome::Stalemate), "1/2-1/2");
    }
}
