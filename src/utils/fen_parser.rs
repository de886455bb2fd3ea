//! FEN import.
//!
//! Parsing builds a fresh [`Position`] and only hands it back once every
//! field has validated, so a bad string can never leave a half-initialized
//! board behind. Internally the fifty-move rule counts *down* from 100 and
//! the ply counter starts at zero, so the FEN clock fields are converted on
//! the way in.

use crate::board::chess_types::{
    absolute_type, piece_color, Color, PieceCode, CASTLE_DARK_KINGSIDE_LOST,
    CASTLE_DARK_QUEENSIDE_LOST, CASTLE_LIGHT_KINGSIDE_LOST, CASTLE_LIGHT_QUEENSIDE_LOST,
};
use crate::board::position::{Position, FIFTY_MOVE_START};
use crate::utils::algebraic::algebraic_to_square;

const ALL_RIGHTS_LOST: u8 = CASTLE_LIGHT_QUEENSIDE_LOST
    | CASTLE_DARK_QUEENSIDE_LOST
    | CASTLE_LIGHT_KINGSIDE_LOST
    | CASTLE_DARK_KINGSIDE_LOST;

pub fn position_from_fen(fen: &str) -> Result<Position, String> {
    let fields: Vec<&str> = fen.split_whitespace().collect();
    if fields.len() != 6 {
        return Err(format!(
            "FEN must have 6 space-separated fields, found {}",
            fields.len()
        ));
    }

    let mut position = Position::blank();
    parse_placement(fields[0], &mut position.squares)?;

    let dark_to_move = match fields[1] {
        "w" => false,
        "b" => true,
        other => return Err(format!("invalid side-to-move field '{other}'")),
    };

    position.castling_rights = parse_castling(fields[2])?;
    position.en_passant_file = parse_en_passant(fields[3], dark_to_move)?;

    let halfmove: u8 = fields[4]
        .parse()
        .map_err(|_| format!("invalid halfmove clock '{}'", fields[4]))?;
    position.fifty_move_counter = FIFTY_MOVE_START.saturating_sub(halfmove);

    let fullmove: u16 = fields[5]
        .parse()
        .map_err(|_| format!("invalid fullmove number '{}'", fields[5]))?;
    if fullmove == 0 {
        return Err("fullmove number must be at least 1".to_string());
    }
    position.turn = (fullmove - 1) * 2 + u16::from(dark_to_move);

    validate_kings(&position.squares)?;
    position.initialize_derived();
    Ok(position)
}

fn parse_placement(placement: &str, squares: &mut [PieceCode; 64]) -> Result<(), String> {
    let ranks: Vec<&str> = placement.split('/').collect();
    if ranks.len() != 8 {
        return Err(format!(
            "piece placement must have 8 ranks, found {}",
            ranks.len()
        ));
    }

    // FEN lists rank 8 first; square 0 is a1.
    for (row, rank_text) in ranks.iter().enumerate() {
        let rank = 7 - row;
        let mut file = 0usize;
        for symbol in rank_text.chars() {
            if let Some(skip) = symbol.to_digit(10) {
                file += skip as usize;
                continue;
            }
            if file >= 8 {
                return Err(format!("rank '{rank_text}' overflows 8 files"));
            }
            squares[rank * 8 + file] = piece_code_from_symbol(symbol)?;
            file += 1;
        }
        if file != 8 {
            return Err(format!("rank '{rank_text}' covers {file} files, expected 8"));
        }
    }
    Ok(())
}

fn piece_code_from_symbol(symbol: char) -> Result<PieceCode, String> {
    let base = match symbol.to_ascii_lowercase() {
        'k' => 1,
        'q' => 2,
        'r' => 3,
        'b' => 4,
        'n' => 5,
        'p' => 6,
        other => return Err(format!("unknown piece symbol '{other}'")),
    };
    Ok(if symbol.is_ascii_uppercase() { base } else { base + 6 })
}

fn parse_castling(field: &str) -> Result<u8, String> {
    if field == "-" {
        return Ok(ALL_RIGHTS_LOST);
    }
    // The FEN letters say which rights remain; the internal bits say which
    // are lost, so start from everything lost and clear as letters appear.
    let mut rights = ALL_RIGHTS_LOST;
    for symbol in field.chars() {
        rights &= !match symbol {
            'K' => CASTLE_LIGHT_KINGSIDE_LOST,
            'Q' => CASTLE_LIGHT_QUEENSIDE_LOST,
            'k' => CASTLE_DARK_KINGSIDE_LOST,
            'q' => CASTLE_DARK_QUEENSIDE_LOST,
            other => return Err(format!("unknown castling symbol '{other}'")),
        };
    }
    Ok(rights)
}

fn parse_en_passant(field: &str, dark_to_move: bool) -> Result<u8, String> {
    if field == "-" {
        return Ok(0);
    }
    let square = algebraic_to_square(field)?;
    let expected_rank = if dark_to_move { 2 } else { 5 };
    if square / 8 != expected_rank {
        return Err(format!("en-passant square '{field}' is on the wrong rank"));
    }
    Ok(square % 8 + 1)
}

fn validate_kings(squares: &[PieceCode; 64]) -> Result<(), String> {
    let mut kings = [0u32; 2];
    for &piece in squares.iter() {
        if absolute_type(piece) == 1 {
            if let Some(color) = piece_color(piece) {
                kings[color.index()] += 1;
            }
        }
    }
    if kings != [1, 1] {
        return Err(format!(
            "position must have exactly one king per side, found {} light and {} dark",
            kings[Color::Light.index()],
            kings[Color::Dark.index()]
        ));
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::position_from_fen;
    use crate::board::chess_types::{Color, PieceKind, CASTLE_DARK_QUEENSIDE_LOST};
    use crate::board::position::STARTING_POSITION_FEN;

    #[test]
    fn starting_position_parses() {
        let position = position_from_fen(STARTING_POSITION_FEN).expect("should parse");
        assert_eq!(position.squares[4], PieceKind::King.code(Color::Light));
        assert_eq!(position.squares[60], PieceKind::King.code(Color::Dark));
        assert_eq!(position.castling_rights, 0);
        assert_eq!(position.turn, 0);
        assert_eq!(position.en_passant_file, 0);
    }

    #[test]
    fn castling_field_inverts_into_lost_bits() {
        let position = position_from_fen("r3k2r/8/8/8/8/8/8/R3K2R w KQk - 0 1")
            .expect("should parse");
        assert_eq!(position.castling_rights, CASTLE_DARK_QUEENSIDE_LOST);
    }

    #[test]
    fn clock_fields_convert() {
        let position = position_from_fen("4k3/8/8/8/8/8/8/4K3 b - - 30 12")
            .expect("should parse");
        assert_eq!(position.fifty_move_counter, 70);
        assert_eq!(position.turn, 23);
        assert_eq!(position.side_to_move(), Color::Dark);
    }

    #[test]
    fn malformed_fens_are_rejected() {
        assert!(position_from_fen("").is_err());
        assert!(position_from_fen("8/8/8/8/8/8/8/8 w - - 0 1").is_err());
        assert!(position_from_fen("4k3/8/8/8/8/8/8/4K3 x - - 0 1").is_err());
        assert!(position_from_fen("4k3/9/8/8/8/8/8/4K3 w - - 0 1").is_err());
        assert!(position_from_fen("4k3/8/8/8/8/8/8/4K3 w - e3 0 1").is_err());
    }
}
