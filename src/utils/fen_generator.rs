//! FEN export. Inverse of the parser: internal clock and rights encodings
//! are converted back to the standard FEN fields.

use crate::board::chess_types::{
    Color, PieceCode, CASTLE_DARK_KINGSIDE_LOST, CASTLE_DARK_QUEENSIDE_LOST,
    CASTLE_LIGHT_KINGSIDE_LOST, CASTLE_LIGHT_QUEENSIDE_LOST, EMPTY,
};
use crate::board::position::{Position, FIFTY_MOVE_START};
use crate::utils::algebraic::square_to_algebraic;

pub fn fen_from_position(position: &Position) -> String {
    let dark_to_move = position.side_to_move() == Color::Dark;

    let mut fen = String::with_capacity(90);
    write_placement(&position.squares, &mut fen);

    fen.push(' ');
    fen.push(if dark_to_move { 'b' } else { 'w' });

    fen.push(' ');
    write_castling(position.castling_rights, &mut fen);

    fen.push(' ');
    if position.en_passant_file == 0 {
        fen.push('-');
    } else {
        // Only the file is stored; the target rank follows from whose pawn
        // just double-stepped.
        let rank = if dark_to_move { 2 } else { 5 };
        fen.push_str(&square_to_algebraic(rank * 8 + (position.en_passant_file - 1)));
    }

    let halfmove = FIFTY_MOVE_START - position.fifty_move_counter.min(FIFTY_MOVE_START);
    let fullmove = position.turn / 2 + 1;
    fen.push_str(&format!(" {halfmove} {fullmove}"));
    fen
}

fn write_placement(squares: &[PieceCode; 64], fen: &mut String) {
    for rank in (0..8usize).rev() {
        let mut empty_run = 0u32;
        for file in 0..8usize {
            let piece = squares[rank * 8 + file];
            if piece == EMPTY {
                empty_run += 1;
                continue;
            }
            if empty_run > 0 {
                fen.push_str(&empty_run.to_string());
                empty_run = 0;
            }
            fen.push(piece_symbol(piece));
        }
        if empty_run > 0 {
            fen.push_str(&empty_run.to_string());
        }
        if rank > 0 {
            fen.push('/');
        }
    }
}

fn piece_symbol(piece: PieceCode) -> char {
    let symbol = match (piece - 1) % 6 + 1 {
        1 => 'k',
        2 => 'q',
        3 => 'r',
        4 => 'b',
        5 => 'n',
        _ => 'p',
    };
    if piece <= 6 {
        symbol.to_ascii_uppercase()
    } else {
        symbol
    }
}

fn write_castling(castling_rights: u8, fen: &mut String) {
    let letters = [
        (CASTLE_LIGHT_KINGSIDE_LOST, 'K'),
        (CASTLE_LIGHT_QUEENSIDE_LOST, 'Q'),
        (CASTLE_DARK_KINGSIDE_LOST, 'k'),
        (CASTLE_DARK_QUEENSIDE_LOST, 'q'),
    ];
    let mut any = false;
    for (lost_bit, letter) in letters {
        if castling_rights & lost_bit == 0 {
            fen.push(letter);
            any = true;
        }
    }
    if !any {
        fen.push('-');
    }
}

#[cfg(test)]
mod tests {
    use crate::board::position::{Position, STARTING_POSITION_FEN};

    #[test]
    fn starting_position_round_trips() {
        let position = Position::new_game();
        assert_eq!(position.to_fen(), STARTING_POSITION_FEN);
    }

    #[test]
    fn arbitrary_positions_round_trip() {
        let fens = [
            "r3k2r/p1ppqpb1/bn2pnp1/3PN3/1p2P3/2N2Q1p/PPPBBPPP/R3K2R w KQkq - 0 1",
            "8/2p5/3p4/KP5r/1R3p1k/8/4P1P1/8 w - - 12 41",
            "rnbqkbnr/ppp1pppp/8/8/3pP3/8/PPPP1PPP/RNBQKBNR b KQkq e3 0 2",
            "4k3/8/8/8/8/8/8/4K2R w K - 30 57",
        ];
        for fen in fens {
            let position = Position::from_fen(fen).expect("fen should parse");
            assert_eq!(position.to_fen(), fen, "round trip failed for {fen}");
        }
    }

    #[test]
    fn en_passant_square_reappears_after_a_double_step() {
        let mut position = Position::new_game();
        let mv = position.find_move(12, 28, None).expect("e4 should be legal");
        position.make_move(mv);
        let fen = position.to_fen();
        assert!(fen.contains(" e3 "), "expected e3 marker in '{fen}'");
    }
}
