//! Core value types shared across the engine.
//!
//! The board itself stores pieces as small integer codes (`1..=12`, `0` for
//! an empty square) so the mailbox array stays a flat `[u8; 64]`. The typed
//! views (`Color`, `PieceKind`) wrap those codes at the API seams.

/// Board square index (`0..=63`), rank-major with `0 == a1`.
pub type Square = u8;

/// Piece code stored on the board. `0` is empty, `1..=6` light pieces,
/// `7..=12` dark pieces, both in King/Queen/Rook/Bishop/Knight/Pawn order.
pub type PieceCode = u8;

pub const EMPTY: PieceCode = 0;

/// Side to move.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Color {
    Light,
    Dark,
}

impl Color {
    #[inline]
    pub const fn index(self) -> usize {
        match self {
            Color::Light => 0,
            Color::Dark => 1,
        }
    }

    #[inline]
    pub const fn opposite(self) -> Self {
        match self {
            Color::Light => Color::Dark,
            Color::Dark => Color::Light,
        }
    }
}

/// Piece kind independent of color.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PieceKind {
    King,
    Queen,
    Rook,
    Bishop,
    Knight,
    Pawn,
}

impl PieceKind {
    /// Absolute type code (`1..=6`), the color-independent half of a piece code.
    #[inline]
    pub const fn absolute(self) -> u8 {
        match self {
            PieceKind::King => 1,
            PieceKind::Queen => 2,
            PieceKind::Rook => 3,
            PieceKind::Bishop => 4,
            PieceKind::Knight => 5,
            PieceKind::Pawn => 6,
        }
    }

    #[inline]
    pub const fn from_absolute(code: u8) -> Option<Self> {
        match code {
            1 => Some(PieceKind::King),
            2 => Some(PieceKind::Queen),
            3 => Some(PieceKind::Rook),
            4 => Some(PieceKind::Bishop),
            5 => Some(PieceKind::Knight),
            6 => Some(PieceKind::Pawn),
            _ => None,
        }
    }

    /// Full piece code for this kind in the given color.
    #[inline]
    pub const fn code(self, color: Color) -> PieceCode {
        match color {
            Color::Light => self.absolute(),
            Color::Dark => self.absolute() + 6,
        }
    }
}

#[inline]
pub const fn is_light_piece(code: PieceCode) -> bool {
    code >= 1 && code <= 6
}

#[inline]
pub const fn piece_color(code: PieceCode) -> Option<Color> {
    match code {
        1..=6 => Some(Color::Light),
        7..=12 => Some(Color::Dark),
        _ => None,
    }
}

/// Absolute type (`1..=6`) of a piece code, `0` for empty.
#[inline]
pub const fn absolute_type(code: PieceCode) -> u8 {
    match code {
        1..=6 => code,
        7..=12 => code - 6,
        _ => 0,
    }
}

/// Simplified material scale (pawn = 1) used by legality flags, move
/// ordering, and the trade/mop-up evaluation terms.
#[inline]
pub const fn simplified_material_value(code: PieceCode) -> i32 {
    match absolute_type(code) {
        2 => 9,
        3 => 5,
        4 | 5 => 3,
        6 => 1,
        _ => 0,
    }
}

#[inline]
pub const fn square_file(square: Square) -> u8 {
    square % 8
}

#[inline]
pub const fn square_rank(square: Square) -> u8 {
    square / 8
}

/// Castling rights mask. A set bit means the right has been *forfeited*,
/// so `0` is the full-rights starting state.
pub type CastlingRights = u8;

pub const CASTLE_LIGHT_QUEENSIDE_LOST: CastlingRights = 1 << 0;
pub const CASTLE_DARK_QUEENSIDE_LOST: CastlingRights = 1 << 1;
pub const CASTLE_LIGHT_KINGSIDE_LOST: CastlingRights = 1 << 2;
pub const CASTLE_DARK_KINGSIDE_LOST: CastlingRights = 1 << 3;

/// Special-move classification carried by a [`Move`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MoveKind {
    Normal,
    EnPassant,
    PromoteQueen,
    PromoteRook,
    PromoteBishop,
    PromoteKnight,
    CastleQueenside,
    CastleKingside,
}

impl MoveKind {
    #[inline]
    pub const fn code(self) -> u8 {
        match self {
            MoveKind::Normal => 0,
            MoveKind::EnPassant => 1,
            MoveKind::PromoteQueen => 2,
            MoveKind::PromoteRook => 3,
            MoveKind::PromoteBishop => 4,
            MoveKind::PromoteKnight => 5,
            MoveKind::CastleQueenside => 6,
            MoveKind::CastleKingside => 7,
        }
    }

    #[inline]
    pub const fn is_promotion(self) -> bool {
        matches!(
            self,
            MoveKind::PromoteQueen
                | MoveKind::PromoteRook
                | MoveKind::PromoteBishop
                | MoveKind::PromoteKnight
        )
    }

    /// The piece kind a promotion move creates. The promotion codes `2..=5`
    /// line up with the absolute type codes for Queen/Rook/Bishop/Knight.
    #[inline]
    pub const fn promotion_kind(self) -> Option<PieceKind> {
        match self {
            MoveKind::PromoteQueen => Some(PieceKind::Queen),
            MoveKind::PromoteRook => Some(PieceKind::Rook),
            MoveKind::PromoteBishop => Some(PieceKind::Bishop),
            MoveKind::PromoteKnight => Some(PieceKind::Knight),
            _ => None,
        }
    }

    #[inline]
    pub const fn is_castle(self) -> bool {
        matches!(self, MoveKind::CastleQueenside | MoveKind::CastleKingside)
    }
}

/// A move as generated and applied. Identity is the full
/// `(start, end, kind)` triple; promotion variants to the same destination
/// are distinct moves.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Move {
    pub start: Square,
    pub end: Square,
    pub kind: MoveKind,
}

impl Move {
    #[inline]
    pub const fn new(start: Square, end: Square) -> Self {
        Self {
            start,
            end,
            kind: MoveKind::Normal,
        }
    }

    #[inline]
    pub const fn with_kind(start: Square, end: Square, kind: MoveKind) -> Self {
        Self { start, end, kind }
    }
}

/// Terminal state of a game, refreshed after every applied move.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum GameOutcome {
    InProgress,
    LightWin,
    DarkWin,
    Stalemate,
    FiftyMoveDraw,
    RepetitionDraw,
}

impl GameOutcome {
    #[inline]
    pub const fn is_decided(self) -> bool {
        !matches!(self, GameOutcome::InProgress)
    }

    #[inline]
    pub const fn is_draw(self) -> bool {
        matches!(
            self,
            GameOutcome::Stalemate | GameOutcome::FiftyMoveDraw | GameOutcome::RepetitionDraw
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn piece_codes_round_trip_through_kind_and_color() {
        for kind in [
            PieceKind::King,
            PieceKind::Queen,
            PieceKind::Rook,
            PieceKind::Bishop,
            PieceKind::Knight,
            PieceKind::Pawn,
        ] {
            for color in [Color::Light, Color::Dark] {
                let code = kind.code(color);
                assert_eq!(piece_color(code), Some(color));
                assert_eq!(PieceKind::from_absolute(absolute_type(code)), Some(kind));
            }
        }
        assert_eq!(piece_color(EMPTY), None);
    }

    #[test]
    fn promotion_kinds_match_their_codes() {
        assert_eq!(
            MoveKind::PromoteQueen.promotion_kind(),
            Some(PieceKind::Queen)
        );
        assert_eq!(
            MoveKind::PromoteKnight.promotion_kind(),
            Some(PieceKind::Knight)
        );
        assert_eq!(MoveKind::EnPassant.promotion_kind(), None);
        assert!(MoveKind::CastleKingside.is_castle());
        assert!(!MoveKind::PromoteRook.is_castle());
    }

    #[test]
    fn simplified_material_uses_pawn_scale() {
        assert_eq!(simplified_material_value(PieceKind::Queen.code(Color::Light)), 9);
        assert_eq!(simplified_material_value(PieceKind::Pawn.code(Color::Dark)), 1);
        assert_eq!(simplified_material_value(PieceKind::King.code(Color::Dark)), 0);
        assert_eq!(simplified_material_value(EMPTY), 0);
    }
}
