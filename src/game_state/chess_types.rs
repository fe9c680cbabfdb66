//! Core value types shared by every subsystem.
//!
//! Squares are `(row, col)` pairs with `row` 0 holding White's back rank and
//! `col` 0 the a-file. Coordinates are signed so that programmatic callers can
//! describe off-board squares, which validity checks reject.

use std::fmt;

pub use crate::game_state::move_context::{MoveContext, MoveHistory};
pub use crate::game_state::position::{GameOutcome, Position};

/// Side to move.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Color {
    White,
    Black,
}

impl Color {
    pub const ALL: [Color; 2] = [Color::White, Color::Black];

    #[inline]
    pub const fn index(self) -> usize {
        match self {
            Color::White => 0,
            Color::Black => 1,
        }
    }

    #[inline]
    pub const fn opposite(self) -> Self {
        match self {
            Color::White => Color::Black,
            Color::Black => Color::White,
        }
    }

    /// Row delta of a single pawn push.
    #[inline]
    pub const fn pawn_direction(self) -> i8 {
        match self {
            Color::White => 1,
            Color::Black => -1,
        }
    }

    #[inline]
    pub const fn home_row(self) -> i8 {
        match self {
            Color::White => 0,
            Color::Black => 7,
        }
    }

    #[inline]
    pub const fn pawn_start_row(self) -> i8 {
        match self {
            Color::White => 1,
            Color::Black => 6,
        }
    }

    #[inline]
    pub const fn promotion_row(self) -> i8 {
        match self {
            Color::White => 7,
            Color::Black => 0,
        }
    }
}

/// Piece kind (color is carried separately by `ColoredPiece`).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum PieceKind {
    Pawn,
    Knight,
    Bishop,
    Rook,
    Queen,
    King,
}

impl PieceKind {
    pub const ALL: [PieceKind; 6] = [
        PieceKind::Pawn,
        PieceKind::Knight,
        PieceKind::Bishop,
        PieceKind::Rook,
        PieceKind::Queen,
        PieceKind::King,
    ];

    /// Pieces a pawn may promote to, strongest first.
    pub const PROMOTION_TARGETS: [PieceKind; 4] = [
        PieceKind::Queen,
        PieceKind::Rook,
        PieceKind::Bishop,
        PieceKind::Knight,
    ];

    #[inline]
    pub const fn index(self) -> usize {
        match self {
            PieceKind::Pawn => 0,
            PieceKind::Knight => 1,
            PieceKind::Bishop => 2,
            PieceKind::Rook => 3,
            PieceKind::Queen => 4,
            PieceKind::King => 5,
        }
    }

    #[inline]
    pub const fn is_promotion_target(self) -> bool {
        matches!(
            self,
            PieceKind::Knight | PieceKind::Bishop | PieceKind::Rook | PieceKind::Queen
        )
    }

    /// Lowercase letter used by FEN and UCI promotion suffixes.
    pub const fn letter(self) -> char {
        match self {
            PieceKind::Pawn => 'p',
            PieceKind::Knight => 'n',
            PieceKind::Bishop => 'b',
            PieceKind::Rook => 'r',
            PieceKind::Queen => 'q',
            PieceKind::King => 'k',
        }
    }

    pub fn from_letter(ch: char) -> Option<Self> {
        match ch.to_ascii_lowercase() {
            'p' => Some(PieceKind::Pawn),
            'n' => Some(PieceKind::Knight),
            'b' => Some(PieceKind::Bishop),
            'r' => Some(PieceKind::Rook),
            'q' => Some(PieceKind::Queen),
            'k' => Some(PieceKind::King),
            _ => None,
        }
    }
}

/// A piece of a given color. Empty squares are `None` at the board level.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct ColoredPiece {
    pub color: Color,
    pub kind: PieceKind,
}

impl ColoredPiece {
    #[inline]
    pub const fn new(color: Color, kind: PieceKind) -> Self {
        Self { color, kind }
    }

    /// Index of this piece's plane in the `0..12` piece-plane range.
    #[inline]
    pub const fn plane_index(self) -> usize {
        self.color.index() * 6 + self.kind.index()
    }

    pub fn fen_char(self) -> char {
        match self.color {
            Color::White => self.kind.letter().to_ascii_uppercase(),
            Color::Black => self.kind.letter(),
        }
    }

    pub fn from_fen_char(ch: char) -> Option<Self> {
        let color = if ch.is_ascii_uppercase() {
            Color::White
        } else if ch.is_ascii_lowercase() {
            Color::Black
        } else {
            return None;
        };
        PieceKind::from_letter(ch).map(|kind| Self::new(color, kind))
    }
}

/// Board coordinate. Off-board values are representable and rejected by
/// `is_valid`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Square {
    pub row: i8,
    pub col: i8,
}

impl Square {
    #[inline]
    pub const fn new(row: i8, col: i8) -> Self {
        Self { row, col }
    }

    #[inline]
    pub const fn is_valid(self) -> bool {
        self.row >= 0 && self.row < 8 && self.col >= 0 && self.col < 8
    }

    /// Dense `0..64` index (`a1 == 0`, `h8 == 63`). Only meaningful for valid
    /// squares.
    #[inline]
    pub const fn index(self) -> usize {
        (self.row as usize) * 8 + self.col as usize
    }

    #[inline]
    pub const fn from_index(index: usize) -> Self {
        Self {
            row: (index / 8) as i8,
            col: (index % 8) as i8,
        }
    }

    /// The square shifted by `(d_row, d_col)`, if it stays on the board.
    #[inline]
    pub fn offset(self, d_row: i8, d_col: i8) -> Option<Self> {
        let next = Self::new(self.row.saturating_add(d_row), self.col.saturating_add(d_col));
        next.is_valid().then_some(next)
    }

    pub fn all() -> impl Iterator<Item = Square> {
        (0..64).map(Square::from_index)
    }
}

impl fmt::Display for Square {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if !self.is_valid() {
            return write!(f, "??");
        }
        write!(
            f,
            "{}{}",
            char::from(b'a' + self.col as u8),
            char::from(b'1' + self.row as u8)
        )
    }
}

/// A move between two squares with an optional promotion piece. The promoted
/// piece always takes the mover's color.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Move {
    pub from: Square,
    pub to: Square,
    pub promotion: Option<PieceKind>,
}

impl Move {
    #[inline]
    pub const fn new(from: Square, to: Square) -> Self {
        Self {
            from,
            to,
            promotion: None,
        }
    }

    #[inline]
    pub const fn with_promotion(from: Square, to: Square, promotion: PieceKind) -> Self {
        Self {
            from,
            to,
            promotion: Some(promotion),
        }
    }
}

/// Formats as a UCI move string, e.g. `e2e4` or `a7a8q`.
impl fmt::Display for Move {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}{}", self.from, self.to)?;
        if let Some(promotion) = self.promotion {
            write!(f, "{}", promotion.letter())?;
        }
        Ok(())
    }
}

/// Per-color castling rights bitmasks.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub struct CastlingState {
    white: u8,
    black: u8,
}

impl CastlingState {
    pub const KING_SIDE: u8 = 1 << 0;
    pub const QUEEN_SIDE: u8 = 1 << 1;
    pub const BOTH_SIDES: u8 = Self::KING_SIDE | Self::QUEEN_SIDE;

    #[inline]
    pub const fn none() -> Self {
        Self { white: 0, black: 0 }
    }

    #[inline]
    pub const fn all() -> Self {
        Self {
            white: Self::BOTH_SIDES,
            black: Self::BOTH_SIDES,
        }
    }

    #[inline]
    pub const fn rights(self, color: Color) -> u8 {
        match color {
            Color::White => self.white,
            Color::Black => self.black,
        }
    }

    #[inline]
    pub const fn has(self, color: Color, side: u8) -> bool {
        self.rights(color) & side != 0
    }

    #[inline]
    pub fn set_rights(&mut self, color: Color, rights: u8) {
        let masked = rights & Self::BOTH_SIDES;
        match color {
            Color::White => self.white = masked,
            Color::Black => self.black = masked,
        }
    }

    #[inline]
    pub fn grant(&mut self, color: Color, side: u8) {
        self.set_rights(color, self.rights(color) | side);
    }

    #[inline]
    pub fn revoke(&mut self, color: Color, side: u8) {
        self.set_rights(color, self.rights(color) & !side);
    }

    /// Combined `0..16` index: WK=1, WQ=2, BK=4, BQ=8.
    #[inline]
    pub const fn combined_index(self) -> usize {
        (self.white as usize) | ((self.black as usize) << 2)
    }
}

/// Set of board squares backed by a 64-bit mask.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub struct SquareSet(u64);

impl SquareSet {
    #[inline]
    pub const fn empty() -> Self {
        Self(0)
    }

    #[inline]
    pub const fn bits(self) -> u64 {
        self.0
    }

    #[inline]
    pub fn insert(&mut self, square: Square) {
        self.0 |= 1u64 << square.index();
    }

    #[inline]
    pub fn remove(&mut self, square: Square) {
        self.0 &= !(1u64 << square.index());
    }

    #[inline]
    pub const fn contains(self, square: Square) -> bool {
        square.is_valid() && self.0 & (1u64 << square.index()) != 0
    }

    #[inline]
    pub const fn len(self) -> usize {
        self.0.count_ones() as usize
    }

    #[inline]
    pub const fn is_empty(self) -> bool {
        self.0 == 0
    }

    pub fn iter(self) -> impl Iterator<Item = Square> {
        let mut bits = self.0;
        std::iter::from_fn(move || {
            if bits == 0 {
                return None;
            }
            let index = bits.trailing_zeros() as usize;
            bits &= bits - 1;
            Some(Square::from_index(index))
        })
    }
}
