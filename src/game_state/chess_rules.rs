//! Canonical chess-rule constants.
//!
//! Stores the standard starting FEN and the fixed castling geometry shared by
//! move validation, move application and hashing.

use crate::game_state::chess_types::{CastlingState, Color, Square};

/// Standard chess starting position in Forsyth-Edwards Notation (FEN).
pub const STARTING_POSITION_FEN: &str = "rnbqkbnr/pppppppp/8/8/8/8/PPPPPPPP/RNBQKBNR w KQkq - 0 1";

pub const KING_HOME_COL: i8 = 4;
pub const KING_SIDE_ROOK_COL: i8 = 7;
pub const QUEEN_SIDE_ROOK_COL: i8 = 0;

#[inline]
pub const fn king_home_square(color: Color) -> Square {
    Square::new(color.home_row(), KING_HOME_COL)
}

/// Castling side (`CastlingState::KING_SIDE` / `QUEEN_SIDE`) whose rook starts
/// on `square` for `color`, if any.
pub fn castling_side_for_rook_home(color: Color, square: Square) -> Option<u8> {
    if square.row != color.home_row() {
        return None;
    }
    match square.col {
        KING_SIDE_ROOK_COL => Some(CastlingState::KING_SIDE),
        QUEEN_SIDE_ROOK_COL => Some(CastlingState::QUEEN_SIDE),
        _ => None,
    }
}

/// Rook home square for a castling side.
pub const fn rook_home_square(color: Color, side: u8) -> Square {
    if side == CastlingState::KING_SIDE {
        Square::new(color.home_row(), KING_SIDE_ROOK_COL)
    } else {
        Square::new(color.home_row(), QUEEN_SIDE_ROOK_COL)
    }
}

/// King destination for a castling side.
pub const fn castling_king_target(color: Color, side: u8) -> Square {
    if side == CastlingState::KING_SIDE {
        Square::new(color.home_row(), 6)
    } else {
        Square::new(color.home_row(), 2)
    }
}

/// Rook relocation `(from, to)` for a castling king move ending on `king_to`.
pub fn castling_rook_relocation(color: Color, king_to: Square) -> Option<(Square, Square)> {
    if king_to.row != color.home_row() {
        return None;
    }
    match king_to.col {
        6 => Some((
            Square::new(color.home_row(), KING_SIDE_ROOK_COL),
            Square::new(color.home_row(), 5),
        )),
        2 => Some((
            Square::new(color.home_row(), QUEEN_SIDE_ROOK_COL),
            Square::new(color.home_row(), 3),
        )),
        _ => None,
    }
}
