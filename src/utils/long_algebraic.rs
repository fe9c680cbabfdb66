//! UCI move strings: `e2e4`, `e7e8q`.
//!
//! Parsing checks the string's form only. Legality is left to the movement
//! validator.

use crate::errors::{ChessError, ChessResult};
use crate::game_state::chess_types::*;
use crate::utils::algebraic::algebraic_to_square;

#[inline]
pub fn move_to_long_algebraic(mv: Move) -> String {
    mv.to_string()
}

/// Parse a 4- or 5-character UCI move. A promotion suffix must be one of
/// `q r b n` and the destination must be the far rank of the side to move.
pub fn long_algebraic_to_move(long_algebraic: &str, position: &Position) -> ChessResult<Move> {
    let bad = || ChessError::InvalidMoveString(long_algebraic.to_owned());
    if !long_algebraic.is_ascii() || !(4..=5).contains(&long_algebraic.len()) {
        return Err(bad());
    }

    let from = algebraic_to_square(&long_algebraic[0..2]).map_err(|_| bad())?;
    let to = algebraic_to_square(&long_algebraic[2..4]).map_err(|_| bad())?;

    let promotion = match long_algebraic[4..].chars().next() {
        None => None,
        Some(ch) => {
            let kind = PieceKind::from_letter(ch)
                .filter(|kind| kind.is_promotion_target())
                .ok_or_else(bad)?;
            if to.row != position.turn().promotion_row() {
                return Err(bad());
            }
            Some(kind)
        }
    };

    Ok(Move {
        from,
        to,
        promotion,
    })
}
