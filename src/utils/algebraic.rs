//! Square conversions for algebraic coordinates such as `e4`.

use crate::errors::{ChessError, ChessResult};
use crate::game_state::chess_types::Square;

/// Parse a coordinate like `"e4"` into a square.
pub fn algebraic_to_square(square: &str) -> ChessResult<Square> {
    let bytes = square.as_bytes();
    if bytes.len() != 2 {
        return Err(ChessError::InvalidSquare(square.to_owned()));
    }

    let file = bytes[0];
    let rank = bytes[1];
    if !(b'a'..=b'h').contains(&file) || !(b'1'..=b'8').contains(&rank) {
        return Err(ChessError::InvalidSquare(square.to_owned()));
    }

    Ok(Square::new((rank - b'1') as i8, (file - b'a') as i8))
}

/// Format a square as a coordinate like `"e4"`. Off-board squares are an
/// error rather than a placeholder.
pub fn square_to_algebraic(square: Square) -> ChessResult<String> {
    if !square.is_valid() {
        return Err(ChessError::InvalidSquare(format!(
            "({}, {})",
            square.row, square.col
        )));
    }
    Ok(square.to_string())
}

/// File letter `a..=h` for a column, if on the board.
#[inline]
pub fn file_char(col: i8) -> Option<char> {
    (0..8).contains(&col).then(|| char::from(b'a' + col as u8))
}

/// Rank digit `1..=8` for a row, if on the board.
#[inline]
pub fn rank_char(row: i8) -> Option<char> {
    (0..8).contains(&row).then(|| char::from(b'1' + row as u8))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn round_trip_square_conversions() {
        assert_eq!(algebraic_to_square("a1").expect("a1 should parse"), Square::new(0, 0));
        assert_eq!(algebraic_to_square("h8").expect("h8 should parse"), Square::new(7, 7));
        assert_eq!(algebraic_to_square("e4").expect("e4 should parse"), Square::new(3, 4));
        assert_eq!(square_to_algebraic(Square::new(0, 0)).expect("a1 converts"), "a1");
        assert_eq!(square_to_algebraic(Square::new(6, 3)).expect("d7 converts"), "d7");
    }

    #[test]
    fn rejects_malformed_and_off_board_input() {
        for bad in ["", "e", "e44", "i1", "a0", "a9", "E4"] {
            assert!(
                matches!(algebraic_to_square(bad), Err(ChessError::InvalidSquare(_))),
                "{bad:?} should be rejected"
            );
        }
        assert!(square_to_algebraic(Square::new(8, 0)).is_err());
        assert!(square_to_algebraic(Square::new(0, -1)).is_err());
        assert_eq!(file_char(2), Some('c'));
        assert_eq!(rank_char(8), None);
    }
}
