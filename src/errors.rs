//! Errors used throughout the rules engine.
//!
//! `ChessError` is the single error type returned by position loading,
//! notation parsing and validated move application. Every failing operation
//! leaves the position it was called on untouched, so callers may report the
//! error and carry on with the same state.
//!
//! Terminal positions (checkmate, stalemate) are not errors. Callers check
//! them through the check-scanner predicates or `Position::game_outcome`.

use thiserror::Error;

use crate::game_state::chess_types::Move;

/// Why a submitted move was rejected by the movement validator.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
pub enum IllegalMoveReason {
    /// A coordinate lies outside `0..=7`.
    #[error("square is off the board")]
    OffBoard,
    #[error("no piece on origin square")]
    NoPieceOnOrigin,
    #[error("piece does not belong to side to move")]
    WrongTurn,
    #[error("destination holds a friendly piece")]
    CapturesOwnPiece,
    #[error("piece cannot move that way")]
    BadShape,
    /// A pawn reached the far rank without naming a promotion piece.
    #[error("pawn move to last rank needs a promotion")]
    MissingPromotion,
    /// A promotion piece was given for a move that is not a promotion, or the
    /// named piece is not a legal promotion target.
    #[error("promotion is not allowed here")]
    UnexpectedPromotion,
    #[error("move leaves own king in check")]
    LeavesKingInCheck,
}

/// Unified error type for the crate.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ChessError {
    #[error("invalid FEN: {0}")]
    InvalidFen(String),

    #[error("invalid square: {0}")]
    InvalidSquare(String),

    /// A UCI move string that is malformed regardless of position.
    #[error("invalid move string: {0}")]
    InvalidMoveString(String),

    #[error("illegal move {mv}: {reason}")]
    IllegalMove { mv: Move, reason: IllegalMoveReason },

    /// Notation that matched no legal move in the current position.
    #[error("no legal move matches '{0}'")]
    UnknownMove(String),

    /// Notation that matched more than one legal move.
    #[error("'{0}' is ambiguous in this position")]
    AmbiguousMove(String),

    /// An engine option name or value that could not be applied.
    #[error("invalid option: {0}")]
    InvalidOption(String),
}

pub type ChessResult<T> = Result<T, ChessError>;

#[cfg(test)]
mod tests {
    use super::*;
    use crate::game_state::chess_types::Square;

    #[test]
    fn illegal_move_message_includes_reason() {
        let err = ChessError::IllegalMove {
            mv: Move::new(Square::new(1, 4), Square::new(4, 4)),
            reason: IllegalMoveReason::BadShape,
        };
        assert_eq!(err.to_string(), "illegal move e2e5: piece cannot move that way");
        assert_eq!(
            IllegalMoveReason::LeavesKingInCheck.to_string(),
            "move leaves own king in check"
        );
        let as_std: &dyn std::error::Error = &IllegalMoveReason::OffBoard;
        assert_eq!(as_std.to_string(), "square is off the board");
    }
}
