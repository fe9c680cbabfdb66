//! Pluggable board evaluation and terminal scoring.
//!
//! Search delegates static scoring to `BoardScorer` so alternate heuristics
//! can be swapped without touching the search code.

use crate::game_state::chess_types::*;

/// Magnitude of a mate found at the root. Mates further away score
/// `MATE_SCORE - ply`, so shorter mates rank higher.
pub const MATE_SCORE: i32 = 100_000;

/// Scores within this distance of `MATE_SCORE` encode a forced mate.
pub const MATE_THRESHOLD: i32 = MATE_SCORE - 1_000;

pub trait BoardScorer: Send + Sync {
    /// Score from the perspective of `perspective`.
    fn score(&self, position: &Position, perspective: Color) -> i32;
}

#[derive(Debug, Clone, Copy, Default)]
pub struct MaterialScorer;

impl MaterialScorer {
    #[inline]
    pub const fn piece_value(piece: PieceKind) -> i32 {
        match piece {
            PieceKind::Pawn => 100,
            PieceKind::Knight => 320,
            PieceKind::Bishop => 330,
            PieceKind::Rook => 500,
            PieceKind::Queen => 900,
            PieceKind::King => 20_000,
        }
    }

    fn material_balance_white_minus_black(position: &Position) -> i32 {
        let mut score = 0i32;
        for color in Color::ALL {
            let sign = match color {
                Color::White => 1,
                Color::Black => -1,
            };
            for square in position.pieces_squares(color).iter() {
                if let Some(piece) = position.piece_at(square) {
                    score += sign * Self::piece_value(piece.kind);
                }
            }
        }
        score
    }
}

impl BoardScorer for MaterialScorer {
    fn score(&self, position: &Position, perspective: Color) -> i32 {
        let white_minus_black = Self::material_balance_white_minus_black(position);
        match perspective {
            Color::White => white_minus_black,
            Color::Black => -white_minus_black,
        }
    }
}

/// Score of a side with no legal moves, seen by that side: mated at `ply`
/// plies from the root, or a stalemate draw.
#[inline]
pub fn terminal_score(in_check: bool, ply: u32) -> i32 {
    if in_check {
        -(MATE_SCORE - ply as i32)
    } else {
        0
    }
}

/// Full leaf evaluation from `perspective`: mate and stalemate first, then
/// material.
pub fn evaluate_position<S: BoardScorer + ?Sized>(
    position: &mut Position,
    scorer: &S,
    perspective: Color,
    ply: u32,
) -> i32 {
    match position.game_outcome() {
        Some(GameOutcome::Checkmate { winner }) => {
            let mated = -terminal_score(true, ply);
            if winner == perspective {
                mated
            } else {
                -mated
            }
        }
        Some(GameOutcome::Stalemate) => 0,
        None => scorer.score(position, perspective),
    }
}

#[inline]
pub fn is_mate_score(score: i32) -> bool {
    score.abs() >= MATE_THRESHOLD
}
