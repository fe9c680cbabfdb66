//! Attack detection and check/checkmate/stalemate queries.
//!
//! The free functions work on a shared `&Position` and only look at attack
//! patterns: a pawn threatens its two forward diagonals whether or not a
//! capture there would also promote, and pins against the attacker's own
//! king are ignored. `CheckScanner` wraps them for a borrowed position and
//! adds the terminal predicates, which need the movement validator.

use std::ops::ControlFlow;

use crate::game_state::chess_types::*;
use crate::move_generation::movement_validator::MovementValidator;
use crate::move_generation::piece_patterns::{
    BISHOP_DIRECTIONS, KING_OFFSETS, KNIGHT_OFFSETS, ROOK_DIRECTIONS,
};

/// Visit every piece of color `by` attacking `target`, stopping early when the
/// visitor breaks.
fn scan_attackers(
    position: &Position,
    target: Square,
    by: Color,
    mut visit: impl FnMut(Square, ColoredPiece) -> ControlFlow<()>,
) -> ControlFlow<()> {
    if !target.is_valid() {
        return ControlFlow::Continue(());
    }

    let pawn_row = -by.pawn_direction();
    for d_col in [-1, 1] {
        if let Some(from) = target.offset(pawn_row, d_col) {
            if let Some(piece) = position.piece_at(from) {
                if piece.color == by && piece.kind == PieceKind::Pawn {
                    visit(from, piece)?;
                }
            }
        }
    }

    for (d_row, d_col) in KNIGHT_OFFSETS {
        if let Some(from) = target.offset(d_row, d_col) {
            if let Some(piece) = position.piece_at(from) {
                if piece.color == by && piece.kind == PieceKind::Knight {
                    visit(from, piece)?;
                }
            }
        }
    }

    for (directions, line_kind) in [
        (ROOK_DIRECTIONS, PieceKind::Rook),
        (BISHOP_DIRECTIONS, PieceKind::Bishop),
    ] {
        for (d_row, d_col) in directions {
            let mut cursor = target;
            while let Some(next) = cursor.offset(d_row, d_col) {
                cursor = next;
                let Some(piece) = position.piece_at(next) else {
                    continue;
                };
                if piece.color == by && (piece.kind == line_kind || piece.kind == PieceKind::Queen) {
                    visit(next, piece)?;
                }
                break;
            }
        }
    }

    for (d_row, d_col) in KING_OFFSETS {
        if let Some(from) = target.offset(d_row, d_col) {
            if let Some(piece) = position.piece_at(from) {
                if piece.color == by && piece.kind == PieceKind::King {
                    visit(from, piece)?;
                }
            }
        }
    }

    ControlFlow::Continue(())
}

/// True when any piece of color `by` attacks `square`.
pub fn is_square_attacked(position: &Position, square: Square, by: Color) -> bool {
    scan_attackers(position, square, by, |_, _| ControlFlow::Break(())).is_break()
}

/// Every piece of color `by` attacking `square`.
pub fn attackers_to_square(position: &Position, square: Square, by: Color) -> Vec<(Square, ColoredPiece)> {
    let mut attackers = Vec::new();
    let _ = scan_attackers(position, square, by, |from, piece| {
        attackers.push((from, piece));
        ControlFlow::Continue(())
    });
    attackers
}

/// True when `color`'s king stands on an attacked square. A side without a
/// king is never in check.
pub fn is_in_check(position: &Position, color: Color) -> bool {
    position
        .king_square(color)
        .is_some_and(|king| is_square_attacked(position, king, color.opposite()))
}

/// Check and terminal-state queries over a borrowed position.
pub struct CheckScanner<'a> {
    position: &'a mut Position,
}

impl<'a> CheckScanner<'a> {
    #[inline]
    pub fn new(position: &'a mut Position) -> Self {
        Self { position }
    }

    #[inline]
    pub fn is_in_check(&self, color: Color) -> bool {
        is_in_check(self.position, color)
    }

    /// True when a piece of the side opposing `color` attacks `square`.
    #[inline]
    pub fn is_square_in_check(&self, square: Square, color: Color) -> bool {
        is_square_attacked(self.position, square, color.opposite())
    }

    pub fn is_in_checkmate(&mut self, color: Color) -> bool {
        self.is_in_check(color) && !self.are_there_legal_moves(color)
    }

    pub fn is_in_stalemate(&mut self, color: Color) -> bool {
        !self.is_in_check(color) && !self.are_there_legal_moves(color)
    }

    /// Stops at the first legal move found for `color`.
    pub fn are_there_legal_moves(&mut self, color: Color) -> bool {
        MovementValidator::new(self.position).has_legal_move(color)
    }
}
