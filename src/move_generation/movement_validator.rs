//! Move validation and legal move generation.
//!
//! Generation is pseudo-legal per piece type, then filtered by applying each
//! candidate through the reversible `MoveMaker::move_piece` primitive and
//! testing whether the mover's king is left attacked. The probe always
//! restores the position before returning.

use crate::errors::IllegalMoveReason;
use crate::game_state::chess_rules::{
    castling_king_target, king_home_square, rook_home_square,
};
use crate::game_state::chess_types::*;
use crate::move_generation::check_scanner::{is_in_check, is_square_attacked};
use crate::move_generation::move_maker::MoveMaker;
use crate::move_generation::piece_patterns::{
    slider_directions, squares_between, KING_OFFSETS, KNIGHT_OFFSETS,
};

pub struct MovementValidator<'a> {
    position: &'a mut Position,
}

impl<'a> MovementValidator<'a> {
    #[inline]
    pub fn new(position: &'a mut Position) -> Self {
        Self { position }
    }

    #[inline]
    pub fn is_valid_move(&mut self, mv: Move) -> bool {
        self.validate_move(mv).is_ok()
    }

    /// Full legality check for the side to move, reporting the first rule the
    /// move breaks.
    pub fn validate_move(&mut self, mv: Move) -> Result<(), IllegalMoveReason> {
        if !mv.from.is_valid() || !mv.to.is_valid() {
            return Err(IllegalMoveReason::OffBoard);
        }
        let piece = self
            .position
            .piece_at(mv.from)
            .ok_or(IllegalMoveReason::NoPieceOnOrigin)?;
        if let Some(target) = self.position.piece_at(mv.to) {
            if target.color == piece.color {
                return Err(IllegalMoveReason::CapturesOwnPiece);
            }
        }
        if piece.color != self.position.turn() {
            return Err(IllegalMoveReason::WrongTurn);
        }
        self.check_piece_movement(piece, mv)?;
        if self.leaves_king_in_check(mv) {
            return Err(IllegalMoveReason::LeavesKingInCheck);
        }
        Ok(())
    }

    /// Shape rules for `piece` moving along `mv`, ignoring turn and king
    /// safety.
    pub fn is_valid_piece_movement(&self, piece: ColoredPiece, mv: Move) -> bool {
        self.check_piece_movement(piece, mv).is_ok()
    }

    fn check_piece_movement(&self, piece: ColoredPiece, mv: Move) -> Result<(), IllegalMoveReason> {
        if !mv.from.is_valid() || !mv.to.is_valid() {
            return Err(IllegalMoveReason::OffBoard);
        }
        let shape_ok = match piece.kind {
            PieceKind::Pawn => self.is_valid_pawn_movement(piece.color, mv),
            PieceKind::Knight => is_valid_knight_movement(mv),
            PieceKind::Bishop => self.is_valid_bishop_movement(mv),
            PieceKind::Rook => self.is_valid_rook_movement(mv),
            PieceKind::Queen => self.is_valid_bishop_movement(mv) || self.is_valid_rook_movement(mv),
            PieceKind::King => self.is_valid_king_movement(piece.color, mv),
        };
        if !shape_ok {
            return Err(IllegalMoveReason::BadShape);
        }

        let reaches_far_rank =
            piece.kind == PieceKind::Pawn && mv.to.row == piece.color.promotion_row();
        match mv.promotion {
            None if reaches_far_rank => Err(IllegalMoveReason::MissingPromotion),
            Some(kind) if !reaches_far_rank || !kind.is_promotion_target() => {
                Err(IllegalMoveReason::UnexpectedPromotion)
            }
            _ => Ok(()),
        }
    }

    fn is_valid_pawn_movement(&self, color: Color, mv: Move) -> bool {
        let dir = color.pawn_direction();
        let d_row = mv.to.row - mv.from.row;
        let d_col = mv.to.col - mv.from.col;
        let target = self.position.piece_at(mv.to);

        if d_col == 0 {
            if d_row == dir {
                return target.is_none();
            }
            if d_row == 2 * dir && mv.from.row == color.pawn_start_row() {
                let middle = Square::new(mv.from.row + dir, mv.from.col);
                return target.is_none() && self.position.piece_at(middle).is_none();
            }
            return false;
        }

        if d_col.abs() == 1 && d_row == dir {
            return match target {
                Some(piece) => piece.color != color,
                None => self.is_en_passant_capture(color, mv),
            };
        }

        false
    }

    /// Diagonal pawn step onto the en-passant target with an enemy pawn
    /// standing beside the mover.
    fn is_en_passant_capture(&self, color: Color, mv: Move) -> bool {
        if self.position.en_passant_square() != Some(mv.to) {
            return false;
        }
        let victim_square = Square::new(mv.from.row, mv.to.col);
        self.position.piece_at(victim_square)
            == Some(ColoredPiece::new(color.opposite(), PieceKind::Pawn))
    }

    fn is_valid_bishop_movement(&self, mv: Move) -> bool {
        let d_row = mv.to.row - mv.from.row;
        let d_col = mv.to.col - mv.from.col;
        d_row != 0 && d_row.abs() == d_col.abs() && self.is_path_clear(mv.from, mv.to)
    }

    fn is_valid_rook_movement(&self, mv: Move) -> bool {
        let d_row = mv.to.row - mv.from.row;
        let d_col = mv.to.col - mv.from.col;
        (d_row == 0) != (d_col == 0) && self.is_path_clear(mv.from, mv.to)
    }

    fn is_valid_king_movement(&self, color: Color, mv: Move) -> bool {
        let d_row = mv.to.row - mv.from.row;
        let d_col = mv.to.col - mv.from.col;
        if d_row.abs().max(d_col.abs()) == 1 {
            return true;
        }
        if d_row != 0 || d_col.abs() != 2 || mv.from != king_home_square(color) {
            return false;
        }
        let side = if d_col > 0 {
            CastlingState::KING_SIDE
        } else {
            CastlingState::QUEEN_SIDE
        };
        self.can_castle(color, side)
    }

    fn is_path_clear(&self, from: Square, to: Square) -> bool {
        match squares_between(from, to) {
            Some(mut between) => between.all(|sq| self.position.piece_at(sq).is_none()),
            None => false,
        }
    }

    /// Castling rule: right still held, king and rook on their home squares,
    /// nothing between them, and the king's start, transit and destination
    /// squares not attacked.
    pub fn can_castle(&self, color: Color, side: u8) -> bool {
        if !self.position.castling_state().has(color, side) {
            return false;
        }
        let king_from = king_home_square(color);
        let rook_from = rook_home_square(color, side);
        if self.position.piece_at(king_from) != Some(ColoredPiece::new(color, PieceKind::King))
            || self.position.piece_at(rook_from) != Some(ColoredPiece::new(color, PieceKind::Rook))
        {
            return false;
        }
        if !self.is_path_clear(king_from, rook_from) {
            return false;
        }

        let king_to = castling_king_target(color, side);
        let transit = Square::new(king_from.row, (king_from.col + king_to.col) / 2);
        let enemy = color.opposite();
        [king_from, transit, king_to]
            .into_iter()
            .all(|sq| !is_square_attacked(self.position, sq, enemy))
    }

    /// Apply `mv` with the reversible primitive, test the mover's king, and
    /// undo. A move from an empty square counts as unsafe.
    pub fn leaves_king_in_check(&mut self, mv: Move) -> bool {
        let mut maker = MoveMaker::new(self.position);
        let Some(context) = maker.move_piece(mv) else {
            return true;
        };
        let in_check = is_in_check(self.position, context.moved_piece.color);
        MoveMaker::new(self.position).unmove_piece(&context);
        in_check
    }

    /// All legal moves for `color`, whether or not it is that side's turn.
    pub fn get_legal_moves(&mut self, color: Color) -> Vec<Move> {
        let mut candidates = Vec::with_capacity(48);
        for square in self.position.pieces_squares(color).iter() {
            self.pseudo_legal_moves_from(square, &mut candidates);
        }
        candidates.retain(|mv| !self.leaves_king_in_check(*mv));
        candidates
    }

    /// Legal moves of the piece standing on `square`.
    pub fn get_legal_moves_from(&mut self, square: Square) -> Vec<Move> {
        let mut candidates = Vec::new();
        self.pseudo_legal_moves_from(square, &mut candidates);
        candidates.retain(|mv| !self.leaves_king_in_check(*mv));
        candidates
    }

    /// Stops at the first legal move found.
    pub fn has_legal_move(&mut self, color: Color) -> bool {
        let mut candidates = Vec::with_capacity(28);
        for square in self.position.pieces_squares(color).iter() {
            candidates.clear();
            self.pseudo_legal_moves_from(square, &mut candidates);
            if candidates.iter().any(|mv| !self.leaves_king_in_check(*mv)) {
                return true;
            }
        }
        false
    }

    fn pseudo_legal_moves_from(&self, from: Square, out: &mut Vec<Move>) {
        let Some(piece) = self.position.piece_at(from) else {
            return;
        };
        match piece.kind {
            PieceKind::Pawn => self.pawn_moves(from, piece.color, out),
            PieceKind::Knight => self.step_moves(from, piece.color, &KNIGHT_OFFSETS, out),
            PieceKind::King => {
                self.step_moves(from, piece.color, &KING_OFFSETS, out);
                self.castling_moves(from, piece.color, out);
            }
            kind => self.slider_moves(from, piece.color, slider_directions(kind), out),
        }
    }

    fn pawn_moves(&self, from: Square, color: Color, out: &mut Vec<Move>) {
        let dir = color.pawn_direction();

        if let Some(one) = from.offset(dir, 0) {
            if self.position.piece_at(one).is_none() {
                push_pawn_move(color, Move::new(from, one), out);
                if from.row == color.pawn_start_row() {
                    if let Some(two) = one.offset(dir, 0) {
                        if self.position.piece_at(two).is_none() {
                            out.push(Move::new(from, two));
                        }
                    }
                }
            }
        }

        for d_col in [-1, 1] {
            let Some(to) = from.offset(dir, d_col) else {
                continue;
            };
            let mv = Move::new(from, to);
            let captures = match self.position.piece_at(to) {
                Some(piece) => piece.color != color,
                None => self.is_en_passant_capture(color, mv),
            };
            if captures {
                push_pawn_move(color, mv, out);
            }
        }
    }

    fn step_moves(&self, from: Square, color: Color, offsets: &[(i8, i8)], out: &mut Vec<Move>) {
        for &(d_row, d_col) in offsets {
            let Some(to) = from.offset(d_row, d_col) else {
                continue;
            };
            if !matches!(self.position.piece_at(to), Some(piece) if piece.color == color) {
                out.push(Move::new(from, to));
            }
        }
    }

    fn slider_moves(&self, from: Square, color: Color, directions: &[(i8, i8)], out: &mut Vec<Move>) {
        for &(d_row, d_col) in directions {
            let mut cursor = from;
            while let Some(to) = cursor.offset(d_row, d_col) {
                cursor = to;
                match self.position.piece_at(to) {
                    None => out.push(Move::new(from, to)),
                    Some(piece) => {
                        if piece.color != color {
                            out.push(Move::new(from, to));
                        }
                        break;
                    }
                }
            }
        }
    }

    fn castling_moves(&self, from: Square, color: Color, out: &mut Vec<Move>) {
        if from != king_home_square(color) {
            return;
        }
        for side in [CastlingState::KING_SIDE, CastlingState::QUEEN_SIDE] {
            if self.can_castle(color, side) {
                out.push(Move::new(from, castling_king_target(color, side)));
            }
        }
    }
}

#[inline]
fn is_valid_knight_movement(mv: Move) -> bool {
    let d_row = (mv.to.row - mv.from.row).abs();
    let d_col = (mv.to.col - mv.from.col).abs();
    d_row * d_col == 2
}

/// Push a pawn move, expanding it into every promotion choice on the far rank.
fn push_pawn_move(color: Color, mv: Move, out: &mut Vec<Move>) {
    if mv.to.row == color.promotion_row() {
        for kind in PieceKind::PROMOTION_TARGETS {
            out.push(Move::with_promotion(mv.from, mv.to, kind));
        }
    } else {
        out.push(mv);
    }
}
