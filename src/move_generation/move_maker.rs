//! Move application, undo and redo.
//!
//! `move_piece` / `unmove_piece` form the reversible primitive: they change
//! the board, castling rights, en-passant target and input planes, but never
//! the turn, clocks, hash or history. Legality probing goes through them.
//! `make_legal_move`, `unmake_move` and `remake_move` are the recorded game
//! operations built on top.

use crate::errors::{ChessError, ChessResult, IllegalMoveReason};
use crate::game_state::chess_rules::{castling_side_for_rook_home, king_home_square};
use crate::game_state::chess_types::*;

pub struct MoveMaker<'a> {
    position: &'a mut Position,
}

impl<'a> MoveMaker<'a> {
    #[inline]
    pub fn new(position: &'a mut Position) -> Self {
        Self { position }
    }

    /// Apply `mv` to the board without touching turn, clocks, hash or
    /// history. Returns the snapshot needed to reverse it, or `None` when the
    /// origin square is empty. Shape legality is the caller's concern.
    pub fn move_piece(&mut self, mv: Move) -> Option<MoveContext> {
        let moved_piece = self.position.piece_at(mv.from)?;
        if !mv.to.is_valid() {
            return None;
        }
        let color = moved_piece.color;

        let was_en_passant = moved_piece.kind == PieceKind::Pawn
            && mv.from.col != mv.to.col
            && self.position.piece_at(mv.to).is_none()
            && self.position.en_passant_square() == Some(mv.to);
        let (captured_piece, captured_square) = if was_en_passant {
            let square = Square::new(mv.from.row, mv.to.col);
            (self.position.piece_at(square), Some(square))
        } else {
            let captured = self.position.piece_at(mv.to);
            (captured, captured.map(|_| mv.to))
        };
        let was_castling = moved_piece.kind == PieceKind::King
            && mv.from == king_home_square(color)
            && (mv.to.col - mv.from.col).abs() == 2
            && mv.to.row == mv.from.row;

        let context = MoveContext {
            mv,
            moved_piece,
            captured_piece,
            captured_square,
            prev_en_passant: self.position.en_passant_square(),
            prev_castling: self.position.castling_state(),
            prev_halfmove_clock: self.position.halfmove_clock(),
            prev_fullmove_number: self.position.fullmove_number(),
            prev_turn: self.position.turn(),
            was_en_passant,
            was_castling,
            prev_zobrist_hash: self.position.zobrist_hash(),
            prev_planes: *self.position.input_planes(),
        };

        if was_en_passant {
            self.position.set_piece(Square::new(mv.from.row, mv.to.col), None);
        }
        self.position.set_piece(mv.from, None);
        self.position.set_piece(mv.to, Some(context.placed_piece()));
        if let Some((rook_from, rook_to)) = context.castling_rook_squares() {
            let rook = self.position.piece_at(rook_from);
            self.position.set_piece(rook_from, None);
            self.position.set_piece(rook_to, rook);
        }

        let mut castling = context.prev_castling;
        match moved_piece.kind {
            PieceKind::King => castling.set_rights(color, 0),
            PieceKind::Rook => {
                if let Some(side) = castling_side_for_rook_home(color, mv.from) {
                    castling.revoke(color, side);
                }
            }
            _ => {}
        }
        if let Some(captured) = captured_piece.filter(|p| p.kind == PieceKind::Rook) {
            if let Some(side) = castling_side_for_rook_home(captured.color, mv.to) {
                castling.revoke(captured.color, side);
            }
        }
        self.position.set_castling_state(castling);

        let double_push = moved_piece.kind == PieceKind::Pawn
            && mv.from.col == mv.to.col
            && (mv.to.row - mv.from.row).abs() == 2;
        let en_passant =
            double_push.then(|| Square::new((mv.from.row + mv.to.row) / 2, mv.from.col));
        self.position.set_en_passant_square(en_passant);

        Some(context)
    }

    /// Exact inverse of `move_piece` for the same context.
    pub fn unmove_piece(&mut self, context: &MoveContext) {
        let mv = context.mv;
        self.position.set_piece(mv.to, None);
        if let Some((rook_from, rook_to)) = context.castling_rook_squares() {
            let rook = self.position.piece_at(rook_to);
            self.position.set_piece(rook_to, None);
            self.position.set_piece(rook_from, rook);
        }
        self.position.set_piece(mv.from, Some(context.moved_piece));
        if let (Some(captured), Some(square)) = (context.captured_piece, context.captured_square) {
            self.position.set_piece(square, Some(captured));
        }
        self.position.set_castling_state(context.prev_castling);
        self.position.set_en_passant_square(context.prev_en_passant);
        self.position.restore_input_planes(context.prev_planes);
    }

    fn play(&mut self, mv: Move) -> Option<MoveContext> {
        let context = self.move_piece(mv)?;
        self.position
            .increase_move_counts(context.moved_piece, context.is_capture());
        self.position.change_turn();
        self.position.update_zobrist_hash(&context);
        Some(context)
    }

    /// Apply a move already known to be legal and record it, discarding any
    /// redo tail. Returns `None` only when the origin square is empty.
    pub fn make_legal_move(&mut self, mv: Move) -> Option<MoveContext> {
        let context = self.play(mv)?;
        self.position.history_mut().record(context);
        Some(context)
    }

    /// Validate and apply `mv`. A rejected move leaves the position
    /// untouched.
    pub fn make_move(&mut self, mv: Move) -> ChessResult<MoveContext> {
        if let Err(reason) = self.position.validator().validate_move(mv) {
            log::debug!("rejected move {mv}: {reason}");
            return Err(ChessError::IllegalMove { mv, reason });
        }
        self.make_legal_move(mv).ok_or(ChessError::IllegalMove {
            mv,
            reason: IllegalMoveReason::NoPieceOnOrigin,
        })
    }

    /// Undo the last applied move, restoring every field from its snapshot.
    pub fn unmake_move(&mut self) -> Option<Move> {
        let context = self.position.history_mut().step_back()?;
        self.unmove_piece(&context);
        self.position.set_turn(context.prev_turn);
        self.position
            .set_move_counters(context.prev_halfmove_clock, context.prev_fullmove_number);
        self.position.set_zobrist_hash(context.prev_zobrist_hash);
        self.position.restore_input_planes(context.prev_planes);
        Some(context.mv)
    }

    /// Replay the next move of the redo tail.
    pub fn remake_move(&mut self) -> Option<Move> {
        let mv = self.position.history().redo_move()?;
        let context = self.play(mv)?;
        self.position.history_mut().step_forward(context);
        Some(mv)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::game_state::chess_rules::STARTING_POSITION_FEN;
    use rand::{rngs::StdRng, Rng, SeedableRng};

    fn sq(name: &str) -> Square {
        crate::utils::algebraic::algebraic_to_square(name).expect("square should parse")
    }

    fn mv(from: &str, to: &str) -> Move {
        Move::new(sq(from), sq(to))
    }

    #[test]
    fn pawn_double_push_and_unmake_restore_exactly() {
        let mut position = Position::new_game();
        let hash = position.zobrist_hash();
        let tensor = position.input_tensor();

        position.move_maker().make_move(mv("e2", "e4")).expect("e2e4 is legal");
        assert_eq!(
            position.get_fen(),
            "rnbqkbnr/pppppppp/8/8/4P3/8/PPPP1PPP/RNBQKBNR b KQkq e3 0 1"
        );
        assert_eq!(position.zobrist_hash(), position.compute_zobrist_hash());

        assert_eq!(position.move_maker().unmake_move(), Some(mv("e2", "e4")));
        assert_eq!(position.get_fen(), STARTING_POSITION_FEN);
        assert_eq!(position.zobrist_hash(), hash);
        assert_eq!(position.input_tensor(), tensor);
        assert!(position.move_maker().unmake_move().is_none());
    }

    #[test]
    fn illegal_move_is_rejected_without_side_effects() {
        let mut position = Position::new_game();
        let before = position.get_fen();
        let err = position
            .move_maker()
            .make_move(mv("e2", "e5"))
            .expect_err("triple push is illegal");
        assert!(matches!(
            err,
            ChessError::IllegalMove {
                reason: IllegalMoveReason::BadShape,
                ..
            }
        ));
        assert_eq!(position.get_fen(), before);
        assert!(position.history().is_empty());
    }

    #[test]
    fn castling_moves_rook_and_clears_rights() {
        let mut position =
            Position::from_fen("r3k2r/8/8/8/8/8/8/R3K2R w KQkq - 0 1").expect("FEN should parse");
        position.move_maker().make_move(mv("e1", "g1")).expect("O-O is legal");
        assert_eq!(position.get_fen(), "r3k2r/8/8/8/8/8/8/R4RK1 b kq - 1 1");

        position.move_maker().make_move(mv("e8", "c8")).expect("O-O-O is legal");
        assert_eq!(position.get_fen(), "2kr3r/8/8/8/8/8/8/R4RK1 w - - 2 2");
        assert_eq!(position.zobrist_hash(), position.compute_zobrist_hash());

        position.move_maker().unmake_move();
        position.move_maker().unmake_move();
        assert_eq!(position.get_fen(), "r3k2r/8/8/8/8/8/8/R3K2R w KQkq - 0 1");
    }

    #[test]
    fn en_passant_removes_the_passed_pawn() {
        let mut position =
            Position::from_fen("4k3/8/8/3pP3/8/8/8/4K3 w - d6 0 1").expect("FEN should parse");
        let context = position.move_maker().make_move(mv("e5", "d6")).expect("ep is legal");
        assert!(context.was_en_passant);
        assert_eq!(context.captured_square, Some(sq("d5")));
        assert_eq!(position.get_fen(), "4k3/8/3P4/8/8/8/8/4K3 b - - 0 1");

        position.move_maker().unmake_move();
        assert_eq!(position.get_fen(), "4k3/8/8/3pP3/8/8/8/4K3 w - d6 0 1");
    }

    #[test]
    fn capturing_a_home_rook_revokes_that_right() {
        let mut position =
            Position::from_fen("r3k2r/8/8/8/8/8/8/R3K2R w KQkq - 0 1").expect("FEN should parse");
        position.move_maker().make_move(mv("a1", "a8")).expect("Rxa8 is legal");
        assert_eq!(position.get_fen(), "R3k2r/8/8/8/8/8/8/4K2R b Kk - 0 1");
    }

    #[test]
    fn promotion_places_the_chosen_piece() {
        let mut position = Position::from_fen("8/P6k/8/8/8/8/8/K7 w - - 3 40").expect("FEN should parse");
        position
            .move_maker()
            .make_move(Move::with_promotion(sq("a7"), sq("a8"), PieceKind::Knight))
            .expect("a8=N is legal");
        assert_eq!(position.get_fen(), "N7/7k/8/8/8/8/8/K7 b - - 0 40");
        assert_eq!(position.zobrist_hash(), position.compute_zobrist_hash());
    }

    #[test]
    fn undo_then_redo_replays_the_same_line() {
        let mut position = Position::new_game();
        for (from, to) in [("e2", "e4"), ("e7", "e5"), ("g1", "f3")] {
            position.move_maker().make_move(mv(from, to)).expect("opening move is legal");
        }
        let end_fen = position.get_fen();
        let end_hash = position.zobrist_hash();

        assert_eq!(position.move_maker().unmake_move(), Some(mv("g1", "f3")));
        assert_eq!(position.move_maker().unmake_move(), Some(mv("e7", "e5")));
        assert_eq!(position.move_maker().remake_move(), Some(mv("e7", "e5")));
        assert_eq!(position.move_maker().remake_move(), Some(mv("g1", "f3")));
        assert!(position.move_maker().remake_move().is_none());
        assert_eq!(position.get_fen(), end_fen);
        assert_eq!(position.zobrist_hash(), end_hash);

        position.move_maker().unmake_move();
        position.move_maker().make_move(mv("b1", "c3")).expect("Nc3 is legal");
        assert!(position.move_maker().remake_move().is_none());
        assert_eq!(position.history().len(), 3);
    }

    #[test]
    fn random_playouts_unwind_to_the_start() {
        let mut rng = StdRng::seed_from_u64(7);
        for _ in 0..8 {
            let mut position = Position::new_game();
            let start_hash = position.zobrist_hash();
            let mut played = 0;
            for _ in 0..60 {
                let moves = position.legal_moves();
                if moves.is_empty() {
                    break;
                }
                let choice = moves[rng.random_range(0..moves.len())];
                position
                    .move_maker()
                    .make_legal_move(choice)
                    .expect("generated move has a mover");
                assert_eq!(position.zobrist_hash(), position.compute_zobrist_hash());
                played += 1;
            }
            for _ in 0..played {
                position.move_maker().unmake_move().expect("move to undo");
            }
            assert_eq!(position.get_fen(), STARTING_POSITION_FEN);
            assert_eq!(position.zobrist_hash(), start_hash);
            assert_eq!(position.input_tensor(), Position::new_game().input_tensor());
        }
    }
}
