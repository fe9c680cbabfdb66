//! Mailbox board state and the composition root for rules queries.
//!
//! `Position` owns the 8x8 board, side to move, castling rights, en-passant
//! target, clocks, running Zobrist hash, per-color square sets, the
//! auxiliary input planes and the move history. Rules live in separate units
//! (`CheckScanner`, `MovementValidator`, `MoveMaker`) that borrow the position
//! and go through the accessors below; `scanner`, `validator` and
//! `move_maker` hand those units out.

use crate::errors::ChessResult;
use crate::game_state::chess_types::*;
use crate::game_state::input_planes::InputPlanes;
use crate::move_generation::check_scanner::CheckScanner;
use crate::move_generation::move_maker::MoveMaker;
use crate::move_generation::movement_validator::MovementValidator;
use crate::search::zobrist::{
    castling_key, compute_zobrist_hash, en_passant_file_key, piece_square_key, side_to_move_key,
};
use crate::utils::fen_generator::generate_fen;
use crate::utils::fen_parser::parse_fen;

/// How a finished game ended.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum GameOutcome {
    Checkmate { winner: Color },
    Stalemate,
}

#[derive(Debug, Clone)]
pub struct Position {
    board: [[Option<ColoredPiece>; 8]; 8],
    turn: Color,
    castling: CastlingState,
    en_passant: Option<Square>,
    halfmove_clock: u32,
    fullmove_number: u32,
    zobrist_hash: u64,
    pieces_squares: [SquareSet; 2],
    planes: InputPlanes,
    history: MoveHistory,
}

impl Default for Position {
    fn default() -> Self {
        Self::new_game()
    }
}

impl Position {
    /// Empty board, white to move, no rights. The hash is consistent with
    /// that state.
    pub fn empty() -> Self {
        let mut position = Self {
            board: [[None; 8]; 8],
            turn: Color::White,
            castling: CastlingState::none(),
            en_passant: None,
            halfmove_clock: 0,
            fullmove_number: 1,
            zobrist_hash: 0,
            pieces_squares: [SquareSet::empty(); 2],
            planes: InputPlanes::default(),
            history: MoveHistory::default(),
        };
        position.planes.set_turn(Color::White);
        position.refresh_zobrist_hash();
        position
    }

    /// Standard starting position.
    pub fn new_game() -> Self {
        let mut position = Self::empty();
        position.setup_starting_pieces();
        position
    }

    #[inline]
    pub fn from_fen(fen: &str) -> ChessResult<Self> {
        parse_fen(fen)
    }

    /// Replace the whole state from a FEN string, clearing history. On error
    /// the position is left untouched.
    pub fn load_fen(&mut self, fen: &str) -> ChessResult<()> {
        *self = parse_fen(fen)?;
        Ok(())
    }

    #[inline]
    pub fn get_fen(&self) -> String {
        generate_fen(self)
    }

    /// Deep copy of the current state with an empty move history.
    pub fn detached_copy(&self) -> Self {
        Self {
            board: self.board,
            turn: self.turn,
            castling: self.castling,
            en_passant: self.en_passant,
            halfmove_clock: self.halfmove_clock,
            fullmove_number: self.fullmove_number,
            zobrist_hash: self.zobrist_hash,
            pieces_squares: self.pieces_squares,
            planes: self.planes,
            history: MoveHistory::default(),
        }
    }

    // --- Board access ---

    /// Piece on `square`; `None` for empty or off-board squares.
    #[inline]
    pub fn piece_at(&self, square: Square) -> Option<ColoredPiece> {
        if !square.is_valid() {
            return None;
        }
        self.board[square.row as usize][square.col as usize]
    }

    /// Place or clear a square, keeping square sets and input planes in sync.
    /// Off-board squares are ignored. The hash is maintained by move
    /// application, not here.
    pub fn set_piece(&mut self, square: Square, piece: Option<ColoredPiece>) {
        if !square.is_valid() {
            return;
        }
        let cell = &mut self.board[square.row as usize][square.col as usize];
        if let Some(old) = cell.take() {
            self.pieces_squares[old.color.index()].remove(square);
            self.planes.remove_piece(square, old);
        }
        if let Some(new) = piece {
            self.pieces_squares[new.color.index()].insert(square);
            self.planes.place_piece(square, new);
        }
        *cell = piece;
    }

    #[inline]
    pub fn pieces_squares(&self, color: Color) -> SquareSet {
        self.pieces_squares[color.index()]
    }

    pub fn king_square(&self, color: Color) -> Option<Square> {
        let king = ColoredPiece::new(color, PieceKind::King);
        self.pieces_squares(color)
            .iter()
            .find(|sq| self.piece_at(*sq) == Some(king))
    }

    // --- Side to move and flags ---

    #[inline]
    pub fn turn(&self) -> Color {
        self.turn
    }

    pub fn change_turn(&mut self) {
        self.set_turn(self.turn.opposite());
    }

    pub(crate) fn set_turn(&mut self, turn: Color) {
        self.turn = turn;
        self.planes.set_turn(turn);
    }

    #[inline]
    pub fn castling_state(&self) -> CastlingState {
        self.castling
    }

    pub fn set_castling_state(&mut self, castling: CastlingState) {
        self.castling = castling;
        self.planes.set_castling(castling);
    }

    #[inline]
    pub fn en_passant_square(&self) -> Option<Square> {
        self.en_passant
    }

    pub fn set_en_passant_square(&mut self, target: Option<Square>) {
        self.en_passant = target.filter(|sq| sq.is_valid());
        self.planes.set_en_passant(self.en_passant);
    }

    #[inline]
    pub fn halfmove_clock(&self) -> u32 {
        self.halfmove_clock
    }

    #[inline]
    pub fn fullmove_number(&self) -> u32 {
        self.fullmove_number
    }

    pub(crate) fn set_move_counters(&mut self, halfmove_clock: u32, fullmove_number: u32) {
        self.halfmove_clock = halfmove_clock;
        self.fullmove_number = fullmove_number;
    }

    /// Half-move clock reset on pawn moves and captures; full-move number
    /// advances after Black moves.
    pub(crate) fn increase_move_counts(&mut self, moved: ColoredPiece, captured: bool) {
        if moved.kind == PieceKind::Pawn || captured {
            self.halfmove_clock = 0;
        } else {
            self.halfmove_clock += 1;
        }
        if moved.color == Color::Black {
            self.fullmove_number += 1;
        }
    }

    // --- Hashing and auxiliary encoding ---

    #[inline]
    pub fn zobrist_hash(&self) -> u64 {
        self.zobrist_hash
    }

    pub(crate) fn set_zobrist_hash(&mut self, hash: u64) {
        self.zobrist_hash = hash;
    }

    /// Full recomputation of the hash from current state.
    #[inline]
    pub fn compute_zobrist_hash(&self) -> u64 {
        compute_zobrist_hash(self)
    }

    pub(crate) fn refresh_zobrist_hash(&mut self) {
        self.zobrist_hash = compute_zobrist_hash(self);
    }

    /// XOR the effects of an applied move into the running hash. Must run
    /// after the board, rights, en-passant target and turn reflect the move.
    pub fn update_zobrist_hash(&mut self, context: &MoveContext) {
        let mut hash = self.zobrist_hash;
        hash ^= piece_square_key(context.moved_piece, context.mv.from);
        if let (Some(captured), Some(square)) = (context.captured_piece, context.captured_square) {
            hash ^= piece_square_key(captured, square);
        }
        hash ^= piece_square_key(context.placed_piece(), context.mv.to);
        if let Some((rook_from, rook_to)) = context.castling_rook_squares() {
            let rook = ColoredPiece::new(context.moved_piece.color, PieceKind::Rook);
            hash ^= piece_square_key(rook, rook_from) ^ piece_square_key(rook, rook_to);
        }
        hash ^= castling_key(context.prev_castling) ^ castling_key(self.castling);
        if let Some(square) = context.prev_en_passant {
            hash ^= en_passant_file_key(square.col);
        }
        if let Some(square) = self.en_passant {
            hash ^= en_passant_file_key(square.col);
        }
        hash ^= side_to_move_key();
        self.zobrist_hash = hash;
    }

    #[inline]
    pub fn input_planes(&self) -> &InputPlanes {
        &self.planes
    }

    pub(crate) fn restore_input_planes(&mut self, planes: InputPlanes) {
        self.planes = planes;
    }

    /// `18 * 8 * 8` float encoding of the position.
    pub fn input_tensor(&self) -> Vec<f32> {
        self.planes.to_tensor()
    }

    // --- History ---

    #[inline]
    pub fn history(&self) -> &MoveHistory {
        &self.history
    }

    pub(crate) fn history_mut(&mut self) -> &mut MoveHistory {
        &mut self.history
    }

    pub fn clear_move_history(&mut self) {
        self.history.clear();
    }

    // --- Rules units ---

    #[inline]
    pub fn scanner(&mut self) -> CheckScanner<'_> {
        CheckScanner::new(self)
    }

    #[inline]
    pub fn validator(&mut self) -> MovementValidator<'_> {
        MovementValidator::new(self)
    }

    #[inline]
    pub fn move_maker(&mut self) -> MoveMaker<'_> {
        MoveMaker::new(self)
    }

    /// Legal moves for the side to move.
    pub fn legal_moves(&mut self) -> Vec<Move> {
        let turn = self.turn;
        self.validator().get_legal_moves(turn)
    }

    /// Checkmate or stalemate of the side to move, scanned from current state.
    pub fn game_outcome(&mut self) -> Option<GameOutcome> {
        let turn = self.turn;
        let mut scanner = self.scanner();
        if scanner.are_there_legal_moves(turn) {
            return None;
        }
        if scanner.is_in_check(turn) {
            Some(GameOutcome::Checkmate {
                winner: turn.opposite(),
            })
        } else {
            Some(GameOutcome::Stalemate)
        }
    }

    #[inline]
    pub fn is_game_over(&mut self) -> bool {
        self.game_outcome().is_some()
    }

    fn setup_starting_pieces(&mut self) {
        let back_rank = [
            PieceKind::Rook,
            PieceKind::Knight,
            PieceKind::Bishop,
            PieceKind::Queen,
            PieceKind::King,
            PieceKind::Bishop,
            PieceKind::Knight,
            PieceKind::Rook,
        ];
        for color in Color::ALL {
            for (col, kind) in back_rank.iter().enumerate() {
                let col = col as i8;
                self.set_piece(
                    Square::new(color.home_row(), col),
                    Some(ColoredPiece::new(color, *kind)),
                );
                self.set_piece(
                    Square::new(color.pawn_start_row(), col),
                    Some(ColoredPiece::new(color, PieceKind::Pawn)),
                );
            }
        }
        self.set_castling_state(CastlingState::all());
        self.refresh_zobrist_hash();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::game_state::chess_rules::STARTING_POSITION_FEN;
    use crate::game_state::input_planes::{EN_PASSANT_PLANE, TURN_PLANE};

    #[test]
    fn new_game_matches_starting_fen() {
        let position = Position::new_game();
        assert_eq!(position.get_fen(), STARTING_POSITION_FEN);
        assert_eq!(position.pieces_squares(Color::White).len(), 16);
        assert_eq!(position.pieces_squares(Color::Black).len(), 16);
        assert_eq!(position.zobrist_hash(), position.compute_zobrist_hash());
        assert_eq!(position.king_square(Color::Black), Some(Square::new(7, 4)));
    }

    #[test]
    fn set_piece_updates_square_sets_and_planes() {
        let mut position = Position::empty();
        let knight = ColoredPiece::new(Color::White, PieceKind::Knight);
        let sq = Square::new(2, 5);

        position.set_piece(sq, Some(knight));
        assert!(position.pieces_squares(Color::White).contains(sq));
        assert_eq!(position.input_planes().value_at(knight.plane_index(), sq), 1.0);

        let pawn = ColoredPiece::new(Color::Black, PieceKind::Pawn);
        position.set_piece(sq, Some(pawn));
        assert!(!position.pieces_squares(Color::White).contains(sq));
        assert!(position.pieces_squares(Color::Black).contains(sq));
        assert_eq!(position.input_planes().value_at(knight.plane_index(), sq), 0.0);
        assert_eq!(position.input_planes().value_at(pawn.plane_index(), sq), 1.0);

        position.set_piece(sq, None);
        assert!(position.pieces_squares(Color::Black).is_empty());

        position.set_piece(Square::new(8, 0), Some(pawn));
        assert!(position.pieces_squares(Color::Black).is_empty());
    }

    #[test]
    fn turn_and_en_passant_planes_follow_state() {
        let mut position = Position::new_game();
        assert_eq!(position.input_planes().plane(TURN_PLANE), u64::MAX);
        position.change_turn();
        assert_eq!(position.turn(), Color::Black);
        assert_eq!(position.input_planes().plane(TURN_PLANE), 0);

        position.set_en_passant_square(Some(Square::new(2, 3)));
        assert_eq!(
            position.input_planes().value_at(EN_PASSANT_PLANE, Square::new(6, 3)),
            1.0
        );
        position.set_en_passant_square(Some(Square::new(-1, 3)));
        assert_eq!(position.en_passant_square(), None);
        assert_eq!(position.input_planes().plane(EN_PASSANT_PLANE), 0);
    }

    #[test]
    fn copies_share_fen_hash_and_encoding() {
        let mut position = Position::new_game();
        position
            .move_maker()
            .make_move(Move::new(Square::new(1, 3), Square::new(3, 3)))
            .expect("d2d4 is legal");

        let copy = position.clone();
        assert_eq!(copy.get_fen(), position.get_fen());
        assert_eq!(copy.zobrist_hash(), position.zobrist_hash());
        assert_eq!(copy.input_tensor(), position.input_tensor());
        assert_eq!(copy.history().len(), 1);

        let detached = position.detached_copy();
        assert_eq!(detached.get_fen(), position.get_fen());
        assert!(detached.history().is_empty());
    }

    #[test]
    fn load_fen_failure_leaves_position_untouched() {
        let mut position = Position::new_game();
        let before = position.get_fen();
        assert!(position.load_fen("not a fen").is_err());
        assert_eq!(position.get_fen(), before);
    }

    #[test]
    fn game_outcome_is_scanned_on_demand() {
        let mut mated = Position::from_fen("7k/6Q1/6K1/8/8/8/8/8 b - - 0 1").expect("FEN should parse");
        assert_eq!(
            mated.game_outcome(),
            Some(GameOutcome::Checkmate {
                winner: Color::White
            })
        );

        let mut stalemated =
            Position::from_fen("7k/5Q2/6K1/8/8/8/8/8 b - - 0 1").expect("FEN should parse");
        assert_eq!(stalemated.game_outcome(), Some(GameOutcome::Stalemate));

        let mut start = Position::new_game();
        assert!(!start.is_game_over());
    }
}
