use crate::game_state::chess_rules::castling_rook_relocation;
use crate::game_state::chess_types::*;
use crate::game_state::input_planes::InputPlanes;

/// Snapshot taken before a move is applied; the only input needed to reverse
/// the move exactly.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct MoveContext {
    pub mv: Move,
    pub moved_piece: ColoredPiece,
    pub captured_piece: Option<ColoredPiece>,
    /// Square the captured piece stood on. Differs from `mv.to` for en passant.
    pub captured_square: Option<Square>,

    pub prev_en_passant: Option<Square>,
    pub prev_castling: CastlingState,
    pub prev_halfmove_clock: u32,
    pub prev_fullmove_number: u32,
    pub prev_turn: Color,

    pub was_en_passant: bool,
    pub was_castling: bool,

    pub prev_zobrist_hash: u64,
    pub prev_planes: InputPlanes,
}

impl MoveContext {
    /// Piece standing on the destination after the move.
    #[inline]
    pub fn placed_piece(&self) -> ColoredPiece {
        match self.mv.promotion {
            Some(kind) => ColoredPiece::new(self.moved_piece.color, kind),
            None => self.moved_piece,
        }
    }

    #[inline]
    pub fn is_capture(&self) -> bool {
        self.captured_piece.is_some()
    }

    /// Rook `(from, to)` squares when this move was a castle.
    #[inline]
    pub fn castling_rook_squares(&self) -> Option<(Square, Square)> {
        if !self.was_castling {
            return None;
        }
        castling_rook_relocation(self.moved_piece.color, self.mv.to)
    }
}

/// Cursor-indexed list of applied moves. Entries at or after the cursor are
/// the redo tail.
#[derive(Debug, Clone, Default)]
pub struct MoveHistory {
    entries: Vec<MoveContext>,
    cursor: usize,
}

impl MoveHistory {
    /// Append a freshly made move, discarding any redo tail.
    pub fn record(&mut self, context: MoveContext) {
        self.entries.truncate(self.cursor);
        self.entries.push(context);
        self.cursor = self.entries.len();
    }

    /// Move the cursor back over the last applied move and return its context.
    pub fn step_back(&mut self) -> Option<MoveContext> {
        if self.cursor == 0 {
            return None;
        }
        self.cursor -= 1;
        self.entries.get(self.cursor).copied()
    }

    /// The move a redo would replay, if any.
    #[inline]
    pub fn redo_move(&self) -> Option<Move> {
        self.entries.get(self.cursor).map(|ctx| ctx.mv)
    }

    /// Re-record the replayed context at the cursor and advance past it.
    pub fn step_forward(&mut self, context: MoveContext) {
        if let Some(slot) = self.entries.get_mut(self.cursor) {
            *slot = context;
            self.cursor += 1;
        }
    }

    #[inline]
    pub fn cursor(&self) -> usize {
        self.cursor
    }

    #[inline]
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    #[inline]
    pub fn last_applied(&self) -> Option<&MoveContext> {
        self.cursor.checked_sub(1).and_then(|i| self.entries.get(i))
    }

    /// Moves applied so far, oldest first.
    pub fn played_moves(&self) -> impl Iterator<Item = Move> + '_ {
        self.entries[..self.cursor].iter().map(|ctx| ctx.mv)
    }

    pub fn clear(&mut self) {
        self.entries.clear();
        self.cursor = 0;
    }
}
