//! Plane-per-feature board encoding kept in lockstep with `Position`.
//!
//! Each plane is an 8x8 bitmask indexed like `Square::index`. The layout is:
//! - `0..6`: white pawn, knight, bishop, rook, queen, king
//! - `6..12`: black pawn, knight, bishop, rook, queen, king
//! - `12`: all ones when white is to move
//! - `13..17`: all ones for white king-side, white queen-side, black
//!   king-side and black queen-side castling rights
//! - `17`: the whole column of the en-passant file, if a target is set
//!
//! `to_tensor` expands the masks into the float layout expected by learned
//! evaluators.

use crate::game_state::chess_types::{CastlingState, Color, ColoredPiece, Square};

pub const PLANE_COUNT: usize = 18;
pub const TURN_PLANE: usize = 12;
pub const CASTLING_PLANE_BASE: usize = 13;
pub const EN_PASSANT_PLANE: usize = 17;
pub const TENSOR_LEN: usize = PLANE_COUNT * 64;

const FULL_PLANE: u64 = u64::MAX;
const A_FILE: u64 = 0x0101_0101_0101_0101;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct InputPlanes {
    planes: [u64; PLANE_COUNT],
}

impl InputPlanes {
    #[inline]
    pub fn plane(&self, index: usize) -> u64 {
        self.planes[index]
    }

    /// Value of one cell as the tensor would report it.
    #[inline]
    pub fn value_at(&self, plane: usize, square: Square) -> f32 {
        if self.planes[plane] & (1u64 << square.index()) != 0 {
            1.0
        } else {
            0.0
        }
    }

    #[inline]
    pub fn place_piece(&mut self, square: Square, piece: ColoredPiece) {
        self.planes[piece.plane_index()] |= 1u64 << square.index();
    }

    #[inline]
    pub fn remove_piece(&mut self, square: Square, piece: ColoredPiece) {
        self.planes[piece.plane_index()] &= !(1u64 << square.index());
    }

    #[inline]
    pub fn set_turn(&mut self, turn: Color) {
        self.planes[TURN_PLANE] = match turn {
            Color::White => FULL_PLANE,
            Color::Black => 0,
        };
    }

    pub fn set_castling(&mut self, castling: CastlingState) {
        let flags = [
            castling.has(Color::White, CastlingState::KING_SIDE),
            castling.has(Color::White, CastlingState::QUEEN_SIDE),
            castling.has(Color::Black, CastlingState::KING_SIDE),
            castling.has(Color::Black, CastlingState::QUEEN_SIDE),
        ];
        for (offset, enabled) in flags.into_iter().enumerate() {
            self.planes[CASTLING_PLANE_BASE + offset] = if enabled { FULL_PLANE } else { 0 };
        }
    }

    #[inline]
    pub fn set_en_passant(&mut self, target: Option<Square>) {
        self.planes[EN_PASSANT_PLANE] = match target {
            Some(square) if square.is_valid() => A_FILE << square.col,
            _ => 0,
        };
    }

    /// Expand into `PLANE_COUNT * 64` floats, plane-major then square index.
    pub fn to_tensor(&self) -> Vec<f32> {
        let mut tensor = Vec::with_capacity(TENSOR_LEN);
        for plane in self.planes {
            for index in 0..64 {
                tensor.push(if plane & (1u64 << index) != 0 { 1.0 } else { 0.0 });
            }
        }
        tensor
    }
}
