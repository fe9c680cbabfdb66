//! Step and ray tables for mailbox move generation and attack detection.

use crate::game_state::chess_types::{PieceKind, Square};

pub const KNIGHT_OFFSETS: [(i8, i8); 8] = [
    (2, 1),
    (1, 2),
    (-1, 2),
    (-2, 1),
    (-2, -1),
    (-1, -2),
    (1, -2),
    (2, -1),
];

pub const KING_OFFSETS: [(i8, i8); 8] = [
    (1, 0),
    (1, 1),
    (0, 1),
    (-1, 1),
    (-1, 0),
    (-1, -1),
    (0, -1),
    (1, -1),
];

pub const ROOK_DIRECTIONS: [(i8, i8); 4] = [(1, 0), (0, 1), (-1, 0), (0, -1)];
pub const BISHOP_DIRECTIONS: [(i8, i8); 4] = [(1, 1), (-1, 1), (-1, -1), (1, -1)];

/// Ray directions for a sliding piece; empty for non-sliders.
pub fn slider_directions(kind: PieceKind) -> &'static [(i8, i8)] {
    const QUEEN_DIRECTIONS: [(i8, i8); 8] = [
        (1, 0),
        (0, 1),
        (-1, 0),
        (0, -1),
        (1, 1),
        (-1, 1),
        (-1, -1),
        (1, -1),
    ];
    match kind {
        PieceKind::Bishop => &BISHOP_DIRECTIONS,
        PieceKind::Rook => &ROOK_DIRECTIONS,
        PieceKind::Queen => &QUEEN_DIRECTIONS,
        _ => &[],
    }
}

/// Squares strictly between `from` and `to` along a rank, file or diagonal.
/// Returns `None` when the two squares are not aligned or either is off the
/// board.
pub fn squares_between(from: Square, to: Square) -> Option<impl Iterator<Item = Square>> {
    if !from.is_valid() || !to.is_valid() {
        return None;
    }
    let d_row = to.row - from.row;
    let d_col = to.col - from.col;
    let aligned = (d_row == 0) != (d_col == 0) || (d_row != 0 && d_row.abs() == d_col.abs());
    if !aligned {
        return None;
    }
    let step = (d_row.signum(), d_col.signum());
    let distance = d_row.abs().max(d_col.abs());
    Some((1..distance).map(move |i| Square::new(from.row + step.0 * i, from.col + step.1 * i)))
}
