//! Terminal-oriented Unicode board renderer.
//!
//! Used by the UCI `d` command and by tests that want a readable diagnostic
//! when an assertion about a position fails.

use crate::game_state::chess_types::*;

/// Render the board to a Unicode string, white at the bottom.
pub fn render_game_state(position: &Position) -> String {
    let mut out = String::new();

    out.push_str("  a b c d e f g h\n");

    for row in (0..8).rev() {
        out.push(char::from(b'1' + row as u8));
        out.push(' ');

        for col in 0..8 {
            match position.piece_at(Square::new(row, col)) {
                Some(piece) => out.push(piece_to_unicode(piece)),
                None => out.push('·'),
            }

            if col < 7 {
                out.push(' ');
            }
        }

        out.push(' ');
        out.push(char::from(b'1' + row as u8));
        out.push('\n');
    }

    out.push_str("  a b c d e f g h");

    out
}

fn piece_to_unicode(piece: ColoredPiece) -> char {
    match (piece.color, piece.kind) {
        (Color::White, PieceKind::Pawn) => '♙',
        (Color::White, PieceKind::Knight) => '♘',
        (Color::White, PieceKind::Bishop) => '♗',
        (Color::White, PieceKind::Rook) => '♖',
        (Color::White, PieceKind::Queen) => '♕',
        (Color::White, PieceKind::King) => '♔',
        (Color::Black, PieceKind::Pawn) => '♟',
        (Color::Black, PieceKind::Knight) => '♞',
        (Color::Black, PieceKind::Bishop) => '♝',
        (Color::Black, PieceKind::Rook) => '♜',
        (Color::Black, PieceKind::Queen) => '♛',
        (Color::Black, PieceKind::King) => '♚',
    }
}
