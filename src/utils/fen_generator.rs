use crate::game_state::chess_types::*;

/// Export `position` as a six-field FEN string.
pub fn generate_fen(position: &Position) -> String {
    let side_to_move = match position.turn() {
        Color::White => "w",
        Color::Black => "b",
    };
    let en_passant = position
        .en_passant_square()
        .map_or_else(|| "-".to_owned(), |sq| sq.to_string());

    format!(
        "{} {} {} {} {} {}",
        generate_board_field(position),
        side_to_move,
        generate_castling_field(position.castling_state()),
        en_passant,
        position.halfmove_clock(),
        position.fullmove_number()
    )
}

fn generate_board_field(position: &Position) -> String {
    let mut out = String::with_capacity(64);

    for row in (0..8).rev() {
        let mut empty_count = 0u8;

        for col in 0..8 {
            match position.piece_at(Square::new(row, col)) {
                Some(piece) => {
                    if empty_count > 0 {
                        out.push(char::from(b'0' + empty_count));
                        empty_count = 0;
                    }
                    out.push(piece.fen_char());
                }
                None => empty_count += 1,
            }
        }

        if empty_count > 0 {
            out.push(char::from(b'0' + empty_count));
        }
        if row > 0 {
            out.push('/');
        }
    }

    out
}

fn generate_castling_field(castling: CastlingState) -> String {
    let mut out = String::new();
    for (color, side, letter) in [
        (Color::White, CastlingState::KING_SIDE, 'K'),
        (Color::White, CastlingState::QUEEN_SIDE, 'Q'),
        (Color::Black, CastlingState::KING_SIDE, 'k'),
        (Color::Black, CastlingState::QUEEN_SIDE, 'q'),
    ] {
        if castling.has(color, side) {
            out.push(letter);
        }
    }
    if out.is_empty() {
        out.push('-');
    }
    out
}
