//! FEN-to-Position parser.
//!
//! Builds a fully populated position from a Forsyth-Edwards Notation string,
//! including square sets, input planes and the Zobrist hash.

use crate::errors::{ChessError, ChessResult};
use crate::game_state::chess_types::*;
use crate::utils::algebraic::algebraic_to_square;

fn invalid(message: impl Into<String>) -> ChessError {
    ChessError::InvalidFen(message.into())
}

pub fn parse_fen(fen: &str) -> ChessResult<Position> {
    let mut parts = fen.split_whitespace();

    let board_part = parts.next().ok_or_else(|| invalid("missing board layout"))?;
    let side_part = parts.next().ok_or_else(|| invalid("missing side to move"))?;
    let castling_part = parts.next().ok_or_else(|| invalid("missing castling rights"))?;
    let en_passant_part = parts.next().ok_or_else(|| invalid("missing en-passant square"))?;
    let halfmove_part = parts.next().ok_or_else(|| invalid("missing halfmove clock"))?;
    let fullmove_part = parts.next().ok_or_else(|| invalid("missing fullmove number"))?;

    if parts.next().is_some() {
        return Err(invalid("extra trailing fields"));
    }

    let mut position = Position::empty();
    parse_board(board_part, &mut position)?;
    position.set_turn(parse_side_to_move(side_part)?);
    position.set_castling_state(parse_castling_rights(castling_part)?);
    position.set_en_passant_square(parse_en_passant_square(en_passant_part)?);

    let halfmove_clock = halfmove_part
        .parse::<u32>()
        .map_err(|_| invalid(format!("halfmove clock '{halfmove_part}'")))?;
    let fullmove_number = fullmove_part
        .parse::<u32>()
        .map_err(|_| invalid(format!("fullmove number '{fullmove_part}'")))?;
    position.set_move_counters(halfmove_clock, fullmove_number);

    position.refresh_zobrist_hash();
    Ok(position)
}

fn parse_board(board_part: &str, position: &mut Position) -> ChessResult<()> {
    let ranks: Vec<&str> = board_part.split('/').collect();
    if ranks.len() != 8 {
        return Err(invalid("board layout must contain 8 ranks"));
    }

    for (fen_rank_idx, rank_str) in ranks.iter().enumerate() {
        let row = 7 - fen_rank_idx as i8;
        let mut col = 0i8;

        for ch in rank_str.chars() {
            if let Some(empty_count) = ch.to_digit(10) {
                if !(1..=8).contains(&empty_count) {
                    return Err(invalid(format!("empty-square count '{ch}'")));
                }
                col += empty_count as i8;
                if col > 8 {
                    return Err(invalid(format!("rank '{rank_str}' has too many files")));
                }
                continue;
            }

            let piece = ColoredPiece::from_fen_char(ch)
                .ok_or_else(|| invalid(format!("piece character '{ch}'")))?;
            if col >= 8 {
                return Err(invalid(format!("rank '{rank_str}' has too many files")));
            }
            position.set_piece(Square::new(row, col), Some(piece));
            col += 1;
        }

        if col != 8 {
            return Err(invalid(format!("rank '{rank_str}' does not sum to 8 files")));
        }
    }

    Ok(())
}

fn parse_side_to_move(side_part: &str) -> ChessResult<Color> {
    match side_part {
        "w" => Ok(Color::White),
        "b" => Ok(Color::Black),
        _ => Err(invalid(format!("side to move '{side_part}'"))),
    }
}

fn parse_castling_rights(castling_part: &str) -> ChessResult<CastlingState> {
    let mut rights = CastlingState::none();
    if castling_part == "-" {
        return Ok(rights);
    }

    for ch in castling_part.chars() {
        match ch {
            'K' => rights.grant(Color::White, CastlingState::KING_SIDE),
            'Q' => rights.grant(Color::White, CastlingState::QUEEN_SIDE),
            'k' => rights.grant(Color::Black, CastlingState::KING_SIDE),
            'q' => rights.grant(Color::Black, CastlingState::QUEEN_SIDE),
            _ => return Err(invalid(format!("castling character '{ch}'"))),
        }
    }

    Ok(rights)
}

fn parse_en_passant_square(en_passant_part: &str) -> ChessResult<Option<Square>> {
    if en_passant_part == "-" {
        return Ok(None);
    }
    let square = algebraic_to_square(en_passant_part)
        .map_err(|_| invalid(format!("en-passant square '{en_passant_part}'")))?;
    if square.row != 2 && square.row != 5 {
        return Err(invalid(format!("en-passant square '{en_passant_part}' not on rank 3 or 6")));
    }
    Ok(Some(square))
}

#[cfg(test)]
mod tests {
    use super::parse_fen;
    use crate::errors::ChessError;
    use crate::game_state::chess_rules::STARTING_POSITION_FEN;
    use crate::game_state::chess_types::*;

    #[test]
    fn parses_starting_position() {
        let position = parse_fen(STARTING_POSITION_FEN).expect("start FEN should parse");
        assert_eq!(
            position.piece_at(Square::new(0, 4)),
            Some(ColoredPiece::new(Color::White, PieceKind::King))
        );
        assert_eq!(
            position.piece_at(Square::new(6, 0)),
            Some(ColoredPiece::new(Color::Black, PieceKind::Pawn))
        );
        assert_eq!(position.turn(), Color::White);
        assert_eq!(position.castling_state(), CastlingState::all());
        assert_eq!(position.en_passant_square(), None);
        assert_eq!(position.zobrist_hash(), Position::new_game().zobrist_hash());
    }

    #[test]
    fn parses_every_castling_combination() {
        for (field, white, black) in [
            ("-", 0, 0),
            ("K", 1, 0),
            ("Qk", 2, 1),
            ("KQq", 3, 2),
            ("KQkq", 3, 3),
        ] {
            let fen = format!("r3k2r/8/8/8/8/8/8/R3K2R w {field} - 0 1");
            let position = parse_fen(&fen).expect("FEN should parse");
            assert_eq!(position.castling_state().rights(Color::White), white, "{field}");
            assert_eq!(position.castling_state().rights(Color::Black), black, "{field}");
            assert_eq!(position.get_fen(), fen);
        }
    }

    #[test]
    fn parses_counters_and_en_passant() {
        let position = parse_fen("rnbqkbnr/pp1ppppp/8/2p5/4P3/8/PPPP1PPP/RNBQKBNR w KQkq c6 0 2")
            .expect("FEN should parse");
        assert_eq!(position.en_passant_square(), Some(Square::new(5, 2)));
        assert_eq!(position.fullmove_number(), 2);
        assert_eq!(position.halfmove_clock(), 0);
    }

    #[test]
    fn rejects_malformed_fens() {
        let bad = [
            "",
            "8/8/8/8/8/8/8 w - - 0 1",
            "9/8/8/8/8/8/8/8 w - - 0 1",
            "rnbqkbnrr/8/8/8/8/8/8/8 w - - 0 1",
            "7x/8/8/8/8/8/8/8 w - - 0 1",
            "8/8/8/8/8/8/8/8 x - - 0 1",
            "8/8/8/8/8/8/8/8 w KX - 0 1",
            "8/8/8/8/8/8/8/8 w - e4 0 1",
            "8/8/8/8/8/8/8/8 w - - a 1",
            "8/8/8/8/8/8/8/8 w - - 0",
            "8/8/8/8/8/8/8/8 w - - 0 1 extra",
        ];
        for fen in bad {
            assert!(
                matches!(parse_fen(fen), Err(ChessError::InvalidFen(_))),
                "{fen:?} should be rejected"
            );
        }
    }
}
