//! Static exchange evaluation.
//!
//! Resolves the full capture sequence on one square by letting each side
//! recapture with its least valuable attacker, then minimaxes the gain list
//! so either side may stop capturing when continuing would lose material.
//! Works on a private copy; pins are not considered.

use crate::game_state::chess_types::*;
use crate::move_generation::check_scanner::attackers_to_square;
use crate::search::board_scoring::MaterialScorer;

#[inline]
fn value(kind: PieceKind) -> i32 {
    MaterialScorer::piece_value(kind)
}

/// Net material the mover of `mv` can expect from the exchange it starts on
/// `mv.to`. Positive means the capture wins material.
pub fn static_exchange_evaluation(position: &Position, mv: Move) -> i32 {
    let Some(mover) = position.piece_at(mv.from) else {
        return 0;
    };
    let target = mv.to;
    let mut board = position.detached_copy();

    let en_passant = mover.kind == PieceKind::Pawn
        && mv.from.col != target.col
        && board.piece_at(target).is_none()
        && board.en_passant_square() == Some(target);
    let victim = if en_passant {
        let square = Square::new(mv.from.row, target.col);
        let victim = board.piece_at(square);
        board.set_piece(square, None);
        victim
    } else {
        board.piece_at(target)
    };

    let placed = match mv.promotion {
        Some(kind) => ColoredPiece::new(mover.color, kind),
        None => mover,
    };
    let mut gains = Vec::with_capacity(16);
    gains.push(victim.map_or(0, |p| value(p.kind)) + value(placed.kind) - value(mover.kind));

    board.set_piece(mv.from, None);
    board.set_piece(target, Some(placed));
    let mut on_square = value(placed.kind);
    let mut side = mover.color.opposite();

    while let Some((from, attacker)) = least_valuable_attacker(&board, target, side) {
        let last = gains.last().copied().unwrap_or(0);
        gains.push(on_square - last);

        let arrived = if attacker.kind == PieceKind::Pawn && target.row == side.promotion_row() {
            ColoredPiece::new(side, PieceKind::Queen)
        } else {
            attacker
        };
        board.set_piece(from, None);
        board.set_piece(target, Some(arrived));
        on_square = value(arrived.kind);
        side = side.opposite();
    }

    for i in (1..gains.len()).rev() {
        gains[i - 1] = -(-gains[i - 1]).max(gains[i]);
    }
    gains[0]
}

fn least_valuable_attacker(position: &Position, square: Square, side: Color) -> Option<(Square, ColoredPiece)> {
    attackers_to_square(position, square, side)
        .into_iter()
        .min_by_key(|(_, piece)| value(piece.kind))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn see(fen: &str, from: (i8, i8), to: (i8, i8)) -> i32 {
        let position = Position::from_fen(fen).expect("FEN should parse");
        let mv = Move::new(Square::new(from.0, from.1), Square::new(to.0, to.1));
        let before = position.get_fen();
        let result = static_exchange_evaluation(&position, mv);
        assert_eq!(position.get_fen(), before);
        result
    }

    #[test]
    fn undefended_capture_wins_the_victim() {
        // Rook a1 takes the loose knight on a5.
        assert_eq!(see("4k3/8/8/n7/8/8/8/R3K3 w - - 0 1", (0, 0), (4, 0)), 320);
    }

    #[test]
    fn pawn_trade_is_even() {
        // d4xe5, recaptured by d6.
        assert_eq!(see("4k3/8/3p4/4p3/3P4/8/8/4K3 w - - 0 1", (3, 3), (4, 4)), 0);
    }

    #[test]
    fn queen_for_defended_pawn_loses() {
        // Qe2xe5, recaptured by d6.
        assert_eq!(see("4k3/8/3p4/4p3/8/8/4Q3/4K3 w - - 0 1", (1, 4), (4, 4)), -800);
    }

    #[test]
    fn defender_declines_a_losing_recapture() {
        // Nxe5 wins a pawn; Qxe5 would hand back the queen to the d4 pawn.
        assert_eq!(see("4k3/4q3/8/4p3/3P4/5N2/8/4K3 w - - 0 1", (2, 5), (4, 4)), 100);
    }

    #[test]
    fn xray_attackers_join_the_exchange() {
        // Rxe5 backed by the e1 rook against a single d6 defender.
        assert_eq!(see("4k3/8/3p4/4p3/8/8/4R3/4R1K1 w - - 0 1", (1, 4), (4, 4)), -300);
    }
}
