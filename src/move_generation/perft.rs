//! Legal move-path enumeration for move generator verification.

use std::thread;

use crate::game_state::chess_types::*;
use crate::move_generation::check_scanner::is_in_check;

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct PerftCounts {
    pub nodes: usize,
    pub captures: usize,
    pub en_passant: usize,
    pub castles: usize,
    pub promotions: usize,
    pub checks: usize,
    pub checkmates: usize,
}

impl PerftCounts {
    fn merge(&mut self, rhs: PerftCounts) {
        self.nodes += rhs.nodes;
        self.captures += rhs.captures;
        self.en_passant += rhs.en_passant;
        self.castles += rhs.castles;
        self.promotions += rhs.promotions;
        self.checks += rhs.checks;
        self.checkmates += rhs.checkmates;
    }
}

/// Count leaf nodes (and move-type tallies at the leaves) `depth` plies
/// below `position`. The position is restored on return.
pub fn perft(position: &mut Position, depth: u8) -> PerftCounts {
    let mut total = PerftCounts::default();
    if depth == 0 {
        total.nodes = 1;
        return total;
    }
    perft_recurse(position, depth, &mut total);
    total
}

/// Per-root-move node counts, in generation order.
pub fn perft_divide(position: &mut Position, depth: u8) -> Vec<(Move, usize)> {
    if depth == 0 {
        return Vec::new();
    }
    let mut lines = Vec::new();
    for mv in position.legal_moves() {
        if position.move_maker().make_legal_move(mv).is_none() {
            continue;
        }
        lines.push((mv, perft(position, depth - 1).nodes));
        position.move_maker().unmake_move();
    }
    lines
}

/// Same counts as `perft`, with each root move searched on its own thread
/// over a detached copy.
pub fn perft_multi_threaded(position: &Position, depth: u8) -> PerftCounts {
    if depth <= 1 {
        return perft(&mut position.detached_copy(), depth);
    }

    let mut root = position.detached_copy();
    let handles: Vec<_> = root
        .legal_moves()
        .into_iter()
        .map(|mv| {
            let mut local_position = root.detached_copy();
            thread::spawn(move || {
                let mut local = PerftCounts::default();
                if local_position.move_maker().make_legal_move(mv).is_some() {
                    perft_recurse(&mut local_position, depth - 1, &mut local);
                }
                local
            })
        })
        .collect();

    let mut total = PerftCounts::default();
    for handle in handles {
        match handle.join() {
            Ok(local) => total.merge(local),
            Err(_) => log::warn!("perft worker thread panicked"),
        }
    }
    total
}

fn perft_recurse(position: &mut Position, depth: u8, counts: &mut PerftCounts) {
    let moves = position.legal_moves();
    for mv in moves {
        let Some(context) = position.move_maker().make_legal_move(mv) else {
            continue;
        };
        if depth == 1 {
            tally_leaf(position, &context, counts);
        } else {
            perft_recurse(position, depth - 1, counts);
        }
        position.move_maker().unmake_move();
    }
}

fn tally_leaf(position: &mut Position, context: &MoveContext, counts: &mut PerftCounts) {
    counts.nodes += 1;
    if context.is_capture() {
        counts.captures += 1;
    }
    if context.was_en_passant {
        counts.en_passant += 1;
    }
    if context.was_castling {
        counts.castles += 1;
    }
    if context.mv.promotion.is_some() {
        counts.promotions += 1;
    }
    let defender = position.turn();
    if is_in_check(position, defender) {
        counts.checks += 1;
        if !position.scanner().are_there_legal_moves(defender) {
            counts.checkmates += 1;
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn nodes(fen: &str, depth: u8) -> usize {
        let mut position = Position::from_fen(fen).expect("FEN should parse");
        perft(&mut position, depth).nodes
    }

    #[test]
    fn startpos_node_counts() {
        let mut position = Position::new_game();
        assert_eq!(perft(&mut position, 0).nodes, 1);
        assert_eq!(perft(&mut position, 1).nodes, 20);
        assert_eq!(perft(&mut position, 2).nodes, 400);
        let depth3 = perft(&mut position, 3);
        assert_eq!(depth3.nodes, 8902);
        assert_eq!(depth3.captures, 34);
        assert_eq!(depth3.checks, 12);
        assert_eq!(position.get_fen(), Position::new_game().get_fen());
    }

    #[test]
    fn kiwipete_node_counts() {
        let fen = "r3k2r/p1ppqpb1/bn2pnp1/3PN3/1p2P3/2N2Q1p/PPPBBPPP/R3K2R w KQkq - 0 1";
        let mut position = Position::from_fen(fen).expect("FEN should parse");
        let depth1 = perft(&mut position, 1);
        assert_eq!(depth1.nodes, 48);
        assert_eq!(depth1.captures, 8);
        assert_eq!(depth1.castles, 2);
        let depth2 = perft(&mut position, 2);
        assert_eq!(depth2.nodes, 2039);
        assert_eq!(depth2.captures, 351);
        assert_eq!(depth2.en_passant, 1);
        assert_eq!(depth2.castles, 91);
        assert_eq!(depth2.checks, 3);
    }

    #[test]
    fn endgame_and_promotion_positions() {
        let position_3 = "8/2p5/3p4/KP5r/1R3p1k/8/4P1P1/8 w - - 0 1";
        assert_eq!(nodes(position_3, 1), 14);
        assert_eq!(nodes(position_3, 2), 191);
        assert_eq!(nodes(position_3, 3), 2812);

        let position_4 = "r3k2r/Pppp1ppp/1b3nbN/nP6/BBP1P3/q4N2/Pp1P2PP/R2Q1RK1 w kq - 0 1";
        assert_eq!(nodes(position_4, 1), 6);
        assert_eq!(nodes(position_4, 2), 264);

        let position_5 = "rnbq1k1r/pp1Pbppp/2p5/8/2B5/8/PPP1NnPP/RNBQK2R w KQ - 1 8";
        assert_eq!(nodes(position_5, 1), 44);
        assert_eq!(nodes(position_5, 2), 1486);
    }

    #[test]
    fn divide_and_threaded_totals_agree() {
        let fen = "r3k2r/p1ppqpb1/bn2pnp1/3PN3/1p2P3/2N2Q1p/PPPBBPPP/R3K2R w KQkq - 0 1";
        let mut position = Position::from_fen(fen).expect("FEN should parse");
        let divided = perft_divide(&mut position, 2);
        assert_eq!(divided.len(), 48);
        assert_eq!(divided.iter().map(|(_, n)| n).sum::<usize>(), 2039);

        let threaded = perft_multi_threaded(&position, 2);
        assert_eq!(threaded, perft(&mut position, 2));
    }
}
