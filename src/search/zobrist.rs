//! Zobrist hashing support for fast position identity.
//!
//! The keys are drawn once from a fixed-seed `StdRng` so hashes are
//! deterministic across runs, which is useful for testing and debugging.

use std::sync::OnceLock;

use rand::{rngs::StdRng, Rng, SeedableRng};

use crate::game_state::chess_types::*;

const ZOBRIST_SEED: u64 = 0xCAFE_BABE;

#[derive(Debug)]
struct ZobristTables {
    piece_square: [[u64; 64]; 12],
    side_to_move: u64,
    castling: [u64; 16],
    en_passant_file: [u64; 8],
}

static TABLES: OnceLock<ZobristTables> = OnceLock::new();

#[inline]
fn tables() -> &'static ZobristTables {
    TABLES.get_or_init(build_tables)
}

fn build_tables() -> ZobristTables {
    let mut rng = StdRng::seed_from_u64(ZOBRIST_SEED);

    let mut piece_square = [[0u64; 64]; 12];
    for plane in &mut piece_square {
        for key in plane.iter_mut() {
            *key = rng.random::<u64>();
        }
    }

    let side_to_move = rng.random::<u64>();

    let mut castling = [0u64; 16];
    for key in &mut castling {
        *key = rng.random::<u64>();
    }

    let mut en_passant_file = [0u64; 8];
    for key in &mut en_passant_file {
        *key = rng.random::<u64>();
    }

    ZobristTables {
        piece_square,
        side_to_move,
        castling,
        en_passant_file,
    }
}

/// Key for a piece standing on a square.
#[inline]
pub fn piece_square_key(piece: ColoredPiece, square: Square) -> u64 {
    tables().piece_square[piece.plane_index()][square.index()]
}

/// Key for a full castling-rights combination.
#[inline]
pub fn castling_key(castling: CastlingState) -> u64 {
    tables().castling[castling.combined_index()]
}

/// Key for an en-passant target on the given file (`0..8`).
#[inline]
pub fn en_passant_file_key(col: i8) -> u64 {
    tables().en_passant_file[(col as usize) & 7]
}

/// Side-to-move key, present in the hash while white is to move.
#[inline]
pub fn side_to_move_key() -> u64 {
    tables().side_to_move
}

/// Compute the full position hash from scratch.
pub fn compute_zobrist_hash(position: &Position) -> u64 {
    let mut key = 0u64;

    for color in Color::ALL {
        for square in position.pieces_squares(color).iter() {
            if let Some(piece) = position.piece_at(square) {
                key ^= piece_square_key(piece, square);
            }
        }
    }

    if position.turn() == Color::White {
        key ^= side_to_move_key();
    }

    key ^= castling_key(position.castling_state());

    if let Some(square) = position.en_passant_square() {
        key ^= en_passant_file_key(square.col);
    }

    key
}

#[cfg(test)]
mod tests {
    use super::compute_zobrist_hash;
    use crate::game_state::chess_types::{Move, PieceKind, Position, Square};

    fn play(position: &mut Position, moves: &[&str]) {
        for text in moves {
            let mv = crate::utils::long_algebraic::long_algebraic_to_move(text, position)
                .expect("move should parse");
            position
                .move_maker()
                .make_move(mv)
                .expect("move should be legal");
        }
    }

    #[test]
    fn starting_position_hash_is_deterministic() {
        let a = Position::new_game();
        let b = Position::new_game();
        assert_eq!(a.zobrist_hash(), b.zobrist_hash());
        assert_eq!(a.zobrist_hash(), compute_zobrist_hash(&a));
    }

    #[test]
    fn side_to_move_changes_hash() {
        let w = Position::from_fen("4k3/8/8/8/8/8/8/4K3 w - - 0 1").expect("FEN should parse");
        let b = Position::from_fen("4k3/8/8/8/8/8/8/4K3 b - - 0 1").expect("FEN should parse");
        assert_ne!(w.zobrist_hash(), b.zobrist_hash());
    }

    #[test]
    fn castling_rights_change_hash() {
        let with_rights =
            Position::from_fen("4k3/8/8/8/8/8/8/R3K2R w KQ - 0 1").expect("FEN should parse");
        let without_rights =
            Position::from_fen("4k3/8/8/8/8/8/8/R3K2R w - - 0 1").expect("FEN should parse");
        assert_ne!(with_rights.zobrist_hash(), without_rights.zobrist_hash());
    }

    #[test]
    fn en_passant_file_changes_hash() {
        let no_ep =
            Position::from_fen("4k3/8/8/8/4P3/8/8/4K3 b - - 0 1").expect("FEN should parse");
        let ep = Position::from_fen("4k3/8/8/8/4P3/8/8/4K3 b - e3 0 1").expect("FEN should parse");
        assert_ne!(no_ep.zobrist_hash(), ep.zobrist_hash());
    }

    #[test]
    fn transpositions_reach_equal_hashes() {
        let mut a = Position::new_game();
        play(&mut a, &["g1f3", "g8f6", "b1c3", "b8c6"]);
        let mut b = Position::new_game();
        play(&mut b, &["b1c3", "b8c6", "g1f3", "g8f6"]);

        assert_eq!(a.get_fen(), b.get_fen());
        assert_eq!(a.zobrist_hash(), b.zobrist_hash());
        assert_eq!(a.zobrist_hash(), compute_zobrist_hash(&a));
    }

    #[test]
    fn incremental_hash_tracks_special_moves() {
        let mut position =
            Position::from_fen("r3k2r/1p6/8/2pP4/8/8/6p1/R3K2R w KQkq c6 0 1").expect("FEN should parse");
        let sequence = [
            Move::new(Square::new(4, 3), Square::new(5, 2)),
            Move::with_promotion(Square::new(1, 6), Square::new(0, 7), PieceKind::Queen),
            Move::new(Square::new(0, 4), Square::new(1, 3)),
            Move::new(Square::new(7, 4), Square::new(7, 2)),
        ];
        for mv in sequence {
            position
                .move_maker()
                .make_move(mv)
                .expect("move should be legal");
            assert_eq!(position.zobrist_hash(), compute_zobrist_hash(&position));
        }
    }
}
