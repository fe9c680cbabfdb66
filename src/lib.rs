//! Crate root module declarations for the Rook and Ply chess engine.
//!
//! Exposes the rules core (game state and move generation), the search,
//! the engine facade, the UCI protocol loop and notation helpers so the
//! binary, tests and benches can import stable module paths.

pub mod errors;

pub mod game_state {
    pub mod chess_rules;
    pub mod chess_types;
    pub mod input_planes;
    pub mod move_context;
    pub mod position;
}

pub mod move_generation {
    pub mod check_scanner;
    pub mod move_maker;
    pub mod movement_validator;
    pub mod perft;
    pub mod piece_patterns;
}

pub mod search {
    pub mod board_scoring;
    pub mod iterative_deepening;
    pub mod static_exchange;
    pub mod threading;
    pub mod transposition_table;
    pub mod zobrist;
}

pub mod engines {
    pub mod engine_iterative;
    pub mod engine_trait;
    pub mod time_management;
}

pub mod uci {
    pub mod uci_top;
}

pub mod utils {
    pub mod algebraic;
    pub mod fen_generator;
    pub mod fen_parser;
    pub mod long_algebraic;
    pub mod render_game_state;
    pub mod san;
}
