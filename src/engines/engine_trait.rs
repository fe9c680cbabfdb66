//! Engine abstraction layer used by the UCI subsystem.
//!
//! Defines common input parameters and output payloads so the protocol loop
//! never depends on a concrete search strategy.

use crate::errors::ChessResult;
use crate::game_state::chess_types::{Move, Position};

/// Limits parsed from a UCI `go` command. Every field is optional; the
/// engine falls back to its configured defaults.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct GoParams {
    pub depth: Option<u8>,
    pub movetime_ms: Option<u64>,
    pub wtime_ms: Option<u64>,
    pub btime_ms: Option<u64>,
    pub winc_ms: Option<u64>,
    pub binc_ms: Option<u64>,
    pub movestogo: Option<u16>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct EngineOutput {
    /// `None` when the side to move has no legal move.
    pub best_move: Option<Move>,
    pub info_lines: Vec<String>,
}

pub trait Engine: Send {
    fn name(&self) -> &str;
    fn author(&self) -> &str;

    fn new_game(&mut self) {}

    fn set_option(&mut self, _name: &str, _value: &str) -> ChessResult<()> {
        Ok(())
    }

    fn choose_move(&mut self, position: &Position, params: &GoParams) -> ChessResult<EngineOutput>;
}
