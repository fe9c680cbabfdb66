use crate::engines::engine_trait::{Engine, EngineOutput, GoParams};
use crate::engines::time_management::resolve_go_params;
use crate::errors::{ChessError, ChessResult};
use crate::game_state::chess_types::Position;
use crate::search::board_scoring::{is_mate_score, MATE_SCORE};
use crate::search::iterative_deepening::{SearchConfig, SearchEngine, SearchMode, SearchResult};

/// UCI-facing wrapper around `SearchEngine`. The transposition table and
/// best-move cache persist across `go` commands until `new_game`.
pub struct IterativeEngine {
    search: SearchEngine,
}

impl IterativeEngine {
    pub fn new(config: SearchConfig) -> Self {
        Self {
            search: SearchEngine::new(config),
        }
    }

    #[inline]
    pub fn config(&self) -> SearchConfig {
        self.search.config()
    }

    /// Limits for one `go`: `depth` selects a fixed-depth search, an explicit
    /// or clock-derived movetime selects a timed one, otherwise the
    /// configured defaults apply.
    fn config_for(&self, position: &Position, params: &GoParams) -> SearchConfig {
        let defaults = self.search.config();
        let resolved = resolve_go_params(position.turn(), params);
        if let Some(depth) = resolved.depth {
            return SearchConfig {
                max_depth: depth.max(1),
                mode: SearchMode::DepthBounded,
                ..defaults
            };
        }
        if let Some(movetime_ms) = resolved.movetime_ms {
            return SearchConfig {
                movetime_ms,
                mode: SearchMode::TimeBounded,
                ..defaults
            };
        }
        defaults
    }
}

impl Default for IterativeEngine {
    fn default() -> Self {
        Self::new(SearchConfig::default())
    }
}

/// `info` line for one completed iteration.
pub fn format_info_line(result: &SearchResult) -> String {
    let score = if is_mate_score(result.best_score) {
        let plies = MATE_SCORE - result.best_score.abs();
        let moves = (plies + 1) / 2;
        if result.best_score > 0 {
            format!("mate {moves}")
        } else {
            format!("mate -{moves}")
        }
    } else {
        format!("cp {}", result.best_score)
    };
    let mut line = format!(
        "info depth {} score {} nodes {} time {}",
        result.reached_depth, score, result.nodes, result.elapsed_ms
    );
    if !result.pv.is_empty() {
        line.push_str(" pv");
        for mv in &result.pv {
            line.push(' ');
            line.push_str(&mv.to_string());
        }
    }
    line
}

impl Engine for IterativeEngine {
    fn name(&self) -> &str {
        "Rook and Ply"
    }

    fn author(&self) -> &str {
        "rook_and_ply developers"
    }

    fn new_game(&mut self) {
        self.search.clear();
    }

    fn set_option(&mut self, name: &str, value: &str) -> ChessResult<()> {
        let mut config = self.search.config();
        match name.to_ascii_lowercase().as_str() {
            "depth" => {
                config.max_depth = value
                    .parse::<u8>()
                    .ok()
                    .filter(|d| *d > 0)
                    .ok_or_else(|| ChessError::InvalidOption(format!("Depth {value}")))?;
            }
            "movetime" => {
                config.movetime_ms = value
                    .parse::<u64>()
                    .ok()
                    .filter(|ms| *ms > 0)
                    .ok_or_else(|| ChessError::InvalidOption(format!("MoveTime {value}")))?;
            }
            _ => return Err(ChessError::InvalidOption(name.to_owned())),
        }
        self.search.set_config(config);
        Ok(())
    }

    fn choose_move(&mut self, position: &Position, params: &GoParams) -> ChessResult<EngineOutput> {
        let config = self.config_for(position, params);
        let mut out = EngineOutput::default();
        let result = self
            .search
            .search(position, config, |iteration| out.info_lines.push(format_info_line(iteration)));
        if result.reached_depth == 0 {
            out.info_lines.push(format!(
                "info string no depth completed, nodes {}",
                result.nodes
            ));
        }
        out.best_move = result.best_move;
        Ok(out)
    }
}
