//! UCI protocol front-end and command loop.
//!
//! Parses UCI commands, maintains the current position, routes `go` requests
//! to the engine and emits protocol-compliant output. Diagnostics go to the
//! log (stderr); stdout carries only protocol lines.

use std::io::{self, BufRead, Write};

use crate::engines::engine_iterative::IterativeEngine;
use crate::engines::engine_trait::{Engine, EngineOutput, GoParams};
use crate::errors::{ChessError, ChessResult};
use crate::game_state::chess_types::Position;
use crate::search::iterative_deepening::SearchConfig;
use crate::utils::long_algebraic::long_algebraic_to_move;
use crate::utils::render_game_state::render_game_state;

const MAX_OPTION_DEPTH: u8 = 64;
const MAX_OPTION_MOVETIME_MS: u64 = 600_000;

pub fn run_stdio_loop(config: SearchConfig) -> io::Result<()> {
    let stdin = io::stdin();
    let mut stdout = io::stdout();
    let mut uci = UciState::new(config);

    for line in stdin.lock().lines() {
        let line = line?;
        let should_quit = uci.handle_command(&line, &mut stdout)?;
        stdout.flush()?;
        if should_quit {
            break;
        }
    }

    Ok(())
}

pub struct UciState {
    position: Position,
    engine: Box<dyn Engine>,
    defaults: SearchConfig,
}

impl UciState {
    pub fn new(config: SearchConfig) -> Self {
        Self {
            position: Position::new_game(),
            engine: Box::new(IterativeEngine::new(config)),
            defaults: config,
        }
    }

    #[inline]
    pub fn position(&self) -> &Position {
        &self.position
    }

    /// Handle one input line. Returns `true` when the loop should exit.
    pub fn handle_command(&mut self, line: &str, out: &mut impl Write) -> io::Result<bool> {
        let trimmed = line.trim();
        if trimmed.is_empty() {
            return Ok(false);
        }
        log::debug!("uci <- {trimmed}");

        let cmd = trimmed.split_whitespace().next().unwrap_or_default();

        match cmd {
            "uci" => {
                writeln!(out, "id name {}", self.engine.name())?;
                writeln!(out, "id author {}", self.engine.author())?;
                writeln!(
                    out,
                    "option name Depth type spin default {} min 1 max {MAX_OPTION_DEPTH}",
                    self.defaults.max_depth
                )?;
                writeln!(
                    out,
                    "option name MoveTime type spin default {} min 1 max {MAX_OPTION_MOVETIME_MS}",
                    self.defaults.movetime_ms
                )?;
                writeln!(out, "uciok")?;
            }
            "isready" => {
                writeln!(out, "readyok")?;
            }
            "setoption" => {
                if let Err(err) = self.handle_setoption(trimmed) {
                    log::warn!("{trimmed}: {err}");
                    writeln!(out, "info string setoption error: {err}")?;
                }
            }
            "ucinewgame" => {
                self.position = Position::new_game();
                self.engine.new_game();
            }
            "position" => {
                if let Err(err) = self.handle_position(trimmed) {
                    log::warn!("{trimmed}: {err}");
                    writeln!(out, "info string position error: {err}")?;
                }
            }
            "go" => match self.handle_go(trimmed) {
                Ok(result) => {
                    for info in &result.info_lines {
                        writeln!(out, "{info}")?;
                    }
                    match result.best_move {
                        Some(best_move) => writeln!(out, "bestmove {best_move}")?,
                        None => writeln!(out, "bestmove 0000")?,
                    }
                }
                Err(err) => {
                    log::warn!("{trimmed}: {err}");
                    writeln!(out, "info string go error: {err}")?;
                    writeln!(out, "bestmove 0000")?;
                }
            },
            "stop" => {
                // Search is synchronous; there is nothing running to stop.
            }
            "d" => {
                writeln!(out, "{}", render_game_state(&self.position))?;
                writeln!(out, "Fen: {}", self.position.get_fen())?;
            }
            "quit" => {
                return Ok(true);
            }
            _ => {
                log::debug!("ignoring unknown command '{cmd}'");
            }
        }

        Ok(false)
    }

    fn handle_setoption(&mut self, line: &str) -> ChessResult<()> {
        let mut name_tokens = Vec::<&str>::new();
        let mut value_tokens = Vec::<&str>::new();
        let mut mode = "";

        for tok in line.split_whitespace().skip(1) {
            match tok {
                "name" => mode = "name",
                "value" => mode = "value",
                _ if mode == "name" => name_tokens.push(tok),
                _ if mode == "value" => value_tokens.push(tok),
                _ => {}
            }
        }

        self.engine
            .set_option(&name_tokens.join(" "), &value_tokens.join(" "))
    }

    /// Rebuild the position from `startpos` or `fen ...` plus optional
    /// `moves`. The current position is kept if any part fails.
    fn handle_position(&mut self, line: &str) -> ChessResult<()> {
        let mut tokens = line.split_whitespace().skip(1).peekable();

        let mut position = match tokens.next() {
            Some("startpos") => Position::new_game(),
            Some("fen") => {
                let mut fen_parts = Vec::<&str>::new();
                while let Some(next) = tokens.next_if(|tok| *tok != "moves") {
                    fen_parts.push(next);
                }
                if fen_parts.is_empty() {
                    return Err(ChessError::InvalidFen("missing FEN after 'position fen'".to_owned()));
                }
                Position::from_fen(&fen_parts.join(" "))?
            }
            Some(other) => {
                return Err(ChessError::InvalidFen(format!(
                    "unsupported position token '{other}'"
                )))
            }
            None => return Err(ChessError::InvalidFen("incomplete position command".to_owned())),
        };

        if tokens.next_if_eq(&"moves").is_some() {
            for lan in tokens {
                let mv = long_algebraic_to_move(lan, &position)?;
                position.move_maker().make_move(mv)?;
            }
        }

        self.position = position;
        Ok(())
    }

    fn handle_go(&mut self, line: &str) -> ChessResult<EngineOutput> {
        let params = parse_go_params(line)?;
        self.engine.choose_move(&self.position, &params)
    }
}

fn parse_value<T: std::str::FromStr>(keyword: &str, value: Option<&str>) -> ChessResult<T> {
    value
        .and_then(|raw| raw.parse::<T>().ok())
        .ok_or_else(|| ChessError::InvalidOption(format!("go {keyword} {}", value.unwrap_or(""))))
}

/// Parse the limits of a `go` command. Flags without values (`infinite`,
/// `ponder`) are accepted and ignored.
pub fn parse_go_params(line: &str) -> ChessResult<GoParams> {
    let mut params = GoParams::default();
    let mut tokens = line.split_whitespace().skip(1);

    while let Some(keyword) = tokens.next() {
        match keyword {
            "depth" => params.depth = Some(parse_value(keyword, tokens.next())?),
            "movetime" => params.movetime_ms = Some(parse_value(keyword, tokens.next())?),
            "wtime" => params.wtime_ms = Some(parse_value(keyword, tokens.next())?),
            "btime" => params.btime_ms = Some(parse_value(keyword, tokens.next())?),
            "winc" => params.winc_ms = Some(parse_value(keyword, tokens.next())?),
            "binc" => params.binc_ms = Some(parse_value(keyword, tokens.next())?),
            "movestogo" => params.movestogo = Some(parse_value(keyword, tokens.next())?),
            other => log::debug!("ignoring go token '{other}'"),
        }
    }

    Ok(params)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::game_state::chess_types::Color;

    fn run(state: &mut UciState, line: &str) -> String {
        let mut out = Vec::new();
        state.handle_command(line, &mut out).expect("writing to a Vec cannot fail");
        String::from_utf8(out).expect("UCI output is UTF-8")
    }

    #[test]
    fn handshake_lists_identity_and_options() {
        let mut state = UciState::new(SearchConfig::default());
        let out = run(&mut state, "uci");
        assert!(out.starts_with("id name Rook and Ply\n"));
        assert!(out.contains("option name Depth type spin default 4"));
        assert!(out.contains("option name MoveTime type spin default 1000"));
        assert!(out.ends_with("uciok\n"));
        assert_eq!(run(&mut state, "isready"), "readyok\n");
    }

    #[test]
    fn position_startpos_with_moves_updates_state() {
        let mut state = UciState::new(SearchConfig::default());
        assert_eq!(run(&mut state, "position startpos moves e2e4 e7e5 g1f3"), "");
        assert_eq!(state.position().turn(), Color::Black);
        assert_eq!(
            state.position().get_fen(),
            "rnbqkbnr/pppp1ppp/8/4p3/4P3/5N2/PPPP1PPP/RNBQKB1R b KQkq - 1 2"
        );
    }

    #[test]
    fn position_fen_without_moves_updates_state() {
        let mut state = UciState::new(SearchConfig::default());
        run(&mut state, "position fen 8/8/8/8/8/8/4P3/4K3 w - - 0 1");
        assert_eq!(state.position().get_fen(), "8/8/8/8/8/8/4P3/4K3 w - - 0 1");
    }

    #[test]
    fn bad_position_input_keeps_previous_state() {
        let mut state = UciState::new(SearchConfig::default());
        run(&mut state, "position startpos moves e2e4");
        let before = state.position().get_fen();

        for bad in [
            "position startpos moves e2e4 e2e4",
            "position fen 9/8/8/8/8/8/8/8 w - - 0 1",
            "position fen",
            "position sideways",
            "position startpos moves e2",
        ] {
            let out = run(&mut state, bad);
            assert!(out.starts_with("info string position error:"), "{bad}: {out}");
            assert_eq!(state.position().get_fen(), before, "{bad}");
        }
    }

    #[test]
    fn go_depth_reports_info_and_bestmove() {
        let mut state = UciState::new(SearchConfig::default());
        run(&mut state, "position fen 7k/8/6K1/8/8/8/8/R7 w - - 0 1");
        let out = run(&mut state, "go depth 2");
        assert!(out.contains("info depth 2 score mate 1"));
        assert!(out.ends_with("bestmove a1a8\n"));
    }

    #[test]
    fn go_without_legal_moves_prints_null_move() {
        let mut state = UciState::new(SearchConfig::default());
        run(&mut state, "position fen k6R/8/1K6/8/8/8/8/8 b - - 1 1");
        let out = run(&mut state, "go depth 3");
        assert!(out.ends_with("bestmove 0000\n"));
    }

    #[test]
    fn malformed_go_reports_error_and_null_move() {
        let mut state = UciState::new(SearchConfig::default());
        let out = run(&mut state, "go depth deep");
        assert!(out.starts_with("info string go error:"));
        assert!(out.ends_with("bestmove 0000\n"));
    }

    #[test]
    fn parse_go_params_keeps_clock_fields() {
        let params = parse_go_params("go wtime 120000 btime 60000 winc 1000 binc 1000 movestogo 24")
            .expect("go params should parse");
        assert_eq!(params.movetime_ms, None);
        assert_eq!(params.wtime_ms, Some(120_000));
        assert_eq!(params.btime_ms, Some(60_000));
        assert_eq!(params.winc_ms, Some(1_000));
        assert_eq!(params.binc_ms, Some(1_000));
        assert_eq!(params.movestogo, Some(24));
        assert_eq!(
            parse_go_params("go infinite depth 6").expect("go params should parse").depth,
            Some(6)
        );
        assert!(parse_go_params("go movetime").is_err());
    }

    #[test]
    fn setoption_routes_to_engine() {
        let mut state = UciState::new(SearchConfig::default());
        assert_eq!(run(&mut state, "setoption name Depth value 3"), "");
        assert_eq!(run(&mut state, "setoption name MoveTime value 50"), "");
        assert!(run(&mut state, "setoption name Hash value 16").starts_with("info string setoption error:"));
        assert!(run(&mut state, "setoption name Depth value 0").starts_with("info string setoption error:"));
        assert!(run(&mut state, "setoption name MoveTime value 0").starts_with("info string setoption error:"));
    }

    #[test]
    fn display_and_quit() {
        let mut state = UciState::new(SearchConfig::default());
        let out = run(&mut state, "d");
        assert!(out.contains("8 ♜ ♞ ♝ ♛ ♚ ♝ ♞ ♜ 8"));
        assert!(out.ends_with("Fen: rnbqkbnr/pppppppp/8/8/8/8/PPPPPPPP/RNBQKBNR w KQkq - 0 1\n"));

        assert_eq!(run(&mut state, "stop"), "");
        assert_eq!(run(&mut state, "frobnicate"), "");
        let mut out = Vec::new();
        assert!(state.handle_command("quit", &mut out).expect("quit handled"));
    }

    #[test]
    fn ucinewgame_resets_position() {
        let mut state = UciState::new(SearchConfig::default());
        run(&mut state, "position startpos moves d2d4");
        run(&mut state, "ucinewgame");
        assert_eq!(state.position().get_fen(), Position::new_game().get_fen());
    }
}
