//! Per-move time budgeting from UCI clock data.
//!
//! UCI passes raw clock data (`wtime/btime/winc/binc/movestogo/movetime`);
//! this module turns it into a single millisecond budget for the side to
//! move.

use crate::engines::engine_trait::GoParams;
use crate::game_state::chess_types::Color;

/// Share of the remaining clock spent on one move.
const CLOCK_FRACTION: u64 = 20;

/// Fill in `movetime_ms` from the mover's clock when no explicit movetime
/// was given. An explicit `movetime` always wins.
pub fn resolve_go_params(turn: Color, params: &GoParams) -> GoParams {
    if params.movetime_ms.is_some() {
        return params.clone();
    }

    let mut resolved = params.clone();
    let (remaining, increment) = match turn {
        Color::White => (params.wtime_ms, params.winc_ms),
        Color::Black => (params.btime_ms, params.binc_ms),
    };

    if let Some(remaining) = remaining {
        resolved.movetime_ms = Some(budget_ms(remaining, increment, params.movestogo));
    }
    resolved
}

/// Remaining time split over the expected moves left (`movestogo`, else a
/// fixed fraction), plus most of the increment, capped at a quarter of the
/// clock.
fn budget_ms(remaining_ms: u64, inc_ms: Option<u64>, movestogo: Option<u16>) -> u64 {
    let moves_left = movestogo.map_or(CLOCK_FRACTION, |mtg| u64::from(mtg.max(1)));
    let base = remaining_ms / moves_left;
    let inc_bonus = inc_ms.unwrap_or(0).saturating_mul(3) / 4;
    let cap = (remaining_ms / 4).max(1);
    base.saturating_add(inc_bonus).min(cap).max(1)
}
