//! Iterative deepening search with negamax alpha-beta pruning.
//!
//! Each `SearchEngine` owns its transposition table and best-move cache for
//! its whole lifetime. Searches run on a detached copy of the caller's
//! position, which is walked with make/unmake in strict LIFO order.

use std::collections::{HashMap, HashSet};
use std::time::{Duration, Instant};

use crate::game_state::chess_types::*;
use crate::search::board_scoring::{
    evaluate_position, is_mate_score, BoardScorer, MaterialScorer, MATE_THRESHOLD,
};
use crate::search::static_exchange::static_exchange_evaluation;
use crate::search::transposition_table::{Bound, TTEntry, TTStats, TranspositionTable};

/// Window bound, wider than any reachable score.
pub const INF: i32 = 1_000_000;

const CAPTURE_ORDER_BIAS: i32 = 30_000;
const QUIESCENCE_MAX_PLY: u32 = 12;
const MAX_ITERATIVE_DEPTH: u8 = 64;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SearchMode {
    /// One search to `max_depth` plies, no clock.
    DepthBounded,
    /// Iterative deepening until `movetime_ms` runs out.
    TimeBounded,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SearchConfig {
    pub max_depth: u8,
    pub movetime_ms: u64,
    pub mode: SearchMode,
}

impl Default for SearchConfig {
    fn default() -> Self {
        Self {
            max_depth: 4,
            movetime_ms: 1000,
            mode: SearchMode::TimeBounded,
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SearchResult {
    /// `None` only when the side to move has no legal move.
    pub best_move: Option<Move>,
    pub best_score: i32,
    pub reached_depth: u8,
    pub nodes: u64,
    pub elapsed_ms: u64,
    pub pv: Vec<Move>,
    pub tt_stats: TTStats,
}

pub struct SearchEngine<S: BoardScorer = MaterialScorer> {
    config: SearchConfig,
    scorer: S,
    tt: TranspositionTable,
    pv_cache: HashMap<u64, Move>,
    deadline: Option<Instant>,
    timed_out: bool,
    nodes: u64,
}

impl SearchEngine<MaterialScorer> {
    pub fn new(config: SearchConfig) -> Self {
        Self::with_scorer(config, MaterialScorer)
    }
}

impl Default for SearchEngine<MaterialScorer> {
    fn default() -> Self {
        Self::new(SearchConfig::default())
    }
}

impl<S: BoardScorer> SearchEngine<S> {
    pub fn with_scorer(config: SearchConfig, scorer: S) -> Self {
        Self {
            config,
            scorer,
            tt: TranspositionTable::new(),
            pv_cache: HashMap::new(),
            deadline: None,
            timed_out: false,
            nodes: 0,
        }
    }

    #[inline]
    pub fn config(&self) -> SearchConfig {
        self.config
    }

    pub fn set_config(&mut self, config: SearchConfig) {
        self.config = config;
    }

    /// Forget everything learned from earlier searches.
    pub fn clear(&mut self) {
        self.tt.clear();
        self.pv_cache.clear();
    }

    #[inline]
    pub fn tt_stats(&self) -> TTStats {
        self.tt.stats()
    }

    /// Search with the configured mode and limits.
    pub fn get_best_move(&mut self, position: &Position) -> SearchResult {
        self.search(position, self.config, |_| {})
    }

    pub fn get_best_move_with_depth(&mut self, position: &Position, depth: u8) -> SearchResult {
        let config = SearchConfig {
            max_depth: depth,
            mode: SearchMode::DepthBounded,
            ..self.config
        };
        self.search(position, config, |_| {})
    }

    pub fn get_best_move_with_time_limit(&mut self, position: &Position, movetime_ms: u64) -> SearchResult {
        let config = SearchConfig {
            movetime_ms,
            mode: SearchMode::TimeBounded,
            ..self.config
        };
        self.search(position, config, |_| {})
    }

    /// Run one search, calling `on_iteration` after every completed depth.
    pub fn search(
        &mut self,
        position: &Position,
        config: SearchConfig,
        mut on_iteration: impl FnMut(&SearchResult),
    ) -> SearchResult {
        let started_at = Instant::now();
        let mut root = position.detached_copy();
        self.nodes = 0;
        self.timed_out = false;

        let (first_depth, last_depth) = match config.mode {
            SearchMode::DepthBounded => {
                self.deadline = None;
                let depth = config.max_depth.max(1);
                (depth, depth)
            }
            SearchMode::TimeBounded => {
                self.deadline = Some(started_at + Duration::from_millis(config.movetime_ms));
                (1, MAX_ITERATIVE_DEPTH)
            }
        };

        let mut result = SearchResult::default();
        for depth in first_depth..=last_depth {
            if self.time_is_up() {
                break;
            }
            let Some((best_move, best_score)) = self.search_root(&mut root, depth) else {
                log::trace!("abandoned depth {depth} after {} nodes", self.nodes);
                break;
            };

            result.best_move = Some(best_move);
            result.best_score = best_score;
            result.reached_depth = depth;
            result.nodes = self.nodes;
            result.elapsed_ms = started_at.elapsed().as_millis() as u64;
            result.pv = self.principal_variation(&root, depth as usize);
            log::debug!(
                "depth {depth} score {best_score} nodes {} best {best_move}",
                self.nodes
            );
            on_iteration(&result);

            if is_mate_score(best_score) {
                break;
            }
        }

        if result.best_move.is_none() {
            let mut moves = root.legal_moves();
            order_moves(&root, &mut moves, None);
            result.best_move = moves.first().copied();
            result.pv = result.best_move.into_iter().collect();
        }
        result.nodes = self.nodes;
        result.elapsed_ms = started_at.elapsed().as_millis() as u64;
        result.tt_stats = self.tt.stats();
        self.deadline = None;
        result
    }

    #[inline]
    fn time_is_up(&self) -> bool {
        self.deadline.is_some_and(|limit| Instant::now() >= limit)
    }

    /// Full-window search over the root moves. `None` when the clock ran out
    /// before every root move was searched, or when there are no moves.
    fn search_root(&mut self, position: &mut Position, depth: u8) -> Option<(Move, i32)> {
        let key = position.zobrist_hash();
        let mut moves = position.legal_moves();
        let hint = self.tt.best_move(key).or_else(|| self.pv_cache.get(&key).copied());
        order_moves(position, &mut moves, hint);

        let mut alpha = -INF;
        let beta = INF;
        let mut best: Option<(Move, i32)> = None;

        for mv in moves {
            if self.time_is_up() {
                self.timed_out = true;
                return None;
            }
            if position.move_maker().make_legal_move(mv).is_none() {
                continue;
            }
            let score = -self.negamax(position, depth - 1, -beta, -alpha, 1);
            position.move_maker().unmake_move();
            if self.timed_out {
                return None;
            }

            if best.map_or(true, |(_, best_score)| score > best_score) {
                best = Some((mv, score));
            }
            alpha = alpha.max(score);
        }

        let (best_move, best_score) = best?;
        self.tt.store(TTEntry {
            key,
            depth,
            score: score_to_tt(best_score, 0),
            bound: Bound::Exact,
            best_move: Some(best_move),
        });
        self.pv_cache.insert(key, best_move);
        Some((best_move, best_score))
    }

    /// Score of `position` from the side to move, `depth` plies deep, `ply`
    /// plies from the root. Returns 0 once the clock has expired.
    pub fn negamax(&mut self, position: &mut Position, depth: u8, mut alpha: i32, mut beta: i32, ply: u32) -> i32 {
        self.nodes += 1;
        if self.time_is_up() {
            self.timed_out = true;
            return 0;
        }

        let key = position.zobrist_hash();
        let (alpha_orig, beta_orig) = (alpha, beta);
        let mut hint = None;
        if let Some(entry) = self.tt.probe(key) {
            hint = entry.best_move;
            if entry.depth >= depth {
                let score = score_from_tt(entry.score, ply);
                match entry.bound {
                    Bound::Exact => return score,
                    Bound::Lower => alpha = alpha.max(score),
                    Bound::Upper => beta = beta.min(score),
                }
                if alpha >= beta {
                    return score;
                }
            }
        }

        let mut moves = position.legal_moves();
        if depth == 0 || moves.is_empty() {
            return self.quiescence(position, alpha, beta, ply, 0);
        }
        order_moves(position, &mut moves, hint.or_else(|| self.pv_cache.get(&key).copied()));

        let mut best_score = -INF;
        let mut best_move = None;
        for mv in moves {
            if position.move_maker().make_legal_move(mv).is_none() {
                continue;
            }
            let score = -self.negamax(position, depth - 1, -beta, -alpha, ply + 1);
            position.move_maker().unmake_move();
            if self.timed_out {
                return 0;
            }

            if score > best_score {
                best_score = score;
                best_move = Some(mv);
            }
            alpha = alpha.max(score);
            if alpha >= beta {
                break;
            }
        }

        let bound = if best_score <= alpha_orig {
            Bound::Upper
        } else if best_score >= beta_orig {
            Bound::Lower
        } else {
            Bound::Exact
        };
        self.tt.store(TTEntry {
            key,
            depth,
            score: score_to_tt(best_score, ply),
            bound,
            best_move,
        });
        if let Some(mv) = best_move {
            self.pv_cache.insert(key, mv);
        }
        best_score
    }

    /// Capture/promotion-only search below the horizon. The static score is a
    /// floor the side to move can always claim by standing pat.
    pub fn quiescence(&mut self, position: &mut Position, mut alpha: i32, beta: i32, ply: u32, qply: u32) -> i32 {
        self.nodes += 1;
        if self.time_is_up() {
            self.timed_out = true;
            return 0;
        }

        let turn = position.turn();
        let moves = position.legal_moves();
        if moves.is_empty() {
            return evaluate_position(position, &self.scorer, turn, ply);
        }

        let stand_pat = self.scorer.score(position, turn);
        if stand_pat >= beta || qply >= QUIESCENCE_MAX_PLY {
            return stand_pat;
        }
        alpha = alpha.max(stand_pat);

        let mut noisy: Vec<Move> = moves.into_iter().filter(|mv| is_noisy(position, *mv)).collect();
        order_moves(position, &mut noisy, None);

        let mut best = stand_pat;
        for mv in noisy {
            if position.move_maker().make_legal_move(mv).is_none() {
                continue;
            }
            let score = -self.quiescence(position, -beta, -alpha, ply + 1, qply + 1);
            position.move_maker().unmake_move();
            if self.timed_out {
                return 0;
            }

            best = best.max(score);
            alpha = alpha.max(score);
            if alpha >= beta {
                break;
            }
        }
        best
    }

    /// Walk the best-move cache from `position`, stopping at an unknown,
    /// illegal or repeated position.
    pub fn principal_variation(&self, position: &Position, max_len: usize) -> Vec<Move> {
        let mut walk = position.detached_copy();
        let mut seen = HashSet::new();
        let mut line = Vec::new();
        while line.len() < max_len && seen.insert(walk.zobrist_hash()) {
            let Some(&mv) = self.pv_cache.get(&walk.zobrist_hash()) else {
                break;
            };
            if !walk.validator().is_valid_move(mv) {
                break;
            }
            if walk.move_maker().make_legal_move(mv).is_none() {
                break;
            }
            line.push(mv);
        }
        line
    }
}

/// Mate scores are stored relative to the node so they stay valid when the
/// same position is reached at another ply.
#[inline]
fn score_to_tt(score: i32, ply: u32) -> i32 {
    if score >= MATE_THRESHOLD {
        score + ply as i32
    } else if score <= -MATE_THRESHOLD {
        score - ply as i32
    } else {
        score
    }
}

#[inline]
fn score_from_tt(score: i32, ply: u32) -> i32 {
    if score >= MATE_THRESHOLD {
        score - ply as i32
    } else if score <= -MATE_THRESHOLD {
        score + ply as i32
    } else {
        score
    }
}

/// Piece removed by `mv`, including the pawn taken en passant.
fn captured_piece(position: &Position, mv: Move) -> Option<ColoredPiece> {
    if let Some(piece) = position.piece_at(mv.to) {
        return Some(piece);
    }
    let mover = position.piece_at(mv.from)?;
    let en_passant = mover.kind == PieceKind::Pawn
        && mv.from.col != mv.to.col
        && position.en_passant_square() == Some(mv.to);
    if en_passant {
        position.piece_at(Square::new(mv.from.row, mv.to.col))
    } else {
        None
    }
}

/// Promotions, and captures that do not lose material by static exchange.
fn is_noisy(position: &Position, mv: Move) -> bool {
    mv.promotion.is_some()
        || (captured_piece(position, mv).is_some() && static_exchange_evaluation(position, mv) >= 0)
}

/// Ordering key: MVV-LVA for captures, promoted value for promotions, 0 for
/// quiet moves.
pub fn move_order_score(position: &Position, mv: Move) -> i32 {
    let value = MaterialScorer::piece_value;
    let mut score = 0;
    if let Some(victim) = captured_piece(position, mv) {
        let attacker = position.piece_at(mv.from).map_or(0, |p| value(p.kind));
        score += CAPTURE_ORDER_BIAS + value(victim.kind) - attacker;
    }
    if let Some(kind) = mv.promotion {
        score += value(kind);
    }
    score
}

/// Stable sort by descending `move_order_score`, then move `hint` (if
/// present in the list) to the front.
pub fn order_moves(position: &Position, moves: &mut Vec<Move>, hint: Option<Move>) {
    moves.sort_by_cached_key(|mv| std::cmp::Reverse(move_order_score(position, *mv)));
    if let Some(hint) = hint {
        if let Some(index) = moves.iter().position(|mv| *mv == hint) {
            let mv = moves.remove(index);
            moves.insert(0, mv);
        }
    }
}
