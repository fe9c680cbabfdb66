//! Transposition table keyed by Zobrist hash.
//!
//! Entries live in a plain `HashMap` that grows without bound for the life of
//! the owning engine. `clear` is the only eviction.

use std::collections::HashMap;

use crate::game_state::chess_types::Move;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Bound {
    Exact,
    Lower,
    Upper,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TTEntry {
    pub key: u64,
    pub depth: u8,
    pub score: i32,
    pub bound: Bound,
    pub best_move: Option<Move>,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct TTStats {
    pub probes: u64,
    pub hits: u64,
    pub stores: u64,
}

#[derive(Debug, Clone, Default)]
pub struct TranspositionTable {
    entries: HashMap<u64, TTEntry>,
    stats: TTStats,
}

impl TranspositionTable {
    pub fn new() -> Self {
        Self::default()
    }

    #[inline]
    pub fn clear(&mut self) {
        self.entries.clear();
        self.stats = TTStats::default();
    }

    #[inline]
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    #[inline]
    pub fn stats(&self) -> TTStats {
        self.stats
    }

    pub fn probe(&mut self, key: u64) -> Option<TTEntry> {
        self.stats.probes += 1;
        let hit = self.entries.get(&key).copied();
        if hit.is_some() {
            self.stats.hits += 1;
        }
        hit
    }

    /// Best move recorded for `key`, without touching the probe statistics.
    #[inline]
    pub fn best_move(&self, key: u64) -> Option<Move> {
        self.entries.get(&key).and_then(|entry| entry.best_move)
    }

    /// Insert or overwrite the entry for `entry.key`. The newest result for a
    /// position always wins.
    pub fn store(&mut self, entry: TTEntry) {
        self.stats.stores += 1;
        self.entries.insert(entry.key, entry);
    }
}

#[cfg(test)]
mod tests {
    use super::{Bound, TTEntry, TranspositionTable};
    use crate::game_state::chess_types::{Move, Square};

    #[test]
    fn store_and_probe_round_trip() {
        let mut tt = TranspositionTable::new();
        let best = Move::new(Square::new(1, 4), Square::new(3, 4));
        let entry = TTEntry {
            key: 123,
            depth: 5,
            score: 42,
            bound: Bound::Exact,
            best_move: Some(best),
        };
        tt.store(entry);
        assert_eq!(tt.probe(123), Some(entry));
        assert_eq!(tt.best_move(123), Some(best));
        assert!(tt.probe(124).is_none());

        let stats = tt.stats();
        assert_eq!((stats.probes, stats.hits, stats.stores), (2, 1, 1));
    }

    #[test]
    fn later_store_replaces_and_clear_empties() {
        let mut tt = TranspositionTable::new();
        let key = 555;
        tt.store(TTEntry {
            key,
            depth: 6,
            score: 1,
            bound: Bound::Upper,
            best_move: None,
        });
        tt.store(TTEntry {
            key,
            depth: 2,
            score: 9,
            bound: Bound::Lower,
            best_move: None,
        });
        let got = tt.probe(key).expect("entry exists");
        assert_eq!((got.depth, got.score, got.bound), (2, 9, Bound::Lower));
        assert_eq!(tt.len(), 1);

        tt.clear();
        assert!(tt.is_empty());
        assert_eq!(tt.stats().stores, 0);
    }
}
