//! Background "thinking" handoff.
//!
//! A search runs on a detached worker thread over its own copy of the
//! position and publishes its result into a mutex-guarded single-slot cell.
//! The caller keeps using its original position and polls with `try_take`.

use std::sync::{Arc, Mutex};
use std::thread::{self, JoinHandle};

use crate::game_state::chess_types::Position;
use crate::search::iterative_deepening::{SearchConfig, SearchEngine, SearchResult};

/// Single-slot cell written once by the worker and drained by the caller.
type ResultSlot = Arc<Mutex<Option<SearchResult>>>;

pub struct BackgroundSearch {
    slot: ResultSlot,
    handle: Option<JoinHandle<SearchEngine>>,
}

impl BackgroundSearch {
    /// Start a search with a fresh engine.
    pub fn spawn(position: &Position, config: SearchConfig) -> Self {
        Self::spawn_with_engine(SearchEngine::new(config), position)
    }

    /// Start a search with an existing engine, which keeps its caches and is
    /// handed back by `join`.
    pub fn spawn_with_engine(mut engine: SearchEngine, position: &Position) -> Self {
        let snapshot = position.detached_copy();
        let slot: ResultSlot = Arc::new(Mutex::new(None));
        let worker_slot = Arc::clone(&slot);

        let handle = thread::spawn(move || {
            let result = engine.get_best_move(&snapshot);
            match worker_slot.lock() {
                Ok(mut cell) => *cell = Some(result),
                Err(poisoned) => *poisoned.into_inner() = Some(result),
            }
            engine
        });

        Self {
            slot,
            handle: Some(handle),
        }
    }

    /// The finished result, if the worker has published one. Returns it at
    /// most once.
    pub fn try_take(&self) -> Option<SearchResult> {
        match self.slot.lock() {
            Ok(mut cell) => cell.take(),
            Err(poisoned) => poisoned.into_inner().take(),
        }
    }

    #[inline]
    pub fn is_finished(&self) -> bool {
        self.handle.as_ref().map_or(true, |h| h.is_finished())
    }

    /// Block until the worker exits, returning its engine and any result not
    /// yet taken. `None` engine means the worker panicked.
    pub fn join(mut self) -> (Option<SearchEngine>, Option<SearchResult>) {
        let engine = self.handle.take().and_then(|h| match h.join() {
            Ok(engine) => Some(engine),
            Err(_) => {
                log::warn!("background search thread panicked");
                None
            }
        });
        (engine, self.try_take())
    }
}
