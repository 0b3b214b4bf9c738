//! Move cache for the engine.
//!
//! Features:
//! - Maps a position hash to the legal-move list generated for that position
//! - One cache per side: the hash carries no side to move, and the same
//!   occupancy yields different move sets for each side
//! - Entries live for the whole game session; nothing is evicted
//! - Stats: probes, hits, stores
//!
//! Usage:
//! - `caches.for_side(side).get_or_compute(board, keys)` wherever a move list is needed.
//! - On a new game call `caches.clear()`.

use crate::engine::{Board, Move, Side, gen_moves};
use crate::zobrist::Zobrist;
use log::trace;
use std::collections::HashMap;
use std::fmt;
use std::sync::Arc;

/// Frozen move list shared between the cache and its callers.
pub type MoveList = Arc<[Move]>;

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct CacheStats {
    pub probes: u64,
    pub hits: u64,
    pub stores: u64,
}

impl CacheStats {
    pub fn hit_rate(&self) -> f64 {
        if self.probes == 0 {
            0.0
        } else {
            (self.hits as f64 / self.probes as f64) * 100.0
        }
    }
}

impl fmt::Display for CacheStats {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "probes={} hits={} stores={} hit_rate={:.2}%",
            self.probes,
            self.hits,
            self.stores,
            self.hit_rate()
        )
    }
}

/// Legal-move cache for one side.
pub struct MoveCache {
    side: Side,
    entries: HashMap<u64, MoveList>,
    stats: CacheStats,
}

impl MoveCache {
    pub fn new(side: Side) -> Self {
        MoveCache {
            side,
            entries: HashMap::new(),
            stats: CacheStats::default(),
        }
    }

    pub fn side(&self) -> Side {
        self.side
    }

    /// Returns the stored list for this position, generating it on a miss.
    pub fn get_or_compute(&mut self, board: &Board, keys: &Zobrist) -> MoveList {
        self.get_or_compute_with(board, keys, |b, side| {
            let mut moves = Vec::new();
            gen_moves(b, side, &mut moves);
            moves
        })
    }

    /// Like `get_or_compute`, with the generator supplied by the caller.
    pub fn get_or_compute_with<F>(&mut self, board: &Board, keys: &Zobrist, generate: F) -> MoveList
    where
        F: FnOnce(&Board, Side) -> Vec<Move>,
    {
        self.stats.probes = self.stats.probes.wrapping_add(1);
        let key = keys.hash_board(board);
        if let Some(moves) = self.entries.get(&key) {
            self.stats.hits = self.stats.hits.wrapping_add(1);
            return Arc::clone(moves);
        }

        let moves: MoveList = generate(board, self.side).into();
        trace!(
            "{} cache miss {:016X}: {} moves",
            self.side,
            key,
            moves.len()
        );
        self.stats.stores = self.stats.stores.wrapping_add(1);
        self.entries.insert(key, Arc::clone(&moves));
        moves
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn stats(&self) -> CacheStats {
        self.stats
    }

    /// Drop every entry and reset the counters.
    pub fn clear(&mut self) {
        self.entries.clear();
        self.stats = CacheStats::default();
    }
}

/// The pair of per-side caches a game session owns.
pub struct MoveCaches {
    computer: MoveCache,
    human: MoveCache,
}

impl MoveCaches {
    pub fn new() -> Self {
        MoveCaches {
            computer: MoveCache::new(Side::Computer),
            human: MoveCache::new(Side::Human),
        }
    }

    pub fn for_side(&mut self, side: Side) -> &mut MoveCache {
        match side {
            Side::Computer => &mut self.computer,
            Side::Human => &mut self.human,
        }
    }

    pub fn stats(&self, side: Side) -> CacheStats {
        match side {
            Side::Computer => self.computer.stats(),
            Side::Human => self.human.stats(),
        }
    }

    pub fn clear(&mut self) {
        self.computer.clear();
        self.human.clear();
    }
}

impl Default for MoveCaches {
    fn default() -> Self {
        Self::new()
    }
}
