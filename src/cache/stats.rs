//! Cache Statistics Module
//!
//! Tracks per-engine read outcomes: hits, misses, lazy expirations and healed entries.

use serde::Serialize;

// == Cache Stats ==
/// Read and write counters for one engine.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct CacheStats {
    /// Reads that returned a live value
    pub hits: u64,
    /// Reads that fell back to the default (absent, expired or corrupt)
    pub misses: u64,
    /// Entries erased on read because their TTL had elapsed
    pub expirations: u64,
    /// Entries erased on read because they could not be parsed
    pub healed: u64,
    /// Successful writes
    pub writes: u64,
}

impl CacheStats {
    // == Constructor ==
    /// Creates a new CacheStats with all counters at zero.
    pub fn new() -> Self {
        Self::default()
    }

    // == Hit Rate ==
    /// Returns hits / (hits + misses), or 0.0 if no reads have been made.
    pub fn hit_rate(&self) -> f64 {
        let total = self.hits + self.misses;
        if total == 0 {
            0.0
        } else {
            self.hits as f64 / total as f64
        }
    }

    pub fn record_hit(&mut self) {
        self.hits += 1;
    }

    pub fn record_miss(&mut self) {
        self.misses += 1;
    }

    /// Counts an expired read; also a miss.
    pub fn record_expiration(&mut self) {
        self.expirations += 1;
        self.record_miss();
    }

    /// Counts a corrupt-entry read; also a miss.
    pub fn record_heal(&mut self) {
        self.healed += 1;
        self.record_miss();
    }

    pub fn record_write(&mut self) {
        self.writes += 1;
    }

    // == Reset ==
    pub fn reset(&mut self) {
        *self = Self::default();
    }
}
