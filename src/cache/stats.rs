//! Cache Statistics Module
//!
//! Tracks hits, misses, writes, evictions and the live size of the store.

use serde::Serialize;

// == Cache Stats ==
/// Aggregate cache counters. Callers only ever see snapshot copies.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct CacheStats {
    /// Number of successful cache retrievals
    pub hits: u64,
    /// Number of failed cache retrievals (key not found or expired)
    pub misses: u64,
    /// Number of writes accepted by the store
    pub sets: u64,
    /// Number of entries removed to free capacity
    pub evictions: u64,
    /// Sum of the serialized sizes of all live entries
    pub total_size: usize,
    /// Number of live entries
    pub item_count: usize,
}

impl CacheStats {
    // == Constructor ==
    /// Creates a new CacheStats with all counters at zero.
    pub fn new() -> Self {
        Self::default()
    }

    // == Hit Rate ==
    /// Calculates the cache hit rate.
    ///
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

    pub fn record_set(&mut self) {
        self.sets += 1;
    }

    pub fn record_eviction(&mut self) {
        self.evictions += 1;
    }

    // == Size Accounting ==
    /// Accounts for a newly inserted entry of `size_bytes`.
    pub fn track_insert(&mut self, size_bytes: usize) {
        self.total_size += size_bytes;
        self.item_count += 1;
    }

    /// Accounts for a removed entry of `size_bytes`.
    pub fn track_remove(&mut self, size_bytes: usize) {
        self.total_size = self.total_size.saturating_sub(size_bytes);
        self.item_count = self.item_count.saturating_sub(1);
    }

    /// Zeroes the size accounting, keeping the operation counters.
    pub fn reset_size(&mut self) {
        self.total_size = 0;
        self.item_count = 0;
    }
}
