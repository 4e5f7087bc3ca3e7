//! Eviction Scorer Module
//!
//! Ranks entries by how much they are worth keeping. Replaces a plain
//! recency order with a score mixing recency, frequency and size.

use std::collections::HashMap;

use crate::cache::CacheEntry;

const MS_PER_HOUR: f64 = 3_600_000.0;

/// Floor applied to the entry age so fresh entries don't divide by zero
pub const MIN_AGE_HOURS: f64 = 0.1;

// == Value Score ==
/// Computes the retention score of `entry` at `now`.
///
/// `(access_count / max(age_hours, 0.1)) * (1 / (size_bytes / 1000))`,
/// where the age is measured from the last access. Higher means more
/// valuable and therefore less eligible for eviction.
pub fn value_score(entry: &CacheEntry, now: u64) -> f64 {
    let age_hours = now.saturating_sub(entry.last_accessed) as f64 / MS_PER_HOUR;
    let frequency = entry.access_count as f64 / age_hours.max(MIN_AGE_HOURS);
    let size_kb = entry.size_bytes.max(1) as f64 / 1000.0;

    frequency * (1.0 / size_kb)
}

// == Select Victim ==
/// Returns the key of the lowest-scoring entry, or `None` if `entries` is empty.
///
/// Linear scan; ties keep whichever entry the map yields first.
pub fn select_victim(entries: &HashMap<String, CacheEntry>, now: u64) -> Option<String> {
    let mut victim: Option<(&String, f64)> = None;

    for (key, entry) in entries {
        let score = value_score(entry, now);
        match victim {
            Some((_, lowest)) if score >= lowest => {}
            _ => victim = Some((key, score)),
        }
    }

    victim.map(|(key, _)| key.clone())
}
