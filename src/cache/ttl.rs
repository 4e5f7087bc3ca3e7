//! TTL Estimator Module
//!
//! Derives a time-to-live for entries stored without an explicit TTL.

use crate::cache::CacheEntry;

const MINUTE_MS: u64 = 60 * 1000;

/// TTL applied when no key pattern matches
pub const BASE_TTL_MS: u64 = 5 * MINUTE_MS;

/// Payloads above this serialized size get their TTL doubled
pub const LARGE_VALUE_BYTES: usize = 100 * 1024;

/// Access count an existing entry must exceed to earn the hot-key bonus
pub const HOT_ACCESS_THRESHOLD: u64 = 10;

/// Key substrings and the TTL they select. First match wins.
const KEY_PATTERNS: &[(&str, u64)] = &[
    ("user-profile", 30 * MINUTE_MS),
    ("cv-template", 60 * MINUTE_MS),
    ("ai-response", 15 * MINUTE_MS),
    ("analytics", MINUTE_MS),
];

// == Estimate TTL ==
/// Estimates the TTL in milliseconds for `key`.
///
/// # Arguments
/// * `key` - Cache key, matched by substring against known key families
/// * `size_bytes` - Serialized size of the incoming value
/// * `existing` - Entry currently stored under `key`, if any
pub fn estimate_ttl_ms(key: &str, size_bytes: usize, existing: Option<&CacheEntry>) -> u64 {
    let mut ttl = KEY_PATTERNS
        .iter()
        .find(|(pattern, _)| key.contains(*pattern))
        .map(|(_, ttl)| *ttl)
        .unwrap_or(BASE_TTL_MS);

    if size_bytes > LARGE_VALUE_BYTES {
        ttl *= 2;
    }

    if existing.is_some_and(|entry| entry.access_count > HOT_ACCESS_THRESHOLD) {
        ttl += ttl / 2;
    }

    ttl.max(1)
}
