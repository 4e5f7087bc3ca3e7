//! Cache Entry Module
//!
//! Defines a single cached payload together with the bookkeeping used by
//! the TTL estimator and the eviction scorer.

use std::time::{SystemTime, UNIX_EPOCH};

use serde_json::Value;

// == Cache Entry ==
/// Represents a single cache entry with value and access metadata.
#[derive(Debug, Clone)]
pub struct CacheEntry {
    /// The stored payload
    pub value: Value,
    /// Creation timestamp (Unix milliseconds)
    pub created_at: u64,
    /// Expiration timestamp (Unix milliseconds)
    pub expires_at: u64,
    /// Number of successful reads since the entry was stored
    pub access_count: u64,
    /// Timestamp of the last successful read, or creation time
    pub last_accessed: u64,
    /// Byte length of the JSON serialization of `value`
    pub size_bytes: usize,
}

impl CacheEntry {
    // == Constructor ==
    /// Creates a new cache entry stored at `now` that lives for `ttl_ms`.
    ///
    /// # Arguments
    /// * `value` - The payload to store
    /// * `size_bytes` - Serialized size of the payload
    /// * `ttl_ms` - Time to live in milliseconds
    /// * `now` - Current Unix timestamp in milliseconds
    pub fn new(value: Value, size_bytes: usize, ttl_ms: u64, now: u64) -> Self {
        Self {
            value,
            created_at: now,
            expires_at: now.saturating_add(ttl_ms),
            access_count: 0,
            last_accessed: now,
            size_bytes,
        }
    }

    // == Is Expired ==
    /// Checks if the entry has expired at `now`.
    ///
    /// An entry stays readable up to and including its expiration instant,
    /// so it only counts as expired once `now` is strictly past `expires_at`.
    pub fn is_expired_at(&self, now: u64) -> bool {
        now > self.expires_at
    }

    // == Record Access ==
    /// Registers a successful read at `now`.
    pub fn record_access(&mut self, now: u64) {
        self.access_count += 1;
        self.last_accessed = now;
    }
}

// == Utility Functions ==
/// Returns current Unix timestamp in milliseconds.
pub fn current_timestamp_ms() -> u64 {
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map(|d| d.as_millis() as u64)
        .unwrap_or(0)
}

/// Returns the byte length of the JSON serialization of `value`.
pub fn serialized_size(value: &Value) -> usize {
    serde_json::to_vec(value).map(|bytes| bytes.len()).unwrap_or(0)
}
