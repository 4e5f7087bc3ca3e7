//! Cache Store Module
//!
//! Main cache engine combining HashMap storage with heuristic TTLs,
//! size accounting and score-based eviction.

use std::collections::HashMap;

use serde_json::Value;
use tracing::debug;

use crate::cache::entry::{current_timestamp_ms, serialized_size};
use crate::cache::scoring::select_victim;
use crate::cache::ttl::estimate_ttl_ms;
use crate::cache::{CacheEntry, CacheStats};

// == Cache Store ==
/// Entry store with item-count and memory ceilings.
///
/// `stats.total_size` and `stats.item_count` are updated in the same step as
/// every insertion and removal, so they always match the live entries.
#[derive(Debug)]
pub struct CacheStore {
    /// Key-value storage
    entries: HashMap<String, CacheEntry>,
    /// Counters and size accounting
    stats: CacheStats,
    /// Maximum number of entries allowed
    max_items: usize,
    /// Maximum total serialized size in bytes
    max_memory_bytes: usize,
}

impl CacheStore {
    // == Constructor ==
    /// Creates a new CacheStore with the given ceilings.
    ///
    /// # Arguments
    /// * `max_items` - Maximum number of entries the cache can hold
    /// * `max_memory_bytes` - Maximum total serialized size of all entries
    pub fn new(max_items: usize, max_memory_bytes: usize) -> Self {
        Self {
            entries: HashMap::new(),
            stats: CacheStats::new(),
            max_items,
            max_memory_bytes,
        }
    }

    // == Set ==
    /// Stores `value` under `key`.
    ///
    /// Without an explicit `ttl_ms` the TTL is estimated from the key, the
    /// payload size and the entry being replaced. An existing entry is
    /// replaced. While the insertion would exceed either ceiling the
    /// lowest-scoring entry is evicted; a value larger than the whole memory
    /// budget is still stored once the store is empty.
    pub fn set(&mut self, key: String, value: Value, ttl_ms: Option<u64>) {
        let now = current_timestamp_ms();
        let size_bytes = serialized_size(&value);
        let ttl_ms = ttl_ms.unwrap_or_else(|| {
            // An expired entry the sweep has not reached yet earns no hot-key bonus
            let existing = self.entries.get(&key).filter(|entry| !entry.is_expired_at(now));
            estimate_ttl_ms(&key, size_bytes, existing)
        });

        self.remove_entry(&key);

        while !self.entries.is_empty() && self.exceeds_budget(size_bytes) {
            if !self.evict_one(now) {
                break;
            }
        }

        self.entries
            .insert(key, CacheEntry::new(value, size_bytes, ttl_ms, now));
        self.stats.track_insert(size_bytes);
        self.stats.record_set();
    }

    // == Get ==
    /// Retrieves a value by key.
    ///
    /// Expired entries are removed on access and counted as misses.
    pub fn get(&mut self, key: &str) -> Option<Value> {
        let now = current_timestamp_ms();

        let expired = match self.entries.get(key) {
            Some(entry) => entry.is_expired_at(now),
            None => {
                self.stats.record_miss();
                return None;
            }
        };

        if expired {
            self.remove_entry(key);
            self.stats.record_miss();
            debug!(key = %key, "Lazily expired cache entry");
            return None;
        }

        let entry = self.entries.get_mut(key)?;
        entry.record_access(now);
        self.stats.record_hit();
        Some(entry.value.clone())
    }

    // == Delete ==
    /// Removes an entry by key. Returns `false` if the key was absent.
    pub fn delete(&mut self, key: &str) -> bool {
        self.remove_entry(key).is_some()
    }

    // == Clear ==
    /// Removes every entry and returns how many were dropped.
    /// Operation counters are kept.
    pub fn clear(&mut self) -> usize {
        let removed = self.entries.len();
        self.entries.clear();
        self.stats.reset_size();
        removed
    }

    // == Stats ==
    /// Returns a snapshot of the current cache statistics.
    pub fn stats(&self) -> CacheStats {
        self.stats.clone()
    }

    // == Cleanup Expired ==
    /// Removes all expired entries from the cache.
    ///
    /// Returns the number of entries removed.
    pub fn cleanup_expired(&mut self) -> usize {
        let now = current_timestamp_ms();
        let expired_keys: Vec<String> = self
            .entries
            .iter()
            .filter(|(_, entry)| entry.is_expired_at(now))
            .map(|(key, _)| key.clone())
            .collect();

        for key in &expired_keys {
            self.remove_entry(key);
        }

        expired_keys.len()
    }

    // == Length ==
    /// Returns the current number of entries in the cache.
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Checks for a key without touching access metadata or counters.
    pub fn contains_key(&self, key: &str) -> bool {
        self.entries.contains_key(key)
    }

    /// Sum of the serialized sizes of the live entries, computed from scratch.
    pub fn live_size(&self) -> usize {
        self.entries.values().map(|entry| entry.size_bytes).sum()
    }

    fn exceeds_budget(&self, incoming_bytes: usize) -> bool {
        self.entries.len() + 1 > self.max_items
            || self.stats.total_size + incoming_bytes > self.max_memory_bytes
    }

    fn evict_one(&mut self, now: u64) -> bool {
        match select_victim(&self.entries, now) {
            Some(victim) => {
                self.remove_entry(&victim);
                self.stats.record_eviction();
                debug!(key = %victim, "Evicted lowest-scoring cache entry");
                true
            }
            None => false,
        }
    }

    fn remove_entry(&mut self, key: &str) -> Option<CacheEntry> {
        let entry = self.entries.remove(key)?;
        self.stats.track_remove(entry.size_bytes);
        Some(entry)
    }
}

// == Unit Tests ==
#[cfg(test)]
mod tests {
    use super::*;
    use crate::cache::ttl::BASE_TTL_MS;
    use serde_json::json;
    use std::thread::sleep;
    use std::time::Duration;

    const MB: usize = 1024 * 1024;

    #[test]
    fn test_store_new() {
        let store = CacheStore::new(100, MB);
        assert_eq!(store.len(), 0);
        assert!(store.is_empty());
        assert_eq!(store.stats(), CacheStats::default());
    }

    #[test]
    fn test_store_set_and_get() {
        let mut store = CacheStore::new(100, MB);

        store.set("key1".to_string(), json!({"name": "Ada"}), None);

        assert_eq!(store.get("key1"), Some(json!({"name": "Ada"})));
        assert_eq!(store.len(), 1);
    }

    #[test]
    fn test_store_get_nonexistent() {
        let mut store = CacheStore::new(100, MB);

        assert_eq!(store.get("nonexistent"), None);
        assert_eq!(store.stats().misses, 1);
    }

    #[test]
    fn test_store_delete() {
        let mut store = CacheStore::new(100, MB);

        store.set("key1".to_string(), json!("value1"), None);
        assert!(store.delete("key1"));

        assert!(store.is_empty());
        assert_eq!(store.get("key1"), None);
    }

    #[test]
    fn test_store_delete_nonexistent() {
        let mut store = CacheStore::new(100, MB);
        assert!(!store.delete("nonexistent"));
    }

    #[test]
    fn test_store_overwrite_adjusts_size() {
        let mut store = CacheStore::new(100, MB);

        store.set("key1".to_string(), json!("short"), None);
        store.set("key1".to_string(), json!("a much longer value"), None);

        assert_eq!(store.get("key1"), Some(json!("a much longer value")));
        assert_eq!(store.len(), 1);

        let stats = store.stats();
        assert_eq!(stats.total_size, serialized_size(&json!("a much longer value")));
        assert_eq!(stats.item_count, 1);
        assert_eq!(stats.sets, 2);
    }

    #[test]
    fn test_store_ttl_expiration() {
        let mut store = CacheStore::new(100, MB);

        store.set("key1".to_string(), json!("value1"), Some(50));
        assert!(store.get("key1").is_some());

        sleep(Duration::from_millis(100));

        assert_eq!(store.get("key1"), None);
        let stats = store.stats();
        assert_eq!(stats.hits, 1);
        assert_eq!(stats.misses, 1);
        assert_eq!(stats.item_count, 0);
        assert_eq!(stats.total_size, 0);
    }

    #[test]
    fn test_store_item_ceiling_evicts_lowest_score() {
        let mut store = CacheStore::new(2, MB);

        store.set("a".to_string(), json!("X"), None);
        store.set("b".to_string(), json!("Y"), None);

        // "b" is read twice, "a" once: "a" has the lower score
        store.get("a");
        store.get("b");
        store.get("b");

        store.set("c".to_string(), json!("Z"), None);

        assert_eq!(store.len(), 2);
        assert!(!store.contains_key("a"));
        assert!(store.contains_key("b"));
        assert!(store.contains_key("c"));
        assert_eq!(store.stats().evictions, 1);
    }

    #[test]
    fn test_store_memory_ceiling_evicts_until_fit() {
        // Each `"xxxxxxxx"` serializes to 10 bytes
        let mut store = CacheStore::new(100, 40);

        store.set("a".to_string(), json!("xxxxxxxx"), None);
        store.set("b".to_string(), json!("xxxxxxxx"), None);
        store.set("c".to_string(), json!("xxxxxxxx"), None);
        store.get("c");

        // 25 bytes: both unread entries must go, "c" survives
        store.set("big".to_string(), json!("x".repeat(23)), None);

        let stats = store.stats();
        assert_eq!(stats.evictions, 2);
        assert_eq!(stats.total_size, 35);
        assert!(store.contains_key("c"));
        assert!(store.contains_key("big"));
        assert_eq!(stats.total_size, store.live_size());
    }

    #[test]
    fn test_store_oversized_value_still_stored() {
        let mut store = CacheStore::new(100, 10);

        store.set("small".to_string(), json!(1), None);
        store.set("huge".to_string(), json!("x".repeat(64)), None);

        assert_eq!(store.len(), 1);
        assert!(store.contains_key("huge"));
        assert_eq!(store.stats().total_size, 66);
    }

    #[test]
    fn test_store_overwrite_does_not_evict_at_capacity() {
        let mut store = CacheStore::new(2, MB);

        store.set("a".to_string(), json!(1), None);
        store.set("b".to_string(), json!(2), None);
        store.set("a".to_string(), json!(3), None);

        assert_eq!(store.len(), 2);
        assert_eq!(store.stats().evictions, 0);
    }

    #[test]
    fn test_store_estimated_ttl_uses_key_family() {
        let mut store = CacheStore::new(100, MB);

        store.set("cv-template:modern".to_string(), json!("<html/>"), None);
        store.set("analytics:today".to_string(), json!(42), None);

        let template = store.entries.get("cv-template:modern").unwrap();
        let analytics = store.entries.get("analytics:today").unwrap();
        assert!(
            template.expires_at - template.created_at
                > analytics.expires_at - analytics.created_at
        );
    }

    fn stored_ttl(store: &CacheStore, key: &str) -> u64 {
        let entry = &store.entries[key];
        entry.expires_at - entry.created_at
    }

    #[test]
    fn test_store_hot_key_extends_estimated_ttl() {
        let mut store = CacheStore::new(100, MB);

        store.set("session:1".to_string(), json!("token"), None);
        for _ in 0..11 {
            store.get("session:1");
        }
        store.set("session:1".to_string(), json!("token"), None);

        assert_eq!(stored_ttl(&store, "session:1"), BASE_TTL_MS * 3 / 2);
        assert_eq!(store.entries["session:1"].access_count, 0);
    }

    #[test]
    fn test_store_ten_reads_is_not_hot() {
        let mut store = CacheStore::new(100, MB);

        store.set("session:1".to_string(), json!("token"), None);
        for _ in 0..10 {
            store.get("session:1");
        }
        store.set("session:1".to_string(), json!("token"), None);

        assert_eq!(stored_ttl(&store, "session:1"), BASE_TTL_MS);
    }

    #[test]
    fn test_store_expired_hot_entry_earns_no_bonus() {
        let mut store = CacheStore::new(100, MB);

        store.set("session:1".to_string(), json!("token"), Some(50));
        for _ in 0..11 {
            store.get("session:1");
        }

        sleep(Duration::from_millis(100));

        // Still in the map: neither a read nor a sweep has removed it
        assert!(store.contains_key("session:1"));
        store.set("session:1".to_string(), json!("token"), None);

        assert_eq!(stored_ttl(&store, "session:1"), BASE_TTL_MS);
    }

    #[test]
    fn test_store_stats() {
        let mut store = CacheStore::new(100, MB);

        store.set("key1".to_string(), json!("value1"), None);
        store.get("key1"); // hit
        store.get("nonexistent"); // miss

        let stats = store.stats();
        assert_eq!(stats.hits, 1);
        assert_eq!(stats.misses, 1);
        assert_eq!(stats.sets, 1);
        assert_eq!(stats.item_count, 1);
        assert_eq!(stats.total_size, 8);
        assert_eq!(stats.hit_rate(), 0.5);
    }

    #[test]
    fn test_store_clear() {
        let mut store = CacheStore::new(100, MB);

        store.set("a".to_string(), json!(1), None);
        store.set("b".to_string(), json!(2), None);
        store.get("a");
        assert_eq!(store.clear(), 2);

        let stats = store.stats();
        assert!(store.is_empty());
        assert_eq!(stats.item_count, 0);
        assert_eq!(stats.total_size, 0);
        assert_eq!(stats.hits, 1);
        assert_eq!(stats.sets, 2);
    }

    #[test]
    fn test_store_cleanup_expired() {
        let mut store = CacheStore::new(100, MB);

        store.set("key1".to_string(), json!("value1"), Some(50));
        store.set("key2".to_string(), json!("value2"), Some(10_000));

        sleep(Duration::from_millis(100));

        let removed = store.cleanup_expired();
        assert_eq!(removed, 1);
        assert_eq!(store.len(), 1);
        assert_eq!(store.stats().total_size, store.live_size());
        assert!(store.get("key2").is_some());
    }
}
