//! Cache Facade Module
//!
//! Cloneable handle over a shared [`CacheStore`]. Construct one per process
//! and pass it to whatever needs caching.

use std::future::Future;
use std::sync::Arc;

use serde_json::Value;
use tokio::sync::RwLock;

use crate::cache::{CacheStats, CacheStore};

// == Adaptive Cache ==
/// Public cache handle. Every store operation runs under the write lock as
/// one synchronous step, so there is never concurrent mutation.
#[derive(Debug, Clone)]
pub struct AdaptiveCache {
    inner: Arc<RwLock<CacheStore>>,
}

impl AdaptiveCache {
    /// Creates a new cache with the given item and memory ceilings.
    pub fn new(max_items: usize, max_memory_bytes: usize) -> Self {
        Self::from_store(CacheStore::new(max_items, max_memory_bytes))
    }

    /// Wraps an existing store.
    pub fn from_store(store: CacheStore) -> Self {
        Self {
            inner: Arc::new(RwLock::new(store)),
        }
    }

    pub async fn get(&self, key: &str) -> Option<Value> {
        self.inner.write().await.get(key)
    }

    /// Stores `value`; `ttl_ms = None` lets the store estimate the TTL.
    pub async fn set(&self, key: impl Into<String>, value: Value, ttl_ms: Option<u64>) {
        self.inner.write().await.set(key.into(), value, ttl_ms);
    }

    pub async fn delete(&self, key: &str) -> bool {
        self.inner.write().await.delete(key)
    }

    /// Drops every entry, returning how many were removed.
    pub async fn clear(&self) -> usize {
        self.inner.write().await.clear()
    }

    pub async fn stats(&self) -> CacheStats {
        self.inner.read().await.stats()
    }

    pub async fn hit_rate(&self) -> f64 {
        self.inner.read().await.stats().hit_rate()
    }

    pub async fn len(&self) -> usize {
        self.inner.read().await.len()
    }

    pub async fn is_empty(&self) -> bool {
        self.inner.read().await.is_empty()
    }

    /// Removes expired entries. Used by the background sweep.
    pub async fn cleanup_expired(&self) -> usize {
        self.inner.write().await.cleanup_expired()
    }

    // == Memoize ==
    /// Returns the cached value for `key`, or computes it with `compute`,
    /// stores it with an estimated TTL and returns it.
    ///
    /// The lock is not held while `compute` runs, so two callers racing on
    /// the same cold key may both compute; the last write wins.
    pub async fn get_or_insert_with<F, Fut>(&self, key: &str, compute: F) -> Value
    where
        F: FnOnce() -> Fut,
        Fut: Future<Output = Value>,
    {
        if let Some(value) = self.get(key).await {
            return value;
        }

        let value = compute().await;
        self.set(key, value.clone(), None).await;
        value
    }
}
