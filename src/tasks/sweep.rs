//! Expiry Sweep Task
//!
//! Background task that periodically removes expired cache entries and
//! forgets rate-limit windows that have elapsed.

use std::time::Duration;

use tokio::task::JoinHandle;
use tracing::{debug, info};

use crate::cache::AdaptiveCache;
use crate::rate_limit::RateLimiter;

/// Spawns a background task that sweeps expired state every `interval`.
///
/// Timing is best effort: the sweep shares the runtime with request
/// handling and may run late under load.
///
/// # Returns
/// A JoinHandle for the spawned task, used to abort it during shutdown.
///
/// # Example
/// ```ignore
/// let cache = AdaptiveCache::new(1000, 50 * 1024 * 1024);
/// let limiter = RateLimiter::new(100, Duration::from_secs(60));
/// let handle = spawn_sweep_task(cache.clone(), limiter.clone(), Duration::from_secs(60));
/// // Later, during shutdown:
/// handle.abort();
/// ```
pub fn spawn_sweep_task(
    cache: AdaptiveCache,
    rate_limiter: RateLimiter,
    interval: Duration,
) -> JoinHandle<()> {
    tokio::spawn(async move {
        info!("Starting expiry sweep task with interval of {:?}", interval);

        loop {
            tokio::time::sleep(interval).await;

            let removed = cache.cleanup_expired().await;
            let windows = rate_limiter.sweep_expired().await;

            if removed > 0 {
                info!("Expiry sweep: removed {} expired entries", removed);
            } else {
                debug!("Expiry sweep: no expired entries found");
            }
            if windows > 0 {
                debug!("Expiry sweep: dropped {} rate-limit windows", windows);
            }
        }
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    const MB: usize = 1024 * 1024;

    fn limiter() -> RateLimiter {
        RateLimiter::new(10, Duration::from_millis(50))
    }

    #[tokio::test]
    async fn test_sweep_removes_expired_entries() {
        let cache = AdaptiveCache::new(100, MB);
        cache.set("expire_soon", json!("value"), Some(50)).await;

        let handle = spawn_sweep_task(cache.clone(), limiter(), Duration::from_millis(100));

        tokio::time::sleep(Duration::from_millis(350)).await;

        // Removed by the sweep, not by a lazy read
        assert!(cache.is_empty().await);
        let stats = cache.stats().await;
        assert_eq!(stats.misses, 0);
        assert_eq!(stats.total_size, 0);

        handle.abort();
    }

    #[tokio::test]
    async fn test_sweep_preserves_valid_entries() {
        let cache = AdaptiveCache::new(100, MB);
        cache.set("long_lived", json!("value"), Some(3_600_000)).await;

        let handle = spawn_sweep_task(cache.clone(), limiter(), Duration::from_millis(50));

        tokio::time::sleep(Duration::from_millis(200)).await;

        assert_eq!(cache.get("long_lived").await, Some(json!("value")));

        handle.abort();
    }

    #[tokio::test]
    async fn test_sweep_drops_elapsed_rate_limit_windows() {
        let cache = AdaptiveCache::new(100, MB);
        let rate_limiter = limiter();
        rate_limiter.check("10.0.0.1").await;

        let handle = spawn_sweep_task(cache, rate_limiter.clone(), Duration::from_millis(100));

        tokio::time::sleep(Duration::from_millis(350)).await;

        assert_eq!(rate_limiter.tracked_clients().await, 0);

        handle.abort();
    }

    #[tokio::test]
    async fn test_sweep_task_can_be_aborted() {
        let handle = spawn_sweep_task(
            AdaptiveCache::new(100, MB),
            limiter(),
            Duration::from_secs(1),
        );

        handle.abort();

        tokio::time::sleep(Duration::from_millis(100)).await;
        assert!(handle.is_finished(), "Task should be finished after abort");
    }
}
