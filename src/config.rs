//! Configuration Module
//!
//! Loads service configuration from environment variables and validates it
//! before startup.

use std::env;
use std::str::FromStr;
use std::time::Duration;

use crate::error::{CacheError, Result};

/// Service configuration parameters.
///
/// All values can be configured via environment variables with sensible defaults.
#[derive(Debug, Clone)]
pub struct Config {
    /// Maximum number of entries the cache can hold
    pub max_items: usize,
    /// Maximum total serialized size of cached values, in bytes
    pub max_memory_bytes: usize,
    /// Expiry sweep interval in seconds
    pub sweep_interval: u64,
    /// HTTP server port
    pub server_port: u16,
    /// Requests allowed per client per rate-limit window
    pub rate_limit_max_requests: u32,
    /// Rate-limit window length in seconds
    pub rate_limit_window: u64,
    /// Key rate limits on `X-Forwarded-For` instead of the peer address.
    /// Only safe behind a reverse proxy that overwrites the header.
    pub trust_proxy_headers: bool,
}

impl Config {
    /// Creates a new Config by loading values from environment variables.
    ///
    /// Unset or unparsable variables fall back to their defaults.
    ///
    /// # Environment Variables
    /// - `CACHE_MAX_ITEMS` - Maximum cache entries (default: 1000)
    /// - `CACHE_MAX_MEMORY_BYTES` - Memory ceiling in bytes (default: 50 MiB)
    /// - `CACHE_SWEEP_INTERVAL` - Expiry sweep frequency in seconds (default: 60)
    /// - `SERVER_PORT` - HTTP server port (default: 3000)
    /// - `RATE_LIMIT_MAX_REQUESTS` - Requests per window (default: 100)
    /// - `RATE_LIMIT_WINDOW` - Window length in seconds (default: 60)
    /// - `TRUST_PROXY_HEADERS` - Key clients on `X-Forwarded-For` (default: false)
    pub fn from_env() -> Self {
        let defaults = Self::default();
        Self {
            max_items: env_or("CACHE_MAX_ITEMS", defaults.max_items),
            max_memory_bytes: env_or("CACHE_MAX_MEMORY_BYTES", defaults.max_memory_bytes),
            sweep_interval: env_or("CACHE_SWEEP_INTERVAL", defaults.sweep_interval),
            server_port: env_or("SERVER_PORT", defaults.server_port),
            rate_limit_max_requests: env_or(
                "RATE_LIMIT_MAX_REQUESTS",
                defaults.rate_limit_max_requests,
            ),
            rate_limit_window: env_or("RATE_LIMIT_WINDOW", defaults.rate_limit_window),
            trust_proxy_headers: env_or("TRUST_PROXY_HEADERS", defaults.trust_proxy_headers),
        }
    }

    /// Rejects settings the cache or the rate limiter cannot run with.
    pub fn validate(&self) -> Result<()> {
        let checks = [
            (self.max_items == 0, "CACHE_MAX_ITEMS must be greater than 0"),
            (
                self.max_memory_bytes == 0,
                "CACHE_MAX_MEMORY_BYTES must be greater than 0",
            ),
            (
                self.sweep_interval == 0,
                "CACHE_SWEEP_INTERVAL must be greater than 0",
            ),
            (
                self.rate_limit_max_requests == 0,
                "RATE_LIMIT_MAX_REQUESTS must be greater than 0",
            ),
            (
                self.rate_limit_window == 0,
                "RATE_LIMIT_WINDOW must be greater than 0",
            ),
        ];

        match checks.iter().find(|(failed, _)| *failed) {
            Some((_, message)) => Err(CacheError::InvalidConfig(message.to_string())),
            None => Ok(()),
        }
    }

    pub fn sweep_interval_duration(&self) -> Duration {
        Duration::from_secs(self.sweep_interval)
    }

    pub fn rate_limit_window_duration(&self) -> Duration {
        Duration::from_secs(self.rate_limit_window)
    }
}

impl Default for Config {
    fn default() -> Self {
        Self {
            max_items: 1000,
            max_memory_bytes: 50 * 1024 * 1024,
            sweep_interval: 60,
            server_port: 3000,
            rate_limit_max_requests: 100,
            rate_limit_window: 60,
            trust_proxy_headers: false,
        }
    }
}

fn env_or<T: FromStr>(name: &str, default: T) -> T {
    env::var(name)
        .ok()
        .and_then(|v| v.parse().ok())
        .unwrap_or(default)
}
