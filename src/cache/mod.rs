//! Cache Module
//!
//! Adaptive in-memory cache with heuristic TTLs and score-based eviction.

mod entry;
mod facade;
mod scoring;
mod stats;
mod store;
mod ttl;


// Re-export public types
pub use entry::{current_timestamp_ms, serialized_size, CacheEntry};
pub use facade::AdaptiveCache;
pub use scoring::{select_victim, value_score};
pub use stats::CacheStats;
pub use store::CacheStore;
pub use ttl::estimate_ttl_ms;

// == Public Constants ==
/// Maximum allowed key length in bytes
pub const MAX_KEY_LENGTH: usize = 256;

/// Maximum value size accepted over HTTP, in serialized bytes
pub const MAX_VALUE_SIZE: usize = 1024 * 1024; // 1 MB
