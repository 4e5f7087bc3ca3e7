//! CVLetter Cache - adaptive in-memory cache for CVLetterAI
//!
//! Memoizes expensive computations (AI responses, CV templates, user
//! profiles) with key-aware TTLs and score-based eviction, and exposes the
//! cache over a small HTTP API.

pub mod api;
pub mod cache;
pub mod config;
pub mod error;
pub mod models;
pub mod rate_limit;
pub mod tasks;

pub use api::AppState;
pub use cache::AdaptiveCache;
pub use config::Config;
pub use rate_limit::RateLimiter;
pub use tasks::spawn_sweep_task;
