//! API Handlers
//!
//! HTTP request handlers for each cache service endpoint.

use axum::{
    extract::{Path, State},
    Json,
};
use tracing::debug;

use crate::cache::AdaptiveCache;
use crate::config::Config;
use crate::error::{CacheError, Result};
use crate::models::{
    ClearResponse, DeleteResponse, GetResponse, HealthResponse, SetRequest, SetResponse,
    StatsResponse,
};
use crate::rate_limit::RateLimiter;

/// Application state shared across all handlers.
///
/// Holds the explicit cache and rate-limiter handles; nothing is global.
#[derive(Clone)]
pub struct AppState {
    pub cache: AdaptiveCache,
    pub rate_limiter: RateLimiter,
}

impl AppState {
    pub fn new(cache: AdaptiveCache, rate_limiter: RateLimiter) -> Self {
        Self {
            cache,
            rate_limiter,
        }
    }

    /// Creates a new AppState from configuration.
    pub fn from_config(config: &Config) -> Self {
        Self::new(
            AdaptiveCache::new(config.max_items, config.max_memory_bytes),
            RateLimiter::new(
                config.rate_limit_max_requests,
                config.rate_limit_window_duration(),
            )
            .trust_proxy_headers(config.trust_proxy_headers),
        )
    }
}

/// Handler for PUT /cache
///
/// Stores a JSON payload with an explicit or estimated TTL.
pub async fn set_handler(
    State(state): State<AppState>,
    Json(req): Json<SetRequest>,
) -> Result<Json<SetResponse>> {
    if let Some(error_msg) = req.validate() {
        return Err(CacheError::InvalidRequest(error_msg));
    }

    state.cache.set(req.key.clone(), req.value, req.ttl_ms).await;
    debug!(key = %req.key, "Stored cache entry");

    Ok(Json(SetResponse::new(req.key)))
}

/// Handler for GET /cache/:key
pub async fn get_handler(
    State(state): State<AppState>,
    Path(key): Path<String>,
) -> Result<Json<GetResponse>> {
    match state.cache.get(&key).await {
        Some(value) => Ok(Json(GetResponse::new(key, value))),
        None => Err(CacheError::NotFound(key)),
    }
}

/// Handler for DELETE /cache/:key
pub async fn delete_handler(
    State(state): State<AppState>,
    Path(key): Path<String>,
) -> Result<Json<DeleteResponse>> {
    if state.cache.delete(&key).await {
        Ok(Json(DeleteResponse::new(key)))
    } else {
        Err(CacheError::NotFound(key))
    }
}

/// Handler for DELETE /cache
pub async fn clear_handler(State(state): State<AppState>) -> Json<ClearResponse> {
    let removed = state.cache.clear().await;
    Json(ClearResponse::new(removed))
}

/// Handler for GET /stats
pub async fn stats_handler(State(state): State<AppState>) -> Json<StatsResponse> {
    Json(StatsResponse::from(state.cache.stats().await))
}

/// Handler for GET /health
pub async fn health_handler() -> Json<HealthResponse> {
    Json(HealthResponse::healthy())
}
