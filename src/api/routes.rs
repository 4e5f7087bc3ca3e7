//! API Routes
//!
//! Configures the Axum router with all cache service endpoints.

use axum::{
    middleware,
    routing::{get, put},
    Router,
};
use tower_http::{
    cors::{Any, CorsLayer},
    trace::TraceLayer,
};

use super::handlers::{
    clear_handler, delete_handler, get_handler, health_handler, set_handler, stats_handler,
    AppState,
};
use crate::rate_limit::rate_limit;

/// Creates the main router with all endpoints configured.
///
/// # Endpoints
/// - `PUT /cache` - Store a JSON payload
/// - `DELETE /cache` - Drop every entry
/// - `GET /cache/:key` - Retrieve a payload by key
/// - `DELETE /cache/:key` - Delete a key
/// - `GET /stats` - Get cache statistics
/// - `GET /health` - Health check endpoint (not rate limited)
///
/// # Middleware
/// - Rate limiting: per-client fixed window on the cache and stats routes
/// - CORS: Allows any origin
/// - Tracing: Logs all requests
pub fn create_router(state: AppState) -> Router {
    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods(Any)
        .allow_headers(Any);

    let limited = Router::new()
        .route("/cache", put(set_handler).delete(clear_handler))
        .route("/cache/:key", get(get_handler).delete(delete_handler))
        .route("/stats", get(stats_handler))
        .route_layer(middleware::from_fn_with_state(
            state.rate_limiter.clone(),
            rate_limit,
        ));

    Router::new()
        .merge(limited)
        .route("/health", get(health_handler))
        .layer(cors)
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}
