//! API Module
//!
//! HTTP handlers and routing for the cache service REST API.
//!
//! # Endpoints
//! - `PUT /cache` - Store a JSON payload
//! - `DELETE /cache` - Drop every entry
//! - `GET /cache/:key` - Retrieve a payload by key
//! - `DELETE /cache/:key` - Delete a key
//! - `GET /stats` - Get cache statistics
//! - `GET /health` - Health check endpoint

pub mod handlers;
pub mod routes;

pub use handlers::*;
pub use routes::create_router;
