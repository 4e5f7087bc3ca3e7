//! Rate Limiter Module
//!
//! Per-client fixed-window request limiter with an expiry sweep, plus the
//! axum middleware that applies it to the HTTP API.

use std::collections::HashMap;
use std::net::SocketAddr;
use std::sync::Arc;
use std::time::{Duration, Instant};

use axum::{
    extract::{ConnectInfo, Request, State},
    http::HeaderValue,
    middleware::Next,
    response::Response,
};
use tokio::sync::Mutex;
use tracing::warn;

use crate::error::{CacheError, Result};

/// Header carrying the original client address behind a reverse proxy
pub const FORWARDED_FOR_HEADER: &str = "x-forwarded-for";

/// Header reporting how many requests are left in the current window
pub const REMAINING_HEADER: &str = "x-ratelimit-remaining";

/// Client key used when neither a peer address nor a trusted header is known
pub const ANONYMOUS_CLIENT: &str = "anonymous";

#[derive(Debug, Clone, Copy)]
struct Window {
    started: Instant,
    count: u32,
}

/// Outcome of a rate-limit check.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RateDecision {
    /// Request admitted; `remaining` more fit in the current window
    Allowed { remaining: u32 },
    /// Request rejected until the window resets
    Limited { retry_after: Duration },
}

// == Rate Limiter ==
/// Cloneable handle over the per-client window table.
#[derive(Debug, Clone)]
pub struct RateLimiter {
    windows: Arc<Mutex<HashMap<String, Window>>>,
    max_requests: u32,
    window: Duration,
    trust_proxy_headers: bool,
}

impl RateLimiter {
    pub fn new(max_requests: u32, window: Duration) -> Self {
        Self {
            windows: Arc::new(Mutex::new(HashMap::new())),
            max_requests,
            window,
            trust_proxy_headers: false,
        }
    }

    /// Keys clients on the first `X-Forwarded-For` hop instead of the peer
    /// address. Enable only behind a proxy that overwrites the header.
    pub fn trust_proxy_headers(mut self, trust: bool) -> Self {
        self.trust_proxy_headers = trust;
        self
    }

    /// Derives the rate-limit key for `request`.
    ///
    /// Uses the TCP peer IP (port dropped) unless proxy headers are trusted
    /// and present.
    pub fn client_key(&self, request: &Request) -> String {
        if self.trust_proxy_headers {
            let forwarded = request
                .headers()
                .get(FORWARDED_FOR_HEADER)
                .and_then(|value| value.to_str().ok())
                .and_then(|value| value.split(',').next())
                .map(str::trim)
                .filter(|value| !value.is_empty());

            if let Some(client) = forwarded {
                return client.to_string();
            }
        }

        request
            .extensions()
            .get::<ConnectInfo<SocketAddr>>()
            .map(|ConnectInfo(addr)| addr.ip().to_string())
            .unwrap_or_else(|| ANONYMOUS_CLIENT.to_string())
    }

    /// Counts one request for `client` and decides whether to admit it.
    pub async fn check(&self, client: &str) -> RateDecision {
        let now = Instant::now();
        let mut windows = self.windows.lock().await;

        let window = windows.entry(client.to_string()).or_insert(Window {
            started: now,
            count: 0,
        });

        if now.duration_since(window.started) >= self.window {
            *window = Window {
                started: now,
                count: 0,
            };
        }

        if window.count >= self.max_requests {
            let elapsed = now.duration_since(window.started);
            return RateDecision::Limited {
                retry_after: self.window.saturating_sub(elapsed),
            };
        }

        window.count += 1;
        RateDecision::Allowed {
            remaining: self.max_requests - window.count,
        }
    }

    /// Drops every client whose window has elapsed. Returns how many were dropped.
    pub async fn sweep_expired(&self) -> usize {
        let now = Instant::now();
        let mut windows = self.windows.lock().await;
        let before = windows.len();
        windows.retain(|_, window| now.duration_since(window.started) < self.window);
        before - windows.len()
    }

    /// Number of clients with an open window.
    pub async fn tracked_clients(&self) -> usize {
        self.windows.lock().await.len()
    }
}

// == Middleware ==
/// Rejects requests from clients that exhausted their window with `429`
/// and reports the remaining budget on admitted responses.
pub async fn rate_limit(
    State(limiter): State<RateLimiter>,
    request: Request,
    next: Next,
) -> Result<Response> {
    let client = limiter.client_key(&request);

    match limiter.check(&client).await {
        RateDecision::Allowed { remaining } => {
            let mut response = next.run(request).await;
            response
                .headers_mut()
                .insert(REMAINING_HEADER, HeaderValue::from(remaining));
            Ok(response)
        }
        RateDecision::Limited { retry_after } => {
            warn!(client = %client, "Rate limit exceeded");
            Err(CacheError::RateLimited {
                retry_after_secs: retry_after.as_secs().max(1),
            })
        }
    }
}
