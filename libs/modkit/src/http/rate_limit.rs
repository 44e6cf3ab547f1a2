//! Fixed-window request limiting keyed by client address.

use axum::{
    extract::{ConnectInfo, Request, State},
    http::{header, HeaderValue},
    middleware::Next,
    response::{IntoResponse, Response},
};
use dashmap::DashMap;
use serde::{Deserialize, Serialize};
use std::{
    net::SocketAddr,
    sync::Arc,
    time::{Duration, Instant},
};

use crate::api::problem::too_many_requests;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct RateLimitPolicy {
    pub max_requests: u32,
    pub window_secs: u64,
}

impl RateLimitPolicy {
    pub fn new(max_requests: u32, window: Duration) -> Self {
        Self {
            max_requests,
            window_secs: window.as_secs(),
        }
    }

    fn window(&self) -> Duration {
        Duration::from_secs(self.window_secs)
    }
}

const PRUNE_THRESHOLD: usize = 10_000;

#[derive(Debug, Clone, Copy)]
struct Window {
    started: Instant,
    hits: u32,
}

/// Counts hits per key inside a fixed window; the window restarts on the
/// first hit after it expires.
#[derive(Debug)]
pub struct FixedWindowLimiter {
    bucket: &'static str,
    policy: RateLimitPolicy,
    windows: DashMap<String, Window>,
}

impl FixedWindowLimiter {
    pub fn new(bucket: &'static str, policy: RateLimitPolicy) -> Self {
        Self {
            bucket,
            policy,
            windows: DashMap::new(),
        }
    }

    pub fn bucket(&self) -> &'static str {
        self.bucket
    }

    /// Record a hit for `key`. `Err` carries the time until the window resets.
    pub fn check(&self, key: &str) -> Result<(), Duration> {
        if self.windows.len() > PRUNE_THRESHOLD {
            self.prune();
        }
        self.check_at(key, Instant::now())
    }

    fn check_at(&self, key: &str, now: Instant) -> Result<(), Duration> {
        let window = self.policy.window();
        let mut entry = self.windows.entry(key.to_string()).or_insert(Window {
            started: now,
            hits: 0,
        });

        if now.saturating_duration_since(entry.started) >= window {
            *entry = Window {
                started: now,
                hits: 0,
            };
        }

        if entry.hits >= self.policy.max_requests {
            let elapsed = now.saturating_duration_since(entry.started);
            return Err(window.saturating_sub(elapsed));
        }
        entry.hits += 1;
        Ok(())
    }

    /// Drop windows that have already expired.
    fn prune(&self) {
        let window = self.policy.window();
        let now = Instant::now();
        self.windows
            .retain(|_, w| now.saturating_duration_since(w.started) < window);
    }
}

fn client_key(req: &Request) -> String {
    req.extensions()
        .get::<ConnectInfo<SocketAddr>>()
        .map(|ConnectInfo(addr)| addr.ip().to_string())
        .unwrap_or_else(|| "unknown".to_string())
}

/// Middleware for `axum::middleware::from_fn_with_state`.
pub async fn enforce(
    State(limiter): State<Arc<FixedWindowLimiter>>,
    req: Request,
    next: Next,
) -> Response {
    let key = client_key(&req);
    match limiter.check(&key) {
        Ok(()) => next.run(req).await,
        Err(retry_after) => {
            tracing::warn!(
                bucket = limiter.bucket(),
                client = %key,
                retry_after_secs = retry_after.as_secs(),
                "rate limit exceeded"
            );
            let mut resp = too_many_requests("Too many requests, please try again later.")
                .into_response();
            if let Ok(v) = HeaderValue::from_str(&retry_after.as_secs().max(1).to_string()) {
                resp.headers_mut().insert(header::RETRY_AFTER, v);
            }
            resp
        }
    }
}
