//! Per-client rate limiting for sensitive endpoints
//!
//! Sliding-log limiter: for every client key we keep the instants of the
//! requests accepted inside the trailing window. A request is accepted
//! only while fewer than `max_requests` remain in that window, so no
//! client exceeds the budget over any window, boundaries included.

use axum::{
    extract::{ConnectInfo, FromRequestParts},
    http::request::Parts,
};
use dashmap::DashMap;
use std::collections::VecDeque;
use std::convert::Infallible;
use std::net::SocketAddr;
use std::sync::Arc;
use std::time::{Duration, Instant};
use tracing::{debug, warn};

/// Rate limiter keyed by client identity
#[derive(Debug, Clone)]
pub struct RateLimiter {
    /// Accepted request instants per client, oldest first
    hits: Arc<DashMap<String, VecDeque<Instant>>>,
    max_requests: u32,
    window: Duration,
}

impl RateLimiter {
    /// Create a limiter allowing `max_requests` per `window`
    pub fn new(max_requests: u32, window: Duration) -> Self {
        Self {
            hits: Arc::new(DashMap::new()),
            max_requests,
            window,
        }
    }

    /// Record a request for `client_key` and report whether it fits the budget
    ///
    /// The shard lock held by the map entry makes check-and-record atomic
    /// for concurrent requests from the same client.
    pub fn allow(&self, client_key: &str) -> bool {
        self.allow_at(client_key, Instant::now())
    }

    fn allow_at(&self, client_key: &str, now: Instant) -> bool {
        let mut entry = self.hits.entry(client_key.to_string()).or_default();

        while let Some(&oldest) = entry.front() {
            if now.duration_since(oldest) >= self.window {
                entry.pop_front();
            } else {
                break;
            }
        }

        if entry.len() >= self.max_requests as usize {
            warn!(client = %client_key, limit = self.max_requests, "rate limit exceeded");
            return false;
        }

        entry.push_back(now);
        true
    }

    /// Drop clients with no requests left inside the window
    pub fn cleanup(&self) {
        let now = Instant::now();
        let before = self.hits.len();
        self.hits.retain(|_, hits| {
            hits.back()
                .is_some_and(|last| now.duration_since(*last) < self.window)
        });
        debug!(removed = before.saturating_sub(self.hits.len()), "rate limiter cleanup");
    }

    /// Number of tracked clients
    pub fn tracked_clients(&self) -> usize {
        self.hits.len()
    }

    /// Spawn a background task that periodically calls [`cleanup`](Self::cleanup)
    pub fn spawn_cleanup(&self, every: Duration) -> tokio::task::JoinHandle<()> {
        let limiter = self.clone();
        tokio::spawn(async move {
            let mut interval = tokio::time::interval(every);
            loop {
                interval.tick().await;
                limiter.cleanup();
            }
        })
    }
}

/// Remote client identity used as the rate-limit key
///
/// Taken from the peer socket address; falls back to `"unknown"` when the
/// server was not started with connect info (e.g. in-process tests).
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ClientKey(pub String);

#[axum::async_trait]
impl<S> FromRequestParts<S> for ClientKey
where
    S: Send + Sync,
{
    type Rejection = Infallible;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        let key = parts
            .extensions
            .get::<ConnectInfo<SocketAddr>>()
            .map(|ConnectInfo(addr)| addr.ip().to_string())
            .unwrap_or_else(|| "unknown".to_string());
        Ok(ClientKey(key))
    }
}
