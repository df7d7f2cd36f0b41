//! Sliding-window rate limiting for the newsletter endpoints.
//!
//! The window accounting lives behind `CounterStore` so the limiter
//! never depends on process-global state: the default store is an
//! in-process map, and a durable store can be injected without touching
//! the decision logic.

use async_trait::async_trait;
use dashmap::DashMap;
use std::collections::VecDeque;
use std::sync::Arc;
use std::time::{Duration, Instant};

use crate::config::RateLimitConfig;

/// What one recorded hit looks like inside the trailing window.
#[derive(Debug, Clone, Copy)]
pub struct WindowSample {
    /// Hits inside the window, including the one just recorded.
    pub count: u32,
    /// Age of the oldest in-window hit.
    pub oldest_age: Duration,
}

#[async_trait]
pub trait CounterStore: Send + Sync {
    /// Record a hit for `key` now, drop hits older than `window`, and
    /// report the resulting window contents.
    async fn record_hit(&self, key: &str, window: Duration) -> WindowSample;
}

/// In-process counter store: per-key hit timestamps, pruned on access.
/// Keys whose hits have all expired cost one empty deque until touched
/// again.
#[derive(Default)]
pub struct InMemoryCounterStore {
    hits: DashMap<String, VecDeque<Instant>>,
}

#[async_trait]
impl CounterStore for InMemoryCounterStore {
    async fn record_hit(&self, key: &str, window: Duration) -> WindowSample {
        let now = Instant::now();
        let mut entry = self.hits.entry(key.to_string()).or_default();

        while let Some(front) = entry.front() {
            if now.duration_since(*front) >= window {
                entry.pop_front();
            } else {
                break;
            }
        }

        entry.push_back(now);

        let oldest_age = entry
            .front()
            .map(|front| now.duration_since(*front))
            .unwrap_or_default();

        WindowSample { count: entry.len() as u32, oldest_age }
    }
}

#[derive(Debug, Clone, Copy)]
pub struct RateLimitDecision {
    pub allowed: bool,
    pub remaining: u32,
    pub retry_after_secs: u64,
}

#[derive(Clone)]
pub struct RateLimitService {
    store: Arc<dyn CounterStore>,
    config: RateLimitConfig,
}

impl RateLimitService {
    pub fn new(store: Arc<dyn CounterStore>, config: RateLimitConfig) -> Self {
        Self { store, config }
    }

    pub fn with_in_memory_store(config: RateLimitConfig) -> Self {
        Self::new(Arc::new(InMemoryCounterStore::default()), config)
    }

    /// Record one request for `key` and decide whether it may proceed.
    pub async fn check(&self, key: &str) -> RateLimitDecision {
        if !self.config.enabled {
            return RateLimitDecision {
                allowed: true,
                remaining: self.config.max_requests,
                retry_after_secs: 0,
            };
        }

        let window = Duration::from_secs(self.config.window_secs);
        let sample = self.store.record_hit(key, window).await;

        let allowed = sample.count <= self.config.max_requests;
        let remaining = self.config.max_requests.saturating_sub(sample.count);
        // The caller can retry once the oldest in-window hit expires.
        let retry_after_secs = if allowed {
            0
        } else {
            window.saturating_sub(sample.oldest_age).as_secs().max(1)
        };

        if !allowed {
            tracing::warn!(
                "Rate limit exceeded for {} ({} hits in {}s window)",
                key,
                sample.count,
                self.config.window_secs
            );
        }

        RateLimitDecision { allowed, remaining, retry_after_secs }
    }
}
