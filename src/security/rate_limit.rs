//! Rate Limiter Module
//!
//! Per-client sliding window admission control.

use std::collections::{HashMap, VecDeque};
use std::time::{Duration, Instant};

use tokio::sync::Mutex;

/// Number of tracked clients above which idle clients are pruned.
pub const DEFAULT_PRUNE_THRESHOLD: usize = 10_000;

// == Rate Limiter ==
/// Sliding window rate limiter keyed by client identity.
///
/// Each client owns a queue of request timestamps ordered oldest first.
/// Timestamps that fell out of the trailing window are dropped lazily when
/// that client is checked again.
#[derive(Debug)]
pub struct RateLimiter {
    /// Request timestamps per client
    windows: Mutex<HashMap<String, VecDeque<Instant>>>,
    /// Maximum admitted requests per window
    max_requests: usize,
    /// Length of the trailing window
    window: Duration,
    /// Tracked clients allowed before idle ones are dropped
    prune_threshold: usize,
}

impl RateLimiter {
    // == Constructor ==
    /// Creates a limiter admitting `max_requests` per `window` per client.
    pub fn new(max_requests: usize, window: Duration) -> Self {
        Self {
            windows: Mutex::new(HashMap::new()),
            max_requests,
            window,
            prune_threshold: DEFAULT_PRUNE_THRESHOLD,
        }
    }

    /// Sets how many clients are tracked before idle ones are pruned.
    pub fn with_prune_threshold(mut self, prune_threshold: usize) -> Self {
        self.prune_threshold = prune_threshold;
        self
    }

    // == Allow ==
    /// Decides whether a request from `client` is admitted.
    ///
    /// Rejected requests are not recorded, so a client hammering the server
    /// regains access as soon as its oldest admitted request ages out.
    pub async fn allow(&self, client: &str) -> bool {
        let now = Instant::now();
        let mut windows = self.windows.lock().await;

        if windows.len() >= self.prune_threshold && !windows.contains_key(client) {
            let window = self.window;
            windows.retain(|_, timestamps| {
                timestamps
                    .back()
                    .is_some_and(|newest| now.duration_since(*newest) < window)
            });
        }

        let timestamps = windows.entry(client.to_string()).or_default();
        while let Some(oldest) = timestamps.front() {
            if now.duration_since(*oldest) >= self.window {
                timestamps.pop_front();
            } else {
                break;
            }
        }

        if timestamps.len() >= self.max_requests {
            return false;
        }

        timestamps.push_back(now);
        true
    }

    /// Maximum admitted requests per window.
    pub fn max_requests(&self) -> usize {
        self.max_requests
    }

    /// Length of the trailing window.
    pub fn window(&self) -> Duration {
        self.window
    }

    /// Number of clients currently tracked.
    pub async fn tracked_clients(&self) -> usize {
        self.windows.lock().await.len()
    }
}
