// Outbound request limiter.
// Fixed-window quota shared by every request issued through one coordinator.

use std::sync::Arc;
use std::time::Duration;

use tokio::sync::Mutex;
use tokio::time::Instant;
use tracing::{debug, info};

use crate::config::{MAX_REQUESTS_PER_WINDOW, RATE_LIMIT_WINDOW};

#[derive(Debug)]
struct WindowState {
    request_count: u32,
    window_start: Instant,
}

/// Fixed-window request limiter.
///
/// Clones share one quota. Callers are served in arrival order; a caller
/// that finds the quota spent sleeps until the window ends while holding
/// the gate, so later callers queue behind it instead of racing the reset.
#[derive(Debug, Clone)]
pub struct RateLimiter {
    state: Arc<Mutex<WindowState>>,
    max_requests: u32,
    window: Duration,
}

impl Default for RateLimiter {
    fn default() -> Self {
        Self::new(MAX_REQUESTS_PER_WINDOW, RATE_LIMIT_WINDOW)
    }
}

impl RateLimiter {
    /// Create a limiter allowing `max_requests` per `window`.
    pub fn new(max_requests: u32, window: Duration) -> Self {
        Self {
            state: Arc::new(Mutex::new(WindowState {
                request_count: 0,
                window_start: Instant::now(),
            })),
            max_requests: max_requests.max(1),
            window,
        }
    }

    /// Requests counted in the current window.
    pub async fn request_count(&self) -> u32 {
        self.state.lock().await.request_count
    }

    /// Wait until one more request fits in the quota, then count it.
    ///
    /// Dropping the returned future abandons the wait without consuming quota.
    pub async fn acquire(&self) {
        let mut state = self.state.lock().await;

        let now = Instant::now();
        if now.duration_since(state.window_start) >= self.window {
            state.request_count = 0;
            state.window_start = now;
        }

        if state.request_count >= self.max_requests {
            let remaining = self
                .window
                .saturating_sub(now.duration_since(state.window_start));
            info!(
                wait_secs = remaining.as_secs(),
                max_requests = self.max_requests,
                "Request quota spent, waiting for the next window"
            );
            tokio::time::sleep(remaining).await;
            state.request_count = 0;
            state.window_start = Instant::now();
        }

        state.request_count += 1;
        debug!(
            request_count = state.request_count,
            max_requests = self.max_requests,
            "Request admitted"
        );
    }
}
