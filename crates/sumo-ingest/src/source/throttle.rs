//! Minimum spacing between source requests

use std::sync::Arc;
use tokio::sync::Mutex;
use tokio::time::{sleep, Duration, Instant};

/// Enforces a fixed minimum interval between consecutive requests.
///
/// Clones share the same schedule, so one throttle covers every handle to a
/// client.
#[derive(Debug, Clone)]
pub struct RequestThrottle {
    interval: Duration,
    next_allowed: Arc<Mutex<Instant>>,
}

impl RequestThrottle {
    pub fn new(interval: Duration) -> Self {
        Self {
            interval,
            next_allowed: Arc::new(Mutex::new(Instant::now())),
        }
    }

    /// Wait until the next request slot and reserve it.
    pub async fn wait(&self) {
        if self.interval.is_zero() {
            return;
        }

        let mut next_allowed = self.next_allowed.lock().await;
        let now = Instant::now();
        let wait_until = (*next_allowed).max(now);
        *next_allowed = wait_until + self.interval;
        drop(next_allowed);

        let pause = wait_until.saturating_duration_since(now);
        if !pause.is_zero() {
            sleep(pause).await;
        }
    }
}
