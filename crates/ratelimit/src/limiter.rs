use std::collections::HashMap;
use std::sync::{Mutex, MutexGuard};
use std::time::Duration;

use tokio::time::{sleep, Instant};
use tracing::debug;

struct Slot {
    interval: Duration,
    next_allowed: Option<Instant>,
}

/// Enforces a minimum gap between successive grants for the same key.
/// Keys without a configured interval are never delayed.
pub struct RateLimiter {
    slots: Mutex<HashMap<String, Slot>>,
}

impl RateLimiter {
    pub fn new() -> Self {
        Self {
            slots: Mutex::new(HashMap::new()),
        }
    }

    pub fn with_min_interval(self, key: &str, interval: Duration) -> Self {
        self.set_min_interval(key, interval);
        self
    }

    pub fn set_min_interval(&self, key: &str, interval: Duration) {
        self.slots().insert(
            key.to_string(),
            Slot {
                interval,
                next_allowed: None,
            },
        );
    }

    fn slots(&self) -> MutexGuard<'_, HashMap<String, Slot>> {
        self.slots.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
    }

    /// Book the next grant for `key` and return how long the caller must wait for it
    fn reserve(&self, key: &str) -> Duration {
        let mut slots = self.slots();
        let Some(slot) = slots.get_mut(key) else {
            return Duration::ZERO;
        };

        let now = Instant::now();
        let start = slot.next_allowed.map_or(now, |next| next.max(now));
        slot.next_allowed = Some(start + slot.interval);
        start - now
    }

    /// Wait until a call for `key` is allowed
    pub async fn acquire(&self, key: &str) {
        let wait = self.reserve(key);
        if !wait.is_zero() {
            debug!(key, wait_ms = wait.as_millis() as u64, "Pacing request");
            sleep(wait).await;
        }
    }
}

impl Default for RateLimiter {
    fn default() -> Self {
        Self::new()
    }
}
