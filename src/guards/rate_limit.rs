use std::sync::{Arc, Mutex, PoisonError};
use std::time::{Duration, Instant};

use moka::sync::Cache;

/// Bound on distinct client buckets kept in memory at once.
const MAX_TRACKED_CLIENTS: u64 = 10_000;

#[derive(Debug)]
struct Bucket {
    count: u32,
    reset_at: Instant,
}

/// Fixed-window request counter keyed by client identifier.
///
/// Buckets live in a bounded moka cache whose TTL equals the window, so stale
/// clients are evicted instead of accumulating forever. Each bucket sits
/// behind its own mutex: the read-increment-compare runs as one unit, so two
/// concurrent requests cannot both observe the same stale count.
pub struct RateLimiter {
    buckets: Cache<String, Arc<Mutex<Bucket>>>,
    max_requests: u32,
    window: Duration,
}

impl RateLimiter {
    pub fn new(max_requests: u32, window: Duration) -> Self {
        let buckets = Cache::builder()
            .max_capacity(MAX_TRACKED_CLIENTS)
            .time_to_live(window)
            .build();
        Self {
            buckets,
            max_requests,
            window,
        }
    }

    pub fn max_requests(&self) -> u32 {
        self.max_requests
    }

    /// Count one request against `client_id`. Returns `false` once the client
    /// has exhausted its quota for the current window; the first request
    /// after the window elapses resets the counter to 1.
    pub fn try_acquire(&self, client_id: &str) -> bool {
        let bucket = self.buckets.get_with(client_id.to_string(), || {
            Arc::new(Mutex::new(Bucket {
                count: 0,
                reset_at: Instant::now() + self.window,
            }))
        });

        let mut bucket = bucket.lock().unwrap_or_else(PoisonError::into_inner);
        let now = Instant::now();

        if now > bucket.reset_at {
            bucket.count = 1;
            bucket.reset_at = now + self.window;
            return true;
        }

        if bucket.count >= self.max_requests {
            return false;
        }

        bucket.count += 1;
        true
    }
}
