//! Submission throttling (token bucket)
//!
//! Every submission costs one generation against two paid upstream APIs,
//! so the bucket guards only the submit path.

use std::sync::Mutex;
use std::time::Instant;

pub const DEFAULT_BURST: u32 = 200;
pub const DEFAULT_RATE_PER_SEC: u32 = 100;

struct Bucket {
    tokens: f64,
    last_refill: Instant,
}

/// Token bucket refilled continuously at `refill_rate` tokens per second
pub struct RateLimiter {
    bucket: Mutex<Bucket>,
    burst: u32,
    refill_rate: u32,
}

impl RateLimiter {
    /// `RateLimiter::new(200, 100)` allows bursts of 200 and 100 req/sec sustained
    pub fn new(burst: u32, refill_rate: u32) -> Self {
        Self {
            bucket: Mutex::new(Bucket {
                tokens: burst as f64,
                last_refill: Instant::now(),
            }),
            burst,
            refill_rate,
        }
    }

    /// Take one token, returning false when the bucket is empty
    pub fn try_acquire(&self) -> bool {
        // A poisoned lock only means another caller panicked mid-update
        let mut bucket = match self.bucket.lock() {
            Ok(guard) => guard,
            Err(poisoned) => poisoned.into_inner(),
        };

        let now = Instant::now();
        let elapsed = now.duration_since(bucket.last_refill).as_secs_f64();
        bucket.tokens = (bucket.tokens + elapsed * self.refill_rate as f64).min(self.burst as f64);
        bucket.last_refill = now;

        if bucket.tokens >= 1.0 {
            bucket.tokens -= 1.0;
            true
        } else {
            false
        }
    }

    pub fn burst(&self) -> u32 {
        self.burst
    }
}

impl Default for RateLimiter {
    fn default() -> Self {
        Self::new(DEFAULT_BURST, DEFAULT_RATE_PER_SEC)
    }
}
