use std::sync::{Mutex, PoisonError};
use tokio::time::Instant;

use crate::configuration::types::AdmissionConfig;

#[derive(Debug)]
struct Bucket {
    tokens: f64,
    last_refill: Instant,
}

/// Token bucket bounding the rate of inbound requests.
///
/// Refills continuously at `rate` tokens per second up to `burst`, starting full. A
/// rejected caller must answer immediately: there is no queueing or waiting.
#[derive(Debug)]
pub struct AdmissionLimiter {
    rate: f64,
    burst: f64,
    bucket: Mutex<Bucket>,
}

impl AdmissionLimiter {
    pub fn new(rate_per_second: f64, burst: u32) -> Self {
        let burst = f64::from(burst.max(1));
        Self {
            rate: rate_per_second.max(0.0),
            burst,
            bucket: Mutex::new(Bucket {
                tokens: burst,
                last_refill: Instant::now(),
            }),
        }
    }

    pub fn from_config(config: &AdmissionConfig) -> Self {
        Self::new(config.rate_per_second, config.burst)
    }

    /// Takes one token if available.
    pub fn try_acquire(&self) -> bool {
        let mut bucket = self.bucket.lock().unwrap_or_else(PoisonError::into_inner);
        let now = Instant::now();
        let elapsed = now.saturating_duration_since(bucket.last_refill);
        bucket.tokens = (bucket.tokens + elapsed.as_secs_f64() * self.rate).min(self.burst);
        bucket.last_refill = now;

        if bucket.tokens >= 1.0 {
            bucket.tokens -= 1.0;
            true
        } else {
            false
        }
    }
}
