//! Token bucket rate limiter shared by every oracle query

use std::time::Duration;

use tokio::sync::Mutex;
use tokio::time::Instant;
use tokio_util::sync::CancellationToken;

use crate::error::{GeneratorError, GeneratorResult};

/// Tokens left over and the instant they were last topped up
#[derive(Debug)]
struct Bucket {
    available: f64,
    refilled_at: Instant,
}

impl Bucket {
    fn full(capacity: f64) -> Self {
        Self {
            available: capacity,
            refilled_at: Instant::now(),
        }
    }

    /// Credit the time since the last call, then take one token.
    ///
    /// On failure returns how long until the next token is due.
    fn take(&mut self, rate: f64, capacity: f64) -> Result<(), Duration> {
        let now = Instant::now();
        let earned = now.saturating_duration_since(self.refilled_at).as_secs_f64() * rate;
        self.available = (self.available + earned).min(capacity);
        self.refilled_at = now;

        if self.available >= 1.0 {
            self.available -= 1.0;
            return Ok(());
        }
        // Very slow rates put the next token beyond what a Duration holds
        Err(Duration::try_from_secs_f64((1.0 - self.available) / rate).unwrap_or(Duration::MAX))
    }
}

/// Rate limiter allowing `burst` queries at once and `rate` queries per second after that.
///
/// Acquisition is atomic under the bucket mutex, so the global rate holds no
/// matter how many workers share one limiter.
#[derive(Debug)]
pub struct RateLimiter {
    bucket: Mutex<Bucket>,
    rate: f64,
    burst: u32,
}

impl RateLimiter {
    pub fn new(rate_per_second: f64, burst: u32) -> GeneratorResult<Self> {
        if !rate_per_second.is_finite() || rate_per_second <= 0.0 {
            return Err(GeneratorError::config(format!(
                "rate limiter needs a positive rate, got {rate_per_second}"
            )));
        }
        if burst == 0 {
            return Err(GeneratorError::config("rate limiter needs a burst of at least 1"));
        }
        Ok(Self {
            bucket: Mutex::new(Bucket::full(f64::from(burst))),
            rate: rate_per_second,
            burst,
        })
    }

    pub fn rate(&self) -> f64 {
        self.rate
    }

    pub fn burst(&self) -> u32 {
        self.burst
    }

    async fn take(&self) -> Result<(), Duration> {
        self.bucket.lock().await.take(self.rate, f64::from(self.burst))
    }

    /// Wait for a token, or fail with `Cancelled` if `cancel` fires first.
    ///
    /// A cancelled wait never consumes a token.
    pub async fn acquire(&self, cancel: &CancellationToken) -> GeneratorResult<()> {
        loop {
            if cancel.is_cancelled() {
                return Err(GeneratorError::Cancelled);
            }

            let wait = match self.take().await {
                Ok(()) => return Ok(()),
                Err(wait) => wait,
            };

            tokio::select! {
                biased;
                _ = cancel.cancelled() => return Err(GeneratorError::Cancelled),
                _ = tokio::time::sleep(wait) => {}
            }
        }
    }

    /// Take a token only if one is available right now
    pub async fn try_acquire(&self) -> bool {
        self.take().await.is_ok()
    }
}
