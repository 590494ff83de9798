//! Pacing of recognition calls.
//!
//! The recognition service is rate limited, so calls are spaced out. The
//! pipeline asks its `Pacer` before every call and between consecutive calls
//! of one request; the pacer decides how long to wait.

use crate::config::{PacingConfig, PacingMode};
use async_trait::async_trait;
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::Mutex;
use tokio::time::Instant;

/// Trait for spacing out recognition calls.
#[async_trait]
pub trait Pacer: Send + Sync {
    /// Waits, if needed, before a recognition call is sent.
    async fn before_call(&self) {}

    /// Waits after a call that is followed by another call of the same request.
    ///
    /// Never invoked after the last chunk.
    async fn between_calls(&self) {}
}

#[async_trait]
impl<T: Pacer + ?Sized> Pacer for Arc<T> {
    async fn before_call(&self) {
        (**self).before_call().await
    }

    async fn between_calls(&self) {
        (**self).between_calls().await
    }
}

/// Sleeps a fixed delay between consecutive calls.
#[derive(Debug, Clone, Copy)]
pub struct FixedDelayPacer {
    delay: Duration,
}

impl FixedDelayPacer {
    pub fn new(delay: Duration) -> Self {
        Self { delay }
    }

    /// A pacer that never waits.
    pub fn unpaced() -> Self {
        Self::new(Duration::ZERO)
    }

    pub fn delay(&self) -> Duration {
        self.delay
    }
}

#[async_trait]
impl Pacer for FixedDelayPacer {
    async fn between_calls(&self) {
        if !self.delay.is_zero() {
            tokio::time::sleep(self.delay).await;
        }
    }
}

#[derive(Debug)]
struct Bucket {
    tokens: f64,
    last_refill: Instant,
}

/// Token bucket shared by every request that uses it.
///
/// Holds up to `capacity` tokens and regains one every `refill_every`. Each
/// call consumes one token, waiting when the bucket is empty.
#[derive(Debug)]
pub struct TokenBucketPacer {
    capacity: u32,
    refill_every: Duration,
    bucket: Mutex<Bucket>,
}

impl TokenBucketPacer {
    pub fn new(capacity: u32, refill_every: Duration) -> Self {
        let capacity = capacity.max(1);
        Self {
            capacity,
            refill_every,
            bucket: Mutex::new(Bucket {
                tokens: f64::from(capacity),
                last_refill: Instant::now(),
            }),
        }
    }

    /// Takes one token, or returns how long until one is available.
    async fn try_take(&self) -> Option<Duration> {
        let mut bucket = self.bucket.lock().await;
        if self.refill_every.is_zero() {
            return None;
        }

        let now = Instant::now();
        let elapsed = now.duration_since(bucket.last_refill);
        let regained = elapsed.as_secs_f64() / self.refill_every.as_secs_f64();
        bucket.tokens = (bucket.tokens + regained).min(f64::from(self.capacity));
        bucket.last_refill = now;

        if bucket.tokens >= 1.0 {
            bucket.tokens -= 1.0;
            None
        } else {
            let missing = 1.0 - bucket.tokens;
            Some(self.refill_every.mul_f64(missing))
        }
    }
}

#[async_trait]
impl Pacer for TokenBucketPacer {
    async fn before_call(&self) {
        while let Some(wait) = self.try_take().await {
            tokio::time::sleep(wait).await;
        }
    }
}

/// Builds the pacer described by the configuration.
pub fn pacer_from_config(config: &PacingConfig) -> Arc<dyn Pacer> {
    let delay = Duration::from_millis(config.delay_ms);
    match config.mode {
        PacingMode::Fixed => Arc::new(FixedDelayPacer::new(delay)),
        PacingMode::TokenBucket => Arc::new(TokenBucketPacer::new(config.burst, delay)),
    }
}
