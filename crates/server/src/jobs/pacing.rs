// crates/server/src/jobs/pacing.rs
//! Pacing strategies that keep upstream calls under the provider's rate ceiling.

use std::sync::Mutex;
use std::time::Duration;

use async_trait::async_trait;
use tokio::time::Instant;

/// Delay applied by the runner after each upstream call.
#[async_trait]
pub trait Pacer: Send + Sync {
    async fn pause(&self);

    /// Strategy name for logging.
    fn name(&self) -> &'static str;
}

/// Spacing between calls for a requests-per-minute ceiling.
/// A ceiling of 0 is treated as 1.
pub fn interval_for_rate(requests_per_minute: u32) -> Duration {
    Duration::from_secs(60) / requests_per_minute.max(1)
}

/// Sleep a fixed interval after every call. Each job paces independently.
#[derive(Debug, Clone, Copy)]
pub struct FixedInterval {
    interval: Duration,
}

impl FixedInterval {
    pub fn new(interval: Duration) -> Self {
        Self { interval }
    }

    pub fn per_minute(requests_per_minute: u32) -> Self {
        Self::new(interval_for_rate(requests_per_minute))
    }

    pub fn interval(&self) -> Duration {
        self.interval
    }
}

#[async_trait]
impl Pacer for FixedInterval {
    async fn pause(&self) {
        tokio::time::sleep(self.interval).await;
    }

    fn name(&self) -> &'static str {
        "fixed"
    }
}

/// Token bucket shared by every job holding the same instance, so the
/// ceiling applies to the process rather than to each job.
///
/// Implemented as a virtual schedule: each `pause` reserves the next free
/// slot and sleeps until it. Up to `burst` slots may be taken back to back.
#[derive(Debug)]
pub struct TokenBucket {
    interval: Duration,
    burst: u32,
    next_slot: Mutex<Option<Instant>>,
}

impl TokenBucket {
    pub fn per_minute(requests_per_minute: u32) -> Self {
        Self {
            interval: interval_for_rate(requests_per_minute),
            burst: 1,
            next_slot: Mutex::new(None),
        }
    }

    pub fn with_burst(mut self, burst: u32) -> Self {
        self.burst = burst.max(1);
        self
    }

    fn reserve(&self) -> Instant {
        let now = Instant::now();
        let tolerance = self.interval * (self.burst - 1);
        let earliest = now.checked_sub(tolerance).unwrap_or(now);

        let mut next = match self.next_slot.lock() {
            Ok(guard) => guard,
            Err(poisoned) => {
                tracing::error!("Mutex poisoned in token bucket, recovering");
                poisoned.into_inner()
            }
        };
        let slot = match *next {
            Some(t) if t > earliest => t,
            _ => earliest,
        };
        *next = Some(slot + self.interval);
        slot
    }
}

#[async_trait]
impl Pacer for TokenBucket {
    async fn pause(&self) {
        let slot = self.reserve();
        tokio::time::sleep_until(slot).await;
    }

    fn name(&self) -> &'static str {
        "token-bucket"
    }
}

/// No delay at all. Used in tests and for providers without a ceiling.
#[derive(Debug, Clone, Copy, Default)]
pub struct NoPacing;

#[async_trait]
impl Pacer for NoPacing {
    async fn pause(&self) {}

    fn name(&self) -> &'static str {
        "none"
    }
}
