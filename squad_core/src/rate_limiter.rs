//! Token-bucket admission control for outbound requests.
//!
//! The bucket is tracked as a theoretical arrival time (GCRA): each permit
//! pushes the arrival time forward by one `interval`, and a request is admitted
//! while the arrival time is at most `(burst - 1) * interval` in the future.
//! That is equivalent to a bucket of `burst` tokens refilled at one token per
//! `interval`, starting full, but needs only integer durations.

use crate::error::FetchError;
use std::time::Duration;
use tokio::sync::Mutex;
use tokio::time::Instant;
use tokio_util::sync::CancellationToken;
use tracing::trace;

/// Default pacing for the upstream API: one request per second on average.
pub const DEFAULT_RATE_INTERVAL: Duration = Duration::from_secs(1);

/// Default number of requests that may be issued back to back after idling.
pub const DEFAULT_BURST: u32 = 10;

pub struct RateLimiter {
    interval: Duration,
    burst: u32,
    state: Mutex<GcraState>,
}

impl RateLimiter {
    /// `interval` is the sustained spacing between permits; `burst` is clamped to at least 1.
    pub fn new(interval: Duration, burst: u32) -> Self {
        let burst = burst.max(1);
        Self {
            interval,
            burst,
            state: Mutex::new(GcraState::new(interval, burst)),
        }
    }

    pub fn interval(&self) -> Duration {
        self.interval
    }

    pub fn burst(&self) -> u32 {
        self.burst
    }

    /// Waits until a permit is available and takes it.
    ///
    /// Callers are admitted in call order: the internal mutex is fair and is
    /// held for the whole wait. If `cancel` fires first the call returns
    /// [`FetchError::Cancelled`] and no permit is consumed.
    pub async fn acquire(&self, cancel: &CancellationToken) -> Result<(), FetchError> {
        if cancel.is_cancelled() {
            return Err(FetchError::Cancelled);
        }

        let mut state = tokio::select! {
            biased;
            _ = cancel.cancelled() => return Err(FetchError::Cancelled),
            state = self.state.lock() => state,
        };

        loop {
            let wait = match state.try_acquire(Instant::now()) {
                Ok(()) => return Ok(()),
                Err(wait) => wait,
            };

            trace!("Rate limiter waiting {:?} for a permit", wait);

            tokio::select! {
                biased;
                _ = cancel.cancelled() => return Err(FetchError::Cancelled),
                _ = tokio::time::sleep(wait) => {}
            }
        }
    }
}

impl Default for RateLimiter {
    fn default() -> Self {
        Self::new(DEFAULT_RATE_INTERVAL, DEFAULT_BURST)
    }
}

impl std::fmt::Debug for RateLimiter {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("RateLimiter")
            .field("interval", &self.interval)
            .field("burst", &self.burst)
            .finish()
    }
}

#[derive(Debug)]
struct GcraState {
    interval: Duration,
    tolerance: Duration,
    tat: Option<Instant>,
}

impl GcraState {
    fn new(interval: Duration, burst: u32) -> Self {
        Self {
            interval,
            tolerance: interval.saturating_mul(burst - 1),
            tat: None,
        }
    }

    /// Takes a permit at `now`, or reports how long until one is available.
    fn try_acquire(&mut self, now: Instant) -> Result<(), Duration> {
        let tat = self.tat.map_or(now, |tat| tat.max(now));
        let ahead = tat.duration_since(now);

        if ahead > self.tolerance {
            return Err(ahead - self.tolerance);
        }

        self.tat = Some(tat.checked_add(self.interval).unwrap_or(tat));
        Ok(())
    }
}
