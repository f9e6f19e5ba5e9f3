use serde::Serialize;
use squad_core::{HttpFetcher, RateLimiter, DEFAULT_BURST, DEFAULT_RATE_INTERVAL, DEFAULT_REQUEST_TIMEOUT};
use std::sync::Arc;
use std::time::Duration;

/// Spacing between collection cycles when none is configured.
pub const DEFAULT_COLLECTION_INTERVAL: Duration = Duration::from_secs(60);

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct CollectorConfig {
    #[serde(with = "humantime_serde")]
    pub interval: Duration,
    #[serde(with = "humantime_serde")]
    pub rate_interval: Duration,
    pub burst: u32,
    #[serde(with = "humantime_serde")]
    pub request_timeout: Duration,
}

impl Default for CollectorConfig {
    fn default() -> Self {
        Self {
            interval: DEFAULT_COLLECTION_INTERVAL,
            rate_interval: DEFAULT_RATE_INTERVAL,
            burst: DEFAULT_BURST,
            request_timeout: DEFAULT_REQUEST_TIMEOUT,
        }
    }
}

impl CollectorConfig {
    pub fn builder() -> CollectorConfigBuilder {
        CollectorConfigBuilder::default()
    }

    pub fn validate(&self) -> Result<(), String> {
        if self.interval.is_zero() {
            return Err("collection interval must be > 0".to_string());
        }

        if self.rate_interval.is_zero() {
            return Err("rate interval must be > 0".to_string());
        }

        if self.burst == 0 {
            return Err("burst must be at least 1".to_string());
        }

        if self.rate_interval.checked_mul(self.burst).is_none() {
            return Err(format!(
                "rate interval of {} with a burst of {} is out of range",
                humantime::format_duration(self.rate_interval),
                self.burst
            ));
        }

        if self.request_timeout.is_zero() {
            return Err("request timeout must be > 0".to_string());
        }

        Ok(())
    }

    /// Lower bound on one cycle's length once the burst is spent.
    pub fn estimated_cycle_time(&self, servers: usize) -> Duration {
        let paced = u32::try_from(servers.saturating_sub(self.burst as usize)).unwrap_or(u32::MAX);
        self.rate_interval.saturating_mul(paced)
    }

    pub fn rate_limiter(&self) -> RateLimiter {
        RateLimiter::new(self.rate_interval, self.burst)
    }

    pub fn http_fetcher(&self) -> anyhow::Result<HttpFetcher> {
        let limiter = Arc::new(self.rate_limiter());
        Ok(HttpFetcher::new(limiter, self.request_timeout)?)
    }
}

#[derive(Default)]
pub struct CollectorConfigBuilder {
    interval: Option<Duration>,
    rate_interval: Option<Duration>,
    burst: Option<u32>,
    request_timeout: Option<Duration>,
}

impl CollectorConfigBuilder {
    pub fn interval(mut self, interval: Duration) -> Self {
        self.interval = Some(interval);
        self
    }

    pub fn rate_interval(mut self, rate_interval: Duration) -> Self {
        self.rate_interval = Some(rate_interval);
        self
    }

    pub fn burst(mut self, burst: u32) -> Self {
        self.burst = Some(burst);
        self
    }

    pub fn request_timeout(mut self, request_timeout: Duration) -> Self {
        self.request_timeout = Some(request_timeout);
        self
    }

    pub fn build(self) -> CollectorConfig {
        let defaults = CollectorConfig::default();
        CollectorConfig {
            interval: self.interval.unwrap_or(defaults.interval),
            rate_interval: self.rate_interval.unwrap_or(defaults.rate_interval),
            burst: self.burst.unwrap_or(defaults.burst),
            request_timeout: self.request_timeout.unwrap_or(defaults.request_timeout),
        }
    }
}

mod humantime_serde {
    use serde::Serializer;
    use std::time::Duration;

    pub fn serialize<S>(duration: &Duration, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        serializer.serialize_str(&humantime::format_duration(*duration).to_string())
    }
}
