use crate::{
    error::{FetchError, Result},
    rate_limiter::RateLimiter,
    registry::ServerDescriptor,
    telemetry::ServerTelemetry,
};
use async_trait::async_trait;
use std::sync::Arc;
use std::time::Duration;
use tokio_util::sync::CancellationToken;
use tracing::debug;

/// Upper bound on one status request, body included.
pub const DEFAULT_REQUEST_TIMEOUT: Duration = Duration::from_secs(10);

/// Retrieves the current telemetry of one server.
#[async_trait]
pub trait Fetcher: Send + Sync {
    /// Performs a single attempt. Implementations never retry.
    async fn fetch(
        &self,
        server: &ServerDescriptor,
        cancel: &CancellationToken,
    ) -> Result<ServerTelemetry>;
}

pub type DynFetcher = Arc<dyn Fetcher>;

/// Fetches the status JSON over HTTP, paced by a shared [`RateLimiter`].
pub struct HttpFetcher {
    client: reqwest::Client,
    limiter: Arc<RateLimiter>,
    timeout: Duration,
}

impl HttpFetcher {
    pub fn new(limiter: Arc<RateLimiter>, timeout: Duration) -> reqwest::Result<Self> {
        let client = reqwest::Client::builder()
            .user_agent(concat!("squad-exporter/", env!("CARGO_PKG_VERSION")))
            .timeout(timeout)
            .build()?;

        Ok(Self {
            client,
            limiter,
            timeout,
        })
    }

    pub fn limiter(&self) -> &Arc<RateLimiter> {
        &self.limiter
    }

    async fn request(&self, server: &ServerDescriptor) -> Result<ServerTelemetry> {
        let response = self
            .client
            .get(&server.endpoint_url)
            .send()
            .await
            .map_err(|e| self.transport_error(e))?;

        let status = response.status();
        if !status.is_success() {
            return Err(FetchError::BadStatus(status.as_u16()));
        }

        let body = response
            .bytes()
            .await
            .map_err(|e| self.transport_error(e))?;

        ServerTelemetry::from_json(&body)
    }

    fn transport_error(&self, e: reqwest::Error) -> FetchError {
        if e.is_timeout() {
            FetchError::Transport(format!("request timed out after {:?}", self.timeout))
        } else {
            FetchError::Transport(e.to_string())
        }
    }
}

#[async_trait]
impl Fetcher for HttpFetcher {
    async fn fetch(
        &self,
        server: &ServerDescriptor,
        cancel: &CancellationToken,
    ) -> Result<ServerTelemetry> {
        self.limiter.acquire(cancel).await?;

        debug!(server = %server.short_name, url = %server.endpoint_url, "Fetching server status");

        tokio::select! {
            biased;
            _ = cancel.cancelled() => Err(FetchError::Cancelled),
            result = self.request(server) => result,
        }
    }
}
