pub mod error;
pub mod fetcher;
pub mod parser;
pub mod rate_limiter;
pub mod registry;
pub mod telemetry;

pub use error::{ConfigError, FetchError, Result};
pub use fetcher::{DynFetcher, Fetcher, HttpFetcher, DEFAULT_REQUEST_TIMEOUT};
pub use parser::{load_servers_from_file, parse_servers_from_str};
pub use rate_limiter::{RateLimiter, DEFAULT_BURST, DEFAULT_RATE_INTERVAL};
pub use registry::{ServerDescriptor, ServerRegistry};
pub use telemetry::ServerTelemetry;

// Re-export commonly used types
pub use async_trait::async_trait;
pub use tokio_util::sync::CancellationToken;
