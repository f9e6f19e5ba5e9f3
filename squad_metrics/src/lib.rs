pub mod exporters;
pub mod info;
pub mod names;
pub mod snapshot;
pub mod state;

pub use exporters::{JsonExporter, PrometheusExporter};
pub use info::{ServerInfo, ServerInfoCollector};
pub use snapshot::{MetricsSnapshot, ServerSnapshot};
pub use state::MetricsState;
