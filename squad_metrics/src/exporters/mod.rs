pub mod json;
pub mod prometheus;

pub use json::JsonExporter;
pub use self::prometheus::PrometheusExporter;
