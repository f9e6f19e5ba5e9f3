pub mod config;
pub mod cycle;
pub mod scheduler;

pub use config::{CollectorConfig, CollectorConfigBuilder};
pub use cycle::{Collector, CycleReport};
pub use scheduler::{CollectorState, Scheduler};
