use std::path::PathBuf;
use thiserror::Error;

/// Errors raised while loading the server list. All of them are fatal at startup.
#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("Failed to read servers file {path}: {source}")]
    Read {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Failed to decode servers file: {0}")]
    Parse(String),

    #[error("Unsupported servers file format '{0}'. Use .json, .yaml, .yml, or .toml")]
    UnsupportedFormat(String),

    #[error("Invalid server list: {0}")]
    Invalid(String),
}

impl From<serde_json::Error> for ConfigError {
    fn from(e: serde_json::Error) -> Self {
        ConfigError::Parse(e.to_string())
    }
}

impl From<serde_yaml::Error> for ConfigError {
    fn from(e: serde_yaml::Error) -> Self {
        ConfigError::Parse(e.to_string())
    }
}

impl From<toml::de::Error> for ConfigError {
    fn from(e: toml::de::Error) -> Self {
        ConfigError::Parse(e.to_string())
    }
}

/// Per-server fetch failures. Recovered by the collector, never fatal.
#[derive(Error, Debug)]
pub enum FetchError {
    #[error("Cancelled while waiting for the upstream")]
    Cancelled,

    #[error("Transport error: {0}")]
    Transport(String),

    #[error("Unexpected status code {0}")]
    BadStatus(u16),

    #[error("Failed to decode response: {0}")]
    Decode(#[from] serde_json::Error),
}

impl FetchError {
    /// Stable short name used as a structured log field.
    pub fn kind(&self) -> &'static str {
        match self {
            FetchError::Cancelled => "cancelled",
            FetchError::Transport(_) => "transport",
            FetchError::BadStatus(_) => "bad_status",
            FetchError::Decode(_) => "decode",
        }
    }

    pub fn is_cancelled(&self) -> bool {
        matches!(self, FetchError::Cancelled)
    }
}

pub type Result<T> = std::result::Result<T, FetchError>;
