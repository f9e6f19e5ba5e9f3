use crate::error::ConfigError;
use crate::registry::{ServerDescriptor, ServerRegistry};
use serde::Deserialize;
use std::path::Path;

/// TOML has no top-level arrays, so server lists live under `[[servers]]`.
#[derive(Debug, Deserialize)]
struct ServerListConfig {
    servers: Vec<ServerDescriptor>,
}

pub async fn load_servers_from_file(path: impl AsRef<Path>) -> Result<ServerRegistry, ConfigError> {
    let path = path.as_ref();
    let contents = tokio::fs::read_to_string(path)
        .await
        .map_err(|source| ConfigError::Read {
            path: path.to_path_buf(),
            source,
        })?;

    let extension = path.extension().and_then(|s| s.to_str()).unwrap_or("");
    parse_servers_from_str(&contents, extension)
}

pub fn parse_servers_from_str(content: &str, format: &str) -> Result<ServerRegistry, ConfigError> {
    let servers = match format.to_lowercase().as_str() {
        "json" => parse_json(content)?,
        "yaml" | "yml" => parse_yaml(content)?,
        "toml" => parse_toml(content)?,
        other => return Err(ConfigError::UnsupportedFormat(other.to_string())),
    };
    ServerRegistry::new(servers)
}

fn parse_json(content: &str) -> Result<Vec<ServerDescriptor>, ConfigError> {
    Ok(serde_json::from_str(content)?)
}

fn parse_yaml(content: &str) -> Result<Vec<ServerDescriptor>, ConfigError> {
    Ok(serde_yaml::from_str(content)?)
}

fn parse_toml(content: &str) -> Result<Vec<ServerDescriptor>, ConfigError> {
    let config: ServerListConfig = toml::from_str(content)?;
    Ok(config.servers)
}
