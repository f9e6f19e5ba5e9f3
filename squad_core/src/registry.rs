use crate::error::ConfigError;
use reqwest::Url;
use serde::{Deserialize, Serialize};
use std::collections::HashSet;

/// One upstream status endpoint and the short name its series are labelled with.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq, Hash)]
pub struct ServerDescriptor {
    #[serde(rename = "Name")]
    pub short_name: String,

    #[serde(rename = "Url")]
    pub endpoint_url: String,
}

impl ServerDescriptor {
    pub fn new(short_name: impl Into<String>, endpoint_url: impl Into<String>) -> Self {
        Self {
            short_name: short_name.into(),
            endpoint_url: endpoint_url.into(),
        }
    }

    pub fn description(&self) -> String {
        format!("{} ({})", self.short_name, self.endpoint_url)
    }
}

/// Ordered, immutable list of servers. Iteration order is load order.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ServerRegistry {
    servers: Vec<ServerDescriptor>,
}

impl ServerRegistry {
    /// Builds a registry, rejecting empty lists, blank fields, non-HTTP URLs
    /// and duplicate short names.
    pub fn new(servers: Vec<ServerDescriptor>) -> Result<Self, ConfigError> {
        if servers.is_empty() {
            return Err(ConfigError::Invalid(
                "server list must contain at least one server".to_string(),
            ));
        }

        let mut seen = HashSet::new();
        for (i, server) in servers.iter().enumerate() {
            if server.short_name.trim().is_empty() {
                return Err(ConfigError::Invalid(format!(
                    "server {} has an empty Name",
                    i
                )));
            }

            let url = Url::parse(&server.endpoint_url).map_err(|e| {
                ConfigError::Invalid(format!(
                    "server '{}' has an invalid Url '{}': {}",
                    server.short_name, server.endpoint_url, e
                ))
            })?;
            if !matches!(url.scheme(), "http" | "https") {
                return Err(ConfigError::Invalid(format!(
                    "server '{}' Url must use http or https, got '{}'",
                    server.short_name,
                    url.scheme()
                )));
            }

            if !seen.insert(server.short_name.as_str()) {
                return Err(ConfigError::Invalid(format!(
                    "duplicate server Name '{}'",
                    server.short_name
                )));
            }
        }

        Ok(Self { servers })
    }

    pub fn iter(&self) -> std::slice::Iter<'_, ServerDescriptor> {
        self.servers.iter()
    }

    pub fn len(&self) -> usize {
        self.servers.len()
    }

    pub fn is_empty(&self) -> bool {
        self.servers.is_empty()
    }

}

impl<'a> IntoIterator for &'a ServerRegistry {
    type Item = &'a ServerDescriptor;
    type IntoIter = std::slice::Iter<'a, ServerDescriptor>;

    fn into_iter(self) -> Self::IntoIter {
        self.iter()
    }
}
