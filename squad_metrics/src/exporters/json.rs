use crate::snapshot::MetricsSnapshot;
use anyhow::Result;
use std::path::Path;

pub struct JsonExporter;

impl JsonExporter {
    pub async fn export(snapshot: &MetricsSnapshot, path: impl AsRef<Path>) -> Result<()> {
        let json = Self::to_string(snapshot)?;
        tokio::fs::write(path, json).await?;
        Ok(())
    }

    pub fn to_string(snapshot: &MetricsSnapshot) -> Result<String> {
        Ok(serde_json::to_string_pretty(snapshot)?)
    }
}
