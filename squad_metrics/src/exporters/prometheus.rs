use crate::state::MetricsState;
use prometheus::{Encoder, TextEncoder};
use std::path::Path;

pub struct PrometheusExporter;

impl PrometheusExporter {
    /// Content type of [`PrometheusExporter::encode`] output.
    pub fn content_type() -> String {
        TextEncoder::new().format_type().to_string()
    }

    /// Renders the current state in the text exposition format.
    pub fn encode(state: &MetricsState) -> prometheus::Result<String> {
        let encoder = TextEncoder::new();
        let families = state.gather();

        let mut buffer = Vec::new();
        encoder.encode(&families, &mut buffer)?;
        String::from_utf8(buffer).map_err(|e| prometheus::Error::Msg(e.to_string()))
    }

    pub async fn export(state: &MetricsState, path: impl AsRef<Path>) -> anyhow::Result<()> {
        let text = Self::encode(state)?;
        tokio::fs::write(path, text).await?;
        Ok(())
    }
}
