use crate::{CollectorArgs, OutputFormat};
use anyhow::{Context, Result};
use squad_collector::Collector;
use squad_core::{load_servers_from_file, CancellationToken};
use squad_metrics::{JsonExporter, MetricsState, PrometheusExporter};
use std::path::PathBuf;
use std::sync::Arc;
use tracing::info;

pub async fn execute(
    args: CollectorArgs,
    format: OutputFormat,
    output: Option<PathBuf>,
) -> Result<()> {
    let registry = load_servers_from_file(&args.servers)
        .await
        .with_context(|| format!("failed to load servers from {}", args.servers.display()))?;

    let config = args.config();
    config.validate().map_err(anyhow::Error::msg)?;

    let metrics = MetricsState::new()?;
    let fetcher = Arc::new(config.http_fetcher()?);
    let collector = Collector::new(Arc::new(registry), fetcher, metrics.clone());

    let token = CancellationToken::new();
    crate::shutdown::spawn_signal_handler(token.clone());

    let report = collector.run_cycle(&token).await;
    token.cancel();
    if report.cancelled {
        anyhow::bail!("collection cycle interrupted");
    }

    match (output, format) {
        (Some(path), OutputFormat::Prometheus) => {
            PrometheusExporter::export(&metrics, &path)
                .await
                .with_context(|| format!("failed to write {}", path.display()))?;
            info!("Wrote metrics to {}", path.display());
        }
        (Some(path), OutputFormat::Json) => {
            JsonExporter::export(&metrics.snapshot(), &path)
                .await
                .with_context(|| format!("failed to write {}", path.display()))?;
            info!("Wrote metrics snapshot to {}", path.display());
        }
        (None, OutputFormat::Prometheus) => print!("{}", PrometheusExporter::encode(&metrics)?),
        (None, OutputFormat::Json) => println!("{}", JsonExporter::to_string(&metrics.snapshot())?),
    }

    Ok(())
}
