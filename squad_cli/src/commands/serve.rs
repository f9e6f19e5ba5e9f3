use crate::server::{self, AppState};
use crate::{shutdown, ServeArgs};
use anyhow::{Context, Result};
use squad_collector::{Collector, Scheduler};
use squad_core::{load_servers_from_file, CancellationToken};
use squad_metrics::MetricsState;
use std::net::SocketAddr;
use std::sync::Arc;
use std::time::Instant;
use tracing::{info, warn};

pub async fn execute(args: ServeArgs) -> Result<()> {
    let servers_file = &args.collector.servers;
    let registry = load_servers_from_file(servers_file)
        .await
        .with_context(|| format!("failed to load servers from {}", servers_file.display()))?;

    let config = args.collector.config();
    config.validate().map_err(anyhow::Error::msg)?;

    info!("Loaded {} servers from {}", registry.len(), servers_file.display());
    for server in &registry {
        info!("  {}", server.description());
    }

    let estimated = config.estimated_cycle_time(registry.len());
    if estimated >= config.interval {
        warn!(
            "Collection cycles need at least {:?}, longer than the {:?} interval",
            estimated, config.interval
        );
    }

    let registry = Arc::new(registry);
    let metrics = MetricsState::new()?;
    let fetcher = Arc::new(config.http_fetcher()?);
    let limiter = fetcher.limiter();
    info!(
        "Rate limit: one request every {:?} with a burst of {}",
        limiter.interval(),
        limiter.burst()
    );

    let collector = Collector::new(registry.clone(), fetcher, metrics.clone());
    let scheduler = Scheduler::new(collector, config.interval);
    info!("Collecting every {:?}", scheduler.interval());

    let state = AppState {
        start_time: Instant::now(),
        registry,
        metrics,
        collector_state: scheduler.subscribe(),
        config,
    };

    let token = CancellationToken::new();
    shutdown::spawn_signal_handler(token.clone());

    let addr = SocketAddr::from(([0, 0, 0, 0], args.port));
    let listener = tokio::net::TcpListener::bind(addr)
        .await
        .with_context(|| format!("failed to bind {}", addr))?;

    let collector_task = scheduler.spawn(token.clone());

    info!("Serving metrics on http://{}", addr);
    info!("Endpoints:");
    info!("  GET  /         - Service info");
    info!("  GET  /health   - Health check");
    info!("  GET  /metrics  - Prometheus metrics");

    let served = axum::serve(listener, server::router(state))
        .with_graceful_shutdown(token.clone().cancelled_owned())
        .await;

    token.cancel();
    if let Err(e) = collector_task.await {
        warn!("Collector task ended abnormally: {}", e);
    }

    served.context("HTTP server failed")?;
    info!("Shutdown complete");

    Ok(())
}
