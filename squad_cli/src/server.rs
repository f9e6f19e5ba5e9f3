use axum::{
    extract::State,
    http::{header, StatusCode},
    response::{IntoResponse, Json, Response},
    routing::get,
    Router,
};
use serde::Serialize;
use squad_collector::{CollectorConfig, CollectorState};
use squad_core::ServerRegistry;
use squad_metrics::{MetricsState, PrometheusExporter};
use std::sync::Arc;
use std::time::Instant;
use tokio::sync::watch;
use tower_http::catch_panic::CatchPanicLayer;
use tower_http::trace::TraceLayer;
use tracing::error;

const SERVICE_NAME: &str = "Squad Server Metrics";
const ENDPOINTS: [&str; 2] = ["/metrics", "/health"];

#[derive(Clone)]
pub struct AppState {
    pub start_time: Instant,
    pub registry: Arc<ServerRegistry>,
    pub metrics: MetricsState,
    pub collector_state: watch::Receiver<CollectorState>,
    pub config: CollectorConfig,
}

#[derive(Debug, Serialize)]
struct HealthResponse {
    status: &'static str,
    uptime_seconds: u64,
}

#[derive(Debug, Serialize)]
struct ServiceInfo {
    service: &'static str,
    servers: usize,
    endpoints: [&'static str; 2],
    collector_state: CollectorState,
    cycles_completed: u64,
    collection: CollectorConfig,
}

pub fn router(state: AppState) -> Router {
    Router::new()
        .route("/", get(service_info))
        .route("/health", get(health_check))
        .route("/metrics", get(metrics))
        .layer(TraceLayer::new_for_http())
        .layer(CatchPanicLayer::new())
        .with_state(state)
}

async fn metrics(State(state): State<AppState>) -> Response {
    match PrometheusExporter::encode(&state.metrics) {
        Ok(body) => (
            [(header::CONTENT_TYPE, PrometheusExporter::content_type())],
            body,
        )
            .into_response(),
        Err(e) => {
            error!("Failed to encode metrics: {}", e);
            (StatusCode::INTERNAL_SERVER_ERROR, e.to_string()).into_response()
        }
    }
}

async fn health_check(State(state): State<AppState>) -> Json<HealthResponse> {
    Json(HealthResponse {
        status: "healthy",
        uptime_seconds: state.start_time.elapsed().as_secs(),
    })
}

async fn service_info(State(state): State<AppState>) -> Json<ServiceInfo> {
    let collector_state = *state.collector_state.borrow();
    Json(ServiceInfo {
        service: SERVICE_NAME,
        servers: state.registry.len(),
        endpoints: ENDPOINTS,
        collector_state,
        cycles_completed: state.metrics.snapshot().cycles_completed,
        collection: state.config.clone(),
    })
}
