use squad_core::{CancellationToken, DynFetcher, FetchError, ServerRegistry};
use squad_metrics::MetricsState;
use std::sync::Arc;
use std::time::Duration;
use tokio::time::Instant;
use tracing::{info, warn};

/// Runs collection cycles: one fetch per registered server, in registry order.
#[derive(Clone)]
pub struct Collector {
    registry: Arc<ServerRegistry>,
    fetcher: DynFetcher,
    metrics: MetricsState,
}

impl Collector {
    pub fn new(registry: Arc<ServerRegistry>, fetcher: DynFetcher, metrics: MetricsState) -> Self {
        for server in registry.iter() {
            metrics.track_server(&server.short_name);
        }

        Self {
            registry,
            fetcher,
            metrics,
        }
    }

    pub fn registry(&self) -> &Arc<ServerRegistry> {
        &self.registry
    }

    /// Visits every server once. Per-server failures are counted and skipped;
    /// cancellation stops the cycle and leaves already recorded values in place.
    pub async fn run_cycle(&self, cancel: &CancellationToken) -> CycleReport {
        let start = Instant::now();
        let mut report = CycleReport::default();

        info!("Starting metrics collection for {} servers", self.registry.len());

        for server in self.registry.iter() {
            match self.fetcher.fetch(server, cancel).await {
                Ok(telemetry) => {
                    self.metrics.record(&server.short_name, &telemetry);
                    report.succeeded += 1;
                }
                Err(FetchError::Cancelled) => {
                    info!(server = %server.short_name, "Collection cycle cancelled");
                    report.cancelled = true;
                    break;
                }
                Err(e) => {
                    self.metrics.record_error(&server.short_name);
                    warn!(
                        server = %server.short_name,
                        kind = e.kind(),
                        "Error fetching data for server: {}",
                        e
                    );
                    report.failed += 1;
                }
            }
        }

        report.duration = start.elapsed();

        if !report.cancelled {
            self.metrics.record_cycle(report.duration);
            info!(
                attempted = report.attempted(),
                succeeded = report.succeeded,
                failed = report.failed,
                "Completed metrics collection in {:?}",
                report.duration
            );
        }

        report
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CycleReport {
    pub succeeded: usize,
    pub failed: usize,
    pub cancelled: bool,
    pub duration: Duration,
}

impl CycleReport {
    pub fn attempted(&self) -> usize {
        self.succeeded + self.failed
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::{http::StatusCode, routing::get, Router};
    use mockall::{mock, Sequence};
    use squad_core::{
        async_trait, Fetcher, HttpFetcher, RateLimiter, ServerDescriptor, ServerTelemetry,
    };
    use std::net::SocketAddr;

    mock! {
        pub Upstream {}

        #[async_trait]
        impl Fetcher for Upstream {
            async fn fetch(
                &self,
                server: &ServerDescriptor,
                cancel: &CancellationToken,
            ) -> squad_core::Result<ServerTelemetry>;
        }
    }

    fn registry(names: &[&str]) -> Arc<ServerRegistry> {
        let servers = names
            .iter()
            .map(|name| ServerDescriptor::new(*name, format!("http://{}.example/api", name)))
            .collect();
        Arc::new(ServerRegistry::new(servers).unwrap())
    }

    fn telemetry(players: i64) -> ServerTelemetry {
        ServerTelemetry {
            player_count: players,
            round_play_time_seconds: players * 10,
            ..Default::default()
        }
    }

    fn expect_server(
        mock: &mut MockUpstream,
        seq: &mut Sequence,
        name: &'static str,
        result: fn() -> squad_core::Result<ServerTelemetry>,
    ) {
        mock.expect_fetch()
            .withf(move |server, _| server.short_name == name)
            .times(1)
            .in_sequence(seq)
            .returning(move |_, _| result());
    }

    #[tokio::test]
    async fn test_cycles_follow_registry_order() {
        let mut mock = MockUpstream::new();
        let mut seq = Sequence::new();
        for _ in 0..2 {
            expect_server(&mut mock, &mut seq, "charlie", || Ok(telemetry(1)));
            expect_server(&mut mock, &mut seq, "alpha", || Ok(telemetry(2)));
            expect_server(&mut mock, &mut seq, "bravo", || Ok(telemetry(3)));
        }

        let metrics = MetricsState::new().unwrap();
        let collector = Collector::new(
            registry(&["charlie", "alpha", "bravo"]),
            Arc::new(mock),
            metrics.clone(),
        );

        let cancel = CancellationToken::new();
        assert_eq!(collector.run_cycle(&cancel).await.succeeded, 3);
        assert_eq!(collector.run_cycle(&cancel).await.succeeded, 3);
        assert_eq!(metrics.snapshot().cycles_completed, 2);
    }

    #[tokio::test]
    async fn test_failure_does_not_stop_cycle() {
        let mut mock = MockUpstream::new();
        let mut seq = Sequence::new();
        expect_server(&mut mock, &mut seq, "s1", || Ok(telemetry(10)));
        expect_server(&mut mock, &mut seq, "s2", || Err(FetchError::BadStatus(503)));
        expect_server(&mut mock, &mut seq, "s3", || {
            Err(FetchError::Transport("connection reset".to_string()))
        });
        expect_server(&mut mock, &mut seq, "s4", || Ok(telemetry(40)));

        let metrics = MetricsState::new().unwrap();
        let collector = Collector::new(
            registry(&["s1", "s2", "s3", "s4"]),
            Arc::new(mock),
            metrics.clone(),
        );

        let report = collector.run_cycle(&CancellationToken::new()).await;
        assert_eq!(report.succeeded, 2);
        assert_eq!(report.failed, 2);
        assert_eq!(report.attempted(), 4);
        assert!(!report.cancelled);

        let snapshot = metrics.snapshot();
        assert_eq!(snapshot.player_count("s1"), Some(10));
        assert_eq!(snapshot.player_count("s4"), Some(40));
        assert_eq!(snapshot.error_count("s2"), 1);
        assert_eq!(snapshot.error_count("s3"), 1);
        assert_eq!(snapshot.error_count("s1"), 0);
        assert_eq!(snapshot.player_count("s2"), None);
    }

    #[tokio::test]
    async fn test_failure_keeps_previous_telemetry() {
        let mut mock = MockUpstream::new();
        let mut seq = Sequence::new();
        expect_server(&mut mock, &mut seq, "s1", || Ok(telemetry(24)));
        expect_server(&mut mock, &mut seq, "s1", || Err(FetchError::BadStatus(500)));
        expect_server(&mut mock, &mut seq, "s1", || Err(FetchError::BadStatus(500)));

        let metrics = MetricsState::new().unwrap();
        let collector = Collector::new(registry(&["s1"]), Arc::new(mock), metrics.clone());
        let cancel = CancellationToken::new();

        collector.run_cycle(&cancel).await;
        for expected_errors in 1..=2 {
            collector.run_cycle(&cancel).await;
            let snapshot = metrics.snapshot();
            assert_eq!(snapshot.error_count("s1"), expected_errors);
            assert_eq!(snapshot.player_count("s1"), Some(24));
            assert_eq!(snapshot.round_play_time("s1"), Some(240));
        }
    }

    #[tokio::test]
    async fn test_cancellation_stops_cycle_without_counting() {
        let mut mock = MockUpstream::new();
        mock.expect_fetch()
            .withf(|server, _| server.short_name == "s1")
            .times(1)
            .returning(|_, _| Err(FetchError::Cancelled));

        let metrics = MetricsState::new().unwrap();
        let collector = Collector::new(registry(&["s1", "s2"]), Arc::new(mock), metrics.clone());

        let report = collector.run_cycle(&CancellationToken::new()).await;
        assert!(report.cancelled);
        assert_eq!(report.attempted(), 0);

        let snapshot = metrics.snapshot();
        assert_eq!(snapshot.error_count("s1"), 0);
        assert_eq!(snapshot.cycles_completed, 0);
    }

    const S1_BODY: &str = r#"{"data":{"attributes":{"name":"Server One","players":24,"details":{"map":"Narva","gameMode":"AAS","squad_playTime":930,"squad_teamOne":"USA","squad_teamTwo":"RGF"}}}}"#;

    async fn spawn_upstream() -> SocketAddr {
        let app = Router::new()
            .route("/ok", get(|| async { S1_BODY }))
            .route(
                "/down",
                get(|| async {
                    tokio::time::sleep(Duration::from_secs(5)).await;
                    S1_BODY
                }),
            )
            .route("/malformed", get(|| async { r#"{"data": {"attributes": "#}))
            .route("/error", get(|| async { StatusCode::INTERNAL_SERVER_ERROR }));

        let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        tokio::spawn(async move {
            axum::serve(listener, app).await.unwrap();
        });
        addr
    }

    fn http_collector(addr: SocketAddr, servers: &[(&str, &str)], metrics: MetricsState) -> Collector {
        let servers = servers
            .iter()
            .map(|(name, path)| ServerDescriptor::new(*name, format!("http://{}{}", addr, path)))
            .collect();
        let limiter = Arc::new(RateLimiter::new(Duration::from_millis(1), 10));
        let fetcher = HttpFetcher::new(limiter, Duration::from_millis(300)).unwrap();
        Collector::new(
            Arc::new(ServerRegistry::new(servers).unwrap()),
            Arc::new(fetcher),
            metrics,
        )
    }

    #[tokio::test]
    async fn test_ok_and_timed_out_server() {
        let addr = spawn_upstream().await;
        let metrics = MetricsState::new().unwrap();
        let collector = http_collector(addr, &[("s1", "/ok"), ("s2", "/down")], metrics.clone());

        let report = collector.run_cycle(&CancellationToken::new()).await;
        assert_eq!(report.succeeded, 1);
        assert_eq!(report.failed, 1);

        let snapshot = metrics.snapshot();
        assert_eq!(snapshot.player_count("s1"), Some(24));
        assert_eq!(snapshot.round_play_time("s1"), Some(930));
        assert_eq!(snapshot.error_count("s2"), 1);
        assert_eq!(snapshot.player_count("s2"), None);
    }

    #[tokio::test]
    async fn test_malformed_body_is_isolated() {
        let addr = spawn_upstream().await;
        let metrics = MetricsState::new().unwrap();
        let collector = http_collector(
            addr,
            &[("s1", "/malformed"), ("s2", "/ok"), ("s3", "/error")],
            metrics.clone(),
        );

        let report = collector.run_cycle(&CancellationToken::new()).await;
        assert_eq!(report.succeeded, 1);
        assert_eq!(report.failed, 2);

        let snapshot = metrics.snapshot();
        assert_eq!(snapshot.error_count("s1"), 1);
        assert_eq!(snapshot.player_count("s1"), None);
        assert_eq!(snapshot.player_count("s2"), Some(24));
        assert_eq!(snapshot.error_count("s2"), 0);
        assert_eq!(snapshot.error_count("s3"), 1);
        assert_eq!(snapshot.cycles_completed, 1);
    }
}
