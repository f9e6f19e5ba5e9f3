use crate::info::{ServerInfo, ServerInfoCollector};
use crate::names;
use crate::snapshot::MetricsSnapshot;
use prometheus::proto::MetricFamily;
use prometheus::{Gauge, GaugeVec, IntCounter, IntCounterVec, IntGaugeVec, Opts, Registry};
use squad_core::ServerTelemetry;
use std::time::Duration;
use tracing::debug;

/// Latest telemetry per server, backed by a private Prometheus registry.
///
/// Clones share the same series. Every value is updated atomically on its
/// own; a reader may see a new player count next to the previous map name
/// while a server is being recorded.
#[derive(Clone)]
pub struct MetricsState {
    registry: Registry,
    player_count: IntGaugeVec,
    play_time: IntGaugeVec,
    server_info: ServerInfoCollector,
    scrape_errors: IntCounterVec,
    last_success: GaugeVec,
    cycles_total: IntCounter,
    cycle_duration: Gauge,
}

impl MetricsState {
    pub fn new() -> prometheus::Result<Self> {
        let registry = Registry::new();

        let player_count = IntGaugeVec::new(
            Opts::new(names::PLAYER_COUNT, "Number of players on the squad server"),
            &[names::SERVER_SHORT_NAME],
        )?;
        let play_time = IntGaugeVec::new(
            Opts::new(names::PLAY_TIME_SECONDS, "Current round play time in seconds"),
            &[names::SERVER_SHORT_NAME],
        )?;
        let server_info = ServerInfoCollector::new()?;
        let scrape_errors = IntCounterVec::new(
            Opts::new(names::SCRAPE_ERRORS_TOTAL, "Total number of scrape errors"),
            &[names::SERVER_NAME],
        )?;
        let last_success = GaugeVec::new(
            Opts::new(
                names::LAST_SUCCESS_TIMESTAMP,
                "Unix time of the last successful status fetch",
            ),
            &[names::SERVER_SHORT_NAME],
        )?;
        let cycles_total = IntCounter::new(names::CYCLES_TOTAL, "Completed collection cycles")?;
        let cycle_duration = Gauge::new(
            names::CYCLE_DURATION_SECONDS,
            "Duration of the last collection cycle in seconds",
        )?;

        registry.register(Box::new(player_count.clone()))?;
        registry.register(Box::new(play_time.clone()))?;
        registry.register(Box::new(server_info.clone()))?;
        registry.register(Box::new(scrape_errors.clone()))?;
        registry.register(Box::new(last_success.clone()))?;
        registry.register(Box::new(cycles_total.clone()))?;
        registry.register(Box::new(cycle_duration.clone()))?;

        Ok(Self {
            registry,
            player_count,
            play_time,
            server_info,
            scrape_errors,
            last_success,
            cycles_total,
            cycle_duration,
        })
    }

    /// Exposes the error counter of `short_name` at zero before its first failure.
    pub fn track_server(&self, short_name: &str) {
        self.scrape_errors.with_label_values(&[short_name]);
    }

    /// Replaces the stored telemetry of `short_name`.
    pub fn record(&self, short_name: &str, telemetry: &ServerTelemetry) {
        self.player_count
            .with_label_values(&[short_name])
            .set(telemetry.player_count);
        self.play_time
            .with_label_values(&[short_name])
            .set(telemetry.round_play_time_seconds);
        self.server_info.set(short_name, ServerInfo::from(telemetry));
        self.last_success
            .with_label_values(&[short_name])
            .set(chrono::Utc::now().timestamp_millis() as f64 / 1000.0);

        debug!(
            server = %short_name,
            players = telemetry.player_count,
            map = %telemetry.map,
            "Recorded server telemetry"
        );
    }

    /// Counts one failed fetch. Telemetry series are left untouched.
    pub fn record_error(&self, short_name: &str) {
        self.scrape_errors.with_label_values(&[short_name]).inc();
    }

    pub fn record_cycle(&self, duration: Duration) {
        self.cycles_total.inc();
        self.cycle_duration.set(duration.as_secs_f64());
    }

    pub fn snapshot(&self) -> MetricsSnapshot {
        MetricsSnapshot::from_families(&self.gather())
    }

    pub fn gather(&self) -> Vec<MetricFamily> {
        self.registry.gather()
    }
}
