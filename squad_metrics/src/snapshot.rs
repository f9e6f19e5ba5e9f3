use crate::info::ServerInfo;
use crate::names;
use prometheus::proto::{Metric, MetricFamily};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// Latest known values for one server. `None` means nothing was recorded yet.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
pub struct ServerSnapshot {
    pub player_count: Option<i64>,
    pub round_play_time_seconds: Option<i64>,
    pub info: Option<ServerInfo>,
    pub errors: u64,
    pub last_success_timestamp: Option<f64>,
}

/// Read-only view of the metrics state, keyed by short name.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
pub struct MetricsSnapshot {
    pub servers: BTreeMap<String, ServerSnapshot>,
    pub cycles_completed: u64,
    pub last_cycle_duration_seconds: f64,
}

impl MetricsSnapshot {
    pub fn server(&self, short_name: &str) -> Option<&ServerSnapshot> {
        self.servers.get(short_name)
    }

    pub fn player_count(&self, short_name: &str) -> Option<i64> {
        self.server(short_name).and_then(|s| s.player_count)
    }

    pub fn round_play_time(&self, short_name: &str) -> Option<i64> {
        self.server(short_name).and_then(|s| s.round_play_time_seconds)
    }

    pub fn error_count(&self, short_name: &str) -> u64 {
        self.server(short_name).map_or(0, |s| s.errors)
    }

    pub(crate) fn from_families(families: &[MetricFamily]) -> Self {
        let mut snapshot = Self::default();

        for family in families {
            match family.get_name() {
                names::PLAYER_COUNT => {
                    for (server, metric) in by_label(family, names::SERVER_SHORT_NAME) {
                        snapshot.entry(server).player_count =
                            Some(metric.get_gauge().get_value() as i64);
                    }
                }
                names::PLAY_TIME_SECONDS => {
                    for (server, metric) in by_label(family, names::SERVER_SHORT_NAME) {
                        snapshot.entry(server).round_play_time_seconds =
                            Some(metric.get_gauge().get_value() as i64);
                    }
                }
                names::LAST_SUCCESS_TIMESTAMP => {
                    for (server, metric) in by_label(family, names::SERVER_SHORT_NAME) {
                        snapshot.entry(server).last_success_timestamp =
                            Some(metric.get_gauge().get_value());
                    }
                }
                names::SCRAPE_ERRORS_TOTAL => {
                    for (server, metric) in by_label(family, names::SERVER_NAME) {
                        snapshot.entry(server).errors = metric.get_counter().get_value() as u64;
                    }
                }
                names::SERVER_INFO => {
                    for (server, metric) in by_label(family, names::SERVER_SHORT_NAME) {
                        snapshot.entry(server).info = Some(ServerInfo {
                            full_name: label(metric, "server_full_name").to_string(),
                            map: label(metric, "map_name").to_string(),
                            game_mode: label(metric, "game_mode").to_string(),
                            team_one: label(metric, "team_one").to_string(),
                            team_two: label(metric, "team_two").to_string(),
                        });
                    }
                }
                names::CYCLES_TOTAL => {
                    if let Some(metric) = family.get_metric().first() {
                        snapshot.cycles_completed = metric.get_counter().get_value() as u64;
                    }
                }
                names::CYCLE_DURATION_SECONDS => {
                    if let Some(metric) = family.get_metric().first() {
                        snapshot.last_cycle_duration_seconds = metric.get_gauge().get_value();
                    }
                }
                _ => {}
            }
        }

        snapshot
    }

    fn entry(&mut self, short_name: &str) -> &mut ServerSnapshot {
        self.servers.entry(short_name.to_string()).or_default()
    }
}

fn by_label<'a>(
    family: &'a MetricFamily,
    label_name: &'a str,
) -> impl Iterator<Item = (&'a str, &'a Metric)> + 'a {
    family
        .get_metric()
        .iter()
        .map(move |metric| (label(metric, label_name), metric))
}

fn label<'a>(metric: &'a Metric, name: &str) -> &'a str {
    metric
        .get_label()
        .iter()
        .find(|l| l.get_name() == name)
        .map(|l| l.get_value())
        .unwrap_or_default()
}
