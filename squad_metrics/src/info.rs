use crate::names::{INFO_LABELS, SERVER_INFO};
use prometheus::core::{Collector, Desc};
use prometheus::proto::MetricFamily;
use prometheus::{GaugeVec, Opts};
use serde::{Deserialize, Serialize};
use squad_core::ServerTelemetry;
use std::collections::BTreeMap;
use std::sync::{Arc, RwLock};

/// Descriptive labels of one server, exposed with a constant value of 1.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq, Eq)]
pub struct ServerInfo {
    pub full_name: String,
    pub map: String,
    pub game_mode: String,
    pub team_one: String,
    pub team_two: String,
}

impl From<&ServerTelemetry> for ServerInfo {
    fn from(telemetry: &ServerTelemetry) -> Self {
        Self {
            full_name: telemetry.full_name.clone(),
            map: telemetry.map.clone(),
            game_mode: telemetry.game_mode.clone(),
            team_one: telemetry.team_one.clone(),
            team_two: telemetry.team_two.clone(),
        }
    }
}

/// Info family holding exactly one label set per server.
///
/// A plain `GaugeVec` would keep the old label set alive after the map
/// changes, so this collector renders the family from its own map on every
/// scrape. Each scrape sees either the old or the new labels of a server.
#[derive(Clone)]
pub struct ServerInfoCollector {
    opts: Opts,
    template: GaugeVec,
    entries: Arc<RwLock<BTreeMap<String, ServerInfo>>>,
}

impl ServerInfoCollector {
    pub fn new() -> prometheus::Result<Self> {
        let opts = Opts::new(SERVER_INFO, "Server information and metadata");
        let template = GaugeVec::new(opts.clone(), &INFO_LABELS)?;

        Ok(Self {
            opts,
            template,
            entries: Arc::new(RwLock::new(BTreeMap::new())),
        })
    }

    /// Replaces the label set of `short_name`.
    pub fn set(&self, short_name: &str, info: ServerInfo) {
        let mut entries = self.entries.write().unwrap_or_else(|e| e.into_inner());
        entries.insert(short_name.to_string(), info);
    }

}

impl Collector for ServerInfoCollector {
    fn desc(&self) -> Vec<&Desc> {
        self.template.desc()
    }

    fn collect(&self) -> Vec<MetricFamily> {
        let family = match GaugeVec::new(self.opts.clone(), &INFO_LABELS) {
            Ok(family) => family,
            Err(_) => return Vec::new(),
        };

        let entries = self.entries.read().unwrap_or_else(|e| e.into_inner());
        for (short_name, info) in entries.iter() {
            family
                .with_label_values(&[
                    short_name.as_str(),
                    info.full_name.as_str(),
                    info.map.as_str(),
                    info.game_mode.as_str(),
                    info.team_one.as_str(),
                    info.team_two.as_str(),
                ])
                .set(1.0);
        }

        family.collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn info(map: &str) -> ServerInfo {
        ServerInfo {
            full_name: "Server One".to_string(),
            map: map.to_string(),
            ..Default::default()
        }
    }

    fn label_value<'a>(family: &'a MetricFamily, index: usize, name: &str) -> &'a str {
        family.get_metric()[index]
            .get_label()
            .iter()
            .find(|l| l.get_name() == name)
            .map(|l| l.get_value())
            .unwrap_or_default()
    }

    #[test]
    fn test_set_replaces_label_set() {
        let collector = ServerInfoCollector::new().unwrap();
        collector.set("s1", info("Narva"));
        collector.set("s1", info("Gorodok"));

        let families = collector.collect();
        assert_eq!(families.len(), 1);
        assert_eq!(families[0].get_metric().len(), 1);
        assert_eq!(label_value(&families[0], 0, "map_name"), "Gorodok");
        assert_eq!(families[0].get_metric()[0].get_gauge().get_value(), 1.0);
    }

    #[test]
    fn test_empty_values_keep_all_label_keys() {
        let collector = ServerInfoCollector::new().unwrap();
        collector.set("s1", ServerInfo::default());

        let families = collector.collect();
        let labels = families[0].get_metric()[0].get_label();
        let mut names: Vec<&str> = labels.iter().map(|l| l.get_name()).collect();
        names.sort_unstable();

        let mut expected = INFO_LABELS.to_vec();
        expected.sort_unstable();
        assert_eq!(names, expected);
        assert_eq!(label_value(&families[0], 0, "team_one"), "");
    }

    #[test]
    fn test_one_series_per_server() {
        let collector = ServerInfoCollector::new().unwrap();
        collector.set("s2", info("Narva"));
        collector.set("s1", info("Mutaha"));

        let families = collector.collect();
        let family = &families[0];
        assert_eq!(family.get_metric().len(), 2);

        let s2 = (0..2)
            .find(|&i| label_value(family, i, "server_short_name") == "s2")
            .unwrap();
        assert_eq!(label_value(family, s2, "map_name"), "Narva");
    }
}
