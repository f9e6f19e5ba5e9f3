//! Series and label names. These are scraped by external dashboards, so they never change.

pub const PLAYER_COUNT: &str = "sqts_squad_player_count";
pub const PLAY_TIME_SECONDS: &str = "sqts_squad_play_time_seconds";
pub const SERVER_INFO: &str = "sqts_squad_server_info";
pub const SCRAPE_ERRORS_TOTAL: &str = "squad_server_scrape_errors_total";
pub const LAST_SUCCESS_TIMESTAMP: &str = "sqts_squad_last_success_timestamp_seconds";
pub const CYCLES_TOTAL: &str = "sqts_collection_cycles_total";
pub const CYCLE_DURATION_SECONDS: &str = "sqts_collection_cycle_duration_seconds";

pub const SERVER_SHORT_NAME: &str = "server_short_name";
/// The error counter is labelled `server_name`, unlike the other per-server series.
pub const SERVER_NAME: &str = "server_name";

pub const INFO_LABELS: [&str; 6] = [
    SERVER_SHORT_NAME,
    "server_full_name",
    "map_name",
    "game_mode",
    "team_one",
    "team_two",
];
