use crate::error::FetchError;
use serde::{Deserialize, Deserializer, Serialize};

/// Telemetry decoded from one successful status fetch.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq, Eq)]
pub struct ServerTelemetry {
    pub full_name: String,
    pub player_count: i64,
    pub map: String,
    pub game_mode: String,
    pub round_play_time_seconds: i64,
    pub team_one: String,
    pub team_two: String,
}

impl ServerTelemetry {
    /// Decodes the `data.attributes` envelope. The envelope itself is required;
    /// any field inside it may be missing or `null` and falls back to its default.
    pub fn from_json(body: &[u8]) -> Result<Self, FetchError> {
        let response: StatusResponse = serde_json::from_slice(body)?;
        Ok(response.into())
    }
}

#[derive(Debug, Deserialize)]
struct StatusResponse {
    data: StatusData,
}

#[derive(Debug, Deserialize)]
struct StatusData {
    attributes: StatusAttributes,
}

#[derive(Debug, Default, Deserialize)]
struct StatusAttributes {
    #[serde(default, deserialize_with = "nullable")]
    name: String,
    #[serde(default, deserialize_with = "nullable")]
    players: i64,
    #[serde(default, deserialize_with = "nullable")]
    details: StatusDetails,
}

#[derive(Debug, Default, Deserialize)]
struct StatusDetails {
    #[serde(default, deserialize_with = "nullable")]
    map: String,
    #[serde(rename = "gameMode", default, deserialize_with = "nullable")]
    game_mode: String,
    #[serde(rename = "squad_playTime", default, deserialize_with = "nullable")]
    play_time: i64,
    #[serde(rename = "squad_teamOne", default, deserialize_with = "nullable")]
    team_one: String,
    #[serde(rename = "squad_teamTwo", default, deserialize_with = "nullable")]
    team_two: String,
}

impl From<StatusResponse> for ServerTelemetry {
    fn from(response: StatusResponse) -> Self {
        let attrs = response.data.attributes;
        Self {
            full_name: attrs.name,
            player_count: attrs.players,
            map: attrs.details.map,
            game_mode: attrs.details.game_mode,
            round_play_time_seconds: attrs.details.play_time,
            team_one: attrs.details.team_one,
            team_two: attrs.details.team_two,
        }
    }
}

fn nullable<'de, D, T>(deserializer: D) -> Result<T, D::Error>
where
    D: Deserializer<'de>,
    T: Default + Deserialize<'de>,
{
    Ok(Option::<T>::deserialize(deserializer)?.unwrap_or_default())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_decode_full_response() {
        let body = br#"{
            "data": {
                "type": "server",
                "id": "1",
                "attributes": {
                    "name": "[EU] Squad Server One",
                    "players": 24,
                    "maxPlayers": 100,
                    "details": {
                        "map": "Gorodok",
                        "gameMode": "RAAS",
                        "squad_playTime": 930,
                        "squad_teamOne": "USA",
                        "squad_teamTwo": "RGF"
                    }
                }
            }
        }"#;

        let telemetry = ServerTelemetry::from_json(body).unwrap();
        assert_eq!(
            telemetry,
            ServerTelemetry {
                full_name: "[EU] Squad Server One".to_string(),
                player_count: 24,
                map: "Gorodok".to_string(),
                game_mode: "RAAS".to_string(),
                round_play_time_seconds: 930,
                team_one: "USA".to_string(),
                team_two: "RGF".to_string(),
            }
        );
    }

    #[test]
    fn test_missing_and_null_fields_default() {
        let body = br#"{"data":{"attributes":{"players":7,"details":{"map":null,"squad_teamOne":null}}}}"#;
        let telemetry = ServerTelemetry::from_json(body).unwrap();

        assert_eq!(telemetry.player_count, 7);
        assert_eq!(telemetry.full_name, "");
        assert_eq!(telemetry.map, "");
        assert_eq!(telemetry.round_play_time_seconds, 0);
        assert_eq!(telemetry.team_one, "");

        let telemetry =
            ServerTelemetry::from_json(br#"{"data":{"attributes":{"details":null}}}"#).unwrap();
        assert_eq!(telemetry, ServerTelemetry::default());
    }

    #[test]
    fn test_malformed_bodies_are_decode_errors() {
        let bodies: [&[u8]; 4] = [
            b"{not json",
            br#"{"errors":[{"title":"Unknown Server"}]}"#,
            br#"{"data":null}"#,
            br#"{"data":{"attributes":{"players":"many"}}}"#,
        ];
        for body in bodies {
            let err = ServerTelemetry::from_json(body).unwrap_err();
            assert!(matches!(err, FetchError::Decode(_)), "body: {:?}", body);
        }
    }
}
