// ── Room, area, house and hub records ──

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::Value;

use super::device::ClientName;
use super::null_as_default;

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Room {
    #[serde(deserialize_with = "null_as_default")]
    pub id: i64,
    #[serde(deserialize_with = "null_as_default")]
    pub alias: String,
    #[serde(deserialize_with = "null_as_default")]
    pub param: RoomParams,
    #[serde(deserialize_with = "null_as_default")]
    pub client: ClientName,
    #[serde(rename = "type", deserialize_with = "null_as_default")]
    pub room_type: String,
    pub area: Option<i64>,
    #[serde(deserialize_with = "null_as_default")]
    pub outside: bool,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct RoomParams {
    #[serde(deserialize_with = "null_as_default")]
    pub heating: RoomHeating,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct RoomHeating {
    #[serde(deserialize_with = "null_as_default")]
    pub desired: f64,
    #[serde(deserialize_with = "null_as_default")]
    pub target: f64,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct Area {
    #[serde(deserialize_with = "null_as_default")]
    pub id: i64,
    #[serde(deserialize_with = "null_as_default")]
    pub name: String,
    #[serde(rename = "type", deserialize_with = "null_as_default")]
    pub area_type: String,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct House {
    pub learning: Value,
    #[serde(deserialize_with = "null_as_default")]
    pub mode: String,
    pub time: Option<DateTime<Utc>>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct HubMode {
    #[serde(deserialize_with = "null_as_default")]
    pub current: String,
    #[serde(rename = "prev", deserialize_with = "null_as_default")]
    pub previous: String,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct Hub {
    #[serde(deserialize_with = "null_as_default")]
    pub mode: HubMode,
}
