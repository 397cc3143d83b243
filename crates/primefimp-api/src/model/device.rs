// ── Device and thing records ──

use std::collections::HashMap;

use serde::{Deserialize, Serialize};
use serde_json::Value;

use super::null_as_default;

/// FIMP addressing of a device's backing adapter.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct Fimp {
    #[serde(deserialize_with = "null_as_default")]
    pub adapter: String,
    #[serde(deserialize_with = "null_as_default")]
    pub address: String,
    #[serde(deserialize_with = "null_as_default")]
    pub group: String,
}

/// User-facing name block (`{"name": "..."}`) shared by most records.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ClientName {
    #[serde(deserialize_with = "null_as_default")]
    pub name: String,
}

/// A FIMP service exposed by a device.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Service {
    #[serde(skip_serializing_if = "String::is_empty", deserialize_with = "null_as_default")]
    pub addr: String,
    #[serde(deserialize_with = "null_as_default")]
    pub enabled: bool,
    #[serde(rename = "intf", deserialize_with = "null_as_default")]
    pub interfaces: Vec<String>,
    #[serde(deserialize_with = "null_as_default")]
    pub props: HashMap<String, Value>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Device {
    #[serde(deserialize_with = "null_as_default")]
    pub id: i64,
    #[serde(deserialize_with = "null_as_default")]
    pub fimp: Fimp,
    #[serde(deserialize_with = "null_as_default")]
    pub client: ClientName,
    pub functionality: Option<String>,
    #[serde(deserialize_with = "null_as_default")]
    pub services: HashMap<String, Service>,
    #[serde(deserialize_with = "null_as_default")]
    pub lrn: bool,
    #[serde(deserialize_with = "null_as_default")]
    pub model: String,
    #[serde(deserialize_with = "null_as_default")]
    pub param: HashMap<String, Value>,
    #[serde(deserialize_with = "null_as_default")]
    pub problem: bool,
    pub room: Option<i64>,
    #[serde(deserialize_with = "null_as_default")]
    pub changes: HashMap<String, Value>,
    #[serde(rename = "thing")]
    pub thing_id: Option<i64>,
}

impl Device {
    pub fn name(&self) -> &str {
        &self.client.name
    }

    /// Look up a service by its FIMP name (e.g. `"out_bin_switch"`).
    pub fn service(&self, name: &str) -> Option<&Service> {
        self.services.get(name)
    }
}

/// Physical product that groups one or more logical devices.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct Thing {
    #[serde(deserialize_with = "null_as_default")]
    pub id: i64,
    #[serde(rename = "addr", deserialize_with = "null_as_default")]
    pub address: String,
    #[serde(deserialize_with = "null_as_default")]
    pub name: String,
    #[serde(skip_serializing_if = "Vec::is_empty", deserialize_with = "null_as_default")]
    pub devices: Vec<i64>,
    #[serde(skip_serializing_if = "HashMap::is_empty", deserialize_with = "null_as_default")]
    pub props: HashMap<String, String>,
    #[serde(rename = "room")]
    pub room_id: Option<i64>,
}
