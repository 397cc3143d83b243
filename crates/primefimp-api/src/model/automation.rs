// ── Shortcuts, modes and timers ──

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

use super::action::{ActionSpec, CustomAction};
use super::device::ClientName;
use super::null_as_default;

/// A named action graph the user can trigger.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Shortcut {
    #[serde(deserialize_with = "null_as_default")]
    pub id: i64,
    #[serde(deserialize_with = "null_as_default")]
    pub client: ClientName,
    #[serde(deserialize_with = "null_as_default")]
    pub action: CustomAction,
}

/// A house mode (`home`, `away`, `sleep`, `vacation`) and what it applies.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Mode {
    #[serde(deserialize_with = "null_as_default")]
    pub id: String,
    #[serde(deserialize_with = "null_as_default")]
    pub action: CustomAction,
}

/// Time-based schedule.
///
/// `action` is polymorphic on the wire; see [`ActionSpec::decode`]. A
/// timer whose action cannot be decoded fails to deserialize as a whole.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Timer {
    #[serde(default, deserialize_with = "null_as_default")]
    pub id: i64,
    pub action: ActionSpec,
    #[serde(default, deserialize_with = "null_as_default")]
    pub client: ClientName,
    #[serde(default, deserialize_with = "null_as_default")]
    pub enabled: bool,
    #[serde(default, deserialize_with = "null_as_default")]
    pub time: Map<String, Value>,
}
