// ── Action payloads ──
//
// Shortcuts and modes carry a fixed `{device: {...}, room: {...}}` action
// graph. Timers are looser: their `action` field is a number (shortcut
// to trigger), a string (mode to switch to) or an inline graph. The
// decoder below inspects the runtime shape and produces one variant.

use std::collections::BTreeMap;

use serde::{Deserialize, Deserializer, Serialize, Serializer};
use serde_json::{Map, Value};

use super::null_as_default;
use crate::error::Error;

/// Opaque key/value parameters applied to one device or room.
pub type ActionParams = Map<String, Value>;

// ── CustomAction ────────────────────────────────────────────────────

/// Inline action graph keyed by numeric device / room identifiers.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct CustomAction {
    #[serde(default, deserialize_with = "null_as_default")]
    pub device: BTreeMap<i64, ActionParams>,
    #[serde(default, deserialize_with = "null_as_default")]
    pub room: BTreeMap<i64, ActionParams>,
}

impl CustomAction {
    pub fn is_empty(&self) -> bool {
        self.device.is_empty() && self.room.is_empty()
    }
}

// ── ActionSpec ──────────────────────────────────────────────────────

/// What a timer does when it fires.
///
/// Decoded from a single untyped wire field; exactly one variant is
/// produced. Serializes back to the same wire shape.
#[derive(Debug, Clone, PartialEq)]
pub enum ActionSpec {
    /// Run an existing shortcut.
    ShortcutRef { shortcut_id: i64 },
    /// Switch the house to a mode.
    ModeRef { mode_id: String },
    /// Apply an inline action graph.
    Custom(CustomAction),
}

impl ActionSpec {
    /// Decode an `action` value by its runtime JSON type.
    ///
    /// - number: shortcut id, truncated toward zero when fractional
    /// - string: mode id
    /// - object: custom graph under `room` / `device`; every key must be an
    ///   integer, entries whose value is not an object are skipped
    /// - anything else: error
    pub fn decode(value: &Value) -> Result<Self, Error> {
        match value {
            Value::Number(n) => Ok(Self::ShortcutRef {
                shortcut_id: shortcut_id(n)?,
            }),
            Value::String(s) => Ok(Self::ModeRef {
                mode_id: s.clone(),
            }),
            Value::Object(action) => Ok(Self::Custom(CustomAction {
                room: decode_targets(action, "room")?,
                device: decode_targets(action, "device")?,
            })),
            Value::Null | Value::Bool(_) | Value::Array(_) => {
                Err(Error::decode("invalid action structure"))
            }
        }
    }

    /// Wire tag of the variant: `"shortcut"`, `"mode"` or `"custom"`.
    pub fn kind(&self) -> &'static str {
        match self {
            Self::ShortcutRef { .. } => "shortcut",
            Self::ModeRef { .. } => "mode",
            Self::Custom(_) => "custom",
        }
    }

    pub fn as_shortcut(&self) -> Option<i64> {
        match self {
            Self::ShortcutRef { shortcut_id } => Some(*shortcut_id),
            _ => None,
        }
    }

    pub fn as_mode(&self) -> Option<&str> {
        match self {
            Self::ModeRef { mode_id } => Some(mode_id),
            _ => None,
        }
    }

    pub fn as_custom(&self) -> Option<&CustomAction> {
        match self {
            Self::Custom(action) => Some(action),
            _ => None,
        }
    }
}

impl<'de> Deserialize<'de> for ActionSpec {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: Deserializer<'de>,
    {
        let value = Value::deserialize(deserializer)?;
        Self::decode(&value).map_err(serde::de::Error::custom)
    }
}

impl Serialize for ActionSpec {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        match self {
            Self::ShortcutRef { shortcut_id } => serializer.serialize_i64(*shortcut_id),
            Self::ModeRef { mode_id } => serializer.serialize_str(mode_id),
            Self::Custom(action) => action.serialize(serializer),
        }
    }
}

// ── Decoding helpers ────────────────────────────────────────────────

/// Integers pass through; floats of either precision arrive as `f64`
/// and are truncated.
#[allow(
    clippy::cast_possible_truncation,
    clippy::cast_precision_loss,
    clippy::as_conversions
)]
fn shortcut_id(n: &serde_json::Number) -> Result<i64, Error> {
    if let Some(i) = n.as_i64() {
        return Ok(i);
    }
    if let Some(f) = n.as_f64() {
        let t = f.trunc();
        if t.is_finite() && t >= i64::MIN as f64 && t < i64::MAX as f64 {
            return Ok(t as i64);
        }
    }
    Err(Error::decode(format!("shortcut id {n} is out of range")))
}

fn decode_targets(
    action: &Map<String, Value>,
    key: &str,
) -> Result<BTreeMap<i64, ActionParams>, Error> {
    let mut targets = BTreeMap::new();

    let entries = match action.get(key) {
        None | Some(Value::Null) => return Ok(targets),
        Some(Value::Object(entries)) => entries,
        Some(other) => {
            return Err(Error::decode(format!(
                "action.{key} must be an object, got {other}"
            )));
        }
    };

    for (raw_id, params) in entries {
        // Malformed entries are tolerated and dropped.
        let Value::Object(params) = params else {
            continue;
        };
        let id = raw_id.parse::<i64>().map_err(|_| {
            Error::decode(format!("action.{key} key {raw_id:?} is not an integer id"))
        })?;
        targets.insert(id, params.clone());
    }

    Ok(targets)
}
