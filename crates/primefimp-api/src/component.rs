// ── Command verbs, component categories and identifiers ──
//
// Every request, reply and notification on the hub bus is addressed by a
// (command, component) pair. Component identifiers are numeric for most
// records but modes are keyed by name, so `ComponentId` accepts both.

use std::fmt;

use serde::{Deserialize, Serialize};
use strum::{AsRefStr, Display, EnumIter, EnumString};

// ── Command ─────────────────────────────────────────────────────────

/// Verb carried by requests and change notifications.
#[derive(
    Debug,
    Clone,
    Copy,
    PartialEq,
    Eq,
    Hash,
    Serialize,
    Deserialize,
    Display,
    EnumString,
    AsRefStr,
    EnumIter,
)]
#[serde(rename_all = "lowercase")]
#[strum(serialize_all = "lowercase")]
pub enum Command {
    Get,
    Set,
    Add,
    Edit,
    Delete,
}

// ── ComponentType ───────────────────────────────────────────────────

/// Category of hub object a request or notification concerns.
#[derive(
    Debug,
    Clone,
    Copy,
    PartialEq,
    Eq,
    Hash,
    PartialOrd,
    Ord,
    Serialize,
    Deserialize,
    Display,
    EnumString,
    AsRefStr,
    EnumIter,
)]
#[serde(rename_all = "lowercase")]
#[strum(serialize_all = "lowercase")]
pub enum ComponentType {
    Device,
    Thing,
    Room,
    Area,
    House,
    Hub,
    Shortcut,
    Mode,
    Timer,
}

impl ComponentType {
    /// Every component that makes up a full site snapshot, in fetch order.
    pub const SITE: [ComponentType; 9] = [
        Self::Device,
        Self::Thing,
        Self::Room,
        Self::Area,
        Self::House,
        Self::Hub,
        Self::Shortcut,
        Self::Mode,
        Self::Timer,
    ];
}

// ── ComponentId ─────────────────────────────────────────────────────

/// Identifier of a single hub object.
///
/// Devices, rooms, areas, things, shortcuts and timers use integers;
/// modes use their name (`"home"`, `"away"`, ...).
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(untagged)]
pub enum ComponentId {
    Number(i64),
    Name(String),
}

impl ComponentId {
    pub fn as_number(&self) -> Option<i64> {
        match self {
            Self::Number(n) => Some(*n),
            Self::Name(_) => None,
        }
    }

    pub fn as_name(&self) -> Option<&str> {
        match self {
            Self::Name(s) => Some(s),
            Self::Number(_) => None,
        }
    }
}

impl fmt::Display for ComponentId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Number(n) => write!(f, "{n}"),
            Self::Name(s) => write!(f, "{s}"),
        }
    }
}

impl From<i64> for ComponentId {
    fn from(n: i64) -> Self {
        Self::Number(n)
    }
}

impl From<String> for ComponentId {
    fn from(s: String) -> Self {
        Self::Name(s)
    }
}

impl From<&str> for ComponentId {
    fn from(s: &str) -> Self {
        Self::Name(s.to_owned())
    }
}
