// ── Site aggregate ──
//
// The hub's full object graph as returned by one aggregate `get`. Held
// by the client as an immutable snapshot and replaced wholesale.

use serde::{Deserialize, Serialize};
use serde_json::Value;

use super::automation::{Mode, Shortcut, Timer};
use super::device::{Device, Thing};
use super::null_as_default;
use super::room::{Area, House, Hub, Room};
use crate::error::Error;

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Site {
    #[serde(rename = "device", deserialize_with = "null_as_default")]
    pub devices: Vec<Device>,
    #[serde(rename = "thing", deserialize_with = "null_as_default")]
    pub things: Vec<Thing>,
    #[serde(rename = "room", deserialize_with = "null_as_default")]
    pub rooms: Vec<Room>,
    #[serde(rename = "area", deserialize_with = "null_as_default")]
    pub areas: Vec<Area>,
    pub house: Option<House>,
    pub hub: Option<Hub>,
    #[serde(rename = "shortcut", deserialize_with = "null_as_default")]
    pub shortcuts: Vec<Shortcut>,
    #[serde(rename = "mode", deserialize_with = "null_as_default")]
    pub modes: Vec<Mode>,
    #[serde(rename = "timer", deserialize_with = "null_as_default")]
    pub timers: Vec<Timer>,
}

impl Site {
    /// Decode the `param` of an aggregate `get` reply.
    ///
    /// A `null` payload yields an empty site. Any malformed component,
    /// including a timer with an undecodable action, fails the whole site.
    pub fn from_param(param: Value) -> Result<Self, Error> {
        if param.is_null() {
            return Ok(Self::default());
        }
        serde_json::from_value(param).map_err(|e| Error::decode(format!("site payload: {e}")))
    }

    /// `true` when the hub reported nothing at all.
    pub fn is_empty(&self) -> bool {
        self.devices.is_empty()
            && self.things.is_empty()
            && self.rooms.is_empty()
            && self.areas.is_empty()
            && self.house.is_none()
            && self.hub.is_none()
            && self.shortcuts.is_empty()
            && self.modes.is_empty()
            && self.timers.is_empty()
    }

    // ── Whole-record lookups ─────────────────────────────────────────

    pub fn device(&self, id: i64) -> Option<&Device> {
        self.devices.iter().find(|d| d.id == id)
    }

    pub fn thing(&self, id: i64) -> Option<&Thing> {
        self.things.iter().find(|t| t.id == id)
    }

    pub fn room(&self, id: i64) -> Option<&Room> {
        self.rooms.iter().find(|r| r.id == id)
    }

    pub fn area(&self, id: i64) -> Option<&Area> {
        self.areas.iter().find(|a| a.id == id)
    }

    pub fn shortcut(&self, id: i64) -> Option<&Shortcut> {
        self.shortcuts.iter().find(|s| s.id == id)
    }

    pub fn mode(&self, id: &str) -> Option<&Mode> {
        self.modes.iter().find(|m| m.id == id)
    }

    pub fn timer(&self, id: i64) -> Option<&Timer> {
        self.timers.iter().find(|t| t.id == id)
    }

    pub fn devices_in_room(&self, room_id: i64) -> impl Iterator<Item = &Device> {
        self.devices.iter().filter(move |d| d.room == Some(room_id))
    }
}
