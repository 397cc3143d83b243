// ── Hub record types ──
//
// Plain attribute bags as the hub sends them. Only `ActionSpec` carries
// decoding logic; everything else is consumed as-is.

pub mod action;
pub mod automation;
pub mod device;
pub mod room;
pub mod site;

use serde::{Deserialize, Deserializer};

pub use action::{ActionParams, ActionSpec, CustomAction};
pub use automation::{Mode, Shortcut, Timer};
pub use device::{ClientName, Device, Fimp, Service, Thing};
pub use room::{Area, House, Hub, HubMode, Room, RoomHeating, RoomParams};
pub use site::Site;

/// Read an explicit `null` as the field's default value.
///
/// The hub emits `null` for empty maps, lists and name blocks;
/// `#[serde(default)]` alone only covers absent fields.
pub(crate) fn null_as_default<'de, D, T>(deserializer: D) -> Result<T, D::Error>
where
    D: Deserializer<'de>,
    T: Deserialize<'de> + Default,
{
    Ok(Option::<T>::deserialize(deserializer)?.unwrap_or_default())
}
