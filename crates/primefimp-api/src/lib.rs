//! Wire layer for the Futurehome Prime FIMP hub API.
//!
//! The hub exposes its object graph over a publish/subscribe bus. This
//! crate holds everything that describes what travels on that bus:
//!
//! - **Envelopes** ([`Request`], [`Response`], [`NotifyEvent`]) addressed by
//!   [`Command`] and [`ComponentType`].
//! - **Records** ([`model`]) for devices, things, rooms, areas, the house,
//!   the hub, shortcuts, modes and timers, aggregated into a [`Site`].
//! - **[`ActionSpec`]**, the decoder for the polymorphic `action` field of
//!   timers.
//! - **[`Transport`]**, the seam to the underlying bus, plus an in-process
//!   [`MemoryTransport`].
//!
//! Correlation, caching and notification fan-out live in `primefimp-core`.

pub mod component;
pub mod envelope;
pub mod error;
pub mod model;
pub mod transport;

pub use component::{Command, ComponentId, ComponentType};
pub use envelope::{NotifyEvent, Request, RequestParam, Response};
pub use error::Error;
pub use model::{
    ActionParams, ActionSpec, Area, ClientName, CustomAction, Device, Fimp, House, Hub, HubMode,
    Mode, Room, Service, Shortcut, Site, Thing, Timer,
};
pub use transport::{MemoryTransport, Transport};
