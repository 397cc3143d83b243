//! Boundary with the publish/subscribe transport.
//!
//! The hub speaks over a message bus, not request/reply. Connection
//! management, topics, QoS and framing live in the transport; the client
//! only needs to publish [`Request`]s and observe two inbound streams:
//! replies and change notifications.
//!
//! Inbound streams are [`tokio::sync::broadcast`] channels so several
//! consumers (the reply correlator, the notify router) can attach without
//! coordinating. A consumer that falls behind receives
//! [`broadcast::error::RecvError::Lagged`].

mod memory;

use std::sync::Arc;

use tokio::sync::broadcast;

use crate::envelope::{NotifyEvent, Request, Response};
use crate::error::Error;

pub use memory::MemoryTransport;

/// A connected hub transport.
pub trait Transport: Send + Sync + 'static {
    /// Publish a request. Returns once the transport has accepted it; the
    /// reply, if any, arrives on [`subscribe_responses`](Self::subscribe_responses).
    fn publish(&self, request: &Request) -> Result<(), Error>;

    /// Stream of replies to requests published by this client.
    fn subscribe_responses(&self) -> broadcast::Receiver<Arc<Response>>;

    /// Stream of change notifications pushed by the hub.
    fn subscribe_notifications(&self) -> broadcast::Receiver<Arc<NotifyEvent>>;
}
