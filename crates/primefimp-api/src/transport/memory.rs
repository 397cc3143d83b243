// ── In-process loopback transport ──
//
// Records everything published and lets the caller inject replies and
// notifications. An optional responder answers requests synchronously,
// which is enough to drive the full client without a broker.

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Mutex, PoisonError, RwLock};

use tokio::sync::broadcast;
use tracing::trace;

use super::Transport;
use crate::envelope::{NotifyEvent, Request, Response};
use crate::error::Error;

const CHANNEL_CAPACITY: usize = 256;

type Responder = Box<dyn Fn(&Request) -> Option<Response> + Send + Sync>;

/// Loopback [`Transport`] for tests, demos and offline tooling.
pub struct MemoryTransport {
    response_tx: broadcast::Sender<Arc<Response>>,
    notify_tx: broadcast::Sender<Arc<NotifyEvent>>,
    published: Mutex<Vec<Request>>,
    responder: RwLock<Option<Responder>>,
    closed: AtomicBool,
}

impl MemoryTransport {
    pub fn new() -> Self {
        let (response_tx, _) = broadcast::channel(CHANNEL_CAPACITY);
        let (notify_tx, _) = broadcast::channel(CHANNEL_CAPACITY);

        Self {
            response_tx,
            notify_tx,
            published: Mutex::new(Vec::new()),
            responder: RwLock::new(None),
            closed: AtomicBool::new(false),
        }
    }

    /// Build a transport that answers every request through `responder`.
    pub fn with_responder<F>(responder: F) -> Self
    where
        F: Fn(&Request) -> Option<Response> + Send + Sync + 'static,
    {
        let transport = Self::new();
        transport.set_responder(responder);
        transport
    }

    /// Install (or replace) the automatic responder.
    pub fn set_responder<F>(&self, responder: F)
    where
        F: Fn(&Request) -> Option<Response> + Send + Sync + 'static,
    {
        *self
            .responder
            .write()
            .unwrap_or_else(PoisonError::into_inner) = Some(Box::new(responder));
    }

    /// Remove the automatic responder; requests go unanswered.
    pub fn clear_responder(&self) {
        *self
            .responder
            .write()
            .unwrap_or_else(PoisonError::into_inner) = None;
    }

    /// Push a reply onto the response stream. Returns the number of
    /// subscribers that received it.
    pub fn inject_response(&self, response: Response) -> usize {
        self.response_tx.send(Arc::new(response)).unwrap_or(0)
    }

    /// Push a notification onto the notify stream. Returns the number of
    /// subscribers that received it.
    pub fn inject_notification(&self, event: NotifyEvent) -> usize {
        self.notify_tx.send(Arc::new(event)).unwrap_or(0)
    }

    /// Every request published so far, oldest first.
    pub fn published(&self) -> Vec<Request> {
        self.published
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
    }

    pub fn published_count(&self) -> usize {
        self.published
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .len()
    }

    /// Most recently published request.
    pub fn last_published(&self) -> Option<Request> {
        self.published
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .last()
            .cloned()
    }

    /// Reject all further publishes with [`Error::TransportClosed`].
    pub fn close(&self) {
        self.closed.store(true, Ordering::SeqCst);
    }
}

impl Default for MemoryTransport {
    fn default() -> Self {
        Self::new()
    }
}

impl Transport for MemoryTransport {
    fn publish(&self, request: &Request) -> Result<(), Error> {
        if self.closed.load(Ordering::SeqCst) {
            return Err(Error::TransportClosed);
        }

        trace!(request_id = %request.request_id, cmd = %request.cmd, "memory transport publish");
        self.published
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .push(request.clone());

        let reply = self
            .responder
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .as_ref()
            .and_then(|respond| respond(request));
        if let Some(reply) = reply {
            // No subscribers just means nobody is waiting.
            let _ = self.response_tx.send(Arc::new(reply));
        }

        Ok(())
    }

    fn subscribe_responses(&self) -> broadcast::Receiver<Arc<Response>> {
        self.response_tx.subscribe()
    }

    fn subscribe_notifications(&self) -> broadcast::Receiver<Arc<NotifyEvent>> {
        self.notify_tx.subscribe()
    }
}
