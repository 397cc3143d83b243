// ── In-flight request table ──
//
// Maps request ids to the oneshot sender of the caller waiting on them.
// An entry lives from just before publish until the first of: reply,
// timeout, publish failure or client close.

use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};

use dashmap::DashMap;
use primefimp_api::Response;
use tokio::sync::oneshot;
use tracing::debug;

use crate::error::CoreError;

#[derive(Default)]
pub struct PendingRequests {
    waiting: DashMap<String, oneshot::Sender<Arc<Response>>>,
    closed: AtomicBool,
}

impl PendingRequests {
    pub fn new() -> Self {
        Self::default()
    }

    /// Reserve a slot for `request_id` and return the receiving half.
    pub fn register(
        &self,
        request_id: &str,
    ) -> Result<oneshot::Receiver<Arc<Response>>, CoreError> {
        if self.is_closed() {
            return Err(CoreError::ClientClosed);
        }
        let (tx, rx) = oneshot::channel();
        self.waiting.insert(request_id.to_owned(), tx);

        // `close` may have drained the table between the check and the insert.
        if self.is_closed() {
            self.waiting.remove(request_id);
            return Err(CoreError::ClientClosed);
        }
        Ok(rx)
    }

    /// Hand a reply to its waiting caller.
    ///
    /// Returns `false` when nobody is waiting: the id is unknown, already
    /// answered, or its caller gave up.
    pub fn fulfill(&self, response: Arc<Response>) -> bool {
        let Some((request_id, tx)) = self.waiting.remove(&response.request_id) else {
            debug!(request_id = %response.request_id, "reply for unknown request ignored");
            return false;
        };
        if tx.send(response).is_err() {
            debug!(%request_id, "reply arrived after caller gave up");
            return false;
        }
        true
    }

    pub fn remove(&self, request_id: &str) -> bool {
        self.waiting.remove(request_id).is_some()
    }

    /// Fail every waiting caller with `ClientClosed` and refuse new entries.
    pub fn close(&self) {
        self.closed.store(true, Ordering::SeqCst);
        let abandoned = self.waiting.len();
        self.waiting.clear();
        if abandoned > 0 {
            debug!(abandoned, "pending requests released on close");
        }
    }

    pub fn is_closed(&self) -> bool {
        self.closed.load(Ordering::SeqCst)
    }

    pub fn len(&self) -> usize {
        self.waiting.len()
    }

    pub fn is_empty(&self) -> bool {
        self.waiting.is_empty()
    }
}
