// ── Request/response correlation ──
//
// The bus has no reply channel of its own: a request goes out with a
// fresh id, and the reply consumer matches inbound replies back to the
// caller through the pending table.

mod pending;

use std::sync::Arc;
use std::time::Duration;

use primefimp_api::{Request, Response, Transport};
use tokio::sync::broadcast::{self, error::RecvError};
use tokio_util::sync::CancellationToken;
use tracing::{debug, warn};

pub use pending::PendingRequests;

use crate::error::CoreError;

/// Publish `request` and wait up to `timeout` for its reply.
///
/// The pending slot is registered before publishing so a fast reply
/// cannot overtake it. Every exit path leaves the table without an entry
/// for this id.
pub(crate) async fn round_trip(
    transport: &dyn Transport,
    pending: &PendingRequests,
    request: Request,
    timeout: Duration,
) -> Result<Response, CoreError> {
    let request_id = request.request_id.clone();
    let rx = pending.register(&request_id)?;

    if let Err(e) = transport.publish(&request) {
        pending.remove(&request_id);
        debug!(%request_id, error = %e, "publish failed");
        return Err(e.into());
    }
    debug!(
        %request_id,
        cmd = %request.cmd,
        component = ?request.component,
        "request published"
    );

    let response = match tokio::time::timeout(timeout, rx).await {
        Ok(Ok(response)) => response,
        // Sender dropped: the table was closed under us.
        Ok(Err(_)) => return Err(CoreError::ClientClosed),
        Err(_) => {
            pending.remove(&request_id);
            debug!(%request_id, "request timed out");
            return Err(CoreError::timeout(request_id, timeout));
        }
    };

    if response.is_error() {
        let message = response.error_detail().unwrap_or_default();
        return Err(CoreError::Remote {
            request_id,
            message,
        });
    }
    Ok(Arc::unwrap_or_clone(response))
}

/// Drain the reply stream into the pending table until cancelled.
pub(crate) async fn reply_consumer_task(
    mut replies: broadcast::Receiver<Arc<Response>>,
    pending: Arc<PendingRequests>,
    cancel: CancellationToken,
) {
    loop {
        tokio::select! {
            biased;
            () = cancel.cancelled() => break,
            reply = replies.recv() => match reply {
                Ok(response) => {
                    pending.fulfill(response);
                }
                Err(RecvError::Lagged(skipped)) => {
                    warn!(skipped, "reply stream lagged; affected requests will time out");
                }
                Err(RecvError::Closed) => {
                    debug!("reply stream closed");
                    break;
                }
            }
        }
    }
}
