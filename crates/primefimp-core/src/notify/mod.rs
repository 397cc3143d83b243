// ── Change notification fan-out ──
//
// The hub pushes add/edit/delete notifications for every component. The
// router copies each one to every registered destination whose filter
// matches, without letting one slow destination stall the rest.

mod filter;
mod router;

use std::pin::Pin;
use std::sync::Arc;
use std::task::{Context, Poll};

use futures_core::Stream;
use futures_util::StreamExt;
use primefimp_api::NotifyEvent;
use tokio_stream::wrappers::ReceiverStream;

pub use filter::NotifyFilter;
pub use router::NotifyRouter;

/// Receiving end of a registration created by
/// [`ApiClient::register_stream`](crate::ApiClient::register_stream).
///
/// Ends when the registration is removed or the client stops.
pub struct NotifyStream {
    channel_id: String,
    inner: ReceiverStream<Arc<NotifyEvent>>,
}

impl NotifyStream {
    pub(crate) fn new(
        channel_id: String,
        receiver: tokio::sync::mpsc::Receiver<Arc<NotifyEvent>>,
    ) -> Self {
        Self {
            channel_id,
            inner: ReceiverStream::new(receiver),
        }
    }

    pub fn channel_id(&self) -> &str {
        &self.channel_id
    }

    /// Wait for the next matching notification.
    pub async fn recv(&mut self) -> Option<Arc<NotifyEvent>> {
        self.inner.next().await
    }
}

impl Stream for NotifyStream {
    type Item = Arc<NotifyEvent>;

    fn poll_next(mut self: Pin<&mut Self>, cx: &mut Context<'_>) -> Poll<Option<Self::Item>> {
        Pin::new(&mut self.inner).poll_next(cx)
    }
}
