// ── Notify router ──
//
// One background task reads the transport's notification stream and
// hands each event to the matching registrations. Every registration owns
// a bounded queue drained by its own delivery task, so the routing task
// never waits on a destination: a full queue drops the event for that
// registration only.

use std::sync::Arc;
use std::sync::atomic::{AtomicBool, AtomicU64, Ordering};
use std::time::Duration;

use dashmap::DashMap;
use primefimp_api::{NotifyEvent, Transport};
use tokio::sync::{
    Mutex,
    broadcast::{self, error::RecvError},
    mpsc::{
        self,
        error::{SendTimeoutError, TrySendError},
    },
};
use tokio::task::JoinHandle;
use tokio_util::sync::CancellationToken;
use tracing::{debug, info, warn};

use super::filter::NotifyFilter;

/// Events buffered per registration while its destination is busy.
const DELIVERY_QUEUE_CAPACITY: usize = 64;

struct Registration {
    filter: NotifyFilter,
    generation: u64,
    queue: mpsc::Sender<Arc<NotifyEvent>>,
    destination: mpsc::Sender<Arc<NotifyEvent>>,
    dropped: Arc<AtomicU64>,
    cancel: CancellationToken,
}

impl Drop for Registration {
    fn drop(&mut self) {
        // Removing or replacing a registration ends its delivery task.
        self.cancel.cancel();
    }
}

/// State shared with the routing and delivery tasks.
struct RouterShared {
    registrations: DashMap<String, Registration>,
    delivery_timeout: Duration,
    running: AtomicBool,
    next_generation: AtomicU64,
}

struct RouterRun {
    cancel: CancellationToken,
    handle: JoinHandle<()>,
}

/// Fans hub notifications out to registered channels.
pub struct NotifyRouter {
    shared: Arc<RouterShared>,
    transport: Arc<dyn Transport>,
    parent_cancel: CancellationToken,
    run: Mutex<Option<RouterRun>>,
}

impl NotifyRouter {
    pub(crate) fn new(
        transport: Arc<dyn Transport>,
        delivery_timeout: Duration,
        parent_cancel: CancellationToken,
    ) -> Self {
        Self {
            shared: Arc::new(RouterShared {
                registrations: DashMap::new(),
                delivery_timeout,
                running: AtomicBool::new(false),
                next_generation: AtomicU64::new(0),
            }),
            transport,
            parent_cancel,
            run: Mutex::new(None),
        }
    }

    // ── Registry ─────────────────────────────────────────────────────

    /// Add or replace the registration under `channel_id`.
    ///
    /// Spawns the registration's delivery task, so it must be called from
    /// within a Tokio runtime.
    pub fn register(
        &self,
        channel_id: impl Into<String>,
        filter: NotifyFilter,
        destination: mpsc::Sender<Arc<NotifyEvent>>,
    ) {
        let channel_id = channel_id.into();
        let generation = self.shared.next_generation.fetch_add(1, Ordering::Relaxed);
        let (queue, queued) = mpsc::channel(DELIVERY_QUEUE_CAPACITY);
        let dropped = Arc::new(AtomicU64::new(0));
        let cancel = self.parent_cancel.child_token();

        tokio::spawn(delivery_task(
            Arc::clone(&self.shared),
            Delivery {
                channel_id: channel_id.clone(),
                generation,
                destination: destination.clone(),
                dropped: Arc::clone(&dropped),
            },
            queued,
            cancel.clone(),
        ));

        let replaced = self
            .shared
            .registrations
            .insert(
                channel_id.clone(),
                Registration {
                    filter,
                    generation,
                    queue,
                    destination,
                    dropped,
                    cancel,
                },
            )
            .is_some();
        debug!(%channel_id, ?filter, replaced, "notify channel registered");
    }

    /// Remove a registration. Returns `false` if none existed.
    pub fn unregister(&self, channel_id: &str) -> bool {
        let removed = self.shared.registrations.remove(channel_id).is_some();
        if removed {
            debug!(%channel_id, "notify channel unregistered");
        }
        removed
    }

    pub fn is_registered(&self, channel_id: &str) -> bool {
        self.shared.registrations.contains_key(channel_id)
    }

    pub fn registration_count(&self) -> usize {
        self.shared.registrations.len()
    }

    /// Events dropped for `channel_id`, either because its queue was full
    /// or because its destination stayed full past the delivery timeout.
    pub fn dropped(&self, channel_id: &str) -> Option<u64> {
        self.shared
            .registrations
            .get(channel_id)
            .map(|r| r.dropped.load(Ordering::Relaxed))
    }

    pub(crate) fn clear(&self) {
        self.shared.registrations.clear();
    }

    // ── Lifecycle ────────────────────────────────────────────────────

    pub fn is_running(&self) -> bool {
        self.shared.running.load(Ordering::SeqCst)
    }

    /// Begin routing. Returns `false` if the router was already running.
    ///
    /// Only events published after this call are delivered.
    pub async fn start(&self) -> bool {
        let mut run = self.run.lock().await;
        if self.is_running() {
            debug!("notify router already running");
            return false;
        }
        if let Some(finished) = run.take() {
            let _ = finished.handle.await;
        }

        let cancel = self.parent_cancel.child_token();
        let events = self.transport.subscribe_notifications();
        self.shared.running.store(true, Ordering::SeqCst);
        let handle = tokio::spawn(route_task(
            Arc::clone(&self.shared),
            events,
            cancel.clone(),
        ));
        *run = Some(RouterRun { cancel, handle });

        info!(
            registrations = self.registration_count(),
            "notify router started"
        );
        true
    }

    /// Stop routing and wait for the task to exit. Registrations are kept,
    /// so a later [`start`](Self::start) resumes delivery to them.
    pub async fn stop(&self) {
        let mut run = self.run.lock().await;
        let Some(active) = run.take() else {
            return;
        };
        active.cancel.cancel();
        let _ = active.handle.await;
        self.shared.running.store(false, Ordering::SeqCst);
        info!("notify router stopped");
    }
}

// ── Routing task ─────────────────────────────────────────────────────

async fn route_task(
    shared: Arc<RouterShared>,
    mut events: broadcast::Receiver<Arc<NotifyEvent>>,
    cancel: CancellationToken,
) {
    loop {
        tokio::select! {
            biased;
            () = cancel.cancelled() => break,
            event = events.recv() => match event {
                Ok(event) => shared.dispatch(&event),
                Err(RecvError::Lagged(skipped)) => {
                    warn!(skipped, "notification stream lagged");
                }
                Err(RecvError::Closed) => {
                    debug!("notification stream closed");
                    break;
                }
            }
        }
    }
    shared.running.store(false, Ordering::SeqCst);
}

impl RouterShared {
    /// Queue one event for every matching registration without waiting.
    fn dispatch(&self, event: &Arc<NotifyEvent>) {
        let mut closed = Vec::new();

        for r in self.registrations.iter() {
            if !r.filter.matches(event) {
                continue;
            }
            if r.destination.is_closed() {
                closed.push((r.key().clone(), r.generation));
                continue;
            }
            match r.queue.try_send(Arc::clone(event)) {
                Ok(()) => {}
                Err(TrySendError::Full(_)) => {
                    let total = r.dropped.fetch_add(1, Ordering::Relaxed) + 1;
                    warn!(
                        channel_id = %r.key(),
                        cmd = %event.cmd,
                        component = %event.component,
                        dropped_total = total,
                        "delivery queue full; notification dropped"
                    );
                }
                Err(TrySendError::Closed(_)) => {
                    closed.push((r.key().clone(), r.generation));
                }
            }
        }

        for (channel_id, generation) in closed {
            self.remove_generation(&channel_id, generation);
        }
    }

    /// Remove `channel_id` only if it is still the given registration, so a
    /// concurrent re-register survives.
    fn remove_generation(&self, channel_id: &str, generation: u64) {
        if self
            .registrations
            .remove_if(channel_id, |_, r| r.generation == generation)
            .is_some()
        {
            debug!(%channel_id, "destination closed; registration removed");
        }
    }
}

// ── Delivery task ────────────────────────────────────────────────────

struct Delivery {
    channel_id: String,
    generation: u64,
    destination: mpsc::Sender<Arc<NotifyEvent>>,
    dropped: Arc<AtomicU64>,
}

/// Drain one registration's queue into its destination, in order.
async fn delivery_task(
    shared: Arc<RouterShared>,
    delivery: Delivery,
    mut queued: mpsc::Receiver<Arc<NotifyEvent>>,
    cancel: CancellationToken,
) {
    let timeout = shared.delivery_timeout;

    loop {
        let event = tokio::select! {
            biased;
            () = cancel.cancelled() => break,
            event = queued.recv() => match event {
                Some(event) => event,
                None => break,
            },
        };

        let outcome = tokio::select! {
            biased;
            () = cancel.cancelled() => break,
            outcome = delivery.destination.send_timeout(event, timeout) => outcome,
        };

        match outcome {
            Ok(()) => {}
            Err(SendTimeoutError::Timeout(event)) => {
                let total = delivery.dropped.fetch_add(1, Ordering::Relaxed) + 1;
                warn!(
                    channel_id = %delivery.channel_id,
                    cmd = %event.cmd,
                    component = %event.component,
                    dropped_total = total,
                    "destination full; notification dropped"
                );
            }
            Err(SendTimeoutError::Closed(_)) => {
                shared.remove_generation(&delivery.channel_id, delivery.generation);
                break;
            }
        }
    }
}
