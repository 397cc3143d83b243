// ── Client facade ──
//
// Everything an application touches: site reads through the snapshot
// cache, raw commands through the correlator, and notification channels
// through the router. Cheap to clone; all clones share one lifecycle.

use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};

use primefimp_api::{
    Area, Command, ComponentType, Device, House, Hub, Mode, NotifyEvent, Request, RequestParam,
    Response, Room, Shortcut, Site, Thing, Timer, Transport,
};
use tokio::sync::{Mutex, mpsc};
use tokio::task::JoinHandle;
use tokio_util::sync::CancellationToken;
use tracing::{debug, info};
use uuid::Uuid;

use crate::config::ClientConfig;
use crate::error::CoreError;
use crate::notify::{NotifyFilter, NotifyRouter, NotifyStream};
use crate::request::{self, PendingRequests};
use crate::store::SiteCache;

// ── ApiClient ────────────────────────────────────────────────────────

/// Entry point for talking to one hub.
///
/// Construct inside a Tokio runtime: [`new`](Self::new) spawns the reply
/// consumer immediately so no reply can arrive before it listens.
#[derive(Clone)]
pub struct ApiClient {
    inner: Arc<ClientInner>,
}

struct ClientInner {
    config: ClientConfig,
    transport: Arc<dyn Transport>,
    cache: SiteCache,
    pending: Arc<PendingRequests>,
    router: NotifyRouter,
    fetch_lock: Mutex<()>,
    cancel: CancellationToken,
    closed: AtomicBool,
    task_handles: Mutex<Vec<JoinHandle<()>>>,
}

impl Drop for ClientInner {
    fn drop(&mut self) {
        // Ends the reply consumer and router tasks when the last handle goes.
        self.cancel.cancel();
    }
}

impl ApiClient {
    pub fn new(config: ClientConfig, transport: Arc<dyn Transport>) -> Self {
        let cancel = CancellationToken::new();
        let pending = Arc::new(PendingRequests::new());

        let replies = transport.subscribe_responses();
        let consumer = tokio::spawn(request::reply_consumer_task(
            replies,
            Arc::clone(&pending),
            cancel.child_token(),
        ));

        let router = NotifyRouter::new(
            Arc::clone(&transport),
            config.delivery_timeout,
            cancel.clone(),
        );

        debug!(
            client_id = %config.client_id,
            cache_enabled = config.cache_enabled,
            "api client created"
        );

        Self {
            inner: Arc::new(ClientInner {
                cache: SiteCache::new(config.cache_enabled),
                config,
                transport,
                pending,
                router,
                fetch_lock: Mutex::new(()),
                cancel,
                closed: AtomicBool::new(false),
                task_handles: Mutex::new(vec![consumer]),
            }),
        }
    }

    pub fn config(&self) -> &ClientConfig {
        &self.inner.config
    }

    pub fn cache(&self) -> &SiteCache {
        &self.inner.cache
    }

    pub fn is_closed(&self) -> bool {
        self.inner.closed.load(Ordering::SeqCst)
    }

    fn ensure_open(&self) -> Result<(), CoreError> {
        if self.is_closed() {
            return Err(CoreError::ClientClosed);
        }
        Ok(())
    }

    // ── Requests ─────────────────────────────────────────────────────

    /// Send one command and wait for its correlated reply.
    ///
    /// Fails with [`CoreError::Timeout`] if no reply arrives within the
    /// configured request timeout, and [`CoreError::Remote`] if the hub
    /// flags the request as failed.
    pub async fn send(
        &self,
        cmd: Command,
        component: Option<ComponentType>,
        param: RequestParam,
    ) -> Result<Response, CoreError> {
        self.ensure_open()?;
        let request = Request::new(cmd, component, param, Uuid::new_v4().to_string());
        request::round_trip(
            self.inner.transport.as_ref(),
            &self.inner.pending,
            request,
            self.inner.config.request_timeout,
        )
        .await
    }

    // ── Site reads ───────────────────────────────────────────────────

    /// Return the whole site, from the cache unless `force_refresh` is set.
    ///
    /// Concurrent cold reads share one round trip. A failed fetch leaves
    /// the previous snapshot in place.
    pub async fn get_site(&self, force_refresh: bool) -> Result<Arc<Site>, CoreError> {
        self.ensure_open()?;
        if !force_refresh {
            if let Some(site) = self.inner.cache.get() {
                return Ok(site);
            }
        }

        let _fetch = self.inner.fetch_lock.lock().await;
        if !force_refresh {
            if let Some(site) = self.inner.cache.get() {
                debug!("site served by concurrent fetch");
                return Ok(site);
            }
        }
        self.fetch_site().await
    }

    async fn fetch_site(&self) -> Result<Arc<Site>, CoreError> {
        let param =
            RequestParam::with_components(self.inner.config.site_components.iter().copied());
        let response = self.send(Command::Get, None, param).await?;
        let site = Site::from_param(response.param)?;
        Ok(self.inner.cache.replace(site))
    }

    /// Forget the cached snapshot.
    pub fn invalidate_cache(&self) {
        self.inner.cache.invalidate();
    }

    pub async fn devices(&self, force_refresh: bool) -> Result<Vec<Device>, CoreError> {
        Ok(self.get_site(force_refresh).await?.devices.clone())
    }

    pub async fn things(&self, force_refresh: bool) -> Result<Vec<Thing>, CoreError> {
        Ok(self.get_site(force_refresh).await?.things.clone())
    }

    pub async fn rooms(&self, force_refresh: bool) -> Result<Vec<Room>, CoreError> {
        Ok(self.get_site(force_refresh).await?.rooms.clone())
    }

    pub async fn areas(&self, force_refresh: bool) -> Result<Vec<Area>, CoreError> {
        Ok(self.get_site(force_refresh).await?.areas.clone())
    }

    pub async fn shortcuts(&self, force_refresh: bool) -> Result<Vec<Shortcut>, CoreError> {
        Ok(self.get_site(force_refresh).await?.shortcuts.clone())
    }

    pub async fn modes(&self, force_refresh: bool) -> Result<Vec<Mode>, CoreError> {
        Ok(self.get_site(force_refresh).await?.modes.clone())
    }

    pub async fn timers(&self, force_refresh: bool) -> Result<Vec<Timer>, CoreError> {
        Ok(self.get_site(force_refresh).await?.timers.clone())
    }

    pub async fn house(&self, force_refresh: bool) -> Result<Option<House>, CoreError> {
        Ok(self.get_site(force_refresh).await?.house.clone())
    }

    pub async fn hub(&self, force_refresh: bool) -> Result<Option<Hub>, CoreError> {
        Ok(self.get_site(force_refresh).await?.hub.clone())
    }

    // ── Notifications ────────────────────────────────────────────────

    /// Deliver every notification to `destination`.
    pub fn register_channel(
        &self,
        channel_id: impl Into<String>,
        destination: mpsc::Sender<Arc<NotifyEvent>>,
    ) -> Result<(), CoreError> {
        self.register_channel_with_filter(channel_id, NotifyFilter::all(), destination)
    }

    /// Deliver notifications matching `filter` to `destination`,
    /// replacing any registration under the same id.
    pub fn register_channel_with_filter(
        &self,
        channel_id: impl Into<String>,
        filter: NotifyFilter,
        destination: mpsc::Sender<Arc<NotifyEvent>>,
    ) -> Result<(), CoreError> {
        self.ensure_open()?;
        self.inner.router.register(channel_id, filter, destination);
        Ok(())
    }

    /// Register a channel and hand back its receiving end as a stream.
    pub fn register_stream(
        &self,
        channel_id: impl Into<String>,
        filter: NotifyFilter,
        capacity: usize,
    ) -> Result<NotifyStream, CoreError> {
        let channel_id = channel_id.into();
        let (tx, rx) = mpsc::channel(capacity.max(1));
        self.register_channel_with_filter(channel_id.clone(), filter, tx)?;
        Ok(NotifyStream::new(channel_id, rx))
    }

    pub fn unregister_channel(&self, channel_id: &str) -> bool {
        self.inner.router.unregister(channel_id)
    }

    /// Events dropped for `channel_id` because its destination stayed full.
    pub fn dropped(&self, channel_id: &str) -> Option<u64> {
        self.inner.router.dropped(channel_id)
    }

    pub fn notify_router(&self) -> &NotifyRouter {
        &self.inner.router
    }

    /// Start routing notifications. A no-op if already running.
    pub async fn start_notify_router(&self) -> Result<(), CoreError> {
        self.ensure_open()?;
        self.inner.router.start().await;
        Ok(())
    }

    pub async fn stop_notify_router(&self) {
        self.inner.router.stop().await;
    }

    // ── Lifecycle ────────────────────────────────────────────────────

    /// Shut the client down.
    ///
    /// Cancels background tasks and waits for them, fails in-flight
    /// requests with [`CoreError::ClientClosed`] and drops every
    /// registration. Safe to call more than once.
    pub async fn stop(&self) {
        if self.inner.closed.swap(true, Ordering::SeqCst) {
            return;
        }

        self.inner.router.stop().await;
        self.inner.cancel.cancel();

        let mut handles = self.inner.task_handles.lock().await;
        for handle in handles.drain(..) {
            let _ = handle.await;
        }
        drop(handles);

        self.inner.pending.close();
        self.inner.router.clear();
        info!(client_id = %self.inner.config.client_id, "api client stopped");
    }
}
