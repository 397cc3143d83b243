// ── Site snapshot cache ──
//
// One immutable `Site` behind an atomic pointer. Readers never block and
// never observe a half-applied refresh: a new snapshot replaces the old
// one wholesale.

use std::sync::Arc;

use arc_swap::ArcSwapOption;
use chrono::{DateTime, Utc};
use primefimp_api::Site;
use tokio::sync::watch;
use tracing::debug;

/// Last successfully fetched [`Site`], if caching is enabled.
pub struct SiteCache {
    enabled: bool,
    site: ArcSwapOption<Site>,
    last_refresh: watch::Sender<Option<DateTime<Utc>>>,
}

impl SiteCache {
    pub fn new(enabled: bool) -> Self {
        let (last_refresh, _) = watch::channel(None);
        Self {
            enabled,
            site: ArcSwapOption::empty(),
            last_refresh,
        }
    }

    pub fn is_enabled(&self) -> bool {
        self.enabled
    }

    /// Current snapshot. Always `None` when caching is disabled.
    pub fn get(&self) -> Option<Arc<Site>> {
        if !self.enabled {
            return None;
        }
        self.site.load_full()
    }

    /// Install a freshly fetched site and return the shared handle.
    ///
    /// When caching is disabled the site is handed back without being kept.
    pub fn replace(&self, site: Site) -> Arc<Site> {
        let site = Arc::new(site);
        if self.enabled {
            self.site.store(Some(Arc::clone(&site)));
            self.last_refresh.send_replace(Some(Utc::now()));
            debug!(
                devices = site.devices.len(),
                rooms = site.rooms.len(),
                timers = site.timers.len(),
                "site snapshot replaced"
            );
        }
        site
    }

    /// Drop the snapshot so the next read goes to the hub.
    pub fn invalidate(&self) {
        self.last_refresh.send_replace(None);
        if self.site.swap(None).is_some() {
            debug!("site snapshot invalidated");
        }
    }

    /// When the current snapshot was installed.
    pub fn last_refresh(&self) -> Option<DateTime<Utc>> {
        *self.last_refresh.borrow()
    }

    /// Watch refresh timestamps.
    pub fn subscribe_refresh(&self) -> watch::Receiver<Option<DateTime<Utc>>> {
        self.last_refresh.subscribe()
    }
}
