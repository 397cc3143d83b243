// ── Snapshot storage ──
//
// Holds the most recent full site so reads can skip the round trip.

mod site_cache;

pub use site_cache::SiteCache;
