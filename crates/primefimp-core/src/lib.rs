//! Client layer for the Futurehome Prime FIMP hub API.
//!
//! Sits between a publish/subscribe [`Transport`](primefimp_api::Transport)
//! and application code:
//!
//! - **[`ApiClient`]**: facade owning the lifecycle. Reads go through the
//!   snapshot cache, commands through request/response correlation.
//!
//! - **[`SiteCache`]**: the last fetched [`Site`](primefimp_api::Site) held
//!   as one immutable snapshot and swapped atomically on refresh.
//!
//! - **[`PendingRequests`]**: request id to waiting caller, fed by a
//!   background reply consumer.
//!
//! - **[`NotifyRouter`]**: fans change notifications out to registered
//!   channels by [`NotifyFilter`], with a bounded wait per destination.

pub mod client;
pub mod config;
pub mod error;
pub mod notify;
pub mod request;
pub mod store;

// ── Primary re-exports ──────────────────────────────────────────────
pub use client::ApiClient;
pub use config::ClientConfig;
pub use error::CoreError;
pub use notify::{NotifyFilter, NotifyRouter, NotifyStream};
pub use request::PendingRequests;
pub use store::SiteCache;
