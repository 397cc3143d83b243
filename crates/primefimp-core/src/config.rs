// ── Runtime client configuration ──
//
// Describes how the client behaves once constructed. Never touches disk;
// `primefimp-config` builds one of these from a TOML profile.

use std::time::Duration;

use primefimp_api::ComponentType;

pub const DEFAULT_REQUEST_TIMEOUT: Duration = Duration::from_secs(30);
pub const DEFAULT_DELIVERY_TIMEOUT: Duration = Duration::from_millis(100);

/// Configuration for a single [`ApiClient`](crate::ApiClient).
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ClientConfig {
    /// Identifier this client presents to the hub.
    pub client_id: String,
    /// Keep the last fetched site in memory and serve non-forced reads from it.
    pub cache_enabled: bool,
    /// How long a request waits for its correlated reply.
    pub request_timeout: Duration,
    /// How long the notify router waits on a full destination before
    /// dropping the event for that destination.
    pub delivery_timeout: Duration,
    /// Components requested by a full site fetch.
    pub site_components: Vec<ComponentType>,
}

impl ClientConfig {
    pub fn new(client_id: impl Into<String>) -> Self {
        Self {
            client_id: client_id.into(),
            cache_enabled: true,
            request_timeout: DEFAULT_REQUEST_TIMEOUT,
            delivery_timeout: DEFAULT_DELIVERY_TIMEOUT,
            site_components: ComponentType::SITE.to_vec(),
        }
    }

    pub fn with_cache(mut self, enabled: bool) -> Self {
        self.cache_enabled = enabled;
        self
    }

    pub fn with_request_timeout(mut self, timeout: Duration) -> Self {
        self.request_timeout = timeout;
        self
    }

    pub fn with_delivery_timeout(mut self, timeout: Duration) -> Self {
        self.delivery_timeout = timeout;
        self
    }

    pub fn with_site_components(
        mut self,
        components: impl IntoIterator<Item = ComponentType>,
    ) -> Self {
        self.site_components = components.into_iter().collect();
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_cover_full_site() {
        let config = ClientConfig::new("test-client");
        assert!(config.cache_enabled);
        assert_eq!(config.request_timeout, Duration::from_secs(30));
        assert_eq!(config.delivery_timeout, Duration::from_millis(100));
        assert_eq!(config.site_components.len(), 9);
    }

    #[test]
    fn builder_overrides() {
        let config = ClientConfig::new("c")
            .with_cache(false)
            .with_request_timeout(Duration::from_secs(2))
            .with_site_components([ComponentType::Device, ComponentType::Room]);
        assert!(!config.cache_enabled);
        assert_eq!(config.request_timeout, Duration::from_secs(2));
        assert_eq!(
            config.site_components,
            vec![ComponentType::Device, ComponentType::Room]
        );
    }
}
