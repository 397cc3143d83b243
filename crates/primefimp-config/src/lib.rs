//! Shared configuration for Prime FIMP clients.
//!
//! TOML profiles merged with `PRIMEFIMP_` environment overrides, and
//! translation to `primefimp_core::ClientConfig`. Nothing here talks to
//! the hub.

use std::collections::HashMap;
use std::path::{Path, PathBuf};
use std::time::Duration;

use directories::ProjectDirs;
use figment::{
    Figment,
    providers::{Env, Format, Serialized, Toml},
};
use serde::{Deserialize, Serialize};
use thiserror::Error;
use tracing::debug;

use primefimp_core::ClientConfig;

const ENV_PREFIX: &str = "PRIMEFIMP_";

// ── Error ───────────────────────────────────────────────────────────

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("invalid {field}: {reason}")]
    Validation { field: String, reason: String },

    #[error("no profile named '{profile}'")]
    UnknownProfile { profile: String },

    #[error("failed to serialize config: {0}")]
    Serialization(#[from] toml::ser::Error),

    #[error("config loading failed: {0}")]
    Figment(Box<figment::Error>),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

impl From<figment::Error> for ConfigError {
    fn from(err: figment::Error) -> Self {
        Self::Figment(Box::new(err))
    }
}

// ── TOML config structs ─────────────────────────────────────────────

/// Top-level TOML configuration.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize, Serialize)]
pub struct Config {
    /// Profile used when none is named.
    pub default_profile: Option<String>,

    /// Values a profile falls back to.
    #[serde(default)]
    pub defaults: Defaults,

    /// Named hub profiles.
    #[serde(default)]
    pub profiles: HashMap<String, Profile>,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            default_profile: Some("default".into()),
            defaults: Defaults::default(),
            profiles: HashMap::new(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Deserialize, Serialize)]
pub struct Defaults {
    #[serde(default = "default_cache_enabled")]
    pub cache_enabled: bool,

    #[serde(default = "default_request_timeout_secs")]
    pub request_timeout_secs: u64,

    #[serde(default = "default_delivery_timeout_ms")]
    pub delivery_timeout_ms: u64,
}

impl Default for Defaults {
    fn default() -> Self {
        Self {
            cache_enabled: default_cache_enabled(),
            request_timeout_secs: default_request_timeout_secs(),
            delivery_timeout_ms: default_delivery_timeout_ms(),
        }
    }
}

fn default_cache_enabled() -> bool {
    true
}
fn default_request_timeout_secs() -> u64 {
    30
}
fn default_delivery_timeout_ms() -> u64 {
    100
}

/// A named hub profile. Unset fields fall back to [`Defaults`].
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize, Serialize)]
pub struct Profile {
    /// Client identifier presented to the hub.
    pub client_id: String,

    pub cache_enabled: Option<bool>,

    pub request_timeout_secs: Option<u64>,

    pub delivery_timeout_ms: Option<u64>,
}

// ── Config file path ────────────────────────────────────────────────

/// Resolve the config file path via XDG / platform conventions.
pub fn config_path() -> PathBuf {
    ProjectDirs::from("io", "futurehome", "primefimp").map_or_else(
        || {
            let mut p = dirs_fallback();
            p.push("config.toml");
            p
        },
        |dirs| dirs.config_dir().join("config.toml"),
    )
}

fn dirs_fallback() -> PathBuf {
    let mut p = PathBuf::from(std::env::var("HOME").unwrap_or_else(|_| ".".into()));
    p.push(".config");
    p.push("primefimp");
    p
}

// ── Config loading ──────────────────────────────────────────────────

fn figment_for(path: &Path) -> Figment {
    Figment::new()
        .merge(Serialized::defaults(Config::default()))
        .merge(Toml::file(path))
        .merge(Env::prefixed(ENV_PREFIX).split("__"))
}

/// Load the full Config from the canonical file + environment.
pub fn load_config() -> Result<Config, ConfigError> {
    load_config_from(&config_path())
}

/// Load from an explicit file + environment. A missing file yields the
/// defaults.
pub fn load_config_from(path: &Path) -> Result<Config, ConfigError> {
    debug!(path = %path.display(), "loading config");
    let config: Config = figment_for(path).extract()?;
    Ok(config)
}

/// Load config, returning a default if loading fails.
pub fn load_config_or_default() -> Config {
    load_config().unwrap_or_default()
}

// ── Config saving ───────────────────────────────────────────────────

/// Serialize config to TOML and write it to the canonical path.
pub fn save_config(cfg: &Config) -> Result<(), ConfigError> {
    save_config_to(cfg, &config_path())
}

pub fn save_config_to(cfg: &Config, path: &Path) -> Result<(), ConfigError> {
    if let Some(parent) = path.parent() {
        std::fs::create_dir_all(parent)?;
    }
    let toml_str = toml::to_string_pretty(cfg)?;
    std::fs::write(path, toml_str)?;
    debug!(path = %path.display(), "config saved");
    Ok(())
}

// ── Profile resolution ──────────────────────────────────────────────

/// Build a `ClientConfig` from the named profile, or the default profile
/// when `name` is `None`.
pub fn resolve_profile(config: &Config, name: Option<&str>) -> Result<ClientConfig, ConfigError> {
    let profile_name = name
        .or(config.default_profile.as_deref())
        .unwrap_or("default");
    let profile = config
        .profiles
        .get(profile_name)
        .ok_or_else(|| ConfigError::UnknownProfile {
            profile: profile_name.into(),
        })?;

    profile_to_client_config(profile, &config.defaults)
}

/// Apply `defaults` to `profile` and validate the result.
pub fn profile_to_client_config(
    profile: &Profile,
    defaults: &Defaults,
) -> Result<ClientConfig, ConfigError> {
    let client_id = profile.client_id.trim();
    if client_id.is_empty() {
        return Err(ConfigError::Validation {
            field: "client_id".into(),
            reason: "must not be empty".into(),
        });
    }

    let request_timeout_secs = profile
        .request_timeout_secs
        .unwrap_or(defaults.request_timeout_secs);
    if request_timeout_secs == 0 {
        return Err(ConfigError::Validation {
            field: "request_timeout_secs".into(),
            reason: "must be greater than zero".into(),
        });
    }

    let delivery_timeout_ms = profile
        .delivery_timeout_ms
        .unwrap_or(defaults.delivery_timeout_ms);
    if delivery_timeout_ms == 0 {
        return Err(ConfigError::Validation {
            field: "delivery_timeout_ms".into(),
            reason: "must be greater than zero".into(),
        });
    }

    Ok(ClientConfig::new(client_id)
        .with_cache(profile.cache_enabled.unwrap_or(defaults.cache_enabled))
        .with_request_timeout(Duration::from_secs(request_timeout_secs))
        .with_delivery_timeout(Duration::from_millis(delivery_timeout_ms)))
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    fn profile(client_id: &str) -> Profile {
        Profile {
            client_id: client_id.into(),
            ..Profile::default()
        }
    }

    #[test]
    fn profile_inherits_defaults() {
        let cfg = profile_to_client_config(&profile("app"), &Defaults::default()).unwrap();
        assert_eq!(cfg.client_id, "app");
        assert!(cfg.cache_enabled);
        assert_eq!(cfg.request_timeout, Duration::from_secs(30));
        assert_eq!(cfg.delivery_timeout, Duration::from_millis(100));
    }

    #[test]
    fn profile_overrides_defaults() {
        let p = Profile {
            cache_enabled: Some(false),
            request_timeout_secs: Some(5),
            ..profile("app")
        };
        let cfg = profile_to_client_config(&p, &Defaults::default()).unwrap();
        assert!(!cfg.cache_enabled);
        assert_eq!(cfg.request_timeout, Duration::from_secs(5));
    }

    #[test]
    fn blank_client_id_is_rejected() {
        let err = profile_to_client_config(&profile("  "), &Defaults::default()).unwrap_err();
        assert!(matches!(err, ConfigError::Validation { ref field, .. } if field == "client_id"));
    }

    #[test]
    fn zero_timeout_is_rejected() {
        let p = Profile {
            request_timeout_secs: Some(0),
            ..profile("app")
        };
        assert!(profile_to_client_config(&p, &Defaults::default()).is_err());
    }

    #[test]
    fn unknown_profile_is_reported() {
        let err = resolve_profile(&Config::default(), Some("attic")).unwrap_err();
        assert_eq!(err.to_string(), "no profile named 'attic'");
    }
}
