// ── Core error types ──
//
// What callers of the client see. Wire-level failures from
// `primefimp-api` are folded into these variants by the `From` impl
// below; callers never match on serde or transport internals.

use std::time::Duration;

use thiserror::Error;

/// Unified error type for the core crate.
#[derive(Debug, Error)]
pub enum CoreError {
    // ── Payload errors ───────────────────────────────────────────────
    #[error("Failed to decode hub payload: {message}")]
    Decode { message: String },

    // ── Request errors ───────────────────────────────────────────────
    #[error("Request {request_id} timed out after {timeout_ms}ms")]
    Timeout { request_id: String, timeout_ms: u64 },

    #[error("Hub rejected request {request_id}: {message}")]
    Remote { request_id: String, message: String },

    // ── Lifecycle errors ─────────────────────────────────────────────
    #[error("Client is closed")]
    ClientClosed,

    #[error("Transport error: {message}")]
    Transport { message: String },

    // ── Internal errors ──────────────────────────────────────────────
    #[error("Internal error: {0}")]
    Internal(String),
}

impl CoreError {
    pub(crate) fn timeout(request_id: impl Into<String>, after: Duration) -> Self {
        Self::Timeout {
            request_id: request_id.into(),
            timeout_ms: u64::try_from(after.as_millis()).unwrap_or(u64::MAX),
        }
    }

    /// Whether retrying the same call could plausibly succeed.
    pub fn is_retryable(&self) -> bool {
        matches!(self, Self::Timeout { .. } | Self::Transport { .. })
    }

    pub fn is_closed(&self) -> bool {
        matches!(self, Self::ClientClosed)
    }
}

// ── Conversion from wire-layer errors ────────────────────────────────

impl From<primefimp_api::Error> for CoreError {
    fn from(err: primefimp_api::Error) -> Self {
        match err {
            primefimp_api::Error::Decode { message } => Self::Decode { message },
            primefimp_api::Error::Serialization(e) => Self::Decode {
                message: e.to_string(),
            },
            primefimp_api::Error::Transport(message) => Self::Transport { message },
            primefimp_api::Error::TransportClosed => Self::Transport {
                message: "transport closed".into(),
            },
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn wire_errors_map_to_core_variants() {
        let err: CoreError = primefimp_api::Error::decode("bad timer").into();
        assert!(matches!(err, CoreError::Decode { ref message } if message == "bad timer"));

        let err: CoreError = primefimp_api::Error::TransportClosed.into();
        assert!(err.is_retryable());
        assert!(!err.is_closed());
    }

    #[test]
    fn timeout_reports_milliseconds() {
        let err = CoreError::timeout("r1", Duration::from_millis(1500));
        assert_eq!(err.to_string(), "Request r1 timed out after 1500ms");
        assert!(err.is_retryable());
    }
}
