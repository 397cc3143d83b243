use thiserror::Error;

/// Top-level error type for the `primefimp-api` crate.
///
/// Covers the failure modes of the wire layer: decoding hub payloads and
/// handing messages to (or receiving them from) the transport.
/// `primefimp-core` maps these into caller-facing variants.
#[derive(Debug, Error)]
pub enum Error {
    // ── Decoding ────────────────────────────────────────────────────
    /// A hub payload had a shape the decoder does not accept.
    #[error("Decode error: {message}")]
    Decode { message: String },

    /// JSON (de)serialization failed.
    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    // ── Transport ───────────────────────────────────────────────────
    /// The transport refused or failed to publish a message.
    #[error("Transport error: {0}")]
    Transport(String),

    /// The transport has shut down and accepts no more traffic.
    #[error("Transport closed")]
    TransportClosed,
}

impl Error {
    pub fn decode(message: impl Into<String>) -> Self {
        Self::Decode {
            message: message.into(),
        }
    }

    /// Returns `true` if this error came from payload decoding.
    pub fn is_decode(&self) -> bool {
        matches!(self, Self::Decode { .. } | Self::Serialization(_))
    }
}
