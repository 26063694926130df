use thiserror::Error;

/// Top-level error type for the `mdmconsole-api` crate.
///
/// Covers transport setup, query encoding and payload decoding.
/// `mdmconsole-core` maps these into user-facing diagnostics.
#[derive(Debug, Error)]
pub enum Error {
    // ── Transport ───────────────────────────────────────────────────
    /// HTTP transport error (connection refused, DNS failure, etc.)
    #[error("HTTP transport error: {0}")]
    Transport(#[from] reqwest::Error),

    /// URL parsing error.
    #[error("Invalid URL: {0}")]
    InvalidUrl(#[from] url::ParseError),

    /// TLS handshake or certificate error.
    #[error("TLS error: {0}")]
    Tls(String),

    /// Bearer token could not be turned into a header value.
    #[error("Invalid authorization header: {message}")]
    InvalidToken { message: String },

    /// The request was abandoned before a response arrived.
    #[error("Request cancelled")]
    Cancelled,

    // ── Query encoding ──────────────────────────────────────────────
    /// Filter operator outside the server's supported set.
    #[error("Unsupported filter operator: {0}")]
    UnsupportedOperator(String),

    /// Query parameters that can never be accepted (page 0, empty sort field, ...).
    #[error("Invalid query: {message}")]
    InvalidQuery { message: String },

    // ── Data ────────────────────────────────────────────────────────
    /// Payload matched neither the data nor the error document shape,
    /// or a member failed to deserialize. Carries the raw body.
    #[error("Decode error: {message}")]
    Decode { message: String, body: String },

    /// Request body could not be serialized.
    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),
}

impl Error {
    /// Returns `true` if this is a transient error worth retrying by hand.
    pub fn is_transient(&self) -> bool {
        match self {
            Self::Transport(e) => e.is_timeout() || e.is_connect(),
            _ => false,
        }
    }

    /// Returns `true` if the request timed out.
    pub fn is_timeout(&self) -> bool {
        matches!(self, Self::Transport(e) if e.is_timeout())
    }

    /// Returns `true` for payload-shape violations.
    pub fn is_decode(&self) -> bool {
        matches!(self, Self::Decode { .. })
    }

    pub(crate) fn decode(message: impl Into<String>, body: impl Into<String>) -> Self {
        Self::Decode {
            message: message.into(),
            body: body.into(),
        }
    }
}
