// ── Core error types ──
//
// User-facing errors from mdmconsole-core. These are NOT wire-specific --
// consumers never see reqwest errors or JSON parse failures directly.
// The `From<mdmconsole_api::Error>` impl translates codec and transport
// errors into domain-appropriate variants, and `From<Failure>` does the
// same for terminal outcomes read back out of the store.

use mdmconsole_api::{ErrorResponse, Failure};
use thiserror::Error;

/// Unified error type for the core crate.
#[derive(Debug, Error)]
pub enum CoreError {
    // ── Connection errors ────────────────────────────────────────────
    #[error("Cannot connect to console at {url}: {reason}")]
    ConnectionFailed { url: String, reason: String },

    #[error("Authentication failed: {message}")]
    AuthenticationFailed { message: String },

    #[error("Request timed out")]
    Timeout,

    #[error("Request cancelled")]
    Cancelled,

    // ── Data errors ──────────────────────────────────────────────────
    #[error("Not found: {resource} with id {identifier}")]
    NotFound {
        resource: String,
        identifier: String,
    },

    #[error("Unexpected response: {message}")]
    Decode { message: String },

    // ── Operation errors ─────────────────────────────────────────────
    #[error("Invalid query: {message}")]
    InvalidQuery { message: String },

    #[error("Server rejected the request: {}", .errors.summary())]
    Rejected {
        status: Option<u16>,
        errors: ErrorResponse,
    },

    // ── API errors (wrapped, not exposed raw) ────────────────────────
    #[error("API error: {message}")]
    Api {
        message: String,
        /// HTTP status code (if applicable).
        status: Option<u16>,
    },

    // ── Configuration errors ─────────────────────────────────────────
    #[error("Configuration error: {message}")]
    Config { message: String },
}

impl CoreError {
    /// HTTP status behind this error, when one was received.
    pub fn status(&self) -> Option<u16> {
        match self {
            Self::Rejected { status, .. } | Self::Api { status, .. } => *status,
            _ => None,
        }
    }
}

// ── Conversion from codec/transport errors ───────────────────────────

impl From<mdmconsole_api::Error> for CoreError {
    fn from(err: mdmconsole_api::Error) -> Self {
        match err {
            mdmconsole_api::Error::Transport(ref e) => {
                if e.is_timeout() {
                    CoreError::Timeout
                } else if e.is_connect() {
                    CoreError::ConnectionFailed {
                        url: e
                            .url()
                            .map(|u| u.to_string())
                            .unwrap_or_else(|| "<unknown>".into()),
                        reason: e.to_string(),
                    }
                } else {
                    CoreError::Api {
                        message: e.to_string(),
                        status: e.status().map(|s| s.as_u16()),
                    }
                }
            }
            mdmconsole_api::Error::InvalidUrl(e) => CoreError::Config {
                message: format!("Invalid URL: {e}"),
            },
            mdmconsole_api::Error::Tls(msg) => CoreError::ConnectionFailed {
                url: String::new(),
                reason: format!("TLS error: {msg}"),
            },
            mdmconsole_api::Error::InvalidToken { message } => {
                CoreError::AuthenticationFailed { message }
            }
            mdmconsole_api::Error::Cancelled => CoreError::Cancelled,
            mdmconsole_api::Error::UnsupportedOperator(op) => CoreError::InvalidQuery {
                message: format!("unsupported filter operator `{op}`"),
            },
            mdmconsole_api::Error::InvalidQuery { message } => CoreError::InvalidQuery { message },
            mdmconsole_api::Error::Decode { message, body: _ } => CoreError::Decode { message },
            mdmconsole_api::Error::Serialization(e) => CoreError::Api {
                message: format!("failed to serialize request body: {e}"),
                status: None,
            },
        }
    }
}

impl From<Failure> for CoreError {
    fn from(failure: Failure) -> Self {
        match failure {
            Failure::Protocol { status, errors } => match status {
                401 | 403 => CoreError::AuthenticationFailed {
                    message: errors.summary(),
                },
                _ => CoreError::Rejected {
                    status: Some(status),
                    errors,
                },
            },
            Failure::Transport {
                status: Some(401 | 403),
                message,
            } => CoreError::AuthenticationFailed { message },
            Failure::Transport {
                status: Some(404),
                message,
            } => CoreError::NotFound {
                resource: "resource".into(),
                identifier: message,
            },
            Failure::Transport { status, message } => CoreError::Api { message, status },
            Failure::Decode { message, body: _ } => CoreError::Decode { message },
        }
    }
}
