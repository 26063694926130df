// ── Runtime connection configuration ──
//
// These types describe *how* to reach an MDM console server.
// They carry the bearer token and connection tuning, but never touch disk.
// The CLI constructs a `ConsoleConfig` and hands it in.

use std::time::Duration;

use mdmconsole_api::{ApiClient, TlsMode, TransportConfig};
use secrecy::SecretString;
use url::Url;

use crate::error::CoreError;

/// TLS verification strategy.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub enum TlsVerification {
    /// System CA store (strict).
    #[default]
    SystemDefaults,
    /// Custom CA certificate file.
    CustomCa(std::path::PathBuf),
    /// Skip verification (self-signed development servers).
    DangerAcceptInvalid,
}

impl From<&TlsVerification> for TlsMode {
    fn from(tls: &TlsVerification) -> Self {
        match tls {
            TlsVerification::SystemDefaults => TlsMode::System,
            TlsVerification::CustomCa(path) => TlsMode::CustomCa(path.clone()),
            TlsVerification::DangerAcceptInvalid => TlsMode::DangerAcceptInvalid,
        }
    }
}

/// Configuration for talking to a single console server.
///
/// Built by the CLI, passed to [`Console`](crate::Console) -- core never
/// reads config files.
#[derive(Debug, Clone)]
pub struct ConsoleConfig {
    /// Server URL (e.g., `https://mdm.example.com`).
    pub url: Url,
    /// Bearer token, when the server requires one.
    pub token: Option<SecretString>,
    /// TLS verification strategy.
    pub tls: TlsVerification,
    /// Request timeout.
    pub timeout: Duration,
}

impl ConsoleConfig {
    pub fn new(url: Url) -> Self {
        Self {
            url,
            token: None,
            tls: TlsVerification::default(),
            timeout: Duration::from_secs(30),
        }
    }

    pub fn transport(&self) -> TransportConfig {
        TransportConfig {
            tls: TlsMode::from(&self.tls),
            timeout: self.timeout,
        }
    }

    /// Build the HTTP client this configuration describes.
    pub fn build_client(&self) -> Result<ApiClient, CoreError> {
        Ok(ApiClient::new(
            self.url.as_str(),
            self.token.as_ref(),
            &self.transport(),
        )?)
    }
}
