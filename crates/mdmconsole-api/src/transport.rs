// Shared transport configuration and the `Transport` seam.
//
// `ApiClient` is the production transport; the dispatcher in
// mdmconsole-core is generic over `Transport` so tests can script
// responses without a socket.

use std::future::Future;
use std::path::PathBuf;
use std::time::Duration;

use reqwest::header::{ACCEPT, CONTENT_TYPE, HeaderMap, HeaderValue};

use crate::action::RequestDescriptor;
use crate::client::RawResponse;
use crate::error::Error;

/// JSON-API media type used for all resource CRUD.
pub const JSONAPI_MEDIA_TYPE: &str = "application/vnd.api+json";

/// Plain JSON media type for non-JSON-API endpoints.
pub const JSON_MEDIA_TYPE: &str = "application/json";

/// Which header set a request carries.
///
/// The response discriminator ignores headers, so both sets are
/// decoded the same way.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum MediaType {
    #[default]
    JsonApi,
    Json,
}

impl MediaType {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::JsonApi => JSONAPI_MEDIA_TYPE,
            Self::Json => JSON_MEDIA_TYPE,
        }
    }

    /// `Accept` + `Content-Type` headers for this media type.
    pub fn headers(self) -> HeaderMap {
        let value = HeaderValue::from_static(self.as_str());
        let mut headers = HeaderMap::new();
        headers.insert(ACCEPT, value.clone());
        headers.insert(CONTENT_TYPE, value);
        headers
    }
}

/// TLS verification mode (api-level mirror of core's `TlsVerification`).
#[derive(Debug, Clone, Default)]
pub enum TlsMode {
    /// Use the system certificate store.
    #[default]
    System,
    /// Use a custom CA certificate from the given PEM file.
    CustomCa(PathBuf),
    /// Accept any certificate (self-signed development servers).
    DangerAcceptInvalid,
}

/// Shared transport configuration for building HTTP clients.
#[derive(Debug, Clone)]
pub struct TransportConfig {
    pub tls: TlsMode,
    pub timeout: Duration,
}

impl Default for TransportConfig {
    fn default() -> Self {
        Self {
            tls: TlsMode::System,
            timeout: Duration::from_secs(30),
        }
    }
}

impl TransportConfig {
    /// Build a `reqwest::Client` from this config.
    pub fn build_client(&self) -> Result<reqwest::Client, Error> {
        self.build_client_with_headers(HeaderMap::new())
    }

    /// Build a `reqwest::Client` with additional default headers.
    ///
    /// Used to inject the `Authorization` header when a token is configured.
    pub fn build_client_with_headers(&self, headers: HeaderMap) -> Result<reqwest::Client, Error> {
        let mut builder = reqwest::Client::builder()
            .timeout(self.timeout)
            .user_agent(concat!("mdmconsole/", env!("CARGO_PKG_VERSION")))
            .default_headers(headers);

        match &self.tls {
            TlsMode::System => {}
            TlsMode::CustomCa(path) => {
                let cert_pem = std::fs::read(path)
                    .map_err(|e| Error::Tls(format!("failed to read CA cert: {e}")))?;
                let cert = reqwest::Certificate::from_pem(&cert_pem)
                    .map_err(|e| Error::Tls(format!("invalid CA cert: {e}")))?;
                builder = builder.add_root_certificate(cert);
            }
            TlsMode::DangerAcceptInvalid => {
                builder = builder.danger_accept_invalid_certs(true);
            }
        }

        builder
            .build()
            .map_err(|e| Error::Tls(format!("failed to build HTTP client: {e}")))
    }
}

/// Executes one request descriptor and returns the raw response.
///
/// Implementations perform exactly one network call per invocation and
/// never interpret the body; classification happens in
/// [`decode_response`](crate::decode_response).
pub trait Transport: Send + Sync {
    fn execute(
        &self,
        request: &RequestDescriptor,
    ) -> impl Future<Output = Result<RawResponse, Error>> + Send;
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn media_type_headers_set_accept_and_content_type() {
        let headers = MediaType::JsonApi.headers();
        assert_eq!(headers[ACCEPT], "application/vnd.api+json");
        assert_eq!(headers[CONTENT_TYPE], "application/vnd.api+json");

        let plain = MediaType::Json.headers();
        assert_eq!(plain[ACCEPT], "application/json");
    }

    #[test]
    fn missing_ca_file_is_a_tls_error() {
        let config = TransportConfig {
            tls: TlsMode::CustomCa(PathBuf::from("/nonexistent/ca.pem")),
            ..TransportConfig::default()
        };
        assert!(matches!(config.build_client(), Err(Error::Tls(_))));
    }
}
