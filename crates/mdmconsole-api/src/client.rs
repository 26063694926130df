// Async HTTP client for the MDM console JSON-API.
//
// Base path: /api/v1/
// Auth: `Authorization: Bearer <token>` header

use reqwest::header::{AUTHORIZATION, HeaderMap, HeaderValue};
use secrecy::{ExposeSecret, SecretString};
use tracing::{debug, trace};
use url::Url;

use crate::Error;
use crate::action::RequestDescriptor;
use crate::jsonapi::{Document, Failure, decode_plain_response, decode_response};
use crate::transport::{MediaType, Transport, TransportConfig};

// ── Raw response ─────────────────────────────────────────────────────

/// Status and body of one completed HTTP exchange, not yet classified.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RawResponse {
    pub status: u16,
    pub body: String,
}

impl RawResponse {
    pub fn new(status: u16, body: impl Into<String>) -> Self {
        Self {
            status,
            body: body.into(),
        }
    }

    pub fn is_success(&self) -> bool {
        (200..300).contains(&self.status)
    }

    /// Classify into a success document or a failure.
    pub fn into_document(self) -> Result<Document, Failure> {
        decode_response(self.status, &self.body)
    }

    /// Classify according to the channel `request` was sent on: plain-JSON
    /// bodies are typed with the request's resource kind and target id.
    pub fn into_document_for(self, request: &RequestDescriptor) -> Result<Document, Failure> {
        match request.media_type {
            MediaType::JsonApi => self.into_document(),
            MediaType::Json => decode_plain_response(
                self.status,
                &self.body,
                request.kind.type_name(),
                request.operation.target_id(),
            ),
        }
    }
}

// ── Client ───────────────────────────────────────────────────────────

/// Async client for the console's `/api/v1/` resources.
///
/// Holds no per-request state; clone freely (the inner `reqwest::Client`
/// is reference-counted).
#[derive(Debug, Clone)]
pub struct ApiClient {
    http: reqwest::Client,
    base_url: Url,
}

impl ApiClient {
    // ── Constructors ─────────────────────────────────────────────────

    /// Build from a server URL, an optional bearer token and a transport config.
    ///
    /// The token is injected as a sensitive default header on every request.
    pub fn new(
        base_url: &str,
        token: Option<&SecretString>,
        transport: &TransportConfig,
    ) -> Result<Self, Error> {
        let mut headers = HeaderMap::new();
        if let Some(token) = token {
            let mut value = HeaderValue::from_str(&format!("Bearer {}", token.expose_secret()))
                .map_err(|e| Error::InvalidToken {
                    message: format!("invalid bearer token header value: {e}"),
                })?;
            value.set_sensitive(true);
            headers.insert(AUTHORIZATION, value);
        }

        let http = transport.build_client_with_headers(headers)?;
        Self::from_reqwest(base_url, http)
    }

    /// Wrap an existing `reqwest::Client` (caller manages auth headers).
    pub fn from_reqwest(base_url: &str, http: reqwest::Client) -> Result<Self, Error> {
        let base_url = Url::parse(base_url)?;
        Ok(Self { http, base_url })
    }

    pub fn base_url(&self) -> &Url {
        &self.base_url
    }

    // ── URL builder ──────────────────────────────────────────────────

    /// Resolve a descriptor endpoint (`/api/v1/...?...`) against the base.
    ///
    /// Any path on the base URL is kept as a prefix, so a console served
    /// under `https://host/mdm/` resolves to `https://host/mdm/api/v1/...`.
    fn url(&self, endpoint: &str) -> Result<Url, Error> {
        let base = self.base_url.as_str().trim_end_matches('/');
        Ok(Url::parse(&format!("{base}{endpoint}"))?)
    }

    // ── Execution ────────────────────────────────────────────────────

    /// Send one descriptor and collect status and body.
    ///
    /// Non-2xx statuses are not errors here; only failures to complete
    /// the exchange are.
    pub async fn execute(&self, request: &RequestDescriptor) -> Result<RawResponse, Error> {
        let url = self.url(&request.endpoint)?;
        debug!("{} {url}", request.method);

        let mut builder = self
            .http
            .request(request.method.clone(), url)
            .headers(request.media_type.headers());
        if let Some(body) = &request.body {
            builder = builder.body(serde_json::to_vec(body)?);
        }

        let resp = builder.send().await?;
        let status = resp.status().as_u16();
        let body = resp.text().await?;
        trace!(status, bytes = body.len(), "response received");

        Ok(RawResponse { status, body })
    }
}

impl Transport for ApiClient {
    async fn execute(&self, request: &RequestDescriptor) -> Result<RawResponse, Error> {
        ApiClient::execute(self, request).await
    }
}
