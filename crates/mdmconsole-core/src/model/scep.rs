// ── SCEP configuration ──

use serde::{Deserialize, Serialize};

use super::ResourceAttributes;
use mdmconsole_api::ResourceKind;

/// Allowed uses of the issued key.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, strum::Display, strum::EnumString,
)]
#[serde(rename_all = "snake_case")]
#[strum(serialize_all = "snake_case")]
pub enum KeyUsage {
    Signing,
    Encryption,
    All,
}

/// How devices obtain their identity certificate.
///
/// Served as plain JSON rather than JSON-API.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ScepConfiguration {
    pub url: Option<String>,
    pub challenge_enabled: Option<bool>,
    /// Shared secret; never rendered.
    #[serde(skip_serializing)]
    pub challenge: Option<String>,
    pub ca_fingerprint: Option<String>,
    /// e.g. `O=Acme/OU=IT/CN=%HardwareUUID%`.
    pub subject: Option<String>,
    pub key_size: Option<u32>,
    pub key_type: Option<String>,
    pub key_usage: Option<KeyUsage>,
    pub retries: Option<u32>,
    pub retry_delay: Option<u32>,
    /// Days before expiry at which devices renew.
    pub certificate_renewal_time_interval: Option<u32>,
}

impl ResourceAttributes for ScepConfiguration {
    const KIND: ResourceKind = ResourceKind::ScepConfigurations;
}
