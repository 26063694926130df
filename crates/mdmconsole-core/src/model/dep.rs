// ── DEP (Device Enrollment Program) ──

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::{ResourceAttributes, timestamp};
use mdmconsole_api::ResourceKind;

/// A DEP server token registered with Apple Business/School Manager.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct DepAccount {
    pub server_name: Option<String>,
    pub server_uuid: Option<String>,
    pub admin_id: Option<String>,
    pub org_name: Option<String>,
    pub org_email: Option<String>,
    pub org_phone: Option<String>,
    pub org_address: Option<String>,
    #[serde(deserialize_with = "timestamp::lenient")]
    pub access_token_expiry: Option<DateTime<Utc>>,
    /// Sync cursor; opaque.
    pub cursor: Option<String>,
}

impl ResourceAttributes for DepAccount {
    const KIND: ResourceKind = ResourceKind::DepAccounts;
}

/// A DEP enrollment profile pushed to assigned devices.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct DepProfile {
    pub profile_name: Option<String>,
    pub uuid: Option<String>,
    pub url: Option<String>,
    pub allow_pairing: Option<bool>,
    pub is_supervised: Option<bool>,
    pub is_multi_user: Option<bool>,
    pub is_mandatory: Option<bool>,
    pub await_device_configured: Option<bool>,
    pub is_mdm_removable: Option<bool>,
    pub support_phone_number: Option<String>,
    pub support_email_address: Option<String>,
    pub org_magic: Option<String>,
    pub department: Option<String>,
    pub language: Option<String>,
    pub region: Option<String>,
    /// Setup Assistant panes to skip.
    pub skip_setup_items: Option<Vec<String>>,
}

impl ResourceAttributes for DepProfile {
    const KIND: ResourceKind = ResourceKind::DepProfiles;
}
