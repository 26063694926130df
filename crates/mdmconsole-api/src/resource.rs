// ── Resource kinds ──
//
// The closed set of server resources the console manages, with their
// JSON-API type names and collection paths under `/api/v1/`.

use serde::{Deserialize, Serialize};

use crate::transport::MediaType;

/// Every server-managed resource type.
#[derive(
    Debug,
    Clone,
    Copy,
    PartialEq,
    Eq,
    Hash,
    PartialOrd,
    Ord,
    Serialize,
    Deserialize,
    strum::Display,
    strum::EnumString,
    strum::IntoStaticStr,
    strum::EnumIter,
)]
#[serde(rename_all = "snake_case")]
#[strum(serialize_all = "snake_case")]
pub enum ResourceKind {
    Devices,
    Tags,
    Certificates,
    DepAccounts,
    DepProfiles,
    DeviceGroups,
    ScepConfigurations,
}

impl ResourceKind {
    /// JSON-API `type` member for this resource.
    pub fn type_name(self) -> &'static str {
        self.into()
    }

    /// Collection path relative to `/api/v1/`.
    pub fn collection_path(self) -> &'static str {
        match self {
            Self::Devices => "devices",
            Self::Tags => "tags",
            Self::Certificates => "certificates",
            Self::DepAccounts => "dep/accounts",
            Self::DepProfiles => "dep/profiles",
            Self::DeviceGroups => "device_groups",
            Self::ScepConfigurations => "scep_configurations",
        }
    }

    /// Page size a fresh store starts with.
    pub fn default_page_size(self) -> u32 {
        match self {
            Self::Devices => 50,
            _ => crate::jsonapi::DEFAULT_PAGE_SIZE,
        }
    }

    /// SCEP configuration lives behind the plain-JSON header set;
    /// everything else is JSON-API.
    pub fn media_type(self) -> MediaType {
        match self {
            Self::ScepConfigurations => MediaType::Json,
            _ => MediaType::JsonApi,
        }
    }

    /// Resolve a JSON-API `type` string back to a kind.
    pub fn from_type_name(name: &str) -> Option<Self> {
        name.parse().ok()
    }
}
