// ── Device group ──

use serde::{Deserialize, Serialize};

use super::ResourceAttributes;
use mdmconsole_api::ResourceKind;

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct DeviceGroup {
    pub name: Option<String>,
    pub description: Option<String>,
}

impl ResourceAttributes for DeviceGroup {
    const KIND: ResourceKind = ResourceKind::DeviceGroups;
}
