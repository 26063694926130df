// ── Device ──

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::{ResourceAttributes, timestamp};
use mdmconsole_api::ResourceKind;

/// An enrolled (or DEP-assigned, not yet enrolled) Apple device.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Device {
    pub udid: Option<String>,
    pub serial_number: Option<String>,
    pub device_name: Option<String>,
    pub model_name: Option<String>,
    pub model: Option<String>,
    pub product_name: Option<String>,
    pub os_version: Option<String>,
    pub build_version: Option<String>,
    pub is_enrolled: Option<bool>,
    pub is_supervised: Option<bool>,
    pub is_dep: Option<bool>,
    pub is_activation_lock_enabled: Option<bool>,
    #[serde(deserialize_with = "timestamp::lenient")]
    pub last_seen: Option<DateTime<Utc>>,
    /// 0.0 - 1.0, or -1.0 when the device never reported it.
    pub battery_level: Option<f64>,
    pub device_capacity: Option<f64>,
    pub available_device_capacity: Option<f64>,
    pub wifi_mac: Option<String>,
    pub bluetooth_mac: Option<String>,
    pub imei: Option<String>,
    pub phone_number: Option<String>,
    pub hostname: Option<String>,
    pub description: Option<String>,
    pub asset_tag: Option<String>,
    pub os: Option<String>,
    pub device_family: Option<String>,
}

impl ResourceAttributes for Device {
    const KIND: ResourceKind = ResourceKind::Devices;
}

impl Device {
    /// Best human label: device name, then model name, then serial.
    pub fn display_name(&self) -> &str {
        self.device_name
            .as_deref()
            .or(self.model_name.as_deref())
            .or(self.serial_number.as_deref())
            .unwrap_or("-")
    }

    /// Battery as a whole percentage, when reported.
    #[allow(
        clippy::as_conversions,
        clippy::cast_possible_truncation,
        clippy::cast_sign_loss
    )]
    pub fn battery_percent(&self) -> Option<u8> {
        let level = self.battery_level.filter(|l| (0.0..=1.0).contains(l))?;
        Some((level * 100.0).round() as u8)
    }
}
