// ── Certificate ──

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::{ResourceAttributes, timestamp};
use mdmconsole_api::ResourceKind;

/// A certificate known to the server: push, web, CA, or device identity.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct Certificate {
    /// Purpose, e.g. `mdm.pushcert`, `mdm.webcrt`, `mdm.cacert`.
    #[serde(rename = "type")]
    pub purpose: Option<String>,
    pub x509_cn: Option<String>,
    #[serde(deserialize_with = "timestamp::lenient")]
    pub not_before: Option<DateTime<Utc>>,
    #[serde(deserialize_with = "timestamp::lenient")]
    pub not_after: Option<DateTime<Utc>>,
    pub fingerprint: Option<String>,
}

impl ResourceAttributes for Certificate {
    const KIND: ResourceKind = ResourceKind::Certificates;
}

impl Certificate {
    /// `true` once `not_after` lies before `now`.
    pub fn is_expired_at(&self, now: DateTime<Utc>) -> bool {
        self.not_after.is_some_and(|end| end < now)
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use chrono::TimeZone;
    use serde_json::json;

    #[test]
    fn type_member_maps_to_purpose() {
        let cert: Certificate = serde_json::from_value(json!({
            "type": "mdm.pushcert",
            "x509_cn": "APSP:1234",
            "not_after": "2020-01-01T00:00:00+00:00"
        }))
        .unwrap();
        assert_eq!(cert.purpose.as_deref(), Some("mdm.pushcert"));
        let now = Utc.with_ymd_and_hms(2024, 1, 1, 0, 0, 0).unwrap();
        assert!(cert.is_expired_at(now));
    }
}
