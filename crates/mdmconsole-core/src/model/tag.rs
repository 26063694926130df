// ── Tag ──

use serde::{Deserialize, Serialize};

use super::ResourceAttributes;
use mdmconsole_api::ResourceKind;

/// Color the server assigns when none is given.
pub const DEFAULT_TAG_COLOR: &str = "888888";

/// A free-form label attached to devices.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Tag {
    #[serde(default)]
    pub name: Option<String>,
    /// Six hex digits, no leading `#`.
    #[serde(default)]
    pub color: Option<String>,
}

impl ResourceAttributes for Tag {
    const KIND: ResourceKind = ResourceKind::Tags;
}

/// Normalize user input like `#FF8800` to the stored `ff8800` form.
///
/// Returns `None` unless the input is exactly six hex digits.
pub fn normalize_color(raw: &str) -> Option<String> {
    let hex = raw.trim().trim_start_matches('#');
    (hex.len() == 6 && hex.chars().all(|c| c.is_ascii_hexdigit()))
        .then(|| hex.to_ascii_lowercase())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn colors_normalize_to_bare_lowercase_hex() {
        assert_eq!(normalize_color("#FF8800").as_deref(), Some("ff8800"));
        assert_eq!(normalize_color("00aa11").as_deref(), Some("00aa11"));
        assert_eq!(normalize_color("red"), None);
        assert_eq!(normalize_color("#12345"), None);
    }
}
