// ── JSON-API wire documents ──
//
// Resource envelopes, relationship linkage and the three top-level
// document shapes (list, detail, errors). Field names follow the
// JSON-API member names; `type` is renamed to `resource_type`.

use std::fmt;

use indexmap::IndexMap;
use serde::de::DeserializeOwned;
use serde::{Deserialize, Deserializer, Serialize};
use serde_json::{Map, Value};

use crate::Error;

// ── Identifiers ──────────────────────────────────────────────────────

/// Resource id as carried on the wire.
///
/// JSON-API mandates string ids, but the server emits integer primary
/// keys for some resources. Numbers are accepted on decode and
/// normalized to their decimal string; ids always serialize as strings.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize)]
#[serde(transparent)]
pub struct ResourceId(String);

impl ResourceId {
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl<'de> Deserialize<'de> for ResourceId {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        #[derive(Deserialize)]
        #[serde(untagged)]
        enum Raw {
            Str(String),
            Signed(i64),
            Unsigned(u64),
        }

        Ok(match Raw::deserialize(deserializer)? {
            Raw::Str(s) => Self(s),
            Raw::Signed(n) => Self(n.to_string()),
            Raw::Unsigned(n) => Self(n.to_string()),
        })
    }
}

impl fmt::Display for ResourceId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for ResourceId {
    fn from(s: &str) -> Self {
        Self(s.to_owned())
    }
}

impl From<String> for ResourceId {
    fn from(s: String) -> Self {
        Self(s)
    }
}

impl From<u64> for ResourceId {
    fn from(n: u64) -> Self {
        Self(n.to_string())
    }
}

/// A `{id, type}` linkage pair.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ResourceIdentifier {
    pub id: ResourceId,
    #[serde(rename = "type")]
    pub resource_type: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub meta: Option<Value>,
}

impl ResourceIdentifier {
    pub fn new(id: impl Into<ResourceId>, resource_type: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            resource_type: resource_type.into(),
            meta: None,
        }
    }

    /// Same `(id, type)` pair, ignoring `meta`.
    pub fn same_resource(&self, other: &Self) -> bool {
        self.id == other.id && self.resource_type == other.resource_type
    }
}

// ── Relationships ────────────────────────────────────────────────────

/// Relationship linkage: to-one or to-many.
///
/// Discriminated once here so callers never shape-check `data` again.
/// A JSON object decodes as `Single`, an array as `Many`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum RelationshipRef {
    Single(ResourceIdentifier),
    Many(Vec<ResourceIdentifier>),
}

impl RelationshipRef {
    /// View the linkage as a slice regardless of cardinality.
    pub fn identifiers(&self) -> &[ResourceIdentifier] {
        match self {
            Self::Single(one) => std::slice::from_ref(one),
            Self::Many(many) => many,
        }
    }

    pub fn into_identifiers(self) -> Vec<ResourceIdentifier> {
        match self {
            Self::Single(one) => vec![one],
            Self::Many(many) => many,
        }
    }

    pub fn is_many(&self) -> bool {
        matches!(self, Self::Many(_))
    }

    pub fn len(&self) -> usize {
        self.identifiers().len()
    }

    pub fn is_empty(&self) -> bool {
        self.identifiers().is_empty()
    }
}

/// A relationship member of a resource envelope.
///
/// `data` is `None` both for an empty to-one (`"data": null`) and for
/// relationships that only carry `links`.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Relationship {
    #[serde(default)]
    pub data: Option<RelationshipRef>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub links: Option<Value>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub meta: Option<Value>,
}

impl Relationship {
    pub fn new(data: RelationshipRef) -> Self {
        Self {
            data: Some(data),
            links: None,
            meta: None,
        }
    }

    /// Linked identifiers; empty when `data` is absent or null.
    pub fn identifiers(&self) -> &[ResourceIdentifier] {
        match &self.data {
            Some(data) => data.identifiers(),
            None => &[],
        }
    }
}

// ── Resource envelope ────────────────────────────────────────────────

/// One resource instance on the wire: `{id, type, attributes, relationships}`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ResourceObject {
    pub id: ResourceId,
    #[serde(rename = "type")]
    pub resource_type: String,
    /// Absent in bare identifier documents; decodes as empty.
    #[serde(default)]
    pub attributes: Map<String, Value>,
    #[serde(default, skip_serializing_if = "IndexMap::is_empty")]
    pub relationships: IndexMap<String, Relationship>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub links: Option<Value>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub meta: Option<Value>,
}

impl ResourceObject {
    pub fn new(id: impl Into<ResourceId>, resource_type: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            resource_type: resource_type.into(),
            attributes: Map::new(),
            relationships: IndexMap::new(),
            links: None,
            meta: None,
        }
    }

    pub fn identifier(&self) -> ResourceIdentifier {
        ResourceIdentifier::new(self.id.clone(), self.resource_type.clone())
    }

    pub fn is(&self, id: &ResourceId, resource_type: &str) -> bool {
        self.id == *id && self.resource_type == resource_type
    }

    pub fn attribute(&self, name: &str) -> Option<&Value> {
        self.attributes.get(name)
    }

    /// String-valued attribute, if present and a string.
    pub fn attribute_str(&self, name: &str) -> Option<&str> {
        self.attributes.get(name).and_then(Value::as_str)
    }

    pub fn relationship(&self, name: &str) -> Option<&Relationship> {
        self.relationships.get(name)
    }

    /// Deserialize `attributes` into a typed model.
    pub fn attributes_as<T: DeserializeOwned>(&self) -> Result<T, Error> {
        T::deserialize(&Value::Object(self.attributes.clone())).map_err(|e| {
            Error::decode(
                format!("attributes of {}/{}: {e}", self.resource_type, self.id),
                Value::Object(self.attributes.clone()).to_string(),
            )
        })
    }

    /// A new envelope with `name` set to `relationship`; `self` is untouched.
    #[must_use]
    pub fn with_relationship(&self, name: &str, relationship: Relationship) -> Self {
        let mut next = self.clone();
        next.relationships.insert(name.to_owned(), relationship);
        next
    }

    #[must_use]
    pub fn with_attributes(mut self, attributes: Map<String, Value>) -> Self {
        self.attributes = attributes;
        self
    }
}

// ── Top-level documents ──────────────────────────────────────────────

/// `meta` of an index response.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct ListMeta {
    /// Total matching records server-side, not the page length.
    pub count: u64,
}

/// Paged index result.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ListResponse {
    pub data: Vec<ResourceObject>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub included: Vec<ResourceObject>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub meta: Option<ListMeta>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub links: Option<Value>,
}

impl ListResponse {
    pub fn record_count(&self) -> Option<u64> {
        self.meta.map(|m| m.count)
    }
}

/// Single-resource result of a read, create, update or relationship patch.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DetailResponse {
    pub data: ResourceObject,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub included: Vec<ResourceObject>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub links: Option<Value>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub meta: Option<Value>,
}

/// Pointer into the request document that caused an error.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ErrorSource {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub pointer: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub parameter: Option<String>,
}

/// One entry of an `errors` array.
///
/// Decoding never fails: `id`, `status` and `code` may arrive as numbers,
/// a bare string entry becomes the title, and any other entry is kept
/// verbatim in `meta`.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(from = "WireError")]
pub struct ErrorObject {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub id: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub status: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub code: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub title: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub detail: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub source: Option<ErrorSource>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub meta: Option<Value>,
}

impl ErrorObject {
    pub fn titled(title: impl Into<String>) -> Self {
        Self {
            title: Some(title.into()),
            ..Self::default()
        }
    }

    /// `title: detail`, falling back to whichever is present.
    pub fn message(&self) -> String {
        match (self.title.as_deref(), self.detail.as_deref()) {
            (Some(t), Some(d)) => format!("{t}: {d}"),
            (Some(t), None) => t.to_owned(),
            (None, Some(d)) => d.to_owned(),
            (None, None) => self
                .code
                .clone()
                .or_else(|| self.status.clone())
                .unwrap_or_else(|| "unknown error".into()),
        }
    }
}

/// Any `errors` array entry as the server sent it.
#[derive(Deserialize)]
#[serde(untagged)]
enum WireError {
    Object(Map<String, Value>),
    Text(String),
    Other(Value),
}

/// Strings pass through, numbers and other scalars use their JSON text.
fn scalar_text(value: Value) -> Option<String> {
    match value {
        Value::Null => None,
        Value::String(s) => Some(s),
        other => Some(other.to_string()),
    }
}

impl From<WireError> for ErrorObject {
    fn from(wire: WireError) -> Self {
        match wire {
            WireError::Object(mut members) => {
                let mut text = |name: &str| members.remove(name).and_then(scalar_text);
                let (id, status, code) = (text("id"), text("status"), text("code"));
                let (title, detail) = (text("title"), text("detail"));
                Self {
                    id,
                    status,
                    code,
                    title,
                    detail,
                    source: members
                        .remove("source")
                        .and_then(|v| serde_json::from_value(v).ok()),
                    meta: members.remove("meta"),
                }
            }
            WireError::Text(title) => Self::titled(title),
            WireError::Other(value) => Self {
                meta: Some(value),
                ..Self::default()
            },
        }
    }
}

/// Error document: `{errors: [...]}`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ErrorResponse {
    pub errors: Vec<ErrorObject>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub meta: Option<Value>,
}

impl ErrorResponse {
    pub fn new(errors: Vec<ErrorObject>) -> Self {
        Self { errors, meta: None }
    }

    /// All error messages joined with `; ` for one-line display.
    pub fn summary(&self) -> String {
        self.errors
            .iter()
            .map(ErrorObject::message)
            .collect::<Vec<_>>()
            .join("; ")
    }
}
