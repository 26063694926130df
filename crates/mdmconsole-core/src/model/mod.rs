// ── Typed resource models ──
//
// Attribute structs for each resource kind. The store keeps raw
// envelopes; consumers (CLI tables, scripts) decode into these on read.
// Every field is optional so partial sparse-fieldset payloads still
// decode.

pub mod certificate;
pub mod dep;
pub mod device;
pub mod device_group;
pub mod scep;
pub mod tag;

mod timestamp;

use mdmconsole_api::{ResourceId, ResourceKind, ResourceObject};
use serde::Serialize;
use serde::de::DeserializeOwned;

use crate::error::CoreError;

// ── Re-exports ──────────────────────────────────────────────────────

pub use certificate::Certificate;
pub use dep::{DepAccount, DepProfile};
pub use device::Device;
pub use device_group::DeviceGroup;
pub use scep::{KeyUsage, ScepConfiguration};
pub use tag::Tag;

/// Attribute model bound to the resource kind it decodes.
pub trait ResourceAttributes: DeserializeOwned + Serialize {
    const KIND: ResourceKind;
}

/// A decoded envelope: id plus typed attributes.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Entity<T> {
    pub id: ResourceId,
    #[serde(flatten)]
    pub attributes: T,
}

impl<T: ResourceAttributes> Entity<T> {
    /// Decode one envelope, checking its `type` against `T::KIND`.
    pub fn from_envelope(envelope: &ResourceObject) -> Result<Self, CoreError> {
        let expected = T::KIND.type_name();
        if envelope.resource_type != expected {
            return Err(CoreError::Decode {
                message: format!(
                    "expected a `{expected}` resource, got `{}`",
                    envelope.resource_type
                ),
            });
        }
        Ok(Self {
            id: envelope.id.clone(),
            attributes: envelope.attributes_as()?,
        })
    }

    /// Decode every envelope of a page.
    pub fn from_envelopes<'a, I>(envelopes: I) -> Result<Vec<Self>, CoreError>
    where
        I: IntoIterator<Item = &'a ResourceObject>,
    {
        envelopes.into_iter().map(Self::from_envelope).collect()
    }
}
