// ── Store state ──
//
// Plain data. Envelopes are shared behind `Arc` so a reduction only
// clones the slots it actually changes.

use std::collections::BTreeMap;
use std::sync::Arc;

use chrono::{DateTime, Utc};
use mdmconsole_api::{ErrorResponse, Failure, ResourceId, ResourceKind, ResourceObject};
use strum::IntoEnumIterator;

/// Per-resource slice of the store.
#[derive(Debug, Clone, PartialEq)]
pub struct ResourceState {
    /// Current page of envelopes, in server order.
    pub items: Vec<Arc<ResourceObject>>,
    pub loading: bool,
    pub error: bool,
    /// Structured server errors from the last error document, if any.
    pub error_detail: Option<ErrorResponse>,
    /// The last FAILURE outcome, kept for transport/decode messages that
    /// carry no error document.
    pub failure: Option<Failure>,
    pub current_page: u32,
    pub page_size: u32,
    /// Server-side total from `meta.count` of the last index.
    pub record_count: Option<u64>,
    /// Envelope from the last detail read, create or update.
    pub current: Option<Arc<ResourceObject>>,
    /// Side-loaded envelopes of the last list or detail response.
    pub included: Vec<Arc<ResourceObject>>,
    /// A relationship edit is in flight.
    pub relationship_loading: bool,
    pub last_received: Option<DateTime<Utc>>,
}

impl ResourceState {
    pub fn new(kind: ResourceKind) -> Self {
        Self {
            items: Vec::new(),
            loading: false,
            error: false,
            error_detail: None,
            failure: None,
            current_page: 1,
            page_size: kind.default_page_size(),
            record_count: None,
            current: None,
            included: Vec::new(),
            relationship_loading: false,
            last_received: None,
        }
    }

    pub fn item(&self, id: &ResourceId) -> Option<&Arc<ResourceObject>> {
        self.items.iter().find(|item| item.id == *id)
    }

    /// Side-loaded envelopes of one JSON-API type.
    pub fn included_of<'a>(
        &'a self,
        resource_type: &'a str,
    ) -> impl Iterator<Item = &'a Arc<ResourceObject>> + 'a {
        self.included
            .iter()
            .filter(move |inc| inc.resource_type == resource_type)
    }

    /// Number of pages implied by `record_count`, when known.
    pub fn page_count(&self) -> Option<u64> {
        let size = u64::from(self.page_size.max(1));
        self.record_count.map(|count| count.div_ceil(size).max(1))
    }
}

/// Whole-store snapshot: one `ResourceState` per kind, all present from
/// the start.
#[derive(Debug, Clone, PartialEq)]
pub struct RootState {
    resources: BTreeMap<ResourceKind, ResourceState>,
}

impl RootState {
    pub fn new() -> Self {
        Self {
            resources: ResourceKind::iter()
                .map(|kind| (kind, ResourceState::new(kind)))
                .collect(),
        }
    }

    pub fn resource(&self, kind: ResourceKind) -> Option<&ResourceState> {
        self.resources.get(&kind)
    }

    /// A copy of this state with `kind`'s slice replaced.
    #[must_use]
    pub fn with_resource(&self, kind: ResourceKind, state: ResourceState) -> Self {
        let mut next = self.clone();
        next.resources.insert(kind, state);
        next
    }

    pub fn iter(&self) -> impl Iterator<Item = (ResourceKind, &ResourceState)> {
        self.resources.iter().map(|(kind, state)| (*kind, state))
    }
}

impl Default for RootState {
    fn default() -> Self {
        Self::new()
    }
}
