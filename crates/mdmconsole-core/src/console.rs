// ── Console dispatcher ──
//
// Runs one action triple per operation: REQUEST is reduced before the
// transport is touched, then exactly one of SUCCESS/FAILURE once the
// response (or its absence) is classified. Generic over `Transport` so
// tests can script responses without a socket.

use std::sync::Arc;

use mdmconsole_api::{
    ApiClient, DetailResponse, Document, Failure, ListResponse, QueryParameters, RelationshipRef,
    RequestDescriptor, ResourceId, ResourceIdentifier, ResourceKind, Transport,
};
use serde_json::{Map, Value};
use tokio::task::JoinHandle;
use tokio_util::sync::CancellationToken;
use tracing::debug;

use crate::action::Action;
use crate::config::ConsoleConfig;
use crate::error::CoreError;
use crate::model::tag::normalize_color;
use crate::store::{RootState, Store};

/// Classified result of one dispatched operation.
pub type Outcome = Result<Document, Failure>;

/// The main entry point for consumers.
///
/// Cheaply cloneable: the transport and the store are shared.
pub struct Console<T> {
    transport: Arc<T>,
    store: Store,
}

impl<T> Clone for Console<T> {
    fn clone(&self) -> Self {
        Self {
            transport: Arc::clone(&self.transport),
            store: self.store.clone(),
        }
    }
}

impl Console<ApiClient> {
    /// Build the HTTP transport from `config` and start with an empty store.
    pub fn connect(config: &ConsoleConfig) -> Result<Self, CoreError> {
        Ok(Self::new(config.build_client()?))
    }
}

impl<T: Transport + 'static> Console<T> {
    pub fn new(transport: T) -> Self {
        Self::with_store(transport, Store::new())
    }

    /// Share an existing store (several consoles, one state).
    pub fn with_store(transport: T, store: Store) -> Self {
        Self {
            transport: Arc::new(transport),
            store,
        }
    }

    pub fn store(&self) -> &Store {
        &self.store
    }

    pub fn transport(&self) -> &T {
        &self.transport
    }

    pub fn snapshot(&self) -> Arc<RootState> {
        self.store.snapshot()
    }

    // ── Dispatch ─────────────────────────────────────────────────────

    /// Run one operation to completion.
    pub async fn dispatch(&self, request: &RequestDescriptor) -> Outcome {
        self.begin(request);
        self.complete(request).await
    }

    /// Like [`dispatch`](Self::dispatch), but gives up when `cancel` fires.
    ///
    /// A cancelled operation still ends with exactly one FAILURE
    /// (`Transport`, "Request cancelled").
    pub async fn dispatch_with_cancel(
        &self,
        request: &RequestDescriptor,
        cancel: &CancellationToken,
    ) -> Outcome {
        self.begin(request);
        let outcome = tokio::select! {
            biased;
            () = cancel.cancelled() => {
                debug!(%request, "cancelled before a response arrived");
                Err(Failure::from(mdmconsole_api::Error::Cancelled))
            }
            result = self.transport.execute(request) => classify(request, result),
        };
        self.finish(request, outcome)
    }

    /// Fire-and-forget: REQUEST is reduced before this returns, the
    /// terminal outcome lands in the store whenever the response does.
    pub fn spawn(&self, request: RequestDescriptor) -> JoinHandle<Outcome> {
        self.begin(&request);
        let console = self.clone();
        tokio::spawn(async move { console.complete(&request).await })
    }

    fn begin(&self, request: &RequestDescriptor) {
        debug!(%request, action = %request.types().request, "dispatch");
        self.store.dispatch(&Action::request(request));
    }

    async fn complete(&self, request: &RequestDescriptor) -> Outcome {
        let outcome = classify(request, self.transport.execute(request).await);
        self.finish(request, outcome)
    }

    fn finish(&self, request: &RequestDescriptor, outcome: Outcome) -> Outcome {
        let action = Action::from_outcome(request, outcome.clone());
        debug!(action = %action.action_type(), "settled");
        self.store.dispatch(&action);
        outcome
    }

    // ── Generic resource operations ──────────────────────────────────

    /// One page of a collection.
    pub async fn list(
        &self,
        kind: ResourceKind,
        query: &QueryParameters,
    ) -> Result<ListResponse, CoreError> {
        let request = RequestDescriptor::index(kind, query)?;
        into_list(settle(self.dispatch(&request).await)?)
    }

    /// One page of a parent's sub-collection, reduced into `kind`.
    pub async fn list_related(
        &self,
        kind: ResourceKind,
        parent: ResourceKind,
        parent_id: &ResourceId,
        query: &QueryParameters,
    ) -> Result<ListResponse, CoreError> {
        let request = RequestDescriptor::index_related(kind, parent, parent_id, query)?;
        into_list(settle(self.dispatch(&request).await)?)
    }

    pub async fn read(
        &self,
        kind: ResourceKind,
        id: impl Into<ResourceId>,
    ) -> Result<DetailResponse, CoreError> {
        let request = RequestDescriptor::read(kind, id);
        into_detail(settle(self.dispatch(&request).await)?)
    }

    pub async fn create(
        &self,
        kind: ResourceKind,
        attributes: Map<String, Value>,
    ) -> Result<Document, CoreError> {
        let request = RequestDescriptor::create(kind, attributes);
        settle(self.dispatch(&request).await)
    }

    pub async fn update(
        &self,
        kind: ResourceKind,
        id: impl Into<ResourceId>,
        attributes: Map<String, Value>,
    ) -> Result<Document, CoreError> {
        let request = RequestDescriptor::update(kind, id, attributes);
        settle(self.dispatch(&request).await)
    }

    pub async fn replace_relationship(
        &self,
        kind: ResourceKind,
        id: impl Into<ResourceId>,
        relationship: &str,
        data: RelationshipRef,
    ) -> Result<Document, CoreError> {
        let request = RequestDescriptor::replace_relationship(kind, id, relationship, data);
        settle(self.dispatch(&request).await)
    }

    pub async fn add_to_relationship(
        &self,
        kind: ResourceKind,
        id: impl Into<ResourceId>,
        relationship: &str,
        data: Vec<ResourceIdentifier>,
    ) -> Result<Document, CoreError> {
        let request = RequestDescriptor::add_to_relationship(kind, id, relationship, data);
        settle(self.dispatch(&request).await)
    }

    // ── Tags ─────────────────────────────────────────────────────────

    /// Create a tag. `color` accepts `#rrggbb` or `rrggbb`.
    pub async fn create_tag(
        &self,
        name: &str,
        color: Option<&str>,
    ) -> Result<Document, CoreError> {
        let mut attributes = Map::new();
        attributes.insert("name".into(), Value::String(name.to_owned()));
        if let Some(raw) = color {
            let color = normalize_color(raw).ok_or_else(|| CoreError::InvalidQuery {
                message: format!("tag color must be six hex digits, got `{raw}`"),
            })?;
            attributes.insert("color".into(), Value::String(color));
        }
        self.create(ResourceKind::Tags, attributes).await
    }

    /// Make `tag_ids` the complete tag set of a device.
    pub async fn set_device_tags(
        &self,
        device_id: impl Into<ResourceId>,
        tag_ids: &[ResourceId],
    ) -> Result<Document, CoreError> {
        let refs = RelationshipRef::Many(tag_identifiers(tag_ids));
        self.replace_relationship(ResourceKind::Devices, device_id, "tags", refs)
            .await
    }

    /// Attach `tag_ids` to a device, ahead of its existing tags.
    pub async fn add_device_tags(
        &self,
        device_id: impl Into<ResourceId>,
        tag_ids: &[ResourceId],
    ) -> Result<Document, CoreError> {
        self.add_to_relationship(
            ResourceKind::Devices,
            device_id,
            "tags",
            tag_identifiers(tag_ids),
        )
        .await
    }
}

// ── Outcome helpers ──────────────────────────────────────────────────

fn classify(
    request: &RequestDescriptor,
    result: Result<mdmconsole_api::RawResponse, mdmconsole_api::Error>,
) -> Outcome {
    match result {
        Ok(raw) => raw.into_document_for(request),
        Err(err) => Err(Failure::from(err)),
    }
}

/// Collapse an outcome into a plain result: error documents on the
/// success channel become [`CoreError::Rejected`].
pub fn settle(outcome: Outcome) -> Result<Document, CoreError> {
    match outcome {
        Ok(Document::Errors(errors)) => Err(CoreError::Rejected {
            status: None,
            errors,
        }),
        Ok(document) => Ok(document),
        Err(failure) => Err(CoreError::from(failure)),
    }
}

fn into_list(document: Document) -> Result<ListResponse, CoreError> {
    match document {
        Document::List(list) => Ok(list),
        other => Err(CoreError::Decode {
            message: format!("expected a list document, got {}", other.shape()),
        }),
    }
}

fn into_detail(document: Document) -> Result<DetailResponse, CoreError> {
    match document {
        Document::Detail(detail) => Ok(detail),
        other => Err(CoreError::Decode {
            message: format!("expected a detail document, got {}", other.shape()),
        }),
    }
}

fn tag_identifiers(tag_ids: &[ResourceId]) -> Vec<ResourceIdentifier> {
    tag_ids
        .iter()
        .map(|id| ResourceIdentifier::new(id.clone(), ResourceKind::Tags.type_name()))
        .collect()
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use mdmconsole_api::{ErrorObject, ErrorResponse};

    #[test]
    fn settle_routes_error_documents_to_rejected() {
        let errors = ErrorResponse::new(vec![ErrorObject::titled("Not found")]);
        let err = settle(Ok(Document::Errors(errors))).unwrap_err();
        assert!(matches!(err, CoreError::Rejected { status: None, .. }));
    }

    #[test]
    fn settle_passes_documents_through() {
        assert!(matches!(
            settle(Ok(Document::NoContent)),
            Ok(Document::NoContent)
        ));
    }

    #[test]
    fn shape_mismatch_is_a_decode_error() {
        assert!(matches!(
            into_list(Document::NoContent),
            Err(CoreError::Decode { .. })
        ));
    }

    #[test]
    fn tag_ids_become_typed_identifiers() {
        let ids = tag_identifiers(&[ResourceId::from("1"), ResourceId::from("2")]);
        assert_eq!(ids[1], ResourceIdentifier::new("2", "tags"));
    }
}
