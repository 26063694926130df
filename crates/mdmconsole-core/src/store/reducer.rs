// ── Reducer ──
//
// `(state, action) -> state`, total and side-effect free apart from
// tracing. Every phase/operation/document combination has a defined
// transition; combinations that cannot come from a well-behaved server
// mark the slice as errored instead of guessing.

use std::sync::Arc;

use mdmconsole_api::jsonapi::relationship;
use mdmconsole_api::{
    Document, ErrorResponse, Failure, Operation, Relationship, RelationshipRef, ResourceId,
    ResourceIdentifier, ResourceKind, ResourceObject,
};
use tracing::{debug, warn};

use super::state::{ResourceState, RootState};
use crate::action::{Action, ActionPhase};

/// Apply one action to the whole store.
pub fn reduce(state: &RootState, action: &Action) -> RootState {
    let Some(slice) = state.resource(action.kind) else {
        debug!(kind = %action.kind, "no slice for resource kind, action ignored");
        return state.clone();
    };
    debug!(action = %action.action_type(), "reduce");
    state.with_resource(action.kind, reduce_resource(slice, action))
}

/// Apply one action to a single resource slice.
pub fn reduce_resource(state: &ResourceState, action: &Action) -> ResourceState {
    match &action.phase {
        ActionPhase::Request => on_request(state, &action.operation),
        ActionPhase::Success(Document::Errors(errors)) => on_error_document(state, errors),
        ActionPhase::Success(document) => on_success(state, action, document),
        ActionPhase::Failure(failure) => on_failure(state, failure),
    }
}

// ── Phases ───────────────────────────────────────────────────────────

fn on_request(state: &ResourceState, operation: &Operation) -> ResourceState {
    let mut next = state.clone();
    match operation {
        Operation::Index { page } => {
            next.loading = true;
            next.current_page = page.number;
            next.page_size = page.size;
        }
        Operation::Read { .. } | Operation::Create | Operation::Update { .. } => {
            next.loading = true;
        }
        Operation::ReplaceRelationship { .. } | Operation::AddToRelationship { .. } => {
            next.relationship_loading = true;
        }
    }
    next
}

fn on_error_document(state: &ResourceState, errors: &ErrorResponse) -> ResourceState {
    warn!(errors = %errors.summary(), "error document delivered as success");
    let mut next = settled(state);
    next.error = true;
    next.error_detail = Some(errors.clone());
    next.failure = None;
    next
}

fn on_failure(state: &ResourceState, failure: &Failure) -> ResourceState {
    warn!(%failure, "request failed");
    let mut next = settled(state);
    next.error = true;
    next.error_detail = failure.error_detail().cloned();
    next.failure = Some(failure.clone());
    next
}

fn on_success(state: &ResourceState, action: &Action, document: &Document) -> ResourceState {
    match (&action.operation, document) {
        (Operation::Index { .. }, Document::List(list)) => {
            let mut next = accepted(state, action);
            next.items = shared(&list.data);
            next.included = shared(&list.included);
            next.record_count = list.record_count();
            next
        }

        (Operation::Read { .. } | Operation::Update { .. }, Document::Detail(detail)) => {
            let mut next = accepted(state, action);
            let envelope = Arc::new(detail.data.clone());
            swap_item(&mut next.items, &envelope);
            next.current = Some(envelope);
            next.included = shared(&detail.included);
            next
        }

        (Operation::Create, Document::Detail(detail)) => {
            let mut next = accepted(state, action);
            let envelope = Arc::new(detail.data.clone());
            next.items.insert(0, Arc::clone(&envelope));
            next.current = Some(envelope);
            next.included = shared(&detail.included);
            next
        }

        (Operation::Create | Operation::Update { .. }, Document::NoContent) => {
            accepted(state, action)
        }

        (
            Operation::ReplaceRelationship {
                id,
                relationship: name,
                data,
            },
            Document::List(_) | Document::Detail(_) | Document::NoContent,
        ) => {
            let refs = replacement_refs(document, name, data);
            let mut next = accepted(state, action);
            edit_relationship(&mut next, action.kind, id, name, |existing| {
                relationship::replace(existing, refs.clone())
            });
            next
        }

        (
            Operation::AddToRelationship {
                id,
                relationship: name,
                data,
            },
            Document::List(_) | Document::Detail(_) | Document::NoContent,
        ) => {
            let entries = appended_entries(document, data);
            let mut next = accepted(state, action);
            edit_relationship(&mut next, action.kind, id, name, |existing| {
                relationship::append(existing, entries.clone())
            });
            next
        }

        (operation, document) => {
            warn!(
                op = operation.tag(),
                shape = document.shape(),
                "response shape does not fit the operation"
            );
            let mut next = settled(state);
            next.error = true;
            next.error_detail = None;
            next.failure = Some(Failure::Decode {
                message: format!(
                    "{} response to a {} request",
                    document.shape(),
                    operation.tag()
                ),
                body: String::new(),
            });
            next
        }
    }
}

// ── Helpers ──────────────────────────────────────────────────────────

/// Clear both in-flight flags.
fn settled(state: &ResourceState) -> ResourceState {
    let mut next = state.clone();
    next.loading = false;
    next.relationship_loading = false;
    next
}

/// Settled and error-free, stamped with the receive time.
fn accepted(state: &ResourceState, action: &Action) -> ResourceState {
    let mut next = settled(state);
    next.error = false;
    next.error_detail = None;
    next.failure = None;
    if action.received_at.is_some() {
        next.last_received = action.received_at;
    }
    next
}

fn shared(envelopes: &[ResourceObject]) -> Vec<Arc<ResourceObject>> {
    envelopes.iter().cloned().map(Arc::new).collect()
}

/// Replace the item with the same identity as `envelope`, if listed.
fn swap_item(items: &mut [Arc<ResourceObject>], envelope: &Arc<ResourceObject>) {
    for item in items.iter_mut() {
        if item.is(&envelope.id, &envelope.resource_type) {
            *item = Arc::clone(envelope);
        }
    }
}

/// Server-echoed linkage wins; the request body is the fallback.
fn replacement_refs(
    document: &Document,
    name: &str,
    requested: &RelationshipRef,
) -> RelationshipRef {
    match document {
        Document::Detail(detail) => detail
            .data
            .relationship(name)
            .and_then(|rel| rel.data.clone())
            .unwrap_or_else(|| requested.clone()),
        Document::List(list) => {
            RelationshipRef::Many(list.data.iter().map(ResourceObject::identifier).collect())
        }
        Document::Errors(_) | Document::NoContent => requested.clone(),
    }
}

fn appended_entries(
    document: &Document,
    requested: &[ResourceIdentifier],
) -> Vec<ResourceIdentifier> {
    match document {
        Document::List(list) => list.data.iter().map(ResourceObject::identifier).collect(),
        Document::Detail(detail) => vec![detail.data.identifier()],
        Document::Errors(_) | Document::NoContent => requested.to_vec(),
    }
}

/// Install a recomputed relationship on `current` and every listed item
/// matching `id`. Envelopes are rebuilt, never mutated in place.
fn edit_relationship(
    state: &mut ResourceState,
    kind: ResourceKind,
    id: &ResourceId,
    name: &str,
    edit: impl Fn(&Relationship) -> Relationship,
) {
    let rebuild = |envelope: &ResourceObject| {
        let existing = envelope.relationship(name).cloned().unwrap_or_default();
        Arc::new(envelope.with_relationship(name, edit(&existing)))
    };

    let mut touched = false;
    let rebuilt_current = state
        .current
        .as_ref()
        .filter(|current| current.is(id, kind.type_name()))
        .map(|current| rebuild(current.as_ref()));
    if let Some(current) = rebuilt_current {
        state.current = Some(current);
        touched = true;
    }
    for item in &mut state.items {
        if item.is(id, kind.type_name()) {
            let rebuilt = rebuild(item.as_ref());
            *item = rebuilt;
            touched = true;
        }
    }

    if !touched {
        debug!(
            %kind,
            %id,
            relationship = name,
            "relationship edit for an envelope not in the store"
        );
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use chrono::{TimeZone, Utc};
    use mdmconsole_api::{
        DetailResponse, ErrorObject, ListResponse, QueryParameters, RequestDescriptor,
        decode_response,
    };
    use pretty_assertions::assert_eq;
    use serde_json::json;

    fn tags_index() -> RequestDescriptor {
        RequestDescriptor::index(ResourceKind::Tags, &QueryParameters::new()).unwrap()
    }

    fn document(body: serde_json::Value) -> Document {
        decode_response(200, &body.to_string()).unwrap()
    }

    fn tag_ref(id: &str) -> ResourceIdentifier {
        ResourceIdentifier::new(id, "tags")
    }

    fn device_with_tags(id: &str, tags: &[&str]) -> ResourceObject {
        ResourceObject::new(id, "devices").with_relationship(
            "tags",
            Relationship::new(RelationshipRef::Many(tags.iter().map(|t| tag_ref(t)).collect())),
        )
    }

    fn tag_ids(envelope: &ResourceObject) -> Vec<String> {
        envelope
            .relationship("tags")
            .map(|rel| {
                rel.identifiers()
                    .iter()
                    .map(|i| i.id.as_str().to_owned())
                    .collect()
            })
            .unwrap_or_default()
    }

    fn devices_with_current(envelope: ResourceObject) -> ResourceState {
        let mut state = ResourceState::new(ResourceKind::Devices);
        let envelope = Arc::new(envelope);
        state.items = vec![Arc::clone(&envelope)];
        state.current = Some(envelope);
        state
    }

    #[test]
    fn request_sets_loading_and_page() {
        let query = QueryParameters::new().page(3).page_size(15);
        let descriptor = RequestDescriptor::index(ResourceKind::Tags, &query).unwrap();
        let next = reduce_resource(
            &ResourceState::new(ResourceKind::Tags),
            &Action::request(&descriptor),
        );
        assert!(next.loading);
        assert_eq!(next.current_page, 3);
        assert_eq!(next.page_size, 15);
    }

    #[test]
    fn tags_list_success_fills_items() {
        let descriptor = tags_index();
        let loading = reduce_resource(
            &ResourceState::new(ResourceKind::Tags),
            &Action::request(&descriptor),
        );
        let doc = document(json!({
            "data": [{"id": "1", "type": "tags", "attributes": {"name": "red"}}],
            "meta": {"count": 1}
        }));
        let at = Utc.with_ymd_and_hms(2024, 5, 1, 12, 0, 0).unwrap();
        let next = reduce_resource(&loading, &Action::success(&descriptor, doc).received_at(at));

        assert_eq!(next.items.len(), 1);
        assert_eq!(next.items[0].id.as_str(), "1");
        assert_eq!(next.items[0].attribute_str("name"), Some("red"));
        assert_eq!(next.record_count, Some(1));
        assert!(!next.loading);
        assert!(!next.error);
        assert_eq!(next.last_received, Some(at));
    }

    #[test]
    fn error_document_on_success_keeps_items() {
        let descriptor = tags_index();
        let mut prior = ResourceState::new(ResourceKind::Tags);
        prior.items = vec![Arc::new(ResourceObject::new("9", "tags"))];
        prior.loading = true;

        let doc = document(json!({"errors": [{"title": "Not found"}]}));
        let next = reduce_resource(&prior, &Action::success(&descriptor, doc));

        assert!(next.error);
        assert_eq!(
            next.error_detail,
            Some(ErrorResponse::new(vec![ErrorObject::titled("Not found")]))
        );
        assert_eq!(next.items, prior.items);
        assert!(!next.loading);
    }

    #[test]
    fn transport_failure_sets_error_without_detail() {
        let descriptor = tags_index();
        let failure = Failure::Transport {
            status: Some(503),
            message: "unavailable".into(),
        };
        let next = reduce_resource(
            &ResourceState::new(ResourceKind::Tags),
            &Action::failure(&descriptor, failure.clone()),
        );
        assert!(next.error);
        assert!(next.error_detail.is_none());
        assert_eq!(next.failure, Some(failure));
    }

    #[test]
    fn protocol_failure_populates_detail() {
        let errors = ErrorResponse::new(vec![ErrorObject::titled("Invalid")]);
        let next = reduce_resource(
            &ResourceState::new(ResourceKind::Tags),
            &Action::failure(
                &tags_index(),
                Failure::Protocol {
                    status: 422,
                    errors: errors.clone(),
                },
            ),
        );
        assert_eq!(next.error_detail, Some(errors));
    }

    #[test]
    fn successful_reload_clears_previous_error() {
        let descriptor = tags_index();
        let mut prior = ResourceState::new(ResourceKind::Tags);
        prior.error = true;
        prior.error_detail = Some(ErrorResponse::new(vec![ErrorObject::titled("old")]));

        let next = reduce_resource(
            &prior,
            &Action::success(&descriptor, document(json!({"data": []}))),
        );
        assert!(!next.error);
        assert!(next.error_detail.is_none());
        assert_eq!(next.record_count, None);
    }

    #[test]
    fn read_sets_current_and_included() {
        let descriptor = RequestDescriptor::read(ResourceKind::Devices, "7");
        let doc = document(json!({
            "data": {"id": "7", "type": "devices", "attributes": {"device_name": "kiosk"}},
            "included": [{"id": "1", "type": "tags", "attributes": {"name": "lab"}}]
        }));
        let next = reduce_resource(
            &ResourceState::new(ResourceKind::Devices),
            &Action::success(&descriptor, doc),
        );
        let current = next.current.as_ref().unwrap();
        assert_eq!(current.attribute_str("device_name"), Some("kiosk"));
        assert_eq!(next.included_of("tags").count(), 1);
    }

    #[test]
    fn create_prepends_new_item() {
        let mut prior = ResourceState::new(ResourceKind::Tags);
        prior.items = vec![Arc::new(ResourceObject::new("1", "tags"))];
        let descriptor = RequestDescriptor::create(ResourceKind::Tags, serde_json::Map::new());
        let doc = Document::Detail(DetailResponse {
            data: ResourceObject::new("2", "tags"),
            included: Vec::new(),
            links: None,
            meta: None,
        });

        let next = reduce_resource(&prior, &Action::success(&descriptor, doc));
        let ids: Vec<&str> = next.items.iter().map(|i| i.id.as_str()).collect();
        assert_eq!(ids, vec!["2", "1"]);
        assert_eq!(next.current.as_ref().map(|c| c.id.as_str()), Some("2"));
    }

    #[test]
    fn update_swaps_matching_item() {
        let mut prior = ResourceState::new(ResourceKind::Tags);
        prior.items = vec![
            Arc::new(ResourceObject::new("1", "tags")),
            Arc::new(ResourceObject::new("2", "tags")),
        ];
        let mut attributes = serde_json::Map::new();
        attributes.insert("name".into(), json!("renamed"));
        let updated = ResourceObject::new("2", "tags").with_attributes(attributes.clone());

        let descriptor = RequestDescriptor::update(ResourceKind::Tags, "2", attributes);
        let doc = Document::Detail(DetailResponse {
            data: updated,
            included: Vec::new(),
            links: None,
            meta: None,
        });
        let next = reduce_resource(&prior, &Action::success(&descriptor, doc));
        assert_eq!(next.items[1].attribute_str("name"), Some("renamed"));
        assert_eq!(next.items[0].attribute_str("name"), None);
    }

    #[test]
    fn replace_relationship_uses_server_linkage() {
        let prior = devices_with_current(device_with_tags("5", &["1", "2"]));
        let descriptor = RequestDescriptor::replace_relationship(
            ResourceKind::Devices,
            "5",
            "tags",
            RelationshipRef::Many(vec![tag_ref("3")]),
        );
        let doc = Document::Detail(DetailResponse {
            data: device_with_tags("5", &["3", "4"]),
            included: Vec::new(),
            links: None,
            meta: None,
        });

        let loading = reduce_resource(&prior, &Action::request(&descriptor));
        assert!(loading.relationship_loading);

        let next = reduce_resource(&loading, &Action::success(&descriptor, doc));
        assert_eq!(tag_ids(next.current.as_ref().unwrap()), vec!["3", "4"]);
        assert_eq!(tag_ids(&next.items[0]), vec!["3", "4"]);
        assert!(!next.relationship_loading);
        // The prior snapshot is untouched.
        assert_eq!(tag_ids(prior.current.as_ref().unwrap()), vec!["1", "2"]);
    }

    #[test]
    fn replace_relationship_without_body_uses_request() {
        let prior = devices_with_current(device_with_tags("5", &["1"]));
        let descriptor = RequestDescriptor::replace_relationship(
            ResourceKind::Devices,
            "5",
            "tags",
            RelationshipRef::Many(vec![]),
        );
        let next = reduce_resource(&prior, &Action::success(&descriptor, Document::NoContent));
        assert!(tag_ids(next.current.as_ref().unwrap()).is_empty());
    }

    #[test]
    fn add_to_relationship_prepends_response_entries() {
        let prior = devices_with_current(device_with_tags("5", &["1", "2"]));
        let descriptor = RequestDescriptor::add_to_relationship(
            ResourceKind::Devices,
            "5",
            "tags",
            vec![tag_ref("A"), tag_ref("B")],
        );
        let doc = Document::List(ListResponse {
            data: vec![ResourceObject::new("A", "tags"), ResourceObject::new("B", "tags")],
            included: Vec::new(),
            meta: None,
            links: None,
        });
        let next = reduce_resource(&prior, &Action::success(&descriptor, doc));
        assert_eq!(tag_ids(next.current.as_ref().unwrap()), vec!["A", "B", "1", "2"]);
    }

    #[test]
    fn relationship_failure_clears_loading() {
        let prior = devices_with_current(device_with_tags("5", &["1"]));
        let descriptor = RequestDescriptor::add_to_relationship(
            ResourceKind::Devices,
            "5",
            "tags",
            vec![tag_ref("2")],
        );
        let loading = reduce_resource(&prior, &Action::request(&descriptor));
        let next = reduce_resource(
            &loading,
            &Action::failure(
                &descriptor,
                Failure::Transport {
                    status: None,
                    message: "reset".into(),
                },
            ),
        );
        assert!(!next.relationship_loading);
        assert!(next.error);
        assert_eq!(tag_ids(next.current.as_ref().unwrap()), vec!["1"]);
    }

    #[test]
    fn mismatched_shape_is_an_error_not_data() {
        let descriptor = tags_index();
        let doc = document(json!({"data": {"id": "1", "type": "tags"}}));
        let next = reduce_resource(
            &ResourceState::new(ResourceKind::Tags),
            &Action::success(&descriptor, doc),
        );
        assert!(next.error);
        assert!(next.items.is_empty());
        assert!(matches!(next.failure, Some(Failure::Decode { .. })));
    }

    #[test]
    fn reduce_only_touches_the_action_kind() {
        let root = RootState::new();
        let descriptor = tags_index();
        let next = reduce(&root, &Action::request(&descriptor));
        assert!(next.resource(ResourceKind::Tags).unwrap().loading);
        assert_eq!(
            next.resource(ResourceKind::Devices),
            root.resource(ResourceKind::Devices)
        );
    }
}
