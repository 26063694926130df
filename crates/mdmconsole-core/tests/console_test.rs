// Integration tests for `Console`: dispatch ordering, terminal outcomes,
// cancellation and the relationship-edit race, against scripted
// transports and a wiremock server.

use std::sync::Arc;
use std::time::Duration;

use pretty_assertions::assert_eq;
use serde_json::json;
use tokio::sync::broadcast;
use tokio_util::sync::CancellationToken;
use wiremock::matchers::{header, method, path, query_param};
use wiremock::{Mock, MockServer, ResponseTemplate};

use mdmconsole_api::{
    ApiClient, Document, Error, Failure, QueryParameters, RawResponse, RelationshipRef,
    RequestDescriptor, ResourceId, ResourceIdentifier, ResourceKind, ResourceObject, Transport,
};
use mdmconsole_core::{Action, Console, CoreError, Entity, ScepConfiguration, Tag};

// ── Scripted transports ─────────────────────────────────────────────

/// Answers every request through a closure, after a per-request delay.
struct Scripted<F> {
    respond: F,
}

impl<F> Transport for Scripted<F>
where
    F: Fn(&RequestDescriptor) -> (Duration, RawResponse) + Send + Sync,
{
    async fn execute(&self, request: &RequestDescriptor) -> Result<RawResponse, Error> {
        let (delay, response) = (self.respond)(request);
        tokio::time::sleep(delay).await;
        Ok(response)
    }
}

fn scripted<F>(respond: F) -> Console<Scripted<F>>
where
    F: Fn(&RequestDescriptor) -> (Duration, RawResponse) + Send + Sync + 'static,
{
    Console::new(Scripted { respond })
}

/// Fails every request before any bytes are exchanged.
struct Unreachable;

impl Transport for Unreachable {
    async fn execute(&self, _request: &RequestDescriptor) -> Result<RawResponse, Error> {
        Err(Error::Tls("handshake failed".into()))
    }
}

/// Never answers.
struct Silent;

impl Transport for Silent {
    async fn execute(&self, _request: &RequestDescriptor) -> Result<RawResponse, Error> {
        std::future::pending().await
    }
}

// ── Helpers ─────────────────────────────────────────────────────────

fn drain(feed: &mut broadcast::Receiver<Arc<Action>>) -> Vec<String> {
    let mut seen = Vec::new();
    while let Ok(action) = feed.try_recv() {
        seen.push(action.action_type());
    }
    seen
}

fn device_detail(id: &str, tags: &[&str]) -> String {
    let linkage: Vec<_> = tags.iter().map(|t| json!({"id": t, "type": "tags"})).collect();
    json!({
        "data": {
            "id": id,
            "type": "devices",
            "attributes": {},
            "relationships": {"tags": {"data": linkage}}
        }
    })
    .to_string()
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

// ── Ordering & terminal outcomes ────────────────────────────────────

#[tokio::test]
async fn test_success_emits_request_then_success() {
    let console = scripted(|_| {
        (
            Duration::ZERO,
            RawResponse::new(
                200,
                json!({
                    "data": [{"id": "1", "type": "tags", "attributes": {"name": "red"}}],
                    "meta": {"count": 1}
                })
                .to_string(),
            ),
        )
    });
    let mut feed = console.store().actions();

    let list = console
        .list(ResourceKind::Tags, &QueryParameters::new())
        .await
        .unwrap();
    assert_eq!(list.data.len(), 1);

    assert_eq!(drain(&mut feed), vec!["tags/INDEX_REQUEST", "tags/INDEX_SUCCESS"]);

    let snapshot = console.snapshot();
    let tags = snapshot.resource(ResourceKind::Tags).unwrap();
    assert_eq!(tags.items.len(), 1);
    assert_eq!(tags.record_count, Some(1));
    assert!(!tags.loading);
    assert!(!tags.error);
    assert!(tags.last_received.is_some());

    let decoded = Entity::<Tag>::from_envelopes(tags.items.iter().map(AsRef::as_ref)).unwrap();
    assert_eq!(decoded[0].attributes.name.as_deref(), Some("red"));
}

#[tokio::test]
async fn test_transport_error_emits_exactly_one_failure() {
    let console = Console::new(Unreachable);
    let mut feed = console.store().actions();

    let request = RequestDescriptor::read(ResourceKind::Certificates, "2");
    let outcome = console.dispatch(&request).await;

    assert!(matches!(outcome, Err(Failure::Transport { status: None, .. })));
    assert_eq!(
        drain(&mut feed),
        vec!["certificates/READ_REQUEST", "certificates/READ_FAILURE"]
    );

    let snapshot = console.snapshot();
    let state = snapshot.resource(ResourceKind::Certificates).unwrap();
    assert!(state.error);
    assert!(state.error_detail.is_none());
    assert!(!state.loading);
}

#[tokio::test]
async fn test_error_document_on_success_status_is_routed_to_error() {
    let console = scripted(|_| {
        (
            Duration::ZERO,
            RawResponse::new(200, json!({"errors": [{"title": "Not found"}]}).to_string()),
        )
    });
    let mut feed = console.store().actions();

    let err = console
        .list(ResourceKind::DeviceGroups, &QueryParameters::new())
        .await
        .unwrap_err();
    assert!(matches!(err, CoreError::Rejected { .. }));

    assert_eq!(
        drain(&mut feed),
        vec!["device_groups/INDEX_REQUEST", "device_groups/INDEX_SUCCESS"]
    );
    let snapshot = console.snapshot();
    let state = snapshot.resource(ResourceKind::DeviceGroups).unwrap();
    assert!(state.error);
    assert_eq!(
        state.error_detail.as_ref().map(|e| e.summary()),
        Some("Not found".to_owned())
    );
    assert!(state.items.is_empty());
}

#[tokio::test]
async fn test_malformed_success_body_fails_once() {
    let console = scripted(|_| (Duration::ZERO, RawResponse::new(200, "{\"data\": null}")));
    let mut feed = console.store().actions();

    let outcome = console
        .dispatch(&RequestDescriptor::read(ResourceKind::DepProfiles, "1"))
        .await;

    assert!(matches!(outcome, Err(Failure::Decode { .. })));
    assert_eq!(
        drain(&mut feed),
        vec!["dep_profiles/READ_REQUEST", "dep_profiles/READ_FAILURE"]
    );
    let snapshot = console.snapshot();
    assert!(snapshot.resource(ResourceKind::DepProfiles).unwrap().current.is_none());
}

#[tokio::test]
async fn test_spawn_reduces_request_before_returning() {
    let console = scripted(|_| {
        (
            Duration::from_millis(20),
            RawResponse::new(200, json!({"data": []}).to_string()),
        )
    });

    let request =
        RequestDescriptor::index(ResourceKind::Certificates, &QueryParameters::new()).unwrap();
    let handle = console.spawn(request);

    assert!(
        console
            .snapshot()
            .resource(ResourceKind::Certificates)
            .unwrap()
            .loading
    );

    let document = tokio_test::assert_ok!(handle.await.unwrap());
    assert!(matches!(document, Document::List(_)));
    assert!(
        !console
            .snapshot()
            .resource(ResourceKind::Certificates)
            .unwrap()
            .loading
    );
}

// ── Cancellation ────────────────────────────────────────────────────

#[tokio::test]
async fn test_cancellation_yields_exactly_one_failure() {
    let console = Console::new(Silent);
    let mut feed = console.store().actions();
    let cancel = CancellationToken::new();

    let request = RequestDescriptor::read(ResourceKind::Devices, "1");
    let canceller = {
        let cancel = cancel.clone();
        tokio::spawn(async move {
            tokio::time::sleep(Duration::from_millis(10)).await;
            cancel.cancel();
        })
    };

    let outcome = console.dispatch_with_cancel(&request, &cancel).await;
    canceller.await.unwrap();

    let Err(Failure::Transport { status, message }) = outcome else {
        panic!("expected a transport failure");
    };
    assert_eq!(status, None);
    assert!(message.to_lowercase().contains("cancelled"));
    assert_eq!(
        drain(&mut feed),
        vec!["devices/READ_REQUEST", "devices/READ_FAILURE"]
    );
}

// ── Relationship edits ──────────────────────────────────────────────

/// Two overlapping tag replacements on one device: nothing serializes
/// them, so whichever response arrives last decides the stored linkage,
/// even though it was sent first.
#[tokio::test(start_paused = true)]
async fn test_concurrent_relationship_edits_last_response_wins() {
    let console = scripted(|request| {
        if request.method == reqwest::Method::GET {
            return (Duration::ZERO, RawResponse::new(200, device_detail("9", &["0"])));
        }
        let first_tag = request
            .body
            .as_ref()
            .and_then(|b| b["data"][0]["id"].as_str())
            .unwrap_or_default()
            .to_owned();
        // The edit sent first answers last.
        let delay = if first_tag == "slow" {
            Duration::from_millis(200)
        } else {
            Duration::from_millis(50)
        };
        (
            delay,
            RawResponse::new(200, device_detail("9", &[first_tag.as_str()])),
        )
    });

    console.read(ResourceKind::Devices, "9").await.unwrap();

    let slow = console.spawn(RequestDescriptor::replace_relationship(
        ResourceKind::Devices,
        "9",
        "tags",
        RelationshipRef::Many(vec![ResourceIdentifier::new("slow", "tags")]),
    ));
    let fast = console.spawn(RequestDescriptor::replace_relationship(
        ResourceKind::Devices,
        "9",
        "tags",
        RelationshipRef::Many(vec![ResourceIdentifier::new("fast", "tags")]),
    ));

    tokio_test::assert_ok!(fast.await.unwrap());
    let after_fast = console.snapshot();
    let current = after_fast.resource(ResourceKind::Devices).unwrap().current.clone();
    assert_eq!(tag_ids(&current.unwrap()), vec!["fast"]);

    slow.await.unwrap().unwrap();
    let after_slow = console.snapshot();
    let state = after_slow.resource(ResourceKind::Devices).unwrap();
    assert_eq!(tag_ids(state.current.as_ref().unwrap()), vec!["slow"]);
    assert!(!state.relationship_loading);
}

#[tokio::test]
async fn test_add_tags_prepends_to_loaded_device() {
    let console = scripted(|request| match request.method.as_str() {
        "GET" => (Duration::ZERO, RawResponse::new(200, device_detail("3", &["1", "2"]))),
        _ => (
            Duration::ZERO,
            RawResponse::new(
                200,
                json!({"data": [{"id": "7", "type": "tags", "attributes": {}}]}).to_string(),
            ),
        ),
    });

    console.read(ResourceKind::Devices, "3").await.unwrap();
    console
        .add_device_tags("3", &[ResourceId::from("7")])
        .await
        .unwrap();

    let snapshot = console.snapshot();
    let current = snapshot
        .resource(ResourceKind::Devices)
        .unwrap()
        .current
        .clone()
        .unwrap();
    assert_eq!(tag_ids(&current), vec!["7", "1", "2"]);
}

#[tokio::test]
async fn test_invalid_tag_color_is_rejected_before_dispatch() {
    let console = Console::new(Unreachable);
    let mut feed = console.store().actions();

    let err = console.create_tag("lab", Some("not-a-color")).await.unwrap_err();
    assert!(matches!(err, CoreError::InvalidQuery { .. }));
    assert!(drain(&mut feed).is_empty());
}

// ── HTTP end to end ─────────────────────────────────────────────────

#[tokio::test]
async fn test_device_group_members_over_http() {
    let server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/api/v1/device_groups/4/devices"))
        .and(query_param("page[number]", "1"))
        .and(query_param("page[size]", "50"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "data": [
                {"id": "10", "type": "devices", "attributes": {"device_name": "Kiosk 1"}},
                {"id": "11", "type": "devices", "attributes": {"device_name": "Kiosk 2"}}
            ],
            "meta": {"count": 2}
        })))
        .expect(1)
        .mount(&server)
        .await;

    let client = ApiClient::from_reqwest(&server.uri(), reqwest::Client::new()).unwrap();
    let console = Console::new(client);

    let query = QueryParameters::new().page_size(ResourceKind::Devices.default_page_size());
    let list = console
        .list_related(
            ResourceKind::Devices,
            ResourceKind::DeviceGroups,
            &ResourceId::from("4"),
            &query,
        )
        .await
        .unwrap();

    assert_eq!(list.record_count(), Some(2));
    let snapshot = console.snapshot();
    let devices = snapshot.resource(ResourceKind::Devices).unwrap();
    assert_eq!(devices.items.len(), 2);
    assert_eq!(devices.page_size, 50);
}

#[tokio::test]
async fn test_not_found_over_http() {
    let server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/api/v1/tags/404"))
        .respond_with(ResponseTemplate::new(404).set_body_json(json!({
            "errors": [{"status": "404", "title": "Not Found"}]
        })))
        .mount(&server)
        .await;

    let client = ApiClient::from_reqwest(&server.uri(), reqwest::Client::new()).unwrap();
    let console = Console::new(client);

    let err = console.read(ResourceKind::Tags, "404").await.unwrap_err();
    assert_eq!(err.status(), Some(404));

    let snapshot = console.snapshot();
    let tags = snapshot.resource(ResourceKind::Tags).unwrap();
    assert!(tags.error);
    assert!(matches!(tags.failure, Some(Failure::Protocol { status: 404, .. })));
}

#[tokio::test]
async fn test_scep_configuration_served_as_plain_json() {
    let server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/api/v1/scep_configurations/1"))
        .and(header("accept", "application/json"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "url": "https://scep.example.com/scep",
            "challenge_enabled": true,
            "key_size": 2048
        })))
        .expect(1)
        .mount(&server)
        .await;

    let client = ApiClient::from_reqwest(&server.uri(), reqwest::Client::new()).unwrap();
    let console = Console::new(client);
    let mut feed = console.store().actions();

    let detail = console
        .read(ResourceKind::ScepConfigurations, "1")
        .await
        .unwrap();
    let scep = Entity::<ScepConfiguration>::from_envelope(&detail.data).unwrap();
    assert_eq!(scep.id.as_str(), "1");
    assert_eq!(scep.attributes.url.as_deref(), Some("https://scep.example.com/scep"));
    assert_eq!(scep.attributes.key_size, Some(2048));

    assert_eq!(
        drain(&mut feed),
        vec![
            "scep_configurations/READ_REQUEST",
            "scep_configurations/READ_SUCCESS"
        ]
    );
    let snapshot = console.snapshot();
    let state = snapshot.resource(ResourceKind::ScepConfigurations).unwrap();
    assert!(!state.error);
    assert!(state.failure.is_none());
    assert_eq!(state.current.as_ref().map(|c| c.id.as_str()), Some("1"));
}

#[tokio::test]
async fn test_numeric_error_status_keeps_detail() {
    let console = scripted(|_| {
        (
            Duration::ZERO,
            RawResponse::new(
                422,
                json!({"errors": [{"status": 422, "title": "Invalid color"}]}).to_string(),
            ),
        )
    });

    let err = console
        .create_tag("lab", Some("ff8800"))
        .await
        .unwrap_err();
    assert_eq!(err.status(), Some(422));

    let snapshot = console.snapshot();
    let tags = snapshot.resource(ResourceKind::Tags).unwrap();
    assert!(tags.error);
    assert_eq!(tags.error_detail.as_ref().unwrap().summary(), "Invalid color");
}
