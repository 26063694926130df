// ── Action-triple factory ──
//
// Every resource operation is described by a `RequestDescriptor`: the
// HTTP call to make plus the REQUEST/SUCCESS/FAILURE identifiers it
// reports under. Building a descriptor performs no I/O.

use std::fmt;

use reqwest::Method;
use serde_json::{Map, Value, json};

use crate::error::Error;
use crate::jsonapi::{
    PageParams, QueryParameters, RelationshipRef, ResourceId, ResourceIdentifier,
};
use crate::resource::ResourceKind;
use crate::transport::MediaType;

/// Path prefix of every API endpoint.
pub const API_PREFIX: &str = "/api/v1";

/// What a descriptor does, with the ids the reducer needs afterwards.
#[derive(Debug, Clone, PartialEq)]
pub enum Operation {
    /// Paged list of a collection (or a parent's sub-collection).
    Index { page: PageParams },
    /// Single resource by id.
    Read { id: ResourceId },
    /// New resource from attributes.
    Create,
    /// Attribute update of an existing resource.
    Update { id: ResourceId },
    /// Replace a relationship's linkage wholesale.
    ReplaceRelationship {
        id: ResourceId,
        relationship: String,
        data: RelationshipRef,
    },
    /// Add members to a to-many relationship.
    AddToRelationship {
        id: ResourceId,
        relationship: String,
        data: Vec<ResourceIdentifier>,
    },
}

impl Operation {
    /// Operation segment of the action identifiers.
    pub fn tag(&self) -> &'static str {
        match self {
            Self::Index { .. } => "INDEX",
            Self::Read { .. } => "READ",
            Self::Create => "POST",
            Self::Update { .. } => "PATCH",
            Self::ReplaceRelationship { .. } => "RPATCH",
            Self::AddToRelationship { .. } => "RCPOST",
        }
    }

    /// Id of the resource the operation targets, if it has one.
    pub fn target_id(&self) -> Option<&ResourceId> {
        match self {
            Self::Index { .. } | Self::Create => None,
            Self::Read { id }
            | Self::Update { id }
            | Self::ReplaceRelationship { id, .. }
            | Self::AddToRelationship { id, .. } => Some(id),
        }
    }
}

/// Lifecycle phase of one operation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Phase {
    Request,
    Success,
    Failure,
}

impl Phase {
    pub fn suffix(self) -> &'static str {
        match self {
            Self::Request => "REQUEST",
            Self::Success => "SUCCESS",
            Self::Failure => "FAILURE",
        }
    }
}

/// The three action identifiers of one operation, e.g.
/// `tags/INDEX_REQUEST`, `tags/INDEX_SUCCESS`, `tags/INDEX_FAILURE`.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct ActionTypes {
    pub request: String,
    pub success: String,
    pub failure: String,
}

impl ActionTypes {
    pub fn new(kind: ResourceKind, operation: &Operation) -> Self {
        let prefix = format!("{}/{}", kind.type_name(), operation.tag());
        Self {
            request: format!("{prefix}_{}", Phase::Request.suffix()),
            success: format!("{prefix}_{}", Phase::Success.suffix()),
            failure: format!("{prefix}_{}", Phase::Failure.suffix()),
        }
    }

    pub fn for_phase(&self, phase: Phase) -> &str {
        match phase {
            Phase::Request => &self.request,
            Phase::Success => &self.success,
            Phase::Failure => &self.failure,
        }
    }
}

/// A dispatchable unit of work: one HTTP call bound to one action triple.
#[derive(Debug, Clone, PartialEq)]
pub struct RequestDescriptor {
    pub kind: ResourceKind,
    pub operation: Operation,
    pub method: Method,
    /// Absolute path plus encoded query, e.g. `/api/v1/tags?page[number]=1&page[size]=20`.
    pub endpoint: String,
    pub media_type: MediaType,
    pub body: Option<Value>,
}

impl RequestDescriptor {
    fn new(kind: ResourceKind, operation: Operation, method: Method, endpoint: String) -> Self {
        Self {
            kind,
            operation,
            method,
            endpoint,
            media_type: kind.media_type(),
            body: None,
        }
    }

    /// `GET /api/v1/<collection>?<query>`.
    pub fn index(kind: ResourceKind, query: &QueryParameters) -> Result<Self, Error> {
        let endpoint = format!(
            "{}?{}",
            collection_endpoint(kind),
            query.to_query_string()?
        );
        Ok(Self::new(
            kind,
            Operation::Index { page: query.page },
            Method::GET,
            endpoint,
        ))
    }

    /// `GET /api/v1/<parent>/<id>/<collection>?<query>`, e.g. the devices
    /// of one device group. Reduced into `kind`'s state.
    pub fn index_related(
        kind: ResourceKind,
        parent: ResourceKind,
        parent_id: &ResourceId,
        query: &QueryParameters,
    ) -> Result<Self, Error> {
        let endpoint = format!(
            "{}/{parent_id}/{}?{}",
            collection_endpoint(parent),
            kind.type_name(),
            query.to_query_string()?
        );
        Ok(Self::new(
            kind,
            Operation::Index { page: query.page },
            Method::GET,
            endpoint,
        ))
    }

    /// `GET /api/v1/<collection>/<id>`.
    pub fn read(kind: ResourceKind, id: impl Into<ResourceId>) -> Self {
        let id = id.into();
        let endpoint = member_endpoint(kind, &id);
        Self::new(kind, Operation::Read { id }, Method::GET, endpoint)
    }

    /// `POST /api/v1/<collection>` with `{data: {type, attributes}}`.
    pub fn create(kind: ResourceKind, attributes: Map<String, Value>) -> Self {
        let mut descriptor =
            Self::new(kind, Operation::Create, Method::POST, collection_endpoint(kind));
        descriptor.body = Some(json!({
            "data": {
                "type": kind.type_name(),
                "attributes": attributes,
            }
        }));
        descriptor
    }

    /// `PATCH /api/v1/<collection>/<id>` with `{data: {type, id, attributes}}`.
    pub fn update(
        kind: ResourceKind,
        id: impl Into<ResourceId>,
        attributes: Map<String, Value>,
    ) -> Self {
        let id = id.into();
        let endpoint = member_endpoint(kind, &id);
        let body = json!({
            "data": {
                "type": kind.type_name(),
                "id": id,
                "attributes": attributes,
            }
        });
        let mut descriptor = Self::new(kind, Operation::Update { id }, Method::PATCH, endpoint);
        descriptor.body = Some(body);
        descriptor
    }

    /// `PATCH /api/v1/<collection>/<id>/relationships/<rel>` with the
    /// complete new linkage.
    pub fn replace_relationship(
        kind: ResourceKind,
        id: impl Into<ResourceId>,
        relationship: impl Into<String>,
        data: RelationshipRef,
    ) -> Self {
        let id = id.into();
        let relationship = relationship.into();
        let endpoint = relationship_endpoint(kind, &id, &relationship);
        let body = json!({ "data": data });
        let mut descriptor = Self::new(
            kind,
            Operation::ReplaceRelationship {
                id,
                relationship,
                data,
            },
            Method::PATCH,
            endpoint,
        );
        descriptor.body = Some(body);
        descriptor
    }

    /// `POST /api/v1/<collection>/<id>/relationships/<rel>` adding members.
    pub fn add_to_relationship(
        kind: ResourceKind,
        id: impl Into<ResourceId>,
        relationship: impl Into<String>,
        data: Vec<ResourceIdentifier>,
    ) -> Self {
        let id = id.into();
        let relationship = relationship.into();
        let endpoint = relationship_endpoint(kind, &id, &relationship);
        let body = json!({ "data": data });
        let mut descriptor = Self::new(
            kind,
            Operation::AddToRelationship {
                id,
                relationship,
                data,
            },
            Method::POST,
            endpoint,
        );
        descriptor.body = Some(body);
        descriptor
    }

    /// Override the header set (plain-JSON endpoints).
    #[must_use]
    pub fn with_media_type(mut self, media_type: MediaType) -> Self {
        self.media_type = media_type;
        self
    }

    /// The action identifiers this descriptor reports under.
    pub fn types(&self) -> ActionTypes {
        ActionTypes::new(self.kind, &self.operation)
    }
}

impl fmt::Display for RequestDescriptor {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} {}", self.method, self.endpoint)
    }
}

fn collection_endpoint(kind: ResourceKind) -> String {
    format!("{API_PREFIX}/{}", kind.collection_path())
}

fn member_endpoint(kind: ResourceKind, id: &ResourceId) -> String {
    format!("{}/{id}", collection_endpoint(kind))
}

fn relationship_endpoint(kind: ResourceKind, id: &ResourceId, relationship: &str) -> String {
    format!("{}/relationships/{relationship}", member_endpoint(kind, id))
}
