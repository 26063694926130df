// mdmconsole-api: JSON-API client codec and HTTP transport for MDM console servers

//! Typed JSON-API plumbing shared by every resource the console manages.
//!
//! - **[`jsonapi`]** -- wire documents ([`ResourceObject`], [`Relationship`],
//!   list/detail/error responses), the query-parameter encoder, the
//!   response discriminator and the relationship normalizer.
//! - **[`action`]** -- the action-triple factory: [`RequestDescriptor`]s
//!   bound to `<resource>/<OP>_REQUEST|SUCCESS|FAILURE` identifiers.
//! - **[`ApiClient`]** -- reqwest-backed [`Transport`] that executes a
//!   descriptor and hands back the raw response for classification.

pub mod action;
pub mod client;
pub mod error;
pub mod jsonapi;
pub mod resource;
pub mod transport;

pub use action::{ActionTypes, Operation, Phase, RequestDescriptor};
pub use client::{ApiClient, RawResponse};
pub use error::Error;
pub use jsonapi::{
    DetailResponse, Document, ErrorObject, ErrorResponse, ErrorSource, Failure, Filter, FilterOp,
    ListMeta, ListResponse, PageParams, QueryParameters, Relationship, RelationshipRef, ResourceId,
    ResourceIdentifier, ResourceObject, decode_plain_response, decode_response, discriminate,
    discriminate_plain,
};
pub use resource::ResourceKind;
pub use transport::{MediaType, TlsMode, Transport, TransportConfig};
