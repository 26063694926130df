//! JSON-API codec: wire documents, query encoding, response
//! discrimination and relationship normalization.

mod discriminate;
mod document;
mod query;
pub mod relationship;

pub use discriminate::{
    Document, Failure, decode_plain_response, decode_response, discriminate, discriminate_plain,
};
pub use document::{
    DetailResponse, ErrorObject, ErrorResponse, ErrorSource, ListMeta, ListResponse, Relationship,
    RelationshipRef, ResourceId, ResourceIdentifier, ResourceObject,
};
pub use query::{DEFAULT_PAGE_SIZE, Filter, FilterOp, PageParams, QueryParameters};
