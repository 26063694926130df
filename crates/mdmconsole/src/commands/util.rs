//! Shared helpers for command handlers.

use mdmconsole_api::{Document, ResourceId, ResourceKind, ResourceObject};
use mdmconsole_core::{Entity, ResourceAttributes};

use crate::cli::{GlobalOpts, ListArgs, OutputFormat};
use crate::error::CliError;
use crate::output;

use super::Session;

/// Fetch one page of `T` and decode it.
pub async fn list_page<T: ResourceAttributes>(
    session: &Session,
    list: &ListArgs,
) -> Result<Vec<Entity<T>>, CliError> {
    let query = list.query(session.settings.page_size_for(T::KIND));
    let page = session.console.list(T::KIND, &query).await?;
    Ok(Entity::<T>::from_envelopes(&page.data)?)
}

/// Fetch one page of `T` from a parent's sub-collection.
pub async fn list_related_page<T: ResourceAttributes>(
    session: &Session,
    parent: ResourceKind,
    parent_id: &str,
    list: &ListArgs,
) -> Result<Vec<Entity<T>>, CliError> {
    let query = list.query(session.settings.page_size_for(T::KIND));
    let page = session
        .console
        .list_related(T::KIND, parent, &ResourceId::from(parent_id), &query)
        .await
        .map_err(|e| CliError::from_lookup(e, parent, parent_id))?;
    Ok(Entity::<T>::from_envelopes(&page.data)?)
}

/// Read one `T`; a 404 names the resource and its list command.
pub async fn get_one<T: ResourceAttributes>(
    session: &Session,
    id: &str,
) -> Result<(Entity<T>, ResourceObject), CliError> {
    let detail = session
        .console
        .read(T::KIND, id)
        .await
        .map_err(|e| CliError::from_lookup(e, T::KIND, id))?;
    Ok((Entity::<T>::from_envelope(&detail.data)?, detail.data))
}

/// Pagination footer on stderr, table mode only, read from the store.
pub fn print_page_footer(session: &Session, kind: ResourceKind, global: &GlobalOpts) {
    if global.output != OutputFormat::Table {
        return;
    }
    let snapshot = session.console.snapshot();
    if let Some(state) = snapshot.resource(kind) {
        let footer =
            output::page_footer(state.current_page, state.page_count(), state.record_count);
        output::print_status(&footer, global.quiet);
    }
}

/// Id of the resource a create/update answered with, if it sent one.
pub fn document_id(document: &Document) -> Option<&ResourceId> {
    match document {
        Document::Detail(detail) => Some(&detail.data.id),
        _ => None,
    }
}

/// Linked ids of `relationship` on an envelope, in server order.
pub fn linked_ids(envelope: &ResourceObject, relationship: &str) -> Vec<String> {
    envelope
        .relationship(relationship)
        .map(|rel| {
            rel.identifiers()
                .iter()
                .map(|i| i.id.to_string())
                .collect()
        })
        .unwrap_or_default()
}
