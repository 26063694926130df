//! Relationship normalization after partial updates.
//!
//! Both operations are pure: they return a new [`Relationship`] and
//! leave installing it into the owning envelope to the caller.

use super::document::{Relationship, RelationshipRef, ResourceIdentifier};

/// Authoritative replace: the result links exactly `new_refs`.
///
/// `links`/`meta` of `existing` are kept.
pub fn replace(existing: &Relationship, new_refs: RelationshipRef) -> Relationship {
    Relationship {
        data: Some(new_refs),
        links: existing.links.clone(),
        meta: existing.meta.clone(),
    }
}

/// Prepend `new_entries` ahead of the prior linkage (most recent first).
///
/// Entries are not de-duplicated: appending an id that is already
/// linked yields it twice. A prior to-one link is treated as a
/// one-element list; the result is always to-many.
pub fn append(existing: &Relationship, new_entries: Vec<ResourceIdentifier>) -> Relationship {
    let mut merged = new_entries;
    merged.extend_from_slice(existing.identifiers());

    Relationship {
        data: Some(RelationshipRef::Many(merged)),
        links: existing.links.clone(),
        meta: existing.meta.clone(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    fn tag(id: &str) -> ResourceIdentifier {
        ResourceIdentifier::new(id, "tags")
    }

    fn many(ids: &[&str]) -> Relationship {
        Relationship::new(RelationshipRef::Many(ids.iter().map(|id| tag(id)).collect()))
    }

    #[test]
    fn append_puts_new_entries_first() {
        let existing = many(&["1", "2"]);
        let merged = append(&existing, vec![tag("A"), tag("B")]);
        let ids: Vec<&str> = merged.identifiers().iter().map(|i| i.id.as_str()).collect();
        assert_eq!(ids, vec!["A", "B", "1", "2"]);
    }

    #[test]
    fn append_keeps_duplicates() {
        let merged = append(&many(&["1"]), vec![tag("1")]);
        assert_eq!(merged.identifiers().len(), 2);
    }

    #[test]
    fn append_onto_empty_and_single() {
        let empty = Relationship::default();
        assert_eq!(append(&empty, vec![tag("A")]).identifiers(), &[tag("A")]);

        let single = Relationship::new(RelationshipRef::Single(tag("1")));
        let merged = append(&single, vec![tag("A")]);
        assert!(merged.data.as_ref().is_some_and(RelationshipRef::is_many));
        assert_eq!(merged.identifiers(), &[tag("A"), tag("1")]);
    }

    #[test]
    fn replace_ignores_prior_contents() {
        let existing = many(&["1", "2", "3"]);
        let replaced = replace(&existing, RelationshipRef::Many(vec![tag("X")]));
        assert_eq!(replaced.identifiers(), &[tag("X")]);

        let cleared = replace(&existing, RelationshipRef::Many(vec![]));
        assert!(cleared.identifiers().is_empty());
    }

    #[test]
    fn operations_do_not_mutate_existing() {
        let existing = many(&["1"]);
        let _ = append(&existing, vec![tag("A")]);
        let _ = replace(&existing, RelationshipRef::Single(tag("Z")));
        assert_eq!(existing, many(&["1"]));
    }
}
