//! Flat list (tags, awards) and body-art merges.

use std::collections::{BTreeMap, HashMap, HashSet};

use dossier_common::normalize::comparison_key;
use dossier_common::{BodyArtEntry, FieldKey, FieldValue, SourceId};
use serde::Serialize;

use crate::outcome::{FieldReconciliation, FieldStatus};

/// Case-insensitive union keeping first-seen casing.
#[derive(Debug, Default)]
pub(crate) struct CaseInsensitiveSet {
    seen: HashSet<String>,
    items: Vec<String>,
}

impl CaseInsensitiveSet {
    pub(crate) fn insert(&mut self, raw: &str) -> bool {
        let trimmed = raw.trim();
        if trimmed.is_empty() || !self.seen.insert(comparison_key(trimmed)) {
            return false;
        }
        self.items.push(trimmed.to_string());
        true
    }

    pub(crate) fn keys(&self) -> &HashSet<String> {
        &self.seen
    }

    pub(crate) fn into_items(self) -> Vec<String> {
        self.items
    }
}

/// Merged list plus what each source contributed.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ListMerge {
    pub merged: Vec<String>,
    pub per_source: BTreeMap<SourceId, Vec<String>>,
}

/// Union of every source's entries. When `authority` is given its entries are
/// placed first; the same dedup set applies throughout.
pub fn merge_list(values: &[(SourceId, FieldValue)], authority: Option<&SourceId>) -> ListMerge {
    let first: Vec<SourceId> = authority.cloned().into_iter().collect();
    let mut set = CaseInsensitiveSet::default();
    let mut per_source = BTreeMap::new();

    for (id, value) in ordered(values, &first) {
        let items = value.as_list();
        for item in &items {
            set.insert(item);
        }
        if !items.is_empty() {
            per_source.insert(id.clone(), items);
        }
    }

    ListMerge {
        merged: set.into_items(),
        per_source,
    }
}

/// Reconcile a flat list field against the stored list. Sources only ever add
/// entries, so a difference is reported as `Updated`, not `Conflict`.
/// Entries already stored keep their stored casing.
pub fn reconcile_list(
    field: FieldKey,
    existing: Option<&FieldValue>,
    values: &[(SourceId, FieldValue)],
    authority: Option<&SourceId>,
) -> FieldReconciliation {
    let existing = existing.filter(|v| !v.is_empty());
    let existing_items = existing.map(FieldValue::as_list).unwrap_or_default();
    let merge = merge_list(values, authority);

    let mut existing_set = CaseInsensitiveSet::default();
    for item in &existing_items {
        existing_set.insert(item);
    }
    let stored_casing: HashMap<String, &str> = existing_items
        .iter()
        .map(|item| (comparison_key(item), item.as_str()))
        .collect();

    let mut union = CaseInsensitiveSet::default();
    for item in &merge.merged {
        let key = comparison_key(item);
        union.insert(stored_casing.get(&key).copied().unwrap_or(item));
    }
    for item in &existing_items {
        union.insert(item);
    }

    let status = list_status(existing.is_some(), merge.merged.is_empty(), || {
        union.keys() == existing_set.keys()
    });
    let union = union.into_items();
    let suggestion = (!union.is_empty()).then(|| FieldValue::StringList(union));

    let per_source = merge
        .per_source
        .into_iter()
        .map(|(id, items)| (id, FieldValue::StringList(items)))
        .collect();

    FieldReconciliation::new(field, status, existing, per_source, suggestion)
}

// --- Body art ---

/// Structured entries, the flat statements that were set aside, and each
/// source's raw contribution.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct BodyArtMerge {
    pub merged: Vec<BodyArtEntry>,
    pub overflow: Vec<BodyArtEntry>,
    pub per_source: BTreeMap<SourceId, Vec<BodyArtEntry>>,
}

#[derive(Default)]
struct BodyArtAccumulator {
    seen: HashSet<(String, String)>,
    structured: Vec<BodyArtEntry>,
    overflow: Vec<BodyArtEntry>,
}

impl BodyArtAccumulator {
    fn add(&mut self, entries: &[BodyArtEntry]) {
        for entry in entries {
            if !self.seen.insert(entry.dedup_key()) {
                continue;
            }
            if entry.is_unspecified() {
                self.overflow.push(entry.clone());
            } else {
                self.structured.push(entry.clone());
            }
        }
    }

    /// Structured data wins over vague flat statements.
    fn merged(&self) -> Vec<BodyArtEntry> {
        if self.structured.is_empty() {
            self.overflow.clone()
        } else {
            self.structured.clone()
        }
    }
}

/// Deduplicate by `(position, description)`, visiting sources best-structured
/// first. Unspecified-position entries surface only when no structured entry
/// exists at all.
pub fn merge_body_art(
    values: &[(SourceId, FieldValue)],
    quality_order: &[SourceId],
) -> BodyArtMerge {
    let (acc, per_source) = accumulate_body_art(values, quality_order);
    BodyArtMerge {
        merged: acc.merged(),
        overflow: acc.overflow,
        per_source,
    }
}

fn accumulate_body_art(
    values: &[(SourceId, FieldValue)],
    quality_order: &[SourceId],
) -> (BodyArtAccumulator, BTreeMap<SourceId, Vec<BodyArtEntry>>) {
    let mut acc = BodyArtAccumulator::default();
    let mut per_source = BTreeMap::new();

    for (id, value) in ordered(values, quality_order) {
        let entries = value.as_body_art();
        acc.add(&entries);
        if !entries.is_empty() {
            per_source.insert(id.clone(), entries);
        }
    }
    (acc, per_source)
}

/// Reconcile a body-art field. The stored entries join the merge after every
/// source, as the lowest-quality input.
pub fn reconcile_body_art(
    field: FieldKey,
    existing: Option<&FieldValue>,
    values: &[(SourceId, FieldValue)],
    quality_order: &[SourceId],
) -> FieldReconciliation {
    let existing = existing.filter(|v| !v.is_empty());
    let existing_entries = existing.map(FieldValue::as_body_art).unwrap_or_default();

    let (mut acc, per_source) = accumulate_body_art(values, quality_order);
    let sources_empty = per_source.is_empty();
    acc.add(&existing_entries);
    let merged = acc.merged();

    let keys = |entries: &[BodyArtEntry]| -> HashSet<(String, String)> {
        entries.iter().map(BodyArtEntry::dedup_key).collect()
    };
    let status = list_status(existing.is_some(), sources_empty, || {
        keys(&merged) == keys(&existing_entries)
    });

    let per_source = per_source
        .into_iter()
        .map(|(id, entries)| (id, FieldValue::BodyArtList(entries)))
        .collect();
    let suggestion = (!merged.is_empty()).then(|| FieldValue::BodyArtList(merged));

    FieldReconciliation::new(field, status, existing, per_source, suggestion)
}

/// Shared status rule for multi-valued fields.
pub(crate) fn list_status(
    has_existing: bool,
    sources_empty: bool,
    unchanged: impl FnOnce() -> bool,
) -> FieldStatus {
    if sources_empty {
        FieldStatus::Empty
    } else if !has_existing {
        FieldStatus::New
    } else if unchanged() {
        FieldStatus::Confirmed
    } else {
        FieldStatus::Updated
    }
}

/// Sources named in `first` (in that order), then the rest in record order.
pub(crate) fn ordered<'a>(
    values: &'a [(SourceId, FieldValue)],
    first: &[SourceId],
) -> Vec<&'a (SourceId, FieldValue)> {
    let mut out: Vec<&(SourceId, FieldValue)> = first
        .iter()
        .flat_map(|id| values.iter().filter(move |(v, _)| v == id))
        .collect();
    out.extend(values.iter().filter(|(id, _)| !first.contains(id)));
    out
}

#[cfg(test)]
mod tests {
    use super::*;

    fn tags(id: &str, items: &[&str]) -> (SourceId, FieldValue) {
        (SourceId::from(id), FieldValue::list(items.iter().copied()))
    }

    #[test]
    fn list_union_keeps_first_casing() {
        let values = [
            tags("a", &["Blonde", "Tall"]),
            tags("b", &["blonde", "Petite"]),
        ];
        let merge = merge_list(&values, None);
        assert_eq!(merge.merged, vec!["Blonde", "Tall", "Petite"]);
        assert_eq!(merge.per_source.len(), 2);
    }

    #[test]
    fn authority_entries_come_first() {
        let values = [
            tags("a", &["Best Newcomer"]),
            tags("awards_db", &["Hall of Fame", "best newcomer"]),
        ];
        let merge = merge_list(&values, Some(&SourceId::from("awards_db")));
        assert_eq!(merge.merged, vec!["Hall of Fame", "best newcomer"]);
    }

    #[test]
    fn list_additions_are_updated_not_conflict() {
        let existing = FieldValue::list(["Blonde"]);
        let result = reconcile_list(
            FieldKey::Tags,
            Some(&existing),
            &[tags("a", &["blonde", "Tall"])],
            None,
        );
        assert_eq!(result.status, FieldStatus::Updated);
        assert_eq!(
            result.suggestion,
            Some(FieldValue::list(["Blonde", "Tall"]))
        );
    }

    #[test]
    fn list_subset_of_existing_is_confirmed() {
        let existing = FieldValue::list(["Blonde", "Tall"]);
        let result = reconcile_list(
            FieldKey::Tags,
            Some(&existing),
            &[tags("a", &["TALL"])],
            None,
        );
        assert_eq!(result.status, FieldStatus::Confirmed);
    }

    #[test]
    fn duplicate_body_art_collapses() {
        let a = (
            SourceId::from("a"),
            FieldValue::BodyArtList(vec![BodyArtEntry::new("Left Wrist", Some("Tribal"))]),
        );
        let b = (
            SourceId::from("b"),
            FieldValue::BodyArtList(vec![BodyArtEntry::new("left wrist", Some("tribal"))]),
        );
        let merge = merge_body_art(&[a, b], &[]);
        assert_eq!(
            merge.merged,
            vec![BodyArtEntry::new("Left Wrist", Some("Tribal"))]
        );
    }

    #[test]
    fn flat_statements_surface_when_nothing_structured() {
        let flat = (SourceId::from("low"), FieldValue::scalar("several"));
        let merge = merge_body_art(&[flat], &[]);
        assert_eq!(merge.merged.len(), 1);
        assert!(merge.merged[0].is_unspecified());
    }

    #[test]
    fn body_art_without_sources_is_empty_and_keeps_existing() {
        let existing = FieldValue::BodyArtList(vec![BodyArtEntry::new("navel", None)]);
        let result = reconcile_body_art(FieldKey::Piercings, Some(&existing), &[], &[]);
        assert_eq!(result.status, FieldStatus::Empty);
        assert_eq!(result.suggestion, Some(existing));
        assert!(result.per_source.is_empty());
    }

    #[test]
    fn structured_source_replaces_flat_existing() {
        let existing = FieldValue::scalar("yes, several");
        let values = [(
            SourceId::from("a"),
            FieldValue::BodyArtList(vec![BodyArtEntry::new("back", Some("wings"))]),
        )];
        let result = reconcile_body_art(FieldKey::Tattoos, Some(&existing), &values, &[]);
        assert_eq!(result.status, FieldStatus::Updated);
        assert_eq!(
            result.suggestion,
            Some(FieldValue::BodyArtList(vec![BodyArtEntry::new("back", Some("wings"))]))
        );
    }
}
