// Alias ("also known as") reconciliation.
//
// Status semantics differ from the scalar reconciler: a difference between the
// stored aliases and the union means entries were added, reported as
// `FieldStatus::Updated`. Callers on the old four-label vocabulary can map it
// with `FieldStatus::legacy_label()`, which yields `Conflict`. When no source
// reports any alias the field is `Empty`, whatever is stored.

use std::collections::BTreeMap;

use dossier_common::normalize::comparison_key;
use dossier_common::{FieldKey, FieldValue, SourceId};

use crate::lists::{list_status, CaseInsensitiveSet};
use crate::outcome::FieldReconciliation;

pub fn reconcile_aliases(
    existing: Option<&FieldValue>,
    values: &[(SourceId, FieldValue)],
) -> FieldReconciliation {
    let existing = existing.filter(|v| !v.is_empty());

    let mut stored = CaseInsensitiveSet::default();
    for alias in existing.map(FieldValue::as_list).unwrap_or_default() {
        stored.insert(&alias);
    }

    let mut union = CaseInsensitiveSet::default();
    let mut per_source = BTreeMap::new();
    for alias in existing.map(FieldValue::as_list).unwrap_or_default() {
        union.insert(&alias);
    }
    for (id, value) in values {
        let aliases = value.as_list();
        for alias in &aliases {
            union.insert(alias);
        }
        if !aliases.is_empty() {
            per_source.insert(id.clone(), FieldValue::StringList(aliases));
        }
    }

    let status = list_status(existing.is_some(), per_source.is_empty(), || {
        stored.keys() == union.keys()
    });

    let mut canonical = union.into_items();
    canonical.sort_by(|a, b| comparison_key(a).cmp(&comparison_key(b)).then_with(|| a.cmp(b)));
    let suggestion = (!canonical.is_empty()).then(|| FieldValue::StringList(canonical));

    FieldReconciliation::new(FieldKey::Aliases, status, existing, per_source, suggestion)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::outcome::FieldStatus;

    #[test]
    fn casing_variant_plus_new_alias_is_an_update() {
        let existing = FieldValue::list(["Jane Doe"]);
        let values = [(
            SourceId::from("a"),
            FieldValue::list(["jane doe", "J. Doe"]),
        )];
        let result = reconcile_aliases(Some(&existing), &values);

        assert_eq!(result.status, FieldStatus::Updated);
        assert_eq!(result.status.legacy_label(), FieldStatus::Conflict);
        assert_eq!(
            result.suggestion,
            Some(FieldValue::list(["J. Doe", "Jane Doe"]))
        );
    }

    #[test]
    fn same_set_in_other_casing_is_confirmed() {
        let existing = FieldValue::list(["Jane Doe", "JD"]);
        let values = [(SourceId::from("a"), FieldValue::list(["jd", "JANE DOE"]))];
        assert_eq!(
            reconcile_aliases(Some(&existing), &values).status,
            FieldStatus::Confirmed
        );
    }

    #[test]
    fn no_aliases_anywhere_is_empty() {
        let values = [(SourceId::from("a"), FieldValue::list([" "]))];
        let result = reconcile_aliases(None, &values);
        assert_eq!(result.status, FieldStatus::Empty);
        assert!(result.suggestion.is_none());
    }

    #[test]
    fn stored_aliases_without_source_data_are_empty() {
        let existing = FieldValue::list(["Jane Doe"]);
        let result = reconcile_aliases(Some(&existing), &[]);
        assert_eq!(result.status, FieldStatus::Empty);
        assert_eq!(result.suggestion, Some(existing));
        assert!(result.per_source.is_empty());
    }

    #[test]
    fn aliases_with_nothing_stored_are_new() {
        let values = [(SourceId::from("a"), FieldValue::scalar("JD, Janie"))];
        let result = reconcile_aliases(None, &values);
        assert_eq!(result.status, FieldStatus::New);
        assert_eq!(result.suggestion, Some(FieldValue::list(["Janie", "JD"])));
    }
}
