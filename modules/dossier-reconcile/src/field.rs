use std::collections::BTreeMap;

use dossier_common::normalize::comparison_key;
use dossier_common::{FieldKey, FieldValue, SourceId};

use crate::outcome::FieldReconciliation;
use crate::policy::{Ballot, ResolutionPolicy};

/// Reconcile one scalar field. `values` is in record order; blank values are
/// left out of both the vote and the per-source breakdown.
pub fn reconcile(
    field: FieldKey,
    existing: Option<&FieldValue>,
    values: &[(SourceId, FieldValue)],
    policy: &dyn ResolutionPolicy,
) -> FieldReconciliation {
    let existing = existing.filter(|v| !v.is_empty());
    let existing_text = existing.and_then(FieldValue::as_scalar);

    let scalars: Vec<(&SourceId, String)> = values
        .iter()
        .filter_map(|(id, value)| value.as_scalar().map(|s| (id, s)))
        .collect();

    let ballot = Ballot::new(
        existing_text.as_deref(),
        scalars.iter().map(|(id, s)| (*id, s.as_str())).collect(),
    );
    let decision = policy.decide(&ballot);

    let per_source: BTreeMap<SourceId, FieldValue> = scalars
        .iter()
        .map(|(id, s)| ((*id).clone(), FieldValue::Scalar(s.clone())))
        .collect();

    let suggestion = decision.suggestion.map(FieldValue::Scalar);
    let mut result =
        FieldReconciliation::new(field, decision.status, existing, per_source, suggestion);
    result.canonical_value = result
        .suggestion
        .as_ref()
        .and_then(FieldValue::as_scalar)
        .map(|s| comparison_key(&s));
    result.tally = decision.tally;
    result.overridden_by = decision.overridden_by;
    result
}
