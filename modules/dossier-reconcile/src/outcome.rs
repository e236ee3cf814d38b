use std::collections::BTreeMap;

use dossier_common::normalize::comparison_key;
use dossier_common::{FieldKey, FieldKind, FieldValue, SourceId};
use serde::Serialize;

/// Per-field comparison outcome.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum FieldStatus {
    /// No source produced a value.
    Empty,
    /// Nothing stored yet; at least one source has a value.
    New,
    /// The sources back the suggestion. Under majority voting a clear majority
    /// can back a value other than the stored one; see
    /// `FieldReconciliation::replaces_existing`.
    Confirmed,
    /// Sources disagree with the stored value (or with each other).
    Conflict,
    /// Multi-valued field where sources only add entries to what is stored.
    /// Not a disagreement: nothing stored is contradicted.
    Updated,
}

impl FieldStatus {
    /// The four-label vocabulary older callers expect, where additive list
    /// changes were reported as `Conflict`.
    pub fn legacy_label(self) -> FieldStatus {
        match self {
            FieldStatus::Updated => FieldStatus::Conflict,
            other => other,
        }
    }

    /// Whether the status alone gives an operator something to approve.
    /// `FieldReconciliation::needs_review` also catches majority replacements.
    pub fn needs_review(self) -> bool {
        matches!(
            self,
            FieldStatus::New | FieldStatus::Conflict | FieldStatus::Updated
        )
    }
}

/// Who cast a vote for a value.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum VoteOrigin {
    Existing,
    Source(SourceId),
}

/// Values sharing one comparison key, with attribution.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ValueGroup {
    pub key: String,
    /// First-seen raw representative.
    pub value: String,
    pub votes: Vec<VoteOrigin>,
}

impl ValueGroup {
    pub fn count(&self) -> usize {
        self.votes.len()
    }
}

/// Majority-vote breakdown.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Tally {
    pub winner: Option<ValueGroup>,
    /// Groups sharing the top count when there is no strict winner.
    pub tied: Vec<ValueGroup>,
    /// Losing groups, kept for display rather than discarded.
    pub demoted: Vec<ValueGroup>,
}

/// Result for one field across all records of a batch.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct FieldReconciliation {
    pub field: FieldKey,
    pub status: FieldStatus,
    pub existing: Option<FieldValue>,
    pub per_source: BTreeMap<SourceId, FieldValue>,
    pub suggestion: Option<FieldValue>,
    /// Comparison key of a scalar suggestion.
    pub canonical_value: Option<String>,
    pub tally: Option<Tally>,
    /// Set when an authoritative source forced the status.
    pub overridden_by: Option<SourceId>,
}

impl FieldReconciliation {
    pub(crate) fn new(
        field: FieldKey,
        status: FieldStatus,
        existing: Option<&FieldValue>,
        per_source: BTreeMap<SourceId, FieldValue>,
        suggestion: Option<FieldValue>,
    ) -> Self {
        Self {
            field,
            status,
            existing: existing.cloned(),
            per_source,
            suggestion,
            canonical_value: None,
            tally: None,
            overridden_by: None,
        }
    }

    /// A scalar suggestion that differs from the stored value, e.g. a majority
    /// that outvoted it.
    pub fn replaces_existing(&self) -> bool {
        if self.field.kind() != FieldKind::Scalar {
            return false;
        }
        let key = |value: &Option<FieldValue>| {
            value
                .as_ref()
                .and_then(FieldValue::as_scalar)
                .map(|s| comparison_key(&s))
        };
        match (key(&self.existing), key(&self.suggestion)) {
            (Some(existing), Some(suggestion)) => existing != suggestion,
            _ => false,
        }
    }

    pub fn needs_review(&self) -> bool {
        self.status.needs_review() || self.replaces_existing()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn updated_reads_as_conflict_for_legacy_callers() {
        assert_eq!(FieldStatus::Updated.legacy_label(), FieldStatus::Conflict);
        assert_eq!(
            FieldStatus::Confirmed.legacy_label(),
            FieldStatus::Confirmed
        );
    }

    #[test]
    fn confirmed_replacement_needs_review() {
        let existing = FieldValue::scalar("Studio A");
        let mut result = FieldReconciliation::new(
            FieldKey::Studio,
            FieldStatus::Confirmed,
            Some(&existing),
            BTreeMap::new(),
            Some(FieldValue::scalar("Studio B")),
        );
        assert!(result.replaces_existing());
        assert!(result.needs_review());

        result.suggestion = Some(FieldValue::scalar("studio a "));
        assert!(!result.replaces_existing());
        assert!(!result.needs_review());
    }

    #[test]
    fn only_settled_statuses_skip_review() {
        assert!(!FieldStatus::Empty.needs_review());
        assert!(!FieldStatus::Confirmed.needs_review());
        assert!(FieldStatus::Updated.needs_review());
    }
}
