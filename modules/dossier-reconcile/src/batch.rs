//! Whole-record reconciliation: one `FieldReconciliation` per `FieldKey`.

use std::collections::BTreeMap;

use dossier_common::normalize::{comparison_key, strip_query_and_fragment};
use dossier_common::{EntitySnapshot, FieldKey, FieldKind, FieldValue, SourceId, SourceRecord};
use serde::Serialize;
use tracing::{debug, info};
use typed_builder::TypedBuilder;

use crate::alias::reconcile_aliases;
use crate::field::reconcile;
use crate::lists::{list_status, ordered, reconcile_body_art, reconcile_list};
use crate::outcome::{FieldReconciliation, FieldStatus};
use crate::policy::{AuthoritativeOverride, MajorityPolicy, PriorityPolicy, ResolutionPolicy};

/// Source orderings for one use case.
#[derive(Debug, Clone, Default, TypedBuilder)]
pub struct ReconcileOptions {
    /// Tie-break order for scalar suggestions and URL keys.
    #[builder(default)]
    pub priority: Vec<SourceId>,
    /// Source allowed to force scalar conflicts (production merges).
    #[builder(default, setter(strip_option, into))]
    pub authority: Option<SourceId>,
    /// Best-structured body-art source first.
    #[builder(default)]
    pub body_art_order: Vec<SourceId>,
    /// Source whose awards list leads the merged list.
    #[builder(default, setter(strip_option, into))]
    pub award_authority: Option<SourceId>,
}

pub struct Reconciler {
    policy: Box<dyn ResolutionPolicy>,
    options: ReconcileOptions,
}

impl Reconciler {
    pub fn new(policy: Box<dyn ResolutionPolicy>, options: ReconcileOptions) -> Self {
        Self { policy, options }
    }

    /// People: any-match confirmation, priority tie-break.
    pub fn person(options: ReconcileOptions) -> Self {
        let policy = PriorityPolicy::new(options.priority.clone());
        Self::new(Box::new(policy), options)
    }

    /// Productions: majority vote, optionally overridden by one authoritative source.
    pub fn production(options: ReconcileOptions) -> Self {
        let policy: Box<dyn ResolutionPolicy> = match &options.authority {
            Some(authority) => Box::new(AuthoritativeOverride::new(
                MajorityPolicy,
                authority.clone(),
            )),
            None => Box::new(MajorityPolicy),
        };
        Self::new(policy, options)
    }

    pub fn policy_name(&self) -> &str {
        self.policy.name()
    }

    pub fn reconcile(
        &self,
        snapshot: &EntitySnapshot,
        records: &[SourceRecord],
    ) -> ReconcileReport {
        let fields: BTreeMap<FieldKey, FieldReconciliation> = FieldKey::ALL
            .iter()
            .map(|&key| (key, self.reconcile_field(key, snapshot, records)))
            .collect();

        let report = ReconcileReport {
            sources: records.iter().map(|r| r.source_id().clone()).collect(),
            fields,
        };

        info!(
            policy = self.policy.name(),
            sources = report.sources.len(),
            conflicts = report.conflicts().count(),
            new_fields = report.new_fields().count(),
            "Reconciled entity"
        );
        report
    }

    pub fn reconcile_field(
        &self,
        key: FieldKey,
        snapshot: &EntitySnapshot,
        records: &[SourceRecord],
    ) -> FieldReconciliation {
        let existing = snapshot.get(key);
        let values: Vec<(SourceId, FieldValue)> = records
            .iter()
            .filter_map(|r| r.get(key).map(|v| (r.source_id().clone(), v.clone())))
            .collect();

        let result = match key.kind() {
            FieldKind::Scalar => reconcile(key, existing, &values, self.policy.as_ref()),
            FieldKind::List if key == FieldKey::Aliases => reconcile_aliases(existing, &values),
            FieldKind::List => {
                let authority = match key {
                    FieldKey::Awards => self.options.award_authority.as_ref(),
                    _ => None,
                };
                reconcile_list(key, existing, &values, authority)
            }
            FieldKind::BodyArt => {
                reconcile_body_art(key, existing, &values, &self.options.body_art_order)
            }
            FieldKind::UrlMap => reconcile_urls(existing, &values, &self.options.priority),
        };

        debug!(field = %key, status = ?result.status, sources = values.len(), "Field reconciled");
        result
    }
}

/// Merge the per-source `urls` maps. For each link key the highest-priority
/// source wins; a stored link that a source contradicts is a conflict.
fn reconcile_urls(
    existing: Option<&FieldValue>,
    values: &[(SourceId, FieldValue)],
    priority: &[SourceId],
) -> FieldReconciliation {
    let existing = existing.filter(|v| !v.is_empty());
    let stored = existing.map(FieldValue::as_url_map).unwrap_or_default();

    let mut proposed: BTreeMap<String, String> = BTreeMap::new();
    let mut per_source = BTreeMap::new();
    for (id, value) in ordered(values, priority) {
        let urls = value.as_url_map();
        for (link_key, url) in &urls {
            proposed
                .entry(link_key.clone())
                .or_insert_with(|| url.clone());
        }
        if !urls.is_empty() {
            per_source.insert(id.clone(), FieldValue::UrlMap(urls));
        }
    }

    let same = |a: &str, b: &str| {
        comparison_key(&strip_query_and_fragment(a)) == comparison_key(&strip_query_and_fragment(b))
    };
    let contradicted = proposed
        .iter()
        .any(|(k, url)| stored.get(k).is_some_and(|s| !same(s, url)));

    let mut merged = stored.clone();
    for (link_key, url) in &proposed {
        match merged.get(link_key) {
            Some(current) if same(current, url) => {}
            _ => {
                merged.insert(link_key.clone(), url.clone());
            }
        }
    }

    let status = if contradicted {
        FieldStatus::Conflict
    } else {
        list_status(existing.is_some(), proposed.is_empty(), || merged.len() == stored.len())
    };
    let suggestion = (!merged.is_empty()).then(|| FieldValue::UrlMap(merged));

    FieldReconciliation::new(FieldKey::Urls, status, existing, per_source, suggestion)
}

/// Every field's outcome for one entity, plus which sources took part.
#[derive(Debug, Clone, Serialize)]
pub struct ReconcileReport {
    pub sources: Vec<SourceId>,
    pub fields: BTreeMap<FieldKey, FieldReconciliation>,
}

impl ReconcileReport {
    pub fn get(&self, key: FieldKey) -> Option<&FieldReconciliation> {
        self.fields.get(&key)
    }

    pub fn status(&self, key: FieldKey) -> FieldStatus {
        self.get(key)
            .map(|r| r.status)
            .unwrap_or(FieldStatus::Empty)
    }

    pub fn conflicts(&self) -> impl Iterator<Item = &FieldReconciliation> {
        self.fields
            .values()
            .filter(|r| r.status == FieldStatus::Conflict)
    }

    pub fn new_fields(&self) -> impl Iterator<Item = &FieldReconciliation> {
        self.fields
            .values()
            .filter(|r| r.status == FieldStatus::New)
    }

    pub fn needs_review(&self) -> impl Iterator<Item = &FieldReconciliation> {
        self.fields.values().filter(|r| r.needs_review())
    }

    /// Suggested value per field, for fields that have one.
    pub fn suggestions(&self) -> BTreeMap<FieldKey, FieldValue> {
        self.fields
            .iter()
            .filter_map(|(k, r)| r.suggestion.clone().map(|v| (*k, v)))
            .collect()
    }
}
