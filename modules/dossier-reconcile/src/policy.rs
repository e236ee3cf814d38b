//! Conflict resolution strategies for scalar fields.
//!
//! `PriorityPolicy` is the "any match confirms" rule used for people: a stored
//! value backed by at least one source is confirmed, anything else is resolved
//! by a fixed source priority list. `MajorityPolicy` is the whole-batch vote
//! used for productions. `AuthoritativeOverride` wraps either one and lets a
//! designated source force a conflict after the inner decision is made.

use dossier_common::normalize::comparison_key;
use dossier_common::SourceId;

use crate::outcome::{FieldStatus, Tally, ValueGroup, VoteOrigin};

/// Non-blank inputs for one field, in record order.
#[derive(Debug, Clone)]
pub struct Ballot<'a> {
    pub existing: Option<&'a str>,
    pub votes: Vec<(&'a SourceId, &'a str)>,
}

impl<'a> Ballot<'a> {
    pub fn new(existing: Option<&'a str>, votes: Vec<(&'a SourceId, &'a str)>) -> Self {
        Self {
            existing: existing.filter(|e| !e.trim().is_empty()),
            votes: votes
                .into_iter()
                .filter(|(_, v)| !v.trim().is_empty())
                .collect(),
        }
    }

    pub fn value_of(&self, source: &SourceId) -> Option<&'a str> {
        self.votes
            .iter()
            .find(|(id, _)| *id == source)
            .map(|(_, v)| *v)
    }
}

/// What a policy decided. Turned into a `FieldReconciliation` by the caller.
#[derive(Debug, Clone, PartialEq)]
pub struct Decision {
    pub status: FieldStatus,
    pub suggestion: Option<String>,
    pub tally: Option<Tally>,
    pub overridden_by: Option<SourceId>,
}

impl Decision {
    fn plain(status: FieldStatus, suggestion: Option<&str>) -> Self {
        Self {
            status,
            suggestion: suggestion.map(String::from),
            tally: None,
            overridden_by: None,
        }
    }

    /// No source has a value: keep whatever is stored.
    fn empty(ballot: &Ballot<'_>) -> Self {
        Self::plain(FieldStatus::Empty, ballot.existing)
    }
}

pub trait ResolutionPolicy: Send + Sync {
    fn decide(&self, ballot: &Ballot<'_>) -> Decision;
    fn name(&self) -> &str;
}

// --- Priority ---

/// First value in a fixed source order wins. Vote counts are ignored, so the
/// outcome does not depend on the order extraction happened to finish in.
#[derive(Debug, Clone, Default)]
pub struct PriorityPolicy {
    order: Vec<SourceId>,
}

impl PriorityPolicy {
    pub fn new(order: Vec<SourceId>) -> Self {
        Self { order }
    }

    /// Sources missing from the priority list fall back to id order.
    pub fn pick<'a>(&self, ballot: &Ballot<'a>) -> Option<&'a str> {
        self.order
            .iter()
            .find_map(|id| ballot.value_of(id))
            .or_else(|| {
                ballot
                    .votes
                    .iter()
                    .min_by(|a, b| a.0.cmp(b.0))
                    .map(|(_, v)| *v)
            })
    }
}

impl ResolutionPolicy for PriorityPolicy {
    fn decide(&self, ballot: &Ballot<'_>) -> Decision {
        if ballot.votes.is_empty() {
            return Decision::empty(ballot);
        }
        let Some(existing) = ballot.existing else {
            return Decision::plain(FieldStatus::New, self.pick(ballot));
        };
        let existing_key = comparison_key(existing);
        if ballot
            .votes
            .iter()
            .any(|(_, v)| comparison_key(v) == existing_key)
        {
            Decision::plain(FieldStatus::Confirmed, Some(existing))
        } else {
            Decision::plain(FieldStatus::Conflict, self.pick(ballot))
        }
    }

    fn name(&self) -> &str {
        "priority"
    }
}

// --- Majority ---

/// Group the stored value and every source value by comparison key and let
/// the largest group win. Equal top counts are a conflict, never a coin flip.
#[derive(Debug, Clone, Copy, Default)]
pub struct MajorityPolicy;

impl MajorityPolicy {
    /// Groups sorted by count, ties kept in first-seen order (stored value first).
    pub fn tally_groups(ballot: &Ballot<'_>) -> Vec<ValueGroup> {
        let mut groups: Vec<ValueGroup> = Vec::new();
        let entries = ballot
            .existing
            .map(|e| (VoteOrigin::Existing, e))
            .into_iter()
            .chain(
                ballot
                    .votes
                    .iter()
                    .map(|(id, v)| (VoteOrigin::Source((*id).clone()), *v)),
            );

        for (origin, raw) in entries {
            let key = comparison_key(raw);
            match groups.iter_mut().find(|g| g.key == key) {
                Some(group) => group.votes.push(origin),
                None => groups.push(ValueGroup {
                    key,
                    value: raw.trim().to_string(),
                    votes: vec![origin],
                }),
            }
        }

        groups.sort_by(|a, b| b.count().cmp(&a.count()));
        groups
    }
}

impl ResolutionPolicy for MajorityPolicy {
    fn decide(&self, ballot: &Ballot<'_>) -> Decision {
        if ballot.votes.is_empty() {
            return Decision::empty(ballot);
        }

        let mut groups = Self::tally_groups(ballot);
        let top = groups[0].count();
        let runner_up = groups.get(1).map(ValueGroup::count).unwrap_or(0);

        if top > runner_up {
            let winner = groups.remove(0);
            // A single agreeing group with nothing stored is simply new data.
            let status = if ballot.existing.is_none() && groups.is_empty() {
                FieldStatus::New
            } else {
                FieldStatus::Confirmed
            };
            return Decision {
                status,
                suggestion: Some(winner.value.clone()),
                tally: Some(Tally {
                    winner: Some(winner),
                    tied: Vec::new(),
                    demoted: groups,
                }),
                overridden_by: None,
            };
        }

        let demoted = groups.split_off(groups.iter().take_while(|g| g.count() == top).count());
        let tied = groups;
        let suggestion = tied
            .iter()
            .find(|g| g.votes.contains(&VoteOrigin::Existing))
            .unwrap_or(&tied[0])
            .value
            .clone();

        Decision {
            status: FieldStatus::Conflict,
            suggestion: Some(suggestion),
            tally: Some(Tally {
                winner: None,
                tied,
                demoted,
            }),
            overridden_by: None,
        }
    }

    fn name(&self) -> &str {
        "majority"
    }
}

// --- Authoritative override ---

/// Runs the inner policy, then forces `Conflict` when the authoritative source
/// disagrees with the stored value, even if every other source agrees with it.
#[derive(Debug, Clone)]
pub struct AuthoritativeOverride<P> {
    inner: P,
    authority: SourceId,
}

impl<P: ResolutionPolicy> AuthoritativeOverride<P> {
    pub fn new(inner: P, authority: impl Into<SourceId>) -> Self {
        Self {
            inner,
            authority: authority.into(),
        }
    }

    pub fn authority(&self) -> &SourceId {
        &self.authority
    }
}

impl<P: ResolutionPolicy> ResolutionPolicy for AuthoritativeOverride<P> {
    fn decide(&self, ballot: &Ballot<'_>) -> Decision {
        let mut decision = self.inner.decide(ballot);

        if let (Some(existing), Some(authoritative)) =
            (ballot.existing, ballot.value_of(&self.authority))
        {
            if comparison_key(existing) != comparison_key(authoritative) {
                decision.status = FieldStatus::Conflict;
                decision.suggestion = Some(authoritative.trim().to_string());
                decision.overridden_by = Some(self.authority.clone());
            }
        }

        decision
    }

    fn name(&self) -> &str {
        "authoritative_override"
    }
}
