//! Multi-source field reconciliation.
//!
//! Each merge run turns an `EntitySnapshot` plus the `SourceRecord`s of one
//! scrape batch into a fresh `FieldReconciliation` per field. Nothing here
//! blocks or performs I/O.

pub mod alias;
pub mod batch;
pub mod field;
pub mod lists;
pub mod outcome;
pub mod policy;

pub use alias::reconcile_aliases;
pub use batch::{ReconcileOptions, ReconcileReport, Reconciler};
pub use field::reconcile;
pub use lists::{
    merge_body_art, merge_list, reconcile_body_art, reconcile_list, BodyArtMerge, ListMerge,
};
pub use outcome::{FieldReconciliation, FieldStatus, Tally, ValueGroup, VoteOrigin};
pub use policy::{
    AuthoritativeOverride, Ballot, Decision, MajorityPolicy, PriorityPolicy, ResolutionPolicy,
};
