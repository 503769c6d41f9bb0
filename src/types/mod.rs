//! Core domain types for changeset reconciliation.
//!
//! Identifiers, labels and the changeset snapshot that events are folded onto.

pub mod changeset;
pub mod ids;
pub mod label;

pub use changeset::{
    ChangesetMetadata, ChangesetReviewState, ChangesetSnapshot, ChangesetState, DerivedState,
    SnapshotError, never_synced,
};
pub use ids::{ChangesetId, CommitId, EventKey};
pub use label::{Label, LabelSet};
