//! Pure reconciliation of changeset events against a snapshot.
//!
//! This module is the functional core: every derivation is a pure function of
//! a borrowed snapshot and a borrowed event slice. Nothing here performs I/O,
//! caches state, or mutates its inputs, so derivations for different
//! changesets can run concurrently without coordination.
//!
//! # Derivations
//!
//! | Facet | Function | Cutoff | Order |
//! |-------|----------|--------|-------|
//! | Labels | [`derive_labels`] | snapshot `updated_at` | [`ordering::compare_events`] |
//! | Merge commit | [`find_merge_commit_id`] | none | iteration order, first wins |
//! | Lifecycle | [`derive_state`] | snapshot `updated_at` | [`ordering::compare_events`] |
//! | Review | [`derive_review_state`] | none | [`ordering::compare_events`] |
//!
//! Kinds a derivation does not understand are skipped, never an error.

pub mod labels;
pub mod lifecycle;
pub mod merge;
pub mod ordering;
pub mod review;

use tracing::debug;

use crate::events::ChangesetEvent;
use crate::types::{ChangesetSnapshot, DerivedState};

pub use labels::derive_labels;
pub use lifecycle::derive_state;
pub use merge::find_merge_commit_id;
pub use ordering::{compare_events, is_after_cutoff, sorted_events};
pub use review::derive_review_state;

/// Computes every derived facet from one `(snapshot, events)` pair.
///
/// The orchestration layer should read labels, merge commit, lifecycle and
/// review state from a single call so they are consistent with each other.
pub fn reconcile(snapshot: &ChangesetSnapshot, events: &[ChangesetEvent]) -> DerivedState {
    let derived = DerivedState {
        labels: derive_labels(snapshot, events),
        merge_commit: find_merge_commit_id(events),
        state: derive_state(snapshot, events),
        review_state: derive_review_state(events),
    };

    debug!(
        changeset = %snapshot.id,
        events = events.len(),
        labels = derived.labels.len(),
        state = ?derived.state,
        review_state = ?derived.review_state,
        merge_commit = ?derived.merge_commit.as_ref().map(|c| c.short()),
        "Reconciled changeset"
    );

    derived
}
