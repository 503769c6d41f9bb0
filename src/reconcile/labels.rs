//! Label derivation.
//!
//! Labels are folded forward from the snapshot: only labeling events newer
//! than the snapshot's cutoff are applied, in [`compare_events`] order.
//!
//! [`compare_events`]: super::ordering::compare_events

use tracing::trace;

use super::ordering::{is_after_cutoff, sorted_events};
use crate::events::{ChangesetEvent, LabelChange};
use crate::types::{ChangesetSnapshot, LabelSet};

/// Derives the current label set of a changeset.
///
/// Starts from `snapshot.labels`, then applies every label add/remove event
/// whose `updated_at` is strictly after `snapshot.updated_at`, oldest first.
/// A later remove undoes an earlier add of the same name and vice versa.
///
/// Returns a new set; the snapshot is never modified. With no qualifying
/// events the result equals `snapshot.labels`.
///
/// # Examples
///
/// ```
/// use changeset_events::reconcile::derive_labels;
/// use changeset_events::types::{ChangesetSnapshot, Label, LabelSet};
///
/// let snapshot = ChangesetSnapshot {
///     labels: LabelSet::from(vec![Label::new("label1")]),
///     ..ChangesetSnapshot::default()
/// };
/// assert_eq!(derive_labels(&snapshot, &[]).names(), vec!["label1"]);
/// ```
pub fn derive_labels(snapshot: &ChangesetSnapshot, events: &[ChangesetEvent]) -> LabelSet {
    let mut labels = snapshot.labels.clone();

    let pending = events
        .iter()
        .filter(|e| e.kind().is_label_change())
        .filter(|e| is_after_cutoff(e, snapshot.updated_at));

    for event in sorted_events(pending) {
        match event.label_change() {
            Some(LabelChange::Added(label)) => {
                labels.insert(label.clone());
            }
            Some(LabelChange::Removed(name)) => {
                labels.remove(name);
            }
            None => {
                trace!(kind = %event.kind(), key = %event.key(), "Label event without label payload");
            }
        }
    }

    labels
}
