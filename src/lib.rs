//! Changeset event reconciliation.
//!
//! Code hosts report a changeset (a pull request) as a snapshot plus a
//! timeline of events. Snapshots are fetched rarely; events arrive in between.
//! This library adapts host payloads into canonical [`events::ChangesetEvent`]s
//! and folds them onto the last snapshot to derive current state: labels, the
//! merge commit, lifecycle state and review state.
//!
//! ```
//! use changeset_events::reconcile::reconcile;
//! use changeset_events::types::{ChangesetSnapshot, Label};
//!
//! let mut snapshot = ChangesetSnapshot::default();
//! snapshot.labels.insert(Label::new("bug"));
//!
//! let derived = reconcile(&snapshot, &[]);
//! assert!(derived.has_label("bug"));
//! assert_eq!(derived.merge_commit, None);
//! ```

pub mod adapters;
pub mod events;
pub mod ingest;
pub mod reconcile;
pub mod types;

#[cfg(test)]
pub(crate) mod test_utils;
