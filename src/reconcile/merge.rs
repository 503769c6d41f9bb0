//! Merge commit derivation.

use tracing::warn;

use crate::events::ChangesetEvent;
use crate::types::CommitId;

/// Finds the commit a changeset was merged as.
///
/// Scans `events` in the given order for the first merge event of any host
/// and returns its commit. `None` means "not merged yet" and is a normal
/// outcome, as is an empty collection. A merge event that carries an empty
/// commit id also yields `None`.
///
/// A changeset merges at most once, so more than one merge event is a data
/// problem upstream. The first one still wins, and the rest are reported with
/// a warning rather than failing the derivation.
pub fn find_merge_commit_id(events: &[ChangesetEvent]) -> Option<CommitId> {
    let mut merges = events.iter().filter(|e| e.kind().is_merge());
    let first = merges.next()?;

    let ignored: Vec<&str> = merges
        .map(|e| e.merge_commit().map(CommitId::as_str).unwrap_or(""))
        .collect();
    if !ignored.is_empty() {
        warn!(
            changeset = %first.changeset_id(),
            merge_events = ignored.len() + 1,
            chosen = ?first.merge_commit().map(CommitId::as_str),
            ?ignored,
            "Multiple merge events for one changeset; using the first"
        );
    }

    first.merge_commit().filter(|c| !c.is_empty()).cloned()
}
