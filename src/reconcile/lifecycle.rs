//! Lifecycle (open/closed/merged) derivation.
//!
//! Same shape as label derivation: the snapshot's state is the starting
//! point and only lifecycle events newer than its cutoff are folded.

use tracing::debug;

use super::ordering::{is_after_cutoff, sorted_events};
use crate::events::{ChangesetEvent, LifecycleTransition};
use crate::types::{ChangesetSnapshot, ChangesetState};

/// Derives the lifecycle state of a changeset.
///
/// Close and decline events move an open changeset to `Closed`, reopen
/// events move it back to `Open`, and merge events move it to `Merged`.
/// `Merged` is terminal; a close or reopen seen after it is ignored.
pub fn derive_state(snapshot: &ChangesetSnapshot, events: &[ChangesetEvent]) -> ChangesetState {
    let pending = events
        .iter()
        .filter(|e| e.lifecycle_transition().is_some())
        .filter(|e| is_after_cutoff(e, snapshot.updated_at));

    sorted_events(pending)
        .into_iter()
        .fold(snapshot.state, |state, event| {
            let Some(transition) = event.lifecycle_transition() else {
                return state;
            };
            apply(state, transition, event)
        })
}

fn apply(
    state: ChangesetState,
    transition: LifecycleTransition,
    event: &ChangesetEvent,
) -> ChangesetState {
    if state.is_terminal() {
        if transition != LifecycleTransition::Merged {
            debug!(
                changeset = %event.changeset_id(),
                kind = %event.kind(),
                "Ignoring lifecycle event after merge"
            );
        }
        return state;
    }

    match transition {
        LifecycleTransition::Closed => ChangesetState::Closed,
        LifecycleTransition::Reopened => ChangesetState::Open,
        LifecycleTransition::Merged => ChangesetState::Merged,
    }
}
