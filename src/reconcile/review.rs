//! Review state derivation.
//!
//! Unlike labels, review state is folded over the full event history: each
//! reviewer's latest verdict is kept, and the verdicts are then combined.
//! Changes requested by anyone outweigh approvals.

use std::collections::HashMap;

use super::ordering::sorted_events;
use crate::events::{ChangesetEvent, ReviewVerdict};
use crate::types::ChangesetReviewState;

/// Derives the aggregate review state from review events of any host.
pub fn derive_review_state(events: &[ChangesetEvent]) -> ChangesetReviewState {
    let reviews = events.iter().filter(|e| e.review_verdict().is_some());

    let mut latest: HashMap<&str, ReviewVerdict> = HashMap::new();
    for event in sorted_events(reviews) {
        let Some((reviewer, verdict)) = event.review_verdict() else {
            continue;
        };
        match verdict {
            ReviewVerdict::Cleared => {
                latest.remove(reviewer);
            }
            verdict => {
                latest.insert(reviewer, verdict);
            }
        }
    }

    if latest
        .values()
        .any(|v| *v == ReviewVerdict::ChangesRequested)
    {
        ChangesetReviewState::ChangesRequested
    } else if latest.values().any(|v| *v == ReviewVerdict::Approved) {
        ChangesetReviewState::Approved
    } else {
        ChangesetReviewState::Pending
    }
}
