//! Total order over changeset events.
//!
//! Every ordered fold in the engine sorts with [`compare_events`], so label,
//! lifecycle and review derivation never disagree about which of two events
//! came last.
//!
//! # Ordering
//!
//! 1. `updated_at` ascending (hosts revise events, so this beats `created_at`)
//! 2. Event key ascending, so the order does not depend on delivery order
//! 3. Input position, via a stable sort, when both of the above tie

use std::cmp::Ordering;

use chrono::{DateTime, Utc};

use crate::events::ChangesetEvent;

/// Compares two events by `(updated_at, key)`.
pub fn compare_events(a: &ChangesetEvent, b: &ChangesetEvent) -> Ordering {
    a.updated_at()
        .cmp(&b.updated_at())
        .then_with(|| a.key().cmp(b.key()))
}

/// Returns references to `events` in fold order.
///
/// The sort is stable: events that compare equal keep their input order.
pub fn sorted_events<'a, I>(events: I) -> Vec<&'a ChangesetEvent>
where
    I: IntoIterator<Item = &'a ChangesetEvent>,
{
    let mut sorted: Vec<&ChangesetEvent> = events.into_iter().collect();
    sorted.sort_by(|a, b| compare_events(a, b));
    sorted
}

/// Returns true if `event` is strictly newer than `cutoff`.
///
/// Events at or before a snapshot's `updated_at` are already folded into it.
pub fn is_after_cutoff(event: &ChangesetEvent, cutoff: DateTime<Utc>) -> bool {
    event.updated_at() > cutoff
}
