//! The canonical, host-agnostic changeset event model.
//!
//! Code-host adapters turn native payloads into [`ChangesetEvent`] values; the
//! reconciliation engine only ever sees this type. An event is immutable once
//! constructed, and construction checks that the metadata payload matches the
//! declared kind.
//!
//! The engine never inspects host payloads directly. It reads the canonical
//! facts an event asserts through [`ChangesetEvent::label_change`],
//! [`ChangesetEvent::merge_commit`], [`ChangesetEvent::lifecycle_transition`]
//! and [`ChangesetEvent::review_verdict`]. Supporting a new host means adding
//! kinds, a metadata variant, and arms in those accessors.

pub mod bitbucketserver;
pub mod github;
pub mod kind;
pub mod metadata;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::types::{ChangesetId, CommitId, EventKey, Label};

pub use kind::{ChangesetEventKind, CodeHost, MetadataShape};
pub use metadata::EventMetadata;

use bitbucketserver::ActivityAction;

/// Error type for events whose parts contradict each other.
#[derive(Debug, Error)]
pub enum EventError {
    /// The metadata payload is not the type the kind requires.
    #[error("event kind {kind} requires {expected:?} metadata, found {found:?}")]
    MetadataMismatch {
        kind: ChangesetEventKind,
        expected: MetadataShape,
        found: MetadataShape,
    },

    /// A label payload's direction disagrees with labeled/unlabeled.
    #[error("label payload with removed={removed} cannot carry kind {kind}")]
    LabelDirectionMismatch {
        kind: ChangesetEventKind,
        removed: bool,
    },

    /// A Bitbucket Server activity's action disagrees with the kind.
    #[error("activity action {action:?} cannot carry kind {kind}")]
    ActionMismatch {
        kind: ChangesetEventKind,
        action: ActivityAction,
    },

    /// A stored kind string this build does not know.
    #[error("unsupported event kind: {0}")]
    UnsupportedKind(String),
}

/// A label added to or removed from a changeset.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LabelChange<'a> {
    Added(&'a Label),
    Removed(&'a str),
}

/// A change to the open/closed/merged lifecycle.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum LifecycleTransition {
    Closed,
    Reopened,
    Merged,
}

/// A reviewer's standing verdict after an event.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ReviewVerdict {
    Approved,
    ChangesRequested,
    /// Any earlier verdict by this reviewer no longer counts.
    Cleared,
}

/// A single fact asserted by a code host about one changeset.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(try_from = "UncheckedEvent")]
pub struct ChangesetEvent {
    changeset_id: ChangesetId,
    kind: ChangesetEventKind,
    key: EventKey,
    created_at: DateTime<Utc>,
    /// Authoritative for ordering; hosts revise some events after creation.
    updated_at: DateTime<Utc>,
    metadata: EventMetadata,
}

/// Wire form of [`ChangesetEvent`], validated on the way in.
#[derive(Deserialize)]
struct UncheckedEvent {
    changeset_id: ChangesetId,
    kind: ChangesetEventKind,
    key: EventKey,
    created_at: DateTime<Utc>,
    updated_at: DateTime<Utc>,
    metadata: EventMetadata,
}

impl TryFrom<UncheckedEvent> for ChangesetEvent {
    type Error = EventError;

    fn try_from(raw: UncheckedEvent) -> Result<Self, Self::Error> {
        ChangesetEvent::new(
            raw.changeset_id,
            raw.kind,
            raw.key,
            raw.created_at,
            raw.updated_at,
            raw.metadata,
        )
    }
}

impl ChangesetEvent {
    /// Creates an event, checking that `metadata` is the payload `kind` requires.
    pub fn new(
        changeset_id: ChangesetId,
        kind: ChangesetEventKind,
        key: EventKey,
        created_at: DateTime<Utc>,
        updated_at: DateTime<Utc>,
        metadata: EventMetadata,
    ) -> Result<Self, EventError> {
        let expected = kind.metadata_shape();
        let found = metadata.shape();
        if expected != found {
            return Err(EventError::MetadataMismatch {
                kind,
                expected,
                found,
            });
        }

        match &metadata {
            EventMetadata::GitHubLabel(e)
                if e.removed != (kind == ChangesetEventKind::GitHubUnlabeled) =>
            {
                return Err(EventError::LabelDirectionMismatch {
                    kind,
                    removed: e.removed,
                });
            }
            EventMetadata::BitbucketServerActivity(a)
                if kind.bitbucket_action() != Some(a.action) =>
            {
                return Err(EventError::ActionMismatch {
                    kind,
                    action: a.action,
                });
            }
            _ => {}
        }

        Ok(ChangesetEvent {
            changeset_id,
            kind,
            key,
            created_at,
            updated_at,
            metadata,
        })
    }

    pub fn changeset_id(&self) -> ChangesetId {
        self.changeset_id
    }

    pub fn kind(&self) -> ChangesetEventKind {
        self.kind
    }

    pub fn key(&self) -> &EventKey {
        &self.key
    }

    pub fn created_at(&self) -> DateTime<Utc> {
        self.created_at
    }

    pub fn updated_at(&self) -> DateTime<Utc> {
        self.updated_at
    }

    pub fn metadata(&self) -> &EventMetadata {
        &self.metadata
    }

    /// The label this event adds or removes, if it is a labeling action.
    pub fn label_change(&self) -> Option<LabelChange<'_>> {
        match (self.kind, &self.metadata) {
            (ChangesetEventKind::GitHubLabeled, EventMetadata::GitHubLabel(e)) => {
                Some(LabelChange::Added(&e.label))
            }
            (ChangesetEventKind::GitHubUnlabeled, EventMetadata::GitHubLabel(e)) => {
                Some(LabelChange::Removed(&e.label.name))
            }
            _ => None,
        }
    }

    /// The merge commit this event reports, if it is a merge action.
    ///
    /// GitHub reports the commit directly on the merge event; Bitbucket Server
    /// nests it in the activity. A merge activity without a commit yields `None`.
    pub fn merge_commit(&self) -> Option<&CommitId> {
        match (self.kind, &self.metadata) {
            (ChangesetEventKind::GitHubMerged, EventMetadata::GitHubMerged(e)) => {
                Some(&e.commit.oid)
            }
            (
                ChangesetEventKind::BitbucketServerMerged,
                EventMetadata::BitbucketServerActivity(a),
            ) => a.commit.as_ref().map(|c| &c.id),
            _ => None,
        }
    }

    /// The lifecycle change this event asserts, if any.
    pub fn lifecycle_transition(&self) -> Option<LifecycleTransition> {
        use ChangesetEventKind::*;
        match self.kind {
            GitHubClosed | BitbucketServerDeclined => Some(LifecycleTransition::Closed),
            GitHubReopened | BitbucketServerReopened => Some(LifecycleTransition::Reopened),
            GitHubMerged | BitbucketServerMerged => Some(LifecycleTransition::Merged),
            _ => None,
        }
    }

    /// The reviewer and verdict this event asserts, if it is a review action.
    ///
    /// Comment-only and pending reviews carry no verdict.
    pub fn review_verdict(&self) -> Option<(&str, ReviewVerdict)> {
        match (self.kind, &self.metadata) {
            (ChangesetEventKind::GitHubReviewed, EventMetadata::GitHubReview(r)) => {
                let verdict = match r.state {
                    github::ReviewState::Approved => ReviewVerdict::Approved,
                    github::ReviewState::ChangesRequested => ReviewVerdict::ChangesRequested,
                    github::ReviewState::Dismissed => ReviewVerdict::Cleared,
                    github::ReviewState::Commented | github::ReviewState::Pending => {
                        return None;
                    }
                };
                Some((r.author.login.as_str(), verdict))
            }
            (_, EventMetadata::BitbucketServerActivity(a)) => {
                let verdict = match a.action {
                    ActivityAction::Approved => ReviewVerdict::Approved,
                    ActivityAction::Unapproved => ReviewVerdict::Cleared,
                    ActivityAction::Reviewed => ReviewVerdict::ChangesRequested,
                    _ => return None,
                };
                Some((a.user.name.as_str(), verdict))
            }
            _ => None,
        }
    }
}
