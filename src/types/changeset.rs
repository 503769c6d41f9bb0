//! Changeset snapshot and derived state types.
//!
//! A snapshot is the last state synced directly from the code host. It is the
//! starting point of every fold and its `updated_at` is the idempotence
//! cutoff: events at or before it are presumed already reflected.

use chrono::{DateTime, TimeZone, Utc};
use serde::{Deserialize, Serialize};
use thiserror::Error;

use super::ids::{ChangesetId, CommitId};
use super::label::LabelSet;
use crate::events::{bitbucketserver, github};

/// Error type for host metadata that cannot seed a snapshot.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum SnapshotError {
    /// A host timestamp does not fit in a `DateTime<Utc>`.
    #[error("{field} is out of range: {value}")]
    TimestampOutOfRange { field: &'static str, value: i64 },
}

/// The lifecycle state of a changeset.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ChangesetState {
    #[default]
    Open,
    Closed,
    Merged,
}

impl ChangesetState {
    pub fn is_open(&self) -> bool {
        matches!(self, ChangesetState::Open)
    }

    /// Merged changesets never leave the merged state.
    pub fn is_terminal(&self) -> bool {
        matches!(self, ChangesetState::Merged)
    }
}

/// The aggregate review state of a changeset.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ChangesetReviewState {
    Approved,
    ChangesRequested,
    #[default]
    Pending,
}

/// Host-specific representation of the changeset.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "host")]
pub enum ChangesetMetadata {
    #[serde(rename = "github")]
    GitHub(github::PullRequest),
    #[serde(rename = "bitbucketserver")]
    BitbucketServer(bitbucketserver::PullRequest),
}

impl ChangesetMetadata {
    /// Labels embedded in the host metadata. Bitbucket Server has none.
    pub fn labels(&self) -> LabelSet {
        match self {
            ChangesetMetadata::GitHub(pr) => pr.labels.iter().cloned().collect(),
            ChangesetMetadata::BitbucketServer(_) => LabelSet::new(),
        }
    }

    pub fn state(&self) -> ChangesetState {
        match self {
            ChangesetMetadata::GitHub(pr) => match pr.state {
                github::PullRequestState::Open => ChangesetState::Open,
                github::PullRequestState::Closed => ChangesetState::Closed,
                github::PullRequestState::Merged => ChangesetState::Merged,
            },
            ChangesetMetadata::BitbucketServer(pr) => match pr.state {
                bitbucketserver::PullRequestState::Open => ChangesetState::Open,
                bitbucketserver::PullRequestState::Declined => ChangesetState::Closed,
                bitbucketserver::PullRequestState::Merged => ChangesetState::Merged,
            },
        }
    }
}

/// Cutoff of a snapshot that has never been synced (the Unix epoch).
pub fn never_synced() -> DateTime<Utc> {
    DateTime::<Utc>::default()
}

/// The last-known-good state of a tracked changeset.
///
/// Owned by the caller and replaced wholesale after every reconciliation.
/// The engine only ever borrows it.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ChangesetSnapshot {
    pub id: ChangesetId,

    /// Events at or before this instant are already reflected in the snapshot.
    pub updated_at: DateTime<Utc>,

    /// Labels as last observed on the host.
    pub labels: LabelSet,

    /// Lifecycle state as last observed on the host.
    pub state: ChangesetState,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub metadata: Option<ChangesetMetadata>,
}

impl Default for ChangesetSnapshot {
    /// A never-synced snapshot: every event is newer than it.
    fn default() -> Self {
        ChangesetSnapshot {
            id: ChangesetId(0),
            updated_at: never_synced(),
            labels: LabelSet::new(),
            state: ChangesetState::Open,
            metadata: None,
        }
    }
}

impl ChangesetSnapshot {
    /// Builds a snapshot whose labels and state are read from host metadata.
    pub fn from_metadata(
        id: ChangesetId,
        updated_at: DateTime<Utc>,
        metadata: ChangesetMetadata,
    ) -> Self {
        ChangesetSnapshot {
            id,
            updated_at,
            labels: metadata.labels(),
            state: metadata.state(),
            metadata: Some(metadata),
        }
    }

    /// Builds a snapshot from a GitHub pull request, using its `updated_at`
    /// as the cutoff.
    pub fn from_github(id: ChangesetId, pr: github::PullRequest) -> Self {
        let updated_at = pr.updated_at;
        Self::from_metadata(id, updated_at, ChangesetMetadata::GitHub(pr))
    }

    /// Builds a snapshot from a Bitbucket Server pull request, using its
    /// `updated_date` as the cutoff.
    ///
    /// Fails if `updated_date` is out of range; such a snapshot has no usable cutoff.
    pub fn from_bitbucket_server(
        id: ChangesetId,
        pr: bitbucketserver::PullRequest,
    ) -> Result<Self, SnapshotError> {
        let updated_at = Utc
            .timestamp_millis_opt(pr.updated_date)
            .single()
            .ok_or(SnapshotError::TimestampOutOfRange {
                field: "updatedDate",
                value: pr.updated_date,
            })?;
        Ok(Self::from_metadata(
            id,
            updated_at,
            ChangesetMetadata::BitbucketServer(pr),
        ))
    }

    /// Returns true if the snapshot has never been synced.
    pub fn is_unsynced(&self) -> bool {
        self.updated_at == never_synced()
    }
}

/// Every derived facet of a changeset, computed from one (snapshot, events) pair.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DerivedState {
    pub labels: LabelSet,
    pub merge_commit: Option<CommitId>,
    pub state: ChangesetState,
    pub review_state: ChangesetReviewState,
}

impl DerivedState {
    /// Returns true if the changeset is open and approved with no outstanding
    /// change requests.
    pub fn is_approved_and_open(&self) -> bool {
        self.state.is_open() && self.review_state == ChangesetReviewState::Approved
    }

    /// Returns true if the derived labels include `name`.
    pub fn has_label(&self, name: &str) -> bool {
        self.labels.contains(name)
    }
}
