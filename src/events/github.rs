//! GitHub payload types carried as event and snapshot metadata.
//!
//! These are the normalized shapes the GitHub adapter produces from GraphQL
//! timeline items. Field names follow GitHub's schema in snake case.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::types::{CommitId, Label};

/// The user (or bot) that performed an action.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Actor {
    pub login: String,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub avatar_url: Option<String>,
}

impl Actor {
    pub fn new(login: impl Into<String>) -> Self {
        Actor {
            login: login.into(),
            avatar_url: None,
        }
    }
}

/// A commit referenced by a merge or review.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Commit {
    pub oid: CommitId,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub message: Option<String>,
}

/// A `LabeledEvent` or `UnlabeledEvent`.
///
/// GitHub models both as separate types; they share a shape and differ only
/// in direction, which `removed` records.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LabelEvent {
    pub actor: Actor,

    /// GitHub node id of the label, when reported.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub label_id: Option<String>,

    pub label: Label,
    pub created_at: DateTime<Utc>,
    pub removed: bool,
}

/// A `MergedEvent`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MergedEvent {
    pub actor: Actor,
    pub merge_ref_name: String,
    pub commit: Commit,
    pub created_at: DateTime<Utc>,
}

/// An `AssignedEvent` or `UnassignedEvent`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AssignmentEvent {
    pub actor: Actor,
    pub assignee: Actor,
    pub created_at: DateTime<Utc>,
}

/// A `ClosedEvent`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ClosedEvent {
    pub actor: Actor,
    pub created_at: DateTime<Utc>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub url: Option<String>,
}

/// A `ReopenedEvent`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ReopenedEvent {
    pub actor: Actor,
    pub created_at: DateTime<Utc>,
}

/// A conversation comment (`IssueComment`).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct IssueComment {
    pub id: String,
    pub author: Actor,
    pub body: String,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// Review state as GitHub reports it on a `PullRequestReview`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ReviewState {
    Approved,
    ChangesRequested,
    Commented,
    Dismissed,
    Pending,
}

/// A submitted (or pending) review.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PullRequestReview {
    pub id: String,
    pub author: Actor,
    pub body: String,
    pub state: ReviewState,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub commit: Option<Commit>,
}

/// An inline comment left as part of a review.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PullRequestReviewComment {
    pub id: String,
    pub author: Actor,
    pub body: String,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// A `ReviewRequestedEvent` or `ReviewRequestRemovedEvent`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ReviewRequestEvent {
    pub actor: Actor,

    /// `None` when the requested reviewer is a team or a deleted user.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub requested_reviewer: Option<Actor>,

    pub created_at: DateTime<Utc>,
}

/// A `RenamedTitleEvent`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RenamedTitleEvent {
    pub actor: Actor,
    pub previous_title: String,
    pub current_title: String,
    pub created_at: DateTime<Utc>,
}

/// Pull request state as GitHub reports it.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum PullRequestState {
    Open,
    Closed,
    Merged,
}

/// Snapshot metadata for a GitHub pull request.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PullRequest {
    pub number: u64,
    pub title: String,
    pub state: PullRequestState,

    #[serde(default)]
    pub labels: Vec<Label>,

    pub updated_at: DateTime<Utc>,
}
