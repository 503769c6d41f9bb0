//! Bitbucket Server payload types carried as event and snapshot metadata.
//!
//! Bitbucket Server reports every pull request change as an "activity" with an
//! `action` discriminator, and only some actions carry a comment or a commit.

use serde::{Deserialize, Serialize};

use crate::types::CommitId;

/// A Bitbucket Server user.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct User {
    pub id: u64,

    /// The user slug used in URLs and as the reviewer identity.
    pub name: String,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub display_name: Option<String>,
}

/// The action recorded by a pull request activity.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ActivityAction {
    Approved,
    Unapproved,
    Declined,
    Reopened,
    Opened,
    Merged,
    Commented,
    /// A reviewer marked the pull request as "needs work".
    Reviewed,
    Rescoped,
    Updated,
}

/// A commit attached to a `MERGED` or `RESCOPED` activity.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Commit {
    pub id: CommitId,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub display_id: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub message: Option<String>,
}

/// A comment attached to a `COMMENTED` activity.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Comment {
    pub id: u64,
    pub text: String,

    /// Epoch milliseconds.
    pub created_date: i64,
    /// Epoch milliseconds.
    pub updated_date: i64,
}

/// One pull request activity.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Activity {
    pub id: u64,

    /// Epoch milliseconds.
    pub created_date: i64,

    pub user: User,
    pub action: ActivityAction,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub comment: Option<Comment>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub commit: Option<Commit>,
}

/// Pull request state as Bitbucket Server reports it.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum PullRequestState {
    Open,
    Declined,
    Merged,
}

/// Snapshot metadata for a Bitbucket Server pull request.
///
/// Bitbucket Server has no pull request labels.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PullRequest {
    pub id: u64,
    pub title: String,
    pub state: PullRequestState,

    /// Epoch milliseconds.
    pub updated_date: i64,
}
