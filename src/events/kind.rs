//! The closed taxonomy of changeset event kinds.
//!
//! A kind names both the code host that emitted the event and the semantic
//! action. It is stored as a `"<host>:<action>"` string, e.g.
//! `"github:labeled"` or `"bitbucketserver:merged"`.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use super::EventError;
use super::bitbucketserver::ActivityAction;

/// The code host an event or snapshot came from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum CodeHost {
    GitHub,
    BitbucketServer,
}

impl CodeHost {
    pub fn as_str(&self) -> &'static str {
        match self {
            CodeHost::GitHub => "github",
            CodeHost::BitbucketServer => "bitbucketserver",
        }
    }
}

impl fmt::Display for CodeHost {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// The metadata payload type a kind requires.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum MetadataShape {
    GitHubAssignment,
    GitHubClosed,
    GitHubIssueComment,
    GitHubLabel,
    GitHubMerged,
    GitHubReopened,
    GitHubReview,
    GitHubReviewComment,
    GitHubReviewRequest,
    GitHubRenamedTitle,
    BitbucketServerActivity,
}

/// What happened, and on which code host.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(into = "&'static str", try_from = "String")]
pub enum ChangesetEventKind {
    GitHubAssigned,
    GitHubUnassigned,
    GitHubClosed,
    GitHubCommented,
    GitHubLabeled,
    GitHubUnlabeled,
    GitHubMerged,
    GitHubReopened,
    GitHubReviewed,
    GitHubReviewCommented,
    GitHubReviewRequested,
    GitHubReviewRequestRemoved,
    GitHubRenamedTitle,

    BitbucketServerApproved,
    BitbucketServerUnapproved,
    BitbucketServerDeclined,
    BitbucketServerReopened,
    BitbucketServerOpened,
    BitbucketServerMerged,
    BitbucketServerCommented,
    BitbucketServerReviewed,
    BitbucketServerRescoped,
    BitbucketServerUpdated,
}

impl ChangesetEventKind {
    /// Every kind, in declaration order.
    pub const ALL: [ChangesetEventKind; 23] = [
        ChangesetEventKind::GitHubAssigned,
        ChangesetEventKind::GitHubUnassigned,
        ChangesetEventKind::GitHubClosed,
        ChangesetEventKind::GitHubCommented,
        ChangesetEventKind::GitHubLabeled,
        ChangesetEventKind::GitHubUnlabeled,
        ChangesetEventKind::GitHubMerged,
        ChangesetEventKind::GitHubReopened,
        ChangesetEventKind::GitHubReviewed,
        ChangesetEventKind::GitHubReviewCommented,
        ChangesetEventKind::GitHubReviewRequested,
        ChangesetEventKind::GitHubReviewRequestRemoved,
        ChangesetEventKind::GitHubRenamedTitle,
        ChangesetEventKind::BitbucketServerApproved,
        ChangesetEventKind::BitbucketServerUnapproved,
        ChangesetEventKind::BitbucketServerDeclined,
        ChangesetEventKind::BitbucketServerReopened,
        ChangesetEventKind::BitbucketServerOpened,
        ChangesetEventKind::BitbucketServerMerged,
        ChangesetEventKind::BitbucketServerCommented,
        ChangesetEventKind::BitbucketServerReviewed,
        ChangesetEventKind::BitbucketServerRescoped,
        ChangesetEventKind::BitbucketServerUpdated,
    ];

    pub fn as_str(&self) -> &'static str {
        use ChangesetEventKind::*;
        match self {
            GitHubAssigned => "github:assigned",
            GitHubUnassigned => "github:unassigned",
            GitHubClosed => "github:closed",
            GitHubCommented => "github:commented",
            GitHubLabeled => "github:labeled",
            GitHubUnlabeled => "github:unlabeled",
            GitHubMerged => "github:merged",
            GitHubReopened => "github:reopened",
            GitHubReviewed => "github:reviewed",
            GitHubReviewCommented => "github:review_commented",
            GitHubReviewRequested => "github:review_requested",
            GitHubReviewRequestRemoved => "github:review_request_removed",
            GitHubRenamedTitle => "github:renamed_title",
            BitbucketServerApproved => "bitbucketserver:approved",
            BitbucketServerUnapproved => "bitbucketserver:unapproved",
            BitbucketServerDeclined => "bitbucketserver:declined",
            BitbucketServerReopened => "bitbucketserver:reopened",
            BitbucketServerOpened => "bitbucketserver:opened",
            BitbucketServerMerged => "bitbucketserver:merged",
            BitbucketServerCommented => "bitbucketserver:commented",
            BitbucketServerReviewed => "bitbucketserver:reviewed",
            BitbucketServerRescoped => "bitbucketserver:rescoped",
            BitbucketServerUpdated => "bitbucketserver:updated",
        }
    }

    pub fn host(&self) -> CodeHost {
        if self.bitbucket_action().is_some() {
            CodeHost::BitbucketServer
        } else {
            CodeHost::GitHub
        }
    }

    /// The metadata payload type events of this kind must carry.
    pub fn metadata_shape(&self) -> MetadataShape {
        use ChangesetEventKind::*;
        match self {
            GitHubAssigned | GitHubUnassigned => MetadataShape::GitHubAssignment,
            GitHubClosed => MetadataShape::GitHubClosed,
            GitHubCommented => MetadataShape::GitHubIssueComment,
            GitHubLabeled | GitHubUnlabeled => MetadataShape::GitHubLabel,
            GitHubMerged => MetadataShape::GitHubMerged,
            GitHubReopened => MetadataShape::GitHubReopened,
            GitHubReviewed => MetadataShape::GitHubReview,
            GitHubReviewCommented => MetadataShape::GitHubReviewComment,
            GitHubReviewRequested | GitHubReviewRequestRemoved => {
                MetadataShape::GitHubReviewRequest
            }
            GitHubRenamedTitle => MetadataShape::GitHubRenamedTitle,
            _ => MetadataShape::BitbucketServerActivity,
        }
    }

    /// The Bitbucket Server activity action this kind corresponds to.
    ///
    /// `None` for GitHub kinds.
    pub fn bitbucket_action(&self) -> Option<ActivityAction> {
        use ChangesetEventKind::*;
        let action = match self {
            BitbucketServerApproved => ActivityAction::Approved,
            BitbucketServerUnapproved => ActivityAction::Unapproved,
            BitbucketServerDeclined => ActivityAction::Declined,
            BitbucketServerReopened => ActivityAction::Reopened,
            BitbucketServerOpened => ActivityAction::Opened,
            BitbucketServerMerged => ActivityAction::Merged,
            BitbucketServerCommented => ActivityAction::Commented,
            BitbucketServerReviewed => ActivityAction::Reviewed,
            BitbucketServerRescoped => ActivityAction::Rescoped,
            BitbucketServerUpdated => ActivityAction::Updated,
            _ => return None,
        };
        Some(action)
    }

    /// The kind for a Bitbucket Server activity action.
    pub fn from_bitbucket_action(action: ActivityAction) -> Self {
        use ChangesetEventKind::*;
        match action {
            ActivityAction::Approved => BitbucketServerApproved,
            ActivityAction::Unapproved => BitbucketServerUnapproved,
            ActivityAction::Declined => BitbucketServerDeclined,
            ActivityAction::Reopened => BitbucketServerReopened,
            ActivityAction::Opened => BitbucketServerOpened,
            ActivityAction::Merged => BitbucketServerMerged,
            ActivityAction::Commented => BitbucketServerCommented,
            ActivityAction::Reviewed => BitbucketServerReviewed,
            ActivityAction::Rescoped => BitbucketServerRescoped,
            ActivityAction::Updated => BitbucketServerUpdated,
        }
    }

    /// Returns true for label add/remove actions on any host.
    pub fn is_label_change(&self) -> bool {
        matches!(
            self,
            ChangesetEventKind::GitHubLabeled | ChangesetEventKind::GitHubUnlabeled
        )
    }

    /// Returns true for merge actions on any host.
    pub fn is_merge(&self) -> bool {
        matches!(
            self,
            ChangesetEventKind::GitHubMerged | ChangesetEventKind::BitbucketServerMerged
        )
    }
}

impl fmt::Display for ChangesetEventKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for ChangesetEventKind {
    type Err = EventError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        ChangesetEventKind::ALL
            .into_iter()
            .find(|kind| kind.as_str() == s)
            .ok_or_else(|| EventError::UnsupportedKind(s.to_string()))
    }
}

impl From<ChangesetEventKind> for &'static str {
    fn from(kind: ChangesetEventKind) -> Self {
        kind.as_str()
    }
}

impl TryFrom<String> for ChangesetEventKind {
    type Error = EventError;

    fn try_from(s: String) -> Result<Self, Self::Error> {
        s.parse()
    }
}
