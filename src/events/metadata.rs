//! The tagged union of host payloads an event can carry.

use serde::{Deserialize, Serialize};

use super::kind::MetadataShape;
use super::{bitbucketserver, github};

/// Host-specific event payload.
///
/// Serialized with internal tagging: `{"type": "github_label", ...}`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type")]
pub enum EventMetadata {
    #[serde(rename = "github_assignment")]
    GitHubAssignment(github::AssignmentEvent),
    #[serde(rename = "github_closed")]
    GitHubClosed(github::ClosedEvent),
    #[serde(rename = "github_issue_comment")]
    GitHubIssueComment(github::IssueComment),
    #[serde(rename = "github_label")]
    GitHubLabel(github::LabelEvent),
    #[serde(rename = "github_merged")]
    GitHubMerged(github::MergedEvent),
    #[serde(rename = "github_reopened")]
    GitHubReopened(github::ReopenedEvent),
    #[serde(rename = "github_review")]
    GitHubReview(github::PullRequestReview),
    #[serde(rename = "github_review_comment")]
    GitHubReviewComment(github::PullRequestReviewComment),
    #[serde(rename = "github_review_request")]
    GitHubReviewRequest(github::ReviewRequestEvent),
    #[serde(rename = "github_renamed_title")]
    GitHubRenamedTitle(github::RenamedTitleEvent),
    #[serde(rename = "bitbucketserver_activity")]
    BitbucketServerActivity(bitbucketserver::Activity),
}

impl EventMetadata {
    pub fn shape(&self) -> MetadataShape {
        match self {
            EventMetadata::GitHubAssignment(_) => MetadataShape::GitHubAssignment,
            EventMetadata::GitHubClosed(_) => MetadataShape::GitHubClosed,
            EventMetadata::GitHubIssueComment(_) => MetadataShape::GitHubIssueComment,
            EventMetadata::GitHubLabel(_) => MetadataShape::GitHubLabel,
            EventMetadata::GitHubMerged(_) => MetadataShape::GitHubMerged,
            EventMetadata::GitHubReopened(_) => MetadataShape::GitHubReopened,
            EventMetadata::GitHubReview(_) => MetadataShape::GitHubReview,
            EventMetadata::GitHubReviewComment(_) => MetadataShape::GitHubReviewComment,
            EventMetadata::GitHubReviewRequest(_) => MetadataShape::GitHubReviewRequest,
            EventMetadata::GitHubRenamedTitle(_) => MetadataShape::GitHubRenamedTitle,
            EventMetadata::BitbucketServerActivity(_) => MetadataShape::BitbucketServerActivity,
        }
    }
}
