//! Bitbucket Server pull request activity adapter.
//!
//! Input is one element of the `values` array returned by
//! `/rest/api/1.0/projects/{key}/repos/{slug}/pull-requests/{id}/activities`.
//! Timestamps are epoch milliseconds. The activity `id` is the event key.

use chrono::{DateTime, TimeZone, Utc};
use serde::Deserialize;
use tracing::trace;

use super::{AdaptError, CodeHostAdapter, required};
use crate::events::bitbucketserver::{Activity, ActivityAction, Comment, Commit, User};
use crate::events::{ChangesetEvent, ChangesetEventKind, CodeHost, EventMetadata};
use crate::types::{ChangesetId, CommitId, EventKey};

const HOST: CodeHost = CodeHost::BitbucketServer;

/// Adapter for Bitbucket Server pull request activities.
#[derive(Debug, Clone, Copy, Default)]
pub struct BitbucketServerAdapter;

impl CodeHostAdapter for BitbucketServerAdapter {
    fn host(&self) -> CodeHost {
        HOST
    }

    fn adapt(
        &self,
        changeset: ChangesetId,
        payload: &[u8],
    ) -> Result<Option<ChangesetEvent>, AdaptError> {
        adapt_activity(changeset, payload)
    }
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct RawActivity {
    id: Option<u64>,
    created_date: Option<i64>,
    user: Option<RawUser>,
    action: Option<String>,
    comment: Option<RawComment>,
    commit: Option<RawCommit>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct RawUser {
    id: u64,
    name: String,
    display_name: Option<String>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct RawComment {
    id: u64,
    text: Option<String>,
    created_date: i64,
    updated_date: Option<i64>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct RawCommit {
    id: Option<String>,
    display_id: Option<String>,
    message: Option<String>,
}

/// Adapts one Bitbucket Server activity into a changeset event.
///
/// Activities with actions this crate does not map return `Ok(None)`.
/// `MERGED` activities must carry a commit and `COMMENTED` activities a
/// comment.
pub fn adapt_activity(
    changeset: ChangesetId,
    payload: &[u8],
) -> Result<Option<ChangesetEvent>, AdaptError> {
    let raw: RawActivity =
        serde_json::from_slice(payload).map_err(|e| AdaptError::json(HOST, e))?;

    let action_str = required(raw.action, HOST, "action")?;
    let action = match action_str.as_str() {
        "APPROVED" => ActivityAction::Approved,
        "UNAPPROVED" => ActivityAction::Unapproved,
        "DECLINED" => ActivityAction::Declined,
        "REOPENED" => ActivityAction::Reopened,
        "OPENED" => ActivityAction::Opened,
        "MERGED" => ActivityAction::Merged,
        "COMMENTED" => ActivityAction::Commented,
        "REVIEWED" => ActivityAction::Reviewed,
        "RESCOPED" => ActivityAction::Rescoped,
        "UPDATED" => ActivityAction::Updated,
        other => {
            trace!(action = other, "Ignoring unmapped Bitbucket Server activity");
            return Ok(None);
        }
    };

    let id = required(raw.id, HOST, "id")?;
    let created_date = required(raw.created_date, HOST, "createdDate")?;
    let created_at = millis(created_date, "createdDate")?;
    let user = required(raw.user, HOST, "user")?;

    let comment = match raw.comment {
        Some(c) => Some(Comment {
            id: c.id,
            text: c.text.unwrap_or_default(),
            created_date: c.created_date,
            updated_date: c.updated_date.unwrap_or(c.created_date),
        }),
        None if action == ActivityAction::Commented => {
            return Err(AdaptError::missing(HOST, "comment"));
        }
        None => None,
    };

    let commit = match raw.commit {
        Some(c) => Some(Commit {
            id: CommitId(required(c.id, HOST, "commit.id")?),
            display_id: c.display_id,
            message: c.message,
        }),
        None if action == ActivityAction::Merged => {
            return Err(AdaptError::missing(HOST, "commit"));
        }
        None => None,
    };

    // Edited comments are the only activities Bitbucket Server revises
    let updated_at = match &comment {
        Some(c) if c.updated_date > created_date => millis(c.updated_date, "comment.updatedDate")?,
        _ => created_at,
    };

    let activity = Activity {
        id,
        created_date,
        user: User {
            id: user.id,
            name: user.name,
            display_name: user.display_name,
        },
        action,
        comment,
        commit,
    };

    ChangesetEvent::new(
        changeset,
        ChangesetEventKind::from_bitbucket_action(action),
        EventKey(id.to_string()),
        created_at,
        updated_at,
        EventMetadata::BitbucketServerActivity(activity),
    )
    .map(Some)
    .map_err(|e| AdaptError::event(HOST, e))
}

fn millis(ms: i64, field: &'static str) -> Result<DateTime<Utc>, AdaptError> {
    Utc.timestamp_millis_opt(ms)
        .single()
        .ok_or_else(|| AdaptError::invalid(HOST, field, ms))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::events::ReviewVerdict;

    fn adapt(payload: &str) -> Result<Option<ChangesetEvent>, AdaptError> {
        adapt_activity(ChangesetId(7), payload.as_bytes())
    }

    #[test]
    fn merged_activity() {
        let event = adapt(
            r#"{
                "id": 101,
                "createdDate": 1705312800000,
                "user": { "id": 1, "name": "admin", "displayName": "Administrator" },
                "action": "MERGED",
                "commit": {
                    "id": "deadbeefdeadbeefdeadbeefdeadbeefdeadbeef",
                    "displayId": "deadbeef",
                    "message": "Merge pull request #7"
                }
            }"#,
        )
        .unwrap()
        .expect("should parse");

        assert_eq!(event.kind(), ChangesetEventKind::BitbucketServerMerged);
        assert_eq!(event.key().as_str(), "101");
        assert_eq!(event.created_at().timestamp_millis(), 1705312800000);
        assert_eq!(event.updated_at(), event.created_at());
        assert_eq!(
            event.merge_commit(),
            Some(&CommitId::from("deadbeefdeadbeefdeadbeefdeadbeefdeadbeef"))
        );
    }

    #[test]
    fn merged_activity_without_commit_is_malformed() {
        let result = adapt(
            r#"{
                "id": 101,
                "createdDate": 1705312800000,
                "user": { "id": 1, "name": "admin" },
                "action": "MERGED"
            }"#,
        );
        assert!(matches!(
            result,
            Err(AdaptError::MalformedPayload {
                host: CodeHost::BitbucketServer,
                field: "commit",
                ..
            })
        ));
    }

    #[test]
    fn approved_activity_carries_verdict() {
        let event = adapt(
            r#"{
                "id": 102,
                "createdDate": 1705312800000,
                "user": { "id": 2, "name": "reviewer" },
                "action": "APPROVED"
            }"#,
        )
        .unwrap()
        .expect("should parse");

        assert_eq!(event.kind(), ChangesetEventKind::BitbucketServerApproved);
        assert_eq!(
            event.review_verdict(),
            Some(("reviewer", ReviewVerdict::Approved))
        );
        assert_eq!(event.merge_commit(), None);
    }

    #[test]
    fn edited_comment_uses_comment_updated_date() {
        let event = adapt(
            r#"{
                "id": 103,
                "createdDate": 1705312800000,
                "user": { "id": 2, "name": "reviewer" },
                "action": "COMMENTED",
                "comment": {
                    "id": 9,
                    "text": "nit: typo",
                    "createdDate": 1705312800000,
                    "updatedDate": 1705316400000
                }
            }"#,
        )
        .unwrap()
        .expect("should parse");

        assert_eq!(event.kind(), ChangesetEventKind::BitbucketServerCommented);
        assert_eq!(event.updated_at().timestamp_millis(), 1705316400000);
    }

    #[test]
    fn commented_activity_without_comment_is_malformed() {
        let result = adapt(
            r#"{
                "id": 103,
                "createdDate": 1705312800000,
                "user": { "id": 2, "name": "reviewer" },
                "action": "COMMENTED"
            }"#,
        );
        assert!(matches!(
            result,
            Err(AdaptError::MalformedPayload { field: "comment", .. })
        ));
    }

    #[test]
    fn unmapped_action_returns_none() {
        let result = adapt(
            r#"{
                "id": 104,
                "createdDate": 1705312800000,
                "user": { "id": 2, "name": "reviewer" },
                "action": "TASK_RESOLVED"
            }"#,
        );
        assert!(result.unwrap().is_none());
    }

    #[test]
    fn missing_created_date_is_malformed() {
        let result = adapt(
            r#"{
                "id": 105,
                "user": { "id": 2, "name": "reviewer" },
                "action": "DECLINED"
            }"#,
        );
        assert!(matches!(
            result,
            Err(AdaptError::MalformedPayload {
                field: "createdDate",
                ..
            })
        ));
    }

    #[test]
    fn out_of_range_created_date_is_malformed() {
        let payload = format!(
            r#"{{ "id": 106, "createdDate": {}, "user": {{ "id": 2, "name": "r" }}, "action": "OPENED" }}"#,
            i64::MAX
        );
        assert!(matches!(
            adapt(&payload),
            Err(AdaptError::MalformedPayload {
                field: "createdDate",
                ..
            })
        ));
    }
}
