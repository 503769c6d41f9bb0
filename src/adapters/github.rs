//! GitHub pull request timeline adapter.
//!
//! Input is one item of a pull request's GraphQL `timelineItems` connection,
//! discriminated by `__typename`.
//!
//! # Parsing Strategy
//!
//! 1. Read `__typename` to pick the item type
//! 2. Deserialize the item into its raw shape
//! 3. Validate required fields explicitly and build the event
//! 4. Item types with no event kind return `Ok(None)`
//!
//! # Event keys
//!
//! - Comments and reviews: the GraphQL node id
//! - Label events: `<label id>:<added|removed>:<created nanos>`
//! - Everything else: `<actor login>:<created nanos>`

use chrono::{DateTime, Utc};
use serde::Deserialize;
use tracing::trace;

use super::{AdaptError, CodeHostAdapter, required};
use crate::events::github::{
    Actor, AssignmentEvent, ClosedEvent, Commit, IssueComment, LabelEvent, MergedEvent,
    PullRequestReview, PullRequestReviewComment, RenamedTitleEvent, ReopenedEvent,
    ReviewRequestEvent, ReviewState,
};
use crate::events::{ChangesetEvent, ChangesetEventKind, CodeHost, EventMetadata};
use crate::types::{ChangesetId, CommitId, EventKey, Label};

const HOST: CodeHost = CodeHost::GitHub;

/// Login GitHub shows for deleted accounts.
const GHOST_LOGIN: &str = "ghost";

/// Adapter for GitHub GraphQL timeline items.
#[derive(Debug, Clone, Copy, Default)]
pub struct GitHubAdapter;

impl CodeHostAdapter for GitHubAdapter {
    fn host(&self) -> CodeHost {
        HOST
    }

    fn adapt(
        &self,
        changeset: ChangesetId,
        payload: &[u8],
    ) -> Result<Option<ChangesetEvent>, AdaptError> {
        adapt_timeline_item(changeset, payload)
    }
}

/// Adapts one GitHub timeline item into a changeset event.
///
/// # Examples
///
/// ```
/// use changeset_events::adapters::github::adapt_timeline_item;
/// use changeset_events::events::ChangesetEventKind;
/// use changeset_events::types::ChangesetId;
///
/// let payload = br#"{
///     "__typename": "LabeledEvent",
///     "actor": { "login": "octocat" },
///     "label": { "id": "LA_1", "name": "automerge", "color": "0e8a16" },
///     "createdAt": "2024-01-15T10:00:00Z"
/// }"#;
///
/// let event = adapt_timeline_item(ChangesetId(1), payload).unwrap().unwrap();
/// assert_eq!(event.kind(), ChangesetEventKind::GitHubLabeled);
/// ```
pub fn adapt_timeline_item(
    changeset: ChangesetId,
    payload: &[u8],
) -> Result<Option<ChangesetEvent>, AdaptError> {
    let envelope: RawEnvelope = from_slice(payload)?;
    let typename = required(envelope.typename, HOST, "__typename")?;

    let (kind, key, created_at, updated_at, metadata) = match typename.as_str() {
        "LabeledEvent" => adapt_label(payload, false)?,
        "UnlabeledEvent" => adapt_label(payload, true)?,
        "MergedEvent" => adapt_merged(payload)?,
        "AssignedEvent" => adapt_assignment(payload, ChangesetEventKind::GitHubAssigned)?,
        "UnassignedEvent" => adapt_assignment(payload, ChangesetEventKind::GitHubUnassigned)?,
        "ClosedEvent" => adapt_closed(payload)?,
        "ReopenedEvent" => adapt_reopened(payload)?,
        "IssueComment" => adapt_issue_comment(payload)?,
        "PullRequestReview" => adapt_review(payload)?,
        "PullRequestReviewComment" => adapt_review_comment(payload)?,
        "ReviewRequestedEvent" => {
            adapt_review_request(payload, ChangesetEventKind::GitHubReviewRequested)?
        }
        "ReviewRequestRemovedEvent" => {
            adapt_review_request(payload, ChangesetEventKind::GitHubReviewRequestRemoved)?
        }
        "RenamedTitleEvent" => adapt_renamed_title(payload)?,
        // Commits, cross-references, head ref pushes etc. carry no event kind
        other => {
            trace!(typename = other, "Ignoring unmapped GitHub timeline item");
            return Ok(None);
        }
    };

    ChangesetEvent::new(changeset, kind, key, created_at, updated_at, metadata)
        .map(Some)
        .map_err(|e| AdaptError::event(HOST, e))
}

type Adapted = (
    ChangesetEventKind,
    EventKey,
    DateTime<Utc>,
    DateTime<Utc>,
    EventMetadata,
);

fn from_slice<'a, T: Deserialize<'a>>(payload: &'a [u8]) -> Result<T, AdaptError> {
    serde_json::from_slice(payload).map_err(|e| AdaptError::json(HOST, e))
}

fn actor_key(actor: &Actor, created_at: DateTime<Utc>) -> Result<EventKey, AdaptError> {
    Ok(EventKey(format!("{}:{}", actor.login, nanos(created_at)?)))
}

/// Key timestamps are nanoseconds; instants outside the i64 nanosecond range
/// (before 1677 or after 2262) cannot be keyed.
fn nanos(t: DateTime<Utc>) -> Result<i64, AdaptError> {
    t.timestamp_nanos_opt()
        .ok_or_else(|| AdaptError::invalid(HOST, "createdAt", t.to_rfc3339()))
}

// ============================================================================
// Raw payload structures for deserialization
//
// These match GitHub's GraphQL JSON. Required fields are Option<T> and
// checked explicitly so a missing field names itself in the error.
// ============================================================================

#[derive(Debug, Deserialize)]
struct RawEnvelope {
    #[serde(rename = "__typename")]
    typename: Option<String>,
}

/// Deleted accounts come back as `null`.
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct RawActor {
    login: String,
    avatar_url: Option<String>,
}

fn actor(raw: Option<RawActor>) -> Actor {
    match raw {
        Some(a) => Actor {
            login: a.login,
            avatar_url: a.avatar_url,
        },
        None => Actor::new(GHOST_LOGIN),
    }
}

#[derive(Debug, Deserialize)]
struct RawCommit {
    oid: Option<String>,
    message: Option<String>,
}

fn commit(raw: Option<RawCommit>, field: &'static str) -> Result<Commit, AdaptError> {
    let raw = required(raw, HOST, field)?;
    Ok(Commit {
        oid: CommitId(required(raw.oid, HOST, field)?),
        message: raw.message,
    })
}

// ============================================================================
// LabeledEvent / UnlabeledEvent
// ============================================================================

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct RawLabelEvent {
    actor: Option<RawActor>,
    label: Option<RawLabel>,
    created_at: Option<DateTime<Utc>>,
}

#[derive(Debug, Deserialize)]
struct RawLabel {
    id: Option<String>,
    name: Option<String>,
    color: Option<String>,
    description: Option<String>,
}

fn adapt_label(payload: &[u8], removed: bool) -> Result<Adapted, AdaptError> {
    let raw: RawLabelEvent = from_slice(payload)?;
    let label = required(raw.label, HOST, "label")?;
    let name = required(label.name, HOST, "label.name")?;
    if name.is_empty() {
        return Err(AdaptError::invalid(HOST, "label.name", name));
    }
    let created_at = required(raw.created_at, HOST, "createdAt")?;

    let direction = if removed { "removed" } else { "added" };
    let key = EventKey(format!(
        "{}:{}:{}",
        label.id.as_deref().unwrap_or(&name),
        direction,
        nanos(created_at)?
    ));
    let kind = if removed {
        ChangesetEventKind::GitHubUnlabeled
    } else {
        ChangesetEventKind::GitHubLabeled
    };

    let metadata = EventMetadata::GitHubLabel(LabelEvent {
        actor: actor(raw.actor),
        label_id: label.id,
        label: Label {
            name,
            color: label.color,
            description: label.description,
        },
        created_at,
        removed,
    });
    Ok((kind, key, created_at, created_at, metadata))
}

// ============================================================================
// MergedEvent
// ============================================================================

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct RawMergedEvent {
    actor: Option<RawActor>,
    merge_ref_name: Option<String>,
    commit: Option<RawCommit>,
    created_at: Option<DateTime<Utc>>,
}

fn adapt_merged(payload: &[u8]) -> Result<Adapted, AdaptError> {
    let raw: RawMergedEvent = from_slice(payload)?;
    let commit = commit(raw.commit, "commit.oid")?;
    let created_at = required(raw.created_at, HOST, "createdAt")?;
    let actor = actor(raw.actor);
    let key = actor_key(&actor, created_at)?;

    let metadata = EventMetadata::GitHubMerged(MergedEvent {
        actor,
        merge_ref_name: raw.merge_ref_name.unwrap_or_default(),
        commit,
        created_at,
    });
    Ok((
        ChangesetEventKind::GitHubMerged,
        key,
        created_at,
        created_at,
        metadata,
    ))
}

// ============================================================================
// AssignedEvent / UnassignedEvent
// ============================================================================

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct RawAssignmentEvent {
    actor: Option<RawActor>,
    assignee: Option<RawActor>,
    created_at: Option<DateTime<Utc>>,
}

fn adapt_assignment(payload: &[u8], kind: ChangesetEventKind) -> Result<Adapted, AdaptError> {
    let raw: RawAssignmentEvent = from_slice(payload)?;
    let created_at = required(raw.created_at, HOST, "createdAt")?;
    let actor = actor(raw.actor);
    let key = actor_key(&actor, created_at)?;

    let metadata = EventMetadata::GitHubAssignment(AssignmentEvent {
        actor,
        assignee: self::actor(raw.assignee),
        created_at,
    });
    Ok((kind, key, created_at, created_at, metadata))
}

// ============================================================================
// ClosedEvent / ReopenedEvent
// ============================================================================

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct RawStateEvent {
    actor: Option<RawActor>,
    created_at: Option<DateTime<Utc>>,
    url: Option<String>,
}

fn adapt_closed(payload: &[u8]) -> Result<Adapted, AdaptError> {
    let raw: RawStateEvent = from_slice(payload)?;
    let created_at = required(raw.created_at, HOST, "createdAt")?;
    let actor = actor(raw.actor);
    let key = actor_key(&actor, created_at)?;

    let metadata = EventMetadata::GitHubClosed(ClosedEvent {
        actor,
        created_at,
        url: raw.url,
    });
    Ok((
        ChangesetEventKind::GitHubClosed,
        key,
        created_at,
        created_at,
        metadata,
    ))
}

fn adapt_reopened(payload: &[u8]) -> Result<Adapted, AdaptError> {
    let raw: RawStateEvent = from_slice(payload)?;
    let created_at = required(raw.created_at, HOST, "createdAt")?;
    let actor = actor(raw.actor);
    let key = actor_key(&actor, created_at)?;

    let metadata = EventMetadata::GitHubReopened(ReopenedEvent { actor, created_at });
    Ok((
        ChangesetEventKind::GitHubReopened,
        key,
        created_at,
        created_at,
        metadata,
    ))
}

// ============================================================================
// IssueComment / PullRequestReviewComment
// ============================================================================

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct RawComment {
    id: Option<String>,
    author: Option<RawActor>,
    body: Option<String>,
    created_at: Option<DateTime<Utc>>,
    updated_at: Option<DateTime<Utc>>,
}

struct CommentParts {
    id: String,
    author: Actor,
    body: String,
    created_at: DateTime<Utc>,
    updated_at: DateTime<Utc>,
}

fn comment_parts(payload: &[u8]) -> Result<CommentParts, AdaptError> {
    let raw: RawComment = from_slice(payload)?;
    let id = required(raw.id, HOST, "id")?;
    let created_at = required(raw.created_at, HOST, "createdAt")?;
    Ok(CommentParts {
        id,
        author: actor(raw.author),
        body: raw.body.unwrap_or_default(),
        created_at,
        updated_at: raw.updated_at.unwrap_or(created_at),
    })
}

fn adapt_issue_comment(payload: &[u8]) -> Result<Adapted, AdaptError> {
    let c = comment_parts(payload)?;
    let key = EventKey(c.id.clone());
    let (created_at, updated_at) = (c.created_at, c.updated_at);

    let metadata = EventMetadata::GitHubIssueComment(IssueComment {
        id: c.id,
        author: c.author,
        body: c.body,
        created_at,
        updated_at,
    });
    Ok((
        ChangesetEventKind::GitHubCommented,
        key,
        created_at,
        updated_at,
        metadata,
    ))
}

fn adapt_review_comment(payload: &[u8]) -> Result<Adapted, AdaptError> {
    let c = comment_parts(payload)?;
    let key = EventKey(c.id.clone());
    let (created_at, updated_at) = (c.created_at, c.updated_at);

    let metadata = EventMetadata::GitHubReviewComment(PullRequestReviewComment {
        id: c.id,
        author: c.author,
        body: c.body,
        created_at,
        updated_at,
    });
    Ok((
        ChangesetEventKind::GitHubReviewCommented,
        key,
        created_at,
        updated_at,
        metadata,
    ))
}

// ============================================================================
// PullRequestReview
// ============================================================================

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct RawReview {
    id: Option<String>,
    author: Option<RawActor>,
    body: Option<String>,
    state: Option<String>,
    created_at: Option<DateTime<Utc>>,
    updated_at: Option<DateTime<Utc>>,
    commit: Option<RawCommit>,
}

fn adapt_review(payload: &[u8]) -> Result<Adapted, AdaptError> {
    let raw: RawReview = from_slice(payload)?;
    let id = required(raw.id, HOST, "id")?;
    let created_at = required(raw.created_at, HOST, "createdAt")?;
    let updated_at = raw.updated_at.unwrap_or(created_at);

    // GitHub uses SCREAMING_SNAKE_CASE, but tolerate other casings
    let state_str = required(raw.state, HOST, "state")?;
    let state = match state_str.to_uppercase().as_str() {
        "APPROVED" => ReviewState::Approved,
        "CHANGES_REQUESTED" => ReviewState::ChangesRequested,
        "COMMENTED" => ReviewState::Commented,
        "DISMISSED" => ReviewState::Dismissed,
        "PENDING" => ReviewState::Pending,
        _ => return Err(AdaptError::invalid(HOST, "state", state_str)),
    };

    let commit = match raw.commit {
        Some(c) => Some(commit(Some(c), "commit.oid")?),
        None => None,
    };

    let key = EventKey(id.clone());
    let metadata = EventMetadata::GitHubReview(PullRequestReview {
        id,
        author: actor(raw.author),
        body: raw.body.unwrap_or_default(),
        state,
        created_at,
        updated_at,
        commit,
    });
    Ok((
        ChangesetEventKind::GitHubReviewed,
        key,
        created_at,
        updated_at,
        metadata,
    ))
}

// ============================================================================
// ReviewRequestedEvent / ReviewRequestRemovedEvent
// ============================================================================

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct RawReviewRequestEvent {
    actor: Option<RawActor>,
    requested_reviewer: Option<RawRequestedReviewer>,
    created_at: Option<DateTime<Utc>>,
}

/// A `User`, `Team` or `Mannequin`; only users have a login.
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct RawRequestedReviewer {
    login: Option<String>,
    avatar_url: Option<String>,
}

fn adapt_review_request(payload: &[u8], kind: ChangesetEventKind) -> Result<Adapted, AdaptError> {
    let raw: RawReviewRequestEvent = from_slice(payload)?;
    let created_at = required(raw.created_at, HOST, "createdAt")?;
    let actor = actor(raw.actor);
    let key = actor_key(&actor, created_at)?;

    let requested_reviewer = raw.requested_reviewer.and_then(|r| {
        r.login.map(|login| Actor {
            login,
            avatar_url: r.avatar_url,
        })
    });

    let metadata = EventMetadata::GitHubReviewRequest(ReviewRequestEvent {
        actor,
        requested_reviewer,
        created_at,
    });
    Ok((kind, key, created_at, created_at, metadata))
}

// ============================================================================
// RenamedTitleEvent
// ============================================================================

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct RawRenamedTitleEvent {
    actor: Option<RawActor>,
    previous_title: Option<String>,
    current_title: Option<String>,
    created_at: Option<DateTime<Utc>>,
}

fn adapt_renamed_title(payload: &[u8]) -> Result<Adapted, AdaptError> {
    let raw: RawRenamedTitleEvent = from_slice(payload)?;
    let created_at = required(raw.created_at, HOST, "createdAt")?;
    let actor = actor(raw.actor);
    let key = actor_key(&actor, created_at)?;

    let metadata = EventMetadata::GitHubRenamedTitle(RenamedTitleEvent {
        actor,
        previous_title: raw.previous_title.unwrap_or_default(),
        current_title: required(raw.current_title, HOST, "currentTitle")?,
        created_at,
    });
    Ok((
        ChangesetEventKind::GitHubRenamedTitle,
        key,
        created_at,
        created_at,
        metadata,
    ))
}
