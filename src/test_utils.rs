//! Shared event builders and arbitrary generators for property-based testing.

use std::io;
use std::sync::{Arc, Mutex};

use chrono::{DateTime, Duration, TimeZone, Utc};
use proptest::prelude::*;
use tracing_subscriber::fmt::writer::MakeWriter;

use crate::events::bitbucketserver::{self, Activity};
use crate::events::github::{self, Actor, ReviewState};
use crate::events::{ChangesetEvent, ChangesetEventKind, EventMetadata};
use crate::types::{ChangesetId, ChangesetSnapshot, CommitId, EventKey, Label, LabelSet};

/// A fixed instant plus `secs` seconds, so tests never depend on the clock.
pub fn at(secs: i64) -> DateTime<Utc> {
    Utc.with_ymd_and_hms(2024, 1, 15, 10, 0, 0).unwrap() + Duration::seconds(secs)
}

fn nanos(t: DateTime<Utc>) -> i64 {
    t.timestamp_nanos_opt().unwrap()
}

pub fn snapshot(labels: &[&str], updated_at: DateTime<Utc>) -> ChangesetSnapshot {
    ChangesetSnapshot {
        id: ChangesetId(1),
        updated_at,
        labels: labels.iter().map(|n| Label::new(*n)).collect::<LabelSet>(),
        ..ChangesetSnapshot::default()
    }
}

fn event(
    changeset: i64,
    kind: ChangesetEventKind,
    key: String,
    when: DateTime<Utc>,
    metadata: EventMetadata,
) -> ChangesetEvent {
    ChangesetEvent::new(ChangesetId(changeset), kind, EventKey(key), when, when, metadata).unwrap()
}

/// Rebuilds `event` with a different key.
pub fn with_key(e: ChangesetEvent, key: &str) -> ChangesetEvent {
    ChangesetEvent::new(
        e.changeset_id(),
        e.kind(),
        EventKey::from(key),
        e.created_at(),
        e.updated_at(),
        e.metadata().clone(),
    )
    .unwrap()
}

pub fn github_label_event(
    changeset: i64,
    name: &str,
    kind: ChangesetEventKind,
    when: DateTime<Utc>,
) -> ChangesetEvent {
    let removed = kind == ChangesetEventKind::GitHubUnlabeled;
    let direction = if removed { "removed" } else { "added" };
    event(
        changeset,
        kind,
        format!("{}:{}:{}", name, direction, nanos(when)),
        when,
        EventMetadata::GitHubLabel(github::LabelEvent {
            actor: Actor::new("octocat"),
            label_id: None,
            label: Label::new(name),
            created_at: when,
            removed,
        }),
    )
}

pub fn github_merge_event(changeset: i64, commit: &str, when: DateTime<Utc>) -> ChangesetEvent {
    event(
        changeset,
        ChangesetEventKind::GitHubMerged,
        format!("merger:{}:{}", commit, nanos(when)),
        when,
        EventMetadata::GitHubMerged(github::MergedEvent {
            actor: Actor::new("merger"),
            merge_ref_name: "main".to_string(),
            commit: github::Commit {
                oid: CommitId::from(commit),
                message: None,
            },
            created_at: when,
        }),
    )
}

pub fn github_comment_event(changeset: i64, body: &str, when: DateTime<Utc>) -> ChangesetEvent {
    let id = format!("IC_{}_{}", body, nanos(when));
    event(
        changeset,
        ChangesetEventKind::GitHubCommented,
        id.clone(),
        when,
        EventMetadata::GitHubIssueComment(github::IssueComment {
            id,
            author: Actor::new("commenter"),
            body: body.to_string(),
            created_at: when,
            updated_at: when,
        }),
    )
}

pub fn github_closed_event(changeset: i64, when: DateTime<Utc>) -> ChangesetEvent {
    event(
        changeset,
        ChangesetEventKind::GitHubClosed,
        format!("closer:{}", nanos(when)),
        when,
        EventMetadata::GitHubClosed(github::ClosedEvent {
            actor: Actor::new("closer"),
            created_at: when,
            url: None,
        }),
    )
}

pub fn github_reopened_event(changeset: i64, when: DateTime<Utc>) -> ChangesetEvent {
    event(
        changeset,
        ChangesetEventKind::GitHubReopened,
        format!("reopener:{}", nanos(when)),
        when,
        EventMetadata::GitHubReopened(github::ReopenedEvent {
            actor: Actor::new("reopener"),
            created_at: when,
        }),
    )
}

pub fn github_review_event(
    changeset: i64,
    author: &str,
    state: ReviewState,
    when: DateTime<Utc>,
) -> ChangesetEvent {
    let id = format!("PRR_{}_{}", author, nanos(when));
    event(
        changeset,
        ChangesetEventKind::GitHubReviewed,
        id.clone(),
        when,
        EventMetadata::GitHubReview(github::PullRequestReview {
            id,
            author: Actor::new(author),
            body: String::new(),
            state,
            created_at: when,
            updated_at: when,
            commit: None,
        }),
    )
}

fn bitbucket_activity(
    changeset: i64,
    kind: ChangesetEventKind,
    user: &str,
    commit: Option<&str>,
    when: DateTime<Utc>,
) -> ChangesetEvent {
    let action = kind
        .bitbucket_action()
        .expect("bitbucket builders need a Bitbucket Server kind");
    event(
        changeset,
        kind,
        format!("{}:{}:{}", kind, user, nanos(when)),
        when,
        EventMetadata::BitbucketServerActivity(Activity {
            id: 1,
            created_date: when.timestamp_millis(),
            user: bitbucketserver::User {
                id: 1,
                name: user.to_string(),
                display_name: None,
            },
            action,
            comment: None,
            commit: commit.map(|c| bitbucketserver::Commit {
                id: CommitId::from(c),
                display_id: None,
                message: None,
            }),
        }),
    )
}

/// A Bitbucket Server activity of `kind` carrying `commit`.
pub fn bitbucket_event(
    changeset: i64,
    kind: ChangesetEventKind,
    commit: &str,
    when: DateTime<Utc>,
) -> ChangesetEvent {
    bitbucket_activity(changeset, kind, "admin", Some(commit), when)
}

/// A Bitbucket Server activity of `kind` by `user`, without a commit.
pub fn bitbucket_review_event(
    changeset: i64,
    user: &str,
    kind: ChangesetEventKind,
    when: DateTime<Utc>,
) -> ChangesetEvent {
    bitbucket_activity(changeset, kind, user, None, when)
}

// ─── Log capture ───

/// In-memory sink for formatted log lines.
#[derive(Clone, Default)]
pub struct LogCapture {
    buf: Arc<Mutex<Vec<u8>>>,
}

impl LogCapture {
    pub fn contents(&self) -> String {
        String::from_utf8_lossy(&self.buf.lock().unwrap()).into_owned()
    }
}

impl io::Write for LogCapture {
    fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
        self.buf.lock().unwrap().extend_from_slice(buf);
        Ok(buf.len())
    }

    fn flush(&mut self) -> io::Result<()> {
        Ok(())
    }
}

impl<'a> MakeWriter<'a> for LogCapture {
    type Writer = LogCapture;

    fn make_writer(&'a self) -> Self::Writer {
        self.clone()
    }
}

/// Runs `f` with a thread-local subscriber and returns its result together
/// with everything logged at `DEBUG` or above.
pub fn capture_logs<R>(f: impl FnOnce() -> R) -> (R, String) {
    let capture = LogCapture::default();
    let subscriber = tracing_subscriber::fmt()
        .with_writer(capture.clone())
        .with_ansi(false)
        .with_max_level(tracing::Level::DEBUG)
        .finish();
    let result = tracing::subscriber::with_default(subscriber, f);
    (result, capture.contents())
}

// ─── Generators ───

pub fn arb_time() -> impl Strategy<Value = DateTime<Utc>> {
    (0i64..100).prop_map(at)
}

pub fn arb_label_name() -> impl Strategy<Value = String> {
    prop::sample::select(vec!["base", "other", "a", "b", "automerge"]).prop_map(String::from)
}

pub fn arb_label_event() -> impl Strategy<Value = ChangesetEvent> {
    (
        arb_label_name(),
        prop_oneof![
            Just(ChangesetEventKind::GitHubLabeled),
            Just(ChangesetEventKind::GitHubUnlabeled)
        ],
        arb_time(),
    )
        .prop_map(|(name, kind, when)| github_label_event(1, &name, kind, when))
}

pub fn arb_event() -> impl Strategy<Value = ChangesetEvent> {
    let reviewer = prop::sample::select(vec!["alice", "bob", "carol"]);
    prop_oneof![
        4 => arb_label_event(),
        1 => arb_time().prop_map(|t| github_closed_event(1, t)),
        1 => arb_time().prop_map(|t| github_reopened_event(1, t)),
        1 => ("[0-9a-f]{8}", arb_time()).prop_map(|(c, t)| github_merge_event(1, &c, t)),
        1 => arb_time().prop_map(|t| github_comment_event(1, "comment", t)),
        1 => (reviewer, arb_time()).prop_map(|(r, t)| github_review_event(1, r, ReviewState::Approved, t)),
        1 => arb_time().prop_map(|t| bitbucket_event(1, ChangesetEventKind::BitbucketServerDeclined, "", t)),
    ]
}

/// Tags each event with a key unique within the collection, so fold order
/// is fully determined by the comparator.
fn with_unique_keys(events: Vec<ChangesetEvent>) -> Vec<ChangesetEvent> {
    events
        .into_iter()
        .enumerate()
        .map(|(i, e)| with_key(e, &format!("k{:04}", i)))
        .collect()
}

pub fn arb_events(
    size: impl Into<prop::collection::SizeRange>,
) -> impl Strategy<Value = Vec<ChangesetEvent>> {
    prop::collection::vec(arb_event(), size).prop_map(with_unique_keys)
}

pub fn arb_label_events(
    size: impl Into<prop::collection::SizeRange>,
) -> impl Strategy<Value = Vec<ChangesetEvent>> {
    prop::collection::vec(arb_label_event(), size).prop_map(with_unique_keys)
}
