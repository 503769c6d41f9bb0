//! Batch ingestion of raw code-host payloads.
//!
//! A sync fetches many payloads for one changeset at once. One malformed
//! payload must not cost the rest of the batch, so by default it is logged
//! and dropped. Strict mode instead stops at the first failure, which is
//! useful when validating a new adapter against recorded fixtures.
//!
//! Ingestion does not deduplicate; callers key stored events on
//! `(changeset, key)`.

use tracing::{debug, instrument, warn};

use crate::adapters::{AdaptError, CodeHostAdapter};
use crate::events::ChangesetEvent;
use crate::types::ChangesetId;

/// Environment variable that enables strict ingestion (`1` or `true`).
pub const STRICT_INGEST_ENV: &str = "CHANGESET_EVENTS_STRICT_INGEST";

/// Configuration for batch ingestion.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct IngestConfig {
    /// Fail the whole batch on the first malformed payload.
    ///
    /// Default: false (malformed payloads are dropped and logged).
    pub strict: bool,
}

impl IngestConfig {
    /// Creates a lenient `IngestConfig`.
    pub fn new() -> Self {
        IngestConfig { strict: false }
    }

    /// Creates a strict `IngestConfig`.
    pub fn strict() -> Self {
        IngestConfig { strict: true }
    }

    /// Creates an `IngestConfig` from environment variables.
    ///
    /// Reads `CHANGESET_EVENTS_STRICT_INGEST`. Unset or unrecognized values
    /// leave ingestion lenient.
    pub fn from_env() -> Self {
        let strict = std::env::var(STRICT_INGEST_ENV)
            .ok()
            .map(|v| parse_flag(&v))
            .unwrap_or(false);
        IngestConfig { strict }
    }
}

fn parse_flag(value: &str) -> bool {
    matches!(
        value.trim().to_ascii_lowercase().as_str(),
        "1" | "true" | "yes" | "on"
    )
}

/// A payload that could not be adapted.
#[derive(Debug)]
pub struct DroppedPayload {
    /// Position of the payload in the input batch.
    pub index: usize,
    pub error: AdaptError,
}

/// The outcome of ingesting one batch.
#[derive(Debug, Default)]
pub struct IngestReport {
    /// Adapted events, in input order.
    pub events: Vec<ChangesetEvent>,

    /// Payloads of native types the adapter does not map.
    pub ignored: usize,

    /// Malformed payloads dropped in lenient mode.
    pub dropped: Vec<DroppedPayload>,
}

impl IngestReport {
    /// Returns true if every payload was either adapted or deliberately ignored.
    pub fn is_clean(&self) -> bool {
        self.dropped.is_empty()
    }
}

/// Adapts a batch of raw payloads for one changeset.
///
/// In lenient mode this never returns `Err`; malformed payloads are listed in
/// [`IngestReport::dropped`]. In strict mode the first malformed payload is
/// returned as the error.
#[instrument(skip_all, fields(host = %adapter.host(), changeset = %changeset))]
pub fn ingest<'p, A, I>(
    adapter: &A,
    changeset: ChangesetId,
    payloads: I,
    config: &IngestConfig,
) -> Result<IngestReport, AdaptError>
where
    A: CodeHostAdapter + ?Sized,
    I: IntoIterator<Item = &'p [u8]>,
{
    let mut report = IngestReport::default();

    for (index, payload) in payloads.into_iter().enumerate() {
        match adapter.adapt(changeset, payload) {
            Ok(Some(event)) => report.events.push(event),
            Ok(None) => report.ignored += 1,
            Err(error) if config.strict => return Err(error),
            Err(error) => {
                warn!(index, error = %error, "Dropping malformed payload");
                report.dropped.push(DroppedPayload { index, error });
            }
        }
    }

    debug!(
        events = report.events.len(),
        ignored = report.ignored,
        dropped = report.dropped.len(),
        "Ingested payload batch"
    );

    Ok(report)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::adapters::{BitbucketServerAdapter, GitHubAdapter};
    use crate::events::ChangesetEventKind;

    const LABELED: &str = r#"{
        "__typename": "LabeledEvent",
        "actor": { "login": "octocat" },
        "label": { "id": "LA_1", "name": "automerge" },
        "createdAt": "2024-01-15T10:00:00Z"
    }"#;

    const MERGED_WITHOUT_COMMIT: &str = r#"{
        "__typename": "MergedEvent",
        "actor": { "login": "octocat" },
        "createdAt": "2024-01-15T11:00:00Z"
    }"#;

    const COMMIT_ITEM: &str = r#"{ "__typename": "PullRequestCommit" }"#;

    fn batch<'a>(payloads: &'a [&'a str]) -> impl Iterator<Item = &'a [u8]> {
        payloads.iter().map(|p| p.as_bytes())
    }

    #[test]
    fn lenient_drops_malformed_and_continues() {
        let payloads = [MERGED_WITHOUT_COMMIT, LABELED, COMMIT_ITEM];
        let report = ingest(
            &GitHubAdapter,
            ChangesetId(1),
            batch(&payloads),
            &IngestConfig::new(),
        )
        .unwrap();

        assert_eq!(report.events.len(), 1);
        assert_eq!(report.events[0].kind(), ChangesetEventKind::GitHubLabeled);
        assert_eq!(report.ignored, 1);
        assert_eq!(report.dropped.len(), 1);
        assert_eq!(report.dropped[0].index, 0);
        assert!(!report.is_clean());
    }

    #[test]
    fn strict_returns_first_error() {
        let payloads = [LABELED, MERGED_WITHOUT_COMMIT];
        let result = ingest(
            &GitHubAdapter,
            ChangesetId(1),
            batch(&payloads),
            &IngestConfig::strict(),
        );
        assert!(matches!(
            result,
            Err(AdaptError::MalformedPayload {
                field: "commit.oid",
                ..
            })
        ));
    }

    #[test]
    fn works_through_trait_object() {
        let adapter: &dyn CodeHostAdapter = &BitbucketServerAdapter;
        let payloads = [r#"{
            "id": 1,
            "createdDate": 1705312800000,
            "user": { "id": 1, "name": "admin" },
            "action": "APPROVED"
        }"#];
        let report = ingest(adapter, ChangesetId(2), batch(&payloads), &IngestConfig::new()).unwrap();
        assert!(report.is_clean());
        assert_eq!(report.events[0].changeset_id(), ChangesetId(2));
    }

    #[test]
    fn empty_batch_is_clean() {
        let report = ingest(
            &GitHubAdapter,
            ChangesetId(1),
            std::iter::empty::<&[u8]>(),
            &IngestConfig::default(),
        )
        .unwrap();
        assert!(report.events.is_empty());
        assert!(report.is_clean());
    }

    #[test]
    fn config_from_env() {
        // The only test in this crate that touches STRICT_INGEST_ENV.
        unsafe { std::env::remove_var(STRICT_INGEST_ENV) };
        assert_eq!(IngestConfig::from_env(), IngestConfig::new());

        unsafe { std::env::set_var(STRICT_INGEST_ENV, "true") };
        assert_eq!(IngestConfig::from_env(), IngestConfig::strict());

        unsafe { std::env::set_var(STRICT_INGEST_ENV, "sometimes") };
        assert_eq!(IngestConfig::from_env(), IngestConfig::new());

        unsafe { std::env::remove_var(STRICT_INGEST_ENV) };
    }

    #[test]
    fn flag_values() {
        for on in ["1", "true", "TRUE", " yes ", "on"] {
            assert!(parse_flag(on), "{:?} should enable", on);
        }
        for off in ["", "0", "false", "nope"] {
            assert!(!parse_flag(off), "{:?} should not enable", off);
        }
    }
}
