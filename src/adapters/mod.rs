//! Code-host adapters.
//!
//! An adapter turns one native payload from a code host into a canonical
//! [`ChangesetEvent`]. Adapters are pure and depend only on the event model.
//!
//! # Contract
//!
//! * `Ok(Some(event))` - the payload mapped to a known event kind
//! * `Ok(None)` - a native event type the adapter does not map (ignored)
//! * `Err(e)` - the payload is malformed for its declared type
//!
//! When a host reports only a creation time, the event's `updated_at` equals
//! its `created_at`.

pub mod bitbucketserver;
pub mod github;

use thiserror::Error;

use crate::events::{ChangesetEvent, CodeHost, EventError};
use crate::types::ChangesetId;

pub use bitbucketserver::BitbucketServerAdapter;
pub use github::GitHubAdapter;

/// Error type for payloads an adapter cannot turn into an event.
#[derive(Debug, Error)]
pub enum AdaptError {
    /// The payload is not valid JSON or a field has the wrong type.
    #[error("{host} payload is not valid JSON: {source}")]
    Json {
        host: CodeHost,
        #[source]
        source: serde_json::Error,
    },

    /// The payload lacks, or has an invalid value for, a field its type requires.
    #[error("malformed {host} payload: {field}: {reason}")]
    MalformedPayload {
        host: CodeHost,
        field: &'static str,
        reason: String,
    },
}

impl AdaptError {
    pub fn host(&self) -> CodeHost {
        match self {
            AdaptError::Json { host, .. } | AdaptError::MalformedPayload { host, .. } => *host,
        }
    }

    pub(crate) fn missing(host: CodeHost, field: &'static str) -> Self {
        AdaptError::MalformedPayload {
            host,
            field,
            reason: "missing".to_string(),
        }
    }

    pub(crate) fn invalid(host: CodeHost, field: &'static str, value: impl ToString) -> Self {
        AdaptError::MalformedPayload {
            host,
            field,
            reason: format!("invalid value {:?}", value.to_string()),
        }
    }

    pub(crate) fn event(host: CodeHost, err: EventError) -> Self {
        AdaptError::MalformedPayload {
            host,
            field: "kind",
            reason: err.to_string(),
        }
    }

    pub(crate) fn json(host: CodeHost, source: serde_json::Error) -> Self {
        AdaptError::Json { host, source }
    }
}

/// Maps native payloads from one code host into canonical events.
pub trait CodeHostAdapter {
    /// The host this adapter understands.
    fn host(&self) -> CodeHost;

    /// Adapts one raw JSON payload for the given changeset.
    fn adapt(
        &self,
        changeset: ChangesetId,
        payload: &[u8],
    ) -> Result<Option<ChangesetEvent>, AdaptError>;
}

/// Unwraps a field the payload's declared type requires.
pub(crate) fn required<T>(
    value: Option<T>,
    host: CodeHost,
    field: &'static str,
) -> Result<T, AdaptError> {
    value.ok_or_else(|| AdaptError::missing(host, field))
}
