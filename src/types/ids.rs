//! Newtype wrappers for changeset identifiers.
//!
//! These keep a changeset id, an event key, and a commit id from being passed
//! where one of the others is expected.

use serde::{Deserialize, Serialize};
use std::fmt;

/// Identifier of a tracked changeset (one pull request on one code host).
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ChangesetId(pub i64);

impl fmt::Display for ChangesetId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl From<i64> for ChangesetId {
    fn from(n: i64) -> Self {
        ChangesetId(n)
    }
}

/// Stable identity of an external event, unique per changeset.
///
/// Callers deduplicate stored events on `(changeset, key)`.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct EventKey(pub String);

impl EventKey {
    pub fn new(s: impl Into<String>) -> Self {
        EventKey(s.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for EventKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl From<String> for EventKey {
    fn from(s: String) -> Self {
        EventKey(s)
    }
}

impl From<&str> for EventKey {
    fn from(s: &str) -> Self {
        EventKey(s.to_string())
    }
}

/// A commit identifier as reported by a code host.
///
/// GitHub calls this an `oid`, Bitbucket Server an `id`. Both are full hex
/// SHAs in practice, but the value is not validated.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct CommitId(pub String);

impl CommitId {
    pub fn new(s: impl Into<String>) -> Self {
        CommitId(s.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// Returns a short (7-character) version of the id for display.
    pub fn short(&self) -> &str {
        self.0.get(..7).unwrap_or(&self.0)
    }
}

impl fmt::Display for CommitId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl From<String> for CommitId {
    fn from(s: String) -> Self {
        CommitId(s)
    }
}

impl From<&str> for CommitId {
    fn from(s: &str) -> Self {
        CommitId(s.to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    mod changeset_id {
        use super::*;
        use proptest::prelude::*;

        proptest! {
            #[test]
            fn serde_roundtrip(n: i64) {
                let id = ChangesetId(n);
                let json = serde_json::to_string(&id).unwrap();
                prop_assert_eq!(&json, &n.to_string());
                let parsed: ChangesetId = serde_json::from_str(&json).unwrap();
                prop_assert_eq!(id, parsed);
            }

            #[test]
            fn ordering_matches_underlying(a: i64, b: i64) {
                prop_assert_eq!(ChangesetId(a).cmp(&ChangesetId(b)), a.cmp(&b));
            }
        }
    }

    mod event_key {
        use super::*;
        use proptest::prelude::*;

        proptest! {
            #[test]
            fn ordering_matches_underlying(a in "[a-zA-Z0-9:_-]{0,30}", b in "[a-zA-Z0-9:_-]{0,30}") {
                prop_assert_eq!(EventKey::new(&a).cmp(&EventKey::new(&b)), a.cmp(&b));
            }
        }

        #[test]
        fn serializes_as_plain_string() {
            let key = EventKey::from("MDEyOklzc3VlQ29tbWVudDE=");
            assert_eq!(
                serde_json::to_string(&key).unwrap(),
                "\"MDEyOklzc3VlQ29tbWVudDE=\""
            );
        }
    }

    mod commit_id {
        use super::*;
        use proptest::prelude::*;

        proptest! {
            #[test]
            fn short_returns_7_chars(s in "[0-9a-f]{40}") {
                let id = CommitId::new(&s);
                prop_assert_eq!(id.short(), &s[..7]);
            }
        }

        #[test]
        fn short_handles_short_input() {
            assert_eq!(CommitId::new("dead").short(), "dead");
        }

        #[test]
        fn empty_is_empty() {
            assert!(CommitId::new("").is_empty());
            assert!(!CommitId::new("deadbeef").is_empty());
        }
    }
}
