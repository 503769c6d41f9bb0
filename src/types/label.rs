//! Labels and label sets.
//!
//! A label is identified by its name. Colors and descriptions are carried
//! along for display but never affect membership.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

/// A label attached to a changeset on its code host.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Label {
    pub name: String,

    /// Hex color without the leading `#`, as GitHub reports it.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub color: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
}

impl Label {
    /// Creates a label with only a name.
    pub fn new(name: impl Into<String>) -> Self {
        Label {
            name: name.into(),
            color: None,
            description: None,
        }
    }
}

/// A set of labels keyed by name.
///
/// Iteration is in name order, so two sets with the same contents compare
/// equal and serialize identically regardless of insertion order.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(from = "Vec<Label>", into = "Vec<Label>")]
pub struct LabelSet {
    labels: BTreeMap<String, Label>,
}

impl LabelSet {
    pub fn new() -> Self {
        Self::default()
    }

    /// Inserts a label, replacing any label with the same name.
    ///
    /// Returns true if no label with that name was present.
    pub fn insert(&mut self, label: Label) -> bool {
        self.labels.insert(label.name.clone(), label).is_none()
    }

    /// Removes the label with the given name. Returns true if it was present.
    pub fn remove(&mut self, name: &str) -> bool {
        self.labels.remove(name).is_some()
    }

    pub fn contains(&self, name: &str) -> bool {
        self.labels.contains_key(name)
    }

    pub fn get(&self, name: &str) -> Option<&Label> {
        self.labels.get(name)
    }

    pub fn len(&self) -> usize {
        self.labels.len()
    }

    pub fn is_empty(&self) -> bool {
        self.labels.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = &Label> {
        self.labels.values()
    }

    /// Returns the label names in sorted order.
    pub fn names(&self) -> Vec<&str> {
        self.labels.keys().map(String::as_str).collect()
    }
}

impl FromIterator<Label> for LabelSet {
    fn from_iter<I: IntoIterator<Item = Label>>(iter: I) -> Self {
        let mut set = LabelSet::new();
        for label in iter {
            set.insert(label);
        }
        set
    }
}

impl From<Vec<Label>> for LabelSet {
    fn from(labels: Vec<Label>) -> Self {
        labels.into_iter().collect()
    }
}

impl From<LabelSet> for Vec<Label> {
    fn from(set: LabelSet) -> Self {
        set.labels.into_values().collect()
    }
}

impl<'a> IntoIterator for &'a LabelSet {
    type Item = &'a Label;
    type IntoIter = std::collections::btree_map::Values<'a, String, Label>;

    fn into_iter(self) -> Self::IntoIter {
        self.labels.values()
    }
}
