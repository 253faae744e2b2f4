use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

/// Article id -> epoch milliseconds of the first time it was marked read.
/// Presence of an entry is the only record of "read"; entries are never
/// removed.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ReadState(BTreeMap<String, i64>);

impl ReadState {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn is_read(&self, id: &str) -> bool {
        self.0.contains_key(id)
    }

    pub fn read_at(&self, id: &str) -> Option<i64> {
        self.0.get(id).copied()
    }

    /// Records `id` as read at `timestamp` unless it already is.
    /// Returns whether the state changed.
    pub fn mark(&mut self, id: &str, timestamp: i64) -> bool {
        if self.0.contains_key(id) {
            return false;
        }
        self.0.insert(id.to_string(), timestamp);
        true
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&String, &i64)> {
        self.0.iter()
    }
}

impl FromIterator<(String, i64)> for ReadState {
    fn from_iter<T: IntoIterator<Item = (String, i64)>>(iter: T) -> Self {
        Self(iter.into_iter().collect())
    }
}
