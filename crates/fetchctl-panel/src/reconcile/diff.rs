//! Set difference between consecutive snapshots.

use std::collections::{BTreeSet, HashSet};

/// Hashes that appeared and disappeared between two snapshots.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SnapshotDiff {
    /// `current \ previous`.
    pub entering: BTreeSet<String>,
    /// `previous \ current`.
    pub exiting: BTreeSet<String>,
}

impl SnapshotDiff {
    /// Diff two snapshots by hash. Duplicate hashes within one side are collapsed.
    #[must_use]
    pub fn between<'a, P, C>(previous: P, current: C) -> Self
    where
        P: IntoIterator<Item = &'a str>,
        C: IntoIterator<Item = &'a str>,
    {
        let previous: HashSet<&str> = previous.into_iter().collect();
        let current: HashSet<&str> = current.into_iter().collect();
        Self {
            entering: current
                .difference(&previous)
                .map(|hash| (*hash).to_string())
                .collect(),
            exiting: previous
                .difference(&current)
                .map(|hash| (*hash).to_string())
                .collect(),
        }
    }

    /// No membership change.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.entering.is_empty() && self.exiting.is_empty()
    }
}
