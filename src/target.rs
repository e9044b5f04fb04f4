//! File targets
//!
//! The flattened result of a write: one payload per slash-separated path, and
//! the reverse, an index of stored bytes that a read reconstructs from.

use crate::error::{CodecError, Result};
use serde_json::Value;
use std::collections::btree_map::{self, BTreeMap};
use std::collections::BTreeSet;

/// One file to be written
#[derive(Debug, Clone, PartialEq)]
pub struct FileTarget {
    /// Slash-separated path relative to the store root; empty for the root
    pub path: String,
    pub payload: Value,
}

impl FileTarget {
    pub fn new(path: impl Into<String>, payload: Value) -> Self {
        Self {
            path: path.into(),
            payload,
        }
    }
}

/// Targets keyed by path; a path appears at most once
#[derive(Debug, Clone, Default, PartialEq)]
pub struct FileTargets {
    targets: BTreeMap<String, Value>,
}

impl FileTargets {
    pub fn new() -> Self {
        Self::default()
    }

    /// Build from a list, rejecting duplicate paths
    pub fn from_targets(targets: impl IntoIterator<Item = FileTarget>) -> Result<Self> {
        let mut out = Self::new();
        for target in targets {
            out.add(target)?;
        }
        Ok(out)
    }

    pub fn add(&mut self, target: FileTarget) -> Result<()> {
        match self.targets.entry(target.path) {
            btree_map::Entry::Occupied(entry) => {
                Err(CodecError::DuplicateTarget(entry.key().clone()))
            }
            btree_map::Entry::Vacant(entry) => {
                entry.insert(target.payload);
                Ok(())
            }
        }
    }

    pub fn get(&self, path: &str) -> Option<&Value> {
        self.targets.get(path)
    }

    pub fn contains(&self, path: &str) -> bool {
        self.targets.contains_key(path)
    }

    pub fn len(&self) -> usize {
        self.targets.len()
    }

    pub fn is_empty(&self) -> bool {
        self.targets.is_empty()
    }

    pub fn paths(&self) -> impl Iterator<Item = &str> {
        self.targets.keys().map(String::as_str)
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &Value)> {
        self.targets.iter().map(|(path, payload)| (path.as_str(), payload))
    }

    /// Targets ordered by path
    pub fn snapshot(&self) -> Vec<FileTarget> {
        self.iter()
            .map(|(path, payload)| FileTarget::new(path, payload.clone()))
            .collect()
    }

    /// Marshal every payload into an index a read can consume
    pub fn to_index(
        &self,
        marshal: impl Fn(&Value) -> Result<Vec<u8>>,
    ) -> Result<ReadIndex> {
        let mut index = ReadIndex::new();
        for (path, payload) in self.iter() {
            index.insert(path, marshal(payload)?);
        }
        Ok(index)
    }
}

impl IntoIterator for FileTargets {
    type Item = FileTarget;
    type IntoIter = std::vec::IntoIter<FileTarget>;

    fn into_iter(self) -> Self::IntoIter {
        self.targets
            .into_iter()
            .map(|(path, payload)| FileTarget { path, payload })
            .collect::<Vec<_>>()
            .into_iter()
    }
}

/// Stored bytes keyed by slash-separated path
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ReadIndex {
    entries: BTreeMap<String, Vec<u8>>,
}

impl ReadIndex {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn insert(&mut self, path: impl Into<String>, bytes: Vec<u8>) {
        self.entries.insert(path.into(), bytes);
    }

    pub fn get(&self, path: &str) -> Option<&[u8]> {
        self.entries.get(path).map(Vec::as_slice)
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn paths(&self) -> impl Iterator<Item = &str> {
        self.entries.keys().map(String::as_str)
    }

    /// True if `path` or anything below it is stored
    pub fn contains_subtree(&self, path: &str) -> bool {
        if path.is_empty() {
            return !self.entries.is_empty();
        }
        if self.entries.contains_key(path) {
            return true;
        }
        let prefix = format!("{path}/");
        self.entries
            .range(prefix.clone()..)
            .next()
            .map_or(false, |(p, _)| p.starts_with(&prefix))
    }

    /// Distinct first segments of the paths strictly below `path`, sorted
    pub fn children(&self, path: &str) -> Vec<String> {
        let prefix = if path.is_empty() {
            String::new()
        } else {
            format!("{path}/")
        };
        let mut out = BTreeSet::new();
        for (p, _) in self.entries.range(prefix.clone()..) {
            let Some(rest) = p.strip_prefix(&prefix) else {
                break;
            };
            if let Some(first) = rest.split('/').next().filter(|s| !s.is_empty()) {
                out.insert(first.to_string());
            }
        }
        out.into_iter().collect()
    }
}

impl FromIterator<(String, Vec<u8>)> for ReadIndex {
    fn from_iter<I: IntoIterator<Item = (String, Vec<u8>)>>(iter: I) -> Self {
        Self {
            entries: iter.into_iter().collect(),
        }
    }
}
