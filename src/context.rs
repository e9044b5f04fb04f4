//! Traversal contexts
//!
//! A context carries the current slash-separated path down a traversal. Pushing
//! a segment yields a child context; the accumulator (for writes) or the index
//! (for reads) is shared by every context of one run.

use crate::error::{Result, ResultExt};
use crate::io::Format;
use crate::target::{FileTarget, FileTargets, ReadIndex};
use parking_lot::Mutex;
use serde_json::Value;

/// Append `segment` to `base`; empty parts vanish
pub fn join_path(base: &str, segment: &str) -> String {
    match (base.is_empty(), segment.is_empty()) {
        (true, _) => segment.to_string(),
        (false, true) => base.to_string(),
        (false, false) => format!("{base}/{segment}"),
    }
}

/// Write-side context
pub struct WriteContext<'t> {
    path: String,
    targets: &'t Mutex<FileTargets>,
}

impl<'t> WriteContext<'t> {
    pub fn new(targets: &'t Mutex<FileTargets>) -> Self {
        Self {
            path: String::new(),
            targets,
        }
    }

    pub fn push(&self, segment: &str) -> Self {
        Self {
            path: join_path(&self.path, segment),
            targets: self.targets,
        }
    }

    pub fn path(&self) -> &str {
        &self.path
    }

    /// Emit a target at the current path
    pub fn emit(&self, payload: Value) -> Result<()> {
        self.targets
            .lock()
            .add(FileTarget::new(self.path.clone(), payload))
    }
}

/// Read-side context
pub struct ReadContext<'a> {
    path: String,
    index: &'a ReadIndex,
    format: &'a dyn Format,
}

impl<'a> ReadContext<'a> {
    pub fn new(index: &'a ReadIndex, format: &'a dyn Format, path: &str) -> Self {
        Self {
            path: path.to_string(),
            index,
            format,
        }
    }

    pub fn push(&self, segment: &str) -> Self {
        Self {
            path: join_path(&self.path, segment),
            index: self.index,
            format: self.format,
        }
    }

    pub fn path(&self) -> &str {
        &self.path
    }

    /// The decoded payload stored at exactly this path
    pub fn read_payload(&self) -> Result<Option<Value>> {
        match self.index.get(&self.path) {
            None => Ok(None),
            Some(bytes) => self
                .format
                .unmarshal(bytes)
                .map(Some)
                .context(|| format!("decoding {:?}", self.path)),
        }
    }

    pub fn has_subtree(&self) -> bool {
        self.index.contains_subtree(&self.path)
    }

    pub fn children(&self) -> Vec<String> {
        self.index.children(&self.path)
    }
}
