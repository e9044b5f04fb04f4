//! Filesystem scanner for rebuilding a read index from a stored tree

use super::DEFAULT_ROOT_FILE_NAME;
use crate::error::{Result, ResultExt};
use crate::target::ReadIndex;
use std::fs;
use std::path::Path;
use tracing::{debug, instrument, trace};
use walkdir::WalkDir;

/// Collects stored files below a root into a [`ReadIndex`]
pub trait TreeScanner: Send + Sync {
    fn scan(&self, root: &Path) -> Result<ReadIndex>;
}

/// Scans `<path>.<ext>` files written by a [`super::FileMarshaler`]
///
/// Files with other extensions are skipped. A missing root scans as empty.
#[derive(Debug, Clone)]
pub struct FileTreeScanner {
    extension: String,
    root_file_name: String,
    /// Whether to follow symbolic links (default: false for determinism)
    follow_symlinks: bool,
}

impl FileTreeScanner {
    pub fn new(extension: impl Into<String>) -> Self {
        Self {
            extension: extension.into(),
            root_file_name: DEFAULT_ROOT_FILE_NAME.to_string(),
            follow_symlinks: false,
        }
    }

    pub fn with_root_file_name(mut self, name: impl Into<String>) -> Self {
        self.root_file_name = name.into();
        self
    }

    pub fn follow_symlinks(mut self, follow: bool) -> Self {
        self.follow_symlinks = follow;
        self
    }

    /// Target path for a file relative to the root, if it is one of ours
    fn target_path(&self, relative: &Path) -> Option<String> {
        let mut segments = Vec::new();
        for component in relative.components() {
            match component {
                std::path::Component::Normal(name) => segments.push(name.to_str()?),
                _ => return None,
            }
        }
        let last = segments.pop()?;
        let stem = last.strip_suffix(&format!(".{}", self.extension))?;
        if stem.is_empty() {
            return None;
        }
        if segments.is_empty() && stem == self.root_file_name {
            return Some(String::new());
        }
        segments.push(stem);
        Some(segments.join("/"))
    }
}

impl TreeScanner for FileTreeScanner {
    #[instrument(skip(self), fields(root = %root.display()))]
    fn scan(&self, root: &Path) -> Result<ReadIndex> {
        let mut index = ReadIndex::new();
        if !root.exists() {
            debug!(root = %root.display(), "Store root missing, nothing to scan");
            return Ok(index);
        }

        let walker = WalkDir::new(root)
            .follow_links(self.follow_symlinks)
            .sort_by_file_name();

        for entry in walker {
            let entry = entry.context(|| format!("scanning {}", root.display()))?;
            if !entry.file_type().is_file() {
                continue;
            }
            let Ok(relative) = entry.path().strip_prefix(root) else {
                continue;
            };
            let Some(path) = self.target_path(relative) else {
                trace!(file = %entry.path().display(), "Skipping foreign file");
                continue;
            };
            let bytes = fs::read(entry.path())
                .context(|| format!("reading {}", entry.path().display()))?;
            trace!(path = %path, bytes = bytes.len(), "Scanned target");
            index.insert(path, bytes);
        }

        debug!(root = %root.display(), targets = index.len(), "Scanned store");
        Ok(index)
    }
}
