//! Target writer

use super::format::Format;
use super::DEFAULT_ROOT_FILE_NAME;
use crate::error::{Result, ResultExt};
use crate::target::FileTarget;
use std::fs;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use tracing::trace;

/// Persists targets below a root directory
pub trait FileWriter: Send + Sync {
    fn write_file(&self, root: &Path, target: &FileTarget) -> Result<()>;

    /// File stem the root target is stored under, if the writer reserves one
    fn root_file_name(&self) -> Option<&str> {
        None
    }
}

/// Marshals each payload with a [`Format`] into `<path>.<ext>`
///
/// The root target has an empty path and is written as
/// `<root_file_name>.<ext>`.
#[derive(Clone)]
pub struct FileMarshaler {
    format: Arc<dyn Format>,
    root_file_name: String,
}

impl FileMarshaler {
    pub fn new(format: Arc<dyn Format>) -> Self {
        Self {
            format,
            root_file_name: DEFAULT_ROOT_FILE_NAME.to_string(),
        }
    }

    pub fn with_root_file_name(mut self, name: impl Into<String>) -> Self {
        self.root_file_name = name.into();
        self
    }

    /// Filesystem location of the target at `path`
    pub fn file_path(&self, root: &Path, path: &str) -> PathBuf {
        let stem = if path.is_empty() {
            self.root_file_name.as_str()
        } else {
            path
        };
        let mut file = root.to_path_buf();
        let mut segments = stem.split('/').peekable();
        while let Some(segment) = segments.next() {
            if segments.peek().is_some() {
                file.push(segment);
            } else {
                file.push(format!("{segment}.{}", self.format.extension()));
            }
        }
        file
    }
}

impl FileWriter for FileMarshaler {
    fn write_file(&self, root: &Path, target: &FileTarget) -> Result<()> {
        let file = self.file_path(root, &target.path);
        if let Some(parent) = file.parent() {
            fs::create_dir_all(parent)
                .context(|| format!("creating directory {}", parent.display()))?;
        }
        let bytes = self
            .format
            .marshal(&target.payload)
            .context(|| format!("marshaling {:?}", target.path))?;
        fs::write(&file, bytes).context(|| format!("writing {}", file.display()))?;
        trace!(path = %target.path, file = %file.display(), "Wrote target");
        Ok(())
    }

    fn root_file_name(&self) -> Option<&str> {
        Some(&self.root_file_name)
    }
}
