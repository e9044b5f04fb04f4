//! Codec
//!
//! The entry point: analyses types on first use, writes values to file targets,
//! reads them back, and optionally persists targets to a directory through its
//! writer and scanner collaborators.

use crate::config::{CodecConfig, FormatKind};
use crate::context::{ReadContext, WriteContext};
use crate::error::{CodecError, Result, ResultExt};
use crate::io::{FileMarshaler, FileTreeScanner, FileWriter, Format, JsonFormat, TreeScanner};
use crate::node::analyse;
use crate::node::{NodeHandle, NodeSet};
use crate::shape::{Storable, TypeRef};
use crate::target::{FileTargets, ReadIndex};
use crate::value::{Key, Val};
use parking_lot::{Mutex, RwLock, RwLockReadGuard};
use std::path::Path;
use std::sync::Arc;
use std::time::Instant;
use tracing::{debug, info, instrument};

/// Builder for [`Codec`]
pub struct CodecBuilder {
    format: Arc<dyn Format>,
    root_file_name: String,
    follow_symlinks: bool,
    writer: Option<Box<dyn FileWriter>>,
    scanner: Option<Box<dyn TreeScanner>>,
}

impl Default for CodecBuilder {
    fn default() -> Self {
        Self {
            format: Arc::new(JsonFormat::new()),
            root_file_name: crate::io::DEFAULT_ROOT_FILE_NAME.to_string(),
            follow_symlinks: false,
            writer: None,
            scanner: None,
        }
    }
}

impl CodecBuilder {
    pub fn format(mut self, format: impl Format + 'static) -> Self {
        self.format = Arc::new(format);
        self
    }

    pub fn root_file_name(mut self, name: impl Into<String>) -> Self {
        self.root_file_name = name.into();
        self
    }

    pub fn follow_symlinks(mut self, follow: bool) -> Self {
        self.follow_symlinks = follow;
        self
    }

    /// Replace the default [`FileMarshaler`]
    pub fn writer(mut self, writer: impl FileWriter + 'static) -> Self {
        self.writer = Some(Box::new(writer));
        self
    }

    /// Replace the default [`FileTreeScanner`]
    pub fn scanner(mut self, scanner: impl TreeScanner + 'static) -> Self {
        self.scanner = Some(Box::new(scanner));
        self
    }

    pub fn build(self) -> Codec {
        let writer = self.writer.unwrap_or_else(|| {
            Box::new(
                FileMarshaler::new(self.format.clone()).with_root_file_name(&self.root_file_name),
            )
        });
        let scanner = self.scanner.unwrap_or_else(|| {
            Box::new(
                FileTreeScanner::new(self.format.extension())
                    .with_root_file_name(&self.root_file_name)
                    .follow_symlinks(self.follow_symlinks),
            )
        });
        Codec {
            nodes: RwLock::new(NodeSet::new()),
            format: self.format,
            writer,
            scanner,
        }
    }
}

/// Bidirectional codec between values and file targets
///
/// Analyses are cached for the codec's lifetime; a codec can be shared between
/// threads.
pub struct Codec {
    nodes: RwLock<NodeSet>,
    format: Arc<dyn Format>,
    writer: Box<dyn FileWriter>,
    scanner: Box<dyn TreeScanner>,
}

impl Default for Codec {
    fn default() -> Self {
        Self::new()
    }
}

impl Codec {
    /// JSON payloads, default writer and scanner
    pub fn new() -> Self {
        CodecBuilder::default().build()
    }

    pub fn builder() -> CodecBuilder {
        CodecBuilder::default()
    }

    pub fn from_config(config: &CodecConfig) -> Result<Self> {
        config.check()?;
        let format = match config.format {
            FormatKind::Json => JsonFormat::new(),
            FormatKind::JsonPretty => JsonFormat::pretty(),
        };
        Ok(Self::builder()
            .format(format.with_extension(&config.extension))
            .root_file_name(&config.root_file_name)
            .follow_symlinks(config.follow_symlinks)
            .build())
    }

    pub fn format(&self) -> &dyn Format {
        self.format.as_ref()
    }

    /// Read access to every node analysed so far
    pub fn nodes(&self) -> RwLockReadGuard<'_, NodeSet> {
        self.nodes.read()
    }

    pub fn node_count(&self) -> usize {
        self.nodes.read().len()
    }

    /// Analyse `T`, or return its cached root node
    ///
    /// A failed analysis leaves no nodes behind.
    #[instrument(skip(self), fields(ty = std::any::type_name::<T>()))]
    pub fn analyse<T: Storable>(&self) -> Result<NodeHandle> {
        let ty = TypeRef::of::<T>();
        let id = analyse::root_id(ty).context(|| format!("failed to analyse {ty}"))?;
        if let Some(handle) = self.nodes.read().lookup(&id) {
            return Ok(handle);
        }
        let mut nodes = self.nodes.write();
        analyse::analyse_root(&mut nodes, ty)
    }

    /// Project `value` onto file targets
    #[instrument(skip(self, value), fields(ty = std::any::type_name::<T>()))]
    pub fn write<T: Storable>(&self, value: &T) -> Result<FileTargets> {
        let start = Instant::now();
        let root = self.analyse::<T>()?;
        let value = serde_json::to_value(value)?;

        let nodes = self.nodes.read();
        let targets = Mutex::new(FileTargets::new());
        let ctx = WriteContext::new(&targets);
        let node = nodes.node(root)?;
        let val = Val::new(&value, Some(Key::Root), node.id.is_indirect);
        node.write_targets(&nodes, &ctx, val)?;

        let targets = targets.into_inner();
        debug!(
            targets = targets.len(),
            duration_ms = start.elapsed().as_millis(),
            "Wrote value"
        );
        Ok(targets)
    }

    /// Reconstruct a `T` from targets stored below `path` in `index`
    #[instrument(skip(self, index), fields(ty = std::any::type_name::<T>()))]
    pub fn read<T: Storable>(&self, index: &ReadIndex, path: &str) -> Result<T> {
        let root = self.analyse::<T>()?;
        let nodes = self.nodes.read();
        let ctx = ReadContext::new(index, self.format.as_ref(), path);
        let value = nodes.node(root)?.read_targets(&nodes, &ctx)?;
        debug!(entries = index.len(), "Read value");
        Ok(serde_json::from_value(value)?)
    }

    /// Marshal targets into an in-memory index
    pub fn to_index(&self, targets: &FileTargets) -> Result<ReadIndex> {
        targets.to_index(|payload| self.format.marshal(payload))
    }

    /// Write `value` and persist every target below `dir`
    #[instrument(skip_all, fields(ty = std::any::type_name::<T>(), dir = %dir.as_ref().display()))]
    pub fn save<T: Storable>(&self, dir: impl AsRef<Path>, value: &T) -> Result<FileTargets> {
        let start = Instant::now();
        let dir = dir.as_ref();
        let targets = self.write(value)?;
        self.check_reserved_paths(&targets)
            .context(|| format!("saving to {}", dir.display()))?;
        for target in targets.snapshot() {
            self.writer.write_file(dir, &target)?;
        }
        info!(
            targets = targets.len(),
            duration_ms = start.elapsed().as_millis(),
            "Saved value"
        );
        Ok(targets)
    }

    /// A top-level target named like the root file would overwrite it
    fn check_reserved_paths(&self, targets: &FileTargets) -> Result<()> {
        let Some(reserved) = self.writer.root_file_name() else {
            return Ok(());
        };
        match targets.paths().find(|path| *path == reserved) {
            Some(path) => Err(CodecError::InvalidSegment {
                segment: path.to_string(),
                reason: "reserved for the root target",
            }),
            None => Ok(()),
        }
    }

    /// Scan `dir` and reconstruct a `T` from it
    #[instrument(skip_all, fields(ty = std::any::type_name::<T>(), dir = %dir.as_ref().display()))]
    pub fn load<T: Storable>(&self, dir: impl AsRef<Path>) -> Result<T> {
        let start = Instant::now();
        let index = self.scanner.scan(dir.as_ref())?;
        let value = self.read(&index, "")?;
        info!(
            targets = index.len(),
            duration_ms = start.elapsed().as_millis(),
            "Loaded value"
        );
        Ok(value)
    }
}
