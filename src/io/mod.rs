//! Storage collaborators
//!
//! The codec itself only produces and consumes in-memory targets. These are the
//! pieces that turn payloads into bytes and bytes into files, and back.

pub mod format;
pub mod scanner;
pub mod writer;

pub use format::{Format, JsonFormat};
pub use scanner::{FileTreeScanner, TreeScanner};
pub use writer::{FileMarshaler, FileWriter};

/// File stem used for the target at the empty root path
pub const DEFAULT_ROOT_FILE_NAME: &str = "_";
