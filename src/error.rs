//! Error types for the hy codec.

use thiserror::Error;

/// Result alias used throughout the crate
pub type Result<T> = std::result::Result<T, CodecError>;

/// Errors produced while parsing a field directive
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum TagError {
    #[error("malformed tag, too many commas")]
    TooManySegments,

    #[error("path name must not be empty")]
    EmptyPathName,

    #[error("path name {0:?} invalid: must not begin with /")]
    LeadingSeparator(String),

    #[error("reading {part}: illegal token {token:?}")]
    IllegalToken { part: &'static str, token: String },

    #[error("reading set key method name: setter should end with \"()\"")]
    SetterSyntax(String),
}

/// Broad classification of a [`CodecError`]
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorKind {
    /// Permanent problem with a type or its directives, found during analysis
    Schema,
    /// Failure while producing targets
    Write,
    /// Failure while reconstructing a value
    Read,
    /// Filesystem or marshaling failure in a collaborator
    Io,
    /// Invalid configuration
    Config,
    /// Broken internal invariant
    Internal,
}

/// Codec errors
#[derive(Debug, Error)]
pub enum CodecError {
    #[error("invalid tag {tag:?} on field {field}: {source}")]
    Tag {
        field: String,
        tag: String,
        #[source]
        source: TagError,
    },

    #[error("cannot analyse {ty}: {reason}")]
    Unsupported { ty: String, reason: String },

    #[error("reading {part}: {ty} has no {what} {name:?}")]
    UnresolvedKey {
        part: &'static str,
        ty: String,
        what: &'static str,
        name: String,
    },

    #[error("reading {part}: {ty}.{name}() has wrong signature")]
    WrongSignature {
        part: &'static str,
        ty: String,
        name: String,
    },

    #[error("{ty}: fields {first} and {second} share path name {path:?}")]
    DuplicatePathName {
        ty: String,
        path: String,
        first: String,
        second: String,
    },

    #[error("duplicate target {0:?}")]
    DuplicateTarget(String),

    #[error("invalid path segment {segment:?}: {reason}")]
    InvalidSegment { segment: String, reason: &'static str },

    #[error("key mismatch: element reports key {found:?} but is stored under {key:?}")]
    KeyMismatch { key: String, found: String },

    #[error("expected {expected} at {path:?}, found {found}")]
    UnexpectedValue {
        path: String,
        expected: &'static str,
        found: String,
    },

    #[error("invalid sequence index {name:?} under {path:?}")]
    InvalidIndex { path: String, name: String },

    #[error("missing sequence index {index} under {path:?}")]
    MissingIndex { path: String, index: usize },

    #[error("marshaling error: {0}")]
    Marshal(#[from] serde_json::Error),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("walking tree failed: {0}")]
    Walk(#[from] walkdir::Error),

    #[error("configuration error: {0}")]
    Config(String),

    #[error("internal error: {0}")]
    Internal(String),

    #[error("{context}: {source}")]
    Context {
        context: String,
        #[source]
        source: Box<CodecError>,
    },
}

impl From<config::ConfigError> for CodecError {
    fn from(err: config::ConfigError) -> Self {
        CodecError::Config(err.to_string())
    }
}

impl CodecError {
    /// The innermost error, with every layer of context stripped
    pub fn root_cause(&self) -> &CodecError {
        match self {
            CodecError::Context { source, .. } => source.root_cause(),
            other => other,
        }
    }

    /// Classify the innermost error
    pub fn kind(&self) -> ErrorKind {
        match self.root_cause() {
            CodecError::Tag { .. }
            | CodecError::Unsupported { .. }
            | CodecError::UnresolvedKey { .. }
            | CodecError::WrongSignature { .. }
            | CodecError::DuplicatePathName { .. } => ErrorKind::Schema,
            CodecError::DuplicateTarget(_)
            | CodecError::InvalidSegment { .. }
            | CodecError::KeyMismatch { .. } => ErrorKind::Write,
            CodecError::UnexpectedValue { .. }
            | CodecError::InvalidIndex { .. }
            | CodecError::MissingIndex { .. } => ErrorKind::Read,
            CodecError::Marshal(_) | CodecError::Io(_) | CodecError::Walk(_) => ErrorKind::Io,
            CodecError::Config(_) => ErrorKind::Config,
            CodecError::Internal(_) | CodecError::Context { .. } => ErrorKind::Internal,
        }
    }
}

/// Attach a "where" trail to errors as they unwind
pub trait ResultExt<T> {
    fn context<C, F>(self, f: F) -> Result<T>
    where
        C: Into<String>,
        F: FnOnce() -> C;
}

impl<T, E> ResultExt<T> for std::result::Result<T, E>
where
    E: Into<CodecError>,
{
    fn context<C, F>(self, f: F) -> Result<T>
    where
        C: Into<String>,
        F: FnOnce() -> C,
    {
        self.map_err(|e| CodecError::Context {
            context: f().into(),
            source: Box::new(e.into()),
        })
    }
}
