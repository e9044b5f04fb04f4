//! Configuration System
//!
//! Settings for building a [`crate::Codec`] from files and the environment.
//! Sources are layered: defaults, then an optional TOML file, then `HY_*`
//! environment variables (`HY_LOGGING__LEVEL` for nested keys).

use crate::error::{CodecError, Result};
use crate::logging::LoggingConfig;
use serde::{Deserialize, Serialize};
use std::path::Path;

mod merge_policy;
mod sources;

pub use sources::{ENV_PREFIX, ENV_SEPARATOR};

/// Payload encoding
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum FormatKind {
    #[default]
    Json,
    JsonPretty,
}

/// Root configuration structure
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CodecConfig {
    /// Payload encoding (default: json)
    #[serde(default)]
    pub format: FormatKind,

    /// File extension of stored targets, without the dot (default: "json")
    #[serde(default = "default_extension")]
    pub extension: String,

    /// File stem of the root target (default: "_")
    #[serde(default = "default_root_file_name")]
    pub root_file_name: String,

    /// Follow symbolic links when scanning a stored tree
    #[serde(default)]
    pub follow_symlinks: bool,

    /// Logging configuration
    #[serde(default)]
    pub logging: LoggingConfig,
}

fn default_extension() -> String {
    "json".to_string()
}

fn default_root_file_name() -> String {
    crate::io::DEFAULT_ROOT_FILE_NAME.to_string()
}

impl Default for CodecConfig {
    fn default() -> Self {
        Self {
            format: FormatKind::default(),
            extension: default_extension(),
            root_file_name: default_root_file_name(),
            follow_symlinks: false,
            logging: LoggingConfig::default(),
        }
    }
}

/// Configuration validation errors
#[derive(Debug, Clone)]
pub enum ValidationError {
    Extension(String),
    RootFileName(String),
    Logging(String),
}

impl std::fmt::Display for ValidationError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ValidationError::Extension(msg) => write!(f, "extension: {}", msg),
            ValidationError::RootFileName(msg) => write!(f, "root_file_name: {}", msg),
            ValidationError::Logging(msg) => write!(f, "logging: {}", msg),
        }
    }
}

impl std::error::Error for ValidationError {}

impl CodecConfig {
    /// Validate the entire configuration
    pub fn validate(&self) -> std::result::Result<(), Vec<ValidationError>> {
        let mut errors = Vec::new();

        if self.extension.is_empty() {
            errors.push(ValidationError::Extension("must not be empty".to_string()));
        } else if self.extension.contains(['/', '\\', '.']) {
            errors.push(ValidationError::Extension(format!(
                "{:?} must not contain '/' or '.'",
                self.extension
            )));
        }

        if self.root_file_name.is_empty() {
            errors.push(ValidationError::RootFileName("must not be empty".to_string()));
        } else if self.root_file_name.contains(['/', '\\']) {
            errors.push(ValidationError::RootFileName(format!(
                "{:?} must be a single path segment",
                self.root_file_name
            )));
        }

        if let Err(e) = self.logging.validate() {
            errors.push(ValidationError::Logging(e.to_string()));
        }

        if errors.is_empty() {
            Ok(())
        } else {
            Err(errors)
        }
    }

    /// Validate, folding every problem into one error
    pub fn check(&self) -> Result<()> {
        self.validate().map_err(|errors| {
            let error_msgs: Vec<String> = errors.iter().map(|e| e.to_string()).collect();
            CodecError::Config(format!(
                "Configuration validation failed:\n{}",
                error_msgs.join("\n")
            ))
        })
    }

    /// Render as TOML, e.g. to seed a config file
    pub fn to_toml(&self) -> Result<String> {
        toml::to_string_pretty(self)
            .map_err(|e| CodecError::Config(format!("Failed to serialize config: {}", e)))
    }
}

/// Loads [`CodecConfig`] from layered sources
pub struct ConfigLoader;

impl ConfigLoader {
    /// Built-in defaults only
    #[allow(clippy::should_implement_trait)]
    pub fn default() -> CodecConfig {
        CodecConfig::default()
    }

    /// Defaults, then `path` if given, then the process environment
    pub fn load(path: Option<&Path>) -> Result<CodecConfig> {
        Self::build(path, None, true)
    }

    /// Defaults, then `path`; the environment is ignored
    pub fn load_from_file(path: &Path) -> Result<CodecConfig> {
        Self::build(Some(path), None, false)
    }

    /// Like [`ConfigLoader::load`] with `vars` standing in for the environment
    pub fn load_with_env(
        path: Option<&Path>,
        vars: config::Map<String, String>,
    ) -> Result<CodecConfig> {
        Self::build(path, Some(vars), true)
    }

    fn build(
        path: Option<&Path>,
        vars: Option<config::Map<String, String>>,
        use_env: bool,
    ) -> Result<CodecConfig> {
        let mut builder = merge_policy::builder_with_defaults()?;
        if let Some(path) = path {
            builder = sources::add_file(builder, path);
        }
        if use_env {
            builder = sources::add_environment(builder, vars);
        }
        let config: CodecConfig = builder.build()?.try_deserialize()?;
        config.check()?;
        Ok(config)
    }
}
