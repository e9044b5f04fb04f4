//! Merge rules: defaults and override order.
//!
//! Later sources win: defaults, then the config file, then `HY_*` environment
//! variables.

use config::builder::DefaultState;
use config::{Config, ConfigBuilder, ConfigError};

/// Create a Config builder with merge policy defaults applied.
pub fn builder_with_defaults() -> Result<ConfigBuilder<DefaultState>, ConfigError> {
    Config::builder()
        .set_default("format", "json")?
        .set_default("extension", "json")?
        .set_default("root_file_name", crate::io::DEFAULT_ROOT_FILE_NAME)?
        .set_default("follow_symlinks", false)
}
