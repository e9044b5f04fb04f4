//! Config sources: an optional TOML file and the process environment.

use config::builder::DefaultState;
use config::{ConfigBuilder, Environment, File, FileFormat, Map};
use std::path::Path;

/// Prefix of environment overrides, e.g. `HY_ROOT_FILE_NAME`
pub const ENV_PREFIX: &str = "HY";

/// Separator for nested keys, e.g. `HY_LOGGING__LEVEL`
pub const ENV_SEPARATOR: &str = "__";

/// Add a config file; a missing file is an error.
pub fn add_file(
    builder: ConfigBuilder<DefaultState>,
    path: &Path,
) -> ConfigBuilder<DefaultState> {
    builder.add_source(File::from(path).format(FileFormat::Toml).required(true))
}

/// Add environment overrides, read from `vars` instead of the process
/// environment when given.
pub fn add_environment(
    builder: ConfigBuilder<DefaultState>,
    vars: Option<Map<String, String>>,
) -> ConfigBuilder<DefaultState> {
    builder.add_source(
        Environment::with_prefix(ENV_PREFIX)
            .prefix_separator("_")
            .separator(ENV_SEPARATOR)
            .try_parsing(true)
            .source(vars),
    )
}
