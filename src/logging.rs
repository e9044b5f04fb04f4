//! Logging System
//!
//! Structured logging through the `tracing` crate. The codec only emits events;
//! applications that want them printed call [`init_logging`] once at startup.

use crate::error::CodecError;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use tracing_subscriber::fmt::time::ChronoUtc;
use tracing_subscriber::{fmt, layer::SubscriberExt, util::SubscriberInitExt, EnvFilter, Registry};

/// Logging configuration
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LoggingConfig {
    /// Log level: trace, debug, info, warn, error, off
    #[serde(default = "default_log_level")]
    pub level: String,

    /// Output format: json, text (default: text)
    #[serde(default = "default_format")]
    pub format: String,

    /// Output destination: stdout, stderr
    #[serde(default = "default_output")]
    pub output: String,

    /// Enable colored output (text format only)
    #[serde(default = "default_true")]
    pub color: bool,

    /// Module-specific log levels
    #[serde(default)]
    pub modules: BTreeMap<String, String>,
}

fn default_log_level() -> String {
    "info".to_string()
}

fn default_format() -> String {
    "text".to_string()
}

fn default_output() -> String {
    "stderr".to_string()
}

fn default_true() -> bool {
    true
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: default_log_level(),
            format: default_format(),
            output: default_output(),
            color: default_true(),
            modules: BTreeMap::new(),
        }
    }
}

impl LoggingConfig {
    pub fn validate(&self) -> Result<(), CodecError> {
        parse_format(&self.format)?;
        parse_output(&self.output)?;
        build_filter(&self.level, &self.modules)?;
        Ok(())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum LogFormat {
    Text,
    Json,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum LogOutput {
    Stdout,
    Stderr,
}

/// Install a global subscriber
///
/// Priority order (highest to lowest):
/// 1. Environment variables (HY_LOG, HY_LOG_FORMAT)
/// 2. The given configuration
/// 3. Defaults
///
/// Calling it again once a subscriber is installed leaves that subscriber in
/// place.
pub fn init_logging(config: Option<&LoggingConfig>) -> Result<(), CodecError> {
    let default = LoggingConfig::default();
    let config = config.unwrap_or(&default);

    let filter = match EnvFilter::try_from_env("HY_LOG") {
        Ok(filter) => filter,
        Err(_) => build_filter(&config.level, &config.modules)?,
    };
    let format = match std::env::var("HY_LOG_FORMAT") {
        Ok(format) => parse_format(&format)?,
        Err(_) => parse_format(&config.format)?,
    };
    let output = parse_output(&config.output)?;

    let base_subscriber = Registry::default().with(filter);
    let result = match (format, output) {
        (LogFormat::Json, LogOutput::Stdout) => base_subscriber
            .with(
                fmt::layer()
                    .json()
                    .with_target(true)
                    .with_timer(ChronoUtc::rfc_3339())
                    .with_writer(std::io::stdout),
            )
            .try_init(),
        (LogFormat::Json, LogOutput::Stderr) => base_subscriber
            .with(
                fmt::layer()
                    .json()
                    .with_target(true)
                    .with_timer(ChronoUtc::rfc_3339())
                    .with_writer(std::io::stderr),
            )
            .try_init(),
        (LogFormat::Text, LogOutput::Stdout) => base_subscriber
            .with(
                fmt::layer()
                    .with_target(true)
                    .with_timer(ChronoUtc::rfc_3339())
                    .with_ansi(config.color)
                    .with_writer(std::io::stdout),
            )
            .try_init(),
        (LogFormat::Text, LogOutput::Stderr) => base_subscriber
            .with(
                fmt::layer()
                    .with_target(true)
                    .with_timer(ChronoUtc::rfc_3339())
                    .with_ansi(config.color)
                    .with_writer(std::io::stderr),
            )
            .try_init(),
    };
    if let Err(e) = result {
        tracing::debug!(error = %e, "Subscriber already installed");
    }
    Ok(())
}

fn build_filter(level: &str, modules: &BTreeMap<String, String>) -> Result<EnvFilter, CodecError> {
    if level == "off" {
        return Ok(EnvFilter::new("off"));
    }
    let mut filter = EnvFilter::try_new(level)
        .map_err(|e| CodecError::Config(format!("Invalid log level {level:?}: {e}")))?;
    for (module, module_level) in modules {
        let directive = format!("{module}={module_level}");
        filter = filter.add_directive(
            directive
                .parse()
                .map_err(|e| {
                    CodecError::Config(format!("Invalid log directive {directive:?}: {e}"))
                })?,
        );
    }
    Ok(filter)
}

fn parse_format(format: &str) -> Result<LogFormat, CodecError> {
    match format {
        "text" => Ok(LogFormat::Text),
        "json" => Ok(LogFormat::Json),
        _ => Err(CodecError::Config(format!(
            "Invalid log format: {format} (must be 'json' or 'text')"
        ))),
    }
}

fn parse_output(output: &str) -> Result<LogOutput, CodecError> {
    match output {
        "stdout" => Ok(LogOutput::Stdout),
        "stderr" => Ok(LogOutput::Stderr),
        _ => Err(CodecError::Config(format!(
            "Invalid log output: {output} (must be 'stdout' or 'stderr')"
        ))),
    }
}
