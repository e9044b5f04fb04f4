//! Payload formats

use crate::error::Result;
use serde_json::Value;

/// Turns payloads into bytes and back
pub trait Format: Send + Sync {
    /// File extension, without the dot
    fn extension(&self) -> &str;

    fn marshal(&self, payload: &Value) -> Result<Vec<u8>>;

    fn unmarshal(&self, bytes: &[u8]) -> Result<Value>;
}

/// JSON payloads, compact or pretty-printed
#[derive(Debug, Clone)]
pub struct JsonFormat {
    pretty: bool,
    extension: String,
}

impl Default for JsonFormat {
    fn default() -> Self {
        Self {
            pretty: false,
            extension: "json".to_string(),
        }
    }
}

impl JsonFormat {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn pretty() -> Self {
        Self {
            pretty: true,
            ..Self::default()
        }
    }

    /// Store files as `<path>.<extension>` instead of `<path>.json`
    pub fn with_extension(mut self, extension: impl Into<String>) -> Self {
        self.extension = extension.into();
        self
    }

    pub fn is_pretty(&self) -> bool {
        self.pretty
    }
}

impl Format for JsonFormat {
    fn extension(&self) -> &str {
        &self.extension
    }

    fn marshal(&self, payload: &Value) -> Result<Vec<u8>> {
        let mut bytes = if self.pretty {
            serde_json::to_vec_pretty(payload)?
        } else {
            serde_json::to_vec(payload)?
        };
        if self.pretty {
            bytes.push(b'\n');
        }
        Ok(bytes)
    }

    fn unmarshal(&self, bytes: &[u8]) -> Result<Value> {
        Ok(serde_json::from_slice(bytes)?)
    }
}
