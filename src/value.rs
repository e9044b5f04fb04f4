//! Value handles
//!
//! Traversal walks a `serde_json::Value` alongside the node tree. A [`Val`] pairs
//! the node describing a position with the live value found there.

use crate::error::{CodecError, Result};
use serde_json::Value;
use std::fmt;

/// How a value was reached from its parent
#[derive(Clone, Copy, PartialEq, Eq)]
pub enum Key<'a> {
    /// The top-level value
    Root,
    /// Map element under this key
    Name(&'a str),
    /// Sequence element at this position
    Index(usize),
}

impl fmt::Debug for Key<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Key::Root => f.write_str("root"),
            Key::Name(name) => write!(f, "{name:?}"),
            Key::Index(index) => write!(f, "[{index}]"),
        }
    }
}

/// The live value found at one position of a traversal
#[derive(Debug, Clone, Copy)]
pub struct Val<'a> {
    pub value: &'a Value,
    /// Set for the root and collection elements; `None` for record fields
    pub key: Option<Key<'a>>,
    /// The value sits behind an optional wrapper, so `null` means absent
    pub is_indirect: bool,
}

impl<'a> Val<'a> {
    pub fn new(value: &'a Value, key: Option<Key<'a>>, is_indirect: bool) -> Self {
        Self {
            value,
            key,
            is_indirect,
        }
    }

    /// Absent, or equal to the pointee's zero value
    pub fn is_zero(&self, zero: &Value) -> bool {
        (self.is_indirect && self.value.is_null()) || self.value == zero
    }

    /// Roots and collection elements are always written; record fields are
    /// skipped when zero
    pub fn should_write(&self, zero: &Value) -> bool {
        self.key.is_some() || !self.is_zero(zero)
    }
}

pub fn is_zero(value: &Value, zero: &Value) -> bool {
    value.is_null() || value == zero
}

/// Short description of a value's JSON kind, for error messages
pub fn kind_of(value: &Value) -> String {
    match value {
        Value::Null => "null".to_string(),
        Value::Bool(_) => "bool".to_string(),
        Value::Number(_) => "number".to_string(),
        Value::String(_) => "string".to_string(),
        Value::Array(items) => format!("array of {}", items.len()),
        Value::Object(_) => "object".to_string(),
    }
}

/// Store `key` in `field` of a record value
///
/// The key is converted to the JSON kind the field already holds, so numeric
/// and boolean key fields survive a round trip through a path segment.
pub fn set_key_field(record: &mut Value, field: &str, key: &str) -> Result<()> {
    let object = record
        .as_object_mut()
        .ok_or_else(|| CodecError::UnexpectedValue {
            path: key.to_string(),
            expected: "object",
            found: "non-object element".to_string(),
        })?;
    let converted = match object.get(field) {
        Some(Value::Number(_)) => serde_json::from_str::<serde_json::Number>(key)
            .map(Value::Number)
            .map_err(|_| CodecError::UnexpectedValue {
                path: key.to_string(),
                expected: "numeric key",
                found: format!("{key:?}"),
            })?,
        Some(Value::Bool(_)) => match key {
            "true" => Value::Bool(true),
            "false" => Value::Bool(false),
            _ => {
                return Err(CodecError::UnexpectedValue {
                    path: key.to_string(),
                    expected: "boolean key",
                    found: format!("{key:?}"),
                })
            }
        },
        _ => Value::String(key.to_string()),
    };
    object.insert(field.to_string(), converted);
    Ok(())
}

/// Check a map key can be used as a single path segment
pub fn validate_segment(segment: &str) -> Result<()> {
    if segment.is_empty() {
        return Err(CodecError::InvalidSegment {
            segment: segment.to_string(),
            reason: "must not be empty",
        });
    }
    if segment.contains('/') {
        return Err(CodecError::InvalidSegment {
            segment: segment.to_string(),
            reason: "must not contain /",
        });
    }
    if segment == "." || segment == ".." {
        return Err(CodecError::InvalidSegment {
            segment: segment.to_string(),
            reason: "must not be a relative directory name",
        });
    }
    Ok(())
}
