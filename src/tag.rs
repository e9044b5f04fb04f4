//! Field directive parsing
//!
//! A directive is a comma-separated list of at most three segments:
//! `pathSegment[,keySpec[,keySetterSpec]]`.
//!
//! - `""` (the whole directive empty): aggregated field, stored in the parent's file
//! - `"-"`: ignored
//! - `"."` or an empty path segment followed by a comma: file named after the field
//! - `"/"` or `"./"`: directory named after the field
//! - `"name"` / `"name/"`: explicit file / directory name

use crate::error::TagError;

/// Path name meaning "derive from the field's declared name"
pub const AUTO_PATH_NAME: &str = ".";

/// A parsed field directive
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Tag {
    /// The directive was empty
    pub none: bool,
    pub ignore: bool,
    pub path_name: String,
    pub is_dir: bool,
    /// Raw key spec, a field name or `name()`
    pub key: String,
    /// Raw key setter spec, `name()`
    pub set_key: String,
}

impl Tag {
    pub fn is_auto_path_name(&self) -> bool {
        self.path_name == AUTO_PATH_NAME
    }
}

/// Parse a field directive
pub fn parse_tag(tag: &str) -> Result<Tag, TagError> {
    if tag.is_empty() {
        return Ok(Tag {
            none: true,
            ..Tag::default()
        });
    }
    let parts: Vec<&str> = tag.split(',').collect();
    if parts.len() > 3 {
        return Err(TagError::TooManySegments);
    }
    let path = parts[0];
    if path == "-" {
        return Ok(Tag {
            ignore: true,
            ..Tag::default()
        });
    }
    let (path_name, is_dir) = parse_path_name(path)?;
    Ok(Tag {
        none: false,
        ignore: false,
        path_name,
        is_dir,
        key: parts.get(1).copied().unwrap_or_default().to_string(),
        set_key: parts.get(2).copied().unwrap_or_default().to_string(),
    })
}

fn parse_path_name(path: &str) -> Result<(String, bool), TagError> {
    if path.is_empty() || path == AUTO_PATH_NAME {
        return Ok((AUTO_PATH_NAME.to_string(), false));
    }
    if path == "/" || path == "./" {
        return Ok((AUTO_PATH_NAME.to_string(), true));
    }
    if path.starts_with('/') {
        return Err(TagError::LeadingSeparator(path.to_string()));
    }
    let (name, is_dir) = match path.strip_suffix('/') {
        Some(name) => (name, true),
        None => (path, false),
    };
    if name.trim().is_empty() {
        return Err(TagError::EmptyPathName);
    }
    Ok((name.to_string(), is_dir))
}

/// Check that a key spec token is an identifier: an ASCII letter followed by
/// letters, digits or underscores
pub(crate) fn is_identifier(token: &str) -> bool {
    let mut chars = token.chars();
    match chars.next() {
        Some(c) if c.is_ascii_alphabetic() => {}
        _ => return false,
    }
    chars.all(|c| c.is_ascii_alphanumeric() || c == '_')
}

/// A key spec split into its field or method form
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum KeySpec {
    Field(String),
    Method(String),
}

/// Parse the second directive segment
pub fn parse_key_spec(spec: &str) -> Result<Option<KeySpec>, TagError> {
    if spec.is_empty() {
        return Ok(None);
    }
    if let Some(name) = spec.strip_suffix("()") {
        if is_identifier(name) {
            return Ok(Some(KeySpec::Method(name.to_string())));
        }
        return Err(TagError::IllegalToken {
            part: "get key method name",
            token: spec.to_string(),
        });
    }
    if is_identifier(spec) {
        return Ok(Some(KeySpec::Field(spec.to_string())));
    }
    Err(TagError::IllegalToken {
        part: "key field name",
        token: spec.to_string(),
    })
}

/// Parse the third directive segment, which must name a method
pub fn parse_setter_spec(spec: &str) -> Result<Option<String>, TagError> {
    if spec.is_empty() {
        return Ok(None);
    }
    let illegal = |token: &str| TagError::IllegalToken {
        part: "set key method name",
        token: token.to_string(),
    };
    match spec.strip_suffix("()") {
        Some(name) if is_identifier(name) => Ok(Some(name.to_string())),
        Some(name) => Err(illegal(name)),
        None if is_identifier(spec) => Err(TagError::SetterSyntax(spec.to_string())),
        None => Err(illegal(spec)),
    }
}
