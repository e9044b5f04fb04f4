//! Per-field storage policy
//!
//! A [`FieldInfo`] is derived once per record field at analysis time from the
//! field's directive and declared type. Key references in the directive are
//! resolved here into typed accessors, so traversal never looks anything up by
//! name.

use crate::error::{CodecError, Result, ResultExt};
use crate::shape::{FieldDesc, KeyGetter, KeySetter, Method, RecordShape, Shape, TypeRef};
use crate::tag::{self, KeySpec, Tag};
use std::fmt;

/// Where a map element's own key lives
#[derive(Clone)]
pub enum KeySource {
    /// A field of the element that receives the map key
    Field(String),
    /// A getter reporting the element's key
    Getter { name: String, call: KeyGetter },
}

impl fmt::Debug for KeySource {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            KeySource::Field(name) => write!(f, "Field({name})"),
            KeySource::Getter { name, .. } => write!(f, "Getter({name}())"),
        }
    }
}

/// A resolved key setter
#[derive(Clone)]
pub struct NamedSetter {
    pub name: String,
    pub call: KeySetter,
}

impl fmt::Debug for NamedSetter {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}()", self.name)
    }
}

/// Storage policy for one record field
#[derive(Debug, Clone)]
pub struct FieldInfo {
    /// Declared (serialized) field name
    pub name: &'static str,
    pub ty: TypeRef,
    pub tag: Tag,
    /// Path segment for fields with their own path; empty otherwise
    pub path_name: String,
    pub auto_path_name: bool,
    pub ignore: bool,
    /// Stored inline in the parent record's file
    pub is_aggregated: bool,
    pub is_dir: bool,
    pub omit_if_zero: bool,
    pub key: Option<KeySource>,
    pub key_setter: Option<NamedSetter>,
}

impl FieldInfo {
    /// Derive the policy for `field` declared on `owner`
    pub fn new(owner: TypeRef, field: &FieldDesc) -> Result<Self> {
        Self::build(field).context(|| {
            format!(
                "analysing field {}.{} {:?}",
                owner.name(),
                field.name,
                field.tag
            )
        })
    }

    fn build(field: &FieldDesc) -> Result<Self> {
        let tag = tag::parse_tag(field.tag).map_err(|source| CodecError::Tag {
            field: field.name.to_string(),
            tag: field.tag.to_string(),
            source,
        })?;

        let mut info = FieldInfo {
            name: field.name,
            ty: field.ty,
            tag: tag.clone(),
            path_name: String::new(),
            auto_path_name: false,
            ignore: tag.ignore,
            is_aggregated: tag.none,
            is_dir: false,
            omit_if_zero: tag.none,
            key: None,
            key_setter: None,
        };
        if tag.ignore || tag.none {
            return Ok(info);
        }

        info.is_dir = tag.is_dir;
        if tag.is_auto_path_name() {
            info.auto_path_name = true;
            info.path_name = field.name.to_string();
        } else {
            info.path_name = tag.path_name.clone();
        }

        let key_spec = tag::parse_key_spec(&tag.key).map_err(|source| CodecError::Tag {
            field: field.name.to_string(),
            tag: field.tag.to_string(),
            source,
        })?;
        let setter_spec =
            tag::parse_setter_spec(&tag.set_key).map_err(|source| CodecError::Tag {
                field: field.name.to_string(),
                tag: field.tag.to_string(),
                source,
            })?;
        if key_spec.is_none() && setter_spec.is_none() {
            return Ok(info);
        }

        let (elem_ty, elem) = map_element_record(field.ty)?;
        if let Some(spec) = key_spec {
            info.key = Some(resolve_key(elem_ty, &elem, spec)?);
        }
        if let Some(name) = setter_spec {
            info.key_setter = Some(resolve_setter(elem_ty, &elem, name)?);
        }
        Ok(info)
    }

    /// True when the field gets its own path
    pub fn has_own_path(&self) -> bool {
        !self.ignore && !self.is_aggregated
    }
}

/// The record description of a map field's elements
fn map_element_record(ty: TypeRef) -> Result<(TypeRef, RecordShape)> {
    let (_, shape, _) = ty.resolve()?;
    let map = match shape {
        Shape::Map(map) => map,
        other => {
            return Err(CodecError::Unsupported {
                ty: ty.name().to_string(),
                reason: format!("key spec requires a map field, found {}", other.kind_name()),
            })
        }
    };
    let (elem_ty, elem_shape, _) = map.elem.resolve()?;
    match elem_shape {
        Shape::Record(record) => Ok((elem_ty, record)),
        other => Err(CodecError::Unsupported {
            ty: ty.name().to_string(),
            reason: format!(
                "key spec requires record elements, found {}",
                other.kind_name()
            ),
        }),
    }
}

fn resolve_key(elem_ty: TypeRef, elem: &RecordShape, spec: KeySpec) -> Result<KeySource> {
    match spec {
        KeySpec::Field(name) => {
            if elem.find_field(&name).is_none() {
                return Err(CodecError::UnresolvedKey {
                    part: "key field name",
                    ty: elem_ty.name().to_string(),
                    what: "field",
                    name,
                });
            }
            Ok(KeySource::Field(name))
        }
        KeySpec::Method(name) => match elem.find_method(&name) {
            Some(Method::Getter { call, .. }) => Ok(KeySource::Getter {
                name,
                call: call.clone(),
            }),
            Some(Method::Setter { .. }) => Err(CodecError::WrongSignature {
                part: "get key method name",
                ty: elem_ty.name().to_string(),
                name,
            }),
            None => Err(CodecError::UnresolvedKey {
                part: "get key method name",
                ty: elem_ty.name().to_string(),
                what: "method",
                name,
            }),
        },
    }
}

fn resolve_setter(elem_ty: TypeRef, elem: &RecordShape, name: String) -> Result<NamedSetter> {
    match elem.find_method(&name) {
        Some(Method::Setter { call, .. }) => Ok(NamedSetter {
            name,
            call: call.clone(),
        }),
        Some(Method::Getter { .. }) => Err(CodecError::WrongSignature {
            part: "set key method name",
            ty: elem_ty.name().to_string(),
            name,
        }),
        None => Err(CodecError::UnresolvedKey {
            part: "set key method name",
            ty: elem_ty.name().to_string(),
            what: "method",
            name,
        }),
    }
}
