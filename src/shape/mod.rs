//! Type Descriptions
//!
//! Storable types describe their structure through [`Storable::shape`]. Analysis
//! consumes these descriptions instead of inspecting types at runtime, and serde
//! handles construction and deconstruction of the values themselves.

mod impls;

use crate::error::{CodecError, Result};
use serde::de::DeserializeOwned;
use serde::Serialize;
use serde_json::Value;
use std::any::TypeId;
use std::fmt;
use std::sync::Arc;

/// A type that can be projected onto a tree of file targets
pub trait Storable: Serialize + DeserializeOwned + Default + 'static {
    /// Describe the structure of this type
    fn shape() -> Shape;
}

/// Reads the key an element reports for itself
pub type KeyGetter = Arc<dyn Fn(&Value) -> serde_json::Result<String> + Send + Sync>;

/// Pushes a discovered key back into an element
pub type KeySetter = Arc<dyn Fn(&mut Value, &str) -> serde_json::Result<()> + Send + Sync>;

/// A cheap, copyable handle on a storable type
///
/// Equality and hashing use the `TypeId` only.
#[derive(Clone, Copy)]
pub struct TypeRef {
    id: TypeId,
    name: &'static str,
    shape: fn() -> Shape,
    zero: fn() -> serde_json::Result<Value>,
}

fn zero_of<T: Storable>() -> serde_json::Result<Value> {
    serde_json::to_value(T::default())
}

impl TypeRef {
    pub fn of<T: Storable>() -> Self {
        Self {
            id: TypeId::of::<T>(),
            name: std::any::type_name::<T>(),
            shape: T::shape,
            zero: zero_of::<T>,
        }
    }

    pub fn id(&self) -> TypeId {
        self.id
    }

    pub fn name(&self) -> &'static str {
        self.name
    }

    pub fn shape(&self) -> Shape {
        (self.shape)()
    }

    /// The serialized form of the type's default value
    pub fn zero(&self) -> serde_json::Result<Value> {
        (self.zero)()
    }

    /// Strip boxes and at most one level of optionality
    ///
    /// Returns the pointee type, its shape, and whether an optional wrapper
    /// was removed.
    pub fn resolve(&self) -> Result<(TypeRef, Shape, bool)> {
        let mut current = *self;
        let mut indirect = false;
        loop {
            match current.shape() {
                Shape::Boxed(inner) => current = inner,
                Shape::Indirect(_) if indirect => {
                    return Err(CodecError::Unsupported {
                        ty: self.name.to_string(),
                        reason: "pointer to pointer".to_string(),
                    });
                }
                Shape::Indirect(inner) => {
                    indirect = true;
                    current = inner;
                }
                shape => return Ok((current, shape, indirect)),
            }
        }
    }
}

impl PartialEq for TypeRef {
    fn eq(&self, other: &Self) -> bool {
        self.id == other.id
    }
}

impl Eq for TypeRef {}

impl std::hash::Hash for TypeRef {
    fn hash<H: std::hash::Hasher>(&self, state: &mut H) {
        self.id.hash(state);
    }
}

impl fmt::Debug for TypeRef {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name)
    }
}

impl fmt::Display for TypeRef {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name)
    }
}

/// Structural classification of a type
#[derive(Clone)]
pub enum Shape {
    /// Opaque leaf, stored whole
    Scalar,
    /// Optional wrapper; absence is `null`
    Indirect(TypeRef),
    /// Heap box, transparent to analysis
    Boxed(TypeRef),
    /// Named fields
    Record(RecordShape),
    /// Key to element
    Map(MapShape),
    /// Ordered elements
    Sequence(TypeRef),
}

impl Shape {
    /// Start describing a record
    pub fn record() -> RecordShape {
        RecordShape::default()
    }

    pub fn kind_name(&self) -> &'static str {
        match self {
            Shape::Scalar => "scalar",
            Shape::Indirect(_) => "indirect",
            Shape::Boxed(_) => "box",
            Shape::Record(_) => "record",
            Shape::Map(_) => "map",
            Shape::Sequence(_) => "sequence",
        }
    }
}

impl fmt::Debug for Shape {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Shape::Scalar => f.write_str("Scalar"),
            Shape::Indirect(t) => write!(f, "Indirect({t})"),
            Shape::Boxed(t) => write!(f, "Boxed({t})"),
            Shape::Record(r) => f.debug_tuple("Record").field(r).finish(),
            Shape::Map(m) => write!(f, "Map({} -> {})", m.key, m.elem),
            Shape::Sequence(t) => write!(f, "Sequence({t})"),
        }
    }
}

/// Key and element types of a map
#[derive(Debug, Clone, Copy)]
pub struct MapShape {
    pub key: TypeRef,
    pub elem: TypeRef,
}

/// A declared record field
#[derive(Debug, Clone)]
pub struct FieldDesc {
    /// Serialized name of the field
    pub name: &'static str,
    /// Storage directive, see [`crate::tag`]
    pub tag: &'static str,
    pub ty: TypeRef,
}

/// A named key accessor a directive may reference as `name()`
#[derive(Clone)]
pub enum Method {
    Getter { name: &'static str, call: KeyGetter },
    Setter { name: &'static str, call: KeySetter },
}

impl Method {
    pub fn name(&self) -> &'static str {
        match self {
            Method::Getter { name, .. } | Method::Setter { name, .. } => name,
        }
    }
}

impl fmt::Debug for Method {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Method::Getter { name, .. } => write!(f, "Getter({name})"),
            Method::Setter { name, .. } => write!(f, "Setter({name})"),
        }
    }
}

/// Description of a record: its fields in declaration order and its key methods
#[derive(Debug, Clone, Default)]
pub struct RecordShape {
    pub fields: Vec<FieldDesc>,
    pub methods: Vec<Method>,
}

impl RecordShape {
    /// Declare a field with its storage directive
    pub fn field<T: Storable>(mut self, name: &'static str, tag: &'static str) -> Self {
        self.fields.push(FieldDesc {
            name,
            tag,
            ty: TypeRef::of::<T>(),
        });
        self
    }

    /// Register a key getter on the record type `E`
    pub fn getter<E, F>(mut self, name: &'static str, f: F) -> Self
    where
        E: DeserializeOwned + 'static,
        F: Fn(&E) -> String + Send + Sync + 'static,
    {
        let call: KeyGetter = Arc::new(move |value: &Value| {
            let elem = E::deserialize(value)?;
            Ok(f(&elem))
        });
        self.methods.push(Method::Getter { name, call });
        self
    }

    /// Register a key setter on the record type `E`
    pub fn setter<E, F>(mut self, name: &'static str, f: F) -> Self
    where
        E: Serialize + DeserializeOwned + 'static,
        F: Fn(&mut E, &str) + Send + Sync + 'static,
    {
        let call: KeySetter = Arc::new(move |value: &mut Value, key: &str| {
            let mut elem = E::deserialize(&*value)?;
            f(&mut elem, key);
            *value = serde_json::to_value(&elem)?;
            Ok(())
        });
        self.methods.push(Method::Setter { name, call });
        self
    }

    pub fn find_field(&self, name: &str) -> Option<&FieldDesc> {
        self.fields.iter().find(|f| f.name == name)
    }

    pub fn find_method(&self, name: &str) -> Option<&Method> {
        self.methods.iter().find(|m| m.name() == name)
    }
}

impl From<RecordShape> for Shape {
    fn from(record: RecordShape) -> Self {
        Shape::Record(record)
    }
}

/// Mark types as opaque scalar leaves
///
/// ```
/// use serde::{Deserialize, Serialize};
///
/// #[derive(Debug, Default, Serialize, Deserialize)]
/// enum Colour {
///     #[default]
///     Red,
///     Green,
/// }
///
/// hy::impl_scalar!(Colour);
/// ```
#[macro_export]
macro_rules! impl_scalar {
    ($($ty:ty),* $(,)?) => {
        $(
            impl $crate::shape::Storable for $ty {
                fn shape() -> $crate::shape::Shape {
                    $crate::shape::Shape::Scalar
                }
            }
        )*
    };
}
