//! Descriptions of standard library types

use super::{MapShape, Shape, Storable, TypeRef};
use std::collections::{BTreeMap, HashMap};
use std::hash::Hash;

crate::impl_scalar!(
    bool, char, String, i8, i16, i32, i64, i128, isize, u8, u16, u32, u64, u128, usize, f32,
    f64, serde_json::Value,
);

impl<T: Storable> Storable for Option<T> {
    fn shape() -> Shape {
        Shape::Indirect(TypeRef::of::<T>())
    }
}

impl<T: Storable> Storable for Box<T> {
    fn shape() -> Shape {
        Shape::Boxed(TypeRef::of::<T>())
    }
}

impl<T: Storable> Storable for Vec<T> {
    fn shape() -> Shape {
        Shape::Sequence(TypeRef::of::<T>())
    }
}

impl<K, V> Storable for HashMap<K, V>
where
    K: Storable + Eq + Hash,
    V: Storable,
{
    fn shape() -> Shape {
        Shape::Map(MapShape {
            key: TypeRef::of::<K>(),
            elem: TypeRef::of::<V>(),
        })
    }
}

impl<K, V> Storable for BTreeMap<K, V>
where
    K: Storable + Ord,
    V: Storable,
{
    fn shape() -> Shape {
        Shape::Map(MapShape {
            key: TypeRef::of::<K>(),
            elem: TypeRef::of::<V>(),
        })
    }
}
