//! Property-based tests for the codec


use hy::{Shape, Storable};
use proptest::collection::{btree_map, vec};
use proptest::prelude::*;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

#[derive(Debug, Default, Clone, PartialEq, Serialize, Deserialize)]
pub struct Entry {
    pub label: String,
    pub weight: u32,
    pub note: Option<String>,
}

impl Storable for Entry {
    fn shape() -> Shape {
        Shape::record()
            .field::<String>("label", "")
            .field::<u32>("weight", "")
            .field::<Option<String>>("note", "")
            .into()
    }
}

#[derive(Debug, Default, Clone, PartialEq, Serialize, Deserialize)]
pub struct Catalog {
    pub title: String,
    pub entries: Vec<Entry>,
    pub index: BTreeMap<String, Entry>,
    pub notes: BTreeMap<String, String>,
}

impl Storable for Catalog {
    fn shape() -> Shape {
        Shape::record()
            .field::<String>("title", "")
            .field::<Vec<Entry>>("entries", "entries/")
            .field::<BTreeMap<String, Entry>>("index", "/")
            .field::<BTreeMap<String, String>>("notes", "notes/")
            .into()
    }
}

pub fn entry() -> impl Strategy<Value = Entry> {
    // `Some("")` equals the pointee zero and reads back as `None`.
    ("[a-z ]{0,12}", any::<u32>(), proptest::option::of("[a-z]{1,6}")).prop_map(
        |(label, weight, note)| Entry {
            label,
            weight,
            note,
        },
    )
}

/// Map keys usable as single path segments
pub fn key() -> impl Strategy<Value = String> {
    "[a-z0-9]{1,8}"
}

pub fn catalog() -> impl Strategy<Value = Catalog> {
    (
        "[A-Za-z]{0,10}",
        vec(entry(), 0..6),
        btree_map(key(), entry(), 0..6),
        btree_map(key(), "[a-z]{0,8}", 0..4),
    )
        .prop_map(|(title, entries, index, notes)| Catalog {
            title,
            entries,
            index,
            notes,
        })
}
