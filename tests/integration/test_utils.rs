//! Shared fixture types for integration tests

#![allow(dead_code)]

use hy::{Codec, FileTargets, Shape, Storable};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::collections::{BTreeMap, HashMap};

#[derive(Debug, Default, Clone, PartialEq, Serialize, Deserialize)]
pub struct Elem {
    pub name: String,
}

impl Storable for Elem {
    fn shape() -> Shape {
        Shape::record().field::<String>("name", "").into()
    }
}

impl Elem {
    pub fn new(name: &str) -> Self {
        Self {
            name: name.to_string(),
        }
    }
}

/// A record with a directory of sequence elements
#[derive(Debug, Default, Clone, PartialEq, Serialize, Deserialize)]
pub struct Doc {
    pub name: String,
    pub items: Vec<Elem>,
}

impl Storable for Doc {
    fn shape() -> Shape {
        Shape::record()
            .field::<String>("name", "")
            .field::<Vec<Elem>>("items", "items/")
            .into()
    }
}

/// A record with a directory of map elements
#[derive(Debug, Default, Clone, PartialEq, Serialize, Deserialize)]
pub struct Tagged {
    pub name: String,
    pub tags: HashMap<String, Elem>,
}

impl Storable for Tagged {
    fn shape() -> Shape {
        Shape::record()
            .field::<String>("name", "")
            .field::<HashMap<String, Elem>>("tags", "tags/")
            .into()
    }
}

/// A self-referential record
#[derive(Debug, Default, Clone, PartialEq, Serialize, Deserialize)]
pub struct Tree {
    pub name: String,
    pub child: Option<Box<Tree>>,
    pub children: Vec<Tree>,
}

impl Storable for Tree {
    fn shape() -> Shape {
        Shape::record()
            .field::<String>("name", "")
            .field::<Option<Box<Tree>>>("child", ".")
            .field::<Vec<Tree>>("children", "/")
            .into()
    }
}

/// One field of every storage kind
#[derive(Debug, Default, Clone, PartialEq, Serialize, Deserialize)]
pub struct Kitchen {
    pub title: String,
    pub count: Option<u32>,
    pub skipped: String,
    pub info: Elem,
    pub maybe: Option<Elem>,
    pub notes: Vec<String>,
    pub attrs: BTreeMap<String, String>,
    pub scores: BTreeMap<u32, Elem>,
    pub slots: Vec<Option<Elem>>,
}

impl Storable for Kitchen {
    fn shape() -> Shape {
        Shape::record()
            .field::<String>("title", "")
            .field::<Option<u32>>("count", "")
            .field::<String>("skipped", "-")
            .field::<Elem>("info", "information")
            .field::<Option<Elem>>("maybe", ".")
            .field::<Vec<String>>("notes", ".")
            .field::<BTreeMap<String, String>>("attrs", "/")
            .field::<BTreeMap<u32, Elem>>("scores", "scores/")
            .field::<Vec<Option<Elem>>>("slots", "slots/")
            .into()
    }
}

/// Write and read back through an in-memory index
pub fn round_trip<T: Storable>(codec: &Codec, value: &T) -> T {
    let targets = codec.write(value).unwrap();
    let index = codec.to_index(&targets).unwrap();
    codec.read(&index, "").unwrap()
}

pub fn paths(targets: &FileTargets) -> Vec<&str> {
    targets.paths().collect()
}

pub fn payload<'a>(targets: &'a FileTargets, path: &str) -> &'a Value {
    targets
        .get(path)
        .unwrap_or_else(|| panic!("no target at {path:?}, have {:?}", paths(targets)))
}
