//! Integration tests for saving values to disk and loading them back

use super::test_utils::{Doc, Elem, Kitchen, Tree};
use hy::{Codec, CodecError, JsonFormat, Shape, Storable};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fs;
use std::path::Path;
use tempfile::TempDir;
use walkdir::WalkDir;

/// Every file below `root`, relative and sorted
fn files(root: &Path) -> Vec<String> {
    let mut out: Vec<String> = WalkDir::new(root)
        .into_iter()
        .filter_map(|e| e.ok())
        .filter(|e| e.file_type().is_file())
        .map(|e| {
            e.path()
                .strip_prefix(root)
                .unwrap()
                .to_string_lossy()
                .replace('\\', "/")
        })
        .collect();
    out.sort();
    out
}

fn sample_doc() -> Doc {
    Doc {
        name: "A".to_string(),
        items: vec![Elem::new("x"), Elem::new("y")],
    }
}

#[test]
fn test_save_lays_out_one_file_per_target() {
    let temp_dir = TempDir::new().unwrap();
    let codec = Codec::new();

    let targets = codec.save(temp_dir.path(), &sample_doc()).unwrap();

    assert_eq!(targets.len(), 3);
    assert_eq!(
        files(temp_dir.path()),
        vec!["_.json", "items/0.json", "items/1.json"]
    );
    let root = fs::read_to_string(temp_dir.path().join("_.json")).unwrap();
    assert_eq!(root, r#"{"name":"A"}"#);
}

#[test]
fn test_save_then_load() {
    let temp_dir = TempDir::new().unwrap();
    let codec = Codec::new();
    let doc = sample_doc();

    codec.save(temp_dir.path(), &doc).unwrap();
    let loaded: Doc = codec.load(temp_dir.path()).unwrap();

    assert_eq!(loaded, doc);
}

#[test]
fn test_kitchen_survives_the_filesystem() {
    let temp_dir = TempDir::new().unwrap();
    let codec = Codec::new();
    let mut attrs = BTreeMap::new();
    attrs.insert("v1.2".to_string(), "dotted".to_string());
    attrs.insert("plain".to_string(), "text".to_string());
    let mut scores = BTreeMap::new();
    scores.insert(3, Elem::new("three"));
    let kitchen = Kitchen {
        title: "kitchen".to_string(),
        count: Some(2),
        skipped: String::new(),
        info: Elem::new("info"),
        maybe: Some(Elem::new("maybe")),
        notes: vec!["one".to_string()],
        attrs,
        scores,
        slots: vec![None, Some(Elem::new("slot"))],
    };

    codec.save(temp_dir.path(), &kitchen).unwrap();
    assert!(temp_dir.path().join("attrs/v1.2.json").is_file());

    let loaded: Kitchen = codec.load(temp_dir.path()).unwrap();
    assert_eq!(loaded, kitchen);
}

#[test]
fn test_recursive_value_survives_the_filesystem() {
    let temp_dir = TempDir::new().unwrap();
    let codec = Codec::new();
    let tree = Tree {
        name: "root".to_string(),
        child: Some(Box::new(Tree {
            name: "child".to_string(),
            ..Tree::default()
        })),
        children: vec![Tree {
            name: "first".to_string(),
            ..Tree::default()
        }],
    };

    codec.save(temp_dir.path(), &tree).unwrap();
    assert_eq!(
        files(temp_dir.path()),
        vec!["_.json", "child.json", "children/0.json"]
    );
    let loaded: Tree = codec.load(temp_dir.path()).unwrap();
    assert_eq!(loaded, tree);
}

#[test]
fn test_load_of_missing_directory_is_zero() {
    let temp_dir = TempDir::new().unwrap();
    let codec = Codec::new();

    let loaded: Doc = codec.load(temp_dir.path().join("absent")).unwrap();

    assert_eq!(loaded, Doc::default());
}

#[test]
fn test_foreign_files_are_ignored() {
    let temp_dir = TempDir::new().unwrap();
    let codec = Codec::new();
    let doc = sample_doc();
    codec.save(temp_dir.path(), &doc).unwrap();
    fs::write(temp_dir.path().join("README.md"), "notes").unwrap();
    fs::write(temp_dir.path().join("items/2.txt"), "stray").unwrap();

    let loaded: Doc = codec.load(temp_dir.path()).unwrap();

    assert_eq!(loaded, doc);
}

#[derive(Debug, Default, Serialize, Deserialize)]
struct Inner {
    b: String,
}

impl Storable for Inner {
    fn shape() -> Shape {
        Shape::record().field::<String>("b", "b").into()
    }
}

#[derive(Debug, Default, Serialize, Deserialize)]
struct Overlapping {
    a: Inner,
    ab: String,
}

impl Storable for Overlapping {
    fn shape() -> Shape {
        Shape::record()
            .field::<Inner>("a", "a")
            .field::<String>("ab", "a/b")
            .into()
    }
}

#[test]
fn test_failed_write_touches_nothing() {
    let temp_dir = TempDir::new().unwrap();
    let codec = Codec::new();
    let value = Overlapping {
        a: Inner { b: "x".to_string() },
        ab: "y".to_string(),
    };

    let err = codec.save(temp_dir.path(), &value).unwrap_err();

    assert!(matches!(err.root_cause(), CodecError::DuplicateTarget(_)), "{err}");
    assert!(files(temp_dir.path()).is_empty());
}

#[test]
fn test_custom_root_file_name_and_pretty_format() {
    let temp_dir = TempDir::new().unwrap();
    let codec = Codec::builder()
        .format(JsonFormat::pretty())
        .root_file_name("index")
        .build();
    let doc = sample_doc();

    codec.save(temp_dir.path(), &doc).unwrap();

    assert_eq!(
        files(temp_dir.path()),
        vec!["index.json", "items/0.json", "items/1.json"]
    );
    let root = fs::read_to_string(temp_dir.path().join("index.json")).unwrap();
    assert_eq!(root, "{\n  \"name\": \"A\"\n}\n");

    let loaded: Doc = codec.load(temp_dir.path()).unwrap();
    assert_eq!(loaded, doc);

    // A default codec looks for `_.json` and finds only the elements.
    let other: Doc = Codec::new().load(temp_dir.path()).unwrap();
    assert_eq!(other.name, "");
    assert_eq!(other.items, doc.items);
}

#[derive(Debug, Default, Clone, PartialEq, Serialize, Deserialize)]
struct Leaf {
    v: String,
}

impl Storable for Leaf {
    fn shape() -> Shape {
        Shape::record().field::<String>("v", "").into()
    }
}

#[derive(Debug, Default, Clone, PartialEq, Serialize, Deserialize)]
struct Branch {
    name: String,
    sub: Leaf,
}

impl Storable for Branch {
    fn shape() -> Shape {
        Shape::record()
            .field::<String>("name", "")
            .field::<Leaf>("sub", "sub")
            .into()
    }
}

#[derive(Debug, Default, Clone, PartialEq, Serialize, Deserialize)]
struct Branches {
    tags: BTreeMap<String, Branch>,
}

impl Storable for Branches {
    fn shape() -> Shape {
        Shape::record()
            .field::<BTreeMap<String, Branch>>("tags", "tags/")
            .into()
    }
}

#[test]
fn test_dot_keys_cannot_escape_their_directory() {
    let temp_dir = TempDir::new().unwrap();
    let store = temp_dir.path().join("store");
    let codec = Codec::new();

    for key in [".", ".."] {
        let mut tags = BTreeMap::new();
        tags.insert(
            key.to_string(),
            Branch {
                name: "n".to_string(),
                sub: Leaf { v: "x".to_string() },
            },
        );

        let err = codec.save(&store, &Branches { tags }).unwrap_err();

        assert!(
            matches!(
                err.root_cause(),
                CodecError::InvalidSegment { segment, .. } if segment == key
            ),
            "{err}"
        );
        assert!(files(temp_dir.path()).is_empty());
    }
}

#[derive(Debug, Default, Clone, PartialEq, Serialize, Deserialize)]
struct Shadowing {
    name: String,
    under: String,
}

impl Storable for Shadowing {
    fn shape() -> Shape {
        Shape::record()
            .field::<String>("name", "")
            .field::<String>("under", "_")
            .into()
    }
}

#[test]
fn test_root_file_name_is_reserved_for_the_root_target() {
    let temp_dir = TempDir::new().unwrap();
    let codec = Codec::new();
    let value = Shadowing {
        name: "A".to_string(),
        under: "B".to_string(),
    };

    let targets = codec.write(&value).unwrap();
    assert_eq!(targets.paths().collect::<Vec<_>>(), vec!["", "_"]);

    let err = codec.save(temp_dir.path(), &value).unwrap_err();
    assert!(
        matches!(err.root_cause(), CodecError::InvalidSegment { segment, .. } if segment == "_"),
        "{err}"
    );
    assert_eq!(err.kind(), hy::ErrorKind::Write);
    assert!(files(temp_dir.path()).is_empty());

    let mut root_map = BTreeMap::new();
    root_map.insert("_".to_string(), Elem::new("shadow"));
    root_map.insert("other".to_string(), Elem::new("fine"));
    assert!(codec.save(temp_dir.path(), &root_map).is_err());
    assert!(files(temp_dir.path()).is_empty());

    // Below the top level the name is an ordinary segment.
    let mut tags = BTreeMap::new();
    tags.insert(
        "_".to_string(),
        Branch {
            name: "nested".to_string(),
            sub: Leaf::default(),
        },
    );
    let nested = Branches { tags };
    codec.save(temp_dir.path(), &nested).unwrap();
    assert_eq!(files(temp_dir.path()), vec!["_.json", "tags/_.json"]);
    let loaded: Branches = codec.load(temp_dir.path()).unwrap();
    assert_eq!(loaded, nested);

    // A different root file name frees `_`.
    let other_dir = TempDir::new().unwrap();
    let renamed = Codec::builder().root_file_name("index").build();
    renamed.save(other_dir.path(), &value).unwrap();
    let loaded: Shadowing = renamed.load(other_dir.path()).unwrap();
    assert_eq!(loaded, value);
}
