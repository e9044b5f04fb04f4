//! Integration tests for type analysis through the codec

use super::test_utils::{Doc, Kitchen, Tagged, Tree};
use hy::{Codec, CodecError, ErrorKind, Shape, Storable, TagError};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;

#[test]
fn test_recursive_type_analysis_terminates() {
    let codec = Codec::new();
    let root = codec.analyse::<Tree>().unwrap();

    let nodes = codec.nodes();
    assert_eq!(nodes.len(), 4);
    let kinds: Vec<&str> = nodes.iter().map(|(_, node)| node.kind.name()).collect();
    assert_eq!(kinds, vec!["record", "record", "sequence", "record"]);
    assert!(nodes.node(root).unwrap().parent.is_none());
}

#[test]
fn test_types_share_nodes_for_shared_fields() {
    let codec = Codec::new();
    codec.analyse::<Doc>().unwrap();
    let after_doc = codec.node_count();
    codec.analyse::<Doc>().unwrap();
    assert_eq!(codec.node_count(), after_doc);

    codec.analyse::<Tagged>().unwrap();
    assert!(codec.node_count() > after_doc);
}

#[test]
fn test_every_field_kind_is_classified() {
    let codec = Codec::new();
    let root = codec.analyse::<Kitchen>().unwrap();
    let nodes = codec.nodes();
    let hy::node::NodeKind::Record(record) = &nodes.node(root).unwrap().kind else {
        panic!("expected a record root");
    };

    let aggregated: Vec<&str> = record.fields.iter().map(|f| f.info.name).collect();
    assert_eq!(aggregated, vec!["title", "count"]);

    let children: Vec<(&str, &str)> = record
        .children
        .iter()
        .map(|&handle| {
            let child = nodes.node(handle).unwrap();
            (child.field.as_ref().unwrap().name, child.kind.name())
        })
        .collect();
    assert_eq!(
        children,
        vec![
            ("info", "record"),
            ("maybe", "record"),
            ("notes", "file"),
            ("attrs", "map"),
            ("scores", "map"),
            ("slots", "sequence"),
        ]
    );
}

#[test]
fn test_scalar_root_is_rejected() {
    let codec = Codec::new();
    let err = codec.analyse::<String>().unwrap_err();
    assert_eq!(err.kind(), ErrorKind::Schema);
    assert!(matches!(err.root_cause(), CodecError::Unsupported { .. }), "{err}");
    assert_eq!(codec.node_count(), 0);
}

#[test]
fn test_pointer_to_pointer_is_rejected() {
    #[derive(Debug, Default, Serialize, Deserialize)]
    struct Nested {
        inner: Option<Box<Option<String>>>,
    }

    impl Storable for Nested {
        fn shape() -> Shape {
            Shape::record()
                .field::<Option<Box<Option<String>>>>("inner", ".")
                .into()
        }
    }

    let codec = Codec::new();
    let err = codec.analyse::<Nested>().unwrap_err();
    assert!(err.to_string().contains("pointer to pointer"), "{err}");
    assert_eq!(codec.node_count(), 0);
}

#[test]
fn test_malformed_tag_names_the_field() {
    #[derive(Debug, Default, Serialize, Deserialize)]
    struct BadTag {
        name: String,
        items: Vec<String>,
    }

    impl Storable for BadTag {
        fn shape() -> Shape {
            Shape::record()
                .field::<String>("name", "")
                .field::<Vec<String>>("items", "/items")
                .into()
        }
    }

    let codec = Codec::new();
    let err = codec.analyse::<BadTag>().unwrap_err();
    match err.root_cause() {
        CodecError::Tag { field, source, .. } => {
            assert_eq!(field, "items");
            assert_eq!(source, &TagError::LeadingSeparator("/items".to_string()));
        }
        other => panic!("expected tag error, got {other}"),
    }
    assert!(err.to_string().contains("BadTag"), "{err}");
}

#[test]
fn test_map_keys_must_be_scalar() {
    #[derive(Debug, Default, Serialize, Deserialize)]
    struct BadKeys {
        lookup: HashMap<Option<String>, String>,
    }

    impl Storable for BadKeys {
        fn shape() -> Shape {
            Shape::record()
                .field::<HashMap<Option<String>, String>>("lookup", "lookup/")
                .into()
        }
    }

    let codec = Codec::new();
    let err = codec.analyse::<BadKeys>().unwrap_err();
    assert_eq!(err.kind(), ErrorKind::Schema);
    assert_eq!(codec.node_count(), 0);
}

#[test]
fn test_failed_analysis_does_not_disturb_cached_nodes() {
    #[derive(Debug, Default, Serialize, Deserialize)]
    struct Broken {
        docs: HashMap<String, Doc>,
    }

    impl Storable for Broken {
        fn shape() -> Shape {
            Shape::record()
                .field::<HashMap<String, Doc>>("docs", "docs/,missing")
                .into()
        }
    }

    let codec = Codec::new();
    codec.analyse::<Doc>().unwrap();
    let before = codec.node_count();

    let err = codec.analyse::<Broken>().unwrap_err();
    assert!(matches!(err.root_cause(), CodecError::UnresolvedKey { .. }), "{err}");
    assert_eq!(codec.node_count(), before);

    let again = codec.analyse::<Broken>().unwrap_err();
    assert_eq!(again.to_string(), err.to_string());
}
