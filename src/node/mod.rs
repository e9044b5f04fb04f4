//! Storage Nodes
//!
//! An analysis turns a type description into a tree of nodes, each describing how
//! one part of a value is stored. Nodes live in a [`NodeSet`] arena and refer to
//! each other (parent, children, elements) by [`NodeHandle`].
//!
//! Every node answers the same questions regardless of kind: its identity, its
//! fixed path name if it has one, how it names a child that has none, and how it
//! writes and reads targets (see the `write` and `read` modules).

pub mod analyse;
pub mod id;
pub mod read;
pub mod set;
pub mod write;

pub use id::NodeId;
pub use set::NodeSet;

use crate::error::{CodecError, Result};
use crate::field_info::FieldInfo;
use crate::shape::TypeRef;
use crate::value::Key;
use serde_json::Value;
use std::fmt;

/// Stable index of a node inside its [`NodeSet`]
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct NodeHandle(pub(crate) usize);

impl NodeHandle {
    pub fn index(&self) -> usize {
        self.0
    }
}

impl fmt::Display for NodeHandle {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{}", self.0)
    }
}

/// A record field stored inline in its record's own file
#[derive(Debug, Clone)]
pub struct AggregatedField {
    pub info: FieldInfo,
    /// Zero value of the field's pointee type
    pub zero: Value,
}

#[derive(Debug, Clone, Default)]
pub struct RecordNode {
    /// Fields merged into the record's own payload
    pub fields: Vec<AggregatedField>,
    /// Fields with their own path, in declaration order
    pub children: Vec<NodeHandle>,
}

#[derive(Debug, Clone)]
pub struct MapNode {
    pub key_type: TypeRef,
    pub elem: NodeHandle,
}

#[derive(Debug, Clone)]
pub struct SequenceNode {
    pub elem: NodeHandle,
}

/// The closed set of node kinds
#[derive(Debug, Clone)]
pub enum NodeKind {
    /// Reserved during analysis, not yet populated
    Pending,
    /// Leaf stored whole in one file
    File,
    Record(RecordNode),
    Map(MapNode),
    Sequence(SequenceNode),
}

impl NodeKind {
    pub fn name(&self) -> &'static str {
        match self {
            NodeKind::Pending => "pending",
            NodeKind::File => "file",
            NodeKind::Record(_) => "record",
            NodeKind::Map(_) => "map",
            NodeKind::Sequence(_) => "sequence",
        }
    }
}

#[derive(Debug, Clone)]
pub struct Node {
    pub id: NodeId,
    /// Non-owning back reference; `None` only for roots
    pub parent: Option<NodeHandle>,
    /// Present when the node was reached through a record field
    pub field: Option<FieldInfo>,
    /// Zero value of the node's pointee type
    pub zero: Value,
    pub kind: NodeKind,
}

impl Node {
    pub fn id(&self) -> &NodeId {
        &self.id
    }

    /// The explicit or field-derived path name, if this node has one
    pub fn fixed_path_name(&self) -> Option<&str> {
        self.field
            .as_ref()
            .filter(|f| f.has_own_path())
            .map(|f| f.path_name.as_str())
    }

    /// How this node names a child that has no fixed path name
    pub fn child_path_name(
        &self,
        child: &Node,
        key: Option<&Key<'_>>,
        _value: &Value,
    ) -> Result<String> {
        match (&self.kind, key) {
            (NodeKind::Record(_), _) => child
                .fixed_path_name()
                .map(str::to_string)
                .ok_or_else(|| {
                    CodecError::Internal(format!(
                        "record child {} has no fixed path name",
                        child.id
                    ))
                }),
            (NodeKind::Map(_), Some(Key::Name(name))) => Ok(name.to_string()),
            (NodeKind::Sequence(_), Some(Key::Index(index))) => Ok(index.to_string()),
            _ => Err(CodecError::Internal(format!(
                "{} node {} cannot name child {} with key {:?}",
                self.kind.name(),
                self.id,
                child.id,
                key
            ))),
        }
    }

    /// This node's path segment: its fixed name, else whatever its parent
    /// calls it; the root yields the empty segment
    pub fn path_name(
        &self,
        nodes: &NodeSet,
        key: Option<&Key<'_>>,
        value: &Value,
    ) -> Result<String> {
        if let Some(name) = self.fixed_path_name() {
            return Ok(name.to_string());
        }
        match self.parent {
            None => Ok(String::new()),
            Some(parent) => nodes.node(parent)?.child_path_name(self, key, value),
        }
    }

    /// The value reconstructed when nothing is stored for this node
    pub fn absent_value(&self) -> Value {
        if self.id.is_indirect {
            Value::Null
        } else {
            self.zero.clone()
        }
    }
}
