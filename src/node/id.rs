//! Node identity

use crate::shape::TypeRef;
use std::fmt;

/// Identifies a node in an analysis
///
/// Two nodes with equal IDs are the same node. This is what makes recursive
/// type graphs terminate: reaching an ID a second time yields the node
/// registered the first time.
#[derive(Clone, PartialEq, Eq, Hash)]
pub struct NodeId {
    /// Type of the parent node; `None` for the root
    pub parent_type: Option<TypeRef>,
    /// Pointee type of this node
    pub own_type: TypeRef,
    /// The node's values are reached through an optional wrapper
    pub is_indirect: bool,
    /// Field of the parent record holding this node; empty unless the parent
    /// is a record
    pub field_name: String,
}

impl NodeId {
    pub fn root(own_type: TypeRef, is_indirect: bool) -> Self {
        Self {
            parent_type: None,
            own_type,
            is_indirect,
            field_name: String::new(),
        }
    }

    pub fn field(parent: TypeRef, own_type: TypeRef, is_indirect: bool, name: &str) -> Self {
        Self {
            parent_type: Some(parent),
            own_type,
            is_indirect,
            field_name: name.to_string(),
        }
    }

    pub fn element(parent: TypeRef, own_type: TypeRef, is_indirect: bool) -> Self {
        Self {
            parent_type: Some(parent),
            own_type,
            is_indirect,
            field_name: String::new(),
        }
    }
}

impl fmt::Display for NodeId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let star = if self.is_indirect { "*" } else { "" };
        match (&self.parent_type, self.field_name.is_empty()) {
            (None, _) => write!(f, "{star}{}", self.own_type),
            (Some(parent), true) => write!(f, "{parent}[]: {star}{}", self.own_type),
            (Some(parent), false) => {
                write!(f, "{parent}.{}: {star}{}", self.field_name, self.own_type)
            }
        }
    }
}

impl fmt::Debug for NodeId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "NodeId({self})")
    }
}
