//! Node registry
//!
//! The single owner of every node produced by a codec's analyses. Registration
//! reserves a placeholder before a node's contents are analysed, so reaching the
//! same [`NodeId`] again (a recursive type) returns the in-progress node instead
//! of recursing forever.

use super::{Node, NodeHandle, NodeId, NodeKind};
use crate::error::{CodecError, Result};
use crate::field_info::FieldInfo;
use serde_json::Value;
use std::collections::HashMap;

#[derive(Debug, Default)]
pub struct NodeSet {
    nodes: Vec<Node>,
    index: HashMap<NodeId, NodeHandle>,
}

impl NodeSet {
    pub fn new() -> Self {
        Self::default()
    }

    /// Reserve a node for `id`
    ///
    /// Returns the handle and `true` if the ID was unseen. For a seen ID the
    /// existing handle is returned with `false` and nothing changes.
    pub fn register(
        &mut self,
        id: NodeId,
        parent: Option<NodeHandle>,
        field: Option<FieldInfo>,
    ) -> (NodeHandle, bool) {
        if let Some(handle) = self.index.get(&id) {
            return (*handle, false);
        }
        let handle = NodeHandle(self.nodes.len());
        self.index.insert(id.clone(), handle);
        self.nodes.push(Node {
            id,
            parent,
            field,
            zero: Value::Null,
            kind: NodeKind::Pending,
        });
        (handle, true)
    }

    /// Populate a reserved node
    pub fn fill(&mut self, handle: NodeHandle, zero: Value, kind: NodeKind) -> Result<()> {
        let node = self
            .nodes
            .get_mut(handle.0)
            .ok_or_else(|| CodecError::Internal(format!("no node {handle}")))?;
        if !matches!(node.kind, NodeKind::Pending) {
            return Err(CodecError::Internal(format!(
                "node {} ({handle}) populated twice",
                node.id
            )));
        }
        node.zero = zero;
        node.kind = kind;
        Ok(())
    }

    pub fn get(&self, handle: NodeHandle) -> Option<&Node> {
        self.nodes.get(handle.0)
    }

    pub fn node(&self, handle: NodeHandle) -> Result<&Node> {
        self.get(handle)
            .ok_or_else(|| CodecError::Internal(format!("no node {handle}")))
    }

    pub fn lookup(&self, id: &NodeId) -> Option<NodeHandle> {
        self.index.get(id).copied()
    }

    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = (NodeHandle, &Node)> {
        self.nodes
            .iter()
            .enumerate()
            .map(|(i, node)| (NodeHandle(i), node))
    }

    pub(crate) fn checkpoint(&self) -> usize {
        self.nodes.len()
    }

    /// Drop every node registered after `checkpoint`
    pub(crate) fn rollback(&mut self, checkpoint: usize) {
        self.nodes.truncate(checkpoint);
        self.index.retain(|_, handle| handle.0 < checkpoint);
    }
}
