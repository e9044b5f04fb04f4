//! Reconstructing values from a read index
//!
//! Reading mirrors writing: each node kind rebuilds the part of the value it
//! describes from the payload at the context's path and from the subtrees
//! below it. Anything not stored reads back as its zero value.

use super::write::child_field;
use super::{MapNode, Node, NodeKind, NodeSet, RecordNode, SequenceNode};
use crate::context::ReadContext;
use crate::error::{CodecError, Result, ResultExt};
use crate::field_info::KeySource;
use crate::value::{kind_of, set_key_field};
use serde_json::{Map, Value};
use std::collections::BTreeMap;
use tracing::trace;

impl Node {
    /// Rebuild the value stored below `ctx`
    pub fn read_targets(&self, nodes: &NodeSet, ctx: &ReadContext<'_>) -> Result<Value> {
        match &self.kind {
            NodeKind::File => Ok(ctx.read_payload()?.unwrap_or_else(|| self.absent_value())),
            NodeKind::Record(record) => self.read_record(record, nodes, ctx),
            NodeKind::Map(map) => self.read_map(map, nodes, ctx),
            NodeKind::Sequence(seq) => self.read_sequence(seq, nodes, ctx),
            NodeKind::Pending => Err(CodecError::Internal(format!(
                "node {} was never analysed",
                self.id
            ))),
        }
    }

    fn read_record(
        &self,
        record: &RecordNode,
        nodes: &NodeSet,
        ctx: &ReadContext<'_>,
    ) -> Result<Value> {
        let payload = ctx.read_payload()?;
        if self.id.is_indirect {
            match payload {
                Some(Value::Null) => return Ok(Value::Null),
                None if !ctx.has_subtree() => return Ok(Value::Null),
                _ => {}
            }
        }

        let mut object = match &self.zero {
            Value::Object(zero) => zero.clone(),
            other => {
                return Err(CodecError::Internal(format!(
                    "record {} has zero value of kind {}",
                    self.id,
                    kind_of(other)
                )))
            }
        };

        match payload {
            None | Some(Value::Null) => {}
            Some(Value::Object(mut stored)) => {
                for field in &record.fields {
                    if let Some(value) = stored.remove(field.info.name) {
                        object.insert(field.info.name.to_string(), value);
                    }
                }
            }
            Some(other) => {
                return Err(CodecError::UnexpectedValue {
                    path: ctx.path().to_string(),
                    expected: "object",
                    found: kind_of(&other),
                })
            }
        }

        for &handle in &record.children {
            let child = nodes.node(handle)?;
            let info = child_field(child)?;
            let name = child.path_name(nodes, None, &Value::Null)?;
            let child_ctx = ctx.push(&name);
            if !child_ctx.has_subtree() {
                trace!(path = child_ctx.path(), "Nothing stored for field");
                continue;
            }
            let value = child
                .read_targets(nodes, &child_ctx)
                .context(|| format!("reading field {}.{}", self.id.own_type, info.name))?;
            object.insert(info.name.to_string(), value);
        }
        Ok(Value::Object(object))
    }

    fn read_map(
        &self,
        map: &MapNode,
        nodes: &NodeSet,
        ctx: &ReadContext<'_>,
    ) -> Result<Value> {
        if self.id.is_indirect && !ctx.has_subtree() {
            return Ok(Value::Null);
        }
        let elem = nodes.node(map.elem)?;
        let mut out = Map::new();
        for key in ctx.children() {
            let mut value = elem
                .read_targets(nodes, &ctx.push(&key))
                .context(|| format!("reading map key {key:?}"))?;
            self.apply_read_key(&key, &mut value)
                .context(|| format!("reading map key {key:?}"))?;
            out.insert(key, value);
        }
        Ok(Value::Object(out))
    }

    fn read_sequence(
        &self,
        seq: &SequenceNode,
        nodes: &NodeSet,
        ctx: &ReadContext<'_>,
    ) -> Result<Value> {
        if self.id.is_indirect && !ctx.has_subtree() {
            return Ok(Value::Null);
        }
        let mut positions = BTreeMap::new();
        for name in ctx.children() {
            let index = name
                .parse::<usize>()
                .ok()
                .filter(|index| index.to_string() == name)
                .ok_or_else(|| CodecError::InvalidIndex {
                    path: ctx.path().to_string(),
                    name: name.clone(),
                })?;
            positions.insert(index, name);
        }

        let elem = nodes.node(seq.elem)?;
        let mut items = Vec::with_capacity(positions.len());
        for (expected, (index, name)) in positions.into_iter().enumerate() {
            if index != expected {
                return Err(CodecError::MissingIndex {
                    path: ctx.path().to_string(),
                    index: expected,
                });
            }
            let value = elem
                .read_targets(nodes, &ctx.push(&name))
                .context(|| format!("reading index {index}"))?;
            items.push(value);
        }
        Ok(Value::Array(items))
    }

    /// Push the key an element was stored under back into it
    fn apply_read_key(&self, key: &str, value: &mut Value) -> Result<()> {
        let Some(field) = self.field.as_ref() else {
            return Ok(());
        };
        if value.is_null() {
            return Ok(());
        }
        if let Some(KeySource::Field(name)) = &field.key {
            set_key_field(value, name, key)?;
        }
        if let Some(setter) = &field.key_setter {
            (setter.call)(value, key)?;
        }
        Ok(())
    }
}
