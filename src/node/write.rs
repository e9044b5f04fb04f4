//! Projecting values onto file targets
//!
//! Each node kind writes the part of a value it describes at the context's
//! current path and hands its children a context pushed by their path names.
//! Duplicate paths are rejected by the shared accumulator.

use super::{MapNode, Node, NodeKind, NodeSet, RecordNode, SequenceNode};
use crate::context::WriteContext;
use crate::error::{CodecError, Result, ResultExt};
use crate::field_info::{FieldInfo, KeySource};
use crate::value::{is_zero, kind_of, set_key_field, validate_segment, Key, Val};
use serde_json::{Map, Value};
use std::borrow::Cow;
use tracing::trace;

impl Node {
    /// Emit targets for `val` below `ctx`
    pub fn write_targets(
        &self,
        nodes: &NodeSet,
        ctx: &WriteContext<'_>,
        val: Val<'_>,
    ) -> Result<()> {
        if !val.should_write(&self.zero) {
            trace!(path = ctx.path(), node = %self.id, "Skipping zero value");
            return Ok(());
        }
        match &self.kind {
            NodeKind::File => ctx.emit(val.value.clone()),
            NodeKind::Record(record) => self.write_record(record, nodes, ctx, val),
            NodeKind::Map(map) => self.write_map(map, nodes, ctx, val),
            NodeKind::Sequence(seq) => self.write_sequence(seq, nodes, ctx, val),
            NodeKind::Pending => Err(CodecError::Internal(format!(
                "node {} was never analysed",
                self.id
            ))),
        }
    }

    fn write_record(
        &self,
        record: &RecordNode,
        nodes: &NodeSet,
        ctx: &WriteContext<'_>,
        val: Val<'_>,
    ) -> Result<()> {
        // An absent element still occupies its key.
        if val.value.is_null() {
            return ctx.emit(Value::Null);
        }
        let object = self.expect_object(ctx.path(), val.value)?;

        let mut payload = Map::new();
        for field in &record.fields {
            let Some(value) = object.get(field.info.name) else {
                continue;
            };
            if field.info.omit_if_zero && is_zero(value, &field.zero) {
                continue;
            }
            payload.insert(field.info.name.to_string(), value.clone());
        }
        ctx.emit(Value::Object(payload))?;

        for &handle in &record.children {
            let child = nodes.node(handle)?;
            let info = child_field(child)?;
            let value = object.get(info.name).unwrap_or(&Value::Null);
            let name = child.path_name(nodes, None, value)?;
            let child_val = Val::new(value, None, child.id.is_indirect);
            child
                .write_targets(nodes, &ctx.push(&name), child_val)
                .context(|| format!("writing field {}.{}", self.id.own_type, info.name))?;
        }
        Ok(())
    }

    fn write_map(
        &self,
        map: &MapNode,
        nodes: &NodeSet,
        ctx: &WriteContext<'_>,
        val: Val<'_>,
    ) -> Result<()> {
        if val.value.is_null() {
            return Ok(());
        }
        let object = self.expect_object(ctx.path(), val.value)?;
        let elem = nodes.node(map.elem)?;

        for (key, value) in object {
            validate_segment(key).context(|| format!("writing map {:?}", ctx.path()))?;
            let value = self
                .apply_write_key(key, value)
                .context(|| format!("writing map key {key:?}"))?;
            let key = Key::Name(key);
            let name = elem.path_name(nodes, Some(&key), &value)?;
            let elem_val = Val::new(&value, Some(key), elem.id.is_indirect);
            elem.write_targets(nodes, &ctx.push(&name), elem_val)
                .context(|| format!("writing map key {key:?}"))?;
        }
        Ok(())
    }

    fn write_sequence(
        &self,
        seq: &SequenceNode,
        nodes: &NodeSet,
        ctx: &WriteContext<'_>,
        val: Val<'_>,
    ) -> Result<()> {
        let items = match val.value {
            Value::Null => return Ok(()),
            Value::Array(items) => items,
            other => {
                return Err(CodecError::UnexpectedValue {
                    path: ctx.path().to_string(),
                    expected: "array",
                    found: kind_of(other),
                })
            }
        };
        let elem = nodes.node(seq.elem)?;

        for (index, value) in items.iter().enumerate() {
            let key = Key::Index(index);
            let name = elem.path_name(nodes, Some(&key), value)?;
            let elem_val = Val::new(value, Some(key), elem.id.is_indirect);
            elem.write_targets(nodes, &ctx.push(&name), elem_val)
                .context(|| format!("writing index {index}"))?;
        }
        Ok(())
    }

    /// Reconcile an element with the key it is stored under
    fn apply_write_key<'v>(&self, key: &str, value: &'v Value) -> Result<Cow<'v, Value>> {
        let policy = self.field.as_ref().and_then(|f| f.key.as_ref());
        match policy {
            _ if value.is_null() => Ok(Cow::Borrowed(value)),
            None => Ok(Cow::Borrowed(value)),
            Some(KeySource::Field(field)) => {
                let mut value = value.clone();
                set_key_field(&mut value, field, key)?;
                Ok(Cow::Owned(value))
            }
            Some(KeySource::Getter { call, .. }) => {
                let found = call(value)?;
                if !found.is_empty() && found != key {
                    return Err(CodecError::KeyMismatch {
                        key: key.to_string(),
                        found,
                    });
                }
                Ok(Cow::Borrowed(value))
            }
        }
    }

    pub(crate) fn expect_object<'v>(
        &self,
        path: &str,
        value: &'v Value,
    ) -> Result<&'v Map<String, Value>> {
        value.as_object().ok_or_else(|| CodecError::UnexpectedValue {
            path: path.to_string(),
            expected: "object",
            found: kind_of(value),
        })
    }
}

pub(crate) fn child_field(child: &Node) -> Result<&FieldInfo> {
    child.field.as_ref().ok_or_else(|| {
        CodecError::Internal(format!("record child {} has no field", child.id))
    })
}
