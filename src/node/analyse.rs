//! Type analysis
//!
//! Builds the node tree for a type from its [`Shape`] description. Nodes are
//! registered before their children are analysed, which is what lets recursive
//! types terminate.

use super::{
    AggregatedField, MapNode, NodeHandle, NodeId, NodeKind, NodeSet, RecordNode, SequenceNode,
};
use crate::error::{CodecError, Result, ResultExt};
use crate::field_info::FieldInfo;
use crate::shape::{MapShape, RecordShape, Shape, TypeRef};
use std::collections::HashMap;
use tracing::{debug, trace};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Position {
    Root,
    Field,
    Element,
}

/// The root ID `ty` analyses to
pub fn root_id(ty: TypeRef) -> Result<NodeId> {
    let (own, shape, indirect) = ty.resolve()?;
    if let Shape::Scalar = shape {
        return Err(CodecError::Unsupported {
            ty: ty.name().to_string(),
            reason: "cannot analyse scalar root".to_string(),
        });
    }
    Ok(NodeId::root(own, indirect))
}

/// Analyse `ty` as a root, reusing nodes already in `nodes`
///
/// On failure `nodes` is left exactly as it was before the call.
pub fn analyse_root(nodes: &mut NodeSet, ty: TypeRef) -> Result<NodeHandle> {
    let id = root_id(ty).context(|| format!("failed to analyse {ty}"))?;
    if let Some(handle) = nodes.lookup(&id) {
        return Ok(handle);
    }
    let checkpoint = nodes.checkpoint();
    let (_, shape, _) = ty.resolve()?;
    match new_node(nodes, None, id, None, shape, Position::Root) {
        Ok(handle) => {
            debug!(
                ty = ty.name(),
                new_nodes = nodes.len() - checkpoint,
                total_nodes = nodes.len(),
                "Analysed type"
            );
            Ok(handle)
        }
        Err(e) => {
            nodes.rollback(checkpoint);
            Err(e).context(|| format!("failed to analyse {ty}"))
        }
    }
}

fn new_node(
    nodes: &mut NodeSet,
    parent: Option<NodeHandle>,
    id: NodeId,
    field: Option<FieldInfo>,
    shape: Shape,
    position: Position,
) -> Result<NodeHandle> {
    let is_dir = field.as_ref().map_or(false, |f| f.is_dir);
    let (handle, is_new) = nodes.register(id.clone(), parent, field);
    if !is_new {
        trace!(node = %id, "Reusing node");
        return Ok(handle);
    }
    let zero = id
        .own_type
        .zero()
        .context(|| format!("computing zero value of {}", id.own_type))?;
    let as_directory = position == Position::Root || (position == Position::Field && is_dir);
    let kind = match shape {
        Shape::Record(record) => NodeKind::Record(analyse_record(nodes, handle, &id, record)?),
        Shape::Map(map) if as_directory => NodeKind::Map(analyse_map(nodes, handle, &id, map)?),
        Shape::Sequence(elem) if as_directory => {
            NodeKind::Sequence(analyse_sequence(nodes, handle, &id, elem)?)
        }
        _ => NodeKind::File,
    };
    trace!(node = %id, kind = kind.name(), "Analysed node");
    nodes.fill(handle, zero, kind)?;
    Ok(handle)
}

fn analyse_record(
    nodes: &mut NodeSet,
    handle: NodeHandle,
    id: &NodeId,
    record: RecordShape,
) -> Result<RecordNode> {
    let owner = id.own_type;
    let zero = owner
        .zero()
        .context(|| format!("computing zero value of {owner}"))?;
    let serialized = zero.as_object().ok_or_else(|| CodecError::Unsupported {
        ty: owner.name().to_string(),
        reason: "records must serialize as objects".to_string(),
    })?;

    let mut out = RecordNode::default();
    let mut path_names: HashMap<String, &'static str> = HashMap::new();
    for desc in &record.fields {
        let info = FieldInfo::new(owner, desc)?;
        if info.ignore {
            continue;
        }
        if !serialized.contains_key(desc.name) {
            return Err(CodecError::Unsupported {
                ty: owner.name().to_string(),
                reason: format!("field {:?} is missing from its serialized form", desc.name),
            });
        }
        let (own, shape, indirect) = desc
            .ty
            .resolve()
            .context(|| format!("analysing field {owner}.{}", desc.name))?;

        if info.is_aggregated {
            let zero = own
                .zero()
                .context(|| format!("computing zero value of {own}"))?;
            out.fields.push(AggregatedField { info, zero });
            continue;
        }

        if let Some(other) = path_names.insert(info.path_name.clone(), desc.name) {
            return Err(CodecError::DuplicatePathName {
                ty: owner.name().to_string(),
                path: info.path_name.clone(),
                first: other.to_string(),
                second: desc.name.to_string(),
            });
        }
        let child_id = NodeId::field(owner, own, indirect, desc.name);
        let child = new_node(nodes, Some(handle), child_id, Some(info), shape, Position::Field)
            .context(|| format!("analysing field {owner}.{}", desc.name))?;
        out.children.push(child);
    }
    Ok(out)
}

fn analyse_map(
    nodes: &mut NodeSet,
    handle: NodeHandle,
    id: &NodeId,
    map: MapShape,
) -> Result<MapNode> {
    let (key_type, key_shape, key_indirect) = map.key.resolve()?;
    if !matches!(key_shape, Shape::Scalar) || key_indirect {
        return Err(CodecError::Unsupported {
            ty: id.own_type.name().to_string(),
            reason: format!("map key {} must be a scalar", map.key),
        });
    }
    let elem = analyse_element(nodes, handle, id, map.elem)?;
    Ok(MapNode { key_type, elem })
}

fn analyse_sequence(
    nodes: &mut NodeSet,
    handle: NodeHandle,
    id: &NodeId,
    elem: TypeRef,
) -> Result<SequenceNode> {
    let elem = analyse_element(nodes, handle, id, elem)?;
    Ok(SequenceNode { elem })
}

fn analyse_element(
    nodes: &mut NodeSet,
    handle: NodeHandle,
    id: &NodeId,
    elem: TypeRef,
) -> Result<NodeHandle> {
    let (own, shape, indirect) = elem
        .resolve()
        .context(|| format!("analysing elements of {}", id.own_type))?;
    let elem_id = NodeId::element(id.own_type, own, indirect);
    new_node(nodes, Some(handle), elem_id, None, shape, Position::Element)
        .context(|| format!("analysing elements of {}", id.own_type))
}
