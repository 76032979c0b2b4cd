// SPDX-License-Identifier: MIT OR Apache-2.0
//! Versioned binary graph format.
//!
//! Every supported version has a decoder producing the same [`RawGraph`];
//! the raw graph is then resolved against a [`NodeFactory`] into a
//! [`SurfaceContext`]. Saving always writes [`VERSION`].

mod legacy;
pub mod stream;
pub mod variant_io;

use crate::context::SurfaceContext;
use crate::element::{BoxDirection, BoxId, BoxRef, SurfaceBox};
use crate::factory::NodeFactory;
use crate::meta::{GraphMetadata, NodeMeta, SurfaceViewMeta, NODE_META_TYPE_ID, SURFACE_META_TYPE_ID};
use crate::node::{NodeId, SurfaceNode};
use crate::parameter::SurfaceParameter;
use crate::types::ScriptType;
use crate::variant::Variant;
use std::collections::HashSet;
use stream::{ReadStream, WriteStream};
use variant_io::{read_script_type, read_variant, write_script_type, write_variant};

/// Magic number opening every graph blob
pub const MAGIC: i32 = 1_963_542_358;
/// Format version written by [`save`]
pub const VERSION: u32 = 7000;
/// Byte closing every graph blob
pub const END_SENTINEL: u8 = b'\t';
/// XOR key of parameter names
pub const PARAMETER_NAME_KEY: i16 = 97;

/// Errors raised while encoding or decoding a graph
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum FormatError {
    /// Stream does not start with [`MAGIC`]
    #[error("Invalid magic number: {0:#010x}")]
    BadMagic(i32),

    /// No decoder for this version
    #[error("Unsupported graph format version {0}")]
    UnsupportedVersion(u32),

    /// Stream ended early
    #[error("Unexpected end of stream at offset {0}")]
    UnexpectedEof(usize),

    /// End sentinel missing or wrong
    #[error("Missing end sentinel at offset {0}")]
    MissingSentinel(usize),

    /// Unknown variant type tag
    #[error("Invalid variant type tag {0}")]
    InvalidVariantTag(u8),

    /// Unknown legacy type tag
    #[error("Invalid legacy type tag {0}")]
    InvalidLegacyTag(u8),

    /// String data is not valid text
    #[error("Invalid string data at offset {0}")]
    InvalidString(usize),

    /// Negative or oversized length
    #[error("Invalid length {len} at offset {offset}")]
    InvalidLength {
        /// Length read
        len: i64,
        /// Offset of the length field
        offset: usize,
    },

    /// Collection too large for its length field
    #[error("Too many items in {0} to encode")]
    TooLarge(&'static str),
}

/// Box record as stored in the stream
#[derive(Debug, Clone, PartialEq)]
pub struct RawBox {
    /// Box id
    pub id: u8,
    /// Declared type, kept for placeholders only
    pub declared_type: ScriptType,
    /// Connected `(node, box)` pairs
    pub connections: Vec<(u32, u8)>,
}

/// Node record as stored in the stream
#[derive(Debug, Clone, PartialEq)]
pub struct RawNode {
    /// Node id
    pub id: u32,
    /// Group id
    pub group_id: u16,
    /// Type id within the group
    pub type_id: u16,
    /// Stored values
    pub values: Vec<Variant>,
    /// Box records
    pub boxes: Vec<RawBox>,
    /// Node metadata
    pub meta: GraphMetadata,
}

/// Version-independent decoded graph, before type resolution
#[derive(Debug, Clone, Default, PartialEq)]
pub struct RawGraph {
    /// Nodes in stream order
    pub nodes: Vec<RawNode>,
    /// Parameters in stream order
    pub parameters: Vec<SurfaceParameter>,
    /// Graph metadata
    pub meta: GraphMetadata,
}

type Decoder = fn(&mut ReadStream<'_>, u32) -> Result<RawGraph, FormatError>;

struct VersionedDecoder {
    first: u32,
    last: u32,
    decode: Decoder,
}

static DECODERS: [VersionedDecoder; 3] = [
    VersionedDecoder {
        first: 1,
        last: 5999,
        decode: legacy::decode_v1,
    },
    VersionedDecoder {
        first: 6000,
        last: 6999,
        decode: legacy::decode_v6,
    },
    VersionedDecoder {
        first: VERSION,
        last: VERSION,
        decode: decode_current,
    },
];

/// Read the magic number and version of a blob
pub fn read_version(bytes: &[u8]) -> Result<u32, FormatError> {
    let mut r = ReadStream::new(bytes);
    read_header(&mut r)
}

fn read_header(r: &mut ReadStream<'_>) -> Result<u32, FormatError> {
    let magic = r.read_i32()?;
    if magic != MAGIC {
        return Err(FormatError::BadMagic(magic));
    }
    r.read_u32()
}

/// Decode a blob of any supported version without resolving node types
pub fn decode(bytes: &[u8]) -> Result<RawGraph, FormatError> {
    let mut r = ReadStream::new(bytes);
    let version = read_header(&mut r)?;
    let decoder = DECODERS
        .iter()
        .find(|d| (d.first..=d.last).contains(&version))
        .ok_or(FormatError::UnsupportedVersion(version))?;
    tracing::debug!("Decoding graph version {} ({} bytes)", version, bytes.len());
    (decoder.decode)(&mut r, version)
}

/// Decode a blob and build a context from it.
///
/// Fails atomically on format errors. Unknown node types, value count
/// drift and dangling connections are tolerated with a warning.
pub fn load(bytes: &[u8], factory: &NodeFactory) -> Result<SurfaceContext, FormatError> {
    let raw = decode(bytes)?;
    Ok(build_context(raw, factory))
}

pub(crate) fn read_metadata(r: &mut ReadStream<'_>) -> Result<GraphMetadata, FormatError> {
    let count = r.read_count(16)?;
    let mut meta = GraphMetadata::new();
    for _ in 0..count {
        let type_id = r.read_i32()?;
        let _reserved = r.read_i64()?;
        let len = r.read_u32()? as usize;
        let data = r.read_bytes(len)?.to_vec();
        meta.add_entry(type_id, data);
    }
    Ok(meta)
}

fn write_metadata(w: &mut WriteStream, meta: &GraphMetadata) -> Result<(), FormatError> {
    w.write_count(meta.len(), "metadata")?;
    for entry in meta.entries() {
        w.write_i32(entry.type_id);
        w.write_i64(0);
        let len = u32::try_from(entry.data.len()).map_err(|_| FormatError::TooLarge("metadata entry"))?;
        w.write_u32(len);
        w.write_bytes(&entry.data);
    }
    Ok(())
}

pub(crate) fn read_connections(r: &mut ReadStream<'_>) -> Result<Vec<(u32, u8)>, FormatError> {
    let count = r.read_u16()?;
    let mut connections = Vec::with_capacity(count.into());
    for _ in 0..count {
        let node = r.read_u32()?;
        let box_id = r.read_u8()?;
        connections.push((node, box_id));
    }
    Ok(connections)
}

pub(crate) fn read_end(r: &mut ReadStream<'_>) -> Result<(), FormatError> {
    let offset = r.position();
    match r.read_u8() {
        Ok(END_SENTINEL) => Ok(()),
        _ => Err(FormatError::MissingSentinel(offset)),
    }
}

fn decode_current(r: &mut ReadStream<'_>, _version: u32) -> Result<RawGraph, FormatError> {
    let node_count = r.read_count(8)?;
    let parameter_count = r.read_count(1)?;

    let mut nodes = Vec::with_capacity(node_count);
    for _ in 0..node_count {
        let id = r.read_u32()?;
        let type_id = r.read_u16()?;
        let group_id = r.read_u16()?;
        nodes.push(RawNode {
            id,
            group_id,
            type_id,
            values: Vec::new(),
            boxes: Vec::new(),
            meta: GraphMetadata::new(),
        });
    }

    let mut parameters = Vec::with_capacity(parameter_count);
    for _ in 0..parameter_count {
        let param_type = read_script_type(r)?;
        let id = r.read_guid()?;
        let name = r.read_string(PARAMETER_NAME_KEY)?;
        let is_public = r.read_bool()?;
        let value = read_variant(r)?;
        let meta = read_metadata(r)?;
        parameters.push(SurfaceParameter {
            id,
            name,
            param_type,
            is_public,
            value,
            meta,
        });
    }

    for node in &mut nodes {
        let value_count = r.read_count(5)?;
        node.values.reserve(value_count);
        for _ in 0..value_count {
            node.values.push(read_variant(r)?);
        }
        let box_count = r.read_u16()?;
        for _ in 0..box_count {
            let id = r.read_u8()?;
            let declared_type = read_script_type(r)?;
            let connections = read_connections(r)?;
            node.boxes.push(RawBox {
                id,
                declared_type,
                connections,
            });
        }
        node.meta = read_metadata(r)?;
    }

    let meta = read_metadata(r)?;
    read_end(r)?;
    Ok(RawGraph {
        nodes,
        parameters,
        meta,
    })
}

/// Encode a context as a current-version blob.
///
/// Encodes from a shared reference, so a failure leaves the graph untouched.
pub fn save(ctx: &SurfaceContext) -> Result<Vec<u8>, FormatError> {
    let mut w = WriteStream::new();
    w.write_i32(MAGIC);
    w.write_u32(VERSION);
    w.write_count(ctx.node_count(), "graph nodes")?;
    w.write_count(ctx.parameters().len(), "graph parameters")?;

    for node in ctx.nodes() {
        w.write_u32(node.id.0);
        w.write_u16(node.type_id());
        w.write_u16(node.group_id());
    }

    for param in ctx.parameters() {
        write_script_type(&mut w, &param.param_type)?;
        w.write_guid(&param.id);
        w.write_string(&param.name, PARAMETER_NAME_KEY)?;
        w.write_bool(param.is_public);
        write_variant(&mut w, &param.value)?;
        write_metadata(&mut w, &param.meta)?;
    }

    for node in ctx.nodes() {
        w.write_count(node.values().len(), "node values")?;
        for value in node.values() {
            write_variant(&mut w, value)?;
        }

        let boxes: Vec<&SurfaceBox> = node.boxes().collect();
        let box_count = u16::try_from(boxes.len()).map_err(|_| FormatError::TooLarge("node boxes"))?;
        w.write_u16(box_count);
        for b in boxes {
            w.write_u8(b.id.0);
            write_script_type(&mut w, &b.current_type)?;
            let count = u16::try_from(b.connections.len())
                .map_err(|_| FormatError::TooLarge("box connections"))?;
            w.write_u16(count);
            for c in &b.connections {
                w.write_u32(c.node.0);
                w.write_u8(c.box_id.0);
            }
        }

        let mut meta = node.meta.clone();
        let node_meta = NodeMeta {
            position: node.position,
            selected: false,
        };
        meta.add_entry(NODE_META_TYPE_ID, node_meta.to_bytes());
        write_metadata(&mut w, &meta)?;
    }

    let mut meta = ctx.meta.clone();
    meta.add_entry(SURFACE_META_TYPE_ID, ctx.view.to_bytes());
    write_metadata(&mut w, &meta)?;
    w.write_u8(END_SENTINEL);
    Ok(w.into_inner())
}

/// Reconcile stored values with the archetype defaults
fn salvage_values(node: &SurfaceNode, values: Vec<Variant>) -> Vec<Variant> {
    let archetype = node.archetype();
    let defaults = &archetype.default_values;
    if values.len() == defaults.len() || archetype.has_variable_values() {
        return values;
    }
    tracing::warn!(
        "Node {} ({}) has {} values but expects {}; keeping values of matching type",
        node.id,
        archetype.title,
        values.len(),
        defaults.len()
    );
    defaults
        .iter()
        .enumerate()
        .map(|(i, default)| match values.get(i) {
            Some(v) if v.same_type(default) => v.clone(),
            _ => default.clone(),
        })
        .collect()
}

/// Resolve a raw graph into a context
pub fn build_context(raw: RawGraph, factory: &NodeFactory) -> SurfaceContext {
    let mut ctx = SurfaceContext::new();
    for param in raw.parameters {
        ctx.push_parameter_raw(param);
    }
    if let Some(data) = raw.meta.get(SURFACE_META_TYPE_ID) {
        match SurfaceViewMeta::from_bytes(data) {
            Some(view) => ctx.view = view,
            None => tracing::warn!("Ignoring surface view metadata of {} bytes", data.len()),
        }
    }
    ctx.meta = raw.meta;

    // Nodes first: connections may reference nodes declared later
    let mut missing = HashSet::new();
    let mut records = Vec::with_capacity(raw.nodes.len());
    for rn in raw.nodes {
        let id = NodeId(rn.id);
        if ctx.contains_node(id) {
            tracing::warn!("Skipping duplicate node id {}", id);
            continue;
        }
        let mut node = match factory.find(rn.group_id, rn.type_id) {
            Some((group, archetype)) => {
                let mut node = SurfaceNode::new(id, archetype, group);
                let values = salvage_values(&node, rn.values);
                node.replace_values(values);
                node
            }
            None => {
                tracing::warn!(
                    "Missing node type {}:{} for node {}; keeping placeholder",
                    rn.group_id,
                    rn.type_id,
                    id
                );
                missing.insert(id);
                let boxes = rn
                    .boxes
                    .iter()
                    .map(|b| {
                        let mut sb = SurfaceBox::new(BoxId(b.id), BoxDirection::Input, b.declared_type.clone());
                        sb.single = false;
                        sb
                    })
                    .collect();
                SurfaceNode::missing(id, rn.group_id, rn.type_id, rn.values, boxes)
            }
        };
        if let Some(data) = rn.meta.get(NODE_META_TYPE_ID) {
            match NodeMeta::from_bytes(data) {
                Some(meta) => node.position = meta.position,
                None => tracing::warn!("Ignoring node {} metadata of {} bytes", id, data.len()),
            }
        }
        node.meta = rn.meta;
        ctx.insert_raw(node);
        records.push((id, rn.boxes));
    }

    // Each box list comes from its own record
    for (id, boxes) in &records {
        for rb in boxes {
            let from = BoxRef::new(*id, rb.id);
            if ctx.box_at(from).is_none() {
                tracing::warn!("Node {} has no box {}; dropping its connections", id, rb.id);
                continue;
            }
            for &(node, box_id) in &rb.connections {
                let to = BoxRef::new(NodeId(node), box_id);
                if !resolve_link(&mut ctx, &missing, from, to) {
                    continue;
                }
                if let Some(b) = ctx.box_at_mut(from) {
                    if !b.connections.contains(&to) {
                        b.connections.push(to);
                    }
                }
            }
        }
    }

    repair_symmetry(&mut ctx);

    ctx.update_all_boxes_types();
    ctx.take_events();
    ctx.clear_modified();
    ctx
}

/// Validate one stored connection, fixing placeholder box directions
fn resolve_link(ctx: &mut SurfaceContext, missing: &HashSet<NodeId>, from: BoxRef, to: BoxRef) -> bool {
    if from.node == to.node {
        tracing::warn!("Dropping self connection {} -> {}", from, to);
        return false;
    }
    let Some(to_dir) = ctx.box_at(to).map(|b| b.direction) else {
        if ctx.contains_node(to.node) {
            tracing::warn!("Dropping connection {} -> {}: box not found", from, to);
        } else {
            tracing::warn!("Dropping connection {} -> {}: node not found", from, to);
        }
        return false;
    };
    let Some(from_dir) = ctx.box_at(from).map(|b| b.direction) else {
        return false;
    };

    match (missing.contains(&from.node), missing.contains(&to.node)) {
        (true, false) => set_box_direction(ctx, from, to_dir.opposite()),
        (false, true) => set_box_direction(ctx, to, from_dir.opposite()),
        (true, true) => {}
        (false, false) if from_dir == to_dir => {
            tracing::warn!("Dropping connection {} -> {}: same direction", from, to);
            return false;
        }
        (false, false) => {}
    }
    true
}

fn set_box_direction(ctx: &mut SurfaceContext, at: BoxRef, direction: BoxDirection) {
    if let Some(node) = ctx.find_node_mut(at.node) {
        node.set_box_direction(at.box_id, direction);
    }
}

fn repair_symmetry(ctx: &mut SurfaceContext) {
    let mut one_sided = Vec::new();
    for node in ctx.nodes() {
        for b in node.boxes() {
            let here = BoxRef {
                node: node.id,
                box_id: b.id,
            };
            for &peer in &b.connections {
                if !ctx.are_connected(peer, here) {
                    one_sided.push((here, peer));
                }
            }
        }
    }
    for (here, peer) in one_sided {
        tracing::warn!("Repairing one-sided connection {} -> {}", here, peer);
        ctx.link(here, peer);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::archetype::{ElementArchetype, GroupArchetype, NodeArchetype};
    use crate::archetypes::{constants, math, tools, CONSTANTS_GROUP_ID, MATH_GROUP_ID, TOOLS_GROUP_ID};
    use crate::types::VariantKind;

    const CUSTOM_GROUP_ID: u16 = 200;

    fn custom_group() -> GroupArchetype {
        GroupArchetype::new(CUSTOM_GROUP_ID, "Custom", [10, 20, 30]).with(
            NodeArchetype::new(1, "Custom Blend", [160.0, 80.0])
                .with_values(vec![Variant::Blob(vec![9, 8, 7]), Variant::from("mode")])
                .with_elements(vec![
                    ElementArchetype::input(0.0, "A", true, ScriptType::FLOAT, 0),
                    ElementArchetype::output(0.0, "Out", ScriptType::FLOAT3, 1),
                ]),
        )
    }

    fn sample(factory: &NodeFactory) -> SurfaceContext {
        let mut ctx = SurfaceContext::new();
        let c = ctx.spawn_node(factory, CONSTANTS_GROUP_ID, constants::FLOAT, [10.0, 20.0]).unwrap();
        let custom = ctx.spawn_node(factory, CUSTOM_GROUP_ID, 1, [200.0, 20.0]).unwrap();
        let add = ctx.spawn_node(factory, MATH_GROUP_ID, math::ADD, [400.0, 40.0]).unwrap();
        ctx.set_node_value(c, 0, Variant::Float(4.5)).unwrap();
        ctx.connect(BoxRef::new(c, 0), BoxRef::new(custom, 0)).unwrap();
        ctx.connect(BoxRef::new(custom, 1), BoxRef::new(add, 0)).unwrap();
        ctx.connect(BoxRef::new(c, 0), BoxRef::new(add, 1)).unwrap();
        ctx.add_parameter(
            SurfaceParameter::new("Tint", ScriptType::COLOR).with_value(Variant::Color([1.0, 0.5, 0.25, 1.0])),
        )
        .unwrap();
        ctx.view = SurfaceViewMeta {
            view_center: [50.0, -25.0],
            scale: 0.5,
        };
        ctx
    }

    fn factory_with_custom() -> NodeFactory {
        let mut factory = NodeFactory::with_builtin();
        factory.register_group(custom_group());
        factory
    }

    fn topology(ctx: &SurfaceContext) -> Vec<(u32, u8, u32, u8)> {
        let mut out: Vec<_> = ctx
            .connections()
            .iter()
            .map(|c| (c.output.node.0, c.output.box_id.0, c.input.node.0, c.input.box_id.0))
            .collect();
        out.sort_unstable();
        out
    }

    #[test]
    fn test_round_trip() {
        let factory = factory_with_custom();
        let ctx = sample(&factory);
        let bytes = save(&ctx).unwrap();
        assert_eq!(read_version(&bytes).unwrap(), VERSION);

        let loaded = load(&bytes, &factory).unwrap();
        assert_eq!(loaded.node_count(), ctx.node_count());
        for node in ctx.nodes() {
            let other = loaded.find_node(node.id).unwrap();
            assert_eq!(other.group_id(), node.group_id());
            assert_eq!(other.type_id(), node.type_id());
            assert_eq!(other.values(), node.values());
            assert_eq!(other.position, node.position);
        }
        assert_eq!(topology(&loaded), topology(&ctx));
        assert_eq!(loaded.parameters(), ctx.parameters());
        assert_eq!(loaded.view, ctx.view);
        assert!(!loaded.is_edited());

        // Saving the loaded graph is stable
        assert_eq!(save(&loaded).unwrap(), bytes);
    }

    #[test]
    fn test_missing_type_placeholder_is_byte_identical() {
        let ctx = sample(&factory_with_custom());
        let original = save(&ctx).unwrap();

        let factory = NodeFactory::with_builtin();
        let loaded = load(&original, &factory).unwrap();
        let placeholder = loaded.find_node(NodeId(2)).unwrap();
        assert!(placeholder.is_missing());
        assert_eq!(placeholder.group_id(), CUSTOM_GROUP_ID);
        assert_eq!(placeholder.values()[0], Variant::Blob(vec![9, 8, 7]));
        assert!(placeholder.get_box(BoxId(1)).unwrap().is_output());

        assert_eq!(save(&loaded).unwrap(), original);
    }

    #[test]
    fn test_value_count_drift_is_salvaged() {
        let factory = NodeFactory::with_builtin();
        let mut raw = decode(&save(&sample(&factory_with_custom())).unwrap()).unwrap();
        let constant = raw.nodes.iter_mut().find(|n| n.id == 1).unwrap();
        constant.values.push(Variant::Int(3));
        let ctx = build_context(raw, &factory);
        assert_eq!(ctx.find_node(NodeId(1)).unwrap().values(), &[Variant::Float(4.5)]);
    }

    #[test]
    fn test_dangling_and_one_sided_connections() {
        let factory = factory_with_custom();
        let mut raw = decode(&save(&sample(&factory)).unwrap()).unwrap();
        // The add node's second input links to an unknown node and to the
        // constant, whose own record no longer lists the add node
        let add = raw.nodes.iter_mut().find(|n| n.id == 3).unwrap();
        add.boxes[1].connections = vec![(99, 0), (1, 0)];
        let constant = raw.nodes.iter_mut().find(|n| n.id == 1).unwrap();
        constant.boxes[0].connections.retain(|&(node, _)| node != 3);

        let ctx = build_context(raw, &factory);
        let input = ctx.box_at(BoxRef::new(NodeId(3), 1)).unwrap();
        assert_eq!(input.connections, vec![BoxRef::new(NodeId(1), 0)]);
        assert!(ctx.are_connected(BoxRef::new(NodeId(1), 0), BoxRef::new(NodeId(3), 1)));
    }

    #[test]
    fn test_format_errors() {
        let factory = NodeFactory::with_builtin();
        let bytes = save(&sample(&factory_with_custom())).unwrap();

        let mut bad_magic = bytes.clone();
        bad_magic[0] ^= 0xFF;
        assert!(matches!(load(&bad_magic, &factory), Err(FormatError::BadMagic(_))));

        let mut bad_version = bytes.clone();
        bad_version[4..8].copy_from_slice(&9000u32.to_le_bytes());
        assert_eq!(load(&bad_version, &factory).unwrap_err(), FormatError::UnsupportedVersion(9000));

        let truncated = &bytes[..bytes.len() - 1];
        assert!(matches!(load(truncated, &factory), Err(FormatError::MissingSentinel(_))));

        let cut = &bytes[..bytes.len() / 2];
        assert!(load(cut, &factory).is_err());

        let mut no_sentinel = bytes.clone();
        let last = no_sentinel.len() - 1;
        no_sentinel[last] = 0;
        assert!(matches!(load(&no_sentinel, &factory), Err(FormatError::MissingSentinel(_))));
    }

    #[test]
    fn test_feedback_loop_round_trips() {
        let factory = NodeFactory::with_builtin();
        let mut ctx = SurfaceContext::new();
        let a = ctx.spawn_node(&factory, TOOLS_GROUP_ID, tools::REROUTE, [0.0, 0.0]).unwrap();
        let b = ctx.spawn_node(&factory, TOOLS_GROUP_ID, tools::REROUTE, [100.0, 0.0]).unwrap();
        let c = ctx.spawn_node(&factory, CONSTANTS_GROUP_ID, constants::FLOAT, [0.0, 0.0]).unwrap();
        let add = ctx.spawn_node(&factory, MATH_GROUP_ID, math::ADD, [0.0, 0.0]).unwrap();
        ctx.connect(BoxRef::new(c, 0), BoxRef::new(add, 0)).unwrap();
        ctx.connect(BoxRef::new(add, 2), BoxRef::new(a, 0)).unwrap();
        ctx.connect(BoxRef::new(a, 1), BoxRef::new(b, 0)).unwrap();
        ctx.connect(BoxRef::new(b, 1), BoxRef::new(add, 1)).unwrap();

        let bytes = save(&ctx).unwrap();
        let loaded = load(&bytes, &factory).unwrap();
        assert_eq!(topology(&loaded), topology(&ctx));
        assert!(loaded.has_cycle());
        assert_eq!(save(&loaded).unwrap(), bytes);
        assert_eq!(
            loaded.box_at(BoxRef::new(b, 1)).unwrap().current_type.kind,
            VariantKind::Float
        );
    }
}
