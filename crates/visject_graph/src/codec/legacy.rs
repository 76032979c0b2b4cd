// SPDX-License-Identifier: MIT OR Apache-2.0
//! Decoders for the pre-7000 formats.
//!
//! Both legacy layouts store values as fixed-width "common values" and box
//! types as a legacy connection mask. They are mapped onto the current
//! type system here and produce the same [`RawGraph`] as the current
//! decoder.

use super::stream::ReadStream;
use super::variant_io::read_transform;
use super::{read_connections, read_end, read_metadata, FormatError, RawBox, RawGraph, RawNode, PARAMETER_NAME_KEY};
use crate::archetype::split_node_key;
use crate::meta::GraphMetadata;
use crate::parameter::SurfaceParameter;
use crate::types::{ScriptType, VariantKind};
use crate::variant::Variant;

/// XOR key of legacy string values
const LEGACY_STRING_KEY: i16 = 953;

/// Versions 1..=5999
pub(super) fn decode_v1(r: &mut ReadStream<'_>, version: u32) -> Result<RawGraph, FormatError> {
    let time_saved = r.read_i64()?;
    tracing::debug!("Legacy graph v{} saved at {}", version, time_saved);
    decode_legacy(r, true)
}

/// Versions 6000..=6999
pub(super) fn decode_v6(r: &mut ReadStream<'_>, _version: u32) -> Result<RawGraph, FormatError> {
    decode_legacy(r, false)
}

fn decode_legacy(r: &mut ReadStream<'_>, extended_parameters: bool) -> Result<RawGraph, FormatError> {
    let node_count = r.read_count(8)?;
    let parameter_count = r.read_count(1)?;

    let mut nodes = Vec::with_capacity(node_count);
    for _ in 0..node_count {
        let id = r.read_u32()?;
        let (group_id, type_id) = split_node_key(r.read_u32()?);
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
        let param_type = parameter_type(r.read_u8()?)?;
        let id = r.read_guid()?;
        let name = r.read_string(PARAMETER_NAME_KEY)?;
        let is_public = r.read_bool()?;
        if extended_parameters {
            let _is_static = r.read_bool()?;
            let _is_ui_visible = r.read_bool()?;
            let _is_ui_editable = r.read_bool()?;
            let refs = r.read_count(4)?;
            r.read_bytes(refs * 4)?;
        }
        let value = parameter_value(&param_type, read_common_value(r)?);
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
        let value_count = r.read_count(1)?;
        node.values.reserve(value_count);
        for _ in 0..value_count {
            node.values.push(read_common_value(r)?);
        }
        let box_count = r.read_u16()?;
        for _ in 0..box_count {
            let id = r.read_u8()?;
            let declared_type = connection_type(r.read_u32()?);
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

/// Read a fixed-width legacy value
fn read_common_value(r: &mut ReadStream<'_>) -> Result<Variant, FormatError> {
    let tag = r.read_u8()?;
    Ok(match tag {
        0 => Variant::Bool(r.read_bool()?),
        1 => Variant::Int(r.read_i32()?),
        2 => Variant::Float(r.read_f32()?),
        3 => Variant::Float2(r.read_f32s()?),
        4 => Variant::Float3(r.read_f32s()?),
        5 => Variant::Float4(r.read_f32s()?),
        6 => Variant::Color(r.read_f32s()?),
        7 => Variant::Guid(r.read_guid()?),
        8 => Variant::String(r.read_string(LEGACY_STRING_KEY)?),
        9 => Variant::BoundingBox {
            min: r.read_f32s()?,
            max: r.read_f32s()?,
        },
        10 => Variant::Quaternion(r.read_f32s()?),
        11 => Variant::Transform(read_transform(r)?),
        12 => Variant::BoundingSphere {
            center: r.read_f32s()?,
            radius: r.read_f32()?,
        },
        13 => Variant::Rectangle {
            location: r.read_f32s()?,
            size: r.read_f32s()?,
        },
        14 => Variant::Pointer(r.read_u64()?),
        15 => Variant::Matrix(r.read_f32s()?),
        16 => Variant::Blob(r.read_blob()?),
        17 => Variant::Object {
            type_name: None,
            id: r.read_guid()?,
        },
        18 => Variant::Ray {
            position: r.read_f32s()?,
            direction: r.read_f32s()?,
        },
        _ => return Err(FormatError::InvalidLegacyTag(tag)),
    })
}

/// Map a legacy parameter type tag
fn parameter_type(tag: u8) -> Result<ScriptType, FormatError> {
    use VariantKind as K;
    Ok(match tag {
        0 => ScriptType::BOOL,
        1 => ScriptType::INT,
        2 => ScriptType::FLOAT,
        3 => ScriptType::FLOAT2,
        4 => ScriptType::FLOAT3,
        5 => ScriptType::FLOAT4,
        6 => ScriptType::COLOR,
        7 | 8 => ScriptType::named(K::Asset, "FlaxEngine.Texture"),
        9 => ScriptType::STRING,
        10 => ScriptType::of(K::BoundingBox),
        11 => ScriptType::of(K::Quaternion),
        12 => ScriptType::of(K::Transform),
        13 => ScriptType::named(K::Asset, "FlaxEngine.Asset"),
        14 => ScriptType::named(K::Object, "FlaxEngine.Actor"),
        15 => ScriptType::of(K::Rectangle),
        16 => ScriptType::named(K::Asset, "FlaxEngine.CubeTexture"),
        17 => ScriptType::named(K::Enum, "FlaxEngine.MaterialSceneTextures"),
        18 | 20 | 21 | 22 => ScriptType::named(K::Object, "FlaxEngine.GPUTexture"),
        19 => ScriptType::of(K::Matrix),
        23 => ScriptType::named(K::Enum, "FlaxEngine.ChannelMask"),
        _ => return Err(FormatError::InvalidLegacyTag(tag)),
    })
}

/// Re-type a legacy parameter value to its mapped parameter type
fn parameter_value(ty: &ScriptType, value: Variant) -> Variant {
    let type_name = ty.type_name.clone();
    if let Some(id) = value.as_guid() {
        match ty.kind {
            VariantKind::Asset => return Variant::Asset { type_name, id },
            VariantKind::Object => return Variant::Object { type_name, id },
            _ => {}
        }
    }
    match (ty.kind, value) {
        (VariantKind::Enum, Variant::Int(v)) => Variant::Enum {
            type_name,
            value: v as u64,
        },
        (_, value) => value,
    }
}

/// Map a legacy connection type mask; combined masks become untyped
fn connection_type(mask: u32) -> ScriptType {
    use VariantKind as K;
    match mask {
        1 | 4096 => ScriptType::VOID,
        2 => ScriptType::BOOL,
        4 => ScriptType::INT,
        8 => ScriptType::FLOAT,
        16 => ScriptType::FLOAT2,
        32 => ScriptType::FLOAT3,
        64 => ScriptType::FLOAT4,
        128 => ScriptType::STRING,
        256 => ScriptType::OBJECT,
        512 => ScriptType::of(K::Quaternion),
        1024 => ScriptType::of(K::Transform),
        2048 => ScriptType::of(K::BoundingBox),
        8192 => ScriptType::of(K::Uint),
        _ => ScriptType::NULL,
    }
}
