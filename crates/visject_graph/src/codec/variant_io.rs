// SPDX-License-Identifier: MIT OR Apache-2.0
//! Wire form of type descriptors and variant values.

use super::stream::{ReadStream, WriteStream};
use super::FormatError;
use crate::types::{ScriptType, VariantKind};
use crate::variant::{Transform, Variant};

/// XOR key of variant strings
pub const STRING_KEY: i16 = -14;
/// XOR key of type names
pub const TYPE_NAME_KEY: u8 = 77;
/// Marker preceding an ANSI type name
const TYPE_NAME_MARKER: i32 = i32::MAX;

/// Read a type descriptor
pub fn read_script_type(r: &mut ReadStream<'_>) -> Result<ScriptType, FormatError> {
    let tag = r.read_u8()?;
    let kind = VariantKind::from_tag(tag).ok_or(FormatError::InvalidVariantTag(tag))?;
    let offset = r.position();
    let len = r.read_i32()?;
    let name = match len {
        0 => String::new(),
        TYPE_NAME_MARKER => r.read_ansi(TYPE_NAME_KEY)?,
        n if n > 0 => {
            // Deprecated UTF-16 form
            let n = n as usize;
            if n.saturating_mul(2) > r.remaining() {
                return Err(FormatError::UnexpectedEof(r.position()));
            }
            r.read_utf16(n, u16::from(TYPE_NAME_KEY))?
        }
        n => {
            return Err(FormatError::InvalidLength {
                len: n.into(),
                offset,
            })
        }
    };
    Ok(ScriptType::named(kind, name))
}

/// Write a type descriptor
pub fn write_script_type(w: &mut WriteStream, ty: &ScriptType) -> Result<(), FormatError> {
    w.write_u8(ty.kind.tag());
    match ty.type_name.as_deref() {
        Some(name) if !name.is_empty() => {
            w.write_i32(TYPE_NAME_MARKER);
            w.write_ansi(name, TYPE_NAME_KEY)?;
        }
        _ => w.write_i32(0),
    }
    Ok(())
}

/// Read a type descriptor followed by its value
pub fn read_variant(r: &mut ReadStream<'_>) -> Result<Variant, FormatError> {
    let ty = read_script_type(r)?;
    read_variant_payload(r, ty)
}

fn read_variant_payload(r: &mut ReadStream<'_>, ty: ScriptType) -> Result<Variant, FormatError> {
    let type_name = ty.type_name;
    Ok(match ty.kind {
        VariantKind::Null => Variant::Null,
        VariantKind::Void => Variant::Void,
        VariantKind::Bool => Variant::Bool(r.read_bool()?),
        VariantKind::Int16 => Variant::Int16(r.read_i16()?),
        VariantKind::Uint16 => Variant::Uint16(r.read_u16()?),
        VariantKind::Int => Variant::Int(r.read_i32()?),
        VariantKind::Uint => Variant::Uint(r.read_u32()?),
        VariantKind::Int64 => Variant::Int64(r.read_i64()?),
        VariantKind::Uint64 => Variant::Uint64(r.read_u64()?),
        VariantKind::Float => Variant::Float(r.read_f32()?),
        VariantKind::Double => Variant::Double(r.read_f64()?),
        VariantKind::Pointer => Variant::Pointer(r.read_u64()?),
        VariantKind::String => Variant::String(r.read_string(STRING_KEY)?),
        VariantKind::Object => Variant::Object {
            type_name,
            id: r.read_guid()?,
        },
        VariantKind::Structure => Variant::Structure {
            type_name,
            data: r.read_blob()?,
        },
        VariantKind::Asset => Variant::Asset {
            type_name,
            id: r.read_guid()?,
        },
        VariantKind::Blob => Variant::Blob(r.read_blob()?),
        VariantKind::Enum => Variant::Enum {
            type_name,
            value: r.read_u64()?,
        },
        VariantKind::Float2 => Variant::Float2(r.read_f32s()?),
        VariantKind::Float3 => Variant::Float3(r.read_f32s()?),
        VariantKind::Float4 => Variant::Float4(r.read_f32s()?),
        VariantKind::Color => Variant::Color(r.read_f32s()?),
        VariantKind::Guid => Variant::Guid(r.read_guid()?),
        VariantKind::BoundingBox => Variant::BoundingBox {
            min: r.read_f32s()?,
            max: r.read_f32s()?,
        },
        VariantKind::BoundingSphere => Variant::BoundingSphere {
            center: r.read_f32s()?,
            radius: r.read_f32()?,
        },
        VariantKind::Quaternion => Variant::Quaternion(r.read_f32s()?),
        VariantKind::Transform => Variant::Transform(read_transform(r)?),
        VariantKind::Rectangle => Variant::Rectangle {
            location: r.read_f32s()?,
            size: r.read_f32s()?,
        },
        VariantKind::Ray => Variant::Ray {
            position: r.read_f32s()?,
            direction: r.read_f32s()?,
        },
        VariantKind::Matrix => Variant::Matrix(r.read_f32s()?),
        VariantKind::Array => {
            let count = r.read_count(5)?;
            let mut items = Vec::with_capacity(count);
            for _ in 0..count {
                items.push(read_variant(r)?);
            }
            Variant::Array { type_name, items }
        }
        VariantKind::Dictionary => {
            let count = r.read_count(10)?;
            let mut entries = Vec::with_capacity(count);
            for _ in 0..count {
                let key = read_variant(r)?;
                let value = read_variant(r)?;
                entries.push((key, value));
            }
            Variant::Dictionary { type_name, entries }
        }
        VariantKind::ManagedObject => Variant::ManagedObject {
            type_name,
            data: r.read_blob()?,
        },
        VariantKind::Typename => Variant::Typename(r.read_ansi(STRING_KEY as u8)?),
        VariantKind::Int2 => Variant::Int2(r.read_i32s()?),
        VariantKind::Int3 => Variant::Int3(r.read_i32s()?),
        VariantKind::Int4 => Variant::Int4(r.read_i32s()?),
        VariantKind::Double2 => Variant::Double2(r.read_f64s()?),
        VariantKind::Double3 => Variant::Double3(r.read_f64s()?),
        VariantKind::Double4 => Variant::Double4(r.read_f64s()?),
    })
}

/// Read translation, orientation and scale
pub fn read_transform(r: &mut ReadStream<'_>) -> Result<Transform, FormatError> {
    Ok(Transform {
        translation: r.read_f32s()?,
        orientation: r.read_f32s()?,
        scale: r.read_f32s()?,
    })
}

/// Write a type descriptor followed by its value
pub fn write_variant(w: &mut WriteStream, value: &Variant) -> Result<(), FormatError> {
    write_script_type(w, &value.script_type())?;
    match value {
        Variant::Null | Variant::Void => {}
        Variant::Bool(v) => w.write_bool(*v),
        Variant::Int16(v) => w.write_i16(*v),
        Variant::Uint16(v) => w.write_u16(*v),
        Variant::Int(v) => w.write_i32(*v),
        Variant::Uint(v) => w.write_u32(*v),
        Variant::Int64(v) => w.write_i64(*v),
        Variant::Uint64(v) | Variant::Pointer(v) => w.write_u64(*v),
        Variant::Float(v) => w.write_f32(*v),
        Variant::Double(v) => w.write_f64(*v),
        Variant::String(s) => w.write_string(s, STRING_KEY)?,
        Variant::Object { id, .. } | Variant::Asset { id, .. } | Variant::Guid(id) => {
            w.write_guid(id)
        }
        Variant::Structure { data, .. } | Variant::ManagedObject { data, .. } | Variant::Blob(data) => {
            w.write_blob(data)?
        }
        Variant::Enum { value, .. } => w.write_u64(*value),
        Variant::Float2(v) => w.write_f32s(v),
        Variant::Float3(v) => w.write_f32s(v),
        Variant::Float4(v) | Variant::Color(v) | Variant::Quaternion(v) => w.write_f32s(v),
        Variant::BoundingBox { min, max } => {
            w.write_f32s(min);
            w.write_f32s(max);
        }
        Variant::BoundingSphere { center, radius } => {
            w.write_f32s(center);
            w.write_f32(*radius);
        }
        Variant::Transform(t) => write_transform(w, t),
        Variant::Rectangle { location, size } => {
            w.write_f32s(location);
            w.write_f32s(size);
        }
        Variant::Ray {
            position,
            direction,
        } => {
            w.write_f32s(position);
            w.write_f32s(direction);
        }
        Variant::Matrix(m) => w.write_f32s(m),
        Variant::Array { items, .. } => {
            w.write_count(items.len(), "array")?;
            for item in items {
                write_variant(w, item)?;
            }
        }
        Variant::Dictionary { entries, .. } => {
            w.write_count(entries.len(), "dictionary")?;
            for (key, value) in entries {
                write_variant(w, key)?;
                write_variant(w, value)?;
            }
        }
        Variant::Typename(name) => w.write_ansi(name, STRING_KEY as u8)?,
        Variant::Int2(v) => w.write_i32s(v),
        Variant::Int3(v) => w.write_i32s(v),
        Variant::Int4(v) => w.write_i32s(v),
        Variant::Double2(v) => w.write_f64s(v),
        Variant::Double3(v) => w.write_f64s(v),
        Variant::Double4(v) => w.write_f64s(v),
    }
    Ok(())
}

/// Write translation, orientation and scale
pub fn write_transform(w: &mut WriteStream, t: &Transform) {
    w.write_f32s(&t.translation);
    w.write_f32s(&t.orientation);
    w.write_f32s(&t.scale);
}
