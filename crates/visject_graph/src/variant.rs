// SPDX-License-Identifier: MIT OR Apache-2.0
//! Dynamically typed values stored in node and parameter slots.

use crate::types::{ScriptType, VariantKind};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Translation, rotation and scale
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Transform {
    /// Translation
    pub translation: [f32; 3],
    /// Rotation quaternion (x, y, z, w)
    pub orientation: [f32; 4],
    /// Scale
    pub scale: [f32; 3],
}

impl Default for Transform {
    fn default() -> Self {
        Self {
            translation: [0.0; 3],
            orientation: [0.0, 0.0, 0.0, 1.0],
            scale: [1.0; 3],
        }
    }
}

/// A dynamically typed value.
///
/// Equality is structural: byte payloads and nested collections compare
/// element by element.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub enum Variant {
    /// No value
    #[default]
    Null,
    /// Void marker
    Void,
    /// Boolean
    Bool(bool),
    /// 16-bit signed integer
    Int16(i16),
    /// 16-bit unsigned integer
    Uint16(u16),
    /// 32-bit signed integer
    Int(i32),
    /// 32-bit unsigned integer
    Uint(u32),
    /// 64-bit signed integer
    Int64(i64),
    /// 64-bit unsigned integer
    Uint64(u64),
    /// 32-bit float
    Float(f32),
    /// 64-bit float
    Double(f64),
    /// Raw pointer value
    Pointer(u64),
    /// Text
    String(String),
    /// Engine object reference
    Object {
        /// Object class name
        type_name: Option<String>,
        /// Object id
        id: Uuid,
    },
    /// Structure value
    Structure {
        /// Structure type name
        type_name: Option<String>,
        /// Serialized structure data
        data: Vec<u8>,
    },
    /// Asset reference
    Asset {
        /// Asset class name
        type_name: Option<String>,
        /// Asset id
        id: Uuid,
    },
    /// Raw bytes
    Blob(Vec<u8>),
    /// Enum value
    Enum {
        /// Enum type name
        type_name: Option<String>,
        /// Raw value
        value: u64,
    },
    /// 2D float vector
    Float2([f32; 2]),
    /// 3D float vector
    Float3([f32; 3]),
    /// 4D float vector
    Float4([f32; 4]),
    /// RGBA color
    Color([f32; 4]),
    /// GUID
    Guid(Uuid),
    /// Axis aligned box
    BoundingBox {
        /// Minimum corner
        min: [f32; 3],
        /// Maximum corner
        max: [f32; 3],
    },
    /// Sphere
    BoundingSphere {
        /// Center
        center: [f32; 3],
        /// Radius
        radius: f32,
    },
    /// Rotation quaternion (x, y, z, w)
    Quaternion([f32; 4]),
    /// Transform
    Transform(Transform),
    /// Rectangle
    Rectangle {
        /// Top-left corner
        location: [f32; 2],
        /// Size
        size: [f32; 2],
    },
    /// Ray
    Ray {
        /// Origin
        position: [f32; 3],
        /// Direction
        direction: [f32; 3],
    },
    /// 4x4 matrix (row major)
    Matrix([f32; 16]),
    /// Array of values
    Array {
        /// Array type name
        type_name: Option<String>,
        /// Items
        items: Vec<Variant>,
    },
    /// Dictionary of values
    Dictionary {
        /// Dictionary type name
        type_name: Option<String>,
        /// Entries in insertion order
        entries: Vec<(Variant, Variant)>,
    },
    /// Scripting object payload
    ManagedObject {
        /// Object class name
        type_name: Option<String>,
        /// Serialized object data
        data: Vec<u8>,
    },
    /// Type name reference
    Typename(String),
    /// 2D integer vector
    Int2([i32; 2]),
    /// 3D integer vector
    Int3([i32; 3]),
    /// 4D integer vector
    Int4([i32; 4]),
    /// 2D double vector
    Double2([f64; 2]),
    /// 3D double vector
    Double3([f64; 3]),
    /// 4D double vector
    Double4([f64; 4]),
}

impl Variant {
    /// Kind of this value
    pub fn kind(&self) -> VariantKind {
        match self {
            Self::Null => VariantKind::Null,
            Self::Void => VariantKind::Void,
            Self::Bool(_) => VariantKind::Bool,
            Self::Int16(_) => VariantKind::Int16,
            Self::Uint16(_) => VariantKind::Uint16,
            Self::Int(_) => VariantKind::Int,
            Self::Uint(_) => VariantKind::Uint,
            Self::Int64(_) => VariantKind::Int64,
            Self::Uint64(_) => VariantKind::Uint64,
            Self::Float(_) => VariantKind::Float,
            Self::Double(_) => VariantKind::Double,
            Self::Pointer(_) => VariantKind::Pointer,
            Self::String(_) => VariantKind::String,
            Self::Object { .. } => VariantKind::Object,
            Self::Structure { .. } => VariantKind::Structure,
            Self::Asset { .. } => VariantKind::Asset,
            Self::Blob(_) => VariantKind::Blob,
            Self::Enum { .. } => VariantKind::Enum,
            Self::Float2(_) => VariantKind::Float2,
            Self::Float3(_) => VariantKind::Float3,
            Self::Float4(_) => VariantKind::Float4,
            Self::Color(_) => VariantKind::Color,
            Self::Guid(_) => VariantKind::Guid,
            Self::BoundingBox { .. } => VariantKind::BoundingBox,
            Self::BoundingSphere { .. } => VariantKind::BoundingSphere,
            Self::Quaternion(_) => VariantKind::Quaternion,
            Self::Transform(_) => VariantKind::Transform,
            Self::Rectangle { .. } => VariantKind::Rectangle,
            Self::Ray { .. } => VariantKind::Ray,
            Self::Matrix(_) => VariantKind::Matrix,
            Self::Array { .. } => VariantKind::Array,
            Self::Dictionary { .. } => VariantKind::Dictionary,
            Self::ManagedObject { .. } => VariantKind::ManagedObject,
            Self::Typename(_) => VariantKind::Typename,
            Self::Int2(_) => VariantKind::Int2,
            Self::Int3(_) => VariantKind::Int3,
            Self::Int4(_) => VariantKind::Int4,
            Self::Double2(_) => VariantKind::Double2,
            Self::Double3(_) => VariantKind::Double3,
            Self::Double4(_) => VariantKind::Double4,
        }
    }

    /// Type name carried by typed kinds
    pub fn type_name(&self) -> Option<&str> {
        match self {
            Self::Object { type_name, .. }
            | Self::Structure { type_name, .. }
            | Self::Asset { type_name, .. }
            | Self::Enum { type_name, .. }
            | Self::Array { type_name, .. }
            | Self::Dictionary { type_name, .. }
            | Self::ManagedObject { type_name, .. } => type_name.as_deref(),
            _ => None,
        }
    }

    /// Runtime type of this value
    pub fn script_type(&self) -> ScriptType {
        ScriptType {
            kind: self.kind(),
            type_name: self.type_name().map(str::to_owned),
        }
    }

    /// Whether both values have the same runtime type
    pub fn same_type(&self, other: &Variant) -> bool {
        self.kind() == other.kind() && self.type_name() == other.type_name()
    }

    /// Default value for a type
    pub fn default_for(ty: &ScriptType) -> Variant {
        let type_name = ty.type_name.clone();
        match ty.kind {
            VariantKind::Null => Self::Null,
            VariantKind::Void => Self::Void,
            VariantKind::Bool => Self::Bool(false),
            VariantKind::Int16 => Self::Int16(0),
            VariantKind::Uint16 => Self::Uint16(0),
            VariantKind::Int => Self::Int(0),
            VariantKind::Uint => Self::Uint(0),
            VariantKind::Int64 => Self::Int64(0),
            VariantKind::Uint64 => Self::Uint64(0),
            VariantKind::Float => Self::Float(0.0),
            VariantKind::Double => Self::Double(0.0),
            VariantKind::Pointer => Self::Pointer(0),
            VariantKind::String => Self::String(String::new()),
            VariantKind::Object => Self::Object {
                type_name,
                id: Uuid::nil(),
            },
            VariantKind::Structure => Self::Structure {
                type_name,
                data: Vec::new(),
            },
            VariantKind::Asset => Self::Asset {
                type_name,
                id: Uuid::nil(),
            },
            VariantKind::Blob => Self::Blob(Vec::new()),
            VariantKind::Enum => Self::Enum {
                type_name,
                value: 0,
            },
            VariantKind::Float2 => Self::Float2([0.0; 2]),
            VariantKind::Float3 => Self::Float3([0.0; 3]),
            VariantKind::Float4 => Self::Float4([0.0; 4]),
            VariantKind::Color => Self::Color([0.0, 0.0, 0.0, 1.0]),
            VariantKind::Guid => Self::Guid(Uuid::nil()),
            VariantKind::BoundingBox => Self::BoundingBox {
                min: [0.0; 3],
                max: [0.0; 3],
            },
            VariantKind::BoundingSphere => Self::BoundingSphere {
                center: [0.0; 3],
                radius: 0.0,
            },
            VariantKind::Quaternion => Self::Quaternion([0.0, 0.0, 0.0, 1.0]),
            VariantKind::Transform => Self::Transform(Transform::default()),
            VariantKind::Rectangle => Self::Rectangle {
                location: [0.0; 2],
                size: [0.0; 2],
            },
            VariantKind::Ray => Self::Ray {
                position: [0.0; 3],
                direction: [0.0, 0.0, 1.0],
            },
            VariantKind::Matrix => {
                let mut m = [0.0; 16];
                m[0] = 1.0;
                m[5] = 1.0;
                m[10] = 1.0;
                m[15] = 1.0;
                Self::Matrix(m)
            }
            VariantKind::Array => Self::Array {
                type_name,
                items: Vec::new(),
            },
            VariantKind::Dictionary => Self::Dictionary {
                type_name,
                entries: Vec::new(),
            },
            VariantKind::ManagedObject => Self::ManagedObject {
                type_name,
                data: Vec::new(),
            },
            VariantKind::Typename => Self::Typename(type_name.unwrap_or_default()),
            VariantKind::Int2 => Self::Int2([0; 2]),
            VariantKind::Int3 => Self::Int3([0; 3]),
            VariantKind::Int4 => Self::Int4([0; 4]),
            VariantKind::Double2 => Self::Double2([0.0; 2]),
            VariantKind::Double3 => Self::Double3([0.0; 3]),
            VariantKind::Double4 => Self::Double4([0.0; 4]),
        }
    }

    /// Raw bytes of blob-like values
    pub fn as_bytes(&self) -> Option<&[u8]> {
        match self {
            Self::Blob(data) | Self::Structure { data, .. } | Self::ManagedObject { data, .. } => {
                Some(data)
            }
            _ => None,
        }
    }

    /// Numeric view of scalar values
    pub fn as_f64(&self) -> Option<f64> {
        match *self {
            Self::Bool(v) => Some(if v { 1.0 } else { 0.0 }),
            Self::Int16(v) => Some(v.into()),
            Self::Uint16(v) => Some(v.into()),
            Self::Int(v) => Some(v.into()),
            Self::Uint(v) => Some(v.into()),
            Self::Int64(v) => Some(v as f64),
            Self::Uint64(v) | Self::Enum { value: v, .. } => Some(v as f64),
            Self::Float(v) => Some(v.into()),
            Self::Double(v) => Some(v),
            _ => None,
        }
    }

    /// Text of string-like values
    pub fn as_str(&self) -> Option<&str> {
        match self {
            Self::String(s) | Self::Typename(s) => Some(s),
            _ => None,
        }
    }

    /// GUID of id-like values
    pub fn as_guid(&self) -> Option<Uuid> {
        match *self {
            Self::Guid(id) | Self::Object { id, .. } | Self::Asset { id, .. } => Some(id),
            _ => None,
        }
    }
}

impl From<bool> for Variant {
    fn from(v: bool) -> Self {
        Self::Bool(v)
    }
}

impl From<i32> for Variant {
    fn from(v: i32) -> Self {
        Self::Int(v)
    }
}

impl From<f32> for Variant {
    fn from(v: f32) -> Self {
        Self::Float(v)
    }
}

impl From<&str> for Variant {
    fn from(v: &str) -> Self {
        Self::String(v.to_owned())
    }
}

impl From<String> for Variant {
    fn from(v: String) -> Self {
        Self::String(v)
    }
}

impl From<Vec<u8>> for Variant {
    fn from(v: Vec<u8>) -> Self {
        Self::Blob(v)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_blob_equality_is_deep() {
        let a = Variant::Blob(vec![1, 2, 3]);
        let b = Variant::Blob(vec![1, 2, 3]);
        let c = Variant::Blob(vec![1, 2, 4]);
        assert_eq!(a, b);
        assert_ne!(a, c);
    }

    #[test]
    fn test_defaults_match_type() {
        let ty = ScriptType::named(VariantKind::Enum, "BlendMode");
        let value = Variant::default_for(&ty);
        assert_eq!(value.script_type(), ty);

        for tag in 0..40u8 {
            let kind = VariantKind::from_tag(tag).unwrap();
            if kind == VariantKind::Typename {
                continue;
            }
            assert_eq!(Variant::default_for(&ScriptType::of(kind)).kind(), kind);
        }
    }

    #[test]
    fn test_same_type() {
        assert!(Variant::Float(1.0).same_type(&Variant::Float(2.0)));
        assert!(!Variant::Float(1.0).same_type(&Variant::Int(1)));
        let a = Variant::Enum {
            type_name: Some("A".into()),
            value: 1,
        };
        let b = Variant::Enum {
            type_name: Some("B".into()),
            value: 1,
        };
        assert!(!a.same_type(&b));
    }
}
