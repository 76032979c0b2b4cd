// SPDX-License-Identifier: MIT OR Apache-2.0
//! Type descriptors that flow through boxes.
//!
//! A [`ScriptType`] is a variant kind plus an optional type name (object
//! class, enum or structure name). Compatibility between two descriptors is
//! a pure function of the descriptors and the receiving box's
//! [`ConnectionsHint`] set.

use bitflags::bitflags;
use serde::{Deserialize, Serialize};
use std::fmt;

/// Kind of value carried by a [`ScriptType`] or a [`crate::Variant`].
///
/// Discriminants are the on-disk tags used by the binary codec.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[repr(u8)]
pub enum VariantKind {
    /// Untyped placeholder
    #[default]
    Null = 0,
    /// No value (execution flow)
    Void = 1,
    /// Boolean
    Bool = 2,
    /// 32-bit signed integer
    Int = 3,
    /// 32-bit unsigned integer
    Uint = 4,
    /// 64-bit signed integer
    Int64 = 5,
    /// 64-bit unsigned integer
    Uint64 = 6,
    /// 32-bit float
    Float = 7,
    /// 64-bit float
    Double = 8,
    /// Raw pointer value
    Pointer = 9,
    /// Text
    String = 10,
    /// Engine object reference
    Object = 11,
    /// Structure value (opaque bytes)
    Structure = 12,
    /// Asset reference
    Asset = 13,
    /// Byte blob
    Blob = 14,
    /// Enum value
    Enum = 15,
    /// 2D float vector
    Float2 = 16,
    /// 3D float vector
    Float3 = 17,
    /// 4D float vector
    Float4 = 18,
    /// RGBA color
    Color = 19,
    /// GUID
    Guid = 20,
    /// Axis aligned box
    BoundingBox = 21,
    /// Sphere
    BoundingSphere = 22,
    /// Rotation
    Quaternion = 23,
    /// Translation, rotation and scale
    Transform = 24,
    /// 2D rectangle
    Rectangle = 25,
    /// Ray
    Ray = 26,
    /// 4x4 matrix
    Matrix = 27,
    /// Array of variants
    Array = 28,
    /// Dictionary of variants
    Dictionary = 29,
    /// Scripting object (opaque bytes)
    ManagedObject = 30,
    /// Type name reference
    Typename = 31,
    /// 2D integer vector
    Int2 = 32,
    /// 3D integer vector
    Int3 = 33,
    /// 4D integer vector
    Int4 = 34,
    /// 16-bit signed integer
    Int16 = 35,
    /// 16-bit unsigned integer
    Uint16 = 36,
    /// 2D double vector
    Double2 = 37,
    /// 3D double vector
    Double3 = 38,
    /// 4D double vector
    Double4 = 39,
}

impl VariantKind {
    /// Decode a wire tag
    pub fn from_tag(tag: u8) -> Option<Self> {
        use VariantKind::*;
        const ALL: [VariantKind; 40] = [
            Null, Void, Bool, Int, Uint, Int64, Uint64, Float, Double, Pointer, String, Object,
            Structure, Asset, Blob, Enum, Float2, Float3, Float4, Color, Guid, BoundingBox,
            BoundingSphere, Quaternion, Transform, Rectangle, Ray, Matrix, Array, Dictionary,
            ManagedObject, Typename, Int2, Int3, Int4, Int16, Uint16, Double2, Double3, Double4,
        ];
        ALL.get(tag as usize).copied()
    }

    /// Wire tag
    pub fn tag(self) -> u8 {
        self as u8
    }

    /// Whether this is a scalar kind (bool, integers, floats)
    pub fn is_scalar(self) -> bool {
        matches!(
            self,
            Self::Bool
                | Self::Int16
                | Self::Uint16
                | Self::Int
                | Self::Uint
                | Self::Int64
                | Self::Uint64
                | Self::Float
                | Self::Double
        )
    }

    /// Whether this is a vector kind
    pub fn is_vector(self) -> bool {
        matches!(
            self,
            Self::Float2
                | Self::Float3
                | Self::Float4
                | Self::Color
                | Self::Quaternion
                | Self::Int2
                | Self::Int3
                | Self::Int4
                | Self::Double2
                | Self::Double3
                | Self::Double4
        )
    }

    /// Whether this kind references an engine object
    pub fn is_object(self) -> bool {
        matches!(self, Self::Object | Self::Asset | Self::ManagedObject)
    }

    /// Number of components for scalar and vector kinds
    pub fn components(self) -> usize {
        match self {
            Self::Float2 | Self::Int2 | Self::Double2 => 2,
            Self::Float3 | Self::Int3 | Self::Double3 => 3,
            Self::Float4 | Self::Color | Self::Quaternion | Self::Int4 | Self::Double4 => 4,
            _ => 1,
        }
    }
}

/// Type descriptor of a box or a value
#[derive(Debug, Clone, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub struct ScriptType {
    /// Value kind
    pub kind: VariantKind,
    /// Full type name for objects, enums, structures and typed arrays
    pub type_name: Option<String>,
}

impl ScriptType {
    /// Untyped placeholder
    pub const NULL: ScriptType = ScriptType::of(VariantKind::Null);
    /// Execution flow
    pub const VOID: ScriptType = ScriptType::of(VariantKind::Void);
    /// Boolean
    pub const BOOL: ScriptType = ScriptType::of(VariantKind::Bool);
    /// 32-bit integer
    pub const INT: ScriptType = ScriptType::of(VariantKind::Int);
    /// 32-bit float
    pub const FLOAT: ScriptType = ScriptType::of(VariantKind::Float);
    /// 2D vector
    pub const FLOAT2: ScriptType = ScriptType::of(VariantKind::Float2);
    /// 3D vector
    pub const FLOAT3: ScriptType = ScriptType::of(VariantKind::Float3);
    /// 4D vector
    pub const FLOAT4: ScriptType = ScriptType::of(VariantKind::Float4);
    /// Color
    pub const COLOR: ScriptType = ScriptType::of(VariantKind::Color);
    /// Text
    pub const STRING: ScriptType = ScriptType::of(VariantKind::String);
    /// Generic object reference
    pub const OBJECT: ScriptType = ScriptType::of(VariantKind::Object);

    /// Create an unnamed type
    pub const fn of(kind: VariantKind) -> Self {
        Self {
            kind,
            type_name: None,
        }
    }

    /// Create a named type (empty names are normalized to none)
    pub fn named(kind: VariantKind, type_name: impl Into<String>) -> Self {
        let name = type_name.into();
        Self {
            kind,
            type_name: (!name.is_empty()).then_some(name),
        }
    }

    /// Whether this is the untyped placeholder
    pub fn is_null(&self) -> bool {
        self.kind == VariantKind::Null
    }

    /// Whether this is an enum type
    pub fn is_enum(&self) -> bool {
        self.kind == VariantKind::Enum
    }

    /// Whether this is an array type
    pub fn is_array(&self) -> bool {
        self.kind == VariantKind::Array
    }

    /// Whether this is a dictionary type
    pub fn is_dictionary(&self) -> bool {
        self.kind == VariantKind::Dictionary
    }

    /// Whether values of this type can be implicitly cast to `to`
    pub fn can_cast_to(&self, to: &ScriptType) -> bool {
        can_use_direct_cast(self, to)
    }
}

impl fmt::Display for ScriptType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match &self.type_name {
            Some(name) => write!(f, "{:?}<{}>", self.kind, name),
            None => write!(f, "{:?}", self.kind),
        }
    }
}

impl From<VariantKind> for ScriptType {
    fn from(kind: VariantKind) -> Self {
        Self::of(kind)
    }
}

bitflags! {
    /// Categories of types a box with no declared type accepts.
    #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
    pub struct ConnectionsHint: u32 {
        /// Engine objects and assets
        const OBJECT = 1 << 0;
        /// Booleans, integers and floats
        const SCALAR = 1 << 1;
        /// Vector kinds
        const VECTOR = 1 << 2;
        /// Enums
        const ENUM = 1 << 3;
        /// Arrays
        const ARRAY = 1 << 4;
        /// Dictionaries
        const DICTIONARY = 1 << 5;
        /// Any non-void value
        const VALUE = Self::SCALAR.bits() | Self::VECTOR.bits() | Self::ENUM.bits();
        /// Scalars or vectors
        const NUMERIC = Self::SCALAR.bits() | Self::VECTOR.bits();
        /// Any type
        const ANYTHING = Self::OBJECT.bits()
            | Self::SCALAR.bits()
            | Self::VECTOR.bits()
            | Self::ENUM.bits()
            | Self::ARRAY.bits()
            | Self::DICTIONARY.bits();
    }
}

impl ConnectionsHint {
    /// Whether a value of type `ty` is accepted by these hints
    pub fn accepts(self, ty: &ScriptType) -> bool {
        if self.is_empty() {
            return false;
        }
        if self.contains(Self::ANYTHING) {
            return true;
        }
        if self.contains(Self::VALUE) && ty.kind != VariantKind::Void {
            return true;
        }
        (self.contains(Self::ENUM) && ty.is_enum())
            || (self.contains(Self::ARRAY) && ty.is_array())
            || (self.contains(Self::DICTIONARY) && ty.is_dictionary())
            || (self.contains(Self::VECTOR) && ty.kind.is_vector())
            || (self.contains(Self::SCALAR) && ty.kind.is_scalar())
            || (self.contains(Self::OBJECT) && ty.kind.is_object())
    }
}

/// Implicit cast rules used when connecting boxes.
pub fn can_use_direct_cast(from: &ScriptType, to: &ScriptType) -> bool {
    if from == to || from.is_null() || to.is_null() {
        return true;
    }
    let (f, t) = (from.kind, to.kind);

    // Objects feed generic object ports and boolean validity checks
    if f.is_object() {
        return (t == VariantKind::Object && to.type_name.is_none())
            || (t == f && to.type_name.is_none())
            || t == VariantKind::Bool;
    }

    // Enums behave like integers
    if f == VariantKind::Enum {
        return (t.is_scalar() && t != VariantKind::Bool)
            || (t == VariantKind::Enum && to.type_name.is_none());
    }

    if (f.is_scalar() || f.is_vector()) && (t.is_scalar() || t.is_vector()) {
        // Vectors do not collapse into booleans
        return !(t == VariantKind::Bool && f.is_vector());
    }

    false
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_tags_are_stable() {
        for tag in 0..40u8 {
            let kind = VariantKind::from_tag(tag).unwrap();
            assert_eq!(kind.tag(), tag);
        }
        assert!(VariantKind::from_tag(40).is_none());
        assert_eq!(VariantKind::Int16.tag(), 35);
        assert_eq!(VariantKind::Typename.tag(), 31);
    }

    #[test]
    fn test_direct_cast_rules() {
        let texture = ScriptType::named(VariantKind::Asset, "Texture");
        let actor = ScriptType::named(VariantKind::Object, "Actor");

        assert!(can_use_direct_cast(&ScriptType::FLOAT, &ScriptType::FLOAT));
        assert!(can_use_direct_cast(&ScriptType::NULL, &ScriptType::STRING));
        assert!(can_use_direct_cast(&ScriptType::STRING, &ScriptType::NULL));
        assert!(can_use_direct_cast(&ScriptType::INT, &ScriptType::FLOAT));
        assert!(can_use_direct_cast(&ScriptType::FLOAT, &ScriptType::FLOAT3));
        assert!(can_use_direct_cast(&ScriptType::COLOR, &ScriptType::FLOAT4));
        assert!(can_use_direct_cast(&texture, &ScriptType::OBJECT));
        assert!(can_use_direct_cast(&actor, &ScriptType::BOOL));

        assert!(!can_use_direct_cast(&ScriptType::OBJECT, &actor));
        assert!(!can_use_direct_cast(&ScriptType::STRING, &ScriptType::FLOAT));
        assert!(!can_use_direct_cast(&ScriptType::FLOAT3, &ScriptType::BOOL));
        assert!(!can_use_direct_cast(&ScriptType::VOID, &ScriptType::FLOAT));
    }

    #[test]
    fn test_hints() {
        let my_enum = ScriptType::named(VariantKind::Enum, "BlendMode");
        assert!(ConnectionsHint::ANYTHING.accepts(&ScriptType::STRING));
        assert!(ConnectionsHint::SCALAR.accepts(&ScriptType::INT));
        assert!(!ConnectionsHint::SCALAR.accepts(&ScriptType::FLOAT3));
        assert!(ConnectionsHint::VECTOR.accepts(&ScriptType::FLOAT3));
        assert!(ConnectionsHint::ENUM.accepts(&my_enum));
        assert!(ConnectionsHint::VALUE.accepts(&ScriptType::STRING));
        assert!(!ConnectionsHint::VALUE.accepts(&ScriptType::VOID));
        assert!(ConnectionsHint::NUMERIC.accepts(&ScriptType::FLOAT2));
        assert!(!ConnectionsHint::NUMERIC.accepts(&ScriptType::STRING));
        assert!(!ConnectionsHint::empty().accepts(&ScriptType::FLOAT));
    }
}
