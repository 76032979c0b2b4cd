// SPDX-License-Identifier: MIT OR Apache-2.0
//! Constant value nodes: one editable value feeding one output.

use super::CONSTANTS_GROUP_ID;
use crate::archetype::{ElementArchetype, GroupArchetype, NodeArchetype};
use crate::types::ScriptType;
use crate::variant::Variant;

/// Boolean constant
pub const BOOL: u16 = 1;
/// Integer constant
pub const INT: u16 = 2;
/// Float constant
pub const FLOAT: u16 = 3;
/// Float2 constant
pub const FLOAT2: u16 = 4;
/// Float3 constant
pub const FLOAT3: u16 = 5;
/// Float4 constant
pub const FLOAT4: u16 = 6;
/// Color constant
pub const COLOR: u16 = 7;
/// String constant
pub const STRING: u16 = 12;

fn constant(type_id: u16, title: &str, ty: ScriptType, value: Variant, widget: ElementArchetype) -> NodeArchetype {
    let width = if ty.kind.is_vector() { 200.0 } else { 110.0 };
    NodeArchetype::new(type_id, title, [width, 60.0])
        .with_description(format!("Constant {} value", title.to_lowercase()))
        .with_values(vec![value])
        .with_elements(vec![ElementArchetype::output(0.0, "Value", ty, 0), widget])
}

/// The constants group
pub fn group() -> GroupArchetype {
    GroupArchetype::new(CONSTANTS_GROUP_ID, "Constants", [146, 208, 80])
        .with(constant(
            BOOL,
            "Bool",
            ScriptType::BOOL,
            Variant::Bool(false),
            ElementArchetype::bool_value(0.0, 0.0, 0),
        ))
        .with(constant(
            INT,
            "Integer",
            ScriptType::INT,
            Variant::Int(0),
            ElementArchetype::integer_value(0.0, 0.0, 0),
        ))
        .with(constant(
            FLOAT,
            "Float",
            ScriptType::FLOAT,
            Variant::Float(0.0),
            ElementArchetype::float_value(0.0, 0.0, 0),
        ))
        .with(constant(
            FLOAT2,
            "Float2",
            ScriptType::FLOAT2,
            Variant::Float2([0.0; 2]),
            ElementArchetype::vector_value(0.0, 0.0, 0),
        ))
        .with(constant(
            FLOAT3,
            "Float3",
            ScriptType::FLOAT3,
            Variant::Float3([0.0; 3]),
            ElementArchetype::vector_value(0.0, 0.0, 0),
        ))
        .with(constant(
            FLOAT4,
            "Float4",
            ScriptType::FLOAT4,
            Variant::Float4([0.0; 4]),
            ElementArchetype::vector_value(0.0, 0.0, 0),
        ))
        .with(constant(
            COLOR,
            "Color",
            ScriptType::COLOR,
            Variant::Color([1.0, 1.0, 1.0, 1.0]),
            ElementArchetype::color_value(0.0, 0.0, 0),
        ))
        .with(constant(
            STRING,
            "String",
            ScriptType::STRING,
            Variant::String(String::new()),
            ElementArchetype::text_box(0.0, 0.0, 80.0, 18.0, 0),
        ))
}
