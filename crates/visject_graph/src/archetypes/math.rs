// SPDX-License-Identifier: MIT OR Apache-2.0
//! Arithmetic nodes.
//!
//! Binary operators take their type from the first connected operand and
//! hand it to the result, so one node works for scalars and vectors alike.

use super::MATH_GROUP_ID;
use crate::archetype::{ElementArchetype, GroupArchetype, NodeArchetype};
use crate::element::SurfaceBox;
use crate::types::{ConnectionsHint, ScriptType, VariantKind};
use crate::variant::Variant;

/// `a + b`
pub const ADD: u16 = 1;
/// `a - b`
pub const SUBTRACT: u16 = 2;
/// `a * b`
pub const MULTIPLY: u16 = 3;
/// `a / b`
pub const DIVIDE: u16 = 5;
/// Vector length
pub const LENGTH: u16 = 11;
/// Component-wise minimum
pub const MIN: u16 = 21;
/// Component-wise maximum
pub const MAX: u16 = 22;

fn binary(type_id: u16, title: &str, description: &str) -> NodeArchetype {
    NodeArchetype::new(type_id, title, [110.0, 60.0])
        .with_description(description)
        .with_hints(ConnectionsHint::NUMERIC)
        .with_type_inference(ScriptType::FLOAT, &[0, 1], &[2])
        .with_values(vec![Variant::Float(0.0), Variant::Float(0.0)])
        .with_elements(vec![
            ElementArchetype::input_with_value(0.0, "A", ScriptType::NULL, 0, 0),
            ElementArchetype::input_with_value(1.0, "B", ScriptType::NULL, 1, 1),
            ElementArchetype::output(0.0, "Result", ScriptType::NULL, 2),
        ])
}

/// Maps a vector type to its component type
pub fn vector_to_scalar(_b: &SurfaceBox, ty: &ScriptType) -> ScriptType {
    match ty.kind {
        VariantKind::Int2 | VariantKind::Int3 | VariantKind::Int4 => ScriptType::INT,
        VariantKind::Double2 | VariantKind::Double3 | VariantKind::Double4 => {
            ScriptType::of(VariantKind::Double)
        }
        kind if kind.is_vector() => ScriptType::FLOAT,
        _ => ty.clone(),
    }
}

/// The math group
pub fn group() -> GroupArchetype {
    GroupArchetype::new(MATH_GROUP_ID, "Math", [92, 146, 216])
        .with(binary(ADD, "Add", "Result is sum A and B"))
        .with(binary(SUBTRACT, "Subtract", "Result is difference A and B"))
        .with(binary(MULTIPLY, "Multiply", "Result is A times B"))
        .with(binary(DIVIDE, "Divide", "Result is A divided by B"))
        .with(binary(MIN, "Min", "Result is the smaller of A and B"))
        .with(binary(MAX, "Max", "Result is the larger of A and B"))
        .with(
            NodeArchetype::new(LENGTH, "Length", [110.0, 40.0])
                .with_description("Returns the length of A vector")
                .with_hints(ConnectionsHint::VECTOR)
                .with_type_inference(ScriptType::FLOAT3, &[0], &[1])
                .with_dependent_filter(vector_to_scalar)
                .with_elements(vec![
                    ElementArchetype::input(0.0, "Input", true, ScriptType::NULL, 0),
                    ElementArchetype::output(0.0, "Output", ScriptType::NULL, 1),
                ]),
        )
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::element::{BoxDirection, BoxId};

    #[test]
    fn test_vector_to_scalar() {
        let b = SurfaceBox::new(BoxId(1), BoxDirection::Output, ScriptType::NULL);
        assert_eq!(vector_to_scalar(&b, &ScriptType::FLOAT3), ScriptType::FLOAT);
        assert_eq!(vector_to_scalar(&b, &ScriptType::COLOR), ScriptType::FLOAT);
        assert_eq!(vector_to_scalar(&b, &ScriptType::of(VariantKind::Int3)), ScriptType::INT);
        assert_eq!(vector_to_scalar(&b, &ScriptType::FLOAT), ScriptType::FLOAT);
    }
}
