// SPDX-License-Identifier: MIT OR Apache-2.0
//! Vector pack/unpack nodes.

use super::PACKING_GROUP_ID;
use crate::archetype::{ElementArchetype, GroupArchetype, NodeArchetype};
use crate::types::ScriptType;
use crate::variant::Variant;

/// Pack two floats into a Float2
pub const PACK_FLOAT2: u16 = 20;
/// Pack three floats into a Float3
pub const PACK_FLOAT3: u16 = 21;
/// Split a Float2 into components
pub const UNPACK_FLOAT2: u16 = 30;
/// Split a Float3 into components
pub const UNPACK_FLOAT3: u16 = 31;

const COMPONENTS: [&str; 3] = ["X", "Y", "Z"];

fn pack(type_id: u16, name: &str, ty: ScriptType) -> NodeArchetype {
    let n = ty.kind.components();
    let mut elements: Vec<ElementArchetype> = (0..n)
        .map(|i| ElementArchetype::input_with_value(i as f32, COMPONENTS[i], ScriptType::FLOAT, i as u8, i))
        .collect();
    elements.push(ElementArchetype::output(0.0, "Value", ty.clone(), n as u8));
    NodeArchetype::new(type_id, format!("Pack {name}"), [150.0, 20.0 + 20.0 * n as f32])
        .with_description(format!("Builds a {name} from its components"))
        .with_values(vec![Variant::Float(0.0); n])
        .with_elements(elements)
}

fn unpack(type_id: u16, name: &str, ty: ScriptType) -> NodeArchetype {
    let n = ty.kind.components();
    let mut elements = vec![ElementArchetype::input(0.0, "Value", true, ty.clone(), 0)];
    elements.extend(
        (0..n).map(|i| ElementArchetype::output(i as f32, COMPONENTS[i], ScriptType::FLOAT, i as u8 + 1)),
    );
    NodeArchetype::new(type_id, format!("Unpack {name}"), [150.0, 20.0 + 20.0 * n as f32])
        .with_description(format!("Breaks a {name} into its components"))
        .with_values(vec![Variant::default_for(&ty)])
        .with_elements(elements)
}

/// The packing group
pub fn group() -> GroupArchetype {
    GroupArchetype::new(PACKING_GROUP_ID, "Packing", [228, 168, 56])
        .with(pack(PACK_FLOAT2, "Float2", ScriptType::FLOAT2))
        .with(pack(PACK_FLOAT3, "Float3", ScriptType::FLOAT3))
        .with(unpack(UNPACK_FLOAT2, "Float2", ScriptType::FLOAT2))
        .with(unpack(UNPACK_FLOAT3, "Float3", ScriptType::FLOAT3))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::element::BoxId;

    #[test]
    fn test_pack_layout() {
        let arch = pack(PACK_FLOAT3, "Float3", ScriptType::FLOAT3);
        assert_eq!(arch.default_values.len(), 3);
        let output = arch.elements.last().unwrap();
        assert_eq!(output.box_id, BoxId(3));
        assert_eq!(output.connections_type, ScriptType::FLOAT3);

        let arch = unpack(UNPACK_FLOAT2, "Float2", ScriptType::FLOAT2);
        assert_eq!(arch.default_values, vec![Variant::Float2([0.0; 2])]);
        assert_eq!(arch.elements.len(), 3);
    }
}
