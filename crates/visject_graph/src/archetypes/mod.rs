// SPDX-License-Identifier: MIT OR Apache-2.0
//! Built-in node groups.
//!
//! Group and type ids are part of the saved format and must never change.

pub mod constants;
pub mod math;
pub mod packing;
pub mod tools;

use crate::archetype::GroupArchetype;

/// Constant value nodes
pub const CONSTANTS_GROUP_ID: u16 = 2;
/// Arithmetic nodes
pub const MATH_GROUP_ID: u16 = 3;
/// Vector pack/unpack nodes
pub const PACKING_GROUP_ID: u16 = 4;
/// Editor utility nodes
pub const TOOLS_GROUP_ID: u16 = 7;

/// Every built-in group
pub fn builtin_groups() -> Vec<GroupArchetype> {
    vec![
        constants::group(),
        math::group(),
        packing::group(),
        tools::group(),
    ]
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::element::ElementInstance;

    #[test]
    fn test_value_widgets_bind_existing_values() {
        for group in builtin_groups() {
            for arch in &group.archetypes {
                for element in &arch.elements {
                    if let Some(index) = element.value_index {
                        assert!(
                            index < arch.default_values.len(),
                            "{}/{} binds missing value {index}",
                            group.name,
                            arch.title
                        );
                    }
                }
            }
        }
    }

    #[test]
    fn test_box_ids_unique_per_node() {
        for group in builtin_groups() {
            for arch in &group.archetypes {
                let mut ids: Vec<u8> = arch
                    .elements
                    .iter()
                    .filter(|e| e.kind.is_box())
                    .map(|e| e.box_id.0)
                    .collect();
                let count = ids.len();
                ids.sort_unstable();
                ids.dedup();
                assert_eq!(ids.len(), count, "{}", arch.title);
            }
        }
    }

    #[test]
    fn test_inference_boxes_exist() {
        let factory = crate::factory::NodeFactory::with_builtin();
        for (_, group, arch) in factory.archetypes() {
            let node = crate::node::SurfaceNode::new(crate::node::NodeId(1), arch.clone(), group.clone());
            for id in arch.independent_boxes.iter().chain(&arch.dependent_boxes) {
                assert!(node.get_box(*id).is_some(), "{} lacks box {id}", arch.title);
            }
            assert!(node
                .elements
                .iter()
                .all(|e| e.kind.is_box() == matches!(e.instance, ElementInstance::Box(_))));
        }
    }
}
