// SPDX-License-Identifier: MIT OR Apache-2.0
//! Editor utility nodes.

use super::TOOLS_GROUP_ID;
use crate::archetype::{ElementArchetype, GroupArchetype, NodeArchetype};
use crate::types::{ConnectionsHint, ScriptType, VariantKind};
use crate::variant::Variant;

/// Free-floating comment box
pub const COMMENT: u16 = 11;
/// Node owning a nested graph
pub const STATE_MACHINE: u16 = 18;
/// Pass-through connection waypoint
pub const REROUTE: u16 = 29;

/// The tools group
pub fn group() -> GroupArchetype {
    GroupArchetype::new(TOOLS_GROUP_ID, "Tools", [110, 110, 110])
        .with(
            NodeArchetype::new(COMMENT, "Comment", [400.0, 400.0])
                .with_description("Comments a group of nodes")
                .with_values(vec![
                    Variant::from("Comment"),
                    Variant::Color([1.0, 1.0, 1.0, 0.2]),
                ])
                .with_elements(vec![
                    ElementArchetype::text_box(0.0, 0.0, 390.0, 18.0, 0),
                    ElementArchetype::color_value(0.0, 1.0, 1),
                ]),
        )
        .with(
            NodeArchetype::new(STATE_MACHINE, "State Machine", [240.0, 60.0])
                .with_description("Nested graph of states and transitions")
                .with_sub_graph(0)
                .with_values(vec![Variant::Blob(Vec::new()), Variant::from("State Machine")])
                .with_elements(vec![
                    ElementArchetype::output(
                        0.0,
                        "Out",
                        ScriptType::named(VariantKind::Structure, "AnimGraphPose"),
                        0,
                    ),
                    ElementArchetype::text_box(0.0, 1.0, 140.0, 18.0, 1),
                ]),
        )
        .with(
            NodeArchetype::new(REROUTE, "Reroute", [16.0, 16.0])
                .with_description("Reroutes a connection")
                .with_hints(ConnectionsHint::ANYTHING)
                .with_elements(vec![
                    ElementArchetype::input(0.0, "", true, ScriptType::NULL, 0),
                    ElementArchetype::output(0.0, "", ScriptType::NULL, 1),
                ]),
        )
}
