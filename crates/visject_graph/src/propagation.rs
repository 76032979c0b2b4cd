// SPDX-License-Identifier: MIT OR Apache-2.0
//! Box type propagation.
//!
//! Nodes that declare independent boxes infer one type from their first
//! connected independent box and hand it to their dependent boxes. Nodes
//! whose untyped boxes rely on connection hints mirror the type of their
//! first live connection instead. Whenever a box type changes, the nodes
//! on the other end of its connections are updated too.

use crate::context::SurfaceContext;
use crate::element::{BoxId, BoxRef};
use crate::node::NodeId;
use crate::types::ScriptType;
use std::collections::HashSet;

/// Recursion guard for one propagation pass.
///
/// A node already on the propagation stack is not re-entered, so feedback
/// loops through reroute nodes terminate.
#[derive(Debug, Default)]
pub struct TypePropagation {
    active: HashSet<NodeId>,
}

impl TypePropagation {
    /// Create an empty guard
    pub fn new() -> Self {
        Self::default()
    }

    /// Whether a node is currently propagating
    pub fn is_active(&self, id: NodeId) -> bool {
        self.active.contains(&id)
    }

    /// Update one node and everything its changes reach
    pub fn run(&mut self, ctx: &mut SurfaceContext, id: NodeId) {
        if !self.active.insert(id) {
            return;
        }
        let changed = update_node(ctx, id);
        for peer in changed {
            self.run(ctx, peer);
        }
        self.active.remove(&id);
    }
}

impl SurfaceContext {
    /// Recompute the box types of one node
    pub fn update_boxes_types(&mut self, id: NodeId) {
        TypePropagation::new().run(self, id);
    }

    /// Recompute the box types of every node
    pub fn update_all_boxes_types(&mut self) {
        for id in self.node_ids() {
            self.update_boxes_types(id);
        }
    }
}

/// Type of the first live connection of a box
fn connected_type(ctx: &SurfaceContext, at: BoxRef) -> Option<ScriptType> {
    let b = ctx.box_at(at)?;
    b.connections
        .iter()
        .filter_map(|peer| ctx.box_at(*peer))
        .map(|peer| peer.current_type.clone())
        .next()
}

/// Apply new box types; returns the peer nodes of boxes that changed
fn apply(ctx: &mut SurfaceContext, id: NodeId, updates: Vec<(BoxId, ScriptType)>) -> Vec<NodeId> {
    let mut peers = Vec::new();
    let Some(node) = ctx.find_node_mut(id) else {
        return peers;
    };
    for (box_id, ty) in updates {
        if let Some(b) = node.get_box_mut(box_id) {
            if b.current_type != ty {
                tracing::trace!("Box {}:{} type {} -> {}", id, box_id, b.current_type, ty);
                b.current_type = ty;
                peers.extend(b.connections.iter().map(|c| c.node));
            }
        }
    }
    peers.dedup();
    peers
}

fn update_node(ctx: &mut SurfaceContext, id: NodeId) -> Vec<NodeId> {
    let Some(node) = ctx.find_node(id) else {
        return Vec::new();
    };
    let archetype = node.archetype().clone();
    let mut updates = Vec::new();

    if archetype.has_type_inference() {
        let mut inferred = archetype.default_type.clone();
        for &box_id in &archetype.independent_boxes {
            let at = BoxRef { node: id, box_id };
            match connected_type(ctx, at) {
                Some(ty) if !ty.is_null() => {
                    inferred = ty;
                    break;
                }
                _ => {}
            }
        }

        for &box_id in &archetype.dependent_boxes {
            let Some(b) = node.get_box(box_id) else {
                continue;
            };
            let ty = match archetype.dependent_box_filter {
                Some(filter) => filter(b, &inferred),
                None => inferred.clone(),
            };
            updates.push((box_id, ty));
        }
        for &box_id in &archetype.independent_boxes {
            if node.get_box(box_id).is_some() {
                updates.push((box_id, inferred.clone()));
            }
        }
    } else if node.boxes().any(|b| b.uses_hints()) {
        let hinted: Vec<(BoxId, bool)> = node
            .boxes()
            .filter(|b| b.uses_hints())
            .map(|b| (b.id, b.is_input()))
            .collect();
        // Inputs first, so a chain of pass-through nodes follows its source
        let mirrored = hinted
            .iter()
            .filter(|(_, is_input)| *is_input)
            .chain(hinted.iter().filter(|(_, is_input)| !*is_input))
            .filter_map(|(box_id, _)| connected_type(ctx, BoxRef { node: id, box_id: *box_id }))
            .find(|ty| !ty.is_null())
            .unwrap_or(ScriptType::NULL);
        updates.extend(hinted.into_iter().map(|(box_id, _)| (box_id, mirrored.clone())));
    }

    if updates.is_empty() {
        return Vec::new();
    }
    apply(ctx, id, updates)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::archetypes::{constants, math, tools, CONSTANTS_GROUP_ID, MATH_GROUP_ID, TOOLS_GROUP_ID};
    use crate::factory::NodeFactory;

    fn box_types(ctx: &SurfaceContext) -> Vec<(NodeId, BoxId, ScriptType)> {
        ctx.nodes()
            .flat_map(|n| n.boxes().map(move |b| (n.id, b.id, b.current_type.clone())))
            .collect()
    }

    #[test]
    fn test_dependent_boxes_follow_first_independent_box() {
        let factory = NodeFactory::with_builtin();
        let mut ctx = SurfaceContext::new();
        let v3 = ctx.spawn_node(&factory, CONSTANTS_GROUP_ID, constants::FLOAT3, [0.0, 0.0]).unwrap();
        let f = ctx.spawn_node(&factory, CONSTANTS_GROUP_ID, constants::FLOAT, [0.0, 0.0]).unwrap();
        let add = ctx.spawn_node(&factory, MATH_GROUP_ID, math::ADD, [0.0, 0.0]).unwrap();

        ctx.connect(BoxRef::new(f, 0), BoxRef::new(add, 1)).unwrap();
        assert_eq!(ctx.box_at(BoxRef::new(add, 2)).unwrap().current_type, ScriptType::FLOAT);

        // Earlier-declared independent box wins
        ctx.connect(BoxRef::new(v3, 0), BoxRef::new(add, 0)).unwrap();
        assert_eq!(ctx.box_at(BoxRef::new(add, 2)).unwrap().current_type, ScriptType::FLOAT3);
        assert_eq!(ctx.box_at(BoxRef::new(add, 1)).unwrap().current_type, ScriptType::FLOAT3);

        ctx.disconnect_box(BoxRef::new(add, 0));
        assert_eq!(ctx.box_at(BoxRef::new(add, 2)).unwrap().current_type, ScriptType::FLOAT);
    }

    #[test]
    fn test_dependent_filter() {
        let factory = NodeFactory::with_builtin();
        let mut ctx = SurfaceContext::new();
        let v3 = ctx.spawn_node(&factory, CONSTANTS_GROUP_ID, constants::FLOAT3, [0.0, 0.0]).unwrap();
        let length = ctx.spawn_node(&factory, MATH_GROUP_ID, math::LENGTH, [0.0, 0.0]).unwrap();
        ctx.connect(BoxRef::new(v3, 0), BoxRef::new(length, 0)).unwrap();
        assert_eq!(ctx.box_at(BoxRef::new(length, 0)).unwrap().current_type, ScriptType::FLOAT3);
        assert_eq!(ctx.box_at(BoxRef::new(length, 1)).unwrap().current_type, ScriptType::FLOAT);
    }

    #[test]
    fn test_reroute_mirrors_and_feedback_terminates() {
        let factory = NodeFactory::with_builtin();
        let mut ctx = SurfaceContext::new();
        let c2 = ctx.spawn_node(&factory, CONSTANTS_GROUP_ID, constants::FLOAT2, [0.0, 0.0]).unwrap();
        let c3 = ctx.spawn_node(&factory, CONSTANTS_GROUP_ID, constants::FLOAT3, [0.0, 0.0]).unwrap();
        let add = ctx.spawn_node(&factory, MATH_GROUP_ID, math::ADD, [0.0, 0.0]).unwrap();
        let r1 = ctx.spawn_node(&factory, TOOLS_GROUP_ID, tools::REROUTE, [0.0, 0.0]).unwrap();
        let r2 = ctx.spawn_node(&factory, TOOLS_GROUP_ID, tools::REROUTE, [0.0, 0.0]).unwrap();

        // add -> r1 -> r2 -> add forms a loop
        ctx.connect(BoxRef::new(c2, 0), BoxRef::new(add, 0)).unwrap();
        ctx.connect(BoxRef::new(add, 2), BoxRef::new(r1, 0)).unwrap();
        ctx.connect(BoxRef::new(r1, 1), BoxRef::new(r2, 0)).unwrap();
        ctx.connect(BoxRef::new(r2, 1), BoxRef::new(add, 1)).unwrap();
        for id in [r1, r2] {
            assert_eq!(ctx.box_at(BoxRef::new(id, 0)).unwrap().current_type, ScriptType::FLOAT2);
            assert_eq!(ctx.box_at(BoxRef::new(id, 1)).unwrap().current_type, ScriptType::FLOAT2);
        }

        // Replacing the source re-types the whole loop
        ctx.connect(BoxRef::new(c3, 0), BoxRef::new(add, 0)).unwrap();
        for id in [r1, r2] {
            assert_eq!(ctx.box_at(BoxRef::new(id, 1)).unwrap().current_type, ScriptType::FLOAT3);
        }
        assert_eq!(ctx.box_at(BoxRef::new(add, 2)).unwrap().current_type, ScriptType::FLOAT3);
        assert_eq!(ctx.box_at(BoxRef::new(add, 1)).unwrap().current_type, ScriptType::FLOAT3);
    }

    #[test]
    fn test_update_is_idempotent() {
        let factory = NodeFactory::with_builtin();
        let mut ctx = SurfaceContext::new();
        let c = ctx.spawn_node(&factory, CONSTANTS_GROUP_ID, constants::COLOR, [0.0, 0.0]).unwrap();
        let r = ctx.spawn_node(&factory, TOOLS_GROUP_ID, tools::REROUTE, [0.0, 0.0]).unwrap();
        let mul = ctx.spawn_node(&factory, MATH_GROUP_ID, math::MULTIPLY, [0.0, 0.0]).unwrap();
        ctx.connect(BoxRef::new(c, 0), BoxRef::new(r, 0)).unwrap();
        ctx.connect(BoxRef::new(r, 1), BoxRef::new(mul, 0)).unwrap();

        ctx.update_all_boxes_types();
        let first = box_types(&ctx);
        ctx.update_all_boxes_types();
        assert_eq!(first, box_types(&ctx));
    }

    #[test]
    fn test_unconnected_reroute_resets() {
        let factory = NodeFactory::with_builtin();
        let mut ctx = SurfaceContext::new();
        let c = ctx.spawn_node(&factory, CONSTANTS_GROUP_ID, constants::BOOL, [0.0, 0.0]).unwrap();
        let r = ctx.spawn_node(&factory, TOOLS_GROUP_ID, tools::REROUTE, [0.0, 0.0]).unwrap();
        ctx.connect(BoxRef::new(c, 0), BoxRef::new(r, 0)).unwrap();
        assert_eq!(ctx.box_at(BoxRef::new(r, 1)).unwrap().current_type, ScriptType::BOOL);
        ctx.disconnect_node(c);
        assert!(ctx.box_at(BoxRef::new(r, 1)).unwrap().current_type.is_null());
    }
}
