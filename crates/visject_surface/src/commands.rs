// SPDX-License-Identifier: MIT OR Apache-2.0
//! Recorded graph state for undo/redo.
//!
//! A [`GraphPatch`] captures the part of a graph an edit touches: the
//! affected nodes (or their absence), every connection touching them and,
//! optionally, the parameter list. Applying the patch puts that part of
//! the graph back exactly as captured.

use crate::surface::SurfaceError;
use serde::{Deserialize, Serialize};
use visject_graph::{
    BoxDirection, BoxId, Connection, NodeFactory, NodeId, ScriptType, SurfaceBox, SurfaceContext, SurfaceNode,
    SurfaceParameter, Variant,
};

/// Recorded box layout, used to rebuild placeholder nodes
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BoxSnapshot {
    /// Box id
    pub id: BoxId,
    /// Box direction
    pub direction: BoxDirection,
    /// Declared type
    pub declared_type: ScriptType,
}

/// Recorded node state
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NodeSnapshot {
    /// Node id
    pub id: NodeId,
    /// Group id
    pub group_id: u16,
    /// Type id within the group
    pub type_id: u16,
    /// Values
    pub values: Vec<Variant>,
    /// Top-left corner
    pub position: [f32; 2],
    /// Size
    pub size: [f32; 2],
    /// Boxes, for node types missing from the registry
    pub boxes: Vec<BoxSnapshot>,
}

impl NodeSnapshot {
    /// Record a node
    pub fn capture(node: &SurfaceNode) -> Self {
        Self {
            id: node.id,
            group_id: node.group_id(),
            type_id: node.type_id(),
            values: node.values().to_vec(),
            position: node.position,
            size: node.size(),
            boxes: node
                .boxes()
                .map(|b| BoxSnapshot {
                    id: b.id,
                    direction: b.direction,
                    declared_type: b.default_type.clone(),
                })
                .collect(),
        }
    }

    /// Rebuild the node, falling back to a placeholder for unknown types
    pub fn instantiate(&self, factory: &NodeFactory) -> SurfaceNode {
        let mut node = match factory.create_node(self.id, self.group_id, self.type_id) {
            Some(node) => node,
            None => {
                let boxes = self
                    .boxes
                    .iter()
                    .map(|b| SurfaceBox::new(b.id, b.direction, b.declared_type.clone()))
                    .collect();
                SurfaceNode::missing(self.id, self.group_id, self.type_id, self.values.clone(), boxes)
            }
        };
        node.position = self.position;
        node.resize(self.size[0], self.size[1]);
        node
    }
}

/// Recorded state of part of one graph scope
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct GraphPatch {
    /// Path of owning nodes from the root to the edited scope
    pub path: Vec<NodeId>,
    /// Affected nodes; `None` records that the node did not exist
    pub nodes: Vec<(NodeId, Option<NodeSnapshot>)>,
    /// Every connection touching an existing affected node
    pub connections: Vec<Connection>,
    /// Parameter list, when the edit touches parameters
    pub parameters: Option<Vec<SurfaceParameter>>,
}

impl GraphPatch {
    /// Record `nodes` of `ctx`.
    ///
    /// An edited open sub-graph is encoded into its owner's recorded
    /// values, so removing the owner does not lose it.
    pub fn capture(ctx: &SurfaceContext, path: &[NodeId], nodes: &[NodeId]) -> Result<Self, SurfaceError> {
        let mut patch = Self {
            path: path.to_vec(),
            ..Self::default()
        };
        for &id in nodes {
            if patch.nodes.iter().any(|(n, _)| *n == id) {
                continue;
            }
            let snapshot = match (ctx.find_node(id), ctx.values_with_sub_graph(id)?) {
                (Some(node), Some(values)) => Some(NodeSnapshot {
                    values,
                    ..NodeSnapshot::capture(node)
                }),
                _ => None,
            };
            if snapshot.is_some() {
                for c in ctx.connections_for_node(id) {
                    if !patch.connections.contains(&c) {
                        patch.connections.push(c);
                    }
                }
            }
            patch.nodes.push((id, snapshot));
        }
        Ok(patch)
    }

    /// Also record the parameter list
    pub fn with_parameters(mut self, ctx: &SurfaceContext) -> Self {
        self.parameters = Some(ctx.parameters().to_vec());
        self
    }

    /// Ids of the recorded nodes
    pub fn node_ids(&self) -> Vec<NodeId> {
        self.nodes.iter().map(|(id, _)| *id).collect()
    }

    /// Put the recorded state back into `ctx`
    pub fn apply(&self, ctx: &mut SurfaceContext, factory: &NodeFactory) -> Result<(), SurfaceError> {
        if let Some(parameters) = &self.parameters {
            let current: Vec<_> = ctx.parameters().iter().map(|p| p.id).collect();
            for id in current {
                ctx.remove_parameter(id);
            }
            for parameter in parameters {
                ctx.add_parameter(parameter.clone())?;
            }
        }

        let mut present = Vec::new();
        for (id, snapshot) in &self.nodes {
            let Some(snapshot) = snapshot else {
                ctx.remove_node(*id);
                continue;
            };
            let same_type = ctx
                .find_node(*id)
                .is_some_and(|node| node.group_id() == snapshot.group_id && node.type_id() == snapshot.type_id);
            match ctx.values_with_sub_graph(*id)? {
                Some(values) if same_type => {
                    ctx.move_node(*id, snapshot.position);
                    ctx.resize_node(*id, snapshot.size);
                    if values != snapshot.values {
                        // The restored blob replaces whatever sub-graph is open
                        ctx.close_child(*id);
                        ctx.set_node_values(*id, snapshot.values.clone())?;
                    }
                }
                _ => {
                    ctx.remove_node(*id);
                    let mut node = snapshot.instantiate(factory);
                    if !node.is_missing() {
                        node.set_values(snapshot.values.clone());
                    }
                    ctx.add_node(node)?;
                }
            }
            present.push(*id);
        }

        ctx.restore_connections(&present, &self.connections);
        Ok(())
    }
}
