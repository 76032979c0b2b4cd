// SPDX-License-Identifier: MIT OR Apache-2.0
//! Depth-first traversal over box connections.

use crate::context::SurfaceContext;
use crate::node::NodeId;
use std::collections::HashMap;

/// Edge direction followed by a traversal
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TraversalDirection {
    /// From outputs to the nodes they feed
    Forward,
    /// From inputs to the nodes feeding them
    Backward,
}

/// Error when a traversal closes a cycle
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("Graph contains a cycle through node {node}")]
pub struct CycleError {
    /// Node reached again while still on the traversal stack
    pub node: NodeId,
}

#[derive(Clone, Copy, PartialEq, Eq)]
enum Mark {
    Active,
    Done,
}

impl SurfaceContext {
    /// Nodes adjacent to `id` in the given direction, in box order
    pub fn neighbors(&self, id: NodeId, direction: TraversalDirection) -> Vec<NodeId> {
        let Some(node) = self.find_node(id) else {
            return Vec::new();
        };
        let mut out = Vec::new();
        for b in node.boxes() {
            let follow = match direction {
                TraversalDirection::Forward => b.is_output(),
                TraversalDirection::Backward => b.is_input(),
            };
            if !follow {
                continue;
            }
            for peer in &b.connections {
                if !out.contains(&peer.node) && self.contains_node(peer.node) {
                    out.push(peer.node);
                }
            }
        }
        out
    }

    /// Deterministic depth-first traversal from `roots`, returning nodes in post-order.
    ///
    /// Runs on an explicit stack and always terminates. When `report_cycles`
    /// is set, reaching a node that is still on the stack fails with
    /// [`CycleError`]; otherwise the back edge is skipped.
    pub fn depth_first(
        &self,
        roots: &[NodeId],
        direction: TraversalDirection,
        report_cycles: bool,
    ) -> Result<Vec<NodeId>, CycleError> {
        let mut marks: HashMap<NodeId, Mark> = HashMap::new();
        let mut order = Vec::new();

        for &root in roots {
            if marks.contains_key(&root) || !self.contains_node(root) {
                continue;
            }
            marks.insert(root, Mark::Active);
            let mut stack = vec![(root, self.neighbors(root, direction), 0usize)];

            while let Some((node, next, cursor)) = stack.last_mut() {
                if let Some(&peer) = next.get(*cursor) {
                    *cursor += 1;
                    match marks.get(&peer) {
                        None => {
                            marks.insert(peer, Mark::Active);
                            let peers = self.neighbors(peer, direction);
                            stack.push((peer, peers, 0));
                        }
                        Some(Mark::Active) if report_cycles => {
                            return Err(CycleError { node: peer });
                        }
                        Some(_) => {}
                    }
                } else {
                    let done = *node;
                    marks.insert(done, Mark::Done);
                    order.push(done);
                    stack.pop();
                }
            }
        }
        Ok(order)
    }

    /// Nodes ordered so that every node comes after the nodes feeding it
    pub fn topological_order(&self) -> Result<Vec<NodeId>, CycleError> {
        self.depth_first(&self.node_ids(), TraversalDirection::Backward, true)
    }

    /// Whether the connection graph contains a cycle
    pub fn has_cycle(&self) -> bool {
        self.topological_order().is_err()
    }
}
