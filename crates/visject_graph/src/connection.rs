// SPDX-License-Identifier: MIT OR Apache-2.0
//! Connections between boxes.
//!
//! Connections are stored on both boxes. Every mutation here keeps the two
//! lists in step and re-runs type propagation on the nodes it touched.

use crate::context::{ContextEvent, SurfaceContext};
use crate::element::{can_connect_boxes, BoxRef, SurfaceBox};
use crate::node::NodeId;
use crate::types::ScriptType;
use serde::{Deserialize, Serialize};

/// A connection between an output box and an input box
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Connection {
    /// Source (output) box
    pub output: BoxRef,
    /// Target (input) box
    pub input: BoxRef,
}

impl Connection {
    /// Check if this connection involves a node
    pub fn involves_node(&self, node: NodeId) -> bool {
        self.output.node == node || self.input.node == node
    }
}

/// Error when creating a connection
#[derive(Debug, thiserror::Error)]
pub enum ConnectionError {
    /// Node not found
    #[error("Node not found: {0}")]
    NodeNotFound(NodeId),

    /// Box not found
    #[error("Box not found: {0}")]
    BoxNotFound(BoxRef),

    /// Both boxes have the same direction
    #[error("Boxes {0} and {1} have the same direction")]
    SameDirection(BoxRef, BoxRef),

    /// Input does not accept the output's type
    #[error("Cannot connect {from} to {to}")]
    IncompatibleTypes {
        /// Output type
        from: ScriptType,
        /// Input type
        to: ScriptType,
    },

    /// Both boxes belong to the same node
    #[error("Cannot connect node {0} to itself")]
    SelfConnection(NodeId),

    /// Graph is read-only
    #[error("Graph is read-only")]
    ReadOnly,
}

impl SurfaceContext {
    /// Resolve a box address
    pub fn box_at(&self, at: BoxRef) -> Option<&SurfaceBox> {
        self.find_node(at.node)?.get_box(at.box_id)
    }

    /// Resolve a box address
    pub fn box_at_mut(&mut self, at: BoxRef) -> Option<&mut SurfaceBox> {
        self.find_node_mut(at.node)?.get_box_mut(at.box_id)
    }

    fn resolve(&self, at: BoxRef) -> Result<&SurfaceBox, ConnectionError> {
        let node = self
            .find_node(at.node)
            .ok_or(ConnectionError::NodeNotFound(at.node))?;
        node.get_box(at.box_id).ok_or(ConnectionError::BoxNotFound(at))
    }

    /// Check whether `a` and `b` may be connected, returning `(output, input)`
    pub fn check_connection(&self, a: BoxRef, b: BoxRef) -> Result<(BoxRef, BoxRef), ConnectionError> {
        let box_a = self.resolve(a)?;
        let box_b = self.resolve(b)?;
        if a.node == b.node {
            return Err(ConnectionError::SelfConnection(a.node));
        }
        if box_a.direction == box_b.direction {
            return Err(ConnectionError::SameDirection(a, b));
        }
        if !can_connect_boxes(box_a, box_b) {
            let (output, input) = if box_a.is_output() { (box_a, box_b) } else { (box_b, box_a) };
            return Err(ConnectionError::IncompatibleTypes {
                from: output.current_type.clone(),
                to: input.current_type.clone(),
            });
        }
        Ok(if box_a.is_output() { (a, b) } else { (b, a) })
    }

    /// Whether `a` and `b` may be connected
    pub fn can_connect(&self, a: BoxRef, b: BoxRef) -> bool {
        self.check_connection(a, b).is_ok()
    }

    /// Whether `a` and `b` are connected
    pub fn are_connected(&self, a: BoxRef, b: BoxRef) -> bool {
        self.box_at(a).is_some_and(|x| x.is_connected_to(b))
    }

    /// Connect two boxes in either order.
    ///
    /// Single boxes drop their existing connection first. Connecting boxes
    /// that are already connected is a no-op.
    pub fn connect(&mut self, a: BoxRef, b: BoxRef) -> Result<Connection, ConnectionError> {
        if self.is_read_only() {
            return Err(ConnectionError::ReadOnly);
        }
        let (output, input) = self.check_connection(a, b)?;
        let connection = Connection { output, input };
        if self.are_connected(output, input) {
            return Ok(connection);
        }

        let mut touched = vec![output.node, input.node];
        for end in [output, input] {
            if self.box_at(end).is_some_and(|x| x.single && x.has_any_connection()) {
                touched.extend(self.break_box(end).into_iter().map(|peer| peer.node));
            }
        }

        self.link(output, input);
        self.push_event(ContextEvent::Connected(output, input));
        self.mark_as_modified(true);
        self.update_nodes_types(&touched);
        Ok(connection)
    }

    /// Break a single connection; returns whether it existed
    pub fn disconnect(&mut self, a: BoxRef, b: BoxRef) -> bool {
        if !self.unlink(a, b) {
            return false;
        }
        let (output, input) = if self.box_at(a).is_some_and(SurfaceBox::is_output) {
            (a, b)
        } else {
            (b, a)
        };
        self.push_event(ContextEvent::Disconnected(output, input));
        self.mark_as_modified(true);
        self.update_nodes_types(&[a.node, b.node]);
        true
    }

    /// Break every connection of a box; returns the former peers
    pub fn disconnect_box(&mut self, at: BoxRef) -> Vec<BoxRef> {
        let peers = self.break_box(at);
        if !peers.is_empty() {
            self.mark_as_modified(true);
            let mut touched: Vec<NodeId> = peers.iter().map(|p| p.node).collect();
            touched.push(at.node);
            self.update_nodes_types(&touched);
        }
        peers
    }

    /// Break every connection of a node; returns the broken connections
    pub fn disconnect_node(&mut self, id: NodeId) -> Vec<Connection> {
        let Some(node) = self.find_node(id) else {
            return Vec::new();
        };
        let boxes: Vec<(BoxRef, bool)> = node
            .boxes()
            .map(|b| (BoxRef { node: id, box_id: b.id }, b.is_output()))
            .collect();

        let mut broken = Vec::new();
        let mut touched = Vec::new();
        for (at, is_output) in boxes {
            for peer in self.break_box(at) {
                touched.push(peer.node);
                broken.push(if is_output {
                    Connection { output: at, input: peer }
                } else {
                    Connection { output: peer, input: at }
                });
            }
        }
        if !broken.is_empty() {
            self.mark_as_modified(true);
            self.update_nodes_types(&touched);
        }
        broken
    }

    /// Every connection, listed once from its output side, in node order
    pub fn connections(&self) -> Vec<Connection> {
        let mut out = Vec::new();
        for node in self.nodes() {
            for b in node.boxes().filter(|b| b.is_output()) {
                let output = BoxRef { node: node.id, box_id: b.id };
                out.extend(b.connections.iter().map(|&input| Connection { output, input }));
            }
        }
        out
    }

    /// Connections touching a node
    pub fn connections_for_node(&self, id: NodeId) -> Vec<Connection> {
        let Some(node) = self.find_node(id) else {
            return Vec::new();
        };
        let mut out = Vec::new();
        for b in node.boxes() {
            let here = BoxRef { node: id, box_id: b.id };
            out.extend(b.connections.iter().map(|&peer| {
                if b.is_output() {
                    Connection { output: here, input: peer }
                } else {
                    Connection { output: peer, input: here }
                }
            }));
        }
        out
    }

    /// Replace every connection touching `nodes` with `connections`.
    ///
    /// Links are re-created without type checks, so a previously recorded
    /// state comes back exactly. Links whose boxes no longer exist are
    /// skipped. Box types are propagated once at the end.
    pub fn restore_connections(&mut self, nodes: &[NodeId], connections: &[Connection]) {
        let mut touched = nodes.to_vec();
        for &id in nodes {
            let boxes: Vec<BoxRef> = match self.find_node(id) {
                Some(node) => node.boxes().map(|b| BoxRef { node: id, box_id: b.id }).collect(),
                None => continue,
            };
            for at in boxes {
                touched.extend(self.break_box(at).into_iter().map(|peer| peer.node));
            }
        }
        for c in connections {
            if self.box_at(c.output).is_none() || self.box_at(c.input).is_none() {
                tracing::warn!("Skipping connection {} -> {}: box not found", c.output, c.input);
                continue;
            }
            self.link(c.output, c.input);
            self.push_event(ContextEvent::Connected(c.output, c.input));
            touched.extend([c.output.node, c.input.node]);
        }
        self.mark_as_modified(true);
        self.update_nodes_types(&touched);
    }

    /// Add `b` to `a`'s list and `a` to `b`'s list, without checks or propagation
    pub(crate) fn link(&mut self, a: BoxRef, b: BoxRef) {
        if let Some(x) = self.box_at_mut(a) {
            if !x.connections.contains(&b) {
                x.connections.push(b);
            }
        }
        if let Some(y) = self.box_at_mut(b) {
            if !y.connections.contains(&a) {
                y.connections.push(a);
            }
        }
    }

    fn unlink(&mut self, a: BoxRef, b: BoxRef) -> bool {
        let mut found = false;
        if let Some(x) = self.box_at_mut(a) {
            let before = x.connections.len();
            x.connections.retain(|c| *c != b);
            found |= x.connections.len() != before;
        }
        if let Some(y) = self.box_at_mut(b) {
            let before = y.connections.len();
            y.connections.retain(|c| *c != a);
            found |= y.connections.len() != before;
        }
        found
    }

    /// Clear a box's list and remove it from every peer, raising events
    fn break_box(&mut self, at: BoxRef) -> Vec<BoxRef> {
        let Some(b) = self.box_at_mut(at) else {
            return Vec::new();
        };
        let is_output = b.is_output();
        let peers = std::mem::take(&mut b.connections);
        for &peer in &peers {
            if let Some(p) = self.box_at_mut(peer) {
                p.connections.retain(|c| *c != at);
            }
            let event = if is_output {
                ContextEvent::Disconnected(at, peer)
            } else {
                ContextEvent::Disconnected(peer, at)
            };
            self.push_event(event);
        }
        peers
    }

    fn update_nodes_types(&mut self, nodes: &[NodeId]) {
        let mut seen = Vec::with_capacity(nodes.len());
        for &id in nodes {
            if !seen.contains(&id) {
                seen.push(id);
                self.update_boxes_types(id);
            }
        }
    }
}
