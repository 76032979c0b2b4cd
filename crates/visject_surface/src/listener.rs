// SPDX-License-Identifier: MIT OR Apache-2.0
//! Change notifications for surface observers.

use visject_graph::{BoxRef, NodeId};

/// Observer of surface edits.
///
/// Every callback has an empty default so observers implement only what
/// they need. Callbacks run after the edit is applied.
pub trait SurfaceListener {
    /// A node was added
    fn node_spawned(&mut self, _node: NodeId) {}

    /// A node was removed
    fn node_deleted(&mut self, _node: NodeId) {}

    /// A node's values changed
    fn values_edited(&mut self, _node: NodeId) {}

    /// An output was connected to an input
    fn connected(&mut self, _output: BoxRef, _input: BoxRef) {}

    /// An output was disconnected from an input
    fn disconnected(&mut self, _output: BoxRef, _input: BoxRef) {}

    /// The surface was edited; `graph_edited` is false for cosmetic changes
    fn edited(&mut self, _graph_edited: bool) {}
}

/// Listener that records every notification, for tests and tooling
#[derive(Debug, Clone, Default, PartialEq)]
pub struct RecordingListener {
    /// Notifications in arrival order
    pub events: Vec<SurfaceNotification>,
}

/// A recorded notification
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum SurfaceNotification {
    /// See [`SurfaceListener::node_spawned`]
    Spawned(NodeId),
    /// See [`SurfaceListener::node_deleted`]
    Deleted(NodeId),
    /// See [`SurfaceListener::values_edited`]
    ValuesEdited(NodeId),
    /// See [`SurfaceListener::connected`]
    Connected(BoxRef, BoxRef),
    /// See [`SurfaceListener::disconnected`]
    Disconnected(BoxRef, BoxRef),
    /// See [`SurfaceListener::edited`]
    Edited(bool),
}

impl SurfaceListener for RecordingListener {
    fn node_spawned(&mut self, node: NodeId) {
        self.events.push(SurfaceNotification::Spawned(node));
    }

    fn node_deleted(&mut self, node: NodeId) {
        self.events.push(SurfaceNotification::Deleted(node));
    }

    fn values_edited(&mut self, node: NodeId) {
        self.events.push(SurfaceNotification::ValuesEdited(node));
    }

    fn connected(&mut self, output: BoxRef, input: BoxRef) {
        self.events.push(SurfaceNotification::Connected(output, input));
    }

    fn disconnected(&mut self, output: BoxRef, input: BoxRef) {
        self.events.push(SurfaceNotification::Disconnected(output, input));
    }

    fn edited(&mut self, graph_edited: bool) {
        self.events.push(SurfaceNotification::Edited(graph_edited));
    }
}
