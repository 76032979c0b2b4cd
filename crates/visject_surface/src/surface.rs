// SPDX-License-Identifier: MIT OR Apache-2.0
//! Surface controller.
//!
//! [`VisjectSurface`] is the single entry point collaborators use to edit a
//! graph. It owns the root context, the node factory and the undo history,
//! and it is the only place that records undo entries: every edit captures a
//! [`GraphPatch`] of the affected nodes before and after running, and undo
//! re-applies the recorded state.
//!
//! Edits always target the *current* scope, the context reached by
//! following the open sub-graph path from the root.

use crate::commands::GraphPatch;
use crate::history::{History, HistoryError, Snapshot};
use crate::listener::SurfaceListener;
use crate::settings::SurfaceSettings;
use thiserror::Error;
use uuid::Uuid;
use visject_graph::layout::{self, DistributeAxis};
use visject_graph::{
    codec, BoxRef, Connection, ConnectionError, ContextError, ContextEvent, FormatError, GroupArchetype,
    NodeAlignment, NodeArchetype, NodeFactory, NodeId, NodeMove, SurfaceContext, SurfaceParameter, Variant,
};

/// Decides whether a node type may be spawned on this surface
pub type SpawnPredicate = Box<dyn Fn(&GroupArchetype, &NodeArchetype) -> bool>;

/// Surface errors
#[derive(Debug, Error)]
pub enum SurfaceError {
    /// History error
    #[error(transparent)]
    History(#[from] HistoryError),

    /// Graph error
    #[error(transparent)]
    Context(#[from] ContextError),

    /// Connection rejected
    #[error(transparent)]
    Connection(#[from] ConnectionError),

    /// Encoding or decoding failed
    #[error(transparent)]
    Format(#[from] FormatError),

    /// Node type is not registered
    #[error("Unknown node type {group_id}:{type_id}")]
    UnknownType {
        /// Group id
        group_id: u16,
        /// Type id
        type_id: u16,
    },

    /// Spawn predicate rejected the node type
    #[error("Node type {group_id}:{type_id} cannot be spawned here")]
    SpawnRejected {
        /// Group id
        group_id: u16,
        /// Type id
        type_id: u16,
    },

    /// Surface is read-only
    #[error("Surface is read-only")]
    ReadOnly,

    /// Node not found in the current scope
    #[error("Node not found: {0}")]
    NodeNotFound(NodeId),

    /// Parameter not found in the current scope
    #[error("Parameter not found: {0}")]
    ParameterNotFound(Uuid),

    /// The open sub-graph path no longer resolves
    #[error("Sub-graph is no longer open")]
    SubGraphClosed,
}

/// Result type for surface operations
pub type Result<T> = std::result::Result<T, SurfaceError>;

/// Graph editing controller
pub struct VisjectSurface {
    root: SurfaceContext,
    factory: NodeFactory,
    settings: SurfaceSettings,
    history: History,
    listeners: Vec<Box<dyn SurfaceListener>>,
    spawn_predicate: Option<SpawnPredicate>,
    path: Vec<NodeId>,
}

impl VisjectSurface {
    /// Create a surface editing an empty graph
    pub fn new(factory: NodeFactory, settings: SurfaceSettings) -> Self {
        Self::with_context(SurfaceContext::new(), factory, settings)
    }

    /// Create a surface editing `context`
    pub fn with_context(mut context: SurfaceContext, factory: NodeFactory, settings: SurfaceSettings) -> Self {
        context.set_read_only(settings.read_only);
        Self {
            root: context,
            factory,
            history: History::with_max_depth(settings.undo_depth),
            settings,
            listeners: Vec::new(),
            spawn_predicate: None,
            path: Vec::new(),
        }
    }

    /// Root graph
    pub fn root(&self) -> &SurfaceContext {
        &self.root
    }

    /// Graph currently being edited
    pub fn context(&self) -> &SurfaceContext {
        self.root.descend(&self.path).unwrap_or(&self.root)
    }

    /// Node factory
    pub fn factory(&self) -> &NodeFactory {
        &self.factory
    }

    /// Node factory, e.g. to register discovered node types
    pub fn factory_mut(&mut self) -> &mut NodeFactory {
        &mut self.factory
    }

    /// Settings
    pub fn settings(&self) -> &SurfaceSettings {
        &self.settings
    }

    /// Undo history
    pub fn history(&self) -> &History {
        &self.history
    }

    /// Owning nodes from the root to the current scope
    pub fn path(&self) -> &[NodeId] {
        &self.path
    }

    /// Register a change listener
    pub fn add_listener(&mut self, listener: Box<dyn SurfaceListener>) {
        self.listeners.push(listener);
    }

    /// Restrict which node types may be spawned
    pub fn set_spawn_predicate(&mut self, predicate: impl Fn(&GroupArchetype, &NodeArchetype) -> bool + 'static) {
        self.spawn_predicate = Some(Box::new(predicate));
    }

    /// Whether edits are rejected
    pub fn is_read_only(&self) -> bool {
        self.root.is_read_only()
    }

    /// Enable or disable read-only mode
    pub fn set_read_only(&mut self, read_only: bool) {
        self.root.set_read_only(read_only);
    }

    /// Whether the graph has unsaved edits
    pub fn is_edited(&self) -> bool {
        self.root.is_edited()
    }

    /// Whether the graph has unsaved structural or value edits
    pub fn is_graph_edited(&self) -> bool {
        self.root.is_graph_edited()
    }

    /// Flag the current scope as edited and notify listeners
    pub fn mark_as_edited(&mut self, graph_edited: bool) {
        if let Some(ctx) = self.root.descend_mut(&self.path) {
            ctx.mark_as_modified(graph_edited);
        }
        let path = self.path.clone();
        self.notify(&path, graph_edited);
    }

    /// Whether the type `(group_id, type_id)` passes the spawn predicate
    pub fn can_spawn(&self, group_id: u16, type_id: u16) -> bool {
        match self.factory.find(group_id, type_id) {
            Some((group, archetype)) => self.spawn_predicate.as_ref().map_or(true, |f| f(&*group, &*archetype)),
            None => false,
        }
    }

    fn current(&self) -> Result<&SurfaceContext> {
        self.root.descend(&self.path).ok_or(SurfaceError::SubGraphClosed)
    }

    fn ensure_writable(&self) -> Result<()> {
        if self.is_read_only() {
            return Err(SurfaceError::ReadOnly);
        }
        Ok(())
    }

    /// Run `edit` on the current scope and record it as one undo step.
    ///
    /// `nodes` must list every node whose existence, values, position or
    /// connections the edit changes.
    fn edit<R>(
        &mut self,
        description: &str,
        nodes: &[NodeId],
        parameters: bool,
        graph_edited: bool,
        edit: impl FnOnce(&mut SurfaceContext, &NodeFactory) -> Result<R>,
    ) -> Result<R> {
        self.ensure_writable()?;
        let path = self.path.clone();
        let ctx = self.root.descend_mut(&path).ok_or(SurfaceError::SubGraphClosed)?;

        let mut before = GraphPatch::capture(ctx, &path, nodes)?;
        if parameters {
            before = before.with_parameters(ctx);
        }
        let result = edit(ctx, &self.factory)?;
        let mut after = GraphPatch::capture(ctx, &path, nodes)?;
        if parameters {
            after = after.with_parameters(ctx);
        }

        let before = Snapshot::from_value(&before)?;
        let after = Snapshot::from_value(&after)?;
        if self.history.record(description, before, after).is_some() {
            tracing::debug!("Recorded '{}'", description);
        }
        self.notify(&path, graph_edited);
        Ok(result)
    }

    /// Forward queued context events of the scope at `path` to listeners
    fn notify(&mut self, path: &[NodeId], graph_edited: bool) {
        let events = self
            .root
            .descend_mut(path)
            .map(SurfaceContext::take_events)
            .unwrap_or_default();
        for listener in &mut self.listeners {
            for event in &events {
                match *event {
                    ContextEvent::NodeAdded(id) => listener.node_spawned(id),
                    ContextEvent::NodeRemoved(id) => listener.node_deleted(id),
                    ContextEvent::ValuesChanged(id) => listener.values_edited(id),
                    ContextEvent::Connected(output, input) => listener.connected(output, input),
                    ContextEvent::Disconnected(output, input) => listener.disconnected(output, input),
                    ContextEvent::ParameterAdded(_) | ContextEvent::ParameterRemoved(_) => {}
                }
            }
            listener.edited(graph_edited);
        }
    }

    // ------------------------------------------------------------------
    // Nodes
    // ------------------------------------------------------------------

    /// Spawn a node of a registered type.
    ///
    /// # Panics
    ///
    /// Panics if `values` has the wrong length for a fixed-size node type.
    pub fn spawn_node(
        &mut self,
        group_id: u16,
        type_id: u16,
        position: [f32; 2],
        values: Option<Vec<Variant>>,
    ) -> Result<NodeId> {
        if self.factory.find(group_id, type_id).is_none() {
            return Err(SurfaceError::UnknownType { group_id, type_id });
        }
        if !self.can_spawn(group_id, type_id) {
            return Err(SurfaceError::SpawnRejected { group_id, type_id });
        }
        let id = self.current()?.free_node_id();
        self.edit("Spawn node", &[id], false, true, |ctx, factory| {
            let mut node = factory
                .create_node(id, group_id, type_id)
                .ok_or(SurfaceError::UnknownType { group_id, type_id })?;
            node.position = position;
            if let Some(values) = values {
                node.set_values(values);
            }
            Ok(ctx.add_node(node)?)
        })
    }

    /// Delete nodes, skipping those whose type forbids removal.
    ///
    /// Returns how many nodes were removed.
    pub fn delete(&mut self, nodes: &[NodeId], with_undo: bool) -> Result<usize> {
        self.ensure_writable()?;
        let ctx = self.current()?;
        let targets: Vec<NodeId> = nodes
            .iter()
            .copied()
            .filter(|&id| ctx.find_node(id).is_some_and(|n| n.archetype().can_be_deleted()))
            .collect();
        if targets.is_empty() {
            return Ok(0);
        }

        let remove = |ctx: &mut SurfaceContext, _: &NodeFactory| -> Result<usize> {
            Ok(targets.iter().filter(|&&id| ctx.remove_node(id).is_some()).count())
        };
        if with_undo {
            self.edit("Delete nodes", &targets, false, true, remove)
        } else {
            let path = self.path.clone();
            let ctx = self.root.descend_mut(&path).ok_or(SurfaceError::SubGraphClosed)?;
            let removed = remove(ctx, &self.factory)?;
            self.notify(&path, true);
            Ok(removed)
        }
    }

    /// Move a node
    pub fn move_node(&mut self, id: NodeId, position: [f32; 2]) -> Result<()> {
        self.require_node(id)?;
        self.edit("Move node", &[id], false, false, |ctx, _| {
            ctx.move_node(id, position);
            Ok(())
        })
    }

    /// Resize a node
    pub fn resize_node(&mut self, id: NodeId, size: [f32; 2]) -> Result<()> {
        self.require_node(id)?;
        self.edit("Resize node", &[id], false, false, |ctx, _| {
            ctx.resize_node(id, size);
            Ok(())
        })
    }

    /// Set one node value; returns whether it changed
    pub fn set_node_value(&mut self, id: NodeId, index: usize, value: Variant) -> Result<bool> {
        self.require_node(id)?;
        self.edit("Edit value", &[id], false, true, |ctx, _| {
            Ok(ctx.set_node_value(id, index, value)?.is_some())
        })
    }

    /// Replace all node values; returns whether they changed.
    ///
    /// # Panics
    ///
    /// Panics if `values` has the wrong length for a fixed-size node type.
    pub fn set_node_values(&mut self, id: NodeId, values: Vec<Variant>) -> Result<bool> {
        self.require_node(id)?;
        self.edit("Edit values", &[id], false, true, |ctx, _| {
            Ok(ctx.set_node_values(id, values)?.is_some())
        })
    }

    fn require_node(&self, id: NodeId) -> Result<()> {
        if self.current()?.contains_node(id) {
            Ok(())
        } else {
            Err(SurfaceError::NodeNotFound(id))
        }
    }

    // ------------------------------------------------------------------
    // Connections
    // ------------------------------------------------------------------

    /// Connect two boxes in either order
    pub fn connect(&mut self, a: BoxRef, b: BoxRef) -> Result<Connection> {
        self.ensure_writable()?;
        self.current()?.check_connection(a, b)?;
        self.edit("Connect", &[a.node, b.node], false, true, |ctx, _| Ok(ctx.connect(a, b)?))
    }

    /// Break a connection; returns whether it existed
    pub fn disconnect(&mut self, a: BoxRef, b: BoxRef) -> Result<bool> {
        if !self.current()?.are_connected(a, b) {
            return Ok(false);
        }
        self.edit("Disconnect", &[a.node, b.node], false, true, |ctx, _| Ok(ctx.disconnect(a, b)))
    }

    /// Break every connection of a box; returns the former peers
    pub fn disconnect_box(&mut self, at: BoxRef) -> Result<Vec<BoxRef>> {
        let peers: Vec<BoxRef> = match self.current()?.box_at(at) {
            Some(b) => b.connections.clone(),
            None => return Ok(Vec::new()),
        };
        let mut nodes: Vec<NodeId> = peers.iter().map(|p| p.node).collect();
        nodes.push(at.node);
        self.edit("Disconnect", &nodes, false, true, |ctx, _| {
            for &peer in &peers {
                ctx.disconnect(at, peer);
            }
            Ok(peers.clone())
        })
    }

    // ------------------------------------------------------------------
    // Layout
    // ------------------------------------------------------------------

    fn apply_layout(&mut self, description: &str, moves: Vec<NodeMove>) -> Result<usize> {
        if moves.is_empty() {
            return Ok(0);
        }
        let nodes: Vec<NodeId> = moves.iter().map(|m| m.node).collect();
        self.edit(description, &nodes, false, false, |ctx, _| {
            layout::apply_moves(ctx, &moves);
            Ok(moves.len())
        })
    }

    /// Auto-layout `nodes` (every node when empty); returns how many moved
    pub fn format_graph(&mut self, nodes: &[NodeId]) -> Result<usize> {
        self.ensure_writable()?;
        let ctx = self.current()?;
        let nodes = if nodes.is_empty() { ctx.node_ids() } else { nodes.to_vec() };
        let moves = layout::format_graph(ctx, &nodes, &self.settings.layout());
        self.apply_layout("Format graph", moves)
    }

    /// Line up connected boxes of `nodes`
    pub fn straighten_connections(&mut self, nodes: &[NodeId]) -> Result<usize> {
        self.ensure_writable()?;
        let moves = layout::straighten_connections(self.current()?, nodes);
        self.apply_layout("Straighten connections", moves)
    }

    /// Align `nodes` against their bounding box
    pub fn align_nodes(&mut self, nodes: &[NodeId], alignment: NodeAlignment) -> Result<usize> {
        self.ensure_writable()?;
        let moves = layout::align_nodes(self.current()?, nodes, alignment);
        self.apply_layout("Align nodes", moves)
    }

    /// Space `nodes` evenly along one axis
    pub fn distribute_nodes(&mut self, nodes: &[NodeId], axis: DistributeAxis) -> Result<usize> {
        self.ensure_writable()?;
        let moves = layout::distribute_nodes(self.current()?, nodes, axis, &self.settings.layout());
        self.apply_layout("Distribute nodes", moves)
    }

    // ------------------------------------------------------------------
    // Parameters
    // ------------------------------------------------------------------

    /// Add a parameter to the current scope
    pub fn add_parameter(&mut self, parameter: SurfaceParameter) -> Result<Uuid> {
        self.edit("Add parameter", &[], true, true, |ctx, _| Ok(ctx.add_parameter(parameter)?))
    }

    /// Remove a parameter from the current scope
    pub fn remove_parameter(&mut self, id: Uuid) -> Result<SurfaceParameter> {
        if self.current()?.find_parameter(id).is_none() {
            return Err(SurfaceError::ParameterNotFound(id));
        }
        self.edit("Remove parameter", &[], true, true, |ctx, _| {
            ctx.remove_parameter(id)
                .map(|(_, parameter)| parameter)
                .ok_or(SurfaceError::ParameterNotFound(id))
        })
    }

    /// Set a parameter value; returns whether it changed
    pub fn set_parameter_value(&mut self, id: Uuid, value: Variant) -> Result<bool> {
        self.edit("Edit parameter", &[], true, true, |ctx, _| {
            Ok(ctx.set_parameter_value(id, value)?.is_some())
        })
    }

    // ------------------------------------------------------------------
    // Undo
    // ------------------------------------------------------------------

    /// Revert the last edit
    pub fn undo(&mut self) -> Result<()> {
        self.ensure_writable()?;
        let action = self.history.undo()?;
        tracing::debug!("Undo '{}'", action.description);
        let patch: GraphPatch = action.before.to_value()?;
        self.apply_patch(&patch)
    }

    /// Re-apply the last undone edit
    pub fn redo(&mut self) -> Result<()> {
        self.ensure_writable()?;
        let action = self.history.redo()?;
        tracing::debug!("Redo '{}'", action.description);
        let patch: GraphPatch = action.after.to_value()?;
        self.apply_patch(&patch)
    }

    /// Whether undo is available
    pub fn can_undo(&self) -> bool {
        self.history.can_undo()
    }

    /// Whether redo is available
    pub fn can_redo(&self) -> bool {
        self.history.can_redo()
    }

    fn apply_patch(&mut self, patch: &GraphPatch) -> Result<()> {
        let mut ctx = &mut self.root;
        for &owner in &patch.path {
            ctx = ctx.open_child(owner, &self.factory)?;
        }
        patch.apply(ctx, &self.factory)?;

        // An owner on the open path may have been removed
        let valid = (0..=self.path.len())
            .rev()
            .find(|&n| self.root.descend(&self.path[..n]).is_some())
            .unwrap_or(0);
        if valid < self.path.len() {
            tracing::debug!("Closing sub-graph path at depth {}", valid);
            self.path.truncate(valid);
        }
        self.notify(&patch.path, true);
        Ok(())
    }

    // ------------------------------------------------------------------
    // Clipboard
    // ------------------------------------------------------------------

    /// Encode `nodes` with the connections between them as a graph blob
    pub fn copy(&self, nodes: &[NodeId]) -> Result<Vec<u8>> {
        let ctx = self.current()?;
        let mut clip = SurfaceContext::new();
        for &id in nodes {
            let Some(node) = ctx.find_node(id) else {
                continue;
            };
            let mut node = node.clone();
            for b in node.boxes_mut() {
                b.connections.retain(|peer| nodes.contains(&peer.node));
            }
            clip.add_node(node)?;
        }
        Ok(codec::save(&clip)?)
    }

    /// Paste a blob produced by [`copy`](Self::copy), offsetting positions.
    ///
    /// Nodes get fresh ids in the current scope. Types that cannot be pasted
    /// are skipped together with their connections. Returns the new ids.
    pub fn paste(&mut self, bytes: &[u8], offset: [f32; 2]) -> Result<Vec<NodeId>> {
        self.ensure_writable()?;
        let clip = codec::load(bytes, &self.factory)?;
        let ctx = self.current()?;

        let mut remap: Vec<(NodeId, NodeId)> = Vec::new();
        let mut next = 1u32;
        for node in clip.nodes() {
            if !node.archetype().can_be_pasted() {
                tracing::debug!("Skipping '{}' on paste", node.title());
                continue;
            }
            while ctx.contains_node(NodeId(next)) {
                next += 1;
            }
            remap.push((node.id, NodeId(next)));
            next += 1;
        }
        if remap.is_empty() {
            return Ok(Vec::new());
        }

        let new_id = |old: NodeId| remap.iter().find(|(o, _)| *o == old).map(|(_, n)| *n);
        let connections: Vec<Connection> = clip
            .connections()
            .into_iter()
            .filter_map(|c| {
                let mut output = c.output;
                let mut input = c.input;
                output.node = new_id(output.node)?;
                input.node = new_id(input.node)?;
                Some(Connection { output, input })
            })
            .collect();
        let ids: Vec<NodeId> = remap.iter().map(|(_, n)| *n).collect();

        self.edit("Paste", &ids, false, true, |ctx, _| {
            for &(old, new) in &remap {
                let Some(node) = clip.find_node(old) else {
                    continue;
                };
                let mut node = node.clone();
                node.id = new;
                node.position = [node.position[0] + offset[0], node.position[1] + offset[1]];
                for b in node.boxes_mut() {
                    b.connections.clear();
                }
                ctx.add_node(node)?;
            }
            ctx.restore_connections(&ids, &connections);
            Ok(ids.clone())
        })
    }

    // ------------------------------------------------------------------
    // Persistence and sub-graphs
    // ------------------------------------------------------------------

    /// Replace the graph with a decoded blob.
    ///
    /// Loading is atomic: on failure the current graph is left untouched.
    pub fn load(&mut self, bytes: &[u8]) -> Result<()> {
        let mut ctx = match codec::load(bytes, &self.factory) {
            Ok(ctx) => ctx,
            Err(err) => {
                tracing::error!("Failed to load graph: {}", err);
                return Err(err.into());
            }
        };
        if self.settings.validate_connections_on_load {
            drop_invalid_connections(&mut ctx);
        }
        ctx.take_events();
        ctx.clear_modified();
        ctx.set_read_only(self.root.is_read_only());
        self.root = ctx;
        self.path.clear();
        self.history.clear();
        tracing::info!("Loaded graph with {} nodes", self.root.node_count());
        Ok(())
    }

    /// Encode the whole graph, storing open sub-graphs into their owners
    pub fn save(&mut self) -> Result<Vec<u8>> {
        Ok(self.root.save()?)
    }

    /// Enter the nested graph owned by `owner` in the current scope
    pub fn open_sub_graph(&mut self, owner: NodeId) -> Result<()> {
        let ctx = self.root.descend_mut(&self.path).ok_or(SurfaceError::SubGraphClosed)?;
        ctx.open_child(owner, &self.factory)?;
        self.path.push(owner);
        Ok(())
    }

    /// Return to the parent scope; the child stays open until saved
    pub fn close_sub_graph(&mut self) -> Option<NodeId> {
        self.path.pop()
    }
}

/// Break loaded connections whose box types no longer match
fn drop_invalid_connections(ctx: &mut SurfaceContext) {
    for c in ctx.connections() {
        if let Err(err) = ctx.check_connection(c.output, c.input) {
            tracing::warn!("Dropping connection {} -> {}: {}", c.output, c.input, err);
            ctx.disconnect(c.output, c.input);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::listener::{RecordingListener, SurfaceNotification};
    use std::cell::RefCell;
    use std::rc::Rc;
    use visject_graph::archetypes::{constants, math, tools, CONSTANTS_GROUP_ID, MATH_GROUP_ID, TOOLS_GROUP_ID};
    use visject_graph::{BoxId, ScriptType};

    fn surface() -> VisjectSurface {
        VisjectSurface::new(NodeFactory::with_builtin(), SurfaceSettings::default())
    }

    fn float_into_add(s: &mut VisjectSurface) -> (NodeId, NodeId) {
        let c = s.spawn_node(CONSTANTS_GROUP_ID, constants::FLOAT, [0.0, 0.0], None).unwrap();
        let add = s.spawn_node(MATH_GROUP_ID, math::ADD, [300.0, 0.0], None).unwrap();
        s.connect(BoxRef::new(c, 0), BoxRef::new(add, 0)).unwrap();
        (c, add)
    }

    struct Shared(Rc<RefCell<RecordingListener>>);

    impl SurfaceListener for Shared {
        fn node_spawned(&mut self, node: NodeId) {
            self.0.borrow_mut().node_spawned(node);
        }
        fn node_deleted(&mut self, node: NodeId) {
            self.0.borrow_mut().node_deleted(node);
        }
        fn connected(&mut self, output: BoxRef, input: BoxRef) {
            self.0.borrow_mut().connected(output, input);
        }
    }

    #[test]
    fn test_spawn_with_values_and_undo() {
        let mut s = surface();
        let id = s
            .spawn_node(CONSTANTS_GROUP_ID, constants::INT, [10.0, 20.0], Some(vec![Variant::Int(7)]))
            .unwrap();
        assert_eq!(s.context().find_node(id).unwrap().value(0), Some(&Variant::Int(7)));
        assert_eq!(s.history().undo_description(), Some("Spawn node"));

        s.undo().unwrap();
        assert!(!s.context().contains_node(id));
        s.redo().unwrap();
        let node = s.context().find_node(id).unwrap();
        assert_eq!(node.position, [10.0, 20.0]);
        assert_eq!(node.value(0), Some(&Variant::Int(7)));
    }

    #[test]
    fn test_spawn_predicate_and_unknown_type() {
        let mut s = surface();
        s.set_spawn_predicate(|group, _| group.group_id != MATH_GROUP_ID);
        assert!(matches!(
            s.spawn_node(MATH_GROUP_ID, math::ADD, [0.0, 0.0], None),
            Err(SurfaceError::SpawnRejected { .. })
        ));
        assert!(matches!(
            s.spawn_node(900, 1, [0.0, 0.0], None),
            Err(SurfaceError::UnknownType { group_id: 900, type_id: 1 })
        ));
        assert!(s.spawn_node(CONSTANTS_GROUP_ID, constants::BOOL, [0.0, 0.0], None).is_ok());
        assert_eq!(s.history().stats().undo_count, 1);
    }

    #[test]
    fn test_connect_propagates_and_undoes() {
        let mut s = surface();
        let (c, add) = float_into_add(&mut s);
        let output = s.context().find_node(add).unwrap().get_box(BoxId(2)).unwrap();
        assert_eq!(output.current_type, ScriptType::FLOAT);

        s.undo().unwrap();
        assert!(!s.context().are_connected(BoxRef::new(c, 0), BoxRef::new(add, 0)));
        s.redo().unwrap();
        assert!(s.context().are_connected(BoxRef::new(c, 0), BoxRef::new(add, 0)));
    }

    #[test]
    fn test_delete_restores_links_on_undo() {
        let mut s = surface();
        let (c, add) = float_into_add(&mut s);
        assert_eq!(s.delete(&[c], true).unwrap(), 1);
        assert!(!s.context().find_node(add).unwrap().has_any_connection());

        s.undo().unwrap();
        assert!(s.context().contains_node(c));
        assert!(s.context().are_connected(BoxRef::new(add, 0), BoxRef::new(c, 0)));
    }

    #[test]
    fn test_delete_without_undo() {
        let mut s = surface();
        let (c, _) = float_into_add(&mut s);
        let depth = s.history().stats().undo_count;
        s.delete(&[c], false).unwrap();
        assert_eq!(s.history().stats().undo_count, depth);
    }

    #[test]
    fn test_value_edits_and_parameters() {
        let mut s = surface();
        let id = s.spawn_node(CONSTANTS_GROUP_ID, constants::FLOAT, [0.0, 0.0], None).unwrap();
        assert!(s.set_node_value(id, 0, Variant::Float(2.5)).unwrap());
        assert!(!s.set_node_value(id, 0, Variant::Float(2.5)).unwrap());
        s.undo().unwrap();
        assert_eq!(s.context().find_node(id).unwrap().value(0), Some(&Variant::Float(0.0)));

        let param = s.add_parameter(SurfaceParameter::new("Speed", ScriptType::FLOAT)).unwrap();
        assert!(s.set_parameter_value(param, Variant::Float(3.0)).unwrap());
        s.undo().unwrap();
        assert_eq!(s.context().find_parameter(param).unwrap().value, Variant::Float(0.0));
        s.remove_parameter(param).unwrap();
        assert!(s.context().parameters().is_empty());
        s.undo().unwrap();
        assert_eq!(s.context().parameters().len(), 1);
    }

    #[test]
    fn test_read_only_rejects_edits() {
        let settings = SurfaceSettings {
            read_only: true,
            ..SurfaceSettings::default()
        };
        let mut s = VisjectSurface::new(NodeFactory::with_builtin(), settings);
        assert!(matches!(
            s.spawn_node(CONSTANTS_GROUP_ID, constants::FLOAT, [0.0, 0.0], None),
            Err(SurfaceError::ReadOnly)
        ));
        assert_eq!(s.context().node_count(), 0);
    }

    #[test]
    fn test_listeners_receive_events() {
        let mut s = surface();
        let log = Rc::new(RefCell::new(RecordingListener::default()));
        s.add_listener(Box::new(Shared(Rc::clone(&log))));
        let (c, add) = float_into_add(&mut s);

        let log = log.borrow();
        let events = &log.events;
        assert!(events.contains(&SurfaceNotification::Spawned(c)));
        assert!(events.contains(&SurfaceNotification::Spawned(add)));
        assert!(events.contains(&SurfaceNotification::Connected(BoxRef::new(c, 0), BoxRef::new(add, 0))));
    }

    #[test]
    fn test_copy_paste_keeps_internal_links_only() {
        let mut s = surface();
        let (c, add) = float_into_add(&mut s);
        let other = s.spawn_node(CONSTANTS_GROUP_ID, constants::FLOAT, [0.0, 200.0], None).unwrap();
        s.connect(BoxRef::new(other, 0), BoxRef::new(add, 1)).unwrap();

        let bytes = s.copy(&[c, add]).unwrap();
        let pasted = s.paste(&bytes, [0.0, 500.0]).unwrap();
        assert_eq!(pasted.len(), 2);
        assert!(pasted.iter().all(|id| ![c, add, other].contains(id)));

        let ctx = s.context();
        let new_add = pasted
            .iter()
            .copied()
            .find(|&id| ctx.find_node(id).unwrap().type_id() == math::ADD)
            .unwrap();
        assert_eq!(ctx.find_node(new_add).unwrap().position, [300.0, 500.0]);
        assert_eq!(ctx.connections_for_node(new_add).len(), 1);

        s.undo().unwrap();
        assert_eq!(s.context().node_count(), 3);
    }

    #[test]
    fn test_format_graph_is_one_undo_step() {
        let mut s = surface();
        let (c, add) = float_into_add(&mut s);
        s.move_node(c, [900.0, 400.0]).unwrap();
        let depth = s.history().stats().undo_count;

        assert!(s.format_graph(&[]).unwrap() > 0);
        assert_eq!(s.history().stats().undo_count, depth + 1);
        let ctx = s.context();
        assert!(ctx.find_node(c).unwrap().position[0] < ctx.find_node(add).unwrap().position[0]);

        s.undo().unwrap();
        assert_eq!(s.context().find_node(c).unwrap().position, [900.0, 400.0]);
    }

    #[test]
    fn test_load_is_atomic() {
        let mut s = surface();
        float_into_add(&mut s);
        let bytes = s.save().unwrap();
        assert!(!s.is_edited());

        assert!(matches!(s.load(&[1, 2, 3]), Err(SurfaceError::Format(_))));
        assert_eq!(s.context().node_count(), 2);

        s.load(&bytes).unwrap();
        assert_eq!(s.context().node_count(), 2);
        assert!(!s.can_undo());
    }

    #[test]
    fn test_sub_graph_editing() {
        let mut s = surface();
        let sm = s.spawn_node(TOOLS_GROUP_ID, tools::STATE_MACHINE, [0.0, 0.0], None).unwrap();
        s.open_sub_graph(sm).unwrap();
        assert_eq!(s.path(), &[sm]);
        let inner = s.spawn_node(CONSTANTS_GROUP_ID, constants::FLOAT, [0.0, 0.0], None).unwrap();
        assert_eq!(s.context().node_count(), 1);
        assert_eq!(s.close_sub_graph(), Some(sm));

        let bytes = s.save().unwrap();
        let mut reloaded = surface();
        reloaded.load(&bytes).unwrap();
        reloaded.open_sub_graph(sm).unwrap();
        assert!(reloaded.context().contains_node(inner));
    }

    #[test]
    fn test_undo_spawn_of_open_owner_closes_path() {
        let mut s = surface();
        let sm = s.spawn_node(TOOLS_GROUP_ID, tools::STATE_MACHINE, [0.0, 0.0], None).unwrap();
        s.open_sub_graph(sm).unwrap();
        s.undo().unwrap();
        assert!(s.path().is_empty());
        assert!(!s.context().contains_node(sm));
    }

    #[test]
    fn test_undo_delete_of_owner_keeps_sub_graph_edits() {
        let mut s = surface();
        let sm = s.spawn_node(TOOLS_GROUP_ID, tools::STATE_MACHINE, [0.0, 0.0], None).unwrap();
        s.open_sub_graph(sm).unwrap();
        let inner = s.spawn_node(CONSTANTS_GROUP_ID, constants::FLOAT, [0.0, 0.0], None).unwrap();
        s.close_sub_graph();

        assert_eq!(s.delete(&[sm], true).unwrap(), 1);
        assert!(s.root().child(sm).is_none());
        s.undo().unwrap();

        s.open_sub_graph(sm).unwrap();
        assert_eq!(s.context().node_count(), 1);
        assert!(s.context().contains_node(inner));
    }
}
