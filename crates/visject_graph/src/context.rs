// SPDX-License-Identifier: MIT OR Apache-2.0
//! Graph container for one graph scope.
//!
//! A [`SurfaceContext`] owns its nodes and parameters. Nested sub-graphs are
//! child contexts keyed by the node that owns them; a child's bytes live as
//! a blob value on its owning node.

use crate::archetype::{GroupArchetype, NodeArchetype};
use crate::codec::{self, FormatError};
use crate::element::BoxRef;
use crate::factory::NodeFactory;
use crate::meta::{GraphMetadata, SurfaceViewMeta};
use crate::node::{NodeId, SurfaceNode};
use crate::parameter::SurfaceParameter;
use crate::variant::Variant;
use indexmap::IndexMap;
use std::sync::Arc;
use uuid::Uuid;

/// Change notification raised by a context
#[derive(Debug, Clone, PartialEq)]
pub enum ContextEvent {
    /// A node was added
    NodeAdded(NodeId),
    /// A node was removed
    NodeRemoved(NodeId),
    /// A node's values changed
    ValuesChanged(NodeId),
    /// Two boxes were connected (output, input)
    Connected(BoxRef, BoxRef),
    /// Two boxes were disconnected (output, input)
    Disconnected(BoxRef, BoxRef),
    /// A parameter was added
    ParameterAdded(Uuid),
    /// A parameter was removed
    ParameterRemoved(Uuid),
}

/// Errors raised by context operations
#[derive(Debug, thiserror::Error)]
pub enum ContextError {
    /// Node id already used
    #[error("Node id already in use: {0}")]
    DuplicateNode(NodeId),

    /// Node not found
    #[error("Node not found: {0}")]
    NodeNotFound(NodeId),

    /// Parameter id already used
    #[error("Parameter id already in use: {0}")]
    DuplicateParameter(Uuid),

    /// Parameter not found
    #[error("Parameter not found: {0}")]
    ParameterNotFound(Uuid),

    /// Node does not own a nested graph
    #[error("Node {0} does not own a sub-graph")]
    NotASubGraph(NodeId),

    /// Nested graph failed to decode
    #[error("Sub-graph of node {node} is invalid: {source}")]
    SubGraph {
        /// Owning node
        node: NodeId,
        /// Decode failure
        #[source]
        source: FormatError,
    },
}

/// A single graph scope
#[derive(Debug, Clone, Default)]
pub struct SurfaceContext {
    nodes: IndexMap<NodeId, SurfaceNode>,
    parameters: Vec<SurfaceParameter>,
    /// Whole-graph metadata
    pub meta: GraphMetadata,
    /// View center and zoom, stored as metadata on save
    pub view: SurfaceViewMeta,
    children: IndexMap<NodeId, SurfaceContext>,
    owner: Option<NodeId>,
    is_edited: bool,
    graph_edited: bool,
    read_only: bool,
    events: Vec<ContextEvent>,
}

impl SurfaceContext {
    /// Create an empty root context
    pub fn new() -> Self {
        Self::default()
    }

    /// Node in the parent context that owns this context
    pub fn owner(&self) -> Option<NodeId> {
        self.owner
    }

    // ------------------------------------------------------------------
    // Nodes
    // ------------------------------------------------------------------

    /// Nodes in declaration order
    pub fn nodes(&self) -> impl Iterator<Item = &SurfaceNode> {
        self.nodes.values()
    }

    /// Nodes in declaration order
    pub fn nodes_mut(&mut self) -> impl Iterator<Item = &mut SurfaceNode> {
        self.nodes.values_mut()
    }

    /// Node ids in declaration order
    pub fn node_ids(&self) -> Vec<NodeId> {
        self.nodes.keys().copied().collect()
    }

    /// Number of nodes
    pub fn node_count(&self) -> usize {
        self.nodes.len()
    }

    /// Find a node by id
    pub fn find_node(&self, id: NodeId) -> Option<&SurfaceNode> {
        self.nodes.get(&id)
    }

    /// Find a node by id
    pub fn find_node_mut(&mut self, id: NodeId) -> Option<&mut SurfaceNode> {
        self.nodes.get_mut(&id)
    }

    /// Whether a node with this id exists
    pub fn contains_node(&self, id: NodeId) -> bool {
        self.nodes.contains_key(&id)
    }

    /// Smallest unused node id, starting at 1
    pub fn free_node_id(&self) -> NodeId {
        let mut id = 1u32;
        while self.nodes.contains_key(&NodeId(id)) {
            id += 1;
        }
        NodeId(id)
    }

    /// Add a node
    pub fn add_node(&mut self, node: SurfaceNode) -> Result<NodeId, ContextError> {
        let id = node.id;
        if self.nodes.contains_key(&id) {
            return Err(ContextError::DuplicateNode(id));
        }
        self.nodes.insert(id, node);
        self.update_boxes_types(id);
        self.events.push(ContextEvent::NodeAdded(id));
        self.mark_as_modified(true);
        Ok(id)
    }

    /// Instantiate an archetype under a fresh id
    pub fn create_node(
        &mut self,
        archetype: Arc<NodeArchetype>,
        group: Arc<GroupArchetype>,
        position: [f32; 2],
    ) -> NodeId {
        let mut node = SurfaceNode::new(self.free_node_id(), archetype, group);
        node.position = position;
        let id = node.id;
        self.nodes.insert(id, node);
        self.update_boxes_types(id);
        self.events.push(ContextEvent::NodeAdded(id));
        self.mark_as_modified(true);
        id
    }

    /// Instantiate a registered node type under a fresh id
    pub fn spawn_node(
        &mut self,
        factory: &NodeFactory,
        group_id: u16,
        type_id: u16,
        position: [f32; 2],
    ) -> Option<NodeId> {
        let (group, archetype) = factory.find(group_id, type_id)?;
        Some(self.create_node(archetype, group, position))
    }

    /// Remove a node after breaking all of its connections
    pub fn remove_node(&mut self, id: NodeId) -> Option<SurfaceNode> {
        if !self.nodes.contains_key(&id) {
            return None;
        }
        self.disconnect_node(id);
        self.children.shift_remove(&id);
        let node = self.nodes.shift_remove(&id)?;
        self.events.push(ContextEvent::NodeRemoved(id));
        self.mark_as_modified(true);
        Some(node)
    }

    /// Move a node; a cosmetic edit
    pub fn move_node(&mut self, id: NodeId, position: [f32; 2]) -> bool {
        let Some(node) = self.nodes.get_mut(&id) else {
            return false;
        };
        if node.position == position {
            return false;
        }
        node.position = position;
        self.mark_as_modified(false);
        true
    }

    /// Resize a node; a cosmetic edit
    pub fn resize_node(&mut self, id: NodeId, size: [f32; 2]) -> bool {
        let Some(node) = self.nodes.get_mut(&id) else {
            return false;
        };
        node.resize(size[0], size[1]);
        self.mark_as_modified(false);
        true
    }

    /// Set one node value.
    ///
    /// Returns the previous values when the value changed. Read-only graphs
    /// and equal values are left untouched.
    pub fn set_node_value(
        &mut self,
        id: NodeId,
        index: usize,
        value: Variant,
    ) -> Result<Option<Vec<Variant>>, ContextError> {
        if self.read_only {
            return Ok(None);
        }
        let node = self.nodes.get_mut(&id).ok_or(ContextError::NodeNotFound(id))?;
        let before = node.set_value(index, value);
        if before.is_some() {
            self.values_changed(id);
        }
        Ok(before)
    }

    /// Replace all node values; see [`SurfaceNode::set_values`] for the length contract
    pub fn set_node_values(
        &mut self,
        id: NodeId,
        values: Vec<Variant>,
    ) -> Result<Option<Vec<Variant>>, ContextError> {
        if self.read_only {
            return Ok(None);
        }
        let node = self.nodes.get_mut(&id).ok_or(ContextError::NodeNotFound(id))?;
        let before = node.set_values(values);
        if before.is_some() {
            self.values_changed(id);
        }
        Ok(before)
    }

    fn values_changed(&mut self, id: NodeId) {
        self.events.push(ContextEvent::ValuesChanged(id));
        self.mark_as_modified(true);
    }

    /// Insert a node as-is, without events or type updates
    pub(crate) fn insert_raw(&mut self, node: SurfaceNode) {
        self.nodes.insert(node.id, node);
    }

    // ------------------------------------------------------------------
    // Parameters
    // ------------------------------------------------------------------

    /// Parameters in declaration order
    pub fn parameters(&self) -> &[SurfaceParameter] {
        &self.parameters
    }

    /// Find a parameter by id
    pub fn find_parameter(&self, id: Uuid) -> Option<&SurfaceParameter> {
        self.parameters.iter().find(|p| p.id == id)
    }

    /// Find a parameter by name
    pub fn find_parameter_by_name(&self, name: &str) -> Option<&SurfaceParameter> {
        self.parameters.iter().find(|p| p.name == name)
    }

    /// Add a parameter
    pub fn add_parameter(&mut self, parameter: SurfaceParameter) -> Result<Uuid, ContextError> {
        self.insert_parameter(self.parameters.len(), parameter)
    }

    /// Insert a parameter at `index` (clamped)
    pub fn insert_parameter(
        &mut self,
        index: usize,
        parameter: SurfaceParameter,
    ) -> Result<Uuid, ContextError> {
        let id = parameter.id;
        if self.find_parameter(id).is_some() {
            return Err(ContextError::DuplicateParameter(id));
        }
        let index = index.min(self.parameters.len());
        self.parameters.insert(index, parameter);
        self.events.push(ContextEvent::ParameterAdded(id));
        self.mark_as_modified(true);
        Ok(id)
    }

    /// Remove a parameter, returning it with its former index
    pub fn remove_parameter(&mut self, id: Uuid) -> Option<(usize, SurfaceParameter)> {
        let index = self.parameters.iter().position(|p| p.id == id)?;
        let parameter = self.parameters.remove(index);
        self.events.push(ContextEvent::ParameterRemoved(id));
        self.mark_as_modified(true);
        Some((index, parameter))
    }

    /// Set a parameter value; returns the previous value when it changed
    pub fn set_parameter_value(
        &mut self,
        id: Uuid,
        value: Variant,
    ) -> Result<Option<Variant>, ContextError> {
        if self.read_only {
            return Ok(None);
        }
        let parameter = self
            .parameters
            .iter_mut()
            .find(|p| p.id == id)
            .ok_or(ContextError::ParameterNotFound(id))?;
        if parameter.value == value {
            return Ok(None);
        }
        let before = std::mem::replace(&mut parameter.value, value);
        self.mark_as_modified(true);
        Ok(Some(before))
    }

    pub(crate) fn push_parameter_raw(&mut self, parameter: SurfaceParameter) {
        self.parameters.push(parameter);
    }

    // ------------------------------------------------------------------
    // Modification state
    // ------------------------------------------------------------------

    /// Record an edit. `graph_edited` marks structural or value changes that
    /// require recompiling the graph; cosmetic edits pass `false`.
    pub fn mark_as_modified(&mut self, graph_edited: bool) {
        self.is_edited = true;
        self.graph_edited |= graph_edited;
    }

    /// Whether this context or any child has any edit
    pub fn is_edited(&self) -> bool {
        self.is_edited || self.children.values().any(SurfaceContext::is_edited)
    }

    /// Whether this context or any child has a structural or value edit
    pub fn is_graph_edited(&self) -> bool {
        self.graph_edited || self.children.values().any(SurfaceContext::is_graph_edited)
    }

    /// Clear the modification flags of this context and its children
    pub fn clear_modified(&mut self) {
        self.is_edited = false;
        self.graph_edited = false;
        for child in self.children.values_mut() {
            child.clear_modified();
        }
    }

    /// Whether edits are rejected
    pub fn is_read_only(&self) -> bool {
        self.read_only
    }

    /// Enable or disable read-only mode (children follow)
    pub fn set_read_only(&mut self, read_only: bool) {
        self.read_only = read_only;
        for child in self.children.values_mut() {
            child.set_read_only(read_only);
        }
    }

    pub(crate) fn push_event(&mut self, event: ContextEvent) {
        self.events.push(event);
    }

    /// Drain pending change notifications
    pub fn take_events(&mut self) -> Vec<ContextEvent> {
        std::mem::take(&mut self.events)
    }

    // ------------------------------------------------------------------
    // Nested contexts
    // ------------------------------------------------------------------

    /// Open child contexts, keyed by owning node
    pub fn children(&self) -> impl Iterator<Item = (&NodeId, &SurfaceContext)> {
        self.children.iter()
    }

    /// Open child context of a node
    pub fn child(&self, owner: NodeId) -> Option<&SurfaceContext> {
        self.children.get(&owner)
    }

    /// Open child context of a node
    pub fn child_mut(&mut self, owner: NodeId) -> Option<&mut SurfaceContext> {
        self.children.get_mut(&owner)
    }

    /// Open the nested graph of `owner`, decoding it from the node's blob on first use
    pub fn open_child(
        &mut self,
        owner: NodeId,
        factory: &NodeFactory,
    ) -> Result<&mut SurfaceContext, ContextError> {
        if !self.children.contains_key(&owner) {
            let node = self.nodes.get(&owner).ok_or(ContextError::NodeNotFound(owner))?;
            let index = node
                .archetype()
                .sub_graph_value
                .ok_or(ContextError::NotASubGraph(owner))?;
            let bytes = node.value(index).and_then(Variant::as_bytes).unwrap_or(&[]);
            let mut child = if bytes.is_empty() {
                SurfaceContext::new()
            } else {
                codec::load(bytes, factory)
                    .map_err(|source| ContextError::SubGraph { node: owner, source })?
            };
            child.owner = Some(owner);
            child.read_only = self.read_only;
            self.children.insert(owner, child);
        }
        self.children
            .get_mut(&owner)
            .ok_or(ContextError::NotASubGraph(owner))
    }

    /// Close a child context without saving it
    pub fn close_child(&mut self, owner: NodeId) -> Option<SurfaceContext> {
        self.children.shift_remove(&owner)
    }

    /// Follow a path of owning nodes from this context
    pub fn descend(&self, path: &[NodeId]) -> Option<&SurfaceContext> {
        path.iter().try_fold(self, |ctx, id| ctx.children.get(id))
    }

    /// Follow a path of owning nodes from this context
    pub fn descend_mut(&mut self, path: &[NodeId]) -> Option<&mut SurfaceContext> {
        path.iter()
            .try_fold(self, |ctx, id| ctx.children.get_mut(id))
    }

    /// Encode this graph without touching it.
    ///
    /// Edited children are encoded depth-first and their bytes stand in for
    /// the blob values of their owners in the result.
    pub fn encode(&self) -> Result<Vec<u8>, FormatError> {
        Ok(self.encode_tree()?.bytes)
    }

    /// Encode this graph and commit the result.
    ///
    /// Nothing changes until every encode succeeded; then edited children
    /// are stored into their owners and the modification flags clear.
    pub fn save(&mut self) -> Result<Vec<u8>, FormatError> {
        let encoded = self.encode_tree()?;
        let bytes = self.commit(encoded);
        self.clear_modified();
        Ok(bytes)
    }

    /// Current values of `owner` with its edited open sub-graph encoded
    /// into the sub-graph slot
    pub fn values_with_sub_graph(&self, owner: NodeId) -> Result<Option<Vec<Variant>>, FormatError> {
        let Some(node) = self.nodes.get(&owner) else {
            return Ok(None);
        };
        let mut values = node.values().to_vec();
        if let (Some(child), Some(index)) = (self.children.get(&owner), node.archetype().sub_graph_value) {
            if child.is_edited() && index < values.len() {
                values[index] = Variant::Blob(child.encode()?);
            }
        }
        Ok(Some(values))
    }

    fn encode_tree(&self) -> Result<EncodedGraph, FormatError> {
        let mut children = Vec::new();
        for (owner, child) in &self.children {
            if child.is_edited() {
                children.push((*owner, child.encode_tree()?));
            }
        }
        let bytes = if children.is_empty() {
            codec::save(self)?
        } else {
            let mut patched = self.detached();
            for (owner, child) in &children {
                patched.store_sub_graph(*owner, child.bytes.clone());
            }
            codec::save(&patched)?
        };
        Ok(EncodedGraph { bytes, children })
    }

    fn commit(&mut self, encoded: EncodedGraph) -> Vec<u8> {
        for (owner, child) in encoded.children {
            let bytes = match self.children.get_mut(&owner) {
                Some(ctx) => ctx.commit(child),
                None => child.bytes,
            };
            self.store_sub_graph(owner, bytes);
        }
        encoded.bytes
    }

    /// Copy of the nodes, parameters and metadata, without children or events
    fn detached(&self) -> SurfaceContext {
        SurfaceContext {
            nodes: self.nodes.clone(),
            parameters: self.parameters.clone(),
            meta: self.meta.clone(),
            view: self.view,
            owner: self.owner,
            ..SurfaceContext::default()
        }
    }

    fn store_sub_graph(&mut self, owner: NodeId, bytes: Vec<u8>) {
        let Some(node) = self.nodes.get_mut(&owner) else {
            return;
        };
        let Some(index) = node.archetype().sub_graph_value else {
            return;
        };
        let mut values = node.values().to_vec();
        if index < values.len() {
            values[index] = Variant::Blob(bytes);
            node.replace_values(values);
        }
    }
}

/// Encoded bytes of a context and of its edited children
struct EncodedGraph {
    bytes: Vec<u8>,
    children: Vec<(NodeId, EncodedGraph)>,
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::archetypes::{constants, tools, CONSTANTS_GROUP_ID, TOOLS_GROUP_ID};
    use crate::types::ScriptType;

    #[test]
    fn test_ids_and_lookup() {
        let factory = NodeFactory::with_builtin();
        let mut ctx = SurfaceContext::new();
        let a = ctx.spawn_node(&factory, CONSTANTS_GROUP_ID, constants::FLOAT, [0.0, 0.0]).unwrap();
        let b = ctx.spawn_node(&factory, CONSTANTS_GROUP_ID, constants::INT, [0.0, 0.0]).unwrap();
        assert_eq!(a, NodeId(1));
        assert_eq!(b, NodeId(2));
        ctx.remove_node(a);
        assert_eq!(ctx.free_node_id(), NodeId(1));
        assert!(ctx.find_node(b).is_some());

        let dup = factory.create_node(b, CONSTANTS_GROUP_ID, constants::FLOAT).unwrap();
        assert!(matches!(ctx.add_node(dup), Err(ContextError::DuplicateNode(_))));
    }

    #[test]
    fn test_modification_signals() {
        let factory = NodeFactory::with_builtin();
        let mut ctx = SurfaceContext::new();
        let a = ctx.spawn_node(&factory, CONSTANTS_GROUP_ID, constants::FLOAT, [0.0, 0.0]).unwrap();
        ctx.clear_modified();

        assert!(ctx.move_node(a, [10.0, 0.0]));
        assert!(ctx.is_edited());
        assert!(!ctx.is_graph_edited());

        ctx.set_node_value(a, 0, Variant::Float(2.0)).unwrap();
        assert!(ctx.is_graph_edited());
        let events = ctx.take_events();
        assert!(events.contains(&ContextEvent::ValuesChanged(a)));
    }

    #[test]
    fn test_read_only_rejects_values() {
        let factory = NodeFactory::with_builtin();
        let mut ctx = SurfaceContext::new();
        let a = ctx.spawn_node(&factory, CONSTANTS_GROUP_ID, constants::FLOAT, [0.0, 0.0]).unwrap();
        ctx.clear_modified();
        ctx.set_read_only(true);
        assert!(ctx.set_node_value(a, 0, Variant::Float(5.0)).unwrap().is_none());
        assert_eq!(ctx.find_node(a).unwrap().value(0), Some(&Variant::Float(0.0)));
        assert!(!ctx.is_edited());
    }

    #[test]
    fn test_parameters() {
        let mut ctx = SurfaceContext::new();
        let param = SurfaceParameter::new("Speed", ScriptType::FLOAT);
        let id = ctx.add_parameter(param.clone()).unwrap();
        assert!(matches!(ctx.add_parameter(param), Err(ContextError::DuplicateParameter(_))));
        assert_eq!(ctx.find_parameter_by_name("Speed").map(|p| p.id), Some(id));
        assert_eq!(
            ctx.set_parameter_value(id, Variant::Float(3.0)).unwrap(),
            Some(Variant::Float(0.0))
        );
        let (index, removed) = ctx.remove_parameter(id).unwrap();
        assert_eq!(index, 0);
        assert_eq!(removed.value, Variant::Float(3.0));
    }

    #[test]
    fn test_nested_context_saved_into_owner() {
        let factory = NodeFactory::with_builtin();
        let mut root = SurfaceContext::new();
        let owner = root
            .spawn_node(&factory, TOOLS_GROUP_ID, tools::STATE_MACHINE, [0.0, 0.0])
            .unwrap();
        root.clear_modified();

        let child = root.open_child(owner, &factory).unwrap();
        assert_eq!(child.owner(), Some(owner));
        child
            .spawn_node(&factory, CONSTANTS_GROUP_ID, constants::BOOL, [5.0, 5.0])
            .unwrap();
        assert!(root.is_edited());

        root.save().unwrap();
        assert!(!root.is_edited());
        let blob = root.find_node(owner).unwrap().value(0).unwrap().clone();
        assert!(matches!(&blob, Variant::Blob(b) if !b.is_empty()));

        root.close_child(owner);
        let reopened = root.open_child(owner, &factory).unwrap();
        assert_eq!(reopened.node_count(), 1);
    }

    #[test]
    fn test_encode_leaves_graph_untouched() {
        let factory = NodeFactory::with_builtin();
        let mut root = SurfaceContext::new();
        let owner = root
            .spawn_node(&factory, TOOLS_GROUP_ID, tools::STATE_MACHINE, [0.0, 0.0])
            .unwrap();
        let child = root.open_child(owner, &factory).unwrap();
        child
            .spawn_node(&factory, CONSTANTS_GROUP_ID, constants::FLOAT, [0.0, 0.0])
            .unwrap();

        let bytes = root.encode().unwrap();
        assert!(root.child(owner).unwrap().is_edited());
        assert_eq!(root.find_node(owner).unwrap().value(0), Some(&Variant::Blob(Vec::new())));

        let values = root.values_with_sub_graph(owner).unwrap().unwrap();
        assert!(matches!(&values[0], Variant::Blob(b) if !b.is_empty()));

        let loaded = codec::load(&bytes, &factory).unwrap();
        let blob = loaded.find_node(owner).unwrap().value(0).unwrap().as_bytes().unwrap();
        assert_eq!(codec::load(blob, &factory).unwrap().node_count(), 1);

        assert_eq!(root.save().unwrap(), bytes);
        assert!(!root.is_edited());
        assert_eq!(root.find_node(owner).unwrap().value(0), Some(&values[0]));
    }
}
