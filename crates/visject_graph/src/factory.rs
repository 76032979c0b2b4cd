// SPDX-License-Identifier: MIT OR Apache-2.0
//! Registry of node archetypes, keyed by group and type id.

use crate::archetype::{node_key, GroupArchetype, NodeArchetype};
use crate::node::{NodeId, SurfaceNode};
use indexmap::IndexMap;
use std::sync::Arc;

/// Registry of available node types
#[derive(Debug, Clone, Default)]
pub struct NodeFactory {
    groups: IndexMap<u16, Arc<GroupArchetype>>,
}

impl NodeFactory {
    /// Create an empty registry
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a registry holding the built-in groups
    pub fn with_builtin() -> Self {
        let mut factory = Self::new();
        for group in crate::archetypes::builtin_groups() {
            factory.register_group(group);
        }
        factory
    }

    /// Register a group, replacing any group with the same id
    pub fn register_group(&mut self, group: GroupArchetype) {
        if self.groups.contains_key(&group.group_id) {
            tracing::debug!("Replacing node group {} ({})", group.group_id, group.name);
        }
        self.groups.insert(group.group_id, Arc::new(group));
    }

    /// Remove a group
    pub fn unregister_group(&mut self, group_id: u16) -> Option<Arc<GroupArchetype>> {
        self.groups.shift_remove(&group_id)
    }

    /// Get a group by id
    pub fn group(&self, group_id: u16) -> Option<&Arc<GroupArchetype>> {
        self.groups.get(&group_id)
    }

    /// All groups in registration order
    pub fn groups(&self) -> impl Iterator<Item = &Arc<GroupArchetype>> {
        self.groups.values()
    }

    /// Look up the archetype for a node-type key pair
    pub fn find(
        &self,
        group_id: u16,
        type_id: u16,
    ) -> Option<(Arc<GroupArchetype>, Arc<NodeArchetype>)> {
        let group = self.groups.get(&group_id)?;
        let archetype = group.archetype(type_id)?;
        Some((group.clone(), archetype.clone()))
    }

    /// Iterate every archetype with its group and key
    pub fn archetypes(&self) -> impl Iterator<Item = (u32, &Arc<GroupArchetype>, &Arc<NodeArchetype>)> {
        self.groups.values().flat_map(|g| {
            g.archetypes
                .iter()
                .map(move |a| (node_key(g.group_id, a.type_id), g, a))
        })
    }

    /// Instantiate a registered node type
    pub fn create_node(&self, id: NodeId, group_id: u16, type_id: u16) -> Option<SurfaceNode> {
        let (group, archetype) = self.find(group_id, type_id)?;
        Some(SurfaceNode::new(id, archetype, group))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::archetypes::{constants, CONSTANTS_GROUP_ID, TOOLS_GROUP_ID};

    #[test]
    fn test_builtin_lookup() {
        let factory = NodeFactory::with_builtin();
        let (group, arch) = factory.find(CONSTANTS_GROUP_ID, constants::FLOAT).unwrap();
        assert_eq!(group.group_id, CONSTANTS_GROUP_ID);
        assert_eq!(arch.type_id, constants::FLOAT);
        assert!(factory.find(CONSTANTS_GROUP_ID, 999).is_none());
        assert!(factory.find(999, 1).is_none());
        assert!(factory.group(TOOLS_GROUP_ID).is_some());
    }

    #[test]
    fn test_keys_are_unique() {
        let factory = NodeFactory::with_builtin();
        let mut keys: Vec<u32> = factory.archetypes().map(|(k, _, _)| k).collect();
        let count = keys.len();
        keys.sort_unstable();
        keys.dedup();
        assert_eq!(keys.len(), count);
    }

    #[test]
    fn test_unregister() {
        let mut factory = NodeFactory::with_builtin();
        assert!(factory.unregister_group(CONSTANTS_GROUP_ID).is_some());
        assert!(factory.create_node(NodeId(1), CONSTANTS_GROUP_ID, constants::FLOAT).is_none());
    }
}
