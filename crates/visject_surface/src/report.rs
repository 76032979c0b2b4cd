// SPDX-License-Identifier: MIT OR Apache-2.0
//! Serializable graph summaries for tooling output.

use serde::Serialize;
use visject_graph::{Connection, SurfaceContext, Variant};

/// One node in a report
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct NodeReport {
    /// Node id
    pub id: u32,
    /// Group id
    pub group_id: u16,
    /// Type id
    pub type_id: u16,
    /// Display title
    pub title: String,
    /// Top-left corner
    pub position: [f32; 2],
    /// Values
    pub values: Vec<Variant>,
    /// Node type is not registered
    pub missing: bool,
}

/// One parameter in a report
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ParameterReport {
    /// Parameter id
    pub id: String,
    /// Display name
    pub name: String,
    /// Value type
    pub type_name: String,
    /// Visible outside the graph
    pub is_public: bool,
    /// Current value
    pub value: Variant,
}

/// Summary of a graph
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct GraphReport {
    /// Format version the graph was stored with
    pub version: u32,
    /// Nodes in declaration order
    pub nodes: Vec<NodeReport>,
    /// Connections from their output side
    pub connections: Vec<Connection>,
    /// Parameters in declaration order
    pub parameters: Vec<ParameterReport>,
}

impl GraphReport {
    /// Summarize `ctx`, loaded from a blob of `version`
    pub fn new(ctx: &SurfaceContext, version: u32) -> Self {
        Self {
            version,
            nodes: ctx
                .nodes()
                .map(|n| NodeReport {
                    id: n.id.0,
                    group_id: n.group_id(),
                    type_id: n.type_id(),
                    title: n.title().to_string(),
                    position: n.position,
                    values: n.values().to_vec(),
                    missing: n.is_missing(),
                })
                .collect(),
            connections: ctx.connections(),
            parameters: ctx
                .parameters()
                .iter()
                .map(|p| ParameterReport {
                    id: p.id.to_string(),
                    name: p.name.clone(),
                    type_name: p.param_type.to_string(),
                    is_public: p.is_public,
                    value: p.value.clone(),
                })
                .collect(),
        }
    }

    /// Number of nodes whose type is not registered
    pub fn missing_count(&self) -> usize {
        self.nodes.iter().filter(|n| n.missing).count()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use visject_graph::archetypes::{constants, CONSTANTS_GROUP_ID};
    use visject_graph::{NodeFactory, ScriptType, SurfaceParameter};

    #[test]
    fn test_report_lists_nodes_and_parameters() {
        let factory = NodeFactory::with_builtin();
        let mut ctx = SurfaceContext::new();
        let id = ctx.spawn_node(&factory, CONSTANTS_GROUP_ID, constants::INT, [1.0, 2.0]).unwrap();
        ctx.add_parameter(SurfaceParameter::new("Count", ScriptType::INT)).unwrap();

        let report = GraphReport::new(&ctx, 7000);
        assert_eq!(report.nodes.len(), 1);
        assert_eq!(report.nodes[0].id, id.0);
        assert_eq!(report.nodes[0].position, [1.0, 2.0]);
        assert_eq!(report.parameters[0].name, "Count");
        assert_eq!(report.missing_count(), 0);

        let json = serde_json::to_value(&report).unwrap();
        assert_eq!(json["version"], 7000);
        assert_eq!(json["nodes"][0]["group_id"], CONSTANTS_GROUP_ID);
    }
}
