// SPDX-License-Identifier: MIT OR Apache-2.0
//! Node instances.

use crate::archetype::{
    ElementKind, GroupArchetype, NodeArchetype, NodeFlags, BOX_OFFSET_X, BOX_SIZE, NODE_HEADER_SIZE,
    NODE_MARGIN_X, NODE_MARGIN_Y,
};
use crate::element::{
    create_element, BoxDirection, BoxId, ElementInstance, NodeElement, SurfaceBox,
};
use crate::layout::Rect;
use crate::meta::GraphMetadata;
use crate::variant::Variant;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::sync::Arc;

/// Node identifier, unique within its context
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct NodeId(pub u32);

impl fmt::Display for NodeId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{}", self.0)
    }
}

/// Debugger breakpoint state
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct Breakpoint {
    /// Breakpoint exists
    pub set: bool,
    /// Breakpoint is active
    pub enabled: bool,
    /// Execution is paused on this node
    pub hit: bool,
}

/// A node instance in a graph context
#[derive(Debug, Clone)]
pub struct SurfaceNode {
    /// Unique id within the owning context
    pub id: NodeId,
    archetype: Arc<NodeArchetype>,
    group: Arc<GroupArchetype>,
    values: Vec<Variant>,
    /// Elements in archetype order
    pub elements: Vec<NodeElement>,
    /// Top-left corner in surface space
    pub position: [f32; 2],
    size: [f32; 2],
    /// Debugger state
    pub breakpoint: Breakpoint,
    /// Per-node metadata
    pub meta: GraphMetadata,
}

impl SurfaceNode {
    /// Instantiate an archetype
    pub fn new(id: NodeId, archetype: Arc<NodeArchetype>, group: Arc<GroupArchetype>) -> Self {
        let elements = archetype
            .elements
            .iter()
            .map(|e| create_element(e, &archetype))
            .collect();
        let mut node = Self {
            id,
            values: archetype.default_values.clone(),
            size: archetype.size,
            archetype,
            group,
            elements,
            position: [0.0, 0.0],
            breakpoint: Breakpoint::default(),
            meta: GraphMetadata::new(),
        };
        node.layout_outputs();
        node
    }

    /// Placeholder for a node whose type is not registered.
    ///
    /// Keeps the original ids, values and boxes so the node re-encodes unchanged.
    pub fn missing(
        id: NodeId,
        group_id: u16,
        type_id: u16,
        values: Vec<Variant>,
        boxes: Vec<SurfaceBox>,
    ) -> Self {
        let archetype = Arc::new(NodeArchetype::missing(type_id));
        let group = Arc::new(GroupArchetype::missing(group_id));
        let mut node = Self::new(id, archetype, group);
        node.values = values;
        node.elements = boxes
            .into_iter()
            .enumerate()
            .map(|(row, b)| NodeElement {
                kind: match b.direction {
                    BoxDirection::Input => ElementKind::Input,
                    BoxDirection::Output => ElementKind::Output,
                },
                position: [
                    NODE_MARGIN_X - BOX_OFFSET_X,
                    NODE_MARGIN_Y + NODE_HEADER_SIZE + row as f32 * BOX_SIZE,
                ],
                size: [BOX_SIZE, BOX_SIZE],
                text: String::new(),
                instance: ElementInstance::Box(b),
            })
            .collect();
        node.layout_outputs();
        node
    }

    /// Archetype of this node
    pub fn archetype(&self) -> &Arc<NodeArchetype> {
        &self.archetype
    }

    /// Group of this node
    pub fn group(&self) -> &Arc<GroupArchetype> {
        &self.group
    }

    /// Group id
    pub fn group_id(&self) -> u16 {
        self.group.group_id
    }

    /// Type id within the group
    pub fn type_id(&self) -> u16 {
        self.archetype.type_id
    }

    /// Display title
    pub fn title(&self) -> &str {
        &self.archetype.title
    }

    /// Whether this node is a placeholder for an unregistered type
    pub fn is_missing(&self) -> bool {
        self.archetype.flags.contains(NodeFlags::MISSING)
    }

    /// Current values
    pub fn values(&self) -> &[Variant] {
        &self.values
    }

    /// Value at `index`
    pub fn value(&self, index: usize) -> Option<&Variant> {
        self.values.get(index)
    }

    /// Set one value. Returns the previous value array when something changed.
    ///
    /// # Panics
    ///
    /// Panics if `index` is out of range.
    pub fn set_value(&mut self, index: usize, value: Variant) -> Option<Vec<Variant>> {
        assert!(
            index < self.values.len(),
            "value index {index} out of range for node {} with {} values",
            self.id,
            self.values.len()
        );
        if self.values[index] == value {
            return None;
        }
        let before = self.values.clone();
        self.values[index] = value;
        Some(before)
    }

    /// Replace all values. Returns the previous value array when something changed.
    ///
    /// # Panics
    ///
    /// Panics if the length differs on an archetype without variable value count.
    pub fn set_values(&mut self, values: Vec<Variant>) -> Option<Vec<Variant>> {
        assert!(
            values.len() == self.values.len() || self.archetype.has_variable_values(),
            "node {} ({}) expects {} values, got {}",
            self.id,
            self.archetype.title,
            self.values.len(),
            values.len()
        );
        if self.values == values {
            return None;
        }
        Some(std::mem::replace(&mut self.values, values))
    }

    pub(crate) fn replace_values(&mut self, values: Vec<Variant>) {
        self.values = values;
    }

    /// Iterate boxes in element order
    pub fn boxes(&self) -> impl Iterator<Item = &SurfaceBox> {
        self.elements.iter().filter_map(NodeElement::as_box)
    }

    /// Iterate boxes mutably in element order
    pub fn boxes_mut(&mut self) -> impl Iterator<Item = &mut SurfaceBox> {
        self.elements.iter_mut().filter_map(NodeElement::as_box_mut)
    }

    /// Find a box by id
    pub fn get_box(&self, id: BoxId) -> Option<&SurfaceBox> {
        self.boxes().find(|b| b.id == id)
    }

    /// Find a box by id
    pub fn get_box_mut(&mut self, id: BoxId) -> Option<&mut SurfaceBox> {
        self.boxes_mut().find(|b| b.id == id)
    }

    /// Whether any box is connected
    pub fn has_any_connection(&self) -> bool {
        self.boxes().any(SurfaceBox::has_any_connection)
    }

    /// Node size
    pub fn size(&self) -> [f32; 2] {
        self.size
    }

    /// Node width
    pub fn width(&self) -> f32 {
        self.size[0]
    }

    /// Node height
    pub fn height(&self) -> f32 {
        self.size[1]
    }

    /// Bounds in surface space
    pub fn bounds(&self) -> Rect {
        Rect::new(self.position, self.size)
    }

    /// Resize the node; output boxes stay flush with the right edge
    pub fn resize(&mut self, width: f32, height: f32) {
        self.size = [width, height];
        self.layout_outputs();
    }

    fn layout_outputs(&mut self) {
        let x = self.size[0] - NODE_MARGIN_X - BOX_SIZE + BOX_OFFSET_X;
        for element in &mut self.elements {
            if element.as_box().is_some_and(SurfaceBox::is_output) {
                element.position[0] = x;
            }
        }
    }

    /// Change the direction of a box, keeping its element kind in step
    pub(crate) fn set_box_direction(&mut self, id: BoxId, direction: BoxDirection) {
        for element in &mut self.elements {
            let ElementInstance::Box(b) = &mut element.instance else {
                continue;
            };
            if b.id == id && b.direction != direction {
                b.direction = direction;
                element.kind = match direction {
                    BoxDirection::Input => ElementKind::Input,
                    BoxDirection::Output => ElementKind::Output,
                };
            }
        }
        self.layout_outputs();
    }

    /// Center of a box in surface space
    pub fn box_center(&self, id: BoxId) -> Option<[f32; 2]> {
        self.elements
            .iter()
            .find(|e| e.as_box().is_some_and(|b| b.id == id))
            .map(|e| {
                [
                    self.position[0] + e.position[0] + e.size[0] * 0.5,
                    self.position[1] + e.position[1] + e.size[1] * 0.5,
                ]
            })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::archetype::ElementArchetype;
    use crate::types::ScriptType;

    fn make(flags: NodeFlags) -> SurfaceNode {
        let arch = NodeArchetype::new(1, "Test", [140.0, 60.0])
            .with_flags(flags)
            .with_values(vec![Variant::Float(1.0), Variant::Blob(vec![1, 2])])
            .with_elements(vec![
                ElementArchetype::input(0.0, "In", true, ScriptType::FLOAT, 0),
                ElementArchetype::output(0.0, "Out", ScriptType::FLOAT, 1),
                ElementArchetype::float_value(0.0, 1.0, 0),
            ]);
        SurfaceNode::new(
            NodeId(1),
            Arc::new(arch),
            Arc::new(GroupArchetype::new(2, "Test", [0, 0, 0])),
        )
    }

    #[test]
    fn test_set_value_skips_equal_values() {
        let mut node = make(NodeFlags::ALL_GRAPHS);
        assert!(node.set_value(0, Variant::Float(1.0)).is_none());
        assert!(node.set_value(1, Variant::Blob(vec![1, 2])).is_none());
        let before = node.set_value(1, Variant::Blob(vec![9])).unwrap();
        assert_eq!(before[1], Variant::Blob(vec![1, 2]));
        assert_eq!(node.value(1), Some(&Variant::Blob(vec![9])));
    }

    #[test]
    #[should_panic(expected = "expects 2 values")]
    fn test_set_values_wrong_length_panics() {
        let mut node = make(NodeFlags::ALL_GRAPHS);
        node.set_values(vec![Variant::Float(1.0)]);
    }

    #[test]
    fn test_set_values_variable_size() {
        let mut node = make(NodeFlags::VARIABLE_VALUES_SIZE);
        assert!(node.set_values(vec![Variant::Int(3)]).is_some());
        assert_eq!(node.values().len(), 1);
    }

    #[test]
    fn test_resize_moves_outputs_only() {
        let mut node = make(NodeFlags::ALL_GRAPHS);
        let input_x = node.elements[0].position[0];
        let value_x = node.elements[2].position[0];
        let output_x = node.elements[1].position[0];
        node.resize(240.0, 60.0);
        assert_eq!(node.elements[0].position[0], input_x);
        assert_eq!(node.elements[2].position[0], value_x);
        assert_eq!(node.elements[1].position[0], output_x + 100.0);
        let right_gap = node.width() - (node.elements[1].position[0] + node.elements[1].size[0]);
        assert!((right_gap - (NODE_MARGIN_X - BOX_OFFSET_X)).abs() < 1e-4);
    }
}
