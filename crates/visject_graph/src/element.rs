// SPDX-License-Identifier: MIT OR Apache-2.0
//! Node elements: boxes (typed ports) and inline value widgets.

use crate::archetype::{ElementArchetype, ElementKind, NodeArchetype};
use crate::node::NodeId;
use crate::types::{can_use_direct_cast, ConnectionsHint, ScriptType};
use serde::{Deserialize, Serialize};
use std::fmt;

/// Box identifier, unique within its node
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct BoxId(pub u8);

impl fmt::Display for BoxId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Address of a box inside a context
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct BoxRef {
    /// Owning node
    pub node: NodeId,
    /// Box on that node
    pub box_id: BoxId,
}

impl BoxRef {
    /// Create a box address
    pub fn new(node: NodeId, box_id: u8) -> Self {
        Self {
            node,
            box_id: BoxId(box_id),
        }
    }
}

impl fmt::Display for BoxRef {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}:{}", self.node, self.box_id)
    }
}

/// Box direction
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum BoxDirection {
    /// Receives a value
    Input,
    /// Produces a value
    Output,
}

impl BoxDirection {
    /// The other direction
    pub fn opposite(self) -> Self {
        match self {
            Self::Input => Self::Output,
            Self::Output => Self::Input,
        }
    }
}

/// A typed port on a node
#[derive(Debug, Clone, PartialEq)]
pub struct SurfaceBox {
    /// Box id
    pub id: BoxId,
    /// Direction
    pub direction: BoxDirection,
    /// Type declared by the archetype
    pub default_type: ScriptType,
    /// Type after inference
    pub current_type: ScriptType,
    /// Types accepted when no type is declared
    pub hints: ConnectionsHint,
    /// At most one connection
    pub single: bool,
    /// Connected boxes, in connection order
    pub connections: Vec<BoxRef>,
}

impl SurfaceBox {
    /// Create an unconnected box
    pub fn new(id: BoxId, direction: BoxDirection, ty: ScriptType) -> Self {
        Self {
            id,
            direction,
            default_type: ty.clone(),
            current_type: ty,
            hints: ConnectionsHint::empty(),
            single: direction == BoxDirection::Input,
            connections: Vec::new(),
        }
    }

    /// Whether this is an input box
    pub fn is_input(&self) -> bool {
        self.direction == BoxDirection::Input
    }

    /// Whether this is an output box
    pub fn is_output(&self) -> bool {
        self.direction == BoxDirection::Output
    }

    /// Whether the box has any connection
    pub fn has_any_connection(&self) -> bool {
        !self.connections.is_empty()
    }

    /// Whether the box is connected to `other`
    pub fn is_connected_to(&self, other: BoxRef) -> bool {
        self.connections.contains(&other)
    }

    /// Whether the box declares no type and relies on hints
    pub fn uses_hints(&self) -> bool {
        self.default_type.is_null() && !self.hints.is_empty()
    }

    /// Whether this box accepts a value of type `ty`
    pub fn can_use_type(&self, ty: &ScriptType) -> bool {
        if can_use_direct_cast(ty, &self.current_type) {
            return true;
        }
        self.default_type.is_null() && self.hints.accepts(ty)
    }
}

/// Whether two boxes may be connected.
///
/// Directions must be opposite and the input must accept the output's type.
pub fn can_connect_boxes(a: &SurfaceBox, b: &SurfaceBox) -> bool {
    if a.direction == b.direction {
        return false;
    }
    let (input, output) = if a.is_input() { (a, b) } else { (b, a) };
    input.can_use_type(&output.current_type)
}

/// Instance data of an element
#[derive(Debug, Clone, PartialEq)]
pub enum ElementInstance {
    /// A box
    Box(SurfaceBox),
    /// A widget editing a node value
    Value {
        /// Index of the edited value
        value_index: usize,
    },
    /// A static label
    Label,
}

/// An element instantiated on a node
#[derive(Debug, Clone, PartialEq)]
pub struct NodeElement {
    /// Element kind
    pub kind: ElementKind,
    /// Offset from the node's top-left corner
    pub position: [f32; 2],
    /// Element size
    pub size: [f32; 2],
    /// Label text
    pub text: String,
    /// Instance data
    pub instance: ElementInstance,
}

impl NodeElement {
    /// The box, if this element is one
    pub fn as_box(&self) -> Option<&SurfaceBox> {
        match &self.instance {
            ElementInstance::Box(b) => Some(b),
            _ => None,
        }
    }

    /// The box, if this element is one
    pub fn as_box_mut(&mut self) -> Option<&mut SurfaceBox> {
        match &mut self.instance {
            ElementInstance::Box(b) => Some(b),
            _ => None,
        }
    }
}

/// Builds an element instance from its archetype
pub type ElementFactory = fn(&ElementArchetype, &NodeArchetype) -> NodeElement;

fn base(arch: &ElementArchetype, instance: ElementInstance) -> NodeElement {
    NodeElement {
        kind: arch.kind,
        position: arch.position,
        size: arch.size,
        text: arch.text.clone(),
        instance,
    }
}

fn make_box(arch: &ElementArchetype, node: &NodeArchetype, direction: BoxDirection) -> NodeElement {
    let mut b = SurfaceBox::new(arch.box_id, direction, arch.connections_type.clone());
    b.single = arch.single;
    if arch.connections_type.is_null() {
        b.hints = node.connections_hints;
        if node.has_type_inference() {
            b.current_type = node.default_type.clone();
        }
    }
    base(arch, ElementInstance::Box(b))
}

fn input_factory(arch: &ElementArchetype, node: &NodeArchetype) -> NodeElement {
    make_box(arch, node, BoxDirection::Input)
}

fn output_factory(arch: &ElementArchetype, node: &NodeArchetype) -> NodeElement {
    make_box(arch, node, BoxDirection::Output)
}

fn value_factory(arch: &ElementArchetype, _node: &NodeArchetype) -> NodeElement {
    match arch.value_index {
        Some(value_index) => base(arch, ElementInstance::Value { value_index }),
        None => base(arch, ElementInstance::Label),
    }
}

fn label_factory(arch: &ElementArchetype, _node: &NodeArchetype) -> NodeElement {
    base(arch, ElementInstance::Label)
}

/// Factory table indexed by [`ElementKind`]
static ELEMENT_FACTORIES: [ElementFactory; ElementKind::COUNT] = [
    input_factory,
    output_factory,
    value_factory,
    value_factory,
    value_factory,
    value_factory,
    value_factory,
    label_factory,
    value_factory,
    value_factory,
    value_factory,
    value_factory,
];

/// Instantiate an element archetype
pub fn create_element(arch: &ElementArchetype, node: &NodeArchetype) -> NodeElement {
    ELEMENT_FACTORIES[arch.kind as usize](arch, node)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::VariantKind;

    fn node_arch() -> NodeArchetype {
        NodeArchetype::new(1, "Test", [100.0, 60.0])
    }

    #[test]
    fn test_factory_table_matches_kinds() {
        let arch = node_arch();
        let input = create_element(&ElementArchetype::input(0.0, "A", true, ScriptType::FLOAT, 0), &arch);
        let output = create_element(&ElementArchetype::output(0.0, "B", ScriptType::FLOAT, 1), &arch);
        let value = create_element(&ElementArchetype::float_value(0.0, 1.0, 2), &arch);
        let label = create_element(&ElementArchetype::text(0.0, 1.0, "hi"), &arch);

        assert!(input.as_box().unwrap().is_input());
        assert!(output.as_box().unwrap().is_output());
        assert_eq!(value.instance, ElementInstance::Value { value_index: 2 });
        assert_eq!(label.instance, ElementInstance::Label);
    }

    #[test]
    fn test_can_connect_boxes() {
        let float_in = SurfaceBox::new(BoxId(0), BoxDirection::Input, ScriptType::FLOAT);
        let int_out = SurfaceBox::new(BoxId(1), BoxDirection::Output, ScriptType::INT);
        let string_out = SurfaceBox::new(BoxId(2), BoxDirection::Output, ScriptType::STRING);
        let float_in2 = SurfaceBox::new(BoxId(3), BoxDirection::Input, ScriptType::FLOAT);

        assert!(can_connect_boxes(&float_in, &int_out));
        assert!(can_connect_boxes(&int_out, &float_in));
        assert!(!can_connect_boxes(&float_in, &string_out));
        assert!(!can_connect_boxes(&float_in, &float_in2));
    }

    #[test]
    fn test_hinted_box_accepts_by_category() {
        let arch = node_arch().with_hints(ConnectionsHint::VECTOR);
        let element = create_element(&ElementArchetype::input(0.0, "V", true, ScriptType::NULL, 0), &arch);
        let b = element.as_box().unwrap();
        assert!(b.uses_hints());
        assert!(b.can_use_type(&ScriptType::FLOAT3));
        let enum_ty = ScriptType::named(VariantKind::Enum, "Mode");
        // A null current type accepts anything through direct cast
        assert!(b.can_use_type(&enum_ty));
    }
}
