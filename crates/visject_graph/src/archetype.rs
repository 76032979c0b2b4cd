// SPDX-License-Identifier: MIT OR Apache-2.0
//! Immutable node templates.
//!
//! A [`NodeArchetype`] describes one node type: its values, its elements
//! (boxes and inline value widgets) and how its box types are inferred.
//! Archetypes are grouped under a [`GroupArchetype`]; the pair of ids forms
//! the globally unique node-type key.

use crate::element::{BoxId, SurfaceBox};
use crate::types::{ConnectionsHint, ScriptType};
use crate::variant::Variant;
use bitflags::bitflags;
use std::sync::Arc;

/// Horizontal margin between the node edge and its content
pub const NODE_MARGIN_X: f32 = 5.0;
/// Vertical margin between the node edge and its content
pub const NODE_MARGIN_Y: f32 = 5.0;
/// Height of the node title bar
pub const NODE_HEADER_SIZE: f32 = 28.0;
/// Size of a box
pub const BOX_SIZE: f32 = 20.0;
/// Horizontal box overhang past the node edge
pub const BOX_OFFSET_X: f32 = 2.0;
/// Vertical distance between two element rows
pub const LAYOUT_OFFSET_Y: f32 = 20.0;

bitflags! {
    /// Node archetype capabilities.
    #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
    pub struct NodeFlags: u32 {
        /// Usable in material graphs
        const MATERIAL_GRAPH = 1 << 0;
        /// Usable in particle emitter graphs
        const PARTICLE_EMITTER_GRAPH = 1 << 1;
        /// Usable in animation graphs
        const ANIM_GRAPH = 1 << 2;
        /// Usable in visual scripts
        const VISUAL_SCRIPT_GRAPH = 1 << 3;
        /// Usable in every graph kind
        const ALL_GRAPHS = Self::MATERIAL_GRAPH.bits()
            | Self::PARTICLE_EMITTER_GRAPH.bits()
            | Self::ANIM_GRAPH.bits()
            | Self::VISUAL_SCRIPT_GRAPH.bits();
        /// Node cannot be deleted by the user
        const NO_REMOVE = 1 << 8;
        /// Node is hidden from the spawn menu
        const NO_SPAWN_VIA_GUI = 1 << 9;
        /// Node cannot be created by pasting
        const NO_SPAWN_VIA_PASTE = 1 << 10;
        /// Node has no close button
        const NO_CLOSE_BUTTON = 1 << 11;
        /// Value array length may differ from the defaults
        const VARIABLE_VALUES_SIZE = 1 << 12;
        /// Node cannot be moved
        const NO_MOVE = 1 << 13;
        /// Placeholder for a node type missing from the registry
        const MISSING = 1 << 14;
    }
}

/// Kind of element on a node.
///
/// The discriminant indexes the element factory table.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ElementKind {
    /// Input box
    Input = 0,
    /// Output box
    Output = 1,
    /// Checkbox bound to a value
    BoolValue = 2,
    /// Integer field bound to a value
    IntegerValue = 3,
    /// Float field bound to a value
    FloatValue = 4,
    /// Vector component fields bound to a value
    VectorValue = 5,
    /// Color picker bound to a value
    ColorValue = 6,
    /// Static label
    Text = 7,
    /// Text field bound to a value
    TextBox = 8,
    /// Combo box bound to an integer value
    ComboBox = 9,
    /// Enum picker bound to a value
    EnumValue = 10,
    /// Asset picker bound to a value
    AssetValue = 11,
}

impl ElementKind {
    /// Number of element kinds
    pub const COUNT: usize = 12;

    /// Whether the element is a box
    pub fn is_box(self) -> bool {
        matches!(self, Self::Input | Self::Output)
    }
}

/// Template of a single node element
#[derive(Debug, Clone, PartialEq)]
pub struct ElementArchetype {
    /// Element kind
    pub kind: ElementKind,
    /// Box id (boxes only)
    pub box_id: BoxId,
    /// Label text or tooltip
    pub text: String,
    /// Offset from the node's top-left corner (outputs are re-anchored to the right edge)
    pub position: [f32; 2],
    /// Element size
    pub size: [f32; 2],
    /// Declared box type; null means the node's connection hints decide
    pub connections_type: ScriptType,
    /// Box accepts at most one connection
    pub single: bool,
    /// Index of the bound node value
    pub value_index: Option<usize>,
}

impl ElementArchetype {
    fn row(y_level: f32) -> f32 {
        NODE_MARGIN_Y + NODE_HEADER_SIZE + y_level * LAYOUT_OFFSET_Y
    }

    /// Input box on row `y_level`
    pub fn input(
        y_level: f32,
        text: impl Into<String>,
        single: bool,
        ty: ScriptType,
        box_id: u8,
    ) -> Self {
        Self {
            kind: ElementKind::Input,
            box_id: BoxId(box_id),
            text: text.into(),
            position: [NODE_MARGIN_X - BOX_OFFSET_X, Self::row(y_level)],
            size: [BOX_SIZE, BOX_SIZE],
            connections_type: ty,
            single,
            value_index: None,
        }
    }

    /// Input box with an inline default value
    pub fn input_with_value(
        y_level: f32,
        text: impl Into<String>,
        ty: ScriptType,
        box_id: u8,
        value_index: usize,
    ) -> Self {
        Self {
            value_index: Some(value_index),
            ..Self::input(y_level, text, true, ty, box_id)
        }
    }

    /// Output box on row `y_level`
    pub fn output(y_level: f32, text: impl Into<String>, ty: ScriptType, box_id: u8) -> Self {
        Self {
            kind: ElementKind::Output,
            box_id: BoxId(box_id),
            text: text.into(),
            position: [0.0, Self::row(y_level)],
            size: [BOX_SIZE, BOX_SIZE],
            connections_type: ty,
            single: false,
            value_index: None,
        }
    }

    /// Output box accepting a single connection
    pub fn output_single(y_level: f32, text: impl Into<String>, ty: ScriptType, box_id: u8) -> Self {
        Self {
            single: true,
            ..Self::output(y_level, text, ty, box_id)
        }
    }

    fn value(kind: ElementKind, x: f32, y_level: f32, width: f32, value_index: usize) -> Self {
        Self {
            kind,
            box_id: BoxId(0),
            text: String::new(),
            position: [NODE_MARGIN_X + x, Self::row(y_level)],
            size: [width, 18.0],
            connections_type: ScriptType::NULL,
            single: false,
            value_index: Some(value_index),
        }
    }

    /// Checkbox bound to value `value_index`
    pub fn bool_value(x: f32, y_level: f32, value_index: usize) -> Self {
        Self::value(ElementKind::BoolValue, x, y_level, 18.0, value_index)
    }

    /// Integer field bound to value `value_index`
    pub fn integer_value(x: f32, y_level: f32, value_index: usize) -> Self {
        Self::value(ElementKind::IntegerValue, x, y_level, 50.0, value_index)
    }

    /// Float field bound to value `value_index`
    pub fn float_value(x: f32, y_level: f32, value_index: usize) -> Self {
        Self::value(ElementKind::FloatValue, x, y_level, 50.0, value_index)
    }

    /// Vector fields bound to value `value_index`
    pub fn vector_value(x: f32, y_level: f32, value_index: usize) -> Self {
        Self::value(ElementKind::VectorValue, x, y_level, 150.0, value_index)
    }

    /// Color picker bound to value `value_index`
    pub fn color_value(x: f32, y_level: f32, value_index: usize) -> Self {
        Self::value(ElementKind::ColorValue, x, y_level, 32.0, value_index)
    }

    /// Text field bound to value `value_index`
    pub fn text_box(x: f32, y_level: f32, width: f32, height: f32, value_index: usize) -> Self {
        Self {
            size: [width, height],
            ..Self::value(ElementKind::TextBox, x, y_level, width, value_index)
        }
    }

    /// Combo box bound to value `value_index`
    pub fn combo_box(x: f32, y_level: f32, width: f32, value_index: usize, items: &[&str]) -> Self {
        Self {
            text: items.join("\n"),
            ..Self::value(ElementKind::ComboBox, x, y_level, width, value_index)
        }
    }

    /// Enum picker bound to value `value_index`
    pub fn enum_value(x: f32, y_level: f32, width: f32, value_index: usize) -> Self {
        Self::value(ElementKind::EnumValue, x, y_level, width, value_index)
    }

    /// Asset picker bound to value `value_index`
    pub fn asset_value(x: f32, y_level: f32, value_index: usize, asset_type: &str) -> Self {
        Self {
            text: asset_type.to_owned(),
            ..Self::value(ElementKind::AssetValue, x, y_level, 80.0, value_index)
        }
    }

    /// Static label
    pub fn text(x: f32, y_level: f32, text: impl Into<String>) -> Self {
        Self {
            kind: ElementKind::Text,
            box_id: BoxId(0),
            text: text.into(),
            position: [NODE_MARGIN_X + x, Self::row(y_level)],
            size: [100.0, 16.0],
            connections_type: ScriptType::NULL,
            single: false,
            value_index: None,
        }
    }
}

/// Remaps the inferred node type for one dependent box.
pub type DependentBoxFilter = fn(&SurfaceBox, &ScriptType) -> ScriptType;

/// Template of a node type
#[derive(Debug, Clone)]
pub struct NodeArchetype {
    /// Type id, unique within the group
    pub type_id: u16,
    /// Display title
    pub title: String,
    /// Description
    pub description: String,
    /// Capability flags
    pub flags: NodeFlags,
    /// Nominal size
    pub size: [f32; 2],
    /// Default values
    pub default_values: Vec<Variant>,
    /// Elements in declaration order
    pub elements: Vec<ElementArchetype>,
    /// Nominal type used by type inference
    pub default_type: ScriptType,
    /// Boxes whose connections decide the node type, in priority order
    pub independent_boxes: Vec<BoxId>,
    /// Boxes that receive the inferred node type
    pub dependent_boxes: Vec<BoxId>,
    /// Optional per-box remap of the inferred type
    pub dependent_box_filter: Option<DependentBoxFilter>,
    /// Types accepted by boxes with no declared type
    pub connections_hints: ConnectionsHint,
    /// Index of the value holding a nested graph blob
    pub sub_graph_value: Option<usize>,
}

impl NodeArchetype {
    /// Create an archetype with no elements
    pub fn new(type_id: u16, title: impl Into<String>, size: [f32; 2]) -> Self {
        Self {
            type_id,
            title: title.into(),
            description: String::new(),
            flags: NodeFlags::ALL_GRAPHS,
            size,
            default_values: Vec::new(),
            elements: Vec::new(),
            default_type: ScriptType::NULL,
            independent_boxes: Vec::new(),
            dependent_boxes: Vec::new(),
            dependent_box_filter: None,
            connections_hints: ConnectionsHint::empty(),
            sub_graph_value: None,
        }
    }

    /// Set the description
    pub fn with_description(mut self, description: impl Into<String>) -> Self {
        self.description = description.into();
        self
    }

    /// Set the flags
    pub fn with_flags(mut self, flags: NodeFlags) -> Self {
        self.flags = flags;
        self
    }

    /// Set the default values
    pub fn with_values(mut self, values: Vec<Variant>) -> Self {
        self.default_values = values;
        self
    }

    /// Set the elements
    pub fn with_elements(mut self, elements: Vec<ElementArchetype>) -> Self {
        self.elements = elements;
        self
    }

    /// Declare type inference: `independent` boxes decide the type that `dependent` boxes receive
    pub fn with_type_inference(
        mut self,
        default_type: ScriptType,
        independent: &[u8],
        dependent: &[u8],
    ) -> Self {
        self.default_type = default_type;
        self.independent_boxes = independent.iter().copied().map(BoxId).collect();
        self.dependent_boxes = dependent.iter().copied().map(BoxId).collect();
        self
    }

    /// Set the dependent box filter
    pub fn with_dependent_filter(mut self, filter: DependentBoxFilter) -> Self {
        self.dependent_box_filter = Some(filter);
        self
    }

    /// Set the connection hints
    pub fn with_hints(mut self, hints: ConnectionsHint) -> Self {
        self.connections_hints = hints;
        self
    }

    /// Mark value `index` as the nested graph payload
    pub fn with_sub_graph(mut self, index: usize) -> Self {
        self.sub_graph_value = Some(index);
        self
    }

    /// Whether type inference is declared
    pub fn has_type_inference(&self) -> bool {
        !self.independent_boxes.is_empty()
    }

    /// Whether the user may delete instances
    pub fn can_be_deleted(&self) -> bool {
        !self.flags.contains(NodeFlags::NO_REMOVE)
    }

    /// Whether the spawn menu offers this archetype
    pub fn can_spawn_via_gui(&self) -> bool {
        !self.flags.contains(NodeFlags::NO_SPAWN_VIA_GUI)
    }

    /// Whether instances can be pasted
    pub fn can_be_pasted(&self) -> bool {
        !self.flags.contains(NodeFlags::NO_SPAWN_VIA_PASTE)
    }

    /// Whether the value count may vary
    pub fn has_variable_values(&self) -> bool {
        self.flags.contains(NodeFlags::VARIABLE_VALUES_SIZE)
    }

    /// Placeholder archetype for an unknown node type
    pub fn missing(type_id: u16) -> Self {
        Self::new(type_id, "Missing Node", [200.0, 80.0])
            .with_description("Node type is not registered")
            .with_flags(
                NodeFlags::ALL_GRAPHS
                    | NodeFlags::MISSING
                    | NodeFlags::NO_SPAWN_VIA_GUI
                    | NodeFlags::NO_SPAWN_VIA_PASTE
                    | NodeFlags::VARIABLE_VALUES_SIZE,
            )
    }
}

/// Globally unique node-type key: group id in the upper 16 bits.
pub fn node_key(group_id: u16, type_id: u16) -> u32 {
    (u32::from(group_id) << 16) | u32::from(type_id)
}

/// Split a node-type key into `(group_id, type_id)`
pub fn split_node_key(key: u32) -> (u16, u16) {
    ((key >> 16) as u16, (key & 0xFFFF) as u16)
}

/// A named group of node archetypes
#[derive(Debug, Clone)]
pub struct GroupArchetype {
    /// Group id
    pub group_id: u16,
    /// Display name
    pub name: String,
    /// Display color
    pub color: [u8; 3],
    /// Archetypes in this group
    pub archetypes: Vec<Arc<NodeArchetype>>,
}

impl GroupArchetype {
    /// Create a group
    pub fn new(group_id: u16, name: impl Into<String>, color: [u8; 3]) -> Self {
        Self {
            group_id,
            name: name.into(),
            color,
            archetypes: Vec::new(),
        }
    }

    /// Add an archetype
    pub fn with(mut self, archetype: NodeArchetype) -> Self {
        self.archetypes.push(Arc::new(archetype));
        self
    }

    /// Find an archetype by type id
    pub fn archetype(&self, type_id: u16) -> Option<&Arc<NodeArchetype>> {
        self.archetypes.iter().find(|a| a.type_id == type_id)
    }

    /// Placeholder group for an unknown group id
    pub fn missing(group_id: u16) -> Self {
        Self::new(group_id, "Missing", [200, 60, 60])
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_node_key() {
        let key = node_key(3, 17);
        assert_eq!(key, 0x0003_0011);
        assert_eq!(split_node_key(key), (3, 17));
    }

    #[test]
    fn test_flags() {
        let arch = NodeArchetype::new(1, "Output", [100.0, 50.0]).with_flags(NodeFlags::NO_REMOVE);
        assert!(!arch.can_be_deleted());
        assert!(arch.can_be_pasted());

        let missing = NodeArchetype::missing(5);
        assert!(missing.has_variable_values());
        assert!(!missing.can_spawn_via_gui());
    }
}
