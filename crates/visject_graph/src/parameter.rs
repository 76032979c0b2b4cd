// SPDX-License-Identifier: MIT OR Apache-2.0
//! Graph parameters.

use crate::meta::{GraphMetadata, ATTRIBUTES_META_TYPE_ID};
use crate::types::ScriptType;
use crate::variant::Variant;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// A named, typed value exposed by a graph
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SurfaceParameter {
    /// Globally unique id
    pub id: Uuid,
    /// Display name
    pub name: String,
    /// Value type
    pub param_type: ScriptType,
    /// Visible outside the graph
    pub is_public: bool,
    /// Current value
    pub value: Variant,
    /// Attached metadata
    pub meta: GraphMetadata,
}

impl SurfaceParameter {
    /// Create a public parameter holding the type's default value
    pub fn new(name: impl Into<String>, param_type: ScriptType) -> Self {
        Self {
            id: Uuid::new_v4(),
            name: name.into(),
            value: Variant::default_for(&param_type),
            param_type,
            is_public: true,
            meta: GraphMetadata::new(),
        }
    }

    /// Set the value
    pub fn with_value(mut self, value: Variant) -> Self {
        self.value = value;
        self
    }

    /// Mark as internal
    pub fn private(mut self) -> Self {
        self.is_public = false;
        self
    }

    /// Raw attribute list blob
    pub fn attributes(&self) -> Option<&[u8]> {
        self.meta.get(ATTRIBUTES_META_TYPE_ID)
    }

    /// Replace the attribute list blob
    pub fn set_attributes(&mut self, data: Vec<u8>) {
        if data.is_empty() {
            self.meta.remove(ATTRIBUTES_META_TYPE_ID);
        } else {
            self.meta.add_entry(ATTRIBUTES_META_TYPE_ID, data);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_new_parameter_uses_type_default() {
        let param = SurfaceParameter::new("Speed", ScriptType::FLOAT);
        assert_eq!(param.value, Variant::Float(0.0));
        assert!(param.is_public);
        assert!(!param.id.is_nil());
    }

    #[test]
    fn test_attributes() {
        let mut param = SurfaceParameter::new("Tint", ScriptType::COLOR).private();
        assert!(param.attributes().is_none());
        param.set_attributes(vec![1, 2, 3]);
        assert_eq!(param.attributes(), Some(&[1u8, 2, 3][..]));
        param.set_attributes(Vec::new());
        assert!(param.attributes().is_none());
    }
}
