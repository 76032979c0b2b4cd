// SPDX-License-Identifier: MIT OR Apache-2.0
//! Typed metadata blobs attached to graphs, nodes and parameters.

use serde::{Deserialize, Serialize};

/// Metadata type id of the surface view entry
pub const SURFACE_META_TYPE_ID: i32 = 10;
/// Metadata type id of the per-node entry
pub const NODE_META_TYPE_ID: i32 = 11;
/// Metadata type id of attribute lists
pub const ATTRIBUTES_META_TYPE_ID: i32 = 12;

/// A single metadata entry
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MetaEntry {
    /// Entry type id
    pub type_id: i32,
    /// Raw entry data
    pub data: Vec<u8>,
}

/// Ordered map from type id to blob
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct GraphMetadata {
    entries: Vec<MetaEntry>,
}

impl GraphMetadata {
    /// Create empty metadata
    pub fn new() -> Self {
        Self::default()
    }

    /// Entries in stored order
    pub fn entries(&self) -> &[MetaEntry] {
        &self.entries
    }

    /// Number of entries
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Whether there are no entries
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Get an entry by type id
    pub fn get(&self, type_id: i32) -> Option<&[u8]> {
        self.entries
            .iter()
            .find(|e| e.type_id == type_id)
            .map(|e| e.data.as_slice())
    }

    /// Add or replace an entry, keeping the position of a replaced entry
    pub fn add_entry(&mut self, type_id: i32, data: Vec<u8>) {
        match self.entries.iter_mut().find(|e| e.type_id == type_id) {
            Some(entry) => entry.data = data,
            None => self.entries.push(MetaEntry { type_id, data }),
        }
    }

    /// Remove an entry
    pub fn remove(&mut self, type_id: i32) -> Option<Vec<u8>> {
        let index = self.entries.iter().position(|e| e.type_id == type_id)?;
        Some(self.entries.remove(index).data)
    }

    /// Remove all entries
    pub fn clear(&mut self) {
        self.entries.clear();
    }
}

fn f32_at(data: &[u8], offset: usize) -> f32 {
    let mut raw = [0u8; 4];
    raw.copy_from_slice(&data[offset..offset + 4]);
    f32::from_le_bytes(raw)
}

/// Surface view state (type 10): view center and zoom
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct SurfaceViewMeta {
    /// View center in surface space
    pub view_center: [f32; 2],
    /// Zoom
    pub scale: f32,
}

impl Default for SurfaceViewMeta {
    fn default() -> Self {
        Self {
            view_center: [0.0, 0.0],
            scale: 1.0,
        }
    }
}

impl SurfaceViewMeta {
    /// Encoded size
    pub const SIZE: usize = 12;

    /// Encode as the fixed 12-byte layout
    pub fn to_bytes(&self) -> Vec<u8> {
        let mut data = Vec::with_capacity(Self::SIZE);
        data.extend_from_slice(&self.view_center[0].to_le_bytes());
        data.extend_from_slice(&self.view_center[1].to_le_bytes());
        data.extend_from_slice(&self.scale.to_le_bytes());
        data
    }

    /// Decode; `None` when the blob has the wrong size
    pub fn from_bytes(data: &[u8]) -> Option<Self> {
        (data.len() == Self::SIZE).then(|| Self {
            view_center: [f32_at(data, 0), f32_at(data, 4)],
            scale: f32_at(data, 8),
        })
    }
}

/// Per-node state (type 11): position and selection
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct NodeMeta {
    /// Node position
    pub position: [f32; 2],
    /// Selection flag
    pub selected: bool,
}

impl NodeMeta {
    /// Encoded size
    pub const SIZE: usize = 9;

    /// Encode as the fixed 9-byte layout
    pub fn to_bytes(&self) -> Vec<u8> {
        let mut data = Vec::with_capacity(Self::SIZE);
        data.extend_from_slice(&self.position[0].to_le_bytes());
        data.extend_from_slice(&self.position[1].to_le_bytes());
        data.push(u8::from(self.selected));
        data
    }

    /// Decode; `None` when the blob has the wrong size
    pub fn from_bytes(data: &[u8]) -> Option<Self> {
        (data.len() == Self::SIZE).then(|| Self {
            position: [f32_at(data, 0), f32_at(data, 4)],
            selected: data[8] != 0,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_add_entry_replaces_in_place() {
        let mut meta = GraphMetadata::new();
        meta.add_entry(1, vec![1]);
        meta.add_entry(2, vec![2]);
        meta.add_entry(1, vec![3]);
        assert_eq!(meta.len(), 2);
        assert_eq!(meta.entries()[0].type_id, 1);
        assert_eq!(meta.get(1), Some(&[3u8][..]));
        assert_eq!(meta.remove(2), Some(vec![2]));
        assert!(meta.get(2).is_none());
    }

    #[test]
    fn test_fixed_layouts() {
        let view = SurfaceViewMeta {
            view_center: [12.5, -4.0],
            scale: 0.75,
        };
        let bytes = view.to_bytes();
        assert_eq!(bytes.len(), SurfaceViewMeta::SIZE);
        assert_eq!(SurfaceViewMeta::from_bytes(&bytes), Some(view));

        let node = NodeMeta {
            position: [100.0, 200.0],
            selected: false,
        };
        let bytes = node.to_bytes();
        assert_eq!(bytes.len(), NodeMeta::SIZE);
        assert_eq!(bytes[8], 0);
        assert_eq!(NodeMeta::from_bytes(&bytes), Some(node));
        assert!(NodeMeta::from_bytes(&bytes[..8]).is_none());
    }
}
