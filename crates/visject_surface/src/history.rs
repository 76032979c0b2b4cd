// SPDX-License-Identifier: MIT OR Apache-2.0
//! Undo/redo history of surface edits.
//!
//! Each entry stores bincode snapshots of the graph state an edit touched,
//! before and after. Undo restores the `before` snapshot, redo the `after`.

use serde::{Deserialize, Serialize};
use std::collections::VecDeque;
use thiserror::Error;

/// Default undo depth
pub const MAX_HISTORY: usize = 100;

/// History errors
#[derive(Debug, Error)]
pub enum HistoryError {
    /// Nothing to undo
    #[error("Nothing to undo")]
    NothingToUndo,

    /// Nothing to redo
    #[error("Nothing to redo")]
    NothingToRedo,

    /// Serialization error
    #[error("Serialization error: {0}")]
    Serialization(#[from] bincode::Error),
}

/// Result type for history operations
pub type Result<T> = std::result::Result<T, HistoryError>;

/// Unique edit id
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct ActionId(u64);

impl ActionId {
    /// Raw id value
    pub fn value(&self) -> u64 {
        self.0
    }
}

/// Serialized graph state
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Snapshot {
    /// bincode bytes
    pub data: Vec<u8>,
}

impl Snapshot {
    /// Serialize a value
    pub fn from_value<T: Serialize>(value: &T) -> Result<Self> {
        Ok(Self {
            data: bincode::serialize(value)?,
        })
    }

    /// Deserialize the value
    pub fn to_value<T: for<'de> Deserialize<'de>>(&self) -> Result<T> {
        Ok(bincode::deserialize(&self.data)?)
    }

    /// Size in bytes
    pub fn size(&self) -> usize {
        self.data.len()
    }
}

/// One undoable edit
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct UndoAction {
    /// Unique id
    pub id: ActionId,
    /// Human-readable description
    pub description: String,
    /// State before the edit
    pub before: Snapshot,
    /// State after the edit
    pub after: Snapshot,
}

impl UndoAction {
    /// Memory held by both snapshots
    pub fn memory_size(&self) -> usize {
        self.before.size() + self.after.size()
    }
}

/// History statistics
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct HistoryStats {
    /// Entries on the undo stack
    pub undo_count: usize,
    /// Entries on the redo stack
    pub redo_count: usize,
    /// Bytes held by snapshots on the undo stack
    pub memory_used: usize,
    /// Maximum undo depth
    pub max_depth: usize,
}

/// Undo/redo stacks
#[derive(Debug)]
pub struct History {
    undo_stack: VecDeque<UndoAction>,
    redo_stack: VecDeque<UndoAction>,
    next_id: u64,
    max_depth: usize,
    memory_used: usize,
}

impl History {
    /// Create a history with the default depth
    pub fn new() -> Self {
        Self::with_max_depth(MAX_HISTORY)
    }

    /// Create with a custom maximum depth
    pub fn with_max_depth(max_depth: usize) -> Self {
        Self {
            undo_stack: VecDeque::new(),
            redo_stack: VecDeque::new(),
            next_id: 1,
            max_depth,
            memory_used: 0,
        }
    }

    /// Record an edit, dropping the redo stack.
    ///
    /// Edits whose snapshots are identical are not recorded.
    pub fn record(&mut self, description: impl Into<String>, before: Snapshot, after: Snapshot) -> Option<ActionId> {
        if before == after {
            return None;
        }
        let id = ActionId(self.next_id);
        self.next_id += 1;
        let action = UndoAction {
            id,
            description: description.into(),
            before,
            after,
        };

        self.redo_stack.clear();
        self.memory_used += action.memory_size();
        self.undo_stack.push_back(action);
        self.trim();
        Some(id)
    }

    fn trim(&mut self) {
        while self.undo_stack.len() > self.max_depth {
            if let Some(old) = self.undo_stack.pop_front() {
                self.memory_used = self.memory_used.saturating_sub(old.memory_size());
            }
        }
    }

    /// Pop the last edit for undoing
    pub fn undo(&mut self) -> Result<UndoAction> {
        let action = self.undo_stack.pop_back().ok_or(HistoryError::NothingToUndo)?;
        self.memory_used = self.memory_used.saturating_sub(action.memory_size());
        self.redo_stack.push_back(action.clone());
        Ok(action)
    }

    /// Pop the last undone edit for redoing
    pub fn redo(&mut self) -> Result<UndoAction> {
        let action = self.redo_stack.pop_back().ok_or(HistoryError::NothingToRedo)?;
        self.memory_used += action.memory_size();
        self.undo_stack.push_back(action.clone());
        Ok(action)
    }

    /// Whether undo is available
    pub fn can_undo(&self) -> bool {
        !self.undo_stack.is_empty()
    }

    /// Whether redo is available
    pub fn can_redo(&self) -> bool {
        !self.redo_stack.is_empty()
    }

    /// Change the maximum depth, dropping the oldest entries if needed
    pub fn set_max_depth(&mut self, max_depth: usize) {
        self.max_depth = max_depth;
        self.trim();
    }

    /// Clear all history
    pub fn clear(&mut self) {
        self.undo_stack.clear();
        self.redo_stack.clear();
        self.memory_used = 0;
    }

    /// History statistics
    pub fn stats(&self) -> HistoryStats {
        HistoryStats {
            undo_count: self.undo_stack.len(),
            redo_count: self.redo_stack.len(),
            memory_used: self.memory_used,
            max_depth: self.max_depth,
        }
    }

    /// Description of the next undo
    pub fn undo_description(&self) -> Option<&str> {
        self.undo_stack.back().map(|a| a.description.as_str())
    }

    /// Description of the next redo
    pub fn redo_description(&self) -> Option<&str> {
        self.redo_stack.back().map(|a| a.description.as_str())
    }
}

impl Default for History {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn snap(v: u32) -> Snapshot {
        Snapshot::from_value(&v).unwrap()
    }

    #[test]
    fn test_undo_redo_order() {
        let mut history = History::new();
        history.record("first", snap(0), snap(1));
        history.record("second", snap(1), snap(2));
        assert_eq!(history.undo_description(), Some("second"));

        let action = history.undo().unwrap();
        assert_eq!(action.before.to_value::<u32>().unwrap(), 1);
        assert_eq!(history.redo_description(), Some("second"));

        let action = history.redo().unwrap();
        assert_eq!(action.after.to_value::<u32>().unwrap(), 2);
        assert!(!history.can_redo());
    }

    #[test]
    fn test_record_clears_redo() {
        let mut history = History::new();
        history.record("a", snap(0), snap(1));
        history.undo().unwrap();
        history.record("b", snap(0), snap(5));
        assert!(!history.can_redo());
        assert!(matches!(history.redo(), Err(HistoryError::NothingToRedo)));
    }

    #[test]
    fn test_depth_limit_and_noop_edits() {
        let mut history = History::with_max_depth(2);
        assert!(history.record("noop", snap(3), snap(3)).is_none());
        for i in 0..5 {
            history.record(format!("edit {i}"), snap(i), snap(i + 1));
        }
        let stats = history.stats();
        assert_eq!(stats.undo_count, 2);
        assert_eq!(stats.memory_used, 16);
        assert_eq!(history.undo_description(), Some("edit 4"));

        history.set_max_depth(1);
        assert_eq!(history.stats().undo_count, 1);
        history.clear();
        assert!(matches!(history.undo(), Err(HistoryError::NothingToUndo)));
    }
}
