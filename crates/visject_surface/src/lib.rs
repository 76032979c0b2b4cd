// SPDX-License-Identifier: MIT OR Apache-2.0
//! Visject surface controller.
//!
//! The editing boundary around a [`visject_graph`] graph:
//! - [`VisjectSurface`], the single entry point for edits
//! - Undo/redo history built from graph snapshots
//! - Change notifications through [`SurfaceListener`]
//! - Copy/paste of node selections as graph blobs
//! - Surface settings stored as RON
//!
//! The graph crate itself never records undo steps; every undoable edit
//! goes through the surface, which captures the affected state before and
//! after the change.

pub mod commands;
pub mod history;
pub mod listener;
pub mod report;
pub mod settings;
pub mod surface;

pub use commands::{GraphPatch, NodeSnapshot};
pub use history::{History, HistoryError, HistoryStats};
pub use listener::{RecordingListener, SurfaceListener, SurfaceNotification};
pub use report::GraphReport;
pub use settings::{SurfaceSettings, SETTINGS_FILE_NAME};
pub use surface::{SpawnPredicate, SurfaceError, VisjectSurface};
