// SPDX-License-Identifier: MIT OR Apache-2.0
//! Surface configuration, stored as RON.

use serde::{Deserialize, Serialize};
use std::path::Path;
use visject_graph::LayoutSettings;

/// Default settings file name
pub const SETTINGS_FILE_NAME: &str = "visject.ron";

/// Editing behaviour of a surface
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SurfaceSettings {
    /// Gap between auto-layout columns and rows
    pub layout_gap: f32,
    /// Gap used when distributed nodes do not fit their bounds
    pub distribute_gap: f32,
    /// Maximum number of undo steps
    pub undo_depth: usize,
    /// Reject every edit
    pub read_only: bool,
    /// Re-check that loaded connections still type-check
    pub validate_connections_on_load: bool,
}

impl Default for SurfaceSettings {
    fn default() -> Self {
        Self {
            layout_gap: 30.0,
            distribute_gap: 10.0,
            undo_depth: 100,
            read_only: false,
            validate_connections_on_load: false,
        }
    }
}

impl SurfaceSettings {
    /// Parse settings from RON
    pub fn from_ron(text: &str) -> Result<Self, ron::error::SpannedError> {
        ron::from_str(text)
    }

    /// Serialize settings to pretty RON
    pub fn to_ron(&self) -> Result<String, ron::Error> {
        let config = ron::ser::PrettyConfig::default().struct_names(true);
        ron::ser::to_string_pretty(self, config)
    }

    /// Load settings from a file; a missing file yields the defaults
    pub fn load(path: &Path) -> std::io::Result<Self> {
        let content = match std::fs::read_to_string(path) {
            Ok(content) => content,
            Err(err) if err.kind() == std::io::ErrorKind::NotFound => {
                tracing::debug!("No settings at {}, using defaults", path.display());
                return Ok(Self::default());
            }
            Err(err) => return Err(err),
        };
        Self::from_ron(&content)
            .map_err(|e| std::io::Error::new(std::io::ErrorKind::InvalidData, e.to_string()))
    }

    /// Save settings to a file
    pub fn save(&self, path: &Path) -> std::io::Result<()> {
        let content = self
            .to_ron()
            .map_err(|e| std::io::Error::new(std::io::ErrorKind::InvalidData, e.to_string()))?;
        std::fs::write(path, content)
    }

    /// Layout tuning derived from these settings
    pub fn layout(&self) -> LayoutSettings {
        LayoutSettings {
            gap: self.layout_gap,
            distribute_gap: self.distribute_gap,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_ron_roundtrip() {
        let settings = SurfaceSettings {
            layout_gap: 42.0,
            read_only: true,
            ..SurfaceSettings::default()
        };
        let text = settings.to_ron().unwrap();
        assert!(text.contains("SurfaceSettings"));
        assert_eq!(SurfaceSettings::from_ron(&text).unwrap(), settings);
    }

    #[test]
    fn test_partial_file_uses_defaults() {
        let settings = SurfaceSettings::from_ron("(undo_depth: 5)").unwrap();
        assert_eq!(settings.undo_depth, 5);
        assert_eq!(settings.layout_gap, 30.0);
        assert_eq!(settings.layout().distribute_gap, 10.0);
    }

    #[test]
    fn test_missing_file_yields_defaults() {
        let path = std::env::temp_dir().join("visject-missing-settings-file.ron");
        let _ = std::fs::remove_file(&path);
        assert_eq!(SurfaceSettings::load(&path).unwrap(), SurfaceSettings::default());
    }

    #[test]
    fn test_save_and_load() {
        let path = std::env::temp_dir().join(format!("visject-settings-{}.ron", std::process::id()));
        let settings = SurfaceSettings {
            undo_depth: 7,
            ..SurfaceSettings::default()
        };
        settings.save(&path).unwrap();
        assert_eq!(SurfaceSettings::load(&path).unwrap(), settings);
        std::fs::remove_file(&path).unwrap();
    }
}
