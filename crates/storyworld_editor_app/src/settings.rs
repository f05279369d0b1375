// SPDX-License-Identifier: MIT OR Apache-2.0
//! Editor settings persisted as RON.

use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use storyworld_editor_node::ObjectKind;

/// Current settings format version
pub const SETTINGS_FORMAT_VERSION: u32 = 1;

/// Default settings file name
pub const SETTINGS_FILE_NAME: &str = "storyworld_editor.ron";

/// Window settings
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct WindowSettings {
    /// Window title
    pub title: String,
    /// Initial width in logical pixels
    pub width: u32,
    /// Initial height in logical pixels
    pub height: u32,
}

impl Default for WindowSettings {
    fn default() -> Self {
        Self {
            title: "Storyworld Editor".to_string(),
            width: 1280,
            height: 800,
        }
    }
}

/// Object tree panel settings
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TreePanelSettings {
    /// Name given to newly created objects
    pub new_object_name: String,
    /// Kind given to newly created objects
    pub new_object_kind: ObjectKind,
    /// Show the outcome of the last tree edit under the toolbar
    pub show_status: bool,
}

impl Default for TreePanelSettings {
    fn default() -> Self {
        Self {
            new_object_name: "New Object".to_string(),
            new_object_kind: ObjectKind::Scenery,
            show_status: true,
        }
    }
}

/// Complete editor settings
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EditorSettings {
    /// Settings format version
    pub version: u32,
    /// Window settings
    #[serde(default)]
    pub window: WindowSettings,
    /// Tree panel settings
    #[serde(default)]
    pub tree: TreePanelSettings,
    /// Extra tracing filter directive, e.g. `storyworld_editor_tree=debug`
    #[serde(default)]
    pub log_filter: Option<String>,
    /// World document opened at startup and used by Save/Reload
    #[serde(default)]
    pub document: Option<PathBuf>,
}

impl Default for EditorSettings {
    fn default() -> Self {
        Self {
            version: SETTINGS_FORMAT_VERSION,
            window: WindowSettings::default(),
            tree: TreePanelSettings::default(),
            log_filter: None,
            document: None,
        }
    }
}

impl EditorSettings {
    /// Load settings from a file
    pub fn load(path: &Path) -> std::io::Result<Self> {
        let content = std::fs::read_to_string(path)?;
        let settings: EditorSettings = ron::from_str(&content).map_err(|e| {
            std::io::Error::new(std::io::ErrorKind::InvalidData, e.to_string())
        })?;

        if settings.version > SETTINGS_FORMAT_VERSION {
            return Err(std::io::Error::new(
                std::io::ErrorKind::InvalidData,
                format!(
                    "Settings version {} is newer than supported version {}",
                    settings.version, SETTINGS_FORMAT_VERSION
                ),
            ));
        }

        Ok(settings)
    }

    /// Save settings to a file
    pub fn save(&self, path: &Path) -> std::io::Result<()> {
        let config = ron::ser::PrettyConfig::default()
            .struct_names(true)
            .enumerate_arrays(false);

        let content = ron::ser::to_string_pretty(self, config).map_err(|e| {
            std::io::Error::new(std::io::ErrorKind::InvalidData, e.to_string())
        })?;

        std::fs::write(path, content)
    }
}
