//! Object model configuration.

use serde::{Deserialize, Serialize};
use std::path::Path;

use crate::error::{ObjectModelError, Result};

/// Tree layout and interaction settings
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ObjectModelConfig {
    /// Tree column headers
    pub header_labels: Vec<String>,
    /// Column holding the item name and icon
    pub name_column: usize,
    /// Column holding the eye icon
    pub visibility_column: usize,
    /// Fixed width of the visibility column in pixels
    pub visibility_column_width: u32,
    /// Expand top-level rows when they are added
    pub expand_top_level: bool,
    /// Last entry of every context menu
    pub remove_action_label: String,
    /// Delete key removes the selected rows
    pub delete_removes_selection: bool,
}

impl Default for ObjectModelConfig {
    fn default() -> Self {
        Self {
            header_labels: vec!["Name".to_string(), String::new()],
            name_column: 0,
            visibility_column: 1,
            visibility_column_width: 24,
            expand_top_level: true,
            remove_action_label: "Remove".to_string(),
            delete_removes_selection: true,
        }
    }
}

impl ObjectModelConfig {
    /// Load configuration from a TOML file; missing keys keep their defaults
    pub fn from_file(path: impl AsRef<Path>) -> Result<Self> {
        let content = std::fs::read_to_string(path.as_ref())
            .map_err(|e| ObjectModelError::Config(format!("Failed to read config: {}", e)))?;
        let config: Self = toml::from_str(&content)?;
        config.validate()?;
        Ok(config)
    }

    /// Defaults overridden by environment variables
    pub fn from_env() -> Self {
        let mut config = Self::default();
        if let Some(expand) = std::env::var("OBJECT_MODEL_EXPAND_TOP_LEVEL")
            .ok()
            .and_then(|v| v.parse().ok())
        {
            config.expand_top_level = expand;
        }
        if let Some(width) = std::env::var("OBJECT_MODEL_VISIBILITY_COLUMN_WIDTH")
            .ok()
            .and_then(|v| v.parse().ok())
        {
            config.visibility_column_width = width;
        }
        config
    }

    pub fn validate(&self) -> Result<()> {
        let columns = self.header_labels.len();
        if self.name_column >= columns || self.visibility_column >= columns {
            return Err(ObjectModelError::Config(format!(
                "columns {} and {} need {} header labels, got {}",
                self.name_column,
                self.visibility_column,
                self.name_column.max(self.visibility_column) + 1,
                columns
            )));
        }
        if self.name_column == self.visibility_column {
            return Err(ObjectModelError::Config(
                "name and visibility columns must differ".to_string(),
            ));
        }
        Ok(())
    }
}
