//! # Widget Collaborators
//!
//! The tree view and the property panel the `ObjectModel` keeps in sync.
//! Concrete toolkits implement these traits; `crate::headless` provides
//! in-memory versions.
//!
//! ## Table of Contents
//! 1. NodeHandle / TreeWidget - Hierarchy view with label + icon columns
//! 2. MenuEntry - Context menu contents
//! 3. PanelProperty / PanelAttribute / PropertyPanel - Property editor grid
//! 4. PanelEdit - Value-changed notification coming from the panel

use serde::{Deserialize, Serialize};

use crate::icons::Icon;
use crate::value::PropertyValue;

// ============================================================================
// Tree
// ============================================================================

/// Opaque handle of a tree row, issued by the widget
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct NodeHandle(pub u64);

/// Hierarchy view
pub trait TreeWidget {
    /// Column headers and fixed width of the visibility column
    fn configure_columns(&mut self, headers: &[String], visibility_column: usize, visibility_width: u32);
    fn set_header_icon(&mut self, column: usize, icon: Icon);

    /// Create a row under `parent`, or a top-level row
    fn add_node(&mut self, parent: Option<NodeHandle>, label: &str) -> NodeHandle;
    /// Detach a row from its parent (or the top level) and drop it
    fn remove_node(&mut self, node: NodeHandle);

    fn set_text(&mut self, node: NodeHandle, column: usize, text: &str);
    fn set_icon(&mut self, node: NodeHandle, column: usize, icon: Icon);

    fn expand(&mut self, node: NodeHandle);
    fn collapse(&mut self, node: NodeHandle);

    fn selected_nodes(&self) -> Vec<NodeHandle>;
    /// Select and scroll to a row
    fn set_current(&mut self, node: NodeHandle);

    /// Show a popup menu at `position`; returns the chosen action label
    fn popup_menu(&mut self, entries: &[MenuEntry], position: (i32, i32)) -> Option<String>;
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum MenuEntry {
    Action(String),
    Separator,
}

// ============================================================================
// Property panel
// ============================================================================

/// Opaque handle of a panel field, issued by the panel
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct PanelProperty(pub u64);

/// Formatting/constraint attribute applied to a panel field
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum PanelAttribute {
    Decimals(u32),
    Minimum(f64),
    Maximum(f64),
    SingleStep(f64),
    EnumNames(Vec<String>),
    ReadOnly(bool),
}

impl PanelAttribute {
    pub fn name(&self) -> &'static str {
        match self {
            PanelAttribute::Decimals(_) => "decimals",
            PanelAttribute::Minimum(_) => "minimum",
            PanelAttribute::Maximum(_) => "maximum",
            PanelAttribute::SingleStep(_) => "singleStep",
            PanelAttribute::EnumNames(_) => "enumNames",
            PanelAttribute::ReadOnly(_) => "readOnly",
        }
    }
}

/// Property editing grid
pub trait PropertyPanel {
    fn clear(&mut self);

    fn add_property(&mut self, name: &str, value: &PropertyValue) -> PanelProperty;
    fn add_enum_property(&mut self, name: &str, index: usize) -> PanelProperty;
    /// Group row found by `name`, displayed as `label`
    fn add_group(&mut self, name: &str, label: &str) -> PanelProperty;
    fn add_sub_property(&mut self, group: PanelProperty, name: &str, value: f64) -> PanelProperty;

    /// Top-level field or group registered under `name`
    fn find_property(&self, name: &str) -> Option<PanelProperty>;
    fn sub_properties(&self, group: PanelProperty) -> Vec<PanelProperty>;

    fn set_attribute(&mut self, property: PanelProperty, attribute: PanelAttribute);
    fn set_value(&mut self, property: PanelProperty, value: &PropertyValue);
    fn set_label(&mut self, property: PanelProperty, label: &str);
}

/// A field edited by the user
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PanelEdit {
    pub name: String,
    pub value: PropertyValue,
    /// Element of a sequence group; these edits are not written back
    pub is_sub_property: bool,
}

impl PanelEdit {
    pub fn new(name: impl Into<String>, value: impl Into<PropertyValue>) -> Self {
        Self {
            name: name.into(),
            value: value.into(),
            is_sub_property: false,
        }
    }

    pub fn sub_property(name: impl Into<String>, value: f64) -> Self {
        Self {
            name: name.into(),
            value: PropertyValue::Number(value),
            is_sub_property: true,
        }
    }
}

/// Label of a sequence group: `"Position [1, 2, 3]"`
pub fn group_label(name: &str, values: &[f64]) -> String {
    let parts: Vec<String> = values.iter().map(|v| v.to_string()).collect();
    format!("{} [{}]", name, parts.join(", "))
}
