//! # Property Attributes
//!
//! Metadata governing how a property is edited and displayed: numeric range,
//! precision, step, enum labels, visibility and read-only state.

use serde::{Deserialize, Serialize};

/// Edit/display metadata attached to every property
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct PropertyAttributes {
    /// Decimal places shown by numeric editors
    pub decimals: u32,
    pub minimum: f64,
    pub maximum: f64,
    pub single_step: f64,
    /// Hidden properties are never added to the property panel
    pub hidden: bool,
    /// When set, the property's value is always an index into these labels
    pub enum_names: Option<Vec<String>>,
    pub read_only: bool,
}

impl Default for PropertyAttributes {
    fn default() -> Self {
        Self {
            decimals: 5,
            minimum: -1e4,
            maximum: 1e4,
            single_step: 1.0,
            hidden: false,
            enum_names: None,
            read_only: false,
        }
    }
}

impl PropertyAttributes {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_decimals(mut self, decimals: u32) -> Self {
        self.decimals = decimals;
        self
    }

    pub fn with_range(mut self, minimum: f64, maximum: f64) -> Self {
        self.minimum = minimum;
        self.maximum = maximum;
        self
    }

    pub fn with_single_step(mut self, single_step: f64) -> Self {
        self.single_step = single_step;
        self
    }

    pub fn hidden(mut self) -> Self {
        self.hidden = true;
        self
    }

    pub fn with_enum_names<I, S>(mut self, names: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.enum_names = Some(names.into_iter().map(Into::into).collect());
        self
    }

    pub fn read_only(mut self) -> Self {
        self.read_only = true;
        self
    }

    /// Index of `label` within the enum names, if this is an enum property
    pub fn enum_index(&self, label: &str) -> Option<usize> {
        self.enum_names
            .as_ref()
            .and_then(|names| names.iter().position(|name| name == label))
    }

    /// Label at `index`, if this is an enum property and the index is in range
    pub fn enum_label(&self, index: usize) -> Option<&str> {
        self.enum_names
            .as_ref()
            .and_then(|names| names.get(index))
            .map(String::as_str)
    }

    pub fn is_enum(&self) -> bool {
        self.enum_names.is_some()
    }
}
