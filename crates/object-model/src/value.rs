//! Property values
//!
//! ## Table of Contents
//! 1. Color - 8-bit RGB color
//! 2. PropertyValue - Closed set of value types a property can hold

use serde::{Deserialize, Serialize};
use std::fmt;

// ============================================================================
// Color
// ============================================================================

/// 8-bit RGB color, the value type of "Color" properties
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Color {
    pub r: u8,
    pub g: u8,
    pub b: u8,
}

impl Color {
    pub const WHITE: Color = Color::rgb(255, 255, 255);

    pub const fn rgb(r: u8, g: u8, b: u8) -> Self {
        Self { r, g, b }
    }

    /// Build from 0.0-1.0 channels (clamped)
    pub fn from_unit_rgb(rgb: [f64; 3]) -> Self {
        let channel = |c: f64| (c.clamp(0.0, 1.0) * 255.0).round() as u8;
        Self::rgb(channel(rgb[0]), channel(rgb[1]), channel(rgb[2]))
    }

    /// Channels scaled to 0.0-1.0, the form renderers expect
    pub fn to_unit_rgb(self) -> [f64; 3] {
        [
            self.r as f64 / 255.0,
            self.g as f64 / 255.0,
            self.b as f64 / 255.0,
        ]
    }
}

impl Default for Color {
    fn default() -> Self {
        Color::WHITE
    }
}

impl fmt::Display for Color {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{:02x}{:02x}{:02x}", self.r, self.g, self.b)
    }
}

// ============================================================================
// PropertyValue
// ============================================================================

/// Value stored under a property name
///
/// Properties whose attributes declare enum names always store `Enum(index)`;
/// labels are resolved to indices on write.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum PropertyValue {
    Number(f64),
    Bool(bool),
    Text(String),
    Color(Color),
    Enum(usize),
    Sequence(Vec<f64>),
    /// No value yet; never shown in the property panel
    Empty,
}

impl PropertyValue {
    pub fn as_f64(&self) -> Option<f64> {
        match self {
            PropertyValue::Number(n) => Some(*n),
            PropertyValue::Enum(i) => Some(*i as f64),
            _ => None,
        }
    }

    pub fn as_bool(&self) -> Option<bool> {
        match self {
            PropertyValue::Bool(b) => Some(*b),
            _ => None,
        }
    }

    pub fn as_str(&self) -> Option<&str> {
        match self {
            PropertyValue::Text(s) => Some(s),
            _ => None,
        }
    }

    pub fn as_color(&self) -> Option<Color> {
        match self {
            PropertyValue::Color(c) => Some(*c),
            _ => None,
        }
    }

    pub fn as_enum(&self) -> Option<usize> {
        match self {
            PropertyValue::Enum(i) => Some(*i),
            _ => None,
        }
    }

    pub fn as_sequence(&self) -> Option<&[f64]> {
        match self {
            PropertyValue::Sequence(values) => Some(values),
            _ => None,
        }
    }

    /// True for values the panel skips: `Empty` and empty sequences
    pub fn is_absent(&self) -> bool {
        match self {
            PropertyValue::Empty => true,
            PropertyValue::Sequence(values) => values.is_empty(),
            _ => false,
        }
    }

    /// Short type tag used in log output
    pub fn type_name(&self) -> &'static str {
        match self {
            PropertyValue::Number(_) => "number",
            PropertyValue::Bool(_) => "bool",
            PropertyValue::Text(_) => "text",
            PropertyValue::Color(_) => "color",
            PropertyValue::Enum(_) => "enum",
            PropertyValue::Sequence(_) => "sequence",
            PropertyValue::Empty => "empty",
        }
    }
}

impl fmt::Display for PropertyValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            PropertyValue::Number(n) => write!(f, "{}", n),
            PropertyValue::Bool(b) => write!(f, "{}", b),
            PropertyValue::Text(s) => write!(f, "{}", s),
            PropertyValue::Color(c) => write!(f, "{}", c),
            PropertyValue::Enum(i) => write!(f, "{}", i),
            PropertyValue::Sequence(values) => {
                let parts: Vec<String> = values.iter().map(|v| v.to_string()).collect();
                write!(f, "{}", parts.join(", "))
            }
            PropertyValue::Empty => Ok(()),
        }
    }
}

impl From<f64> for PropertyValue {
    fn from(value: f64) -> Self {
        PropertyValue::Number(value)
    }
}

impl From<bool> for PropertyValue {
    fn from(value: bool) -> Self {
        PropertyValue::Bool(value)
    }
}

impl From<&str> for PropertyValue {
    fn from(value: &str) -> Self {
        PropertyValue::Text(value.to_string())
    }
}

impl From<String> for PropertyValue {
    fn from(value: String) -> Self {
        PropertyValue::Text(value)
    }
}

impl From<Color> for PropertyValue {
    fn from(value: Color) -> Self {
        PropertyValue::Color(value)
    }
}

impl From<Vec<f64>> for PropertyValue {
    fn from(value: Vec<f64>) -> Self {
        PropertyValue::Sequence(value)
    }
}

impl<T: Into<PropertyValue>> From<Option<T>> for PropertyValue {
    fn from(value: Option<T>) -> Self {
        value.map(Into::into).unwrap_or(PropertyValue::Empty)
    }
}
