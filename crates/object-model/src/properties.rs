//! # Property Store
//!
//! Ordered, dynamically typed property storage for object model items.
//!
//! ## Table of Contents
//! 1. clean_property_name - Alternate-name sanitizer
//! 2. PropertySet - Values, attributes and the alternate-name index
//!
//! Every property has attributes (defaulted when none are given) and an
//! alternate name: the canonical name lower-cased with every character other
//! than `[a-z0-9_]` replaced by `_`, prefixed with `_` when it starts with a
//! digit. Alternate names are unique within one set, so `"My Name!"` and
//! `"My_Name_"` cannot coexist.

use std::collections::HashMap;

use crate::attributes::PropertyAttributes;
use crate::error::{ObjectModelError, Result};
use crate::value::PropertyValue;

/// Property every item carries
pub const NAME_PROPERTY: &str = "Name";

/// Drives the tree's eye icon when present
pub const VISIBLE_PROPERTY: &str = "Visible";

/// Sanitize a property name into its identifier-style alternate name
pub fn clean_property_name(name: &str) -> String {
    let mut cleaned = String::with_capacity(name.len() + 1);
    if name.starts_with(|c: char| c.is_ascii_digit()) {
        cleaned.push('_');
    }
    for c in name.chars() {
        if c.is_ascii_alphanumeric() || c == '_' {
            cleaned.push(c.to_ascii_lowercase());
        } else {
            cleaned.push('_');
        }
    }
    cleaned
}

/// Insertion-ordered property map with per-property attributes
#[derive(Debug, Clone, Default)]
pub struct PropertySet {
    /// Canonical names in insertion order (panel display order)
    order: Vec<String>,
    values: HashMap<String, PropertyValue>,
    attributes: HashMap<String, PropertyAttributes>,
    /// Alternate name -> canonical name
    alternate_names: HashMap<String, String>,
}

impl PropertySet {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn len(&self) -> usize {
        self.order.len()
    }

    pub fn is_empty(&self) -> bool {
        self.order.is_empty()
    }

    /// Register a property, or overwrite value and attributes of an existing one
    ///
    /// Fails with `NameConflict` when `name` is new but its alternate name is
    /// already taken by a different property. Nothing is modified on failure.
    pub fn add_property(
        &mut self,
        name: &str,
        value: PropertyValue,
        attributes: Option<PropertyAttributes>,
    ) -> Result<()> {
        let alternate = clean_property_name(name);
        let is_new = !self.values.contains_key(name);

        if is_new {
            if let Some(existing) = self.alternate_names.get(&alternate) {
                return Err(ObjectModelError::NameConflict {
                    property: name.to_string(),
                    existing: existing.clone(),
                    alternate,
                });
            }
        }

        let attributes = attributes.unwrap_or_default();
        let value = resolve_enum_value(name, value, &attributes)?;

        if is_new {
            self.order.push(name.to_string());
        }
        self.alternate_names.insert(alternate, name.to_string());
        self.values.insert(name.to_string(), value);
        self.attributes.insert(name.to_string(), attributes);
        Ok(())
    }

    pub fn has_property(&self, name: &str) -> bool {
        self.values.contains_key(name)
    }

    /// Canonical property names in insertion order
    pub fn property_names(&self) -> impl Iterator<Item = &str> {
        self.order.iter().map(String::as_str)
    }

    /// Value of a registered property
    ///
    /// # Panics
    /// If `name` was never added; reading an unknown property is a caller bug.
    pub fn get_property(&self, name: &str) -> &PropertyValue {
        match self.values.get(name) {
            Some(value) => value,
            None => panic!("property '{}' does not exist", name),
        }
    }

    /// Write a registered property, resolving enum labels to indices
    ///
    /// On `UnknownEnumValue` the previous value is kept.
    ///
    /// # Panics
    /// If `name` was never added.
    pub fn set_property(&mut self, name: &str, value: PropertyValue) -> Result<()> {
        assert!(self.has_property(name), "property '{}' does not exist", name);
        let value = resolve_enum_value(name, value, self.attributes(name))?;
        self.values.insert(name.to_string(), value);
        Ok(())
    }

    /// Canonical name for a canonical or alternate name, looked up against
    /// the current contents
    pub fn resolve_name<'a>(&'a self, name: &'a str) -> Option<&'a str> {
        if self.values.contains_key(name) {
            return Some(name);
        }
        self.alternate_names.get(name).map(String::as_str)
    }

    /// Read by canonical or alternate name
    pub fn get(&self, name: &str) -> Option<&PropertyValue> {
        self.resolve_name(name).and_then(|canonical| self.values.get(canonical))
    }

    /// Alternate name of a registered property
    pub fn alternate_name_of(&self, name: &str) -> Option<String> {
        self.has_property(name).then(|| clean_property_name(name))
    }

    /// Attributes of a registered property
    ///
    /// # Panics
    /// If `name` was never added.
    pub fn attributes(&self, name: &str) -> &PropertyAttributes {
        match self.attributes.get(name) {
            Some(attributes) => attributes,
            None => panic!("property '{}' does not exist", name),
        }
    }

    pub fn attributes_mut(&mut self, name: &str) -> Option<&mut PropertyAttributes> {
        self.attributes.get_mut(name)
    }

    /// Remove a property along with its attributes and alternate name
    ///
    /// "Name" is permanent and is never removed.
    pub fn remove_property(&mut self, name: &str) -> Option<PropertyValue> {
        if name == NAME_PROPERTY {
            return None;
        }
        let value = self.values.remove(name)?;
        self.attributes.remove(name);
        self.order.retain(|n| n != name);
        let alternate = clean_property_name(name);
        if self.alternate_names.get(&alternate).map(String::as_str) == Some(name) {
            self.alternate_names.remove(&alternate);
        }
        Some(value)
    }

    /// (name, value, attributes) in insertion order
    pub fn iter(&self) -> impl Iterator<Item = (&str, &PropertyValue, &PropertyAttributes)> {
        self.order.iter().filter_map(move |name| {
            let value = self.values.get(name)?;
            let attributes = self.attributes.get(name)?;
            Some((name.as_str(), value, attributes))
        })
    }
}

/// Map a symbolic enum label to its index and range-check raw indices;
/// non-enum properties pass through
fn resolve_enum_value(
    name: &str,
    value: PropertyValue,
    attributes: &PropertyAttributes,
) -> Result<PropertyValue> {
    if !attributes.is_enum() {
        return Ok(value);
    }
    match value {
        PropertyValue::Enum(index) if attributes.enum_label(index).is_some() => Ok(value),
        PropertyValue::Text(ref label) => attributes
            .enum_index(label)
            .map(PropertyValue::Enum)
            .ok_or_else(|| ObjectModelError::UnknownEnumValue {
                property: name.to_string(),
                value: label.clone(),
            }),
        other => Err(ObjectModelError::UnknownEnumValue {
            property: name.to_string(),
            value: other.to_string(),
        }),
    }
}
