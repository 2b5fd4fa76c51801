//! # Object Model Items
//!
//! ## Table of Contents
//! 1. ObjectId - Stable arena handle of an attached item
//! 2. ItemBase - State shared by every item (properties, icon, attachment)
//! 3. ObjectItem - Trait implemented by containers, models and geometry
//!
//! ## Change propagation
//!
//! Items never hold a pointer to the model that owns them. While attached,
//! every property write and icon change is recorded in the item's outbox and
//! the owning `ObjectModel` drains it before the mutating call returns,
//! refreshing the tree row and the property panel. Detached items skip the
//! outbox entirely.

use std::any::Any;
use std::fmt;

use serde::{Deserialize, Serialize};

use crate::attributes::PropertyAttributes;
use crate::error::Result;
use crate::icons::Icon;
use crate::poly_data::DataSetId;
use crate::properties::{PropertySet, NAME_PROPERTY};
use crate::value::PropertyValue;

// ============================================================================
// ObjectId
// ============================================================================

/// Handle of an item registered in an `ObjectModel`
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct ObjectId(pub(crate) u64);

impl fmt::Display for ObjectId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{}", self.0)
    }
}

// ============================================================================
// ItemBase
// ============================================================================

/// Pending notifications for the owning model
#[derive(Debug, Default)]
pub(crate) struct ChangeOutbox {
    pub properties: Vec<String>,
    pub icon: bool,
}

impl ChangeOutbox {
    pub fn is_empty(&self) -> bool {
        self.properties.is_empty() && !self.icon
    }
}

/// State every item carries
#[derive(Debug)]
pub struct ItemBase {
    properties: PropertySet,
    icon: Icon,
    attached: bool,
    outbox: ChangeOutbox,
}

impl ItemBase {
    /// New detached base holding a hidden "Name" property
    pub fn new(name: impl Into<String>, icon: Icon) -> Self {
        let mut properties = PropertySet::new();
        // A fresh set cannot conflict
        let _ = properties.add_property(
            NAME_PROPERTY,
            PropertyValue::Text(name.into()),
            Some(PropertyAttributes::new().hidden()),
        );
        Self {
            properties,
            icon,
            attached: false,
            outbox: ChangeOutbox::default(),
        }
    }

    pub fn name(&self) -> &str {
        self.properties
            .get_property(NAME_PROPERTY)
            .as_str()
            .unwrap_or_default()
    }

    pub fn icon(&self) -> Icon {
        self.icon
    }

    pub fn properties(&self) -> &PropertySet {
        &self.properties
    }

    /// Raw store access; writes made here are not reported to the model
    pub fn properties_mut(&mut self) -> &mut PropertySet {
        &mut self.properties
    }

    /// Whether the item is currently registered in an object model
    pub fn is_attached(&self) -> bool {
        self.attached
    }

    /// Write a property and report it to the owning model, without running
    /// any item hook. Used to mirror state that already changed elsewhere.
    pub fn store_property(&mut self, name: &str, value: PropertyValue) -> Result<()> {
        self.properties.set_property(name, value)?;
        self.notify_property_changed(name);
        Ok(())
    }

    pub fn notify_property_changed(&mut self, name: &str) {
        if self.attached {
            self.outbox.properties.push(name.to_string());
        }
    }

    pub(crate) fn set_icon(&mut self, icon: Icon) {
        self.icon = icon;
        if self.attached {
            self.outbox.icon = true;
        }
    }

    pub(crate) fn set_attached(&mut self, attached: bool) {
        self.attached = attached;
        if !attached {
            self.outbox = ChangeOutbox::default();
        }
    }

    pub(crate) fn take_changes(&mut self) -> ChangeOutbox {
        std::mem::take(&mut self.outbox)
    }
}

// ============================================================================
// ObjectItem
// ============================================================================

/// An addressable entity of the hierarchy
///
/// Implementors provide access to their `ItemBase` and override the hooks
/// they care about; property operations come for free.
pub trait ObjectItem: Any {
    fn base(&self) -> &ItemBase;
    fn base_mut(&mut self) -> &mut ItemBase;
    fn as_any(&self) -> &dyn Any;
    fn as_any_mut(&mut self) -> &mut dyn Any;

    /// Runs after `add_property` registered `name`
    fn on_property_added(&mut self, _name: &str) {}

    /// Runs synchronously after `set_property` stored a new value
    fn on_property_changed(&mut self, _name: &str) {}

    /// Runs for each item (children first) as it is removed from a model
    fn on_remove_from_object_model(&mut self) {}

    /// Context menu actions in display order; `None` marks a separator
    fn action_names(&self) -> Vec<Option<String>> {
        Vec::new()
    }

    fn on_action(&mut self, _action: &str) {}

    /// Whether this item renders the given dataset
    fn has_data_set(&self, _data_set: DataSetId) -> bool {
        false
    }

    fn name(&self) -> &str {
        self.base().name()
    }

    fn icon(&self) -> Icon {
        self.base().icon()
    }

    fn set_icon(&mut self, icon: Icon) {
        self.base_mut().set_icon(icon);
    }

    fn add_property(
        &mut self,
        name: &str,
        value: PropertyValue,
        attributes: Option<PropertyAttributes>,
    ) -> Result<()> {
        self.base_mut()
            .properties_mut()
            .add_property(name, value, attributes)?;
        self.on_property_added(name);
        Ok(())
    }

    fn has_property(&self, name: &str) -> bool {
        self.base().properties().has_property(name)
    }

    /// # Panics
    /// If `name` was never added.
    fn get_property(&self, name: &str) -> &PropertyValue {
        self.base().properties().get_property(name)
    }

    /// # Panics
    /// If `name` was never added.
    fn set_property(&mut self, name: &str, value: PropertyValue) -> Result<()> {
        self.base_mut().store_property(name, value)?;
        self.on_property_changed(name);
        Ok(())
    }

    fn property_names(&self) -> Vec<String> {
        self.base()
            .properties()
            .property_names()
            .map(str::to_string)
            .collect()
    }

    /// # Panics
    /// If `name` was never added.
    fn property_attributes(&self, name: &str) -> &PropertyAttributes {
        self.base().properties().attributes(name)
    }

    /// Read by canonical or alternate name (`"point_size"` for `"Point Size"`)
    fn get(&self, name: &str) -> Option<&PropertyValue> {
        self.base().properties().get(name)
    }

    /// Write by canonical or alternate name
    ///
    /// # Panics
    /// If `name` resolves to no property.
    fn set(&mut self, name: &str, value: PropertyValue) -> Result<()> {
        let canonical = match self.base().properties().resolve_name(name) {
            Some(canonical) => canonical.to_string(),
            None => panic!("property '{}' does not exist", name),
        };
        self.set_property(&canonical, value)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::items::ContainerItem;

    #[test]
    fn test_new_item_has_hidden_name() {
        let item = ContainerItem::new("Robots");
        assert_eq!(item.name(), "Robots");
        assert!(item.property_attributes(NAME_PROPERTY).hidden);
        assert_eq!(item.property_names(), vec!["Name".to_string()]);
    }

    #[test]
    fn test_detached_changes_are_not_recorded() {
        let mut item = ContainerItem::new("Robots");
        item.set_property(NAME_PROPERTY, "Renamed".into()).unwrap();
        assert_eq!(item.name(), "Renamed");
        assert!(item.base_mut().take_changes().is_empty());
    }

    #[test]
    fn test_attached_changes_are_recorded() {
        let mut item = ContainerItem::new("Robots");
        item.base_mut().set_attached(true);
        item.set_property(NAME_PROPERTY, "Renamed".into()).unwrap();
        item.set_icon(Icon::Laser);

        let changes = item.base_mut().take_changes();
        assert_eq!(changes.properties, vec!["Name".to_string()]);
        assert!(changes.icon);
        assert!(item.base_mut().take_changes().is_empty());
    }

    #[test]
    fn test_alias_write() {
        let mut item = ContainerItem::new("Robots");
        item.add_property("Point Size", 1.0.into(), None).unwrap();
        item.set("point_size", 4.0.into()).unwrap();
        assert_eq!(item.get_property("Point Size"), &PropertyValue::Number(4.0));
        assert_eq!(item.get("point_size"), Some(&PropertyValue::Number(4.0)));
    }
}
