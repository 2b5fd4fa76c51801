//! # Property Panel Synchronization
//!
//! Keeps the property panel showing the active object's properties, in both
//! directions.
//!
//! ## Table of Contents
//! 1. Selection -> panel (`on_tree_selection_changed`, `add_properties_to_panel`)
//! 2. Panel edit -> model (`on_property_changed`, `handle_panel_event`)
//! 3. Model -> panel (`update_property_panel`)
//!
//! Every write the model makes into the panel runs with the suppress-sync flag
//! raised, so the panel's own value-changed notification for that write is
//! dropped instead of being applied to the model a second time.

use crate::attributes::PropertyAttributes;
use crate::error::{ObjectModelError, Result};
use crate::events::PanelEvent;
use crate::item::{ObjectId, ObjectItem};
use crate::model::ObjectModel;
use crate::value::PropertyValue;
use crate::widgets::{group_label, PanelAttribute, PanelEdit, PanelProperty, PropertyPanel};

impl ObjectModel {
    /// Rebuild the panel for the newly selected object
    pub fn on_tree_selection_changed(&mut self) {
        {
            let _guard = self.sync.suppress();
            self.panel.clear();
        }
        let Some(id) = self.active_object() else {
            return;
        };
        tracing::debug!(object = %id, "Active object changed");
        self.populate_panel(id);
    }

    /// Add the object's visible properties to the panel
    pub fn add_properties_to_panel(&mut self, id: ObjectId) -> Result<()> {
        if !self.contains(id) {
            return Err(ObjectModelError::ObjectNotFound(id));
        }
        self.populate_panel(id);
        Ok(())
    }

    fn populate_panel(&mut self, id: ObjectId) {
        let Some(entry) = self.entries.get(&id) else {
            return;
        };
        let _guard = self.sync.suppress();
        add_item_properties(self.panel.as_mut(), entry.item.as_ref());
    }

    pub fn handle_panel_event(&mut self, event: PanelEvent) {
        match event {
            PanelEvent::ValueChanged(edit) => self.on_property_changed(edit),
        }
    }

    /// Apply a user edit to the active object
    ///
    /// Dropped while the model is writing into the panel, for element fields
    /// of a sequence group, and for read-only properties.
    pub fn on_property_changed(&mut self, edit: PanelEdit) {
        if self.sync.is_suppressed() {
            tracing::trace!(property = %edit.name, "Panel edit ignored while syncing");
            return;
        }
        if edit.is_sub_property {
            return;
        }
        let Some(id) = self.active_object() else {
            return;
        };
        let Some(item) = self.item(id) else {
            return;
        };
        if !item.has_property(&edit.name) {
            tracing::debug!(object = %id, property = %edit.name, "Panel edit for unknown property");
            return;
        }
        if item.property_attributes(&edit.name).read_only {
            tracing::debug!(object = %id, property = %edit.name, "Panel edit to read-only property ignored");
            return;
        }

        let kind = edit.value.type_name();
        match self.set_property(id, &edit.name, edit.value) {
            Ok(()) => tracing::debug!(object = %id, property = %edit.name, "Panel edit applied"),
            Err(err) => {
                tracing::warn!(object = %id, property = %edit.name, kind, error = %err, "Panel edit rejected")
            }
        }
    }

    /// Write one property's current value into the panel
    ///
    /// Only the active object is shown; anything else, or a property without
    /// a panel field, is a no-op.
    pub fn update_property_panel(&mut self, id: ObjectId, name: &str) {
        if self.active_object() != Some(id) {
            return;
        }
        let Some(field) = self.panel.find_property(name) else {
            return;
        };
        let Some(value) = self
            .item(id)
            .filter(|item| item.has_property(name))
            .map(|item| item.get_property(name).clone())
        else {
            return;
        };

        if let Some(values) = value.as_sequence() {
            let elements = self.panel.sub_properties(field);
            if elements.len() != values.len() {
                // Element fields can't be added or dropped one by one
                self.rebuild_panel(id);
                return;
            }
            let _guard = self.sync.suppress();
            for (sub, v) in elements.into_iter().zip(values) {
                self.panel.set_value(sub, &PropertyValue::Number(*v));
            }
            self.panel.set_label(field, &group_label(name, values));
            return;
        }

        let _guard = self.sync.suppress();
        self.panel.set_value(field, &value);
    }

    fn rebuild_panel(&mut self, id: ObjectId) {
        tracing::trace!(object = %id, "Rebuilding property panel");
        {
            let _guard = self.sync.suppress();
            self.panel.clear();
        }
        self.populate_panel(id);
    }
}

/// Render every shown property of `item`, in insertion order
fn add_item_properties(panel: &mut dyn PropertyPanel, item: &dyn ObjectItem) {
    for (name, value, attributes) in item.base().properties().iter() {
        if attributes.hidden || value.is_absent() {
            continue;
        }
        match value {
            PropertyValue::Sequence(values) => {
                let group = panel.add_group(name, &group_label(name, values));
                for (index, v) in values.iter().enumerate() {
                    let element = panel.add_sub_property(group, &format!("{}[{}]", name, index), *v);
                    apply_attributes(panel, element, attributes);
                }
            }
            _ if attributes.is_enum() => {
                let field = panel.add_enum_property(name, value.as_enum().unwrap_or_default());
                apply_attributes(panel, field, attributes);
            }
            _ => {
                let field = panel.add_property(name, value);
                apply_attributes(panel, field, attributes);
            }
        }
    }
}

fn apply_attributes(panel: &mut dyn PropertyPanel, field: PanelProperty, attributes: &PropertyAttributes) {
    panel.set_attribute(field, PanelAttribute::Decimals(attributes.decimals));
    panel.set_attribute(field, PanelAttribute::Minimum(attributes.minimum));
    panel.set_attribute(field, PanelAttribute::Maximum(attributes.maximum));
    panel.set_attribute(field, PanelAttribute::SingleStep(attributes.single_step));
    if let Some(names) = &attributes.enum_names {
        panel.set_attribute(field, PanelAttribute::EnumNames(names.clone()));
    }
    if attributes.read_only {
        panel.set_attribute(field, PanelAttribute::ReadOnly(true));
    }
}
