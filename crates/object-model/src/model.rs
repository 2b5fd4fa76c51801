//! # Object Model
//!
//! Owns every item of the scene hierarchy and keeps the tree widget in step
//! with it.
//!
//! ## Table of Contents
//! 1. ObjectModel - Arena of items plus the node <-> object index
//! 2. Hierarchy - add/remove, lookups, containers
//! 3. Tree visuals - labels, icons, visibility column, expansion
//! 4. UI events - clicks, context menu, Delete key
//!
//! Panel synchronization lives in `crate::panel`.
//!
//! ## Ownership
//!
//! Items are moved into the model when added and addressed by `ObjectId`
//! afterwards. Children are listed on their parent's entry in insertion
//! order; top-level items are listed in `roots`. Mutable access goes through
//! `with_item_mut`/`with_item_as`, which refresh the tree and panel from the
//! item's recorded changes before returning.

use std::collections::{BTreeMap, HashMap};

use crate::config::ObjectModelConfig;
use crate::error::{ObjectModelError, Result};
use crate::events::{Key, TreeEvent};
use crate::icons::Icon;
use crate::item::{ObjectId, ObjectItem};
use crate::items::ContainerItem;
use crate::poly_data::DataSetId;
use crate::properties::{NAME_PROPERTY, VISIBLE_PROPERTY};
use crate::sync::SyncFlag;
use crate::value::PropertyValue;
use crate::widgets::{MenuEntry, NodeHandle, PropertyPanel, TreeWidget};

pub(crate) struct Entry {
    pub item: Box<dyn ObjectItem>,
    pub node: NodeHandle,
    pub parent: Option<ObjectId>,
    pub children: Vec<ObjectId>,
}

/// Hierarchy of items mirrored into a tree widget and a property panel
pub struct ObjectModel {
    pub(crate) tree: Box<dyn TreeWidget>,
    pub(crate) panel: Box<dyn PropertyPanel>,
    pub(crate) config: ObjectModelConfig,
    pub(crate) entries: BTreeMap<ObjectId, Entry>,
    roots: Vec<ObjectId>,
    nodes: HashMap<NodeHandle, ObjectId>,
    next_id: u64,
    pub(crate) sync: SyncFlag,
}

impl ObjectModel {
    /// Model with default configuration
    pub fn new(tree: Box<dyn TreeWidget>, panel: Box<dyn PropertyPanel>) -> Self {
        Self::with_config(tree, panel, ObjectModelConfig::default())
    }

    pub fn with_config(
        tree: Box<dyn TreeWidget>,
        panel: Box<dyn PropertyPanel>,
        config: ObjectModelConfig,
    ) -> Self {
        let mut model = Self {
            tree,
            panel,
            config,
            entries: BTreeMap::new(),
            roots: Vec::new(),
            nodes: HashMap::new(),
            next_id: 1,
            sync: SyncFlag::new(),
        };
        model.setup_widgets();
        model
    }

    /// Bind new widgets, recreating a row for every registered item
    pub fn init(&mut self, tree: Box<dyn TreeWidget>, panel: Box<dyn PropertyPanel>) {
        self.tree = tree;
        self.panel = panel;
        self.nodes.clear();
        self.setup_widgets();

        for id in self.roots.clone() {
            self.rebuild_rows(id, None);
        }
        tracing::debug!(objects = self.entries.len(), "Object model bound to new widgets");
    }

    fn setup_widgets(&mut self) {
        let visibility_column = self.config.visibility_column;
        self.tree.configure_columns(
            &self.config.header_labels,
            visibility_column,
            self.config.visibility_column_width,
        );
        self.tree.set_header_icon(visibility_column, Icon::Eye);

        let _guard = self.sync.suppress();
        self.panel.clear();
    }

    fn rebuild_rows(&mut self, id: ObjectId, parent_node: Option<NodeHandle>) {
        let Some(entry) = self.entries.get(&id) else {
            return;
        };
        let children = entry.children.clone();
        let node = self.tree.add_node(parent_node, entry.item.name());
        if let Some(entry) = self.entries.get_mut(&id) {
            entry.node = node;
        }
        self.nodes.insert(node, id);
        self.present_row(id, node, parent_node.is_none());

        for child in children {
            self.rebuild_rows(child, Some(node));
        }
    }

    fn present_row(&mut self, id: ObjectId, node: NodeHandle, top_level: bool) {
        self.update_object_icon(id);
        self.update_vis_icon(id);
        if top_level && self.config.expand_top_level {
            self.tree.expand(node);
        }
    }

    pub fn config(&self) -> &ObjectModelConfig {
        &self.config
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    // ========================================================================
    // Hierarchy
    // ========================================================================

    /// Register `item` under `parent` (or at the top level) and create its row
    ///
    /// # Panics
    /// If the item already belongs to a model.
    pub fn add_to_object_model(
        &mut self,
        mut item: Box<dyn ObjectItem>,
        parent: Option<ObjectId>,
    ) -> Result<ObjectId> {
        assert!(
            !item.base().is_attached(),
            "'{}' is already in an object model",
            item.name()
        );
        let parent_node = match parent {
            Some(parent) => Some(self.node_for(parent).ok_or(ObjectModelError::ObjectNotFound(parent))?),
            None => None,
        };

        let node = self.tree.add_node(parent_node, item.name());
        let id = ObjectId(self.next_id);
        self.next_id += 1;

        item.base_mut().set_attached(true);
        tracing::debug!(object = %id, name = item.name(), parent = ?parent, "Object added");
        self.entries.insert(
            id,
            Entry {
                item,
                node,
                parent,
                children: Vec::new(),
            },
        );
        match parent.and_then(|p| self.entries.get_mut(&p)) {
            Some(parent_entry) => parent_entry.children.push(id),
            None => self.roots.push(id),
        }
        self.nodes.insert(node, id);

        self.present_row(id, node, parent.is_none());
        Ok(id)
    }

    /// Remove an item and its whole subtree, children first
    ///
    /// Every removed item gets `on_remove_from_object_model` before its row is
    /// dropped. The detached items are handed back in removal order (the
    /// subtree's root last) and may be added to a model again. Empty when `id`
    /// is not registered.
    pub fn remove_from_object_model(&mut self, id: ObjectId) -> Vec<Box<dyn ObjectItem>> {
        let mut removed = Vec::new();
        self.detach_subtree(id, &mut removed);
        removed
    }

    fn detach_subtree(&mut self, id: ObjectId, removed: &mut Vec<Box<dyn ObjectItem>>) {
        let Some(children) = self.entries.get(&id).map(|e| e.children.clone()) else {
            return;
        };
        for child in children {
            self.detach_subtree(child, removed);
        }

        let Some(mut entry) = self.entries.remove(&id) else {
            return;
        };
        entry.item.on_remove_from_object_model();
        entry.item.base_mut().set_attached(false);

        match entry.parent.and_then(|p| self.entries.get_mut(&p)) {
            Some(parent_entry) => parent_entry.children.retain(|c| *c != id),
            None => self.roots.retain(|r| *r != id),
        }
        self.tree.remove_node(entry.node);
        self.nodes.remove(&entry.node);

        tracing::debug!(object = %id, name = entry.item.name(), "Object removed");
        removed.push(entry.item);
    }

    /// Remove every item whose row is selected
    pub fn remove_selected_items(&mut self) {
        let selected: Vec<ObjectId> = self
            .tree
            .selected_nodes()
            .into_iter()
            .filter_map(|node| self.object_for_node(node))
            .collect();
        for id in selected {
            // Already gone when an ancestor was selected too
            self.remove_from_object_model(id);
        }
    }

    /// All registered objects in registration order
    pub fn objects(&self) -> Vec<ObjectId> {
        self.entries.keys().copied().collect()
    }

    pub fn contains(&self, id: ObjectId) -> bool {
        self.entries.contains_key(&id)
    }

    pub fn item(&self, id: ObjectId) -> Option<&dyn ObjectItem> {
        self.entries.get(&id).map(|e| e.item.as_ref())
    }

    /// Typed read access
    pub fn item_as<T: ObjectItem>(&self, id: ObjectId) -> Option<&T> {
        self.item(id).and_then(|item| item.as_any().downcast_ref::<T>())
    }

    /// Mutable access to an item; tree and panel are refreshed before returning
    pub fn with_item_mut<R>(
        &mut self,
        id: ObjectId,
        f: impl FnOnce(&mut dyn ObjectItem) -> R,
    ) -> Result<R> {
        let entry = self
            .entries
            .get_mut(&id)
            .ok_or(ObjectModelError::ObjectNotFound(id))?;
        let result = f(entry.item.as_mut());
        self.apply_changes(id);
        Ok(result)
    }

    /// Typed mutable access; `Ok(None)` when the item is not a `T`
    pub fn with_item_as<T: ObjectItem, R>(
        &mut self,
        id: ObjectId,
        f: impl FnOnce(&mut T) -> R,
    ) -> Result<Option<R>> {
        self.with_item_mut(id, |item| item.as_any_mut().downcast_mut::<T>().map(f))
    }

    /// Write a property through the item (hooks run) and refresh tree/panel
    ///
    /// # Panics
    /// If the item has no property `name`.
    pub fn set_property(&mut self, id: ObjectId, name: &str, value: PropertyValue) -> Result<()> {
        self.with_item_mut(id, |item| item.set_property(name, value))?
    }

    /// Read by canonical or alternate name
    pub fn get_property(&self, id: ObjectId, name: &str) -> Option<&PropertyValue> {
        self.item(id).and_then(|item| item.get(name))
    }

    /// Route an item's recorded changes to the tree and the panel
    fn apply_changes(&mut self, id: ObjectId) {
        let Some(entry) = self.entries.get_mut(&id) else {
            return;
        };
        let changes = entry.item.base_mut().take_changes();
        if changes.is_empty() {
            return;
        }
        for name in &changes.properties {
            self.update_property_panel(id, name);
            if name == VISIBLE_PROPERTY {
                self.update_vis_icon(id);
            } else if name == NAME_PROPERTY {
                self.update_object_name(id);
            }
        }
        if changes.icon {
            self.update_object_icon(id);
        }
    }

    /// First object named `name` among `parent`'s children, or among all
    /// objects in registration order
    pub fn find_object_by_name(&self, name: &str, parent: Option<ObjectId>) -> Option<ObjectId> {
        match parent {
            Some(parent) => self
                .children(parent)
                .iter()
                .copied()
                .find(|child| self.item(*child).is_some_and(|item| item.name() == name)),
            None => self
                .entries
                .iter()
                .find(|(_, entry)| entry.item.name() == name)
                .map(|(id, _)| *id),
        }
    }

    pub fn find_child(&self, parent: ObjectId, name: &str) -> Option<ObjectId> {
        self.find_object_by_name(name, Some(parent))
    }

    pub fn parent(&self, id: ObjectId) -> Option<ObjectId> {
        self.entries.get(&id).and_then(|e| e.parent)
    }

    /// Children in insertion order; empty for unknown ids
    pub fn children(&self, id: ObjectId) -> &[ObjectId] {
        self.entries
            .get(&id)
            .map(|e| e.children.as_slice())
            .unwrap_or(&[])
    }

    pub fn top_level_objects(&self) -> &[ObjectId] {
        &self.roots
    }

    /// First object that renders `data_set`
    pub fn find_object_by_data_set(&self, data_set: DataSetId) -> Option<ObjectId> {
        self.entries
            .iter()
            .find(|(_, entry)| entry.item.has_data_set(data_set))
            .map(|(id, _)| *id)
    }

    pub fn add_container(&mut self, name: &str, parent: Option<ObjectId>) -> Result<ObjectId> {
        self.add_to_object_model(Box::new(ContainerItem::new(name)), parent)
    }

    /// Any object already named `name` (searched model-wide), otherwise a
    /// new container under `parent`
    pub fn get_or_create_container(&mut self, name: &str, parent: Option<ObjectId>) -> Result<ObjectId> {
        match self.find_object_by_name(name, None) {
            Some(existing) => Ok(existing),
            None => self.add_container(name, parent),
        }
    }

    // ========================================================================
    // Selection and expansion
    // ========================================================================

    /// Object of the single selected row; none when zero or several rows are
    /// selected
    pub fn active_object(&self) -> Option<ObjectId> {
        match self.tree.selected_nodes().as_slice() {
            [node] => self.object_for_node(*node),
            _ => None,
        }
    }

    /// Select the object's row and show its properties
    pub fn set_active_object(&mut self, id: ObjectId) -> Result<()> {
        let node = self.node_for(id).ok_or(ObjectModelError::ObjectNotFound(id))?;
        self.tree.set_current(node);
        self.on_tree_selection_changed();
        Ok(())
    }

    pub fn expand(&mut self, id: ObjectId) -> Result<()> {
        let node = self.node_for(id).ok_or(ObjectModelError::ObjectNotFound(id))?;
        self.tree.expand(node);
        Ok(())
    }

    pub fn collapse(&mut self, id: ObjectId) -> Result<()> {
        let node = self.node_for(id).ok_or(ObjectModelError::ObjectNotFound(id))?;
        self.tree.collapse(node);
        Ok(())
    }

    // ========================================================================
    // Tree visuals
    // ========================================================================

    /// Eye/eye-off icon from "Visible"; nothing for items without it
    pub fn update_vis_icon(&mut self, id: ObjectId) {
        let Some(entry) = self.entries.get(&id) else {
            return;
        };
        if !entry.item.has_property(VISIBLE_PROPERTY) {
            return;
        }
        let visible = entry
            .item
            .get_property(VISIBLE_PROPERTY)
            .as_bool()
            .unwrap_or(false);
        self.tree
            .set_icon(entry.node, self.config.visibility_column, Icon::visibility(visible));
    }

    pub fn update_object_name(&mut self, id: ObjectId) {
        if let Some(entry) = self.entries.get(&id) {
            self.tree
                .set_text(entry.node, self.config.name_column, entry.item.name());
        }
    }

    pub fn update_object_icon(&mut self, id: ObjectId) {
        if let Some(entry) = self.entries.get(&id) {
            self.tree
                .set_icon(entry.node, self.config.name_column, entry.item.icon());
        }
    }

    // ========================================================================
    // UI events
    // ========================================================================

    pub fn handle_tree_event(&mut self, event: TreeEvent) {
        match event {
            TreeEvent::SelectionChanged => self.on_tree_selection_changed(),
            TreeEvent::ItemClicked { node, column } => self.on_item_clicked(node, column),
            TreeEvent::ContextMenuRequested { position } => self.on_context_menu(position),
            TreeEvent::KeyPressed(key) => {
                self.on_key_press(key);
            }
        }
    }

    /// A click on the visibility column toggles "Visible"
    pub fn on_item_clicked(&mut self, node: NodeHandle, column: usize) {
        if column != self.config.visibility_column {
            return;
        }
        let Some(id) = self.object_for_node(node) else {
            return;
        };
        let Some(visible) = self
            .item(id)
            .filter(|item| item.has_property(VISIBLE_PROPERTY))
            .and_then(|item| item.get_property(VISIBLE_PROPERTY).as_bool())
        else {
            return;
        };
        if let Err(err) = self.set_property(id, VISIBLE_PROPERTY, (!visible).into()) {
            tracing::warn!(object = %id, error = %err, "Failed to toggle visibility");
        }
    }

    /// Item actions, then a separator and the remove entry
    pub fn context_menu_entries(&self, id: ObjectId) -> Vec<MenuEntry> {
        let Some(item) = self.item(id) else {
            return Vec::new();
        };
        let mut entries: Vec<MenuEntry> = item
            .action_names()
            .into_iter()
            .map(|action| match action {
                Some(name) => MenuEntry::Action(name),
                None => MenuEntry::Separator,
            })
            .collect();
        entries.push(MenuEntry::Separator);
        entries.push(MenuEntry::Action(self.config.remove_action_label.clone()));
        entries
    }

    /// Pop up the active object's menu and run the chosen action
    pub fn on_context_menu(&mut self, position: (i32, i32)) {
        let Some(id) = self.active_object() else {
            return;
        };
        let entries = self.context_menu_entries(id);
        let Some(action) = self.tree.popup_menu(&entries, position) else {
            return;
        };
        if let Err(err) = self.on_context_menu_action(id, &action) {
            tracing::warn!(object = %id, action = %action, error = %err, "Context menu action failed");
        }
    }

    pub fn on_context_menu_action(&mut self, id: ObjectId, action: &str) -> Result<()> {
        if action == self.config.remove_action_label {
            if self.remove_from_object_model(id).is_empty() {
                return Err(ObjectModelError::ObjectNotFound(id));
            }
            return Ok(());
        }
        tracing::debug!(object = %id, action, "Context menu action");
        self.with_item_mut(id, |item| item.on_action(action))
    }

    /// Returns true when the key was consumed
    pub fn on_key_press(&mut self, key: Key) -> bool {
        if key == Key::Delete && self.config.delete_removes_selection {
            self.remove_selected_items();
            return true;
        }
        false
    }

    // ========================================================================
    // Index
    // ========================================================================

    pub fn node_for(&self, id: ObjectId) -> Option<NodeHandle> {
        self.entries.get(&id).map(|e| e.node)
    }

    pub fn object_for_node(&self, node: NodeHandle) -> Option<ObjectId> {
        self.nodes.get(&node).copied()
    }

    /// Handle on the suppress-sync flag for widget adapters
    pub fn sync_flag(&self) -> SyncFlag {
        self.sync.clone()
    }

    pub fn is_sync_suppressed(&self) -> bool {
        self.sync.is_suppressed()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::headless::{HeadlessModel, HeadlessPanel, HeadlessTree, HeadlessView, ModelCall};
    use crate::items::{ModelItem, ALPHA_PROPERTY};
    use crate::render::ViewId;

    struct Scene {
        model: ObjectModel,
        tree: HeadlessTree,
    }

    fn scene() -> Scene {
        let tree = HeadlessTree::new();
        let model = ObjectModel::new(Box::new(tree.clone()), Box::new(HeadlessPanel::new()));
        Scene { model, tree }
    }

    fn robot(path: &str) -> Box<ModelItem> {
        Box::new(ModelItem::new(Box::new(HeadlessModel::new(path))).unwrap())
    }

    /// Item that exposes actions and remembers which ran
    struct Scripted {
        base: crate::item::ItemBase,
        ran: Vec<String>,
    }

    impl ObjectItem for Scripted {
        fn base(&self) -> &crate::item::ItemBase {
            &self.base
        }
        fn base_mut(&mut self) -> &mut crate::item::ItemBase {
            &mut self.base
        }
        fn as_any(&self) -> &dyn std::any::Any {
            self
        }
        fn as_any_mut(&mut self) -> &mut dyn std::any::Any {
            self
        }
        fn action_names(&self) -> Vec<Option<String>> {
            vec![Some("Reload".to_string()), None, Some("Reset".to_string())]
        }
        fn on_action(&mut self, action: &str) {
            self.ran.push(action.to_string());
            self.set_icon(Icon::Matlab);
        }
    }

    fn scripted(name: &str) -> Box<Scripted> {
        Box::new(Scripted {
            base: crate::item::ItemBase::new(name, Icon::Robot),
            ran: Vec::new(),
        })
    }

    #[test]
    fn test_widget_setup() {
        let s = scene();
        assert_eq!(s.tree.headers(), vec!["Name".to_string(), String::new()]);
        assert_eq!(s.tree.header_icon(1), Some(Icon::Eye));
        assert_eq!(s.tree.visibility_column_width(), Some((1, 24)));
    }

    #[test]
    fn test_add_then_remove_leaves_no_mappings() {
        let mut s = scene();
        let id = s.model.add_to_object_model(robot("/m/atlas.urdf"), None).unwrap();
        let node = s.model.node_for(id).unwrap();
        assert_eq!(s.model.object_for_node(node), Some(id));
        assert_eq!(s.tree.label(node).as_deref(), Some("atlas.urdf"));
        assert!(s.tree.is_expanded(node));

        assert_eq!(s.model.remove_from_object_model(id).len(), 1);
        assert!(s.model.is_empty());
        assert!(s.model.objects().is_empty());
        assert!(s.model.top_level_objects().is_empty());
        assert_eq!(s.model.object_for_node(node), None);
        assert_eq!(s.tree.node_count(), 0);
        assert!(s.model.remove_from_object_model(id).is_empty());
    }

    #[test]
    fn test_children_are_not_expanded() {
        let mut s = scene();
        let robots = s.model.add_container("Robots", None).unwrap();
        let atlas = s.model.add_to_object_model(robot("/m/atlas.urdf"), Some(robots)).unwrap();

        let node = s.model.node_for(atlas).unwrap();
        assert!(!s.tree.is_expanded(node));
        assert_eq!(s.tree.parent(node), s.model.node_for(robots));
        assert_eq!(s.model.parent(atlas), Some(robots));
        assert_eq!(s.model.children(robots), &[atlas]);
        assert_eq!(s.tree.icon(s.model.node_for(robots).unwrap(), 0), Some(Icon::Directory));
    }

    #[test]
    fn test_add_under_unknown_parent_fails() {
        let mut s = scene();
        let id = s.model.add_container("Robots", None).unwrap();
        s.model.remove_from_object_model(id);

        let err = s.model.add_container("Sensors", Some(id)).unwrap_err();
        assert_eq!(err, ObjectModelError::ObjectNotFound(id));
        assert_eq!(s.tree.node_count(), 0);
    }

    #[test]
    #[should_panic(expected = "already in an object model")]
    fn test_double_attach_panics() {
        let mut s = scene();
        let mut item = ContainerItem::new("Robots");
        item.base_mut().set_attached(true);
        let _ = s.model.add_to_object_model(Box::new(item), None);
    }

    #[test]
    fn test_visibility_toggle_refreshes_icon_twice() {
        let mut s = scene();
        let id = s.model.add_to_object_model(robot("/m/atlas.urdf"), None).unwrap();
        let node = s.model.node_for(id).unwrap();
        assert_eq!(s.tree.icon_history(node, 1), vec![Icon::Eye]);

        s.model.set_property(id, VISIBLE_PROPERTY, false.into()).unwrap();
        s.model.set_property(id, VISIBLE_PROPERTY, true.into()).unwrap();

        let history = s.tree.icon_history(node, 1);
        assert_eq!(&history[1..], &[Icon::EyeOff, Icon::Eye]);
        assert_eq!(s.tree.icon(node, 1), Some(Icon::Eye));
    }

    #[test]
    fn test_rename_updates_label() {
        let mut s = scene();
        let id = s.model.add_container("Robots", None).unwrap();
        s.model.set_property(id, NAME_PROPERTY, "Vehicles".into()).unwrap();

        let node = s.model.node_for(id).unwrap();
        assert_eq!(s.tree.label(node).as_deref(), Some("Vehicles"));
        assert_eq!(s.model.find_object_by_name("Vehicles", None), Some(id));
    }

    #[test]
    fn test_get_or_create_container_is_idempotent() {
        let mut s = scene();
        let first = s.model.get_or_create_container("Robots", None).unwrap();
        let second = s.model.get_or_create_container("Robots", None).unwrap();

        assert_eq!(first, second);
        assert_eq!(s.tree.nodes_labeled("Robots").len(), 1);
        assert_eq!(s.model.len(), 1);
    }

    #[test]
    fn test_find_object_by_name_scopes() {
        let mut s = scene();
        let robots = s.model.add_container("Robots", None).unwrap();
        let sensors = s.model.add_container("Sensors", None).unwrap();
        let lidar_a = s.model.add_container("lidar", Some(robots)).unwrap();
        let lidar_b = s.model.add_container("lidar", Some(sensors)).unwrap();

        assert_eq!(s.model.find_object_by_name("lidar", None), Some(lidar_a));
        assert_eq!(s.model.find_child(sensors, "lidar"), Some(lidar_b));
        assert_eq!(s.model.find_child(sensors, "Robots"), None);
        assert_eq!(s.model.find_object_by_name("camera", None), None);
    }

    #[test]
    fn test_remove_detaches_views_recursively() {
        let mut s = scene();
        let view = HeadlessView::new(1);
        let atlas_backend = HeadlessModel::new("/m/atlas.urdf");
        let valkyrie_backend = HeadlessModel::new("/m/valkyrie.urdf");

        let robots = s.model.add_container("Robots", None).unwrap();
        let atlas = s
            .model
            .add_to_object_model(Box::new(ModelItem::new(Box::new(atlas_backend.clone())).unwrap()), Some(robots))
            .unwrap();
        let valkyrie = s
            .model
            .add_to_object_model(Box::new(ModelItem::new(Box::new(valkyrie_backend.clone())).unwrap()), Some(atlas))
            .unwrap();
        for id in [atlas, valkyrie] {
            s.model
                .with_item_as::<ModelItem, _>(id, |item| item.add_to_view(view.shared()))
                .unwrap();
            assert_eq!(s.model.item_as::<ModelItem>(id).unwrap().view_count(), 1);
        }

        let removed = s.model.remove_from_object_model(robots);
        assert!(s.model.is_empty());
        assert_eq!(s.tree.node_count(), 0);
        let names: Vec<&str> = removed.iter().map(|item| item.name()).collect();
        assert_eq!(names, vec!["valkyrie.urdf", "atlas.urdf", "Robots"]);
        for item in &removed {
            assert!(!item.base().is_attached());
            if let Some(model_item) = item.as_any().downcast_ref::<ModelItem>() {
                assert_eq!(model_item.view_count(), 0);
            }
        }
        for backend in [&atlas_backend, &valkyrie_backend] {
            assert!(backend.calls().contains(&ModelCall::RemoveFromRenderer(ViewId(1))));
        }
        // add (1 each) + remove (1 each)
        assert_eq!(view.render_count(), 4);
    }

    #[test]
    fn test_removed_item_can_be_added_again() {
        let mut s = scene();
        let robots = s.model.add_container("Robots", None).unwrap();
        let atlas = s.model.add_to_object_model(robot("/m/atlas.urdf"), Some(robots)).unwrap();
        s.model.set_property(atlas, ALPHA_PROPERTY, 0.3.into()).unwrap();

        let mut removed = s.model.remove_from_object_model(atlas);
        assert_eq!(s.model.children(robots), &[] as &[ObjectId]);
        let item = removed.pop().unwrap();
        assert!(removed.is_empty());

        let sensors = s.model.add_container("Sensors", None).unwrap();
        let readded = s.model.add_to_object_model(item, Some(sensors)).unwrap();
        assert_ne!(readded, atlas);
        assert_eq!(s.model.children(sensors), &[readded]);
        assert_eq!(s.model.top_level_objects(), &[robots, sensors]);
        assert_eq!(s.model.get_property(readded, ALPHA_PROPERTY), Some(&PropertyValue::Number(0.3)));
        let node = s.model.node_for(readded).unwrap();
        assert_eq!(s.tree.label(node).as_deref(), Some("atlas.urdf"));
        assert_eq!(s.tree.icon(node, 1), Some(Icon::Eye));
    }

    #[test]
    fn test_model_changed_resyncs_tree_and_panel() {
        let panel = HeadlessPanel::new();
        let tree = HeadlessTree::new();
        let mut model = ObjectModel::new(Box::new(tree.clone()), Box::new(panel.clone()));
        panel.observe_sync_flag(model.sync_flag());
        let backend = HeadlessModel::new("/m/atlas.urdf");
        let id = model
            .add_to_object_model(Box::new(ModelItem::new(Box::new(backend.clone())).unwrap()), None)
            .unwrap();
        model.set_active_object(id).unwrap();

        backend.reload(0.25, false);
        model
            .with_item_as::<ModelItem, _>(id, |item| item.on_model_changed())
            .unwrap()
            .unwrap()
            .unwrap();

        assert_eq!(model.get_property(id, ALPHA_PROPERTY), Some(&PropertyValue::Number(0.25)));
        assert_eq!(panel.value(ALPHA_PROPERTY), Some(PropertyValue::Number(0.25)));
        assert_eq!(panel.value(VISIBLE_PROPERTY), Some(PropertyValue::Bool(false)));
        let node = model.node_for(id).unwrap();
        assert_eq!(tree.icon(node, 1), Some(Icon::EyeOff));
        assert!(panel.write_guard_log().iter().all(|guarded| *guarded));
    }

    #[test]
    fn test_remove_selected_items() {
        let mut s = scene();
        let robots = s.model.add_container("Robots", None).unwrap();
        let atlas = s.model.add_container("atlas", Some(robots)).unwrap();
        let sensors = s.model.add_container("Sensors", None).unwrap();
        let nodes = [s.model.node_for(robots).unwrap(), s.model.node_for(atlas).unwrap()];
        s.tree.select(&nodes);

        assert!(s.model.on_key_press(Key::Delete));
        assert_eq!(s.model.objects(), vec![sensors]);
        assert!(!s.model.on_key_press(Key::Other(65)));
    }

    #[test]
    fn test_visibility_column_click_toggles() {
        let mut s = scene();
        let id = s.model.add_to_object_model(robot("/m/atlas.urdf"), None).unwrap();
        let node = s.model.node_for(id).unwrap();

        s.model.handle_tree_event(TreeEvent::ItemClicked { node, column: 0 });
        assert_eq!(s.model.get_property(id, VISIBLE_PROPERTY), Some(&PropertyValue::Bool(true)));

        s.model.handle_tree_event(TreeEvent::ItemClicked { node, column: 1 });
        assert_eq!(s.model.get_property(id, VISIBLE_PROPERTY), Some(&PropertyValue::Bool(false)));
        assert_eq!(s.tree.icon(node, 1), Some(Icon::EyeOff));
        assert_eq!(s.tree.icon_history(node, 1).len(), 2);
    }

    #[test]
    fn test_context_menu_entries() {
        let mut s = scene();
        let id = s.model.add_to_object_model(scripted("script"), None).unwrap();
        assert_eq!(
            s.model.context_menu_entries(id),
            vec![
                MenuEntry::Action("Reload".into()),
                MenuEntry::Separator,
                MenuEntry::Action("Reset".into()),
                MenuEntry::Separator,
                MenuEntry::Action("Remove".into()),
            ]
        );
    }

    #[test]
    fn test_context_menu_forwards_action() {
        let mut s = scene();
        let id = s.model.add_to_object_model(scripted("script"), None).unwrap();
        s.model.set_active_object(id).unwrap();
        s.tree.set_menu_choice(Some("Reset"));

        s.model.handle_tree_event(TreeEvent::ContextMenuRequested { position: (10, 20) });

        let item = s.model.item_as::<Scripted>(id).unwrap();
        assert_eq!(item.ran, vec!["Reset".to_string()]);
        let node = s.model.node_for(id).unwrap();
        assert_eq!(s.tree.icon(node, 0), Some(Icon::Matlab));
        assert_eq!(s.tree.last_menu().map(|(_, position)| position), Some((10, 20)));
    }

    #[test]
    fn test_context_menu_remove() {
        let mut s = scene();
        let id = s.model.add_to_object_model(scripted("script"), None).unwrap();
        s.model.set_active_object(id).unwrap();
        s.tree.set_menu_choice(Some("Remove"));

        s.model.on_context_menu((0, 0));
        assert!(!s.model.contains(id));
    }

    #[test]
    fn test_active_object_requires_single_selection() {
        let mut s = scene();
        let a = s.model.add_container("a", None).unwrap();
        let b = s.model.add_container("b", None).unwrap();
        s.model.set_active_object(a).unwrap();
        assert_eq!(s.model.active_object(), Some(a));

        let nodes = [s.model.node_for(a).unwrap(), s.model.node_for(b).unwrap()];
        s.tree.select(&nodes);
        assert_eq!(s.model.active_object(), None);
    }

    #[test]
    fn test_find_object_by_data_set() {
        let mut s = scene();
        let backend = HeadlessModel::new("/m/atlas.urdf");
        let mesh = DataSetId::new();
        backend.link_mesh(mesh, "pelvis");
        let id = s
            .model
            .add_to_object_model(Box::new(ModelItem::new(Box::new(backend)).unwrap()), None)
            .unwrap();

        assert_eq!(s.model.find_object_by_data_set(mesh), Some(id));
        assert_eq!(s.model.find_object_by_data_set(DataSetId::new()), None);
    }

    #[test]
    fn test_init_rebuilds_rows() {
        let mut s = scene();
        let robots = s.model.add_container("Robots", None).unwrap();
        let atlas = s.model.add_container("atlas", Some(robots)).unwrap();

        let tree = HeadlessTree::new();
        s.model.init(Box::new(tree.clone()), Box::new(HeadlessPanel::new()));

        assert_eq!(tree.node_count(), 2);
        let robots_node = s.model.node_for(robots).unwrap();
        assert_eq!(tree.children(robots_node), vec![s.model.node_for(atlas).unwrap()]);
        assert_eq!(s.model.object_for_node(robots_node), Some(robots));
        assert!(tree.is_expanded(robots_node));
    }

    #[test]
    fn test_stale_id_errors() {
        let mut s = scene();
        let id = s.model.add_container("Robots", None).unwrap();
        s.model.remove_from_object_model(id);

        assert_eq!(s.model.expand(id), Err(ObjectModelError::ObjectNotFound(id)));
        assert_eq!(
            s.model.set_property(id, NAME_PROPERTY, "x".into()),
            Err(ObjectModelError::ObjectNotFound(id))
        );
        assert!(s.model.get_property(id, NAME_PROPERTY).is_none());
    }
}
