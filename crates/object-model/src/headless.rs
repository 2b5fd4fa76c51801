//! # Headless Collaborators
//!
//! In-memory implementations of every collaborator trait. Each one is a thin
//! handle over shared state: clone it, hand one clone to the object model and
//! keep the other to inspect what the model did.
//!
//! ## Table of Contents
//! 1. HeadlessTree - TreeWidget keeping rows, icons and selection in memory
//! 2. HeadlessPanel - PropertyPanel keeping fields and attributes in memory
//! 3. HeadlessView - RenderView counting render requests
//! 4. HeadlessModel / ModelCall - Recording ModelBackend
//! 5. HeadlessActor / ActorCall - Recording ActorBackend

use std::cell::{Cell, RefCell};
use std::collections::{BTreeMap, HashMap};
use std::rc::Rc;

use crate::icons::Icon;
use crate::poly_data::{DataSetId, PolyData, ScalarColoring};
use crate::render::{ActorBackend, ModelBackend, RenderView, SharedView, ViewId};
use crate::sync::SyncFlag;
use crate::value::{Color, PropertyValue};
use crate::widgets::{MenuEntry, NodeHandle, PanelAttribute, PanelProperty, PropertyPanel, TreeWidget};

// ============================================================================
// Tree
// ============================================================================

#[derive(Debug, Default)]
struct TreeNode {
    parent: Option<NodeHandle>,
    children: Vec<NodeHandle>,
    text: HashMap<usize, String>,
    icons: HashMap<usize, Icon>,
    expanded: bool,
}

#[derive(Debug, Default)]
struct TreeState {
    headers: Vec<String>,
    visibility_width: Option<(usize, u32)>,
    header_icons: HashMap<usize, Icon>,
    nodes: BTreeMap<NodeHandle, TreeNode>,
    roots: Vec<NodeHandle>,
    next_node: u64,
    selection: Vec<NodeHandle>,
    icon_log: Vec<(NodeHandle, usize, Icon)>,
    menu_choice: Option<String>,
    last_menu: Option<(Vec<MenuEntry>, (i32, i32))>,
}

impl TreeState {
    fn drop_subtree(&mut self, node: NodeHandle) {
        if let Some(removed) = self.nodes.remove(&node) {
            for child in removed.children {
                self.drop_subtree(child);
            }
        }
        self.selection.retain(|n| *n != node);
    }
}

/// Tree widget backed by plain maps
#[derive(Debug, Clone, Default)]
pub struct HeadlessTree {
    state: Rc<RefCell<TreeState>>,
}

impl HeadlessTree {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn headers(&self) -> Vec<String> {
        self.state.borrow().headers.clone()
    }

    /// (column, width) given to `configure_columns`
    pub fn visibility_column_width(&self) -> Option<(usize, u32)> {
        self.state.borrow().visibility_width
    }

    pub fn header_icon(&self, column: usize) -> Option<Icon> {
        self.state.borrow().header_icons.get(&column).copied()
    }

    pub fn node_count(&self) -> usize {
        self.state.borrow().nodes.len()
    }

    pub fn contains(&self, node: NodeHandle) -> bool {
        self.state.borrow().nodes.contains_key(&node)
    }

    pub fn roots(&self) -> Vec<NodeHandle> {
        self.state.borrow().roots.clone()
    }

    pub fn children(&self, node: NodeHandle) -> Vec<NodeHandle> {
        self.state
            .borrow()
            .nodes
            .get(&node)
            .map(|n| n.children.clone())
            .unwrap_or_default()
    }

    pub fn parent(&self, node: NodeHandle) -> Option<NodeHandle> {
        self.state.borrow().nodes.get(&node).and_then(|n| n.parent)
    }

    pub fn text(&self, node: NodeHandle, column: usize) -> Option<String> {
        self.state
            .borrow()
            .nodes
            .get(&node)
            .and_then(|n| n.text.get(&column).cloned())
    }

    /// Text of column 0
    pub fn label(&self, node: NodeHandle) -> Option<String> {
        self.text(node, 0)
    }

    /// Rows whose column 0 reads `label`
    pub fn nodes_labeled(&self, label: &str) -> Vec<NodeHandle> {
        self.state
            .borrow()
            .nodes
            .iter()
            .filter(|(_, n)| n.text.get(&0).map(String::as_str) == Some(label))
            .map(|(handle, _)| *handle)
            .collect()
    }

    pub fn icon(&self, node: NodeHandle, column: usize) -> Option<Icon> {
        self.state
            .borrow()
            .nodes
            .get(&node)
            .and_then(|n| n.icons.get(&column).copied())
    }

    /// Every icon written to one cell, oldest first
    pub fn icon_history(&self, node: NodeHandle, column: usize) -> Vec<Icon> {
        self.state
            .borrow()
            .icon_log
            .iter()
            .filter(|(n, c, _)| *n == node && *c == column)
            .map(|(_, _, icon)| *icon)
            .collect()
    }

    pub fn is_expanded(&self, node: NodeHandle) -> bool {
        self.state
            .borrow()
            .nodes
            .get(&node)
            .is_some_and(|n| n.expanded)
    }

    /// Replace the selection, as a user click would
    pub fn select(&self, nodes: &[NodeHandle]) {
        self.state.borrow_mut().selection = nodes.to_vec();
    }

    /// Answer the next `popup_menu` with this action (or dismiss with `None`)
    pub fn set_menu_choice(&self, choice: Option<&str>) {
        self.state.borrow_mut().menu_choice = choice.map(str::to_string);
    }

    pub fn last_menu(&self) -> Option<(Vec<MenuEntry>, (i32, i32))> {
        self.state.borrow().last_menu.clone()
    }
}

impl TreeWidget for HeadlessTree {
    fn configure_columns(&mut self, headers: &[String], visibility_column: usize, visibility_width: u32) {
        let mut state = self.state.borrow_mut();
        state.headers = headers.to_vec();
        state.visibility_width = Some((visibility_column, visibility_width));
    }

    fn set_header_icon(&mut self, column: usize, icon: Icon) {
        self.state.borrow_mut().header_icons.insert(column, icon);
    }

    fn add_node(&mut self, parent: Option<NodeHandle>, label: &str) -> NodeHandle {
        let mut guard = self.state.borrow_mut();
        let state = &mut *guard;
        state.next_node += 1;
        let handle = NodeHandle(state.next_node);

        let mut node = TreeNode {
            parent,
            ..TreeNode::default()
        };
        node.text.insert(0, label.to_string());
        state.nodes.insert(handle, node);

        match parent.and_then(|p| state.nodes.get_mut(&p)) {
            Some(parent_node) => parent_node.children.push(handle),
            None => state.roots.push(handle),
        }
        handle
    }

    fn remove_node(&mut self, node: NodeHandle) {
        let mut guard = self.state.borrow_mut();
        let state = &mut *guard;
        let parent = state.nodes.get(&node).and_then(|n| n.parent);
        match parent.and_then(|p| state.nodes.get_mut(&p)) {
            Some(parent_node) => parent_node.children.retain(|c| *c != node),
            None => state.roots.retain(|r| *r != node),
        }
        state.drop_subtree(node);
    }

    fn set_text(&mut self, node: NodeHandle, column: usize, text: &str) {
        if let Some(n) = self.state.borrow_mut().nodes.get_mut(&node) {
            n.text.insert(column, text.to_string());
        }
    }

    fn set_icon(&mut self, node: NodeHandle, column: usize, icon: Icon) {
        let mut guard = self.state.borrow_mut();
        let state = &mut *guard;
        if let Some(n) = state.nodes.get_mut(&node) {
            n.icons.insert(column, icon);
            state.icon_log.push((node, column, icon));
        }
    }

    fn expand(&mut self, node: NodeHandle) {
        if let Some(n) = self.state.borrow_mut().nodes.get_mut(&node) {
            n.expanded = true;
        }
    }

    fn collapse(&mut self, node: NodeHandle) {
        if let Some(n) = self.state.borrow_mut().nodes.get_mut(&node) {
            n.expanded = false;
        }
    }

    fn selected_nodes(&self) -> Vec<NodeHandle> {
        self.state.borrow().selection.clone()
    }

    fn set_current(&mut self, node: NodeHandle) {
        self.state.borrow_mut().selection = vec![node];
    }

    fn popup_menu(&mut self, entries: &[MenuEntry], position: (i32, i32)) -> Option<String> {
        let mut state = self.state.borrow_mut();
        state.last_menu = Some((entries.to_vec(), position));
        state.menu_choice.take()
    }
}

// ============================================================================
// Property panel
// ============================================================================

#[derive(Debug, Clone, PartialEq)]
enum FieldKind {
    Value,
    Enum,
    Group,
    Sub(PanelProperty),
}

#[derive(Debug, Clone)]
struct PanelField {
    handle: PanelProperty,
    name: String,
    label: String,
    kind: FieldKind,
    value: PropertyValue,
    attributes: Vec<PanelAttribute>,
}

#[derive(Debug, Default)]
struct PanelState {
    fields: Vec<PanelField>,
    next_field: u64,
    clear_count: usize,
    observed: Option<SyncFlag>,
    /// Guard state seen by each `set_value`/`set_label` call
    write_guard_log: Vec<bool>,
}

impl PanelState {
    fn push(&mut self, name: &str, label: &str, kind: FieldKind, value: PropertyValue) -> PanelProperty {
        self.next_field += 1;
        let handle = PanelProperty(self.next_field);
        self.fields.push(PanelField {
            handle,
            name: name.to_string(),
            label: label.to_string(),
            kind,
            value,
            attributes: Vec::new(),
        });
        handle
    }

    fn field_mut(&mut self, handle: PanelProperty) -> Option<&mut PanelField> {
        self.fields.iter_mut().find(|f| f.handle == handle)
    }

    fn top_level(&self, name: &str) -> Option<&PanelField> {
        self.fields
            .iter()
            .find(|f| f.name == name && !matches!(f.kind, FieldKind::Sub(_)))
    }

    fn record_write(&mut self) {
        let guarded = self.observed.as_ref().is_some_and(SyncFlag::is_suppressed);
        self.write_guard_log.push(guarded);
    }
}

/// Property panel backed by a field list
#[derive(Debug, Clone, Default)]
pub struct HeadlessPanel {
    state: Rc<RefCell<PanelState>>,
}

impl HeadlessPanel {
    pub fn new() -> Self {
        Self::default()
    }

    /// Record the state of `flag` on every value write
    pub fn observe_sync_flag(&self, flag: SyncFlag) {
        self.state.borrow_mut().observed = Some(flag);
    }

    /// One entry per `set_value`/`set_label`: whether the observed flag was raised
    pub fn write_guard_log(&self) -> Vec<bool> {
        self.state.borrow().write_guard_log.clone()
    }

    pub fn clear_count(&self) -> usize {
        self.state.borrow().clear_count
    }

    pub fn is_empty(&self) -> bool {
        self.state.borrow().fields.is_empty()
    }

    /// Top-level field names in display order
    pub fn names(&self) -> Vec<String> {
        self.state
            .borrow()
            .fields
            .iter()
            .filter(|f| !matches!(f.kind, FieldKind::Sub(_)))
            .map(|f| f.name.clone())
            .collect()
    }

    pub fn value(&self, name: &str) -> Option<PropertyValue> {
        self.state.borrow().top_level(name).map(|f| f.value.clone())
    }

    pub fn label(&self, name: &str) -> Option<String> {
        self.state.borrow().top_level(name).map(|f| f.label.clone())
    }

    pub fn is_enum(&self, name: &str) -> bool {
        self.state
            .borrow()
            .top_level(name)
            .is_some_and(|f| f.kind == FieldKind::Enum)
    }

    pub fn is_group(&self, name: &str) -> bool {
        self.state
            .borrow()
            .top_level(name)
            .is_some_and(|f| f.kind == FieldKind::Group)
    }

    /// Label an enum field currently shows
    pub fn enum_label(&self, name: &str) -> Option<String> {
        let state = self.state.borrow();
        let field = state.top_level(name)?;
        let index = field.value.as_enum()?;
        let label = field.attributes.iter().rev().find_map(|a| match a {
            PanelAttribute::EnumNames(names) => names.get(index).cloned(),
            _ => None,
        });
        label
    }

    pub fn attributes(&self, name: &str) -> Vec<PanelAttribute> {
        self.state
            .borrow()
            .top_level(name)
            .map(|f| f.attributes.clone())
            .unwrap_or_default()
    }

    /// (name, value) of each element field under a group
    pub fn sub_fields(&self, group: &str) -> Vec<(String, f64)> {
        let state = self.state.borrow();
        let Some(group) = state.top_level(group).map(|f| f.handle) else {
            return Vec::new();
        };
        state
            .fields
            .iter()
            .filter(|f| f.kind == FieldKind::Sub(group))
            .map(|f| (f.name.clone(), f.value.as_f64().unwrap_or_default()))
            .collect()
    }
}

impl PropertyPanel for HeadlessPanel {
    fn clear(&mut self) {
        let mut state = self.state.borrow_mut();
        state.fields.clear();
        state.clear_count += 1;
    }

    fn add_property(&mut self, name: &str, value: &PropertyValue) -> PanelProperty {
        self.state
            .borrow_mut()
            .push(name, name, FieldKind::Value, value.clone())
    }

    fn add_enum_property(&mut self, name: &str, index: usize) -> PanelProperty {
        self.state
            .borrow_mut()
            .push(name, name, FieldKind::Enum, PropertyValue::Enum(index))
    }

    fn add_group(&mut self, name: &str, label: &str) -> PanelProperty {
        self.state
            .borrow_mut()
            .push(name, label, FieldKind::Group, PropertyValue::Empty)
    }

    fn add_sub_property(&mut self, group: PanelProperty, name: &str, value: f64) -> PanelProperty {
        self.state
            .borrow_mut()
            .push(name, name, FieldKind::Sub(group), PropertyValue::Number(value))
    }

    fn find_property(&self, name: &str) -> Option<PanelProperty> {
        self.state.borrow().top_level(name).map(|f| f.handle)
    }

    fn sub_properties(&self, group: PanelProperty) -> Vec<PanelProperty> {
        self.state
            .borrow()
            .fields
            .iter()
            .filter(|f| f.kind == FieldKind::Sub(group))
            .map(|f| f.handle)
            .collect()
    }

    fn set_attribute(&mut self, property: PanelProperty, attribute: PanelAttribute) {
        if let Some(field) = self.state.borrow_mut().field_mut(property) {
            field.attributes.retain(|a| a.name() != attribute.name());
            field.attributes.push(attribute);
        }
    }

    fn set_value(&mut self, property: PanelProperty, value: &PropertyValue) {
        let mut state = self.state.borrow_mut();
        state.record_write();
        if let Some(field) = state.field_mut(property) {
            field.value = value.clone();
        }
    }

    fn set_label(&mut self, property: PanelProperty, label: &str) {
        let mut state = self.state.borrow_mut();
        state.record_write();
        if let Some(field) = state.field_mut(property) {
            field.label = label.to_string();
        }
    }
}

// ============================================================================
// View
// ============================================================================

#[derive(Debug)]
struct ViewState {
    id: ViewId,
    renders: Cell<usize>,
}

/// Render view that only counts render requests
#[derive(Debug, Clone)]
pub struct HeadlessView {
    state: Rc<ViewState>,
}

impl HeadlessView {
    pub fn new(id: u64) -> Self {
        Self {
            state: Rc::new(ViewState {
                id: ViewId(id),
                renders: Cell::new(0),
            }),
        }
    }

    /// Handle to give to items
    pub fn shared(&self) -> SharedView {
        Rc::new(self.clone())
    }

    pub fn render_count(&self) -> usize {
        self.state.renders.get()
    }
}

impl RenderView for HeadlessView {
    fn id(&self) -> ViewId {
        self.state.id
    }

    fn render(&self) {
        self.state.renders.set(self.state.renders.get() + 1);
    }
}

// ============================================================================
// Model backend
// ============================================================================

/// Call received by a `HeadlessModel`
#[derive(Debug, Clone, PartialEq)]
pub enum ModelCall {
    SetAlpha(f64),
    SetVisible(bool),
    SetColor(Color),
    AddToRenderer(ViewId),
    RemoveFromRenderer(ViewId),
}

#[derive(Debug)]
struct ModelState {
    filename: String,
    visible: bool,
    alpha: f64,
    color: Color,
    mesh_links: HashMap<DataSetId, String>,
    calls: Vec<ModelCall>,
}

/// Model backend that stores its appearance and records every call
#[derive(Debug, Clone)]
pub struct HeadlessModel {
    state: Rc<RefCell<ModelState>>,
}

impl HeadlessModel {
    /// Visible, opaque, white model loaded from `filename`
    pub fn new(filename: impl Into<String>) -> Self {
        Self {
            state: Rc::new(RefCell::new(ModelState {
                filename: filename.into(),
                visible: true,
                alpha: 1.0,
                color: Color::WHITE,
                mesh_links: HashMap::new(),
                calls: Vec::new(),
            })),
        }
    }

    /// Change appearance behind the item's back, as a reload would
    pub fn reload(&self, alpha: f64, visible: bool) {
        let mut state = self.state.borrow_mut();
        state.alpha = alpha;
        state.visible = visible;
    }

    /// Declare that `link` renders the mesh `data_set`
    pub fn link_mesh(&self, data_set: DataSetId, link: impl Into<String>) {
        self.state.borrow_mut().mesh_links.insert(data_set, link.into());
    }

    pub fn calls(&self) -> Vec<ModelCall> {
        self.state.borrow().calls.clone()
    }

    pub fn calls_matching(&self, predicate: impl Fn(&ModelCall) -> bool) -> Vec<ModelCall> {
        self.state
            .borrow()
            .calls
            .iter()
            .filter(|c| predicate(*c))
            .cloned()
            .collect()
    }
}

impl ModelBackend for HeadlessModel {
    fn filename(&self) -> String {
        self.state.borrow().filename.clone()
    }

    fn visible(&self) -> bool {
        self.state.borrow().visible
    }

    fn alpha(&self) -> f64 {
        self.state.borrow().alpha
    }

    fn color(&self) -> Color {
        self.state.borrow().color
    }

    fn set_alpha(&mut self, alpha: f64) {
        let mut state = self.state.borrow_mut();
        state.alpha = alpha;
        state.calls.push(ModelCall::SetAlpha(alpha));
    }

    fn set_visible(&mut self, visible: bool) {
        let mut state = self.state.borrow_mut();
        state.visible = visible;
        state.calls.push(ModelCall::SetVisible(visible));
    }

    fn set_color(&mut self, color: Color) {
        let mut state = self.state.borrow_mut();
        state.color = color;
        state.calls.push(ModelCall::SetColor(color));
    }

    fn add_to_renderer(&mut self, view: &dyn RenderView) {
        self.state.borrow_mut().calls.push(ModelCall::AddToRenderer(view.id()));
    }

    fn remove_from_renderer(&mut self, view: &dyn RenderView) {
        self.state
            .borrow_mut()
            .calls
            .push(ModelCall::RemoveFromRenderer(view.id()));
    }

    fn link_name_for_mesh(&self, data_set: DataSetId) -> Option<String> {
        self.state.borrow().mesh_links.get(&data_set).cloned()
    }
}

// ============================================================================
// Actor backend
// ============================================================================

/// Call received by a `HeadlessActor`
#[derive(Debug, Clone, PartialEq)]
pub enum ActorCall {
    SetPointSize(f64),
    SetOpacity(f64),
    SetVisibility(bool),
    SetColor([f64; 3]),
    SetInput(DataSetId),
    /// Array name, or `None` when coloring was turned off
    SetScalarColoring(Option<String>),
    AddToRenderer(ViewId),
    RemoveFromRenderer(ViewId),
}

#[derive(Debug)]
struct ActorState {
    point_size: f64,
    scalar_coloring: Option<ScalarColoring>,
    calls: Vec<ActorCall>,
}

/// Actor backend recording every call
#[derive(Debug, Clone)]
pub struct HeadlessActor {
    state: Rc<RefCell<ActorState>>,
}

impl Default for HeadlessActor {
    fn default() -> Self {
        Self::new()
    }
}

impl HeadlessActor {
    pub fn new() -> Self {
        Self {
            state: Rc::new(RefCell::new(ActorState {
                point_size: 1.0,
                scalar_coloring: None,
                calls: Vec::new(),
            })),
        }
    }

    pub fn calls(&self) -> Vec<ActorCall> {
        self.state.borrow().calls.clone()
    }

    pub fn calls_matching(&self, predicate: impl Fn(&ActorCall) -> bool) -> Vec<ActorCall> {
        self.state
            .borrow()
            .calls
            .iter()
            .filter(|c| predicate(*c))
            .cloned()
            .collect()
    }

    /// Coloring currently applied to the mapper
    pub fn scalar_coloring(&self) -> Option<ScalarColoring> {
        self.state.borrow().scalar_coloring.clone()
    }
}

impl ActorBackend for HeadlessActor {
    fn point_size(&self) -> f64 {
        self.state.borrow().point_size
    }

    fn set_point_size(&mut self, size: f64) {
        let mut state = self.state.borrow_mut();
        state.point_size = size;
        state.calls.push(ActorCall::SetPointSize(size));
    }

    fn set_opacity(&mut self, alpha: f64) {
        self.state.borrow_mut().calls.push(ActorCall::SetOpacity(alpha));
    }

    fn set_visibility(&mut self, visible: bool) {
        self.state.borrow_mut().calls.push(ActorCall::SetVisibility(visible));
    }

    fn set_color(&mut self, rgb: [f64; 3]) {
        self.state.borrow_mut().calls.push(ActorCall::SetColor(rgb));
    }

    fn set_input(&mut self, data: &PolyData) {
        self.state.borrow_mut().calls.push(ActorCall::SetInput(data.id()));
    }

    fn set_scalar_coloring(&mut self, coloring: Option<&ScalarColoring>) {
        let mut state = self.state.borrow_mut();
        state.scalar_coloring = coloring.cloned();
        state
            .calls
            .push(ActorCall::SetScalarColoring(coloring.map(|c| c.array_name.clone())));
    }

    fn add_to_renderer(&mut self, view: &dyn RenderView) {
        self.state.borrow_mut().calls.push(ActorCall::AddToRenderer(view.id()));
    }

    fn remove_from_renderer(&mut self, view: &dyn RenderView) {
        self.state
            .borrow_mut()
            .calls
            .push(ActorCall::RemoveFromRenderer(view.id()));
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_tree_remove_drops_subtree_and_selection() {
        let mut tree = HeadlessTree::new();
        let root = tree.add_node(None, "Robots");
        let child = tree.add_node(Some(root), "atlas");
        tree.select(&[child]);

        tree.remove_node(root);
        assert_eq!(tree.node_count(), 0);
        assert!(tree.roots().is_empty());
        assert!(tree.selected_nodes().is_empty());
    }

    #[test]
    fn test_panel_groups_and_subfields() {
        let mut panel = HeadlessPanel::new();
        let group = panel.add_group("Position", "Position [1, 2]");
        panel.add_sub_property(group, "Position[0]", 1.0);
        panel.add_sub_property(group, "Position[1]", 2.0);

        assert_eq!(panel.names(), vec!["Position"]);
        assert!(panel.is_group("Position"));
        assert_eq!(panel.sub_properties(group).len(), 2);
        assert_eq!(
            panel.sub_fields("Position"),
            vec![("Position[0]".to_string(), 1.0), ("Position[1]".to_string(), 2.0)]
        );
    }

    #[test]
    fn test_panel_enum_label() {
        let mut panel = HeadlessPanel::new();
        let field = panel.add_enum_property("Level", 1);
        panel.set_attribute(
            field,
            PanelAttribute::EnumNames(vec!["Low".into(), "Medium".into(), "High".into()]),
        );
        assert_eq!(panel.enum_label("Level").as_deref(), Some("Medium"));
    }

    #[test]
    fn test_view_shared_handles_count_together() {
        let view = HeadlessView::new(3);
        let shared = view.shared();
        shared.render();
        shared.render();
        assert_eq!(shared.id(), ViewId(3));
        assert_eq!(view.render_count(), 2);
    }
}
