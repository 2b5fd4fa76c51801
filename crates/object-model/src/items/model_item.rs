//! Model-backed item
//!
//! Wraps an externally loaded model (a robot description, typically). The
//! item caches Filename/Visible/Alpha/Color as properties; edits are pushed to
//! the backend, and `on_model_changed` pulls the backend's state back when it
//! changed on its own (reload, scripting).

use std::any::Any;
use std::fmt;
use std::path::Path;

use super::{alpha_attributes, ALPHA_PROPERTY, COLOR_PROPERTY, FILENAME_PROPERTY};
use crate::error::Result;
use crate::icons::Icon;
use crate::item::{ItemBase, ObjectItem};
use crate::poly_data::DataSetId;
use crate::properties::VISIBLE_PROPERTY;
use crate::render::{AttachedViews, ModelBackend, RenderView, SharedView, ViewId};
use crate::value::PropertyValue;

/// Invoked after the backing model reported a change
pub type ModelChangedCallback = Box<dyn FnMut(&ModelItem)>;

pub struct ModelItem {
    base: ItemBase,
    model: Box<dyn ModelBackend>,
    views: AttachedViews,
    model_changed_callback: Option<ModelChangedCallback>,
}

impl ModelItem {
    /// Item named after the model file's base name
    pub fn new(model: Box<dyn ModelBackend>) -> Result<Self> {
        let filename = model.filename();
        let name = Path::new(&filename)
            .file_name()
            .map(|n| n.to_string_lossy().into_owned())
            .unwrap_or_else(|| filename.clone());
        let visible = model.visible();
        let alpha = model.alpha();
        let color = model.color();

        let mut item = Self {
            base: ItemBase::new(name, Icon::Robot),
            model,
            views: AttachedViews::new(),
            model_changed_callback: None,
        };
        item.add_property(FILENAME_PROPERTY, filename.into(), None)?;
        item.add_property(VISIBLE_PROPERTY, visible.into(), None)?;
        item.add_property(ALPHA_PROPERTY, alpha.into(), Some(alpha_attributes()))?;
        item.add_property(COLOR_PROPERTY, color.into(), None)?;
        Ok(item)
    }

    pub fn model(&self) -> &dyn ModelBackend {
        self.model.as_ref()
    }

    pub fn is_visible(&self) -> bool {
        self.get_property(VISIBLE_PROPERTY).as_bool().unwrap_or(false)
    }

    pub fn set_model_changed_callback(&mut self, callback: Option<ModelChangedCallback>) {
        self.model_changed_callback = callback;
    }

    /// The backing model changed outside of this item
    ///
    /// Cached properties are refreshed from the backend (and reported to the
    /// tree when attached), the callback fires, and views re-render when the
    /// model is visible.
    pub fn on_model_changed(&mut self) -> Result<()> {
        let snapshot = [
            (FILENAME_PROPERTY, PropertyValue::Text(self.model.filename())),
            (VISIBLE_PROPERTY, PropertyValue::Bool(self.model.visible())),
            (ALPHA_PROPERTY, PropertyValue::Number(self.model.alpha())),
            (COLOR_PROPERTY, PropertyValue::Color(self.model.color())),
        ];
        for (name, value) in snapshot {
            if self.get_property(name) != &value {
                self.base.store_property(name, value)?;
            }
        }

        if let Some(mut callback) = self.model_changed_callback.take() {
            callback(self);
            self.model_changed_callback = Some(callback);
        }

        if self.is_visible() {
            self.views.render_all();
        }
        Ok(())
    }

    /// Replace the backing model, carrying over appearance and view
    /// registrations
    pub fn set_model(&mut self, model: Box<dyn ModelBackend>) -> Result<()> {
        let views = self.views.snapshot();
        self.remove_from_all_views();

        self.model = model;
        if let Some(alpha) = self.get_property(ALPHA_PROPERTY).as_f64() {
            self.model.set_alpha(alpha);
        }
        let visible = self.is_visible();
        self.model.set_visible(visible);
        if let Some(color) = self.get_property(COLOR_PROPERTY).as_color() {
            self.model.set_color(color);
        }
        let filename = self.model.filename();
        self.set_property(FILENAME_PROPERTY, filename.into())?;

        for view in views {
            self.add_to_view(view);
        }
        self.on_model_changed()
    }

    /// No-op if already attached to `view`
    pub fn add_to_view(&mut self, view: SharedView) {
        if !self.views.attach(view.clone()) {
            return;
        }
        tracing::trace!(item = self.name(), view = %view.id(), "Model added to view");
        self.model.add_to_renderer(view.as_ref());
        view.render();
    }

    /// # Panics
    /// If the item is not attached to `view`.
    pub fn remove_from_view(&mut self, view: &dyn RenderView) {
        let view = self.views.detach(view);
        tracing::trace!(item = self.name(), view = %view.id(), "Model removed from view");
        self.model.remove_from_renderer(view.as_ref());
        view.render();
    }

    pub fn remove_from_all_views(&mut self) {
        for view in self.views.snapshot() {
            self.remove_from_view(view.as_ref());
        }
        assert!(self.views.is_empty());
    }

    pub fn view_count(&self) -> usize {
        self.views.len()
    }

    pub fn view_ids(&self) -> Vec<ViewId> {
        self.views.ids()
    }
}

impl ObjectItem for ModelItem {
    fn base(&self) -> &ItemBase {
        &self.base
    }

    fn base_mut(&mut self) -> &mut ItemBase {
        &mut self.base
    }

    fn as_any(&self) -> &dyn Any {
        self
    }

    fn as_any_mut(&mut self) -> &mut dyn Any {
        self
    }

    fn on_property_changed(&mut self, name: &str) {
        let value = self.get_property(name).clone();
        match (name, value) {
            (ALPHA_PROPERTY, PropertyValue::Number(alpha)) => self.model.set_alpha(alpha),
            (VISIBLE_PROPERTY, PropertyValue::Bool(visible)) => self.model.set_visible(visible),
            (COLOR_PROPERTY, PropertyValue::Color(color)) => self.model.set_color(color),
            _ => {}
        }
        self.views.render_all();
    }

    fn on_remove_from_object_model(&mut self) {
        self.remove_from_all_views();
    }

    fn has_data_set(&self, data_set: DataSetId) -> bool {
        self.model
            .link_name_for_mesh(data_set)
            .is_some_and(|link| !link.is_empty())
    }
}

impl fmt::Debug for ModelItem {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ModelItem")
            .field("name", &self.name())
            .field("filename", &self.model.filename())
            .field("views", &self.views)
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::headless::{HeadlessModel, HeadlessView, ModelCall};
    use crate::value::Color;
    use std::cell::Cell;
    use std::rc::Rc;

    fn robot() -> (ModelItem, HeadlessModel) {
        let backend = HeadlessModel::new("/models/atlas/atlas_v5.urdf");
        let item = ModelItem::new(Box::new(backend.clone())).unwrap();
        (item, backend)
    }

    #[test]
    fn test_initial_properties() {
        let (item, _) = robot();
        assert_eq!(item.name(), "atlas_v5.urdf");
        assert_eq!(item.icon(), Icon::Robot);
        assert_eq!(
            item.property_names(),
            vec!["Name", "Filename", "Visible", "Alpha", "Color"]
        );
        let alpha = item.property_attributes(ALPHA_PROPERTY);
        assert_eq!((alpha.minimum, alpha.maximum, alpha.single_step, alpha.decimals), (0.0, 1.0, 0.1, 2));
    }

    #[test]
    fn test_alpha_reaches_backend_once() {
        let (mut item, backend) = robot();
        item.set_property(ALPHA_PROPERTY, 0.5.into()).unwrap();

        assert_eq!(item.get_property(ALPHA_PROPERTY), &PropertyValue::Number(0.5));
        assert_eq!(backend.calls_matching(|c| matches!(c, ModelCall::SetAlpha(_))), vec![ModelCall::SetAlpha(0.5)]);
    }

    #[test]
    fn test_property_change_renders_every_view() {
        let (mut item, _) = robot();
        let left = HeadlessView::new(1);
        let right = HeadlessView::new(2);
        item.add_to_view(left.shared());
        item.add_to_view(right.shared());

        item.set_property(COLOR_PROPERTY, Color::rgb(10, 20, 30).into()).unwrap();
        assert_eq!(left.render_count(), 2);
        assert_eq!(right.render_count(), 2);
    }

    #[test]
    fn test_add_to_view_is_idempotent() {
        let (mut item, backend) = robot();
        let view = HeadlessView::new(1);
        item.add_to_view(view.shared());
        item.add_to_view(view.shared());

        assert_eq!(item.view_count(), 1);
        assert_eq!(backend.calls_matching(|c| matches!(c, ModelCall::AddToRenderer(_))).len(), 1);
    }

    #[test]
    #[should_panic(expected = "is not attached")]
    fn test_remove_unattached_view_panics() {
        let (mut item, _) = robot();
        let view = HeadlessView::new(7);
        item.remove_from_view(&view);
    }

    #[test]
    fn test_model_changed_resyncs_cache() {
        let (mut item, backend) = robot();
        let view = HeadlessView::new(1);
        item.add_to_view(view.shared());

        let fired = Rc::new(Cell::new(0));
        let counter = fired.clone();
        item.set_model_changed_callback(Some(Box::new(move |_| counter.set(counter.get() + 1))));

        backend.reload(0.25, false);
        item.on_model_changed().unwrap();

        assert_eq!(item.get_property(ALPHA_PROPERTY), &PropertyValue::Number(0.25));
        assert!(!item.is_visible());
        assert_eq!(fired.get(), 1);
        // Hidden models do not re-render
        assert_eq!(view.render_count(), 1);
    }

    #[test]
    fn test_set_model_moves_views_and_appearance() {
        let (mut item, old_backend) = robot();
        let view = HeadlessView::new(1);
        item.add_to_view(view.shared());
        item.set_property(ALPHA_PROPERTY, 0.3.into()).unwrap();

        let new_backend = HeadlessModel::new("/models/valkyrie.urdf");
        item.set_model(Box::new(new_backend.clone())).unwrap();

        assert!(old_backend.calls().contains(&ModelCall::RemoveFromRenderer(ViewId(1))));
        assert!(new_backend.calls().contains(&ModelCall::AddToRenderer(ViewId(1))));
        assert!(new_backend.calls().contains(&ModelCall::SetAlpha(0.3)));
        assert_eq!(item.view_ids(), vec![ViewId(1)]);
        assert_eq!(
            item.get_property(FILENAME_PROPERTY),
            &PropertyValue::Text("/models/valkyrie.urdf".to_string())
        );
    }
}
