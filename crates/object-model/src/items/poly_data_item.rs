//! Geometry item: one actor rendering a `PolyData` in any number of views.

use std::any::Any;
use std::fmt;

use super::{
    alpha_attributes, point_size_attributes, ALPHA_PROPERTY, COLOR_PROPERTY, POINT_SIZE_PROPERTY,
};
use crate::error::Result;
use crate::icons::Icon;
use crate::item::{ItemBase, ObjectItem};
use crate::poly_data::{DataSetId, LookupTable, PolyData, ScalarColoring};
use crate::properties::VISIBLE_PROPERTY;
use crate::render::{ActorBackend, AttachedViews, RenderView, SharedView, ViewId};
use crate::value::{Color, PropertyValue};

pub struct PolyDataItem {
    base: ItemBase,
    poly_data: PolyData,
    actor: Box<dyn ActorBackend>,
    views: AttachedViews,
    coloring: Option<ScalarColoring>,
}

impl PolyDataItem {
    /// Visible, opaque, white geometry; attached to `view` when one is given
    pub fn new(
        name: impl Into<String>,
        poly_data: PolyData,
        mut actor: Box<dyn ActorBackend>,
        view: Option<SharedView>,
    ) -> Result<Self> {
        actor.set_input(&poly_data);
        let point_size = actor.point_size();

        let mut item = Self {
            base: ItemBase::new(name, Icon::Robot),
            poly_data,
            actor,
            views: AttachedViews::new(),
            coloring: None,
        };
        item.add_property(VISIBLE_PROPERTY, true.into(), None)?;
        item.add_property(POINT_SIZE_PROPERTY, point_size.into(), Some(point_size_attributes()))?;
        item.add_property(ALPHA_PROPERTY, 1.0.into(), Some(alpha_attributes()))?;
        item.add_property(COLOR_PROPERTY, Color::WHITE.into(), None)?;

        if let Some(view) = view {
            item.add_to_view(view);
        }
        Ok(item)
    }

    pub fn poly_data(&self) -> &PolyData {
        &self.poly_data
    }

    pub fn coloring(&self) -> Option<&ScalarColoring> {
        self.coloring.as_ref()
    }

    pub fn is_visible(&self) -> bool {
        self.get_property(VISIBLE_PROPERTY).as_bool().unwrap_or(false)
    }

    /// Swap in a new dataset, keeping the current coloring array when the
    /// new data has it
    pub fn set_poly_data(&mut self, poly_data: PolyData) {
        let array_name = self.color_by_array_name();
        let lookup_table = self.coloring.as_ref().map(|c| c.lookup_table.clone());

        self.poly_data = poly_data;
        self.actor.set_input(&self.poly_data);
        self.color_by(array_name.as_deref(), None, lookup_table);

        if self.is_visible() {
            self.views.render_all();
        }
    }

    /// Name of the active scalars array
    pub fn color_by_array_name(&self) -> Option<String> {
        self.poly_data.active_scalars().map(|a| a.name.clone())
    }

    pub fn array_names(&self) -> Vec<String> {
        self.poly_data.array_names()
    }

    /// Solid color from 0.0-1.0 channels; turns scalar coloring off
    pub fn set_solid_color(&mut self, rgb: [f64; 3]) -> Result<()> {
        self.set_property(COLOR_PROPERTY, Color::from_unit_rgb(rgb).into())?;
        self.color_by(None, None, None);
        Ok(())
    }

    /// Color by a point array, or turn scalar coloring off with `None`
    ///
    /// A missing array is not an error: coloring is turned off and a warning
    /// logged. Without an explicit table or range the array's min/max is used.
    pub fn color_by(
        &mut self,
        array_name: Option<&str>,
        scalar_range: Option<(f64, f64)>,
        lookup_table: Option<LookupTable>,
    ) {
        let Some(array_name) = array_name.filter(|n| !n.is_empty()) else {
            self.disable_scalar_coloring();
            return;
        };

        let data_range = match self.poly_data.array(array_name) {
            Some(array) => array.range(),
            None => {
                tracing::warn!(item = self.name(), array = array_name, "colorBy: array not found");
                self.disable_scalar_coloring();
                return;
            }
        };

        self.poly_data.set_active_scalars(Some(array_name));
        let lookup_table = lookup_table.unwrap_or_else(|| {
            LookupTable::new(scalar_range.or(data_range).unwrap_or((0.0, 1.0)))
        });
        let coloring = ScalarColoring {
            array_name: array_name.to_string(),
            lookup_table,
            use_lookup_table_range: true,
            interpolate_before_mapping: false,
        };
        self.actor.set_scalar_coloring(Some(&coloring));
        self.coloring = Some(coloring);

        if self.is_visible() {
            self.views.render_all();
        }
    }

    fn disable_scalar_coloring(&mut self) {
        self.actor.set_scalar_coloring(None);
        self.poly_data.set_active_scalars(None);
        self.coloring = None;
    }

    /// Name of the frame child this geometry is conventionally paired with
    pub fn child_frame_name(&self) -> String {
        format!("{} frame", self.name())
    }

    /// No-op if already attached to `view`
    pub fn add_to_view(&mut self, view: SharedView) {
        if !self.views.attach(view.clone()) {
            return;
        }
        tracing::trace!(item = self.name(), view = %view.id(), "Actor added to view");
        self.actor.add_to_renderer(view.as_ref());
        view.render();
    }

    /// # Panics
    /// If the item is not attached to `view`.
    pub fn remove_from_view(&mut self, view: &dyn RenderView) {
        let view = self.views.detach(view);
        tracing::trace!(item = self.name(), view = %view.id(), "Actor removed from view");
        self.actor.remove_from_renderer(view.as_ref());
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

impl ObjectItem for PolyDataItem {
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
            (POINT_SIZE_PROPERTY, PropertyValue::Number(size)) => self.actor.set_point_size(size),
            (ALPHA_PROPERTY, PropertyValue::Number(alpha)) => self.actor.set_opacity(alpha),
            (VISIBLE_PROPERTY, PropertyValue::Bool(visible)) => self.actor.set_visibility(visible),
            (COLOR_PROPERTY, PropertyValue::Color(color)) => self.actor.set_color(color.to_unit_rgb()),
            _ => {}
        }
        self.views.render_all();
    }

    fn on_remove_from_object_model(&mut self) {
        self.remove_from_all_views();
    }

    fn has_data_set(&self, data_set: DataSetId) -> bool {
        self.poly_data.id() == data_set
    }
}

impl fmt::Debug for PolyDataItem {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("PolyDataItem")
            .field("name", &self.name())
            .field("points", &self.poly_data.point_count)
            .field("coloring", &self.coloring.as_ref().map(|c| &c.array_name))
            .field("views", &self.views)
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::headless::{ActorCall, HeadlessActor, HeadlessView};
    use crate::poly_data::DataArray;

    fn cloud() -> PolyData {
        PolyData::new(3)
            .with_array(DataArray::new("height", vec![0.5, 2.0, -1.0]))
            .with_array(DataArray::new("intensity", vec![10.0, 20.0, 30.0]))
    }

    fn geometry(view: Option<SharedView>) -> (PolyDataItem, HeadlessActor) {
        let actor = HeadlessActor::new();
        let item = PolyDataItem::new("scan", cloud(), Box::new(actor.clone()), view).unwrap();
        (item, actor)
    }

    #[test]
    fn test_initial_properties_and_view() {
        let view = HeadlessView::new(1);
        let (item, actor) = geometry(Some(view.shared()));

        assert_eq!(item.property_names(), vec!["Name", "Visible", "Point Size", "Alpha", "Color"]);
        assert_eq!(item.get_property(COLOR_PROPERTY), &PropertyValue::Color(Color::WHITE));
        let size = item.property_attributes(POINT_SIZE_PROPERTY);
        assert_eq!((size.minimum, size.maximum, size.decimals), (1.0, 20.0, 0));
        assert_eq!(item.view_ids(), vec![ViewId(1)]);
        assert_eq!(view.render_count(), 1);
        assert!(actor.calls().contains(&ActorCall::AddToRenderer(ViewId(1))));
    }

    #[test]
    fn test_alpha_sets_opacity_once() {
        let (mut item, actor) = geometry(None);
        item.set_property(ALPHA_PROPERTY, 0.5.into()).unwrap();

        assert_eq!(item.get_property(ALPHA_PROPERTY), &PropertyValue::Number(0.5));
        assert_eq!(
            actor.calls_matching(|c| matches!(c, ActorCall::SetOpacity(_))),
            vec![ActorCall::SetOpacity(0.5)]
        );
    }

    #[test]
    fn test_property_effects() {
        let (mut item, actor) = geometry(None);
        item.set_property(POINT_SIZE_PROPERTY, 4.0.into()).unwrap();
        item.set_property(VISIBLE_PROPERTY, false.into()).unwrap();
        item.set_property(COLOR_PROPERTY, Color::rgb(255, 0, 0).into()).unwrap();

        let calls = actor.calls();
        assert!(calls.contains(&ActorCall::SetPointSize(4.0)));
        assert!(calls.contains(&ActorCall::SetVisibility(false)));
        assert!(calls.contains(&ActorCall::SetColor([1.0, 0.0, 0.0])));
    }

    #[test]
    fn test_color_by_uses_array_range() {
        let (mut item, actor) = geometry(None);
        item.color_by(Some("height"), None, None);

        let coloring = item.coloring().unwrap();
        assert_eq!(coloring.lookup_table.range, (-1.0, 2.0));
        assert_eq!(coloring.lookup_table.number_of_colors, 256);
        assert_eq!(item.color_by_array_name().as_deref(), Some("height"));
        assert_eq!(actor.scalar_coloring().map(|c| c.array_name), Some("height".to_string()));
    }

    #[test]
    fn test_color_by_explicit_range() {
        let (mut item, _) = geometry(None);
        item.color_by(Some("intensity"), Some((0.0, 100.0)), None);
        assert_eq!(item.coloring().unwrap().lookup_table.range, (0.0, 100.0));
    }

    #[test]
    fn test_color_by_missing_array_disables() {
        let (mut item, actor) = geometry(None);
        item.color_by(Some("height"), None, None);
        item.color_by(Some("temperature"), None, None);

        assert!(item.coloring().is_none());
        assert!(item.color_by_array_name().is_none());
        assert!(actor.scalar_coloring().is_none());
    }

    #[test]
    fn test_set_poly_data_keeps_coloring_array() {
        let (mut item, _) = geometry(None);
        item.color_by(Some("intensity"), None, None);

        let next = PolyData::new(2).with_array(DataArray::new("intensity", vec![1.0, 5.0]));
        item.set_poly_data(next);
        assert_eq!(item.color_by_array_name().as_deref(), Some("intensity"));
        // The previous lookup table is reused, not rebuilt from the new data
        assert_eq!(item.coloring().unwrap().lookup_table.range, (10.0, 30.0));

        item.set_poly_data(PolyData::new(1));
        assert!(item.coloring().is_none());
    }

    #[test]
    fn test_set_solid_color() {
        let (mut item, actor) = geometry(None);
        item.color_by(Some("height"), None, None);
        item.set_solid_color([0.0, 1.0, 0.0]).unwrap();

        assert_eq!(item.get_property(COLOR_PROPERTY), &PropertyValue::Color(Color::rgb(0, 255, 0)));
        assert!(item.coloring().is_none());
        assert!(actor.scalar_coloring().is_none());
    }

    #[test]
    fn test_remove_from_all_views() {
        let first = HeadlessView::new(1);
        let second = HeadlessView::new(2);
        let (mut item, actor) = geometry(Some(first.shared()));
        item.add_to_view(second.shared());

        item.on_remove_from_object_model();
        assert_eq!(item.view_count(), 0);
        assert!(actor.calls().contains(&ActorCall::RemoveFromRenderer(ViewId(2))));
    }

    #[test]
    fn test_has_data_set() {
        let (item, _) = geometry(None);
        assert!(item.has_data_set(item.poly_data().id()));
        assert!(!item.has_data_set(DataSetId::new()));
    }
}
