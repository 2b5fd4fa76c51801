//! # Rendering Collaborators
//!
//! Contracts between items and the rendering backend. The object model never
//! draws anything itself: items forward property changes to their backend and
//! ask every view they are attached to for a fresh frame.
//!
//! ## Table of Contents
//! 1. RenderView - A rendering surface shared by many items
//! 2. ModelBackend - Backend of a model-backed item (robot models)
//! 3. ActorBackend - Backend of a geometry item (one actor per dataset)
//! 4. AttachedViews - Ordered, duplicate-free list of views an item is in

use std::fmt;
use std::rc::Rc;

use serde::{Deserialize, Serialize};

use crate::poly_data::{DataSetId, PolyData, ScalarColoring};
use crate::value::Color;

/// Identity of a rendering surface
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct ViewId(pub u64);

impl fmt::Display for ViewId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "view{}", self.0)
    }
}

/// A rendering surface (3D viewport)
///
/// Views are shared between all items attached to them; an item only ever
/// adds or removes its own registration.
pub trait RenderView {
    fn id(&self) -> ViewId;

    /// Request a redraw
    fn render(&self);
}

pub type SharedView = Rc<dyn RenderView>;

/// Backend of a model-backed item
pub trait ModelBackend {
    fn filename(&self) -> String;
    fn visible(&self) -> bool;
    fn alpha(&self) -> f64;
    fn color(&self) -> Color;

    fn set_alpha(&mut self, alpha: f64);
    fn set_visible(&mut self, visible: bool);
    fn set_color(&mut self, color: Color);

    fn add_to_renderer(&mut self, view: &dyn RenderView);
    fn remove_from_renderer(&mut self, view: &dyn RenderView);

    /// Link that renders the given mesh, if this model owns it
    fn link_name_for_mesh(&self, _data_set: DataSetId) -> Option<String> {
        None
    }
}

/// Backend of a geometry item
pub trait ActorBackend {
    fn point_size(&self) -> f64;

    fn set_point_size(&mut self, size: f64);
    fn set_opacity(&mut self, alpha: f64);
    fn set_visibility(&mut self, visible: bool);
    /// Solid color with channels in 0.0-1.0
    fn set_color(&mut self, rgb: [f64; 3]);

    /// Point the actor's mapper at a new dataset
    fn set_input(&mut self, data: &PolyData);
    /// `None` turns scalar coloring off
    fn set_scalar_coloring(&mut self, coloring: Option<&ScalarColoring>);

    fn add_to_renderer(&mut self, view: &dyn RenderView);
    fn remove_from_renderer(&mut self, view: &dyn RenderView);
}

/// Views an item is attached to, in attach order
#[derive(Default)]
pub struct AttachedViews {
    views: Vec<SharedView>,
}

impl AttachedViews {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn len(&self) -> usize {
        self.views.len()
    }

    pub fn is_empty(&self) -> bool {
        self.views.is_empty()
    }

    pub fn contains(&self, view: &dyn RenderView) -> bool {
        let id = view.id();
        self.views.iter().any(|v| v.id() == id)
    }

    /// Returns false (and changes nothing) if the view is already attached
    pub fn attach(&mut self, view: SharedView) -> bool {
        if self.contains(view.as_ref()) {
            return false;
        }
        self.views.push(view);
        true
    }

    /// # Panics
    /// If the view is not attached.
    pub fn detach(&mut self, view: &dyn RenderView) -> SharedView {
        let id = view.id();
        match self.views.iter().position(|v| v.id() == id) {
            Some(index) => self.views.remove(index),
            None => panic!("{} is not attached", id),
        }
    }

    /// Copy of the current list, for detaching while iterating
    pub fn snapshot(&self) -> Vec<SharedView> {
        self.views.clone()
    }

    pub fn ids(&self) -> Vec<ViewId> {
        self.views.iter().map(|v| v.id()).collect()
    }

    pub fn render_all(&self) {
        for view in &self.views {
            view.render();
        }
    }
}

impl fmt::Debug for AttachedViews {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_list().entries(self.ids()).finish()
    }
}
