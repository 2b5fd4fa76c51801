//! # eustress-object-model
//!
//! Hierarchical object model for scene editors: items with dynamic, attributed
//! properties, mirrored into a tree view and a property panel.
//!
//! ## Features
//! - `PropertySet`: ordered properties with attributes and alternate names
//! - `ObjectItem`: containers, model-backed items and geometry items
//! - `ObjectModel`: item arena, hierarchy, tree visuals and panel sync
//! - Collaborator traits for the tree, the panel, views and render backends
//! - `headless`: in-memory collaborators for tools and tests
//!
//! ## Table of Contents
//! 1. Error types (`error`)
//! 2. Configuration (`config`)
//! 3. Values, attributes and property storage (`value`, `attributes`, `properties`)
//! 4. Items (`item`, `items`, `icons`)
//! 5. Rendering collaborators (`render`, `poly_data`)
//! 6. Widget collaborators and events (`widgets`, `events`)
//! 7. Object model and panel sync (`model`, `panel`, `sync`)
//! 8. Headless collaborators (`headless`)

mod attributes;
mod config;
mod error;
mod events;
pub mod headless;
mod icons;
mod item;
pub mod items;
mod model;
mod panel;
mod poly_data;
mod properties;
mod render;
mod sync;
mod value;
mod widgets;

pub use attributes::*;
pub use config::*;
pub use error::*;
pub use events::*;
pub use icons::*;
pub use item::*;
pub use model::*;
pub use poly_data::*;
pub use properties::*;
pub use render::*;
pub use sync::*;
pub use value::*;
pub use widgets::*;

/// Prelude for convenient imports
pub mod prelude {
    pub use crate::attributes::PropertyAttributes;
    pub use crate::config::ObjectModelConfig;
    pub use crate::error::{ObjectModelError, Result};
    pub use crate::events::{Key, PanelEvent, TreeEvent};
    pub use crate::icons::Icon;
    pub use crate::item::{ItemBase, ObjectId, ObjectItem};
    pub use crate::items::{ContainerItem, ModelItem, PolyDataItem};
    pub use crate::model::ObjectModel;
    pub use crate::poly_data::{DataArray, LookupTable, PolyData};
    pub use crate::properties::{NAME_PROPERTY, VISIBLE_PROPERTY};
    pub use crate::render::{ActorBackend, ModelBackend, RenderView, SharedView, ViewId};
    pub use crate::value::{Color, PropertyValue};
    pub use crate::widgets::{PanelEdit, PropertyPanel, TreeWidget};
}
