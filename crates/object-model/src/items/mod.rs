//! Item types registered in the object model
//!
//! ## Table of Contents
//! 1. ContainerItem - Folder-like grouping node
//! 2. ModelItem - Item backed by an externally loaded model
//! 3. PolyDataItem - Item rendering a point dataset through an actor

mod container;
mod model_item;
mod poly_data_item;

pub use container::ContainerItem;
pub use model_item::{ModelChangedCallback, ModelItem};
pub use poly_data_item::PolyDataItem;

use crate::attributes::PropertyAttributes;

pub const FILENAME_PROPERTY: &str = "Filename";
pub const ALPHA_PROPERTY: &str = "Alpha";
pub const COLOR_PROPERTY: &str = "Color";
pub const POINT_SIZE_PROPERTY: &str = "Point Size";

/// Opacity in [0, 1]
pub(crate) fn alpha_attributes() -> PropertyAttributes {
    PropertyAttributes::new()
        .with_decimals(2)
        .with_range(0.0, 1.0)
        .with_single_step(0.1)
}

/// Whole-pixel point size in [1, 20]
pub(crate) fn point_size_attributes() -> PropertyAttributes {
    PropertyAttributes::new()
        .with_decimals(0)
        .with_range(1.0, 20.0)
        .with_single_step(1.0)
}
