//! Backing geometry datasets and scalar coloring
//!
//! ## Table of Contents
//! 1. DataSetId - Identity of a dataset
//! 2. DataArray / PolyData - Named point arrays with an active-scalars slot
//! 3. LookupTable / ScalarColoring - Scalar-to-color mapping handed to actors

use serde::{Deserialize, Serialize};
use std::sync::atomic::{AtomicU64, Ordering};

static NEXT_DATA_SET_ID: AtomicU64 = AtomicU64::new(1);

/// Identity of a dataset, stable across clones
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct DataSetId(u64);

impl DataSetId {
    pub fn new() -> Self {
        Self(NEXT_DATA_SET_ID.fetch_add(1, Ordering::Relaxed))
    }
}

impl Default for DataSetId {
    fn default() -> Self {
        Self::new()
    }
}

/// Named per-point scalar array
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DataArray {
    pub name: String,
    pub values: Vec<f64>,
}

impl DataArray {
    pub fn new(name: impl Into<String>, values: Vec<f64>) -> Self {
        Self {
            name: name.into(),
            values,
        }
    }

    /// (min, max) of the values; `None` when empty
    pub fn range(&self) -> Option<(f64, f64)> {
        let mut iter = self.values.iter().copied().filter(|v| !v.is_nan());
        let first = iter.next()?;
        Some(iter.fold((first, first), |(lo, hi), v| (lo.min(v), hi.max(v))))
    }
}

/// Point dataset rendered by geometry items
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PolyData {
    id: DataSetId,
    pub point_count: usize,
    arrays: Vec<DataArray>,
    active_scalars: Option<String>,
}

impl PolyData {
    pub fn new(point_count: usize) -> Self {
        Self {
            id: DataSetId::new(),
            point_count,
            arrays: Vec::new(),
            active_scalars: None,
        }
    }

    pub fn with_array(mut self, array: DataArray) -> Self {
        self.add_array(array);
        self
    }

    pub fn id(&self) -> DataSetId {
        self.id
    }

    /// Add or replace an array by name
    pub fn add_array(&mut self, array: DataArray) {
        match self.arrays.iter_mut().find(|a| a.name == array.name) {
            Some(existing) => *existing = array,
            None => self.arrays.push(array),
        }
    }

    pub fn array(&self, name: &str) -> Option<&DataArray> {
        self.arrays.iter().find(|a| a.name == name)
    }

    pub fn array_names(&self) -> Vec<String> {
        self.arrays.iter().map(|a| a.name.clone()).collect()
    }

    pub fn active_scalars(&self) -> Option<&DataArray> {
        self.active_scalars.as_deref().and_then(|name| self.array(name))
    }

    /// Select the scalars array by name; unknown names clear the selection
    pub fn set_active_scalars(&mut self, name: Option<&str>) {
        self.active_scalars = name
            .filter(|n| self.array(n).is_some())
            .map(str::to_string);
    }
}

/// Hue-ramp lookup table mapping a scalar range to colors
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LookupTable {
    pub number_of_colors: usize,
    pub hue_range: (f64, f64),
    pub range: (f64, f64),
}

impl LookupTable {
    /// 256-color blue-to-red table over `range`
    pub fn new(range: (f64, f64)) -> Self {
        Self {
            number_of_colors: 256,
            hue_range: (0.667, 0.0),
            range,
        }
    }
}

/// Scalar coloring state pushed to an actor
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ScalarColoring {
    pub array_name: String,
    pub lookup_table: LookupTable,
    /// Colors come from the lookup table's own range, not the data's
    pub use_lookup_table_range: bool,
    pub interpolate_before_mapping: bool,
}
