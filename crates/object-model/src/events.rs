//! UI notifications delivered to the ObjectModel
//!
//! Toolkit adapters translate their native signals into these.

use serde::{Deserialize, Serialize};

use crate::widgets::{NodeHandle, PanelEdit};

/// Keys the tree's key filter reacts to
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Key {
    Delete,
    Other(u32),
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum TreeEvent {
    SelectionChanged,
    ItemClicked { node: NodeHandle, column: usize },
    ContextMenuRequested { position: (i32, i32) },
    KeyPressed(Key),
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum PanelEvent {
    ValueChanged(PanelEdit),
}
