//! Symbolic icon identifiers
//!
//! Widgets map these to their own images; the model never touches pixels.

use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Icon {
    Directory,
    Eye,
    EyeOff,
    Matlab,
    #[default]
    Robot,
    Laser,
    Feet,
    Hand,
}

impl Icon {
    /// Icon for the tree's visibility column
    pub fn visibility(visible: bool) -> Self {
        if visible {
            Icon::Eye
        } else {
            Icon::EyeOff
        }
    }
}
