use std::any::Any;

use crate::icons::Icon;
use crate::item::{ItemBase, ObjectItem};

/// Grouping node with nothing but a name
#[derive(Debug)]
pub struct ContainerItem {
    base: ItemBase,
}

impl ContainerItem {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            base: ItemBase::new(name, Icon::Directory),
        }
    }
}

impl ObjectItem for ContainerItem {
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
}
