//! Error types for eustress-object-model
//!
//! ## Table of Contents
//! 1. ObjectModelError - Main error enum
//! 2. Result type alias
//!
//! Precondition violations (reading a property that was never added, removing
//! a view that is not attached) are programming errors and panic at the call
//! site instead of producing one of these variants.

use thiserror::Error;

use crate::item::ObjectId;

/// Result type alias for object model operations
pub type Result<T> = std::result::Result<T, ObjectModelError>;

/// Errors that can occur in object model operations
#[derive(Error, Debug, Clone, PartialEq)]
pub enum ObjectModelError {
    /// Two different property names sanitize to the same alternate name
    #[error("Adding property '{property}' would conflict with existing property '{existing}' (alternate name '{alternate}')")]
    NameConflict {
        property: String,
        existing: String,
        alternate: String,
    },

    /// Symbolic value is not one of the property's enum labels
    #[error("'{value}' is not a valid choice for enum property '{property}'")]
    UnknownEnumValue { property: String, value: String },

    /// Object id is not registered in the model
    #[error("Object {0} is not registered in the object model")]
    ObjectNotFound(ObjectId),

    /// Configuration error
    #[error("Config error: {0}")]
    Config(String),
}

impl From<toml::de::Error> for ObjectModelError {
    fn from(err: toml::de::Error) -> Self {
        ObjectModelError::Config(err.to_string())
    }
}
