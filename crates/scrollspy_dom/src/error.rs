//! Element tree error types

use thiserror::Error;

use crate::tree::ElementId;

/// Errors raised by element tree and selector operations
#[derive(Error, Debug, Clone, PartialEq)]
pub enum DomError {
    /// The element id does not refer to a live element
    #[error("Unknown element: {0:?}")]
    UnknownElement(ElementId),

    /// Inserting the child would make an element its own ancestor
    #[error("Hierarchy request failed: {child:?} cannot be appended to {parent:?}")]
    Hierarchy { parent: ElementId, child: ElementId },

    /// Selector text could not be parsed
    #[error("Invalid selector '{selector}' at column {column}")]
    InvalidSelector { selector: String, column: usize },
}

/// Result type for element tree operations
pub type Result<T> = std::result::Result<T, DomError>;
