//! Scroll-spy error types

use scrollspy_dom::{DomError, ElementId};
use thiserror::Error;

/// Errors raised at binding and configuration boundaries
///
/// Scroll resolution itself never fails.
#[derive(Error, Debug)]
pub enum SpyError {
    #[error("Unknown element: {0:?}")]
    UnknownElement(ElementId),

    /// Update or detach of a container that was never attached
    #[error("Element {0:?} has no scroll-spy container binding")]
    NotAttached(ElementId),

    #[error("Invalid options JSON: {0}")]
    Json(#[from] serde_json::Error),

    #[error("Invalid options TOML: {0}")]
    Toml(#[from] toml::de::Error),

    #[error(transparent)]
    Dom(#[from] DomError),
}

/// Result type for scroll-spy operations
pub type Result<T> = std::result::Result<T, SpyError>;
