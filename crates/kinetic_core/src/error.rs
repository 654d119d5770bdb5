//! Error types for kinetic_core

use crate::surface::ElementId;
use thiserror::Error;

/// Errors raised by structural surface operations
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum SurfaceError {
    /// The element was never created or has already been removed
    #[error("element {0:?} is not mounted")]
    NotMounted(ElementId),

    /// The document root and body cannot be removed
    #[error("element {0:?} is a root scrolling container and cannot be removed")]
    RootContainer(ElementId),
}

/// Result type for surface operations
pub type Result<T> = std::result::Result<T, SurfaceError>;
