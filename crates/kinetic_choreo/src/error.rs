//! Error types for kinetic_choreo

use kinetic_animation::AnimationError;
use kinetic_core::{ElementId, SurfaceError};
use thiserror::Error;

/// Errors raised by choreographies and the utility library
///
/// Missing element refs are not errors: choreographies skip the unit instead.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum ChoreoError {
    #[error(transparent)]
    Animation(#[from] AnimationError),

    #[error(transparent)]
    Surface(#[from] SurfaceError),

    /// `magnetic_effect` was called twice on the same element without unbinding
    #[error("element {0:?} already has a magnetic effect bound")]
    AlreadyBound(ElementId),

    /// A component was mounted with options it cannot work with
    #[error("invalid options: {0}")]
    InvalidOptions(String),

    /// Configuration could not be read or is inconsistent
    #[error("configuration error: {0}")]
    Config(String),
}

/// Result type for choreography operations
pub type Result<T> = std::result::Result<T, ChoreoError>;
