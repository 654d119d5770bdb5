//! Error types for kinetic_animation

use thiserror::Error;

/// Errors raised while building or registering animations
#[derive(Error, Debug, Clone, PartialEq)]
pub enum AnimationError {
    /// Easing name could not be parsed (e.g. `"power9.out"`)
    #[error("invalid easing '{0}'")]
    InvalidEasing(String),

    /// Timeline position string could not be parsed (e.g. `"+=abc"`)
    #[error("invalid timeline position '{0}'")]
    InvalidPosition(String),

    /// Scroll position string could not be parsed (e.g. `"top"`)
    #[error("invalid scroll position '{0}': expected '<element> <viewport>' or '+=<px>'")]
    InvalidScrollPosition(String),

    /// Toggle actions string must name exactly four actions
    #[error("invalid toggle actions '{0}'")]
    InvalidToggleActions(String),

    /// A scroll observer needs a trigger element and the animation has no targets
    #[error("scroll observer has no trigger element")]
    MissingTrigger,

    /// The engine behind a handle has been dropped
    #[error("animation engine has been dropped")]
    EngineDropped,
}

/// Result type for animation operations
pub type Result<T> = std::result::Result<T, AnimationError>;
