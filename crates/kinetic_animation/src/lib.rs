//! Kinetic Animation Engine
//!
//! Tweens, timelines, and scroll observers driving the properties of a
//! [`kinetic_core::Surface`].
//!
//! # Features
//!
//! - **Easing**: GSAP-style named curves (`"power3.out"`, `"back.out(1.7)"`)
//! - **Tweens**: `to` / `from` / `from_to` / `set` with stagger, repeat, yoyo
//! - **Timelines**: nestable sequencing with relative positions and labels
//! - **Scroll Observers**: toggle actions or scrubbed progress bound to scroll
//! - **Engine**: single-threaded ticker with kill/refresh and tick callbacks
//! - **Presets**: named easings and reusable motion parameters

pub mod easing;
pub mod error;
pub mod presets;
pub mod scheduler;
pub mod scroll;
pub mod timeline;
pub mod tween;
pub mod values;

pub use easing::{EaseDirection, Easing};
pub use error::{AnimationError, Result};
pub use presets::{AnimationPreset, Eases, MotionPreset, Presets};
pub use scheduler::{
    AnimationEngine, AnimationHandle, AnimationId, AnimationStatus, EngineHandle, ObserverId,
    PlayState, TickCallback, TickCallbackId, TimelineHandle,
};
pub use scroll::{
    Anchor, Crossing, Region, ScrollMode, ScrollObserver, ScrollPosition, ScrollTriggerConfig,
    ToggleAction, ToggleActions,
};
pub use timeline::{Animation, Position, Timeline};
pub use tween::{Callback, ProgressCallback, StaggerFrom, Tween, TweenDefaults, TweenKind};
pub use values::{Interpolate, TweenVars};
