//! Kinetic Choreography
//!
//! Page-level animation orchestration on top of [`kinetic_animation`].
//!
//! # Features
//!
//! - **Utilities**: text splitting, scroll reveals, staggered entrances,
//!   infinite loops and the magnetic hover effect ([`AnimationUtils`])
//! - **Orchestration Hook**: per-component registration with dependency
//!   tracking and cleanup on re-run or unmount ([`ComponentScope`])
//! - **Intro Gate**: scroll locking tied to the home intro's phases
//! - **Pages**: Home, About, Work and Services choreographies
//! - **Components**: CountUp, LogoLoop, Preloader and CircularGallery
//! - **Configuration**: TOML-backed breakpoints, defaults and reduced motion

pub mod components;
pub mod config;
pub mod error;
pub mod hook;
pub mod intro_gate;
pub mod pages;
pub mod scroll_lock;
pub mod unit;
pub mod utils;


pub use config::{
    Breakpoints, ChoreoConfig, IntroConfig, MagneticConfig, ScrollRevealConfig, Tier,
    TimingConfig, CONFIG_ENV,
};
pub use error::{ChoreoError, Result};
pub use hook::{
    dependency_key, ChoreoContext, Cleanup, ComponentScope, DependencyKey, ExecutionEnv,
    OrchestrationOptions, RegistrationId, WeakScope,
};
pub use intro_gate::{IntroEvent, IntroGate, IntroPhase};
pub use pages::{mount, MountedPage, PageKind, PageLayout};
pub use scroll_lock::{restore_document_scroll, ScrollLockController};
pub use unit::{UnitEvent, UnitState};
pub use utils::{AnimationUtils, MagneticBinding, ScrollReveal, StaggerIn};
