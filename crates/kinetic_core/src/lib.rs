//! Kinetic Core
//!
//! Foundational primitives shared by the animation engine and the page
//! choreographies:
//!
//! - **Surface**: a headless, imperative animation surface. The rendering
//!   layer creates and removes elements and assigns layout rects; the
//!   animation layer writes transform, opacity and height.
//! - **Events**: window/document/element listeners with `prevent_default`
//!   semantics, used for scroll gating, pointer effects and resize refresh.
//! - **State Machines**: a small `StateTransitions` trait for explicit
//!   transition tables.
//!
//! # Example
//!
//! ```rust
//! use kinetic_core::{Property, Rect, Surface, Viewport};
//!
//! let surface = Surface::new(Viewport::new(1280.0, 800.0));
//! let card = surface.create_element("div", None);
//! surface.set_rect(card, Rect::new(0.0, 900.0, 400.0, 300.0));
//!
//! surface.write_property(card, Property::Opacity, 0.0);
//! assert_eq!(surface.read_property(card, Property::Opacity), Some(0.0));
//!
//! // Viewport-relative box, like getBoundingClientRect()
//! surface.scroll_to(100.0);
//! assert_eq!(surface.bounding_client_rect(card).map(|r| r.y), Some(800.0));
//! ```

pub mod error;
pub mod events;
pub mod fsm;
pub mod surface;

pub use error::{Result, SurfaceError};
pub use events::{Event, EventTarget, EventType, KeyCode};
pub use fsm::{StateMachine, StateTransitions};
pub use surface::{
    ElementId, ElementSnapshot, ElementStyle, ListenerId, Overflow, Property, Rect, Surface,
    SurfaceSnapshot, Viewport, WeakSurface,
};
