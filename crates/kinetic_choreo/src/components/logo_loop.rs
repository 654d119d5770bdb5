//! Logo marquee
//!
//! Scrolls a track horizontally at a constant speed and wraps at the width
//! of one logo set, so a track holding two copies of the set loops without a
//! seam. Hovering the track eases the speed toward `hover_speed` (zero by
//! default) and back again on leave.

use std::cell::RefCell;
use std::rc::Rc;

use kinetic_animation::{EngineHandle, TickCallbackId};
use kinetic_core::{ElementId, EventTarget, EventType, ListenerId, Property, WeakSurface};
use smallvec::SmallVec;

use crate::error::{ChoreoError, Result};
use crate::hook::ChoreoContext;

/// Time constant of the speed smoothing, in seconds
const VELOCITY_SMOOTHING: f32 = 0.25;

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum LoopDirection {
    #[default]
    Left,
    Right,
}

#[derive(Clone, Copy, Debug, PartialEq)]
pub struct LogoLoopOptions {
    /// Pixels per second
    pub speed: f32,
    pub direction: LoopDirection,
    pub pause_on_hover: bool,
    /// Speed while hovered; overrides `pause_on_hover`
    pub hover_speed: Option<f32>,
}

impl Default for LogoLoopOptions {
    fn default() -> Self {
        Self {
            speed: 120.0,
            direction: LoopDirection::Left,
            pause_on_hover: true,
            hover_speed: None,
        }
    }
}

impl LogoLoopOptions {
    fn target_velocity(&self, hovered: bool) -> f32 {
        match (hovered, self.hover_speed) {
            (true, Some(speed)) => speed,
            (true, None) if self.pause_on_hover => 0.0,
            _ => self.speed,
        }
    }
}

#[derive(Debug, Default)]
struct LoopState {
    offset: f32,
    velocity: f32,
    hovered: bool,
}

pub struct LogoLoop {
    track: ElementId,
    engine: EngineHandle,
    surface: WeakSurface,
    tick: Option<TickCallbackId>,
    listeners: SmallVec<[ListenerId; 2]>,
    state: Rc<RefCell<LoopState>>,
}

impl LogoLoop {
    /// Start scrolling `track`; `set_width` is the width of one logo set
    pub fn mount(
        ctx: &ChoreoContext,
        track: ElementId,
        set_width: f32,
        options: LogoLoopOptions,
    ) -> Result<Self> {
        ctx.surface.require(track)?;
        if !(set_width > 0.0) {
            return Err(ChoreoError::InvalidOptions(format!(
                "logo loop set width must be positive, got {}",
                set_width
            )));
        }

        let state = Rc::new(RefCell::new(LoopState {
            velocity: options.speed,
            ..Default::default()
        }));
        let mut this = Self {
            track,
            engine: ctx.engine.clone(),
            surface: ctx.surface.downgrade(),
            tick: None,
            listeners: SmallVec::new(),
            state: Rc::clone(&state),
        };

        if ctx.config.reduced_motion {
            tracing::debug!("logo loop: reduced motion, track {:?} stays put", track);
            return Ok(this);
        }

        for (event_type, hovered) in [(EventType::PointerEnter, true), (EventType::PointerLeave, false)] {
            let state = Rc::clone(&state);
            this.listeners.push(ctx.surface.add_listener(
                EventTarget::Element(track),
                event_type,
                move |_| state.borrow_mut().hovered = hovered,
            ));
        }

        let surface = ctx.surface.downgrade();
        this.tick = ctx.engine.add_tick_callback(move |dt| {
            let Some(surface) = surface.upgrade() else {
                return;
            };
            let x = {
                let mut state = state.borrow_mut();
                let target = options.target_velocity(state.hovered);
                let blend = 1.0 - (-dt / VELOCITY_SMOOTHING).exp();
                state.velocity += (target - state.velocity) * blend;
                state.offset = (state.offset + state.velocity * dt).rem_euclid(set_width);
                track_x(state.offset, set_width, options.direction)
            };
            surface.write_property(track, Property::X, x);
        });

        tracing::debug!(
            "logo loop: {:?} at {} px/s, wrapping every {}px",
            track,
            options.speed,
            set_width
        );
        Ok(this)
    }

    pub fn track(&self) -> ElementId {
        self.track
    }

    /// Distance scrolled within the current set
    pub fn offset(&self) -> f32 {
        self.state.borrow().offset
    }

    pub fn velocity(&self) -> f32 {
        self.state.borrow().velocity
    }

    pub fn dispose(&mut self) {
        if let Some(tick) = self.tick.take() {
            self.engine.remove_tick_callback(tick);
        }
        if let Some(surface) = self.surface.upgrade() {
            for listener in self.listeners.drain(..) {
                surface.remove_listener(listener);
            }
        }
        self.listeners.clear();
    }
}

impl Drop for LogoLoop {
    fn drop(&mut self) {
        self.dispose();
    }
}

fn track_x(offset: f32, set_width: f32, direction: LoopDirection) -> f32 {
    match direction {
        LoopDirection::Left => -offset,
        LoopDirection::Right => offset - set_width,
    }
}
