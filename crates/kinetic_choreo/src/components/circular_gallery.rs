//! Circular gallery
//!
//! Items sit on a horizontal ring seen from the front: the item facing the
//! viewer is full size and opaque, items toward the back shrink and fade.
//! The ring turns on its own and bends downward as the container scrolls
//! through the viewport.

use std::cell::Cell;
use std::rc::Rc;

use kinetic_animation::{EngineHandle, ObserverId, ScrollTriggerConfig, TickCallbackId};
use kinetic_core::{ElementId, Property, Surface};

use crate::error::{ChoreoError, Result};
use crate::hook::ChoreoContext;

const BACK_SCALE: f32 = 0.6;
const BACK_OPACITY: f32 = 0.3;

#[derive(Clone, Copy, Debug, PartialEq)]
pub struct GalleryOptions {
    pub radius: f32,
    /// Degrees per second
    pub autoplay_speed: f32,
    /// Vertical drop of the ring's back at full scroll progress
    pub bend: f32,
}

impl Default for GalleryOptions {
    fn default() -> Self {
        Self {
            radius: 400.0,
            autoplay_speed: 12.0,
            bend: 60.0,
        }
    }
}

/// Where one item sits on the ring
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct ItemPose {
    pub x: f32,
    pub y: f32,
    pub scale: f32,
    pub opacity: f32,
}

impl ItemPose {
    /// Pose of item `index` out of `count` with the ring turned by `rotation` degrees
    pub fn on_ring(index: usize, count: usize, rotation: f32, radius: f32, bend: f32) -> Self {
        let step = 360.0 / count.max(1) as f32;
        let angle = (rotation + step * index as f32).to_radians();
        let (sin, cos) = angle.sin_cos();
        // 1 facing the viewer, 0 at the back
        let depth = (cos + 1.0) / 2.0;
        Self {
            x: radius * sin,
            y: bend * (1.0 - cos),
            scale: BACK_SCALE + (1.0 - BACK_SCALE) * depth,
            opacity: BACK_OPACITY + (1.0 - BACK_OPACITY) * depth,
        }
    }
}

struct RingState {
    items: Vec<ElementId>,
    rotation: Cell<f32>,
    bend: Cell<f32>,
    radius: f32,
}

impl RingState {
    fn layout(&self, surface: &Surface) {
        let count = self.items.len();
        for (index, item) in self.items.iter().enumerate() {
            let pose = ItemPose::on_ring(index, count, self.rotation.get(), self.radius, self.bend.get());
            surface.update_style(*item, |style| {
                style.x = pose.x;
                style.y = pose.y;
                style.scale = pose.scale;
                style.opacity = pose.opacity;
            });
        }
    }
}

pub struct CircularGallery {
    engine: EngineHandle,
    state: Rc<RingState>,
    tick: Option<TickCallbackId>,
    observer: Option<ObserverId>,
}

impl CircularGallery {
    pub fn mount(
        ctx: &ChoreoContext,
        container: ElementId,
        items: &[ElementId],
        options: GalleryOptions,
    ) -> Result<Self> {
        ctx.surface.require(container)?;
        for item in items {
            ctx.surface.require(*item)?;
        }
        if items.is_empty() || !(options.radius > 0.0) {
            return Err(ChoreoError::InvalidOptions(format!(
                "gallery needs items and a positive radius ({} items, radius {})",
                items.len(),
                options.radius
            )));
        }

        let state = Rc::new(RingState {
            items: items.to_vec(),
            rotation: Cell::new(0.0),
            bend: Cell::new(0.0),
            radius: options.radius,
        });
        state.layout(&ctx.surface);

        let tick = if ctx.config.reduced_motion {
            None
        } else {
            let ring = Rc::clone(&state);
            let surface = ctx.surface.downgrade();
            let speed = options.autoplay_speed;
            ctx.engine.add_tick_callback(move |dt| {
                let Some(surface) = surface.upgrade() else {
                    return;
                };
                ring.rotation.set((ring.rotation.get() + speed * dt).rem_euclid(360.0));
                ring.layout(&surface);
            })
        };

        let ring = Rc::clone(&state);
        let surface = ctx.surface.downgrade();
        let observer = ctx.engine.scroll_trigger(
            ScrollTriggerConfig::new(container).on_update(move |progress| {
                ring.bend.set(options.bend * progress);
                if let Some(surface) = surface.upgrade() {
                    ring.layout(&surface);
                }
            }),
        )?;

        tracing::debug!("gallery: {} items on {:?}", items.len(), container);
        Ok(Self {
            engine: ctx.engine.clone(),
            state,
            tick,
            observer: Some(observer),
        })
    }

    /// Current ring rotation in degrees
    pub fn rotation(&self) -> f32 {
        self.state.rotation.get()
    }

    pub fn bend(&self) -> f32 {
        self.state.bend.get()
    }

    pub fn dispose(&mut self) {
        if let Some(tick) = self.tick.take() {
            self.engine.remove_tick_callback(tick);
        }
        if let Some(observer) = self.observer.take() {
            self.engine.kill_observer(observer);
        }
    }
}

impl Drop for CircularGallery {
    fn drop(&mut self) {
        self.dispose();
    }
}
