//! Panel-wipe preloader
//!
//! Full-height panels cover the page while it loads, then slide up out of
//! the viewport one after another.

use std::cell::Cell;
use std::rc::Rc;

use kinetic_animation::{AnimationHandle, Callback, Easing, Tween, TweenVars};
use kinetic_core::ElementId;

use crate::error::{ChoreoError, Result};
use crate::hook::ChoreoContext;

#[derive(Clone)]
pub struct PreloaderOptions {
    pub duration: f32,
    pub stagger: f32,
    pub delay: f32,
    pub on_complete: Option<Callback>,
}

impl Default for PreloaderOptions {
    fn default() -> Self {
        Self {
            duration: 0.8,
            stagger: 0.1,
            delay: 0.3,
            on_complete: None,
        }
    }
}

impl PreloaderOptions {
    pub fn on_complete<F: Fn() + 'static>(mut self, f: F) -> Self {
        self.on_complete = Some(Rc::new(f));
        self
    }
}

pub struct Preloader {
    panels: Vec<ElementId>,
    handle: Option<AnimationHandle>,
    done: Rc<Cell<bool>>,
}

impl Preloader {
    pub fn mount(ctx: &ChoreoContext, panels: &[ElementId], options: PreloaderOptions) -> Result<Self> {
        if panels.is_empty() {
            return Err(ChoreoError::InvalidOptions(
                "preloader needs at least one panel".to_string(),
            ));
        }
        for panel in panels {
            ctx.surface.require(*panel)?;
        }

        let done = Rc::new(Cell::new(false));
        let flag = Rc::clone(&done);
        let user_callback = options.on_complete.clone();
        let wipe = -ctx.surface.viewport().height;
        let handle = ctx.utils.play(
            Tween::to(panels, TweenVars::y(wipe))
                .duration(options.duration)
                .stagger(options.stagger)
                .delay(options.delay)
                .ease(Easing::POWER4_IN_OUT)
                .on_complete(move || {
                    flag.set(true);
                    tracing::debug!("preloader: wipe complete");
                    if let Some(callback) = &user_callback {
                        callback();
                    }
                }),
        )?;

        Ok(Self {
            panels: panels.to_vec(),
            handle: Some(handle),
            done,
        })
    }

    pub fn panels(&self) -> &[ElementId] {
        &self.panels
    }

    pub fn is_done(&self) -> bool {
        self.done.get()
    }

    pub fn dispose(&mut self) {
        if let Some(handle) = self.handle.take() {
            handle.kill();
        }
    }
}

impl Drop for Preloader {
    fn drop(&mut self) {
        self.dispose();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::ChoreoConfig;
    use kinetic_animation::AnimationEngine;
    use kinetic_core::{Property, Surface, Viewport};

    #[test]
    fn test_panels_wipe_then_complete() {
        let surface = Surface::new(Viewport::new(1280.0, 800.0));
        let panels: Vec<_> = (0..3).map(|_| surface.create_element("div", None)).collect();
        let engine = AnimationEngine::new(surface.clone());
        let ctx = ChoreoContext::new(engine.handle(), ChoreoConfig::default()).unwrap();

        let calls = Rc::new(Cell::new(0));
        let counter = Rc::clone(&calls);
        let preloader = Preloader::mount(
            &ctx,
            &panels,
            PreloaderOptions::default().on_complete(move || counter.set(counter.get() + 1)),
        )
        .unwrap();

        engine.advance(0.9);
        assert!(!preloader.is_done());
        engine.advance(0.6);
        assert!(preloader.is_done());
        assert_eq!(calls.get(), 1);
        for panel in &panels {
            assert_eq!(surface.read_property(*panel, Property::Y), Some(-800.0));
        }

        engine.advance(1.0);
        assert_eq!(calls.get(), 1);
    }

    #[test]
    fn test_requires_panels() {
        let surface = Surface::new(Viewport::new(1280.0, 800.0));
        let engine = AnimationEngine::new(surface);
        let ctx = ChoreoContext::new(engine.handle(), ChoreoConfig::default()).unwrap();
        assert!(matches!(
            Preloader::mount(&ctx, &[], PreloaderOptions::default()),
            Err(ChoreoError::InvalidOptions(_))
        ));
    }

    #[test]
    fn test_dispose_kills_the_wipe() {
        let surface = Surface::new(Viewport::new(1280.0, 800.0));
        let panel = surface.create_element("div", None);
        let engine = AnimationEngine::new(surface);
        let ctx = ChoreoContext::new(engine.handle(), ChoreoConfig::default()).unwrap();

        let mut preloader = Preloader::mount(&ctx, &[panel], PreloaderOptions::default()).unwrap();
        preloader.dispose();
        engine.advance(2.0);
        assert!(!preloader.is_done());
        assert_eq!(engine.animation_count(), 0);
    }
}
