//! Headless page simulation

use anyhow::{Context, Result};
use serde::Serialize;
use tracing::debug;

use kinetic_animation::AnimationEngine;
use kinetic_choreo::{mount, ChoreoConfig, ChoreoContext, ComponentScope, PageKind};
use kinetic_core::{EventTarget, Surface, SurfaceSnapshot, Viewport};

pub struct Simulation {
    pub page: PageKind,
    pub width: f32,
    pub height: f32,
    pub duration: f32,
    pub fps: u32,
    pub scroll_to: Option<f32>,
    pub snapshot: bool,
}

#[derive(Debug, Serialize)]
pub struct SimulationReport {
    pub page: String,
    pub frames: u32,
    pub elapsed: f64,
    pub scroll_y: f32,
    pub document_height: f32,
    /// Home intro phase at the end of the run
    pub intro_phase: Option<String>,
    pub scroll_locked: bool,
    pub animations: usize,
    pub active_animations: usize,
    pub observers: usize,
    pub window_listeners: usize,
    /// Listeners left on window and document after unmount
    pub leaked_listeners: usize,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub surface: Option<SurfaceSnapshot>,
}

impl Simulation {
    pub fn frame_count(&self) -> u32 {
        (self.duration.max(0.0) * self.fps as f32).ceil() as u32
    }

    pub fn run(&self, config: ChoreoConfig) -> Result<SimulationReport> {
        if self.fps == 0 {
            anyhow::bail!("fps must be at least 1");
        }

        let surface = Surface::new(Viewport::new(self.width, self.height));
        let engine = AnimationEngine::new(surface.clone());
        let ctx = ChoreoContext::new(engine.handle(), config)?;
        let scope = ComponentScope::new(ctx);
        let page = mount(self.page, &scope)
            .with_context(|| format!("Failed to mount {} page", self.page))?;

        let frames = self.frame_count();
        let dt = 1.0 / self.fps as f32;
        for frame in 0..frames {
            if frame == frames / 2 {
                if let Some(y) = self.scroll_to {
                    debug!("frame {}: scrolling to {}", frame, y);
                    surface.scroll_to(y);
                }
            }
            engine.advance(dt);
        }

        let mut report = SimulationReport {
            page: self.page.to_string(),
            frames,
            elapsed: engine.elapsed(),
            scroll_y: surface.scroll_y(),
            document_height: surface.document_height(),
            intro_phase: page.gate.as_ref().map(|gate| format!("{:?}", gate.phase())),
            scroll_locked: surface.is_scroll_blocked(),
            animations: engine.animation_count(),
            active_animations: engine.active_count(),
            observers: engine.observer_count(),
            window_listeners: surface.listener_count(EventTarget::Window),
            leaked_listeners: 0,
            surface: self.snapshot.then(|| surface.snapshot()),
        };

        scope.unmount();
        report.leaked_listeners = surface.listener_count(EventTarget::Window)
            + surface.listener_count(EventTarget::Document);
        Ok(report)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn simulation(page: PageKind, duration: f32) -> Simulation {
        Simulation {
            page,
            width: 1280.0,
            height: 800.0,
            duration,
            fps: 60,
            scroll_to: None,
            snapshot: false,
        }
    }

    #[test]
    fn test_home_intro_completes() {
        let report = simulation(PageKind::Home, 5.0)
            .run(ChoreoConfig::default())
            .unwrap();
        assert_eq!(report.frames, 300);
        assert_eq!(report.intro_phase.as_deref(), Some("IntroComplete"));
        assert!(!report.scroll_locked);
        assert_eq!(report.leaked_listeners, 0);
    }

    #[test]
    fn test_scroll_and_snapshot() {
        let report = Simulation {
            scroll_to: Some(600.0),
            snapshot: true,
            ..simulation(PageKind::Services, 2.0)
        }
        .run(ChoreoConfig::default())
        .unwrap();
        assert_eq!(report.scroll_y, 600.0);
        assert!(report.intro_phase.is_none());
        assert!(report.surface.is_some_and(|s| !s.elements.is_empty()));
    }

    #[test]
    fn test_zero_fps_is_rejected() {
        let sim = Simulation {
            fps: 0,
            ..simulation(PageKind::Work, 1.0)
        };
        assert!(sim.run(ChoreoConfig::default()).is_err());
    }
}
