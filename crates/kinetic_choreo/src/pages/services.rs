//! Services page
//!
//! A panel-wipe preloader, the hero reveal, an accordion of service panels
//! and the process steps. Panel bodies start collapsed; clicking a header
//! tweens the body's height to its natural layout height or back to zero,
//! interrupting whatever tween was running on that body.

use std::cell::Cell;
use std::rc::Rc;

use kinetic_animation::{Anchor, Easing, Position, ScrollPosition, Timeline, Tween, TweenVars};
use kinetic_core::{ElementId, EventTarget, EventType, ListenerId, Overflow, Rect, Surface};

use super::{killing, mounted, mounted_list, Flow, PageLayout};
use crate::components::{Preloader, PreloaderOptions};
use crate::error::Result;
use crate::hook::{ChoreoContext, Cleanup, ComponentScope, OrchestrationOptions};
use crate::utils::{AnimationUtils, StaggerIn};

pub const PANEL_OPEN: f32 = 0.5;
pub const PANEL_CLOSE: f32 = 0.4;
pub const PRELOADER_PANELS: usize = 3;

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct PanelRefs {
    pub header: ElementId,
    pub body: ElementId,
}

#[derive(Clone, Debug, Default)]
pub struct ServicesRefs {
    /// Full-height columns covering the page until the wipe
    pub preloader_panels: Vec<ElementId>,
    pub hero_title: Option<ElementId>,
    pub hero_text: Option<ElementId>,
    pub panels: Vec<PanelRefs>,
    pub steps_section: Option<ElementId>,
    pub steps: Vec<ElementId>,
}

pub fn render(surface: &Surface, layout: &PageLayout) -> ServicesRefs {
    let mut flow = Flow::new(surface, layout);
    let section = layout.section_height;

    let hero = flow.block("section", layout.viewport.height);
    let hero_title = flow.child(hero, "h1", Some("Services"), 200.0, 140.0);
    let hero_text = flow.child(
        hero,
        "p",
        Some("Brand films, motion systems and interactive sites."),
        360.0,
        80.0,
    );

    let accordion = flow.block("section", section * 1.5);
    let panels = ["Film", "Motion design", "Web", "Strategy"]
        .into_iter()
        .enumerate()
        .map(|(i, name)| {
            let offset = 40.0 + i as f32 * 320.0;
            let panel = flow.child(accordion, "div", None, offset, 320.0);
            PanelRefs {
                header: flow.child(panel, "button", Some(name), 0.0, 80.0),
                body: flow.child(panel, "div", None, 80.0, 240.0),
            }
        })
        .collect();

    let steps_section = flow.block("section", section);
    let steps = flow.list(steps_section, "li", 4, 120.0, 100.0);

    // Fixed on top of everything
    let column = layout.viewport.width / PRELOADER_PANELS as f32;
    let preloader_panels = (0..PRELOADER_PANELS)
        .map(|i| {
            let panel = surface.create_element("div", None);
            surface.set_rect(
                panel,
                Rect::new(i as f32 * column, 0.0, column, layout.viewport.height),
            );
            panel
        })
        .collect();

    ServicesRefs {
        preloader_panels,
        hero_title: Some(hero_title),
        hero_text: Some(hero_text),
        panels,
        steps_section: Some(steps_section),
        steps,
    }
}

pub fn choreograph(scope: &ComponentScope, refs: ServicesRefs) {
    let panels = refs.preloader_panels.clone();
    scope.use_orchestration(
        move |ctx| preloader(ctx, &panels),
        OrchestrationOptions::default(),
    );

    let hero = refs.clone();
    scope.use_orchestration(move |ctx| hero_reveal(ctx, &hero), OrchestrationOptions::default());

    let panels = refs.panels.clone();
    scope.use_orchestration(move |ctx| accordion(ctx, &panels), OrchestrationOptions::default());

    scope.use_orchestration(
        move |ctx| {
            let (Some([section]), Some(steps)) = (
                mounted(&ctx.surface, [refs.steps_section]),
                mounted_list(&ctx.surface, &refs.steps),
            ) else {
                return Ok(None);
            };
            let handle = ctx.utils.stagger_in(
                &steps,
                StaggerIn {
                    trigger: Some(section),
                    start: Some(ScrollPosition::edge(Anchor::Top, Anchor::Percent(75.0))),
                    ..Default::default()
                },
            )?;
            Ok(Some(killing(vec![handle])))
        },
        OrchestrationOptions::default(),
    );
}

fn preloader(ctx: &ChoreoContext, panels: &[ElementId]) -> Result<Option<Cleanup>> {
    let Some(panels) = mounted_list(&ctx.surface, panels) else {
        return Ok(None);
    };
    let mut preloader = Preloader::mount(
        ctx,
        &panels,
        PreloaderOptions::default().on_complete(|| tracing::debug!("services: page uncovered")),
    )?;
    Ok(Some(Box::new(move || preloader.dispose())))
}

fn hero_reveal(ctx: &ChoreoContext, refs: &ServicesRefs) -> Result<Option<Cleanup>> {
    let Some([title, text]) = mounted(&ctx.surface, [refs.hero_title, refs.hero_text]) else {
        return Ok(None);
    };

    let chars = ctx.utils.split_text(title);
    let timeline = Timeline::new()
        .add(
            Tween::from_to(
                &chars,
                TweenVars::opacity(0.0).with_y(40.0),
                TweenVars::opacity(1.0).with_y(0.0),
            )
            .duration(0.6)
            .stagger(0.03)
            .ease(Easing::POWER3_OUT),
            Position::End,
        )
        .add(
            Tween::from_to(
                &[text],
                TweenVars::opacity(0.0).with_y(20.0),
                TweenVars::opacity(1.0).with_y(0.0),
            )
            .duration(0.6)
            .ease(Easing::POWER2_OUT),
            Position::BeforeEnd(0.4),
        );
    let handle = ctx.utils.play(timeline)?;
    Ok(Some(killing(vec![handle])))
}

fn accordion(ctx: &ChoreoContext, panels: &[PanelRefs]) -> Result<Option<Cleanup>> {
    let ids: Vec<ElementId> = panels.iter().flat_map(|p| [p.header, p.body]).collect();
    if mounted_list(&ctx.surface, &ids).is_none() {
        return Ok(None);
    }

    let mut listeners: Vec<ListenerId> = Vec::with_capacity(panels.len());
    for panel in panels {
        let body = panel.body;
        ctx.engine.set(&[body], TweenVars::height(0.0).with_opacity(0.0))?;
        ctx.surface.update_style(body, |style| style.overflow = Overflow::Hidden);

        let open = Rc::new(Cell::new(false));
        let utils = ctx.utils.clone();
        let surface = ctx.surface.downgrade();
        listeners.push(ctx.surface.add_listener(
            EventTarget::Element(panel.header),
            EventType::Click,
            move |_| {
                let Some(surface) = surface.upgrade() else {
                    return;
                };
                let opening = !open.get();
                open.set(opening);
                toggle_panel(&utils, &surface, body, opening);
            },
        ));
    }

    let surface = ctx.surface.clone();
    let engine = ctx.engine.clone();
    let bodies: Vec<ElementId> = panels.iter().map(|p| p.body).collect();
    Ok(Some(Box::new(move || {
        for listener in listeners {
            surface.remove_listener(listener);
        }
        for body in bodies {
            engine.kill_tweens_of(body);
        }
    })))
}

fn toggle_panel(utils: &AnimationUtils, surface: &Surface, body: ElementId, opening: bool) {
    utils.engine().kill_tweens_of(body);
    let tween = if opening {
        let natural = surface.rect(body).map(|r| r.height).unwrap_or(0.0);
        Tween::to(&[body], TweenVars::height(natural).with_opacity(1.0))
            .duration(PANEL_OPEN)
            .ease(Easing::POWER3_OUT)
    } else {
        Tween::to(&[body], TweenVars::height(0.0).with_opacity(0.0))
            .duration(PANEL_CLOSE)
            .ease(Easing::POWER2_IN_OUT)
    };
    tracing::trace!("services: panel {:?} {}", body, if opening { "opening" } else { "closing" });
    if let Err(err) = utils.play(tween) {
        tracing::warn!("services: panel toggle failed: {}", err);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::ChoreoConfig;
    use kinetic_animation::AnimationEngine;
    use kinetic_core::{Event, Property, Viewport};

    fn mount_services() -> (Surface, AnimationEngine, ComponentScope, ServicesRefs) {
        let surface = Surface::new(Viewport::new(1280.0, 800.0));
        let engine = AnimationEngine::new(surface.clone());
        let scope = ComponentScope::new(
            ChoreoContext::new(engine.handle(), ChoreoConfig::default()).unwrap(),
        );
        let refs = render(&surface, &PageLayout::for_surface(&surface));
        choreograph(&scope, refs.clone());
        scope.commit().unwrap();
        (surface, engine, scope, refs)
    }

    #[test]
    fn test_panels_start_collapsed() {
        let (surface, _engine, _scope, refs) = mount_services();
        for panel in &refs.panels {
            assert_eq!(surface.read_property(panel.body, Property::Height), Some(0.0));
            assert_eq!(surface.style(panel.body).unwrap().overflow, Overflow::Hidden);
        }
    }

    #[test]
    fn test_header_click_toggles_body() {
        let (surface, engine, _scope, refs) = mount_services();
        let panel = refs.panels[1];
        let click = || surface.dispatch(EventTarget::Element(panel.header), Event::click(0.0, 0.0));

        click();
        engine.advance(PANEL_OPEN + 0.1);
        assert_eq!(surface.read_property(panel.body, Property::Height), Some(240.0));
        assert_eq!(surface.read_property(panel.body, Property::Opacity), Some(1.0));
        assert_eq!(
            surface.read_property(refs.panels[0].body, Property::Height),
            Some(0.0)
        );

        click();
        engine.advance(PANEL_CLOSE + 0.1);
        assert_eq!(surface.read_property(panel.body, Property::Height), Some(0.0));
    }

    #[test]
    fn test_click_mid_tween_reverses_from_current_height() {
        let (surface, engine, _scope, refs) = mount_services();
        let panel = refs.panels[0];

        surface.dispatch(EventTarget::Element(panel.header), Event::click(0.0, 0.0));
        engine.advance(PANEL_OPEN / 2.0);
        let midway = surface.read_property(panel.body, Property::Height).unwrap();
        assert!(midway > 0.0 && midway < 240.0);

        surface.dispatch(EventTarget::Element(panel.header), Event::click(0.0, 0.0));
        engine.advance(0.0);
        let after = surface.read_property(panel.body, Property::Height).unwrap();
        assert!(after <= midway);
        engine.advance(PANEL_CLOSE);
        assert_eq!(surface.read_property(panel.body, Property::Height), Some(0.0));
    }

    #[test]
    fn test_preloader_uncovers_the_page() {
        let (surface, engine, scope, refs) = mount_services();
        assert_eq!(refs.preloader_panels.len(), PRELOADER_PANELS);
        for panel in &refs.preloader_panels {
            assert_eq!(surface.read_property(*panel, Property::Y), Some(0.0));
        }

        engine.advance(2.0);
        for panel in &refs.preloader_panels {
            assert_eq!(surface.read_property(*panel, Property::Y), Some(-800.0));
        }
        scope.unmount();
        assert_eq!(engine.animation_count(), 0);
    }

    #[test]
    fn test_unmount_detaches_headers() {
        let (surface, _engine, scope, refs) = mount_services();
        let header = refs.panels[0].header;
        assert_eq!(surface.listener_count(EventTarget::Element(header)), 1);
        scope.unmount();
        assert_eq!(surface.listener_count(EventTarget::Element(header)), 0);
    }
}
