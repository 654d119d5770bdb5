//! About page
//!
//! Word-by-word hero reveal, story blocks revealed on scroll, stat counters,
//! a scrubbed image parallax, a magnetic call to action and a client logo
//! marquee. Every unit is a separate registration, so a missing element only
//! silences its own unit.

use kinetic_animation::{Easing, Position, ScrollTriggerConfig, Timeline, Tween, TweenVars};
use kinetic_core::{ElementId, Rect, Surface};

use super::{killing, mounted, mounted_list, Flow, PageLayout};
use crate::components::{CountUp, CountUpOptions, LogoLoop, LogoLoopOptions};
use crate::error::Result;
use crate::hook::{ChoreoContext, Cleanup, ComponentScope, OrchestrationOptions};
use crate::utils::ScrollReveal;

pub const HERO_REVEAL: f32 = 0.8;
pub const HERO_STAGGER: f32 = 0.08;
/// The image travels from `-IMAGE_PARALLAX` to `+IMAGE_PARALLAX` across its wrapper's pass
pub const IMAGE_PARALLAX: f32 = 80.0;
/// Seconds the image lags behind the scroll position
pub const IMAGE_SCRUB_LAG: f32 = 1.0;
pub const CLIENT_LOGOS: [&str; 5] = ["Northwind", "Halcyon", "Vertex", "Lumen", "Atlas"];
pub const LOGO_WIDTH: f32 = 200.0;

#[derive(Clone, Debug, Default)]
pub struct AboutRefs {
    pub hero_title: Option<ElementId>,
    pub hero_subtitle: Option<ElementId>,
    pub story_blocks: Vec<ElementId>,
    /// Counter element and its final value
    pub stats: Vec<(ElementId, f32)>,
    pub image_wrap: Option<ElementId>,
    pub image: Option<ElementId>,
    pub cta: Option<ElementId>,
    /// Holds two copies of the logo set side by side
    pub logo_track: Option<ElementId>,
}

pub fn render(surface: &Surface, layout: &PageLayout) -> AboutRefs {
    let mut flow = Flow::new(surface, layout);
    let section = layout.section_height;

    let hero = flow.block("section", layout.viewport.height);
    let hero_title = flow.child(hero, "h1", Some("Stories told in motion"), 200.0, 140.0);
    let hero_subtitle = flow.child(
        hero,
        "p",
        Some("Twelve years of film, design and code."),
        360.0,
        60.0,
    );

    let story = flow.block("section", section * 1.5);
    let story_blocks = flow.list(story, "article", 3, 80.0, section * 0.4);

    let stats_section = flow.block("section", section * 0.6);
    let stats = flow
        .list(stats_section, "strong", 3, 80.0, 80.0)
        .into_iter()
        .zip([120.0, 48.0, 2500.0])
        .collect();

    let image_wrap = flow.block("figure", section);
    let image = flow.child(image_wrap, "img", None, 0.0, section);

    let contact = flow.block("section", section * 0.5);
    let cta = flow.child(contact, "a", Some("Start a project"), 100.0, 80.0);

    let clients = flow.block("section", section * 0.4);
    let logo_track = flow.child(clients, "div", None, 80.0, 80.0);
    let track_top = surface.rect(logo_track).map(|r| r.y).unwrap_or(0.0);
    for (i, name) in CLIENT_LOGOS.iter().chain(CLIENT_LOGOS.iter()).enumerate() {
        let logo = surface.create_element("img", Some(logo_track));
        surface.set_rect(logo, Rect::new(i as f32 * LOGO_WIDTH, track_top, LOGO_WIDTH, 80.0));
        surface.set_text(logo, *name);
    }

    AboutRefs {
        hero_title: Some(hero_title),
        hero_subtitle: Some(hero_subtitle),
        story_blocks,
        stats,
        image_wrap: Some(image_wrap),
        image: Some(image),
        cta: Some(cta),
        logo_track: Some(logo_track),
    }
}

pub fn choreograph(scope: &ComponentScope, refs: AboutRefs) {
    let hero = refs.clone();
    scope.use_orchestration(move |ctx| hero_reveal(ctx, &hero), OrchestrationOptions::default());

    let blocks = refs.story_blocks.clone();
    scope.use_orchestration(
        move |ctx| story_reveal(ctx, &blocks),
        OrchestrationOptions::default(),
    );

    let stats = refs.stats.clone();
    scope.use_orchestration(move |ctx| counters(ctx, &stats), OrchestrationOptions::default());

    let (image_wrap, image) = (refs.image_wrap, refs.image);
    scope.use_orchestration(
        move |ctx| image_parallax(ctx, image_wrap, image),
        OrchestrationOptions::default(),
    );

    let cta = refs.cta;
    scope.use_orchestration(
        move |ctx| {
            let Some([cta]) = mounted(&ctx.surface, [cta]) else {
                return Ok(None);
            };
            Ok(Some(ctx.utils.magnetic_effect(cta)?.into_cleanup()))
        },
        OrchestrationOptions::default(),
    );

    let track = refs.logo_track;
    scope.use_orchestration(
        move |ctx| {
            let Some([track]) = mounted(&ctx.surface, [track]) else {
                return Ok(None);
            };
            let set_width = LOGO_WIDTH * CLIENT_LOGOS.len() as f32;
            let mut marquee = LogoLoop::mount(ctx, track, set_width, LogoLoopOptions::default())?;
            Ok(Some(Box::new(move || marquee.dispose())))
        },
        OrchestrationOptions::default(),
    );
}

fn hero_reveal(ctx: &ChoreoContext, refs: &AboutRefs) -> Result<Option<Cleanup>> {
    let Some([title, subtitle]) = mounted(&ctx.surface, [refs.hero_title, refs.hero_subtitle])
    else {
        return Ok(None);
    };

    let words = ctx.utils.split_words(title);
    let timeline = Timeline::new()
        .add(
            Tween::from_to(
                &words,
                TweenVars::opacity(0.0).with_y(60.0),
                TweenVars::opacity(1.0).with_y(0.0),
            )
            .duration(HERO_REVEAL)
            .stagger(HERO_STAGGER)
            .ease(Easing::POWER3_OUT),
            Position::End,
        )
        .add(
            Tween::from_to(
                &[subtitle],
                TweenVars::opacity(0.0).with_y(20.0),
                TweenVars::opacity(1.0).with_y(0.0),
            )
            .duration(0.6)
            .ease(Easing::POWER2_OUT),
            Position::BeforeEnd(0.5),
        );
    let handle = ctx.utils.play(timeline)?;
    Ok(Some(killing(vec![handle])))
}

fn story_reveal(ctx: &ChoreoContext, blocks: &[ElementId]) -> Result<Option<Cleanup>> {
    let Some(blocks) = mounted_list(&ctx.surface, blocks) else {
        return Ok(None);
    };
    let handles = blocks
        .iter()
        .map(|block| {
            ctx.utils.animate_on_scroll(
                *block,
                TweenVars::opacity(0.0).with_y(60.0),
                TweenVars::opacity(1.0).with_y(0.0),
                ScrollReveal::default(),
            )
        })
        .collect::<Result<Vec<_>>>()?;
    Ok(Some(killing(handles)))
}

fn counters(ctx: &ChoreoContext, stats: &[(ElementId, f32)]) -> Result<Option<Cleanup>> {
    let ids: Vec<ElementId> = stats.iter().map(|(id, _)| *id).collect();
    if mounted_list(&ctx.surface, &ids).is_none() {
        return Ok(None);
    }
    let counters = stats
        .iter()
        .map(|(id, value)| {
            CountUp::mount(
                ctx,
                *id,
                CountUpOptions {
                    suffix: "+".to_string(),
                    ..CountUpOptions::to(*value)
                },
            )
        })
        .collect::<Result<Vec<_>>>()?;
    Ok(Some(Box::new(move || {
        for mut counter in counters {
            counter.dispose();
        }
    })))
}

/// Image drifts against the scroll while its wrapper crosses the viewport
fn image_parallax(
    ctx: &ChoreoContext,
    image_wrap: Option<ElementId>,
    image: Option<ElementId>,
) -> Result<Option<Cleanup>> {
    let Some([image_wrap, image]) = mounted(&ctx.surface, [image_wrap, image]) else {
        return Ok(None);
    };
    if ctx.config.reduced_motion {
        return Ok(None);
    }

    let handle = ctx.engine.add(
        Tween::from_to(
            &[image],
            TweenVars::y(-IMAGE_PARALLAX),
            TweenVars::y(IMAGE_PARALLAX),
        )
        .ease(Easing::LINEAR)
        .scroll_trigger(ScrollTriggerConfig::new(image_wrap).scrub(Some(IMAGE_SCRUB_LAG))),
    )?;
    Ok(Some(killing(vec![handle])))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::ChoreoConfig;
    use kinetic_animation::AnimationEngine;
    use kinetic_core::{EventTarget, Property, Viewport};

    fn mount_about(config: ChoreoConfig) -> (Surface, AnimationEngine, ComponentScope, AboutRefs) {
        let surface = Surface::new(Viewport::new(1280.0, 800.0));
        let engine = AnimationEngine::new(surface.clone());
        let scope = ComponentScope::new(ChoreoContext::new(engine.handle(), config).unwrap());
        let refs = render(&surface, &PageLayout::for_surface(&surface));
        choreograph(&scope, refs.clone());
        scope.commit().unwrap();
        (surface, engine, scope, refs)
    }

    #[test]
    fn test_hero_words_reveal() {
        let (surface, engine, _scope, refs) = mount_about(ChoreoConfig::default());
        let title = refs.hero_title.unwrap();
        let words = surface.children(title);
        assert_eq!(words.len(), 4);
        assert_eq!(surface.read_property(words[0], Property::Opacity), Some(0.0));

        engine.advance(3.0);
        for word in words {
            assert_eq!(surface.read_property(word, Property::Opacity), Some(1.0));
        }
        assert_eq!(
            surface.read_property(refs.hero_subtitle.unwrap(), Property::Opacity),
            Some(1.0)
        );
    }

    #[test]
    fn test_cta_is_magnetic_until_unmount() {
        let (surface, _engine, scope, refs) = mount_about(ChoreoConfig::default());
        let cta = refs.cta.unwrap();
        assert!(scope.context().utils.is_magnetic(cta));
        assert_eq!(surface.listener_count(EventTarget::Element(cta)), 3);

        scope.unmount();
        assert!(!scope.context().utils.is_magnetic(cta));
        assert_eq!(surface.listener_count(EventTarget::Element(cta)), 0);
    }

    #[test]
    fn test_logo_marquee_runs_until_unmount() {
        let (surface, engine, scope, refs) = mount_about(ChoreoConfig::default());
        let track = refs.logo_track.unwrap();
        assert_eq!(surface.children(track).len(), CLIENT_LOGOS.len() * 2);
        assert_eq!(engine.tick_callback_count(), 1);

        engine.advance(0.5);
        assert!(surface.read_property(track, Property::X).unwrap() < 0.0);

        scope.unmount();
        assert_eq!(engine.tick_callback_count(), 0);
        assert_eq!(surface.listener_count(EventTarget::Element(track)), 0);
        let parked = surface.read_property(track, Property::X);
        engine.advance(0.5);
        assert_eq!(surface.read_property(track, Property::X), parked);
    }

    #[test]
    fn test_missing_image_skips_only_the_parallax() {
        let surface = Surface::new(Viewport::new(1280.0, 800.0));
        let engine = AnimationEngine::new(surface.clone());
        let scope = ComponentScope::new(
            ChoreoContext::new(engine.handle(), ChoreoConfig::default()).unwrap(),
        );
        let mut refs = render(&surface, &PageLayout::for_surface(&surface));
        let image_wrap = refs.image_wrap.unwrap();
        refs.image = None;
        choreograph(&scope, refs.clone());
        scope.commit().unwrap();

        assert!(!engine.handle().has_observer_for(image_wrap));
        for block in &refs.story_blocks {
            assert!(engine.handle().has_observer_for(*block));
        }
    }

    #[test]
    fn test_reduced_motion_settles_immediately() {
        let config = ChoreoConfig {
            reduced_motion: true,
            ..Default::default()
        };
        let (surface, _engine, _scope, refs) = mount_about(config);
        for word in surface.children(refs.hero_title.unwrap()) {
            assert_eq!(surface.read_property(word, Property::Opacity), Some(1.0));
        }
        assert_eq!(surface.read_property(refs.image.unwrap(), Property::Y), Some(0.0));
    }
}
