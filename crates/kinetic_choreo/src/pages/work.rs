//! Work page
//!
//! A full-screen overlay opens the page: its title reveals character by
//! character, holds, then wipes up. Once the wipe ends the overlay is removed
//! from the document and the main content fades in. Project cards reveal on
//! scroll, a decorative badge spins forever and a circular gallery of stills
//! closes the page.

use kinetic_animation::{Anchor, Easing, Position, ScrollPosition, Timeline, Tween, TweenVars};
use kinetic_core::{ElementId, Rect, Surface};

use super::{killing, mounted, mounted_list, Flow, PageLayout};
use crate::components::{CircularGallery, GalleryOptions};
use crate::error::Result;
use crate::hook::{ChoreoContext, Cleanup, ComponentScope, OrchestrationOptions};

pub const INTRO_TITLE: &str = "Our Work";
pub const TITLE_REVEAL: f32 = 0.6;
pub const TITLE_STAGGER: f32 = 0.03;
pub const OVERLAY_HOLD: f32 = 0.4;
pub const OVERLAY_WIPE: f32 = 0.8;
pub const CONTENT_FADE: f32 = 0.6;

/// Length of the intro for the default title
pub const INTRO_DURATION: f32 = TITLE_REVEAL
    + TITLE_STAGGER * (INTRO_TITLE.len() - 1) as f32
    + OVERLAY_HOLD
    + OVERLAY_WIPE
    + CONTENT_FADE;

/// Length of the intro for a title of `title_chars` characters
pub fn intro_duration(title_chars: usize) -> f32 {
    TITLE_REVEAL
        + TITLE_STAGGER * title_chars.saturating_sub(1) as f32
        + OVERLAY_HOLD
        + OVERLAY_WIPE
        + CONTENT_FADE
}

/// Seconds per badge revolution
pub const BADGE_REVOLUTION: f32 = 12.0;
pub const GALLERY_ITEMS: usize = 8;

#[derive(Clone, Debug, Default)]
pub struct WorkRefs {
    pub overlay: Option<ElementId>,
    pub overlay_title: Option<ElementId>,
    pub main: Option<ElementId>,
    pub grid: Option<ElementId>,
    pub cards: Vec<ElementId>,
    pub badge: Option<ElementId>,
    pub gallery: Option<ElementId>,
    pub gallery_items: Vec<ElementId>,
}

pub fn render(surface: &Surface, layout: &PageLayout) -> WorkRefs {
    let mut flow = Flow::new(surface, layout);
    let vh = layout.viewport.height;

    let main = flow.block("main", vh + layout.section_height * 2.0);
    let _heading = flow.child(main, "h1", Some("Selected projects"), 120.0, 120.0);
    let badge = flow.child(main, "div", None, 140.0, 120.0);
    let grid = flow.child(main, "div", None, vh, layout.section_height * 2.0);
    let cards = flow.list(grid, "article", 6, vh, layout.section_height / 3.0);

    let gallery = flow.block("section", layout.section_height);
    let gallery_items = (0..GALLERY_ITEMS)
        .map(|_| flow.child(gallery, "figure", None, layout.section_height * 0.25, 240.0))
        .collect();

    let overlay = surface.create_element("div", None);
    surface.set_rect(overlay, Rect::new(0.0, 0.0, layout.viewport.width, vh));
    let overlay_title = flow.child(overlay, "h1", Some(INTRO_TITLE), vh * 0.4, 120.0);

    WorkRefs {
        overlay: Some(overlay),
        overlay_title: Some(overlay_title),
        main: Some(main),
        grid: Some(grid),
        cards,
        badge: Some(badge),
        gallery: Some(gallery),
        gallery_items,
    }
}

pub fn choreograph(scope: &ComponentScope, refs: WorkRefs) {
    let intro_refs = refs.clone();
    scope.use_orchestration(
        move |ctx| intro(ctx, &intro_refs),
        OrchestrationOptions::default(),
    );
    let card_refs = refs.clone();
    scope.use_orchestration(
        move |ctx| project_cards(ctx, &card_refs),
        OrchestrationOptions::default(),
    );
    let badge = refs.badge;
    scope.use_orchestration(
        move |ctx| {
            let Some([badge]) = mounted(&ctx.surface, [badge]) else {
                return Ok(None);
            };
            let handle = ctx.utils.infinite_loop(badge, BADGE_REVOLUTION)?;
            Ok(Some(killing(vec![handle])))
        },
        OrchestrationOptions::default(),
    );
    scope.use_orchestration(
        move |ctx| {
            let (Some([gallery]), Some(items)) = (
                mounted(&ctx.surface, [refs.gallery]),
                mounted_list(&ctx.surface, &refs.gallery_items),
            ) else {
                return Ok(None);
            };
            let mut ring = CircularGallery::mount(ctx, gallery, &items, GalleryOptions::default())?;
            Ok(Some(Box::new(move || ring.dispose())))
        },
        OrchestrationOptions::default(),
    );
}

fn intro(ctx: &ChoreoContext, refs: &WorkRefs) -> Result<Option<Cleanup>> {
    let Some([overlay, title, main]) =
        mounted(&ctx.surface, [refs.overlay, refs.overlay_title, refs.main])
    else {
        return Ok(None);
    };

    ctx.engine.set(&[overlay], TweenVars::opacity(1.0).with_y(0.0))?;
    ctx.engine.set(&[main], TweenVars::opacity(0.0))?;
    let chars = ctx.utils.split_text(title);

    let surface = ctx.surface.downgrade();
    let remove_overlay = move || {
        let Some(surface) = surface.upgrade() else {
            return;
        };
        match surface.remove_element(overlay) {
            Ok(()) => tracing::debug!("work: intro overlay removed"),
            Err(err) => tracing::trace!("work: overlay already gone: {}", err),
        }
    };

    let wipe = -ctx.surface.viewport().height;
    let timeline = Timeline::new()
        .add(
            Tween::from_to(
                &chars,
                TweenVars::opacity(0.0).with_y(40.0),
                TweenVars::opacity(1.0).with_y(0.0),
            )
            .duration(TITLE_REVEAL)
            .stagger(TITLE_STAGGER)
            .ease(Easing::POWER3_OUT),
            Position::End,
        )
        .add(
            Tween::to(&[overlay], TweenVars::y(wipe))
                .duration(OVERLAY_WIPE)
                .ease(Easing::POWER4_IN_OUT),
            Position::AfterEnd(OVERLAY_HOLD),
        )
        .call(remove_overlay, Position::End)
        .add(
            Tween::to(&[main], TweenVars::opacity(1.0))
                .duration(CONTENT_FADE)
                .ease(Easing::POWER2_OUT),
            Position::End,
        );

    let handle = ctx.utils.play(timeline)?;
    handle.set_time_scale(ctx.config.intro.time_scale);
    Ok(Some(killing(vec![handle])))
}

fn project_cards(ctx: &ChoreoContext, refs: &WorkRefs) -> Result<Option<Cleanup>> {
    let (Some([grid]), Some(cards)) = (
        mounted(&ctx.surface, [refs.grid]),
        mounted_list(&ctx.surface, &refs.cards),
    ) else {
        return Ok(None);
    };

    let trigger = ctx.utils.reveal_trigger(
        grid,
        Some(ScrollPosition::edge(Anchor::Top, Anchor::Percent(80.0))),
        None,
    )?;
    let handle = ctx.utils.play(
        Tween::from_to(
            &cards,
            TweenVars::opacity(0.0).with_y(80.0),
            TweenVars::opacity(1.0).with_y(0.0),
        )
        .duration(0.8)
        .stagger(0.15)
        .ease(Easing::POWER3_OUT)
        .scroll_trigger(trigger),
    )?;
    Ok(Some(killing(vec![handle])))
}

#[cfg(test)]
mod tests {
    use super::*;

    use crate::config::ChoreoConfig;
    use kinetic_animation::AnimationEngine;
    use kinetic_core::{Property, Viewport};

    #[test]
    fn test_gallery_turns_until_unmount() {
        let surface = Surface::new(Viewport::new(1280.0, 800.0));
        let engine = AnimationEngine::new(surface.clone());
        let scope = ComponentScope::new(
            ChoreoContext::new(engine.handle(), ChoreoConfig::default()).unwrap(),
        );
        let refs = render(&surface, &PageLayout::for_surface(&surface));
        choreograph(&scope, refs.clone());
        scope.commit().unwrap();

        let gallery = refs.gallery.unwrap();
        let front = refs.gallery_items[0];
        assert_eq!(refs.gallery_items.len(), GALLERY_ITEMS);
        assert!(engine.handle().has_observer_for(gallery));
        assert_eq!(engine.tick_callback_count(), 1);
        assert!((surface.read_property(front, Property::Scale).unwrap() - 1.0).abs() < 1e-3);

        engine.advance(1.0);
        assert!(surface.read_property(front, Property::X).unwrap() > 0.0);

        scope.unmount();
        assert_eq!(engine.tick_callback_count(), 0);
        assert!(!engine.handle().has_observer_for(gallery));
    }

    #[test]
    fn test_intro_duration_sums_steps() {
        assert!((INTRO_DURATION - 2.61).abs() < 1e-5);
        assert_eq!(intro_duration(INTRO_TITLE.chars().count()), INTRO_DURATION);
        assert!((intro_duration(0) - 2.4).abs() < 1e-5);
    }
}
