//! Home page
//!
//! The intro plays a fixed sequence with document scroll locked:
//!
//! ```text
//! overlay fade -> card entrance -> card reposition -> tagline reveal -> header fade
//!                                                                       |
//!                                                   scroll point (+0.2s)+
//! ```
//!
//! Scroll unlocks shortly after the header starts fading in, not at the end
//! of the timeline. The About, Services and Social section choreographies are
//! registered at that same point, so their observers never see the pre-intro
//! hidden state. When the intro's elements are not mounted the intro is
//! skipped and the sections register right away. The card's reposition values
//! come from the viewport width read once when the intro is built; they are
//! fixed for one playthrough.

use std::cell::Cell;
use std::rc::Rc;

use kinetic_animation::{Anchor, Easing, Position, ScrollPosition, Timeline, Tween, TweenVars};
use kinetic_core::{ElementId, EventTarget, EventType, Property, Rect, Surface};

use super::{killing, mounted, mounted_list, Flow, PageLayout};
use crate::config::{Breakpoints, Tier};
use crate::error::Result;
use crate::hook::{ChoreoContext, Cleanup, ComponentScope, OrchestrationOptions, WeakScope};
use crate::intro_gate::{IntroEvent, IntroGate};
use crate::scroll_lock::restore_document_scroll;
use crate::utils::StaggerIn;

pub const OVERLAY_FADE: f32 = 0.8;
pub const CARD_ENTRANCE: f32 = 1.0;
pub const CARD_REPOSITION: f32 = 1.0;
pub const TAGLINE_REVEAL: f32 = 0.6;
pub const TAGLINE_STAGGER: f32 = 0.05;
pub const HEADER_FADE: f32 = 0.6;
/// Scroll unlocks this long after the header starts fading in
pub const SCROLL_POINT_DELAY: f32 = 0.2;
/// Travel of the first social icon over the section's pass through the viewport
pub const SOCIAL_PARALLAX_DISTANCE: f32 = 80.0;

// ============================================================================
// Refs
// ============================================================================

#[derive(Clone, Debug, Default)]
pub struct HomeRefs {
    pub overlay: Option<ElementId>,
    pub card: Option<ElementId>,
    pub tagline: Option<ElementId>,
    pub header: Option<ElementId>,
    pub about: AboutSectionRefs,
    pub services: ServicesSectionRefs,
    pub social: SocialRefs,
}

#[derive(Clone, Debug, Default)]
pub struct AboutSectionRefs {
    pub section: Option<ElementId>,
    pub title: Option<ElementId>,
    pub text: Option<ElementId>,
}

#[derive(Clone, Debug, Default)]
pub struct ServicesSectionRefs {
    pub section: Option<ElementId>,
    pub items: Vec<ElementId>,
}

#[derive(Clone, Debug, Default)]
pub struct SocialRefs {
    pub section: Option<ElementId>,
    pub icons: Vec<ElementId>,
}

pub fn render(surface: &Surface, layout: &PageLayout) -> HomeRefs {
    let mut flow = Flow::new(surface, layout);
    let vh = layout.viewport.height;

    let hero = flow.block("section", vh);
    let header = flow.child(hero, "header", Some("Kinetic Studio"), 0.0, 80.0);
    let card = flow.child(hero, "div", None, vh * 0.2, vh * 0.55);
    let tagline = flow.child(hero, "p", Some("We make brands move"), vh * 0.8, 40.0);

    let about = flow.block("section", layout.section_height);
    let about_title = flow.child(about, "h2", Some("Who we are"), 80.0, 80.0);
    let about_text = flow.child(
        about,
        "p",
        Some("A creative studio for film, motion and interactive work."),
        200.0,
        160.0,
    );

    let services = flow.block("section", layout.section_height);
    let items = flow.list(services, "article", 4, 120.0, 120.0);

    let social = flow.block("section", layout.section_height * 0.75);
    let icons = flow.list(social, "a", 4, 120.0, 60.0);

    // Fixed on top of everything
    let overlay = surface.create_element("div", None);
    surface.set_rect(
        overlay,
        Rect::new(0.0, 0.0, layout.viewport.width, vh),
    );

    HomeRefs {
        overlay: Some(overlay),
        card: Some(card),
        tagline: Some(tagline),
        header: Some(header),
        about: AboutSectionRefs {
            section: Some(about),
            title: Some(about_title),
            text: Some(about_text),
        },
        services: ServicesSectionRefs {
            section: Some(services),
            items,
        },
        social: SocialRefs {
            section: Some(social),
            icons,
        },
    }
}

// ============================================================================
// Card pose
// ============================================================================

/// Where the card settles after the reposition step
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct CardPose {
    pub x: f32,
    pub y: f32,
    pub scale: f32,
    pub rotation: f32,
}

impl CardPose {
    pub const MOBILE: CardPose = CardPose {
        x: 80.0,
        y: -40.0,
        scale: 0.85,
        rotation: -4.0,
    };
    pub const TABLET: CardPose = CardPose {
        x: 200.0,
        y: -60.0,
        scale: 0.8,
        rotation: -6.0,
    };
    pub const DESKTOP: CardPose = CardPose {
        x: 350.0,
        y: -80.0,
        scale: 0.75,
        rotation: -8.0,
    };

    pub fn for_tier(tier: Tier) -> Self {
        match tier {
            Tier::Mobile => Self::MOBILE,
            Tier::Tablet => Self::TABLET,
            Tier::Desktop => Self::DESKTOP,
        }
    }

    pub fn for_width(width: f32, breakpoints: &Breakpoints) -> Self {
        Self::for_tier(breakpoints.tier(width))
    }

    pub fn vars(&self) -> TweenVars {
        TweenVars::x(self.x)
            .with_y(self.y)
            .with_scale(self.scale)
            .with_rotation(self.rotation)
    }
}

// ============================================================================
// Choreography
// ============================================================================

/// Register the home choreographies; the returned gate reports the intro phase
pub fn choreograph(scope: &ComponentScope, refs: HomeRefs) -> IntroGate {
    let gate = IntroGate::new(scope.context().surface);

    // Whatever the intro reached, leaving the page restores scrolling
    let restore_gate = gate.clone();
    scope.use_orchestration(
        move |ctx| {
            let gate = restore_gate.clone();
            let surface = ctx.surface.clone();
            Ok(Some(Box::new(move || {
                gate.release();
                restore_document_scroll(&surface);
            })))
        },
        OrchestrationOptions::default(),
    );

    let intro_gate = gate.clone();
    let sections = Sections {
        scope: scope.downgrade(),
        refs: refs.clone(),
        registered: Rc::new(Cell::new(false)),
    };
    scope.use_orchestration(
        move |ctx| intro(ctx, &refs, &intro_gate, &sections),
        OrchestrationOptions::default(),
    );
    gate
}

/// Registers the About, Services and Social choreographies at most once
#[derive(Clone)]
struct Sections {
    scope: WeakScope,
    refs: HomeRefs,
    registered: Rc<Cell<bool>>,
}

impl Sections {
    /// The scope the sections were just added to, `None` if already registered
    ///
    /// Registrations added while the scope is committing run in that same
    /// commit; otherwise the caller commits.
    fn register(&self) -> Option<ComponentScope> {
        if self.registered.replace(true) {
            return None;
        }
        let scope = self.scope.upgrade().filter(|s| s.is_mounted())?;
        tracing::debug!("home: registering section choreographies");

        let about = self.refs.about.clone();
        scope.use_orchestration(
            move |ctx| about_section(ctx, &about),
            OrchestrationOptions::default(),
        );
        let services = self.refs.services.clone();
        scope.use_orchestration(
            move |ctx| services_section(ctx, &services),
            OrchestrationOptions::default(),
        );
        let social = self.refs.social.clone();
        scope.use_orchestration(
            move |ctx| social_parallax(ctx, &social),
            OrchestrationOptions::default(),
        );
        Some(scope)
    }
}

fn intro(
    ctx: &ChoreoContext,
    refs: &HomeRefs,
    gate: &IntroGate,
    sections: &Sections,
) -> Result<Option<Cleanup>> {
    let surface = &ctx.surface;
    let Some([overlay, card, tagline, header]) =
        mounted(surface, [refs.overlay, refs.card, refs.tagline, refs.header])
    else {
        // Nothing gated, so the sections need not wait for a scroll point
        tracing::debug!("home: intro refs not mounted, skipping the intro");
        sections.register();
        return Ok(None);
    };

    gate.engage();

    let words = ctx.utils.split_words(tagline);
    ctx.engine.set(&[overlay], TweenVars::opacity(1.0))?;
    ctx.engine
        .set(&[card], TweenVars::opacity(0.0).with_y(100.0).with_scale(0.9))?;
    ctx.engine.set(&words, TweenVars::opacity(0.0).with_y(30.0))?;
    ctx.engine.set(&[header], TweenVars::opacity(0.0).with_y(-20.0))?;

    let width = surface.viewport().width;
    let pose = CardPose::for_width(width, &ctx.config.breakpoints);
    tracing::debug!("home: card pose for width {} is {:?}", width, pose);

    let started = gate.clone();
    let completed = gate.clone();
    let timeline = Timeline::new()
        .on_start(move || {
            started.send(IntroEvent::TimelineStarted);
        })
        .on_complete(move || {
            completed.send(IntroEvent::TimelineCompleted);
        })
        .add(
            Tween::to(&[overlay], TweenVars::opacity(0.0))
                .duration(OVERLAY_FADE)
                .ease(Easing::POWER2_IN_OUT),
            Position::End,
        )
        .add(
            Tween::to(&[card], TweenVars::opacity(1.0).with_y(0.0).with_scale(1.0))
                .duration(CARD_ENTRANCE)
                .ease(Easing::POWER3_OUT),
            Position::BeforeEnd(0.3),
        )
        .add(
            Tween::to(&[card], pose.vars())
                .duration(CARD_REPOSITION)
                .ease(Easing::POWER3_IN_OUT),
            Position::AfterEnd(0.2),
        )
        .add(
            Tween::to(&words, TweenVars::opacity(1.0).with_y(0.0))
                .duration(TAGLINE_REVEAL)
                .stagger(TAGLINE_STAGGER)
                .ease(Easing::POWER3_OUT),
            Position::BeforeEnd(0.4),
        )
        .add(
            Tween::to(&[header], TweenVars::opacity(1.0).with_y(0.0))
                .duration(HEADER_FADE)
                .ease(Easing::POWER2_OUT),
            Position::BeforeEnd(0.2),
        )
        .call(
            scroll_point(gate.clone(), sections.clone()),
            Position::WithPrevious(SCROLL_POINT_DELAY),
        );

    let handle = ctx.utils.play(timeline)?;
    handle.set_time_scale(ctx.config.intro.time_scale);
    Ok(Some(killing(vec![handle])))
}

/// Timeline step that unlocks scroll and registers the section choreographies
fn scroll_point(gate: IntroGate, sections: Sections) -> impl Fn() {
    move || {
        // A single large frame may cross this step before the start callback runs
        gate.send(IntroEvent::TimelineStarted);
        gate.send(IntroEvent::ScrollPointReached);

        if let Some(scope) = sections.register() {
            if let Err(err) = scope.commit() {
                tracing::warn!("home: section choreography failed: {}", err);
            }
        }
    }
}

// ============================================================================
// Sections
// ============================================================================

fn about_section(ctx: &ChoreoContext, refs: &AboutSectionRefs) -> Result<Option<Cleanup>> {
    let Some([section, title, text]) =
        mounted(&ctx.surface, [refs.section, refs.title, refs.text])
    else {
        return Ok(None);
    };

    let trigger = ctx.utils.reveal_trigger(
        section,
        Some(ScrollPosition::edge(Anchor::Top, Anchor::Percent(80.0))),
        None,
    )?;
    let timeline = ctx
        .utils
        .create_timeline(None)
        .scroll_trigger(trigger)
        .add(
            Tween::from_to(
                &[title],
                TweenVars::opacity(0.0).with_y(50.0),
                TweenVars::opacity(1.0).with_y(0.0),
            )
            .duration(1.0),
            Position::End,
        )
        .add(
            Tween::from_to(
                &[text],
                TweenVars::opacity(0.0).with_y(30.0),
                TweenVars::opacity(1.0).with_y(0.0),
            ),
            Position::BeforeEnd(0.6),
        );
    let handle = ctx.utils.play(timeline)?;
    Ok(Some(killing(vec![handle])))
}

fn services_section(ctx: &ChoreoContext, refs: &ServicesSectionRefs) -> Result<Option<Cleanup>> {
    let (Some([section]), Some(items)) = (
        mounted(&ctx.surface, [refs.section]),
        mounted_list(&ctx.surface, &refs.items),
    ) else {
        return Ok(None);
    };

    let handle = ctx.utils.stagger_in(
        &items,
        StaggerIn {
            each: Some(0.12),
            trigger: Some(section),
            start: Some(ScrollPosition::edge(Anchor::Top, Anchor::Percent(75.0))),
            ..Default::default()
        },
    )?;
    Ok(Some(killing(vec![handle])))
}

/// Icons drift up at increasing rates as the section crosses the viewport
///
/// Progress comes straight from the section's viewport box, so the same
/// scroll offset always yields the same offsets.
fn social_parallax(ctx: &ChoreoContext, refs: &SocialRefs) -> Result<Option<Cleanup>> {
    let (Some([section]), Some(icons)) = (
        mounted(&ctx.surface, [refs.section]),
        mounted_list(&ctx.surface, &refs.icons),
    ) else {
        return Ok(None);
    };

    let weak = ctx.surface.downgrade();
    let update = Rc::new(move || {
        let Some(surface) = weak.upgrade() else {
            return;
        };
        let Some(rect) = surface.bounding_client_rect(section) else {
            return;
        };
        let progress = social_progress(rect.y, rect.height, surface.viewport().height);
        for (index, icon) in icons.iter().enumerate() {
            surface.write_property(*icon, Property::Y, social_offset(progress, index));
        }
    });
    update();

    let on_scroll = Rc::clone(&update);
    let listener = ctx
        .surface
        .add_listener(EventTarget::Window, EventType::Scroll, move |_| on_scroll());
    let surface = ctx.surface.clone();
    Ok(Some(Box::new(move || {
        surface.remove_listener(listener);
    })))
}

/// 0 when the section's top meets the viewport bottom, 1 when its bottom leaves the top
pub fn social_progress(top: f32, height: f32, viewport_height: f32) -> f32 {
    let span = viewport_height + height;
    if span <= 0.0 {
        return 0.0;
    }
    ((viewport_height - top) / span).clamp(0.0, 1.0)
}

pub fn social_offset(progress: f32, index: usize) -> f32 {
    -progress * SOCIAL_PARALLAX_DISTANCE * (1.0 + index as f32 * 0.25)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_card_pose_tiers() {
        let bp = Breakpoints::default();
        assert_eq!(CardPose::for_width(500.0, &bp), CardPose::MOBILE);
        assert_eq!(CardPose::for_width(900.0, &bp), CardPose::TABLET);
        assert_eq!(CardPose::for_width(1280.0, &bp), CardPose::DESKTOP);
        assert_eq!(CardPose::DESKTOP.vars().rotation, Some(-8.0));
    }

    #[test]
    fn test_social_progress_is_pure() {
        assert_eq!(social_progress(800.0, 400.0, 800.0), 0.0);
        assert_eq!(social_progress(-400.0, 400.0, 800.0), 1.0);
        let mid = social_progress(200.0, 400.0, 800.0);
        assert_eq!(mid, 0.5);
        assert_eq!(social_progress(200.0, 400.0, 800.0), mid);
        assert_eq!(social_offset(0.5, 0), -40.0);
        assert_eq!(social_offset(0.5, 2), -60.0);
    }

    #[test]
    fn test_render_produces_every_ref() {
        let surface = Surface::new(kinetic_core::Viewport::new(1280.0, 800.0));
        let refs = render(&surface, &PageLayout::for_surface(&surface));
        assert!(refs.overlay.is_some() && refs.card.is_some());
        assert_eq!(refs.services.items.len(), 4);
        assert_eq!(refs.social.icons.len(), 4);
        assert!(surface.max_scroll() > 0.0);
    }
}
