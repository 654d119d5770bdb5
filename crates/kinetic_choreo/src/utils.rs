//! Animation utility library
//!
//! Named helpers on top of the engine so choreographies do not repeat magic
//! numbers: text splitting, pre-configured timelines, scroll reveals,
//! staggered entrances, the magnetic pointer effect, and decorative loops.

use std::cell::{Cell, RefCell};
use std::rc::Rc;

use kinetic_animation::{
    AnimationHandle, AnimationId, Easing, EngineHandle, Presets, ScrollPosition,
    ScrollTriggerConfig, Timeline, ToggleActions, Tween, TweenDefaults, TweenVars,
};
use kinetic_core::{ElementId, EventTarget, EventType, ListenerId, Surface};
use rustc_hash::FxHashSet;

use crate::config::ChoreoConfig;
use crate::error::{ChoreoError, Result};
use crate::hook::Cleanup;

/// Tag of the wrapper elements created by the split helpers
pub const SPLIT_TAG: &str = "span";

/// Gap kept between word wrappers, in `em`
pub const WORD_GAP_EM: f32 = 0.25;

const NBSP: char = '\u{a0}';

/// Overrides for [`AnimationUtils::animate_on_scroll`]
#[derive(Clone, Debug, Default)]
pub struct ScrollReveal {
    /// Defaults to the animated element itself
    pub trigger: Option<ElementId>,
    pub start: Option<ScrollPosition>,
    pub end: Option<ScrollPosition>,
    pub toggle_actions: Option<ToggleActions>,
    pub duration: Option<f32>,
    pub ease: Option<Easing>,
}

/// Options for [`AnimationUtils::stagger_in`]
#[derive(Clone, Copy, Debug, Default)]
pub struct StaggerIn {
    /// Seconds between targets; the preset's when `None`
    pub each: Option<f32>,
    pub delay: f32,
    /// Reveal on scroll with this trigger instead of playing immediately
    pub trigger: Option<ElementId>,
    pub start: Option<ScrollPosition>,
}

// ============================================================================
// AnimationUtils
// ============================================================================

/// Utility library injected into choreographies
#[derive(Clone)]
pub struct AnimationUtils {
    engine: EngineHandle,
    surface: Surface,
    presets: Presets,
    config: Rc<ChoreoConfig>,
    magnetic: Rc<RefCell<FxHashSet<ElementId>>>,
}

impl AnimationUtils {
    pub fn new(engine: EngineHandle, surface: Surface, config: Rc<ChoreoConfig>) -> Self {
        Self {
            engine,
            surface,
            presets: Presets::default(),
            config,
            magnetic: Rc::new(RefCell::new(FxHashSet::default())),
        }
    }

    pub fn engine(&self) -> &EngineHandle {
        &self.engine
    }

    pub fn config(&self) -> &ChoreoConfig {
        &self.config
    }

    /// Register an animation, jumping it to its end under reduced motion
    pub fn play(&self, animation: impl Into<kinetic_animation::Animation>) -> Result<AnimationHandle> {
        let handle = self.engine.add(animation)?;
        if self.config.reduced_motion {
            handle.complete();
        }
        Ok(handle)
    }

    // ========================================================================
    // Text splitting
    // ========================================================================

    /// Replace an element's text with one wrapper per character
    ///
    /// Whitespace becomes a non-breaking space so wrappers keep their width.
    /// Splitting again replaces the previous wrappers: ids returned by an
    /// earlier call no longer resolve.
    pub fn split_text(&self, element: ElementId) -> Vec<ElementId> {
        let Some(text) = self.take_text(element) else {
            return Vec::new();
        };
        let pieces: Vec<String> = text
            .chars()
            .map(|c| if c.is_whitespace() { NBSP } else { c })
            .map(String::from)
            .collect();
        self.wrap(element, &pieces, 0.0)
    }

    /// Replace an element's text with one wrapper per word
    ///
    /// Every word but the last keeps a trailing margin to restore the spacing
    /// lost by wrapping. Same re-split behavior as [`split_text`](Self::split_text).
    pub fn split_words(&self, element: ElementId) -> Vec<ElementId> {
        let Some(text) = self.take_text(element) else {
            return Vec::new();
        };
        let words: Vec<String> = text.split_whitespace().map(String::from).collect();
        self.wrap(element, &words, WORD_GAP_EM)
    }

    /// Read the element's text (own, or rebuilt from earlier wrappers) and clear it
    fn take_text(&self, element: ElementId) -> Option<String> {
        let surface = &self.surface;
        if !surface.contains(element) {
            return None;
        }
        let text = match surface.text(element) {
            Some(text) => text,
            None => {
                let mut text = String::new();
                for child in surface.children(element) {
                    if surface.tag(child).as_deref() != Some(SPLIT_TAG) {
                        continue;
                    }
                    if let Some(piece) = surface.text(child) {
                        text.extend(piece.chars().map(|c| if c == NBSP { ' ' } else { c }));
                    }
                    let gap = surface.style(child).map(|s| s.margin_right_em).unwrap_or(0.0);
                    if gap > 0.0 {
                        text.push(' ');
                    }
                    if let Err(err) = surface.remove_element(child) {
                        tracing::trace!("utils: split wrapper {:?} already gone: {}", child, err);
                    }
                }
                text
            }
        };
        surface.clear_text(element);
        Some(text)
    }

    fn wrap(&self, element: ElementId, pieces: &[String], gap_em: f32) -> Vec<ElementId> {
        let surface = &self.surface;
        let rect = surface.rect(element).unwrap_or_default();
        let last = pieces.len().saturating_sub(1);
        pieces
            .iter()
            .enumerate()
            .map(|(i, piece)| {
                let span = surface.create_element(SPLIT_TAG, Some(element));
                surface.set_text(span, piece);
                surface.set_rect(span, rect);
                if i < last && gap_em > 0.0 {
                    surface.update_style(span, |style| style.margin_right_em = gap_em);
                }
                span
            })
            .collect()
    }

    // ========================================================================
    // Builders
    // ========================================================================

    /// A timeline whose children default to the configured duration and ease
    pub fn create_timeline(&self, overrides: Option<TweenDefaults>) -> Timeline {
        let defaults = overrides.unwrap_or(TweenDefaults {
            duration: self.config.defaults.duration,
            ease: self.config.defaults.ease,
        });
        Timeline::new().defaults(defaults.duration, defaults.ease)
    }

    /// Bind a from/to tween to a scroll observer
    ///
    /// Defaults: the target is its own trigger, enter at `top 85%`, play on
    /// enter and reverse when left backward.
    pub fn animate_on_scroll(
        &self,
        target: ElementId,
        from: TweenVars,
        to: TweenVars,
        reveal: ScrollReveal,
    ) -> Result<AnimationHandle> {
        let trigger = self.reveal_trigger(
            reveal.trigger.unwrap_or(target),
            reveal.start,
            reveal.toggle_actions,
        )?;
        let trigger = match reveal.end {
            Some(end) => trigger.end(end),
            None => trigger,
        };
        let tween = Tween::from_to(&[target], from, to)
            .duration(reveal.duration.unwrap_or(self.config.defaults.duration))
            .ease(reveal.ease.unwrap_or(self.config.defaults.ease))
            .scroll_trigger(trigger);
        self.play(tween)
    }

    /// Toggle-mode trigger using the configured reveal defaults
    pub fn reveal_trigger(
        &self,
        trigger: ElementId,
        start: Option<ScrollPosition>,
        actions: Option<ToggleActions>,
    ) -> Result<ScrollTriggerConfig> {
        let start = match start {
            Some(start) => start,
            None => self.config.scroll_reveal.start_position()?,
        };
        let actions = match actions {
            Some(actions) => actions,
            None => self.config.scroll_reveal.actions()?,
        };
        Ok(ScrollTriggerConfig::new(trigger)
            .start(start)
            .toggle_actions(actions))
    }

    /// Rise-and-fade entrance with a slight 3D tilt, one target after another
    pub fn stagger_in(&self, targets: &[ElementId], options: StaggerIn) -> Result<AnimationHandle> {
        let preset = &self.presets.stagger;
        let mut tween = preset
            .tween(targets)
            .stagger(options.each.unwrap_or(preset.stagger))
            .delay(options.delay);
        if let Some(trigger) = options.trigger {
            tween = tween.scroll_trigger(self.reveal_trigger(trigger, options.start, None)?);
        }
        self.play(tween)
    }

    /// Rotate a target 360 degrees every `duration` seconds, forever
    ///
    /// Under reduced motion the loop is registered paused.
    pub fn infinite_loop(&self, target: ElementId, duration: f32) -> Result<AnimationHandle> {
        let handle = self.engine.add(
            Tween::to(&[target], TweenVars::rotation(360.0))
                .duration(duration)
                .ease(Easing::LINEAR)
                .repeat(-1),
        )?;
        if self.config.reduced_motion {
            handle.pause();
        }
        Ok(handle)
    }

    // ========================================================================
    // Magnetic effect
    // ========================================================================

    /// Scale an element up while hovered and pull it toward the pointer
    ///
    /// Fails with [`ChoreoError::AlreadyBound`] if the element is still bound;
    /// unbind (or drop) the returned binding first.
    pub fn magnetic_effect(&self, element: ElementId) -> Result<MagneticBinding> {
        if !self.magnetic.borrow_mut().insert(element) {
            return Err(ChoreoError::AlreadyBound(element));
        }

        let surface = &self.surface;
        let magnetic = self.config.magnetic;
        let current = Rc::new(Cell::new(None::<AnimationId>));
        let target = EventTarget::Element(element);

        let enter = {
            let motion = MotionSlot::new(&self.engine, &current);
            surface.add_listener(target, EventType::PointerEnter, move |_| {
                motion.replace(
                    Tween::to(&[element], TweenVars::scale(magnetic.hover_scale))
                        .duration(0.3)
                        .ease(Easing::POWER2_OUT),
                );
            })
        };

        let pointer_move = {
            let motion = MotionSlot::new(&self.engine, &current);
            let surface_ref = surface.downgrade();
            surface.add_listener(target, EventType::PointerMove, move |event| {
                let (Some((px, py)), Some(surface)) = (event.pointer, surface_ref.upgrade()) else {
                    return;
                };
                let Some(rect) = surface.bounding_client_rect(element) else {
                    return;
                };
                let (cx, cy) = rect.center();
                motion.replace(
                    Tween::to(
                        &[element],
                        TweenVars::x((px - cx) * magnetic.strength)
                            .with_y((py - cy) * magnetic.strength)
                            .with_scale(magnetic.hover_scale),
                    )
                    .duration(0.3)
                    .ease(Easing::POWER2_OUT),
                );
            })
        };

        let leave = {
            let motion = MotionSlot::new(&self.engine, &current);
            surface.add_listener(target, EventType::PointerLeave, move |_| {
                motion.replace(
                    Tween::to(&[element], TweenVars::x(0.0).with_y(0.0).with_scale(1.0))
                        .duration(0.5)
                        .ease(Easing::ELASTIC_OUT),
                );
            })
        };

        tracing::debug!("utils: magnetic effect bound to {:?}", element);
        Ok(MagneticBinding {
            element,
            listeners: [enter, pointer_move, leave],
            surface: surface.clone(),
            engine: self.engine.clone(),
            current,
            bound: Rc::clone(&self.magnetic),
            active: true,
        })
    }

    pub fn is_magnetic(&self, element: ElementId) -> bool {
        self.magnetic.borrow().contains(&element)
    }

    // ========================================================================
    // Global
    // ========================================================================

    /// Recompute every scroll observer's range after a layout change
    pub fn refresh(&self) {
        self.engine.refresh();
    }

    /// Stop every animation and observer on the engine
    pub fn kill_all(&self) {
        self.engine.kill_all();
    }
}

/// The single in-flight tween of a magnetic element
///
/// Each pointer event kills the previous tween before starting its own, so
/// finished tweens never pile up in the engine.
struct MotionSlot {
    engine: EngineHandle,
    current: Rc<Cell<Option<AnimationId>>>,
}

impl MotionSlot {
    fn new(engine: &EngineHandle, current: &Rc<Cell<Option<AnimationId>>>) -> Self {
        Self {
            engine: engine.clone(),
            current: Rc::clone(current),
        }
    }

    fn replace(&self, tween: Tween) {
        if let Some(previous) = self.current.take() {
            self.engine.kill(previous);
        }
        match self.engine.add(tween) {
            Ok(handle) => self.current.set(Some(handle.id())),
            Err(err) => tracing::warn!("utils: magnetic tween rejected: {}", err),
        }
    }
}

// ============================================================================
// MagneticBinding
// ============================================================================

/// Owner of one magnetic effect's listeners; unbinds on drop
pub struct MagneticBinding {
    element: ElementId,
    listeners: [ListenerId; 3],
    surface: Surface,
    engine: EngineHandle,
    current: Rc<Cell<Option<AnimationId>>>,
    bound: Rc<RefCell<FxHashSet<ElementId>>>,
    active: bool,
}

impl MagneticBinding {
    pub fn element(&self) -> ElementId {
        self.element
    }

    /// Remove the three pointer listeners and stop the in-flight tween
    pub fn unbind(mut self) {
        self.release();
    }

    /// Convert into a cleanup routine for the orchestration hook
    pub fn into_cleanup(self) -> Cleanup {
        Box::new(move || self.unbind())
    }

    fn release(&mut self) {
        if !self.active {
            return;
        }
        self.active = false;
        for id in self.listeners {
            self.surface.remove_listener(id);
        }
        if let Some(tween) = self.current.take() {
            self.engine.kill(tween);
        }
        self.bound.borrow_mut().remove(&self.element);
        tracing::debug!("utils: magnetic effect unbound from {:?}", self.element);
    }
}

impl Drop for MagneticBinding {
    fn drop(&mut self) {
        self.release();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use kinetic_animation::{AnimationEngine, PlayState};
    use kinetic_core::{Event, Property, Rect, Viewport};

    fn setup() -> (Surface, AnimationEngine, AnimationUtils) {
        let surface = Surface::new(Viewport::new(1280.0, 800.0));
        let engine = AnimationEngine::new(surface.clone());
        let utils = AnimationUtils::new(
            engine.handle(),
            surface.clone(),
            Rc::new(ChoreoConfig::default()),
        );
        (surface, engine, utils)
    }

    fn texts(surface: &Surface, ids: &[ElementId]) -> Vec<String> {
        ids.iter().filter_map(|id| surface.text(*id)).collect()
    }

    #[test]
    fn test_split_text_preserves_whitespace() {
        let (surface, _engine, utils) = setup();
        let title = surface.create_element("h1", None);
        surface.set_text(title, "Hi there");

        let chars = utils.split_text(title);
        assert_eq!(chars.len(), 8);
        assert_eq!(surface.text(chars[2]).as_deref(), Some("\u{a0}"));
        assert_eq!(surface.text(title), None);
        assert_eq!(surface.children(title), chars);
    }

    #[test]
    fn test_split_words_adds_gap() {
        let (surface, _engine, utils) = setup();
        let p = surface.create_element("p", None);
        surface.set_text(p, "  We build   brands ");

        let words = utils.split_words(p);
        assert_eq!(texts(&surface, &words), ["We", "build", "brands"]);
        let gap = |id| surface.style(id).unwrap().margin_right_em;
        assert_eq!(gap(words[0]), WORD_GAP_EM);
        assert_eq!(gap(words[2]), 0.0);
    }

    #[test]
    fn test_resplit_replaces_wrappers() {
        let (surface, _engine, utils) = setup();
        let p = surface.create_element("p", None);
        surface.set_text(p, "one two");

        let first = utils.split_words(p);
        let second = utils.split_words(p);
        assert_eq!(texts(&surface, &second), ["one", "two"]);
        assert!(first.iter().all(|id| !surface.contains(*id)));
        assert_eq!(surface.children(p).len(), 2);

        let chars = utils.split_text(p);
        assert_eq!(chars.len(), 7);
    }

    #[test]
    fn test_split_unmounted_is_empty() {
        let (surface, _engine, utils) = setup();
        let p = surface.create_element("p", None);
        surface.remove_element(p).unwrap();
        assert!(utils.split_text(p).is_empty());
    }

    #[test]
    fn test_create_timeline_defaults() {
        let (surface, _engine, utils) = setup();
        let a = surface.create_element("div", None);
        let tl = utils
            .create_timeline(None)
            .add(Tween::to(&[a], TweenVars::opacity(1.0)), 0.0);
        assert!((tl.duration() - 0.8).abs() < 1e-5);

        let tl = utils
            .create_timeline(Some(TweenDefaults {
                duration: 2.0,
                ease: Easing::LINEAR,
            }))
            .add(Tween::to(&[a], TweenVars::opacity(1.0)), 0.0);
        assert!((tl.duration() - 2.0).abs() < 1e-5);
    }

    #[test]
    fn test_animate_on_scroll_defaults() {
        let (surface, engine, utils) = setup();
        let block = surface.create_element("section", None);
        surface.set_rect(block, Rect::new(0.0, 2000.0, 1280.0, 500.0));

        let handle = utils
            .animate_on_scroll(
                block,
                TweenVars::opacity(0.0).with_y(60.0),
                TweenVars::opacity(1.0).with_y(0.0),
                ScrollReveal::default(),
            )
            .unwrap();
        assert_eq!(surface.read_property(block, Property::Opacity), Some(0.0));

        // "top 85%": 2000 - 0.85 * 800
        let observer = engine.handle().observers_of(handle.id())[0];
        let (start, _) = engine.handle().observer_range(observer).unwrap();
        assert!((start - 1320.0).abs() < 1e-3);

        surface.scroll_to(1400.0);
        engine.advance(0.0);
        engine.advance(1.0);
        assert_eq!(surface.read_property(block, Property::Opacity), Some(1.0));

        // Leaving backward reverses
        surface.scroll_to(0.0);
        engine.advance(0.0);
        engine.advance(1.0);
        assert_eq!(surface.read_property(block, Property::Opacity), Some(0.0));
    }

    #[test]
    fn test_stagger_in_on_scroll_starts_hidden() {
        let (surface, engine, utils) = setup();
        let list = surface.create_element("ul", None);
        surface.set_rect(list, Rect::new(0.0, 1200.0, 1280.0, 400.0));
        let items: Vec<_> = (0..3).map(|_| surface.create_element("li", Some(list))).collect();

        let handle = utils
            .stagger_in(
                &items,
                StaggerIn {
                    trigger: Some(list),
                    ..Default::default()
                },
            )
            .unwrap();
        assert_eq!(handle.status().unwrap().state, PlayState::Paused);
        for item in &items {
            assert_eq!(surface.read_property(*item, Property::Opacity), Some(0.0));
            assert_eq!(surface.read_property(*item, Property::RotationX), Some(-15.0));
        }
        assert!(engine.handle().has_observer_for(list));
    }

    #[test]
    fn test_infinite_loop_never_finishes() {
        let (surface, engine, utils) = setup();
        let badge = surface.create_element("div", None);
        let handle = utils.infinite_loop(badge, 4.0).unwrap();
        engine.advance(5.0);
        let rotation = surface.read_property(badge, Property::Rotation).unwrap();
        assert!((rotation - 90.0).abs() < 1e-2);
        assert_eq!(handle.status().unwrap().state, PlayState::Playing);
    }

    #[test]
    fn test_reduced_motion_jumps_to_end() {
        let surface = Surface::new(Viewport::new(1280.0, 800.0));
        let engine = AnimationEngine::new(surface.clone());
        let config = ChoreoConfig {
            reduced_motion: true,
            ..Default::default()
        };
        let utils = AnimationUtils::new(engine.handle(), surface.clone(), Rc::new(config));
        let a = surface.create_element("div", None);
        utils
            .play(Tween::from(&[a], TweenVars::opacity(0.0)).duration(3.0))
            .unwrap();
        assert_eq!(surface.read_property(a, Property::Opacity), Some(1.0));
    }

    #[test]
    fn test_magnetic_follow_and_release() {
        let (surface, engine, utils) = setup();
        let button = surface.create_element("button", None);
        surface.set_rect(button, Rect::new(100.0, 100.0, 200.0, 100.0));

        let binding = utils.magnetic_effect(button).unwrap();
        let target = EventTarget::Element(button);
        assert_eq!(surface.listener_count(target), 3);

        surface.dispatch(target, Event::pointer_enter(200.0, 150.0));
        engine.advance(0.5);
        assert!((surface.read_property(button, Property::Scale).unwrap() - 1.1).abs() < 1e-4);

        // 100px right of center, 30% strength
        surface.dispatch(target, Event::pointer_move(300.0, 150.0));
        engine.advance(0.5);
        assert!((surface.read_property(button, Property::X).unwrap() - 30.0).abs() < 1e-3);
        assert_eq!(engine.animation_count(), 1);

        surface.dispatch(target, Event::pointer_leave(400.0, 150.0));
        engine.advance(1.0);
        assert!(surface.read_property(button, Property::X).unwrap().abs() < 1e-3);

        binding.unbind();
        assert_eq!(surface.listener_count(target), 0);
        assert_eq!(engine.animation_count(), 0);
        assert!(!utils.is_magnetic(button));
    }

    #[test]
    fn test_magnetic_double_bind_rejected() {
        let (surface, _engine, utils) = setup();
        let button = surface.create_element("button", None);
        let binding = utils.magnetic_effect(button).unwrap();
        assert_eq!(
            utils.magnetic_effect(button).err(),
            Some(ChoreoError::AlreadyBound(button))
        );
        assert_eq!(surface.listener_count(EventTarget::Element(button)), 3);

        drop(binding);
        let rebound = utils.magnetic_effect(button);
        assert!(rebound.is_ok());
    }
}
