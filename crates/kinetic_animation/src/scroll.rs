//! Scroll observers
//!
//! A [`ScrollObserver`] maps the page scroll offset onto an animation. Its
//! active range is computed from a trigger element's layout box and two
//! [`ScrollPosition`]s such as `"top 80%"` (the trigger's top edge meets the
//! viewport at 80% of its height).
//!
//! Two behaviours are supported:
//!
//! - [`ScrollMode::Toggle`]: discrete [`ToggleActions`] applied when the scroll
//!   position crosses the start or end of the range
//! - [`ScrollMode::Scrub`]: animation progress follows scroll progress, with
//!   optional lag smoothing
//!
//! Geometry is only read in [`ScrollObserver::refresh`]; everything else is a
//! pure function of the scroll offset.

use std::fmt;
use std::rc::Rc;
use std::str::FromStr;

use kinetic_core::{ElementId, ListenerId, Surface};
use smallvec::{smallvec, SmallVec};

use crate::error::AnimationError;
use crate::tween::{Callback, ProgressCallback};

// ============================================================================
// Positions
// ============================================================================

/// A point on the trigger element or the viewport
#[derive(Clone, Copy, Debug, PartialEq)]
pub enum Anchor {
    Top,
    Center,
    Bottom,
    /// Percentage of the box height from its top
    Percent(f32),
    /// Pixels from the top of the box
    Pixels(f32),
}

impl Anchor {
    /// Offset from the top of a box of the given height
    pub fn resolve(&self, size: f32) -> f32 {
        match self {
            Anchor::Top => 0.0,
            Anchor::Center => size / 2.0,
            Anchor::Bottom => size,
            Anchor::Percent(p) => size * p / 100.0,
            Anchor::Pixels(px) => *px,
        }
    }
}

impl FromStr for Anchor {
    type Err = ();

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "top" => Ok(Anchor::Top),
            "center" => Ok(Anchor::Center),
            "bottom" => Ok(Anchor::Bottom),
            _ => {
                if let Some(p) = s.strip_suffix('%') {
                    p.parse().map(Anchor::Percent).map_err(|_| ())
                } else {
                    s.strip_suffix("px")
                        .unwrap_or(s)
                        .parse()
                        .map(Anchor::Pixels)
                        .map_err(|_| ())
                }
            }
        }
    }
}

impl fmt::Display for Anchor {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Anchor::Top => write!(f, "top"),
            Anchor::Center => write!(f, "center"),
            Anchor::Bottom => write!(f, "bottom"),
            Anchor::Percent(p) => write!(f, "{}%", p),
            Anchor::Pixels(px) => write!(f, "{}px", px),
        }
    }
}

/// Start or end of an observer's active range
#[derive(Clone, Copy, Debug, PartialEq)]
pub enum ScrollPosition {
    /// `"<element> <viewport>"`, e.g. `"top 80%"`
    Edge { element: Anchor, viewport: Anchor },
    /// `"+=<px>"`: distance past the start (only meaningful for the end)
    Relative(f32),
}

impl ScrollPosition {
    pub fn edge(element: Anchor, viewport: Anchor) -> Self {
        ScrollPosition::Edge { element, viewport }
    }

    /// `"top bottom"`: the trigger's top meets the viewport bottom
    pub fn default_start() -> Self {
        Self::edge(Anchor::Top, Anchor::Bottom)
    }

    /// `"bottom top"`: the trigger's bottom leaves the viewport top
    pub fn default_end() -> Self {
        Self::edge(Anchor::Bottom, Anchor::Top)
    }
}

impl FromStr for ScrollPosition {
    type Err = AnimationError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let raw = s.trim();
        let invalid = || AnimationError::InvalidScrollPosition(raw.to_string());

        if let Some(distance) = raw.strip_prefix("+=") {
            return distance
                .trim()
                .strip_suffix("px")
                .unwrap_or(distance.trim())
                .parse()
                .map(ScrollPosition::Relative)
                .map_err(|_| invalid());
        }

        let mut words = raw.split_whitespace();
        let element = words.next().ok_or_else(invalid)?;
        let viewport = words.next().unwrap_or("top");
        if words.next().is_some() {
            return Err(invalid());
        }
        Ok(ScrollPosition::Edge {
            element: element.parse().map_err(|_| invalid())?,
            viewport: viewport.parse().map_err(|_| invalid())?,
        })
    }
}

impl fmt::Display for ScrollPosition {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ScrollPosition::Edge { element, viewport } => write!(f, "{} {}", element, viewport),
            ScrollPosition::Relative(px) => write!(f, "+={}", px),
        }
    }
}

// ============================================================================
// Toggle Actions
// ============================================================================

/// What to do with the animation when a boundary is crossed
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum ToggleAction {
    Play,
    Pause,
    Resume,
    Reverse,
    Restart,
    Reset,
    Complete,
    None,
}

impl FromStr for ToggleAction {
    type Err = ();

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Ok(match s {
            "play" => ToggleAction::Play,
            "pause" => ToggleAction::Pause,
            "resume" => ToggleAction::Resume,
            "reverse" => ToggleAction::Reverse,
            "restart" => ToggleAction::Restart,
            "reset" => ToggleAction::Reset,
            "complete" => ToggleAction::Complete,
            "none" => ToggleAction::None,
            _ => return Err(()),
        })
    }
}

impl ToggleAction {
    fn name(&self) -> &'static str {
        match self {
            ToggleAction::Play => "play",
            ToggleAction::Pause => "pause",
            ToggleAction::Resume => "resume",
            ToggleAction::Reverse => "reverse",
            ToggleAction::Restart => "restart",
            ToggleAction::Reset => "reset",
            ToggleAction::Complete => "complete",
            ToggleAction::None => "none",
        }
    }
}

/// Actions for enter, leave, enter-back, and leave-back, in that order
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct ToggleActions {
    pub on_enter: ToggleAction,
    pub on_leave: ToggleAction,
    pub on_enter_back: ToggleAction,
    pub on_leave_back: ToggleAction,
}

impl Default for ToggleActions {
    /// `"play none none none"`
    fn default() -> Self {
        Self {
            on_enter: ToggleAction::Play,
            on_leave: ToggleAction::None,
            on_enter_back: ToggleAction::None,
            on_leave_back: ToggleAction::None,
        }
    }
}

impl ToggleActions {
    /// `"play none none reverse"`: replay on enter, rewind when scrolled back above
    pub fn play_reverse() -> Self {
        Self {
            on_leave_back: ToggleAction::Reverse,
            ..Self::default()
        }
    }

    pub fn action_for(&self, crossing: Crossing) -> ToggleAction {
        match crossing {
            Crossing::Enter => self.on_enter,
            Crossing::Leave => self.on_leave,
            Crossing::EnterBack => self.on_enter_back,
            Crossing::LeaveBack => self.on_leave_back,
        }
    }
}

impl FromStr for ToggleActions {
    type Err = AnimationError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let invalid = || AnimationError::InvalidToggleActions(s.trim().to_string());
        let actions = s
            .split_whitespace()
            .map(|w| w.parse::<ToggleAction>().map_err(|_| invalid()))
            .collect::<Result<Vec<_>, _>>()?;
        match actions.as_slice() {
            [on_enter, on_leave, on_enter_back, on_leave_back] => Ok(Self {
                on_enter: *on_enter,
                on_leave: *on_leave,
                on_enter_back: *on_enter_back,
                on_leave_back: *on_leave_back,
            }),
            _ => Err(invalid()),
        }
    }
}

impl fmt::Display for ToggleActions {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{} {} {} {}",
            self.on_enter.name(),
            self.on_leave.name(),
            self.on_enter_back.name(),
            self.on_leave_back.name()
        )
    }
}

/// How the observer drives its animation
#[derive(Clone, Copy, Debug, PartialEq)]
pub enum ScrollMode {
    Toggle(ToggleActions),
    /// Progress follows scroll; `Some(lag)` smooths over `lag` seconds
    Scrub(Option<f32>),
}

impl Default for ScrollMode {
    fn default() -> Self {
        ScrollMode::Toggle(ToggleActions::default())
    }
}

// ============================================================================
// Config
// ============================================================================

#[derive(Clone, Default)]
pub(crate) struct ObserverCallbacks {
    pub on_enter: Option<Callback>,
    pub on_leave: Option<Callback>,
    pub on_enter_back: Option<Callback>,
    pub on_leave_back: Option<Callback>,
    pub on_update: Option<ProgressCallback>,
}

/// Scroll observer parameters
#[derive(Clone)]
pub struct ScrollTriggerConfig {
    /// Trigger element; defaults to the animation's first target
    pub trigger: Option<ElementId>,
    pub start: ScrollPosition,
    pub end: ScrollPosition,
    pub mode: ScrollMode,
    /// Stop observing after the first enter
    pub once: bool,
    pub(crate) callbacks: ObserverCallbacks,
}

impl Default for ScrollTriggerConfig {
    fn default() -> Self {
        Self {
            trigger: None,
            start: ScrollPosition::default_start(),
            end: ScrollPosition::default_end(),
            mode: ScrollMode::default(),
            once: false,
            callbacks: ObserverCallbacks::default(),
        }
    }
}

impl fmt::Debug for ScrollTriggerConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ScrollTriggerConfig")
            .field("trigger", &self.trigger)
            .field("start", &self.start)
            .field("end", &self.end)
            .field("mode", &self.mode)
            .field("once", &self.once)
            .finish_non_exhaustive()
    }
}

impl ScrollTriggerConfig {
    pub fn new(trigger: ElementId) -> Self {
        Self {
            trigger: Some(trigger),
            ..Self::default()
        }
    }

    pub fn start(mut self, position: ScrollPosition) -> Self {
        self.start = position;
        self
    }

    pub fn end(mut self, position: ScrollPosition) -> Self {
        self.end = position;
        self
    }

    pub fn toggle_actions(mut self, actions: ToggleActions) -> Self {
        self.mode = ScrollMode::Toggle(actions);
        self
    }

    /// Bind progress to scroll; `lag` seconds of smoothing when `Some`
    pub fn scrub(mut self, lag: Option<f32>) -> Self {
        self.mode = ScrollMode::Scrub(lag.filter(|l| *l > 0.0));
        self
    }

    pub fn once(mut self, once: bool) -> Self {
        self.once = once;
        self
    }

    pub fn on_enter<F: Fn() + 'static>(mut self, f: F) -> Self {
        self.callbacks.on_enter = Some(Rc::new(f));
        self
    }

    pub fn on_leave<F: Fn() + 'static>(mut self, f: F) -> Self {
        self.callbacks.on_leave = Some(Rc::new(f));
        self
    }

    pub fn on_enter_back<F: Fn() + 'static>(mut self, f: F) -> Self {
        self.callbacks.on_enter_back = Some(Rc::new(f));
        self
    }

    pub fn on_leave_back<F: Fn() + 'static>(mut self, f: F) -> Self {
        self.callbacks.on_leave_back = Some(Rc::new(f));
        self
    }

    /// Called with scroll progress whenever it changes
    pub fn on_update<F: Fn(f32) + 'static>(mut self, f: F) -> Self {
        self.callbacks.on_update = Some(Rc::new(f));
        self
    }
}

// ============================================================================
// Observer
// ============================================================================

/// Where the scroll offset sits relative to the active range
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Region {
    Before,
    Active,
    After,
}

/// A boundary crossing reported by [`ScrollObserver::update`]
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Crossing {
    Enter,
    Leave,
    EnterBack,
    LeaveBack,
}

/// Live scroll observer state
pub struct ScrollObserver {
    config: ScrollTriggerConfig,
    trigger: ElementId,
    start: f32,
    end: f32,
    region: Region,
    last_progress: Option<f32>,
    pub(crate) resize_listener: Option<ListenerId>,
}

impl ScrollObserver {
    pub fn new(trigger: ElementId, config: ScrollTriggerConfig) -> Self {
        Self {
            config,
            trigger,
            start: 0.0,
            end: 0.0,
            region: Region::Before,
            last_progress: None,
            resize_listener: None,
        }
    }

    pub fn trigger(&self) -> ElementId {
        self.trigger
    }

    pub fn config(&self) -> &ScrollTriggerConfig {
        &self.config
    }

    pub fn mode(&self) -> ScrollMode {
        self.config.mode
    }

    /// Resolved `(start, end)` scroll offsets
    pub fn range(&self) -> (f32, f32) {
        (self.start, self.end)
    }

    pub fn region(&self) -> Region {
        self.region
    }

    /// Recompute the active range from layout; false if the trigger is gone
    pub fn refresh(&mut self, surface: &Surface) -> bool {
        let Some(rect) = surface.rect(self.trigger) else {
            return false;
        };
        let viewport = surface.viewport().height;
        let edge = |position: &ScrollPosition, from: f32| match position {
            ScrollPosition::Edge { element, viewport: anchor } => {
                rect.y + element.resolve(rect.height) - anchor.resolve(viewport)
            }
            ScrollPosition::Relative(distance) => from + distance,
        };

        self.start = edge(&self.config.start, rect.y);
        self.end = edge(&self.config.end, self.start).max(self.start);
        tracing::trace!(
            "scroll observer: range {:.1}..{:.1} for {:?}",
            self.start,
            self.end,
            self.trigger
        );
        true
    }

    /// Scroll progress through the active range, clamped to 0..1
    pub fn progress_at(&self, scroll: f32) -> f32 {
        if self.end > self.start {
            ((scroll - self.start) / (self.end - self.start)).clamp(0.0, 1.0)
        } else if scroll >= self.start {
            1.0
        } else {
            0.0
        }
    }

    pub fn region_at(&self, scroll: f32) -> Region {
        if scroll < self.start {
            Region::Before
        } else if scroll > self.end {
            Region::After
        } else {
            Region::Active
        }
    }

    /// Move to `scroll`, returning boundary crossings in the order they happened
    pub fn update(&mut self, scroll: f32) -> SmallVec<[Crossing; 2]> {
        let next = self.region_at(scroll);
        let crossings = match (self.region, next) {
            (Region::Before, Region::Active) => smallvec![Crossing::Enter],
            (Region::Before, Region::After) => smallvec![Crossing::Enter, Crossing::Leave],
            (Region::Active, Region::After) => smallvec![Crossing::Leave],
            (Region::After, Region::Active) => smallvec![Crossing::EnterBack],
            (Region::After, Region::Before) => {
                smallvec![Crossing::EnterBack, Crossing::LeaveBack]
            }
            (Region::Active, Region::Before) => smallvec![Crossing::LeaveBack],
            _ => SmallVec::new(),
        };
        self.region = next;
        crossings
    }

    /// Returns the progress if it changed since the last call
    pub(crate) fn take_progress_change(&mut self, scroll: f32) -> Option<f32> {
        let progress = self.progress_at(scroll);
        if self.last_progress == Some(progress) {
            return None;
        }
        self.last_progress = Some(progress);
        Some(progress)
    }

    pub(crate) fn callback_for(&self, crossing: Crossing) -> Option<Callback> {
        let callbacks = &self.config.callbacks;
        match crossing {
            Crossing::Enter => callbacks.on_enter.clone(),
            Crossing::Leave => callbacks.on_leave.clone(),
            Crossing::EnterBack => callbacks.on_enter_back.clone(),
            Crossing::LeaveBack => callbacks.on_leave_back.clone(),
        }
    }

    pub(crate) fn update_callback(&self) -> Option<ProgressCallback> {
        self.config.callbacks.on_update.clone()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use kinetic_core::{Rect, Viewport};

    fn observer(start: &str, end: &str) -> (Surface, ScrollObserver) {
        let surface = Surface::new(Viewport::new(1280.0, 800.0));
        let section = surface.create_element("section", None);
        surface.set_rect(section, Rect::new(0.0, 1000.0, 1280.0, 600.0));
        let config = ScrollTriggerConfig::new(section)
            .start(start.parse().unwrap())
            .end(end.parse().unwrap());
        let mut observer = ScrollObserver::new(section, config);
        assert!(observer.refresh(&surface));
        (surface, observer)
    }

    #[test]
    fn test_parse_positions() {
        assert_eq!(
            "top 80%".parse::<ScrollPosition>(),
            Ok(ScrollPosition::edge(Anchor::Top, Anchor::Percent(80.0)))
        );
        assert_eq!(
            "center center".parse::<ScrollPosition>(),
            Ok(ScrollPosition::edge(Anchor::Center, Anchor::Center))
        );
        assert_eq!("+=300".parse::<ScrollPosition>(), Ok(ScrollPosition::Relative(300.0)));
        assert!("top 80% extra".parse::<ScrollPosition>().is_err());
        assert!("middle".parse::<ScrollPosition>().is_err());
    }

    #[test]
    fn test_parse_toggle_actions() {
        let actions: ToggleActions = "play none none reverse".parse().unwrap();
        assert_eq!(actions, ToggleActions::play_reverse());
        assert_eq!(actions.to_string(), "play none none reverse");
        assert!("play none".parse::<ToggleActions>().is_err());
        assert!("play none none rewind".parse::<ToggleActions>().is_err());
    }

    #[test]
    fn test_range_from_geometry() {
        let (_, observer) = observer("top 80%", "bottom 20%");
        // 1000 - 640 and 1600 - 160
        assert_eq!(observer.range(), (360.0, 1440.0));

        let (_, observer) = observer_relative();
        assert_eq!(observer.range(), (1000.0, 1300.0));
    }

    fn observer_relative() -> (Surface, ScrollObserver) {
        observer("top top", "+=300")
    }

    #[test]
    fn test_progress_is_pure() {
        let (_, mut observer) = observer("top bottom", "bottom top");
        let first = observer.progress_at(900.0);
        observer.update(1500.0);
        observer.update(100.0);
        assert_eq!(observer.progress_at(900.0), first);
        assert_eq!(observer.progress_at(-50.0), 0.0);
        assert_eq!(observer.progress_at(99_999.0), 1.0);
    }

    #[test]
    fn test_crossings() {
        let (_, mut observer) = observer("top 80%", "bottom 20%");
        assert!(observer.update(0.0).is_empty());
        assert_eq!(observer.update(400.0).as_slice(), &[Crossing::Enter]);
        assert_eq!(observer.update(2000.0).as_slice(), &[Crossing::Leave]);
        assert_eq!(observer.update(1000.0).as_slice(), &[Crossing::EnterBack]);
        assert_eq!(observer.update(0.0).as_slice(), &[Crossing::LeaveBack]);
        assert_eq!(
            observer.update(5000.0).as_slice(),
            &[Crossing::Enter, Crossing::Leave]
        );
    }

    #[test]
    fn test_refresh_follows_layout() {
        let (surface, mut observer) = observer("top 80%", "bottom 20%");
        surface.set_rect(observer.trigger(), Rect::new(0.0, 2000.0, 1280.0, 600.0));
        observer.refresh(&surface);
        assert_eq!(observer.range().0, 1360.0);

        surface.remove_element(observer.trigger()).unwrap();
        assert!(!observer.refresh(&surface));
    }
}
