//! Timeline sequencing
//!
//! A [`Timeline`] places tweens, nested timelines, and callbacks on its own
//! clock. Child start times are resolved once, when the child is added, from
//! a [`Position`]:
//!
//! | position            | string    | meaning                                   |
//! |---------------------|-----------|-------------------------------------------|
//! | `Position::End`     | (none)    | at the current end of the timeline        |
//! | `At(t)`             | `"1.5"`   | absolute time                             |
//! | `AfterEnd(d)`       | `"+=0.3"` | `d` seconds after the end (a gap)         |
//! | `BeforeEnd(d)`      | `"-=0.3"` | `d` seconds before the end (an overlap)   |
//! | `WithPrevious(d)`   | `"<0.2"`  | `d` after the previous child's start      |
//! | `AfterPrevious(d)`  | `">0.2"`  | `d` after the previous child's end        |
//! | `Label(name, d)`    | `"intro+=0.2"` | relative to a label                  |
//!
//! Because every child is rendered from the timeline's local time, pausing,
//! reversing, or seeking the timeline moves all of its children coherently.
//!
//! ```rust
//! use kinetic_animation::{Position, Timeline, Tween, TweenVars};
//! use kinetic_core::{Surface, Viewport};
//!
//! let surface = Surface::new(Viewport::new(1280.0, 800.0));
//! let overlay = surface.create_element("div", None);
//! let card = surface.create_element("div", None);
//!
//! let timeline = Timeline::new()
//!     .add(Tween::to(&[overlay], TweenVars::opacity(0.0)).duration(0.8), Position::End)
//!     .add(Tween::from(&[card], TweenVars::y(100.0)).duration(1.0), Position::BeforeEnd(0.3));
//! assert_eq!(timeline.total_duration(), 1.5);
//! ```

use std::fmt;
use std::rc::Rc;
use std::str::FromStr;

use indexmap::IndexMap;
use kinetic_core::{ElementId, Surface};

use crate::easing::Easing;
use crate::error::AnimationError;
use crate::scroll::ScrollTriggerConfig;
use crate::tween::{Callback, Deferred, ProgressCallback, Tween, TweenDefaults};

/// Sentinel "before the first frame" local time
const BEFORE_START: f32 = -1e-4;

// ============================================================================
// Position
// ============================================================================

/// Where a child is placed on its parent timeline
#[derive(Clone, Debug, Default, PartialEq)]
pub enum Position {
    #[default]
    End,
    At(f32),
    AfterEnd(f32),
    BeforeEnd(f32),
    WithPrevious(f32),
    AfterPrevious(f32),
    Label(String, f32),
}

impl From<f32> for Position {
    fn from(time: f32) -> Self {
        Position::At(time)
    }
}

impl FromStr for Position {
    type Err = AnimationError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let raw = s.trim();
        let invalid = || AnimationError::InvalidPosition(raw.to_string());
        let number = |n: &str| -> Result<f32, AnimationError> {
            if n.is_empty() {
                Ok(0.0)
            } else {
                n.trim().parse().map_err(|_| invalid())
            }
        };

        if raw.is_empty() {
            return Ok(Position::End);
        }
        if let Some(rest) = raw.strip_prefix("+=") {
            return Ok(Position::AfterEnd(number(rest)?));
        }
        if let Some(rest) = raw.strip_prefix("-=") {
            return Ok(Position::BeforeEnd(number(rest)?));
        }
        if let Some(rest) = raw.strip_prefix('<') {
            return Ok(Position::WithPrevious(number(rest)?));
        }
        if let Some(rest) = raw.strip_prefix('>') {
            return Ok(Position::AfterPrevious(number(rest)?));
        }
        if let Ok(time) = raw.parse::<f32>() {
            return Ok(Position::At(time));
        }

        let (name, offset) = if let Some(i) = raw.find("+=") {
            (&raw[..i], number(&raw[i + 2..])?)
        } else if let Some(i) = raw.find("-=") {
            (&raw[..i], -number(&raw[i + 2..])?)
        } else {
            (raw, 0.0)
        };
        if name.is_empty() || !name.chars().all(|c| c.is_alphanumeric() || c == '_' || c == '-')
        {
            return Err(invalid());
        }
        Ok(Position::Label(name.to_string(), offset))
    }
}

impl fmt::Display for Position {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Position::End => Ok(()),
            Position::At(t) => write!(f, "{}", t),
            Position::AfterEnd(d) => write!(f, "+={}", d),
            Position::BeforeEnd(d) => write!(f, "-={}", d),
            Position::WithPrevious(d) => write!(f, "<{}", d),
            Position::AfterPrevious(d) => write!(f, ">{}", d),
            Position::Label(name, d) if *d < 0.0 => write!(f, "{}-={}", name, -d),
            Position::Label(name, d) => write!(f, "{}+={}", name, d),
        }
    }
}

// ============================================================================
// Animation
// ============================================================================

/// Anything the engine can play
#[derive(Clone)]
pub enum Animation {
    Tween(Tween),
    Timeline(Timeline),
}

impl From<Tween> for Animation {
    fn from(tween: Tween) -> Self {
        Animation::Tween(tween)
    }
}

impl From<Timeline> for Animation {
    fn from(timeline: Timeline) -> Self {
        Animation::Timeline(timeline)
    }
}

impl Animation {
    pub fn total_duration(&self) -> f32 {
        match self {
            Animation::Tween(t) => t.total_duration(),
            Animation::Timeline(t) => t.total_duration(),
        }
    }

    pub fn delay(&self) -> f32 {
        match self {
            Animation::Tween(t) => t.get_delay(),
            Animation::Timeline(t) => t.delay,
        }
    }

    /// Targets of every tween, in order of first appearance
    pub fn targets(&self) -> Vec<ElementId> {
        let mut targets = Vec::new();
        self.collect_targets(&mut targets);
        targets
    }

    fn collect_targets(&self, out: &mut Vec<ElementId>) {
        match self {
            Animation::Tween(t) => {
                for target in t.targets() {
                    if !out.contains(target) {
                        out.push(*target);
                    }
                }
            }
            Animation::Timeline(t) => {
                for child in &t.children {
                    if let ChildKind::Animation(animation) = &child.kind {
                        animation.collect_targets(out);
                    }
                }
            }
        }
    }

    pub fn affects(&self, target: ElementId) -> bool {
        match self {
            Animation::Tween(t) => t.affects(target),
            Animation::Timeline(t) => t.children.iter().any(|c| match &c.kind {
                ChildKind::Animation(a) => a.affects(target),
                ChildKind::Call(_) => false,
            }),
        }
    }

    pub(crate) fn take_scroll_trigger(&mut self) -> Option<ScrollTriggerConfig> {
        match self {
            Animation::Tween(t) => t.take_scroll_trigger(),
            Animation::Timeline(t) => t.scroll_trigger.take(),
        }
    }

    pub(crate) fn is_initialized(&self) -> bool {
        match self {
            Animation::Tween(t) => t.is_initialized(),
            Animation::Timeline(t) => t.last_time.is_some(),
        }
    }

    pub(crate) fn render_immediate(&mut self, surface: &Surface) {
        match self {
            Animation::Tween(t) => t.render_immediate(surface),
            Animation::Timeline(t) => {
                for child in t.children.iter_mut() {
                    if let ChildKind::Animation(animation) = &mut child.kind {
                        animation.render_immediate(surface);
                    }
                }
            }
        }
    }

    pub(crate) fn render(
        &mut self,
        time: f32,
        surface: &Surface,
        deferred: &mut Vec<Deferred>,
        suppress_events: bool,
    ) {
        match self {
            Animation::Tween(t) => t.render(time, surface, deferred, suppress_events),
            Animation::Timeline(t) => t.render(time, surface, deferred, suppress_events),
        }
    }

    /// Returns true when nothing is left to play
    pub(crate) fn remove_target(&mut self, target: ElementId) -> bool {
        match self {
            Animation::Tween(t) => t.remove_target(target),
            Animation::Timeline(t) => t.remove_target(target),
        }
    }
}

// ============================================================================
// Timeline
// ============================================================================

#[derive(Clone)]
enum ChildKind {
    Animation(Animation),
    Call(Callback),
}

#[derive(Clone)]
struct Child {
    start: f32,
    kind: ChildKind,
}

impl Child {
    fn end(&self) -> f32 {
        match &self.kind {
            ChildKind::Animation(a) => self.start + a.total_duration(),
            ChildKind::Call(_) => self.start,
        }
    }
}

#[derive(Clone, Default)]
struct TimelineCallbacks {
    on_start: Option<Callback>,
    on_update: Option<ProgressCallback>,
    on_complete: Option<Callback>,
    on_reverse_complete: Option<Callback>,
}

/// An ordered, nestable composition of animations and callbacks
#[derive(Clone, Default)]
pub struct Timeline {
    children: Vec<Child>,
    labels: IndexMap<String, f32>,
    defaults: TweenDefaults,
    repeat: i32,
    yoyo: bool,
    delay: f32,
    callbacks: TimelineCallbacks,
    scroll_trigger: Option<ScrollTriggerConfig>,
    previous: Option<(f32, f32)>,
    last_time: Option<f32>,
    last_iteration: i32,
    last_local: f32,
}

impl Timeline {
    pub fn new() -> Self {
        Self::default()
    }

    // =========================================================================
    // Configuration
    // =========================================================================

    /// Duration and ease applied to child tweens that leave them unset
    pub fn defaults(mut self, duration: f32, ease: Easing) -> Self {
        self.defaults = TweenDefaults { duration, ease };
        self
    }

    pub fn repeat(mut self, count: i32) -> Self {
        self.repeat = count.max(-1);
        self
    }

    pub fn yoyo(mut self, yoyo: bool) -> Self {
        self.yoyo = yoyo;
        self
    }

    pub fn delay(mut self, seconds: f32) -> Self {
        self.delay = seconds.max(0.0);
        self
    }

    pub fn on_start<F: Fn() + 'static>(mut self, f: F) -> Self {
        self.callbacks.on_start = Some(Rc::new(f));
        self
    }

    pub fn on_update<F: Fn(f32) + 'static>(mut self, f: F) -> Self {
        self.callbacks.on_update = Some(Rc::new(f));
        self
    }

    pub fn on_complete<F: Fn() + 'static>(mut self, f: F) -> Self {
        self.callbacks.on_complete = Some(Rc::new(f));
        self
    }

    pub fn on_reverse_complete<F: Fn() + 'static>(mut self, f: F) -> Self {
        self.callbacks.on_reverse_complete = Some(Rc::new(f));
        self
    }

    pub fn scroll_trigger(mut self, config: ScrollTriggerConfig) -> Self {
        self.scroll_trigger = Some(config);
        self
    }

    // =========================================================================
    // Children
    // =========================================================================

    fn resolve(&self, position: &Position) -> f32 {
        let end = self.duration();
        let (prev_start, prev_end) = self.previous.unwrap_or((0.0, 0.0));
        let time = match position {
            Position::End => end,
            Position::At(t) => *t,
            Position::AfterEnd(d) => end + d,
            Position::BeforeEnd(d) => end - d,
            Position::WithPrevious(d) => prev_start + d,
            Position::AfterPrevious(d) => prev_end + d,
            Position::Label(name, d) => match self.labels.get(name) {
                Some(label) => label + d,
                // Unknown labels land at the end, like a fresh label would
                None => end + d,
            },
        };
        time.max(0.0)
    }

    fn insert(&mut self, child: Child) {
        let end = child.end();
        self.previous = Some((child.start, end));
        let index = self.children.partition_point(|c| c.start <= child.start);
        self.children.insert(index, child);
    }

    /// Add a tween or nested timeline
    pub fn add(mut self, animation: impl Into<Animation>, position: impl Into<Position>) -> Self {
        let mut animation = animation.into();
        if let Animation::Tween(tween) = &mut animation {
            tween.apply_defaults(&self.defaults);
        }
        let start = self.resolve(&position.into()) + animation.delay();
        self.insert(Child {
            start,
            kind: ChildKind::Animation(animation),
        });
        self
    }

    /// Invoke `f` whenever the playhead crosses this point
    pub fn call<F: Fn() + 'static>(mut self, f: F, position: impl Into<Position>) -> Self {
        let start = self.resolve(&position.into());
        self.insert(Child {
            start,
            kind: ChildKind::Call(Rc::new(f)),
        });
        self
    }

    pub fn add_label(mut self, name: &str, position: impl Into<Position>) -> Self {
        let time = self.resolve(&position.into());
        self.labels.insert(name.to_string(), time);
        self
    }

    pub fn label(&self, name: &str) -> Option<f32> {
        self.labels.get(name).copied()
    }

    pub fn labels(&self) -> impl Iterator<Item = (&str, f32)> {
        self.labels.iter().map(|(k, v)| (k.as_str(), *v))
    }

    pub fn child_count(&self) -> usize {
        self.children.len()
    }

    /// Start times of animation children, in start order
    pub fn start_times(&self) -> Vec<f32> {
        self.children
            .iter()
            .filter(|c| matches!(c.kind, ChildKind::Animation(_)))
            .map(|c| c.start)
            .collect()
    }

    // =========================================================================
    // Timing
    // =========================================================================

    /// Length of one iteration (end of the last child)
    pub fn duration(&self) -> f32 {
        self.children.iter().map(Child::end).fold(0.0, f32::max)
    }

    pub fn total_duration(&self) -> f32 {
        let iteration = self.duration();
        if self.repeat < 0 {
            if iteration > 0.0 {
                f32::INFINITY
            } else {
                0.0
            }
        } else {
            iteration * (self.repeat + 1) as f32
        }
    }

    fn iteration_at(&self, time: f32) -> (i32, f32) {
        let iteration = self.duration();
        if iteration <= 0.0 || !iteration.is_finite() {
            return (0, time);
        }
        if self.repeat >= 0 && time >= self.total_duration() {
            return (self.repeat, iteration);
        }
        let k = (time / iteration).floor().max(0.0);
        (k as i32, time - k * iteration)
    }

    fn mirrored(&self, iteration: i32, local: f32) -> f32 {
        if self.yoyo && iteration % 2 == 1 {
            self.duration() - local
        } else {
            local
        }
    }

    /// Queue call children crossed while moving from `from` to `to`
    fn fire_calls(&self, from: f32, to: f32, deferred: &mut Vec<Deferred>) {
        let crossed = |start: f32| {
            if to > from {
                start > from && start <= to
            } else {
                start >= to && start < from
            }
        };
        let calls = self.children.iter().filter_map(|c| match &c.kind {
            ChildKind::Call(cb) if crossed(c.start) => Some(Rc::clone(cb)),
            _ => None,
        });
        let mut calls: Vec<Callback> = calls.collect();
        if to < from {
            calls.reverse();
        }
        for cb in calls {
            deferred.push(Box::new(move || cb()));
        }
    }

    pub(crate) fn render(
        &mut self,
        time: f32,
        surface: &Surface,
        deferred: &mut Vec<Deferred>,
        suppress_events: bool,
    ) {
        let total = self.total_duration();
        let iteration_length = self.duration();
        let previous_time = self.last_time.unwrap_or(BEFORE_START);
        let time = if time < 0.0 { time } else { time.min(total) };
        let forward = time >= previous_time;

        let (iteration, raw_local) = if time < 0.0 {
            (0, time)
        } else {
            self.iteration_at(time)
        };
        let local = if time < 0.0 {
            time
        } else {
            self.mirrored(iteration, raw_local)
        };

        // Children in start order going forward, reverse order going back
        let order: Vec<usize> = if forward {
            (0..self.children.len()).collect()
        } else {
            (0..self.children.len()).rev().collect()
        };
        for index in order {
            let child = &mut self.children[index];
            if let ChildKind::Animation(animation) = &mut child.kind {
                let child_time = local - child.start;
                if child_time >= 0.0 || animation.is_initialized() {
                    animation.render(child_time, surface, deferred, suppress_events);
                }
            }
        }

        if !suppress_events {
            let previous_local = if self.last_time.is_some() {
                self.last_local
            } else {
                BEFORE_START
            };
            let previous_iteration = self.last_iteration;
            let odd = |k: i32| self.yoyo && k % 2 == 1;
            if iteration == previous_iteration || self.last_time.is_none() {
                self.fire_calls(previous_local, local, deferred);
            } else if forward {
                let end_of_previous = if odd(previous_iteration) { 0.0 } else { iteration_length };
                let start_of_current = if odd(iteration) { iteration_length } else { BEFORE_START };
                self.fire_calls(previous_local, end_of_previous, deferred);
                self.fire_calls(start_of_current, local, deferred);
            } else {
                let start_of_previous = if odd(previous_iteration) { iteration_length } else { BEFORE_START };
                let end_of_current = if odd(iteration) { 0.0 } else { iteration_length };
                self.fire_calls(previous_local, start_of_previous, deferred);
                self.fire_calls(end_of_current, local, deferred);
            }

            if previous_time <= 0.0 && time > 0.0 {
                if let Some(cb) = self.callbacks.on_start.clone() {
                    deferred.push(Box::new(move || cb()));
                }
            }
            if let Some(cb) = self.callbacks.on_update.clone() {
                let progress = if total.is_finite() && total > 0.0 {
                    (time / total).clamp(0.0, 1.0)
                } else if iteration_length > 0.0 {
                    (raw_local / iteration_length).clamp(0.0, 1.0)
                } else {
                    1.0
                };
                deferred.push(Box::new(move || cb(progress)));
            }
            if time >= total && previous_time < total {
                if let Some(cb) = self.callbacks.on_complete.clone() {
                    deferred.push(Box::new(move || cb()));
                }
            }
            if time <= 0.0 && previous_time > 0.0 {
                if let Some(cb) = self.callbacks.on_reverse_complete.clone() {
                    deferred.push(Box::new(move || cb()));
                }
            }
        }

        self.last_time = Some(time);
        self.last_iteration = iteration;
        self.last_local = local;
    }

    fn remove_target(&mut self, target: ElementId) -> bool {
        self.children.retain_mut(|child| match &mut child.kind {
            ChildKind::Animation(animation) => {
                !(animation.affects(target) && animation.remove_target(target))
            }
            ChildKind::Call(_) => true,
        });
        self.children.is_empty()
    }
}
