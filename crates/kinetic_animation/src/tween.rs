//! Tweens
//!
//! A [`Tween`] animates a set of [`TweenVars`] on one or more elements. It is
//! a pure function of its local time: rendering at time `t` always writes the
//! same values regardless of what was rendered before, which is what makes
//! scrubbing and reversing safe.
//!
//! Start values of `to` tweens are read from the surface the first time the
//! tween renders, so a `to` that follows a `from` in a timeline animates from
//! wherever the earlier tween left the element.
//!
//! ```rust
//! use kinetic_animation::{Easing, Tween, TweenVars};
//! use kinetic_core::{Surface, Viewport};
//!
//! let surface = Surface::new(Viewport::new(1280.0, 800.0));
//! let card = surface.create_element("div", None);
//!
//! let tween = Tween::to(&[card], TweenVars::opacity(0.0).with_y(40.0))
//!     .duration(0.8)
//!     .ease(Easing::POWER3_OUT);
//! assert_eq!(tween.total_duration(), 0.8);
//! ```

use std::rc::Rc;

use kinetic_core::{ElementId, Property, Surface};
use smallvec::SmallVec;

use crate::easing::Easing;
use crate::scroll::ScrollTriggerConfig;
use crate::values::{Interpolate, TweenVars};

/// Default tween duration in seconds
pub const DEFAULT_DURATION: f32 = 0.5;

/// Plain callback
pub type Callback = Rc<dyn Fn()>;

/// Callback receiving linear progress (0..1)
pub type ProgressCallback = Rc<dyn Fn(f32)>;

/// Work queued during a render, run once the engine borrow is released
pub(crate) type Deferred = Box<dyn FnOnce()>;

/// Which ends of the tween are given explicitly
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum TweenKind {
    /// Animate from the current values to the given ones
    To,
    /// Animate from the given values to the current ones
    From,
    /// Both ends given
    FromTo,
    /// Zero-duration jump to the given values
    Set,
}

/// Order in which staggered targets start
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum StaggerFrom {
    #[default]
    Start,
    End,
    Center,
}

impl StaggerFrom {
    fn slot(&self, index: usize, count: usize) -> f32 {
        let last = count.saturating_sub(1) as f32;
        match self {
            StaggerFrom::Start => index as f32,
            StaggerFrom::End => last - index as f32,
            StaggerFrom::Center => (index as f32 - last / 2.0).abs(),
        }
    }

    fn span(&self, count: usize) -> f32 {
        (0..count)
            .map(|i| self.slot(i, count))
            .fold(0.0, f32::max)
    }
}

/// Duration and ease used when a tween leaves them unset
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct TweenDefaults {
    pub duration: f32,
    pub ease: Easing,
}

impl Default for TweenDefaults {
    fn default() -> Self {
        Self {
            duration: DEFAULT_DURATION,
            ease: Easing::default(),
        }
    }
}

#[derive(Clone, Default)]
struct TweenCallbacks {
    on_start: Option<Callback>,
    on_update: Option<ProgressCallback>,
    on_complete: Option<Callback>,
}

#[derive(Clone, Copy, Debug)]
struct Track {
    target: ElementId,
    property: Property,
    start: f32,
    end: f32,
    /// Stagger offset within one iteration
    offset: f32,
}

/// A property animation over one or more targets
#[derive(Clone)]
pub struct Tween {
    targets: SmallVec<[ElementId; 8]>,
    kind: TweenKind,
    from: TweenVars,
    to: TweenVars,
    duration: Option<f32>,
    delay: f32,
    ease: Option<Easing>,
    stagger: f32,
    stagger_from: StaggerFrom,
    repeat: i32,
    yoyo: bool,
    immediate_render: bool,
    callbacks: TweenCallbacks,
    scroll_trigger: Option<ScrollTriggerConfig>,
    tracks: Option<Vec<Track>>,
    last_time: Option<f32>,
}

impl Tween {
    fn new(targets: &[ElementId], kind: TweenKind, from: TweenVars, to: TweenVars) -> Self {
        Self {
            targets: targets.iter().copied().collect(),
            kind,
            from,
            to,
            duration: if kind == TweenKind::Set { Some(0.0) } else { None },
            delay: 0.0,
            ease: None,
            stagger: 0.0,
            stagger_from: StaggerFrom::Start,
            repeat: 0,
            yoyo: false,
            immediate_render: matches!(kind, TweenKind::From | TweenKind::FromTo),
            callbacks: TweenCallbacks::default(),
            scroll_trigger: None,
            tracks: None,
            last_time: None,
        }
    }

    pub fn to(targets: &[ElementId], vars: TweenVars) -> Self {
        Self::new(targets, TweenKind::To, TweenVars::default(), vars)
    }

    pub fn from(targets: &[ElementId], vars: TweenVars) -> Self {
        Self::new(targets, TweenKind::From, vars, TweenVars::default())
    }

    pub fn from_to(targets: &[ElementId], from: TweenVars, to: TweenVars) -> Self {
        Self::new(targets, TweenKind::FromTo, from, to)
    }

    pub fn set(targets: &[ElementId], vars: TweenVars) -> Self {
        Self::new(targets, TweenKind::Set, TweenVars::default(), vars)
    }

    // =========================================================================
    // Builder
    // =========================================================================

    pub fn duration(mut self, seconds: f32) -> Self {
        if self.kind != TweenKind::Set {
            self.duration = Some(seconds.max(0.0));
        }
        self
    }

    pub fn delay(mut self, seconds: f32) -> Self {
        self.delay = seconds.max(0.0);
        self
    }

    pub fn ease(mut self, ease: Easing) -> Self {
        self.ease = Some(ease);
        self
    }

    /// Seconds between consecutive targets starting
    pub fn stagger(mut self, seconds: f32) -> Self {
        self.stagger = seconds.max(0.0);
        self
    }

    pub fn stagger_from(mut self, from: StaggerFrom) -> Self {
        self.stagger_from = from;
        self
    }

    /// Extra iterations; `-1` repeats forever
    pub fn repeat(mut self, count: i32) -> Self {
        self.repeat = count.max(-1);
        self
    }

    pub fn yoyo(mut self, yoyo: bool) -> Self {
        self.yoyo = yoyo;
        self
    }

    /// Write the start values as soon as the tween is added
    pub fn immediate_render(mut self, enabled: bool) -> Self {
        self.immediate_render = enabled;
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

    /// Drive this tween from a scroll observer
    pub fn scroll_trigger(mut self, config: ScrollTriggerConfig) -> Self {
        self.scroll_trigger = Some(config);
        self
    }

    // =========================================================================
    // Accessors
    // =========================================================================

    pub fn targets(&self) -> &[ElementId] {
        &self.targets
    }

    pub fn kind(&self) -> TweenKind {
        self.kind
    }

    pub fn from_vars(&self) -> &TweenVars {
        &self.from
    }

    pub fn to_vars(&self) -> &TweenVars {
        &self.to
    }

    pub fn get_delay(&self) -> f32 {
        self.delay
    }

    pub fn get_ease(&self) -> Easing {
        self.ease.unwrap_or_default()
    }

    pub fn get_repeat(&self) -> i32 {
        self.repeat
    }

    pub fn is_yoyo(&self) -> bool {
        self.yoyo
    }

    pub fn get_duration(&self) -> f32 {
        self.duration.unwrap_or(DEFAULT_DURATION)
    }

    pub(crate) fn wants_immediate_render(&self) -> bool {
        self.immediate_render
    }

    pub(crate) fn take_scroll_trigger(&mut self) -> Option<ScrollTriggerConfig> {
        self.scroll_trigger.take()
    }

    /// Fill in duration and ease left unset by the caller
    pub(crate) fn apply_defaults(&mut self, defaults: &TweenDefaults) {
        if self.duration.is_none() {
            self.duration = Some(defaults.duration);
        }
        if self.ease.is_none() {
            self.ease = Some(defaults.ease);
        }
    }

    /// Length of one iteration including the stagger spread
    pub fn iteration_duration(&self) -> f32 {
        self.get_duration() + self.stagger * self.stagger_from.span(self.targets.len())
    }

    /// Length including repeats; infinite for `repeat(-1)`
    pub fn total_duration(&self) -> f32 {
        let iteration = self.iteration_duration();
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

    pub fn affects(&self, target: ElementId) -> bool {
        self.targets.contains(&target)
    }

    /// Stop animating `target`; returns true when no targets remain
    pub(crate) fn remove_target(&mut self, target: ElementId) -> bool {
        self.targets.retain(|t| *t != target);
        if let Some(tracks) = self.tracks.as_mut() {
            tracks.retain(|t| t.target != target);
        }
        self.targets.is_empty()
    }

    // =========================================================================
    // Rendering
    // =========================================================================

    fn ensure_tracks(&mut self, surface: &Surface) {
        if self.tracks.is_some() {
            return;
        }

        let mut properties = self.from.properties();
        for property in self.to.properties() {
            if !properties.contains(&property) {
                properties.push(property);
            }
        }

        let count = self.targets.len();
        let mut tracks = Vec::with_capacity(count * properties.len());
        for (index, target) in self.targets.iter().enumerate() {
            let offset = self.stagger * self.stagger_from.slot(index, count);
            for property in &properties {
                let Some(current) = surface.read_property(*target, *property) else {
                    continue;
                };
                let (start, end) = match self.kind {
                    TweenKind::To | TweenKind::Set => {
                        (current, self.to.get(*property).unwrap_or(current))
                    }
                    TweenKind::From => (self.from.get(*property).unwrap_or(current), current),
                    TweenKind::FromTo => (
                        self.from.get(*property).unwrap_or(current),
                        self.to.get(*property).unwrap_or(current),
                    ),
                };
                tracks.push(Track {
                    target: *target,
                    property: *property,
                    start,
                    end,
                    offset,
                });
            }
        }
        self.tracks = Some(tracks);
    }

    /// Capture tracks and write start values without firing callbacks
    pub(crate) fn render_immediate(&mut self, surface: &Surface) {
        if !self.immediate_render {
            return;
        }
        self.ensure_tracks(surface);
        self.write_values(-1.0, 0, surface);
    }

    /// True once tracks have been captured
    pub(crate) fn is_initialized(&self) -> bool {
        self.tracks.is_some()
    }

    fn iteration_at(&self, time: f32) -> (i32, f32) {
        let iteration = self.iteration_duration();
        if iteration <= 0.0 {
            return (0, time);
        }
        if self.repeat >= 0 && time >= self.total_duration() {
            return (self.repeat, iteration);
        }
        let k = (time / iteration).floor().max(0.0);
        (k as i32, time - k * iteration)
    }

    fn write_values(&self, local: f32, iteration: i32, surface: &Surface) {
        let Some(tracks) = self.tracks.as_ref() else {
            return;
        };
        let ease = self.get_ease();
        let duration = self.get_duration();
        let local = if self.yoyo && iteration % 2 == 1 {
            self.iteration_duration() - local
        } else {
            local
        };

        for track in tracks {
            let progress = if local < 0.0 {
                0.0
            } else if duration <= 0.0 {
                if local >= track.offset {
                    1.0
                } else {
                    0.0
                }
            } else {
                ((local - track.offset) / duration).clamp(0.0, 1.0)
            };
            let value = track.start.lerp(&track.end, ease.apply(progress));
            surface.write_property(track.target, track.property, value);
        }
    }

    /// Render at local `time` (negative means "before the start")
    pub(crate) fn render(
        &mut self,
        time: f32,
        surface: &Surface,
        deferred: &mut Vec<Deferred>,
        suppress_events: bool,
    ) {
        self.ensure_tracks(surface);

        let total = self.total_duration();
        if time < 0.0 {
            self.write_values(-1.0, 0, surface);
            self.last_time = Some(time);
            return;
        }

        let time = time.min(total);
        let (iteration, local) = self.iteration_at(time);
        self.write_values(local, iteration, surface);

        if !suppress_events {
            let previous = self.last_time.unwrap_or(-1.0);
            if previous <= 0.0 && (time > 0.0 || total == 0.0) {
                if let Some(cb) = self.callbacks.on_start.clone() {
                    deferred.push(Box::new(move || cb()));
                }
            }
            if let Some(cb) = self.callbacks.on_update.clone() {
                let progress = if total.is_finite() && total > 0.0 {
                    time / total
                } else if total == 0.0 {
                    1.0
                } else {
                    local / self.iteration_duration().max(f32::EPSILON)
                };
                deferred.push(Box::new(move || cb(progress)));
            }
            if time >= total && previous < total {
                if let Some(cb) = self.callbacks.on_complete.clone() {
                    deferred.push(Box::new(move || cb()));
                }
            }
        }
        self.last_time = Some(time);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use kinetic_core::Viewport;
    use std::cell::Cell;

    fn surface_with(count: usize) -> (Surface, Vec<ElementId>) {
        let surface = Surface::new(Viewport::new(1280.0, 800.0));
        let ids = (0..count)
            .map(|_| surface.create_element("div", None))
            .collect();
        (surface, ids)
    }

    fn render(tween: &mut Tween, surface: &Surface, time: f32) -> Vec<Deferred> {
        let mut deferred = Vec::new();
        tween.render(time, surface, &mut deferred, false);
        deferred
    }

    #[test]
    fn test_to_captures_start_lazily() {
        let (surface, ids) = surface_with(1);
        let mut tween = Tween::to(&ids, TweenVars::x(100.0))
            .duration(1.0)
            .ease(Easing::LINEAR);
        surface.write_property(ids[0], Property::X, 20.0);

        render(&mut tween, &surface, 0.5);
        assert_eq!(surface.read_property(ids[0], Property::X), Some(60.0));
        render(&mut tween, &surface, 1.0);
        assert_eq!(surface.read_property(ids[0], Property::X), Some(100.0));
    }

    #[test]
    fn test_from_renders_immediately() {
        let (surface, ids) = surface_with(1);
        let mut tween = Tween::from(&ids, TweenVars::opacity(0.0).with_y(60.0)).duration(1.0);
        tween.render_immediate(&surface);
        assert_eq!(surface.read_property(ids[0], Property::Opacity), Some(0.0));
        assert_eq!(surface.read_property(ids[0], Property::Y), Some(60.0));

        render(&mut tween, &surface, 1.0);
        assert_eq!(surface.read_property(ids[0], Property::Opacity), Some(1.0));
        assert_eq!(surface.read_property(ids[0], Property::Y), Some(0.0));
    }

    #[test]
    fn test_stagger_offsets_targets() {
        let (surface, ids) = surface_with(3);
        let mut tween = Tween::from_to(&ids, TweenVars::opacity(0.0), TweenVars::opacity(1.0))
            .duration(1.0)
            .stagger(0.5)
            .ease(Easing::LINEAR);
        assert_eq!(tween.total_duration(), 2.0);

        render(&mut tween, &surface, 0.5);
        let values: Vec<_> = ids
            .iter()
            .filter_map(|id| surface.read_property(*id, Property::Opacity))
            .collect();
        assert_eq!(values, vec![0.5, 0.0, 0.0]);
    }

    #[test]
    fn test_yoyo_repeat_ends_at_start() {
        let (surface, ids) = surface_with(1);
        let mut tween = Tween::to(&ids, TweenVars::rotation(360.0))
            .duration(1.0)
            .ease(Easing::LINEAR)
            .repeat(1)
            .yoyo(true);
        render(&mut tween, &surface, 1.5);
        assert_eq!(surface.read_property(ids[0], Property::Rotation), Some(180.0));
        render(&mut tween, &surface, 2.0);
        assert_eq!(surface.read_property(ids[0], Property::Rotation), Some(0.0));
    }

    #[test]
    fn test_infinite_repeat_wraps() {
        let (surface, ids) = surface_with(1);
        let mut tween = Tween::to(&ids, TweenVars::rotation(360.0))
            .duration(2.0)
            .ease(Easing::LINEAR)
            .repeat(-1);
        assert!(tween.total_duration().is_infinite());
        render(&mut tween, &surface, 5.0);
        assert_eq!(surface.read_property(ids[0], Property::Rotation), Some(180.0));
    }

    #[test]
    fn test_callbacks_fire_once() {
        let (surface, ids) = surface_with(1);
        let completed = Rc::new(Cell::new(0));
        let completed_in = Rc::clone(&completed);
        let mut tween = Tween::to(&ids, TweenVars::opacity(0.0))
            .duration(1.0)
            .on_complete(move || completed_in.set(completed_in.get() + 1));

        for time in [0.5, 1.0, 1.0] {
            for cb in render(&mut tween, &surface, time) {
                cb();
            }
        }
        assert_eq!(completed.get(), 1);
    }

    #[test]
    fn test_removed_target_is_ignored() {
        let (surface, ids) = surface_with(2);
        let mut tween = Tween::to(&ids, TweenVars::x(10.0)).duration(1.0);
        surface.remove_element(ids[1]).unwrap();
        render(&mut tween, &surface, 1.0);
        assert_eq!(surface.read_property(ids[0], Property::X), Some(10.0));
        assert!(!tween.remove_target(ids[0]));
        assert!(tween.remove_target(ids[1]));
    }
}
