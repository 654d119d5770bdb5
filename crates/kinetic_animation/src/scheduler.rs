//! Animation engine
//!
//! Owns every playing animation and scroll observer and advances them each
//! frame. The engine is held by the application; components receive a
//! clonable, non-owning [`EngineHandle`].
//!
//! Each frame ([`AnimationEngine::advance`]):
//!
//! 1. Scroll observers compare the current scroll offset with their range and
//!    apply toggle actions or update scrub targets
//! 2. Playing animations advance by `dt`
//! 3. Scrubbed animations ease toward their scroll-derived time
//! 4. Queued callbacks run, with the engine borrow released
//! 5. Tick callbacks run
//!
//! Because user callbacks only ever run after the internal borrow is
//! released, a callback may freely create or kill animations and observers.
//! Observers are independent of each other: nothing orders one observer's
//! animation relative to another's.

use std::cell::RefCell;
use std::rc::{Rc, Weak};
use std::time::Instant;

use kinetic_core::{ElementId, EventTarget, EventType, Surface};
use slotmap::{new_key_type, SlotMap};
use smallvec::SmallVec;

use crate::error::{AnimationError, Result};
use crate::scroll::{Crossing, ScrollMode, ScrollObserver, ScrollTriggerConfig, ToggleAction};
use crate::timeline::{Animation, Timeline};
use crate::tween::{Deferred, Tween};
use crate::values::TweenVars;

new_key_type! {
    /// Handle to a registered animation
    pub struct AnimationId;
    /// Handle to a registered scroll observer
    pub struct ObserverId;
    /// Handle to a registered tick callback
    pub struct TickCallbackId;
}

/// Per-frame callback receiving the frame delta in seconds
pub type TickCallback = Rc<dyn Fn(f32)>;

/// Playback state of an animation
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum PlayState {
    Playing,
    Paused,
    /// Reached the end (or the start, when reversed)
    Finished,
}

/// Snapshot of an animation's playback
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct AnimationStatus {
    pub time: f32,
    pub total: f32,
    /// `time / total`, or 0 for infinite animations
    pub progress: f32,
    pub state: PlayState,
    pub reversed: bool,
    pub scrubbed: bool,
    pub observed: bool,
}

// ============================================================================
// Player
// ============================================================================

#[derive(Clone, Copy, Debug)]
struct Scrub {
    lag: Option<f32>,
    target: f32,
}

struct Player {
    animation: Animation,
    time: f32,
    delay_remaining: f32,
    state: PlayState,
    reversed: bool,
    time_scale: f32,
    scrub: Option<Scrub>,
    observers: SmallVec<[ObserverId; 1]>,
}

impl Player {
    fn new(animation: Animation, state: PlayState) -> Self {
        Self {
            delay_remaining: animation.delay(),
            animation,
            time: 0.0,
            state,
            reversed: false,
            time_scale: 1.0,
            scrub: None,
            observers: SmallVec::new(),
        }
    }

    fn total(&self) -> f32 {
        self.animation.total_duration()
    }

    fn progress(&self) -> f32 {
        let total = self.total();
        if total.is_finite() && total > 0.0 {
            (self.time / total).clamp(0.0, 1.0)
        } else if total == 0.0 && self.animation.is_initialized() {
            1.0
        } else {
            0.0
        }
    }

    fn status(&self) -> AnimationStatus {
        AnimationStatus {
            time: self.time,
            total: self.total(),
            progress: self.progress(),
            state: self.state,
            reversed: self.reversed,
            scrubbed: self.scrub.is_some(),
            observed: !self.observers.is_empty(),
        }
    }

    fn render(&mut self, surface: &Surface, deferred: &mut Vec<Deferred>, suppress: bool) {
        self.animation.render(self.time, surface, deferred, suppress);
    }

    fn at_bound(&self) -> bool {
        if self.reversed {
            self.time <= 0.0
        } else {
            self.time >= self.total()
        }
    }

    fn resume_playing(&mut self) {
        self.state = if self.at_bound() && self.animation.is_initialized() {
            PlayState::Finished
        } else {
            PlayState::Playing
        };
    }

    fn seek(&mut self, time: f32, surface: &Surface, deferred: &mut Vec<Deferred>, suppress: bool) {
        let total = self.total();
        self.time = if total.is_finite() {
            time.clamp(0.0, total)
        } else {
            time.max(0.0)
        };
        self.delay_remaining = 0.0;
        self.render(surface, deferred, suppress);
    }

    fn apply(&mut self, action: ToggleAction, surface: &Surface, deferred: &mut Vec<Deferred>) {
        match action {
            ToggleAction::Play => {
                self.reversed = false;
                self.resume_playing();
            }
            ToggleAction::Pause => {
                if self.state == PlayState::Playing {
                    self.state = PlayState::Paused;
                }
            }
            ToggleAction::Resume => self.resume_playing(),
            ToggleAction::Reverse => {
                self.reversed = true;
                self.resume_playing();
            }
            ToggleAction::Restart => {
                self.reversed = false;
                self.seek(0.0, surface, deferred, true);
                self.state = PlayState::Playing;
            }
            ToggleAction::Reset => {
                self.reversed = false;
                self.seek(0.0, surface, deferred, true);
                self.state = PlayState::Paused;
            }
            ToggleAction::Complete => {
                let total = self.total();
                if total.is_finite() {
                    self.reversed = false;
                    self.seek(total, surface, deferred, false);
                    self.state = PlayState::Finished;
                }
            }
            ToggleAction::None => {}
        }
    }

    fn step(&mut self, dt: f32, surface: &Surface, deferred: &mut Vec<Deferred>) {
        if let Some(scrub) = self.scrub {
            let next = match scrub.lag {
                None => scrub.target,
                Some(lag) if dt > 0.0 => {
                    let eased = self.time + (scrub.target - self.time) * (dt / lag).min(1.0);
                    if (eased - scrub.target).abs() < 1e-4 {
                        scrub.target
                    } else {
                        eased
                    }
                }
                Some(_) => self.time,
            };
            if next != self.time || !self.animation.is_initialized() {
                self.time = next;
                self.render(surface, deferred, false);
            }
            return;
        }

        if self.state != PlayState::Playing {
            return;
        }

        let mut dt = dt * self.time_scale;
        if !self.reversed && self.delay_remaining > 0.0 {
            let consumed = dt.min(self.delay_remaining);
            self.delay_remaining -= consumed;
            dt -= consumed;
            if self.delay_remaining > 0.0 {
                return;
            }
        }

        let total = self.total();
        self.time = if self.reversed {
            (self.time - dt).max(0.0)
        } else {
            (self.time + dt).min(total)
        };
        self.render(surface, deferred, false);

        if self.at_bound() {
            self.state = PlayState::Finished;
        }
    }
}

// ============================================================================
// Engine State
// ============================================================================

struct ObserverEntry {
    observer: ScrollObserver,
    animation: Option<AnimationId>,
}

struct EngineInner {
    surface: Surface,
    players: SlotMap<AnimationId, Player>,
    observers: SlotMap<ObserverId, ObserverEntry>,
    tick_callbacks: SlotMap<TickCallbackId, TickCallback>,
    last_frame: Instant,
    time_scale: f32,
    elapsed: f64,
}

impl EngineInner {
    fn remove_observer(&mut self, id: ObserverId) -> bool {
        let Some(entry) = self.observers.remove(id) else {
            return false;
        };
        if let Some(listener) = entry.observer.resize_listener {
            self.surface.remove_listener(listener);
        }
        if let Some(player) = entry.animation.and_then(|a| self.players.get_mut(a)) {
            player.observers.retain(|o| *o != id);
        }
        true
    }

    fn remove_player(&mut self, id: AnimationId) -> bool {
        let Some(player) = self.players.remove(id) else {
            return false;
        };
        for observer in player.observers {
            self.remove_observer(observer);
        }
        true
    }
}

fn run_deferred(deferred: Vec<Deferred>) {
    for callback in deferred {
        callback();
    }
}

fn advance_engine(engine: &Rc<RefCell<EngineInner>>, dt: f32) {
    let mut deferred: Vec<Deferred> = Vec::new();
    let dt = dt.max(0.0) * engine.borrow().time_scale;
    {
        let mut guard = engine.borrow_mut();
        let inner = &mut *guard;
        inner.elapsed += dt as f64;
        let surface = inner.surface.clone();
        let scroll = surface.scroll_y();

        // 1. Observers
        let mut actions: SmallVec<[(AnimationId, ToggleAction); 8]> = SmallVec::new();
        let mut spent: SmallVec<[ObserverId; 4]> = SmallVec::new();
        for (id, entry) in inner.observers.iter_mut() {
            let observer = &mut entry.observer;
            for crossing in observer.update(scroll) {
                tracing::trace!("engine: observer {:?} {:?} at {:.1}", id, crossing, scroll);
                if let Some(cb) = observer.callback_for(crossing) {
                    deferred.push(Box::new(move || cb()));
                }
                if let (ScrollMode::Toggle(toggle), Some(animation)) =
                    (observer.mode(), entry.animation)
                {
                    actions.push((animation, toggle.action_for(crossing)));
                }
                if crossing == Crossing::Enter && observer.config().once {
                    spent.push(id);
                }
            }
            if let Some(progress) = observer.take_progress_change(scroll) {
                if let Some(cb) = observer.update_callback() {
                    deferred.push(Box::new(move || cb(progress)));
                }
                if let (ScrollMode::Scrub(_), Some(animation)) =
                    (observer.mode(), entry.animation)
                {
                    if let Some(player) = inner.players.get_mut(animation) {
                        let total = player.total();
                        if let Some(scrub) = player.scrub.as_mut() {
                            scrub.target = if total.is_finite() {
                                progress * total
                            } else {
                                0.0
                            };
                        }
                    }
                }
            }
        }
        for (animation, action) in actions {
            if let Some(player) = inner.players.get_mut(animation) {
                player.apply(action, &surface, &mut deferred);
            }
        }
        for id in spent {
            tracing::debug!("engine: observer {:?} fired once, removing", id);
            inner.remove_observer(id);
        }

        // 2-3. Players
        for (_, player) in inner.players.iter_mut() {
            player.step(dt, &surface, &mut deferred);
        }
    }

    // 4. Callbacks, borrow released
    run_deferred(deferred);

    // 5. Tick callbacks
    let ticks: Vec<TickCallback> = engine.borrow().tick_callbacks.values().cloned().collect();
    for tick in ticks {
        tick(dt);
    }
}

// ============================================================================
// Engine
// ============================================================================

/// Owner of all animations and scroll observers on one surface
///
/// ```rust
/// use kinetic_animation::{AnimationEngine, Tween, TweenVars};
/// use kinetic_core::{Property, Surface, Viewport};
///
/// let surface = Surface::new(Viewport::new(1280.0, 800.0));
/// let title = surface.create_element("h1", None);
/// let engine = AnimationEngine::new(surface.clone());
///
/// engine
///     .handle()
///     .add(Tween::from(&[title], TweenVars::opacity(0.0)).duration(1.0))
///     .unwrap();
/// assert_eq!(surface.read_property(title, Property::Opacity), Some(0.0));
///
/// engine.advance(1.0);
/// assert_eq!(surface.read_property(title, Property::Opacity), Some(1.0));
/// ```
pub struct AnimationEngine {
    inner: Rc<RefCell<EngineInner>>,
}

impl AnimationEngine {
    pub fn new(surface: Surface) -> Self {
        Self {
            inner: Rc::new(RefCell::new(EngineInner {
                surface,
                players: SlotMap::with_key(),
                observers: SlotMap::with_key(),
                tick_callbacks: SlotMap::with_key(),
                last_frame: Instant::now(),
                time_scale: 1.0,
                elapsed: 0.0,
            })),
        }
    }

    /// Get a non-owning handle for components
    pub fn handle(&self) -> EngineHandle {
        EngineHandle {
            inner: Rc::downgrade(&self.inner),
        }
    }

    pub fn surface(&self) -> Surface {
        self.inner.borrow().surface.clone()
    }

    /// Advance by wall-clock time since the previous tick
    pub fn tick(&self) {
        let dt = {
            let mut inner = self.inner.borrow_mut();
            let now = Instant::now();
            let dt = now.duration_since(inner.last_frame).as_secs_f32();
            inner.last_frame = now;
            dt
        };
        self.advance(dt);
    }

    /// Advance every animation and observer by `dt` seconds
    pub fn advance(&self, dt: f32) {
        advance_engine(&self.inner, dt);
    }

    /// Total seconds advanced so far
    pub fn elapsed(&self) -> f64 {
        self.inner.borrow().elapsed
    }

    pub fn animation_count(&self) -> usize {
        self.inner.borrow().players.len()
    }

    pub fn active_count(&self) -> usize {
        self.inner
            .borrow()
            .players
            .values()
            .filter(|p| p.state == PlayState::Playing || p.scrub.is_some())
            .count()
    }

    pub fn observer_count(&self) -> usize {
        self.inner.borrow().observers.len()
    }

    pub fn tick_callback_count(&self) -> usize {
        self.inner.borrow().tick_callbacks.len()
    }

    pub fn has_active_animations(&self) -> bool {
        self.active_count() > 0
    }
}

impl Drop for AnimationEngine {
    fn drop(&mut self) {
        // Observer resize listeners live on the surface, which may outlive us
        let mut inner = self.inner.borrow_mut();
        let ids: Vec<ObserverId> = inner.observers.keys().collect();
        for id in ids {
            inner.remove_observer(id);
        }
    }
}

// ============================================================================
// Handle
// ============================================================================

/// Weak, clonable access to an [`AnimationEngine`]
///
/// Every method is a no-op (or returns [`AnimationError::EngineDropped`])
/// once the engine is gone.
#[derive(Clone)]
pub struct EngineHandle {
    inner: Weak<RefCell<EngineInner>>,
}

impl EngineHandle {
    pub fn is_alive(&self) -> bool {
        self.inner.strong_count() > 0
    }

    fn upgrade(&self) -> Result<Rc<RefCell<EngineInner>>> {
        self.inner.upgrade().ok_or(AnimationError::EngineDropped)
    }

    /// Advance the engine, as [`AnimationEngine::advance`]
    pub fn advance(&self, dt: f32) {
        if let Some(inner) = self.inner.upgrade() {
            advance_engine(&inner, dt);
        }
    }

    pub fn surface(&self) -> Option<Surface> {
        self.inner.upgrade().map(|inner| inner.borrow().surface.clone())
    }

    // =========================================================================
    // Creation
    // =========================================================================

    /// Register an animation and start it (paused if scroll-triggered)
    pub fn add(&self, animation: impl Into<Animation>) -> Result<AnimationHandle> {
        let inner = self.upgrade()?;
        let mut animation = animation.into();
        let trigger_config = animation.take_scroll_trigger();

        let mut guard = inner.borrow_mut();
        let engine = &mut *guard;
        let surface = engine.surface.clone();

        let trigger = match &trigger_config {
            Some(config) => Some(
                config
                    .trigger
                    .or_else(|| animation.targets().first().copied())
                    .ok_or(AnimationError::MissingTrigger)?,
            ),
            None => None,
        };

        animation.render_immediate(&surface);
        let state = if trigger_config.is_some() {
            PlayState::Paused
        } else {
            PlayState::Playing
        };
        let total = animation.total_duration();
        let id = engine.players.insert(Player::new(animation, state));
        tracing::debug!("engine: added animation {:?} ({:.2}s)", id, total);

        if let (Some(config), Some(trigger)) = (trigger_config, trigger) {
            if let ScrollMode::Scrub(lag) = config.mode {
                if let Some(player) = engine.players.get_mut(id) {
                    player.scrub = Some(Scrub { lag, target: 0.0 });
                }
            }
            let observer = self.register_observer(engine, trigger, config, Some(id));
            if let Some(player) = engine.players.get_mut(id) {
                player.observers.push(observer);
            }
        }

        Ok(AnimationHandle {
            id,
            engine: self.clone(),
        })
    }

    /// Create a standalone scroll observer (callbacks only, no animation)
    pub fn scroll_trigger(&self, config: ScrollTriggerConfig) -> Result<ObserverId> {
        let inner = self.upgrade()?;
        let trigger = config.trigger.ok_or(AnimationError::MissingTrigger)?;
        let mut guard = inner.borrow_mut();
        Ok(self.register_observer(&mut guard, trigger, config, None))
    }

    fn register_observer(
        &self,
        engine: &mut EngineInner,
        trigger: ElementId,
        config: ScrollTriggerConfig,
        animation: Option<AnimationId>,
    ) -> ObserverId {
        let mut observer = ScrollObserver::new(trigger, config);
        observer.refresh(&engine.surface);
        let id = engine.observers.insert(ObserverEntry {
            observer,
            animation,
        });

        let handle = self.clone();
        let listener = engine
            .surface
            .add_listener(EventTarget::Window, EventType::Resize, move |_| {
                handle.refresh_observer(id);
            });
        if let Some(entry) = engine.observers.get_mut(id) {
            entry.observer.resize_listener = Some(listener);
        }
        tracing::debug!("engine: observer {:?} on {:?}", id, trigger);
        id
    }

    pub fn to(&self, targets: &[ElementId], vars: TweenVars, duration: f32) -> Result<AnimationHandle> {
        self.add(Tween::to(targets, vars).duration(duration))
    }

    pub fn from(&self, targets: &[ElementId], vars: TweenVars, duration: f32) -> Result<AnimationHandle> {
        self.add(Tween::from(targets, vars).duration(duration))
    }

    pub fn from_to(
        &self,
        targets: &[ElementId],
        from: TweenVars,
        to: TweenVars,
        duration: f32,
    ) -> Result<AnimationHandle> {
        self.add(Tween::from_to(targets, from, to).duration(duration))
    }

    /// Write values immediately, without registering anything
    pub fn set(&self, targets: &[ElementId], vars: TweenVars) -> Result<()> {
        let inner = self.upgrade()?;
        let surface = inner.borrow().surface.clone();
        for target in targets {
            for property in vars.properties() {
                if let Some(value) = vars.get(property) {
                    surface.write_property(*target, property, value);
                }
            }
        }
        Ok(())
    }

    /// Start a timeline; chain children with the [`Timeline`] builder and pass it to [`add`](Self::add)
    pub fn timeline(&self) -> Timeline {
        Timeline::new()
    }

    // =========================================================================
    // Removal
    // =========================================================================

    /// Stop an animation and dispose its observers
    pub fn kill(&self, id: AnimationId) -> bool {
        let Some(inner) = self.inner.upgrade() else {
            return false;
        };
        let removed = inner.borrow_mut().remove_player(id);
        if removed {
            tracing::debug!("engine: killed animation {:?}", id);
        }
        removed
    }

    /// Dispose an observer and its resize listener
    pub fn kill_observer(&self, id: ObserverId) -> bool {
        let Some(inner) = self.inner.upgrade() else {
            return false;
        };
        let removed = inner.borrow_mut().remove_observer(id);
        removed
    }

    /// Stop animating `target` everywhere; animations left empty are killed
    pub fn kill_tweens_of(&self, target: ElementId) -> usize {
        let Some(inner) = self.inner.upgrade() else {
            return 0;
        };
        let mut guard = inner.borrow_mut();
        let emptied: Vec<AnimationId> = guard
            .players
            .iter_mut()
            .filter(|(_, p)| p.animation.affects(target))
            .filter_map(|(id, p)| p.animation.remove_target(target).then_some(id))
            .collect();
        for id in &emptied {
            guard.remove_player(*id);
        }
        emptied.len()
    }

    /// Kill every animation and observer
    pub fn kill_all(&self) {
        let Some(inner) = self.inner.upgrade() else {
            return;
        };
        let mut guard = inner.borrow_mut();
        let players: Vec<AnimationId> = guard.players.keys().collect();
        for id in players {
            guard.remove_player(id);
        }
        let observers: Vec<ObserverId> = guard.observers.keys().collect();
        for id in observers {
            guard.remove_observer(id);
        }
        tracing::debug!("engine: killed all animations and observers");
    }

    // =========================================================================
    // Observers
    // =========================================================================

    /// Recompute every observer's range from current layout
    pub fn refresh(&self) {
        let Some(inner) = self.inner.upgrade() else {
            return;
        };
        let mut guard = inner.borrow_mut();
        let engine = &mut *guard;
        for entry in engine.observers.values_mut() {
            entry.observer.refresh(&engine.surface);
        }
        tracing::debug!("engine: refreshed {} observer(s)", engine.observers.len());
    }

    fn refresh_observer(&self, id: ObserverId) {
        let Some(inner) = self.inner.upgrade() else {
            return;
        };
        let mut guard = inner.borrow_mut();
        let engine = &mut *guard;
        if let Some(entry) = engine.observers.get_mut(id) {
            entry.observer.refresh(&engine.surface);
        }
    }

    /// Scroll progress of an observer at an arbitrary offset
    pub fn observer_progress_at(&self, id: ObserverId, scroll: f32) -> Option<f32> {
        let inner = self.inner.upgrade()?;
        let guard = inner.borrow();
        guard.observers.get(id).map(|e| e.observer.progress_at(scroll))
    }

    /// Resolved `(start, end)` range of an observer
    pub fn observer_range(&self, id: ObserverId) -> Option<(f32, f32)> {
        let inner = self.inner.upgrade()?;
        let guard = inner.borrow();
        guard.observers.get(id).map(|e| e.observer.range())
    }

    pub fn observers_of(&self, id: AnimationId) -> Vec<ObserverId> {
        self.inner
            .upgrade()
            .and_then(|inner| inner.borrow().players.get(id).map(|p| p.observers.to_vec()))
            .unwrap_or_default()
    }

    /// True if any observer uses `trigger` as its trigger element
    pub fn has_observer_for(&self, trigger: ElementId) -> bool {
        self.inner
            .upgrade()
            .map(|inner| {
                inner
                    .borrow()
                    .observers
                    .values()
                    .any(|e| e.observer.trigger() == trigger)
            })
            .unwrap_or(false)
    }

    pub fn observer_count(&self) -> usize {
        self.inner
            .upgrade()
            .map(|inner| inner.borrow().observers.len())
            .unwrap_or(0)
    }

    pub fn animation_count(&self) -> usize {
        self.inner
            .upgrade()
            .map(|inner| inner.borrow().players.len())
            .unwrap_or(0)
    }

    // =========================================================================
    // Ticker
    // =========================================================================

    pub fn add_tick_callback<F: Fn(f32) + 'static>(&self, f: F) -> Option<TickCallbackId> {
        let inner = self.inner.upgrade()?;
        let id = inner.borrow_mut().tick_callbacks.insert(Rc::new(f));
        Some(id)
    }

    pub fn remove_tick_callback(&self, id: TickCallbackId) -> bool {
        self.inner
            .upgrade()
            .map(|inner| inner.borrow_mut().tick_callbacks.remove(id).is_some())
            .unwrap_or(false)
    }

    /// Scale applied to every frame delta
    pub fn set_time_scale(&self, scale: f32) {
        if let Some(inner) = self.inner.upgrade() {
            inner.borrow_mut().time_scale = scale.max(0.0);
        }
    }

    // =========================================================================
    // Playback
    // =========================================================================

    pub fn status(&self, id: AnimationId) -> Option<AnimationStatus> {
        let inner = self.inner.upgrade()?;
        let guard = inner.borrow();
        guard.players.get(id).map(Player::status)
    }

    fn with_player<R, F>(&self, id: AnimationId, f: F) -> Option<R>
    where
        F: FnOnce(&mut Player, &Surface, &mut Vec<Deferred>) -> R,
    {
        let inner = self.inner.upgrade()?;
        let mut deferred = Vec::new();
        let result = {
            let mut guard = inner.borrow_mut();
            let engine = &mut *guard;
            let player = engine.players.get_mut(id)?;
            f(player, &engine.surface, &mut deferred)
        };
        run_deferred(deferred);
        Some(result)
    }
}

// ============================================================================
// Animation Handle
// ============================================================================

/// Playback controls for one registered animation
#[derive(Clone)]
pub struct AnimationHandle {
    id: AnimationId,
    engine: EngineHandle,
}

/// Timelines are controlled through the same handle as tweens
pub type TimelineHandle = AnimationHandle;

impl AnimationHandle {
    pub fn id(&self) -> AnimationId {
        self.id
    }

    pub fn engine(&self) -> &EngineHandle {
        &self.engine
    }

    pub fn play(&self) {
        self.engine
            .with_player(self.id, |p, s, d| p.apply(ToggleAction::Play, s, d));
    }

    pub fn pause(&self) {
        self.engine
            .with_player(self.id, |p, s, d| p.apply(ToggleAction::Pause, s, d));
    }

    pub fn resume(&self) {
        self.engine
            .with_player(self.id, |p, s, d| p.apply(ToggleAction::Resume, s, d));
    }

    pub fn reverse(&self) {
        self.engine
            .with_player(self.id, |p, s, d| p.apply(ToggleAction::Reverse, s, d));
    }

    pub fn restart(&self) {
        self.engine
            .with_player(self.id, |p, s, d| p.apply(ToggleAction::Restart, s, d));
    }

    /// Jump to the start and pause
    pub fn reset(&self) {
        self.engine
            .with_player(self.id, |p, s, d| p.apply(ToggleAction::Reset, s, d));
    }

    /// Jump to the end, firing callbacks crossed on the way
    pub fn complete(&self) {
        self.engine
            .with_player(self.id, |p, s, d| p.apply(ToggleAction::Complete, s, d));
    }

    /// Jump to `time` without firing callbacks
    pub fn seek(&self, time: f32) {
        self.engine.with_player(self.id, |p, s, d| {
            p.seek(time, s, d, true);
            if p.state == PlayState::Finished && !p.at_bound() {
                p.state = PlayState::Paused;
            }
        });
    }

    pub fn progress(&self) -> f32 {
        self.status().map(|s| s.progress).unwrap_or(0.0)
    }

    /// Jump to a fraction of the total duration
    pub fn set_progress(&self, progress: f32) {
        self.engine.with_player(self.id, |p, s, d| {
            let total = p.total();
            if total.is_finite() {
                p.seek(progress.clamp(0.0, 1.0) * total, s, d, false);
            }
        });
    }

    pub fn set_time_scale(&self, scale: f32) {
        self.engine
            .with_player(self.id, |p, _, _| p.time_scale = scale.max(0.0));
    }

    pub fn time(&self) -> f32 {
        self.status().map(|s| s.time).unwrap_or(0.0)
    }

    pub fn status(&self) -> Option<AnimationStatus> {
        self.engine.status(self.id)
    }

    /// True while the playhead is moving
    pub fn is_active(&self) -> bool {
        self.status()
            .map(|s| s.state == PlayState::Playing)
            .unwrap_or(false)
    }

    pub fn is_alive(&self) -> bool {
        self.status().is_some()
    }

    pub fn kill(&self) -> bool {
        self.engine.kill(self.id)
    }
}
