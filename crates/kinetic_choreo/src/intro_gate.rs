//! Intro gate
//!
//! Couples the home page intro phase with the scroll lock. Scroll is locked
//! while the phase is `Loading` or `IntroPlaying` and released on
//! `ScrollPointReached`, slightly before the intro timeline completes.
//!
//! ```text
//! Loading --TimelineStarted--> IntroPlaying --ScrollPointReached--> ScrollEnabled
//!                                   |                                    |
//!                                   +---------TimelineCompleted----------+--> IntroComplete
//! ```

use std::cell::RefCell;
use std::rc::Rc;

use kinetic_core::{StateMachine, StateTransitions, Surface};

use crate::scroll_lock::ScrollLockController;

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum IntroPhase {
    Loading,
    IntroPlaying,
    ScrollEnabled,
    IntroComplete,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum IntroEvent {
    TimelineStarted,
    /// The master timeline reached its scroll-enable step
    ScrollPointReached,
    TimelineCompleted,
}

impl StateTransitions for IntroPhase {
    type Event = IntroEvent;

    fn on_event(&self, event: IntroEvent) -> Option<Self> {
        use IntroEvent::*;
        use IntroPhase::*;
        match (self, event) {
            (Loading, TimelineStarted) => Some(IntroPlaying),
            (IntroPlaying, ScrollPointReached) => Some(ScrollEnabled),
            (IntroPlaying, TimelineCompleted) => Some(IntroComplete),
            (ScrollEnabled, TimelineCompleted) => Some(IntroComplete),
            _ => None,
        }
    }
}

impl IntroPhase {
    /// True while user scrolling must be suppressed
    pub fn blocks_scroll(&self) -> bool {
        matches!(self, IntroPhase::Loading | IntroPhase::IntroPlaying)
    }
}

type PhaseObserver = Rc<dyn Fn(IntroPhase)>;

struct GateInner {
    fsm: StateMachine<IntroPhase>,
    lock: ScrollLockController,
    engaged: bool,
    observers: Vec<PhaseObserver>,
}

/// Shared handle to one intro playthrough
#[derive(Clone)]
pub struct IntroGate {
    inner: Rc<RefCell<GateInner>>,
}

impl IntroGate {
    /// Create a gate in `Loading`; scroll is not locked until [`engage`](Self::engage)
    pub fn new(surface: Surface) -> Self {
        Self {
            inner: Rc::new(RefCell::new(GateInner {
                fsm: StateMachine::new(IntroPhase::Loading),
                lock: ScrollLockController::new(surface),
                engaged: false,
                observers: Vec::new(),
            })),
        }
    }

    pub fn phase(&self) -> IntroPhase {
        self.inner.borrow().fsm.current()
    }

    pub fn is_scroll_locked(&self) -> bool {
        self.inner.borrow().lock.is_locked()
    }

    /// Start gating: lock scroll if the current phase blocks it
    pub fn engage(&self) {
        let mut inner = self.inner.borrow_mut();
        inner.engaged = true;
        if inner.fsm.current().blocks_scroll() {
            inner.lock.lock();
        }
    }

    /// Notified after every phase change, with the gate borrow released
    pub fn on_phase<F: Fn(IntroPhase) + 'static>(&self, f: F) {
        self.inner.borrow_mut().observers.push(Rc::new(f));
    }

    /// Feed an event; returns true if the phase changed
    pub fn send(&self, event: IntroEvent) -> bool {
        let (phase, observers) = {
            let mut inner = self.inner.borrow_mut();
            if !inner.fsm.send(event) {
                return false;
            }
            let phase = inner.fsm.current();
            if !phase.blocks_scroll() {
                inner.lock.unlock();
            } else if inner.engaged {
                inner.lock.lock();
            }
            (phase, inner.observers.clone())
        };
        tracing::debug!("intro gate: {:?} after {:?}", phase, event);
        for observer in observers {
            observer(phase);
        }
        true
    }

    /// Release the lock and force `overflow: auto`, whatever the phase
    pub fn release(&self) {
        let mut inner = self.inner.borrow_mut();
        inner.engaged = false;
        inner.lock.restore();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use kinetic_core::{Rect, Viewport};
    use std::cell::Cell;

    fn gate() -> (Surface, IntroGate) {
        let surface = Surface::new(Viewport::new(1280.0, 800.0));
        let main = surface.create_element("main", None);
        surface.set_rect(main, Rect::new(0.0, 0.0, 1280.0, 3000.0));
        let gate = IntroGate::new(surface.clone());
        (surface, gate)
    }

    #[test]
    fn test_transition_table() {
        let mut fsm = StateMachine::new(IntroPhase::Loading);
        assert!(!fsm.send(IntroEvent::ScrollPointReached));
        assert!(fsm.send(IntroEvent::TimelineStarted));
        assert!(fsm.send(IntroEvent::ScrollPointReached));
        assert!(!fsm.send(IntroEvent::TimelineStarted));
        assert!(fsm.send(IntroEvent::TimelineCompleted));
        assert_eq!(fsm.current(), IntroPhase::IntroComplete);
    }

    #[test]
    fn test_scroll_released_at_scroll_point() {
        let (surface, gate) = gate();
        gate.engage();
        assert!(!surface.user_wheel(50.0));

        gate.send(IntroEvent::TimelineStarted);
        assert!(gate.is_scroll_locked());
        assert!(!surface.user_wheel(50.0));

        gate.send(IntroEvent::ScrollPointReached);
        assert!(!gate.is_scroll_locked());
        assert!(surface.user_wheel(50.0));

        gate.send(IntroEvent::TimelineCompleted);
        assert_eq!(gate.phase(), IntroPhase::IntroComplete);
        assert!(!gate.is_scroll_locked());
    }

    #[test]
    fn test_observers_see_each_phase() {
        let (_surface, gate) = gate();
        let seen = Rc::new(Cell::new(0));
        let gate_clone = gate.clone();
        let s = seen.clone();
        gate.on_phase(move |phase| {
            // Re-entering the gate from an observer is allowed
            assert_eq!(gate_clone.phase(), phase);
            s.set(s.get() + 1);
        });
        gate.send(IntroEvent::TimelineStarted);
        gate.send(IntroEvent::TimelineCompleted);
        assert_eq!(seen.get(), 2);
    }

    #[test]
    fn test_release_mid_intro() {
        let (surface, gate) = gate();
        gate.engage();
        gate.send(IntroEvent::TimelineStarted);
        gate.release();
        assert!(!surface.is_scroll_blocked());
        assert_eq!(surface.total_listener_count(), 0);
    }
}
