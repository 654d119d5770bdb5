//! Explicit state machines
//!
//! States are plain `Copy` enums that map events to transitions:
//!
//! ```rust
//! use kinetic_core::fsm::{StateMachine, StateTransitions};
//!
//! #[derive(Clone, Copy, Debug, PartialEq, Eq)]
//! enum Door {
//!     Closed,
//!     Open,
//! }
//!
//! impl StateTransitions for Door {
//!     type Event = &'static str;
//!
//!     fn on_event(&self, event: &'static str) -> Option<Self> {
//!         match (self, event) {
//!             (Door::Closed, "open") => Some(Door::Open),
//!             (Door::Open, "close") => Some(Door::Closed),
//!             _ => None,
//!         }
//!     }
//! }
//!
//! let mut door = StateMachine::new(Door::Closed);
//! assert!(door.send("open"));
//! assert!(!door.send("open"));
//! assert_eq!(door.current(), Door::Open);
//! ```

use std::fmt::Debug;

/// Maps events to state transitions
///
/// Returning `None` means the event is ignored in the current state.
pub trait StateTransitions: Copy + Debug + PartialEq {
    type Event: Copy + Debug;

    fn on_event(&self, event: Self::Event) -> Option<Self>;
}

/// Holds the current state of a [`StateTransitions`] type
#[derive(Clone, Debug)]
pub struct StateMachine<S: StateTransitions> {
    current: S,
    transitions: u32,
}

impl<S: StateTransitions> StateMachine<S> {
    pub fn new(initial: S) -> Self {
        Self {
            current: initial,
            transitions: 0,
        }
    }

    pub fn current(&self) -> S {
        self.current
    }

    /// Number of transitions taken since creation
    pub fn transitions(&self) -> u32 {
        self.transitions
    }

    /// Feed an event; returns true if the state changed
    pub fn send(&mut self, event: S::Event) -> bool {
        match self.current.on_event(event) {
            Some(next) if next != self.current => {
                tracing::trace!("fsm: {:?} --{:?}--> {:?}", self.current, event, next);
                self.current = next;
                self.transitions += 1;
                true
            }
            _ => false,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[derive(Clone, Copy, Debug, PartialEq, Eq)]
    enum Light {
        Off,
        On,
    }

    impl StateTransitions for Light {
        type Event = bool;

        fn on_event(&self, event: bool) -> Option<Self> {
            match (self, event) {
                (Light::Off, true) => Some(Light::On),
                (Light::On, false) => Some(Light::Off),
                _ => None,
            }
        }
    }

    #[test]
    fn test_ignored_events_do_not_count() {
        let mut fsm = StateMachine::new(Light::Off);
        assert!(!fsm.send(false));
        assert!(fsm.send(true));
        assert!(!fsm.send(true));
        assert!(fsm.send(false));
        assert_eq!(fsm.current(), Light::Off);
        assert_eq!(fsm.transitions(), 2);
    }
}
