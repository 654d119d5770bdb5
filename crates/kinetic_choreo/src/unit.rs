//! Choreography unit states
//!
//! A unit is one group of elements animated together (a section's text
//! block, a card grid). Toggle-controlled units cycle through
//!
//! ```text
//! Hidden -> Armed -> Playing -> Settled -> Reversing -> Hidden
//! ```
//!
//! The state is derived from the unit's [`AnimationStatus`], so there is
//! nothing to keep in sync; the transition table documents which moves are
//! legal and drives the [`StateMachine`] used by tests and tooling.

use kinetic_animation::{AnimationStatus, PlayState};
use kinetic_core::StateTransitions;

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum UnitState {
    /// Initial offset/opacity applied, nothing registered
    Hidden,
    /// Observer registered, waiting for its threshold
    Armed,
    Playing,
    /// Completed, final state held
    Settled,
    /// Playing backward after the trigger was left backward
    Reversing,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum UnitEvent {
    ObserverRegistered,
    ThresholdEntered,
    Completed,
    LeftBackward,
    Rewound,
}

impl StateTransitions for UnitState {
    type Event = UnitEvent;

    fn on_event(&self, event: UnitEvent) -> Option<Self> {
        use UnitEvent::*;
        use UnitState::*;
        match (self, event) {
            (Hidden, ObserverRegistered) => Some(Armed),
            (Hidden | Armed, ThresholdEntered) => Some(Playing),
            (Playing, Completed) => Some(Settled),
            (Playing | Settled, LeftBackward) => Some(Reversing),
            (Reversing, ThresholdEntered) => Some(Playing),
            (Reversing, Rewound) => Some(Armed),
            _ => None,
        }
    }
}

impl UnitState {
    /// Derive the state of a unit from its animation
    pub fn of(status: &AnimationStatus) -> Self {
        let at_start = status.time <= 0.0;
        match status.state {
            PlayState::Playing if status.reversed => UnitState::Reversing,
            PlayState::Playing => UnitState::Playing,
            PlayState::Finished if status.reversed => {
                if status.observed {
                    UnitState::Armed
                } else {
                    UnitState::Hidden
                }
            }
            PlayState::Finished => UnitState::Settled,
            PlayState::Paused if at_start && status.observed => UnitState::Armed,
            PlayState::Paused if at_start => UnitState::Hidden,
            PlayState::Paused if status.progress >= 1.0 => UnitState::Settled,
            PlayState::Paused => UnitState::Playing,
        }
    }

    /// True when the unit's elements show their final values
    pub fn is_visible(&self) -> bool {
        matches!(self, UnitState::Settled)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use kinetic_animation::{AnimationEngine, ScrollTriggerConfig, Tween, TweenVars};
    use kinetic_core::{Rect, StateMachine, Surface, Viewport};

    #[test]
    fn test_toggle_cycle_is_legal() {
        let mut fsm = StateMachine::new(UnitState::Hidden);
        for event in [
            UnitEvent::ObserverRegistered,
            UnitEvent::ThresholdEntered,
            UnitEvent::Completed,
            UnitEvent::LeftBackward,
            UnitEvent::Rewound,
        ] {
            assert!(fsm.send(event), "{:?} rejected", event);
        }
        assert_eq!(fsm.current(), UnitState::Armed);
        assert!(!fsm.send(UnitEvent::Completed));
    }

    #[test]
    fn test_state_follows_observer() {
        let surface = Surface::new(Viewport::new(1000.0, 800.0));
        let block = surface.create_element("div", None);
        surface.set_rect(block, Rect::new(0.0, 1500.0, 1000.0, 400.0));
        let engine = AnimationEngine::new(surface.clone());

        let handle = engine
            .handle()
            .add(
                Tween::from_to(&[block], TweenVars::opacity(0.0), TweenVars::opacity(1.0))
                    .duration(1.0)
                    .scroll_trigger(ScrollTriggerConfig::new(block)),
            )
            .unwrap();
        let state = || UnitState::of(&handle.status().unwrap());
        assert_eq!(state(), UnitState::Armed);

        surface.scroll_to(1000.0);
        engine.advance(0.1);
        assert_eq!(state(), UnitState::Playing);
        engine.advance(1.0);
        assert_eq!(state(), UnitState::Settled);
    }
}
