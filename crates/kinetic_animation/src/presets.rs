//! Animation presets
//!
//! Named easings and reusable motion parameters, so choreographies do not
//! repeat magic numbers.

use kinetic_core::ElementId;
use serde::{Deserialize, Serialize};

use crate::easing::{EaseDirection, Easing};
use crate::tween::Tween;
use crate::values::TweenVars;

/// Named easing presets
pub struct Eases;

impl Eases {
    /// `power3.out`: the default for reveals
    pub const SMOOTH: Easing = Easing::POWER3_OUT;
    pub const SMOOTH_IN_OUT: Easing = Easing::POWER3_IN_OUT;
    /// `back.out(1.7)`
    pub const BOUNCE: Easing = Easing::Back(EaseDirection::Out, 1.7);
    /// `elastic.out(1, 0.3)`
    pub const ELASTIC: Easing = Easing::ELASTIC_OUT;
    pub const SHARP: Easing = Easing::EXPO_OUT;
    pub const GENTLE: Easing = Easing::SINE_IN_OUT;
    pub const STRONG: Easing = Easing::POWER4_OUT;
    pub const LINEAR: Easing = Easing::LINEAR;

    /// Look up a preset by name (`"smooth"`, `"bounce"`, ...)
    pub fn by_name(name: &str) -> Option<Easing> {
        Some(match name {
            "smooth" => Self::SMOOTH,
            "smoothInOut" => Self::SMOOTH_IN_OUT,
            "bounce" => Self::BOUNCE,
            "elastic" => Self::ELASTIC,
            "sharp" => Self::SHARP,
            "gentle" => Self::GENTLE,
            "strong" => Self::STRONG,
            "linear" => Self::LINEAR,
            _ => return None,
        })
    }
}

/// Reusable tween parameters
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct MotionPreset {
    /// Start values; empty means "from the current values"
    pub from: TweenVars,
    pub to: TweenVars,
    pub duration: f32,
    pub ease: Easing,
    /// Seconds between targets
    pub stagger: f32,
}

impl Default for MotionPreset {
    fn default() -> Self {
        Self {
            from: TweenVars::default(),
            to: TweenVars::default(),
            duration: 0.5,
            ease: Easing::default(),
            stagger: 0.0,
        }
    }
}

impl MotionPreset {
    /// Build a tween applying this preset to `targets`
    pub fn tween(&self, targets: &[ElementId]) -> Tween {
        let tween = if self.from.is_empty() {
            Tween::to(targets, self.to)
        } else {
            Tween::from_to(targets, self.from, self.to)
        };
        tween
            .duration(self.duration)
            .ease(self.ease)
            .stagger(self.stagger)
    }
}

/// The preset vocabulary injected into choreographies
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Presets {
    pub entrance: MotionPreset,
    pub hover: MotionPreset,
    pub stagger: MotionPreset,
    pub parallax: MotionPreset,
}

impl Default for Presets {
    fn default() -> Self {
        Self {
            entrance: MotionPreset {
                from: TweenVars::opacity(0.0).with_y(60.0),
                to: TweenVars::opacity(1.0).with_y(0.0),
                duration: 1.0,
                ease: Eases::SMOOTH,
                stagger: 0.0,
            },
            hover: MotionPreset {
                from: TweenVars::default(),
                to: TweenVars::scale(1.05).with_y(-5.0),
                duration: 0.3,
                ease: Easing::POWER2_OUT,
                stagger: 0.0,
            },
            stagger: MotionPreset {
                from: TweenVars::opacity(0.0).with_y(60.0).with_rotation_x(-15.0),
                to: TweenVars::opacity(1.0).with_y(0.0).with_rotation_x(0.0),
                duration: 0.8,
                ease: Eases::SMOOTH,
                stagger: 0.1,
            },
            parallax: MotionPreset {
                from: TweenVars::y(0.0),
                to: TweenVars::y(-100.0),
                duration: 1.0,
                ease: Eases::LINEAR,
                stagger: 0.0,
            },
        }
    }
}

/// Pre-built tweens for common entry/exit animations
pub struct AnimationPreset;

impl AnimationPreset {
    // ========================================================================
    // Fade animations
    // ========================================================================

    pub fn fade_in(targets: &[ElementId], duration: f32) -> Tween {
        Tween::from_to(targets, TweenVars::opacity(0.0), TweenVars::opacity(1.0))
            .duration(duration)
            .ease(Easing::POWER2_OUT)
    }

    pub fn fade_out(targets: &[ElementId], duration: f32) -> Tween {
        Tween::to(targets, TweenVars::opacity(0.0))
            .duration(duration)
            .ease(Easing::Power(2, EaseDirection::In))
    }

    // ========================================================================
    // Scale animations
    // ========================================================================

    pub fn scale_in(targets: &[ElementId], duration: f32) -> Tween {
        Tween::from_to(
            targets,
            TweenVars::scale(0.8).with_opacity(0.0),
            TweenVars::scale(1.0).with_opacity(1.0),
        )
        .duration(duration)
        .ease(Eases::SMOOTH)
    }

    /// Scale in with overshoot
    pub fn pop_in(targets: &[ElementId], duration: f32) -> Tween {
        Tween::from_to(
            targets,
            TweenVars::scale(0.0).with_opacity(0.0),
            TweenVars::scale(1.0).with_opacity(1.0),
        )
        .duration(duration)
        .ease(Eases::BOUNCE)
    }

    // ========================================================================
    // Slide animations
    // ========================================================================

    pub fn slide_in_left(targets: &[ElementId], distance: f32, duration: f32) -> Tween {
        Tween::from_to(
            targets,
            TweenVars::x(-distance).with_opacity(0.0),
            TweenVars::x(0.0).with_opacity(1.0),
        )
        .duration(duration)
        .ease(Eases::SMOOTH)
    }

    pub fn slide_up(targets: &[ElementId], distance: f32, duration: f32) -> Tween {
        Tween::from_to(
            targets,
            TweenVars::y(distance).with_opacity(0.0),
            TweenVars::y(0.0).with_opacity(1.0),
        )
        .duration(duration)
        .ease(Eases::SMOOTH)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::tween::TweenKind;

    #[test]
    fn test_ease_names() {
        assert_eq!(Eases::by_name("bounce"), Some("back.out(1.7)".parse().unwrap()));
        assert_eq!(Eases::by_name("smooth"), Some(Easing::POWER3_OUT));
        assert_eq!(Eases::by_name("wobbly"), None);
    }

    #[test]
    fn test_hover_preset_is_a_to_tween() {
        let presets = Presets::default();
        let tween = presets.hover.tween(&[]);
        assert_eq!(tween.kind(), TweenKind::To);
        assert_eq!(presets.entrance.tween(&[]).kind(), TweenKind::FromTo);
    }

    #[test]
    fn test_stagger_preset_spreads_targets() {
        let surface = kinetic_core::Surface::new(kinetic_core::Viewport::new(800.0, 600.0));
        let items: Vec<_> = (0..5).map(|_| surface.create_element("li", None)).collect();
        let tween = Presets::default().stagger.tween(&items);
        assert!((tween.total_duration() - 1.2).abs() < 1e-5);
    }
}
