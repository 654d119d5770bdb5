//! Easing curves
//!
//! Each family is defined by its "in" curve; `Out` and `InOut` are derived
//! from it the same way for every family. Names follow the GSAP vocabulary
//! so configuration files can say `"power3.out"` or `"back.out(1.7)"`.
//!
//! ```rust
//! use kinetic_animation::Easing;
//!
//! let ease: Easing = "power2.inOut".parse().unwrap();
//! assert_eq!(ease.apply(0.0), 0.0);
//! assert_eq!(ease.apply(1.0), 1.0);
//! assert_eq!(ease.to_string(), "power2.inOut");
//! ```

use std::f32::consts::{FRAC_PI_2, TAU};
use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::error::AnimationError;

/// Which end of the curve is eased
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum EaseDirection {
    In,
    Out,
    InOut,
}

impl EaseDirection {
    fn suffix(&self) -> &'static str {
        match self {
            EaseDirection::In => "in",
            EaseDirection::Out => "out",
            EaseDirection::InOut => "inOut",
        }
    }
}

/// An easing curve mapping linear progress (0..1) to eased progress
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub enum Easing {
    Linear,
    /// `power1` (quad) through `power4` (quint)
    Power(u8, EaseDirection),
    Sine(EaseDirection),
    Expo(EaseDirection),
    Circ(EaseDirection),
    /// Overshoot amount (GSAP default 1.70158)
    Back(EaseDirection, f32),
    /// Amplitude and period
    Elastic(EaseDirection, f32, f32),
    Bounce(EaseDirection),
    CubicBezier(f32, f32, f32, f32),
}

impl Default for Easing {
    fn default() -> Self {
        Easing::POWER1_OUT
    }
}

impl Easing {
    pub const LINEAR: Easing = Easing::Linear;
    pub const POWER1_OUT: Easing = Easing::Power(1, EaseDirection::Out);
    pub const POWER2_OUT: Easing = Easing::Power(2, EaseDirection::Out);
    pub const POWER2_IN_OUT: Easing = Easing::Power(2, EaseDirection::InOut);
    pub const POWER3_OUT: Easing = Easing::Power(3, EaseDirection::Out);
    pub const POWER3_IN_OUT: Easing = Easing::Power(3, EaseDirection::InOut);
    pub const POWER4_OUT: Easing = Easing::Power(4, EaseDirection::Out);
    pub const POWER4_IN_OUT: Easing = Easing::Power(4, EaseDirection::InOut);
    pub const SINE_IN_OUT: Easing = Easing::Sine(EaseDirection::InOut);
    pub const EXPO_OUT: Easing = Easing::Expo(EaseDirection::Out);
    pub const EXPO_IN_OUT: Easing = Easing::Expo(EaseDirection::InOut);
    pub const CIRC_OUT: Easing = Easing::Circ(EaseDirection::Out);
    pub const BACK_OUT: Easing = Easing::Back(EaseDirection::Out, 1.7);
    pub const ELASTIC_OUT: Easing = Easing::Elastic(EaseDirection::Out, 1.0, 0.3);
    pub const BOUNCE_OUT: Easing = Easing::Bounce(EaseDirection::Out);

    /// Evaluate the curve; input is clamped to 0..1
    pub fn apply(&self, t: f32) -> f32 {
        let t = t.clamp(0.0, 1.0);
        if t == 0.0 || t == 1.0 {
            return t;
        }

        match *self {
            Easing::Linear => t,
            Easing::CubicBezier(x1, y1, x2, y2) => cubic_bezier(x1, y1, x2, y2, t),
            Easing::Power(power, direction) => {
                directed(direction, t, |t| t.powi(power.clamp(1, 4) as i32 + 1))
            }
            Easing::Sine(direction) => directed(direction, t, |t| 1.0 - (t * FRAC_PI_2).cos()),
            Easing::Expo(direction) => directed(direction, t, |t| {
                if t == 0.0 {
                    0.0
                } else {
                    2f32.powf(10.0 * (t - 1.0))
                }
            }),
            Easing::Circ(direction) => {
                directed(direction, t, |t| 1.0 - (1.0 - t * t).max(0.0).sqrt())
            }
            Easing::Back(direction, overshoot) => {
                directed(direction, t, |t| t * t * ((overshoot + 1.0) * t - overshoot))
            }
            Easing::Elastic(direction, amplitude, period) => {
                directed(direction, t, |t| 1.0 - elastic_out(1.0 - t, amplitude, period))
            }
            Easing::Bounce(direction) => directed(direction, t, |t| 1.0 - bounce_out(1.0 - t)),
        }
    }
}

/// Derive the requested direction from an ease-in curve
fn directed<F>(direction: EaseDirection, t: f32, ease_in: F) -> f32
where
    F: Fn(f32) -> f32,
{
    match direction {
        EaseDirection::In => ease_in(t),
        EaseDirection::Out => 1.0 - ease_in(1.0 - t),
        EaseDirection::InOut => {
            if t < 0.5 {
                ease_in(t * 2.0) / 2.0
            } else {
                1.0 - ease_in((1.0 - t) * 2.0) / 2.0
            }
        }
    }
}

fn elastic_out(t: f32, amplitude: f32, period: f32) -> f32 {
    if t <= 0.0 {
        return 0.0;
    }
    if t >= 1.0 {
        return 1.0;
    }
    let amplitude = amplitude.max(1.0);
    let period = if period > 0.0 { period } else { 0.3 };
    let shift = period / TAU * (1.0 / amplitude).asin();
    amplitude * 2f32.powf(-10.0 * t) * ((t - shift) * TAU / period).sin() + 1.0
}

fn bounce_out(t: f32) -> f32 {
    const N: f32 = 7.5625;
    const D: f32 = 2.75;
    if t < 1.0 / D {
        N * t * t
    } else if t < 2.0 / D {
        let t = t - 1.5 / D;
        N * t * t + 0.75
    } else if t < 2.5 / D {
        let t = t - 2.25 / D;
        N * t * t + 0.9375
    } else {
        let t = t - 2.625 / D;
        N * t * t + 0.984375
    }
}

/// Solve x(t) = progress with Newton-Raphson, then evaluate y(t)
fn cubic_bezier(x1: f32, y1: f32, x2: f32, y2: f32, progress: f32) -> f32 {
    let bezier = |a: f32, b: f32, t: f32| {
        let mt = 1.0 - t;
        3.0 * mt * mt * t * a + 3.0 * mt * t * t * b + t * t * t
    };
    let derivative = |a: f32, b: f32, t: f32| {
        let mt = 1.0 - t;
        3.0 * mt * mt * a + 6.0 * mt * t * (b - a) + 3.0 * t * t * (1.0 - b)
    };

    let mut t = progress;
    for _ in 0..8 {
        let x = bezier(x1, x2, t) - progress;
        if x.abs() < 1e-6 {
            break;
        }
        let dx = derivative(x1, x2, t);
        if dx.abs() < 1e-6 {
            break;
        }
        t = (t - x / dx).clamp(0.0, 1.0);
    }
    bezier(y1, y2, t)
}

// ============================================================================
// Names
// ============================================================================

impl fmt::Display for Easing {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Easing::Linear => write!(f, "none"),
            Easing::Power(n, d) => write!(f, "power{}.{}", n, d.suffix()),
            Easing::Sine(d) => write!(f, "sine.{}", d.suffix()),
            Easing::Expo(d) => write!(f, "expo.{}", d.suffix()),
            Easing::Circ(d) => write!(f, "circ.{}", d.suffix()),
            Easing::Back(d, s) => write!(f, "back.{}({})", d.suffix(), s),
            Easing::Elastic(d, a, p) => write!(f, "elastic.{}({}, {})", d.suffix(), a, p),
            Easing::Bounce(d) => write!(f, "bounce.{}", d.suffix()),
            Easing::CubicBezier(a, b, c, d) => write!(f, "cubic-bezier({}, {}, {}, {})", a, b, c, d),
        }
    }
}

fn parse_args(raw: &str, args: &str) -> Result<Vec<f32>, AnimationError> {
    args.split(',')
        .map(|a| a.trim())
        .filter(|a| !a.is_empty())
        .map(|a| {
            a.parse::<f32>()
                .map_err(|_| AnimationError::InvalidEasing(raw.to_string()))
        })
        .collect()
}

impl FromStr for Easing {
    type Err = AnimationError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let raw = s.trim();
        let invalid = || AnimationError::InvalidEasing(raw.to_string());

        let (head, args) = match raw.find('(') {
            Some(open) => {
                let close = raw.rfind(')').filter(|c| *c > open).ok_or_else(invalid)?;
                (&raw[..open], parse_args(raw, &raw[open + 1..close])?)
            }
            None => (raw, Vec::new()),
        };

        if head == "cubic-bezier" {
            return match args.as_slice() {
                [x1, y1, x2, y2] if (0.0..=1.0).contains(x1) && (0.0..=1.0).contains(x2) => {
                    Ok(Easing::CubicBezier(*x1, *y1, *x2, *y2))
                }
                _ => Err(invalid()),
            };
        }

        let (family, direction) = match head.split_once('.') {
            Some((family, direction)) => (family, direction),
            // GSAP treats a bare family name as ".out"
            None => (head, "out"),
        };
        let direction = match direction {
            "in" => EaseDirection::In,
            "out" => EaseDirection::Out,
            "inOut" | "inout" => EaseDirection::InOut,
            _ => return Err(invalid()),
        };

        let easing = match family {
            "none" | "linear" => Easing::Linear,
            "power0" => Easing::Linear,
            "power1" | "quad" => Easing::Power(1, direction),
            "power2" | "cubic" => Easing::Power(2, direction),
            "power3" | "quart" => Easing::Power(3, direction),
            "power4" | "quint" | "strong" => Easing::Power(4, direction),
            "sine" => Easing::Sine(direction),
            "expo" => Easing::Expo(direction),
            "circ" => Easing::Circ(direction),
            "bounce" => Easing::Bounce(direction),
            "back" => Easing::Back(direction, args.first().copied().unwrap_or(1.70158)),
            "elastic" => Easing::Elastic(
                direction,
                args.first().copied().unwrap_or(1.0),
                args.get(1).copied().unwrap_or(0.3),
            ),
            _ => return Err(invalid()),
        };
        Ok(easing)
    }
}

impl TryFrom<String> for Easing {
    type Error = AnimationError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        value.parse()
    }
}

impl From<Easing> for String {
    fn from(easing: Easing) -> Self {
        easing.to_string()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const ALL: [Easing; 12] = [
        Easing::LINEAR,
        Easing::POWER1_OUT,
        Easing::POWER2_IN_OUT,
        Easing::POWER3_OUT,
        Easing::POWER4_OUT,
        Easing::SINE_IN_OUT,
        Easing::EXPO_OUT,
        Easing::CIRC_OUT,
        Easing::BACK_OUT,
        Easing::ELASTIC_OUT,
        Easing::BOUNCE_OUT,
        Easing::CubicBezier(0.25, 0.1, 0.25, 1.0),
    ];

    #[test]
    fn test_endpoints_are_exact() {
        for easing in ALL {
            assert_eq!(easing.apply(0.0), 0.0, "{easing}");
            assert_eq!(easing.apply(1.0), 1.0, "{easing}");
            assert_eq!(easing.apply(-3.0), 0.0, "{easing}");
            assert_eq!(easing.apply(7.0), 1.0, "{easing}");
        }
    }

    #[test]
    fn test_power_curves() {
        assert!((Easing::Power(2, EaseDirection::In).apply(0.5) - 0.125).abs() < 1e-6);
        assert!((Easing::POWER2_OUT.apply(0.5) - 0.875).abs() < 1e-6);
        assert!((Easing::POWER2_IN_OUT.apply(0.5) - 0.5).abs() < 1e-6);
        // Out curves lead linear progress
        assert!(Easing::POWER3_OUT.apply(0.3) > 0.3);
    }

    #[test]
    fn test_back_overshoots() {
        let peak = (1..100)
            .map(|i| Easing::BACK_OUT.apply(i as f32 / 100.0))
            .fold(0.0, f32::max);
        assert!(peak > 1.0);
    }

    #[test]
    fn test_parse_names() {
        assert_eq!("power3.out".parse::<Easing>(), Ok(Easing::POWER3_OUT));
        assert_eq!("power3".parse::<Easing>(), Ok(Easing::POWER3_OUT));
        assert_eq!("none".parse::<Easing>(), Ok(Easing::LINEAR));
        assert_eq!(
            "back.out(1.7)".parse::<Easing>(),
            Ok(Easing::Back(EaseDirection::Out, 1.7))
        );
        assert_eq!(
            "elastic.out(1, 0.3)".parse::<Easing>(),
            Ok(Easing::ELASTIC_OUT)
        );
        assert!("power3.sideways".parse::<Easing>().is_err());
        assert!("wobble.out".parse::<Easing>().is_err());
        assert!("back.out(1.7".parse::<Easing>().is_err());
        assert!("cubic-bezier(2, 0, 0, 1)".parse::<Easing>().is_err());
    }

    #[test]
    fn test_display_round_trips_through_parse() {
        for easing in ALL {
            let name = easing.to_string();
            assert_eq!(name.parse::<Easing>(), Ok(easing), "{name}");
        }
    }
}
