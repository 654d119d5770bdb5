//! Animatable values
//!
//! [`TweenVars`] is the property bag handed to tweens: one optional value per
//! [`Property`]. Only the properties that are `Some` are animated.

use kinetic_core::Property;
use serde::{Deserialize, Serialize};
use smallvec::SmallVec;

/// Trait for values that can be linearly interpolated
pub trait Interpolate: Clone {
    /// Linearly interpolate between self and other by factor t (0.0 to 1.0)
    fn lerp(&self, other: &Self, t: f32) -> Self;

    /// Check if two values are approximately equal
    fn approx_eq(&self, other: &Self, epsilon: f32) -> bool;
}

impl Interpolate for f32 {
    fn lerp(&self, other: &Self, t: f32) -> Self {
        self + (other - self) * t
    }

    fn approx_eq(&self, other: &Self, epsilon: f32) -> bool {
        (self - other).abs() < epsilon
    }
}

// ============================================================================
// TweenVars
// ============================================================================

/// Property values for one end of a tween
#[derive(Clone, Copy, Debug, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct TweenVars {
    pub opacity: Option<f32>,
    pub x: Option<f32>,
    pub y: Option<f32>,
    pub scale: Option<f32>,
    pub rotation: Option<f32>,
    pub rotation_x: Option<f32>,
    pub height: Option<f32>,
}

impl TweenVars {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn opacity(value: f32) -> Self {
        Self::new().with_opacity(value)
    }

    pub fn x(value: f32) -> Self {
        Self::new().with_x(value)
    }

    pub fn y(value: f32) -> Self {
        Self::new().with_y(value)
    }

    pub fn scale(value: f32) -> Self {
        Self::new().with_scale(value)
    }

    pub fn rotation(value: f32) -> Self {
        Self::new().with_rotation(value)
    }

    pub fn height(value: f32) -> Self {
        Self::new().with_height(value)
    }

    pub fn with_opacity(mut self, value: f32) -> Self {
        self.opacity = Some(value);
        self
    }

    pub fn with_x(mut self, value: f32) -> Self {
        self.x = Some(value);
        self
    }

    pub fn with_y(mut self, value: f32) -> Self {
        self.y = Some(value);
        self
    }

    pub fn with_scale(mut self, value: f32) -> Self {
        self.scale = Some(value);
        self
    }

    pub fn with_rotation(mut self, value: f32) -> Self {
        self.rotation = Some(value);
        self
    }

    pub fn with_rotation_x(mut self, value: f32) -> Self {
        self.rotation_x = Some(value);
        self
    }

    pub fn with_height(mut self, value: f32) -> Self {
        self.height = Some(value);
        self
    }

    pub fn get(&self, property: Property) -> Option<f32> {
        match property {
            Property::Opacity => self.opacity,
            Property::X => self.x,
            Property::Y => self.y,
            Property::Scale => self.scale,
            Property::Rotation => self.rotation,
            Property::RotationX => self.rotation_x,
            Property::Height => self.height,
        }
    }

    pub fn set(&mut self, property: Property, value: Option<f32>) {
        let slot = match property {
            Property::Opacity => &mut self.opacity,
            Property::X => &mut self.x,
            Property::Y => &mut self.y,
            Property::Scale => &mut self.scale,
            Property::Rotation => &mut self.rotation,
            Property::RotationX => &mut self.rotation_x,
            Property::Height => &mut self.height,
        };
        *slot = value;
    }

    /// Properties that carry a value, in [`Property::ALL`] order
    pub fn properties(&self) -> SmallVec<[Property; 7]> {
        Property::ALL
            .iter()
            .copied()
            .filter(|p| self.get(*p).is_some())
            .collect()
    }

    pub fn is_empty(&self) -> bool {
        self.properties().is_empty()
    }

    /// Values from `other` win where both are set
    pub fn merge(mut self, other: &TweenVars) -> Self {
        for property in Property::ALL {
            if let Some(value) = other.get(property) {
                self.set(property, Some(value));
            }
        }
        self
    }
}
