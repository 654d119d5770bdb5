//! Choreography configuration
//!
//! Tunables shared by every page choreography, read from a `kinetic.toml`
//! file. Every field has a default, so an empty file (or no file) is valid:
//!
//! ```toml
//! reduced_motion = false
//!
//! [breakpoints]
//! mobile_max = 768.0
//! tablet_max = 1024.0
//!
//! [scroll_reveal]
//! start = "top 85%"
//! toggle_actions = "play none none reverse"
//! ```

use std::fs;
use std::path::Path;

use kinetic_animation::{Easing, ScrollPosition, ToggleActions};
use serde::{Deserialize, Serialize};

use crate::error::{ChoreoError, Result};

/// Environment variable naming a config file for [`ChoreoConfig::load_or_default`]
pub const CONFIG_ENV: &str = "KINETIC_CONFIG";

// =============================================================================
// Sections
// =============================================================================

/// Viewport width tiers used by responsive choreographies
#[derive(Debug, Clone, Copy, PartialEq, Deserialize, Serialize)]
pub struct Breakpoints {
    /// Widths below this are mobile
    #[serde(default = "default_mobile_max")]
    pub mobile_max: f32,
    /// Widths below this (and not mobile) are tablet
    #[serde(default = "default_tablet_max")]
    pub tablet_max: f32,
}

fn default_mobile_max() -> f32 {
    768.0
}

fn default_tablet_max() -> f32 {
    1024.0
}

impl Default for Breakpoints {
    fn default() -> Self {
        Self {
            mobile_max: default_mobile_max(),
            tablet_max: default_tablet_max(),
        }
    }
}

/// Viewport width tier
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Tier {
    Mobile,
    Tablet,
    Desktop,
}

impl Breakpoints {
    pub fn tier(&self, width: f32) -> Tier {
        if width < self.mobile_max {
            Tier::Mobile
        } else if width < self.tablet_max {
            Tier::Tablet
        } else {
            Tier::Desktop
        }
    }
}

/// Defaults applied by `create_timeline` and the reveal helpers
#[derive(Debug, Clone, Copy, PartialEq, Deserialize, Serialize)]
pub struct TimingConfig {
    #[serde(default = "default_duration")]
    pub duration: f32,
    #[serde(default = "default_ease")]
    pub ease: Easing,
}

fn default_duration() -> f32 {
    0.8
}

fn default_ease() -> Easing {
    Easing::POWER3_OUT
}

impl Default for TimingConfig {
    fn default() -> Self {
        Self {
            duration: default_duration(),
            ease: default_ease(),
        }
    }
}

/// Defaults for `animate_on_scroll`
#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
pub struct ScrollRevealConfig {
    #[serde(default = "default_reveal_start")]
    pub start: String,
    #[serde(default = "default_toggle_actions")]
    pub toggle_actions: String,
}

fn default_reveal_start() -> String {
    "top 85%".to_string()
}

fn default_toggle_actions() -> String {
    "play none none reverse".to_string()
}

impl Default for ScrollRevealConfig {
    fn default() -> Self {
        Self {
            start: default_reveal_start(),
            toggle_actions: default_toggle_actions(),
        }
    }
}

impl ScrollRevealConfig {
    pub fn start_position(&self) -> Result<ScrollPosition> {
        self.start
            .parse()
            .map_err(|e| ChoreoError::Config(format!("scroll_reveal.start: {}", e)))
    }

    pub fn actions(&self) -> Result<ToggleActions> {
        self.toggle_actions
            .parse()
            .map_err(|e| ChoreoError::Config(format!("scroll_reveal.toggle_actions: {}", e)))
    }
}

/// Pointer-follow effect tuning
#[derive(Debug, Clone, Copy, PartialEq, Deserialize, Serialize)]
pub struct MagneticConfig {
    /// Fraction of the pointer offset from center the element travels
    #[serde(default = "default_strength")]
    pub strength: f32,
    #[serde(default = "default_hover_scale")]
    pub hover_scale: f32,
}

fn default_strength() -> f32 {
    0.3
}

fn default_hover_scale() -> f32 {
    1.1
}

impl Default for MagneticConfig {
    fn default() -> Self {
        Self {
            strength: default_strength(),
            hover_scale: default_hover_scale(),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Deserialize, Serialize)]
pub struct IntroConfig {
    /// Playback rate of intro timelines (2.0 plays twice as fast)
    #[serde(default = "default_time_scale")]
    pub time_scale: f32,
}

fn default_time_scale() -> f32 {
    1.0
}

impl Default for IntroConfig {
    fn default() -> Self {
        Self {
            time_scale: default_time_scale(),
        }
    }
}

// =============================================================================
// ChoreoConfig
// =============================================================================

/// Configuration injected into every choreography
#[derive(Debug, Clone, Default, PartialEq, Deserialize, Serialize)]
pub struct ChoreoConfig {
    /// Jump every choreography to its final state instead of animating
    #[serde(default)]
    pub reduced_motion: bool,
    #[serde(default)]
    pub breakpoints: Breakpoints,
    #[serde(default)]
    pub defaults: TimingConfig,
    #[serde(default)]
    pub scroll_reveal: ScrollRevealConfig,
    #[serde(default)]
    pub magnetic: MagneticConfig,
    #[serde(default)]
    pub intro: IntroConfig,
}

impl ChoreoConfig {
    /// Load and validate a config file
    pub fn load(path: &Path) -> Result<Self> {
        let content = fs::read_to_string(path)
            .map_err(|e| ChoreoError::Config(format!("Failed to read {}: {}", path.display(), e)))?;
        Self::from_toml_str(&content)
            .map_err(|e| ChoreoError::Config(format!("{}: {}", path.display(), e)))
    }

    pub fn from_toml_str(content: &str) -> Result<Self> {
        let config: Self = toml::from_str(content).map_err(|e| ChoreoError::Config(e.to_string()))?;
        config.validate()?;
        Ok(config)
    }

    /// Load from `$KINETIC_CONFIG` when set, defaults otherwise
    pub fn load_or_default() -> Result<Self> {
        match std::env::var_os(CONFIG_ENV) {
            Some(path) => {
                tracing::debug!("config: loading {:?} from ${}", path, CONFIG_ENV);
                Self::load(Path::new(&path))
            }
            None => Ok(Self::default()),
        }
    }

    pub fn to_toml(&self) -> Result<String> {
        toml::to_string_pretty(self).map_err(|e| ChoreoError::Config(e.to_string()))
    }

    /// Reject values the choreographies cannot work with
    pub fn validate(&self) -> Result<()> {
        let bp = &self.breakpoints;
        if !(bp.mobile_max > 0.0 && bp.mobile_max <= bp.tablet_max) {
            return Err(ChoreoError::Config(format!(
                "breakpoints must satisfy 0 < mobile_max <= tablet_max (got {} and {})",
                bp.mobile_max, bp.tablet_max
            )));
        }
        if !(self.intro.time_scale > 0.0) {
            return Err(ChoreoError::Config(format!(
                "intro.time_scale must be positive (got {})",
                self.intro.time_scale
            )));
        }
        if self.defaults.duration < 0.0 {
            return Err(ChoreoError::Config(format!(
                "defaults.duration must not be negative (got {})",
                self.defaults.duration
            )));
        }
        self.scroll_reveal.start_position()?;
        self.scroll_reveal.actions()?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use kinetic_animation::{Anchor, ToggleAction};

    #[test]
    fn test_empty_file_uses_defaults() {
        let config = ChoreoConfig::from_toml_str("").unwrap();
        assert_eq!(config, ChoreoConfig::default());
        assert_eq!(config.breakpoints.mobile_max, 768.0);
        assert_eq!(config.magnetic.strength, 0.3);
        assert_eq!(config.magnetic.hover_scale, 1.1);
        assert!(!config.reduced_motion);
    }

    #[test]
    fn test_partial_sections() {
        let config = ChoreoConfig::from_toml_str(
            r#"
            reduced_motion = true

            [breakpoints]
            tablet_max = 1200.0

            [defaults]
            ease = "back.out(1.7)"
            "#,
        )
        .unwrap();
        assert!(config.reduced_motion);
        assert_eq!(config.breakpoints.mobile_max, 768.0);
        assert_eq!(config.breakpoints.tablet_max, 1200.0);
        assert_eq!(config.defaults.duration, 0.8);
        assert_eq!(config.defaults.ease.to_string(), "back.out(1.7)");
    }

    #[test]
    fn test_reveal_defaults_parse() {
        let config = ChoreoConfig::default();
        assert_eq!(
            config.scroll_reveal.start_position().unwrap(),
            ScrollPosition::edge(Anchor::Top, Anchor::Percent(85.0))
        );
        let actions = config.scroll_reveal.actions().unwrap();
        assert_eq!(actions.on_enter, ToggleAction::Play);
        assert_eq!(actions.on_leave_back, ToggleAction::Reverse);
    }

    #[test]
    fn test_invalid_values_rejected() {
        assert!(ChoreoConfig::from_toml_str("[scroll_reveal]\nstart = \"middle of nowhere\"").is_err());
        assert!(ChoreoConfig::from_toml_str("[intro]\ntime_scale = 0.0").is_err());
        assert!(ChoreoConfig::from_toml_str(
            "[breakpoints]\nmobile_max = 900.0\ntablet_max = 800.0"
        )
        .is_err());
        assert!(ChoreoConfig::from_toml_str("[defaults]\nease = \"wobble.out\"").is_err());
    }

    #[test]
    fn test_toml_round_trip() {
        let mut config = ChoreoConfig::default();
        config.intro.time_scale = 1.5;
        let text = config.to_toml().unwrap();
        assert_eq!(ChoreoConfig::from_toml_str(&text).unwrap(), config);
    }

    #[test]
    fn test_tiers() {
        let bp = Breakpoints::default();
        assert_eq!(bp.tier(500.0), Tier::Mobile);
        assert_eq!(bp.tier(767.0), Tier::Mobile);
        assert_eq!(bp.tier(768.0), Tier::Tablet);
        assert_eq!(bp.tier(1023.0), Tier::Tablet);
        assert_eq!(bp.tier(1280.0), Tier::Desktop);
    }
}
