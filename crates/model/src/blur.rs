//! Blur mapping configuration and derived blur state.

use serde::{Deserialize, Serialize};

use crate::ModelError;

/// Ceilings and scales for mapping enhancement to a blur effect.
///
/// Two renderer families are supported: an absolute window blur-behind
/// radius (ceiling 150) and a render-effect radius (ceiling 25). Pick one
/// per deployment.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct BlurPolicy {
    /// Face ratio at which enhancement saturates at 1.0.
    ///
    /// `1.0` reproduces the "normalize by `1 - baseline`" mapping.
    pub max_ratio: f64,

    /// Blur radius at full enhancement.
    pub radius_max: f64,

    /// Overlay alpha per unit of enhancement.
    pub alpha_scale: f64,

    /// Upper bound on the overlay alpha channel.
    pub alpha_max: u8,
}

impl BlurPolicy {
    pub const DEFAULT_MAX_RATIO: f64 = 0.7;

    /// Window blur-behind variant.
    pub fn blur_behind() -> Self {
        Self {
            max_ratio: Self::DEFAULT_MAX_RATIO,
            radius_max: 150.0,
            alpha_scale: 80.0,
            alpha_max: 80,
        }
    }

    /// Render-effect variant with a small radius ceiling.
    pub fn render_effect() -> Self {
        Self {
            max_ratio: Self::DEFAULT_MAX_RATIO,
            radius_max: 25.0,
            alpha_scale: 60.0,
            alpha_max: 60,
        }
    }

    /// Same policy with a different saturation ratio.
    pub fn with_max_ratio(self, max_ratio: f64) -> Self {
        Self { max_ratio, ..self }
    }

    pub fn validate(&self) -> Result<(), ModelError> {
        if !self.max_ratio.is_finite() || self.max_ratio <= 0.0 || self.max_ratio > 1.0 {
            return Err(ModelError::invalid_policy(format!(
                "max_ratio must be in (0, 1], got {}",
                self.max_ratio
            )));
        }
        if !self.radius_max.is_finite() || self.radius_max < 0.0 {
            return Err(ModelError::invalid_policy(format!(
                "radius_max must be a non-negative number, got {}",
                self.radius_max
            )));
        }
        if !self.alpha_scale.is_finite() || self.alpha_scale < 0.0 {
            return Err(ModelError::invalid_policy(format!(
                "alpha_scale must be a non-negative number, got {}",
                self.alpha_scale
            )));
        }
        Ok(())
    }
}

impl Default for BlurPolicy {
    fn default() -> Self {
        Self::blur_behind()
    }
}

/// Named policy presets, selectable from configuration or the command line.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum BlurPreset {
    BlurBehind,
    RenderEffect,
}

impl BlurPreset {
    pub fn policy(self) -> BlurPolicy {
        match self {
            BlurPreset::BlurBehind => BlurPolicy::blur_behind(),
            BlurPreset::RenderEffect => BlurPolicy::render_effect(),
        }
    }
}

impl std::str::FromStr for BlurPreset {
    type Err = ModelError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "blur-behind" => Ok(BlurPreset::BlurBehind),
            "render-effect" => Ok(BlurPreset::RenderEffect),
            other => Err(ModelError::invalid_policy(format!(
                "unknown preset '{other}' (expected blur-behind or render-effect)"
            ))),
        }
    }
}

/// Blur effect derived from one face-ratio sample. Never persisted.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct BlurState {
    /// Normalized distance past the baseline, in `[0, 1]`.
    pub enhancement: f64,
    /// Blur radius in `[0, radius_max]`.
    pub radius: f64,
    /// Overlay alpha in `[0, alpha_max]`.
    pub alpha: u8,
}

impl BlurState {
    /// No blur, fully transparent overlay.
    pub const CLEARED: BlurState = BlurState {
        enhancement: 0.0,
        radius: 0.0,
        alpha: 0,
    };

    pub fn cleared() -> Self {
        Self::CLEARED
    }

    pub fn is_cleared(&self) -> bool {
        self.radius == 0.0 && self.alpha == 0
    }

    /// Integer radius for window APIs that only take whole pixels.
    pub fn radius_px(&self, policy: &BlurPolicy) -> u32 {
        self.radius.clamp(0.0, policy.radius_max) as u32
    }
}

impl Default for BlurState {
    fn default() -> Self {
        Self::CLEARED
    }
}
