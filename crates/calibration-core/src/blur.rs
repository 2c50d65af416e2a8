//! Face-ratio to blur mapping.
//!
//! The closer the face gets to the screen, the larger its share of the
//! frame. Enhancement measures how far the live ratio has moved from the
//! calibrated baseline toward the saturation ratio:
//!
//! ```text
//! enhancement = clamp((ratio - baseline) / (max_ratio - baseline), 0, 1)
//! radius      = enhancement * radius_max
//! alpha       = clamp(enhancement * alpha_scale, 0, alpha_max)
//! ```

use wiscreen_model::{BaselineRatio, BlurPolicy, BlurState, FaceRatio};

use crate::error::{CoreError, CoreResult};

/// Normalized enhancement in `[0, 1]`.
///
/// When `max_ratio <= baseline` the scale is degenerate; any ratio at or past
/// the baseline saturates to 1.0 and anything below it maps to 0.0.
pub fn enhancement(ratio: f64, baseline: f64, max_ratio: f64) -> f64 {
    let span = max_ratio - baseline;
    if span <= 0.0 {
        return if ratio >= baseline { 1.0 } else { 0.0 };
    }
    ((ratio - baseline) / span).clamp(0.0, 1.0)
}

/// Maps face ratios to blur states under a fixed [`BlurPolicy`].
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct BlurMapper {
    policy: BlurPolicy,
}

impl BlurMapper {
    pub fn new(policy: BlurPolicy) -> CoreResult<Self> {
        policy.validate()?;
        Ok(Self { policy })
    }

    pub fn policy(&self) -> &BlurPolicy {
        &self.policy
    }

    /// Blur for a validated ratio and baseline, saturating at the policy's
    /// `max_ratio`.
    pub fn map(&self, ratio: FaceRatio, baseline: BaselineRatio) -> BlurState {
        self.state_for(enhancement(
            ratio.value(),
            baseline.value(),
            self.policy.max_ratio,
        ))
    }

    /// Blur for raw values, saturating at the policy's `max_ratio`.
    pub fn compute_blur(&self, ratio: f64, baseline: f64) -> CoreResult<BlurState> {
        self.compute_blur_with_max(ratio, baseline, self.policy.max_ratio)
    }

    /// Blur for raw values with an explicit saturation ratio.
    pub fn compute_blur_with_max(
        &self,
        ratio: f64,
        baseline: f64,
        max_ratio: f64,
    ) -> CoreResult<BlurState> {
        let ratio = FaceRatio::new(ratio)?;
        let baseline = BaselineRatio::new(baseline)?;
        if !max_ratio.is_finite() {
            return Err(CoreError::InvalidInput {
                name: "max ratio",
                value: max_ratio,
            });
        }
        Ok(self.state_for(enhancement(ratio.value(), baseline.value(), max_ratio)))
    }

    fn state_for(&self, enhancement: f64) -> BlurState {
        let radius = enhancement * self.policy.radius_max;
        let alpha =
            (enhancement * self.policy.alpha_scale).clamp(0.0, self.policy.alpha_max as f64);
        let state = BlurState {
            enhancement,
            radius,
            alpha: alpha as u8,
        };
        tracing::trace!(enhancement, radius, alpha = state.alpha, "Mapped blur state");
        state
    }
}

impl Default for BlurMapper {
    fn default() -> Self {
        Self {
            policy: BlurPolicy::default(),
        }
    }
}
