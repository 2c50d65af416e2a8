//! Wiscreen Model
//!
//! Defines the data contracts shared by the calibration engine and its
//! callers:
//! - **Ratios:** Face-area ratios and the persisted baseline
//! - **Blur:** Blur policies and derived blur states
//! - **Session:** Calibration progress
//! - **Feed:** Per-frame detector records in JSONL
//!
//! All ratios are normalized to `[0.0, 1.0]` relative to the analyzed frame.

pub mod blur;
pub mod feed;
pub mod ratio;
pub mod session;

pub use blur::*;
pub use feed::*;
pub use ratio::*;
pub use session::*;

/// Validation errors raised while constructing model values.
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum ModelError {
    #[error("{name} must be within [0, 1], got {value}")]
    OutOfRange { name: &'static str, value: f64 },

    #[error("Frame has no area: {width}x{height}")]
    EmptyFrame { width: u32, height: u32 },

    #[error("Frame at {timestamp_ms}ms has a face box but no frame size")]
    MissingFrameSize { timestamp_ms: u64 },

    #[error("Invalid blur policy: {message}")]
    InvalidPolicy { message: String },
}

impl ModelError {
    pub fn invalid_policy(msg: impl Into<String>) -> Self {
        Self::InvalidPolicy {
            message: msg.into(),
        }
    }
}
