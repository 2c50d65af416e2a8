//! Wiscreen Calibration Core
//!
//! Turns a stream of face-area ratios into an eye-protection blur:
//! - **Calibration:** Average three reference samples into a baseline
//! - **Blur mapping:** Map the live ratio against the baseline to a blur
//!   radius and overlay alpha
//! - **Eye guard:** Lifecycle controller combining both with the eye-mode
//!   toggle and a persisted baseline
//!
//! This crate is pure computation. Persistence goes through an injected
//! [`wiscreen_common::prefs::PreferenceStore`]; frame capture, face
//! detection and rendering stay with the caller.

pub mod blur;
pub mod calibration;
pub mod error;
pub mod guard;

pub use blur::BlurMapper;
pub use calibration::CalibrationAccumulator;
pub use error::{CoreError, CoreResult};
pub use guard::{CaptureOutcome, EyeGuard, FrameUpdate, Phase, StatusReport};
