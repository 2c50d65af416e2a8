//! Face-area ratio and baseline types.
//!
//! Every ratio is a share of the analyzed frame covered by the detected
//! face bounding box, so all values live in `[0.0, 1.0]`.

use serde::{Deserialize, Serialize};

use crate::ModelError;

/// Baseline used when no calibration has been persisted.
pub const DEFAULT_BASELINE_RATIO: f64 = 0.15;

/// Preference key holding the persisted baseline.
pub const BASELINE_KEY: &str = "BASELINE_RATIO";

/// Face bounding-box area divided by full frame area.
///
/// Produced once per analyzed frame when a face is present. Frames without a
/// face produce no value at all rather than a zero ratio.
#[derive(Debug, Clone, Copy, PartialEq, PartialOrd, Serialize, Deserialize)]
#[serde(try_from = "f64", into = "f64")]
pub struct FaceRatio(f64);

impl FaceRatio {
    /// Validate a raw ratio. Rejects NaN, infinities and values outside `[0, 1]`.
    pub fn new(value: f64) -> Result<Self, ModelError> {
        check_unit_range("face ratio", value).map(Self)
    }

    /// Compute the ratio from a detected face box and the analyzed frame size.
    ///
    /// Detector boxes may extend past the frame edge, so ratios above 1 are
    /// clamped.
    pub fn from_face_box(
        face: FaceBox,
        frame_width: u32,
        frame_height: u32,
    ) -> Result<Self, ModelError> {
        let frame_area = frame_width as f64 * frame_height as f64;
        if frame_area <= 0.0 {
            return Err(ModelError::EmptyFrame {
                width: frame_width,
                height: frame_height,
            });
        }
        Ok(Self((face.area() / frame_area).clamp(0.0, 1.0)))
    }

    pub fn value(self) -> f64 {
        self.0
    }

    /// Ratio as a whole percentage, the way it is shown to users.
    pub fn percent(self) -> u32 {
        (self.0 * 100.0).round() as u32
    }
}

impl TryFrom<f64> for FaceRatio {
    type Error = ModelError;

    fn try_from(value: f64) -> Result<Self, Self::Error> {
        Self::new(value)
    }
}

impl From<FaceRatio> for f64 {
    fn from(ratio: FaceRatio) -> Self {
        ratio.0
    }
}

/// Reference face ratio at the user's normal viewing distance.
///
/// Acts as the zero point for blur enhancement.
#[derive(Debug, Clone, Copy, PartialEq, PartialOrd, Serialize, Deserialize)]
#[serde(try_from = "f64", into = "f64")]
pub struct BaselineRatio(f64);

impl BaselineRatio {
    pub const DEFAULT: BaselineRatio = BaselineRatio(DEFAULT_BASELINE_RATIO);

    pub fn new(value: f64) -> Result<Self, ModelError> {
        check_unit_range("baseline ratio", value).map(Self)
    }

    pub fn value(self) -> f64 {
        self.0
    }

    pub fn percent(self) -> u32 {
        (self.0 * 100.0).round() as u32
    }
}

impl Default for BaselineRatio {
    fn default() -> Self {
        Self::DEFAULT
    }
}

impl TryFrom<f64> for BaselineRatio {
    type Error = ModelError;

    fn try_from(value: f64) -> Result<Self, Self::Error> {
        Self::new(value)
    }
}

impl From<BaselineRatio> for f64 {
    fn from(ratio: BaselineRatio) -> Self {
        ratio.0
    }
}

/// Size of a detected face bounding box, in frame pixels.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct FaceBox {
    pub width: u32,
    pub height: u32,
}

impl FaceBox {
    pub fn new(width: u32, height: u32) -> Self {
        Self { width, height }
    }

    pub fn area(&self) -> f64 {
        self.width as f64 * self.height as f64
    }
}

fn check_unit_range(name: &'static str, value: f64) -> Result<f64, ModelError> {
    if value.is_finite() && (0.0..=1.0).contains(&value) {
        Ok(value)
    } else {
        Err(ModelError::OutOfRange { name, value })
    }
}
