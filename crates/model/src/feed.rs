//! Detector feed records.
//!
//! An external face detector emits one record per analyzed frame in JSONL.
//! Frames without a face carry neither `face` nor `ratio`; they are gaps,
//! not zero readings.

use serde::{Deserialize, Serialize};

use crate::ratio::{FaceBox, FaceRatio};
use crate::ModelError;

/// Milliseconds since the feed started.
pub type TimestampMs = u64;

/// One analyzed frame from the detector.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DetectorFrame {
    #[serde(rename = "t")]
    pub timestamp_ms: TimestampMs,

    /// Analyzed frame size, required when `face` is given.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub frame_width: Option<u32>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub frame_height: Option<u32>,

    /// Bounding box of the first detected face.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub face: Option<FaceBox>,

    /// Precomputed ratio, takes precedence over `face`.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub ratio: Option<FaceRatio>,
}

impl DetectorFrame {
    /// A frame with no detected face.
    pub fn empty(timestamp_ms: TimestampMs) -> Self {
        Self {
            timestamp_ms,
            frame_width: None,
            frame_height: None,
            face: None,
            ratio: None,
        }
    }

    /// A frame carrying an already computed ratio.
    pub fn with_ratio(timestamp_ms: TimestampMs, ratio: FaceRatio) -> Self {
        Self {
            ratio: Some(ratio),
            ..Self::empty(timestamp_ms)
        }
    }

    /// A frame carrying a raw face box.
    pub fn with_face(
        timestamp_ms: TimestampMs,
        face: FaceBox,
        frame_width: u32,
        frame_height: u32,
    ) -> Self {
        Self {
            timestamp_ms,
            frame_width: Some(frame_width),
            frame_height: Some(frame_height),
            face: Some(face),
            ratio: None,
        }
    }

    /// The face ratio for this frame, or `None` when no face was found.
    pub fn face_ratio(&self) -> Result<Option<FaceRatio>, ModelError> {
        if let Some(ratio) = self.ratio {
            return Ok(Some(ratio));
        }
        let Some(face) = self.face else {
            return Ok(None);
        };
        match (self.frame_width, self.frame_height) {
            (Some(w), Some(h)) => FaceRatio::from_face_box(face, w, h).map(Some),
            _ => Err(ModelError::MissingFrameSize {
                timestamp_ms: self.timestamp_ms,
            }),
        }
    }
}

/// Parse a JSONL detector feed. Blank lines and `#` comments are skipped.
pub fn parse_frames(jsonl: &str) -> Result<Vec<DetectorFrame>, serde_json::Error> {
    jsonl
        .lines()
        .map(str::trim)
        .filter(|line| !line.is_empty() && !line.starts_with('#'))
        .map(serde_json::from_str)
        .collect()
}
