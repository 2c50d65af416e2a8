//! Errors raised by the calibration engine.
//!
//! Every failure is local and recoverable: the operation that raised it
//! leaves the session and the store exactly as they were.

use wiscreen_common::error::WiscreenError;
use wiscreen_model::ModelError;

#[derive(Debug, thiserror::Error)]
pub enum CoreError {
    #[error("Invalid sample: face ratio {value} is outside [0, 1]")]
    InvalidSample { value: f64 },

    #[error("Invalid input: {name} {value} is outside the accepted range")]
    InvalidInput { name: &'static str, value: f64 },

    #[error("Calibration not ready: {count} of {required} samples recorded")]
    NotReady { count: usize, required: usize },

    #[error("Calibration session already holds {capacity} samples")]
    SessionFull { capacity: usize },

    #[error("No face has been observed yet")]
    NoFaceObserved,

    #[error("Baseline already calibrated; reset before capturing again")]
    AlreadyCalibrated,

    #[error("Invalid blur policy: {message}")]
    InvalidPolicy { message: String },

    #[error(transparent)]
    Model(ModelError),

    #[error(transparent)]
    Store(#[from] WiscreenError),
}

pub type CoreResult<T> = Result<T, CoreError>;

impl From<ModelError> for CoreError {
    fn from(err: ModelError) -> Self {
        match err {
            ModelError::OutOfRange { name, value } => CoreError::InvalidInput { name, value },
            ModelError::InvalidPolicy { message } => CoreError::InvalidPolicy { message },
            other => CoreError::Model(other),
        }
    }
}
