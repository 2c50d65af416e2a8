//! Error types shared across Wiscreen crates.

use std::path::PathBuf;

/// Top-level error type for Wiscreen operations.
#[derive(Debug, thiserror::Error)]
pub enum WiscreenError {
    #[error("Preference store error: {message}")]
    Store { message: String },

    #[error("Configuration error: {message}")]
    Config { message: String },

    #[error("File not found: {path}")]
    FileNotFound { path: PathBuf },

    #[error(transparent)]
    Model(#[from] wiscreen_model::ModelError),

    #[error(transparent)]
    Io(#[from] std::io::Error),

    #[error(transparent)]
    Json(#[from] serde_json::Error),

    #[error(transparent)]
    Other(#[from] anyhow::Error),
}

/// Result type alias using WiscreenError.
pub type WiscreenResult<T> = Result<T, WiscreenError>;

impl WiscreenError {
    pub fn store(msg: impl Into<String>) -> Self {
        Self::Store {
            message: msg.into(),
        }
    }

    pub fn config(msg: impl Into<String>) -> Self {
        Self::Config {
            message: msg.into(),
        }
    }
}
