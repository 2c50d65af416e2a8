//! Calibration session status.

use serde::{Deserialize, Serialize};

/// Number of samples a calibration session collects before it can commit.
pub const CALIBRATION_SAMPLES: usize = 3;

/// Progress of the current calibration session.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct SessionStatus {
    /// Samples recorded so far.
    pub count: usize,
    /// Whether the session holds enough samples to commit.
    pub complete: bool,
}

impl SessionStatus {
    pub fn new(count: usize) -> Self {
        Self {
            count,
            complete: count >= CALIBRATION_SAMPLES,
        }
    }

    pub fn empty() -> Self {
        Self::new(0)
    }
}

impl std::fmt::Display for SessionStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}/{}", self.count, CALIBRATION_SAMPLES)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_status_completion() {
        assert!(!SessionStatus::new(2).complete);
        assert!(SessionStatus::new(3).complete);
        assert_eq!(SessionStatus::new(1).to_string(), "1/3");
    }
}
