//! Eye-protection controller.
//!
//! [`EyeGuard`] ties the calibration session, the blur mapper, the eye-mode
//! toggle and the persisted baseline together. The caller drives it from a
//! single execution context: one [`EyeGuard::observe`] call per analyzed
//! frame, plus user actions (capture, toggle, reset).
//!
//! Lifecycle:
//!
//! ```text
//! Idle --capture--> Calibrating(1..2) --capture--> Calibrated
//!   ^                                                  |
//!   +-------------------------reset--------------------+
//! ```
//!
//! Eye mode is orthogonal to the lifecycle. Before a baseline exists the
//! mapper runs against the default baseline.

use serde::Serialize;
use wiscreen_common::prefs::PreferenceStore;
use wiscreen_model::{
    BaselineRatio, BlurPolicy, BlurState, FaceRatio, SessionStatus, BASELINE_KEY,
    DEFAULT_BASELINE_RATIO,
};

use crate::blur::BlurMapper;
use crate::calibration::CalibrationAccumulator;
use crate::error::{CoreError, CoreResult};

/// Calibration lifecycle phase.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(tag = "phase", rename_all = "snake_case")]
pub enum Phase {
    /// No baseline persisted, no samples collected.
    Idle,
    /// Some samples collected, baseline not yet committed.
    Calibrating { count: usize },
    /// Baseline persisted; capture is disabled until reset.
    Calibrated,
}

impl std::fmt::Display for Phase {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Phase::Idle => write!(f, "idle"),
            Phase::Calibrating { count } => {
                write!(f, "calibrating ({})", SessionStatus::new(*count))
            }
            Phase::Calibrated => write!(f, "calibrated"),
        }
    }
}

/// Result of feeding one detected face into the controller.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct FrameUpdate {
    pub blur: BlurState,
    /// False when `blur` equals the state returned last time, so the
    /// renderer can skip redundant updates.
    pub changed: bool,
}

/// Result of a capture action.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct CaptureOutcome {
    pub status: SessionStatus,
    /// Set when this capture completed the session and the baseline was
    /// persisted.
    pub baseline: Option<BaselineRatio>,
}

/// Snapshot of everything a status display needs.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct StatusReport {
    #[serde(flatten)]
    pub phase: Phase,
    pub eye_mode: bool,
    pub face_ratio: Option<FaceRatio>,
    pub baseline: BaselineRatio,
    pub blur: BlurState,
    pub max_ratio: f64,
}

impl std::fmt::Display for StatusReport {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        writeln!(f, "Phase: {}", self.phase)?;
        writeln!(
            f,
            "Eye mode: {}",
            if self.eye_mode { "on" } else { "off" }
        )?;
        match self.face_ratio {
            Some(ratio) => writeln!(f, "Face ratio: {}%", ratio.percent())?,
            None => writeln!(f, "Face ratio: -")?,
        }
        writeln!(f, "Baseline ratio: {}%", self.baseline.percent())?;
        if self.eye_mode {
            writeln!(f, "Enhancement: {:.2}", self.blur.enhancement)?;
            writeln!(f, "Blur radius: {:.1}", self.blur.radius)?;
        }
        write!(f, "Max ratio: {:.0}%", self.max_ratio * 100.0)
    }
}

/// Calibration and blur state for one user, persisted through `S`.
#[derive(Debug)]
pub struct EyeGuard<S> {
    store: S,
    mapper: BlurMapper,
    session: CalibrationAccumulator,
    calibrated: bool,
    eye_mode: bool,
    latest: Option<FaceRatio>,
    last_blur: Option<BlurState>,
}

impl<S: PreferenceStore> EyeGuard<S> {
    /// Build a controller. Starts `Calibrated` when the store already holds
    /// a baseline.
    pub fn new(store: S, policy: BlurPolicy) -> CoreResult<Self> {
        let mapper = BlurMapper::new(policy)?;
        let calibrated = store.contains(BASELINE_KEY);
        tracing::debug!(calibrated, "Eye guard initialized");
        Ok(Self {
            store,
            mapper,
            session: CalibrationAccumulator::new(),
            calibrated,
            eye_mode: false,
            latest: None,
            last_blur: None,
        })
    }

    pub fn phase(&self) -> Phase {
        if self.calibrated {
            Phase::Calibrated
        } else if self.session.count() == 0 {
            Phase::Idle
        } else {
            Phase::Calibrating {
                count: self.session.count(),
            }
        }
    }

    /// Persisted baseline, or the default when unset or unreadable.
    pub fn baseline(&self) -> BaselineRatio {
        let raw = self.store.get_float(BASELINE_KEY, DEFAULT_BASELINE_RATIO);
        BaselineRatio::new(raw).unwrap_or_else(|e| {
            tracing::warn!("Ignoring persisted baseline: {e}");
            BaselineRatio::DEFAULT
        })
    }

    pub fn eye_mode(&self) -> bool {
        self.eye_mode
    }

    /// Most recent face ratio seen by [`EyeGuard::observe`].
    pub fn latest_ratio(&self) -> Option<FaceRatio> {
        self.latest
    }

    pub fn session_status(&self) -> SessionStatus {
        self.session.status()
    }

    pub fn policy(&self) -> &BlurPolicy {
        self.mapper.policy()
    }

    pub fn store(&self) -> &S {
        &self.store
    }

    pub fn into_store(self) -> S {
        self.store
    }

    /// Feed one analyzed frame.
    ///
    /// `None` means no face was found; nothing changes and no update is
    /// produced.
    pub fn observe(&mut self, ratio: Option<FaceRatio>) -> Option<FrameUpdate> {
        let ratio = ratio?;
        self.latest = Some(ratio);
        let blur = self.current_blur();
        let changed = self.last_blur != Some(blur);
        self.last_blur = Some(blur);
        if changed {
            tracing::debug!(
                ratio = ratio.value(),
                radius = blur.radius,
                alpha = blur.alpha,
                "Blur updated"
            );
        }
        Some(FrameUpdate { blur, changed })
    }

    /// Record the latest observed ratio as a calibration sample.
    ///
    /// The third sample commits the session and persists its mean as the new
    /// baseline.
    pub fn capture(&mut self) -> CoreResult<CaptureOutcome> {
        if self.calibrated {
            return Err(CoreError::AlreadyCalibrated);
        }
        // A complete session only survives a failed persist; retry it.
        if self.session.is_complete() {
            return self.commit();
        }
        let ratio = self.latest.ok_or(CoreError::NoFaceObserved)?;
        let status = self.session.record(ratio)?;
        if status.complete {
            return self.commit();
        }
        Ok(CaptureOutcome {
            status,
            baseline: None,
        })
    }

    fn commit(&mut self) -> CoreResult<CaptureOutcome> {
        let status = self.session.status();
        let baseline = self.session.pending_baseline()?;
        self.store.set_float(BASELINE_KEY, baseline.value())?;
        self.session.commit_baseline()?;
        self.calibrated = true;
        tracing::info!(baseline = baseline.value(), "Baseline persisted");
        Ok(CaptureOutcome {
            status,
            baseline: Some(baseline),
        })
    }

    /// Flip eye mode and return the blur the renderer should now apply.
    pub fn toggle_eye_mode(&mut self) -> BlurState {
        self.set_eye_mode(!self.eye_mode)
    }

    pub fn set_eye_mode(&mut self, enabled: bool) -> BlurState {
        self.eye_mode = enabled;
        let blur = self.current_blur();
        self.last_blur = Some(blur);
        tracing::info!(enabled, "Eye mode changed");
        blur
    }

    /// Drop the session and the persisted baseline, returning to `Idle`.
    pub fn reset(&mut self) -> CoreResult<()> {
        self.session.reset(&mut self.store)?;
        self.calibrated = false;
        Ok(())
    }

    pub fn report(&self) -> StatusReport {
        StatusReport {
            phase: self.phase(),
            eye_mode: self.eye_mode,
            face_ratio: self.latest,
            baseline: self.baseline(),
            blur: self.current_blur(),
            max_ratio: self.mapper.policy().max_ratio,
        }
    }

    fn current_blur(&self) -> BlurState {
        match (self.eye_mode, self.latest) {
            (true, Some(ratio)) => self.mapper.map(ratio, self.baseline()),
            _ => BlurState::cleared(),
        }
    }
}
