//! Baseline calibration.
//!
//! Collects [`CALIBRATION_SAMPLES`] face-ratio samples taken at the user's
//! normal viewing distance and averages them into a [`BaselineRatio`].
//! The accumulator never writes the baseline itself; the caller persists the
//! value returned by [`CalibrationAccumulator::commit_baseline`].

use wiscreen_common::prefs::PreferenceStore;
use wiscreen_model::{BaselineRatio, FaceRatio, SessionStatus, BASELINE_KEY, CALIBRATION_SAMPLES};

use crate::error::{CoreError, CoreResult};

/// Sample collector for one calibration session.
#[derive(Debug, Clone, Default)]
pub struct CalibrationAccumulator {
    samples: Vec<FaceRatio>,
}

impl CalibrationAccumulator {
    pub fn new() -> Self {
        Self {
            samples: Vec::with_capacity(CALIBRATION_SAMPLES),
        }
    }

    /// Record a raw sample, rejecting values outside `[0, 1]`.
    pub fn record_sample(&mut self, value: f64) -> CoreResult<SessionStatus> {
        let ratio = FaceRatio::new(value).map_err(|_| CoreError::InvalidSample { value })?;
        self.record(ratio)
    }

    /// Record an already validated sample.
    ///
    /// A complete session must be committed or cleared before it accepts
    /// more samples.
    pub fn record(&mut self, ratio: FaceRatio) -> CoreResult<SessionStatus> {
        if self.is_complete() {
            return Err(CoreError::SessionFull {
                capacity: CALIBRATION_SAMPLES,
            });
        }
        self.samples.push(ratio);
        let status = self.status();
        tracing::debug!(ratio = ratio.value(), progress = %status, "Recorded calibration sample");
        Ok(status)
    }

    pub fn status(&self) -> SessionStatus {
        SessionStatus::new(self.samples.len())
    }

    pub fn count(&self) -> usize {
        self.samples.len()
    }

    pub fn samples(&self) -> &[FaceRatio] {
        &self.samples
    }

    pub fn is_complete(&self) -> bool {
        self.samples.len() >= CALIBRATION_SAMPLES
    }

    /// Mean of the collected samples, without clearing the session.
    pub fn pending_baseline(&self) -> CoreResult<BaselineRatio> {
        if !self.is_complete() {
            return Err(CoreError::NotReady {
                count: self.samples.len(),
                required: CALIBRATION_SAMPLES,
            });
        }
        let sum: f64 = self.samples.iter().map(|r| r.value()).sum();
        let mean = sum / self.samples.len() as f64;
        Ok(BaselineRatio::new(mean.clamp(0.0, 1.0))?)
    }

    /// Average the completed session and clear it.
    pub fn commit_baseline(&mut self) -> CoreResult<BaselineRatio> {
        let baseline = self.pending_baseline()?;
        self.clear();
        tracing::info!(
            baseline = baseline.value(),
            samples = CALIBRATION_SAMPLES,
            "Computed calibration baseline"
        );
        Ok(baseline)
    }

    /// Drop collected samples, keeping any persisted baseline.
    pub fn clear(&mut self) {
        self.samples.clear();
    }

    /// Drop collected samples and delete the persisted baseline, so later
    /// reads fall back to the default.
    pub fn reset<S: PreferenceStore + ?Sized>(&mut self, store: &mut S) -> CoreResult<()> {
        store.remove(BASELINE_KEY)?;
        self.clear();
        tracing::info!("Calibration reset");
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;
    use wiscreen_common::prefs::MemoryStore;
    use wiscreen_model::DEFAULT_BASELINE_RATIO;

    fn filled(values: [f64; 3]) -> CalibrationAccumulator {
        let mut acc = CalibrationAccumulator::new();
        for v in values {
            acc.record_sample(v).unwrap();
        }
        acc
    }

    #[test]
    fn test_three_samples_average() {
        let mut acc = filled([0.10, 0.12, 0.14]);
        assert!(acc.is_complete());

        let baseline = acc.commit_baseline().unwrap();
        assert!((baseline.value() - 0.12).abs() < 1e-12);
        assert_eq!(acc.count(), 0);
        assert!(acc.samples().is_empty());
    }

    #[test]
    fn test_status_progress() {
        let mut acc = CalibrationAccumulator::new();
        let first = acc.record_sample(0.2).unwrap();
        assert_eq!(first, SessionStatus { count: 1, complete: false });
        acc.record_sample(0.2).unwrap();
        let third = acc.record_sample(0.2).unwrap();
        assert_eq!(third, SessionStatus { count: 3, complete: true });
    }

    #[test]
    fn test_rejects_out_of_range_without_mutation() {
        let mut acc = CalibrationAccumulator::new();
        acc.record_sample(0.3).unwrap();

        for bad in [-0.1, 1.1, f64::NAN] {
            let err = acc.record_sample(bad).unwrap_err();
            assert!(matches!(err, CoreError::InvalidSample { .. }));
        }
        assert_eq!(acc.count(), 1);
        assert_eq!(acc.samples()[0].value(), 0.3);
    }

    #[test]
    fn test_commit_before_complete_is_not_ready() {
        let mut acc = CalibrationAccumulator::new();
        acc.record_sample(0.1).unwrap();
        acc.record_sample(0.2).unwrap();

        let err = acc.commit_baseline().unwrap_err();
        assert!(matches!(
            err,
            CoreError::NotReady {
                count: 2,
                required: 3
            }
        ));
        assert_eq!(acc.count(), 2);
    }

    #[test]
    fn test_fourth_sample_rejected() {
        let mut acc = filled([0.1, 0.1, 0.1]);
        let err = acc.record_sample(0.5).unwrap_err();
        assert!(matches!(err, CoreError::SessionFull { capacity: 3 }));
        assert_eq!(acc.count(), 3);
        assert!((acc.pending_baseline().unwrap().value() - 0.1).abs() < 1e-12);
    }

    #[test]
    fn test_reset_is_idempotent() {
        let mut store = MemoryStore::new();
        store.set_float(BASELINE_KEY, 0.3).unwrap();
        let mut acc = filled([0.2, 0.2, 0.2]);

        acc.reset(&mut store).unwrap();
        assert_eq!(acc.count(), 0);
        assert_eq!(
            store.get_float(BASELINE_KEY, DEFAULT_BASELINE_RATIO),
            DEFAULT_BASELINE_RATIO
        );

        acc.reset(&mut store).unwrap();
        assert_eq!(acc.count(), 0);
        assert!(!store.contains(BASELINE_KEY));
    }

    proptest! {
        #[test]
        fn commit_returns_exact_mean(
            a in 0.0f64..=1.0,
            b in 0.0f64..=1.0,
            c in 0.0f64..=1.0,
        ) {
            let mut acc = filled([a, b, c]);
            let baseline = acc.commit_baseline().unwrap();
            let expected = [a, b, c].iter().sum::<f64>() / 3.0;
            prop_assert_eq!(baseline.value(), expected);
            prop_assert_eq!(acc.count(), 0);
        }

        #[test]
        fn rejected_samples_leave_session_unchanged(
            good in 0.0f64..=1.0,
            bad in prop_oneof![-10.0f64..-1e-9, 1.0f64 + 1e-9..10.0],
        ) {
            let mut acc = CalibrationAccumulator::new();
            acc.record_sample(good).unwrap();
            prop_assert!(acc.record_sample(bad).is_err());
            prop_assert_eq!(acc.count(), 1);
            prop_assert_eq!(acc.samples()[0].value(), good);
        }
    }
}
