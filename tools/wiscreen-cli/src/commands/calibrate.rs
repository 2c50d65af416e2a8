//! Store a baseline from three face-ratio samples.

use wiscreen_calibration_core::CoreError;
use wiscreen_model::FaceRatio;

use super::Context;

pub fn run(ctx: &Context, ratios: Vec<f64>) -> anyhow::Result<()> {
    let mut guard = ctx.open_guard()?;

    for value in ratios {
        let ratio = FaceRatio::new(value)?;
        guard.observe(Some(ratio));
        let outcome = match guard.capture() {
            Ok(outcome) => outcome,
            Err(CoreError::AlreadyCalibrated) => {
                anyhow::bail!("Already calibrated. Run `wiscreen reset` first.")
            }
            Err(e) => return Err(e.into()),
        };
        println!("Sample {}%: {}", ratio.percent(), outcome.status);
        if let Some(baseline) = outcome.baseline {
            println!("Calibration complete");
            println!("  Baseline ratio: {}%", baseline.percent());
            println!("  Saved to: {}", guard.store().path().display());
        }
    }

    Ok(())
}
