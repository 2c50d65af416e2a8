//! Delete the stored baseline.

use wiscreen_calibration_core::Phase;

use super::Context;

pub fn run(ctx: &Context) -> anyhow::Result<()> {
    let mut guard = ctx.open_guard()?;
    let was_calibrated = guard.phase() == Phase::Calibrated;
    guard.reset()?;

    if was_calibrated {
        println!("Calibration reset");
    } else {
        println!("No baseline stored");
    }
    Ok(())
}
