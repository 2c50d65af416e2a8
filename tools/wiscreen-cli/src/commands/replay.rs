//! Run a recorded detector feed through the eye guard.

use std::collections::BTreeSet;
use std::path::PathBuf;

use wiscreen_calibration_core::{EyeGuard, Phase};
use wiscreen_common::feed::load_feed;
use wiscreen_common::prefs::{MemoryStore, PreferenceStore};
use wiscreen_model::BASELINE_KEY;

use super::Context;

pub fn run(
    ctx: &Context,
    feed: PathBuf,
    eye_mode: bool,
    calibrate_at: Vec<u64>,
) -> anyhow::Result<()> {
    println!("Replaying feed: {}", feed.display());

    let frames = load_feed(&feed).map_err(|e| anyhow::anyhow!("Failed to load feed: {e}"))?;
    println!("  Loaded {} frames", frames.len());

    // Replays run against a scratch store seeded with the stored baseline.
    let mut store = MemoryStore::new();
    if calibrate_at.is_empty() {
        let persisted = ctx.open_guard()?;
        if persisted.phase() == Phase::Calibrated {
            store.set_float(BASELINE_KEY, persisted.baseline().value())?;
        }
    }
    let mut guard = EyeGuard::new(store, ctx.config.blur)?;
    guard.set_eye_mode(eye_mode);

    let captures: BTreeSet<u64> = calibrate_at.into_iter().collect();
    let mut faces = 0usize;
    let mut updates = 0usize;

    for frame in &frames {
        let ratio = frame.face_ratio()?;
        if let Some(update) = guard.observe(ratio) {
            faces += 1;
            if update.changed {
                updates += 1;
                println!(
                    "  t={}ms ratio={}% enhancement={:.2} radius={:.1} alpha={}",
                    frame.timestamp_ms,
                    ratio.map(|r| r.percent()).unwrap_or_default(),
                    update.blur.enhancement,
                    update.blur.radius,
                    update.blur.alpha
                );
            }
        }

        if captures.contains(&frame.timestamp_ms) && guard.phase() != Phase::Calibrated {
            let outcome = guard.capture()?;
            println!(
                "  t={}ms calibration sample {}",
                frame.timestamp_ms, outcome.status
            );
            if let Some(baseline) = outcome.baseline {
                println!("  Baseline ratio: {}%", baseline.percent());
            }
        }
    }

    println!("  {faces} frames with a face, {updates} blur updates");
    println!();
    println!("{}", guard.report());
    Ok(())
}
