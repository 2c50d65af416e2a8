//! Map a single face ratio to a blur state.

use wiscreen_calibration_core::BlurMapper;

use super::Context;

pub fn run(
    ctx: &Context,
    ratio: f64,
    baseline: Option<f64>,
    max_ratio: Option<f64>,
) -> anyhow::Result<()> {
    let baseline = match baseline {
        Some(value) => value,
        None => ctx.open_guard()?.baseline().value(),
    };
    let mapper = BlurMapper::new(ctx.config.blur)?;
    let max_ratio = max_ratio.unwrap_or(ctx.config.blur.max_ratio);
    let state = mapper.compute_blur_with_max(ratio, baseline, max_ratio)?;

    println!("Face ratio: {:.3}", ratio);
    println!("Baseline ratio: {:.3}", baseline);
    println!("Max ratio: {:.3}", max_ratio);
    println!("Enhancement: {:.2}", state.enhancement);
    println!(
        "Blur radius: {:.1} ({}px)",
        state.radius,
        state.radius_px(mapper.policy())
    );
    println!("Overlay alpha: {}", state.alpha);

    Ok(())
}
