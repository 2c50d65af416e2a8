//! Show calibration state.

use super::Context;

pub fn run(ctx: &Context, json: bool) -> anyhow::Result<()> {
    let guard = ctx.open_guard()?;
    let report = guard.report();

    if json {
        println!("{}", serde_json::to_string_pretty(&report)?);
        return Ok(());
    }

    println!("{report}");
    println!("Preferences: {}", guard.store().path().display());
    if let Some(modified) = guard.store().modified_at() {
        println!("  Modified: {modified}");
    }
    Ok(())
}
