//! Print the effective configuration.

use super::Context;

pub fn run(ctx: &Context) -> anyhow::Result<()> {
    println!("{}", serde_json::to_string_pretty(&ctx.config)?);
    Ok(())
}
