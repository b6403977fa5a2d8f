use super::build_dispatcher;
use crate::debug::save_debug_screenshot;
use anyhow::{Context, Result};
use deskpilot_runtime::PilotConfig;
use std::path::Path;

pub async fn run(config: &PilotConfig, out_dir: &Path, prefix: &str) -> Result<()> {
    let dispatcher = build_dispatcher(config).await?;
    let png = dispatcher
        .screenshot()
        .await
        .context("Screen capture failed")?;
    let path = save_debug_screenshot(&png, out_dir, prefix)
        .with_context(|| format!("Failed to write screenshot into {}", out_dir.display()))?;
    println!("📸 Saved {}", path.display());
    Ok(())
}
