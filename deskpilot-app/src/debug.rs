use chrono::Local;
use std::io;
use std::path::{Path, PathBuf};
use tracing::info;

/// Write `png` to `out_dir` as `{prefix}_{timestamp}.png`.
pub fn save_debug_screenshot(png: &[u8], out_dir: &Path, prefix: &str) -> io::Result<PathBuf> {
    std::fs::create_dir_all(out_dir)?;
    let timestamp = Local::now().format("%Y%m%d_%H%M%S_%6f");
    let path = out_dir.join(format!("{prefix}_{timestamp}.png"));
    std::fs::write(&path, png)?;
    info!("Saved debug screenshot: {}", path.display());
    Ok(path)
}
