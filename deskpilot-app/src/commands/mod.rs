//! Subcommand implementations.

pub mod check;
pub mod run;
pub mod screenshot;

use crate::backend::{select_backend, PlatformBackend};
use crate::confirm::StdinConfirmer;
use anyhow::{Context, Result};
use deskpilot_runtime::{load_config, PilotConfig};
use deskpilot_tools::{ActionDispatcher, DeviceBackend, Screen, SensitiveActionGuard};
use std::path::Path;
use std::sync::Arc;
use tracing::info;

pub fn load(path: Option<&Path>) -> Result<PilotConfig> {
    load_config(path).context("Failed to load configuration")
}

/// Select and verify the device backend, then wrap it in a dispatcher.
/// Fails before any model call when required OS tools are missing.
pub async fn build_dispatcher(config: &PilotConfig) -> Result<ActionDispatcher<PlatformBackend>> {
    let backend = select_backend(config.backend, config.device_timeout_ms)?;
    backend
        .check()
        .await
        .with_context(|| format!("{} backend is not usable", backend.name()))?;
    info!("Using {} backend", backend.name());

    let screen = Screen::new(backend, config.logical_display());
    let dispatcher = ActionDispatcher::new(screen, config.dispatch_timeout_ms);
    if config.confirm_sensitive {
        Ok(dispatcher.with_guard(Arc::new(SensitiveActionGuard::new(StdinConfirmer))))
    } else {
        Ok(dispatcher)
    }
}
