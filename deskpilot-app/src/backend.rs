//! Platform backend selection.

use anyhow::{bail, Result};
use async_trait::async_trait;
use deskpilot_runtime::BackendKind;
use deskpilot_tools::device::DeviceResult;
use deskpilot_tools::{
    DeviceBackend, MacOsBackend, MouseButton, Point, ScrollDirection, WaylandBackend,
};

/// The backend chosen at startup.
pub enum PlatformBackend {
    Wayland(WaylandBackend),
    MacOs(MacOsBackend),
}

/// Resolve `kind` for the current platform. `auto` on an unsupported
/// platform is an error.
pub fn select_backend(kind: BackendKind, timeout_ms: u64) -> Result<PlatformBackend> {
    select_for_os(kind, std::env::consts::OS, timeout_ms)
}

fn select_for_os(kind: BackendKind, os: &str, timeout_ms: u64) -> Result<PlatformBackend> {
    let backend = match kind {
        BackendKind::Wayland => PlatformBackend::Wayland(WaylandBackend::new(timeout_ms)),
        BackendKind::Macos => PlatformBackend::MacOs(MacOsBackend::new(timeout_ms)),
        BackendKind::Auto => match os {
            "linux" => PlatformBackend::Wayland(WaylandBackend::new(timeout_ms)),
            "macos" => PlatformBackend::MacOs(MacOsBackend::new(timeout_ms)),
            other => bail!("no device backend for platform '{}'", other),
        },
    };
    Ok(backend)
}

#[async_trait]
impl DeviceBackend for PlatformBackend {
    fn name(&self) -> &'static str {
        match self {
            Self::Wayland(b) => b.name(),
            Self::MacOs(b) => b.name(),
        }
    }

    async fn check(&self) -> DeviceResult<()> {
        match self {
            Self::Wayland(b) => b.check().await,
            Self::MacOs(b) => b.check().await,
        }
    }

    async fn capture_raw(&self) -> DeviceResult<Vec<u8>> {
        match self {
            Self::Wayland(b) => b.capture_raw().await,
            Self::MacOs(b) => b.capture_raw().await,
        }
    }

    async fn move_to(&self, at: Point) -> DeviceResult<()> {
        match self {
            Self::Wayland(b) => b.move_to(at).await,
            Self::MacOs(b) => b.move_to(at).await,
        }
    }

    async fn click(&self, at: Point, button: MouseButton) -> DeviceResult<()> {
        match self {
            Self::Wayland(b) => b.click(at, button).await,
            Self::MacOs(b) => b.click(at, button).await,
        }
    }

    async fn double_click(&self, at: Point) -> DeviceResult<()> {
        match self {
            Self::Wayland(b) => b.double_click(at).await,
            Self::MacOs(b) => b.double_click(at).await,
        }
    }

    async fn drag(&self, from: Point, to: Point) -> DeviceResult<()> {
        match self {
            Self::Wayland(b) => b.drag(from, to).await,
            Self::MacOs(b) => b.drag(from, to).await,
        }
    }

    async fn type_text(&self, text: &str) -> DeviceResult<()> {
        match self {
            Self::Wayland(b) => b.type_text(text).await,
            Self::MacOs(b) => b.type_text(text).await,
        }
    }

    async fn key(&self, code: &str) -> DeviceResult<()> {
        match self {
            Self::Wayland(b) => b.key(code).await,
            Self::MacOs(b) => b.key(code).await,
        }
    }

    async fn scroll(&self, at: Point, direction: ScrollDirection, amount: u32) -> DeviceResult<()> {
        match self {
            Self::Wayland(b) => b.scroll(at, direction, amount).await,
            Self::MacOs(b) => b.scroll(at, direction, amount).await,
        }
    }
}
