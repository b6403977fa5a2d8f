//! Logical screen: bounds checks and capture resampling on top of a backend.

use super::{DeviceBackend, DeviceResult, Display, MouseButton, Point, ScrollDirection};
use crate::error::ToolError;
use image::imageops::FilterType;
use image::{GenericImageView, ImageFormat};
use std::io::Cursor;
use tracing::debug;

/// The device capability handed to the dispatcher.
///
/// Every capture comes back as a PNG of exactly `display.width x
/// display.height`, so coordinates the model reads off a screenshot are
/// valid input coordinates for the next command.
pub struct Screen<B> {
    backend: B,
    display: Display,
}

impl<B: DeviceBackend> Screen<B> {
    pub fn new(backend: B, display: Display) -> Self {
        Self { backend, display }
    }

    pub fn display(&self) -> Display {
        self.display
    }

    pub fn backend(&self) -> &B {
        &self.backend
    }

    fn ensure_inside(&self, at: Point) -> DeviceResult<()> {
        self.display
            .validate(i64::from(at.x), i64::from(at.y))
            .map(|_| ())
    }

    /// Capture, resample to the logical resolution and encode as PNG.
    pub async fn capture(&self) -> DeviceResult<Vec<u8>> {
        let raw = self.backend.capture_raw().await?;
        let display = self.display;
        tokio::task::spawn_blocking(move || resample_png(&raw, display))
            .await
            .map_err(|_| ToolError::Internal)?
    }

    pub async fn move_to(&self, at: Point) -> DeviceResult<()> {
        self.ensure_inside(at)?;
        self.backend.move_to(at).await
    }

    pub async fn click(&self, at: Point, button: MouseButton) -> DeviceResult<()> {
        self.ensure_inside(at)?;
        self.backend.click(at, button).await
    }

    pub async fn double_click(&self, at: Point) -> DeviceResult<()> {
        self.ensure_inside(at)?;
        self.backend.double_click(at).await
    }

    pub async fn drag(&self, from: Point, to: Point) -> DeviceResult<()> {
        self.ensure_inside(from)?;
        self.ensure_inside(to)?;
        self.backend.drag(from, to).await
    }

    pub async fn type_text(&self, text: &str) -> DeviceResult<()> {
        self.backend.type_text(text).await
    }

    pub async fn key(&self, code: &str) -> DeviceResult<()> {
        self.backend.key(code).await
    }

    pub async fn scroll(&self, at: Point, direction: ScrollDirection, amount: u32) -> DeviceResult<()> {
        self.ensure_inside(at)?;
        self.backend.scroll(at, direction, amount).await
    }
}

/// Decode `raw`, resize it to `logical` with a Lanczos filter when the size
/// differs, and re-encode as PNG.
pub fn resample_png(raw: &[u8], logical: Display) -> DeviceResult<Vec<u8>> {
    let image = image::load_from_memory(raw)?;
    let (width, height) = image.dimensions();
    let (target_w, target_h) = (logical.width, logical.height);

    let image = if (width, height) != (target_w, target_h) {
        debug!(
            "resampling capture {}x{} -> {}x{}",
            width, height, target_w, target_h
        );
        image.resize_exact(target_w, target_h, FilterType::Lanczos3)
    } else {
        image
    };

    let mut buf = Vec::new();
    image.write_to(&mut Cursor::new(&mut buf), ImageFormat::Png)?;
    Ok(buf)
}
