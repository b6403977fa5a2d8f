//! Device capability layer - screen capture and input simulation.
//!
//! The agent only ever talks to a [`Screen`], which owns the logical
//! [`Display`] and forwards validated commands to a platform
//! [`DeviceBackend`]:
//! - Wayland compositors (grim, wtype, ydotool)
//! - macOS (screencapture, cliclick)

pub mod command;
pub mod keymap;
pub mod macos;
pub mod screen;
pub mod wayland;

use crate::error::ToolError;
use async_trait::async_trait;
use serde::{Deserialize, Serialize};

pub use macos::MacOsBackend;
pub use screen::Screen;
pub use wayland::WaylandBackend;

pub type DeviceResult<T> = Result<T, ToolError>;

/// Logical coordinate space every pointer-bearing action must satisfy.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Display {
    pub width: u32,
    pub height: u32,
}

impl Default for Display {
    fn default() -> Self {
        Self {
            width: 1920,
            height: 1080,
        }
    }
}

impl Display {
    pub fn new(width: u32, height: u32) -> Self {
        Self { width, height }
    }

    /// `0 <= x < width` and `0 <= y < height`.
    pub fn contains(&self, x: i64, y: i64) -> bool {
        (0..i64::from(self.width)).contains(&x) && (0..i64::from(self.height)).contains(&y)
    }

    /// Turn raw model coordinates into a [`Point`] inside this display.
    pub fn validate(&self, x: i64, y: i64) -> DeviceResult<Point> {
        if !self.contains(x, y) {
            return Err(ToolError::BoundsViolation {
                x,
                y,
                width: self.width,
                height: self.height,
            });
        }
        // Both values are in [0, u32::MAX) after the range check.
        Ok(Point {
            x: x as u32,
            y: y as u32,
        })
    }
}

/// A coordinate already checked against a [`Display`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct Point {
    pub x: u32,
    pub y: u32,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum MouseButton {
    Left,
    Right,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ScrollDirection {
    Up,
    Down,
    Left,
    Right,
}

impl std::str::FromStr for ScrollDirection {
    type Err = ToolError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "up" => Ok(Self::Up),
            "down" => Ok(Self::Down),
            "left" => Ok(Self::Left),
            "right" => Ok(Self::Right),
            other => Err(ToolError::ValidationError(format!(
                "unsupported scroll direction: {other}"
            ))),
        }
    }
}

/// Raw OS command surface of one physical display + input pair.
///
/// Implementations assume their inputs were validated by [`Screen`]; they
/// only report failures of the underlying tool.
#[async_trait]
pub trait DeviceBackend: Send + Sync {
    /// Backend identifier used in logs.
    fn name(&self) -> &'static str;

    /// Verify that the OS tooling this backend shells out to is present.
    async fn check(&self) -> DeviceResult<()> {
        Ok(())
    }

    /// Capture the full screen at native resolution, encoded as PNG or any
    /// other format the `image` crate can decode.
    async fn capture_raw(&self) -> DeviceResult<Vec<u8>>;

    async fn move_to(&self, at: Point) -> DeviceResult<()>;

    async fn click(&self, at: Point, button: MouseButton) -> DeviceResult<()>;

    async fn double_click(&self, at: Point) -> DeviceResult<()>;

    async fn drag(&self, from: Point, to: Point) -> DeviceResult<()>;

    async fn type_text(&self, text: &str) -> DeviceResult<()>;

    /// Press a key or combination, already translated by [`keymap::translate`].
    async fn key(&self, code: &str) -> DeviceResult<()>;

    async fn scroll(&self, at: Point, direction: ScrollDirection, amount: u32) -> DeviceResult<()>;
}
