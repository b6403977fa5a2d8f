//! Wayland backend: grim for capture, ydotool for the pointer, wtype for the
//! keyboard.

use super::command::{require_any, run_checked, run_output};
use super::keymap::split_combo;
use super::{DeviceBackend, DeviceResult, MouseButton, Point, ScrollDirection};
use crate::error::ToolError;
use async_trait::async_trait;
use tokio::time::{sleep, Duration};

// ydotool click codes: 0x40 = down, 0x80 = up, 0xC0 = down+up.
const YDOTOOL_LEFT_CLICK: &str = "0xC0";
const YDOTOOL_RIGHT_CLICK: &str = "0xC1";
const YDOTOOL_LEFT_DOWN: &str = "0x40";
const YDOTOOL_LEFT_UP: &str = "0x80";

/// Lets the compositor settle a cursor move before the next event.
const SETTLE: Duration = Duration::from_millis(30);

#[derive(Debug, Clone)]
pub struct WaylandBackend {
    timeout_ms: u64,
}

impl WaylandBackend {
    pub fn new(timeout_ms: u64) -> Self {
        Self { timeout_ms }
    }

    async fn ydotool(&self, args: &[&str]) -> DeviceResult<()> {
        run_checked("ydotool", args, self.timeout_ms).await
    }
}

fn validate_text(text: &str) -> DeviceResult<()> {
    if text.contains('\0') {
        return Err(ToolError::ValidationError(
            "text contains null byte".to_string(),
        ));
    }
    Ok(())
}

fn validate_key_token(key: &str) -> DeviceResult<()> {
    if key.trim().is_empty() {
        return Err(ToolError::ValidationError("key cannot be empty".to_string()));
    }
    let mut chars = key.chars();
    if let (Some(ch), None) = (chars.next(), chars.next()) {
        if !ch.is_control() && !ch.is_whitespace() {
            return Ok(());
        }
    }
    if !key
        .chars()
        .all(|ch| ch.is_ascii_alphanumeric() || matches!(ch, '_' | '-'))
    {
        return Err(ToolError::ValidationError(format!(
            "key contains invalid characters: {key}"
        )));
    }
    Ok(())
}

/// Map a device key code back onto the XKB keysym wtype expects.
fn keysym(code: &str) -> &str {
    match code {
        "return" => "Return",
        "tab" => "Tab",
        "escape" => "Escape",
        "delete" => "BackSpace",
        "forward-delete" => "Delete",
        "arrow-up" => "Up",
        "arrow-down" => "Down",
        "arrow-left" => "Left",
        "arrow-right" => "Right",
        "/" => "slash",
        "\\" => "backslash",
        "." => "period",
        "," => "comma",
        "-" => "minus",
        "=" => "equal",
        ";" => "semicolon",
        "'" => "apostrophe",
        "`" => "grave",
        "[" => "bracketleft",
        "]" => "bracketright",
        other => other,
    }
}

/// A lone symbol with no keysym name; wtype types it as text with the
/// modifiers held.
fn typed_as_text(key: &str) -> bool {
    let mut chars = key.chars();
    match (chars.next(), chars.next()) {
        (Some(ch), None) => !ch.is_ascii_alphanumeric() && keysym(key) == key,
        _ => false,
    }
}

#[async_trait]
impl DeviceBackend for WaylandBackend {
    fn name(&self) -> &'static str {
        "wayland"
    }

    async fn check(&self) -> DeviceResult<()> {
        require_any(&["grim"], "install 'grim' for screenshots").await?;
        require_any(&["ydotool"], "install 'ydotool' for pointer input").await?;
        require_any(&["wtype"], "install 'wtype' for keyboard input").await
    }

    async fn capture_raw(&self) -> DeviceResult<Vec<u8>> {
        // "-" writes the PNG to stdout.
        run_output("grim", &["-t", "png", "-"], self.timeout_ms).await
    }

    async fn move_to(&self, at: Point) -> DeviceResult<()> {
        let xs = at.x.to_string();
        let ys = at.y.to_string();
        self.ydotool(&["mousemove", "--absolute", "-x", &xs, "-y", &ys])
            .await
    }

    async fn click(&self, at: Point, button: MouseButton) -> DeviceResult<()> {
        self.move_to(at).await?;
        sleep(SETTLE).await;
        let code = match button {
            MouseButton::Left => YDOTOOL_LEFT_CLICK,
            MouseButton::Right => YDOTOOL_RIGHT_CLICK,
        };
        self.ydotool(&["click", code]).await
    }

    async fn double_click(&self, at: Point) -> DeviceResult<()> {
        self.move_to(at).await?;
        sleep(SETTLE).await;
        self.ydotool(&["click", "--repeat", "2", "--next-delay", "60", YDOTOOL_LEFT_CLICK])
            .await
    }

    async fn drag(&self, from: Point, to: Point) -> DeviceResult<()> {
        self.move_to(from).await?;
        sleep(SETTLE).await;
        self.ydotool(&["click", YDOTOOL_LEFT_DOWN]).await?;
        let moved = self.move_to(to).await;
        sleep(SETTLE).await;
        // Release even if the move failed so the button is never left held.
        let released = self.ydotool(&["click", YDOTOOL_LEFT_UP]).await;
        moved.and(released)
    }

    async fn type_text(&self, text: &str) -> DeviceResult<()> {
        validate_text(text)?;
        run_checked("wtype", &["--", text], self.timeout_ms).await
    }

    async fn key(&self, code: &str) -> DeviceResult<()> {
        let (modifiers, key) = split_combo(code);
        validate_key_token(key)?;
        for modifier in &modifiers {
            validate_key_token(modifier)?;
        }

        let mut args: Vec<&str> = Vec::new();
        for modifier in &modifiers {
            args.push("-M");
            args.push(modifier);
        }
        if typed_as_text(key) {
            args.push(key);
        } else {
            args.push("-k");
            args.push(keysym(key));
        }
        for modifier in modifiers.iter().rev() {
            args.push("-m");
            args.push(modifier);
        }
        run_checked("wtype", &args, self.timeout_ms).await
    }

    async fn scroll(&self, at: Point, direction: ScrollDirection, amount: u32) -> DeviceResult<()> {
        self.move_to(at).await?;
        sleep(SETTLE).await;
        let steps = i64::from(amount);
        let (dx, dy) = match direction {
            ScrollDirection::Up => (0, steps),
            ScrollDirection::Down => (0, -steps),
            ScrollDirection::Left => (-steps, 0),
            ScrollDirection::Right => (steps, 0),
        };
        let dx = dx.to_string();
        let dy = dy.to_string();
        self.ydotool(&["mousemove", "--wheel", "-x", &dx, "-y", &dy])
            .await
    }
}
