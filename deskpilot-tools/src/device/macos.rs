//! macOS backend: `screencapture` for capture, `cliclick` for input.

use super::command::{require_any, run_checked, run_output};
use super::keymap::split_combo;
use super::{DeviceBackend, DeviceResult, MouseButton, Point, ScrollDirection};
use crate::error::ToolError;
use async_trait::async_trait;

#[derive(Debug, Clone)]
pub struct MacOsBackend {
    timeout_ms: u64,
}

impl MacOsBackend {
    pub fn new(timeout_ms: u64) -> Self {
        Self { timeout_ms }
    }

    async fn cliclick(&self, commands: &[String]) -> DeviceResult<()> {
        let args: Vec<&str> = commands.iter().map(String::as_str).collect();
        run_checked("cliclick", &args, self.timeout_ms).await
    }
}

/// cliclick uses ':' as its command separator inside `t:` payloads.
fn escape_text(text: &str) -> String {
    text.replace(':', "\\:")
}

fn modifier_name(modifier: &str) -> DeviceResult<&'static str> {
    match modifier {
        "ctrl" | "control" => Ok("ctrl"),
        "alt" | "option" => Ok("alt"),
        "shift" => Ok("shift"),
        "cmd" | "command" | "super" | "meta" => Ok("cmd"),
        "fn" => Ok("fn"),
        other => Err(ToolError::ValidationError(format!(
            "unsupported modifier: {other}"
        ))),
    }
}

/// cliclick's own names for the few codes that differ.
fn cliclick_key(code: &str) -> &str {
    match code {
        "escape" => "esc",
        "forward-delete" => "fwd-delete",
        other => other,
    }
}

/// Build the cliclick command list for a (possibly combined) key code.
fn key_commands(code: &str) -> DeviceResult<Vec<String>> {
    let (modifiers, key) = split_combo(code);
    if key.is_empty() {
        return Err(ToolError::ValidationError("key cannot be empty".to_string()));
    }
    let modifiers = modifiers
        .into_iter()
        .map(modifier_name)
        .collect::<DeviceResult<Vec<_>>>()?;

    let mut commands = Vec::new();
    if !modifiers.is_empty() {
        commands.push(format!("kd:{}", modifiers.join(",")));
    }
    // Single characters go through `t:`, named keys through `kp:`.
    if key.chars().count() == 1 {
        commands.push(format!("t:{}", escape_text(key)));
    } else {
        commands.push(format!("kp:{}", cliclick_key(key)));
    }
    if !modifiers.is_empty() {
        commands.push(format!("ku:{}", modifiers.join(",")));
    }
    Ok(commands)
}

#[async_trait]
impl DeviceBackend for MacOsBackend {
    fn name(&self) -> &'static str {
        "macos"
    }

    async fn check(&self) -> DeviceResult<()> {
        require_any(&["screencapture"], "screencapture ships with macOS").await?;
        require_any(&["cliclick"], "install with 'brew install cliclick'").await
    }

    async fn capture_raw(&self) -> DeviceResult<Vec<u8>> {
        run_output(
            "screencapture",
            &["-x", "-C", "-t", "png", "-"],
            self.timeout_ms,
        )
        .await
    }

    async fn move_to(&self, at: Point) -> DeviceResult<()> {
        self.cliclick(&[format!("m:{},{}", at.x, at.y)]).await
    }

    async fn click(&self, at: Point, button: MouseButton) -> DeviceResult<()> {
        let cmd = match button {
            MouseButton::Left => "c",
            MouseButton::Right => "rc",
        };
        self.cliclick(&[format!("{cmd}:{},{}", at.x, at.y)]).await
    }

    async fn double_click(&self, at: Point) -> DeviceResult<()> {
        self.cliclick(&[format!("dc:{},{}", at.x, at.y)]).await
    }

    async fn drag(&self, from: Point, to: Point) -> DeviceResult<()> {
        self.cliclick(&[
            format!("dd:{},{}", from.x, from.y),
            format!("du:{},{}", to.x, to.y),
        ])
        .await
    }

    async fn type_text(&self, text: &str) -> DeviceResult<()> {
        self.cliclick(&[format!("t:{}", escape_text(text))]).await
    }

    async fn key(&self, code: &str) -> DeviceResult<()> {
        let commands = key_commands(code)?;
        self.cliclick(&commands).await
    }

    async fn scroll(&self, at: Point, direction: ScrollDirection, amount: u32) -> DeviceResult<()> {
        let cmd = match direction {
            ScrollDirection::Up => "su",
            ScrollDirection::Down => "sd",
            ScrollDirection::Left | ScrollDirection::Right => {
                return Err(ToolError::DeviceCommand(
                    "horizontal scrolling is not supported by cliclick".to_string(),
                ))
            }
        };
        self.cliclick(&[format!("m:{},{}", at.x, at.y), format!("{cmd}:{amount}")])
            .await
    }
}
