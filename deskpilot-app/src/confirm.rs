//! Terminal confirmation for sensitive actions.

use async_trait::async_trait;
use deskpilot_tools::Confirmer;
use serde_json::Value;
use std::io::{self, BufRead, Write};
use tracing::warn;

/// Asks on the controlling terminal. Anything but `y` declines.
pub struct StdinConfirmer;

#[async_trait]
impl Confirmer for StdinConfirmer {
    async fn confirm(&self, action: &str, input: &Value) -> bool {
        let prompt = format!(
            "\n⚠️  Sensitive action detected: {}\n   Parameters: {}\nConfirm execution? [y/N]: ",
            action, input
        );
        let answer = tokio::task::spawn_blocking(move || {
            read_confirmation(&prompt, io::stdin().lock(), io::stderr())
        })
        .await;
        match answer {
            Ok(yes) => yes,
            Err(e) => {
                warn!("Confirmation prompt failed: {}", e);
                false
            }
        }
    }
}

pub fn read_confirmation<R: BufRead, W: Write>(prompt: &str, mut input: R, mut output: W) -> bool {
    if write!(output, "{prompt}").and_then(|_| output.flush()).is_err() {
        return false;
    }
    let mut line = String::new();
    match input.read_line(&mut line) {
        Ok(_) => line.trim().eq_ignore_ascii_case("y"),
        Err(_) => false,
    }
}
