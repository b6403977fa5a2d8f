//! Process helpers shared by the shell-out backends.

use super::DeviceResult;
use crate::error::ToolError;
use std::process::Output;
use tokio::process::Command;
use tokio::time::{timeout, Duration};
use tracing::debug;

pub async fn command_exists(command: &str) -> bool {
    Command::new("which")
        .arg(command)
        .output()
        .await
        .map(|output| output.status.success())
        .unwrap_or(false)
}

/// Fail with a readable message when none of `commands` is installed.
pub async fn require_any(commands: &[&str], hint: &str) -> DeviceResult<()> {
    for command in commands {
        if command_exists(command).await {
            return Ok(());
        }
    }
    Err(ToolError::DeviceCommand(format!(
        "none of [{}] found ({hint})",
        commands.join(", ")
    )))
}

async fn run(command: &str, args: &[&str], timeout_ms: u64) -> DeviceResult<Output> {
    debug!("device command: {} {:?}", command, args);
    let child = Command::new(command)
        .args(args)
        .kill_on_drop(true)
        .output();

    let output = timeout(Duration::from_millis(timeout_ms), child)
        .await
        .map_err(|_| ToolError::Timeout(timeout_ms))??;

    if output.status.success() {
        return Ok(output);
    }
    let stderr = String::from_utf8_lossy(&output.stderr).trim().to_string();
    Err(ToolError::DeviceCommand(format!(
        "{command} exited with {}: {stderr}",
        output.status
    )))
}

/// Run a command and require a zero exit status.
pub async fn run_checked(command: &str, args: &[&str], timeout_ms: u64) -> DeviceResult<()> {
    run(command, args, timeout_ms).await.map(|_| ())
}

/// Run a command and return its raw stdout.
pub async fn run_output(command: &str, args: &[&str], timeout_ms: u64) -> DeviceResult<Vec<u8>> {
    let output = run(command, args, timeout_ms).await?;
    if output.stdout.is_empty() {
        return Err(ToolError::DeviceCommand(format!(
            "{command} produced no output"
        )));
    }
    Ok(output.stdout)
}

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::expect_used, clippy::panic)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_missing_binary_is_device_error() {
        let err = run_checked("deskpilot-definitely-missing", &[], 1000)
            .await
            .unwrap_err();
        assert!(matches!(err, ToolError::DeviceCommand(_)));
    }

    #[cfg(unix)]
    #[tokio::test]
    async fn test_nonzero_exit_is_device_error() {
        let err = run_checked("false", &[], 1000).await.unwrap_err();
        assert!(matches!(err, ToolError::DeviceCommand(msg) if msg.contains("false")));
    }

    #[cfg(unix)]
    #[tokio::test]
    async fn test_slow_command_times_out() {
        let err = run_checked("sleep", &["5"], 50).await.unwrap_err();
        assert!(matches!(err, ToolError::Timeout(50)));
    }

    #[cfg(unix)]
    #[tokio::test]
    async fn test_run_output_returns_stdout() {
        let out = run_output("echo", &["hello"], 1000).await.unwrap();
        assert_eq!(String::from_utf8_lossy(&out).trim(), "hello");
    }
}
