use thiserror::Error;

/// Failure raised while validating or executing a single action.
///
/// None of these escape the dispatcher: each one is folded into a
/// failure-flagged `ActionResult` for the request that caused it.
#[derive(Error, Debug)]
pub enum ToolError {
    #[error("Validation error: {0}")]
    ValidationError(String),

    #[error("Coordinates ({x}, {y}) out of bounds (0-{width}, 0-{height})")]
    BoundsViolation {
        x: i64,
        y: i64,
        width: u32,
        height: u32,
    },

    #[error("Device command failed: {0}")]
    DeviceCommand(String),

    #[error("Unknown action: {0}")]
    UnknownAction(String),

    #[error("Unknown tool: {0}")]
    UnknownTool(String),

    #[error("Permission denied: {0}")]
    PermissionDenied(String),

    #[error("Operation timed out after {0}ms")]
    Timeout(u64),

    #[error("Internal error")]
    Internal,
}

impl From<std::io::Error> for ToolError {
    fn from(err: std::io::Error) -> Self {
        ToolError::DeviceCommand(err.to_string())
    }
}

impl From<image::ImageError> for ToolError {
    fn from(err: image::ImageError) -> Self {
        ToolError::ValidationError(format!("unsupported image data: {err}"))
    }
}
