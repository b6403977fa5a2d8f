//! Abstract interfaces for runtime dependencies.

use crate::types::{GatewayRequest, GatewayResponse};
use async_trait::async_trait;
use deskpilot_tools::{ActionRequest, ActionResult};
use thiserror::Error;

/// Runtime errors.
///
/// Per-action failures never show up here; they are carried back to the
/// model as failure-flagged action results.
#[derive(Error, Debug)]
pub enum RuntimeError {
    #[error("Gateway error: {0}")]
    GatewayError(String),

    #[error("Device error: {0}")]
    DeviceError(String),

    #[error("Config error: {0}")]
    ConfigError(String),

    #[error("Conversation error: {0}")]
    ConversationError(String),

    #[error("IO error: {0}")]
    IoError(#[from] std::io::Error),

    #[error("Serialization error: {0}")]
    SerializationError(#[from] serde_json::Error),
}

impl From<deskpilot_tools::ToolError> for RuntimeError {
    fn from(err: deskpilot_tools::ToolError) -> Self {
        RuntimeError::DeviceError(err.to_string())
    }
}

/// The multimodal decision-making service driving the loop.
#[async_trait]
pub trait ModelGateway: Send + Sync {
    async fn send(&self, request: &GatewayRequest<'_>) -> Result<GatewayResponse, RuntimeError>;
}

/// Action execution interface.
#[async_trait]
pub trait ToolDispatcher: Send + Sync {
    /// Tool definitions advertised to the gateway.
    fn tool_schemas(&self) -> Vec<serde_json::Value>;

    /// Processed screenshot used to open a run.
    async fn screenshot(&self) -> Result<Vec<u8>, RuntimeError>;

    /// Execute one action. Never fails; failures are flagged in the result.
    async fn dispatch(&self, request: &ActionRequest) -> ActionResult;
}
