//! Deskpilot runtime core
//!
//! Conversation state, the model gateway, and the loop that drives a desktop
//! task from one screenshot to completion.

pub mod adapters;
pub mod agent_config;
pub mod agent_loop;
pub mod interfaces;
pub mod llm_client;
pub mod metrics;
pub mod retry;
pub mod types;
pub mod usage;

pub use agent_config::{load_config, BackendKind, PilotConfig};
pub use agent_loop::{AgentLoop, DEFAULT_MAX_ITERATIONS, SYSTEM_PROMPT};
pub use interfaces::{ModelGateway, RuntimeError, ToolDispatcher};
pub use llm_client::LLMClient;
pub use retry::{retry, RetryPolicy, RetryingGateway, MAX_RETRY_DELAY};
pub use types::{
    ContentBlock, Conversation, GatewayRequest, GatewayResponse, Message, Role, RunOutcome,
    RunStatus, StopReason, Usage,
};
pub use usage::{UsageReport, UsageTracker};
