//! Core type definitions for the agent runtime.

use crate::interfaces::RuntimeError;
use deskpilot_tools::{ActionRequest, ActionResult, ResultContent};
use serde::{Deserialize, Serialize};
use std::fmt;

/// Message role in conversation.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Role {
    User,
    Assistant,
    /// Turn holding the results of the preceding assistant turn's actions.
    Tool,
}

/// One block of message content.
///
/// Wire encoding lives with the gateway client; these are the runtime's
/// own view of a turn.
#[derive(Debug, Clone, PartialEq)]
pub enum ContentBlock {
    Text { text: String },
    Image(ResultContent),
    ToolUse(ActionRequest),
    ToolResult(ActionResult),
}

impl ContentBlock {
    pub fn text(text: impl Into<String>) -> Self {
        ContentBlock::Text { text: text.into() }
    }

    pub fn png(data: Vec<u8>) -> Self {
        ContentBlock::Image(ResultContent::png(data))
    }
}

/// A single message in the conversation.
#[derive(Debug, Clone, PartialEq)]
pub struct Message {
    pub role: Role,
    pub content: Vec<ContentBlock>,
}

impl Message {
    pub fn new(role: Role, content: Vec<ContentBlock>) -> Self {
        Self { role, content }
    }

    pub fn action_requests(&self) -> impl Iterator<Item = &ActionRequest> {
        self.content.iter().filter_map(|block| match block {
            ContentBlock::ToolUse(request) => Some(request),
            _ => None,
        })
    }
}

/// Append-only turn history for one run.
///
/// Every assistant turn that requests actions is immediately followed by a
/// tool turn holding one result per request, in request order.
#[derive(Debug, Clone, Default)]
pub struct Conversation {
    messages: Vec<Message>,
}

impl Conversation {
    /// Open a conversation with the task and the screen as it looks now.
    pub fn start(task: &str, screenshot: Vec<u8>) -> Self {
        Self {
            messages: vec![Message::new(
                Role::User,
                vec![ContentBlock::text(task), ContentBlock::png(screenshot)],
            )],
        }
    }

    pub fn messages(&self) -> &[Message] {
        &self.messages
    }

    pub fn len(&self) -> usize {
        self.messages.len()
    }

    pub fn is_empty(&self) -> bool {
        self.messages.is_empty()
    }

    /// Append an assistant turn with its action results.
    pub fn push_exchange(
        &mut self,
        assistant: Vec<ContentBlock>,
        results: Vec<ActionResult>,
    ) -> Result<(), RuntimeError> {
        let assistant = Message::new(Role::Assistant, assistant);
        let ids: Vec<&str> = assistant.action_requests().map(|r| r.id.as_str()).collect();
        if ids.is_empty() {
            return Err(RuntimeError::ConversationError(
                "exchange without action requests".to_string(),
            ));
        }
        let matches = ids.len() == results.len()
            && ids
                .iter()
                .zip(&results)
                .all(|(id, result)| *id == result.request_id);
        if !matches {
            return Err(RuntimeError::ConversationError(format!(
                "results do not match requests {ids:?}"
            )));
        }

        let results = results.into_iter().map(ContentBlock::ToolResult).collect();
        self.messages.push(assistant);
        self.messages.push(Message::new(Role::Tool, results));
        Ok(())
    }

    /// Append a closing assistant turn that requests nothing.
    pub fn push_final(&mut self, assistant: Vec<ContentBlock>) -> Result<(), RuntimeError> {
        let message = Message::new(Role::Assistant, assistant);
        if message.action_requests().next().is_some() {
            return Err(RuntimeError::ConversationError(
                "final turn cannot carry action requests".to_string(),
            ));
        }
        self.messages.push(message);
        Ok(())
    }
}

/// Why the gateway stopped generating.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum StopReason {
    Completed,
    ActionRequested,
    Other(String),
}

/// Token counts reported for one gateway call.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Usage {
    pub input_tokens: u64,
    pub output_tokens: u64,
}

/// Structured response from the model gateway.
#[derive(Debug, Clone, PartialEq)]
pub struct GatewayResponse {
    pub stop_reason: StopReason,
    pub content: Vec<ContentBlock>,
    pub usage: Usage,
}

impl GatewayResponse {
    /// Concatenated text blocks.
    pub fn text(&self) -> String {
        self.content
            .iter()
            .filter_map(|block| match block {
                ContentBlock::Text { text } => Some(text.as_str()),
                _ => None,
            })
            .collect::<Vec<_>>()
            .join("\n")
    }

    pub fn action_requests(&self) -> Vec<ActionRequest> {
        self.content
            .iter()
            .filter_map(|block| match block {
                ContentBlock::ToolUse(request) => Some(request.clone()),
                _ => None,
            })
            .collect()
    }
}

/// Everything the gateway sees for one call.
#[derive(Debug, Clone, Copy)]
pub struct GatewayRequest<'a> {
    pub model: &'a str,
    pub system_prompt: &'a str,
    pub tools: &'a [serde_json::Value],
    pub messages: &'a [Message],
}

/// How a run ended.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum RunStatus {
    Completed,
    Exhausted,
    Stalled,
}

impl fmt::Display for RunStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            RunStatus::Completed => "completed",
            RunStatus::Exhausted => "exhausted",
            RunStatus::Stalled => "stalled",
        };
        f.write_str(s)
    }
}

/// Result of `AgentLoop::run`.
#[derive(Debug, Clone)]
pub struct RunOutcome {
    pub status: RunStatus,
    pub text: String,
    /// Gateway calls made.
    pub iterations: usize,
    pub conversation: Conversation,
}
