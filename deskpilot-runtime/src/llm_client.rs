//! HTTP model gateway speaking the Messages API with computer use enabled.

use crate::interfaces::{ModelGateway, RuntimeError};
use crate::types::{
    ContentBlock, GatewayRequest, GatewayResponse, Message, Role, StopReason, Usage,
};
use async_trait::async_trait;
use deskpilot_tools::{ActionRequest, ActionResult, ResultContent};
use serde::Deserialize;
use serde_json::{json, Value};
use std::time::Duration;
use tracing::debug;

pub const DEFAULT_API_BASE: &str = "https://api.anthropic.com";
pub const API_VERSION: &str = "2023-06-01";
pub const COMPUTER_USE_BETA: &str = "computer-use-2024-10-22";
pub const DEFAULT_MAX_TOKENS: u32 = 4096;

#[derive(Debug, Deserialize)]
struct WireResponse {
    #[serde(default)]
    content: Vec<WireBlock>,
    stop_reason: Option<String>,
    #[serde(default)]
    usage: Usage,
}

#[derive(Debug, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
enum WireBlock {
    Text {
        text: String,
    },
    ToolUse {
        id: String,
        name: String,
        #[serde(default)]
        input: Value,
    },
    #[serde(other)]
    Unsupported,
}

/// Gateway client over HTTP.
#[derive(Clone)]
pub struct LLMClient {
    base_url: String,
    api_key: String,
    max_tokens: u32,
    client: reqwest::Client,
}

impl LLMClient {
    /// Create a client. Fails when the key is blank or the HTTP client
    /// cannot be built.
    pub fn new(
        base_url: impl Into<String>,
        api_key: impl Into<String>,
        timeout: Duration,
    ) -> Result<Self, RuntimeError> {
        let api_key = api_key.into();
        if api_key.trim().is_empty() {
            return Err(RuntimeError::ConfigError("API key cannot be empty".to_string()));
        }

        let client = reqwest::Client::builder()
            .timeout(timeout)
            .build()
            .map_err(|e| RuntimeError::ConfigError(format!("HTTP client: {e}")))?;

        Ok(Self {
            base_url: base_url.into(),
            api_key,
            max_tokens: DEFAULT_MAX_TOKENS,
            client,
        })
    }

    pub fn with_max_tokens(mut self, max_tokens: u32) -> Self {
        self.max_tokens = max_tokens;
        self
    }

    pub fn endpoint(&self) -> String {
        format!("{}/v1/messages", self.base_url.trim_end_matches('/'))
    }
}

#[async_trait]
impl ModelGateway for LLMClient {
    async fn send(&self, request: &GatewayRequest<'_>) -> Result<GatewayResponse, RuntimeError> {
        let _timer = crate::metrics::MetricTimer::new(crate::metrics::GATEWAY_LATENCY);

        let url = self.endpoint();
        let body = encode_request(request, self.max_tokens);
        debug!(
            "gateway url={} model={} messages={}",
            url,
            request.model,
            request.messages.len()
        );

        let response = self
            .client
            .post(&url)
            .header("x-api-key", &self.api_key)
            .header("anthropic-version", API_VERSION)
            .header("anthropic-beta", COMPUTER_USE_BETA)
            .json(&body)
            .send()
            .await
            .map_err(|e| {
                if e.is_timeout() {
                    RuntimeError::GatewayError("Request timed out".to_string())
                } else if e.is_connect() {
                    RuntimeError::GatewayError("Network connection failed".to_string())
                } else {
                    RuntimeError::GatewayError(format!("HTTP request failed: {e}"))
                }
            })?;

        let status = response.status();
        if !status.is_success() {
            let error_body = response
                .text()
                .await
                .unwrap_or_else(|_| "Unable to read error response".to_string());
            return Err(status_error(status.as_u16(), &error_body));
        }

        let value: Value = response
            .json()
            .await
            .map_err(|e| RuntimeError::GatewayError(format!("Failed to parse response: {e}")))?;
        decode_response(value)
    }
}

/// Readable error for a non-success HTTP status.
pub fn status_error(status: u16, body: &str) -> RuntimeError {
    let msg = match status {
        401 => format!("Authentication failed. Check your API key. Details: {body}"),
        404 => format!("Invalid endpoint (404 Not Found). Details: {body}"),
        429 => format!("Rate limit exceeded. Details: {body}"),
        500..=599 => format!("Model service error (HTTP {status}). Details: {body}"),
        _ => format!("HTTP error {status}. Details: {body}"),
    };
    RuntimeError::GatewayError(msg)
}

/// Request body for one gateway call.
pub fn encode_request(request: &GatewayRequest<'_>, max_tokens: u32) -> Value {
    json!({
        "model": request.model,
        "max_tokens": max_tokens,
        "system": request.system_prompt,
        "tools": request.tools,
        "messages": request.messages.iter().map(encode_message).collect::<Vec<_>>(),
    })
}

fn encode_message(message: &Message) -> Value {
    // Tool results travel in a user turn.
    let role = match message.role {
        Role::Assistant => "assistant",
        Role::User | Role::Tool => "user",
    };
    json!({
        "role": role,
        "content": message.content.iter().map(encode_block).collect::<Vec<_>>(),
    })
}

fn encode_block(block: &ContentBlock) -> Value {
    match block {
        ContentBlock::Text { text } => json!({"type": "text", "text": text}),
        ContentBlock::Image(content) => encode_result_content(content),
        ContentBlock::ToolUse(request) => encode_tool_use(request),
        ContentBlock::ToolResult(result) => encode_tool_result(result),
    }
}

fn encode_result_content(content: &ResultContent) -> Value {
    match content {
        ResultContent::Text { text } => json!({"type": "text", "text": text}),
        ResultContent::Image { media_type, .. } => json!({
            "type": "image",
            "source": {
                "type": "base64",
                "media_type": media_type,
                "data": content.image_base64().unwrap_or_default(),
            }
        }),
    }
}

fn encode_tool_use(request: &ActionRequest) -> Value {
    json!({
        "type": "tool_use",
        "id": request.id,
        "name": request.name,
        "input": request.input,
    })
}

fn encode_tool_result(result: &ActionResult) -> Value {
    json!({
        "type": "tool_result",
        "tool_use_id": result.request_id,
        "is_error": result.is_error,
        "content": result.content.iter().map(encode_result_content).collect::<Vec<_>>(),
    })
}

/// Parse a response body into the runtime's view.
pub fn decode_response(value: Value) -> Result<GatewayResponse, RuntimeError> {
    let wire: WireResponse = serde_json::from_value(value)
        .map_err(|e| RuntimeError::GatewayError(format!("Malformed response: {e}")))?;

    let stop_reason = match wire.stop_reason.as_deref() {
        Some("end_turn") => StopReason::Completed,
        Some("tool_use") => StopReason::ActionRequested,
        Some(other) => StopReason::Other(other.to_string()),
        None => StopReason::Other("none".to_string()),
    };

    let content = wire
        .content
        .into_iter()
        .filter_map(|block| match block {
            WireBlock::Text { text } => Some(ContentBlock::text(text)),
            WireBlock::ToolUse { id, name, input } => {
                Some(ContentBlock::ToolUse(ActionRequest::new(id, name, input)))
            }
            WireBlock::Unsupported => None,
        })
        .collect();

    Ok(GatewayResponse {
        stop_reason,
        content,
        usage: wire.usage,
    })
}

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::expect_used, clippy::panic)]
mod tests {
    use super::*;
    use crate::types::Conversation;

    #[test]
    fn test_blank_api_key_is_rejected() {
        let result = LLMClient::new(DEFAULT_API_BASE, "  ", Duration::from_secs(5));
        assert!(matches!(result, Err(RuntimeError::ConfigError(_))));
    }

    #[test]
    fn test_endpoint_trims_trailing_slash() {
        let client = LLMClient::new("http://localhost:8080/", "key", Duration::from_secs(5)).unwrap();
        assert_eq!(client.endpoint(), "http://localhost:8080/v1/messages");
    }

    #[test]
    fn test_encode_first_turn() {
        let conversation = Conversation::start("open settings", vec![0x89, 0x50]);
        let tools = vec![json!({"name": "computer"})];
        let request = GatewayRequest {
            model: "m",
            system_prompt: "be careful",
            tools: &tools,
            messages: conversation.messages(),
        };

        let body = encode_request(&request, 1024);
        assert_eq!(body["model"], "m");
        assert_eq!(body["max_tokens"], 1024);
        assert_eq!(body["system"], "be careful");
        let content = &body["messages"][0]["content"];
        assert_eq!(body["messages"][0]["role"], "user");
        assert_eq!(content[0]["text"], "open settings");
        assert_eq!(content[1]["type"], "image");
        assert_eq!(content[1]["source"]["media_type"], "image/png");
        assert_eq!(content[1]["source"]["data"], "iVA=");
    }

    #[test]
    fn test_encode_tool_result_turn() {
        let mut conversation = Conversation::start("task", vec![]);
        conversation
            .push_exchange(
                vec![ContentBlock::ToolUse(ActionRequest::new(
                    "toolu_1",
                    "computer",
                    json!({"action": "left_click", "coordinate": [1, 2]}),
                ))],
                vec![ActionResult::failure("toolu_1", "Unknown action: foo")],
            )
            .unwrap();

        let encoded: Vec<Value> = conversation.messages().iter().map(encode_message).collect();
        assert_eq!(encoded[1]["role"], "assistant");
        assert_eq!(encoded[1]["content"][0]["type"], "tool_use");
        assert_eq!(encoded[1]["content"][0]["input"]["action"], "left_click");
        assert_eq!(encoded[2]["role"], "user");
        let result = &encoded[2]["content"][0];
        assert_eq!(result["type"], "tool_result");
        assert_eq!(result["tool_use_id"], "toolu_1");
        assert_eq!(result["is_error"], true);
        assert_eq!(result["content"][0]["text"], "Unknown action: foo");
    }

    #[test]
    fn test_decode_tool_use_response() {
        let response = decode_response(json!({
            "id": "msg_1",
            "content": [
                {"type": "text", "text": "Clicking the button"},
                {"type": "tool_use", "id": "toolu_9", "name": "computer",
                 "input": {"action": "left_click", "coordinate": [100, 200]}}
            ],
            "stop_reason": "tool_use",
            "usage": {"input_tokens": 1200, "output_tokens": 80}
        }))
        .unwrap();

        assert_eq!(response.stop_reason, StopReason::ActionRequested);
        assert_eq!(response.text(), "Clicking the button");
        let requests = response.action_requests();
        assert_eq!(requests.len(), 1);
        assert_eq!(requests[0].id, "toolu_9");
        assert_eq!(response.usage.input_tokens, 1200);
    }

    #[test]
    fn test_decode_skips_unsupported_blocks() {
        let response = decode_response(json!({
            "content": [
                {"type": "thinking", "thinking": "hmm"},
                {"type": "text", "text": "Done"}
            ],
            "stop_reason": "end_turn",
            "usage": {"input_tokens": 1, "output_tokens": 1}
        }))
        .unwrap();
        assert_eq!(response.stop_reason, StopReason::Completed);
        assert_eq!(response.content.len(), 1);
    }

    #[test]
    fn test_decode_rejects_garbage() {
        let err = decode_response(json!({"content": "nope"})).unwrap_err();
        assert!(matches!(err, RuntimeError::GatewayError(_)));
    }

    #[test]
    fn test_status_errors_are_readable() {
        assert!(status_error(401, "bad key").to_string().contains("Authentication failed"));
        assert!(status_error(429, "").to_string().contains("Rate limit"));
        assert!(status_error(529, "overloaded").to_string().contains("HTTP 529"));
    }
}
