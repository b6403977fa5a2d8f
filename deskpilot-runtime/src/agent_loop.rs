//! Agent loop - drives a task to completion against a model gateway.

use crate::interfaces::{ModelGateway, RuntimeError, ToolDispatcher};
use crate::metrics::{MetricTimer, RUN_DURATION};
use crate::types::{
    ContentBlock, Conversation, GatewayRequest, RunOutcome, RunStatus, StopReason,
};
use crate::usage::{UsageReport, UsageTracker};
use parking_lot::Mutex;
use std::sync::Arc;
use tracing::{debug, info, warn};

pub const DEFAULT_MAX_ITERATIONS: usize = 25;

pub const SYSTEM_PROMPT: &str = "You are a computer use agent. You can see the screen and control the mouse and keyboard to complete tasks.

Guidelines:
1. Always start by looking at the current state of the screen
2. Think step by step about what you need to do
3. Click precisely on UI elements you can see
4. Wait for pages and applications to load after actions
5. Report when the task is complete or if you encounter issues

Be careful and methodical. If something doesn't work, try an alternative approach.
Do not click on elements you cannot clearly see in the screenshot.";

const COMPLETED_FALLBACK: &str = "Task completed";
const EXHAUSTED_TEXT: &str = "Max iterations reached without completing task";
const STALLED_TEXT: &str = "Model response contained neither text nor actions";

/// Core agent execution loop.
///
/// Strictly sequential: one gateway call at a time, and the actions of a turn
/// run one after another in request order.
pub struct AgentLoop<G, D>
where
    G: ModelGateway,
    D: ToolDispatcher,
{
    gateway: Arc<G>,
    dispatcher: Arc<D>,
    model: String,
    system_prompt: String,
    usage: Mutex<UsageTracker>,
}

impl<G, D> AgentLoop<G, D>
where
    G: ModelGateway,
    D: ToolDispatcher,
{
    pub fn new(gateway: Arc<G>, dispatcher: Arc<D>, model: impl Into<String>) -> Self {
        Self {
            gateway,
            dispatcher,
            model: model.into(),
            system_prompt: SYSTEM_PROMPT.to_string(),
            usage: Mutex::new(UsageTracker::new()),
        }
    }

    pub fn with_system_prompt(mut self, system_prompt: impl Into<String>) -> Self {
        self.system_prompt = system_prompt.into();
        self
    }

    pub fn model(&self) -> &str {
        &self.model
    }

    /// Usage accumulated over every run made with this loop.
    pub fn usage_report(&self) -> UsageReport {
        self.usage.lock().report()
    }

    /// Run `task` for at most `max_iterations` gateway calls.
    ///
    /// Action failures are fed back to the model and never end the run;
    /// gateway errors propagate.
    pub async fn run(&self, task: &str, max_iterations: usize) -> Result<RunOutcome, RuntimeError> {
        let _timer = MetricTimer::new(RUN_DURATION);
        info!("Starting task: {}", task);

        let screenshot = self.dispatcher.screenshot().await?;
        let mut conversation = Conversation::start(task, screenshot);
        let tools = self.dispatcher.tool_schemas();

        for iteration in 1..=max_iterations {
            info!("iteration {}/{}", iteration, max_iterations);

            let response = self
                .gateway
                .send(&GatewayRequest {
                    model: &self.model,
                    system_prompt: &self.system_prompt,
                    tools: &tools,
                    messages: conversation.messages(),
                })
                .await?;
            self.usage.lock().track(&response, &self.model);

            let requests = response.action_requests();
            let text = response.text();

            // An explicit end of turn, or plain text with nothing to do, completes.
            if response.stop_reason == StopReason::Completed
                || (requests.is_empty() && !text.trim().is_empty())
            {
                info!("Task complete after {} iterations", iteration);
                conversation.push_final(without_requests(response.content))?;
                return Ok(RunOutcome {
                    status: RunStatus::Completed,
                    text: non_empty_or(text, COMPLETED_FALLBACK),
                    iterations: iteration,
                    conversation,
                });
            }

            if requests.is_empty() {
                warn!(
                    "Gateway stopped ({:?}) with neither text nor actions",
                    response.stop_reason
                );
                conversation.push_final(response.content)?;
                return Ok(RunOutcome {
                    status: RunStatus::Stalled,
                    text: STALLED_TEXT.to_string(),
                    iterations: iteration,
                    conversation,
                });
            }

            let mut results = Vec::with_capacity(requests.len());
            for request in &requests {
                debug!("action {} ({})", request.action_name(), request.id);
                results.push(self.dispatcher.dispatch(request).await);
            }
            conversation.push_exchange(response.content, results)?;
        }

        warn!("Max iterations ({}) reached", max_iterations);
        Ok(RunOutcome {
            status: RunStatus::Exhausted,
            text: EXHAUSTED_TEXT.to_string(),
            iterations: max_iterations,
            conversation,
        })
    }
}

fn non_empty_or(text: String, fallback: &str) -> String {
    if text.trim().is_empty() {
        fallback.to_string()
    } else {
        text
    }
}

fn without_requests(content: Vec<ContentBlock>) -> Vec<ContentBlock> {
    content
        .into_iter()
        .filter(|block| !matches!(block, ContentBlock::ToolUse(_)))
        .collect()
}
