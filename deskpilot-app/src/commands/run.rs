use super::build_dispatcher;
use anyhow::{Context, Result};
use deskpilot_runtime::{AgentLoop, LLMClient, PilotConfig, RetryingGateway, RunStatus};
use std::sync::Arc;

pub async fn run(config: &PilotConfig, task: &str, max_iterations: Option<usize>) -> Result<RunStatus> {
    // Setup failures surface here, before the first iteration.
    let api_key = config.require_api_key()?;
    let dispatcher = Arc::new(build_dispatcher(config).await?);
    let client = LLMClient::new(&config.api_base_url, api_key, config.gateway_timeout())?
        .with_max_tokens(config.max_tokens);
    let gateway = Arc::new(RetryingGateway::new(client, config.retry.policy()));

    let mut agent = AgentLoop::new(gateway, dispatcher, config.model.clone());
    if let Some(prompt) = &config.system_prompt {
        agent = agent.with_system_prompt(prompt.clone());
    }

    let max_iterations = max_iterations.unwrap_or(config.max_iterations);
    println!("🤖 Starting task: {}", task);
    println!("{}", "-".repeat(50));

    let outcome = agent
        .run(task, max_iterations)
        .await
        .context("Agent run failed")?;

    let marker = match outcome.status {
        RunStatus::Completed => "✅",
        RunStatus::Exhausted | RunStatus::Stalled => "⚠️",
    };
    println!(
        "{} {} after {} iteration(s): {}",
        marker, outcome.status, outcome.iterations, outcome.text
    );
    println!();
    println!("{}", agent.usage_report());

    Ok(outcome.status)
}
