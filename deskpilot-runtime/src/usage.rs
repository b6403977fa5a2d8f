//! Token and cost accounting across gateway calls.

use crate::types::GatewayResponse;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;

pub const DEFAULT_MODEL: &str = "claude-sonnet-4-20250514";

/// USD per million tokens.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ModelPricing {
    pub input: f64,
    pub output: f64,
}

const PRICING: &[(&str, ModelPricing)] = &[
    (
        DEFAULT_MODEL,
        ModelPricing {
            input: 3.0,
            output: 15.0,
        },
    ),
    (
        "claude-3-5-haiku-20241022",
        ModelPricing {
            input: 0.25,
            output: 1.25,
        },
    ),
];

/// Pricing for `model`, or the default model's when unlisted.
pub fn pricing_for(model: &str) -> ModelPricing {
    PRICING
        .iter()
        .find(|(id, _)| *id == model)
        .or_else(|| PRICING.iter().find(|(id, _)| *id == DEFAULT_MODEL))
        .map(|(_, pricing)| *pricing)
        .unwrap_or(ModelPricing {
            input: 3.0,
            output: 15.0,
        })
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct UsageRecord {
    pub timestamp: DateTime<Utc>,
    pub model: String,
    pub input_tokens: u64,
    pub output_tokens: u64,
}

/// Running totals; only ever grow for the lifetime of a tracker.
#[derive(Debug, Default)]
pub struct UsageTracker {
    requests: u64,
    input_tokens: u64,
    output_tokens: u64,
    history: Vec<UsageRecord>,
}

impl UsageTracker {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn track(&mut self, response: &GatewayResponse, model: &str) {
        let usage = response.usage;
        self.requests += 1;
        self.input_tokens = self.input_tokens.saturating_add(usage.input_tokens);
        self.output_tokens = self.output_tokens.saturating_add(usage.output_tokens);
        self.history.push(UsageRecord {
            timestamp: Utc::now(),
            model: model.to_string(),
            input_tokens: usage.input_tokens,
            output_tokens: usage.output_tokens,
        });
    }

    /// Estimated USD cost of all tracked tokens at `model`'s prices.
    pub fn cost(&self, model: &str) -> f64 {
        let prices = pricing_for(model);
        (self.input_tokens as f64 / 1_000_000.0) * prices.input
            + (self.output_tokens as f64 / 1_000_000.0) * prices.output
    }

    pub fn history(&self) -> &[UsageRecord] {
        &self.history
    }

    /// Snapshot of the totals, priced at the most recently used model.
    pub fn report(&self) -> UsageReport {
        let model = self
            .history
            .last()
            .map(|r| r.model.as_str())
            .unwrap_or(DEFAULT_MODEL);
        UsageReport {
            requests: self.requests,
            input_tokens: self.input_tokens,
            output_tokens: self.output_tokens,
            estimated_cost: self.cost(model),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct UsageReport {
    pub requests: u64,
    pub input_tokens: u64,
    pub output_tokens: u64,
    pub estimated_cost: f64,
}

impl fmt::Display for UsageReport {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "API Usage Report")?;
        writeln!(f, "================")?;
        writeln!(f, "Requests: {}", self.requests)?;
        writeln!(f, "Input tokens: {}", self.input_tokens)?;
        writeln!(f, "Output tokens: {}", self.output_tokens)?;
        write!(f, "Estimated cost: ${:.4}", self.estimated_cost)
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::expect_used, clippy::panic)]
mod tests {
    use super::*;
    use crate::types::{StopReason, Usage};

    fn response(input: u64, output: u64) -> GatewayResponse {
        GatewayResponse {
            stop_reason: StopReason::Completed,
            content: vec![],
            usage: Usage {
                input_tokens: input,
                output_tokens: output,
            },
        }
    }

    #[test]
    fn test_track_accumulates() {
        let mut tracker = UsageTracker::new();
        tracker.track(&response(1000, 200), DEFAULT_MODEL);
        tracker.track(&response(500, 100), DEFAULT_MODEL);

        let report = tracker.report();
        assert_eq!(report.requests, 2);
        assert_eq!(report.input_tokens, 1500);
        assert_eq!(report.output_tokens, 300);
        assert_eq!(tracker.history().len(), 2);
    }

    #[test]
    fn test_cost_uses_model_pricing() {
        let mut tracker = UsageTracker::new();
        tracker.track(&response(1_000_000, 1_000_000), "claude-3-5-haiku-20241022");
        assert!((tracker.cost("claude-3-5-haiku-20241022") - 1.5).abs() < 1e-9);
        assert!((tracker.cost(DEFAULT_MODEL) - 18.0).abs() < 1e-9);
    }

    #[test]
    fn test_unknown_model_falls_back_to_default() {
        let mut tracker = UsageTracker::new();
        tracker.track(&response(2_000_000, 0), "some-future-model");
        assert!((tracker.cost("some-future-model") - 6.0).abs() < 1e-9);
    }

    #[test]
    fn test_report_is_read_only() {
        let mut tracker = UsageTracker::new();
        tracker.track(&response(10, 20), DEFAULT_MODEL);
        let first = tracker.report();
        let second = tracker.report();
        assert_eq!(first, second);
        assert_eq!(tracker.history().len(), 1);
    }

    #[test]
    fn test_report_display() {
        let mut tracker = UsageTracker::new();
        tracker.track(&response(1_000_000, 0), DEFAULT_MODEL);
        let text = tracker.report().to_string();
        assert!(text.contains("Requests: 1"));
        assert!(text.contains("Input tokens: 1000000"));
        assert!(text.contains("Estimated cost: $3.0000"));
    }
}
