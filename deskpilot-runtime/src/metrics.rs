//! Metrics instrumentation for runtime observability.

use std::time::Instant;

pub const GATEWAY_LATENCY: &str = "gateway_request_latency";
pub const ACTION_LATENCY: &str = "action_execution_latency";
pub const RUN_DURATION: &str = "run_duration";

pub fn record_gateway_latency(duration_ms: f64) {
    metrics::histogram!(GATEWAY_LATENCY, duration_ms);
}

pub fn record_action_latency(duration_ms: f64) {
    metrics::histogram!(ACTION_LATENCY, duration_ms);
}

pub fn record_run_duration(duration_ms: f64) {
    metrics::histogram!(RUN_DURATION, duration_ms);
}

pub fn increment_action_failures() {
    metrics::counter!("action_failures", 1);
}

/// RAII timer for automatic metric recording.
pub struct MetricTimer {
    start: Instant,
    metric_name: &'static str,
}

impl MetricTimer {
    pub fn new(metric_name: &'static str) -> Self {
        Self {
            start: Instant::now(),
            metric_name,
        }
    }
}

impl Drop for MetricTimer {
    fn drop(&mut self) {
        let duration_ms = self.start.elapsed().as_secs_f64() * 1000.0;
        match self.metric_name {
            GATEWAY_LATENCY => record_gateway_latency(duration_ms),
            ACTION_LATENCY => record_action_latency(duration_ms),
            RUN_DURATION => record_run_duration(duration_ms),
            _ => {}
        }
    }
}
