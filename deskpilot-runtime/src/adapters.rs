//! Bridges the tools crate's dispatcher into the runtime's interfaces.

use crate::interfaces::{RuntimeError, ToolDispatcher};
use crate::metrics::{self, MetricTimer};
use async_trait::async_trait;
use deskpilot_tools::{ActionDispatcher, ActionRequest, ActionResult, DeviceBackend};

#[async_trait]
impl<B: DeviceBackend + 'static> ToolDispatcher for ActionDispatcher<B> {
    fn tool_schemas(&self) -> Vec<serde_json::Value> {
        vec![self.tool_schema()]
    }

    async fn screenshot(&self) -> Result<Vec<u8>, RuntimeError> {
        Ok(ActionDispatcher::screenshot(self).await?)
    }

    async fn dispatch(&self, request: &ActionRequest) -> ActionResult {
        let _timer = MetricTimer::new(metrics::ACTION_LATENCY);
        let result = ActionDispatcher::dispatch(self, request).await;
        if result.is_error {
            metrics::increment_action_failures();
        }
        result
    }
}
