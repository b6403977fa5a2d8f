use crate::actions::{
    computer_tool_schema, Action, ActionKind, ActionRequest, DeviceCommand, COMPUTER_TOOL_NAME,
};
use crate::device::{DeviceBackend, Display, Screen};
use crate::error::ToolError;
use crate::result::{ActionResult, ResultContent};
use crate::traits::{ActionGuard, AllowAll, PermissionDecision, PermissionRequest};
use std::future::Future;
use std::sync::Arc;
use tokio::time::{timeout, Duration};
use tracing::{debug, error, info, warn};

/// Maps action requests onto device operations.
///
/// `dispatch` never fails: every error is folded into a failure-flagged
/// [`ActionResult`] for that request, so one bad action cannot end a run.
pub struct ActionDispatcher<B> {
    screen: Arc<Screen<B>>,
    guard: Arc<dyn ActionGuard>,
    timeout_ms: u64,
}

impl<B: DeviceBackend + 'static> ActionDispatcher<B> {
    /// `timeout_ms` bounds each device stage of a dispatch separately: the
    /// action itself, then the follow-up capture.
    pub fn new(screen: Screen<B>, timeout_ms: u64) -> Self {
        Self {
            screen: Arc::new(screen),
            guard: Arc::new(AllowAll),
            timeout_ms,
        }
    }

    pub fn with_guard(mut self, guard: Arc<dyn ActionGuard>) -> Self {
        self.guard = guard;
        self
    }

    pub fn display(&self) -> Display {
        self.screen.display()
    }

    pub fn screen(&self) -> &Screen<B> {
        &self.screen
    }

    /// Tool definition to advertise to the model.
    pub fn tool_schema(&self) -> serde_json::Value {
        computer_tool_schema(&self.screen.display())
    }

    /// Processed screenshot outside of any action, e.g. to seed a run.
    pub async fn screenshot(&self) -> Result<Vec<u8>, ToolError> {
        self.screen.capture().await
    }

    pub async fn dispatch(&self, request: &ActionRequest) -> ActionResult {
        let name = request.action_name().to_string();
        info!("Dispatching action: {} ({})", name, request.id);

        match self.try_dispatch(request).await {
            Ok(content) => ActionResult::success(request.id.clone(), content),
            Err(e) => {
                warn!("Action {} ({}) failed: {}", name, request.id, e);
                ActionResult::failure(request.id.clone(), failure_reason(&name, &e))
            }
        }
    }

    async fn try_dispatch(&self, request: &ActionRequest) -> Result<Vec<ResultContent>, ToolError> {
        if request.name != COMPUTER_TOOL_NAME {
            return Err(ToolError::UnknownTool(request.name.clone()));
        }

        // 1. Parse and bounds-check before anything touches the device
        let action = Action::parse(&request.input)?;
        let command = action.validate(&self.screen.display())?;

        // 2. Guard
        let decision = self
            .guard
            .check(&PermissionRequest {
                request_id: request.id.clone(),
                action: action.kind().to_string(),
                input: request.input.clone(),
            })
            .await;
        match decision {
            PermissionDecision::Allow => {}
            PermissionDecision::Deny(reason) => return Err(ToolError::PermissionDenied(reason)),
            PermissionDecision::RequireApproval(msg) => {
                return Err(ToolError::PermissionDenied(format!("approval required: {msg}")))
            }
        }

        // 3. Execute
        let kind = action.kind();
        let screen = Arc::clone(&self.screen);
        let performed = self
            .execute_with_protection(kind, async move { perform(&screen, command).await })
            .await?;
        if let Some(png) = performed {
            return Ok(vec![ResultContent::png(png)]);
        }

        // 4. Mutating actions report the post-action state; a failed capture
        // leaves the result successful.
        let confirmation = ResultContent::text(format!("Action '{kind}' completed successfully."));
        let screen = Arc::clone(&self.screen);
        match self
            .execute_with_protection(kind, async move { screen.capture().await })
            .await
        {
            Ok(png) => Ok(vec![confirmation, ResultContent::png(png)]),
            Err(e) => {
                warn!("Screenshot after {} failed: {}", kind, e);
                Ok(vec![
                    confirmation,
                    ResultContent::text(format!("Screenshot after the action failed: {e}")),
                ])
            }
        }
    }

    /// Run one device stage in its own task under the dispatch budget, so a
    /// panic or hang fails only this stage.
    async fn execute_with_protection<T, F>(&self, kind: ActionKind, stage: F) -> Result<T, ToolError>
    where
        T: Send + 'static,
        F: Future<Output = Result<T, ToolError>> + Send + 'static,
    {
        let timeout_ms = self.timeout_ms;
        let handle = tokio::spawn(stage);
        let abort = handle.abort_handle();

        match timeout(Duration::from_millis(timeout_ms), handle).await {
            Ok(Ok(result)) => result,
            Ok(Err(join_err)) => {
                if join_err.is_panic() {
                    error!("Action {} panicked", kind);
                } else {
                    error!("Action {} cancelled", kind);
                }
                Err(ToolError::Internal)
            }
            Err(_) => {
                abort.abort();
                warn!("Action {} timed out after {}ms", kind, timeout_ms);
                Err(ToolError::Timeout(timeout_ms))
            }
        }
    }
}

/// Issue the device call for `command`. Only a capture yields an image.
async fn perform<B: DeviceBackend>(
    screen: &Screen<B>,
    command: DeviceCommand,
) -> Result<Option<Vec<u8>>, ToolError> {
    debug!("device command: {:?}", command);
    match command {
        DeviceCommand::Capture => return Ok(Some(screen.capture().await?)),
        DeviceCommand::MoveTo(at) => screen.move_to(at).await?,
        DeviceCommand::Click(at, button) => screen.click(at, button).await?,
        DeviceCommand::DoubleClick(at) => screen.double_click(at).await?,
        DeviceCommand::Drag(from, to) => screen.drag(from, to).await?,
        DeviceCommand::Type(text) => screen.type_text(&text).await?,
        DeviceCommand::Key(code) => screen.key(&code).await?,
        DeviceCommand::Scroll(at, direction, amount) => {
            screen.scroll(at, direction, amount).await?
        }
    }
    Ok(None)
}

fn failure_reason(action: &str, err: &ToolError) -> String {
    match err {
        ToolError::UnknownAction(_) | ToolError::UnknownTool(_) => err.to_string(),
        _ => format!("Error executing {action}: {err}"),
    }
}
