//! Device capability and action dispatch for the desktop agent.

pub mod actions;
pub mod device;
pub mod dispatcher;
pub mod error;
pub mod result;
pub mod traits;

pub use actions::{Action, ActionKind, ActionRequest, DeviceCommand, COMPUTER_TOOL_NAME};
pub use device::{
    DeviceBackend, Display, MacOsBackend, MouseButton, Point, Screen, ScrollDirection,
    WaylandBackend,
};
pub use dispatcher::ActionDispatcher;
pub use error::ToolError;
pub use result::{ActionResult, ResultContent};
pub use traits::{
    ActionGuard, AllowAll, Confirmer, PermissionDecision, PermissionRequest, SensitiveActionGuard,
};
