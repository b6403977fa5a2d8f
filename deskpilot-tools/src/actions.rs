//! Action schema: the closed set of device operations a model may request.

use crate::device::{Display, MouseButton, Point, ScrollDirection};
use crate::error::ToolError;
use serde::{Deserialize, Serialize};
use serde_json::{json, Value};
use std::fmt;
use std::str::FromStr;

/// Name of the single tool the model calls for every action.
pub const COMPUTER_TOOL_NAME: &str = "computer";
/// Tool type understood by the model gateway.
pub const COMPUTER_TOOL_TYPE: &str = "computer_20241022";
pub const DEFAULT_SCROLL_AMOUNT: u32 = 3;

/// A tool invocation as received from the model gateway.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ActionRequest {
    pub id: String,
    pub name: String,
    pub input: Value,
}

impl ActionRequest {
    pub fn new(id: impl Into<String>, name: impl Into<String>, input: Value) -> Self {
        Self {
            id: id.into(),
            name: name.into(),
            input,
        }
    }

    /// The raw action name, for logs and error messages.
    pub fn action_name(&self) -> &str {
        self.input
            .get("action")
            .or_else(|| self.input.get("kind"))
            .and_then(Value::as_str)
            .unwrap_or("unknown")
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ActionKind {
    Screenshot,
    MouseMove,
    LeftClick,
    RightClick,
    DoubleClick,
    LeftClickDrag,
    Type,
    Key,
    Scroll,
}

impl ActionKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Screenshot => "screenshot",
            Self::MouseMove => "mouse_move",
            Self::LeftClick => "left_click",
            Self::RightClick => "right_click",
            Self::DoubleClick => "double_click",
            Self::LeftClickDrag => "left_click_drag",
            Self::Type => "type",
            Self::Key => "key",
            Self::Scroll => "scroll",
        }
    }
}

impl fmt::Display for ActionKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for ActionKind {
    type Err = ToolError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "screenshot" => Ok(Self::Screenshot),
            "mouse_move" => Ok(Self::MouseMove),
            "left_click" => Ok(Self::LeftClick),
            "right_click" => Ok(Self::RightClick),
            "double_click" => Ok(Self::DoubleClick),
            "left_click_drag" => Ok(Self::LeftClickDrag),
            "type" => Ok(Self::Type),
            "key" => Ok(Self::Key),
            "scroll" => Ok(Self::Scroll),
            other => Err(ToolError::UnknownAction(other.to_string())),
        }
    }
}

/// Wire shape of the `computer` tool input.
#[derive(Debug, Default, Deserialize)]
struct WireAction {
    action: Option<String>,
    kind: Option<String>,
    coordinate: Option<[i64; 2]>,
    start_coordinate: Option<[i64; 2]>,
    end_coordinate: Option<[i64; 2]>,
    text: Option<String>,
    direction: Option<String>,
    amount: Option<u32>,
}

/// A parsed action. Coordinates are still raw model values; they become
/// [`Point`]s only through [`Action::validate`].
#[derive(Debug, Clone, PartialEq)]
pub enum Action {
    Screenshot,
    MouseMove { coordinate: [i64; 2] },
    Click { coordinate: [i64; 2], button: MouseButton },
    DoubleClick { coordinate: [i64; 2] },
    Drag { start: [i64; 2], end: [i64; 2] },
    Type { text: String },
    Key { name: String },
    Scroll {
        coordinate: [i64; 2],
        direction: ScrollDirection,
        amount: u32,
    },
}

fn required<T>(value: Option<T>, kind: ActionKind, field: &str) -> Result<T, ToolError> {
    value.ok_or_else(|| {
        ToolError::ValidationError(format!("{kind} requires '{field}'"))
    })
}

impl Action {
    /// Parse the input of a `computer` tool call.
    pub fn parse(input: &Value) -> Result<Self, ToolError> {
        let wire: WireAction = serde_json::from_value(input.clone())
            .map_err(|e| ToolError::ValidationError(format!("malformed action input: {e}")))?;
        // `action` wins when both names are present.
        let kind: ActionKind = wire
            .action
            .as_deref()
            .or(wire.kind.as_deref())
            .ok_or_else(|| ToolError::ValidationError("missing 'action' field".to_string()))?
            .parse()?;

        let action = match kind {
            ActionKind::Screenshot => Action::Screenshot,
            ActionKind::MouseMove => Action::MouseMove {
                coordinate: required(wire.coordinate, kind, "coordinate")?,
            },
            ActionKind::LeftClick => Action::Click {
                coordinate: required(wire.coordinate, kind, "coordinate")?,
                button: MouseButton::Left,
            },
            ActionKind::RightClick => Action::Click {
                coordinate: required(wire.coordinate, kind, "coordinate")?,
                button: MouseButton::Right,
            },
            ActionKind::DoubleClick => Action::DoubleClick {
                coordinate: required(wire.coordinate, kind, "coordinate")?,
            },
            ActionKind::LeftClickDrag => Action::Drag {
                start: required(wire.start_coordinate.or(wire.coordinate), kind, "start_coordinate")?,
                end: required(wire.end_coordinate, kind, "end_coordinate")?,
            },
            ActionKind::Type => Action::Type {
                text: required(wire.text, kind, "text")?,
            },
            ActionKind::Key => Action::Key {
                name: required(wire.text, kind, "text")?,
            },
            ActionKind::Scroll => Action::Scroll {
                coordinate: required(wire.coordinate, kind, "coordinate")?,
                direction: wire
                    .direction
                    .as_deref()
                    .unwrap_or("down")
                    .parse()?,
                amount: wire.amount.unwrap_or(DEFAULT_SCROLL_AMOUNT),
            },
        };
        Ok(action)
    }

    pub fn kind(&self) -> ActionKind {
        match self {
            Action::Screenshot => ActionKind::Screenshot,
            Action::MouseMove { .. } => ActionKind::MouseMove,
            Action::Click {
                button: MouseButton::Left,
                ..
            } => ActionKind::LeftClick,
            Action::Click {
                button: MouseButton::Right,
                ..
            } => ActionKind::RightClick,
            Action::DoubleClick { .. } => ActionKind::DoubleClick,
            Action::Drag { .. } => ActionKind::LeftClickDrag,
            Action::Type { .. } => ActionKind::Type,
            Action::Key { .. } => ActionKind::Key,
            Action::Scroll { .. } => ActionKind::Scroll,
        }
    }

    /// Check every coordinate against `display` and produce the device
    /// command. Nothing reaches the device unless this succeeds.
    pub fn validate(&self, display: &Display) -> Result<DeviceCommand, ToolError> {
        let point = |[x, y]: [i64; 2]| display.validate(x, y);
        let command = match self {
            Action::Screenshot => DeviceCommand::Capture,
            Action::MouseMove { coordinate } => DeviceCommand::MoveTo(point(*coordinate)?),
            Action::Click { coordinate, button } => {
                DeviceCommand::Click(point(*coordinate)?, *button)
            }
            Action::DoubleClick { coordinate } => DeviceCommand::DoubleClick(point(*coordinate)?),
            Action::Drag { start, end } => DeviceCommand::Drag(point(*start)?, point(*end)?),
            Action::Type { text } => DeviceCommand::Type(text.clone()),
            Action::Key { name } => DeviceCommand::Key(crate::device::keymap::translate(name)),
            Action::Scroll {
                coordinate,
                direction,
                amount,
            } => DeviceCommand::Scroll(point(*coordinate)?, *direction, *amount),
        };
        Ok(command)
    }
}

/// One validated operation against the device capability.
#[derive(Debug, Clone, PartialEq)]
pub enum DeviceCommand {
    Capture,
    MoveTo(Point),
    Click(Point, MouseButton),
    DoubleClick(Point),
    Drag(Point, Point),
    Type(String),
    /// Already translated to a device key code.
    Key(String),
    Scroll(Point, ScrollDirection, u32),
}

impl DeviceCommand {
    pub fn is_mutating(&self) -> bool {
        !matches!(self, DeviceCommand::Capture)
    }
}

/// Tool definition advertised to the model gateway.
pub fn computer_tool_schema(display: &Display) -> Value {
    json!({
        "type": COMPUTER_TOOL_TYPE,
        "name": COMPUTER_TOOL_NAME,
        "display_width_px": display.width,
        "display_height_px": display.height,
        "display_number": 1
    })
}
