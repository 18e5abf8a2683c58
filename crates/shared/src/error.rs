use serde::{Deserialize, Serialize};
use thiserror::Error;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RejectionCode {
    NoPanel,
    PanelClosed,
    CannotReach,
    NoTool,
    UnknownWire,
    NeedWirecutters,
    NeedMultitool,
    CannotPulseCutWire,
}

impl RejectionCode {
    pub fn default_message(self) -> &'static str {
        match self {
            RejectionCode::NoPanel => "There are no wires here.",
            RejectionCode::PanelClosed => "The maintenance panel is closed.",
            RejectionCode::CannotReach => "You can't reach there!",
            RejectionCode::NoTool => "You need to hold a tool in your hand!",
            RejectionCode::UnknownWire => "That wire doesn't exist.",
            RejectionCode::NeedWirecutters => "You need to hold a wirecutter in your hand!",
            RejectionCode::NeedMultitool => "You need to hold a multitool in your hand!",
            RejectionCode::CannotPulseCutWire => "You can't pulse a wire that's been cut!",
        }
    }
}

/// A refused interaction, shown to the actor as a transient popup.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, Error)]
#[error("{code:?}: {message}")]
pub struct Rejection {
    pub code: RejectionCode,
    pub message: String,
}

impl Rejection {
    pub fn new(code: RejectionCode, message: impl Into<String>) -> Self {
        Self {
            code,
            message: message.into(),
        }
    }
}

impl From<RejectionCode> for Rejection {
    fn from(code: RejectionCode) -> Self {
        Self::new(code, code.default_message())
    }
}
