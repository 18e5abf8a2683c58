use serde::{Deserialize, Serialize};

use crate::{
    domain::{EntityId, StatusLightData, WireColor, WireId, WireLetter, WiresAction},
    error::Rejection,
};

/// What the client knows about a wire. Carries no hint of the bound action.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct ClientWire {
    pub id: WireId,
    pub is_cut: bool,
    pub color: WireColor,
    pub letter: WireLetter,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StatusEntry {
    pub key: String,
    pub light: StatusLightData,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct WiresUiState {
    pub wires: Vec<ClientWire>,
    pub statuses: Vec<StatusEntry>,
    pub board_name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub serial_number: Option<String>,
    pub wire_seed: i32,
}

/// Sent by the client when a wire is clicked in the panel window.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct WiresActionMessage {
    pub id: WireId,
    pub action: WiresAction,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PanelSound {
    ToolUse,
    Pulse,
    ScrewdriverOpen,
    ScrewdriverClose,
}

/// Outbound notifications produced by the wires system. The host drains them
/// once per frame and routes them to clients, the audio layer and sprites.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", content = "payload", rename_all = "snake_case")]
pub enum PanelEvent {
    UiState {
        entity: EntityId,
        state: WiresUiState,
    },
    UiOpened {
        entity: EntityId,
        actor: EntityId,
    },
    UiClosed {
        entity: EntityId,
    },
    Popup {
        entity: EntityId,
        actor: EntityId,
        rejection: Rejection,
    },
    Sound {
        entity: EntityId,
        sound: PanelSound,
    },
    Appearance {
        entity: EntityId,
        panel_open: bool,
    },
}

#[cfg(test)]
#[path = "tests/protocol_tests.rs"]
mod tests;
