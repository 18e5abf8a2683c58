use std::collections::BTreeMap;

use shared::{
    domain::StatusLightData,
    protocol::{StatusEntry, WiresUiState},
};

use crate::panel::Panel;

/// Collects every wire's status light by status key. Later wires overwrite
/// earlier ones that report under the same key. Lights of actions that need
/// power are forced off on an unpowered panel.
pub fn collect_statuses(panel: &Panel) -> BTreeMap<String, StatusLightData> {
    let mut statuses = BTreeMap::new();

    for wire in panel.wires() {
        let action = wire.action();
        let Some(key) = action.status_key() else {
            continue;
        };
        let Some(light) = action.status_light(panel, wire) else {
            continue;
        };
        let light = if action.requires_power() && !panel.is_powered() {
            light.off()
        } else {
            light
        };
        statuses.insert(key.to_string(), light);
    }

    statuses
}

pub fn refresh_statuses(panel: &mut Panel) {
    panel.statuses = collect_statuses(panel);
}

/// Client-safe snapshot. Only position, cut flag, colour and letter leave
/// the server for each wire.
pub fn project(panel: &Panel) -> WiresUiState {
    WiresUiState {
        wires: panel.wires().iter().map(|wire| wire.to_client()).collect(),
        statuses: panel
            .statuses()
            .iter()
            .map(|(key, light)| StatusEntry {
                key: key.clone(),
                light: light.clone(),
            })
            .collect(),
        board_name: panel.board_name().to_string(),
        serial_number: panel.serial_number().map(str::to_string),
        wire_seed: panel.wire_seed(),
    }
}

#[cfg(test)]
#[path = "tests/projector_tests.rs"]
mod tests;
