use super::*;

use std::sync::Arc;

use shared::domain::{EntityId, LightColor, LightState, WireColor, WireId, WireLetter};

use crate::{
    action::{DummyWireAction, WireAction},
    panel::PanelConfig,
    wire::Wire,
};

struct Lamp {
    text: &'static str,
    needs_power: bool,
}

impl WireAction for Lamp {
    fn requires_power(&self) -> bool {
        self.needs_power
    }

    fn status_key(&self) -> Option<&str> {
        Some("power")
    }

    fn status_light(&self, _panel: &Panel, _wire: &Wire) -> Option<StatusLightData> {
        Some(StatusLightData::new(LightColor::Yellow, LightState::On, self.text))
    }
}

fn wire(id: u32, action_id: &str, action: Arc<dyn WireAction>) -> Wire {
    Wire::new(
        EntityId(1),
        WireId(id),
        WireColor::ALL[id as usize],
        WireLetter::ALL[id as usize],
        action_id,
        action,
    )
}

fn panel(powered: bool, wires: Vec<Wire>) -> Panel {
    Panel::new(
        EntityId(1),
        PanelConfig {
            powered,
            serial_number: Some("QWER-1234".into()),
            wire_seed: 77,
            ..PanelConfig::default()
        },
        "Airlock".into(),
        wires,
    )
}

#[test]
fn later_wire_overwrites_shared_status_key() {
    let panel = panel(
        true,
        vec![
            wire(1, "main_power", Arc::new(Lamp { text: "MAIN", needs_power: false })),
            wire(2, "backup_power", Arc::new(Lamp { text: "BACKUP", needs_power: false })),
        ],
    );

    let statuses = collect_statuses(&panel);
    assert_eq!(statuses.len(), 1);
    assert_eq!(statuses["power"].text, "BACKUP");
}

#[test]
fn unpowered_panel_turns_power_dependent_lights_off() {
    let mut panel = panel(
        false,
        vec![wire(1, "main_power", Arc::new(Lamp { text: "MAIN", needs_power: true }))],
    );

    refresh_statuses(&mut panel);
    assert_eq!(panel.statuses()["power"].state, LightState::Off);
    assert_eq!(panel.statuses()["power"].color, LightColor::Yellow);
}

#[test]
fn snapshot_never_mentions_bound_actions() {
    let mut panel = panel(
        true,
        vec![
            wire(1, "main_power", Arc::new(Lamp { text: "MAIN", needs_power: true })),
            wire(2, "dummy", Arc::new(DummyWireAction)),
        ],
    );
    refresh_statuses(&mut panel);

    let state = project(&panel);
    assert_eq!(state.wires.len(), 2);
    assert_eq!(state.board_name, "Airlock");
    assert_eq!(state.serial_number.as_deref(), Some("QWER-1234"));
    assert_eq!(state.wire_seed, 77);

    let json = serde_json::to_string(&state).expect("serialize");
    assert!(!json.contains("main_power"));
    assert!(!json.contains("dummy"));
}
