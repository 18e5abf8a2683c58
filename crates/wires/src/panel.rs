use std::collections::{BTreeMap, HashSet};

use rand::Rng;
use shared::domain::{EntityId, StatusLightData, WireId};

use crate::{state::StateStore, wire::Wire};

/// Spawn-time description of an entity's wire panel.
#[derive(Debug, Clone)]
pub struct PanelConfig {
    pub layout_id: Option<String>,
    /// Skip the layout cache: every panel gets a fresh arrangement.
    pub always_randomize: bool,
    pub board_name: Option<String>,
    pub serial_number: Option<String>,
    /// Zero asks map-init to roll one.
    pub wire_seed: i32,
    pub panel_open: bool,
    pub panel_visible: bool,
    pub powered: bool,
}

impl Default for PanelConfig {
    fn default() -> Self {
        Self {
            layout_id: None,
            always_randomize: false,
            board_name: None,
            serial_number: None,
            wire_seed: 0,
            panel_open: false,
            panel_visible: true,
            powered: true,
        }
    }
}

impl PanelConfig {
    pub fn with_layout(layout_id: impl Into<String>) -> Self {
        Self {
            layout_id: Some(layout_id.into()),
            ..Self::default()
        }
    }
}

#[derive(Debug)]
pub struct Panel {
    entity: EntityId,
    layout_id: Option<String>,
    board_name: String,
    serial_number: Option<String>,
    wire_seed: i32,
    is_open: bool,
    is_visible: bool,
    powered: bool,
    wires: Vec<Wire>,
    state: StateStore,
    pending: HashSet<WireId>,
    pub(crate) statuses: BTreeMap<String, StatusLightData>,
}

impl Panel {
    pub fn new(entity: EntityId, config: PanelConfig, board_name: String, wires: Vec<Wire>) -> Self {
        Self {
            entity,
            layout_id: config.layout_id,
            board_name: config.board_name.unwrap_or(board_name),
            serial_number: config.serial_number,
            wire_seed: config.wire_seed,
            is_open: config.panel_open,
            is_visible: config.panel_visible,
            powered: config.powered,
            wires,
            state: StateStore::new(),
            pending: HashSet::new(),
            statuses: BTreeMap::new(),
        }
    }

    pub fn entity(&self) -> EntityId {
        self.entity
    }

    pub fn layout_id(&self) -> Option<&str> {
        self.layout_id.as_deref()
    }

    pub fn board_name(&self) -> &str {
        &self.board_name
    }

    pub fn serial_number(&self) -> Option<&str> {
        self.serial_number.as_deref()
    }

    pub fn wire_seed(&self) -> i32 {
        self.wire_seed
    }

    pub fn is_open(&self) -> bool {
        self.is_open
    }

    pub fn is_visible(&self) -> bool {
        self.is_visible
    }

    /// Whether the maintenance overlay should be drawn on the sprite.
    pub fn shows_open_panel(&self) -> bool {
        self.is_open && self.is_visible
    }

    pub fn is_powered(&self) -> bool {
        self.powered
    }

    pub fn wires(&self) -> &[Wire] {
        &self.wires
    }

    pub fn wire(&self, id: WireId) -> Option<&Wire> {
        self.wires.iter().find(|wire| wire.id == id)
    }

    pub(crate) fn wire_mut(&mut self, id: WireId) -> Option<&mut Wire> {
        self.wires.iter_mut().find(|wire| wire.id == id)
    }

    /// First wire bound to `action_id`.
    pub fn wire_by_action(&self, action_id: &str) -> Option<&Wire> {
        self.wires.iter().find(|wire| wire.action_id() == action_id)
    }

    pub fn state(&self) -> &StateStore {
        &self.state
    }

    pub fn state_mut(&mut self) -> &mut StateStore {
        &mut self.state
    }

    pub fn is_pending(&self, id: WireId) -> bool {
        self.pending.contains(&id)
    }

    pub fn pending_count(&self) -> usize {
        self.pending.len()
    }

    pub fn statuses(&self) -> &BTreeMap<String, StatusLightData> {
        &self.statuses
    }

    pub(crate) fn mark_pending(&mut self, id: WireId) -> bool {
        self.pending.insert(id)
    }

    pub(crate) fn clear_pending(&mut self, id: WireId) {
        self.pending.remove(&id);
    }

    pub(crate) fn set_open(&mut self, open: bool) {
        self.is_open = open;
    }

    pub(crate) fn set_visible(&mut self, visible: bool) {
        self.is_visible = visible;
    }

    pub(crate) fn set_powered(&mut self, powered: bool) {
        self.powered = powered;
    }

    /// Fills in the cosmetic serial number and wire seed when the prototype
    /// left them unset. Returns whether anything changed.
    pub(crate) fn map_init<R: Rng + ?Sized>(&mut self, rng: &mut R) -> bool {
        let mut changed = false;
        if self.serial_number.is_none() {
            self.serial_number = Some(generate_serial_number(rng));
            changed = true;
        }
        if self.wire_seed == 0 {
            self.wire_seed = rng.random_range(1..i32::MAX);
            changed = true;
        }
        changed
    }
}

/// `ABCD-1234`; one board in a hundred is stamped with Cyrillic capitals.
pub fn generate_serial_number<R: Rng + ?Sized>(rng: &mut R) -> String {
    let cyrillic = rng.random_bool(0.01);
    let mut serial = String::with_capacity(16);

    for _ in 0..4 {
        let letter = if cyrillic {
            char::from_u32(rng.random_range(0x0410..0x0430)).unwrap_or('Ж')
        } else {
            char::from(rng.random_range(b'A'..=b'Z'))
        };
        serial.push(letter);
    }
    serial.push('-');
    for _ in 0..4 {
        serial.push(char::from(rng.random_range(b'0'..=b'9')));
    }
    serial
}

#[cfg(test)]
#[path = "tests/panel_tests.rs"]
mod tests;
