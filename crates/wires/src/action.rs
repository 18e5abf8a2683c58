use std::{collections::HashMap, sync::Arc};

use shared::domain::{EntityId, StatusLightData};
use tracing::{debug, info};

use crate::{
    config::WiresSettings,
    context::WireContext,
    error::{Result, WiresError},
    panel::Panel,
    wire::Wire,
};

pub const DUMMY_ACTION_ID: &str = "dummy";

/// Services a wire action may bind to once, right after registration.
pub struct WireServices<'a> {
    pub settings: &'a WiresSettings,
}

/// Behavior shared by every wire of one archetype, across every entity.
///
/// Implementations hold configuration only. Anything that differs between
/// entities goes through [`WireContext::state_mut`].
pub trait WireAction: Send + Sync {
    /// Called exactly once by [`ActionCatalogBuilder::build`].
    fn initialize(&mut self, _services: &WireServices<'_>) {}

    /// Placement veto. `occurrence` counts wires bound to the same action id
    /// in the panel, starting at 1. Returning `false` turns the slot into a
    /// dummy wire.
    fn add_wire(&self, _wire: &Wire, occurrence: usize) -> bool {
        occurrence == 1
    }

    /// Returns whether the wire may be cut.
    fn cut(&self, _ctx: &mut WireContext<'_>, user: EntityId, wire: &Wire) -> bool {
        debug!(user = %user, entity = %wire.owner, wire = %wire.id, action = wire.action_id(), "wire cut");
        true
    }

    /// Returns whether the wire may be mended.
    fn mend(&self, _ctx: &mut WireContext<'_>, user: EntityId, wire: &Wire) -> bool {
        debug!(user = %user, entity = %wire.owner, wire = %wire.id, action = wire.action_id(), "wire mended");
        true
    }

    fn pulse(&self, _ctx: &mut WireContext<'_>, user: EntityId, wire: &Wire) {
        debug!(user = %user, entity = %wire.owner, wire = %wire.id, action = wire.action_id(), "wire pulsed");
    }

    /// Re-checks the action's precondition after a power or appearance change.
    fn update(&self, _ctx: &mut WireContext<'_>, _wire: &Wire) {}

    fn requires_power(&self) -> bool {
        false
    }

    /// Key under which [`WireAction::status_light`] is shown. Several wires
    /// may report under the same key.
    fn status_key(&self) -> Option<&str> {
        None
    }

    fn status_light(&self, _panel: &Panel, _wire: &Wire) -> Option<StatusLightData> {
        None
    }
}

/// Padding and veto replacement. Every interaction succeeds and does nothing.
#[derive(Debug, Default, Clone, Copy)]
pub struct DummyWireAction;

impl WireAction for DummyWireAction {
    fn add_wire(&self, _wire: &Wire, _occurrence: usize) -> bool {
        true
    }

    fn cut(&self, _ctx: &mut WireContext<'_>, _user: EntityId, _wire: &Wire) -> bool {
        true
    }

    fn mend(&self, _ctx: &mut WireContext<'_>, _user: EntityId, _wire: &Wire) -> bool {
        true
    }

    fn pulse(&self, _ctx: &mut WireContext<'_>, _user: EntityId, _wire: &Wire) {}
}

#[derive(Default)]
pub struct ActionCatalogBuilder {
    actions: Vec<(String, Box<dyn WireAction>)>,
}

impl ActionCatalogBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn register(
        &mut self,
        id: impl Into<String>,
        action: impl WireAction + 'static,
    ) -> Result<&mut Self> {
        let id = id.into();
        if id == DUMMY_ACTION_ID || self.actions.iter().any(|(existing, _)| *existing == id) {
            return Err(WiresError::DuplicateAction(id));
        }
        self.actions.push((id, Box::new(action)));
        Ok(self)
    }

    /// Initializes every registered action once and freezes them for sharing.
    pub fn build(self, services: &WireServices<'_>) -> ActionCatalog {
        let mut actions = HashMap::with_capacity(self.actions.len());
        for (id, mut action) in self.actions {
            action.initialize(services);
            actions.insert(id, Arc::<dyn WireAction>::from(action));
        }
        info!(count = actions.len(), "wire action catalog built");

        ActionCatalog {
            actions,
            dummy: Arc::new(DummyWireAction),
        }
    }
}

/// Registry of shared wire actions keyed by action id.
pub struct ActionCatalog {
    actions: HashMap<String, Arc<dyn WireAction>>,
    dummy: Arc<dyn WireAction>,
}

impl ActionCatalog {
    pub fn builder() -> ActionCatalogBuilder {
        ActionCatalogBuilder::new()
    }

    pub fn get(&self, id: &str) -> Option<Arc<dyn WireAction>> {
        if id == DUMMY_ACTION_ID {
            return Some(self.dummy());
        }
        self.actions.get(id).cloned()
    }

    pub fn dummy(&self) -> Arc<dyn WireAction> {
        Arc::clone(&self.dummy)
    }

    pub fn contains(&self, id: &str) -> bool {
        id == DUMMY_ACTION_ID || self.actions.contains_key(id)
    }

    pub fn len(&self) -> usize {
        self.actions.len()
    }

    pub fn is_empty(&self) -> bool {
        self.actions.is_empty()
    }

    pub fn ids(&self) -> impl Iterator<Item = &str> {
        self.actions.keys().map(String::as_str)
    }
}

impl Default for ActionCatalog {
    fn default() -> Self {
        ActionCatalogBuilder::new().build(&WireServices {
            settings: &WiresSettings::default(),
        })
    }
}

#[cfg(test)]
#[path = "tests/action_tests.rs"]
mod tests;
