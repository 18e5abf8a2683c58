use std::time::Duration;

use shared::domain::EntityId;

use crate::{
    panel::Panel,
    state::StateStore,
    timer::{TimedActionHandle, TimedActionOutcome, TimedActionScheduler},
    wire::Wire,
};

/// The slice of the world a wire action sees while it runs for one entity.
pub struct WireContext<'a> {
    panel: &'a mut Panel,
    timers: &'a mut TimedActionScheduler,
}

impl<'a> WireContext<'a> {
    pub fn new(panel: &'a mut Panel, timers: &'a mut TimedActionScheduler) -> Self {
        Self { panel, timers }
    }

    pub fn entity(&self) -> EntityId {
        self.panel.entity()
    }

    pub fn panel(&self) -> &Panel {
        self.panel
    }

    pub fn is_powered(&self) -> bool {
        self.panel.is_powered()
    }

    pub fn state(&self) -> &StateStore {
        self.panel.state()
    }

    pub fn state_mut(&mut self) -> &mut StateStore {
        self.panel.state_mut()
    }

    /// Arms `on_finish` to run after `delay`, or as soon as the action is
    /// cancelled. Returns `false` without arming anything when `key` is
    /// already active for this entity.
    pub fn start_timed_action(
        &mut self,
        key: &str,
        delay: Duration,
        wire: &Wire,
        on_finish: impl FnOnce(&mut WireContext<'_>, &Wire, TimedActionOutcome) + Send + 'static,
    ) -> bool {
        let entity = self.panel.entity();
        self.timers
            .start(entity, self.panel.state_mut(), key, delay, wire.id, on_finish)
    }

    pub fn cancel_timed_action(&mut self, key: &str) -> bool {
        let entity = self.panel.entity();
        self.timers.cancel(entity, self.panel.state(), key)
    }

    pub fn is_timed_action_active(&self, key: &str) -> bool {
        self.panel.state().get::<TimedActionHandle>(key).is_some()
    }
}
