use std::{collections::HashMap, time::Duration};

use shared::domain::{EntityId, WireId};
use tracing::debug;

use crate::{context::WireContext, state::StateStore, wire::Wire};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TimedActionOutcome {
    Completed,
    Cancelled,
}

/// Marker stored in the owning panel's state under the action key while the
/// timed action is alive.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct TimedActionHandle(u64);

pub type TimedActionCallback =
    Box<dyn for<'a> FnOnce(&mut WireContext<'a>, &Wire, TimedActionOutcome) + Send>;

struct TimedAction {
    key: String,
    handle: TimedActionHandle,
    wire_id: WireId,
    remaining: Duration,
    cancelled: bool,
    on_finish: TimedActionCallback,
}

/// A timed action that left the registry during [`TimedActionScheduler::tick`]
/// and still has to run its callback.
pub struct FiredTimedAction {
    pub entity: EntityId,
    pub key: String,
    pub handle: TimedActionHandle,
    pub wire_id: WireId,
    pub outcome: TimedActionOutcome,
    on_finish: TimedActionCallback,
}

impl FiredTimedAction {
    pub fn fire(self, ctx: &mut WireContext<'_>, wire: &Wire) {
        (self.on_finish)(ctx, wire, self.outcome);
    }
}

impl std::fmt::Debug for FiredTimedAction {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("FiredTimedAction")
            .field("entity", &self.entity)
            .field("key", &self.key)
            .field("handle", &self.handle)
            .field("wire_id", &self.wire_id)
            .field("outcome", &self.outcome)
            .finish()
    }
}

/// Registry of delayed, cancellable wire callbacks keyed by entity and key.
#[derive(Default)]
pub struct TimedActionScheduler {
    active: HashMap<EntityId, Vec<TimedAction>>,
    next_handle: u64,
}

impl TimedActionScheduler {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn start(
        &mut self,
        entity: EntityId,
        store: &mut StateStore,
        key: &str,
        delay: Duration,
        wire_id: WireId,
        on_finish: impl FnOnce(&mut WireContext<'_>, &Wire, TimedActionOutcome) + Send + 'static,
    ) -> bool {
        if store.get::<TimedActionHandle>(key).is_some() || self.is_active(entity, key) {
            debug!(entity = %entity, key, "timed action already running");
            return false;
        }

        self.next_handle += 1;
        let handle = TimedActionHandle(self.next_handle);
        store.set(key, handle);
        self.active.entry(entity).or_default().push(TimedAction {
            key: key.to_string(),
            handle,
            wire_id,
            remaining: delay,
            cancelled: false,
            on_finish: Box::new(on_finish),
        });
        debug!(entity = %entity, key, delay_ms = delay.as_millis() as u64, "timed action started");
        true
    }

    /// Flags the action stored under `key`. Its callback still runs, with
    /// [`TimedActionOutcome::Cancelled`], on the next tick.
    pub fn cancel(&mut self, entity: EntityId, store: &StateStore, key: &str) -> bool {
        let Some(handle) = store.get_copied::<TimedActionHandle>(key) else {
            return false;
        };
        let Some(action) = self
            .active
            .get_mut(&entity)
            .and_then(|actions| actions.iter_mut().find(|action| action.handle == handle))
        else {
            return false;
        };

        action.cancelled = true;
        debug!(entity = %entity, key, "timed action cancelled");
        true
    }

    /// Flags every action of `entity`; returns how many were flagged.
    pub fn cancel_all(&mut self, entity: EntityId) -> usize {
        let Some(actions) = self.active.get_mut(&entity) else {
            return 0;
        };
        let mut flagged = 0;
        for action in actions.iter_mut().filter(|action| !action.cancelled) {
            action.cancelled = true;
            flagged += 1;
        }
        flagged
    }

    /// Drops every action of `entity` without running callbacks.
    pub fn abandon(&mut self, entity: EntityId) -> usize {
        self.active
            .remove(&entity)
            .map(|actions| actions.len())
            .unwrap_or_default()
    }

    pub fn is_active(&self, entity: EntityId, key: &str) -> bool {
        self.active
            .get(&entity)
            .is_some_and(|actions| actions.iter().any(|action| action.key == key))
    }

    pub fn active_count(&self, entity: EntityId) -> usize {
        self.active.get(&entity).map(Vec::len).unwrap_or_default()
    }

    pub fn is_empty(&self) -> bool {
        self.active.is_empty()
    }

    /// Advances every countdown by `dt` and removes the actions that expired
    /// or were cancelled, oldest first.
    pub fn tick(&mut self, dt: Duration) -> Vec<FiredTimedAction> {
        let mut fired = Vec::new();

        for (entity, actions) in self.active.iter_mut() {
            let mut index = 0;
            while index < actions.len() {
                let action = &mut actions[index];
                action.remaining = action.remaining.saturating_sub(dt);

                let outcome = if action.cancelled {
                    TimedActionOutcome::Cancelled
                } else if action.remaining.is_zero() {
                    TimedActionOutcome::Completed
                } else {
                    index += 1;
                    continue;
                };

                let action = actions.remove(index);
                fired.push(FiredTimedAction {
                    entity: *entity,
                    key: action.key,
                    handle: action.handle,
                    wire_id: action.wire_id,
                    outcome,
                    on_finish: action.on_finish,
                });
            }
        }

        self.active.retain(|_, actions| !actions.is_empty());
        fired.sort_by_key(|action| action.handle);
        fired
    }
}

#[cfg(test)]
#[path = "tests/timer_tests.rs"]
mod tests;
