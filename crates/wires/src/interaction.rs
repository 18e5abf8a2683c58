use std::time::Duration;

use shared::{
    domain::{EntityId, ToolQuality, WireId, WiresAction},
    error::Rejection,
};

/// Queries the wires system needs answered by the surrounding simulation.
pub trait InteractionHost {
    fn has_quality(&self, tool: EntityId, quality: ToolQuality) -> bool;

    /// Whether `actor` is still holding `tool` in the active hand.
    fn holds_tool(&self, actor: EntityId, tool: EntityId) -> bool;

    fn can_reach(&self, actor: EntityId, target: EntityId) -> bool;
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct WireInteraction {
    pub actor: EntityId,
    pub tool: EntityId,
    pub entity: EntityId,
    pub wire_id: WireId,
    pub action: WiresAction,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum InteractionOutcome {
    Applied,
    /// Waiting on the confirmation delay.
    Pending,
    /// Dropped because the same wire is already being worked on.
    Ignored,
    Rejected(Rejection),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum PendingKind {
    Wire { wire_id: WireId, action: WiresAction },
    Screw,
}

/// A delayed confirmation that has not resolved yet.
#[derive(Debug, Clone)]
pub(crate) struct PendingInteraction {
    pub(crate) actor: EntityId,
    pub(crate) tool: EntityId,
    pub(crate) entity: EntityId,
    pub(crate) kind: PendingKind,
    remaining: Duration,
    cancelled: bool,
}

pub(crate) enum Resolution {
    Completed(PendingInteraction),
    Cancelled(PendingInteraction),
}

/// Frame-sliced confirmations; nothing here ever blocks.
#[derive(Debug, Default)]
pub(crate) struct PendingInteractions {
    queue: Vec<PendingInteraction>,
}

impl PendingInteractions {
    pub(crate) fn push(
        &mut self,
        actor: EntityId,
        tool: EntityId,
        entity: EntityId,
        kind: PendingKind,
        delay: Duration,
    ) {
        self.queue.push(PendingInteraction {
            actor,
            tool,
            entity,
            kind,
            remaining: delay,
            cancelled: false,
        });
    }

    pub(crate) fn has_screw(&self, entity: EntityId) -> bool {
        self.queue
            .iter()
            .any(|pending| pending.entity == entity && pending.kind == PendingKind::Screw)
    }

    pub(crate) fn cancel_actor(&mut self, actor: EntityId) -> usize {
        self.cancel_where(|pending| pending.actor == actor)
    }

    /// Forgets every confirmation aimed at `entity` without resolving it, so
    /// a panel respawned under the same id never sees them.
    pub(crate) fn drop_target(&mut self, entity: EntityId) -> usize {
        let before = self.queue.len();
        self.queue.retain(|pending| pending.entity != entity);
        before - self.queue.len()
    }

    fn cancel_where(&mut self, matches: impl Fn(&PendingInteraction) -> bool) -> usize {
        let mut cancelled = 0;
        for pending in self.queue.iter_mut().filter(|pending| !pending.cancelled) {
            if matches(pending) {
                pending.cancelled = true;
                cancelled += 1;
            }
        }
        cancelled
    }

    pub(crate) fn len(&self) -> usize {
        self.queue.len()
    }

    /// Advances every confirmation and hands back the ones that resolved,
    /// in the order they were queued.
    pub(crate) fn tick(&mut self, dt: Duration) -> Vec<Resolution> {
        let mut resolved = Vec::new();
        let mut index = 0;
        while index < self.queue.len() {
            let pending = &mut self.queue[index];
            pending.remaining = pending.remaining.saturating_sub(dt);

            if pending.cancelled {
                resolved.push(Resolution::Cancelled(self.queue.remove(index)));
            } else if pending.remaining.is_zero() {
                resolved.push(Resolution::Completed(self.queue.remove(index)));
            } else {
                index += 1;
            }
        }
        resolved
    }
}
