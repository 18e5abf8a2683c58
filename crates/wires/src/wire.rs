use std::sync::Arc;

use shared::{
    domain::{EntityId, WireColor, WireId, WireLetter},
    protocol::ClientWire,
};

use crate::action::WireAction;

/// One slot of a panel.
///
/// The bound action is fixed at construction; only `is_cut` changes over the
/// wire's life.
#[derive(Clone)]
pub struct Wire {
    pub owner: EntityId,
    pub id: WireId,
    pub color: WireColor,
    pub letter: WireLetter,
    pub is_cut: bool,
    action_id: String,
    action: Arc<dyn WireAction>,
}

impl Wire {
    pub fn new(
        owner: EntityId,
        id: WireId,
        color: WireColor,
        letter: WireLetter,
        action_id: impl Into<String>,
        action: Arc<dyn WireAction>,
    ) -> Self {
        Self {
            owner,
            id,
            color,
            letter,
            is_cut: false,
            action_id: action_id.into(),
            action,
        }
    }

    pub fn action(&self) -> &Arc<dyn WireAction> {
        &self.action
    }

    /// Catalog id of the bound action. Server-side only.
    pub fn action_id(&self) -> &str {
        &self.action_id
    }

    pub fn to_client(&self) -> ClientWire {
        ClientWire {
            id: self.id,
            is_cut: self.is_cut,
            color: self.color,
            letter: self.letter,
        }
    }
}

impl std::fmt::Debug for Wire {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Wire")
            .field("owner", &self.owner)
            .field("id", &self.id)
            .field("color", &self.color)
            .field("letter", &self.letter)
            .field("is_cut", &self.is_cut)
            .field("action_id", &self.action_id)
            .finish()
    }
}
