use std::{
    collections::{BTreeSet, HashMap},
    sync::Arc,
    time::Duration,
};

use rand::{rngs::StdRng, SeedableRng};
use shared::{
    domain::{EntityId, ToolQuality, WireId, WiresAction},
    error::{Rejection, RejectionCode},
    protocol::{PanelEvent, PanelSound, WiresActionMessage},
};
use tracing::{debug, info, warn};

use crate::{
    action::ActionCatalog,
    config::WiresSettings,
    context::WireContext,
    interaction::{
        InteractionHost, InteractionOutcome, PendingInteraction, PendingInteractions, PendingKind,
        Resolution, WireInteraction,
    },
    layout::{LayoutGenerator, LayoutPrototypes},
    panel::{Panel, PanelConfig},
    projector,
    timer::{TimedActionHandle, TimedActionScheduler},
    wire::Wire,
};

/// Owns every wire panel in the simulation and drives them once per frame.
pub struct WiresSystem {
    settings: WiresSettings,
    catalog: ActionCatalog,
    layouts: LayoutGenerator,
    panels: HashMap<EntityId, Panel>,
    timers: TimedActionScheduler,
    interactions: PendingInteractions,
    rng: StdRng,
    events: Vec<PanelEvent>,
}

impl WiresSystem {
    pub fn new(settings: WiresSettings, catalog: ActionCatalog, prototypes: LayoutPrototypes) -> Self {
        let rng = seed_rng(&settings);
        Self {
            settings,
            catalog,
            layouts: LayoutGenerator::new(prototypes),
            panels: HashMap::new(),
            timers: TimedActionScheduler::new(),
            interactions: PendingInteractions::default(),
            rng,
            events: Vec::new(),
        }
    }

    pub fn settings(&self) -> &WiresSettings {
        &self.settings
    }

    pub fn catalog(&self) -> &ActionCatalog {
        &self.catalog
    }

    pub fn layouts(&self) -> &LayoutGenerator {
        &self.layouts
    }

    pub fn timers(&self) -> &TimedActionScheduler {
        &self.timers
    }

    pub fn panel(&self, entity: EntityId) -> Option<&Panel> {
        self.panels.get(&entity)
    }

    pub fn panel_count(&self) -> usize {
        self.panels.len()
    }

    pub fn pending_interaction_count(&self) -> usize {
        self.interactions.len()
    }

    pub fn drain_events(&mut self) -> Vec<PanelEvent> {
        std::mem::take(&mut self.events)
    }

    // ---- lifecycle -------------------------------------------------------

    /// Creates the panel for a freshly spawned entity. Returns `false` when
    /// the layout yields no wires, in which case no panel exists.
    pub fn spawn_panel(&mut self, entity: EntityId, config: PanelConfig) -> bool {
        if self.panels.contains_key(&entity) {
            warn!(entity = %entity, "entity already has a wire panel");
            return false;
        }

        let wires = match config.layout_id.as_deref() {
            Some(layout_id) => self.layouts.resolve_layout(
                entity,
                layout_id,
                config.always_randomize,
                &self.catalog,
                &mut self.rng,
            ),
            None => Vec::new(),
        };
        if wires.is_empty() {
            debug!(entity = %entity, layout = ?config.layout_id, "no wires, skipping panel");
            return false;
        }

        let mut panel = Panel::new(entity, config, self.settings.default_board_name.clone(), wires);
        panel.map_init(&mut self.rng);
        info!(
            entity = %entity,
            layout = ?panel.layout_id(),
            wires = panel.wires().len(),
            serial = ?panel.serial_number(),
            "wire panel created"
        );
        self.panels.insert(entity, panel);
        self.refresh(entity);
        true
    }

    /// Forgets the entity. Its timed actions are dropped without firing.
    pub fn remove_entity(&mut self, entity: EntityId) -> bool {
        let abandoned = self.timers.abandon(entity);
        let dropped = self.interactions.drop_target(entity);
        let removed = self.panels.remove(&entity).is_some();
        if removed {
            debug!(entity = %entity, abandoned, dropped, "wire panel removed");
        }
        removed
    }

    /// Round-restart hook: forget every cached layout and reseed.
    pub fn round_restart(&mut self) {
        let cached = self.layouts.cache().len();
        self.layouts.clear_cache();
        self.rng = seed_rng(&self.settings);
        info!(cached, "wire layout cache cleared");
    }

    // ---- interaction -----------------------------------------------------

    pub fn handle_message(
        &mut self,
        host: &impl InteractionHost,
        actor: EntityId,
        tool: EntityId,
        entity: EntityId,
        message: WiresActionMessage,
    ) -> InteractionOutcome {
        self.handle_wire_action(
            host,
            WireInteraction {
                actor,
                tool,
                entity,
                wire_id: message.id,
                action: message.action,
            },
        )
    }

    pub fn handle_wire_action(
        &mut self,
        host: &impl InteractionHost,
        request: WireInteraction,
    ) -> InteractionOutcome {
        if let Err(rejection) = self.validate(host, &request) {
            return self.reject(request.entity, request.actor, rejection);
        }

        let delay = self.settings.interaction_delay;
        let Some(panel) = self.panels.get_mut(&request.entity) else {
            return self.reject(request.entity, request.actor, RejectionCode::NoPanel.into());
        };

        if panel.is_pending(request.wire_id) {
            debug!(entity = %request.entity, wire = %request.wire_id, "wire already being worked on");
            return InteractionOutcome::Ignored;
        }

        if !delay.is_zero() {
            panel.mark_pending(request.wire_id);
            self.interactions.push(
                request.actor,
                request.tool,
                request.entity,
                PendingKind::Wire {
                    wire_id: request.wire_id,
                    action: request.action,
                },
                delay,
            );
            return InteractionOutcome::Pending;
        }

        self.dispatch(request)
    }

    fn validate(&self, host: &impl InteractionHost, request: &WireInteraction) -> Result<(), Rejection> {
        let panel = self
            .panels
            .get(&request.entity)
            .ok_or_else(|| Rejection::from(RejectionCode::NoPanel))?;

        if !panel.is_open() {
            return Err(RejectionCode::PanelClosed.into());
        }
        if !host.can_reach(request.actor, request.entity) {
            return Err(RejectionCode::CannotReach.into());
        }
        if !host.holds_tool(request.actor, request.tool) {
            return Err(RejectionCode::NoTool.into());
        }
        if panel.wire(request.wire_id).is_none() {
            return Err(RejectionCode::UnknownWire.into());
        }

        let quality = request.action.required_quality();
        if !host.has_quality(request.tool, quality) {
            let code = match quality {
                ToolQuality::Pulsing => RejectionCode::NeedMultitool,
                _ => RejectionCode::NeedWirecutters,
            };
            return Err(code.into());
        }

        Ok(())
    }

    fn dispatch(&mut self, request: WireInteraction) -> InteractionOutcome {
        let WireInteraction {
            actor,
            entity,
            wire_id,
            action: wires_action,
            ..
        } = request;

        let Some(panel) = self.panels.get_mut(&entity) else {
            return InteractionOutcome::Ignored;
        };
        let Some(wire) = panel.wire(wire_id).cloned() else {
            panel.clear_pending(wire_id);
            return self.reject(entity, actor, RejectionCode::UnknownWire.into());
        };
        let action = Arc::clone(wire.action());

        match wires_action {
            WiresAction::Cut | WiresAction::Mend => {
                self.events.push(PanelEvent::Sound {
                    entity,
                    sound: PanelSound::ToolUse,
                });
                let cutting = wires_action == WiresAction::Cut;
                let accepted = {
                    let mut ctx = WireContext::new(panel, &mut self.timers);
                    if cutting {
                        action.cut(&mut ctx, actor, &wire)
                    } else {
                        action.mend(&mut ctx, actor, &wire)
                    }
                };
                if accepted {
                    if let Some(wire) = panel.wire_mut(wire_id) {
                        wire.is_cut = cutting;
                    }
                }
                debug!(entity = %entity, wire = %wire_id, action = ?wires_action, accepted, "wire action dispatched");
            }
            WiresAction::Pulse => {
                if wire.is_cut {
                    panel.clear_pending(wire_id);
                    return self.reject(entity, actor, RejectionCode::CannotPulseCutWire.into());
                }
                {
                    let mut ctx = WireContext::new(panel, &mut self.timers);
                    action.pulse(&mut ctx, actor, &wire);
                }
                self.events.push(PanelEvent::Sound {
                    entity,
                    sound: PanelSound::Pulse,
                });
                debug!(entity = %entity, wire = %wire_id, "wire pulse dispatched");
            }
        }

        panel.clear_pending(wire_id);
        self.refresh(entity);
        self.push_appearance(entity);
        InteractionOutcome::Applied
    }

    fn reject(&mut self, entity: EntityId, actor: EntityId, rejection: Rejection) -> InteractionOutcome {
        debug!(entity = %entity, actor = %actor, code = ?rejection.code, "wire interaction rejected");
        self.events.push(PanelEvent::Popup {
            entity,
            actor,
            rejection: rejection.clone(),
        });
        InteractionOutcome::Rejected(rejection)
    }

    /// Using a tool on the machine: opens the wires window when the panel is
    /// open and the tool can cut or pulse, otherwise starts unscrewing.
    pub fn interact_using(
        &mut self,
        host: &impl InteractionHost,
        actor: EntityId,
        tool: EntityId,
        entity: EntityId,
    ) -> InteractionOutcome {
        let Some(panel) = self.panels.get(&entity) else {
            return InteractionOutcome::Ignored;
        };
        if !host.can_reach(actor, entity) {
            return self.reject(entity, actor, RejectionCode::CannotReach.into());
        }
        if !host.holds_tool(actor, tool) {
            return self.reject(entity, actor, RejectionCode::NoTool.into());
        }

        let wire_tool = host.has_quality(tool, ToolQuality::Cutting)
            || host.has_quality(tool, ToolQuality::Pulsing);
        if panel.is_open() && wire_tool {
            self.open_interface(entity, actor);
            return InteractionOutcome::Applied;
        }

        if !host.has_quality(tool, ToolQuality::Screwing) {
            return InteractionOutcome::Ignored;
        }
        if self.interactions.has_screw(entity) {
            return InteractionOutcome::Ignored;
        }

        let screw_time = self.settings.screw_time;
        if screw_time.is_zero() {
            self.toggle_panel(entity);
            return InteractionOutcome::Applied;
        }

        debug!(entity = %entity, actor = %actor, "unscrewing maintenance panel");
        self.interactions
            .push(actor, tool, entity, PendingKind::Screw, screw_time);
        InteractionOutcome::Pending
    }

    pub fn open_interface(&mut self, entity: EntityId, actor: EntityId) -> bool {
        let Some(panel) = self.panels.get(&entity) else {
            return false;
        };
        let state = projector::project(panel);
        self.events.push(PanelEvent::UiOpened { entity, actor });
        self.events.push(PanelEvent::UiState { entity, state });
        true
    }

    /// Actor moved, got stunned or otherwise lost focus: every confirmation
    /// it is waiting on resolves as cancelled on the next update.
    pub fn cancel_interactions(&mut self, actor: EntityId) -> usize {
        self.interactions.cancel_actor(actor)
    }

    fn toggle_panel(&mut self, entity: EntityId) {
        let Some(panel) = self.panels.get_mut(&entity) else {
            return;
        };
        let open = !panel.is_open();
        panel.set_open(open);

        self.events.push(PanelEvent::Sound {
            entity,
            sound: if open {
                PanelSound::ScrewdriverOpen
            } else {
                PanelSound::ScrewdriverClose
            },
        });
        self.push_appearance(entity);
        if open {
            self.refresh(entity);
        } else {
            self.events.push(PanelEvent::UiClosed { entity });
        }
        info!(entity = %entity, open, "maintenance panel toggled");
    }

    pub fn set_panel_visible(&mut self, entity: EntityId, visible: bool) -> bool {
        let Some(panel) = self.panels.get_mut(&entity) else {
            return false;
        };
        panel.set_visible(visible);
        self.push_appearance(entity);
        true
    }

    pub fn examine(&self, entity: EntityId) -> Option<String> {
        let panel = self.panels.get(&entity)?;
        let state = if panel.is_open() { "open" } else { "closed" };
        Some(format!("The maintenance panel is {state}."))
    }

    // ---- preconditions ---------------------------------------------------

    /// Power broadcast. Losing power force-cancels the entity's timed
    /// actions before every wire re-checks its precondition.
    pub fn set_powered(&mut self, entity: EntityId, powered: bool) -> bool {
        let Some(panel) = self.panels.get_mut(&entity) else {
            return false;
        };
        if panel.is_powered() == powered {
            return false;
        }
        panel.set_powered(powered);

        if !powered {
            let cancelled = self.timers.cancel_all(entity);
            debug!(entity = %entity, cancelled, "power lost, timed actions cancelled");
        }
        self.notify_precondition_changed(entity);
        true
    }

    pub fn notify_precondition_changed(&mut self, entity: EntityId) {
        let Some(panel) = self.panels.get_mut(&entity) else {
            return;
        };
        let wires: Vec<Wire> = panel.wires().to_vec();
        for wire in &wires {
            let mut ctx = WireContext::new(panel, &mut self.timers);
            wire.action().update(&mut ctx, wire);
        }
        self.refresh(entity);
    }

    // ---- lookups ---------------------------------------------------------

    pub fn wire(&self, entity: EntityId, id: WireId) -> Option<&Wire> {
        self.panels.get(&entity)?.wire(id)
    }

    pub fn wire_by_action(&self, entity: EntityId, action_id: &str) -> Option<&Wire> {
        self.panels.get(&entity)?.wire_by_action(action_id)
    }

    pub fn is_wire_cut(&self, entity: EntityId, action_id: &str) -> Option<bool> {
        self.wire_by_action(entity, action_id).map(|wire| wire.is_cut)
    }

    // ---- frame -----------------------------------------------------------

    /// Advances confirmations, then timed actions, by one frame.
    pub fn update(&mut self, host: &impl InteractionHost, dt: Duration) {
        for resolution in self.interactions.tick(dt) {
            match resolution {
                Resolution::Cancelled(pending) => self.abort(pending),
                Resolution::Completed(pending) => self.complete(host, pending),
            }
        }
        self.tick_timers(dt);
    }

    fn abort(&mut self, pending: PendingInteraction) {
        if let PendingKind::Wire { wire_id, .. } = pending.kind {
            if let Some(panel) = self.panels.get_mut(&pending.entity) {
                panel.clear_pending(wire_id);
            }
        }
        debug!(entity = %pending.entity, actor = %pending.actor, kind = ?pending.kind, "interaction cancelled");
    }

    fn complete(&mut self, host: &impl InteractionHost, pending: PendingInteraction) {
        let present = host.holds_tool(pending.actor, pending.tool)
            && host.can_reach(pending.actor, pending.entity)
            && self
                .panels
                .get(&pending.entity)
                .is_some_and(|panel| match pending.kind {
                    PendingKind::Wire { wire_id, .. } => {
                        panel.is_open() && panel.wire(wire_id).is_some()
                    }
                    PendingKind::Screw => true,
                });
        if !present {
            self.abort(pending);
            return;
        }

        match pending.kind {
            PendingKind::Wire { wire_id, action } => {
                self.dispatch(WireInteraction {
                    actor: pending.actor,
                    tool: pending.tool,
                    entity: pending.entity,
                    wire_id,
                    action,
                });
            }
            PendingKind::Screw => self.toggle_panel(pending.entity),
        }
    }

    fn tick_timers(&mut self, dt: Duration) {
        let mut touched = BTreeSet::new();

        for fired in self.timers.tick(dt) {
            let entity = fired.entity;
            let Some(panel) = self.panels.get_mut(&entity) else {
                debug!(entity = %entity, key = %fired.key, "timed action target is gone");
                continue;
            };
            if panel.state().get_copied::<TimedActionHandle>(&fired.key) == Some(fired.handle) {
                panel.state_mut().remove(&fired.key);
            }
            let Some(wire) = panel.wire(fired.wire_id).cloned() else {
                continue;
            };

            let mut ctx = WireContext::new(panel, &mut self.timers);
            fired.fire(&mut ctx, &wire);
            touched.insert(entity);
        }

        for entity in touched {
            self.refresh(entity);
        }
    }

    // ---- projection ------------------------------------------------------

    fn refresh(&mut self, entity: EntityId) {
        let Some(panel) = self.panels.get_mut(&entity) else {
            return;
        };
        projector::refresh_statuses(panel);
        let state = projector::project(panel);
        self.events.push(PanelEvent::UiState { entity, state });
    }

    fn push_appearance(&mut self, entity: EntityId) {
        if let Some(panel) = self.panels.get(&entity) {
            self.events.push(PanelEvent::Appearance {
                entity,
                panel_open: panel.shows_open_panel(),
            });
        }
    }
}

fn seed_rng(settings: &WiresSettings) -> StdRng {
    match settings.rng_seed {
        Some(seed) => StdRng::seed_from_u64(seed),
        None => StdRng::from_os_rng(),
    }
}

#[cfg(test)]
#[path = "tests/system_tests.rs"]
mod tests;
