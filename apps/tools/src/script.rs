use std::{collections::HashSet, time::Duration};

use anyhow::{anyhow, Context, Result};
use serde::Deserialize;
use shared::domain::{EntityId, ToolQuality, WireId, WiresAction};
use tracing::{debug, info};
use wires::{InteractionHost, InteractionOutcome, Panel, PanelConfig, WireInteraction, WiresSystem};

pub const ACTOR: EntityId = EntityId(1000);
pub const WIRECUTTERS: EntityId = EntityId(2000);
pub const MULTITOOL: EntityId = EntityId(2001);
pub const SCREWDRIVER: EntityId = EntityId(2002);

/// A scripted session: panels to spawn, then steps to replay in order.
#[derive(Debug, Deserialize)]
pub struct Script {
    #[serde(default, rename = "panel")]
    pub panels: Vec<ScriptPanel>,
    #[serde(default, rename = "step")]
    pub steps: Vec<Step>,
}

#[derive(Debug, Deserialize)]
pub struct ScriptPanel {
    pub entity: i64,
    pub layout: String,
    #[serde(default)]
    pub open: bool,
    #[serde(default)]
    pub randomize: bool,
    #[serde(default)]
    pub board_name: Option<String>,
}

/// Wires are addressed by position id or by the action bound to them.
#[derive(Debug, Clone, Deserialize)]
#[serde(untagged)]
pub enum WireRef {
    Id(u32),
    Action(String),
}

#[derive(Debug, Deserialize)]
#[serde(tag = "op", rename_all = "snake_case")]
pub enum Step {
    Cut { entity: i64, wire: WireRef },
    Mend { entity: i64, wire: WireRef },
    Pulse { entity: i64, wire: WireRef },
    Screw { entity: i64 },
    Open { entity: i64 },
    Wait { ms: u64 },
    Power { entity: i64, on: bool },
    Visible { entity: i64, on: bool },
    Examine { entity: i64 },
    WalkAway,
    Drop { tool: String },
    Remove { entity: i64 },
    RoundRestart,
}

impl Script {
    pub fn parse(raw: &str) -> Result<Self> {
        toml::from_str(raw).context("failed to parse simulation script")
    }
}

/// The scripted actor: always within reach, holding every tool it has not
/// dropped.
#[derive(Debug, Default)]
pub struct ScriptHost {
    dropped: HashSet<EntityId>,
}

impl ScriptHost {
    fn drop_tool(&mut self, name: &str) -> Result<()> {
        let tool = tool_by_name(name).ok_or_else(|| anyhow!("unknown tool '{name}'"))?;
        self.dropped.insert(tool);
        Ok(())
    }
}

impl InteractionHost for ScriptHost {
    fn has_quality(&self, tool: EntityId, quality: ToolQuality) -> bool {
        matches!(
            (tool, quality),
            (WIRECUTTERS, ToolQuality::Cutting)
                | (MULTITOOL, ToolQuality::Pulsing)
                | (SCREWDRIVER, ToolQuality::Screwing)
        )
    }

    fn holds_tool(&self, _actor: EntityId, tool: EntityId) -> bool {
        !self.dropped.contains(&tool)
    }

    fn can_reach(&self, _actor: EntityId, _target: EntityId) -> bool {
        true
    }
}

fn tool_by_name(name: &str) -> Option<EntityId> {
    match name {
        "wirecutters" | "cutters" => Some(WIRECUTTERS),
        "multitool" => Some(MULTITOOL),
        "screwdriver" => Some(SCREWDRIVER),
        _ => None,
    }
}

pub fn spawn_panels(system: &mut WiresSystem, panels: &[ScriptPanel]) {
    for panel in panels {
        let config = PanelConfig {
            always_randomize: panel.randomize,
            board_name: panel.board_name.clone(),
            panel_open: panel.open,
            ..PanelConfig::with_layout(panel.layout.clone())
        };
        if !system.spawn_panel(EntityId(panel.entity), config) {
            info!(entity = panel.entity, layout = %panel.layout, "layout produced no panel");
        }
    }
}

/// One-line view of a panel's wires as a player would read them off the
/// board, e.g. `1:gold/α 2:red/β`.
pub fn describe_wires(panel: &Panel) -> String {
    panel
        .wires()
        .iter()
        .map(|wire| {
            let color = format!("{:?}", wire.color).to_lowercase();
            let cut = if wire.is_cut { " (cut)" } else { "" };
            format!("{}:{color}/{}{cut}", wire.id, wire.letter.glyph())
        })
        .collect::<Vec<_>>()
        .join(" ")
}

/// What a step asks of the frame loop once it has been applied.
pub enum StepEffect {
    Done,
    Advance(Duration),
    Report(String),
}

pub fn apply_step(system: &mut WiresSystem, host: &mut ScriptHost, step: &Step) -> Result<StepEffect> {
    debug!(?step, "applying script step");
    let effect = match step {
        Step::Cut { entity, wire } => {
            wire_action(system, host, *entity, wire, WiresAction::Cut, WIRECUTTERS)?
        }
        Step::Mend { entity, wire } => {
            wire_action(system, host, *entity, wire, WiresAction::Mend, WIRECUTTERS)?
        }
        Step::Pulse { entity, wire } => {
            wire_action(system, host, *entity, wire, WiresAction::Pulse, MULTITOOL)?
        }
        Step::Screw { entity } => {
            let outcome = system.interact_using(&*host, ACTOR, SCREWDRIVER, EntityId(*entity));
            report_outcome(outcome)
        }
        Step::Open { entity } => {
            let outcome = system.interact_using(&*host, ACTOR, MULTITOOL, EntityId(*entity));
            report_outcome(outcome)
        }
        Step::Wait { ms } => StepEffect::Advance(Duration::from_millis(*ms)),
        Step::Power { entity, on } => {
            system.set_powered(EntityId(*entity), *on);
            StepEffect::Done
        }
        Step::Visible { entity, on } => {
            system.set_panel_visible(EntityId(*entity), *on);
            StepEffect::Done
        }
        Step::Examine { entity } => {
            let text = system
                .examine(EntityId(*entity))
                .with_context(|| format!("entity {entity} has no wire panel"))?;
            StepEffect::Report(text)
        }
        Step::WalkAway => {
            let cancelled = system.cancel_interactions(ACTOR);
            StepEffect::Report(format!("walked away, {cancelled} interaction(s) cancelled"))
        }
        Step::Drop { tool } => {
            host.drop_tool(tool)?;
            StepEffect::Done
        }
        Step::Remove { entity } => {
            system.remove_entity(EntityId(*entity));
            StepEffect::Done
        }
        Step::RoundRestart => {
            system.round_restart();
            StepEffect::Done
        }
    };
    Ok(effect)
}

fn wire_action(
    system: &mut WiresSystem,
    host: &ScriptHost,
    entity: i64,
    wire: &WireRef,
    action: WiresAction,
    tool: EntityId,
) -> Result<StepEffect> {
    let entity = EntityId(entity);
    let wire_id = match wire {
        WireRef::Id(id) => WireId(*id),
        WireRef::Action(action_id) => {
            system
                .wire_by_action(entity, action_id)
                .with_context(|| format!("no '{action_id}' wire on entity {entity}"))?
                .id
        }
    };

    let outcome = system.handle_wire_action(
        host,
        WireInteraction {
            actor: ACTOR,
            tool,
            entity,
            wire_id,
            action,
        },
    );
    Ok(report_outcome(outcome))
}

fn report_outcome(outcome: InteractionOutcome) -> StepEffect {
    match outcome {
        InteractionOutcome::Applied => StepEffect::Done,
        InteractionOutcome::Pending => StepEffect::Report("waiting for confirmation".into()),
        InteractionOutcome::Ignored => StepEffect::Report("ignored".into()),
        InteractionOutcome::Rejected(rejection) => StepEffect::Report(rejection.to_string()),
    }
}

#[cfg(test)]
#[path = "tests/script_tests.rs"]
mod tests;
