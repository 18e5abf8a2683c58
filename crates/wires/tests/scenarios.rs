use std::time::Duration;

use shared::{
    domain::{EntityId, ToolQuality, WireId, WiresAction},
    error::RejectionCode,
    protocol::PanelEvent,
};
use wires::{
    ActionCatalog, InteractionHost, InteractionOutcome, LayoutPrototypes, PanelConfig,
    ToggleWireAction, WireInteraction, WireServices, WiresSettings, WiresSystem,
};

const ACTOR: EntityId = EntityId(10);
const CUTTERS: EntityId = EntityId(20);
const MULTITOOL: EntityId = EntityId(21);
const CROWBAR: EntityId = EntityId(22);

const LAYOUTS: &str = r#"
[[layout]]
id = "Door"
wires = ["power", "bolt"]
dummy_wires = 2

[[layout]]
id = "DoubleBolt"
wires = ["bolt", "bolt"]
dummy_wires = 1
"#;

struct Hands;

impl InteractionHost for Hands {
    fn has_quality(&self, tool: EntityId, quality: ToolQuality) -> bool {
        matches!(
            (tool, quality),
            (CUTTERS, ToolQuality::Cutting) | (MULTITOOL, ToolQuality::Pulsing)
        )
    }

    fn holds_tool(&self, _actor: EntityId, _tool: EntityId) -> bool {
        true
    }

    fn can_reach(&self, _actor: EntityId, _target: EntityId) -> bool {
        true
    }
}

fn init_tracing() {
    let _ = tracing_subscriber::fmt()
        .with_env_filter("wires=debug")
        .with_test_writer()
        .try_init();
}

fn power_action() -> ToggleWireAction {
    ToggleWireAction::new("power", "POWR").with_status_key("power")
}

fn bolt_action() -> ToggleWireAction {
    ToggleWireAction::new("bolt", "BOLT")
        .with_status_key("bolt")
        .with_default_value(false)
        .with_cut_value(true)
}

fn build_system() -> WiresSystem {
    init_tracing();
    let settings = WiresSettings {
        pulse_timeout: Duration::from_secs(30),
        rng_seed: Some(7),
        ..WiresSettings::default()
    };

    let mut builder = ActionCatalog::builder();
    builder
        .register("power", power_action())
        .expect("register power")
        .register("bolt", bolt_action())
        .expect("register bolt");
    let catalog = builder.build(&WireServices {
        settings: &settings,
    });
    let prototypes = LayoutPrototypes::from_toml_str(LAYOUTS).expect("layouts parse");
    WiresSystem::new(settings, catalog, prototypes)
}

fn spawn_open(system: &mut WiresSystem, entity: EntityId, layout: &str) {
    let spawned = system.spawn_panel(
        entity,
        PanelConfig {
            panel_open: true,
            ..PanelConfig::with_layout(layout)
        },
    );
    assert!(spawned, "panel {entity} should have wires");
}

fn act(system: &mut WiresSystem, entity: EntityId, tool: EntityId, wire_id: WireId, action: WiresAction) -> InteractionOutcome {
    system.handle_wire_action(
        &Hands,
        WireInteraction {
            actor: ACTOR,
            tool,
            entity,
            wire_id,
            action,
        },
    )
}

fn power_flag(system: &WiresSystem, entity: EntityId) -> bool {
    power_action().value(system.panel(entity).expect("panel").state())
}

#[test]
fn panels_sharing_a_layout_share_cosmetics_but_not_state() {
    let mut system = build_system();
    let first = EntityId(1);
    let second = EntityId(2);
    spawn_open(&mut system, first, "Door");
    spawn_open(&mut system, second, "Door");

    let a = system.panel(first).expect("first").wires();
    let b = system.panel(second).expect("second").wires();
    assert_eq!(a.len(), 4);
    assert_eq!(b.len(), 4);
    for (left, right) in a.iter().zip(b) {
        assert_eq!(left.id, right.id);
        assert_eq!(left.color, right.color);
        assert_eq!(left.letter, right.letter);
        assert_eq!(left.action_id(), right.action_id());
    }

    let power = system.wire_by_action(first, "power").expect("power wire").id;
    assert_eq!(
        act(&mut system, first, CUTTERS, power, WiresAction::Cut),
        InteractionOutcome::Applied
    );

    assert_eq!(system.is_wire_cut(first, "power"), Some(true));
    assert_eq!(system.is_wire_cut(second, "power"), Some(false));
    assert!(!power_flag(&system, first));
    assert!(power_flag(&system, second));
}

#[test]
fn pulse_reverts_after_the_timeout() {
    let mut system = build_system();
    let door = EntityId(1);
    spawn_open(&mut system, door, "Door");
    let power = system.wire_by_action(door, "power").expect("power wire").id;

    act(&mut system, door, MULTITOOL, power, WiresAction::Pulse);
    assert!(!power_flag(&system, door));

    for _ in 0..29 {
        system.update(&Hands, Duration::from_secs(1));
    }
    assert!(!power_flag(&system, door));

    system.update(&Hands, Duration::from_secs(1));
    assert!(power_flag(&system, door));
    assert!(system.timers().is_empty());
}

#[test]
fn cutting_during_a_pulse_cancels_the_reversion() {
    let mut system = build_system();
    let door = EntityId(1);
    spawn_open(&mut system, door, "Door");
    let power = system.wire_by_action(door, "power").expect("power wire").id;

    act(&mut system, door, MULTITOOL, power, WiresAction::Pulse);
    for _ in 0..10 {
        system.update(&Hands, Duration::from_secs(1));
    }
    act(&mut system, door, CUTTERS, power, WiresAction::Cut);
    assert!(!power_flag(&system, door));

    for _ in 0..40 {
        system.update(&Hands, Duration::from_secs(1));
    }
    assert!(!power_flag(&system, door));
    assert!(system.timers().is_empty());
    assert!(!system
        .panel(door)
        .expect("panel")
        .state()
        .contains(power_action().timeout_key()));
}

#[test]
fn vetoed_second_occurrence_looks_like_a_dummy() {
    let mut system = build_system();
    let door = EntityId(1);
    spawn_open(&mut system, door, "DoubleBolt");

    let panel = system.panel(door).expect("panel");
    let bound: Vec<&str> = panel.wires().iter().map(|wire| wire.action_id()).collect();
    assert_eq!(bound.iter().filter(|id| **id == "bolt").count(), 1);
    assert_eq!(bound.iter().filter(|id| **id == "dummy").count(), 2);
    assert_eq!(panel.statuses().len(), 1);

    let events = system.drain_events();
    let Some(PanelEvent::UiState { state, .. }) = events.last() else {
        panic!("expected a ui state, got {events:?}");
    };
    assert_eq!(state.wires.len(), 3);
    assert!(state.wires.iter().all(|wire| !wire.is_cut));
}

#[test]
fn cut_without_cutting_tool_changes_nothing() {
    let mut system = build_system();
    let door = EntityId(1);
    spawn_open(&mut system, door, "Door");
    let power = system.wire_by_action(door, "power").expect("power wire").id;

    let outcome = act(&mut system, door, CROWBAR, power, WiresAction::Cut);

    assert!(matches!(
        outcome,
        InteractionOutcome::Rejected(ref rejection) if rejection.code == RejectionCode::NeedWirecutters
    ));
    assert_eq!(system.is_wire_cut(door, "power"), Some(false));
    assert_eq!(system.panel(door).expect("panel").pending_count(), 0);
    assert_eq!(system.pending_interaction_count(), 0);
    assert!(system.timers().is_empty());
}
