use super::*;

use rand::{rngs::StdRng, SeedableRng};

use crate::{
    action::{ActionCatalogBuilder, WireServices},
    config::WiresSettings,
};

struct Plain;

impl WireAction for Plain {}

struct FirstOnly;

impl WireAction for FirstOnly {
    fn add_wire(&self, _wire: &Wire, occurrence: usize) -> bool {
        occurrence == 1
    }
}

fn catalog() -> ActionCatalog {
    let mut builder = ActionCatalogBuilder::new();
    builder
        .register("power", Plain)
        .expect("power")
        .register("bolt", Plain)
        .expect("bolt")
        .register("alarm", FirstOnly)
        .expect("alarm");
    builder.build(&WireServices {
        settings: &WiresSettings::default(),
    })
}

fn prototypes() -> LayoutPrototypes {
    LayoutPrototypes::from_toml_str(
        r#"
[[layout]]
id = "Door"
wires = ["power", "bolt"]
dummy_wires = 2

[[layout]]
id = "SecureDoor"
parent = "Door"

[[layout]]
id = "VaultDoor"
parent = "SecureDoor"
dummy_wires = 1

[[layout]]
id = "Alarmed"
wires = ["alarm", "alarm", "power"]

[[layout]]
id = "Empty"
"#,
    )
    .expect("prototypes")
}

fn colors_and_letters(wires: &[Wire]) -> Vec<(WireColor, WireLetter)> {
    wires.iter().map(|wire| (wire.color, wire.letter)).collect()
}

#[test]
fn child_without_wires_inherits_from_parent() {
    let prototypes = prototypes();
    let resolved = prototypes.resolve("SecureDoor").expect("resolve");
    assert_eq!(resolved.actions, vec!["power", "bolt"]);
    assert_eq!(resolved.dummy_wires, 2);
}

#[test]
fn grandparent_is_not_walked() {
    let prototypes = prototypes();
    let resolved = prototypes.resolve("VaultDoor").expect("resolve");
    assert!(resolved.actions.is_empty());
    assert_eq!(resolved.dummy_wires, 1);
}

#[test]
fn duplicate_layout_ids_are_rejected() {
    let err = LayoutPrototypes::from_toml_str(
        r#"
[[layout]]
id = "Door"

[[layout]]
id = "Door"
"#,
    )
    .expect_err("duplicate");
    assert!(matches!(err, WiresError::DuplicateLayout(id) if id == "Door"));
}

#[test]
fn cached_layout_is_reused_position_for_position() {
    let catalog = catalog();
    let mut generator = LayoutGenerator::new(prototypes());
    let mut rng = StdRng::seed_from_u64(5);

    let first = generator.resolve_layout(EntityId(1), "Door", false, &catalog, &mut rng);
    let second = generator.resolve_layout(EntityId(2), "Door", false, &catalog, &mut rng);

    assert_eq!(first.len(), 4);
    assert_eq!(colors_and_letters(&first), colors_and_letters(&second));
    let first_actions: Vec<&str> = first.iter().map(Wire::action_id).collect();
    let second_actions: Vec<&str> = second.iter().map(Wire::action_id).collect();
    assert_eq!(first_actions, second_actions);
    assert!(generator.cache().contains("Door"));
}

#[test]
fn always_randomize_never_touches_the_cache() {
    let catalog = catalog();
    let mut generator = LayoutGenerator::new(prototypes());
    let mut rng = StdRng::seed_from_u64(8);

    let door = generator.resolve_layout(EntityId(1), "Door", false, &catalog, &mut rng);
    let snapshot = generator.cache().get("Door").cloned().expect("cached");

    for entity in 2..20 {
        let wires = generator.resolve_layout(EntityId(entity), "SecureDoor", true, &catalog, &mut rng);
        assert_eq!(wires.len(), 4);
        generator.resolve_layout(EntityId(entity), "Door", true, &catalog, &mut rng);
    }

    assert!(!generator.cache().contains("SecureDoor"));
    assert_eq!(generator.cache().len(), 1);
    assert_eq!(generator.cache().get("Door"), Some(&snapshot));

    let again = generator.resolve_layout(EntityId(99), "Door", false, &catalog, &mut rng);
    assert_eq!(colors_and_letters(&door), colors_and_letters(&again));
}

#[test]
fn unknown_or_empty_layout_yields_no_wires() {
    let catalog = catalog();
    let mut generator = LayoutGenerator::new(prototypes());
    let mut rng = StdRng::seed_from_u64(1);

    assert!(generator
        .resolve_layout(EntityId(1), "Nope", false, &catalog, &mut rng)
        .is_empty());
    assert!(generator
        .resolve_layout(EntityId(1), "Empty", false, &catalog, &mut rng)
        .is_empty());
    assert!(generator.cache().is_empty());
}

#[test]
fn vetoed_second_occurrence_becomes_a_dummy() {
    let catalog = catalog();
    let mut generator = LayoutGenerator::new(prototypes());
    let mut rng = StdRng::seed_from_u64(2);

    let wires = generator.resolve_layout(EntityId(1), "Alarmed", false, &catalog, &mut rng);
    assert_eq!(wires.len(), 3);
    assert_eq!(wires.iter().filter(|wire| wire.action_id() == "alarm").count(), 1);
    assert_eq!(wires.iter().filter(|wire| wire.action_id() == DUMMY_ACTION_ID).count(), 1);
}

#[test]
fn wire_ids_follow_positions() {
    let catalog = catalog();
    let mut generator = LayoutGenerator::new(prototypes());
    let mut rng = StdRng::seed_from_u64(4);

    let wires = generator.resolve_layout(EntityId(1), "Door", false, &catalog, &mut rng);
    let ids: Vec<u32> = wires.iter().map(|wire| wire.id.0).collect();
    assert_eq!(ids, vec![1, 2, 3, 4]);
}

#[test]
fn palette_overflow_falls_back_to_sentinel() {
    let catalog = catalog();
    let mut prototypes = LayoutPrototypes::new();
    prototypes
        .insert(LayoutPrototype {
            id: "Crowded".into(),
            parent: None,
            wires: None,
            dummy_wires: 14,
        })
        .expect("insert");
    let mut generator = LayoutGenerator::new(prototypes);
    let mut rng = StdRng::seed_from_u64(6);

    let wires = generator.resolve_layout(EntityId(1), "Crowded", false, &catalog, &mut rng);
    assert_eq!(wires.len(), 14);
    let reds = wires.iter().filter(|wire| wire.color == WireColor::Red).count();
    assert_eq!(reds, 3);
    let mut letters: Vec<WireLetter> = wires.iter().map(|wire| wire.letter).collect();
    letters.sort();
    letters.dedup();
    assert_eq!(letters.len(), 14);
}

#[test]
fn unknown_action_id_is_padded_with_a_dummy() {
    let catalog = catalog();
    let mut prototypes = LayoutPrototypes::new();
    prototypes
        .insert(LayoutPrototype {
            id: "Odd".into(),
            parent: None,
            wires: Some(vec!["power".into(), "teleport".into()]),
            dummy_wires: 0,
        })
        .expect("insert");
    let mut generator = LayoutGenerator::new(prototypes);
    let mut rng = StdRng::seed_from_u64(6);

    let wires = generator.resolve_layout(EntityId(1), "Odd", false, &catalog, &mut rng);
    assert_eq!(wires.len(), 2);
    assert!(wires.iter().any(|wire| wire.action_id() == DUMMY_ACTION_ID));
}
