use super::*;

#[test]
fn typed_read_fails_closed_on_mismatch() {
    let mut store = StateStore::new();
    store.set("door:bolted", true);

    assert_eq!(store.get_copied::<bool>("door:bolted"), Some(true));
    assert_eq!(store.get_copied::<u32>("door:bolted"), None);
    assert!(store.contains("door:bolted"));
}

#[test]
fn take_leaves_mismatched_value_in_place() {
    let mut store = StateStore::new();
    store.set("k", 7_u64);

    assert_eq!(store.take::<String>("k"), None);
    assert!(store.contains("k"));
    assert_eq!(store.take::<u64>("k"), Some(7));
    assert!(store.is_empty());
}

#[test]
fn set_overwrites_with_a_new_type() {
    let mut store = StateStore::new();
    store.set("k", 1_i32);
    store.set("k", String::from("v"));

    assert_eq!(store.get::<i32>("k"), None);
    assert_eq!(store.get::<String>("k").map(String::as_str), Some("v"));
    assert_eq!(store.len(), 1);
}

#[test]
fn scoped_key_joins_scope_and_name() {
    assert_eq!(scoped_key("bolt", "timeout"), "bolt:timeout");
}
