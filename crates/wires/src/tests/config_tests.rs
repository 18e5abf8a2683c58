use super::*;

use std::{
    env,
    time::{SystemTime, UNIX_EPOCH},
};

#[test]
fn defaults_apply_actions_immediately() {
    let settings = WiresSettings::default();
    assert_eq!(settings.interaction_delay, Duration::ZERO);
    assert_eq!(settings.screw_time, Duration::from_millis(2500));
    assert_eq!(settings.default_board_name, "Wires");
}

#[test]
fn file_values_override_defaults() {
    let mut settings = WiresSettings::default();
    apply_file_overrides(
        &mut settings,
        r#"
interaction_delay_ms = 750
pulse_timeout_ms = "1000"
rng_seed = 42
layouts_path = "layouts.toml"
"#,
    );

    assert_eq!(settings.interaction_delay, Duration::from_millis(750));
    assert_eq!(settings.pulse_timeout, Duration::from_secs(1));
    assert_eq!(settings.rng_seed, Some(42));
    assert_eq!(settings.layouts_path.as_deref(), Some("layouts.toml"));
}

#[test]
fn bad_values_keep_previous_setting() {
    let mut settings = WiresSettings::default();
    apply_file_overrides(&mut settings, "screw_time_ms = \"soon\"");
    assert_eq!(settings.screw_time, Duration::from_millis(2500));

    apply_file_overrides(&mut settings, "this is not toml");
    assert_eq!(settings, WiresSettings::default());
}

#[test]
fn app_alias_wins_over_wires_prefix() {
    let vars: HashMap<&str, &str> = HashMap::from([
        ("WIRES_SCREW_TIME_MS", "100"),
        ("APP__SCREW_TIME_MS", "200"),
        ("WIRES_RNG_SEED", "random"),
        ("WIRES_DEFAULT_BOARD_NAME", "Airlock Control"),
    ]);
    let mut settings = WiresSettings {
        rng_seed: Some(9),
        ..WiresSettings::default()
    };

    apply_env_overrides(&mut settings, |key| vars.get(key).map(|v| v.to_string()));

    assert_eq!(settings.screw_time, Duration::from_millis(200));
    assert_eq!(settings.rng_seed, None);
    assert_eq!(settings.default_board_name, "Airlock Control");
}

#[test]
fn loads_settings_file_from_disk() {
    let suffix = SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .expect("clock")
        .as_nanos();
    let temp_root = env::temp_dir().join(format!("wires_settings_test_{suffix}"));
    fs::create_dir_all(&temp_root).expect("temp root");
    let path = temp_root.join(SETTINGS_FILE);
    fs::write(&path, "interaction_delay_ms = 1500\n").expect("write settings");

    let settings = load_settings_from(&path);
    assert_eq!(settings.interaction_delay, Duration::from_millis(1500));

    fs::remove_dir_all(temp_root).expect("cleanup");
}

#[test]
fn missing_file_yields_defaults() {
    let settings = load_settings_from(Path::new("/definitely/not/here/wires.toml"));
    assert_eq!(settings.screw_time, WiresSettings::default().screw_time);
}
