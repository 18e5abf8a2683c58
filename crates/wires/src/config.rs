use std::{collections::HashMap, fs, path::Path, time::Duration};

use tracing::warn;

use crate::error::{Result, WiresError};

pub const SETTINGS_FILE: &str = "wires.toml";

#[derive(Debug, Clone, PartialEq)]
pub struct WiresSettings {
    /// Confirmation delay between a wire click and its effect. Zero applies
    /// the action immediately.
    pub interaction_delay: Duration,
    /// How long a screwing tool takes to open or close the maintenance panel.
    pub screw_time: Duration,
    /// Reversion delay armed by pulsing a toggle wire.
    pub pulse_timeout: Duration,
    /// Fixed generator seed. `None` seeds from the operating system.
    pub rng_seed: Option<u64>,
    pub layouts_path: Option<String>,
    pub default_board_name: String,
}

impl Default for WiresSettings {
    fn default() -> Self {
        Self {
            interaction_delay: Duration::ZERO,
            screw_time: Duration::from_millis(2500),
            pulse_timeout: Duration::from_secs(30),
            rng_seed: None,
            layouts_path: None,
            default_board_name: "Wires".into(),
        }
    }
}

pub fn load_settings() -> WiresSettings {
    load_settings_from(Path::new(SETTINGS_FILE))
}

pub fn load_settings_from(path: &Path) -> WiresSettings {
    let mut settings = WiresSettings::default();

    if let Ok(raw) = fs::read_to_string(path) {
        apply_file_overrides(&mut settings, &raw);
    }

    apply_env_overrides(&mut settings, |key| std::env::var(key).ok());
    settings
}

pub(crate) fn apply_file_overrides(settings: &mut WiresSettings, raw: &str) {
    let file_cfg = match toml::from_str::<HashMap<String, toml::Value>>(raw) {
        Ok(file_cfg) => file_cfg,
        Err(error) => {
            warn!(%error, "ignoring unreadable wires settings file");
            return;
        }
    };

    for (key, value) in file_cfg {
        let value = match value {
            toml::Value::String(v) => v,
            other => other.to_string(),
        };
        apply_setting(settings, &key, &value);
    }
}

/// Applies `WIRES_*` variables, then the `APP__*` aliases on top of them.
pub(crate) fn apply_env_overrides(
    settings: &mut WiresSettings,
    lookup: impl Fn(&str) -> Option<String>,
) {
    const KEYS: [&str; 6] = [
        "interaction_delay_ms",
        "screw_time_ms",
        "pulse_timeout_ms",
        "rng_seed",
        "layouts_path",
        "default_board_name",
    ];

    for key in KEYS {
        let upper = key.to_ascii_uppercase();
        if let Some(v) = lookup(&format!("WIRES_{upper}")) {
            apply_setting(settings, key, &v);
        }
        if let Some(v) = lookup(&format!("APP__{upper}")) {
            apply_setting(settings, key, &v);
        }
    }
}

fn apply_setting(settings: &mut WiresSettings, key: &str, value: &str) {
    let applied = match key {
        "interaction_delay_ms" => {
            parse_millis(key, value).map(|v| settings.interaction_delay = v)
        }
        "screw_time_ms" => parse_millis(key, value).map(|v| settings.screw_time = v),
        "pulse_timeout_ms" => parse_millis(key, value).map(|v| settings.pulse_timeout = v),
        "rng_seed" => parse_seed(key, value).map(|v| settings.rng_seed = v),
        "layouts_path" => {
            let value = value.trim();
            settings.layouts_path = (!value.is_empty()).then(|| value.to_string());
            Ok(())
        }
        "default_board_name" => {
            settings.default_board_name = value.to_string();
            Ok(())
        }
        _ => {
            warn!(key, "unknown wires setting");
            Ok(())
        }
    };

    if let Err(error) = applied {
        warn!(%error, "keeping previous value");
    }
}

fn parse_millis(key: &str, raw: &str) -> Result<Duration> {
    raw.trim()
        .parse::<u64>()
        .map(Duration::from_millis)
        .map_err(|error| WiresError::InvalidSetting {
            key: key.to_string(),
            reason: error.to_string(),
        })
}

fn parse_seed(key: &str, raw: &str) -> Result<Option<u64>> {
    let raw = raw.trim();
    if raw.is_empty() || raw.eq_ignore_ascii_case("random") {
        return Ok(None);
    }
    raw.parse::<u64>()
        .map(Some)
        .map_err(|error| WiresError::InvalidSetting {
            key: key.to_string(),
            reason: error.to_string(),
        })
}

#[cfg(test)]
#[path = "tests/config_tests.rs"]
mod tests;
