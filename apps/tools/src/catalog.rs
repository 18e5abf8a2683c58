use anyhow::Result;
use wires::{ActionCatalog, ToggleWireAction, WireServices, WiresSettings};

/// Wire actions available to layouts loaded by `wirectl`.
pub fn demo_catalog(settings: &WiresSettings) -> Result<ActionCatalog> {
    let mut builder = ActionCatalog::builder();
    builder
        .register(
            "power",
            ToggleWireAction::new("power", "POWR").with_status_key("power"),
        )?
        .register(
            "bolt",
            ToggleWireAction::new("bolt", "BOLT")
                .with_status_key("bolt")
                .with_default_value(false)
                .with_cut_value(true),
        )?
        .register(
            "timing",
            ToggleWireAction::new("timing", "TIME")
                .with_status_key("timing")
                .without_power_requirement(),
        )?
        .register(
            "ai",
            ToggleWireAction::new("ai", "AI")
                .with_status_key("ai")
                .without_pulse_timeout(),
        )?;

    Ok(builder.build(&WireServices { settings }))
}
