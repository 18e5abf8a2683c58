use std::time::Duration;

use shared::domain::{EntityId, LightColor, LightState, StatusLightData};
use tracing::debug;

use crate::{
    action::{WireAction, WireServices},
    context::WireContext,
    panel::Panel,
    state::{scoped_key, StateStore},
    timer::TimedActionHandle,
    wire::Wire,
};

/// Wire that drives one per-entity boolean.
///
/// Cutting forces the flag to `cut_value`, mending to its opposite. A pulse
/// flips the flag and, when a timeout is enabled, flips it back once the
/// pulse timeout runs out unless the wire was cut in the meantime.
#[derive(Debug, Clone)]
pub struct ToggleWireAction {
    scope: String,
    label: String,
    status_key: Option<String>,
    value_key: String,
    timeout_key: String,
    default_value: bool,
    cut_value: bool,
    requires_power: bool,
    reverts_after_pulse: bool,
    pulse_timeout: Duration,
}

impl ToggleWireAction {
    pub fn new(scope: impl Into<String>, label: impl Into<String>) -> Self {
        let scope = scope.into();
        Self {
            value_key: scoped_key(&scope, "value"),
            timeout_key: scoped_key(&scope, "timeout"),
            label: label.into(),
            status_key: None,
            scope,
            default_value: true,
            cut_value: false,
            requires_power: true,
            reverts_after_pulse: true,
            pulse_timeout: Duration::ZERO,
        }
    }

    pub fn with_status_key(mut self, key: impl Into<String>) -> Self {
        self.status_key = Some(key.into());
        self
    }

    pub fn with_default_value(mut self, value: bool) -> Self {
        self.default_value = value;
        self
    }

    /// Value the flag takes when the wire is cut.
    pub fn with_cut_value(mut self, value: bool) -> Self {
        self.cut_value = value;
        self
    }

    pub fn without_power_requirement(mut self) -> Self {
        self.requires_power = false;
        self
    }

    pub fn without_pulse_timeout(mut self) -> Self {
        self.reverts_after_pulse = false;
        self
    }

    pub fn scope(&self) -> &str {
        &self.scope
    }

    pub fn value_key(&self) -> &str {
        &self.value_key
    }

    pub fn timeout_key(&self) -> &str {
        &self.timeout_key
    }

    pub fn pulse_timeout(&self) -> Duration {
        self.pulse_timeout
    }

    pub fn value(&self, state: &StateStore) -> bool {
        read_value(state, &self.value_key, self.default_value)
    }

    fn set_value(&self, state: &mut StateStore, value: bool) {
        state.set(self.value_key.clone(), value);
    }
}

fn read_value(state: &StateStore, key: &str, default_value: bool) -> bool {
    state.get_copied::<bool>(key).unwrap_or(default_value)
}

impl WireAction for ToggleWireAction {
    fn initialize(&mut self, services: &WireServices<'_>) {
        self.pulse_timeout = services.settings.pulse_timeout;
    }

    fn cut(&self, ctx: &mut WireContext<'_>, user: EntityId, wire: &Wire) -> bool {
        self.set_value(ctx.state_mut(), self.cut_value);
        ctx.cancel_timed_action(&self.timeout_key);
        debug!(user = %user, entity = %wire.owner, scope = %self.scope, value = self.cut_value, "toggle wire cut");
        true
    }

    fn mend(&self, ctx: &mut WireContext<'_>, user: EntityId, wire: &Wire) -> bool {
        self.set_value(ctx.state_mut(), !self.cut_value);
        debug!(user = %user, entity = %wire.owner, scope = %self.scope, value = !self.cut_value, "toggle wire mended");
        true
    }

    fn pulse(&self, ctx: &mut WireContext<'_>, user: EntityId, wire: &Wire) {
        let flipped = !self.value(ctx.state());
        self.set_value(ctx.state_mut(), flipped);
        debug!(user = %user, entity = %wire.owner, scope = %self.scope, value = flipped, "toggle wire pulsed");

        if !self.reverts_after_pulse || (self.requires_power && !ctx.is_powered()) {
            return;
        }

        let value_key = self.value_key.clone();
        let default_value = self.default_value;
        ctx.start_timed_action(
            &self.timeout_key,
            self.pulse_timeout,
            wire,
            move |ctx, wire, outcome| {
                if wire.is_cut {
                    return;
                }
                let reverted = !read_value(ctx.state(), &value_key, default_value);
                ctx.state_mut().set(value_key, reverted);
                debug!(entity = %wire.owner, wire = %wire.id, ?outcome, value = reverted, "pulse reverted");
            },
        );
    }

    fn update(&self, ctx: &mut WireContext<'_>, _wire: &Wire) {
        if self.requires_power && !ctx.is_powered() {
            ctx.cancel_timed_action(&self.timeout_key);
        }
    }

    fn requires_power(&self) -> bool {
        self.requires_power
    }

    fn status_key(&self) -> Option<&str> {
        self.status_key.as_deref()
    }

    fn status_light(&self, panel: &Panel, _wire: &Wire) -> Option<StatusLightData> {
        self.status_key.as_ref()?;

        let value = self.value(panel.state());
        let color = if value { LightColor::Green } else { LightColor::Red };
        let state = if panel.state().get::<TimedActionHandle>(&self.timeout_key).is_some() {
            LightState::BlinkingSlow
        } else {
            LightState::On
        };
        Some(StatusLightData::new(color, state, self.label.clone()))
    }
}
