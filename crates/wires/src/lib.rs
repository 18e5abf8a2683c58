//! Maintenance-panel wire hacking: shared wire actions, layout generation,
//! per-entity panels, timed reversions and the interaction state machine.

pub mod action;
pub mod config;
pub mod context;
pub mod error;
pub mod interaction;
pub mod layout;
pub mod panel;
pub mod projector;
pub mod state;
pub mod system;
pub mod timer;
pub mod toggle;
pub mod wire;

pub use action::{ActionCatalog, ActionCatalogBuilder, DummyWireAction, WireAction, WireServices};
pub use config::{load_settings, load_settings_from, WiresSettings};
pub use context::WireContext;
pub use error::WiresError;
pub use interaction::{InteractionHost, InteractionOutcome, WireInteraction};
pub use layout::{LayoutGenerator, LayoutPrototype, LayoutPrototypes};
pub use panel::{Panel, PanelConfig};
pub use state::StateStore;
pub use system::WiresSystem;
pub use timer::{TimedActionOutcome, TimedActionScheduler};
pub use toggle::ToggleWireAction;
pub use wire::Wire;
