use serde::{Deserialize, Serialize};

macro_rules! id_newtype {
    ($name:ident, $inner:ty) => {
        #[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
        pub struct $name(pub $inner);

        impl std::fmt::Display for $name {
            fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
                self.0.fmt(f)
            }
        }
    };
}

id_newtype!(EntityId, i64);
id_newtype!(WireId, u32);

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum WireColor {
    Red,
    Blue,
    Green,
    Orange,
    Brown,
    Gold,
    Gray,
    Cyan,
    Navy,
    Purple,
    Pink,
    Fuchsia,
}

impl WireColor {
    pub const ALL: [WireColor; 12] = [
        WireColor::Red,
        WireColor::Blue,
        WireColor::Green,
        WireColor::Orange,
        WireColor::Brown,
        WireColor::Gold,
        WireColor::Gray,
        WireColor::Cyan,
        WireColor::Navy,
        WireColor::Purple,
        WireColor::Pink,
        WireColor::Fuchsia,
    ];

    /// Assigned to every wire once the palette is exhausted.
    pub const SENTINEL: WireColor = WireColor::Red;
}

/// Greek letter printed under a wire.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum WireLetter {
    Alpha,
    Beta,
    Gamma,
    Delta,
    Epsilon,
    Zeta,
    Eta,
    Theta,
    Iota,
    Kappa,
    Lambda,
    Mu,
    Nu,
    Xi,
    Omicron,
    Pi,
    Rho,
    Sigma,
    Tau,
    Upsilon,
    Phi,
    Chi,
    Psi,
    Omega,
}

impl WireLetter {
    pub const ALL: [WireLetter; 24] = [
        WireLetter::Alpha,
        WireLetter::Beta,
        WireLetter::Gamma,
        WireLetter::Delta,
        WireLetter::Epsilon,
        WireLetter::Zeta,
        WireLetter::Eta,
        WireLetter::Theta,
        WireLetter::Iota,
        WireLetter::Kappa,
        WireLetter::Lambda,
        WireLetter::Mu,
        WireLetter::Nu,
        WireLetter::Xi,
        WireLetter::Omicron,
        WireLetter::Pi,
        WireLetter::Rho,
        WireLetter::Sigma,
        WireLetter::Tau,
        WireLetter::Upsilon,
        WireLetter::Phi,
        WireLetter::Chi,
        WireLetter::Psi,
        WireLetter::Omega,
    ];

    pub const SENTINEL: WireLetter = WireLetter::Alpha;

    pub fn glyph(self) -> char {
        const GLYPHS: [char; 24] = [
            'α', 'β', 'γ', 'δ', 'ε', 'ζ', 'η', 'θ', 'ι', 'κ', 'λ', 'μ', 'ν', 'ξ', 'ο', 'π', 'ρ',
            'σ', 'τ', 'υ', 'φ', 'χ', 'ψ', 'ω',
        ];
        GLYPHS[self as usize]
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum WiresAction {
    Cut,
    Mend,
    Pulse,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ToolQuality {
    Cutting,
    Pulsing,
    Screwing,
}

impl WiresAction {
    pub fn required_quality(self) -> ToolQuality {
        match self {
            WiresAction::Cut | WiresAction::Mend => ToolQuality::Cutting,
            WiresAction::Pulse => ToolQuality::Pulsing,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum LightColor {
    Red,
    Green,
    Blue,
    Yellow,
    Orange,
    Purple,
    White,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum LightState {
    Off,
    On,
    BlinkingFast,
    BlinkingSlow,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StatusLightData {
    pub color: LightColor,
    pub state: LightState,
    pub text: String,
}

impl StatusLightData {
    pub fn new(color: LightColor, state: LightState, text: impl Into<String>) -> Self {
        Self {
            color,
            state,
            text: text.into(),
        }
    }

    /// Same light with the state forced to [`LightState::Off`].
    pub fn off(self) -> Self {
        Self {
            state: LightState::Off,
            ..self
        }
    }
}
