use thiserror::Error;

#[derive(Debug, Error)]
pub enum WiresError {
    #[error("failed to parse layout prototypes: {0}")]
    PrototypeParse(#[from] toml::de::Error),
    #[error("layout prototype '{0}' is declared more than once")]
    DuplicateLayout(String),
    #[error("layout prototype '{0}' is not defined")]
    UnknownLayout(String),
    #[error("wire action '{0}' is registered more than once")]
    DuplicateAction(String),
    #[error("invalid setting '{key}': {reason}")]
    InvalidSetting { key: String, reason: String },
}

pub type Result<T, E = WiresError> = std::result::Result<T, E>;
