use thiserror::Error;

/// Top-level error type for Affirm.
///
/// Engine-level failures live in `affirm-engine`; this type covers the
/// concerns shared by every crate (configuration, I/O, serialization).
#[derive(Debug, Error)]
#[non_exhaustive]
pub enum AffirmError {
    #[error("Configuration error: {0}")]
    Config(String),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Serialization error: {0}")]
    Serialization(String),
}

impl From<toml::de::Error> for AffirmError {
    fn from(err: toml::de::Error) -> Self {
        AffirmError::Config(err.to_string())
    }
}

impl From<toml::ser::Error> for AffirmError {
    fn from(err: toml::ser::Error) -> Self {
        AffirmError::Config(err.to_string())
    }
}

impl From<serde_json::Error> for AffirmError {
    fn from(err: serde_json::Error) -> Self {
        AffirmError::Serialization(err.to_string())
    }
}

/// A specialized `Result` type for Affirm operations.
pub type Result<T> = std::result::Result<T, AffirmError>;
