//! Error types for Drive Helper operations

use thiserror::Error;

/// Drive Helper error types
///
/// None of these cross the public operations of the cache, scheduler or
/// marker store; they are recovered and logged at the component boundary.
/// Adapters (transports, snapshot stores, config loading) return them.
#[derive(Error, Debug)]
pub enum HelperError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Serialization error: {0}")]
    Serialization(String),

    #[error("Transport error: {0}")]
    Transport(String),

    #[error("Persistence error: {0}")]
    Persistence(String),

    #[error("Unknown marker: {0}")]
    InvalidMarker(String),

    #[error("Config error: {0}")]
    Config(String),
}

/// Result type for Drive Helper operations
pub type Result<T> = std::result::Result<T, HelperError>;

impl From<serde_json::Error> for HelperError {
    fn from(e: serde_json::Error) -> Self {
        HelperError::Serialization(e.to_string())
    }
}

#[cfg(feature = "http")]
impl From<reqwest::Error> for HelperError {
    fn from(e: reqwest::Error) -> Self {
        HelperError::Transport(e.to_string())
    }
}
