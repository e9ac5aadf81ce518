use thiserror::Error;

/// Failures that stop a projection before any computation happens.
#[derive(Debug, Error, PartialEq)]
pub enum ProjectionError {
    #[error("Validation failed: {0}")]
    Validation(String),
}

/// Errors raised by projection history stores.
#[derive(Debug, Error)]
pub enum StoreError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
    #[error("Serialization error: {0}")]
    Serde(#[from] serde_json::Error),
    #[error("Projection history unavailable: {0}")]
    Unavailable(String),
}

/// Errors raised while loading or saving settings.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
    #[error("Serialization error: {0}")]
    Serde(String),
}
