// SecureValues — Top-level error types
//
// Aggregates errors from the provider, config, and flavor modules into a
// single error enum for the application boundary.

use thiserror::Error;

/// Top-level error type for all SecureValues operations.
#[derive(Debug, Error)]
pub enum SecureValuesError {
    #[error("Provider error: {0}")]
    Provider(#[from] crate::provider::ProviderError),

    #[error("Config error: {0}")]
    Config(#[from] crate::config::ConfigError),

    #[error("{0}")]
    Flavor(#[from] crate::flavor::ParseFlavorError),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("{0}")]
    Other(String),
}

pub type Result<T> = std::result::Result<T, SecureValuesError>;
