//! Configuration error types.

use thiserror::Error;

use crate::decode::DecodeError;

/// Configuration loading error.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("failed to read env file {path}: {source}")]
    EnvFile {
        path: String,
        source: dotenvy::Error,
    },
    #[error("failed to decode config: {0}")]
    Decode(#[from] DecodeError),
    #[error("validation failed: {0}")]
    Validation(String),
}
