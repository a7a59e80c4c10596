//! CLI error type.

use thiserror::Error;
use trackcast::error::{ConfigError, ExtrapolationError};

#[derive(Debug, Error)]
pub enum CliError {
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("Configuration error: {0}")]
    Config(#[from] ConfigError),

    #[error(transparent)]
    Extrapolation(#[from] ExtrapolationError),

    #[error("Invalid argument: {0}")]
    Argument(String),
}
