//! Error types.

use thiserror::Error;

/// Errors raised while loading or validating configuration.
#[derive(Debug, Error)]
pub enum ConfigError {
    /// I/O error reading the configuration file.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// The file is not valid INI.
    #[error("Failed to parse config file: {0}")]
    Parse(String),

    /// A key holds a value that cannot be used.
    #[error("Invalid value '{value}' for '{key}'")]
    InvalidValue { key: String, value: String },
}

/// Errors raised by the extrapolation engine.
///
/// Missing or short track history is never an error; the only hard
/// precondition is a positive, finite refresh rate.
#[derive(Debug, Error)]
pub enum ExtrapolationError {
    /// Refresh rate must be a positive, finite number of seconds.
    #[error("Refresh rate must be positive and finite, got {0}")]
    InvalidRefreshRate(f64),

    /// Configuration error.
    #[error("Configuration error: {0}")]
    Config(#[from] ConfigError),
}

pub type Result<T> = std::result::Result<T, ExtrapolationError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_invalid_refresh_rate_display() {
        let err = ExtrapolationError::InvalidRefreshRate(0.0);
        assert!(err.to_string().contains("positive"));
        assert!(err.to_string().contains('0'));
    }

    #[test]
    fn test_from_config_error() {
        let config_err = ConfigError::InvalidValue {
            key: "extrapolation.strategy".to_string(),
            value: "psychic".to_string(),
        };
        let err: ExtrapolationError = config_err.into();
        assert!(matches!(err, ExtrapolationError::Config(_)));
        assert!(err.to_string().contains("psychic"));
    }
}
