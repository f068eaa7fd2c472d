use crate::config::error::ConfigError;
use crate::external::TransportError;
use thiserror::Error;

/// Application-wide error type for everything outside the per-request push path.
///
/// Per-request failures (routing, validation, provider errors) never surface as
/// `AppError`; they are normalized by the response reporter instead. This type
/// covers startup, CLI commands and background jobs.
#[derive(Error, Debug)]
pub enum AppError {
    /// Configuration error with key information
    #[error("Configuration error: {key}")]
    Configuration {
        key: String,
        #[source]
        source: anyhow::Error,
    },

    /// Outbound HTTP client could not be built or used
    #[error("HTTP transport error: {0}")]
    Transport(#[from] TransportError),

    /// Internal error for unexpected failures
    #[error("Internal error")]
    Internal {
        #[source]
        source: anyhow::Error,
    },
}

impl From<anyhow::Error> for AppError {
    fn from(error: anyhow::Error) -> Self {
        AppError::Internal { source: error }
    }
}

impl From<ConfigError> for AppError {
    fn from(error: ConfigError) -> Self {
        let key = match &error {
            ConfigError::ValidationError { field, .. } => field.clone(),
            _ => "configuration".to_string(),
        };
        AppError::Configuration {
            key,
            source: anyhow::Error::new(error),
        }
    }
}

/// Type alias for Result with AppError to simplify function signatures
pub type AppResult<T> = Result<T, AppError>;
