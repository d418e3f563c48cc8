//! Facade error type.

use thiserror::Error;

/// Errors raised while turning a configuration into a live store.
#[derive(Debug, Error)]
pub enum KeyplexError {
    /// Loading or validating configuration failed.
    #[error(transparent)]
    Config(#[from] keyplex_config::ConfigError),

    /// Opening the backend or resolving the namespace failed.
    #[error(transparent)]
    Storage(#[from] keyplex_storage::StorageError),

    /// Logging could not be set up.
    #[error(transparent)]
    Telemetry(#[from] keyplex_telemetry::TelemetryError),
}

/// Result type for facade operations.
pub type KeyplexResult<T> = Result<T, KeyplexError>;
