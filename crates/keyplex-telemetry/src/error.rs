//! Telemetry error types.

use thiserror::Error;

/// Errors that can occur while setting up logging.
#[derive(Debug, Error)]
pub enum TelemetryError {
    /// The level or a directive is not a valid filter expression.
    #[error("invalid log filter: {0}")]
    InvalidFilter(String),

    /// A log format name did not match any known format.
    #[error("unknown log format '{0}'; expected pretty, compact, json or full")]
    UnknownFormat(String),

    /// A rotation name did not match any known rotation.
    #[error("unknown file rotation '{0}'; expected daily, hourly or never")]
    UnknownRotation(String),

    /// A global subscriber is already installed.
    #[error("logging already initialized: {0}")]
    InitError(String),

    /// The log directory could not be created.
    #[error("log directory error: {0}")]
    IoError(#[from] std::io::Error),
}

/// Result type for telemetry operations.
pub type TelemetryResult<T> = Result<T, TelemetryError>;
