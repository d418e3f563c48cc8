//! Configuration error types.

use std::io;

use thiserror::Error;

/// Configuration error type.
#[derive(Debug, Error)]
pub enum ConfigError {
    /// The config file could not be read.
    #[error("cannot read config {path}: {source}")]
    Read {
        /// Path that could not be read.
        path: String,
        /// Underlying I/O error.
        #[source]
        source: io::Error,
    },

    /// The TOML is malformed or does not match the expected shape.
    #[error("cannot parse config {path}: {source}")]
    Parse {
        /// Path (or `<inline>`) of the offending text.
        path: String,
        /// Underlying TOML error.
        #[source]
        source: toml::de::Error,
    },

    /// A field holds a value the store cannot work with.
    #[error("invalid config field '{field}': {message}")]
    Invalid {
        /// Dotted path of the field.
        field: String,
        /// What is wrong with it.
        message: String,
    },

    /// No data directory configured and the platform offers none.
    #[error("no data directory available; set storage.data_dir")]
    NoDataDir,
}

/// Result type for configuration operations.
pub type ConfigResult<T> = Result<T, ConfigError>;
