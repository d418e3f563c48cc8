//! Keyplex Telemetry - logging setup for keyplex stores and their hosts.
//!
//! # Example
//!
//! ```rust,no_run
//! use keyplex_telemetry::{LogConfig, LogFormat, setup_logging};
//!
//! # fn main() -> Result<(), keyplex_telemetry::TelemetryError> {
//! let config = LogConfig::new("info")
//!     .with_format(LogFormat::Compact)
//!     .with_directive("keyplex_storage=debug");
//!
//! setup_logging(&config)?;
//! tracing::info!("logging ready");
//! # Ok(())
//! # }
//! ```

#![deny(unsafe_code)]
#![deny(missing_docs)]
#![deny(clippy::all)]
#![warn(unreachable_pub)]
#![deny(clippy::unwrap_used)]
#![cfg_attr(test, allow(clippy::unwrap_used))]

mod error;
mod logging;

pub use error::{TelemetryError, TelemetryResult};
pub use logging::{
    FileLogConfig, FileRotation, LogConfig, LogFormat, LogTarget, setup_default_logging,
    setup_logging,
};
