//! Keyplex: namespaced key-value stores over durable and session storage.
//!
//! This crate ties the pieces together. Storage types come from
//! [`keyplex_storage`], configuration from [`keyplex_config`], logging from
//! [`keyplex_telemetry`].
//!
//! # Usage
//!
//! ```rust,no_run
//! use keyplex::Config;
//!
//! # fn main() -> keyplex::KeyplexResult<()> {
//! let config = Config::from_toml_str(
//!     r#"
//!     origin = "https://app.example.com"
//!
//!     [storage]
//!     kind = "session"
//!     "#,
//! )?;
//! keyplex::init_logging(&config)?;
//!
//! let plex = keyplex::open(&config)?;
//! plex.set("cache/a", &serde_json::json!({"x": 1}))?;
//! plex.del("cache/%")?;
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
mod open;

pub use error::{KeyplexError, KeyplexResult};
pub use open::{
    host_context, init_logging, local_storage_path, log_config, open, open_backend, plex_for,
    resolve_namespace,
};

pub use keyplex_config::{Config, ConfigError, StorageKind};
pub use keyplex_storage::{
    Detached, HostContext, LocalPlex, LocalStorage, Namespace, Plex, SessionPlex,
    SessionStorage, StaticOrigin, StorageBackend, StorageError, StorageResult,
};
pub use keyplex_telemetry::{FileRotation, LogConfig, LogFormat, LogTarget, TelemetryError};
