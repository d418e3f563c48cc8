#![deny(unsafe_code)]
#![warn(missing_docs)]
#![deny(clippy::all)]
#![warn(unreachable_pub)]
//! Configuration for keyplex stores.
//!
//! # Usage
//!
//! ```rust,no_run
//! use keyplex_config::Config;
//!
//! let config = Config::load_file(std::path::Path::new("keyplex.toml")).unwrap();
//! println!("storage kind: {:?}", config.storage.kind);
//! ```
//!
//! # File format
//!
//! ```toml
//! namespace = "com.example.app"       # optional
//! origin = "https://app.example.com"  # used when namespace is unset
//!
//! [storage]
//! kind = "local"                      # "local" | "session"
//! data_dir = "/var/lib/keyplex"       # default: platform data dir
//! quota_bytes = 5242880               # 0 disables the quota
//!
//! [logging]
//! level = "info"
//! format = "compact"
//! directives = []
//! target = "stderr"                   # "stderr" | "stdout" | "file"
//! directory = "/var/log/keyplex"      # required for target = "file"
//! rotation = "daily"                  # "daily" | "hourly" | "never"
//! ```
//!
//! `KEYPLEX_*` environment variables fill any field the file leaves unset.
//!
//! This crate has **no dependencies on other keyplex crates**. Conversion
//! into live stores happens in the `keyplex` facade.

/// Environment variable fallback resolution.
pub mod env;
/// Configuration error types.
pub mod error;
/// Configuration file discovery and loading.
pub mod loader;
/// Configuration struct definitions.
pub mod types;
/// Configuration validation rules.
pub mod validate;

pub use error::{ConfigError, ConfigResult};
pub use types::*;

impl Config {
    /// Load from `path`, or the platform default location when `None`.
    ///
    /// # Errors
    ///
    /// Returns a [`ConfigError`] if the file is malformed or the result
    /// fails validation.
    pub fn load(path: Option<&std::path::Path>) -> ConfigResult<Self> {
        loader::load(path)
    }

    /// Load from a file that must exist.
    ///
    /// # Errors
    ///
    /// Returns a [`ConfigError`] if the file cannot be read, parsed, or fails
    /// validation.
    pub fn load_file(path: &std::path::Path) -> ConfigResult<Self> {
        loader::load_file(path)
    }

    /// Parse from TOML text, ignoring the process environment.
    ///
    /// # Errors
    ///
    /// Returns a [`ConfigError`] if the text is malformed or fails validation.
    pub fn from_toml_str(text: &str) -> ConfigResult<Self> {
        loader::from_toml_str_with_env(text, &std::collections::HashMap::<String, String>::new())
    }
}
