//! Configuration types.
//!
//! Every struct implements [`Default`] so that an empty file, or a bare
//! `[section]` header, produces a working configuration.

use std::path::PathBuf;

use serde::{Deserialize, Serialize};

use crate::error::{ConfigError, ConfigResult};

/// Default quota for the durable backend, in bytes.
///
/// Mirrors `keyplex_storage::DEFAULT_QUOTA_BYTES`; the facade tests that the
/// two agree.
pub const DEFAULT_QUOTA_BYTES: usize = 5_242_880;

// ---------------------------------------------------------------------------
// Top-level Config
// ---------------------------------------------------------------------------

/// Root configuration for a keyplex store.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    /// Explicit namespace. Takes precedence over `origin`.
    pub namespace: Option<String>,
    /// Origin URL to derive the namespace from when `namespace` is unset.
    pub origin: Option<String>,
    /// Backend selection and placement.
    pub storage: StorageSection,
    /// Logging level, format, and per-crate directives.
    pub logging: LoggingSection,
}

// ---------------------------------------------------------------------------
// StorageSection
// ---------------------------------------------------------------------------

/// Which backend a store binds to.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum StorageKind {
    /// Durable, persisted per origin.
    #[default]
    Local,
    /// In memory for the lifetime of the session.
    Session,
}

/// Backend configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct StorageSection {
    /// Backend to bind.
    pub kind: StorageKind,
    /// Directory holding durable origin files. `None` uses the platform data
    /// directory (e.g. `$XDG_DATA_HOME/keyplex`).
    pub data_dir: Option<String>,
    /// Byte quota for writes. `0` disables the quota.
    pub quota_bytes: usize,
}

impl Default for StorageSection {
    fn default() -> Self {
        Self {
            kind: StorageKind::default(),
            data_dir: None,
            quota_bytes: DEFAULT_QUOTA_BYTES,
        }
    }
}

impl StorageSection {
    /// The configured quota, or `None` when disabled.
    #[must_use]
    pub fn quota(&self) -> Option<usize> {
        (self.quota_bytes > 0).then_some(self.quota_bytes)
    }

    /// The directory durable files live in.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::NoDataDir`] if no directory is configured and
    /// the platform has no data directory.
    pub fn resolved_data_dir(&self) -> ConfigResult<PathBuf> {
        if let Some(dir) = &self.data_dir {
            return Ok(PathBuf::from(dir));
        }
        directories::ProjectDirs::from("", "", "keyplex")
            .map(|d| d.data_dir().to_path_buf())
            .ok_or(ConfigError::NoDataDir)
    }
}

// ---------------------------------------------------------------------------
// LoggingSection
// ---------------------------------------------------------------------------

/// Logging and tracing configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct LoggingSection {
    /// Global log level filter (`"trace"`, `"debug"`, `"info"`, `"warn"`,
    /// `"error"`).
    pub level: String,
    /// Output format: `"pretty"`, `"compact"`, `"json"`, or `"full"`.
    pub format: String,
    /// Per-crate tracing directives (e.g. `["keyplex_storage=debug"]`).
    pub directives: Vec<String>,
    /// Where output goes: `"stderr"`, `"stdout"`, or `"file"`.
    pub target: String,
    /// Directory for rolling log files. Required when `target = "file"`.
    pub directory: Option<String>,
    /// File rotation: `"daily"`, `"hourly"`, or `"never"`.
    pub rotation: String,
}

impl Default for LoggingSection {
    fn default() -> Self {
        Self {
            level: "info".to_owned(),
            format: "compact".to_owned(),
            directives: Vec::new(),
            target: "stderr".to_owned(),
            directory: None,
            rotation: "daily".to_owned(),
        }
    }
}
