//! Config file discovery and loading.
//!
//! 1. Read the file (or start from an empty table if it is absent)
//! 2. Apply `KEYPLEX_*` env var fallbacks for unset fields
//! 3. Deserialize into [`Config`]
//! 4. Validate

use std::collections::HashMap;
use std::path::{Path, PathBuf};

use tracing::{debug, info};

use crate::env::{apply_env_fallbacks, collect_env_vars};
use crate::error::{ConfigError, ConfigResult};
use crate::types::Config;
use crate::validate;

/// Maximum allowed config file size (1 MB).
const MAX_CONFIG_FILE_SIZE: u64 = 1_048_576;

/// The platform config file location (e.g. `$XDG_CONFIG_HOME/keyplex/config.toml`).
#[must_use]
pub fn default_config_path() -> Option<PathBuf> {
    directories::ProjectDirs::from("", "", "keyplex").map(|d| d.config_dir().join("config.toml"))
}

/// Load configuration from `path`, or from [`default_config_path`] when
/// `None`. A missing file is not an error: defaults plus env vars apply.
///
/// # Errors
///
/// Returns a [`ConfigError`] if the file is unreadable or malformed, or if
/// the result fails validation.
pub fn load(path: Option<&Path>) -> ConfigResult<Config> {
    let path = path.map(Path::to_path_buf).or_else(default_config_path);
    let root = match &path {
        Some(p) => try_load_file(p)?,
        None => None,
    };
    let root = root.unwrap_or_else(|| toml::Value::Table(toml::map::Map::new()));
    let label = path.map_or_else(|| "<defaults>".to_owned(), |p| p.display().to_string());
    finish(root, &collect_env_vars(), &label)
}

/// Load configuration from a file that must exist.
///
/// # Errors
///
/// Returns a [`ConfigError`] if the file cannot be read, parsed, or fails
/// validation.
pub fn load_file(path: &Path) -> ConfigResult<Config> {
    let root = try_load_file(path)?.ok_or_else(|| ConfigError::Read {
        path: path.display().to_string(),
        source: std::io::Error::from(std::io::ErrorKind::NotFound),
    })?;
    finish(root, &collect_env_vars(), &path.display().to_string())
}

/// Parse configuration from TOML text, with the given env vars as fallback.
///
/// # Errors
///
/// Returns a [`ConfigError`] if the text is malformed or fails validation.
pub fn from_toml_str_with_env<S: ::std::hash::BuildHasher>(
    text: &str,
    env_vars: &HashMap<String, String, S>,
) -> ConfigResult<Config> {
    let root = parse(text, "<inline>")?;
    finish(root, env_vars, "<inline>")
}

fn finish<S: ::std::hash::BuildHasher>(
    mut root: toml::Value,
    env_vars: &HashMap<String, String, S>,
    label: &str,
) -> ConfigResult<Config> {
    let env_count = apply_env_fallbacks(&mut root, env_vars);
    if env_count > 0 {
        debug!(count = env_count, "applied environment variable fallbacks");
    }

    let config: Config = root
        .try_into()
        .map_err(|e: toml::de::Error| ConfigError::Parse {
            path: label.to_owned(),
            source: e,
        })?;

    validate::validate(&config)?;
    Ok(config)
}

fn parse(text: &str, label: &str) -> ConfigResult<toml::Value> {
    toml::from_str(text).map_err(|e| ConfigError::Parse {
        path: label.to_owned(),
        source: e,
    })
}

/// Try to load a file, returning `None` if the file doesn't exist.
fn try_load_file(path: &Path) -> ConfigResult<Option<toml::Value>> {
    let content = match std::fs::read_to_string(path) {
        Ok(c) => c,
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
            debug!(path = %path.display(), "config file not found, skipping");
            return Ok(None);
        },
        Err(e) => {
            return Err(ConfigError::Read {
                path: path.display().to_string(),
                source: e,
            });
        },
    };

    if content.len() as u64 > MAX_CONFIG_FILE_SIZE {
        return Err(ConfigError::Invalid {
            field: path.display().to_string(),
            message: format!(
                "config file is {} bytes, exceeding the {} byte limit",
                content.len(),
                MAX_CONFIG_FILE_SIZE
            ),
        });
    }

    let value = parse(&content, &path.display().to_string())?;
    info!(path = %path.display(), "loaded config");
    Ok(Some(value))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::StorageKind;

    fn no_env() -> HashMap<String, String> {
        HashMap::new()
    }

    #[test]
    fn test_from_toml_full() {
        let text = r#"
            namespace = "com.example.app"

            [storage]
            kind = "session"
            quota_bytes = 0

            [logging]
            level = "debug"
            format = "json"
            directives = ["keyplex_storage=trace"]
        "#;
        let config = from_toml_str_with_env(text, &no_env()).unwrap();
        assert_eq!(config.namespace.as_deref(), Some("com.example.app"));
        assert_eq!(config.storage.kind, StorageKind::Session);
        assert_eq!(config.storage.quota(), None);
        assert_eq!(config.logging.format, "json");
        assert_eq!(config.logging.directives, vec!["keyplex_storage=trace"]);
    }

    #[test]
    fn test_from_toml_uses_env_fallback() {
        let env: HashMap<String, String> =
            [("KEYPLEX_ORIGIN".to_owned(), "https://app.example.com".to_owned())]
                .into_iter()
                .collect();
        let config = from_toml_str_with_env("", &env).unwrap();
        assert_eq!(config.origin.as_deref(), Some("https://app.example.com"));
    }

    #[test]
    fn test_from_toml_rejects_bad_kind() {
        let text = "namespace = \"ns\"\n[storage]\nkind = \"cloud\"\n";
        assert!(matches!(
            from_toml_str_with_env(text, &no_env()),
            Err(ConfigError::Parse { .. })
        ));
    }

    #[test]
    fn test_from_toml_rejects_malformed() {
        assert!(matches!(
            from_toml_str_with_env("namespace = ", &no_env()),
            Err(ConfigError::Parse { .. })
        ));
    }

    #[test]
    fn test_load_file_reads_disk() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("config.toml");
        std::fs::write(&path, "namespace = \"disk\"\n").unwrap();
        let config = load_file(&path).unwrap();
        assert_eq!(config.namespace.as_deref(), Some("disk"));
    }

    #[test]
    fn test_load_file_missing_is_error() {
        let dir = tempfile::tempdir().unwrap();
        assert!(matches!(
            load_file(&dir.path().join("absent.toml")),
            Err(ConfigError::Read { .. })
        ));
    }

    #[test]
    fn test_load_file_too_large() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("big.toml");
        let padding = "#".repeat(1_048_577);
        std::fs::write(&path, padding).unwrap();
        assert!(matches!(
            load_file(&path),
            Err(ConfigError::Invalid { .. })
        ));
    }
}
