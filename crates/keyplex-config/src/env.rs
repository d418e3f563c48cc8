//! Environment variable fallbacks.
//!
//! Env vars are **fallback**, not override: they only fill fields the config
//! file left unset.

use std::collections::HashMap;

use tracing::debug;

/// Mapping from environment variable name to config field path.
struct EnvMapping {
    var_name: &'static str,
    field_path: &'static str,
}

/// All supported `KEYPLEX_*` env var mappings.
const ENV_MAPPINGS: &[EnvMapping] = &[
    EnvMapping {
        var_name: "KEYPLEX_NAMESPACE",
        field_path: "namespace",
    },
    EnvMapping {
        var_name: "KEYPLEX_ORIGIN",
        field_path: "origin",
    },
    EnvMapping {
        var_name: "KEYPLEX_STORAGE_KIND",
        field_path: "storage.kind",
    },
    EnvMapping {
        var_name: "KEYPLEX_DATA_DIR",
        field_path: "storage.data_dir",
    },
    EnvMapping {
        var_name: "KEYPLEX_QUOTA_BYTES",
        field_path: "storage.quota_bytes",
    },
    EnvMapping {
        var_name: "KEYPLEX_LOG_LEVEL",
        field_path: "logging.level",
    },
    EnvMapping {
        var_name: "KEYPLEX_LOG_DIR",
        field_path: "logging.directory",
    },
];

/// Fill every mapped field that `root` does not set from `env_vars`.
///
/// Returns the number of env vars applied.
pub fn apply_env_fallbacks<S: ::std::hash::BuildHasher>(
    root: &mut toml::Value,
    env_vars: &HashMap<String, String, S>,
) -> usize {
    let mut count: usize = 0;

    for mapping in ENV_MAPPINGS {
        if field_is_set(root, mapping.field_path) {
            continue;
        }

        if let Some(val) = env_vars.get(mapping.var_name) {
            debug!(
                var = mapping.var_name,
                field = mapping.field_path,
                "applying env var fallback"
            );
            set_field(root, mapping.field_path, coerce_to_toml_value(mapping.field_path, val));
            count = count.saturating_add(1);
        }
    }

    count
}

/// Snapshot the process environment.
#[must_use]
pub fn collect_env_vars() -> HashMap<String, String> {
    std::env::vars().collect()
}

fn field_is_set(root: &toml::Value, path: &str) -> bool {
    path.split('.')
        .try_fold(root, |val, segment| val.get(segment))
        .is_some()
}

fn set_field(root: &mut toml::Value, path: &str, val: toml::Value) {
    let mut segments: Vec<&str> = path.split('.').collect();
    let Some(leaf) = segments.pop() else {
        return;
    };

    let mut current = root;
    for segment in segments {
        let Some(table) = current.as_table_mut() else {
            return;
        };
        current = table
            .entry(segment)
            .or_insert(toml::Value::Table(toml::map::Map::new()));
    }

    if let Some(table) = current.as_table_mut() {
        table.insert(leaf.to_owned(), val);
    }
}

/// Integer fields parse as integers; everything else stays a string.
fn coerce_to_toml_value(path: &str, val: &str) -> toml::Value {
    if path == "storage.quota_bytes"
        && let Ok(i) = val.parse::<i64>()
    {
        return toml::Value::Integer(i);
    }
    toml::Value::String(val.to_owned())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn make_env(pairs: &[(&str, &str)]) -> HashMap<String, String> {
        pairs
            .iter()
            .map(|(k, v)| ((*k).to_owned(), (*v).to_owned()))
            .collect()
    }

    #[test]
    fn test_env_fills_unset_fields() {
        let mut root: toml::Value = toml::from_str("").unwrap();
        let env = make_env(&[
            ("KEYPLEX_NAMESPACE", "com.example.app"),
            ("KEYPLEX_STORAGE_KIND", "session"),
            ("KEYPLEX_QUOTA_BYTES", "1024"),
        ]);
        assert_eq!(apply_env_fallbacks(&mut root, &env), 3);
        assert_eq!(root["namespace"].as_str(), Some("com.example.app"));
        assert_eq!(root["storage"]["kind"].as_str(), Some("session"));
        assert_eq!(root["storage"]["quota_bytes"].as_integer(), Some(1024));
    }

    #[test]
    fn test_env_does_not_override_file() {
        let mut root: toml::Value = toml::from_str("namespace = \"from-file\"").unwrap();
        let env = make_env(&[("KEYPLEX_NAMESPACE", "from-env")]);
        assert_eq!(apply_env_fallbacks(&mut root, &env), 0);
        assert_eq!(root["namespace"].as_str(), Some("from-file"));
    }

    #[test]
    fn test_env_extends_existing_section() {
        let mut root: toml::Value = toml::from_str("[storage]\nkind = \"local\"").unwrap();
        let env = make_env(&[
            ("KEYPLEX_STORAGE_KIND", "session"),
            ("KEYPLEX_DATA_DIR", "/srv/kp"),
        ]);
        assert_eq!(apply_env_fallbacks(&mut root, &env), 1);
        assert_eq!(root["storage"]["kind"].as_str(), Some("local"));
        assert_eq!(root["storage"]["data_dir"].as_str(), Some("/srv/kp"));
    }

    #[test]
    fn test_non_numeric_quota_stays_string() {
        assert_eq!(
            coerce_to_toml_value("storage.quota_bytes", "lots"),
            toml::Value::String("lots".to_owned())
        );
    }
}
