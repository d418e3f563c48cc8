//! Post-load configuration validation.

use crate::error::{ConfigError, ConfigResult};
use crate::types::Config;

/// Validate a deserialized configuration.
///
/// # Errors
///
/// Returns the first validation error found.
pub fn validate(config: &Config) -> ConfigResult<()> {
    validate_namespace(config)?;
    validate_logging(config)?;
    Ok(())
}

fn validate_namespace(config: &Config) -> ConfigResult<()> {
    if let Some(ns) = &config.namespace
        && ns.is_empty()
    {
        return Err(ConfigError::Invalid {
            field: "namespace".to_owned(),
            message: "namespace must not be empty".to_owned(),
        });
    }

    if let Some(origin) = &config.origin {
        let url = url::Url::parse(origin).map_err(|e| ConfigError::Invalid {
            field: "origin".to_owned(),
            message: format!("'{origin}' is not a valid URL: {e}"),
        })?;
        if url.host_str().is_none_or(str::is_empty) {
            return Err(ConfigError::Invalid {
                field: "origin".to_owned(),
                message: format!("'{origin}' has no hostname to derive a namespace from"),
            });
        }
    }

    if config.namespace.is_none() && config.origin.is_none() {
        return Err(ConfigError::Invalid {
            field: "namespace".to_owned(),
            message: "set either namespace or origin".to_owned(),
        });
    }

    Ok(())
}

fn validate_logging(config: &Config) -> ConfigResult<()> {
    let valid_levels = ["trace", "debug", "info", "warn", "error"];
    if !valid_levels.contains(&config.logging.level.as_str()) {
        return Err(ConfigError::Invalid {
            field: "logging.level".to_owned(),
            message: format!(
                "unsupported log level '{}'; expected one of: {}",
                config.logging.level,
                valid_levels.join(", ")
            ),
        });
    }

    let valid_formats = ["pretty", "compact", "json", "full"];
    if !valid_formats.contains(&config.logging.format.as_str()) {
        return Err(ConfigError::Invalid {
            field: "logging.format".to_owned(),
            message: format!(
                "unsupported log format '{}'; expected one of: {}",
                config.logging.format,
                valid_formats.join(", ")
            ),
        });
    }

    let valid_targets = ["stderr", "stdout", "file"];
    if !valid_targets.contains(&config.logging.target.as_str()) {
        return Err(ConfigError::Invalid {
            field: "logging.target".to_owned(),
            message: format!(
                "unsupported log target '{}'; expected one of: {}",
                config.logging.target,
                valid_targets.join(", ")
            ),
        });
    }
    if config.logging.target == "file" && config.logging.directory.is_none() {
        return Err(ConfigError::Invalid {
            field: "logging.directory".to_owned(),
            message: "file logging needs a directory".to_owned(),
        });
    }

    let valid_rotations = ["daily", "hourly", "never"];
    if !valid_rotations.contains(&config.logging.rotation.as_str()) {
        return Err(ConfigError::Invalid {
            field: "logging.rotation".to_owned(),
            message: format!(
                "unsupported rotation '{}'; expected one of: {}",
                config.logging.rotation,
                valid_rotations.join(", ")
            ),
        });
    }

    Ok(())
}
