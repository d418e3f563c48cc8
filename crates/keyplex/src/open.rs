//! Bridge from [`Config`] to live stores and logging.

use std::sync::Arc;

use keyplex_config::{Config, ConfigError, StorageKind};
use keyplex_storage::{
    Detached, HostContext, LocalStorage, Namespace, Plex, SessionStorage, StaticOrigin,
    StorageBackend,
};
use keyplex_telemetry::{FileRotation, LogConfig, LogFormat, LogTarget};
use tracing::info;

use crate::error::KeyplexResult;

/// File name used for the durable backend when no origin is configured.
const DETACHED_FILE_STEM: &str = "local";

/// Prefix of rolling log file names.
const LOG_FILE_PREFIX: &str = "keyplex";

/// The host context described by `config.origin`.
///
/// # Errors
///
/// Returns [`StorageError::InvalidOrigin`](keyplex_storage::StorageError::InvalidOrigin)
/// if the origin is not a URL.
pub fn host_context(config: &Config) -> KeyplexResult<Box<dyn HostContext>> {
    let host: Box<dyn HostContext> = match &config.origin {
        Some(origin) => Box::new(StaticOrigin::parse(origin)?),
        None => Box::new(Detached),
    };
    Ok(host)
}

/// Resolve the namespace `config` asks for.
///
/// # Errors
///
/// Fails when neither `namespace` nor a usable `origin` is configured.
pub fn resolve_namespace(config: &Config) -> KeyplexResult<Namespace> {
    let host = host_context(config)?;
    Ok(Namespace::resolve(config.namespace.as_deref(), host.as_ref())?)
}

/// Where the durable backend for `config` lives.
///
/// One file per origin, so every namespace under the same origin shares it.
///
/// # Errors
///
/// Fails when the origin is unusable or no data directory can be found.
pub fn local_storage_path(config: &Config) -> KeyplexResult<std::path::PathBuf> {
    let dir = config.storage.resolved_data_dir()?;
    let stem = match host_context(config)?.origin() {
        Some(origin) => Namespace::from_origin(origin)?.to_string(),
        None => DETACHED_FILE_STEM.to_owned(),
    };
    Ok(LocalStorage::origin_file(dir, &stem))
}

/// Open the backend `config` selects.
///
/// Durable backends are shared per origin file: every call for the same
/// file returns the same live instance, so namespaces under one origin never
/// overwrite each other. Session backends are fresh per call; stores that
/// must see each other's session writes share one through [`plex_for`].
///
/// # Errors
///
/// Fails when the durable file cannot be read or no data directory exists.
pub fn open_backend(config: &Config) -> KeyplexResult<Arc<dyn StorageBackend>> {
    let quota = config.storage.quota();
    let backend: Arc<dyn StorageBackend> = match config.storage.kind {
        StorageKind::Local => {
            let path = local_storage_path(config)?;
            LocalStorage::open_shared(path, quota)?
        },
        StorageKind::Session => match quota {
            Some(bytes) => Arc::new(SessionStorage::with_quota(bytes)),
            None => Arc::new(SessionStorage::new()),
        },
    };
    Ok(backend)
}

/// Bind the namespace `config` asks for to an existing backend.
///
/// # Errors
///
/// Fails when the namespace cannot be resolved.
pub fn plex_for(config: &Config, backend: Arc<dyn StorageBackend>) -> KeyplexResult<Plex> {
    let namespace = resolve_namespace(config)?;
    Ok(Plex::new(backend, namespace))
}

/// Open the store `config` describes.
///
/// # Errors
///
/// Fails when the namespace cannot be resolved or the backend cannot be
/// opened.
pub fn open(config: &Config) -> KeyplexResult<Plex> {
    let namespace = resolve_namespace(config)?;
    let backend = open_backend(config)?;
    info!(
        namespace = %namespace,
        kind = ?config.storage.kind,
        "opened keyplex store"
    );
    Ok(Plex::new(backend, namespace))
}

/// Translate the `[logging]` section into a [`LogConfig`].
///
/// # Errors
///
/// Returns [`TelemetryError::UnknownFormat`](keyplex_telemetry::TelemetryError::UnknownFormat)
/// or [`TelemetryError::UnknownRotation`](keyplex_telemetry::TelemetryError::UnknownRotation)
/// for unrecognized names, and [`ConfigError::Invalid`](keyplex_config::ConfigError::Invalid)
/// for an unknown target or a file target without a directory.
pub fn log_config(config: &Config) -> KeyplexResult<LogConfig> {
    let section = &config.logging;
    let format: LogFormat = section.format.parse()?;
    let log = LogConfig::new(section.level.clone())
        .with_format(format)
        .with_directives(section.directives.iter().cloned());

    let log = match section.target.as_str() {
        "stderr" => log.with_target(LogTarget::Stderr),
        "stdout" => log.with_target(LogTarget::Stdout),
        "file" => {
            let dir = section.directory.as_deref().ok_or_else(|| ConfigError::Invalid {
                field: "logging.directory".to_owned(),
                message: "file logging needs a directory".to_owned(),
            })?;
            let rotation: FileRotation = section.rotation.parse()?;
            log.with_file_logging(dir, LOG_FILE_PREFIX, rotation)
        },
        other => {
            return Err(ConfigError::Invalid {
                field: "logging.target".to_owned(),
                message: format!("unsupported log target '{other}'"),
            }
            .into());
        },
    };
    Ok(log)
}

/// Install the global subscriber described by the `[logging]` section.
///
/// # Errors
///
/// Fails on an invalid filter or when a subscriber is already installed.
pub fn init_logging(config: &Config) -> KeyplexResult<()> {
    keyplex_telemetry::setup_logging(&log_config(config)?)?;
    Ok(())
}
