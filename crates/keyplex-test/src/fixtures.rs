//! Test fixtures for common types.

use std::sync::Arc;

use keyplex_storage::{LocalStorage, Namespace, Plex, SessionStorage, StorageBackend};
use tempfile::TempDir;

/// The namespace `https://app.example.com` derives to.
pub const TEST_NAMESPACE: &str = "com.example.app";

/// The origin matching [`TEST_NAMESPACE`].
pub const TEST_ORIGIN: &str = "https://app.example.com";

/// Create the test namespace.
///
/// # Panics
///
/// Never in practice; the name is a non-empty constant.
#[must_use]
pub fn test_namespace() -> Namespace {
    named(TEST_NAMESPACE)
}

/// Create a namespace from a non-empty test name.
///
/// # Panics
///
/// Panics if `name` is empty.
#[must_use]
pub fn named(name: &str) -> Namespace {
    Namespace::new(name).expect("test namespace must be non-empty")
}

/// Bind `namespace` to `backend`.
#[must_use]
pub fn plex_over<B: StorageBackend + 'static>(backend: B, namespace: &str) -> Plex {
    let backend: Arc<dyn StorageBackend> = Arc::new(backend);
    Plex::new(backend, named(namespace))
}

/// A session-backed store under [`TEST_NAMESPACE`].
#[must_use]
pub fn session_plex() -> Plex<SessionStorage> {
    Plex::new(Arc::new(SessionStorage::new()), test_namespace())
}

/// A durable backend in a fresh temporary directory.
///
/// Keep the returned `TempDir` alive for as long as the store is used.
///
/// # Panics
///
/// Panics if the temporary directory cannot be created.
#[must_use]
pub fn temp_local_storage() -> (LocalStorage, TempDir) {
    let dir = TempDir::new().expect("Failed to create temp directory");
    let path = LocalStorage::origin_file(dir.path(), TEST_NAMESPACE);
    let store = LocalStorage::open(path).expect("Failed to open local storage");
    (store, dir)
}
