//! The namespaced store.
//!
//! A [`Plex`] pre-binds a [`Namespace`] to a shared [`StorageBackend`] and
//! stores JSON-encoded values at `@{namespace}/{key}`. Callers work with
//! logical keys and typed values and never see the storage path unless they
//! ask for it.
//!
//! Two bindings exist: [`LocalPlex`] over the durable [`LocalStorage`] and
//! [`SessionPlex`] over the session-lifetime [`SessionStorage`]. Both share
//! every line of logic; only the backend differs.
//!
//! # Example
//!
//! ```rust
//! use std::sync::Arc;
//! use keyplex_storage::{Namespace, SessionPlex, SessionStorage};
//!
//! # fn main() -> keyplex_storage::StorageResult<()> {
//! let plex = SessionPlex::new(
//!     Arc::new(SessionStorage::new()),
//!     Namespace::new("com.example.app")?,
//! );
//!
//! plex.set("user/id", &42)?;
//! assert_eq!(plex.get::<u32>("user/id")?, Some(42));
//! assert!(plex.has("user/id")?);
//!
//! plex.del("user/id")?;
//! assert_eq!(plex.get::<u32>("user/id")?, None);
//! # Ok(())
//! # }
//! ```

use std::fmt;
use std::sync::Arc;

use serde::Serialize;
use serde::de::DeserializeOwned;
use tracing::{debug, warn};

use crate::backend::{SessionStorage, StorageBackend};
use crate::error::StorageResult;
use crate::local::LocalStorage;
use crate::namespace::{HostContext, Namespace};
use crate::path;

/// A namespace-scoped view into a [`StorageBackend`].
pub struct Plex<B: ?Sized = dyn StorageBackend> {
    backend: Arc<B>,
    namespace: Namespace,
}

/// A [`Plex`] bound to the durable backend.
pub type LocalPlex = Plex<LocalStorage>;

/// A [`Plex`] bound to the session-lifetime backend.
pub type SessionPlex = Plex<SessionStorage>;

impl<B: ?Sized> Clone for Plex<B> {
    fn clone(&self) -> Self {
        Self {
            backend: Arc::clone(&self.backend),
            namespace: self.namespace.clone(),
        }
    }
}

impl<B: ?Sized> fmt::Debug for Plex<B> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Plex")
            .field("namespace", &self.namespace)
            .finish_non_exhaustive()
    }
}

impl<B: StorageBackend + 'static> Plex<B> {
    /// Erase the backend type so different bindings can share one slot.
    #[must_use]
    pub fn into_dyn(self) -> Plex {
        Plex {
            backend: self.backend,
            namespace: self.namespace,
        }
    }
}

impl<B: StorageBackend + ?Sized> Plex<B> {
    /// Bind `namespace` to `backend`.
    #[must_use]
    pub fn new(backend: Arc<B>, namespace: Namespace) -> Self {
        Self { backend, namespace }
    }

    /// Bind to `backend`, using `explicit` as the namespace if given and
    /// deriving it from the origin of `host` otherwise.
    ///
    /// # Errors
    ///
    /// Returns [`StorageError::MissingHostContext`](crate::StorageError::MissingHostContext)
    /// if no namespace is given and `host` has no origin hostname.
    pub fn from_host(
        backend: Arc<B>,
        explicit: Option<&str>,
        host: &dyn HostContext,
    ) -> StorageResult<Self> {
        let namespace = Namespace::resolve(explicit, host)?;
        Ok(Self::new(backend, namespace))
    }

    /// The namespace this store is scoped to.
    #[must_use]
    pub fn namespace(&self) -> &Namespace {
        &self.namespace
    }

    /// The shared backend.
    #[must_use]
    pub fn backend(&self) -> &Arc<B> {
        &self.backend
    }

    /// The storage path `key` resolves to.
    #[must_use]
    pub fn path(&self, key: &str) -> String {
        path::storage_path(self.namespace.as_str(), key)
    }

    // -- Raw text --

    /// Read the raw text stored under `key`.
    ///
    /// # Errors
    ///
    /// Propagates backend failures.
    pub fn get_raw(&self, key: &str) -> StorageResult<Option<String>> {
        self.backend.get_item(&self.path(key))
    }

    /// Store raw text under `key`, bypassing JSON encoding.
    ///
    /// # Errors
    ///
    /// Propagates backend failures such as an exceeded quota.
    pub fn set_raw(&self, key: &str, text: &str) -> StorageResult<()> {
        self.backend.set_item(&self.path(key), text)
    }

    // -- Typed values --

    /// Read and decode the value stored under `key`.
    ///
    /// Returns `None` when nothing (or empty text) is stored, and also when
    /// the stored JSON is `null`.
    ///
    /// # Errors
    ///
    /// Returns [`StorageError::Serialization`](crate::StorageError::Serialization)
    /// if the stored text is not valid JSON for `T`.
    pub fn get<T: DeserializeOwned>(&self, key: &str) -> StorageResult<Option<T>> {
        let Some(text) = self.get_raw(key)?.filter(|t| !t.is_empty()) else {
            debug!(namespace = %self.namespace, key, "plex get: absent");
            return Ok(None);
        };
        Ok(serde_json::from_str::<Option<T>>(&text)?)
    }

    /// Read and decode the value under `key`, or return `default` when no
    /// text (or empty text) is stored.
    ///
    /// Unlike [`get`](Self::get), present text always decodes as `T`: a
    /// stored `null` comes back as whatever `T` makes of `null`, not as the
    /// default.
    ///
    /// # Errors
    ///
    /// Returns [`StorageError::Serialization`](crate::StorageError::Serialization)
    /// if the stored text is not valid JSON for `T`.
    pub fn get_or<T: DeserializeOwned>(&self, key: &str, default: T) -> StorageResult<T> {
        match self.get_raw(key)?.filter(|t| !t.is_empty()) {
            Some(text) => Ok(serde_json::from_str(&text)?),
            None => Ok(default),
        }
    }

    /// Encode `value` as JSON and store it under `key`, overwriting.
    ///
    /// # Errors
    ///
    /// Returns [`StorageError::Serialization`](crate::StorageError::Serialization)
    /// if `value` cannot be encoded, and propagates backend failures.
    pub fn set<T: Serialize + ?Sized>(&self, key: &str, value: &T) -> StorageResult<()> {
        let text = serde_json::to_string(value)?;
        debug!(namespace = %self.namespace, key, bytes = text.len(), "plex set");
        self.set_raw(key, &text)
    }

    /// Whether [`get`](Self::get) would return a value.
    ///
    /// A stored JSON `null` reports `false`, the same as an absent key.
    ///
    /// # Errors
    ///
    /// Same as [`get`](Self::get).
    pub fn has(&self, key: &str) -> StorageResult<bool> {
        Ok(self.get::<serde_json::Value>(key)?.is_some())
    }

    /// Delete `key`, returning how many storage paths were removed.
    ///
    /// A key ending in `%` deletes by prefix: every backend key whose text
    /// starts with the storage path minus the `%` is removed. The match runs
    /// over [`keys`](Self::keys), so a foreign namespace whose paths share
    /// that literal prefix is hit too. Deleting nothing is not an error.
    ///
    /// # Errors
    ///
    /// Propagates backend failures.
    pub fn del(&self, key: &str) -> StorageResult<usize> {
        let target = self.path(key);

        let Some(prefix) = path::wildcard_prefix(&target) else {
            let existed = self.backend.get_item(&target)?.is_some();
            self.backend.remove_item(&target)?;
            debug!(namespace = %self.namespace, key, existed, "plex del");
            return Ok(usize::from(existed));
        };

        let own = path::namespace_prefix(self.namespace.as_str());
        let doomed: Vec<String> = self
            .keys()?
            .into_iter()
            .filter(|raw| raw.starts_with(prefix))
            .collect();
        for raw in doomed.iter().filter(|raw| !raw.starts_with(&own)) {
            warn!(
                namespace = %self.namespace,
                path = %raw,
                "wildcard delete removed a path outside the namespace"
            );
        }
        self.backend.remove_items(&doomed)?;
        debug!(namespace = %self.namespace, prefix, removed = doomed.len(), "plex wildcard del");
        Ok(doomed.len())
    }

    /// Every raw key in the backend, across all namespaces.
    ///
    /// # Errors
    ///
    /// Propagates backend failures.
    pub fn keys(&self) -> StorageResult<Vec<String>> {
        self.backend.keys()
    }

    // -- Namespace-exact helpers --

    /// Logical keys stored under this namespace only.
    ///
    /// # Errors
    ///
    /// Propagates backend failures.
    pub fn list_keys(&self) -> StorageResult<Vec<String>> {
        let ns = self.namespace.as_str();
        Ok(self
            .keys()?
            .iter()
            .filter_map(|raw| path::logical_key(ns, raw).map(String::from))
            .collect())
    }

    /// Remove every key under this namespace and no other.
    ///
    /// # Errors
    ///
    /// Propagates backend failures.
    pub fn clear(&self) -> StorageResult<usize> {
        let own = path::namespace_prefix(self.namespace.as_str());
        let doomed: Vec<String> = self
            .keys()?
            .into_iter()
            .filter(|raw| raw.starts_with(&own))
            .collect();
        self.backend.remove_items(&doomed)?;
        debug!(namespace = %self.namespace, removed = doomed.len(), "plex cleared");
        Ok(doomed.len())
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
