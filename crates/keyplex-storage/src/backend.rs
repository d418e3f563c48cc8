//! Raw string key-value backends.
//!
//! The [`StorageBackend`] trait is the whole contract a [`Plex`](crate::Plex)
//! needs from the host: read, write, remove and enumerate text values by
//! text key. Implementations:
//!
//! - [`SessionStorage`]: in-memory, cleared when the session ends
//! - [`LocalStorage`](crate::LocalStorage): durable, persisted to one file per origin
//!
//! Backends are shared, process-wide state. They lock per call, so callers
//! interleave at whole-operation granularity and nothing more.

use std::collections::BTreeMap;
use std::sync::RwLock;

use crate::error::{StorageError, StorageResult};

// ---------------------------------------------------------------------------
// Trait
// ---------------------------------------------------------------------------

/// Raw key-value backend.
///
/// Keys and values are plain text. The backend knows nothing of namespaces.
pub trait StorageBackend: Send + Sync {
    /// Read the text stored at `key`, or `None` if absent.
    fn get_item(&self, key: &str) -> StorageResult<Option<String>>;

    /// Store `value` at `key`, replacing any previous value.
    fn set_item(&self, key: &str, value: &str) -> StorageResult<()>;

    /// Remove `key`. Removing an absent key is not an error.
    fn remove_item(&self, key: &str) -> StorageResult<()>;

    /// Every key currently present, in backend order.
    fn keys(&self) -> StorageResult<Vec<String>>;

    /// Remove every key in `keys`. Absent keys are skipped.
    ///
    /// Backends that pay per write (such as the durable one) override this
    /// to commit the whole batch at once.
    fn remove_items(&self, keys: &[String]) -> StorageResult<()> {
        for key in keys {
            self.remove_item(key)?;
        }
        Ok(())
    }
}

// ---------------------------------------------------------------------------
// Quota accounting
// ---------------------------------------------------------------------------

/// Bytes an entry occupies against a quota.
pub(crate) fn entry_size(key: &str, value: &str) -> usize {
    key.len().saturating_add(value.len())
}

/// Bytes all entries of `data` occupy.
pub(crate) fn usage(data: &BTreeMap<String, String>) -> usize {
    data.iter()
        .map(|(k, v)| entry_size(k, v))
        .fold(0, usize::saturating_add)
}

/// Refuse a write of `key = value` if it would push `data` past `quota`.
pub(crate) fn check_quota(
    data: &BTreeMap<String, String>,
    key: &str,
    value: &str,
    quota: Option<usize>,
) -> StorageResult<()> {
    let Some(quota) = quota else {
        return Ok(());
    };
    let replaced = data.get(key).map_or(0, |old| entry_size(key, old));
    let needed = usage(data)
        .saturating_sub(replaced)
        .saturating_add(entry_size(key, value));
    if needed > quota {
        return Err(StorageError::QuotaExceeded { needed, quota });
    }
    Ok(())
}

// ---------------------------------------------------------------------------
// Session-scoped implementation
// ---------------------------------------------------------------------------

/// Session-lifetime backend.
///
/// Data lives in memory only and disappears when the session ends, either
/// explicitly through [`end_session`](Self::end_session) or when the last
/// handle is dropped. Keys enumerate in sorted order.
#[derive(Debug, Default)]
pub struct SessionStorage {
    data: RwLock<BTreeMap<String, String>>,
    quota: Option<usize>,
}

impl SessionStorage {
    /// Create an empty session store with no quota.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Create an empty session store that refuses writes beyond `bytes`.
    #[must_use]
    pub fn with_quota(bytes: usize) -> Self {
        Self {
            data: RwLock::default(),
            quota: Some(bytes),
        }
    }

    /// End the session, dropping every entry. Returns how many were dropped.
    ///
    /// # Errors
    ///
    /// Returns [`StorageError::Internal`] if the lock is poisoned.
    pub fn end_session(&self) -> StorageResult<usize> {
        let mut data = self
            .data
            .write()
            .map_err(|e| StorageError::Internal(e.to_string()))?;
        let count = data.len();
        data.clear();
        tracing::debug!(count, "session storage cleared");
        Ok(count)
    }

    /// Number of entries currently held.
    ///
    /// # Errors
    ///
    /// Returns [`StorageError::Internal`] if the lock is poisoned.
    pub fn len(&self) -> StorageResult<usize> {
        let data = self
            .data
            .read()
            .map_err(|e| StorageError::Internal(e.to_string()))?;
        Ok(data.len())
    }

    /// Whether the store holds no entries.
    ///
    /// # Errors
    ///
    /// Returns [`StorageError::Internal`] if the lock is poisoned.
    pub fn is_empty(&self) -> StorageResult<bool> {
        Ok(self.len()? == 0)
    }
}

impl StorageBackend for SessionStorage {
    fn get_item(&self, key: &str) -> StorageResult<Option<String>> {
        let data = self
            .data
            .read()
            .map_err(|e| StorageError::Internal(e.to_string()))?;
        Ok(data.get(key).cloned())
    }

    fn set_item(&self, key: &str, value: &str) -> StorageResult<()> {
        let mut data = self
            .data
            .write()
            .map_err(|e| StorageError::Internal(e.to_string()))?;
        check_quota(&data, key, value, self.quota)?;
        data.insert(key.to_owned(), value.to_owned());
        Ok(())
    }

    fn remove_item(&self, key: &str) -> StorageResult<()> {
        let mut data = self
            .data
            .write()
            .map_err(|e| StorageError::Internal(e.to_string()))?;
        data.remove(key);
        Ok(())
    }

    fn keys(&self) -> StorageResult<Vec<String>> {
        let data = self
            .data
            .read()
            .map_err(|e| StorageError::Internal(e.to_string()))?;
        Ok(data.keys().cloned().collect())
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
