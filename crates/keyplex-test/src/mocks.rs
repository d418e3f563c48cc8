//! Mock backends for testing.

use std::sync::{Arc, Mutex};

use keyplex_storage::{SessionStorage, StorageBackend, StorageError, StorageResult};

/// One call made against a [`RecordingBackend`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum BackendCall {
    /// `get_item(key)`.
    Get(String),
    /// `set_item(key, value)`.
    Set(String, String),
    /// `remove_item(key)`.
    Remove(String),
    /// `keys()`.
    Keys,
}

/// Backend that stores like [`SessionStorage`] and logs every call.
///
/// Clones share the same data and call log.
#[derive(Debug, Clone, Default)]
pub struct RecordingBackend {
    inner: Arc<SessionStorage>,
    calls: Arc<Mutex<Vec<BackendCall>>>,
}

impl RecordingBackend {
    /// Create an empty recording backend.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Every call so far, oldest first.
    #[must_use]
    pub fn calls(&self) -> Vec<BackendCall> {
        self.calls.lock().map(|c| c.clone()).unwrap_or_default()
    }

    /// Forget recorded calls, keeping the data.
    pub fn clear_calls(&self) {
        if let Ok(mut guard) = self.calls.lock() {
            guard.clear();
        }
    }

    /// Keys removed so far, in order.
    #[must_use]
    pub fn removed(&self) -> Vec<String> {
        self.calls()
            .into_iter()
            .filter_map(|c| match c {
                BackendCall::Remove(k) => Some(k),
                _ => None,
            })
            .collect()
    }

    fn record(&self, call: BackendCall) {
        if let Ok(mut guard) = self.calls.lock() {
            guard.push(call);
        }
    }
}

impl StorageBackend for RecordingBackend {
    fn get_item(&self, key: &str) -> StorageResult<Option<String>> {
        self.record(BackendCall::Get(key.to_owned()));
        self.inner.get_item(key)
    }

    fn set_item(&self, key: &str, value: &str) -> StorageResult<()> {
        self.record(BackendCall::Set(key.to_owned(), value.to_owned()));
        self.inner.set_item(key, value)
    }

    fn remove_item(&self, key: &str) -> StorageResult<()> {
        self.record(BackendCall::Remove(key.to_owned()));
        self.inner.remove_item(key)
    }

    fn keys(&self) -> StorageResult<Vec<String>> {
        self.record(BackendCall::Keys);
        self.inner.keys()
    }
}

/// Backend whose writes always fail with a quota error.
///
/// Reads see whatever was seeded through [`with_entry`](Self::with_entry).
#[derive(Debug, Default)]
pub struct FailingBackend {
    inner: SessionStorage,
}

impl FailingBackend {
    /// Create an empty failing backend.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Seed an entry, bypassing the failing write path.
    ///
    /// # Panics
    ///
    /// Panics if the seed store is poisoned.
    #[must_use]
    pub fn with_entry(self, key: &str, value: &str) -> Self {
        self.inner
            .set_item(key, value)
            .expect("seeding an unbounded session store");
        self
    }
}

impl StorageBackend for FailingBackend {
    fn get_item(&self, key: &str) -> StorageResult<Option<String>> {
        self.inner.get_item(key)
    }

    fn set_item(&self, _key: &str, _value: &str) -> StorageResult<()> {
        Err(StorageError::QuotaExceeded {
            needed: 1,
            quota: 0,
        })
    }

    fn remove_item(&self, key: &str) -> StorageResult<()> {
        self.inner.remove_item(key)
    }

    fn keys(&self) -> StorageResult<Vec<String>> {
        self.inner.keys()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_recording_backend_logs_calls() {
        let backend = RecordingBackend::new();
        backend.set_item("k", "v").unwrap();
        let _ = backend.get_item("k").unwrap();
        backend.remove_item("k").unwrap();
        let _ = backend.keys().unwrap();

        assert_eq!(
            backend.calls(),
            vec![
                BackendCall::Set("k".into(), "v".into()),
                BackendCall::Get("k".into()),
                BackendCall::Remove("k".into()),
                BackendCall::Keys,
            ]
        );
        assert_eq!(backend.removed(), vec!["k"]);
    }

    #[test]
    fn test_recording_backend_clones_share_state() {
        let a = RecordingBackend::new();
        let b = a.clone();
        a.set_item("k", "v").unwrap();
        assert_eq!(b.get_item("k").unwrap().as_deref(), Some("v"));
        assert_eq!(b.calls().len(), 2);
        b.clear_calls();
        assert!(a.calls().is_empty());
    }

    #[test]
    fn test_failing_backend_refuses_writes() {
        let backend = FailingBackend::new().with_entry("seeded", "1");
        assert!(matches!(
            backend.set_item("k", "v"),
            Err(StorageError::QuotaExceeded { .. })
        ));
        assert_eq!(backend.get_item("seeded").unwrap().as_deref(), Some("1"));
    }
}
