//! Durable, origin-scoped backend persisted to a JSON file.
//!
//! The whole map is held in memory and written back on every mutation:
//! serialized to a temporary file next to the target, then renamed over it,
//! so a crash mid-write leaves the previous file intact.
//!
//! Each instance owns a private copy of the file, so two instances over the
//! same file overwrite each other. [`LocalStorage::open_shared`] hands out
//! one live instance per file for the whole process.

use std::collections::{BTreeMap, HashMap};
use std::io::Write as _;
use std::path::{Path, PathBuf};
use std::sync::{Arc, Mutex, OnceLock, RwLock, Weak};

use tracing::{debug, info};

use crate::backend::{StorageBackend, check_quota};
use crate::error::{StorageError, StorageResult};

/// Default byte quota, the limit most browsers apply per origin.
///
/// Mirrored by `keyplex_config::DEFAULT_QUOTA_BYTES`; keep them equal.
pub const DEFAULT_QUOTA_BYTES: usize = 5_242_880;

type LiveStores = Mutex<HashMap<PathBuf, Weak<LocalStorage>>>;

/// Instances handed out by [`LocalStorage::open_shared`], by absolute path.
fn live_stores() -> &'static LiveStores {
    static LIVE: OnceLock<LiveStores> = OnceLock::new();
    LIVE.get_or_init(|| Mutex::new(HashMap::new()))
}

/// Durable backend that survives process restarts.
///
/// # Example
///
/// ```rust,no_run
/// use keyplex_storage::{LocalStorage, StorageBackend};
///
/// # fn main() -> keyplex_storage::StorageResult<()> {
/// let path = LocalStorage::origin_file("/var/lib/keyplex", "com.example.app");
/// let store = LocalStorage::open(path)?;
/// store.set_item("@com.example.app/theme", "\"dark\"")?;
/// # Ok(())
/// # }
/// ```
#[derive(Debug)]
pub struct LocalStorage {
    path: PathBuf,
    data: RwLock<BTreeMap<String, String>>,
    quota: Option<usize>,
}

impl LocalStorage {
    /// Open (or create) the store at `path` with the default quota.
    ///
    /// # Errors
    ///
    /// Returns [`StorageError::Io`] if the file exists but cannot be read, or
    /// [`StorageError::Serialization`] if its contents are not a JSON object
    /// of strings.
    pub fn open(path: impl AsRef<Path>) -> StorageResult<Self> {
        Self::open_with_quota(path, Some(DEFAULT_QUOTA_BYTES))
    }

    /// Open (or create) the store at `path`. `None` disables the quota.
    ///
    /// # Errors
    ///
    /// Same as [`open`](Self::open).
    pub fn open_with_quota(path: impl AsRef<Path>, quota: Option<usize>) -> StorageResult<Self> {
        let path = path.as_ref().to_path_buf();
        let data = load(&path)?;
        info!(path = %path.display(), entries = data.len(), "opened local storage");
        Ok(Self {
            path,
            data: RwLock::new(data),
            quota,
        })
    }

    /// Open the store at `path`, reusing the live instance if this process
    /// already has one for the same file.
    ///
    /// `quota` applies only when a new instance is opened; a live instance
    /// keeps the quota it was opened with.
    ///
    /// # Errors
    ///
    /// Same as [`open`](Self::open), plus [`StorageError::Internal`] if the
    /// registry lock is poisoned.
    pub fn open_shared(path: impl AsRef<Path>, quota: Option<usize>) -> StorageResult<Arc<Self>> {
        let path = std::path::absolute(path.as_ref())?;
        let mut live = live_stores()
            .lock()
            .map_err(|e| StorageError::Internal(e.to_string()))?;

        if let Some(store) = live.get(&path).and_then(Weak::upgrade) {
            debug!(path = %path.display(), "reusing live local storage");
            return Ok(store);
        }

        live.retain(|_, store| store.strong_count() > 0);
        let store = Arc::new(Self::open_with_quota(&path, quota)?);
        live.insert(path, Arc::downgrade(&store));
        Ok(store)
    }

    /// The file named `{stem}.json` under `dir`.
    #[must_use]
    pub fn origin_file(dir: impl AsRef<Path>, stem: &str) -> PathBuf {
        dir.as_ref().join(format!("{stem}.json"))
    }

    /// Path of the backing file.
    #[must_use]
    pub fn path(&self) -> &Path {
        &self.path
    }

    fn persist(&self, data: &BTreeMap<String, String>) -> StorageResult<()> {
        let dir = match self.path.parent() {
            Some(p) if !p.as_os_str().is_empty() => p,
            _ => Path::new("."),
        };
        std::fs::create_dir_all(dir)?;

        let encoded = serde_json::to_vec(data)?;
        let mut tmp = tempfile::NamedTempFile::new_in(dir)?;
        tmp.write_all(&encoded)?;
        tmp.as_file().sync_all()?;
        tmp.persist(&self.path)
            .map_err(|e| StorageError::Io(e.error.to_string()))?;
        debug!(path = %self.path.display(), bytes = encoded.len(), "persisted local storage");
        Ok(())
    }
}

fn load(path: &Path) -> StorageResult<BTreeMap<String, String>> {
    let content = match std::fs::read_to_string(path) {
        Ok(c) => c,
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => return Ok(BTreeMap::new()),
        Err(e) => return Err(e.into()),
    };
    if content.trim().is_empty() {
        return Ok(BTreeMap::new());
    }
    Ok(serde_json::from_str(&content)?)
}

impl StorageBackend for LocalStorage {
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

        let previous = data.insert(key.to_owned(), value.to_owned());
        if let Err(e) = self.persist(&data) {
            // Keep memory in step with what is on disk.
            match previous {
                Some(old) => data.insert(key.to_owned(), old),
                None => data.remove(key),
            };
            return Err(e);
        }
        Ok(())
    }

    fn remove_item(&self, key: &str) -> StorageResult<()> {
        let mut data = self
            .data
            .write()
            .map_err(|e| StorageError::Internal(e.to_string()))?;
        let Some(old) = data.remove(key) else {
            return Ok(());
        };
        if let Err(e) = self.persist(&data) {
            data.insert(key.to_owned(), old);
            return Err(e);
        }
        Ok(())
    }

    fn keys(&self) -> StorageResult<Vec<String>> {
        let data = self
            .data
            .read()
            .map_err(|e| StorageError::Internal(e.to_string()))?;
        Ok(data.keys().cloned().collect())
    }

    fn remove_items(&self, keys: &[String]) -> StorageResult<()> {
        let mut data = self
            .data
            .write()
            .map_err(|e| StorageError::Internal(e.to_string()))?;
        let removed: Vec<(String, String)> = keys
            .iter()
            .filter_map(|key| data.remove_entry(key.as_str()))
            .collect();
        if removed.is_empty() {
            return Ok(());
        }
        if let Err(e) = self.persist(&data) {
            data.extend(removed);
            return Err(e);
        }
        Ok(())
    }
}
