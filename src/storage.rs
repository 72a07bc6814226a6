//! The persistent key/value store that backs the record store and the theme preference.
//!
//! Values are plain strings addressed by string keys. `FileStorage` keeps every key in a single
//! JSON object on disk. `MemoryStorage` keeps them in memory and is used by tests and by callers
//! that do not want anything written to disk.

use crate::{utils, Result};
use anyhow::{bail, Context};
use std::collections::BTreeMap;
use std::path::{Path, PathBuf};
use std::sync::{Arc, Mutex};
use tracing::{trace, warn};

/// Holds the serialized `WorkEntry` sequence as a JSON array.
pub const WORK_DATA: &str = "workData";

/// Holds the version tag of the data stored under `WORK_DATA`.
pub const DATA_VERSION: &str = "dataVersion";

/// Holds the theme preference, `light` or `dark`.
pub const THEME: &str = "theme";

/// A string-keyed, string-valued persistent store.
#[async_trait::async_trait]
pub trait Storage: Send + Sync {
    /// Returns the value stored under `key`, or `None` if nothing has been stored.
    async fn get(&self, key: &str) -> Result<Option<String>>;

    /// Stores `value` under `key`, replacing any previous value.
    async fn set(&self, key: &str, value: &str) -> Result<()>;
}

/// A handle to a `Storage` that can be shared by every component that persists something.
pub type SharedStorage = Arc<dyn Storage>;

/// Stores all keys in one JSON object file. A missing file reads as an empty store.
#[derive(Debug, Clone)]
pub struct FileStorage {
    path: PathBuf,
}

impl FileStorage {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    fn tmp_path(&self) -> PathBuf {
        let mut name = self
            .path
            .file_name()
            .map(|n| n.to_os_string())
            .unwrap_or_default();
        name.push(".tmp");
        self.path.with_file_name(name)
    }

    async fn load_map(&self) -> Result<BTreeMap<String, String>> {
        if !self.path.is_file() {
            return Ok(BTreeMap::new());
        }
        let content = utils::read(&self.path).await?;
        if content.trim().is_empty() {
            return Ok(BTreeMap::new());
        }
        serde_json::from_str(&content)
            .with_context(|| format!("Failed to parse storage file at {}", self.path.display()))
    }
}

#[async_trait::async_trait]
impl Storage for FileStorage {
    async fn get(&self, key: &str) -> Result<Option<String>> {
        trace!("get {key} from {}", self.path.display());
        Ok(self.load_map().await?.remove(key))
    }

    /// An unreadable storage file is replaced rather than left in place, so a damaged file does
    /// not block every later write. The file is written to a sibling and renamed into place.
    async fn set(&self, key: &str, value: &str) -> Result<()> {
        trace!("set {key} in {}", self.path.display());
        let mut map = match self.load_map().await {
            Ok(map) => map,
            Err(e) => {
                warn!("Discarding the unreadable storage file: {e:#}");
                BTreeMap::new()
            }
        };
        map.insert(key.to_string(), value.to_string());
        let data = serde_json::to_string_pretty(&map).context("Unable to serialize storage")?;
        let tmp = self.tmp_path();
        utils::write(&tmp, data)
            .await
            .with_context(|| format!("Unable to write key '{key}'"))?;
        utils::rename(&tmp, &self.path).await
    }
}

/// Keeps all keys in memory. Writes can be made to fail to exercise persistence error handling.
#[derive(Debug, Default, Clone)]
pub struct MemoryStorage {
    data: Arc<Mutex<BTreeMap<String, String>>>,
    fail_writes: bool,
}

impl MemoryStorage {
    pub fn new() -> Self {
        Self::default()
    }

    /// A store whose every `set` fails.
    pub fn failing_writes() -> Self {
        Self {
            data: Arc::default(),
            fail_writes: true,
        }
    }

    /// Returns a copy of everything stored.
    pub fn snapshot(&self) -> BTreeMap<String, String> {
        match self.data.lock() {
            Ok(guard) => guard.clone(),
            Err(poisoned) => poisoned.into_inner().clone(),
        }
    }
}

#[async_trait::async_trait]
impl Storage for MemoryStorage {
    async fn get(&self, key: &str) -> Result<Option<String>> {
        let guard = self
            .data
            .lock()
            .map_err(|_| anyhow::anyhow!("Memory storage lock is poisoned"))?;
        Ok(guard.get(key).cloned())
    }

    async fn set(&self, key: &str, value: &str) -> Result<()> {
        if self.fail_writes {
            bail!("Memory storage is configured to reject writes (key '{key}')");
        }
        let mut guard = self
            .data
            .lock()
            .map_err(|_| anyhow::anyhow!("Memory storage lock is poisoned"))?;
        guard.insert(key.to_string(), value.to_string());
        Ok(())
    }
}
