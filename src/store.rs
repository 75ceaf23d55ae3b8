//! Key-value storage with a time-to-live.
//!
//! Stores only hold entries; whether an entry is still valid is decided by
//! the caller against its own clock. Nothing is ever evicted actively.

use std::collections::HashMap;
use std::path::{Path, PathBuf};
use std::sync::Arc;

use async_trait::async_trait;
use chrono::Utc;
use dashmap::DashMap;
use serde_json::Value;
use tokio::fs;
use tokio::sync::Mutex;
use tracing::{debug, warn};

use crate::error::{Result, ThemeInfoError};
use crate::models::CacheEntry;

#[async_trait]
pub trait TtlStore: Send + Sync {
    async fn get(&self, key: &str) -> Result<Option<CacheEntry>>;

    /// Stores `value` under `key`, replacing whatever was there.
    async fn set(&self, key: &str, value: Value, ttl_seconds: u64) -> Result<()>;
}

/// In-process store. Cheap to clone, clones share the same entries.
#[derive(Debug, Clone, Default)]
pub struct MemoryStore {
    entries: Arc<DashMap<String, CacheEntry>>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Writes a fully-formed entry, `stored_at` included.
    pub fn insert_entry(&self, entry: CacheEntry) {
        self.entries.insert(entry.key.clone(), entry);
    }
}

#[async_trait]
impl TtlStore for MemoryStore {
    async fn get(&self, key: &str) -> Result<Option<CacheEntry>> {
        Ok(self.entries.get(key).map(|e| e.value().clone()))
    }

    async fn set(&self, key: &str, value: Value, ttl_seconds: u64) -> Result<()> {
        self.insert_entry(CacheEntry::new(key, value, Utc::now(), ttl_seconds));
        Ok(())
    }
}

/// Persists all entries as a single JSON object on disk.
///
/// The whole file is read on every lookup and rewritten on every store.
#[derive(Debug)]
pub struct FileStore {
    path: PathBuf,
    write_lock: Mutex<()>,
}

impl FileStore {
    /// Opens (or prepares) the store at `path`, creating parent directories.
    pub async fn open(path: impl Into<PathBuf>) -> Result<Self> {
        let path = path.into();
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent)
                .await
                .map_err(|e| ThemeInfoError::storage(format!("creating {}", parent.display()), e))?;
        }
        Ok(Self {
            path,
            write_lock: Mutex::new(()),
        })
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    async fn load(&self) -> Result<HashMap<String, CacheEntry>> {
        let content = match fs::read_to_string(&self.path).await {
            Ok(content) => content,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => return Ok(HashMap::new()),
            Err(e) => {
                return Err(ThemeInfoError::storage(
                    format!("reading {}", self.path.display()),
                    e,
                ));
            }
        };
        match serde_json::from_str(&content) {
            Ok(entries) => Ok(entries),
            Err(e) => {
                // A corrupt cache file is just a cold cache.
                warn!("Ignoring unreadable cache file {}: {}", self.path.display(), e);
                Ok(HashMap::new())
            }
        }
    }

    async fn save(&self, entries: &HashMap<String, CacheEntry>) -> Result<()> {
        let content = serde_json::to_string(entries).map_err(|e| ThemeInfoError::Storage {
            message: format!("serializing cache entries: {e}"),
            source: None,
        })?;
        let tmp = self.path.with_extension("json.tmp");
        fs::write(&tmp, content)
            .await
            .map_err(|e| ThemeInfoError::storage(format!("writing {}", tmp.display()), e))?;
        fs::rename(&tmp, &self.path)
            .await
            .map_err(|e| ThemeInfoError::storage(format!("replacing {}", self.path.display()), e))
    }
}

#[async_trait]
impl TtlStore for FileStore {
    async fn get(&self, key: &str) -> Result<Option<CacheEntry>> {
        Ok(self.load().await?.remove(key))
    }

    async fn set(&self, key: &str, value: Value, ttl_seconds: u64) -> Result<()> {
        let _guard = self.write_lock.lock().await;
        let mut entries = self.load().await?;
        entries.insert(
            key.to_string(),
            CacheEntry::new(key, value, Utc::now(), ttl_seconds),
        );
        self.save(&entries).await?;
        debug!("Saved {} cache entries to {}", entries.len(), self.path.display());
        Ok(())
    }
}
