use crate::error::CacheError;
use crate::store::{Store, StoreKey, StoreStats};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::collections::hash_map::DefaultHasher;
use std::fs;
use std::hash::{Hash, Hasher};
use std::io::{ErrorKind, Write};
use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicU64, Ordering};
use std::time::Duration;
use tempfile::NamedTempFile;

/// Current on-disk entry format version.
const ENTRY_VERSION: u32 = 1;

/// Pause between attempts while absorbing transient contention.
const RETRY_DELAY: Duration = Duration::from_millis(1);

const ENTRY_EXTENSION: &str = "entry";

/// Persistent key-value store with one JSON envelope file per entry.
///
/// Entry filenames are derived by hashing the store key, so arbitrary key
/// content stays filesystem-safe. Writes go through a temp file and an
/// atomic rename; a fresh `DiskStore` over an existing directory serves
/// entries written by earlier instances.
pub struct DiskStore {
    dir: PathBuf,
    stats: StoreStatsInner,
}

struct StoreStatsInner {
    hits: AtomicU64,
    misses: AtomicU64,
}

#[derive(Debug, Serialize, Deserialize)]
struct Entry {
    version: u32,
    key: StoreKey,
    created_at: DateTime<Utc>,
    expires_at: Option<DateTime<Utc>>,
    tag: Option<String>,
    value: Value,
}

impl Entry {
    fn is_expired(&self, now: DateTime<Utc>) -> bool {
        self.expires_at.is_some_and(|at| now >= at)
    }
}

impl DiskStore {
    pub fn new(dir: impl Into<PathBuf>) -> Result<Self, CacheError> {
        let dir = dir.into();

        // Create store directory if it doesn't exist
        fs::create_dir_all(&dir)?;

        Ok(Self {
            dir,
            stats: StoreStatsInner {
                hits: AtomicU64::new(0),
                misses: AtomicU64::new(0),
            },
        })
    }

    pub fn dir(&self) -> &Path {
        &self.dir
    }

    fn entry_path(&self, key: &StoreKey) -> PathBuf {
        let mut hasher = DefaultHasher::new();
        key.hash(&mut hasher);
        self.dir
            .join(format!("{:016x}.{}", hasher.finish(), ENTRY_EXTENSION))
    }

    /// Read and validate the envelope for `key`, if present.
    fn read_entry(&self, key: &StoreKey) -> Result<Option<Entry>, CacheError> {
        let path = self.entry_path(key);
        let data = match fs::read(&path) {
            Ok(data) => data,
            Err(e) if e.kind() == ErrorKind::NotFound => return Ok(None),
            Err(e) => return Err(e.into()),
        };

        let entry: Entry = serde_json::from_slice(&data)?;
        if entry.version != ENTRY_VERSION || entry.key != *key {
            // Format drift or a hash collision with another key; either way
            // this file does not answer for `key`.
            return Ok(None);
        }

        Ok(Some(entry))
    }

    fn write_entry(&self, path: &Path, data: &[u8]) -> Result<(), CacheError> {
        let mut tmp = NamedTempFile::new_in(&self.dir)?;
        tmp.write_all(data)?;
        tmp.persist(path).map_err(|e| CacheError::Io(e.error))?;
        Ok(())
    }

    /// Run `op`, absorbing transient contention when `retry` is set.
    fn with_retry<T>(
        &self,
        retry: bool,
        mut op: impl FnMut() -> Result<T, CacheError>,
    ) -> Result<T, CacheError> {
        loop {
            match op() {
                Err(e) if retry && e.is_transient() => {
                    tracing::debug!(error = %e, "transient store contention, retrying");
                    std::thread::sleep(RETRY_DELAY);
                }
                other => return other,
            }
        }
    }

    fn entry_files(&self) -> Result<Vec<PathBuf>, CacheError> {
        let mut paths = Vec::new();
        for entry in fs::read_dir(&self.dir)? {
            let path = entry?.path();
            if path.extension().is_some_and(|ext| ext == ENTRY_EXTENSION) {
                paths.push(path);
            }
        }
        Ok(paths)
    }
}

impl Store for DiskStore {
    fn get(&self, key: &StoreKey, retry: bool) -> Result<Option<Value>, CacheError> {
        let entry = self.with_retry(retry, || self.read_entry(key))?;

        match entry {
            Some(entry) if entry.is_expired(Utc::now()) => {
                if let Err(e) = fs::remove_file(self.entry_path(key)) {
                    if e.kind() != ErrorKind::NotFound {
                        tracing::warn!(key = %key, "failed to remove expired entry: {}", e);
                    }
                }
                self.stats.misses.fetch_add(1, Ordering::Relaxed);
                Ok(None)
            }
            Some(entry) => {
                self.stats.hits.fetch_add(1, Ordering::Relaxed);
                Ok(Some(entry.value))
            }
            None => {
                self.stats.misses.fetch_add(1, Ordering::Relaxed);
                Ok(None)
            }
        }
    }

    fn set(
        &self,
        key: &StoreKey,
        value: Value,
        expire: Option<Duration>,
        tag: Option<&str>,
        retry: bool,
    ) -> Result<(), CacheError> {
        let now = Utc::now();
        // An expiry too far out to represent behaves as "never expires".
        let expires_at = expire
            .and_then(|d| chrono::Duration::from_std(d).ok())
            .map(|d| now + d);

        let entry = Entry {
            version: ENTRY_VERSION,
            key: key.clone(),
            created_at: now,
            expires_at,
            tag: tag.map(str::to_string),
            value,
        };
        let data = serde_json::to_vec(&entry)?;
        let path = self.entry_path(key);

        self.with_retry(retry, || self.write_entry(&path, &data))?;
        tracing::debug!(key = %key, expires = ?entry.expires_at, "stored entry");
        Ok(())
    }

    fn remove(&self, key: &StoreKey) -> Result<bool, CacheError> {
        match fs::remove_file(self.entry_path(key)) {
            Ok(()) => Ok(true),
            Err(e) if e.kind() == ErrorKind::NotFound => Ok(false),
            Err(e) => Err(e.into()),
        }
    }

    fn evict_tag(&self, tag: &str) -> Result<usize, CacheError> {
        let mut removed = 0;
        for path in self.entry_files()? {
            let Ok(data) = fs::read(&path) else { continue };
            let Ok(entry) = serde_json::from_slice::<Entry>(&data) else {
                continue;
            };
            if entry.tag.as_deref() == Some(tag) {
                fs::remove_file(&path)?;
                removed += 1;
            }
        }
        tracing::debug!(tag, removed, "evicted tagged entries");
        Ok(removed)
    }

    fn clear(&self) -> Result<usize, CacheError> {
        let mut removed = 0;
        for path in self.entry_files()? {
            fs::remove_file(&path)?;
            removed += 1;
        }
        Ok(removed)
    }

    fn stats(&self) -> StoreStats {
        StoreStats {
            hits: self.stats.hits.load(Ordering::Relaxed),
            misses: self.stats.misses.load(Ordering::Relaxed),
            entry_count: self.entry_files().map(|files| files.len()).unwrap_or(0),
        }
    }
}
