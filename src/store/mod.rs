use crate::error::CacheError;
use serde_json::Value;
use std::time::Duration;

pub type StoreKey = String;

/// Persistent key-value store servicing memoized lookups.
///
/// A miss is reported as `Ok(None)`, a sentinel distinct from every stored
/// value (a memoized `Option::None` round-trips as `Ok(Some(Value::Null))`).
/// When `retry` is set, operations that fail with transient contention are
/// retried transparently until the store resolves the conflict; only
/// non-transient failures surface to the caller.
pub trait Store: Send + Sync + 'static {
    /// Look up a value by key.
    fn get(&self, key: &StoreKey, retry: bool) -> Result<Option<Value>, CacheError>;

    /// Store a value under `key`, expiring after `expire` if given and
    /// labelled with `tag` for later bulk eviction.
    fn set(
        &self,
        key: &StoreKey,
        value: Value,
        expire: Option<Duration>,
        tag: Option<&str>,
        retry: bool,
    ) -> Result<(), CacheError>;

    /// Remove a single entry. Returns whether an entry existed.
    fn remove(&self, key: &StoreKey) -> Result<bool, CacheError>;

    /// Remove every entry labelled with `tag`. Returns the number removed.
    fn evict_tag(&self, tag: &str) -> Result<usize, CacheError>;

    /// Remove all entries. Returns the number removed.
    fn clear(&self) -> Result<usize, CacheError>;

    /// Get store statistics.
    fn stats(&self) -> StoreStats;
}

#[derive(Debug, Clone)]
pub struct StoreStats {
    pub hits: u64,
    pub misses: u64,
    pub entry_count: usize,
}

pub mod disk;
