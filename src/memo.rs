use crate::error::CacheError;
use crate::key::{CacheKey, CallArgs, Ignore};
use crate::node::Node;
use serde::de::DeserializeOwned;
use serde::Serialize;
use std::time::Duration;

/// Per-callable memoization settings, immutable once applied.
#[derive(Debug, Clone, Default)]
pub struct MemoConfig {
    name: Option<String>,
    typed: bool,
    expire: Option<Duration>,
    tag: Option<String>,
    ignore: Ignore,
}

impl MemoConfig {
    pub fn new() -> Self {
        Self::default()
    }

    /// Explicit base identifier for derived keys. Without one, the fully
    /// qualified type name of the wrapped callable is used.
    pub fn name(mut self, name: impl Into<String>) -> Self {
        self.name = Some(name.into());
        self
    }

    /// Cache arguments of different types separately, so `f(3)` and
    /// `f(3.0)` become distinct calls with distinct results.
    pub fn typed(mut self, typed: bool) -> Self {
        self.typed = typed;
        self
    }

    /// Seconds until stored results expire. Unset means results never
    /// expire; `Duration::ZERO` means results are computed but never
    /// stored, while cache lookups still occur.
    pub fn expire(mut self, expire: Duration) -> Self {
        self.expire = Some(expire);
        self
    }

    /// Label attached to stored entries for later bulk eviction.
    pub fn tag(mut self, tag: impl Into<String>) -> Self {
        self.tag = Some(tag.into());
        self
    }

    /// Arguments excluded from key derivation.
    pub fn ignore(mut self, ignore: Ignore) -> Self {
        self.ignore = ignore;
        self
    }

    fn validate(&self) -> Result<(), CacheError> {
        if let Some(name) = &self.name {
            if name.is_empty() {
                return Err(CacheError::Config(
                    "name must be a non-empty string".to_string(),
                ));
            }
        }
        Ok(())
    }

    fn writes_enabled(&self) -> bool {
        match self.expire {
            None => true,
            Some(expire) => !expire.is_zero(),
        }
    }
}

/// Memoizing wrapper around a callable.
///
/// Each call resolves the cache servicing the node it is invoked on, looks
/// up a key derived from the call arguments, and only invokes the wrapped
/// function on a miss. Repeated calls with the same arguments reuse the
/// stored result.
pub struct Memoized<F> {
    base: String,
    config: MemoConfig,
    func: F,
}

/// Wrap `func` with memoization under `config`.
///
/// Fails fast on an invalid configuration, before any call occurs.
pub fn memoize<F>(config: MemoConfig, func: F) -> Result<Memoized<F>, CacheError> {
    Memoized::new(config, func)
}

impl<F> Memoized<F> {
    pub fn new(config: MemoConfig, func: F) -> Result<Self, CacheError> {
        config.validate()?;
        let base = match &config.name {
            Some(name) => name.clone(),
            None => std::any::type_name::<F>().to_string(),
        };
        Ok(Self { base, config, func })
    }

    /// The wrapped callable, for introspection or for bypassing the cache.
    pub fn inner(&self) -> &F {
        &self.func
    }

    /// Derive the cache key for `args` without any lookup side effects.
    /// Useful for inspection and for key-based invalidation.
    pub fn cache_key(&self, args: &CallArgs) -> CacheKey {
        CacheKey::derive(&self.base, args, self.config.typed, &self.config.ignore)
    }

    /// Invoke with memoization against the cache resolved from `node`.
    ///
    /// Lookups and writes retry transparently on transient store contention;
    /// non-transient store failures propagate unmodified.
    pub fn call<T>(&self, node: &Node, args: &CallArgs) -> Result<T, CacheError>
    where
        F: Fn(&Node, &CallArgs) -> T,
        T: Serialize + DeserializeOwned,
    {
        let key = self.cache_key(args);
        let store = node.store()?;
        let store_key = key.store_key();

        if let Some(value) = store.get(&store_key, true)? {
            tracing::trace!(key = %key, "memoized hit");
            return Ok(serde_json::from_value(value)?);
        }
        tracing::trace!(key = %key, "memoized miss");

        let result = (self.func)(node, args);
        if self.config.writes_enabled() {
            let value = serde_json::to_value(&result)?;
            store.set(
                &store_key,
                value,
                self.config.expire,
                self.config.tag.as_deref(),
                true,
            )?;
        }
        Ok(result)
    }
}
