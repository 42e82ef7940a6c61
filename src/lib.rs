//! # yazr
//!
//! **Memoization over persistent disk caches, organized as a node tree**
//!
//! yazr wraps callables so repeated invocations with identical arguments
//! reuse a previously stored result instead of recomputing, and arranges
//! cache ownership as a tree: each node either owns a persistent store or
//! inherits one from its nearest owning ancestor. Any node in the tree can
//! serve as the cache context for a memoized call.
//!
//! ## Core pieces
//!
//! - **[`Memoized`]**: wraps a callable; each call derives a deterministic
//!   [`CacheKey`] from the call arguments and performs get-or-compute-and-set
//!   against the resolved store
//! - **[`Node`]**: tree entity; roots own a [`DiskStore`], children resolve
//!   their cache by walking the ownership chain upward
//! - **[`DiskStore`]**: persistent key-value store, one JSON envelope file
//!   per entry, with expiry, tags, and transparent retry on transient
//!   contention
//!
//! ## Quick start
//!
//! ```
//! use yazr::{memoize, CallArgs, MemoConfig, Node};
//!
//! # fn main() -> Result<(), yazr::CacheError> {
//! let dir = tempfile::tempdir().unwrap();
//! let root = Node::root_at("climate", dir.path().join("cache"))?;
//! let run = Node::child(&root, "run-01")?;
//!
//! // Wrap the computation once; the node passed at call time supplies
//! // the cache.
//! let triangular = memoize(MemoConfig::new().tag("sums"), |_: &Node, args: &CallArgs| {
//!     let n = args.at(0).and_then(|v| v.as_int()).unwrap_or(0);
//!     (0..=n).sum::<i64>()
//! })?;
//!
//! let args = CallArgs::new().arg(100);
//! assert_eq!(triangular.call::<i64>(&run, &args)?, 5050);
//! // Repeated calls with the same arguments hit the cache.
//! assert_eq!(triangular.call::<i64>(&run, &args)?, 5050);
//!
//! // Keys can be derived without a lookup, for inspection or invalidation.
//! let key = triangular.cache_key(&args);
//! assert!(run.store()?.get(&key.store_key(), true)?.is_some());
//! # Ok(())
//! # }
//! ```
//!
//! ## Key derivation
//!
//! A key is the ordered tuple of base identifier (explicit or derived from
//! the callable), positional arguments, order-normalized keyword arguments,
//! and optional per-argument type tags. `typed` caches `f(3)` and `f(3.0)`
//! separately; [`Ignore`] excludes named or positional arguments from the
//! key entirely. `expire` of zero disables writes while lookups still occur.

pub mod error;
pub mod key;
pub mod memo;
pub mod node;
pub mod store;

// Re-export commonly used types
pub use error::CacheError;
pub use key::{ArgValue, CacheKey, CallArgs, Ignore};
pub use memo::{memoize, MemoConfig, Memoized};
pub use node::Node;
pub use store::disk::DiskStore;
pub use store::{Store, StoreKey, StoreStats};
