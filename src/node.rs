use crate::error::CacheError;
use crate::store::disk::DiskStore;
use crate::store::Store;
use std::fmt;
use std::path::{Path, PathBuf};
use std::sync::{Arc, PoisonError, RwLock, Weak};

/// Separator used when rendering a node's position in the tree.
const PATH_SEPARATOR: char = '/';

/// A tree node that either owns a persistent store or inherits one from its
/// nearest ancestor that owns one.
///
/// Parents own their children; children keep a non-owning back-reference to
/// their parent. Store ownership is decided once at construction: a node
/// built without a parent creates its own [`DiskStore`], a node built with a
/// parent always delegates upward.
pub struct Node {
    name: String,
    parent: Weak<Node>,
    children: RwLock<Vec<Arc<Node>>>,
    store: Option<Arc<dyn Store>>,
    cache_dir: Option<PathBuf>,
}

impl Node {
    /// Create a root node owning a store at the default location,
    /// `<temp-dir>/yazr_<name>.cache`.
    pub fn root(name: &str) -> Result<Arc<Self>, CacheError> {
        Self::build(name, None, None)
    }

    /// Create a root node owning a store at `cache_dir`.
    pub fn root_at(name: &str, cache_dir: impl Into<PathBuf>) -> Result<Arc<Self>, CacheError> {
        Self::build(name, None, Some(cache_dir.into()))
    }

    /// Create a child of `parent`. Children never own a store; cache access
    /// delegates to the nearest owning ancestor.
    pub fn child(parent: &Arc<Node>, name: &str) -> Result<Arc<Self>, CacheError> {
        Self::build(name, Some(parent), None)
    }

    fn build(
        name: &str,
        parent: Option<&Arc<Node>>,
        cache_dir: Option<PathBuf>,
    ) -> Result<Arc<Self>, CacheError> {
        validate_name(name)?;

        let (store, cache_dir) = match parent {
            None => {
                let dir = cache_dir.unwrap_or_else(|| default_cache_dir(name));
                let store: Arc<dyn Store> = Arc::new(DiskStore::new(&dir)?);
                (Some(store), Some(dir))
            }
            Some(_) => (None, None),
        };

        let node = Arc::new(Self {
            name: name.to_string(),
            parent: parent.map_or_else(Weak::new, Arc::downgrade),
            children: RwLock::new(Vec::new()),
            store,
            cache_dir,
        });

        if let Some(parent) = parent {
            parent
                .children
                .write()
                .unwrap_or_else(PoisonError::into_inner)
                .push(Arc::clone(&node));
        }

        Ok(node)
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn parent(&self) -> Option<Arc<Node>> {
        self.parent.upgrade()
    }

    pub fn children(&self) -> Vec<Arc<Node>> {
        self.children
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
    }

    /// The store this node owns, if any. Absence means cache access
    /// delegates to an ancestor.
    pub fn owned_store(&self) -> Option<&Arc<dyn Store>> {
        self.store.as_ref()
    }

    /// Location of this node's owned store, for roots.
    pub fn cache_dir(&self) -> Option<&Path> {
        self.cache_dir.as_deref()
    }

    /// Resolve the store servicing this node by walking the ownership chain
    /// upward. Fails only for a malformed tree where neither this node nor
    /// any reachable ancestor owns a store.
    pub fn store(&self) -> Result<Arc<dyn Store>, CacheError> {
        if let Some(store) = &self.store {
            return Ok(Arc::clone(store));
        }

        let mut current = self.parent.upgrade();
        while let Some(node) = current {
            if let Some(store) = &node.store {
                return Ok(Arc::clone(store));
            }
            current = node.parent.upgrade();
        }

        Err(CacheError::NoCacheOwner)
    }

    /// Hierarchical path of this node, ancestor names joined root-first.
    pub fn path_name(&self) -> String {
        let mut names = vec![self.name.clone()];
        let mut current = self.parent.upgrade();
        while let Some(node) = current {
            names.push(node.name.clone());
            current = node.parent.upgrade();
        }
        names.reverse();
        format!("{}{}", PATH_SEPARATOR, names.join(&PATH_SEPARATOR.to_string()))
    }
}

impl fmt::Debug for Node {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Node({})", self.path_name())
    }
}

fn validate_name(name: &str) -> Result<(), CacheError> {
    if name.is_empty() {
        return Err(CacheError::Tree(
            "node must have a non-empty name".to_string(),
        ));
    }
    if name.contains(PATH_SEPARATOR) {
        return Err(CacheError::Tree(format!(
            "node name may not contain '{}'",
            PATH_SEPARATOR
        )));
    }
    Ok(())
}

fn default_cache_dir(name: &str) -> PathBuf {
    std::env::temp_dir().join(format!("yazr_{}.cache", name))
}
