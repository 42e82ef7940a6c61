use std::io::ErrorKind;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum CacheError {
    #[error("invalid memoize configuration: {0}")]
    Config(String),

    #[error("invalid node: {0}")]
    Tree(String),

    #[error("no cache owned by this node or any of its ancestors")]
    NoCacheOwner,

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("serialization error: {0}")]
    Serialization(#[from] serde_json::Error),
}

impl CacheError {
    /// Whether the error is transient store contention that a retrying
    /// operation should absorb rather than surface.
    pub fn is_transient(&self) -> bool {
        matches!(
            self,
            CacheError::Io(e) if matches!(e.kind(), ErrorKind::Interrupted | ErrorKind::WouldBlock)
        )
    }
}
