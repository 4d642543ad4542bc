use std::path::PathBuf;

use thiserror::Error;

#[derive(Debug, Error)]
pub enum Error {
    #[error("Invalid configuration: {0}")]
    InvalidConfig(String),

    #[error("Not found: {0}")]
    NotFound(String),

    #[error("Operation failed: {0}")]
    Operation(String),

    /// The caller supplied an unusable query. Raised before any I/O.
    #[error("Invalid search: {0}")]
    Validation(String),

    /// The embedding provider failed a batch or returned a malformed response.
    #[error("Embedding provider failed: {0}")]
    Provider(#[source] anyhow::Error),

    #[error("Corrupt cache entry {}: {source}", path.display())]
    CacheCorrupt {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },

    #[error("Cache I/O failed for {}: {source}", path.display())]
    CacheIo {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
}

pub type Result<T> = std::result::Result<T, Error>;
