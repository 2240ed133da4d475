//! Error types for the bounded file store.

use std::path::PathBuf;

/// Result type for bounded store operations.
pub type Result<T> = std::result::Result<T, BoundedStoreError>;

/// Errors that can occur while opening or mutating a store.
#[derive(Debug, thiserror::Error)]
pub enum BoundedStoreError {
    /// The managed directory could not be created, listed or shrunk at startup
    #[error("Failed to initialize storage at {path:?}: {source}")]
    StorageInit {
        path: PathBuf,
        source: std::io::Error,
    },

    /// A file disappeared between being written and being registered
    #[error("File not found: {name}")]
    FileNotFound {
        name: String,
        source: std::io::Error,
    },

    /// Deleting an evicted file failed for a reason other than absence
    #[error("Failed to evict {name}: {source}")]
    EvictionIo {
        name: String,
        source: std::io::Error,
    },

    /// The name does not denote a plain file inside the managed directory
    #[error("Invalid file name {name:?}: {reason}")]
    InvalidName { name: String, reason: String },

    /// Configuration error
    #[error("Configuration error: {message}")]
    Configuration { message: String },

    /// I/O operation failed
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}
