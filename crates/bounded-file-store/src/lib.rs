//! # Bounded File Store
//!
//! An in-memory index over a single flat directory that keeps the directory
//! under two independent limits: a maximum combined size in bytes and a
//! maximum number of files. When either limit is exceeded the oldest tracked
//! files are deleted until both hold again.
//!
//! The directory is the source of truth at startup: [`BoundedStore::open`]
//! scans it, orders the files by modification time and immediately applies
//! the quota. After that the index is kept consistent through
//! [`BoundedStore::add`], which is the only mutation path.
//!
//! ## Features
//!
//! - **FIFO eviction**: age is insertion order, there is no access tracking
//! - **Two limits**: total size and file count, enforced together
//! - **Startup convergence**: a directory that already violates the quota is
//!   shrunk before the store is handed out
//! - **Tolerant of external deletes**: a file that vanished before eviction
//!   is simply dropped from the index
//! - **Concurrency safe**: every mutation and snapshot happens under one lock
//!
//! ## Basic Usage
//!
//! ```rust
//! use bounded_file_store::{BoundedStore, QuotaPolicy};
//!
//! # async fn example() -> Result<(), Box<dyn std::error::Error>> {
//! let store = BoundedStore::builder()
//!     .base_directory("/var/lib/drawings")
//!     .quota(QuotaPolicy::new().max_size_bytes(50_000_000).max_count(500))
//!     .build()
//!     .await?;
//!
//! // The caller writes the file itself, then registers it.
//! tokio::fs::write(store.path().join("drawing.png"), b"...").await?;
//! store.add("drawing.png").await?;
//!
//! // Oldest first, i.e. in eviction order.
//! let names = store.list().await;
//! # Ok(())
//! # }
//! ```
//!
//! ## Invariant
//!
//! After every [`BoundedStore::add`] (and after opening), either nothing is
//! tracked, or the total tracked size is at most `max_size_bytes` and the
//! number of tracked files is at most `max_count`. A single file larger than
//! `max_size_bytes` is therefore evicted right after being added.

pub mod error;
pub mod policy;
pub mod security;
pub mod store;

pub use error::{BoundedStoreError, Result};
pub use policy::QuotaPolicy;
pub use store::{BoundedStore, BoundedStoreBuilder, StoreStats, TrackedFile};
