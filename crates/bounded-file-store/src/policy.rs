//! Quota policy deciding when the oldest files must go.

use serde::{Deserialize, Serialize};

/// Capacity limits for a [`crate::BoundedStore`].
///
/// Both limits are enforced together; exceeding either one triggers eviction.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct QuotaPolicy {
    /// Maximum combined size of tracked files
    pub max_size_bytes: u64,
    /// Maximum number of tracked files
    pub max_count: usize,
}

impl QuotaPolicy {
    /// Create a policy with default limits.
    ///
    /// Default: 50 MB and 500 files.
    pub fn new() -> Self {
        Self {
            max_size_bytes: 50_000_000,
            max_count: 500,
        }
    }

    /// Set the maximum combined size.
    #[must_use]
    pub const fn max_size_bytes(mut self, max_size_bytes: u64) -> Self {
        self.max_size_bytes = max_size_bytes;
        self
    }

    /// Set the maximum number of files.
    #[must_use]
    pub const fn max_count(mut self, max_count: usize) -> Self {
        self.max_count = max_count;
        self
    }

    /// A policy that never evicts.
    pub const fn unlimited() -> Self {
        Self {
            max_size_bytes: u64::MAX,
            max_count: usize::MAX,
        }
    }

    /// Whether a store holding `count` files totalling `total_size_bytes`
    /// must evict its oldest entry.
    ///
    /// The size limit only applies while something is tracked, so an
    /// inconsistent total on an empty store can never loop forever.
    pub const fn is_exceeded(&self, total_size_bytes: u64, count: usize) -> bool {
        (total_size_bytes > self.max_size_bytes && count > 0) || count > self.max_count
    }
}

impl Default for QuotaPolicy {
    fn default() -> Self {
        Self::new()
    }
}
