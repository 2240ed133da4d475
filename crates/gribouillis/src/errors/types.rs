//! Error type definitions for gribouillis

use bounded_file_store::BoundedStoreError;
use std::time::Duration;
use thiserror::Error;

/// Top-level application error type
#[derive(Error, Debug)]
pub enum AppError {
    /// Another upload was admitted less than the minimum delay ago
    #[error("rate limited, retry in {retry_after:?}")]
    RateLimited { retry_after: Duration },

    /// Request body exceeded the configured maximum image size
    #[error("image larger than {max_bytes} bytes")]
    InputTooLarge { max_bytes: u64 },

    /// Body was not a decodable PNG
    #[error("invalid PNG image: {0}")]
    Decode(#[source] image::ImageError),

    /// Padded image could not be encoded
    #[error("PNG encoding failed: {0}")]
    Encode(#[source] image::ImageError),

    /// Quota registration failed
    #[error("Storage error: {0}")]
    Storage(#[from] BoundedStoreError),

    /// Filesystem or request body errors
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// Background image work or registration panicked or was cancelled
    #[error("Background task failed: {0}")]
    Task(#[from] tokio::task::JoinError),
}

impl AppError {
    /// True when the request was refused before any work was attempted.
    pub const fn is_rejection(&self) -> bool {
        matches!(self, Self::RateLimited { .. } | Self::InputTooLarge { .. })
    }
}
