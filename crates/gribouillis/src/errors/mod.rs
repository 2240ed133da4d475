//! Centralized error handling for gribouillis
//!
//! Every failure an upload can hit is expressed as an [`AppError`] so the web
//! layer can map it onto one HTTP response in a single place.
//!
//! # Error Categories
//!
//! - **Admission**: the server-wide rate gate refused the request
//! - **Input**: the body was too large or was not a decodable PNG
//! - **Storage**: writing the image or registering it with the quota failed
//!
//! # Usage
//!
//! ```rust
//! use gribouillis::errors::{AppError, AppResult};
//!
//! fn check(len: u64, max: u64) -> AppResult<()> {
//!     if len > max {
//!         return Err(AppError::InputTooLarge { max_bytes: max });
//!     }
//!     Ok(())
//! }
//!
//! assert!(check(3, 2).is_err());
//! ```

pub mod types;

pub use types::*;

/// Convenience type alias for Results using AppError
pub type AppResult<T> = Result<T, AppError>;
