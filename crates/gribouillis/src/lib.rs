//! gribouillis: a drawing upload service.
//!
//! Clients POST a PNG drawing. The server pads it with a white border,
//! stores it under a random name and returns the path it is served from.
//! Stored drawings live in a directory capped by total size and file count;
//! the oldest drawings are evicted first.

pub mod config;
pub mod errors;
pub mod services;
pub mod web;

pub use config::Config;
pub use errors::{AppError, AppResult};
