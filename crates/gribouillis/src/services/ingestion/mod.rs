//! Drawing ingestion
//!
//! An upload passes through the [`AdmissionGate`], is decoded as PNG, padded
//! with a white border, re-encoded and written under a random name, then
//! registered with the [`bounded_file_store::BoundedStore`] that enforces
//! the disk quota.

pub mod canvas;
pub mod gate;
pub mod pipeline;

pub use canvas::{IMAGE_PADDING, normalize_png, pad_image};
pub use gate::AdmissionGate;
pub use pipeline::{IngestionPipeline, SavedImage, generate_image_name};
