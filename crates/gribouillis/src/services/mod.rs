//! Services layer
//!
//! Business logic sitting between the HTTP handlers and the file store.

pub mod ingestion;

pub use ingestion::{AdmissionGate, IngestionPipeline, SavedImage};
