//! Docvault Core Library
//!
//! Domain models, error types and configuration shared by every docvault
//! component: the extraction engine, the classifier, the provisional record
//! store and the HTTP service.

pub mod config;
pub mod error;
pub mod models;
pub mod storage_types;

// Re-export commonly used types
pub use config::{ClassifierSettings, Config, ExtractionSettings, UploadLimits};
pub use error::{AppError, ErrorMetadata, LogLevel};
pub use storage_types::StorageBackend;
