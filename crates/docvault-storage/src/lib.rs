//! Docvault Storage Library
//!
//! Storage abstraction for uploaded document files, with local filesystem and
//! S3 implementations.
//!
//! # Storage key format
//!
//! Keys are owner-scoped: `documents/{user_id}/{filename}`. Callers pass a
//! filename that is already unique (the orchestrator prefixes a UUID). Keys
//! must not contain `..` or a leading `/`. Key generation lives in the `keys`
//! module so every backend produces the same layout.

pub mod factory;
pub mod keys;
#[cfg(feature = "storage-local")]
pub mod local;
#[cfg(feature = "storage-s3")]
pub mod s3;
pub mod traits;

// Re-export commonly used types
pub use docvault_core::StorageBackend;
pub use factory::create_storage;
pub use keys::{generate_storage_key, sanitize_filename};
#[cfg(feature = "storage-local")]
pub use local::LocalStorage;
#[cfg(feature = "storage-s3")]
pub use s3::S3Storage;
pub use traits::{Storage, StorageError, StorageResult};
