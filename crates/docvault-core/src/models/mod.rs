//! Data models for the document pipeline
//!
//! Organized by pipeline stage: what the user declared, what extraction
//! produced, what the classifier inferred, and the records that carry those
//! results through confirmation.

mod classification;
mod document;
mod document_type;
mod extraction;
mod record;

pub use classification::*;
pub use document::*;
pub use document_type::*;
pub use extraction::*;
pub use record::*;
