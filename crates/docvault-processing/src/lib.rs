//! Docvault processing
//!
//! Upload validation and the text extraction cascade. Validation runs before
//! any external tool is started; extraction turns an accepted upload into
//! text by trying progressively more expensive strategies.

pub mod extraction;
pub mod validator;

pub use extraction::{
    Diagnostic, ExtractionEngine, ExtractionInput, ExtractionStrategy, ScratchDir,
};
pub use validator::{UploadValidator, ValidationError};
