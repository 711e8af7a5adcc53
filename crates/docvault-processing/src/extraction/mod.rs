//! Text extraction
//!
//! Every accepted upload goes through a cascade of strategies chosen by its
//! MIME type. PDFs try the embedded text layer first and fall back to OCR;
//! images go straight to OCR; plain text is decoded as-is.

pub mod command;
pub mod engine;
pub mod image;
pub mod pdf;
pub mod plain_text;
pub mod quality;
pub mod strategy;
#[cfg(all(test, unix))]
mod test_tools;

pub use engine::ExtractionEngine;
pub use image::ImageOcrStrategy;
pub use pdf::{FullDocumentOcrStrategy, NativeTextStrategy, RasterizeOcrStrategy};
pub use plain_text::PlainTextStrategy;
pub use quality::assess_quality;
pub use strategy::{Diagnostic, ExtractionInput, ExtractionStrategy, ScratchDir};
