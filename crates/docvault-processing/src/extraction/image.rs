use std::ffi::OsStr;
use std::time::Duration;

use async_trait::async_trait;
use docvault_core::models::ExtractionStrategyKind;
use docvault_core::ExtractionSettings;

use super::command::run_tool;
use super::strategy::{Diagnostic, ExtractionInput, ExtractionStrategy};

/// Tesseract over an uploaded JPEG, PNG or GIF, text on stdout.
pub struct ImageOcrStrategy {
    tesseract_path: String,
    language: String,
    timeout: Duration,
}

impl ImageOcrStrategy {
    pub fn new(settings: &ExtractionSettings) -> Self {
        Self {
            tesseract_path: settings.tesseract_path.clone(),
            language: settings.ocr_language.clone(),
            timeout: settings.rasterize_ocr_timeout,
        }
    }
}

#[async_trait]
impl ExtractionStrategy for ImageOcrStrategy {
    fn kind(&self) -> ExtractionStrategyKind {
        ExtractionStrategyKind::ImageOcr
    }

    fn timeout(&self) -> Duration {
        self.timeout
    }

    async fn extract(&self, input: &ExtractionInput) -> Result<String, Diagnostic> {
        let output = run_tool(
            &self.tesseract_path,
            [
                input.path().as_os_str(),
                OsStr::new("stdout"),
                OsStr::new("-l"),
                OsStr::new(&self.language),
            ],
        )
        .await?;

        Ok(String::from_utf8_lossy(&output.stdout).into_owned())
    }
}
