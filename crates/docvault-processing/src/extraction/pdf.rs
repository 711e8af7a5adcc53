//! PDF strategies, cheapest first: embedded text layer, OCR of the first
//! page rendered as an image, OCR of the whole document.

use std::ffi::OsStr;
use std::time::Duration;

use async_trait::async_trait;
use docvault_core::models::ExtractionStrategyKind;
use docvault_core::ExtractionSettings;

use super::command::run_tool;
use super::strategy::{Diagnostic, ExtractionInput, ExtractionStrategy};

/// `pdftotext -layout`: instant when the PDF carries a text layer.
pub struct NativeTextStrategy {
    pdftotext_path: String,
    timeout: Duration,
}

impl NativeTextStrategy {
    pub fn new(settings: &ExtractionSettings) -> Self {
        Self {
            pdftotext_path: settings.pdftotext_path.clone(),
            timeout: settings.native_text_timeout,
        }
    }
}

#[async_trait]
impl ExtractionStrategy for NativeTextStrategy {
    fn kind(&self) -> ExtractionStrategyKind {
        ExtractionStrategyKind::NativeText
    }

    fn timeout(&self) -> Duration {
        self.timeout
    }

    async fn extract(&self, input: &ExtractionInput) -> Result<String, Diagnostic> {
        let scratch = input.scratch_dir("docvault-native-")?;
        let out = scratch.path().join("out.txt");

        run_tool(
            &self.pdftotext_path,
            [
                OsStr::new("-layout"),
                OsStr::new("-enc"),
                OsStr::new("UTF-8"),
                input.path().as_os_str(),
                out.as_os_str(),
            ],
        )
        .await?;

        let bytes = tokio::fs::read(&out).await?;
        Ok(String::from_utf8_lossy(&bytes).into_owned())
    }
}

/// Render page 1 with `pdftoppm`, then OCR the PNG with tesseract.
pub struct RasterizeOcrStrategy {
    pdftoppm_path: String,
    tesseract_path: String,
    language: String,
    dpi: u32,
    timeout: Duration,
}

impl RasterizeOcrStrategy {
    pub fn new(settings: &ExtractionSettings) -> Self {
        Self {
            pdftoppm_path: settings.pdftoppm_path.clone(),
            tesseract_path: settings.tesseract_path.clone(),
            language: settings.ocr_language.clone(),
            dpi: settings.ocr_dpi,
            timeout: settings.rasterize_ocr_timeout,
        }
    }
}

#[async_trait]
impl ExtractionStrategy for RasterizeOcrStrategy {
    fn kind(&self) -> ExtractionStrategyKind {
        ExtractionStrategyKind::RasterizeOcr
    }

    fn timeout(&self) -> Duration {
        self.timeout
    }

    async fn extract(&self, input: &ExtractionInput) -> Result<String, Diagnostic> {
        let scratch = input.scratch_dir("docvault-raster-")?;
        let prefix = scratch.path().join("page");
        let dpi = self.dpi.to_string();

        // -singlefile writes exactly `<prefix>.png`
        run_tool(
            &self.pdftoppm_path,
            [
                OsStr::new("-png"),
                OsStr::new("-r"),
                OsStr::new(&dpi),
                OsStr::new("-f"),
                OsStr::new("1"),
                OsStr::new("-l"),
                OsStr::new("1"),
                OsStr::new("-singlefile"),
                input.path().as_os_str(),
                prefix.as_os_str(),
            ],
        )
        .await?;

        let image = prefix.with_extension("png");
        if !tokio::fs::try_exists(&image).await.unwrap_or(false) {
            return Err(Diagnostic::Other("pdftoppm produced no image".to_string()));
        }

        let output = run_tool(
            &self.tesseract_path,
            [
                image.as_os_str(),
                OsStr::new("stdout"),
                OsStr::new("-l"),
                OsStr::new(&self.language),
            ],
        )
        .await?;

        Ok(String::from_utf8_lossy(&output.stdout).into_owned())
    }
}

/// Tesseract over the whole PDF in `pdf` output mode; the `txt` config
/// emits the recognized text next to the searchable PDF.
pub struct FullDocumentOcrStrategy {
    tesseract_path: String,
    language: String,
    timeout: Duration,
}

impl FullDocumentOcrStrategy {
    pub fn new(settings: &ExtractionSettings) -> Self {
        Self {
            tesseract_path: settings.tesseract_path.clone(),
            language: settings.ocr_language.clone(),
            timeout: settings.full_document_ocr_timeout,
        }
    }
}

#[async_trait]
impl ExtractionStrategy for FullDocumentOcrStrategy {
    fn kind(&self) -> ExtractionStrategyKind {
        ExtractionStrategyKind::FullDocumentOcr
    }

    fn timeout(&self) -> Duration {
        self.timeout
    }

    async fn extract(&self, input: &ExtractionInput) -> Result<String, Diagnostic> {
        let scratch = input.scratch_dir("docvault-fullocr-")?;
        let outbase = scratch.path().join("ocr");

        run_tool(
            &self.tesseract_path,
            [
                input.path().as_os_str(),
                outbase.as_os_str(),
                OsStr::new("-l"),
                OsStr::new(&self.language),
                OsStr::new("pdf"),
                OsStr::new("txt"),
            ],
        )
        .await?;

        let bytes = tokio::fs::read(outbase.with_extension("txt")).await?;
        Ok(String::from_utf8_lossy(&bytes).into_owned())
    }
}
