use std::path::PathBuf;
use std::sync::Arc;
use std::time::Instant;

use docvault_core::models::{ExtractedText, ExtractionAttempt, ExtractionResult, UploadedFile};
use docvault_core::{AppError, ExtractionSettings};

use super::image::ImageOcrStrategy;
use super::pdf::{FullDocumentOcrStrategy, NativeTextStrategy, RasterizeOcrStrategy};
use super::plain_text::PlainTextStrategy;
use super::quality::assess_quality;
use super::strategy::{Diagnostic, ExtractionInput, ExtractionStrategy};

type Cascade = Vec<Arc<dyn ExtractionStrategy>>;

/// Runs the strategy cascade matching an upload's MIME type.
///
/// Strategies run one at a time, in order, each under its own timeout. The
/// first one producing non-blank text wins and later strategies are never
/// started. Every run is recorded as an [`ExtractionAttempt`].
pub struct ExtractionEngine {
    pdf: Cascade,
    image: Cascade,
    text: Cascade,
    scratch_root: Option<PathBuf>,
}

impl ExtractionEngine {
    /// Production cascades backed by poppler-utils and tesseract.
    pub fn from_settings(settings: &ExtractionSettings) -> Self {
        Self::with_cascades(
            vec![
                Arc::new(NativeTextStrategy::new(settings)),
                Arc::new(RasterizeOcrStrategy::new(settings)),
                Arc::new(FullDocumentOcrStrategy::new(settings)),
            ],
            vec![Arc::new(ImageOcrStrategy::new(settings))],
            vec![Arc::new(PlainTextStrategy::new(settings.native_text_timeout))],
        )
    }

    pub fn with_cascades(pdf: Cascade, image: Cascade, text: Cascade) -> Self {
        Self {
            pdf,
            image,
            text,
            scratch_root: None,
        }
    }

    /// Create per-upload working directories under `root` instead of the
    /// system temp dir.
    pub fn with_scratch_root(mut self, root: impl Into<PathBuf>) -> Self {
        self.scratch_root = Some(root.into());
        self
    }

    fn cascade_for(&self, essence: &str) -> Option<&[Arc<dyn ExtractionStrategy>]> {
        match essence {
            "application/pdf" => Some(&self.pdf),
            "image/jpeg" | "image/png" | "image/gif" => Some(&self.image),
            "text/plain" => Some(&self.text),
            _ => None,
        }
    }

    /// Extract text from an upload.
    ///
    /// Returns `Ok(ExtractionResult::Failed)` when every strategy came up
    /// empty; `Err` only for unsupported types or when the upload could not
    /// be staged on disk. The working directory is removed on return and
    /// when the future is dropped.
    #[tracing::instrument(skip(self, file), fields(filename = %file.filename, content_type = %file.content_type, size = file.data.len()))]
    pub async fn extract(&self, file: &UploadedFile) -> Result<ExtractionResult, AppError> {
        let essence = file.essence();
        let cascade = self.cascade_for(&essence).ok_or_else(|| {
            AppError::Validation(format!("No extraction strategy for {}", essence))
        })?;

        let mut builder = tempfile::Builder::new();
        builder.prefix("docvault-upload-");
        let workdir = match &self.scratch_root {
            Some(root) => builder.tempdir_in(root)?,
            None => builder.tempdir()?,
        };

        let path = workdir.path().join(format!("input.{}", extension_for(&essence)));
        tokio::fs::write(&path, &file.data).await?;

        let input = ExtractionInput {
            path,
            content_type: essence,
            scratch_root: workdir.path().to_path_buf(),
        };

        Ok(run_cascade(cascade, &input).await)
    }
}

/// Run `cascade` against a staged input.
pub async fn run_cascade(
    cascade: &[Arc<dyn ExtractionStrategy>],
    input: &ExtractionInput,
) -> ExtractionResult {
    let mut attempts = Vec::with_capacity(cascade.len());

    for strategy in cascade {
        let kind = strategy.kind();
        let started = Instant::now();
        let outcome = match tokio::time::timeout(strategy.timeout(), strategy.extract(input)).await {
            Ok(result) => result,
            Err(_) => Err(Diagnostic::TimedOut(strategy.timeout())),
        };
        // Postgres text and jsonb columns cannot hold U+0000.
        let outcome = outcome.map(strip_nul);
        let elapsed_ms = started.elapsed().as_millis() as u64;

        match outcome {
            Ok(text) if !text.trim().is_empty() => {
                let content = text.trim().to_string();
                tracing::info!(
                    strategy = %kind,
                    elapsed_ms,
                    chars = content.chars().count(),
                    "Text extracted"
                );
                attempts.push(ExtractionAttempt::succeeded(kind, content.clone(), elapsed_ms));
                return ExtractionResult::Text(ExtractedText {
                    quality: assess_quality(&content),
                    content,
                    strategy_used: kind,
                    attempts,
                });
            }
            Ok(_) => {
                tracing::debug!(strategy = %kind, elapsed_ms, "Strategy produced no text");
                attempts.push(ExtractionAttempt::empty(kind, elapsed_ms));
            }
            Err(diagnostic) => {
                tracing::warn!(
                    strategy = %kind,
                    elapsed_ms,
                    error = %diagnostic,
                    "Extraction strategy failed"
                );
                attempts.push(ExtractionAttempt::failed(kind, diagnostic.to_string(), elapsed_ms));
            }
        }
    }

    tracing::warn!(attempts = attempts.len(), "All extraction strategies failed");
    ExtractionResult::Failed { attempts }
}

fn strip_nul(text: String) -> String {
    if text.contains('\0') {
        text.replace('\0', "")
    } else {
        text
    }
}

fn extension_for(essence: &str) -> &'static str {
    match essence {
        "application/pdf" => "pdf",
        "image/jpeg" => "jpg",
        "image/png" => "png",
        "image/gif" => "gif",
        _ => "txt",
    }
}
