use std::fmt::{Display, Formatter, Result as FmtResult};

use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

use super::DocumentType;

/// Transient upload handed to the orchestrator. Never persisted as-is.
#[derive(Debug, Clone)]
pub struct UploadedFile {
    pub filename: String,
    pub content_type: String,
    pub declared_size: u64,
    pub declared_type: DocumentType,
    pub data: Vec<u8>,
}

impl UploadedFile {
    pub fn new(
        filename: impl Into<String>,
        content_type: impl Into<String>,
        declared_type: DocumentType,
        data: Vec<u8>,
    ) -> Self {
        UploadedFile {
            filename: filename.into(),
            content_type: content_type.into(),
            declared_size: data.len() as u64,
            declared_type,
            data,
        }
    }

    /// MIME type without parameters, lowercased (`text/plain; charset=utf-8` -> `text/plain`).
    pub fn essence(&self) -> String {
        self.content_type
            .split(';')
            .next()
            .unwrap_or_default()
            .trim()
            .to_lowercase()
    }
}

/// Identifier of one extraction strategy.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "kebab-case")]
pub enum ExtractionStrategyKind {
    /// Embedded text layer (`pdftotext -layout`)
    NativeText,
    /// First page rendered at high DPI, then OCR
    RasterizeOcr,
    /// OCR engine over the whole PDF
    FullDocumentOcr,
    /// OCR over an uploaded image
    ImageOcr,
    /// Uploaded text/plain content
    PlainText,
}

impl ExtractionStrategyKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            ExtractionStrategyKind::NativeText => "native-text",
            ExtractionStrategyKind::RasterizeOcr => "rasterize-ocr",
            ExtractionStrategyKind::FullDocumentOcr => "full-document-ocr",
            ExtractionStrategyKind::ImageOcr => "image-ocr",
            ExtractionStrategyKind::PlainText => "plain-text",
        }
    }

    pub fn parse(s: &str) -> Option<Self> {
        [
            ExtractionStrategyKind::NativeText,
            ExtractionStrategyKind::RasterizeOcr,
            ExtractionStrategyKind::FullDocumentOcr,
            ExtractionStrategyKind::ImageOcr,
            ExtractionStrategyKind::PlainText,
        ]
        .into_iter()
        .find(|k| k.as_str() == s)
    }
}

impl Display for ExtractionStrategyKind {
    fn fmt(&self, f: &mut Formatter<'_>) -> FmtResult {
        f.write_str(self.as_str())
    }
}

/// One run of one strategy. Failed and empty runs are kept for diagnostics.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct ExtractionAttempt {
    pub strategy: ExtractionStrategyKind,
    pub text: String,
    pub succeeded: bool,
    pub diagnostic: Option<String>,
    pub elapsed_ms: u64,
}

impl ExtractionAttempt {
    pub fn succeeded(strategy: ExtractionStrategyKind, text: String, elapsed_ms: u64) -> Self {
        ExtractionAttempt {
            strategy,
            text,
            succeeded: true,
            diagnostic: None,
            elapsed_ms,
        }
    }

    /// Tool ran but produced nothing usable.
    pub fn empty(strategy: ExtractionStrategyKind, elapsed_ms: u64) -> Self {
        ExtractionAttempt {
            strategy,
            text: String::new(),
            succeeded: false,
            diagnostic: None,
            elapsed_ms,
        }
    }

    pub fn failed(
        strategy: ExtractionStrategyKind,
        diagnostic: impl Into<String>,
        elapsed_ms: u64,
    ) -> Self {
        ExtractionAttempt {
            strategy,
            text: String::new(),
            succeeded: false,
            diagnostic: Some(diagnostic.into()),
            elapsed_ms,
        }
    }
}

/// Whether the extracted text contains bracketed placeholder markers such
/// as `[unreadable]`. Marked text is still a successful extraction.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize, ToSchema)]
#[serde(tag = "status", rename_all = "snake_case")]
pub enum TextQuality {
    #[default]
    Clean,
    ContainsMarkers { markers: Vec<String> },
}

impl TextQuality {
    pub fn is_clean(&self) -> bool {
        matches!(self, TextQuality::Clean)
    }

    pub fn markers(&self) -> &[String] {
        match self {
            TextQuality::Clean => &[],
            TextQuality::ContainsMarkers { markers } => markers,
        }
    }
}

/// Text produced by the winning strategy.
#[derive(Debug, Clone, PartialEq)]
pub struct ExtractedText {
    pub content: String,
    pub strategy_used: ExtractionStrategyKind,
    pub quality: TextQuality,
    pub attempts: Vec<ExtractionAttempt>,
}

#[derive(Debug, Clone, PartialEq)]
pub enum ExtractionResult {
    Text(ExtractedText),
    Failed { attempts: Vec<ExtractionAttempt> },
}

impl ExtractionResult {
    pub fn attempts(&self) -> &[ExtractionAttempt] {
        match self {
            ExtractionResult::Text(text) => &text.attempts,
            ExtractionResult::Failed { attempts } => attempts,
        }
    }

    pub fn strategy_used(&self) -> Option<ExtractionStrategyKind> {
        match self {
            ExtractionResult::Text(text) => Some(text.strategy_used),
            ExtractionResult::Failed { .. } => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_strategy_kind_names() {
        assert_eq!(ExtractionStrategyKind::NativeText.to_string(), "native-text");
        assert_eq!(
            serde_json::to_string(&ExtractionStrategyKind::FullDocumentOcr).unwrap(),
            "\"full-document-ocr\""
        );
        assert_eq!(
            ExtractionStrategyKind::parse("rasterize-ocr"),
            Some(ExtractionStrategyKind::RasterizeOcr)
        );
        assert_eq!(ExtractionStrategyKind::parse("magic"), None);
    }

    #[test]
    fn test_essence_strips_parameters() {
        let file = UploadedFile::new(
            "notes.txt",
            "Text/Plain; charset=UTF-8",
            DocumentType::Personal,
            b"hello".to_vec(),
        );
        assert_eq!(file.essence(), "text/plain");
        assert_eq!(file.declared_size, 5);
    }

    #[test]
    fn test_quality_serialization() {
        let quality = TextQuality::ContainsMarkers {
            markers: vec!["[unreadable]".to_string()],
        };
        let json = serde_json::to_value(&quality).unwrap();
        assert_eq!(json["status"], "contains_markers");
        assert_eq!(json["markers"][0], "[unreadable]");
        assert!(!quality.is_clean());
        assert!(TextQuality::Clean.markers().is_empty());
    }
}
