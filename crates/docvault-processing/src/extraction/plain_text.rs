use std::time::Duration;

use async_trait::async_trait;
use docvault_core::models::ExtractionStrategyKind;

use super::strategy::{Diagnostic, ExtractionInput, ExtractionStrategy};

const UTF8_BOM: char = '\u{feff}';

/// `text/plain` uploads: the content is the text. Invalid UTF-8 sequences
/// are replaced rather than rejected.
pub struct PlainTextStrategy {
    timeout: Duration,
}

impl PlainTextStrategy {
    pub fn new(timeout: Duration) -> Self {
        Self { timeout }
    }
}

#[async_trait]
impl ExtractionStrategy for PlainTextStrategy {
    fn kind(&self) -> ExtractionStrategyKind {
        ExtractionStrategyKind::PlainText
    }

    fn timeout(&self) -> Duration {
        self.timeout
    }

    async fn extract(&self, input: &ExtractionInput) -> Result<String, Diagnostic> {
        let bytes = tokio::fs::read(input.path()).await?;
        let text = String::from_utf8_lossy(&bytes);
        Ok(text.trim_start_matches(UTF8_BOM).to_string())
    }
}
