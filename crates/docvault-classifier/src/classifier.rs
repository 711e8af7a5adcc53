use async_trait::async_trait;
use docvault_core::models::{ClassificationResult, DocumentType};

/// Infers the document type and type-specific fields from extracted text.
///
/// Implementations never fail: timeouts, transport errors and unparseable
/// answers all yield [`ClassificationResult::unavailable`].
#[async_trait]
pub trait DocumentClassifier: Send + Sync {
    async fn classify(&self, text: &str, declared: DocumentType) -> ClassificationResult;
}

/// Used when no classifier backend is configured.
#[derive(Debug, Default, Clone, Copy)]
pub struct DisabledClassifier;

#[async_trait]
impl DocumentClassifier for DisabledClassifier {
    async fn classify(&self, _text: &str, declared: DocumentType) -> ClassificationResult {
        ClassificationResult::unavailable(declared)
    }
}
