//! Docvault classifier
//!
//! The AI collaborator that reads extracted text and guesses what kind of
//! document it is. Callers only ever see a [`ClassificationResult`]; every
//! failure is folded into the `unavailable` variant.
//!
//! [`ClassificationResult`]: docvault_core::models::ClassificationResult

pub mod claude;
pub mod classifier;
pub mod prompt;

use std::sync::Arc;

use docvault_core::Config;

pub use claude::{ClaudeClassifierConfig, ClaudeDocumentClassifier};
pub use classifier::{DisabledClassifier, DocumentClassifier};

/// Classifier for the running configuration: Claude when an API key is set,
/// otherwise one that always reports unavailable.
pub fn create_classifier(config: &Config) -> anyhow::Result<Arc<dyn DocumentClassifier>> {
    match ClaudeClassifierConfig::from_config(config) {
        Some(claude) => {
            tracing::info!(model = %claude.model, "Document classifier: Anthropic Messages API");
            Ok(Arc::new(ClaudeDocumentClassifier::new(claude)?))
        }
        None => {
            tracing::warn!("ANTHROPIC_API_KEY not set, document classification disabled");
            Ok(Arc::new(DisabledClassifier))
        }
    }
}
