//! Prompt construction and answer parsing for LLM-backed classifiers.

use std::collections::BTreeMap;

use anyhow::Context;
use docvault_core::models::{ClassificationResult, ClassificationStatus, DocumentType};
use serde::Deserialize;

/// Instructions plus the (possibly truncated) document text.
pub fn build_classification_prompt(text: &str, declared: DocumentType, max_chars: usize) -> String {
    let mut parts = vec![
        "You classify personal documents. Read the document text below and answer with a single JSON object and nothing else.".to_string(),
        String::new(),
        format!(
            "Allowed values for documentType: {}.",
            DocumentType::ALL
                .iter()
                .map(|t| t.as_str())
                .collect::<Vec<_>>()
                .join(", ")
        ),
        format!("The user filed this document as: {}.", declared),
        String::new(),
        "Fields to extract by type (omit unknown values):".to_string(),
    ];

    for doc_type in DocumentType::ALL {
        let fields = doc_type.expected_fields();
        if !fields.is_empty() {
            parts.push(format!("- {}: {}", doc_type, fields.join(", ")));
        }
    }

    parts.push(String::new());
    parts.push(
        r#"Response format: {"documentType": string, "confidence": integer 0-100, "reasoning": string, "title": string, "summary": string, "fields": object}"#
            .to_string(),
    );
    parts.push(String::new());
    parts.push("Document text:".to_string());
    parts.push(truncate_chars(text, max_chars).to_string());

    parts.join("\n")
}

fn truncate_chars(text: &str, max_chars: usize) -> &str {
    match text.char_indices().nth(max_chars) {
        Some((idx, _)) => &text[..idx],
        None => text,
    }
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct RawClassification {
    document_type: String,
    #[serde(default)]
    confidence: f64,
    #[serde(default)]
    reasoning: String,
    #[serde(default)]
    title: Option<String>,
    #[serde(default)]
    summary: Option<String>,
    #[serde(default)]
    fields: BTreeMap<String, serde_json::Value>,
}

/// Parse the model's answer. Code fences are tolerated, an unknown type
/// becomes `other` and the confidence is clamped to 0..=100.
pub fn parse_classification_response(text: &str) -> anyhow::Result<ClassificationResult> {
    let json_text = strip_code_fences(text);
    let raw: RawClassification =
        serde_json::from_str(json_text).context("Failed to parse classifier answer as JSON")?;

    let inferred_type = raw
        .document_type
        .parse::<DocumentType>()
        .unwrap_or(DocumentType::Other);
    let confidence = if raw.confidence.is_finite() {
        raw.confidence.round().clamp(0.0, 100.0) as u8
    } else {
        0
    };

    Ok(ClassificationResult {
        status: ClassificationStatus::Available,
        inferred_type,
        confidence,
        reasoning: raw.reasoning,
        title: raw.title.filter(|t| !t.trim().is_empty()),
        summary: raw.summary.filter(|s| !s.trim().is_empty()),
        fields: raw
            .fields
            .into_iter()
            .filter(|(_, v)| !v.is_null())
            .collect(),
    })
}

fn strip_code_fences(text: &str) -> &str {
    if text.contains("```json") {
        text.split("```json")
            .nth(1)
            .and_then(|s| s.split("```").next())
            .unwrap_or(text)
            .trim()
    } else if text.contains("```") {
        text.split("```")
            .nth(1)
            .and_then(|s| s.split("```").next())
            .unwrap_or(text)
            .trim()
    } else {
        text.trim()
    }
}
