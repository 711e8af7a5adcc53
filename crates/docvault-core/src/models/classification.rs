use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

use super::DocumentType;

/// Whether the classifier produced a real answer.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "lowercase")]
pub enum ClassificationStatus {
    Available,
    Unavailable,
}

/// Classifier output for one document.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct ClassificationResult {
    pub status: ClassificationStatus,
    pub inferred_type: DocumentType,
    /// 0..=100
    pub confidence: u8,
    pub reasoning: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub title: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub summary: Option<String>,
    /// Type-dependent fields (doctor_name, amount, due_date, ...).
    #[serde(default)]
    #[schema(value_type = Object)]
    pub fields: BTreeMap<String, serde_json::Value>,
}

impl ClassificationResult {
    /// Degraded result used when the classifier failed: the declared type
    /// with zero confidence and no reasoning.
    pub fn unavailable(declared: DocumentType) -> Self {
        ClassificationResult {
            status: ClassificationStatus::Unavailable,
            inferred_type: declared,
            confidence: 0,
            reasoning: String::new(),
            title: None,
            summary: None,
            fields: BTreeMap::new(),
        }
    }

    pub fn is_available(&self) -> bool {
        self.status == ClassificationStatus::Available
    }
}

/// Attached to a record when the classifier disagrees with the user with
/// confidence above the threshold.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct MismatchVerdict {
    pub declared_type: DocumentType,
    pub inferred_type: DocumentType,
    pub confidence: u8,
    pub reasoning: String,
}
