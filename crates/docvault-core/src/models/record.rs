use std::fmt::{Display, Formatter, Result as FmtResult};
use std::str::FromStr;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;
use uuid::Uuid;

use super::{
    ClassificationResult, Document, DocumentType, ExtractionStrategyKind, MismatchVerdict,
    TextQuality,
};
use crate::error::AppError;

/// Lifecycle of a provisional record. `Confirmed` and `Rejected` are terminal.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "snake_case")]
pub enum RecordState {
    PendingConfirmation,
    Confirmed,
    Rejected,
}

impl RecordState {
    pub fn as_str(&self) -> &'static str {
        match self {
            RecordState::PendingConfirmation => "pending_confirmation",
            RecordState::Confirmed => "confirmed",
            RecordState::Rejected => "rejected",
        }
    }

    pub fn is_terminal(&self) -> bool {
        !matches!(self, RecordState::PendingConfirmation)
    }
}

impl FromStr for RecordState {
    type Err = AppError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "pending_confirmation" => Ok(RecordState::PendingConfirmation),
            "confirmed" => Ok(RecordState::Confirmed),
            "rejected" => Ok(RecordState::Rejected),
            other => Err(AppError::Internal(format!("Unknown record state: {}", other))),
        }
    }
}

impl Display for RecordState {
    fn fmt(&self, f: &mut Formatter<'_>) -> FmtResult {
        f.write_str(self.as_str())
    }
}

/// The user's answer to a provisional record.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Decision {
    Confirm { use_ai_classification: bool },
    Reject,
}

/// Where the uploaded bytes were stored.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StoredFile {
    pub storage_key: String,
    pub storage_url: String,
    pub content_type: String,
    pub file_size: i64,
    pub filename: String,
}

/// Input to `ProvisionalRecordStore::create`.
#[derive(Debug, Clone)]
pub struct NewProvisionalRecord {
    pub user_id: Uuid,
    pub declared_type: DocumentType,
    pub extracted_text: String,
    pub strategy_used: ExtractionStrategyKind,
    pub text_quality: TextQuality,
    pub classification: ClassificationResult,
    pub mismatch: Option<MismatchVerdict>,
    pub file: StoredFile,
}

#[derive(Debug, Clone, PartialEq)]
pub struct ProvisionalRecord {
    pub id: Uuid,
    pub user_id: Uuid,
    pub declared_type: DocumentType,
    pub extracted_text: String,
    pub strategy_used: ExtractionStrategyKind,
    pub text_quality: TextQuality,
    pub classification: ClassificationResult,
    pub mismatch: Option<MismatchVerdict>,
    pub state: RecordState,
    pub file: StoredFile,
    pub created_at: DateTime<Utc>,
    pub finalized_at: Option<DateTime<Utc>>,
    pub final_type: Option<DocumentType>,
    pub document_id: Option<Uuid>,
}

impl ProvisionalRecord {
    pub fn from_new(id: Uuid, new: NewProvisionalRecord, created_at: DateTime<Utc>) -> Self {
        ProvisionalRecord {
            id,
            user_id: new.user_id,
            declared_type: new.declared_type,
            extracted_text: new.extracted_text,
            strategy_used: new.strategy_used,
            text_quality: new.text_quality,
            classification: new.classification,
            mismatch: new.mismatch,
            state: RecordState::PendingConfirmation,
            file: new.file,
            created_at,
            finalized_at: None,
            final_type: None,
            document_id: None,
        }
    }

    /// Type the permanent document gets for a confirm decision.
    ///
    /// Adopting the AI classification is only legal when a mismatch verdict
    /// was attached to the record.
    pub fn resolve_final_type(&self, use_ai_classification: bool) -> Result<DocumentType, AppError> {
        if !use_ai_classification {
            return Ok(self.declared_type);
        }
        match &self.mismatch {
            Some(verdict) => Ok(verdict.inferred_type),
            None => Err(AppError::Validation(
                "useAiClassification requires a classification mismatch on the record".to_string(),
            )),
        }
    }

    /// Permanent document promoted from this record.
    pub fn promote(&self, final_type: DocumentType, document_id: Uuid, now: DateTime<Utc>) -> Document {
        Document {
            id: document_id,
            user_id: self.user_id,
            record_id: self.id,
            document_type: final_type,
            title: self
                .classification
                .title
                .clone()
                .unwrap_or_else(|| self.file.filename.clone()),
            summary: self.classification.summary.clone(),
            extracted_text: self.extracted_text.clone(),
            fields: self.classification.fields.clone(),
            storage_key: self.file.storage_key.clone(),
            storage_url: self.file.storage_url.clone(),
            content_type: self.file.content_type.clone(),
            file_size: self.file.file_size,
            filename: self.file.filename.clone(),
            created_at: now,
        }
    }
}

/// Result of a successful finalize.
#[derive(Debug, Clone, PartialEq)]
pub enum FinalizeOutcome {
    Confirmed(Document),
    /// The caller is responsible for deleting `storage_key`.
    Rejected { storage_key: String },
}

/// Provisional record as returned to its owner.
#[derive(Debug, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct ProvisionalRecordResponse {
    pub record_id: Uuid,
    pub declared_type: DocumentType,
    pub state: RecordState,
    pub extracted_text: String,
    pub strategy_used: ExtractionStrategyKind,
    pub text_quality: TextQuality,
    pub analysis_result: ClassificationResult,
    pub classification_mismatch: Option<MismatchVerdict>,
    pub filename: String,
    pub created_at: DateTime<Utc>,
    pub finalized_at: Option<DateTime<Utc>>,
}

impl From<ProvisionalRecord> for ProvisionalRecordResponse {
    fn from(record: ProvisionalRecord) -> Self {
        ProvisionalRecordResponse {
            record_id: record.id,
            declared_type: record.declared_type,
            state: record.state,
            extracted_text: record.extracted_text,
            strategy_used: record.strategy_used,
            text_quality: record.text_quality,
            analysis_result: record.classification,
            classification_mismatch: record.mismatch,
            filename: record.file.filename,
            created_at: record.created_at,
            finalized_at: record.finalized_at,
        }
    }
}
