use std::collections::BTreeMap;

use chrono::{DateTime, Utc};
use docvault_core::models::{
    ClassificationResult, Document, DocumentType, ExtractionStrategyKind, MismatchVerdict,
    ProvisionalRecord, RecordState, StoredFile, TextQuality,
};
use docvault_core::AppError;
use sqlx::types::Json;
use uuid::Uuid;

pub(crate) const RECORD_COLUMNS: &str = "id, user_id, declared_type, extracted_text, strategy_used, \
     text_quality, classification, mismatch, state, storage_key, storage_url, content_type, \
     file_size, filename, created_at, finalized_at, final_type, document_id";

pub(crate) const DOCUMENT_COLUMNS: &str = "id, user_id, record_id, document_type, title, summary, \
     extracted_text, fields, storage_key, storage_url, content_type, file_size, filename, created_at";

#[derive(Debug, sqlx::FromRow)]
pub(crate) struct ProvisionalRecordRow {
    pub id: Uuid,
    pub user_id: Uuid,
    pub declared_type: String,
    pub extracted_text: String,
    pub strategy_used: String,
    pub text_quality: Json<TextQuality>,
    pub classification: Json<ClassificationResult>,
    pub mismatch: Option<Json<MismatchVerdict>>,
    pub state: String,
    pub storage_key: String,
    pub storage_url: String,
    pub content_type: String,
    pub file_size: i64,
    pub filename: String,
    pub created_at: DateTime<Utc>,
    pub finalized_at: Option<DateTime<Utc>>,
    pub final_type: Option<String>,
    pub document_id: Option<Uuid>,
}

impl TryFrom<ProvisionalRecordRow> for ProvisionalRecord {
    type Error = AppError;

    fn try_from(row: ProvisionalRecordRow) -> Result<Self, Self::Error> {
        let strategy_used = ExtractionStrategyKind::parse(&row.strategy_used).ok_or_else(|| {
            AppError::Internal(format!("Unknown extraction strategy: {}", row.strategy_used))
        })?;
        let final_type = row
            .final_type
            .as_deref()
            .map(str::parse::<DocumentType>)
            .transpose()?;

        Ok(ProvisionalRecord {
            id: row.id,
            user_id: row.user_id,
            declared_type: row.declared_type.parse()?,
            extracted_text: row.extracted_text,
            strategy_used,
            text_quality: row.text_quality.0,
            classification: row.classification.0,
            mismatch: row.mismatch.map(|m| m.0),
            state: row.state.parse::<RecordState>()?,
            file: StoredFile {
                storage_key: row.storage_key,
                storage_url: row.storage_url,
                content_type: row.content_type,
                file_size: row.file_size,
                filename: row.filename,
            },
            created_at: row.created_at,
            finalized_at: row.finalized_at,
            final_type,
            document_id: row.document_id,
        })
    }
}

#[derive(Debug, sqlx::FromRow)]
pub(crate) struct DocumentRow {
    pub id: Uuid,
    pub user_id: Uuid,
    pub record_id: Uuid,
    pub document_type: String,
    pub title: String,
    pub summary: Option<String>,
    pub extracted_text: String,
    pub fields: Json<BTreeMap<String, serde_json::Value>>,
    pub storage_key: String,
    pub storage_url: String,
    pub content_type: String,
    pub file_size: i64,
    pub filename: String,
    pub created_at: DateTime<Utc>,
}

impl TryFrom<DocumentRow> for Document {
    type Error = AppError;

    fn try_from(row: DocumentRow) -> Result<Self, Self::Error> {
        Ok(Document {
            id: row.id,
            user_id: row.user_id,
            record_id: row.record_id,
            document_type: row.document_type.parse()?,
            title: row.title,
            summary: row.summary,
            extracted_text: row.extracted_text,
            fields: row.fields.0,
            storage_key: row.storage_key,
            storage_url: row.storage_url,
            content_type: row.content_type,
            file_size: row.file_size,
            filename: row.filename,
            created_at: row.created_at,
        })
    }
}
