use std::collections::BTreeMap;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;
use uuid::Uuid;

use super::DocumentType;

/// A confirmed document in the user's permanent store.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Document {
    pub id: Uuid,
    pub user_id: Uuid,
    pub record_id: Uuid,
    pub document_type: DocumentType,
    pub title: String,
    pub summary: Option<String>,
    pub extracted_text: String,
    pub fields: BTreeMap<String, serde_json::Value>,
    pub storage_key: String,
    pub storage_url: String,
    pub content_type: String,
    pub file_size: i64,
    pub filename: String,
    pub created_at: DateTime<Utc>,
}

#[derive(Debug, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct DocumentResponse {
    pub id: Uuid,
    pub record_id: Uuid,
    pub document_type: DocumentType,
    pub title: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub summary: Option<String>,
    #[schema(value_type = Object)]
    pub fields: BTreeMap<String, serde_json::Value>,
    pub filename: String,
    pub url: String,
    pub content_type: String,
    pub file_size: i64,
    pub created_at: DateTime<Utc>,
}

impl From<Document> for DocumentResponse {
    fn from(doc: Document) -> Self {
        DocumentResponse {
            id: doc.id,
            record_id: doc.record_id,
            document_type: doc.document_type,
            title: doc.title,
            summary: doc.summary,
            fields: doc.fields,
            filename: doc.filename,
            url: doc.storage_url,
            content_type: doc.content_type,
            file_size: doc.file_size,
            created_at: doc.created_at,
        }
    }
}
