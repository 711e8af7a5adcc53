use async_trait::async_trait;
use docvault_core::models::Document;
use docvault_core::AppError;
use sqlx::{PgPool, Postgres};
use uuid::Uuid;

use crate::db::rows::{DocumentRow, DOCUMENT_COLUMNS};

/// Read access to confirmed documents. Provisional records never appear here.
#[async_trait]
pub trait DocumentStore: Send + Sync {
    /// Newest first.
    async fn list_for_user(
        &self,
        user_id: Uuid,
        limit: i64,
        offset: i64,
    ) -> Result<Vec<Document>, AppError>;

    async fn get_for_user(&self, user_id: Uuid, id: Uuid) -> Result<Option<Document>, AppError>;
}

/// Repository for confirmed documents
#[derive(Clone)]
pub struct DocumentRepository {
    pool: PgPool,
}

impl DocumentRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl DocumentStore for DocumentRepository {
    #[tracing::instrument(skip(self), fields(db.table = "documents", db.operation = "select"))]
    async fn list_for_user(
        &self,
        user_id: Uuid,
        limit: i64,
        offset: i64,
    ) -> Result<Vec<Document>, AppError> {
        let rows = sqlx::query_as::<Postgres, DocumentRow>(&format!(
            "SELECT {} FROM documents WHERE user_id = $1 ORDER BY created_at DESC LIMIT $2 OFFSET $3",
            DOCUMENT_COLUMNS
        ))
        .bind(user_id)
        .bind(limit)
        .bind(offset)
        .fetch_all(&self.pool)
        .await?;

        rows.into_iter().map(Document::try_from).collect()
    }

    #[tracing::instrument(skip(self), fields(db.table = "documents", db.operation = "select", db.record_id = %id))]
    async fn get_for_user(&self, user_id: Uuid, id: Uuid) -> Result<Option<Document>, AppError> {
        let row = sqlx::query_as::<Postgres, DocumentRow>(&format!(
            "SELECT {} FROM documents WHERE id = $1 AND user_id = $2",
            DOCUMENT_COLUMNS
        ))
        .bind(id)
        .bind(user_id)
        .fetch_optional(&self.pool)
        .await?;

        row.map(Document::try_from).transpose()
    }
}
