use async_trait::async_trait;
use chrono::{DateTime, Utc};
use docvault_core::models::{
    Decision, Document, FinalizeOutcome, NewProvisionalRecord, ProvisionalRecord, RecordState,
};
use docvault_core::AppError;
use sqlx::types::Json;
use sqlx::{PgPool, Postgres, Transaction};
use uuid::Uuid;

use super::{already_finalized, record_not_found, ProvisionalRecordStore};
use crate::db::rows::{ProvisionalRecordRow, RECORD_COLUMNS};

/// Postgres-backed record store.
#[derive(Clone)]
pub struct PgProvisionalRecordStore {
    pool: PgPool,
}

impl PgProvisionalRecordStore {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    /// Compare-and-swap `pending_confirmation -> next`. Returns false when
    /// another decision got there first.
    async fn transition(
        tx: &mut Transaction<'_, Postgres>,
        record_id: Uuid,
        next: RecordState,
        final_type: Option<&str>,
        document_id: Option<Uuid>,
    ) -> Result<bool, AppError> {
        let result = sqlx::query(
            r#"
            UPDATE provisional_records
            SET state = $2, finalized_at = NOW(), final_type = $3, document_id = $4
            WHERE id = $1 AND state = 'pending_confirmation'
            "#,
        )
        .bind(record_id)
        .bind(next.as_str())
        .bind(final_type)
        .bind(document_id)
        .execute(&mut **tx)
        .await?;

        Ok(result.rows_affected() == 1)
    }

    async fn insert_document(
        tx: &mut Transaction<'_, Postgres>,
        document: &Document,
    ) -> Result<(), AppError> {
        sqlx::query(
            r#"
            INSERT INTO documents (
                id, user_id, record_id, document_type, title, summary, extracted_text,
                fields, storage_key, storage_url, content_type, file_size, filename, created_at
            )
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10, $11, $12, $13, $14)
            "#,
        )
        .bind(document.id)
        .bind(document.user_id)
        .bind(document.record_id)
        .bind(document.document_type.as_str())
        .bind(&document.title)
        .bind(&document.summary)
        .bind(&document.extracted_text)
        .bind(Json(&document.fields))
        .bind(&document.storage_key)
        .bind(&document.storage_url)
        .bind(&document.content_type)
        .bind(document.file_size)
        .bind(&document.filename)
        .bind(document.created_at)
        .execute(&mut **tx)
        .await?;

        Ok(())
    }
}

#[async_trait]
impl ProvisionalRecordStore for PgProvisionalRecordStore {
    #[tracing::instrument(skip(self, record), fields(db.table = "provisional_records", db.operation = "insert"))]
    async fn create(&self, record: NewProvisionalRecord) -> Result<Uuid, AppError> {
        let id = Uuid::new_v4();

        sqlx::query(
            r#"
            INSERT INTO provisional_records (
                id, user_id, declared_type, extracted_text, strategy_used, text_quality,
                classification, mismatch, state, storage_key, storage_url, content_type,
                file_size, filename
            )
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8, 'pending_confirmation', $9, $10, $11, $12, $13)
            "#,
        )
        .bind(id)
        .bind(record.user_id)
        .bind(record.declared_type.as_str())
        .bind(&record.extracted_text)
        .bind(record.strategy_used.as_str())
        .bind(Json(&record.text_quality))
        .bind(Json(&record.classification))
        .bind(record.mismatch.as_ref().map(Json))
        .bind(&record.file.storage_key)
        .bind(&record.file.storage_url)
        .bind(&record.file.content_type)
        .bind(record.file.file_size)
        .bind(&record.file.filename)
        .execute(&self.pool)
        .await?;

        Ok(id)
    }

    #[tracing::instrument(skip(self), fields(db.table = "provisional_records", db.operation = "select", db.record_id = %record_id))]
    async fn get(&self, user_id: Uuid, record_id: Uuid) -> Result<ProvisionalRecord, AppError> {
        let row = sqlx::query_as::<Postgres, ProvisionalRecordRow>(&format!(
            "SELECT {} FROM provisional_records WHERE id = $1 AND user_id = $2",
            RECORD_COLUMNS
        ))
        .bind(record_id)
        .bind(user_id)
        .fetch_optional(&self.pool)
        .await?
        .ok_or_else(|| record_not_found(record_id))?;

        row.try_into()
    }

    #[tracing::instrument(skip(self), fields(db.table = "provisional_records", db.operation = "update", db.record_id = %record_id))]
    async fn finalize(
        &self,
        user_id: Uuid,
        record_id: Uuid,
        decision: Decision,
    ) -> Result<FinalizeOutcome, AppError> {
        let mut tx = self.pool.begin().await?;

        let row = sqlx::query_as::<Postgres, ProvisionalRecordRow>(&format!(
            "SELECT {} FROM provisional_records WHERE id = $1 AND user_id = $2 FOR UPDATE",
            RECORD_COLUMNS
        ))
        .bind(record_id)
        .bind(user_id)
        .fetch_optional(&mut *tx)
        .await?
        .ok_or_else(|| record_not_found(record_id))?;
        let record = ProvisionalRecord::try_from(row)?;

        if record.state.is_terminal() {
            return Err(already_finalized(&record));
        }

        let outcome = match decision {
            Decision::Confirm {
                use_ai_classification,
            } => {
                let final_type = record.resolve_final_type(use_ai_classification)?;
                let document = record.promote(final_type, Uuid::new_v4(), Utc::now());

                if !Self::transition(
                    &mut tx,
                    record_id,
                    RecordState::Confirmed,
                    Some(final_type.as_str()),
                    Some(document.id),
                )
                .await?
                {
                    return Err(already_finalized(&record));
                }
                Self::insert_document(&mut tx, &document).await?;
                FinalizeOutcome::Confirmed(document)
            }
            Decision::Reject => {
                if !Self::transition(&mut tx, record_id, RecordState::Rejected, None, None).await? {
                    return Err(already_finalized(&record));
                }
                FinalizeOutcome::Rejected {
                    storage_key: record.file.storage_key.clone(),
                }
            }
        };

        tx.commit().await?;

        tracing::info!(record_id = %record_id, user_id = %user_id, "Provisional record finalized");

        Ok(outcome)
    }

    async fn list_expired_pending(
        &self,
        older_than: DateTime<Utc>,
        limit: i64,
    ) -> Result<Vec<ProvisionalRecord>, AppError> {
        let rows = sqlx::query_as::<Postgres, ProvisionalRecordRow>(&format!(
            "SELECT {} FROM provisional_records \
             WHERE state = 'pending_confirmation' AND created_at < $1 \
             ORDER BY created_at ASC LIMIT $2",
            RECORD_COLUMNS
        ))
        .bind(older_than)
        .bind(limit)
        .fetch_all(&self.pool)
        .await?;

        rows.into_iter().map(ProvisionalRecord::try_from).collect()
    }

    async fn expire(&self, record_id: Uuid) -> Result<bool, AppError> {
        let result = sqlx::query(
            r#"
            UPDATE provisional_records
            SET state = 'rejected', finalized_at = NOW()
            WHERE id = $1 AND state = 'pending_confirmation'
            "#,
        )
        .bind(record_id)
        .execute(&self.pool)
        .await?;

        Ok(result.rows_affected() == 1)
    }
}
