use std::sync::Arc;

use docvault_core::models::{
    Decision, Document, DocumentType, FinalizeOutcome, ProvisionalRecord,
};
use docvault_core::AppError;
use docvault_db::ProvisionalRecordStore;
use docvault_storage::Storage;
use uuid::Uuid;

/// Drives a provisional record to its terminal state.
#[derive(Clone)]
pub struct ConfirmationService {
    records: Arc<dyn ProvisionalRecordStore>,
    storage: Arc<dyn Storage>,
}

impl ConfirmationService {
    pub fn new(records: Arc<dyn ProvisionalRecordStore>, storage: Arc<dyn Storage>) -> Self {
        Self { records, storage }
    }

    pub async fn get_record(
        &self,
        user_id: Uuid,
        record_id: Uuid,
    ) -> Result<ProvisionalRecord, AppError> {
        self.records.get(user_id, record_id).await
    }

    /// Promote the record into a permanent document.
    ///
    /// `declared_type` must repeat the type given at upload time; with
    /// `use_ai_classification` the document takes the inferred type instead,
    /// which requires a mismatch verdict on the record.
    #[tracing::instrument(skip(self), fields(user_id = %user_id, record_id = %record_id))]
    pub async fn confirm(
        &self,
        user_id: Uuid,
        record_id: Uuid,
        declared_type: DocumentType,
        use_ai_classification: bool,
    ) -> Result<Document, AppError> {
        let record = self.records.get(user_id, record_id).await?;
        if record.declared_type != declared_type {
            return Err(AppError::Validation(format!(
                "documentType {} does not match the declared type {} of this record",
                declared_type, record.declared_type
            )));
        }

        match self
            .records
            .finalize(
                user_id,
                record_id,
                Decision::Confirm {
                    use_ai_classification,
                },
            )
            .await?
        {
            FinalizeOutcome::Confirmed(document) => {
                tracing::info!(
                    document_id = %document.id,
                    document_type = %document.document_type,
                    "Record confirmed"
                );
                Ok(document)
            }
            FinalizeOutcome::Rejected { .. } => Err(AppError::Internal(
                "Confirm decision produced a rejection".to_string(),
            )),
        }
    }

    /// Discard the record and delete its stored file. The state change is
    /// durable before the file is touched, so a failed delete is only logged.
    #[tracing::instrument(skip(self), fields(user_id = %user_id, record_id = %record_id))]
    pub async fn reject(&self, user_id: Uuid, record_id: Uuid) -> Result<(), AppError> {
        match self
            .records
            .finalize(user_id, record_id, Decision::Reject)
            .await?
        {
            FinalizeOutcome::Rejected { storage_key } => {
                if let Err(e) = self.storage.delete(&storage_key).await {
                    tracing::error!(
                        error = %e,
                        storage_key = %storage_key,
                        "Failed to delete rejected upload from storage"
                    );
                }
                tracing::info!("Record rejected");
                Ok(())
            }
            FinalizeOutcome::Confirmed(_) => Err(AppError::Internal(
                "Reject decision produced a confirmation".to_string(),
            )),
        }
    }
}
