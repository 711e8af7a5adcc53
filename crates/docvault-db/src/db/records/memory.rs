use std::collections::HashMap;
use std::sync::{Mutex, MutexGuard};

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use docvault_core::models::{
    Decision, Document, FinalizeOutcome, NewProvisionalRecord, ProvisionalRecord, RecordState,
};
use docvault_core::AppError;
use uuid::Uuid;

use super::{already_finalized, record_not_found, ProvisionalRecordStore};
use crate::db::documents::DocumentStore;

#[derive(Default)]
struct Inner {
    records: HashMap<Uuid, ProvisionalRecord>,
    documents: Vec<Document>,
}

/// Process-local record store for tests and single-node development.
///
/// Every operation runs under one lock, so the state check and the
/// transition in `finalize` cannot interleave with another decision.
/// Finalized records stay until `prune_finalized` drops them, which the
/// expiry sweeper does once they are older than the pending TTL.
#[derive(Default)]
pub struct InMemoryProvisionalRecordStore {
    inner: Mutex<Inner>,
}

impl InMemoryProvisionalRecordStore {
    pub fn new() -> Self {
        Self::default()
    }

    fn lock(&self) -> Result<MutexGuard<'_, Inner>, AppError> {
        self.inner
            .lock()
            .map_err(|_| AppError::Internal("record store lock poisoned".to_string()))
    }

    /// Number of stored records in any state.
    pub fn record_count(&self) -> usize {
        self.lock().map(|inner| inner.records.len()).unwrap_or(0)
    }

    /// Overwrite a record's creation time; lets expiry be exercised without waiting.
    pub fn backdate(&self, record_id: Uuid, created_at: DateTime<Utc>) -> Result<(), AppError> {
        let mut inner = self.lock()?;
        let record = inner
            .records
            .get_mut(&record_id)
            .ok_or_else(|| record_not_found(record_id))?;
        record.created_at = created_at;
        Ok(())
    }

    /// Overwrite a finalized record's decision time.
    pub fn backdate_finalized(
        &self,
        record_id: Uuid,
        finalized_at: DateTime<Utc>,
    ) -> Result<(), AppError> {
        let mut inner = self.lock()?;
        let record = inner
            .records
            .get_mut(&record_id)
            .ok_or_else(|| record_not_found(record_id))?;
        if record.finalized_at.is_some() {
            record.finalized_at = Some(finalized_at);
        }
        Ok(())
    }
}

#[async_trait]
impl ProvisionalRecordStore for InMemoryProvisionalRecordStore {
    async fn create(&self, record: NewProvisionalRecord) -> Result<Uuid, AppError> {
        let mut inner = self.lock()?;
        let mut id = Uuid::new_v4();
        while inner.records.contains_key(&id) {
            id = Uuid::new_v4();
        }
        inner
            .records
            .insert(id, ProvisionalRecord::from_new(id, record, Utc::now()));
        Ok(id)
    }

    async fn get(&self, user_id: Uuid, record_id: Uuid) -> Result<ProvisionalRecord, AppError> {
        let inner = self.lock()?;
        inner
            .records
            .get(&record_id)
            .filter(|r| r.user_id == user_id)
            .cloned()
            .ok_or_else(|| record_not_found(record_id))
    }

    async fn finalize(
        &self,
        user_id: Uuid,
        record_id: Uuid,
        decision: Decision,
    ) -> Result<FinalizeOutcome, AppError> {
        let mut inner = self.lock()?;
        let record = inner
            .records
            .get(&record_id)
            .filter(|r| r.user_id == user_id)
            .ok_or_else(|| record_not_found(record_id))?;

        if record.state.is_terminal() {
            return Err(already_finalized(record));
        }

        let now = Utc::now();
        match decision {
            Decision::Confirm {
                use_ai_classification,
            } => {
                let final_type = record.resolve_final_type(use_ai_classification)?;
                let document = record.promote(final_type, Uuid::new_v4(), now);

                let record = inner
                    .records
                    .get_mut(&record_id)
                    .ok_or_else(|| record_not_found(record_id))?;
                record.state = RecordState::Confirmed;
                record.finalized_at = Some(now);
                record.final_type = Some(final_type);
                record.document_id = Some(document.id);

                inner.documents.push(document.clone());
                Ok(FinalizeOutcome::Confirmed(document))
            }
            Decision::Reject => {
                let record = inner
                    .records
                    .get_mut(&record_id)
                    .ok_or_else(|| record_not_found(record_id))?;
                record.state = RecordState::Rejected;
                record.finalized_at = Some(now);
                Ok(FinalizeOutcome::Rejected {
                    storage_key: record.file.storage_key.clone(),
                })
            }
        }
    }

    async fn list_expired_pending(
        &self,
        older_than: DateTime<Utc>,
        limit: i64,
    ) -> Result<Vec<ProvisionalRecord>, AppError> {
        let inner = self.lock()?;
        let mut expired: Vec<ProvisionalRecord> = inner
            .records
            .values()
            .filter(|r| r.state == RecordState::PendingConfirmation && r.created_at < older_than)
            .cloned()
            .collect();
        expired.sort_by_key(|r| r.created_at);
        expired.truncate(limit.max(0) as usize);
        Ok(expired)
    }

    async fn expire(&self, record_id: Uuid) -> Result<bool, AppError> {
        let mut inner = self.lock()?;
        match inner.records.get_mut(&record_id) {
            Some(record) if record.state == RecordState::PendingConfirmation => {
                record.state = RecordState::Rejected;
                record.finalized_at = Some(Utc::now());
                Ok(true)
            }
            _ => Ok(false),
        }
    }

    async fn prune_finalized(&self, finalized_before: DateTime<Utc>) -> Result<u64, AppError> {
        let mut inner = self.lock()?;
        let before = inner.records.len();
        inner.records.retain(|_, r| match r.finalized_at {
            Some(at) if r.state.is_terminal() => at >= finalized_before,
            _ => true,
        });
        Ok((before - inner.records.len()) as u64)
    }
}

#[async_trait]
impl DocumentStore for InMemoryProvisionalRecordStore {
    async fn list_for_user(
        &self,
        user_id: Uuid,
        limit: i64,
        offset: i64,
    ) -> Result<Vec<Document>, AppError> {
        let inner = self.lock()?;
        let mut docs: Vec<Document> = inner
            .documents
            .iter()
            .filter(|d| d.user_id == user_id)
            .cloned()
            .collect();
        docs.sort_by(|a, b| b.created_at.cmp(&a.created_at));
        Ok(docs
            .into_iter()
            .skip(offset.max(0) as usize)
            .take(limit.max(0) as usize)
            .collect())
    }

    async fn get_for_user(&self, user_id: Uuid, id: Uuid) -> Result<Option<Document>, AppError> {
        let inner = self.lock()?;
        Ok(inner
            .documents
            .iter()
            .find(|d| d.id == id && d.user_id == user_id)
            .cloned())
    }
}
