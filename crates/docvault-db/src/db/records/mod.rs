//! Provisional record store
//!
//! A provisional record exists from the end of a successful upload until the
//! owner decides on it. `finalize` is a compare-and-swap on the lifecycle
//! state: of any number of concurrent decisions on one record, exactly one
//! succeeds and the rest observe [`AppError::StateConflict`].

pub mod memory;
pub mod postgres;

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use docvault_core::models::{Decision, FinalizeOutcome, NewProvisionalRecord, ProvisionalRecord};
use docvault_core::AppError;
use uuid::Uuid;

#[async_trait]
pub trait ProvisionalRecordStore: Send + Sync {
    /// Persist a new record in `pending_confirmation` under a fresh id.
    async fn create(&self, record: NewProvisionalRecord) -> Result<Uuid, AppError>;

    /// Fetch a record owned by `user_id`. Records of other users are reported
    /// as not found.
    async fn get(&self, user_id: Uuid, record_id: Uuid) -> Result<ProvisionalRecord, AppError>;

    /// Apply the owner's decision.
    ///
    /// - unknown id or foreign owner: `NotFound`
    /// - already confirmed/rejected: `StateConflict`, nothing changes
    /// - `Confirm { use_ai_classification: true }` without a mismatch verdict: `Validation`
    /// - confirm: state becomes `confirmed` and the permanent document is
    ///   inserted atomically with the transition
    /// - reject: state becomes `rejected`; the caller deletes the stored file
    async fn finalize(
        &self,
        user_id: Uuid,
        record_id: Uuid,
        decision: Decision,
    ) -> Result<FinalizeOutcome, AppError>;

    /// Pending records created before `older_than`, oldest first.
    async fn list_expired_pending(
        &self,
        older_than: DateTime<Utc>,
        limit: i64,
    ) -> Result<Vec<ProvisionalRecord>, AppError>;

    /// Move a pending record to `rejected` on behalf of the expiry sweeper.
    /// Returns false when the record was finalized in the meantime.
    async fn expire(&self, record_id: Uuid) -> Result<bool, AppError>;

    /// Forget records finalized before `finalized_before`; returns how many
    /// were dropped. Confirmed documents are unaffected. Stores that keep
    /// finalized records as history (Postgres, where documents reference
    /// them) leave this as a no-op.
    async fn prune_finalized(&self, _finalized_before: DateTime<Utc>) -> Result<u64, AppError> {
        Ok(0)
    }
}

pub(crate) fn already_finalized(record: &ProvisionalRecord) -> AppError {
    AppError::StateConflict(format!(
        "Record {} is already {}",
        record.id, record.state
    ))
}

pub(crate) fn record_not_found(record_id: Uuid) -> AppError {
    AppError::NotFound(format!("Record {} not found", record_id))
}
