//! Shared application state

use std::sync::Arc;

use docvault_core::Config;
use docvault_db::{DocumentStore, ProvisionalRecordStore};
use docvault_services::{ConfirmationService, Storage, UploadOrchestrator};
use sqlx::PgPool;

use crate::auth::JwtKeys;

/// Everything a handler needs. Built once by `setup::services` (or by a test
/// harness over in-memory stores) and shared behind an `Arc`.
pub struct AppState {
    pub config: Config,
    /// `None` when running over in-memory stores.
    pub pool: Option<PgPool>,
    pub storage: Arc<dyn Storage>,
    pub records: Arc<dyn ProvisionalRecordStore>,
    pub documents: Arc<dyn DocumentStore>,
    pub orchestrator: UploadOrchestrator,
    pub confirmation: Arc<ConfirmationService>,
    pub jwt: Arc<JwtKeys>,
}
