//! Service wiring

use std::sync::Arc;
use std::time::Duration;

use anyhow::{Context, Result};
use docvault_core::Config;
use docvault_db::{DocumentRepository, PgProvisionalRecordStore, ProvisionalRecordStore};
use docvault_services::{
    create_classifier, ConfirmationService, ExtractionEngine, PendingRecordSweeper, Storage,
    UploadOrchestrator, UploadValidator,
};
use sqlx::PgPool;

use crate::auth::JwtKeys;
use crate::state::AppState;

/// Build the application state over Postgres and the configured storage.
pub fn initialize_services(
    config: &Config,
    pool: PgPool,
    storage: Arc<dyn Storage>,
) -> Result<Arc<AppState>> {
    let records: Arc<dyn ProvisionalRecordStore> =
        Arc::new(PgProvisionalRecordStore::new(pool.clone()));
    let documents = Arc::new(DocumentRepository::new(pool.clone()));

    let engine = Arc::new(ExtractionEngine::from_settings(config.extraction()));
    let classifier =
        create_classifier(config).context("Failed to initialize document classifier")?;

    let orchestrator = UploadOrchestrator::new(
        UploadValidator::from_config(config),
        engine,
        classifier,
        records.clone(),
        storage.clone(),
        config.processing_deadline(),
    )
    .with_mismatch_threshold(config.mismatch_confidence_threshold());
    let confirmation = Arc::new(ConfirmationService::new(records.clone(), storage.clone()));

    tracing::info!(
        deadline_secs = config.processing_deadline().as_secs(),
        "Document services initialized"
    );

    Ok(Arc::new(AppState {
        config: config.clone(),
        pool: Some(pool),
        storage,
        records,
        documents,
        orchestrator,
        confirmation,
        jwt: Arc::new(JwtKeys::from_secret(config.jwt_secret())),
    }))
}

/// Start the pending record sweeper. `None` when disabled by configuration.
pub fn start_background_tasks(
    config: &Config,
    state: &Arc<AppState>,
) -> Option<tokio::task::JoinHandle<()>> {
    let sweeper = Arc::new(PendingRecordSweeper::new(
        state.records.clone(),
        state.storage.clone(),
        config.pending_record_ttl_hours(),
        Duration::from_secs(config.pending_sweep_interval_secs()),
    ));
    let handle = sweeper.start();
    if handle.is_none() {
        tracing::info!("Pending record sweeper disabled");
    }
    handle
}
