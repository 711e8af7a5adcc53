//! Storage setup and initialization

use std::sync::Arc;

use anyhow::{Context, Result};
use docvault_core::Config;
use docvault_services::{create_storage, Storage};

pub async fn setup_storage(config: &Config) -> Result<Arc<dyn Storage>> {
    tracing::info!("Initializing storage...");
    let storage = create_storage(config)
        .await
        .context("Failed to initialize storage backend")?;
    tracing::info!(backend = ?storage.backend_type(), "Storage initialized");
    Ok(storage)
}
