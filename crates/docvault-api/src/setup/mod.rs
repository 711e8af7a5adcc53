//! Application setup and initialization

pub mod database;
pub mod routes;
pub mod server;
pub mod services;
pub mod storage;

use std::sync::Arc;

use anyhow::{Context, Result};
use docvault_core::Config;
use docvault_infra::{init_telemetry, LogFormat};

use crate::state::AppState;

/// Validate configuration, then bring up telemetry, the database, storage,
/// services and routes, in that order.
pub async fn initialize_app(config: Config) -> Result<(Arc<AppState>, axum::Router)> {
    config
        .validate()
        .context("Configuration validation failed")?;

    let log_format = config
        .log_format()
        .parse::<LogFormat>()
        .unwrap_or(LogFormat::Pretty);
    init_telemetry(log_format).map_err(|e| anyhow::anyhow!("Failed to initialize telemetry: {}", e))?;

    tracing::info!(
        environment = %config.environment(),
        "Configuration loaded and validated successfully"
    );

    let pool = database::setup_database(&config).await?;
    let storage = storage::setup_storage(&config).await?;
    let state = services::initialize_services(&config, pool, storage)?;
    let router = routes::setup_routes(&config, state.clone())?;

    Ok((state, router))
}
