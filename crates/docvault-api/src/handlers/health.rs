//! Liveness, readiness and health checks.

use std::fmt::Display;
use std::future::Future;
use std::sync::Arc;
use std::time::Duration;

use axum::extract::State;
use axum::http::StatusCode;
use axum::response::IntoResponse;
use axum::Json;
use serde::Serialize;
use utoipa::ToSchema;

use crate::state::AppState;

const CHECK_TIMEOUT: Duration = Duration::from_secs(5);

/// "healthy", "timeout" or "{prefix}: {error}".
async fn run_check<F, E>(timeout: Duration, f: F, error_prefix: &str) -> String
where
    F: Future<Output = Result<(), E>>,
    E: Display,
{
    match tokio::time::timeout(timeout, f).await {
        Ok(Ok(())) => "healthy".to_string(),
        Ok(Err(e)) => format!("{}: {}", error_prefix, e),
        Err(_) => "timeout".to_string(),
    }
}

#[derive(Debug, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct HealthCheckResponse {
    pub status: String,
    pub database: String,
    pub storage: String,
    pub classifier: String,
}

async fn check_database(state: &AppState) -> String {
    match &state.pool {
        Some(pool) => {
            let pool = pool.clone();
            run_check(
                CHECK_TIMEOUT,
                async move { sqlx::query("SELECT 1").execute(&pool).await.map(drop) },
                "unhealthy",
            )
            .await
        }
        None => "in-memory".to_string(),
    }
}

#[utoipa::path(
    get,
    path = "/live",
    tag = "health",
    responses((status = 200, description = "Process is running"))
)]
pub async fn liveness_check() -> impl IntoResponse {
    (StatusCode::OK, Json(serde_json::json!({ "status": "alive" })))
}

/// Ready once the database answers.
#[utoipa::path(
    get,
    path = "/ready",
    tag = "health",
    responses(
        (status = 200, description = "Ready to serve"),
        (status = 503, description = "Database unreachable")
    )
)]
pub async fn readiness_check(State(state): State<Arc<AppState>>) -> impl IntoResponse {
    let database = check_database(&state).await;
    let ready = database == "healthy" || database == "in-memory";
    if !ready {
        tracing::error!(database = %database, "Readiness check failed");
    }

    let status = if ready {
        StatusCode::OK
    } else {
        StatusCode::SERVICE_UNAVAILABLE
    };
    (
        status,
        Json(serde_json::json!({
            "status": if ready { "ready" } else { "not_ready" },
            "database": database,
        })),
    )
}

/// Database, storage and classifier status. Only the database decides the
/// status code; a disabled classifier degrades uploads but does not fail them.
#[utoipa::path(
    get,
    path = "/health",
    tag = "health",
    responses(
        (status = 200, description = "Healthy", body = HealthCheckResponse),
        (status = 503, description = "Unhealthy", body = HealthCheckResponse)
    )
)]
pub async fn health_check(State(state): State<Arc<AppState>>) -> impl IntoResponse {
    let database = check_database(&state).await;

    let storage = state.storage.clone();
    let storage = run_check(
        CHECK_TIMEOUT,
        async move {
            storage
                .exists("health-check-non-existent-key")
                .await
                .map(drop)
        },
        "unhealthy",
    )
    .await;

    let classifier = if state.config.anthropic_api_key().is_some() {
        "configured"
    } else {
        "disabled"
    };

    let healthy = database == "healthy" || database == "in-memory";
    let response = HealthCheckResponse {
        status: if healthy { "healthy" } else { "unhealthy" }.to_string(),
        database,
        storage,
        classifier: classifier.to_string(),
    };

    let status = if healthy {
        StatusCode::OK
    } else {
        StatusCode::SERVICE_UNAVAILABLE
    };
    (status, Json(response))
}
