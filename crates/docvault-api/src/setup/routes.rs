//! Route configuration and setup

use std::sync::Arc;

use axum::extract::DefaultBodyLimit;
use axum::http::{HeaderValue, Method};
use axum::routing::{get, post};
use axum::{Json, Router};
use docvault_core::Config;
use docvault_infra::{request_id_middleware, security_headers_middleware};
use tower::limit::ConcurrencyLimitLayer;
use tower_http::cors::{Any, CorsLayer};
use tower_http::limit::RequestBodyLimitLayer;
use tower_http::trace::TraceLayer;
use utoipa::OpenApi;

use crate::api_doc::ApiDoc;
use crate::auth::auth_middleware;
use crate::handlers::{documents, health};
use crate::state::AppState;

/// Room for multipart boundaries and the `documentType` field on top of the
/// largest accepted file.
const MULTIPART_OVERHEAD_BYTES: usize = 1024 * 1024;

/// Build the full router for `state`.
pub fn setup_routes(config: &Config, state: Arc<AppState>) -> Result<Router<()>, anyhow::Error> {
    let cors = setup_cors(config)?;
    let body_limit = config.max_upload_size_bytes() + MULTIPART_OVERHEAD_BYTES;

    let protected_routes = protected_routes().layer(axum::middleware::from_fn_with_state(
        state.jwt.clone(),
        auth_middleware,
    ));

    tracing::info!(
        max_concurrent_requests = config.max_concurrent_requests(),
        body_limit,
        "HTTP limits configured"
    );

    let app = public_routes()
        .merge(protected_routes)
        .nest(
            "/docs",
            utoipa_rapidoc::RapiDoc::new("/api/openapi.json")
                .path("/docs")
                .into(),
        )
        .layer(DefaultBodyLimit::max(body_limit))
        .layer(ConcurrencyLimitLayer::new(config.max_concurrent_requests().max(1)))
        .layer(RequestBodyLimitLayer::new(body_limit))
        .layer(cors)
        .layer(TraceLayer::new_for_http())
        .layer(axum::middleware::from_fn(request_id_middleware))
        .layer(axum::middleware::from_fn_with_state(
            config.is_production(),
            security_headers_middleware,
        ))
        .with_state(state);

    Ok(app)
}

fn public_routes() -> Router<Arc<AppState>> {
    Router::new()
        .route("/health", get(health::health_check))
        .route("/live", get(health::liveness_check))
        .route("/ready", get(health::readiness_check))
        .route("/api/openapi.json", get(|| async { Json(ApiDoc::openapi()) }))
}

fn protected_routes() -> Router<Arc<AppState>> {
    Router::new()
        .route("/documents", get(documents::list_documents))
        .route("/documents/process", post(documents::process_document))
        .route("/documents/confirm", post(documents::confirm_document))
        .route("/documents/reject", post(documents::reject_document))
        .route("/documents/records/{record_id}", get(documents::get_record))
        .route("/documents/{id}", get(documents::get_document))
        .route("/documents/{id}/file", get(documents::download_document))
}

fn setup_cors(config: &Config) -> Result<CorsLayer, anyhow::Error> {
    let cors = if config.cors_origins().iter().any(|o| o == "*") {
        tracing::warn!("CORS configured to allow all origins - not recommended for production");
        CorsLayer::new()
            .allow_origin(Any)
            .allow_methods([Method::GET, Method::POST, Method::OPTIONS])
            .allow_headers(Any)
    } else {
        let origins = config
            .cors_origins()
            .iter()
            .map(|o| o.parse::<HeaderValue>())
            .collect::<Result<Vec<_>, _>>()
            .map_err(|e| anyhow::anyhow!("Invalid CORS origin: {}", e))?;

        CorsLayer::new()
            .allow_origin(origins)
            .allow_methods([Method::GET, Method::POST, Method::OPTIONS])
            .allow_headers(Any)
    };
    Ok(cors)
}
