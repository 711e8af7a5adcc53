//! OpenAPI document, served at `/api/openapi.json` and rendered by RapiDoc at `/docs`.

use utoipa::openapi::security::{Http, HttpAuthScheme, SecurityScheme};
use utoipa::{Modify, OpenApi};

use crate::handlers;
use docvault_core::models;

struct BearerAuth;

impl Modify for BearerAuth {
    fn modify(&self, openapi: &mut utoipa::openapi::OpenApi) {
        let components = openapi.components.get_or_insert_with(Default::default);
        components.add_security_scheme(
            "bearer_auth",
            SecurityScheme::Http(Http::new(HttpAuthScheme::Bearer)),
        );
    }
}

#[derive(OpenApi)]
#[openapi(
    info(
        title = "Docvault API",
        version = "0.1.0",
        description = "Document intake: text extraction, AI classification and a confirm/reject step before documents enter the permanent store."
    ),
    paths(
        handlers::documents::process_document,
        handlers::documents::confirm_document,
        handlers::documents::reject_document,
        handlers::documents::list_documents,
        handlers::documents::get_document,
        handlers::documents::download_document,
        handlers::documents::get_record,
        handlers::health::health_check,
        handlers::health::liveness_check,
        handlers::health::readiness_check,
    ),
    components(schemas(
        docvault_infra::ErrorResponse,
        handlers::documents::ProcessDocumentResponse,
        handlers::documents::ExtractionSummary,
        handlers::documents::ConfirmDocumentRequest,
        handlers::documents::RejectDocumentRequest,
        handlers::documents::SuccessResponse,
        handlers::health::HealthCheckResponse,
        models::ClassificationResult,
        models::ClassificationStatus,
        models::MismatchVerdict,
        models::DocumentType,
        models::DocumentResponse,
        models::ProvisionalRecordResponse,
        models::RecordState,
        models::ExtractionStrategyKind,
        models::TextQuality,
    )),
    modifiers(&BearerAuth),
    tags(
        (name = "documents", description = "Upload processing and the confirmation lifecycle"),
        (name = "health", description = "Liveness and health checks")
    )
)]
pub struct ApiDoc;
