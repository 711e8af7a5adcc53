//! Document intake: upload processing, confirm/reject and the permanent store.

use std::sync::Arc;

use axum::body::Body;
use axum::extract::multipart::MultipartError;
use axum::extract::{Multipart, Path, Query, State};
use axum::http::{header, Response, StatusCode};
use axum::Json;
use docvault_core::models::{
    ClassificationResult, DocumentResponse, DocumentType, ExtractionStrategyKind, MismatchVerdict,
    ProvisionalRecordResponse, TextQuality, UploadedFile,
};
use docvault_core::AppError;
use docvault_infra::ErrorResponse;
use docvault_services::{ProcessOutcome, TracingProgress};
use serde::{Deserialize, Serialize};
use utoipa::{IntoParams, ToSchema};
use uuid::Uuid;
use validator::Validate;

use crate::auth::UserContext;
use crate::error::{HttpAppError, ValidatedJson};
use crate::state::AppState;

/// `{ success: true, data }`
#[derive(Debug, Serialize, ToSchema)]
pub struct ApiResponse<T> {
    pub success: bool,
    pub data: T,
}

impl<T> ApiResponse<T> {
    pub fn ok(data: T) -> Json<Self> {
        Json(ApiResponse {
            success: true,
            data,
        })
    }
}

#[derive(Debug, Serialize, ToSchema)]
pub struct SuccessResponse {
    pub success: bool,
}

#[derive(Debug, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct ExtractionSummary {
    pub strategy_used: ExtractionStrategyKind,
    pub quality: TextQuality,
    pub markers: Vec<String>,
}

#[derive(Debug, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct ProcessDocumentResponse {
    pub analysis_result: ClassificationResult,
    pub extracted_text: String,
    pub record_id: Uuid,
    pub classification_mismatch: Option<MismatchVerdict>,
    pub extraction: ExtractionSummary,
}

impl From<ProcessOutcome> for ProcessDocumentResponse {
    fn from(outcome: ProcessOutcome) -> Self {
        ProcessDocumentResponse {
            analysis_result: outcome.classification,
            extracted_text: outcome.extracted_text,
            record_id: outcome.record_id,
            classification_mismatch: outcome.mismatch,
            extraction: ExtractionSummary {
                strategy_used: outcome.strategy_used,
                markers: outcome.quality.markers().to_vec(),
                quality: outcome.quality,
            },
        }
    }
}

#[derive(Debug, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct ConfirmDocumentRequest {
    pub record_id: Uuid,
    pub document_type: DocumentType,
    #[serde(default)]
    pub use_ai_classification: bool,
}

#[derive(Debug, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct RejectDocumentRequest {
    pub record_id: Uuid,
}

#[derive(Debug, Deserialize, Validate, IntoParams)]
#[into_params(parameter_in = Query)]
pub struct ListDocumentsQuery {
    #[serde(default = "default_limit")]
    #[validate(range(min = 1, max = 100))]
    pub limit: i64,
    #[serde(default)]
    #[validate(range(min = 0))]
    pub offset: i64,
}

fn default_limit() -> i64 {
    50
}

fn multipart_error(e: MultipartError) -> AppError {
    if e.status() == StatusCode::PAYLOAD_TOO_LARGE {
        AppError::PayloadTooLarge(format!("Upload exceeds the request size limit: {}", e))
    } else {
        AppError::Validation(format!("Failed to read multipart: {}", e))
    }
}

/// Read the `file` and `documentType` fields. Exactly one file is accepted.
async fn read_upload(mut multipart: Multipart) -> Result<UploadedFile, AppError> {
    let mut file: Option<(String, String, Vec<u8>)> = None;
    let mut document_type: Option<String> = None;

    while let Some(field) = multipart.next_field().await.map_err(multipart_error)? {
        let name = field.name().unwrap_or_default().to_string();
        match name.as_str() {
            "file" => {
                if file.is_some() {
                    return Err(AppError::Validation(
                        "Multiple file fields are not allowed; send exactly one field named 'file'"
                            .to_string(),
                    ));
                }
                let filename = field.file_name().unwrap_or("upload").to_string();
                let content_type = field
                    .content_type()
                    .unwrap_or("application/octet-stream")
                    .to_string();
                let data = field.bytes().await.map_err(multipart_error)?;
                file = Some((filename, content_type, data.to_vec()));
            }
            "documentType" => {
                document_type = Some(field.text().await.map_err(multipart_error)?);
            }
            _ => {}
        }
    }

    let (filename, content_type, data) =
        file.ok_or_else(|| AppError::Validation("No file provided".to_string()))?;
    let declared_type = document_type
        .ok_or_else(|| AppError::Validation("documentType is required".to_string()))?
        .trim()
        .parse::<DocumentType>()?;

    Ok(UploadedFile::new(filename, content_type, declared_type, data))
}

/// Upload a document, extract its text and classify it.
///
/// On success a provisional record is created and awaits confirmation.
#[utoipa::path(
    post,
    path = "/documents/process",
    tag = "documents",
    request_body(content = inline(Object), content_type = "multipart/form-data",
        description = "Fields: `file` (jpeg, png, gif, pdf or plain text, up to 10 MiB) and `documentType`"),
    responses(
        (status = 200, description = "Provisional record created", body = ApiResponse<ProcessDocumentResponse>),
        (status = 400, description = "Invalid upload", body = ErrorResponse),
        (status = 401, description = "Missing or invalid token", body = ErrorResponse),
        (status = 413, description = "File too large", body = ErrorResponse),
        (status = 422, description = "No text could be extracted", body = ErrorResponse),
        (status = 504, description = "Processing deadline exceeded", body = ErrorResponse)
    ),
    security(("bearer_auth" = []))
)]
pub async fn process_document(
    State(state): State<Arc<AppState>>,
    user: UserContext,
    multipart: Multipart,
) -> Result<Json<ApiResponse<ProcessDocumentResponse>>, HttpAppError> {
    let file = read_upload(multipart).await?;
    let progress = TracingProgress {
        upload_id: Uuid::new_v4(),
    };

    let outcome = state
        .orchestrator
        .process(
            user.user_id,
            file,
            state.orchestrator.deadline(),
            &progress,
        )
        .await?;

    Ok(ApiResponse::ok(outcome.into()))
}

/// Confirm a provisional record, optionally adopting the AI classification.
#[utoipa::path(
    post,
    path = "/documents/confirm",
    tag = "documents",
    request_body = ConfirmDocumentRequest,
    responses(
        (status = 200, description = "Document stored", body = ApiResponse<DocumentResponse>),
        (status = 400, description = "Invalid request", body = ErrorResponse),
        (status = 404, description = "Record not found", body = ErrorResponse),
        (status = 409, description = "Record already finalized", body = ErrorResponse)
    ),
    security(("bearer_auth" = []))
)]
pub async fn confirm_document(
    State(state): State<Arc<AppState>>,
    user: UserContext,
    ValidatedJson(request): ValidatedJson<ConfirmDocumentRequest>,
) -> Result<Json<ApiResponse<DocumentResponse>>, HttpAppError> {
    let document = state
        .confirmation
        .confirm(
            user.user_id,
            request.record_id,
            request.document_type,
            request.use_ai_classification,
        )
        .await?;

    Ok(ApiResponse::ok(document.into()))
}

/// Discard a provisional record and its stored file.
#[utoipa::path(
    post,
    path = "/documents/reject",
    tag = "documents",
    request_body = RejectDocumentRequest,
    responses(
        (status = 200, description = "Record rejected", body = SuccessResponse),
        (status = 404, description = "Record not found", body = ErrorResponse),
        (status = 409, description = "Record already finalized", body = ErrorResponse)
    ),
    security(("bearer_auth" = []))
)]
pub async fn reject_document(
    State(state): State<Arc<AppState>>,
    user: UserContext,
    ValidatedJson(request): ValidatedJson<RejectDocumentRequest>,
) -> Result<Json<SuccessResponse>, HttpAppError> {
    state
        .confirmation
        .reject(user.user_id, request.record_id)
        .await?;

    Ok(Json(SuccessResponse { success: true }))
}

#[utoipa::path(
    get,
    path = "/documents",
    tag = "documents",
    params(ListDocumentsQuery),
    responses(
        (status = 200, description = "Confirmed documents, newest first", body = ApiResponse<Vec<DocumentResponse>>),
        (status = 400, description = "Invalid pagination", body = ErrorResponse)
    ),
    security(("bearer_auth" = []))
)]
pub async fn list_documents(
    State(state): State<Arc<AppState>>,
    user: UserContext,
    Query(query): Query<ListDocumentsQuery>,
) -> Result<Json<ApiResponse<Vec<DocumentResponse>>>, HttpAppError> {
    query.validate()?;

    let documents = state
        .documents
        .list_for_user(user.user_id, query.limit, query.offset)
        .await?;

    Ok(ApiResponse::ok(
        documents.into_iter().map(DocumentResponse::from).collect(),
    ))
}

#[utoipa::path(
    get,
    path = "/documents/{id}",
    tag = "documents",
    params(("id" = Uuid, Path, description = "Document ID")),
    responses(
        (status = 200, description = "Confirmed document", body = ApiResponse<DocumentResponse>),
        (status = 404, description = "Document not found", body = ErrorResponse)
    ),
    security(("bearer_auth" = []))
)]
pub async fn get_document(
    State(state): State<Arc<AppState>>,
    user: UserContext,
    Path(id): Path<Uuid>,
) -> Result<Json<ApiResponse<DocumentResponse>>, HttpAppError> {
    let document = state
        .documents
        .get_for_user(user.user_id, id)
        .await?
        .ok_or_else(|| AppError::NotFound(format!("Document {} not found", id)))?;

    Ok(ApiResponse::ok(document.into()))
}

/// Original file of a confirmed document.
#[utoipa::path(
    get,
    path = "/documents/{id}/file",
    tag = "documents",
    params(("id" = Uuid, Path, description = "Document ID")),
    responses(
        (status = 200, description = "Document file", content_type = "application/octet-stream"),
        (status = 404, description = "Document or file not found", body = ErrorResponse)
    ),
    security(("bearer_auth" = []))
)]
#[tracing::instrument(skip(state, user), fields(user_id = %user.user_id, document_id = %id))]
pub async fn download_document(
    State(state): State<Arc<AppState>>,
    user: UserContext,
    Path(id): Path<Uuid>,
) -> Result<Response<Body>, HttpAppError> {
    let document = state
        .documents
        .get_for_user(user.user_id, id)
        .await?
        .ok_or_else(|| AppError::NotFound(format!("Document {} not found", id)))?;

    let data = state
        .storage
        .download(&document.storage_key)
        .await
        .map_err(AppError::from)?;

    let content_disposition = format!(
        "attachment; filename=\"{}\"",
        document.filename.replace(['"', '\\', '\r', '\n'], "_")
    );

    Response::builder()
        .status(StatusCode::OK)
        .header(header::CONTENT_TYPE, document.content_type.as_str())
        .header(header::CONTENT_DISPOSITION, content_disposition)
        .header(header::CACHE_CONTROL, "private, no-store")
        .body(Body::from(data))
        .map_err(|e| HttpAppError(AppError::Internal(format!("Failed to build response: {}", e))))
}

/// The caller's provisional record, in any state.
#[utoipa::path(
    get,
    path = "/documents/records/{record_id}",
    tag = "documents",
    params(("record_id" = Uuid, Path, description = "Provisional record ID")),
    responses(
        (status = 200, description = "Provisional record", body = ApiResponse<ProvisionalRecordResponse>),
        (status = 404, description = "Record not found", body = ErrorResponse)
    ),
    security(("bearer_auth" = []))
)]
pub async fn get_record(
    State(state): State<Arc<AppState>>,
    user: UserContext,
    Path(record_id): Path<Uuid>,
) -> Result<Json<ApiResponse<ProvisionalRecordResponse>>, HttpAppError> {
    let record = state
        .confirmation
        .get_record(user.user_id, record_id)
        .await?;

    Ok(ApiResponse::ok(record.into()))
}
