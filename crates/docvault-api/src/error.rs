//! HTTP error response conversion
//!
//! Handlers return `Result<impl IntoResponse, HttpAppError>`; anything that
//! converts into [`AppError`] can be propagated with `?` and renders as the
//! `{ success: false, message, code, recoverable, suggestedAction }` envelope.

use axum::{
    extract::rejection::JsonRejection,
    extract::{FromRequest, Request},
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use docvault_core::{AppError, ErrorMetadata, LogLevel};
use docvault_infra::ErrorResponse;
use serde::de::DeserializeOwned;

/// Wrapper so `IntoResponse` can be implemented for the core error type
/// (orphan rule).
#[derive(Debug)]
pub struct HttpAppError(pub AppError);

impl From<AppError> for HttpAppError {
    fn from(err: AppError) -> Self {
        HttpAppError(err)
    }
}

impl From<anyhow::Error> for HttpAppError {
    fn from(err: anyhow::Error) -> Self {
        HttpAppError(AppError::InternalWithSource {
            message: err.to_string(),
            source: err,
        })
    }
}

impl From<validator::ValidationErrors> for HttpAppError {
    fn from(err: validator::ValidationErrors) -> Self {
        HttpAppError(AppError::from(err))
    }
}

/// JSON body deserialization failures become a 400 in the usual envelope.
impl From<JsonRejection> for HttpAppError {
    fn from(rejection: JsonRejection) -> Self {
        let body_text = rejection.body_text();
        let message = if body_text.contains("expected a formatted UUID") {
            "Invalid request body: recordId must be a UUID string".to_string()
        } else if body_text.contains("unknown variant") {
            format!("Invalid request body: unsupported documentType ({})", body_text)
        } else {
            format!("Invalid request body: {}", body_text)
        };
        HttpAppError(AppError::Validation(message))
    }
}

/// `Json<T>` with rejections rendered as [`HttpAppError`].
#[derive(Debug, Clone, Copy)]
pub struct ValidatedJson<T>(pub T);

impl<T, S> FromRequest<S> for ValidatedJson<T>
where
    T: DeserializeOwned + Send,
    S: Send + Sync,
    Json<T>: FromRequest<S, Rejection = JsonRejection>,
{
    type Rejection = HttpAppError;

    async fn from_request(req: Request, state: &S) -> Result<Self, Self::Rejection> {
        let Json(inner) = Json::<T>::from_request(req, state)
            .await
            .map_err(HttpAppError::from)?;
        Ok(ValidatedJson(inner))
    }
}

fn log_error(error: &AppError) {
    let error_type = error.error_type();
    match error.log_level() {
        LogLevel::Debug => {
            tracing::debug!(error = %error, error_type = error_type, "Request failed");
        }
        LogLevel::Warn => {
            tracing::warn!(error = %error, error_type = error_type, "Request failed");
        }
        LogLevel::Error => {
            tracing::error!(error = %error, error_type = error_type, "Request failed");
        }
    }
}

fn is_production_env() -> bool {
    std::env::var("ENVIRONMENT")
        .or_else(|_| std::env::var("APP_ENV"))
        .map(|env| env.to_lowercase() == "production" || env.to_lowercase() == "prod")
        .unwrap_or(false)
}

/// Envelope for `error`, with details only outside production and only for
/// non-sensitive errors.
pub fn error_body(error: &AppError, is_production: bool) -> ErrorResponse {
    ErrorResponse {
        success: false,
        message: error.client_message(),
        code: error.error_code().to_string(),
        recoverable: error.is_recoverable(),
        suggested_action: error.suggested_action().map(String::from),
        details: if is_production || error.is_sensitive() {
            None
        } else {
            Some(error.detailed_message())
        },
    }
}

impl IntoResponse for HttpAppError {
    fn into_response(self) -> Response {
        let app_error = &self.0;

        let status = StatusCode::from_u16(app_error.http_status_code())
            .unwrap_or(StatusCode::INTERNAL_SERVER_ERROR);

        log_error(app_error);

        (status, Json(error_body(app_error, is_production_env()))).into_response()
    }
}
