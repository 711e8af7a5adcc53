//! HTTP error envelope
//!
//! `IntoResponse` for `AppError` lives in docvault-api (orphan rule); this
//! crate only owns the wire shape.

use serde::Serialize;
use utoipa::ToSchema;

/// `{ success: false, message, code, recoverable, suggestedAction }`
#[derive(Debug, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct ErrorResponse {
    pub success: bool,
    pub message: String,
    pub code: String,
    pub recoverable: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub suggested_action: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub details: Option<String>,
}

impl ErrorResponse {
    pub fn new(message: impl Into<String>, code: impl Into<String>) -> Self {
        Self {
            success: false,
            message: message.into(),
            code: code.into(),
            recoverable: false,
            suggested_action: None,
            details: None,
        }
    }
}
