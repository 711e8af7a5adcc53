use axum::extract::FromRequestParts;
use axum::http::request::Parts;
use docvault_core::AppError;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::error::HttpAppError;

/// JWT claims structure
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct JwtClaims {
    pub sub: Uuid, // user_id
    pub exp: i64,
    pub iat: i64,
}

/// Authenticated caller, inserted into request extensions by the auth middleware.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct UserContext {
    pub user_id: Uuid,
}

// Read from request parts so it can be combined with `Multipart`
impl<S> FromRequestParts<S> for UserContext
where
    S: Send + Sync,
{
    type Rejection = HttpAppError;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        parts
            .extensions
            .get::<UserContext>()
            .copied()
            .ok_or_else(|| HttpAppError(AppError::Unauthorized("Missing user context".to_string())))
    }
}
