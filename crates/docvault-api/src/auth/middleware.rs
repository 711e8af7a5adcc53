use std::sync::Arc;

use axum::{
    extract::{Request, State},
    http::header::AUTHORIZATION,
    middleware::Next,
    response::{IntoResponse, Response},
};
use docvault_core::AppError;

use super::jwt::JwtKeys;
use super::models::UserContext;
use crate::error::HttpAppError;

fn unauthorized(message: &str) -> Response {
    HttpAppError(AppError::Unauthorized(message.to_string())).into_response()
}

/// Require `Authorization: Bearer <jwt>` and attach the caller's [`UserContext`].
pub async fn auth_middleware(
    State(keys): State<Arc<JwtKeys>>,
    mut request: Request,
    next: Next,
) -> Response {
    let auth_header = match request
        .headers()
        .get(AUTHORIZATION)
        .and_then(|value| value.to_str().ok())
    {
        Some(header) => header,
        None => return unauthorized("Missing authorization header"),
    };

    let token = match auth_header.strip_prefix("Bearer ") {
        Some(token) if !token.trim().is_empty() => token.trim(),
        _ => return unauthorized("Invalid authorization header format"),
    };

    let claims = match keys.verify(token) {
        Ok(claims) => claims,
        Err(e) => return HttpAppError(e).into_response(),
    };

    tracing::debug!(user_id = %claims.sub, "Request authenticated");
    request.extensions_mut().insert(UserContext {
        user_id: claims.sub,
    });

    next.run(request).await
}
