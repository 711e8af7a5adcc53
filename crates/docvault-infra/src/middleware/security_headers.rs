use axum::extract::State;
use axum::http::HeaderValue;
use axum::{extract::Request, middleware::Next, response::Response};

/// Headers for a JSON-only API. The flag enables HSTS and is meant to be
/// set in production, where TLS terminates in front of the service.
pub async fn security_headers_middleware(
    State(hsts): State<bool>,
    request: Request,
    next: Next,
) -> Response {
    let mut response = next.run(request).await;
    let headers = response.headers_mut();

    headers.insert(
        "X-Content-Type-Options",
        HeaderValue::from_static("nosniff"),
    );
    headers.insert("X-Frame-Options", HeaderValue::from_static("DENY"));
    headers.insert("Referrer-Policy", HeaderValue::from_static("no-referrer"));
    headers.insert(
        "Content-Security-Policy",
        HeaderValue::from_static("default-src 'none'; frame-ancestors 'none'"),
    );
    headers.insert("Cache-Control", HeaderValue::from_static("no-store"));

    if hsts {
        headers.insert(
            "Strict-Transport-Security",
            HeaderValue::from_static("max-age=31536000; includeSubDomains"),
        );
    }

    response
}
