//! Docvault Infrastructure Library
//!
//! Shared infrastructure for the docvault binaries:
//! - Middleware (request ID, security headers)
//! - Tracing initialization
//! - The JSON error envelope

pub mod error;
pub mod middleware;
pub mod telemetry;

pub use error::ErrorResponse;
pub use middleware::{
    get_request_id, request_id_middleware, security_headers_middleware, RequestId,
};
pub use telemetry::{init_telemetry, LogFormat};
