//! Docvault API Library
//!
//! HTTP handlers, authentication and application setup for the document
//! intake service.

mod api_doc;
mod handlers;
pub mod setup;

pub mod auth;
pub mod error;
pub mod state;

pub use docvault_infra::ErrorResponse;
pub use error::{HttpAppError, ValidatedJson};
