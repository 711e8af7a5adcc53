//! Bearer-token authentication
//!
//! Tokens are HS256 JWTs signed with `JWT_SECRET`; `sub` carries the user id.

pub mod jwt;
pub mod middleware;
pub mod models;

pub use jwt::JwtKeys;
pub use middleware::auth_middleware;
pub use models::{JwtClaims, UserContext};
