//! Custom extractors for Axum handlers.
//!
//! Every rejection is an [`AppError`](crate::errors::AppError), so bad input
//! renders the same envelope as domain failures.

pub mod auth_user;
pub mod uuid_path;
pub mod validated_json;

pub use auth_user::AuthUser;
pub use uuid_path::{UuidPath, parse_uuid};
pub use validated_json::ValidatedJson;
