//! # Axum Helpers
//!
//! Shared plumbing for the HTTP services in this workspace.
//!
//! - **[`auth`]**: stateless JWT issuing, verification and middleware
//! - **[`server`]**: router assembly, health checks, graceful shutdown
//! - **[`http`]**: security header middleware
//! - **[`errors`]**: [`AppError`] and the `{success: false, ...}` envelope
//! - **[`extractors`]**: UUID paths, validated JSON, the authenticated caller
//!
//! ```ignore
//! use axum_helpers::server::{create_production_app, create_router};
//! use core_config::server::ServerConfig;
//! use utoipa::OpenApi;
//!
//! #[derive(OpenApi)]
//! #[openapi(paths())]
//! struct ApiDoc;
//!
//! let router = create_router::<ApiDoc>(api_routes)?;
//! create_production_app(router, &ServerConfig::default(), async {}).await?;
//! ```

pub mod auth;
pub mod errors;
pub mod extractors;
pub mod http;
pub mod server;

pub use auth::{JwtAuth, JwtClaims, JwtConfig, optional_jwt_auth_middleware};

pub use server::{
    HealthCheckFuture, HealthResponse, ShutdownCoordinator, create_production_app, create_router,
    health_router, run_health_checks, shutdown_signal,
};

pub use http::security_headers;

pub use errors::{AppError, ErrorCode, ErrorResponse};

pub use extractors::{AuthUser, UuidPath, ValidatedJson, parse_uuid};
