//! HTTP middleware shared by every API router.

pub mod security;

pub use security::security_headers;
