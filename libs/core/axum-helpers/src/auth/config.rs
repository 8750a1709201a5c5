//! JWT settings loaded through [`FromEnv`].

use core_config::{ConfigError, FromEnv, env_parse, env_required};

/// Minimum accepted length of the HS256 signing secret.
pub const MIN_SECRET_LEN: usize = 32;

/// Access token lifetime when `JWT_ACCESS_TTL_SECS` is unset.
pub const DEFAULT_ACCESS_TTL_SECS: i64 = 900;

/// Environment variables:
/// - `JWT_SECRET` (required, at least 32 characters)
/// - `JWT_ACCESS_TTL_SECS` (default 900)
#[derive(Clone, Debug)]
pub struct JwtConfig {
    pub secret: String,
    pub access_ttl_secs: i64,
}

impl JwtConfig {
    /// # Panics
    /// Panics if the secret is shorter than [`MIN_SECRET_LEN`].
    pub fn new(secret: impl Into<String>) -> Self {
        let secret = secret.into();
        assert!(
            secret.len() >= MIN_SECRET_LEN,
            "JWT secret must be at least 32 characters"
        );
        Self {
            secret,
            access_ttl_secs: DEFAULT_ACCESS_TTL_SECS,
        }
    }

    pub fn with_access_ttl(mut self, secs: i64) -> Self {
        self.access_ttl_secs = secs;
        self
    }
}

impl FromEnv for JwtConfig {
    fn from_env() -> Result<Self, ConfigError> {
        let secret = env_required("JWT_SECRET")?;

        if secret.len() < MIN_SECRET_LEN {
            return Err(ConfigError::ParseError {
                key: "JWT_SECRET".to_string(),
                details: format!(
                    "must be at least {} characters (got {}). Generate one with: openssl rand -base64 32",
                    MIN_SECRET_LEN,
                    secret.len()
                ),
            });
        }

        let access_ttl_secs = env_parse("JWT_ACCESS_TTL_SECS", "900")?;

        Ok(Self {
            secret,
            access_ttl_secs,
        })
    }
}
