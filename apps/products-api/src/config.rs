//! Configuration for Products API

use axum_helpers::JwtConfig;
use core_config::{AppInfo, ConfigError, FromEnv, app_info, env_parse, server::ServerConfig};
use database::mongodb::MongoConfig;
use domain_products::DEFAULT_PAGE_SIZE;

pub use core_config::Environment;

/// Application configuration
#[derive(Clone, Debug)]
pub struct Config {
    pub app: AppInfo,
    pub mongodb: MongoConfig,
    pub server: ServerConfig,
    pub environment: Environment,
    pub jwt: JwtConfig,
    /// `PRODUCTS_PER_PAGE`, at least 1
    pub products_per_page: u64,
}

fn products_per_page() -> Result<u64, ConfigError> {
    let value: u64 = env_parse("PRODUCTS_PER_PAGE", &DEFAULT_PAGE_SIZE.to_string())?;
    if value == 0 {
        return Err(ConfigError::ParseError {
            key: "PRODUCTS_PER_PAGE".to_string(),
            details: "must be at least 1".to_string(),
        });
    }
    Ok(value)
}

impl Config {
    pub fn from_env() -> eyre::Result<Self> {
        Ok(Self {
            app: app_info!(),
            mongodb: MongoConfig::from_env()?.with_app_name(env!("CARGO_PKG_NAME")),
            server: ServerConfig::from_env()?,
            environment: Environment::from_env(),
            jwt: JwtConfig::from_env()?,
            products_per_page: products_per_page()?,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const SECRET: &str = "a-test-secret-that-is-at-least-32-bytes";

    fn with_base_env<F: FnOnce()>(per_page: Option<&str>, f: F) {
        temp_env::with_vars(
            [
                ("MONGODB_URL", Some("mongodb://localhost:27017")),
                ("MONGODB_DATABASE", Some("shop")),
                ("JWT_SECRET", Some(SECRET)),
                ("PRODUCTS_PER_PAGE", per_page),
            ],
            f,
        );
    }

    #[test]
    fn test_config_defaults_page_size() {
        with_base_env(None, || {
            let config = Config::from_env().unwrap();
            assert_eq!(config.products_per_page, DEFAULT_PAGE_SIZE);
            assert_eq!(config.mongodb.database(), "shop");
            assert_eq!(config.mongodb.app_name.as_deref(), Some("products_api"));
        });
    }

    #[test]
    fn test_config_custom_page_size() {
        with_base_env(Some("12"), || {
            assert_eq!(Config::from_env().unwrap().products_per_page, 12);
        });
    }

    #[test]
    fn test_config_rejects_zero_page_size() {
        with_base_env(Some("0"), || {
            let err = Config::from_env().unwrap_err();
            assert!(err.to_string().contains("PRODUCTS_PER_PAGE"));
        });
    }

    #[test]
    fn test_config_requires_jwt_secret() {
        temp_env::with_vars(
            [
                ("MONGODB_URL", Some("mongodb://localhost:27017")),
                ("MONGODB_DATABASE", Some("shop")),
                ("JWT_SECRET", None::<&str>),
            ],
            || {
                let err = Config::from_env().unwrap_err();
                assert!(err.to_string().contains("JWT_SECRET"));
            },
        );
    }
}
