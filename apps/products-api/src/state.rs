//! Application state management

use axum_helpers::JwtAuth;
use mongodb::{Client, Database};

use crate::config::Config;

/// Shared application state
#[derive(Clone)]
pub struct AppState {
    pub config: Config,
    pub mongo_client: Client,
    pub db: Database,
    pub jwt_auth: JwtAuth,
}

impl AppState {
    pub fn new(config: Config, mongo_client: Client) -> Self {
        let db = mongo_client.database(config.mongodb.database());
        let jwt_auth = JwtAuth::new(&config.jwt);
        Self {
            config,
            mongo_client,
            db,
            jwt_auth,
        }
    }
}
