//! Readiness endpoint

use axum::{Json, Router, extract::State, http::StatusCode, routing::get};
use axum_helpers::{HealthCheckFuture, run_health_checks};
use database::{DatabaseError, mongodb::check_health_detailed};
use serde_json::Value;

use crate::state::AppState;

async fn ready(State(state): State<AppState>) -> (StatusCode, Json<Value>) {
    let database = state.config.mongodb.database();

    let checks: Vec<(&str, HealthCheckFuture)> = vec![(
        "database",
        Box::pin(async {
            let status = check_health_detailed(&state.mongo_client, database).await;
            if status.healthy {
                Ok(())
            } else {
                let message = status.message.unwrap_or_default();
                Err(DatabaseError::HealthCheckFailed(message).to_string())
            }
        }),
    )];

    run_health_checks(checks).await
}

/// `GET /ready` pings MongoDB and answers `503` when it is unreachable.
pub fn router(state: AppState) -> Router {
    Router::new()
        .route("/ready", get(ready))
        .with_state(state)
}
