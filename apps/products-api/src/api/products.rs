//! Products API routes

use axum::{Router, middleware};
use axum_helpers::optional_jwt_auth_middleware;
use domain_products::{MongoProductRepository, ProductService, handlers};

use crate::state::AppState;

/// Product routes; tokens are verified when present so that the
/// authenticated handlers can read the caller's claims.
pub fn router(state: &AppState) -> Router {
    let repository = MongoProductRepository::new(&state.db);
    let service = ProductService::new(repository).with_page_size(state.config.products_per_page);

    handlers::router(service).layer(middleware::from_fn_with_state(
        state.jwt_auth.clone(),
        optional_jwt_auth_middleware,
    ))
}

/// Initialize products indexes
pub async fn init_indexes(state: &AppState) -> eyre::Result<()> {
    let repository = MongoProductRepository::new(&state.db);
    repository.init_indexes().await?;
    Ok(())
}
