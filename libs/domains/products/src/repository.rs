use async_trait::async_trait;
use uuid::Uuid;

use crate::error::ProductResult;
use crate::models::{CreateProduct, Product, ProductQuery, Review, UpdateProduct};
use crate::rating::RatingSummary;

/// Repository trait for Product persistence
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait ProductRepository: Send + Sync {
    /// Insert a new product owned by `user`
    async fn create(&self, user: Uuid, input: CreateProduct) -> ProductResult<Product>;

    async fn get_by_id(&self, id: Uuid) -> ProductResult<Option<Product>>;

    /// One page of products matching `query`
    async fn list(&self, query: ProductQuery, limit: i64, skip: u64)
    -> ProductResult<Vec<Product>>;

    /// Products matching `query`, ignoring pagination
    async fn count(&self, query: ProductQuery) -> ProductResult<u64>;

    /// Every product in the collection
    async fn count_all(&self) -> ProductResult<u64>;

    /// Merge `input` into the stored product; `NotFound` if absent
    async fn update(&self, id: Uuid, input: UpdateProduct) -> ProductResult<Product>;

    /// Remove the product and its embedded reviews; `NotFound` if absent
    async fn delete(&self, id: Uuid) -> ProductResult<()>;

    /// Replace the review list and derived rating fields together
    async fn save_reviews(
        &self,
        id: Uuid,
        reviews: Vec<Review>,
        summary: RatingSummary,
    ) -> ProductResult<Product>;
}
