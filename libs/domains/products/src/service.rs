//! Product Service - Business logic layer

use std::sync::Arc;
use tracing::instrument;
use uuid::Uuid;
use validator::Validate;

use crate::error::{ProductError, ProductResult};
use crate::models::{
    Actor, CreateProduct, CreateReview, DEFAULT_PAGE_SIZE, Product, ProductPage, ProductQuery,
    Review, UpdateProduct,
};
use crate::repository::ProductRepository;

/// Product and review operations.
///
/// Every mutating call takes the acting user explicitly; the service never
/// reads request state.
pub struct ProductService<R: ProductRepository> {
    repository: Arc<R>,
    page_size: u64,
}

fn ensure_admin(actor: &Actor) -> ProductResult<()> {
    if actor.is_admin {
        Ok(())
    } else {
        Err(ProductError::Forbidden(
            "Only administrators can manage products".to_string(),
        ))
    }
}

impl<R: ProductRepository> ProductService<R> {
    pub fn new(repository: R) -> Self {
        Self {
            repository: Arc::new(repository),
            page_size: DEFAULT_PAGE_SIZE,
        }
    }

    /// Products per list page; values below 1 are raised to 1.
    pub fn with_page_size(mut self, page_size: u64) -> Self {
        self.page_size = page_size.max(1);
        self
    }

    pub fn page_size(&self) -> u64 {
        self.page_size
    }

    #[instrument(
        skip(self, actor, input),
        fields(actor_id = %actor.id, product_name = %input.name)
    )]
    pub async fn create_product(
        &self,
        actor: &Actor,
        input: CreateProduct,
    ) -> ProductResult<Product> {
        ensure_admin(actor)?;
        input.validate()?;

        self.repository.create(actor.id, input).await
    }

    /// One page of filtered products plus total and filtered counts.
    #[instrument(skip(self))]
    pub async fn list_products(&self, query: ProductQuery) -> ProductResult<ProductPage> {
        let skip = query
            .skip(self.page_size)
            .ok_or_else(|| ProductError::Validation("page is out of range".to_string()))?;
        let limit = i64::try_from(self.page_size).unwrap_or(i64::MAX);

        let (products_count, filtered_products_count, products) = tokio::try_join!(
            self.repository.count_all(),
            self.repository.count(query.clone()),
            self.repository.list(query, limit, skip),
        )?;

        Ok(ProductPage {
            products,
            products_count,
            filtered_products_count,
            result_per_page: self.page_size,
        })
    }

    #[instrument(skip(self))]
    pub async fn get_product(&self, id: Uuid) -> ProductResult<Product> {
        self.repository
            .get_by_id(id)
            .await?
            .ok_or(ProductError::NotFound(id))
    }

    #[instrument(skip(self, actor, input), fields(actor_id = %actor.id))]
    pub async fn update_product(
        &self,
        actor: &Actor,
        id: Uuid,
        input: UpdateProduct,
    ) -> ProductResult<Product> {
        ensure_admin(actor)?;
        input.validate()?;

        self.repository.update(id, input).await
    }

    #[instrument(skip(self, actor), fields(actor_id = %actor.id))]
    pub async fn delete_product(&self, actor: &Actor, id: Uuid) -> ProductResult<()> {
        ensure_admin(actor)?;

        self.repository.delete(id).await
    }

    /// Add the actor's review, or overwrite it if they already reviewed.
    #[instrument(skip(self, actor, input), fields(actor_id = %actor.id, rating = input.rating))]
    pub async fn upsert_review(
        &self,
        actor: &Actor,
        id: Uuid,
        input: CreateReview,
    ) -> ProductResult<Product> {
        input.validate()?;

        let mut product = self.get_product(id).await?;
        let summary = product.upsert_review(actor, input);

        self.repository
            .save_reviews(id, product.reviews, summary)
            .await
    }

    #[instrument(skip(self))]
    pub async fn list_reviews(&self, id: Uuid) -> ProductResult<Vec<Review>> {
        Ok(self.get_product(id).await?.reviews)
    }

    /// Remove one review; an unknown `review_id` still rewrites the
    /// (unchanged) reviews and rating.
    #[instrument(skip(self, actor), fields(actor_id = %actor.id))]
    pub async fn delete_review(
        &self,
        actor: &Actor,
        id: Uuid,
        review_id: Uuid,
    ) -> ProductResult<Product> {
        let mut product = self.get_product(id).await?;
        let summary = product.remove_review(review_id);

        self.repository
            .save_reviews(id, product.reviews, summary)
            .await
    }
}

impl<R: ProductRepository> Clone for ProductService<R> {
    fn clone(&self) -> Self {
        Self {
            repository: Arc::clone(&self.repository),
            page_size: self.page_size,
        }
    }
}
