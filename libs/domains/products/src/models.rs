use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use utoipa::{IntoParams, ToSchema};
use uuid::Uuid;
use validator::{Validate, ValidationError};

use crate::rating::{RatingSummary, recompute};

/// Page size used when `PRODUCTS_PER_PAGE` is not configured.
pub const DEFAULT_PAGE_SIZE: u64 = 5;

/// Hosted product image
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct ProductImage {
    /// Identifier at the image host, used for deletion
    pub public_id: String,
    pub url: String,
}

/// A user's review, embedded in its product
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, ToSchema)]
pub struct Review {
    #[serde(rename = "_id", alias = "id")]
    pub id: Uuid,
    /// Author; a product holds at most one review per user
    pub user: Uuid,
    /// Author display name at the time of writing
    pub name: String,
    pub rating: f64,
    pub comment: String,
}

/// Product entity - one document in the `products` collection
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct Product {
    #[serde(rename = "_id", alias = "id")]
    pub id: Uuid,
    pub name: String,
    pub description: String,
    pub price: f64,
    pub category: String,
    pub stock: i32,
    #[serde(default)]
    pub images: Vec<ProductImage>,
    /// User who created the product
    pub user: Uuid,
    /// Mean of `reviews[].rating`, 0 without reviews
    #[serde(default)]
    pub ratings: f64,
    /// Always `reviews.len()`
    #[serde(default)]
    pub num_of_reviews: i32,
    #[serde(default)]
    pub reviews: Vec<Review>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// DTO for creating a new product.
///
/// Rating fields and reviews are absent: they are derived, never written.
#[derive(Debug, Clone, Deserialize, Validate, ToSchema)]
pub struct CreateProduct {
    #[validate(custom(function = "validate_name"))]
    pub name: String,
    #[validate(length(min = 1))]
    pub description: String,
    #[validate(range(min = 0.0))]
    pub price: f64,
    #[validate(length(min = 1, max = 100))]
    pub category: String,
    #[validate(range(min = 0, max = 9999))]
    #[serde(default = "default_stock")]
    pub stock: i32,
    #[serde(default)]
    pub images: Vec<ProductImage>,
}

/// DTO for a partial product update
#[derive(Debug, Clone, Default, Deserialize, Validate, ToSchema)]
pub struct UpdateProduct {
    #[validate(custom(function = "validate_name"))]
    pub name: Option<String>,
    #[validate(length(min = 1))]
    pub description: Option<String>,
    #[validate(range(min = 0.0))]
    pub price: Option<f64>,
    #[validate(length(min = 1, max = 100))]
    pub category: Option<String>,
    #[validate(range(min = 0, max = 9999))]
    pub stock: Option<i32>,
    pub images: Option<Vec<ProductImage>>,
}

/// Body of `PUT /{id}/reviews`
#[derive(Debug, Clone, Deserialize, Validate, ToSchema)]
pub struct CreateReview {
    #[validate(range(min = 0.0, max = 5.0))]
    pub rating: f64,
    #[validate(length(min = 1, max = 2000))]
    pub comment: String,
}

/// Identity of the user on whose behalf a service call runs
#[derive(Debug, Clone, PartialEq)]
pub struct Actor {
    pub id: Uuid,
    pub name: String,
    pub is_admin: bool,
}

/// Bounds of a numeric range filter; unset bounds are ignored
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct NumericRange {
    pub gt: Option<f64>,
    pub gte: Option<f64>,
    pub lt: Option<f64>,
    pub lte: Option<f64>,
}

impl NumericRange {
    pub fn is_empty(&self) -> bool {
        self.gt.is_none() && self.gte.is_none() && self.lt.is_none() && self.lte.is_none()
    }
}

/// Query string of `GET /api/products`.
///
/// `?keyword=phone&category=Laptop&price[gte]=100&price[lt]=500&page=2`
#[derive(Debug, Clone, Default, Deserialize, IntoParams)]
#[into_params(parameter_in = Query)]
pub struct ProductQuery {
    /// Case-insensitive substring of the product name
    pub keyword: Option<String>,
    /// Exact category
    pub category: Option<String>,
    #[serde(rename = "price[gt]")]
    pub price_gt: Option<f64>,
    #[serde(rename = "price[gte]")]
    pub price_gte: Option<f64>,
    #[serde(rename = "price[lt]")]
    pub price_lt: Option<f64>,
    #[serde(rename = "price[lte]")]
    pub price_lte: Option<f64>,
    #[serde(rename = "ratings[gt]")]
    pub ratings_gt: Option<f64>,
    #[serde(rename = "ratings[gte]")]
    pub ratings_gte: Option<f64>,
    #[serde(rename = "ratings[lt]")]
    pub ratings_lt: Option<f64>,
    #[serde(rename = "ratings[lte]")]
    pub ratings_lte: Option<f64>,
    /// 1-based page number; 0 and absent both mean the first page
    pub page: Option<u64>,
}

impl ProductQuery {
    pub fn price_range(&self) -> NumericRange {
        NumericRange {
            gt: self.price_gt,
            gte: self.price_gte,
            lt: self.price_lt,
            lte: self.price_lte,
        }
    }

    pub fn ratings_range(&self) -> NumericRange {
        NumericRange {
            gt: self.ratings_gt,
            gte: self.ratings_gte,
            lt: self.ratings_lt,
            lte: self.ratings_lte,
        }
    }

    /// Documents to skip for the requested page, or `None` when the page
    /// lies beyond what MongoDB can skip (`i64::MAX` documents).
    pub fn skip(&self, page_size: u64) -> Option<u64> {
        self.page
            .unwrap_or(1)
            .max(1)
            .saturating_sub(1)
            .checked_mul(page_size)
            .filter(|skip| i64::try_from(*skip).is_ok())
    }
}

/// One page of list results with its counts
#[derive(Debug, Clone)]
pub struct ProductPage {
    pub products: Vec<Product>,
    /// Every product in the collection
    pub products_count: u64,
    /// Products matching the filters, across all pages
    pub filtered_products_count: u64,
    pub result_per_page: u64,
}

// Response envelopes. Every success body carries `success: true`.

#[derive(Debug, Serialize, ToSchema)]
pub struct ProductResponse {
    pub success: bool,
    pub product: Product,
}

impl ProductResponse {
    pub fn new(product: Product) -> Self {
        Self {
            success: true,
            product,
        }
    }
}

#[derive(Debug, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct ProductListResponse {
    pub success: bool,
    pub products: Vec<Product>,
    pub products_count: u64,
    pub filtered_products_count: u64,
    pub result_per_page: u64,
}

impl From<ProductPage> for ProductListResponse {
    fn from(page: ProductPage) -> Self {
        Self {
            success: true,
            products: page.products,
            products_count: page.products_count,
            filtered_products_count: page.filtered_products_count,
            result_per_page: page.result_per_page,
        }
    }
}

#[derive(Debug, Serialize, ToSchema)]
pub struct ReviewsResponse {
    pub success: bool,
    pub reviews: Vec<Review>,
}

#[derive(Debug, Serialize, ToSchema)]
pub struct MessageResponse {
    pub success: bool,
    pub message: String,
}

#[derive(Debug, Serialize, ToSchema)]
pub struct SuccessResponse {
    pub success: bool,
}

impl SuccessResponse {
    pub fn ok() -> Self {
        Self { success: true }
    }
}

fn default_stock() -> i32 {
    1
}

/// Product names are stored trimmed, so the length bounds apply after trimming.
fn validate_name(name: &str) -> Result<(), ValidationError> {
    let len = name.trim().chars().count();
    if (1..=200).contains(&len) {
        Ok(())
    } else {
        Err(ValidationError::new("length")
            .with_message("name must be 1 to 200 characters after trimming".into()))
    }
}

impl Product {
    pub fn new(user: Uuid, input: CreateProduct) -> Self {
        let now = Utc::now();
        Self {
            id: Uuid::now_v7(),
            name: input.name.trim().to_string(),
            description: input.description,
            price: input.price,
            category: input.category,
            stock: input.stock,
            images: input.images,
            user,
            ratings: 0.0,
            num_of_reviews: 0,
            reviews: Vec::new(),
            created_at: now,
            updated_at: now,
        }
    }

    /// Merge the fields present in `update`; rating fields are untouched.
    pub fn apply_update(&mut self, update: UpdateProduct) {
        if let Some(name) = update.name {
            self.name = name.trim().to_string();
        }
        if let Some(description) = update.description {
            self.description = description;
        }
        if let Some(price) = update.price {
            self.price = price;
        }
        if let Some(category) = update.category {
            self.category = category;
        }
        if let Some(stock) = update.stock {
            self.stock = stock;
        }
        if let Some(images) = update.images {
            self.images = images;
        }
        self.updated_at = Utc::now();
    }

    /// Overwrite the actor's existing review in place, or append a new one.
    pub fn upsert_review(&mut self, actor: &Actor, input: CreateReview) -> RatingSummary {
        match self.reviews.iter_mut().find(|r| r.user == actor.id) {
            Some(existing) => {
                existing.rating = input.rating;
                existing.comment = input.comment;
            }
            None => self.reviews.push(Review {
                id: Uuid::now_v7(),
                user: actor.id,
                name: actor.name.clone(),
                rating: input.rating,
                comment: input.comment,
            }),
        }

        self.refresh_rating()
    }

    /// Drop the review with `review_id`. An unknown id leaves the reviews as they are.
    pub fn remove_review(&mut self, review_id: Uuid) -> RatingSummary {
        self.reviews.retain(|r| r.id != review_id);
        self.refresh_rating()
    }

    fn refresh_rating(&mut self) -> RatingSummary {
        let summary = recompute(&self.reviews);
        self.ratings = summary.ratings;
        self.num_of_reviews = summary.num_of_reviews;
        self.updated_at = Utc::now();
        summary
    }
}
