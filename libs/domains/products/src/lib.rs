//! Products Domain
//!
//! Product catalogue with embedded customer reviews, stored in MongoDB.
//!
//! # Architecture
//!
//! ```text
//! ┌─────────────┐
//! │  Handlers   │  ← HTTP endpoints, AuthUser → Actor
//! └──────┬──────┘
//!        │
//! ┌──────▼──────┐
//! │   Service   │  ← Admin checks, validation, review upsert
//! └──────┬──────┘
//!        │
//! ┌──────▼──────┐
//! │ Repository  │  ← Data access (trait + MongoDB implementation)
//! └──────┬──────┘
//!        │
//! ┌──────▼──────┐
//! │   Models    │  ← Entities, DTOs, rating aggregate
//! └─────────────┘
//! ```
//!
//! # Usage
//!
//! ```rust,no_run
//! use domain_products::{
//!     handlers,
//!     mongodb::MongoProductRepository,
//!     service::ProductService,
//! };
//! use mongodb::Client;
//!
//! # async fn example() -> Result<(), Box<dyn std::error::Error>> {
//! let client = Client::with_uri_str("mongodb://localhost:27017").await?;
//! let db = client.database("shop");
//!
//! let repository = MongoProductRepository::new(&db);
//! repository.init_indexes().await?;
//!
//! let service = ProductService::new(repository).with_page_size(10);
//! let router = handlers::router(service);
//! # Ok(())
//! # }
//! ```

pub mod error;
pub mod handlers;
pub mod models;
pub mod mongodb;
pub mod rating;
pub mod repository;
pub mod service;

pub use error::{ProductError, ProductResult};
pub use handlers::{ADMIN_ROLE, ApiDoc};
pub use models::{
    Actor, CreateProduct, CreateReview, DEFAULT_PAGE_SIZE, Product, ProductImage, ProductPage,
    ProductQuery, Review, UpdateProduct,
};
pub use mongodb::MongoProductRepository;
pub use rating::RatingSummary;
pub use repository::ProductRepository;
pub use service::ProductService;
