//! MongoDB implementation of ProductRepository

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use futures_util::TryStreamExt;
use mongodb::{
    Collection, Database, IndexModel,
    bson::{Document, doc, to_raw_document_buf},
    options::{FindOptions, IndexOptions, ReturnDocument},
};
use serde::Serialize;
use tracing::instrument;
use uuid::Uuid;

use crate::error::{ProductError, ProductResult};
use crate::models::{CreateProduct, NumericRange, Product, ProductQuery, Review, UpdateProduct};
use crate::rating::RatingSummary;
use crate::repository::ProductRepository;

const COLLECTION: &str = "products";

/// MongoDB implementation of the ProductRepository
pub struct MongoProductRepository {
    collection: Collection<Product>,
}

#[derive(Serialize)]
struct IdFilter {
    #[serde(rename = "_id")]
    id: Uuid,
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct ReviewsUpdate {
    reviews: Vec<Review>,
    ratings: f64,
    num_of_reviews: i32,
    updated_at: DateTime<Utc>,
}

/// Encode through the same serializer the driver uses for inserts, so
/// `Uuid` values in filters and updates match the stored representation.
fn to_document<T: Serialize>(value: &T) -> ProductResult<Document> {
    let raw = to_raw_document_buf(value)?;
    raw.to_document()
        .map_err(|e| ProductError::Internal(format!("BSON conversion failed: {}", e)))
}

fn id_filter(id: Uuid) -> ProductResult<Document> {
    to_document(&IdFilter { id })
}

fn range_doc(range: NumericRange) -> Option<Document> {
    if range.is_empty() {
        return None;
    }

    let mut doc = doc! {};
    if let Some(v) = range.gt {
        doc.insert("$gt", v);
    }
    if let Some(v) = range.gte {
        doc.insert("$gte", v);
    }
    if let Some(v) = range.lt {
        doc.insert("$lt", v);
    }
    if let Some(v) = range.lte {
        doc.insert("$lte", v);
    }
    Some(doc)
}

impl MongoProductRepository {
    pub fn new(db: &Database) -> Self {
        Self::with_collection(db, COLLECTION)
    }

    pub fn with_collection(db: &Database, collection_name: &str) -> Self {
        let collection = db.collection::<Product>(collection_name);
        Self { collection }
    }

    /// Indexes backing the list filters and per-user review lookups
    pub async fn init_indexes(&self) -> ProductResult<()> {
        let index = |keys: Document, name: &str| {
            IndexModel::builder()
                .keys(keys)
                .options(IndexOptions::builder().name(name.to_string()).build())
                .build()
        };

        let indexes = vec![
            index(doc! { "name": 1 }, "idx_name"),
            index(doc! { "category": 1 }, "idx_category"),
            index(doc! { "price": 1 }, "idx_price"),
            index(doc! { "ratings": -1 }, "idx_ratings"),
            index(doc! { "reviews.user": 1 }, "idx_reviews_user"),
        ];

        self.collection.create_indexes(indexes).await?;
        tracing::info!("Product indexes created successfully");
        Ok(())
    }

    /// Translate list query parameters into a MongoDB filter.
    ///
    /// The keyword is escaped, so it always matches literally.
    fn build_filter(query: &ProductQuery) -> Document {
        let mut doc = doc! {};

        if let Some(keyword) = query
            .keyword
            .as_deref()
            .map(str::trim)
            .filter(|k| !k.is_empty())
        {
            doc.insert(
                "name",
                doc! { "$regex": regex::escape(keyword), "$options": "i" },
            );
        }

        if let Some(ref category) = query.category {
            doc.insert("category", category);
        }

        if let Some(range) = range_doc(query.price_range()) {
            doc.insert("price", range);
        }

        if let Some(range) = range_doc(query.ratings_range()) {
            doc.insert("ratings", range);
        }

        doc
    }
}

#[async_trait]
impl ProductRepository for MongoProductRepository {
    #[instrument(skip(self, input), fields(product_name = %input.name))]
    async fn create(&self, user: Uuid, input: CreateProduct) -> ProductResult<Product> {
        let product = Product::new(user, input);

        self.collection.insert_one(&product).await?;

        tracing::info!(product_id = %product.id, "Product created successfully");
        Ok(product)
    }

    #[instrument(skip(self))]
    async fn get_by_id(&self, id: Uuid) -> ProductResult<Option<Product>> {
        let product = self.collection.find_one(id_filter(id)?).await?;
        Ok(product)
    }

    #[instrument(skip(self))]
    async fn list(
        &self,
        query: ProductQuery,
        limit: i64,
        skip: u64,
    ) -> ProductResult<Vec<Product>> {
        let filter = Self::build_filter(&query);

        // v7 ids sort in creation order
        let options = FindOptions::builder()
            .limit(limit)
            .skip(skip)
            .sort(doc! { "_id": 1 })
            .build();

        let cursor = self.collection.find(filter).with_options(options).await?;
        let products: Vec<Product> = cursor.try_collect().await?;

        Ok(products)
    }

    #[instrument(skip(self))]
    async fn count(&self, query: ProductQuery) -> ProductResult<u64> {
        let count = self
            .collection
            .count_documents(Self::build_filter(&query))
            .await?;
        Ok(count)
    }

    #[instrument(skip(self))]
    async fn count_all(&self) -> ProductResult<u64> {
        let count = self.collection.count_documents(doc! {}).await?;
        Ok(count)
    }

    #[instrument(skip(self, input))]
    async fn update(&self, id: Uuid, input: UpdateProduct) -> ProductResult<Product> {
        let filter = id_filter(id)?;
        let mut product = self
            .collection
            .find_one(filter.clone())
            .await?
            .ok_or(ProductError::NotFound(id))?;

        product.apply_update(input);

        self.collection.replace_one(filter, &product).await?;

        tracing::info!(product_id = %id, "Product updated successfully");
        Ok(product)
    }

    #[instrument(skip(self))]
    async fn delete(&self, id: Uuid) -> ProductResult<()> {
        let result = self.collection.delete_one(id_filter(id)?).await?;

        if result.deleted_count == 0 {
            return Err(ProductError::NotFound(id));
        }

        tracing::info!(product_id = %id, "Product deleted successfully");
        Ok(())
    }

    #[instrument(skip(self, reviews), fields(num_of_reviews = summary.num_of_reviews))]
    async fn save_reviews(
        &self,
        id: Uuid,
        reviews: Vec<Review>,
        summary: RatingSummary,
    ) -> ProductResult<Product> {
        let set = to_document(&ReviewsUpdate {
            reviews,
            ratings: summary.ratings,
            num_of_reviews: summary.num_of_reviews,
            updated_at: Utc::now(),
        })?;

        let product = self
            .collection
            .find_one_and_update(id_filter(id)?, doc! { "$set": set })
            .return_document(ReturnDocument::After)
            .await?
            .ok_or(ProductError::NotFound(id))?;

        tracing::info!(product_id = %id, ratings = product.ratings, "Reviews saved");
        Ok(product)
    }
}
