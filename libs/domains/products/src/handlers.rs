//! HTTP handlers for Products API

use axum::{
    Json, Router,
    extract::{
        Path, Query, State,
        rejection::{JsonRejection, QueryRejection},
    },
    http::StatusCode,
    response::IntoResponse,
    routing::{delete, get},
};
use axum_helpers::{
    AppError, AuthUser, UuidPath, ValidatedJson,
    errors::responses::{
        BadRequestUuidResponse, BadRequestValidationResponse, ForbiddenResponse,
        InternalServerErrorResponse, NotFoundResponse, UnauthorizedResponse,
    },
    parse_uuid,
};
use std::sync::Arc;
use utoipa::OpenApi;

use crate::error::{ProductError, ProductResult};
use crate::models::{
    Actor, CreateProduct, CreateReview, MessageResponse, Product, ProductImage,
    ProductListResponse, ProductQuery, ProductResponse, Review, ReviewsResponse, SuccessResponse,
    UpdateProduct,
};
use crate::repository::ProductRepository;
use crate::service::ProductService;

/// Role that may create, update and delete products
pub const ADMIN_ROLE: &str = "admin";

impl From<AuthUser> for Actor {
    fn from(user: AuthUser) -> Self {
        Self {
            is_admin: user.has_role(ADMIN_ROLE),
            id: user.id,
            name: user.name,
        }
    }
}

/// OpenAPI documentation for Products API
#[derive(OpenApi)]
#[openapi(
    paths(
        list_products,
        create_product,
        get_product,
        update_product,
        delete_product,
        upsert_review,
        list_reviews,
        delete_review,
    ),
    components(
        schemas(
            Product, ProductImage, Review, CreateProduct, UpdateProduct, CreateReview,
            ProductResponse, ProductListResponse, ReviewsResponse, MessageResponse,
            SuccessResponse
        ),
        responses(
            NotFoundResponse,
            BadRequestValidationResponse,
            BadRequestUuidResponse,
            UnauthorizedResponse,
            ForbiddenResponse,
            InternalServerErrorResponse
        )
    ),
    tags(
        (name = "Products", description = "Product catalogue endpoints"),
        (name = "Reviews", description = "Product review endpoints")
    )
)]
pub struct ApiDoc;

/// Product and review routes, relative to where the caller nests them.
///
/// Callers that need authenticated routes must layer a JWT middleware that
/// inserts claims; without it those routes answer `401`.
pub fn router<R: ProductRepository + 'static>(service: ProductService<R>) -> Router {
    let shared_service = Arc::new(service);

    Router::new()
        .route("/", get(list_products).post(create_product))
        .route(
            "/{id}",
            get(get_product).put(update_product).delete(delete_product),
        )
        .route("/{id}/reviews", get(list_reviews).put(upsert_review))
        .route("/{id}/reviews/{review_id}", delete(delete_review))
        .with_state(shared_service)
}

/// List products with keyword, category, price and rating filters
#[utoipa::path(
    get,
    path = "",
    tag = "Products",
    params(ProductQuery),
    responses(
        (status = 200, description = "One page of products", body = ProductListResponse),
        (status = 400, description = "Malformed query string"),
        (status = 500, response = InternalServerErrorResponse)
    )
)]
async fn list_products<R: ProductRepository>(
    State(service): State<Arc<ProductService<R>>>,
    query: Result<Query<ProductQuery>, QueryRejection>,
) -> ProductResult<Json<ProductListResponse>> {
    let Query(query) = query.map_err(|e| ProductError::Validation(e.body_text()))?;
    let page = service.list_products(query).await?;
    Ok(Json(page.into()))
}

/// Create a new product
#[utoipa::path(
    post,
    path = "",
    tag = "Products",
    request_body = CreateProduct,
    responses(
        (status = 201, description = "Product created successfully", body = ProductResponse),
        (status = 400, response = BadRequestValidationResponse),
        (status = 401, response = UnauthorizedResponse),
        (status = 403, response = ForbiddenResponse),
        (status = 500, response = InternalServerErrorResponse)
    )
)]
async fn create_product<R: ProductRepository>(
    State(service): State<Arc<ProductService<R>>>,
    user: AuthUser,
    payload: Result<Json<CreateProduct>, JsonRejection>,
) -> Result<impl IntoResponse, AppError> {
    // Field validation runs in the service, after the admin check.
    let Json(input) = payload?;
    let product = service.create_product(&user.into(), input).await?;
    Ok((StatusCode::CREATED, Json(ProductResponse::new(product))))
}

/// Get a product by ID
#[utoipa::path(
    get,
    path = "/{id}",
    tag = "Products",
    params(
        ("id" = Uuid, Path, description = "Product ID")
    ),
    responses(
        (status = 200, description = "Product found", body = ProductResponse),
        (status = 400, response = BadRequestUuidResponse),
        (status = 404, response = NotFoundResponse),
        (status = 500, response = InternalServerErrorResponse)
    )
)]
async fn get_product<R: ProductRepository>(
    State(service): State<Arc<ProductService<R>>>,
    UuidPath(id): UuidPath,
) -> ProductResult<Json<ProductResponse>> {
    let product = service.get_product(id).await?;
    Ok(Json(ProductResponse::new(product)))
}

/// Update a product
#[utoipa::path(
    put,
    path = "/{id}",
    tag = "Products",
    params(
        ("id" = Uuid, Path, description = "Product ID")
    ),
    request_body = UpdateProduct,
    responses(
        (status = 200, description = "Product updated successfully", body = ProductResponse),
        (status = 400, response = BadRequestValidationResponse),
        (status = 401, response = UnauthorizedResponse),
        (status = 403, response = ForbiddenResponse),
        (status = 404, response = NotFoundResponse),
        (status = 500, response = InternalServerErrorResponse)
    )
)]
async fn update_product<R: ProductRepository>(
    State(service): State<Arc<ProductService<R>>>,
    UuidPath(id): UuidPath,
    user: AuthUser,
    payload: Result<Json<UpdateProduct>, JsonRejection>,
) -> Result<Json<ProductResponse>, AppError> {
    let Json(input) = payload?;
    let product = service.update_product(&user.into(), id, input).await?;
    Ok(Json(ProductResponse::new(product)))
}

/// Delete a product together with its reviews
#[utoipa::path(
    delete,
    path = "/{id}",
    tag = "Products",
    params(
        ("id" = Uuid, Path, description = "Product ID")
    ),
    responses(
        (status = 200, description = "Product deleted successfully", body = MessageResponse),
        (status = 400, response = BadRequestUuidResponse),
        (status = 401, response = UnauthorizedResponse),
        (status = 403, response = ForbiddenResponse),
        (status = 404, response = NotFoundResponse),
        (status = 500, response = InternalServerErrorResponse)
    )
)]
async fn delete_product<R: ProductRepository>(
    State(service): State<Arc<ProductService<R>>>,
    UuidPath(id): UuidPath,
    user: AuthUser,
) -> ProductResult<Json<MessageResponse>> {
    service.delete_product(&user.into(), id).await?;
    Ok(Json(MessageResponse {
        success: true,
        message: "Product deleted successfully".to_string(),
    }))
}

/// Create the caller's review, or replace it if one exists
#[utoipa::path(
    put,
    path = "/{id}/reviews",
    tag = "Reviews",
    params(
        ("id" = Uuid, Path, description = "Product ID")
    ),
    request_body = CreateReview,
    responses(
        (status = 200, description = "Review saved", body = SuccessResponse),
        (status = 400, response = BadRequestValidationResponse),
        (status = 401, response = UnauthorizedResponse),
        (status = 404, response = NotFoundResponse),
        (status = 500, response = InternalServerErrorResponse)
    )
)]
async fn upsert_review<R: ProductRepository>(
    State(service): State<Arc<ProductService<R>>>,
    UuidPath(id): UuidPath,
    user: AuthUser,
    ValidatedJson(input): ValidatedJson<CreateReview>,
) -> ProductResult<Json<SuccessResponse>> {
    service.upsert_review(&user.into(), id, input).await?;
    Ok(Json(SuccessResponse::ok()))
}

/// List the reviews of a product
#[utoipa::path(
    get,
    path = "/{id}/reviews",
    tag = "Reviews",
    params(
        ("id" = Uuid, Path, description = "Product ID")
    ),
    responses(
        (status = 200, description = "Reviews of the product", body = ReviewsResponse),
        (status = 400, response = BadRequestUuidResponse),
        (status = 404, response = NotFoundResponse),
        (status = 500, response = InternalServerErrorResponse)
    )
)]
async fn list_reviews<R: ProductRepository>(
    State(service): State<Arc<ProductService<R>>>,
    UuidPath(id): UuidPath,
) -> ProductResult<Json<ReviewsResponse>> {
    let reviews = service.list_reviews(id).await?;
    Ok(Json(ReviewsResponse {
        success: true,
        reviews,
    }))
}

/// Delete one review and recompute the product rating
#[utoipa::path(
    delete,
    path = "/{id}/reviews/{review_id}",
    tag = "Reviews",
    params(
        ("id" = Uuid, Path, description = "Product ID"),
        ("review_id" = Uuid, Path, description = "Review ID")
    ),
    responses(
        (status = 200, description = "Review removed", body = SuccessResponse),
        (status = 400, response = BadRequestUuidResponse),
        (status = 401, response = UnauthorizedResponse),
        (status = 404, response = NotFoundResponse),
        (status = 500, response = InternalServerErrorResponse)
    )
)]
async fn delete_review<R: ProductRepository>(
    State(service): State<Arc<ProductService<R>>>,
    Path((id, review_id)): Path<(String, String)>,
    user: AuthUser,
) -> Result<Json<SuccessResponse>, AppError> {
    let id = parse_uuid(&id)?;
    let review_id = parse_uuid(&review_id)?;

    service.delete_review(&user.into(), id, review_id).await?;
    Ok(Json(SuccessResponse::ok()))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::repository::MockProductRepository;
    use axum::body::Body;
    use axum::http::{Request, header};
    use axum_helpers::JwtClaims;
    use http_body_util::BodyExt;
    use serde_json::{Value, json};
    use tower::ServiceExt;
    use uuid::Uuid;

    fn claims(roles: &[&str]) -> JwtClaims {
        JwtClaims {
            sub: Uuid::now_v7().to_string(),
            email: "ada@example.com".into(),
            name: "Ada".into(),
            roles: roles.iter().map(|r| r.to_string()).collect(),
            exp: 0,
            iat: 0,
            jti: "test".into(),
        }
    }

    fn product() -> Product {
        Product::new(
            Uuid::now_v7(),
            CreateProduct {
                name: "Lamp".into(),
                description: "Warm light".into(),
                price: 10.0,
                category: "Home".into(),
                stock: 1,
                images: vec![],
            },
        )
    }

    async fn send(app: Router, request: Request<Body>) -> (StatusCode, Value) {
        let response = app.oneshot(request).await.unwrap();
        let status = response.status();
        let bytes = response.into_body().collect().await.unwrap().to_bytes();
        let body = if bytes.is_empty() {
            Value::Null
        } else {
            serde_json::from_slice(&bytes).unwrap()
        };
        (status, body)
    }

    fn json_request(
        method: &str,
        uri: &str,
        body: Value,
        claims: Option<JwtClaims>,
    ) -> Request<Body> {
        let mut builder = Request::builder()
            .method(method)
            .uri(uri)
            .header(header::CONTENT_TYPE, "application/json");
        if let Some(claims) = claims {
            builder = builder.extension(claims);
        }
        builder.body(Body::from(body.to_string())).unwrap()
    }

    fn empty_request(method: &str, uri: &str, claims: Option<JwtClaims>) -> Request<Body> {
        let mut builder = Request::builder().method(method).uri(uri);
        if let Some(claims) = claims {
            builder = builder.extension(claims);
        }
        builder.body(Body::empty()).unwrap()
    }

    fn app(mock: MockProductRepository) -> Router {
        router(ProductService::new(mock))
    }

    #[tokio::test]
    async fn test_list_parses_bracket_filters() {
        let mut mock = MockProductRepository::new();
        mock.expect_count_all().returning(|| Ok(3));
        mock.expect_count().returning(|_| Ok(1));
        mock.expect_list()
            .withf(|query, _, skip| {
                query.price_gte == Some(5.0)
                    && query.ratings_lt == Some(4.5)
                    && query.category.as_deref() == Some("Home")
                    && *skip == 5
            })
            .times(1)
            .returning(|_, _, _| Ok(vec![product()]));

        let (status, body) = send(
            app(mock),
            empty_request(
                "GET",
                "/?category=Home&price%5Bgte%5D=5&ratings%5Blt%5D=4.5&page=2",
                None,
            ),
        )
        .await;

        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["success"], true);
        assert_eq!(body["productsCount"], 3);
        assert_eq!(body["filteredProductsCount"], 1);
        assert_eq!(body["resultPerPage"], 5);
        assert_eq!(body["products"][0]["name"], "Lamp");
    }

    #[tokio::test]
    async fn test_list_rejects_non_numeric_price() {
        let (status, body) = send(
            app(MockProductRepository::new()),
            empty_request("GET", "/?price%5Bgte%5D=cheap", None),
        )
        .await;

        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(body["success"], false);
    }

    #[tokio::test]
    async fn test_get_unknown_product_is_404_envelope() {
        let mut mock = MockProductRepository::new();
        mock.expect_get_by_id().returning(|_| Ok(None));

        let uri = format!("/{}", Uuid::now_v7());
        let (status, body) = send(app(mock), empty_request("GET", &uri, None)).await;

        assert_eq!(status, StatusCode::NOT_FOUND);
        assert_eq!(body["success"], false);
        assert_eq!(body["error"], "NOT_FOUND");
        assert_eq!(body["message"], "Product not found");
    }

    #[tokio::test]
    async fn test_get_with_malformed_id_is_400() {
        let (status, body) = send(
            app(MockProductRepository::new()),
            empty_request("GET", "/not-a-uuid", None),
        )
        .await;

        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(body["error"], "INVALID_UUID");
    }

    #[tokio::test]
    async fn test_create_without_token_is_401() {
        let (status, body) = send(
            app(MockProductRepository::new()),
            json_request("POST", "/", json!({}), None),
        )
        .await;

        assert_eq!(status, StatusCode::UNAUTHORIZED);
        assert_eq!(body["error"], "UNAUTHORIZED");
    }

    #[tokio::test]
    async fn test_create_as_non_admin_is_403() {
        let mut mock = MockProductRepository::new();
        mock.expect_create().never();

        let payload = json!({
            "name": "Lamp", "description": "Warm", "price": 10.0, "category": "Home"
        });
        let (status, body) = send(
            app(mock),
            json_request("POST", "/", payload, Some(claims(&["user"]))),
        )
        .await;

        assert_eq!(status, StatusCode::FORBIDDEN);
        assert_eq!(body["error"], "FORBIDDEN");
    }

    #[tokio::test]
    async fn test_create_as_admin_is_201() {
        let admin = claims(&["admin"]);
        let admin_id = Uuid::parse_str(&admin.sub).unwrap();

        let mut mock = MockProductRepository::new();
        mock.expect_create()
            .withf(move |user, _| *user == admin_id)
            .times(1)
            .returning(|user, input| Ok(Product::new(user, input)));

        let payload = json!({
            "name": "Lamp", "description": "Warm", "price": 10.0, "category": "Home"
        });
        let (status, body) = send(app(mock), json_request("POST", "/", payload, Some(admin))).await;

        assert_eq!(status, StatusCode::CREATED);
        assert_eq!(body["success"], true);
        assert_eq!(body["product"]["stock"], 1);
        assert_eq!(body["product"]["ratings"], 0.0);
        assert_eq!(body["product"]["user"], admin_id.to_string());
    }

    #[tokio::test]
    async fn test_create_with_invalid_body_is_validation_error() {
        let payload = json!({
            "name": "", "description": "Warm", "price": 10.0, "category": "Home"
        });
        let (status, body) = send(
            app(MockProductRepository::new()),
            json_request("POST", "/", payload, Some(claims(&["admin"]))),
        )
        .await;

        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(body["error"], "VALIDATION_ERROR");
        assert!(body["details"]["name"].is_array());
    }

    #[tokio::test]
    async fn test_blank_name_is_rejected_on_create_and_update() {
        let mut mock = MockProductRepository::new();
        mock.expect_create().never();
        mock.expect_update().never();
        let app = app(mock);

        let payload = json!({
            "name": "   ", "description": "Warm", "price": 10.0, "category": "Home"
        });
        let (status, body) = send(
            app.clone(),
            json_request("POST", "/", payload, Some(claims(&["admin"]))),
        )
        .await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert!(body["details"]["name"].is_array());

        let uri = format!("/{}", Uuid::now_v7());
        let (status, body) = send(
            app,
            json_request("PUT", &uri, json!({ "name": "  " }), Some(claims(&["admin"]))),
        )
        .await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(body["error"], "VALIDATION_ERROR");
    }

    #[tokio::test]
    async fn test_non_admin_with_invalid_body_is_403() {
        let app = app(MockProductRepository::new());

        let payload = json!({
            "name": "", "description": "", "price": -1.0, "category": "Home"
        });
        let (status, _) = send(
            app.clone(),
            json_request("POST", "/", payload, Some(claims(&["user"]))),
        )
        .await;
        assert_eq!(status, StatusCode::FORBIDDEN);

        let uri = format!("/{}", Uuid::now_v7());
        let (status, body) = send(
            app,
            json_request("PUT", &uri, json!({ "price": -1.0 }), Some(claims(&["user"]))),
        )
        .await;
        assert_eq!(status, StatusCode::FORBIDDEN);
        assert_eq!(body["error"], "FORBIDDEN");
    }

    #[tokio::test]
    async fn test_list_with_huge_page_is_400() {
        let mut mock = MockProductRepository::new();
        mock.expect_list().never();

        let (status, body) = send(
            app(mock),
            empty_request("GET", "/?page=18446744073709551615", None),
        )
        .await;

        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(body["success"], false);
        assert_eq!(body["error"], "BAD_REQUEST");
    }

    #[tokio::test]
    async fn test_delete_product_message() {
        let mut mock = MockProductRepository::new();
        mock.expect_delete().times(1).returning(|_| Ok(()));

        let uri = format!("/{}", Uuid::now_v7());
        let (status, body) = send(
            app(mock),
            empty_request("DELETE", &uri, Some(claims(&["admin"]))),
        )
        .await;

        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["message"], "Product deleted successfully");
    }

    #[tokio::test]
    async fn test_upsert_review_uses_caller_identity() {
        let stored = product();
        let id = stored.id;
        let caller = claims(&["user"]);
        let caller_id = Uuid::parse_str(&caller.sub).unwrap();

        let mut mock = MockProductRepository::new();
        mock.expect_get_by_id()
            .returning(move |_| Ok(Some(stored.clone())));
        mock.expect_save_reviews()
            .withf(move |_, reviews, summary| {
                reviews.len() == 1
                    && reviews[0].user == caller_id
                    && reviews[0].name == "Ada"
                    && summary.ratings == 4.0
            })
            .times(1)
            .returning(|_, _, _| Ok(product()));

        let (status, body) = send(
            app(mock),
            json_request(
                "PUT",
                &format!("/{}/reviews", id),
                json!({ "rating": 4, "comment": "Bright" }),
                Some(caller),
            ),
        )
        .await;

        assert_eq!(status, StatusCode::OK);
        assert_eq!(body, json!({ "success": true }));
    }

    #[tokio::test]
    async fn test_list_reviews_on_missing_product() {
        let mut mock = MockProductRepository::new();
        mock.expect_get_by_id().returning(|_| Ok(None));

        let uri = format!("/{}/reviews", Uuid::now_v7());
        let (status, body) = send(app(mock), empty_request("GET", &uri, None)).await;

        assert_eq!(status, StatusCode::NOT_FOUND);
        assert_eq!(body["error"], "NOT_FOUND");
    }

    #[tokio::test]
    async fn test_delete_review_with_bad_review_id() {
        let uri = format!("/{}/reviews/oops", Uuid::now_v7());
        let (status, body) = send(
            app(MockProductRepository::new()),
            empty_request("DELETE", &uri, Some(claims(&["user"]))),
        )
        .await;

        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(body["error"], "INVALID_UUID");
    }
}
