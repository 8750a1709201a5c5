//! Handler tests for the Products domain
//!
//! These drive the domain router against a real MongoDB:
//! - Request deserialization, including bracketed query filters
//! - Response envelopes and HTTP status codes
//! - Claims are injected as request extensions in place of the JWT layer

use axum::Router;
use axum::body::Body;
use axum::http::{Request, StatusCode};
use axum_helpers::JwtClaims;
use domain_products::{MongoProductRepository, ProductService, handlers};
use http_body_util::BodyExt;
use serde_json::{Value, json};
use test_utils::{TestDataBuilder, TestMongo};
use tower::ServiceExt; // For oneshot()

async fn json_body(body: Body) -> Value {
    let bytes = body.collect().await.unwrap().to_bytes();
    serde_json::from_slice(&bytes).unwrap()
}

fn claims(sub: uuid::Uuid, name: &str, roles: &[&str]) -> JwtClaims {
    JwtClaims {
        sub: sub.to_string(),
        email: format!("{}@example.com", name.to_lowercase()),
        name: name.to_string(),
        roles: roles.iter().map(|r| r.to_string()).collect(),
        exp: 0,
        iat: 0,
        jti: name.to_string(),
    }
}

fn app(mongo: &TestMongo) -> Router {
    let repo = MongoProductRepository::new(&mongo.database("handler_test"));
    handlers::router(ProductService::new(repo))
}

fn request(
    method: &str,
    uri: &str,
    body: Option<Value>,
    claims: Option<JwtClaims>,
) -> Request<Body> {
    let mut builder = Request::builder().method(method).uri(uri);
    if let Some(claims) = claims {
        builder = builder.extension(claims);
    }
    match body {
        Some(body) => builder
            .header("content-type", "application/json")
            .body(Body::from(body.to_string()))
            .unwrap(),
        None => builder.body(Body::empty()).unwrap(),
    }
}

#[tokio::test]
#[ignore = "requires Docker"]
async fn test_admin_creates_then_anyone_reads() {
    let mongo = TestMongo::new().await;
    let app = app(&mongo);
    let builder = TestDataBuilder::from_test_name("handler_create");
    let admin = claims(builder.user_id(), "Admin", &["admin"]);

    let response = app
        .clone()
        .oneshot(request(
            "POST",
            "/",
            Some(json!({
                "name": "  Table Lamp  ",
                "description": "Brass",
                "price": 49.5,
                "category": "Home",
                "images": [{ "publicId": "lamp-1", "url": "https://img.example.com/lamp-1.jpg" }]
            })),
            Some(admin),
        ))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::CREATED);
    let created = json_body(response.into_body()).await;
    assert_eq!(created["product"]["name"], "Table Lamp");
    assert_eq!(created["product"]["images"][0]["publicId"], "lamp-1");
    let id = created["product"]["_id"].as_str().unwrap().to_string();

    let response = app
        .oneshot(request("GET", &format!("/{id}"), None, None))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::OK);
    let fetched = json_body(response.into_body()).await;
    assert_eq!(fetched["success"], true);
    assert_eq!(fetched["product"]["_id"], id.as_str());
    assert_eq!(fetched["product"]["numOfReviews"], 0);
}

#[tokio::test]
#[ignore = "requires Docker"]
async fn test_review_routes_update_rating() {
    let mongo = TestMongo::new().await;
    let app = app(&mongo);
    let builder = TestDataBuilder::from_test_name("handler_reviews");
    let admin = claims(builder.nth_user_id(0), "Admin", &["admin"]);
    let reviewer = claims(builder.nth_user_id(1), "Reviewer", &["user"]);

    let response = app
        .clone()
        .oneshot(request(
            "POST",
            "/",
            Some(json!({
                "name": "Kettle", "description": "Steel", "price": 30.0, "category": "Kitchen"
            })),
            Some(admin),
        ))
        .await
        .unwrap();
    let created = json_body(response.into_body()).await;
    let id = created["product"]["_id"].as_str().unwrap().to_string();

    let response = app
        .clone()
        .oneshot(request(
            "PUT",
            &format!("/{id}/reviews"),
            Some(json!({ "rating": 3, "comment": "Loud but quick" })),
            Some(reviewer),
        ))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);
    assert_eq!(json_body(response.into_body()).await, json!({ "success": true }));

    let response = app
        .clone()
        .oneshot(request("GET", &format!("/{id}/reviews"), None, None))
        .await
        .unwrap();
    let reviews = json_body(response.into_body()).await;
    assert_eq!(reviews["reviews"].as_array().unwrap().len(), 1);
    assert_eq!(reviews["reviews"][0]["name"], "Reviewer");

    let response = app
        .oneshot(request("GET", &format!("/{id}"), None, None))
        .await
        .unwrap();
    let product = json_body(response.into_body()).await;
    assert_eq!(product["product"]["ratings"], 3.0);
    assert_eq!(product["product"]["numOfReviews"], 1);
}

#[tokio::test]
#[ignore = "requires Docker"]
async fn test_list_with_no_matches() {
    let mongo = TestMongo::new().await;
    let app = app(&mongo);

    let response = app
        .oneshot(request("GET", "/?keyword=zzz&price%5Blte%5D=1", None, None))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::OK);
    let body = json_body(response.into_body()).await;
    assert_eq!(body["products"], json!([]));
    assert_eq!(body["productsCount"], 0);
    assert_eq!(body["filteredProductsCount"], 0);
}

#[tokio::test]
#[ignore = "requires Docker"]
async fn test_update_missing_product_is_404() {
    let mongo = TestMongo::new().await;
    let app = app(&mongo);
    let admin = claims(uuid::Uuid::now_v7(), "Admin", &["admin"]);

    let response = app
        .oneshot(request(
            "PUT",
            &format!("/{}", uuid::Uuid::now_v7()),
            Some(json!({ "price": 12.0 })),
            Some(admin),
        ))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::NOT_FOUND);
    let body = json_body(response.into_body()).await;
    assert_eq!(body["error"], "NOT_FOUND");
}
