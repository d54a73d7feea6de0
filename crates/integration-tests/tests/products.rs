//! Integration tests for the product catalog endpoints.

#![allow(clippy::unwrap_used, clippy::indexing_slicing)]

use axum::http::StatusCode;
use serde_json::json;

use bikeshop_integration_tests::{MultipartForm, TestApp, trek_form};

// ============================================================================
// Create & List
// ============================================================================

#[tokio::test]
async fn test_create_then_list_returns_product() {
    let app = TestApp::spawn().await;

    let response = app.post_multipart("/products", trek_form()).await;
    assert_eq!(response.status, StatusCode::OK, "{}", response.text());
    let body = response.json();
    assert_eq!(body["message"], "Product created successfully");
    let id = body["id"].as_i64().unwrap();

    let response = app.get("/products").await;
    assert_eq!(response.status, StatusCode::OK);
    assert_eq!(
        response.json(),
        json!([{
            "id": id,
            "title": "Trek 520",
            "description": "Steel touring bike",
            "price": 899.99,
            "image_path": "static/images/bike.jpg",
        }])
    );
}

#[tokio::test]
async fn test_uploaded_image_is_written_and_served() {
    let app = TestApp::spawn().await;
    app.post_multipart("/products", trek_form()).await;

    let on_disk = std::fs::read(app.image_dir().join("bike.jpg")).unwrap();
    assert_eq!(on_disk, b"\xFF\xD8\xFFjpeg");

    let response = app.get("/static/images/bike.jpg").await;
    assert_eq!(response.status, StatusCode::OK);
    assert_eq!(response.body.as_ref(), b"\xFF\xD8\xFFjpeg");
}

#[tokio::test]
async fn test_same_filename_does_not_overwrite() {
    let app = TestApp::spawn().await;

    let first = app.create_product("First", "1", "bike.jpg").await;
    let second = app
        .post_multipart(
            "/products",
            MultipartForm::new()
                .text("title", "Second")
                .text("description", "")
                .text("price", "2")
                .file("image", "bike.jpg", b"second"),
        )
        .await;
    assert_eq!(second.status, StatusCode::OK);

    let products = app.get("/products").await.json();
    let paths: Vec<&str> = products
        .as_array()
        .unwrap()
        .iter()
        .map(|p| p["image_path"].as_str().unwrap())
        .collect();
    assert_eq!(paths.len(), 2);
    assert_eq!(paths[0], "static/images/bike.jpg");
    assert!(paths[1].starts_with("static/images/bike-"));
    assert!(paths[1].ends_with(".jpg"));

    let original = std::fs::read(app.image_dir().join("bike.jpg")).unwrap();
    assert_eq!(original, b"image-bytes", "first upload for product {first} was overwritten");
}

#[tokio::test]
async fn test_upload_name_cannot_escape_image_dir() {
    let app = TestApp::spawn().await;
    app.create_product("Sneaky", "5", "../../index.html").await;

    let products = app.get("/products").await.json();
    assert_eq!(products[0]["image_path"], "static/images/index.html");
    assert_eq!(
        std::fs::read_to_string(app.static_dir().join("index.html")).unwrap(),
        bikeshop_integration_tests::INDEX_HTML
    );
}

#[tokio::test]
async fn test_list_is_in_insertion_order() {
    let app = TestApp::spawn().await;
    let a = app.create_product("A", "1", "a.jpg").await;
    let b = app.create_product("B", "2", "b.jpg").await;
    let c = app.create_product("C", "3", "c.jpg").await;

    let ids: Vec<i64> = app
        .get("/products")
        .await
        .json()
        .as_array()
        .unwrap()
        .iter()
        .map(|p| p["id"].as_i64().unwrap())
        .collect();
    assert_eq!(ids, vec![a, b, c]);
}

#[tokio::test]
async fn test_list_empty_catalog() {
    let app = TestApp::spawn().await;
    let response = app.get("/products").await;
    assert_eq!(response.status, StatusCode::OK);
    assert_eq!(response.json(), json!([]));
}

// ============================================================================
// Validation
// ============================================================================

#[tokio::test]
async fn test_create_rejects_missing_fields() {
    let app = TestApp::spawn().await;

    let response = app
        .post_multipart(
            "/products",
            MultipartForm::new()
                .text("description", "no title")
                .text("price", "10")
                .file("image", "bike.jpg", b"x"),
        )
        .await;
    assert_eq!(response.status, StatusCode::UNPROCESSABLE_ENTITY);
    assert_eq!(response.detail(), "missing required field: title");

    let response = app
        .post_multipart(
            "/products",
            MultipartForm::new()
                .text("title", "No image")
                .text("description", "")
                .text("price", "10"),
        )
        .await;
    assert_eq!(response.status, StatusCode::UNPROCESSABLE_ENTITY);
    assert_eq!(response.detail(), "missing required field: image");

    assert_eq!(app.get("/products").await.json(), json!([]));
}

#[tokio::test]
async fn test_create_rejects_invalid_price() {
    let app = TestApp::spawn().await;

    for price in ["free", "-1", ""] {
        let response = app
            .post_multipart(
                "/products",
                MultipartForm::new()
                    .text("title", "Bike")
                    .text("description", "")
                    .text("price", price)
                    .file("image", "bike.jpg", b"x"),
            )
            .await;
        assert_eq!(
            response.status,
            StatusCode::UNPROCESSABLE_ENTITY,
            "price {price:?} was accepted"
        );
    }

    assert!(std::fs::read_dir(app.image_dir()).unwrap().next().is_none());
}

#[tokio::test]
async fn test_create_rejects_price_too_large_to_store() {
    let app = TestApp::spawn().await;
    let existing = app.create_product("Ok", "10", "ok.jpg").await;

    for price in ["79228162514264337593543950335", "1e15"] {
        let response = app
            .post_multipart(
                "/products",
                MultipartForm::new()
                    .text("title", "Gold plated")
                    .text("description", "")
                    .text("price", price)
                    .file("image", "gold.jpg", b"x"),
            )
            .await;
        assert_eq!(response.status, StatusCode::UNPROCESSABLE_ENTITY);
        assert_eq!(
            response.detail(),
            "invalid price: price cannot exceed 1000000000000"
        );
    }

    let response = app.get("/products").await;
    assert_eq!(response.status, StatusCode::OK);
    let products = response.json();
    assert_eq!(products.as_array().unwrap().len(), 1);
    assert_eq!(products[0]["id"], existing);
    assert!(!app.image_dir().join("gold.jpg").exists());
}

#[tokio::test]
async fn test_create_rejects_blank_title() {
    let app = TestApp::spawn().await;
    let response = app
        .post_multipart(
            "/products",
            MultipartForm::new()
                .text("title", "   ")
                .text("description", "")
                .text("price", "1")
                .file("image", "bike.jpg", b"x"),
        )
        .await;
    assert_eq!(response.status, StatusCode::UNPROCESSABLE_ENTITY);
    assert_eq!(response.detail(), "title cannot be blank");
}

#[tokio::test]
async fn test_create_requires_multipart_body() {
    let app = TestApp::spawn().await;
    let response = app.post("/products").await;
    assert_eq!(response.status, StatusCode::UNPROCESSABLE_ENTITY);
}

#[tokio::test]
async fn test_create_rejects_oversized_upload() {
    let app = TestApp::spawn_with(&[("BIKESHOP_MAX_UPLOAD_BYTES", "1024")]).await;
    let big = vec![0u8; 8 * 1024];

    let response = app
        .post_multipart(
            "/products",
            MultipartForm::new()
                .text("title", "Big")
                .text("description", "")
                .text("price", "1")
                .file("image", "big.jpg", &big),
        )
        .await;
    assert_eq!(response.status, StatusCode::PAYLOAD_TOO_LARGE);
    assert_eq!(app.get("/products").await.json(), json!([]));
}

// ============================================================================
// Get & Delete
// ============================================================================

#[tokio::test]
async fn test_get_product_by_id() {
    let app = TestApp::spawn().await;
    let id = app.create_product("Bell", "12.5", "bell.png").await;

    let response = app.get(&format!("/products/{id}")).await;
    assert_eq!(response.status, StatusCode::OK);
    let body = response.json();
    assert_eq!(body["title"], "Bell");
    assert_eq!(body["price"], 12.5);

    let response = app.get("/products/9999").await;
    assert_eq!(response.status, StatusCode::NOT_FOUND);
    assert_eq!(response.detail(), "Product not found");
}

#[tokio::test]
async fn test_delete_missing_product_is_not_found() {
    let app = TestApp::spawn().await;
    let response = app.delete("/products/42").await;
    assert_eq!(response.status, StatusCode::NOT_FOUND);
    assert_eq!(response.json(), json!({"detail": "Product not found"}));
}

#[tokio::test]
async fn test_delete_removes_product_from_listing() {
    let app = TestApp::spawn().await;
    let keep = app.create_product("Keep", "1", "keep.jpg").await;
    let drop = app.create_product("Drop", "2", "drop.jpg").await;

    let response = app.delete(&format!("/products/{drop}")).await;
    assert_eq!(response.status, StatusCode::OK);
    assert_eq!(
        response.json(),
        json!({"message": "Product deleted successfully"})
    );

    let products = app.get("/products").await.json();
    assert_eq!(products.as_array().unwrap().len(), 1);
    assert_eq!(products[0]["id"], keep);

    // The image file stays on disk
    assert!(app.image_dir().join("drop.jpg").exists());

    let response = app.delete(&format!("/products/{drop}")).await;
    assert_eq!(response.status, StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn test_non_numeric_id_is_rejected() {
    let app = TestApp::spawn().await;
    let response = app.delete("/products/abc").await;
    assert_eq!(response.status, StatusCode::UNPROCESSABLE_ENTITY);
}

// ============================================================================
// Scenario
// ============================================================================

#[tokio::test]
async fn test_scenario_trek_520() {
    let app = TestApp::spawn().await;

    let response = app
        .post_multipart(
            "/products",
            MultipartForm::new()
                .text("title", "Trek 520")
                .text("description", "")
                .text("price", "899.99")
                .file("image", "bike.jpg", b"jpeg"),
        )
        .await;
    assert_eq!(response.status, StatusCode::OK);

    let products = app.get("/products").await.json();
    let products = products.as_array().unwrap();
    assert_eq!(products.len(), 1);
    assert_eq!(products[0]["price"], 899.99);
    assert_eq!(products[0]["image_path"], "static/images/bike.jpg");
}
