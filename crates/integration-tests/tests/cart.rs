//! Integration tests for the cart endpoints.

#![allow(clippy::unwrap_used, clippy::indexing_slicing)]

use axum::http::StatusCode;
use serde_json::json;

use bikeshop_integration_tests::TestApp;

#[tokio::test]
async fn test_add_then_list_has_quantity_one() {
    let app = TestApp::spawn().await;
    let id = app.create_product("Trek 520", "899.99", "bike.jpg").await;

    let response = app.post(&format!("/cart?product_id={id}")).await;
    assert_eq!(response.status, StatusCode::OK);
    assert_eq!(
        response.json(),
        json!({"message": "Product added to cart successfully"})
    );

    let items = app.get("/cart").await.json();
    let items = items.as_array().unwrap();
    assert_eq!(items.len(), 1);
    assert_eq!(items[0]["product_id"], id);
    assert_eq!(items[0]["quantity"], 1);
    assert!(items[0]["id"].is_i64());
}

#[tokio::test]
async fn test_add_does_not_check_product_exists() {
    let app = TestApp::spawn().await;

    let response = app.post("/cart?product_id=777").await;
    assert_eq!(response.status, StatusCode::OK);

    let items = app.get("/cart").await.json();
    assert_eq!(items[0]["product_id"], 777);
}

#[tokio::test]
async fn test_repeated_add_keeps_duplicate_rows() {
    let app = TestApp::spawn().await;
    app.post("/cart?product_id=1").await;
    app.post("/cart?product_id=1").await;

    let items = app.get("/cart").await.json();
    assert_eq!(items.as_array().unwrap().len(), 2);
}

#[tokio::test]
async fn test_add_requires_integer_product_id() {
    let app = TestApp::spawn().await;

    let response = app.post("/cart").await;
    assert_eq!(response.status, StatusCode::UNPROCESSABLE_ENTITY);

    let response = app.post("/cart?product_id=bike").await;
    assert_eq!(response.status, StatusCode::UNPROCESSABLE_ENTITY);

    assert_eq!(app.get("/cart").await.json(), json!([]));
}

#[tokio::test]
async fn test_update_missing_product_is_not_found() {
    let app = TestApp::spawn().await;
    let response = app.put("/cart/5?quantity=3").await;
    assert_eq!(response.status, StatusCode::NOT_FOUND);
    assert_eq!(response.detail(), "Product not found in cart");
}

#[tokio::test]
async fn test_update_sets_quantity_on_every_row() {
    let app = TestApp::spawn().await;
    app.post("/cart?product_id=1").await;
    app.post("/cart?product_id=1").await;
    app.post("/cart?product_id=2").await;

    let response = app.put("/cart/1?quantity=4").await;
    assert_eq!(response.status, StatusCode::OK);
    assert_eq!(
        response.json(),
        json!({"message": "Cart item updated successfully"})
    );

    let items = app.get("/cart").await.json();
    let quantities: Vec<(i64, i64)> = items
        .as_array()
        .unwrap()
        .iter()
        .map(|i| {
            (
                i["product_id"].as_i64().unwrap(),
                i["quantity"].as_i64().unwrap(),
            )
        })
        .collect();
    assert_eq!(quantities, vec![(1, 4), (1, 4), (2, 1)]);
}

#[tokio::test]
async fn test_update_validates_quantity() {
    let app = TestApp::spawn().await;
    app.post("/cart?product_id=1").await;

    for uri in ["/cart/1", "/cart/1?quantity=-1", "/cart/1?quantity=lots"] {
        let response = app.put(uri).await;
        assert_eq!(
            response.status,
            StatusCode::UNPROCESSABLE_ENTITY,
            "{uri} was accepted"
        );
    }

    let response = app.put("/cart/1?quantity=-1").await;
    assert_eq!(response.detail(), "quantity cannot be negative");
    assert_eq!(app.get("/cart").await.json()[0]["quantity"], 1);

    let response = app.put("/cart/1?quantity=0").await;
    assert_eq!(response.status, StatusCode::OK);
    assert_eq!(app.get("/cart").await.json()[0]["quantity"], 0);
}

#[tokio::test]
async fn test_remove_missing_product_is_not_found() {
    let app = TestApp::spawn().await;
    let response = app.delete("/cart/9").await;
    assert_eq!(response.status, StatusCode::NOT_FOUND);
    assert_eq!(response.detail(), "Product not found in cart");
}

#[tokio::test]
async fn test_remove_deletes_all_matching_rows() {
    let app = TestApp::spawn().await;
    app.post("/cart?product_id=1").await;
    app.post("/cart?product_id=2").await;
    app.post("/cart?product_id=1").await;

    let response = app.delete("/cart/1").await;
    assert_eq!(response.status, StatusCode::OK);
    assert_eq!(
        response.json(),
        json!({"message": "Product removed from cart successfully"})
    );

    let items = app.get("/cart").await.json();
    let items = items.as_array().unwrap();
    assert_eq!(items.len(), 1);
    assert_eq!(items[0]["product_id"], 2);

    let response = app.delete("/cart/1").await;
    assert_eq!(response.status, StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn test_deleting_product_leaves_cart_rows() {
    let app = TestApp::spawn().await;
    let id = app.create_product("Gone", "1", "gone.jpg").await;
    app.post(&format!("/cart?product_id={id}")).await;

    app.delete(&format!("/products/{id}")).await;

    let items = app.get("/cart").await.json();
    assert_eq!(items.as_array().unwrap().len(), 1);
    assert_eq!(items[0]["product_id"], id);
}
