//! Cart workflows against a real database.
//!
//! These tests require a `PostgreSQL` database named by
//! `BAZAAR_TEST_DATABASE_URL`. Migrations are applied automatically.
//!
//! Run with: cargo test -p bazaar-integration-tests -- --ignored

#![allow(clippy::unwrap_used, clippy::indexing_slicing)]

use axum::http::{Method, StatusCode};
use serde_json::json;

use bazaar_integration_tests::TestApp;

#[tokio::test]
#[ignore = "Requires BAZAAR_TEST_DATABASE_URL"]
async fn test_new_user_has_empty_cart() {
    let app = TestApp::with_database().await;
    let (_, token) = app.register("Browser").await;

    let cart = app.request(Method::GET, "/api/cart", Some(&token), None).await;

    assert_eq!(cart.status, StatusCode::OK);
    assert_eq!(cart.body["id"], json!(null));
    assert_eq!(cart.body["items"], json!([]));
}

#[tokio::test]
#[ignore = "Requires BAZAAR_TEST_DATABASE_URL"]
async fn test_repeated_adds_merge_quantities() {
    let app = TestApp::with_database().await;
    let admin = app.register_admin().await;
    let pen = app.create_product(&admin, "Pen", "1.25", 100).await;
    let pad = app.create_product(&admin, "Pad", "4.00", 100).await;

    let (_, token) = app.register("Writer").await;

    let first = app
        .request(
            Method::POST,
            "/api/cart/add",
            Some(&token),
            Some(json!({"items": [{"product": pen, "quantity": 2}, {"product": pen, "quantity": 1}]})),
        )
        .await;
    assert_eq!(first.status, StatusCode::OK);
    assert_eq!(first.body["items"].as_array().unwrap().len(), 1);
    assert_eq!(first.body["items"][0]["quantity"], 3);

    let second = app
        .request(
            Method::POST,
            "/api/cart/add",
            Some(&token),
            Some(json!({"items": [{"product": pad, "quantity": 1}, {"product": pen, "quantity": 2}]})),
        )
        .await;
    let items = second.body["items"].as_array().unwrap();
    assert_eq!(items.len(), 2);
    // Insertion order is kept
    assert_eq!(items[0]["product"]["id"], pen);
    assert_eq!(items[0]["quantity"], 5);
    assert_eq!(items[1]["product"]["id"], pad);
    assert_eq!(second.body["subtotal"], "10.25");
}

#[tokio::test]
#[ignore = "Requires BAZAAR_TEST_DATABASE_URL"]
async fn test_adding_unknown_product_adds_nothing() {
    let app = TestApp::with_database().await;
    let admin = app.register_admin().await;
    let real = app.create_product(&admin, "Real", "2.00", 5).await;

    let (_, token) = app.register("Shopper").await;

    let response = app
        .request(
            Method::POST,
            "/api/cart/add",
            Some(&token),
            Some(json!({"items": [{"product": real, "quantity": 1}, {"product": 2_147_483_647, "quantity": 1}]})),
        )
        .await;
    assert_eq!(response.status, StatusCode::NOT_FOUND);

    let cart = app.request(Method::GET, "/api/cart", Some(&token), None).await;
    assert_eq!(cart.body["items"], json!([]));
}

#[tokio::test]
#[ignore = "Requires BAZAAR_TEST_DATABASE_URL"]
async fn test_adds_past_max_quantity_are_rejected() {
    let app = TestApp::with_database().await;
    let admin = app.register_admin().await;
    let rice = app.create_product(&admin, "Rice", "1.00", 10).await;
    let salt = app.create_product(&admin, "Salt", "0.50", 10).await;

    let (_, token) = app.register("Hoarder").await;

    let first = app
        .request(
            Method::POST,
            "/api/cart/add",
            Some(&token),
            Some(json!({"items": [{"product": rice, "quantity": i32::MAX}]})),
        )
        .await;
    assert_eq!(first.status, StatusCode::OK);

    // The new item comes first so a partial merge would leave it behind
    let second = app
        .request(
            Method::POST,
            "/api/cart/add",
            Some(&token),
            Some(json!({"items": [{"product": salt, "quantity": 1}, {"product": rice, "quantity": 1}]})),
        )
        .await;
    assert_eq!(second.status, StatusCode::BAD_REQUEST);
    assert_eq!(second.error_kind(), Some("validation_error"));

    let cart = app.request(Method::GET, "/api/cart", Some(&token), None).await;
    let items = cart.body["items"].as_array().unwrap();
    assert_eq!(items.len(), 1);
    assert_eq!(items[0]["product"]["id"], rice);
    assert_eq!(items[0]["quantity"], i32::MAX);
}

#[tokio::test]
#[ignore = "Requires BAZAAR_TEST_DATABASE_URL"]
async fn test_update_and_remove_items() {
    let app = TestApp::with_database().await;
    let admin = app.register_admin().await;
    let cup = app.create_product(&admin, "Cup", "2.00", 20).await;
    let bowl = app.create_product(&admin, "Bowl", "3.00", 20).await;

    let (_, token) = app.register("Cook").await;

    // No cart yet
    let missing = app
        .request(
            Method::PUT,
            &format!("/api/cart/update/{cup}"),
            Some(&token),
            Some(json!({"quantity": 2})),
        )
        .await;
    assert_eq!(missing.status, StatusCode::NOT_FOUND);

    app.request(
        Method::POST,
        "/api/cart/add",
        Some(&token),
        Some(json!({"items": [{"product": cup, "quantity": 1}, {"product": bowl, "quantity": 1}]})),
    )
    .await;

    let updated = app
        .request(
            Method::PUT,
            &format!("/api/cart/update/{cup}"),
            Some(&token),
            Some(json!({"quantity": 4})),
        )
        .await;
    assert_eq!(updated.status, StatusCode::OK);
    assert_eq!(updated.body["items"][0]["quantity"], 4);

    let zero = app
        .request(
            Method::PUT,
            &format!("/api/cart/update/{cup}"),
            Some(&token),
            Some(json!({"quantity": 0})),
        )
        .await;
    assert_eq!(zero.status, StatusCode::BAD_REQUEST);
    assert_eq!(zero.error_kind(), Some("validation_error"));

    let removed = app
        .request(
            Method::DELETE,
            &format!("/api/cart/remove/{cup}"),
            Some(&token),
            None,
        )
        .await;
    assert_eq!(removed.status, StatusCode::OK);
    assert_eq!(removed.body["message"], "Item removed from cart");

    let again = app
        .request(
            Method::DELETE,
            &format!("/api/cart/remove/{cup}"),
            Some(&token),
            None,
        )
        .await;
    assert_eq!(again.status, StatusCode::NOT_FOUND);

    let last = app
        .request(
            Method::DELETE,
            &format!("/api/cart/remove/{bowl}"),
            Some(&token),
            None,
        )
        .await;
    assert_eq!(last.body["message"], "Item removed. Cart is now empty");
    assert_eq!(last.body["cart"]["items"], json!([]));
}

#[tokio::test]
#[ignore = "Requires BAZAAR_TEST_DATABASE_URL"]
async fn test_deleted_products_are_pruned_from_view() {
    let app = TestApp::with_database().await;
    let admin = app.register_admin().await;
    let keep = app.create_product(&admin, "Keep", "5.00", 5).await;
    let drop = app.create_product(&admin, "Drop", "7.00", 5).await;

    let (_, token) = app.register("Shopper").await;
    app.request(
        Method::POST,
        "/api/cart/add",
        Some(&token),
        Some(json!({"items": [{"product": keep, "quantity": 1}, {"product": drop, "quantity": 1}]})),
    )
    .await;

    app.request(
        Method::DELETE,
        &format!("/api/products/{drop}"),
        Some(&admin),
        None,
    )
    .await;

    let cart = app.request(Method::GET, "/api/cart", Some(&token), None).await;
    let items = cart.body["items"].as_array().unwrap();
    assert_eq!(items.len(), 1);
    assert_eq!(items[0]["product"]["id"], keep);
    assert_eq!(cart.body["subtotal"], "5.00");
}

#[tokio::test]
#[ignore = "Requires BAZAAR_TEST_DATABASE_URL"]
async fn test_register_login_and_revalidate() {
    let app = TestApp::with_database().await;
    let (email, token) = app.register("Returning").await;

    let duplicate = app
        .request(
            Method::POST,
            "/api/auth/createuser",
            None,
            Some(json!({"name": "Again", "email": email.to_uppercase(), "password": "hunter22"})),
        )
        .await;
    assert_eq!(duplicate.status, StatusCode::CONFLICT);

    let wrong = app
        .request(
            Method::POST,
            "/api/auth/login",
            None,
            Some(json!({"email": email, "password": "wrong-password"})),
        )
        .await;
    assert_eq!(wrong.status, StatusCode::UNAUTHORIZED);

    let login = app
        .request(
            Method::POST,
            "/api/auth/login",
            None,
            Some(json!({"email": email, "password": "hunter22"})),
        )
        .await;
    assert_eq!(login.status, StatusCode::OK);
    assert_eq!(login.body["user"]["email"], email.as_str());
    assert!(login.body["user"].get("passwordHash").is_none());

    let me = app
        .request(Method::POST, "/api/auth/getuser", Some(&token), None)
        .await;
    assert_eq!(me.status, StatusCode::OK);
    assert_eq!(me.body["name"], "Returning");
    assert_eq!(me.body["isAdmin"], false);
}
