//! Product registration and lookup integration tests.

mod common;

use common::TestHarness;
use serde_json::json;

use aquafarm_core::ProductId;

#[tokio::test]
async fn admin_creates_product() {
    let harness = TestHarness::new();
    let admin_id = harness.seed_admin();

    let response = harness
        .server
        .post("/v1/products")
        .add_header("authorization", TestHarness::auth_header_for(&admin_id))
        .json(&json!({ "name": "Aerator", "price_cents": 12_000 }))
        .await;

    response.assert_status(axum::http::StatusCode::CREATED);
    let body: serde_json::Value = response.json();
    assert_eq!(body["name"], "Aerator");
    assert_eq!(body["price_cents"], 12_000);
    assert_eq!(body["currency"], "USD");
    assert_eq!(body["active"], true);
}

#[tokio::test]
async fn regular_user_cannot_create_product() {
    let harness = TestHarness::new();

    let response = harness
        .server
        .post("/v1/products")
        .add_header("authorization", harness.user_auth_header())
        .json(&json!({ "name": "Aerator", "price_cents": 12_000 }))
        .await;

    response.assert_status_forbidden();
}

#[tokio::test]
async fn create_product_validates_input() {
    let harness = TestHarness::new();
    let admin_id = harness.seed_admin();

    let response = harness
        .server
        .post("/v1/products")
        .add_header("authorization", TestHarness::auth_header_for(&admin_id))
        .json(&json!({ "name": "  ", "price_cents": 100 }))
        .await;
    response.assert_status_bad_request();

    let response = harness
        .server
        .post("/v1/products")
        .add_header("authorization", TestHarness::auth_header_for(&admin_id))
        .json(&json!({ "name": "Aerator", "price_cents": -1 }))
        .await;
    response.assert_status_bad_request();
}

#[tokio::test]
async fn get_product_by_id() {
    let harness = TestHarness::new();
    let product_id = harness.seed_product("Feed pellets", 1_500);

    let response = harness
        .server
        .get(&format!("/v1/products/{product_id}"))
        .add_header("authorization", harness.user_auth_header())
        .await;

    response.assert_status_ok();
    let body: serde_json::Value = response.json();
    assert_eq!(body["id"], product_id.to_string());
    assert_eq!(body["price_cents"], 1_500);
}

#[tokio::test]
async fn get_unknown_product_fails() {
    let harness = TestHarness::new();

    let response = harness
        .server
        .get(&format!("/v1/products/{}", ProductId::generate()))
        .add_header("authorization", harness.user_auth_header())
        .await;

    response.assert_status_not_found();
}
