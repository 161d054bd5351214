//! Subscription lifecycle integration tests.

mod common;

use common::TestHarness;
use serde_json::json;

// ============================================================================
// Current subscription
// ============================================================================

#[tokio::test]
async fn get_current_provisions_free_subscription() {
    let harness = TestHarness::new();

    let response = harness
        .server
        .get("/v1/subscriptions/current")
        .add_header("authorization", harness.user_auth_header())
        .await;

    response.assert_status_ok();
    let body: serde_json::Value = response.json();
    assert_eq!(body["plan"], "free");
    assert_eq!(body["status"], "active");
    assert_eq!(body["price_cents"], 0);
    assert!(body.get("end_date").is_none());
    assert!(body["payment_history"].as_array().unwrap().is_empty());
}

#[tokio::test]
async fn get_current_is_stable_across_calls() {
    let harness = TestHarness::new();

    let first = harness
        .server
        .get("/v1/subscriptions/current")
        .add_header("authorization", harness.user_auth_header())
        .await;
    first.assert_status_ok();
    let first: serde_json::Value = first.json();

    let second = harness
        .server
        .get("/v1/subscriptions/current")
        .add_header("authorization", harness.user_auth_header())
        .await;
    second.assert_status_ok();
    let second: serde_json::Value = second.json();

    assert_eq!(first["start_date"], second["start_date"]);
}

#[tokio::test]
async fn get_current_without_auth_fails() {
    let harness = TestHarness::new();

    harness
        .server
        .get("/v1/subscriptions/current")
        .await
        .assert_status_unauthorized();
}

// ============================================================================
// Subscribe
// ============================================================================

#[tokio::test]
async fn subscribe_to_premium_appends_ledger_entry() {
    let harness = TestHarness::new();

    let response = harness
        .server
        .post("/v1/subscriptions/subscribe")
        .add_header("authorization", harness.user_auth_header())
        .json(&json!({ "plan": "premium" }))
        .await;

    response.assert_status_ok();
    let body: serde_json::Value = response.json();
    assert_eq!(body["plan"], "premium");
    assert_eq!(body["status"], "active");
    assert_eq!(body["price_cents"], 999);
    assert!(body["end_date"].as_str().is_some());

    let history = body["payment_history"].as_array().unwrap();
    assert_eq!(history.len(), 1);
    assert_eq!(history[0]["amount_cents"], 999);
    assert_eq!(history[0]["status"], "success");
    assert!(history[0]["transaction_id"].as_str().is_some());
}

#[tokio::test]
async fn repeated_subscribe_grows_ledger_with_distinct_transactions() {
    let harness = TestHarness::new();

    harness
        .server
        .post("/v1/subscriptions/subscribe")
        .add_header("authorization", harness.user_auth_header())
        .json(&json!({ "plan": "premium" }))
        .await
        .assert_status_ok();

    let response = harness
        .server
        .post("/v1/subscriptions/subscribe")
        .add_header("authorization", harness.user_auth_header())
        .json(&json!({ "plan": "enterprise" }))
        .await;

    response.assert_status_ok();
    let body: serde_json::Value = response.json();
    assert_eq!(body["plan"], "enterprise");
    assert_eq!(body["price_cents"], 4999);

    let history = body["payment_history"].as_array().unwrap();
    assert_eq!(history.len(), 2);
    assert_ne!(history[0]["transaction_id"], history[1]["transaction_id"]);
    // Oldest first.
    assert_eq!(history[0]["amount_cents"], 999);
    assert_eq!(history[1]["amount_cents"], 4999);
}

#[tokio::test]
async fn downgrade_to_free_keeps_ledger() {
    let harness = TestHarness::new();

    harness
        .server
        .post("/v1/subscriptions/subscribe")
        .add_header("authorization", harness.user_auth_header())
        .json(&json!({ "plan": "premium" }))
        .await
        .assert_status_ok();

    let response = harness
        .server
        .post("/v1/subscriptions/subscribe")
        .add_header("authorization", harness.user_auth_header())
        .json(&json!({ "plan": "free" }))
        .await;

    response.assert_status_ok();
    let body: serde_json::Value = response.json();
    assert_eq!(body["plan"], "free");
    assert!(body.get("end_date").is_none());
    // The paid entry survives the downgrade.
    assert_eq!(body["payment_history"].as_array().unwrap().len(), 1);
}

#[tokio::test]
async fn subscribe_unknown_plan_fails() {
    let harness = TestHarness::new();

    let response = harness
        .server
        .post("/v1/subscriptions/subscribe")
        .add_header("authorization", harness.user_auth_header())
        .json(&json!({ "plan": "platinum" }))
        .await;

    response.assert_status_bad_request();
}

// ============================================================================
// Cancel
// ============================================================================

#[tokio::test]
async fn cancel_paid_subscription() {
    let harness = TestHarness::new();

    harness
        .server
        .post("/v1/subscriptions/subscribe")
        .add_header("authorization", harness.user_auth_header())
        .json(&json!({ "plan": "premium" }))
        .await
        .assert_status_ok();

    let response = harness
        .server
        .put("/v1/subscriptions/cancel")
        .add_header("authorization", harness.user_auth_header())
        .await;

    response.assert_status_ok();
    let body: serde_json::Value = response.json();
    assert_eq!(body["status"], "cancelled");
    assert_eq!(body["auto_renew"], false);
    // Plan and ledger are untouched.
    assert_eq!(body["plan"], "premium");
    assert_eq!(body["payment_history"].as_array().unwrap().len(), 1);
}

#[tokio::test]
async fn cancel_free_subscription_fails() {
    let harness = TestHarness::new();

    // Lazily provision the free subscription.
    harness
        .server
        .get("/v1/subscriptions/current")
        .add_header("authorization", harness.user_auth_header())
        .await
        .assert_status_ok();

    let response = harness
        .server
        .put("/v1/subscriptions/cancel")
        .add_header("authorization", harness.user_auth_header())
        .await;

    response.assert_status_bad_request();
    let body: serde_json::Value = response.json();
    assert_eq!(body["error"]["code"], "invalid_state");
}

#[tokio::test]
async fn cancel_without_subscription_fails() {
    let harness = TestHarness::new();

    let response = harness
        .server
        .put("/v1/subscriptions/cancel")
        .add_header("authorization", harness.user_auth_header())
        .await;

    response.assert_status_not_found();
}

#[tokio::test]
async fn resubscribe_after_cancel_reactivates_and_extends_ledger() {
    let harness = TestHarness::new();

    harness
        .server
        .post("/v1/subscriptions/subscribe")
        .add_header("authorization", harness.user_auth_header())
        .json(&json!({ "plan": "premium" }))
        .await
        .assert_status_ok();

    harness
        .server
        .put("/v1/subscriptions/cancel")
        .add_header("authorization", harness.user_auth_header())
        .await
        .assert_status_ok();

    let response = harness
        .server
        .post("/v1/subscriptions/subscribe")
        .add_header("authorization", harness.user_auth_header())
        .json(&json!({ "plan": "premium" }))
        .await;

    response.assert_status_ok();
    let body: serde_json::Value = response.json();
    assert_eq!(body["status"], "active");
    assert_eq!(body["payment_history"].as_array().unwrap().len(), 2);
}
