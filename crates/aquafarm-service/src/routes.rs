//! Router configuration.
//!
//! This module sets up the Axum router with all routes and middleware.

use std::sync::Arc;
use std::time::Duration;

use axum::routing::{delete, get, post, put};
use axum::Router;
use tower_http::cors::{Any, CorsLayer};
use tower_http::limit::RequestBodyLimitLayer;
use tower_http::timeout::TimeoutLayer;
use tower_http::trace::TraceLayer;

use crate::handlers::{analytics, cart, health, orders, products, scans, subscriptions};
use crate::state::AppState;

/// Create the service router with all routes and middleware.
///
/// # Routes
///
/// ## Public
/// - `GET /health` - Health check
///
/// ## Products (bearer auth; creation is admin-only)
/// - `POST /v1/products` - Register a product
/// - `GET /v1/products/{id}` - Fetch a product
///
/// ## Cart (bearer auth)
/// - `GET /v1/cart` - View the cart with live pricing
/// - `POST /v1/cart` - Add/set a cart line
/// - `PUT /v1/cart/{product_id}` - Update an existing line
/// - `DELETE /v1/cart/{product_id}` - Remove a line (idempotent)
/// - `DELETE /v1/cart` - Clear the cart
/// - `POST /v1/cart/checkout` - Convert the cart into a completed order
///
/// ## Orders (bearer auth)
/// - `POST /v1/orders` - Create a manual (pending) order
/// - `GET /v1/orders` - List own orders, newest first
/// - `GET /v1/orders/{id}` - Fetch one order
/// - `PUT /v1/orders/{id}` - Update order status
///
/// ## Subscriptions (bearer auth)
/// - `GET /v1/subscriptions/current` - Fetch (lazily create) the subscription
/// - `POST /v1/subscriptions/subscribe` - Switch plan, append ledger entry
/// - `PUT /v1/subscriptions/cancel` - Cancel a paid subscription
///
/// ## Analytics (bearer auth)
/// - `GET /v1/analytics/health-trends` - Daily mean health scores
/// - `GET /v1/analytics/scan-frequency` - Daily scan counts
/// - `GET /v1/analytics/metric-averages` - Per-metric means for one pond
///
/// ## Scans (service API key auth)
/// - `POST /v1/scans` - Ingest a scan result
pub fn create_router(state: AppState) -> Router {
    // Extract config values before moving state
    let cors_origins = state.config.cors_origins.clone();
    let max_body_bytes = state.config.max_body_bytes;
    let request_timeout_seconds = state.config.request_timeout_seconds;

    let cors = build_cors_layer(&cors_origins);

    let state = Arc::new(state);

    Router::new()
        // Health (public)
        .route("/health", get(health::health))
        // Products
        .route("/v1/products", post(products::create_product))
        .route("/v1/products/:id", get(products::get_product))
        // Cart
        .route("/v1/cart", get(cart::view_cart))
        .route("/v1/cart", post(cart::add_line))
        .route("/v1/cart", delete(cart::clear_cart))
        .route("/v1/cart/checkout", post(orders::checkout))
        .route("/v1/cart/:product_id", put(cart::update_line))
        .route("/v1/cart/:product_id", delete(cart::remove_line))
        // Orders
        .route("/v1/orders", post(orders::create_order))
        .route("/v1/orders", get(orders::list_orders))
        .route("/v1/orders/:id", get(orders::get_order))
        .route("/v1/orders/:id", put(orders::update_order))
        // Subscriptions
        .route("/v1/subscriptions/current", get(subscriptions::get_current))
        .route("/v1/subscriptions/subscribe", post(subscriptions::subscribe))
        .route("/v1/subscriptions/cancel", put(subscriptions::cancel))
        // Analytics
        .route("/v1/analytics/health-trends", get(analytics::health_trends))
        .route("/v1/analytics/scan-frequency", get(analytics::scan_frequency))
        .route(
            "/v1/analytics/metric-averages",
            get(analytics::metric_averages),
        )
        // Scans (service auth)
        .route("/v1/scans", post(scans::ingest_scan))
        // Middleware
        .layer(TraceLayer::new_for_http())
        .layer(cors)
        .layer(RequestBodyLimitLayer::new(max_body_bytes))
        .layer(TimeoutLayer::new(Duration::from_secs(
            request_timeout_seconds,
        )))
        .with_state(state)
}

/// Build the CORS layer from configured origins.
fn build_cors_layer(origins: &[String]) -> CorsLayer {
    if origins.iter().any(|o| o == "*") {
        CorsLayer::new()
            .allow_origin(Any)
            .allow_methods(Any)
            .allow_headers(Any)
    } else {
        let origins: Vec<axum::http::HeaderValue> =
            origins.iter().filter_map(|o| o.parse().ok()).collect();

        CorsLayer::new()
            .allow_origin(origins)
            .allow_methods(Any)
            .allow_headers(Any)
    }
}
