//! Order and checkout handlers.
//!
//! Checkout turns the cart into an immutable, price-snapshotted order and
//! clears the cart in one guarded batch write. A conflict means another
//! writer touched the user first; the caller must re-fetch the cart and
//! decide again, never blindly resend (a timed-out checkout is an UNKNOWN
//! outcome, not a failure — re-query order history before retrying).

use std::sync::Arc;

use axum::extract::{Path, Query, State};
use axum::http::StatusCode;
use axum::Json;
use serde::{Deserialize, Serialize};

use aquafarm_core::{Order, OrderId, OrderItem, OrderStatus, ProductId, Role};
use aquafarm_store::Store;

use crate::auth::AuthUser;
use crate::error::ApiError;
use crate::state::AppState;

/// Order line response.
#[derive(Debug, Serialize)]
pub struct OrderItemResponse {
    /// Product ID.
    pub product_id: String,
    /// Quantity.
    pub qty: u32,
    /// Frozen unit price in cents.
    pub price_at_purchase_cents: i64,
}

/// Order response.
#[derive(Debug, Serialize)]
pub struct OrderResponse {
    /// Order ID.
    pub id: String,
    /// Owning user.
    pub user_id: String,
    /// Lines with frozen prices.
    pub items: Vec<OrderItemResponse>,
    /// Frozen total in cents.
    pub total_cents: i64,
    /// Current status.
    pub status: OrderStatus,
    /// Soft-delete flag.
    pub active: bool,
    /// Creation timestamp.
    pub created_at: String,
}

impl From<&Order> for OrderResponse {
    fn from(order: &Order) -> Self {
        Self {
            id: order.id.to_string(),
            user_id: order.user_id.to_string(),
            items: order
                .items
                .iter()
                .map(|item| OrderItemResponse {
                    product_id: item.product_id.to_string(),
                    qty: item.qty,
                    price_at_purchase_cents: item.price_at_purchase_cents,
                })
                .collect(),
            total_cents: order.total_cents,
            status: order.status,
            active: order.active,
            created_at: order.created_at.to_rfc3339(),
        }
    }
}

/// Validate requested lines against current products and snapshot prices.
///
/// Any missing or inactive product fails the WHOLE set; no partial order is
/// ever built.
fn snapshot_items(
    state: &AppState,
    lines: &[(ProductId, u32)],
) -> Result<Vec<OrderItem>, ApiError> {
    let mut items = Vec::with_capacity(lines.len());

    for (product_id, qty) in lines {
        if *qty < 1 {
            return Err(ApiError::BadRequest("qty must be at least 1".into()));
        }

        let product = state
            .store
            .get_product(product_id)?
            .ok_or_else(|| ApiError::NotFound(format!("product not found: {product_id}")))?;

        if !product.is_purchasable() {
            return Err(ApiError::NotFound(format!(
                "product not available: {product_id}"
            )));
        }

        items.push(OrderItem {
            product_id: *product_id,
            qty: *qty,
            price_at_purchase_cents: product.price_cents,
        });
    }

    Ok(items)
}

/// Convert the cart into a completed order, grant ownership, and empty the
/// cart — all in one guarded batch.
pub async fn checkout(
    State(state): State<Arc<AppState>>,
    auth: AuthUser,
) -> Result<(StatusCode, Json<OrderResponse>), ApiError> {
    let user = state.ensure_user(&auth.user_id)?;

    if user.cart.is_empty() {
        return Err(ApiError::InvalidState("cart is empty".into()));
    }

    // Validate: every line re-fetched, any dead product aborts the whole
    // checkout before anything is written.
    let lines: Vec<(ProductId, u32)> = user
        .cart
        .items
        .iter()
        .map(|l| (l.product_id, l.qty))
        .collect();
    let items = snapshot_items(&state, &lines)?;

    let order = Order::new(user.id, items, OrderStatus::Completed);

    // Commit: ownership granted, cart cleared, version bumped; the store
    // writes order + user atomically, rejecting stale versions.
    let expected_version = user.version;
    let mut committed = user;
    for item in &order.items {
        committed.grant_ownership(item.product_id, item.qty);
    }
    committed.cart.clear();
    committed.version += 1;
    committed.updated_at = chrono::Utc::now();

    state
        .store
        .commit_checkout(&committed, expected_version, &order)?;

    tracing::info!(
        user_id = %auth.user_id,
        order_id = %order.id,
        total_cents = %order.total_cents,
        line_count = %order.items.len(),
        "Checkout committed"
    );

    Ok((StatusCode::CREATED, Json(OrderResponse::from(&order))))
}

/// Manual order line request.
#[derive(Debug, Deserialize)]
pub struct CreateOrderLine {
    /// Product to order.
    pub product_id: ProductId,
    /// Quantity, at least 1.
    pub qty: u32,
}

/// Manual order request body.
#[derive(Debug, Deserialize)]
pub struct CreateOrderRequest {
    /// Requested lines.
    pub items: Vec<CreateOrderLine>,
}

/// Create an order directly, bypassing the cart.
///
/// Prices are snapshotted and products validated exactly as in checkout;
/// the order starts `pending` and grants ownership only when completed.
pub async fn create_order(
    State(state): State<Arc<AppState>>,
    auth: AuthUser,
    Json(body): Json<CreateOrderRequest>,
) -> Result<(StatusCode, Json<OrderResponse>), ApiError> {
    if body.items.is_empty() {
        return Err(ApiError::BadRequest("order must have at least one item".into()));
    }

    state.ensure_user(&auth.user_id)?;

    let lines: Vec<(ProductId, u32)> = body
        .items
        .iter()
        .map(|l| (l.product_id, l.qty))
        .collect();
    let items = snapshot_items(&state, &lines)?;

    let order = Order::new(auth.user_id, items, OrderStatus::Pending);
    state.store.put_order(&order)?;

    tracing::info!(
        user_id = %auth.user_id,
        order_id = %order.id,
        total_cents = %order.total_cents,
        "Manual order created"
    );

    Ok((StatusCode::CREATED, Json(OrderResponse::from(&order))))
}

/// Order list query parameters.
#[derive(Debug, Deserialize)]
pub struct ListOrdersQuery {
    /// Maximum number of orders to return (default: 50).
    #[serde(default = "default_limit")]
    pub limit: usize,
    /// Offset for pagination (default: 0).
    #[serde(default)]
    pub offset: usize,
}

fn default_limit() -> usize {
    50
}

/// Order list response.
#[derive(Debug, Serialize)]
pub struct ListOrdersResponse {
    /// Orders, newest first.
    pub orders: Vec<OrderResponse>,
    /// Whether there are more orders.
    pub has_more: bool,
}

/// List the caller's orders, newest first.
pub async fn list_orders(
    State(state): State<Arc<AppState>>,
    auth: AuthUser,
    Query(query): Query<ListOrdersQuery>,
) -> Result<Json<ListOrdersResponse>, ApiError> {
    let limit = query.limit.min(100);

    // Fetch one more than requested to determine has_more.
    let orders = state
        .store
        .list_orders_by_user(&auth.user_id, limit + 1, query.offset)?;

    let has_more = orders.len() > limit;
    let orders: Vec<_> = orders.iter().take(limit).map(OrderResponse::from).collect();

    Ok(Json(ListOrdersResponse { orders, has_more }))
}

/// Get a single order. Only the owner or a privileged caller may read it.
pub async fn get_order(
    State(state): State<Arc<AppState>>,
    auth: AuthUser,
    Path(order_id): Path<OrderId>,
) -> Result<Json<OrderResponse>, ApiError> {
    let caller = state.ensure_user(&auth.user_id)?;

    let order = state
        .store
        .get_order(&order_id)?
        .ok_or_else(|| ApiError::NotFound(format!("order not found: {order_id}")))?;

    if order.user_id != auth.user_id && !caller.role.is_privileged() {
        return Err(ApiError::Forbidden);
    }

    Ok(Json(OrderResponse::from(&order)))
}

/// Status update request body.
#[derive(Debug, Deserialize)]
pub struct UpdateOrderRequest {
    /// Target status.
    pub status: OrderStatus,
}

/// Update an order's status.
///
/// Non-privileged callers may only cancel their OWN pending orders. Admins
/// may update any order regardless of status. Completing a pending order
/// grants ownership of its lines; cancelling never revokes ownership.
pub async fn update_order(
    State(state): State<Arc<AppState>>,
    auth: AuthUser,
    Path(order_id): Path<OrderId>,
    Json(body): Json<UpdateOrderRequest>,
) -> Result<Json<OrderResponse>, ApiError> {
    let caller = state.ensure_user(&auth.user_id)?;
    let privileged = caller.role.is_privileged();

    let mut order = state
        .store
        .get_order(&order_id)?
        .ok_or_else(|| ApiError::NotFound(format!("order not found: {order_id}")))?;

    if !privileged {
        if order.user_id != auth.user_id {
            return Err(ApiError::Forbidden);
        }
        if order.status != OrderStatus::Pending || body.status != OrderStatus::Cancelled {
            return Err(ApiError::Forbidden);
        }
    }

    let grants_ownership = body.status == OrderStatus::Completed && order.status != OrderStatus::Completed;

    let previous_status = order.status;
    order.status = body.status;
    // Cancelling soft-deletes the order; any other status restores the
    // flag so a cancelled-then-completed order is not left half-deleted.
    order.active = body.status != OrderStatus::Cancelled;
    order.updated_at = chrono::Utc::now();

    if grants_ownership {
        // Ownership lands on the order's owner, together with the status
        // flip, in one guarded batch.
        let owner = state.ensure_user(&order.user_id)?;
        let expected_version = owner.version;
        let mut granted = owner;
        for item in &order.items {
            granted.grant_ownership(item.product_id, item.qty);
        }
        granted.version += 1;
        granted.updated_at = chrono::Utc::now();

        state.store.complete_order(&granted, expected_version, &order)?;
    } else {
        state.store.put_order(&order)?;
    }

    tracing::info!(
        order_id = %order.id,
        from = ?previous_status,
        to = ?order.status,
        by = %auth.user_id,
        "Order status updated"
    );

    Ok(Json(OrderResponse::from(&order)))
}
