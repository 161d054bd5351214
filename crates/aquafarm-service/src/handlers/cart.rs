//! Cart handlers.
//!
//! The cart is an idempotent set of lines: setting a product that is already
//! present replaces its quantity. Totals here are always computed from the
//! CURRENT product price; only a completed order freezes prices.

use std::sync::Arc;

use axum::extract::{Path, State};
use axum::Json;
use serde::{Deserialize, Serialize};

use aquafarm_core::{Product, ProductId, User};
use aquafarm_store::Store;

use crate::auth::AuthUser;
use crate::error::ApiError;
use crate::state::AppState;

/// One priced line of the cart view.
#[derive(Debug, Serialize)]
pub struct CartLineView {
    /// Product ID.
    pub product_id: String,
    /// Current product name.
    pub name: String,
    /// Quantity in the cart.
    pub qty: u32,
    /// Current unit price in cents.
    pub unit_price_cents: i64,
    /// `qty x unit price`, in cents.
    pub line_total_cents: i64,
}

/// The cart view with live pricing.
#[derive(Debug, Serialize)]
pub struct CartView {
    /// Priced lines. Lines whose product no longer exists are omitted.
    pub items: Vec<CartLineView>,
    /// Sum of line totals in cents.
    pub total_cents: i64,
}

/// Price the cart against current product records.
fn build_cart_view(state: &AppState, user: &User) -> Result<CartView, ApiError> {
    let mut items = Vec::with_capacity(user.cart.items.len());
    let mut total_cents = 0;

    for line in &user.cart.items {
        // A product deleted since it was added simply drops out of the view;
        // it will fail checkout explicitly instead.
        let Some(product) = state.store.get_product(&line.product_id)? else {
            continue;
        };

        let line_total_cents = product.price_cents * i64::from(line.qty);
        total_cents += line_total_cents;
        items.push(CartLineView {
            product_id: line.product_id.to_string(),
            name: product.name,
            qty: line.qty,
            unit_price_cents: product.price_cents,
            line_total_cents,
        });
    }

    Ok(CartView { items, total_cents })
}

/// Fetch a product and require it to be purchasable.
fn require_purchasable(state: &AppState, product_id: &ProductId) -> Result<Product, ApiError> {
    let product = state
        .store
        .get_product(product_id)?
        .ok_or_else(|| ApiError::NotFound(format!("product not found: {product_id}")))?;

    if !product.is_purchasable() {
        return Err(ApiError::NotFound(format!(
            "product not available: {product_id}"
        )));
    }

    Ok(product)
}

/// View the current cart with live pricing.
pub async fn view_cart(
    State(state): State<Arc<AppState>>,
    auth: AuthUser,
) -> Result<Json<CartView>, ApiError> {
    let user = state.ensure_user(&auth.user_id)?;
    Ok(Json(build_cart_view(&state, &user)?))
}

/// Add-or-set request body.
#[derive(Debug, Deserialize)]
pub struct SetLineRequest {
    /// The product to add.
    pub product_id: ProductId,
    /// Quantity, at least 1.
    pub qty: u32,
}

/// Add a product to the cart, replacing the quantity if already present.
pub async fn add_line(
    State(state): State<Arc<AppState>>,
    auth: AuthUser,
    Json(body): Json<SetLineRequest>,
) -> Result<Json<CartView>, ApiError> {
    if body.qty < 1 {
        return Err(ApiError::BadRequest("qty must be at least 1".into()));
    }
    require_purchasable(&state, &body.product_id)?;

    let mut user = state.ensure_user(&auth.user_id)?;
    let expected_version = user.version;
    user.cart.set_line(body.product_id, body.qty);
    user.version += 1;
    user.updated_at = chrono::Utc::now();
    state.store.put_user_guarded(&user, expected_version)?;

    tracing::info!(
        user_id = %auth.user_id,
        product_id = %body.product_id,
        qty = %body.qty,
        "Cart line set"
    );

    Ok(Json(build_cart_view(&state, &user)?))
}

/// Update-quantity request body.
#[derive(Debug, Deserialize)]
pub struct UpdateLineRequest {
    /// New quantity, at least 1.
    pub qty: u32,
}

/// Update the quantity of an existing cart line.
pub async fn update_line(
    State(state): State<Arc<AppState>>,
    auth: AuthUser,
    Path(product_id): Path<ProductId>,
    Json(body): Json<UpdateLineRequest>,
) -> Result<Json<CartView>, ApiError> {
    if body.qty < 1 {
        return Err(ApiError::BadRequest("qty must be at least 1".into()));
    }

    let mut user = state.ensure_user(&auth.user_id)?;
    if user.cart.line(&product_id).is_none() {
        return Err(ApiError::NotFound(format!(
            "no cart line for product: {product_id}"
        )));
    }
    require_purchasable(&state, &product_id)?;

    let expected_version = user.version;
    user.cart.set_line(product_id, body.qty);
    user.version += 1;
    user.updated_at = chrono::Utc::now();
    state.store.put_user_guarded(&user, expected_version)?;

    Ok(Json(build_cart_view(&state, &user)?))
}

/// Remove a cart line. Removing an absent line is a successful no-op.
pub async fn remove_line(
    State(state): State<Arc<AppState>>,
    auth: AuthUser,
    Path(product_id): Path<ProductId>,
) -> Result<Json<CartView>, ApiError> {
    let mut user = state.ensure_user(&auth.user_id)?;

    if user.cart.remove_line(&product_id) {
        let expected_version = user.version;
        user.version += 1;
        user.updated_at = chrono::Utc::now();
        state.store.put_user_guarded(&user, expected_version)?;

        tracing::info!(
            user_id = %auth.user_id,
            product_id = %product_id,
            "Cart line removed"
        );
    }

    Ok(Json(build_cart_view(&state, &user)?))
}

/// Remove all cart lines.
pub async fn clear_cart(
    State(state): State<Arc<AppState>>,
    auth: AuthUser,
) -> Result<Json<CartView>, ApiError> {
    let mut user = state.ensure_user(&auth.user_id)?;

    if !user.cart.is_empty() {
        let expected_version = user.version;
        user.cart.clear();
        user.version += 1;
        user.updated_at = chrono::Utc::now();
        state.store.put_user_guarded(&user, expected_version)?;

        tracing::info!(user_id = %auth.user_id, "Cart cleared");
    }

    Ok(Json(build_cart_view(&state, &user)?))
}
