//! Product handlers.
//!
//! The storefront core only needs product registration (admin) and lookup;
//! the wider catalog CRUD lives elsewhere.

use std::sync::Arc;

use axum::extract::{Path, State};
use axum::http::StatusCode;
use axum::Json;
use serde::{Deserialize, Serialize};

use aquafarm_core::{Product, ProductId};
use aquafarm_store::Store;

use crate::auth::AuthUser;
use crate::error::ApiError;
use crate::state::AppState;

/// Product response.
#[derive(Debug, Serialize)]
pub struct ProductResponse {
    /// Product ID.
    pub id: String,
    /// Display name.
    pub name: String,
    /// Current price in cents.
    pub price_cents: i64,
    /// ISO currency code.
    pub currency: String,
    /// Whether the product can be purchased.
    pub active: bool,
    /// Optional stock flag.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub in_stock: Option<bool>,
}

impl From<&Product> for ProductResponse {
    fn from(product: &Product) -> Self {
        Self {
            id: product.id.to_string(),
            name: product.name.clone(),
            price_cents: product.price_cents,
            currency: product.currency.clone(),
            active: product.active,
            in_stock: product.in_stock,
        }
    }
}

/// Product registration request.
#[derive(Debug, Deserialize)]
pub struct CreateProductRequest {
    /// Display name.
    pub name: String,
    /// Price in cents.
    pub price_cents: i64,
    /// ISO currency code; defaults to USD.
    pub currency: Option<String>,
    /// Optional stock flag.
    pub in_stock: Option<bool>,
}

/// Register a product (admin only).
pub async fn create_product(
    State(state): State<Arc<AppState>>,
    auth: AuthUser,
    Json(body): Json<CreateProductRequest>,
) -> Result<(StatusCode, Json<ProductResponse>), ApiError> {
    let caller = state.ensure_user(&auth.user_id)?;
    if !caller.role.is_privileged() {
        return Err(ApiError::Forbidden);
    }

    if body.name.trim().is_empty() {
        return Err(ApiError::BadRequest("name must not be empty".into()));
    }
    if body.price_cents < 0 {
        return Err(ApiError::BadRequest("price_cents must not be negative".into()));
    }

    let mut product = Product::new(
        body.name,
        body.price_cents,
        body.currency.unwrap_or_else(|| "USD".into()),
    );
    product.in_stock = body.in_stock;

    state.store.put_product(&product)?;

    tracing::info!(
        product_id = %product.id,
        price_cents = %product.price_cents,
        "Product registered"
    );

    Ok((StatusCode::CREATED, Json(ProductResponse::from(&product))))
}

/// Fetch a product by ID.
pub async fn get_product(
    State(state): State<Arc<AppState>>,
    _auth: AuthUser,
    Path(product_id): Path<ProductId>,
) -> Result<Json<ProductResponse>, ApiError> {
    let product = state
        .store
        .get_product(&product_id)?
        .ok_or_else(|| ApiError::NotFound(format!("product not found: {product_id}")))?;

    Ok(Json(ProductResponse::from(&product)))
}
