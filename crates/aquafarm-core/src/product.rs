//! Product catalog types.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::ProductId;

/// A purchasable product.
///
/// Prices are integer cents. Orders snapshot the price at purchase time, so
/// editing a product's price never changes historical orders.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Product {
    /// Product ID.
    pub id: ProductId,

    /// Display name.
    pub name: String,

    /// Price in cents.
    pub price_cents: i64,

    /// ISO currency code (e.g. "USD").
    pub currency: String,

    /// Whether the product can currently be purchased.
    pub active: bool,

    /// Optional stock flag; `None` means stock is not tracked.
    pub in_stock: Option<bool>,

    /// When the product was created.
    pub created_at: DateTime<Utc>,

    /// When the product was last updated.
    pub updated_at: DateTime<Utc>,
}

impl Product {
    /// Create a new active product.
    #[must_use]
    pub fn new(name: String, price_cents: i64, currency: String) -> Self {
        let now = Utc::now();
        Self {
            id: ProductId::generate(),
            name,
            price_cents,
            currency,
            active: true,
            in_stock: None,
            created_at: now,
            updated_at: now,
        }
    }

    /// Whether the product may be added to a cart or checked out.
    #[must_use]
    pub const fn is_purchasable(&self) -> bool {
        self.active
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn new_product_is_active() {
        let product = Product::new("Fish feed 5kg".into(), 1299, "USD".into());
        assert!(product.active);
        assert!(product.is_purchasable());
        assert!(product.in_stock.is_none());
    }

    #[test]
    fn inactive_product_is_not_purchasable() {
        let mut product = Product::new("Aerator".into(), 25000, "USD".into());
        product.active = false;
        assert!(!product.is_purchasable());
    }
}
