//! User, role, and cart types.
//!
//! The cart and the owned-product multiset live embedded in the user
//! document and are mutated only through the cart and checkout paths.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::{ProductId, UserId};

/// Role assigned to a user account.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Role {
    /// Regular farm operator.
    User,

    /// Administrator with unrestricted access.
    Admin,

    /// Aquaculture expert (consultation features).
    Expert,
}

impl Role {
    /// Whether this role may act on resources owned by other users.
    #[must_use]
    pub const fn is_privileged(&self) -> bool {
        matches!(self, Self::Admin)
    }
}

/// A single cart line: one product, one quantity.
///
/// At most one line per product exists in a cart; setting a product that is
/// already present replaces the quantity rather than adding to it.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CartLine {
    /// The product being purchased.
    pub product_id: ProductId,

    /// Quantity, at least 1.
    pub qty: u32,
}

/// A user's mutable set of pending purchase lines.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Cart {
    /// Cart lines, one per product.
    pub items: Vec<CartLine>,
}

impl Cart {
    /// Whether the cart has no lines.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    /// Find the line for a product, if present.
    #[must_use]
    pub fn line(&self, product_id: &ProductId) -> Option<&CartLine> {
        self.items.iter().find(|l| l.product_id == *product_id)
    }

    /// Set the quantity for a product, replacing any existing line.
    pub fn set_line(&mut self, product_id: ProductId, qty: u32) {
        if let Some(line) = self.items.iter_mut().find(|l| l.product_id == product_id) {
            line.qty = qty;
        } else {
            self.items.push(CartLine { product_id, qty });
        }
    }

    /// Remove the line for a product.
    ///
    /// Returns `true` if a line was removed. Removing an absent line is a
    /// no-op.
    pub fn remove_line(&mut self, product_id: &ProductId) -> bool {
        let before = self.items.len();
        self.items.retain(|l| l.product_id != *product_id);
        self.items.len() < before
    }

    /// Remove all lines.
    pub fn clear(&mut self) {
        self.items.clear();
    }
}

/// A user account.
///
/// `version` is an optimistic-concurrency counter: writers that mutate the
/// cart or owned products bump it, and the store rejects writes whose
/// expected version no longer matches.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct User {
    /// The user ID (from the identity provider).
    pub id: UserId,

    /// Role of the account.
    pub role: Role,

    /// Embedded shopping cart.
    pub cart: Cart,

    /// Multiset of purchased product units: one entry per unit bought.
    /// Never decremented, even when an order is later cancelled.
    pub owned_products: Vec<ProductId>,

    /// Optimistic concurrency counter.
    pub version: u64,

    /// When the user record was created.
    pub created_at: DateTime<Utc>,

    /// When the user record was last updated.
    pub updated_at: DateTime<Utc>,
}

impl User {
    /// Create a new user record with an empty cart and the regular role.
    #[must_use]
    pub fn new(id: UserId) -> Self {
        let now = Utc::now();
        Self {
            id,
            role: Role::User,
            cart: Cart::default(),
            owned_products: Vec::new(),
            version: 0,
            created_at: now,
            updated_at: now,
        }
    }

    /// Append `qty` units of a product to the owned multiset.
    pub fn grant_ownership(&mut self, product_id: ProductId, qty: u32) {
        self.owned_products
            .extend(std::iter::repeat(product_id).take(qty as usize));
    }
}
