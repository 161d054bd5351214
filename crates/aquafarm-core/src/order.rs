//! Order types.
//!
//! An order is the immutable, price-snapshotted record of a purchase. After
//! creation only the status may change, and `completed`/`cancelled` are
//! terminal.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::{OrderId, ProductId, UserId};

/// A single order line with its price frozen at purchase time.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct OrderItem {
    /// The product purchased.
    pub product_id: ProductId,

    /// Quantity purchased.
    pub qty: u32,

    /// Unit price in cents at the moment of purchase. Never recomputed.
    pub price_at_purchase_cents: i64,
}

impl OrderItem {
    /// Line total in cents.
    #[must_use]
    pub const fn line_total_cents(&self) -> i64 {
        self.price_at_purchase_cents * self.qty as i64
    }
}

/// Status of an order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum OrderStatus {
    /// Created but not yet fulfilled (manual orders start here).
    Pending,

    /// Fulfilled; ownership of the purchased units has been granted.
    Completed,

    /// Cancelled; ownership already granted is never revoked.
    Cancelled,
}

impl OrderStatus {
    /// Whether this status admits no further transitions.
    #[must_use]
    pub const fn is_terminal(&self) -> bool {
        matches!(self, Self::Completed | Self::Cancelled)
    }
}

/// An order document.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Order {
    /// Order ID.
    pub id: OrderId,

    /// The purchasing user.
    pub user_id: UserId,

    /// Order lines with snapshotted prices.
    pub items: Vec<OrderItem>,

    /// Total in cents, frozen at creation: the sum of all line totals.
    pub total_cents: i64,

    /// Current status.
    pub status: OrderStatus,

    /// Soft-delete flag. Cancelling an order also clears this.
    pub active: bool,

    /// When the order was created.
    pub created_at: DateTime<Utc>,

    /// When the order was last updated.
    pub updated_at: DateTime<Utc>,
}

impl Order {
    /// Create a new order, computing the frozen total from its lines.
    #[must_use]
    pub fn new(user_id: UserId, items: Vec<OrderItem>, status: OrderStatus) -> Self {
        let total_cents = items.iter().map(OrderItem::line_total_cents).sum();
        let now = Utc::now();
        Self {
            id: OrderId::generate(),
            user_id,
            items,
            total_cents,
            status,
            active: true,
            created_at: now,
            updated_at: now,
        }
    }
}
