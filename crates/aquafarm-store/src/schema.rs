//! Database schema definitions and column families.

/// Column family names for the `RocksDB` database.
pub mod cf {
    /// User documents (cart and owned products embedded), keyed by `user_id`.
    pub const USERS: &str = "users";

    /// Product documents, keyed by `product_id`.
    pub const PRODUCTS: &str = "products";

    /// Order documents, keyed by `order_id`.
    pub const ORDERS: &str = "orders";

    /// Index: orders by user, keyed by
    /// `user_id || created_at_millis_be || order_id`. Value is empty
    /// (index only).
    pub const ORDERS_BY_USER: &str = "orders_by_user";

    /// Subscription documents, keyed by `user_id`. Keying by user id is what
    /// enforces the one-subscription-per-user invariant.
    pub const SUBSCRIPTIONS: &str = "subscriptions";

    /// Scan result documents, keyed by `scan_id`.
    pub const SCANS: &str = "scans";

    /// Index: scans by pond and time, keyed by
    /// `pond_id || recorded_at_millis_be || scan_id`. Value is empty.
    pub const SCANS_BY_POND: &str = "scans_by_pond";
}

/// Returns all column family names for database initialization.
#[must_use]
pub fn all_column_families() -> Vec<&'static str> {
    vec![
        cf::USERS,
        cf::PRODUCTS,
        cf::ORDERS,
        cf::ORDERS_BY_USER,
        cf::SUBSCRIPTIONS,
        cf::SCANS,
        cf::SCANS_BY_POND,
    ]
}
