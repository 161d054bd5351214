//! `RocksDB` storage layer for the aquafarm backend.
//!
//! This crate provides persistent storage for users, products, orders,
//! subscriptions, and scan results using `RocksDB` with column families for
//! indexing.
//!
//! # Architecture
//!
//! The storage uses the following column families:
//!
//! - `users`: User documents (cart and owned products embedded), keyed by `user_id`
//! - `products`: Product documents, keyed by `product_id`
//! - `orders`: Order documents, keyed by `order_id`
//! - `orders_by_user`: Index for listing orders by user
//! - `subscriptions`: Subscription documents, keyed by `user_id`
//! - `scans`: Scan results, keyed by `scan_id`
//! - `scans_by_pond`: Time-ordered index for per-pond scan queries
//!
//! Checkout is a compound operation: the order, its user index entry, and
//! the mutated user document (ownership granted, cart cleared) go into one
//! `WriteBatch`, guarded by an optimistic version check on the user.
//!
//! # Example
//!
//! ```no_run
//! use aquafarm_store::{RocksStore, Store};
//! use aquafarm_core::{User, UserId};
//!
//! let store = RocksStore::open("/tmp/aquafarm-db").unwrap();
//!
//! let user = User::new(UserId::generate());
//! store.put_user(&user).unwrap();
//! let retrieved = store.get_user(&user.id).unwrap();
//! ```

#![forbid(unsafe_code)]
#![warn(missing_docs)]
#![warn(clippy::all)]
#![warn(clippy::pedantic)]

pub mod error;
pub mod keys;
pub mod rocks;
pub mod schema;

pub use error::{Result, StoreError};
pub use rocks::RocksStore;

use chrono::{DateTime, Utc};

use aquafarm_core::{Order, OrderId, PondId, Product, ProductId, ScanId, ScanResult, Subscription, User, UserId};

/// The storage trait defining all database operations.
///
/// This trait abstracts the storage layer, allowing for different
/// implementations (e.g., `RocksDB`, in-memory for testing).
pub trait Store: Send + Sync {
    // =========================================================================
    // User Operations
    // =========================================================================

    /// Insert or update a user document unconditionally.
    ///
    /// # Errors
    ///
    /// Returns an error if the database operation fails.
    fn put_user(&self, user: &User) -> Result<()>;

    /// Get a user by ID.
    ///
    /// # Errors
    ///
    /// Returns an error if the database operation fails.
    fn get_user(&self, user_id: &UserId) -> Result<Option<User>>;

    /// Update a user document with an optimistic version check.
    ///
    /// `expected_version` is the version the caller read before mutating;
    /// `user.version` must already be bumped past it. The write is rejected
    /// with `StoreError::VersionConflict` if another writer got there first.
    ///
    /// # Errors
    ///
    /// - `StoreError::NotFound` if the user doesn't exist.
    /// - `StoreError::VersionConflict` if the stored version moved.
    fn put_user_guarded(&self, user: &User, expected_version: u64) -> Result<()>;

    /// Create a user document only if none exists yet, returning the stored
    /// document either way. Racing first-touch writers converge on a single
    /// document instead of overwriting each other.
    ///
    /// # Errors
    ///
    /// Returns an error if the database operation fails.
    fn put_user_if_absent(&self, user: &User) -> Result<User>;

    // =========================================================================
    // Product Operations
    // =========================================================================

    /// Insert or update a product.
    ///
    /// # Errors
    ///
    /// Returns an error if the database operation fails.
    fn put_product(&self, product: &Product) -> Result<()>;

    /// Get a product by ID.
    ///
    /// # Errors
    ///
    /// Returns an error if the database operation fails.
    fn get_product(&self, product_id: &ProductId) -> Result<Option<Product>>;

    // =========================================================================
    // Order Operations
    // =========================================================================

    /// Insert or update an order.
    ///
    /// This also maintains the per-user index.
    ///
    /// # Errors
    ///
    /// Returns an error if the database operation fails.
    fn put_order(&self, order: &Order) -> Result<()>;

    /// Get an order by ID.
    ///
    /// # Errors
    ///
    /// Returns an error if the database operation fails.
    fn get_order(&self, order_id: &OrderId) -> Result<Option<Order>>;

    /// List orders for a user, newest first.
    ///
    /// # Errors
    ///
    /// Returns an error if the database operation fails.
    fn list_orders_by_user(
        &self,
        user_id: &UserId,
        limit: usize,
        offset: usize,
    ) -> Result<Vec<Order>>;

    // =========================================================================
    // Subscription Operations
    // =========================================================================

    /// Insert or update a user's subscription.
    ///
    /// Subscriptions are keyed by user id, so this can never create a second
    /// document for the same user.
    ///
    /// # Errors
    ///
    /// Returns an error if the database operation fails.
    fn put_subscription(&self, subscription: &Subscription) -> Result<()>;

    /// Update a subscription with an optimistic version check, so a ledger
    /// append can never silently overwrite a concurrent one.
    ///
    /// An absent document counts as version 0, which lets first-touch
    /// writers create the document through the same guard.
    ///
    /// # Errors
    ///
    /// - `StoreError::VersionConflict` if the stored version moved past
    ///   `expected_version`.
    /// - `StoreError::NotFound` if no document exists and
    ///   `expected_version` is non-zero.
    fn put_subscription_guarded(
        &self,
        subscription: &Subscription,
        expected_version: u64,
    ) -> Result<()>;

    /// Create a subscription document only if none exists yet, returning
    /// the stored document either way.
    ///
    /// # Errors
    ///
    /// Returns an error if the database operation fails.
    fn put_subscription_if_absent(&self, subscription: &Subscription) -> Result<Subscription>;

    /// Get a user's subscription.
    ///
    /// # Errors
    ///
    /// Returns an error if the database operation fails.
    fn get_subscription(&self, user_id: &UserId) -> Result<Option<Subscription>>;

    // =========================================================================
    // Scan Operations
    // =========================================================================

    /// Insert a scan result, maintaining the per-pond time index.
    ///
    /// # Errors
    ///
    /// Returns an error if the database operation fails.
    fn put_scan(&self, scan: &ScanResult) -> Result<()>;

    /// Get a scan result by ID.
    ///
    /// # Errors
    ///
    /// Returns an error if the database operation fails.
    fn get_scan(&self, scan_id: &ScanId) -> Result<Option<ScanResult>>;

    /// List active scans inside a time window, optionally restricted to one
    /// pond. The pond-restricted path walks the time-ordered index; the
    /// unrestricted path scans the primary column family.
    ///
    /// # Errors
    ///
    /// Returns an error if the database operation fails.
    fn list_scans(
        &self,
        pond_id: Option<&PondId>,
        from: DateTime<Utc>,
        to: DateTime<Utc>,
    ) -> Result<Vec<ScanResult>>;

    // =========================================================================
    // Compound Operations
    // =========================================================================

    /// Commit a checkout: write the order, its index entry, and the mutated
    /// user document (ownership granted, cart cleared, version bumped) in
    /// one atomic batch.
    ///
    /// # Errors
    ///
    /// - `StoreError::NotFound` if the user doesn't exist.
    /// - `StoreError::VersionConflict` if a concurrent writer updated the
    ///   user after `expected_version` was read; the caller must re-fetch
    ///   the cart rather than blindly retry.
    fn commit_checkout(&self, user: &User, expected_version: u64, order: &Order) -> Result<()>;

    /// Complete a pending order: write the status change and the ownership
    /// grant on the user document in one atomic batch, with the same version
    /// guard as checkout.
    ///
    /// # Errors
    ///
    /// - `StoreError::NotFound` if the user doesn't exist.
    /// - `StoreError::VersionConflict` if the user version moved.
    fn complete_order(&self, user: &User, expected_version: u64, order: &Order) -> Result<()>;
}
