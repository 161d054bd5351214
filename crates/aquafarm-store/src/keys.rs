//! Key encoding utilities for `RocksDB`.

use chrono::{DateTime, Utc};

use aquafarm_core::{OrderId, PondId, ProductId, ScanId, UserId};

/// Create a user key from a user ID.
#[must_use]
pub fn user_key(user_id: &UserId) -> Vec<u8> {
    user_id.as_bytes().to_vec()
}

/// Create a product key from a product ID.
#[must_use]
pub fn product_key(product_id: &ProductId) -> Vec<u8> {
    product_id.as_bytes().to_vec()
}

/// Create an order key from an order ID.
#[must_use]
pub fn order_key(order_id: &OrderId) -> Vec<u8> {
    order_id.as_bytes().to_vec()
}

/// Create a user-order index key.
///
/// Format: `user_id (16 bytes) || created_at millis (8 bytes, big-endian)
/// || order_id (16 bytes)`. Order IDs are random UUIDs, so the creation
/// timestamp supplies the chronological ordering within a user prefix.
#[must_use]
pub fn user_order_key(user_id: &UserId, created_at: &DateTime<Utc>, order_id: &OrderId) -> Vec<u8> {
    let mut key = Vec::with_capacity(40);
    key.extend_from_slice(user_id.as_bytes());
    #[allow(clippy::cast_sign_loss)]
    key.extend_from_slice(&(created_at.timestamp_millis().max(0) as u64).to_be_bytes());
    key.extend_from_slice(order_id.as_bytes());
    key
}

/// Create a prefix for iterating all orders for a user.
#[must_use]
pub fn user_orders_prefix(user_id: &UserId) -> Vec<u8> {
    user_id.as_bytes().to_vec()
}

/// Extract the order ID from a user-order index key.
///
/// # Panics
///
/// Panics if the key is not at least 40 bytes.
#[must_use]
pub fn extract_order_id_from_user_key(key: &[u8]) -> OrderId {
    let mut bytes = [0u8; 16];
    bytes.copy_from_slice(&key[24..40]);
    OrderId::from_uuid(uuid::Uuid::from_bytes(bytes))
}

/// Create a subscription key from a user ID.
///
/// Subscriptions are keyed by the owning user, so at most one document can
/// exist per user.
#[must_use]
pub fn subscription_key(user_id: &UserId) -> Vec<u8> {
    user_id.as_bytes().to_vec()
}

/// Create a scan key from a scan ID.
#[must_use]
pub fn scan_key(scan_id: &ScanId) -> Vec<u8> {
    scan_id.as_bytes().to_vec()
}

/// Create a pond-scan index key.
///
/// Format: `pond_id (16 bytes) || recorded_at millis (8 bytes, big-endian)
/// || scan_id (16 bytes)`. Big-endian millis keep the index time-ordered
/// within a pond prefix.
#[must_use]
pub fn pond_scan_key(pond_id: &PondId, recorded_at: &DateTime<Utc>, scan_id: &ScanId) -> Vec<u8> {
    let mut key = Vec::with_capacity(40);
    key.extend_from_slice(pond_id.as_bytes());
    #[allow(clippy::cast_sign_loss)]
    key.extend_from_slice(&(recorded_at.timestamp_millis().max(0) as u64).to_be_bytes());
    key.extend_from_slice(scan_id.as_bytes());
    key
}

/// Create a prefix for iterating all scans for a pond.
#[must_use]
pub fn pond_scans_prefix(pond_id: &PondId) -> Vec<u8> {
    pond_id.as_bytes().to_vec()
}

/// Extract the scan ID from a pond-scan index key.
///
/// # Panics
///
/// Panics if the key is not at least 40 bytes.
#[must_use]
pub fn extract_scan_id_from_pond_key(key: &[u8]) -> ScanId {
    let mut bytes = [0u8; 16];
    bytes.copy_from_slice(&key[24..40]);
    ScanId::from_uuid(uuid::Uuid::from_bytes(bytes))
}
