//! `RocksDB` storage implementation.

use std::path::Path;
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

use chrono::{DateTime, Utc};
use rocksdb::{
    BoundColumnFamily, ColumnFamilyDescriptor, DBWithThreadMode, IteratorMode, MultiThreaded,
    Options, WriteBatch,
};

use aquafarm_core::{
    Order, OrderId, PondId, Product, ProductId, ScanId, ScanResult, Subscription, User, UserId,
};

use crate::error::{Result, StoreError};
use crate::keys;
use crate::schema::{all_column_families, cf};
use crate::Store;

/// RocksDB-backed storage implementation.
pub struct RocksStore {
    db: Arc<DBWithThreadMode<MultiThreaded>>,

    /// Serializes version-guarded writes. The version check and the batch
    /// commit must not interleave between writers, otherwise two writers
    /// can both observe the expected version and both commit.
    write_guard: Mutex<()>,
}

impl RocksStore {
    /// Open or create a `RocksDB` database at the given path.
    ///
    /// # Errors
    ///
    /// Returns an error if the database cannot be opened or created.
    pub fn open<P: AsRef<Path>>(path: P) -> Result<Self> {
        let mut opts = Options::default();
        opts.create_if_missing(true);
        opts.create_missing_column_families(true);

        let cf_descriptors: Vec<_> = all_column_families()
            .into_iter()
            .map(|name| ColumnFamilyDescriptor::new(name, Options::default()))
            .collect();

        let db = DBWithThreadMode::open_cf_descriptors(&opts, path, cf_descriptors)
            .map_err(|e| StoreError::Database(e.to_string()))?;

        Ok(Self {
            db: Arc::new(db),
            write_guard: Mutex::new(()),
        })
    }

    /// Take the guarded-write lock. The guard carries no data, so a
    /// poisoned lock is recovered rather than propagated.
    fn lock_writes(&self) -> MutexGuard<'_, ()> {
        self.write_guard
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
    }

    /// Get a column family handle.
    fn cf(&self, name: &str) -> Result<Arc<BoundColumnFamily<'_>>> {
        self.db
            .cf_handle(name)
            .ok_or_else(|| StoreError::Database(format!("column family not found: {name}")))
    }

    /// Serialize a value using CBOR.
    fn serialize<T: serde::Serialize>(value: &T) -> Result<Vec<u8>> {
        let mut buf = Vec::new();
        ciborium::into_writer(value, &mut buf)
            .map_err(|e| StoreError::Serialization(e.to_string()))?;
        Ok(buf)
    }

    /// Deserialize a value from CBOR.
    fn deserialize<T: serde::de::DeserializeOwned>(data: &[u8]) -> Result<T> {
        ciborium::from_reader(data).map_err(|e| StoreError::Serialization(e.to_string()))
    }

    /// Check the stored user's version against what the writer read.
    fn check_user_version(&self, user_id: &UserId, expected: u64) -> Result<()> {
        let stored = self.get_user(user_id)?.ok_or(StoreError::NotFound)?;
        if stored.version != expected {
            return Err(StoreError::VersionConflict {
                expected,
                found: stored.version,
            });
        }
        Ok(())
    }
}

impl Store for RocksStore {
    // =========================================================================
    // User Operations
    // =========================================================================

    fn put_user(&self, user: &User) -> Result<()> {
        let cf = self.cf(cf::USERS)?;
        let key = keys::user_key(&user.id);
        let value = Self::serialize(user)?;

        self.db
            .put_cf(&cf, key, value)
            .map_err(|e| StoreError::Database(e.to_string()))?;

        Ok(())
    }

    fn get_user(&self, user_id: &UserId) -> Result<Option<User>> {
        let cf = self.cf(cf::USERS)?;
        let key = keys::user_key(user_id);

        self.db
            .get_cf(&cf, key)
            .map_err(|e| StoreError::Database(e.to_string()))?
            .map(|data| Self::deserialize(&data))
            .transpose()
    }

    fn put_user_guarded(&self, user: &User, expected_version: u64) -> Result<()> {
        let _guard = self.lock_writes();
        self.check_user_version(&user.id, expected_version)?;
        self.put_user(user)
    }

    fn put_user_if_absent(&self, user: &User) -> Result<User> {
        let _guard = self.lock_writes();
        if let Some(existing) = self.get_user(&user.id)? {
            return Ok(existing);
        }
        self.put_user(user)?;
        Ok(user.clone())
    }

    // =========================================================================
    // Product Operations
    // =========================================================================

    fn put_product(&self, product: &Product) -> Result<()> {
        let cf = self.cf(cf::PRODUCTS)?;
        let key = keys::product_key(&product.id);
        let value = Self::serialize(product)?;

        self.db
            .put_cf(&cf, key, value)
            .map_err(|e| StoreError::Database(e.to_string()))?;

        Ok(())
    }

    fn get_product(&self, product_id: &ProductId) -> Result<Option<Product>> {
        let cf = self.cf(cf::PRODUCTS)?;
        let key = keys::product_key(product_id);

        self.db
            .get_cf(&cf, key)
            .map_err(|e| StoreError::Database(e.to_string()))?
            .map(|data| Self::deserialize(&data))
            .transpose()
    }

    // =========================================================================
    // Order Operations
    // =========================================================================

    fn put_order(&self, order: &Order) -> Result<()> {
        let cf_orders = self.cf(cf::ORDERS)?;
        let cf_by_user = self.cf(cf::ORDERS_BY_USER)?;

        let order_key = keys::order_key(&order.id);
        let user_order_key = keys::user_order_key(&order.user_id, &order.created_at, &order.id);
        let value = Self::serialize(order)?;

        let mut batch = WriteBatch::default();
        batch.put_cf(&cf_orders, &order_key, &value);
        batch.put_cf(&cf_by_user, &user_order_key, []); // Index entry (empty value)

        self.db
            .write(batch)
            .map_err(|e| StoreError::Database(e.to_string()))?;

        Ok(())
    }

    fn get_order(&self, order_id: &OrderId) -> Result<Option<Order>> {
        let cf = self.cf(cf::ORDERS)?;
        let key = keys::order_key(order_id);

        self.db
            .get_cf(&cf, key)
            .map_err(|e| StoreError::Database(e.to_string()))?
            .map(|data| Self::deserialize(&data))
            .transpose()
    }

    fn list_orders_by_user(
        &self,
        user_id: &UserId,
        limit: usize,
        offset: usize,
    ) -> Result<Vec<Order>> {
        let cf_by_user = self.cf(cf::ORDERS_BY_USER)?;
        let prefix = keys::user_orders_prefix(user_id);

        let iter = self.db.iterator_cf(
            &cf_by_user,
            IteratorMode::From(&prefix, rocksdb::Direction::Forward),
        );

        // Index keys are time-ordered within the user prefix; collect all,
        // then reverse for newest-first.
        let mut all_keys: Vec<Vec<u8>> = Vec::new();
        for item in iter {
            let (key, _) = item.map_err(|e| StoreError::Database(e.to_string()))?;

            if !key.starts_with(&prefix) {
                break;
            }

            all_keys.push(key.to_vec());
        }

        all_keys.reverse();

        let mut orders = Vec::new();
        for key in all_keys.into_iter().skip(offset) {
            if orders.len() >= limit {
                break;
            }

            let order_id = keys::extract_order_id_from_user_key(&key);
            if let Some(order) = self.get_order(&order_id)? {
                orders.push(order);
            }
        }

        Ok(orders)
    }

    // =========================================================================
    // Subscription Operations
    // =========================================================================

    fn put_subscription(&self, subscription: &Subscription) -> Result<()> {
        let cf = self.cf(cf::SUBSCRIPTIONS)?;
        let key = keys::subscription_key(&subscription.user_id);
        let value = Self::serialize(subscription)?;

        self.db
            .put_cf(&cf, key, value)
            .map_err(|e| StoreError::Database(e.to_string()))?;

        Ok(())
    }

    fn put_subscription_guarded(
        &self,
        subscription: &Subscription,
        expected_version: u64,
    ) -> Result<()> {
        let _guard = self.lock_writes();

        if let Some(stored) = self.get_subscription(&subscription.user_id)? {
            if stored.version != expected_version {
                return Err(StoreError::VersionConflict {
                    expected: expected_version,
                    found: stored.version,
                });
            }
        } else if expected_version != 0 {
            return Err(StoreError::NotFound);
        }

        self.put_subscription(subscription)
    }

    fn put_subscription_if_absent(&self, subscription: &Subscription) -> Result<Subscription> {
        let _guard = self.lock_writes();
        if let Some(existing) = self.get_subscription(&subscription.user_id)? {
            return Ok(existing);
        }
        self.put_subscription(subscription)?;
        Ok(subscription.clone())
    }

    fn get_subscription(&self, user_id: &UserId) -> Result<Option<Subscription>> {
        let cf = self.cf(cf::SUBSCRIPTIONS)?;
        let key = keys::subscription_key(user_id);

        self.db
            .get_cf(&cf, key)
            .map_err(|e| StoreError::Database(e.to_string()))?
            .map(|data| Self::deserialize(&data))
            .transpose()
    }

    // =========================================================================
    // Scan Operations
    // =========================================================================

    fn put_scan(&self, scan: &ScanResult) -> Result<()> {
        let cf_scans = self.cf(cf::SCANS)?;
        let scan_key = keys::scan_key(&scan.id);
        let value = Self::serialize(scan)?;

        let mut batch = WriteBatch::default();
        batch.put_cf(&cf_scans, &scan_key, &value);

        if let Some(pond_id) = &scan.pond_id {
            let cf_by_pond = self.cf(cf::SCANS_BY_POND)?;
            let index_key = keys::pond_scan_key(pond_id, &scan.recorded_at, &scan.id);
            batch.put_cf(&cf_by_pond, &index_key, []);
        }

        self.db
            .write(batch)
            .map_err(|e| StoreError::Database(e.to_string()))?;

        Ok(())
    }

    fn get_scan(&self, scan_id: &ScanId) -> Result<Option<ScanResult>> {
        let cf = self.cf(cf::SCANS)?;
        let key = keys::scan_key(scan_id);

        self.db
            .get_cf(&cf, key)
            .map_err(|e| StoreError::Database(e.to_string()))?
            .map(|data| Self::deserialize(&data))
            .transpose()
    }

    fn list_scans(
        &self,
        pond_id: Option<&PondId>,
        from: DateTime<Utc>,
        to: DateTime<Utc>,
    ) -> Result<Vec<ScanResult>> {
        let mut scans = Vec::new();

        if let Some(pond_id) = pond_id {
            // Walk the time-ordered pond index, starting at the window floor.
            let cf_by_pond = self.cf(cf::SCANS_BY_POND)?;
            let prefix = keys::pond_scans_prefix(pond_id);
            let start = keys::pond_scan_key(pond_id, &from, &ScanId::from_uuid(uuid::Uuid::nil()));

            let iter = self.db.iterator_cf(
                &cf_by_pond,
                IteratorMode::From(&start, rocksdb::Direction::Forward),
            );

            for item in iter {
                let (key, _) = item.map_err(|e| StoreError::Database(e.to_string()))?;

                if !key.starts_with(&prefix) {
                    break;
                }

                let scan_id = keys::extract_scan_id_from_pond_key(&key);
                if let Some(scan) = self.get_scan(&scan_id)? {
                    if scan.recorded_at > to {
                        break;
                    }
                    if scan.active {
                        scans.push(scan);
                    }
                }
            }
        } else {
            // No pond filter: scan the primary column family.
            let cf_scans = self.cf(cf::SCANS)?;
            let iter = self.db.iterator_cf(&cf_scans, IteratorMode::Start);

            for item in iter {
                let (_, value) = item.map_err(|e| StoreError::Database(e.to_string()))?;
                let scan: ScanResult = Self::deserialize(&value)?;
                if scan.active && scan.recorded_at >= from && scan.recorded_at <= to {
                    scans.push(scan);
                }
            }
        }

        Ok(scans)
    }

    // =========================================================================
    // Compound Operations
    // =========================================================================

    fn commit_checkout(&self, user: &User, expected_version: u64, order: &Order) -> Result<()> {
        let _guard = self.lock_writes();
        self.check_user_version(&user.id, expected_version)?;

        let cf_users = self.cf(cf::USERS)?;
        let cf_orders = self.cf(cf::ORDERS)?;
        let cf_by_user = self.cf(cf::ORDERS_BY_USER)?;

        let user_key = keys::user_key(&user.id);
        let order_key = keys::order_key(&order.id);
        let user_order_key = keys::user_order_key(&order.user_id, &order.created_at, &order.id);

        let user_value = Self::serialize(user)?;
        let order_value = Self::serialize(order)?;

        // Order creation and the cart-clearing user update land together or
        // not at all.
        let mut batch = WriteBatch::default();
        batch.put_cf(&cf_orders, &order_key, &order_value);
        batch.put_cf(&cf_by_user, &user_order_key, []);
        batch.put_cf(&cf_users, &user_key, &user_value);

        self.db
            .write(batch)
            .map_err(|e| StoreError::Database(e.to_string()))?;

        Ok(())
    }

    fn complete_order(&self, user: &User, expected_version: u64, order: &Order) -> Result<()> {
        let _guard = self.lock_writes();
        self.check_user_version(&user.id, expected_version)?;

        let cf_users = self.cf(cf::USERS)?;
        let cf_orders = self.cf(cf::ORDERS)?;

        let user_key = keys::user_key(&user.id);
        let order_key = keys::order_key(&order.id);

        let user_value = Self::serialize(user)?;
        let order_value = Self::serialize(order)?;

        let mut batch = WriteBatch::default();
        batch.put_cf(&cf_orders, &order_key, &order_value);
        batch.put_cf(&cf_users, &user_key, &user_value);

        self.db
            .write(batch)
            .map_err(|e| StoreError::Database(e.to_string()))?;

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use aquafarm_core::{OrderItem, OrderStatus, Plan, Subscription};
    use tempfile::TempDir;

    fn create_test_store() -> (RocksStore, TempDir) {
        let dir = TempDir::new().unwrap();
        let store = RocksStore::open(dir.path()).unwrap();
        (store, dir)
    }

    fn product(price_cents: i64) -> Product {
        Product::new("Test product".into(), price_cents, "USD".into())
    }

    #[test]
    fn user_roundtrip() {
        let (store, _dir) = create_test_store();
        let mut user = User::new(UserId::generate());
        user.cart.set_line(ProductId::generate(), 3);

        store.put_user(&user).unwrap();

        let retrieved = store.get_user(&user.id).unwrap().unwrap();
        assert_eq!(retrieved.cart.items.len(), 1);
        assert_eq!(retrieved.version, 0);

        assert!(store.get_user(&UserId::generate()).unwrap().is_none());
    }

    #[test]
    fn guarded_put_rejects_stale_version() {
        let (store, _dir) = create_test_store();
        let mut user = User::new(UserId::generate());
        store.put_user(&user).unwrap();

        // First writer wins.
        user.version = 1;
        store.put_user_guarded(&user, 0).unwrap();

        // Second writer still holds version 0 and must lose.
        let mut stale = user.clone();
        stale.version = 1;
        let result = store.put_user_guarded(&stale, 0);
        assert!(matches!(
            result,
            Err(StoreError::VersionConflict {
                expected: 0,
                found: 1
            })
        ));
    }

    #[test]
    fn product_roundtrip() {
        let (store, _dir) = create_test_store();
        let product = product(1299);

        store.put_product(&product).unwrap();

        let retrieved = store.get_product(&product.id).unwrap().unwrap();
        assert_eq!(retrieved.price_cents, 1299);
        assert!(retrieved.active);
    }

    #[test]
    fn orders_list_newest_first_with_pagination() {
        let (store, _dir) = create_test_store();
        let user_id = UserId::generate();

        let mut first = Order::new(
            user_id,
            vec![OrderItem {
                product_id: ProductId::generate(),
                qty: 1,
                price_at_purchase_cents: 100,
            }],
            OrderStatus::Completed,
        );
        first.created_at = first.created_at - chrono::Duration::seconds(10);
        store.put_order(&first).unwrap();

        let second = Order::new(
            user_id,
            vec![OrderItem {
                product_id: ProductId::generate(),
                qty: 2,
                price_at_purchase_cents: 250,
            }],
            OrderStatus::Completed,
        );
        store.put_order(&second).unwrap();

        let orders = store.list_orders_by_user(&user_id, 10, 0).unwrap();
        assert_eq!(orders.len(), 2);
        assert_eq!(orders[0].id, second.id); // Newest first
        assert_eq!(orders[1].id, first.id);

        let page1 = store.list_orders_by_user(&user_id, 1, 0).unwrap();
        let page2 = store.list_orders_by_user(&user_id, 1, 1).unwrap();
        assert_eq!(page1[0].id, second.id);
        assert_eq!(page2[0].id, first.id);
    }

    #[test]
    fn subscription_keyed_by_user_stays_unique() {
        let (store, _dir) = create_test_store();
        let user_id = UserId::generate();

        let mut sub = Subscription::free(user_id);
        store.put_subscription(&sub).unwrap();

        sub.apply_plan(Plan::Premium, 999, "USD".into());
        store.put_subscription(&sub).unwrap();

        // Still exactly one document for the user.
        let retrieved = store.get_subscription(&user_id).unwrap().unwrap();
        assert_eq!(retrieved.plan, Plan::Premium);
        assert_eq!(retrieved.payment_history.len(), 1);
    }

    #[test]
    fn commit_checkout_writes_order_and_user_atomically() {
        let (store, _dir) = create_test_store();
        let product_id = ProductId::generate();

        let mut user = User::new(UserId::generate());
        user.cart.set_line(product_id, 2);
        store.put_user(&user).unwrap();

        let order = Order::new(
            user.id,
            vec![OrderItem {
                product_id,
                qty: 2,
                price_at_purchase_cents: 1000,
            }],
            OrderStatus::Completed,
        );

        let mut committed = user.clone();
        committed.grant_ownership(product_id, 2);
        committed.cart.clear();
        committed.version = 1;

        store.commit_checkout(&committed, 0, &order).unwrap();

        let stored_order = store.get_order(&order.id).unwrap().unwrap();
        assert_eq!(stored_order.total_cents, 2000);

        let stored_user = store.get_user(&user.id).unwrap().unwrap();
        assert!(stored_user.cart.is_empty());
        assert_eq!(stored_user.owned_products, vec![product_id, product_id]);
        assert_eq!(stored_user.version, 1);

        // Indexed for listing.
        let orders = store.list_orders_by_user(&user.id, 10, 0).unwrap();
        assert_eq!(orders.len(), 1);
    }

    #[test]
    fn commit_checkout_conflict_leaves_everything_untouched() {
        let (store, _dir) = create_test_store();
        let product_id = ProductId::generate();

        let mut user = User::new(UserId::generate());
        user.cart.set_line(product_id, 1);
        store.put_user(&user).unwrap();

        // Another writer bumps the user first.
        let mut moved = user.clone();
        moved.version = 1;
        store.put_user(&moved).unwrap();

        let order = Order::new(
            user.id,
            vec![OrderItem {
                product_id,
                qty: 1,
                price_at_purchase_cents: 500,
            }],
            OrderStatus::Completed,
        );

        let mut committed = user.clone();
        committed.cart.clear();
        committed.version = 1;

        let result = store.commit_checkout(&committed, 0, &order);
        assert!(matches!(result, Err(StoreError::VersionConflict { .. })));

        // No order was created and the cart is still intact.
        assert!(store.get_order(&order.id).unwrap().is_none());
        let stored = store.get_user(&user.id).unwrap().unwrap();
        assert_eq!(stored.cart.items.len(), 1);
    }

    #[test]
    fn complete_order_grants_ownership() {
        let (store, _dir) = create_test_store();
        let product_id = ProductId::generate();

        let user = User::new(UserId::generate());
        store.put_user(&user).unwrap();

        let mut order = Order::new(
            user.id,
            vec![OrderItem {
                product_id,
                qty: 3,
                price_at_purchase_cents: 400,
            }],
            OrderStatus::Pending,
        );
        store.put_order(&order).unwrap();

        order.status = OrderStatus::Completed;
        let mut granted = user.clone();
        granted.grant_ownership(product_id, 3);
        granted.version = 1;

        store.complete_order(&granted, 0, &order).unwrap();

        let stored_order = store.get_order(&order.id).unwrap().unwrap();
        assert_eq!(stored_order.status, OrderStatus::Completed);
        let stored_user = store.get_user(&user.id).unwrap().unwrap();
        assert_eq!(stored_user.owned_products.len(), 3);
    }

    #[test]
    fn concurrent_checkouts_commit_exactly_once() {
        use std::sync::Barrier;

        let (store, _dir) = create_test_store();
        let store = Arc::new(store);

        // Both writers read version 0 and race into the guarded commit;
        // exactly one order may ever come out of one cart.
        for _ in 0..50 {
            let product_id = ProductId::generate();
            let mut user = User::new(UserId::generate());
            user.cart.set_line(product_id, 1);
            store.put_user(&user).unwrap();
            let user_id = user.id;

            let barrier = Arc::new(Barrier::new(2));
            let handles: Vec<_> = (0..2)
                .map(|_| {
                    let store = Arc::clone(&store);
                    let barrier = Arc::clone(&barrier);
                    let user = user.clone();
                    std::thread::spawn(move || {
                        let order = Order::new(
                            user.id,
                            vec![OrderItem {
                                product_id,
                                qty: 1,
                                price_at_purchase_cents: 500,
                            }],
                            OrderStatus::Completed,
                        );
                        let mut committed = user;
                        committed.grant_ownership(product_id, 1);
                        committed.cart.clear();
                        committed.version = 1;
                        barrier.wait();
                        store.commit_checkout(&committed, 0, &order).is_ok()
                    })
                })
                .collect();

            let successes = handles
                .into_iter()
                .map(|h| h.join().unwrap())
                .filter(|committed| *committed)
                .count();
            assert_eq!(successes, 1);

            let orders = store.list_orders_by_user(&user_id, 10, 0).unwrap();
            assert_eq!(orders.len(), 1);
            let stored = store.get_user(&user_id).unwrap().unwrap();
            assert_eq!(stored.owned_products.len(), 1);
        }
    }

    #[test]
    fn put_user_if_absent_keeps_existing_document() {
        let (store, _dir) = create_test_store();
        let id = UserId::generate();

        let mut existing = User::new(id);
        existing.cart.set_line(ProductId::generate(), 2);
        existing.version = 3;
        store.put_user(&existing).unwrap();

        let stored = store.put_user_if_absent(&User::new(id)).unwrap();

        assert_eq!(stored.version, 3);
        assert_eq!(stored.cart.items.len(), 1);
        let persisted = store.get_user(&id).unwrap().unwrap();
        assert_eq!(persisted.cart.items.len(), 1);
    }

    #[test]
    fn put_user_if_absent_creates_when_missing() {
        let (store, _dir) = create_test_store();
        let user = User::new(UserId::generate());

        let stored = store.put_user_if_absent(&user).unwrap();

        assert_eq!(stored.version, 0);
        assert!(store.get_user(&user.id).unwrap().is_some());
    }

    #[test]
    fn guarded_subscription_put_never_loses_ledger_append() {
        let (store, _dir) = create_test_store();
        let user_id = UserId::generate();

        let sub = Subscription::free(user_id);
        store.put_subscription_guarded(&sub, 0).unwrap();

        // Two writers both read version 0; the first append wins.
        let mut first = sub.clone();
        first.apply_plan(Plan::Premium, 999, "USD".into());
        first.version = 1;
        store.put_subscription_guarded(&first, 0).unwrap();

        let mut second = sub.clone();
        second.apply_plan(Plan::Enterprise, 4999, "USD".into());
        second.version = 1;
        let result = store.put_subscription_guarded(&second, 0);
        assert!(matches!(result, Err(StoreError::VersionConflict { .. })));

        // The winner's ledger entry survived the race.
        let stored = store.get_subscription(&user_id).unwrap().unwrap();
        assert_eq!(stored.plan, Plan::Premium);
        assert_eq!(stored.payment_history.len(), 1);
    }

    #[test]
    fn guarded_subscription_put_rejects_nonzero_expectation_on_missing_doc() {
        let (store, _dir) = create_test_store();

        let mut sub = Subscription::free(UserId::generate());
        sub.version = 1;
        let result = store.put_subscription_guarded(&sub, 1);
        assert!(matches!(result, Err(StoreError::NotFound)));
    }

    #[test]
    fn put_subscription_if_absent_keeps_existing_document() {
        let (store, _dir) = create_test_store();
        let user_id = UserId::generate();

        let mut paid = Subscription::free(user_id);
        paid.apply_plan(Plan::Premium, 999, "USD".into());
        paid.version = 1;
        store.put_subscription(&paid).unwrap();

        let stored = store
            .put_subscription_if_absent(&Subscription::free(user_id))
            .unwrap();

        // The paid document with its ledger entry wins over the lazy free.
        assert_eq!(stored.plan, Plan::Premium);
        assert_eq!(stored.payment_history.len(), 1);
        let persisted = store.get_subscription(&user_id).unwrap().unwrap();
        assert_eq!(persisted.payment_history.len(), 1);
    }

    #[test]
    fn list_scans_by_pond_window() {
        let (store, _dir) = create_test_store();
        let pond_id = PondId::generate();
        let now = Utc::now();

        let mut inside = ScanResult::new(Some(pond_id), Some(80.0));
        inside.recorded_at = now - chrono::Duration::days(1);
        store.put_scan(&inside).unwrap();

        let mut outside = ScanResult::new(Some(pond_id), Some(60.0));
        outside.recorded_at = now - chrono::Duration::days(40);
        store.put_scan(&outside).unwrap();

        let mut other_pond = ScanResult::new(Some(PondId::generate()), Some(90.0));
        other_pond.recorded_at = now - chrono::Duration::days(1);
        store.put_scan(&other_pond).unwrap();

        let scans = store
            .list_scans(Some(&pond_id), now - chrono::Duration::days(30), now)
            .unwrap();

        assert_eq!(scans.len(), 1);
        assert_eq!(scans[0].id, inside.id);
    }

    #[test]
    fn list_scans_without_pond_filter() {
        let (store, _dir) = create_test_store();
        let now = Utc::now();

        let mut pondless = ScanResult::new(None, Some(70.0));
        pondless.recorded_at = now - chrono::Duration::days(2);
        store.put_scan(&pondless).unwrap();

        let mut ponded = ScanResult::new(Some(PondId::generate()), Some(85.0));
        ponded.recorded_at = now - chrono::Duration::days(3);
        store.put_scan(&ponded).unwrap();

        let mut deleted = ScanResult::new(None, Some(10.0));
        deleted.recorded_at = now - chrono::Duration::days(2);
        deleted.active = false;
        store.put_scan(&deleted).unwrap();

        let scans = store
            .list_scans(None, now - chrono::Duration::days(30), now)
            .unwrap();

        assert_eq!(scans.len(), 2);
    }
}
