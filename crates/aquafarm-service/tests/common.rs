//! Common test utilities for aquafarm integration tests.

#![allow(dead_code)] // Some utilities are used by different test files

use std::sync::Arc;

use axum::Router;
use axum_test::TestServer;
use chrono::{DateTime, Utc};
use tempfile::TempDir;

use aquafarm_core::{PondId, Product, ProductId, Role, ScanResult, User, UserId};
use aquafarm_service::{create_router, AppState, ServiceConfig};
use aquafarm_store::{RocksStore, Store};

/// Test harness containing everything needed for integration tests.
pub struct TestHarness {
    /// The test server for making HTTP requests.
    pub server: TestServer,
    /// The store, for seeding data behind the API.
    pub store: Arc<RocksStore>,
    /// Temporary directory for the database (kept alive for test duration).
    pub _temp_dir: TempDir,
    /// A test user ID for authenticated requests.
    pub test_user_id: UserId,
    /// The service API key for service-to-service requests.
    pub service_api_key: String,
}

impl TestHarness {
    /// Create a new test harness with a fresh database.
    pub fn new() -> Self {
        let temp_dir = TempDir::new().expect("Failed to create temp directory");
        let store = Arc::new(RocksStore::open(temp_dir.path()).expect("Failed to open store"));

        let service_api_key = "test-service-key".to_string();

        let config = ServiceConfig {
            listen_addr: "127.0.0.1:0".into(),
            data_dir: temp_dir.path().to_string_lossy().to_string(),
            service_api_key: Some(service_api_key.clone()),
            cors_origins: vec!["*".into()],
            max_body_bytes: 1024 * 1024,
            request_timeout_seconds: 30,
            plans: aquafarm_core::PlanCatalog::default(),
        };

        let state = AppState::new(store.clone(), config);
        let router: Router = create_router(state);

        let server = TestServer::new(router).expect("Failed to create test server");
        let test_user_id = UserId::generate();

        Self {
            server,
            store,
            _temp_dir: temp_dir,
            test_user_id,
            service_api_key,
        }
    }

    /// Get the authorization header for user authentication.
    pub fn user_auth_header(&self) -> String {
        format!("Bearer test-token:{}", self.test_user_id)
    }

    /// Get the authorization header for an arbitrary user.
    pub fn auth_header_for(user_id: &UserId) -> String {
        format!("Bearer test-token:{user_id}")
    }

    /// Get a different user's auth header (for testing isolation).
    pub fn other_user_auth_header() -> String {
        let other_user = UserId::generate();
        format!("Bearer test-token:{other_user}")
    }

    /// Seed an active product directly into the store.
    pub fn seed_product(&self, name: &str, price_cents: i64) -> ProductId {
        let product = Product::new(name.to_string(), price_cents, "USD".into());
        self.store.put_product(&product).expect("Failed to seed product");
        product.id
    }

    /// Seed an inactive product directly into the store.
    pub fn seed_inactive_product(&self, name: &str, price_cents: i64) -> ProductId {
        let mut product = Product::new(name.to_string(), price_cents, "USD".into());
        product.active = false;
        self.store.put_product(&product).expect("Failed to seed product");
        product.id
    }

    /// Seed an admin user and return its ID.
    pub fn seed_admin(&self) -> UserId {
        let mut user = User::new(UserId::generate());
        user.role = Role::Admin;
        self.store.put_user(&user).expect("Failed to seed admin");
        user.id
    }

    /// Seed a scan result with an explicit timestamp.
    pub fn seed_scan(
        &self,
        pond_id: Option<PondId>,
        recorded_at: DateTime<Utc>,
        health_score: Option<f64>,
    ) -> ScanResult {
        let mut scan = ScanResult::new(pond_id, health_score);
        scan.recorded_at = recorded_at;
        self.store.put_scan(&scan).expect("Failed to seed scan");
        scan
    }
}

impl Default for TestHarness {
    fn default() -> Self {
        Self::new()
    }
}
