//! Service configuration.

use std::path::Path;

use aquafarm_core::PlanCatalog;

/// Service configuration loaded from environment variables.
#[derive(Debug, Clone)]
pub struct ServiceConfig {
    /// Address to listen on (default: "0.0.0.0:8080").
    pub listen_addr: String,

    /// Path to `RocksDB` data directory (default: "/data/aquafarm").
    pub data_dir: String,

    /// Service API key for service-to-service auth (scan ingestion).
    pub service_api_key: Option<String>,

    /// CORS allowed origins.
    pub cors_origins: Vec<String>,

    /// Maximum request body size in bytes.
    pub max_body_bytes: usize,

    /// Request timeout in seconds.
    pub request_timeout_seconds: u64,

    /// Subscription plan catalog.
    pub plans: PlanCatalog,
}

impl ServiceConfig {
    /// Load configuration from environment variables and the optional plan
    /// catalog file.
    #[must_use]
    pub fn from_env() -> Self {
        Self {
            listen_addr: std::env::var("LISTEN_ADDR").unwrap_or_else(|_| "0.0.0.0:8080".into()),
            data_dir: std::env::var("DATA_DIR").unwrap_or_else(|_| "/data/aquafarm".into()),
            service_api_key: std::env::var("SERVICE_API_KEY").ok(),
            cors_origins: std::env::var("CORS_ORIGINS")
                .unwrap_or_else(|_| "*".into())
                .split(',')
                .map(|s| s.trim().to_string())
                .collect(),
            max_body_bytes: std::env::var("MAX_BODY_BYTES")
                .ok()
                .and_then(|s| s.parse().ok())
                .unwrap_or(1024 * 1024), // 1MB
            request_timeout_seconds: std::env::var("REQUEST_TIMEOUT_SECONDS")
                .ok()
                .and_then(|s| s.parse().ok())
                .unwrap_or(30),
            plans: load_plan_catalog(),
        }
    }
}

/// Load the plan catalog from file or fall back to the built-in defaults.
fn load_plan_catalog() -> PlanCatalog {
    let catalog_paths = [
        ".config/plans.json",
        "aquafarm/.config/plans.json",
        "../.config/plans.json",
    ];

    for path in &catalog_paths {
        if let Ok(catalog) = load_json_file::<PlanCatalog>(path) {
            tracing::info!(path = %path, "Loaded plan catalog from file");
            return catalog;
        }
    }

    tracing::debug!("Plan catalog file not found, using built-in defaults");
    PlanCatalog::default()
}

/// Load a JSON file into a deserializable value.
fn load_json_file<T: serde::de::DeserializeOwned>(path: &str) -> Result<T, std::io::Error> {
    let path = Path::new(path);
    if !path.exists() {
        return Err(std::io::Error::new(
            std::io::ErrorKind::NotFound,
            "file not found",
        ));
    }
    let contents = std::fs::read_to_string(path)?;
    serde_json::from_str(&contents)
        .map_err(|e| std::io::Error::new(std::io::ErrorKind::InvalidData, e))
}

impl Default for ServiceConfig {
    fn default() -> Self {
        Self {
            listen_addr: "0.0.0.0:8080".into(),
            data_dir: "/data/aquafarm".into(),
            service_api_key: None,
            cors_origins: vec!["*".into()],
            max_body_bytes: 1024 * 1024,
            request_timeout_seconds: 30,
            plans: PlanCatalog::default(),
        }
    }
}
