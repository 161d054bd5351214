//! Scan ingestion handler.
//!
//! Scans arrive from the image-analysis pipeline over service-to-service
//! auth. Records are immutable once stored; validation happens here, before
//! any write.

use std::collections::BTreeMap;
use std::sync::Arc;

use axum::extract::State;
use axum::http::StatusCode;
use axum::Json;
use chrono::{DateTime, Utc};
use serde::Deserialize;

use aquafarm_core::{PondId, ScanResult};
use aquafarm_store::Store;

use crate::auth::ServiceAuth;
use crate::error::ApiError;
use crate::state::AppState;

/// Scan ingestion request body.
#[derive(Debug, Deserialize)]
pub struct IngestScanRequest {
    /// The pond the scan was taken in, if known.
    pub pond_id: Option<PondId>,
    /// When the scan was taken; defaults to now.
    pub recorded_at: Option<DateTime<Utc>>,
    /// Overall health score, 0–100.
    pub health_score: Option<f64>,
    /// Free-form numeric metrics.
    #[serde(default)]
    pub metrics: BTreeMap<String, f64>,
    /// Raw disease-prediction payload.
    pub disease_prediction: Option<serde_json::Value>,
}

/// Store one scan result.
pub async fn ingest_scan(
    State(state): State<Arc<AppState>>,
    service: ServiceAuth,
    Json(body): Json<IngestScanRequest>,
) -> Result<(StatusCode, Json<serde_json::Value>), ApiError> {
    if let Some(score) = body.health_score {
        if !score.is_finite() || !(0.0..=100.0).contains(&score) {
            return Err(ApiError::BadRequest(
                "health_score must be between 0 and 100".into(),
            ));
        }
    }
    for (key, value) in &body.metrics {
        if !value.is_finite() {
            return Err(ApiError::BadRequest(format!(
                "metric {key} is not a finite number"
            )));
        }
    }

    let mut scan = ScanResult::new(body.pond_id, body.health_score);
    if let Some(recorded_at) = body.recorded_at {
        scan.recorded_at = recorded_at;
    }
    scan.metrics = body.metrics;
    scan.disease_prediction = body.disease_prediction;

    state.store.put_scan(&scan)?;

    tracing::info!(
        scan_id = %scan.id,
        pond_id = ?scan.pond_id,
        source = %service.service_name,
        "Scan result ingested"
    );

    Ok((
        StatusCode::CREATED,
        Json(serde_json::json!({ "scan_id": scan.id.to_string() })),
    ))
}
