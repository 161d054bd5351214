//! Analytics handlers.
//!
//! These fetch a window of scan results and hand them to the pure
//! aggregation functions in `aquafarm_core::analytics`. Reads never block
//! writers; a scan landing mid-aggregation may or may not be included.

use std::collections::BTreeMap;
use std::sync::Arc;

use axum::extract::{Query, State};
use axum::Json;
use chrono::{DateTime, Duration, Utc};
use serde::{Deserialize, Serialize};

use aquafarm_core::analytics::{self, DailyCount, DailyHealthPoint};
use aquafarm_core::{PondId, ScanResult};
use aquafarm_store::Store;

use crate::auth::AuthUser;
use crate::error::ApiError;
use crate::state::AppState;

/// Default analytics window in days.
const DEFAULT_WINDOW_DAYS: u32 = 30;

/// Maximum analytics window in days.
const MAX_WINDOW_DAYS: u32 = 365;

/// Analytics query parameters.
#[derive(Debug, Deserialize)]
pub struct AnalyticsQuery {
    /// Restrict to one pond.
    pub pond_id: Option<PondId>,
    /// Window length in days, default 30, clamped to 1..=365.
    pub days: Option<u32>,
}

/// The resolved reporting window.
#[derive(Debug, Serialize)]
pub struct Period {
    /// Window start.
    pub from: DateTime<Utc>,
    /// Window end.
    pub to: DateTime<Utc>,
    /// Window length in days.
    pub days: u32,
}

/// Resolve the query into a window and fetch the matching scans.
fn fetch_window(
    state: &AppState,
    query: &AnalyticsQuery,
) -> Result<(Period, Vec<ScanResult>), ApiError> {
    let days = query
        .days
        .unwrap_or(DEFAULT_WINDOW_DAYS)
        .clamp(1, MAX_WINDOW_DAYS);

    let to = Utc::now();
    let from = to - Duration::days(i64::from(days));

    let scans = state.store.list_scans(query.pond_id.as_ref(), from, to)?;

    Ok((Period { from, to, days }, scans))
}

/// Health-trend response.
#[derive(Debug, Serialize)]
pub struct HealthTrendsResponse {
    /// The reporting window.
    pub period: Period,
    /// Daily mean health scores, date-sorted; unscored days omitted.
    pub trends: Vec<DailyHealthPoint>,
}

/// Daily mean health score over the window.
pub async fn health_trends(
    State(state): State<Arc<AppState>>,
    _auth: AuthUser,
    Query(query): Query<AnalyticsQuery>,
) -> Result<Json<HealthTrendsResponse>, ApiError> {
    let (period, scans) = fetch_window(&state, &query)?;
    let trends = analytics::health_trend(&scans);

    Ok(Json(HealthTrendsResponse { period, trends }))
}

/// Scan-frequency response.
#[derive(Debug, Serialize)]
pub struct ScanFrequencyResponse {
    /// The reporting window.
    pub period: Period,
    /// Total scans in the window.
    pub total_scans: usize,
    /// Total divided by the FULL window length in days.
    pub avg_daily_scans: f64,
    /// Per-day counts, date-sorted.
    pub frequency: Vec<DailyCount>,
}

/// Per-day scan counts over the window.
pub async fn scan_frequency(
    State(state): State<Arc<AppState>>,
    _auth: AuthUser,
    Query(query): Query<AnalyticsQuery>,
) -> Result<Json<ScanFrequencyResponse>, ApiError> {
    let (period, scans) = fetch_window(&state, &query)?;
    let report = analytics::scan_frequency(&scans, period.days);

    Ok(Json(ScanFrequencyResponse {
        period,
        total_scans: report.total_scans,
        avg_daily_scans: report.avg_daily_scans,
        frequency: report.frequency,
    }))
}

/// Metric-averages response.
#[derive(Debug, Serialize)]
pub struct MetricAveragesResponse {
    /// The reporting window.
    pub period: Period,
    /// Per-metric means, each scoped to the scans that carry the key.
    pub averages: BTreeMap<String, f64>,
}

/// Presence-scoped per-metric averages for one pond.
pub async fn metric_averages(
    State(state): State<Arc<AppState>>,
    _auth: AuthUser,
    Query(query): Query<AnalyticsQuery>,
) -> Result<Json<MetricAveragesResponse>, ApiError> {
    if query.pond_id.is_none() {
        return Err(ApiError::BadRequest(
            "pond_id is required for metric averages".into(),
        ));
    }

    let (period, scans) = fetch_window(&state, &query)?;
    let averages = analytics::metric_averages(&scans);

    Ok(Json(MetricAveragesResponse { period, averages }))
}
