//! Scan result types.
//!
//! Scan results are produced by the scan-ingestion collaborator and consumed
//! read-only by the analytics aggregator. They are immutable after creation
//! except for soft delete.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

use crate::{PondId, ScanId};

/// A timestamped health-metric record for a pond.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ScanResult {
    /// Scan ID.
    pub id: ScanId,

    /// The pond the scan was taken in, if known.
    pub pond_id: Option<PondId>,

    /// When the scan was taken.
    pub recorded_at: DateTime<Utc>,

    /// Overall health score, 0–100, when the analysis produced one.
    pub health_score: Option<f64>,

    /// Free-form numeric metrics. Key sets vary between scans; aggregation
    /// averages each key only over the scans that carry it.
    pub metrics: BTreeMap<String, f64>,

    /// Raw disease-prediction payload from the analysis collaborator.
    pub disease_prediction: Option<serde_json::Value>,

    /// Soft-delete flag.
    pub active: bool,

    /// When the record was stored.
    pub created_at: DateTime<Utc>,
}

impl ScanResult {
    /// Create a new scan record taken now.
    #[must_use]
    pub fn new(pond_id: Option<PondId>, health_score: Option<f64>) -> Self {
        let now = Utc::now();
        Self {
            id: ScanId::generate(),
            pond_id,
            recorded_at: now,
            health_score,
            metrics: BTreeMap::new(),
            disease_prediction: None,
            active: true,
            created_at: now,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn new_scan_is_active() {
        let scan = ScanResult::new(Some(PondId::generate()), Some(87.5));
        assert!(scan.active);
        assert_eq!(scan.health_score, Some(87.5));
        assert!(scan.metrics.is_empty());
    }
}
