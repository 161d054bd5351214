//! Time-series aggregation over scan results.
//!
//! These are pure functions: given the same set of scans and window they
//! produce identical output regardless of the order the scans are supplied
//! in. Grouping goes through `BTreeMap` so output is always date-sorted.
//! Malformed values (non-finite scores or metrics) are skipped per record
//! rather than failing the whole report.

use chrono::NaiveDate;
use serde::Serialize;
use std::collections::BTreeMap;

use crate::ScanResult;

/// One day of the health-score trend.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct DailyHealthPoint {
    /// UTC calendar date.
    pub date: NaiveDate,

    /// Mean health score over the day's scoreable scans, rounded to the
    /// nearest integer.
    pub avg_health_score: i64,

    /// Number of scans that contributed a score.
    pub count: usize,
}

/// One day of scan-frequency counts.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct DailyCount {
    /// UTC calendar date.
    pub date: NaiveDate,

    /// Number of scans taken that day.
    pub count: usize,
}

/// Scan-frequency report over a window.
#[derive(Debug, Clone, Serialize)]
pub struct FrequencyReport {
    /// Total scans in the window.
    pub total_scans: usize,

    /// `total_scans` divided by the FULL requested window length in days,
    /// not by the number of days with activity, so sparse activity reads as
    /// a low average.
    pub avg_daily_scans: f64,

    /// Per-day counts, date-sorted. Days with no scans are omitted.
    pub frequency: Vec<DailyCount>,
}

/// Compute the daily health-score trend.
///
/// Scans without a score (or with a non-finite one) contribute nothing;
/// days with zero scoreable scans are omitted rather than zero-filled.
#[must_use]
pub fn health_trend(scans: &[ScanResult]) -> Vec<DailyHealthPoint> {
    let mut by_day: BTreeMap<NaiveDate, (f64, usize)> = BTreeMap::new();

    for scan in scans {
        let Some(score) = scan.health_score else {
            continue;
        };
        if !score.is_finite() {
            continue;
        }
        let day = scan.recorded_at.date_naive();
        let entry = by_day.entry(day).or_insert((0.0, 0));
        entry.0 += score;
        entry.1 += 1;
    }

    by_day
        .into_iter()
        .map(|(date, (sum, count))| DailyHealthPoint {
            date,
            #[allow(clippy::cast_precision_loss, clippy::cast_possible_truncation)]
            avg_health_score: (sum / count as f64).round() as i64,
            count,
        })
        .collect()
}

/// Compute per-day scan counts and the window-wide daily average.
///
/// `window_days` is the requested window length; it is the divisor for
/// `avg_daily_scans` even when most days saw no scans.
#[must_use]
pub fn scan_frequency(scans: &[ScanResult], window_days: u32) -> FrequencyReport {
    let mut by_day: BTreeMap<NaiveDate, usize> = BTreeMap::new();

    for scan in scans {
        *by_day.entry(scan.recorded_at.date_naive()).or_insert(0) += 1;
    }

    let total_scans = scans.len();
    let days = window_days.max(1);

    #[allow(clippy::cast_precision_loss)]
    let avg_daily_scans = total_scans as f64 / f64::from(days);

    FrequencyReport {
        total_scans,
        avg_daily_scans,
        frequency: by_day
            .into_iter()
            .map(|(date, count)| DailyCount { date, count })
            .collect(),
    }
}

/// Average every metric key across the scans that carry it.
///
/// Metric maps are ragged: a key absent from some scans is averaged only
/// over the scans where it is present, so both the sum and the count are
/// scoped to presence. Non-finite values are skipped.
#[must_use]
pub fn metric_averages(scans: &[ScanResult]) -> BTreeMap<String, f64> {
    let mut sums: BTreeMap<&str, (f64, usize)> = BTreeMap::new();

    for scan in scans {
        for (key, value) in &scan.metrics {
            if !value.is_finite() {
                continue;
            }
            let entry = sums.entry(key).or_insert((0.0, 0));
            entry.0 += value;
            entry.1 += 1;
        }
    }

    sums.into_iter()
        .map(|(key, (sum, count))| {
            #[allow(clippy::cast_precision_loss)]
            (key.to_owned(), sum / count as f64)
        })
        .collect()
}
