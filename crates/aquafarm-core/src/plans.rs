//! Plan catalog: static pricing and feature configuration.
//!
//! The catalog is process-wide read-only configuration handed to the
//! subscription handlers through the service config, never a global.

use serde::{Deserialize, Serialize};
use std::collections::HashMap;

use crate::Plan;

/// Premium plan monthly price in cents ($9.99).
pub const PREMIUM_PLAN_PRICE_CENTS: i64 = 999;

/// Enterprise plan monthly price in cents ($49.99).
pub const ENTERPRISE_PLAN_PRICE_CENTS: i64 = 4999;

/// Pricing and features for one plan.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PlanSpec {
    /// Monthly price in cents.
    pub price_cents: i64,

    /// ISO currency code.
    pub currency: String,

    /// Feature labels surfaced to clients and capability checks.
    pub features: Vec<String>,
}

/// The full plan catalog.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PlanCatalog {
    /// Plan lookup table.
    pub plans: HashMap<Plan, PlanSpec>,
}

impl Default for PlanCatalog {
    fn default() -> Self {
        let mut plans = HashMap::new();

        plans.insert(
            Plan::Free,
            PlanSpec {
                price_cents: 0,
                currency: "USD".into(),
                features: vec![
                    "basic_monitoring".into(),
                    "manual_scans".into(),
                ],
            },
        );
        plans.insert(
            Plan::Premium,
            PlanSpec {
                price_cents: PREMIUM_PLAN_PRICE_CENTS,
                currency: "USD".into(),
                features: vec![
                    "basic_monitoring".into(),
                    "manual_scans".into(),
                    "health_analytics".into(),
                    "expert_support".into(),
                ],
            },
        );
        plans.insert(
            Plan::Enterprise,
            PlanSpec {
                price_cents: ENTERPRISE_PLAN_PRICE_CENTS,
                currency: "USD".into(),
                features: vec![
                    "basic_monitoring".into(),
                    "manual_scans".into(),
                    "health_analytics".into(),
                    "expert_support".into(),
                    "multi_farm".into(),
                    "priority_support".into(),
                ],
            },
        );

        Self { plans }
    }
}

impl PlanCatalog {
    /// Look up the spec for a plan.
    #[must_use]
    pub fn get(&self, plan: Plan) -> Option<&PlanSpec> {
        self.plans.get(&plan)
    }
}
