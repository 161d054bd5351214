//! Subscription types and the payment ledger.
//!
//! Each user has at most one subscription document (the store keys the
//! subscriptions column family by user id). The `payment_history` vector is
//! the sole audit trail for money-moving events: entries are only ever
//! appended, never edited or removed.

use chrono::{DateTime, Duration, Utc};
use serde::{Deserialize, Serialize};

use crate::{TransactionId, UserId};

/// Length of a paid billing period in days.
pub const BILLING_PERIOD_DAYS: i64 = 30;

/// Available subscription plans.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Plan {
    /// Free tier.
    Free,

    /// Premium plan.
    Premium,

    /// Enterprise plan.
    Enterprise,
}

impl Plan {
    /// Stable lowercase name, matching the wire representation.
    #[must_use]
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::Free => "free",
            Self::Premium => "premium",
            Self::Enterprise => "enterprise",
        }
    }

    /// Parse a plan from its wire name.
    #[must_use]
    pub fn parse(s: &str) -> Option<Self> {
        match s {
            "free" => Some(Self::Free),
            "premium" => Some(Self::Premium),
            "enterprise" => Some(Self::Enterprise),
            _ => None,
        }
    }

    /// Whether this plan carries no charge.
    #[must_use]
    pub const fn is_free(&self) -> bool {
        matches!(self, Self::Free)
    }
}

/// Status of a subscription.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SubscriptionStatus {
    /// Subscription is active.
    Active,

    /// Cancelled by the user; the plan value is downgraded by a scheduled
    /// job at period end, not here.
    Cancelled,

    /// Billing period elapsed without renewal.
    Expired,

    /// Awaiting payment confirmation.
    Pending,
}

/// Outcome of a ledger payment.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PaymentStatus {
    /// Payment settled.
    Success,

    /// Payment failed.
    Failed,

    /// Payment was refunded after settling.
    Refunded,
}

/// One append-only payment ledger entry.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PaymentRecord {
    /// When the payment was taken.
    pub date: DateTime<Utc>,

    /// Amount in cents.
    pub amount_cents: i64,

    /// Freshly minted, time-ordered transaction id.
    pub transaction_id: TransactionId,

    /// Payment outcome.
    pub status: PaymentStatus,
}

/// A user's subscription document.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Subscription {
    /// The owning user.
    pub user_id: UserId,

    /// Current plan.
    pub plan: Plan,

    /// Current status.
    pub status: SubscriptionStatus,

    /// Start of the current term.
    pub start_date: DateTime<Utc>,

    /// End of the current term; `None` for the free plan.
    pub end_date: Option<DateTime<Utc>>,

    /// Whether the subscription renews automatically.
    pub auto_renew: bool,

    /// Price of the current plan in cents.
    pub price_cents: i64,

    /// ISO currency code.
    pub currency: String,

    /// Append-only payment ledger, in insertion (chronological) order.
    pub payment_history: Vec<PaymentRecord>,

    /// Optimistic concurrency counter. Writers that append to the ledger
    /// bump it, and the store rejects writes whose expected version no
    /// longer matches, so an append can never be silently overwritten.
    pub version: u64,

    /// When the subscription document was created.
    pub created_at: DateTime<Utc>,

    /// When the subscription document was last updated.
    pub updated_at: DateTime<Utc>,
}

impl Subscription {
    /// Create the lazily-provisioned free subscription for a user.
    #[must_use]
    pub fn free(user_id: UserId) -> Self {
        let now = Utc::now();
        Self {
            user_id,
            plan: Plan::Free,
            status: SubscriptionStatus::Active,
            start_date: now,
            end_date: None,
            auto_renew: true,
            price_cents: 0,
            currency: "USD".into(),
            payment_history: Vec::new(),
            version: 0,
            created_at: now,
            updated_at: now,
        }
    }

    /// Switch this subscription to `plan`, restarting the term at `now`.
    ///
    /// Paid plans get a fresh 30-day term and one successful ledger entry
    /// with a newly minted transaction id; the free plan clears the end date
    /// and records no payment. Prior ledger entries are never touched.
    pub fn apply_plan(&mut self, plan: Plan, price_cents: i64, currency: String) {
        let now = Utc::now();

        self.plan = plan;
        self.status = SubscriptionStatus::Active;
        self.price_cents = price_cents;
        self.currency = currency;
        self.start_date = now;
        self.updated_at = now;

        if plan.is_free() {
            self.end_date = None;
        } else {
            self.end_date = Some(now + Duration::days(BILLING_PERIOD_DAYS));
            self.payment_history.push(PaymentRecord {
                date: now,
                amount_cents: price_cents,
                transaction_id: TransactionId::generate(),
                status: PaymentStatus::Success,
            });
        }
    }

    /// Mark the subscription cancelled and stop auto-renewal.
    ///
    /// The plan value and the ledger are left untouched.
    pub fn cancel(&mut self) {
        self.status = SubscriptionStatus::Cancelled;
        self.auto_renew = false;
        self.updated_at = Utc::now();
    }
}
