//! Subscription lifecycle handlers.
//!
//! One subscription document per user, lazily provisioned as free/active.
//! The payment history inside the document is the sole audit trail: it is
//! only ever appended to, including across cancel/resubscribe cycles.

use std::sync::Arc;

use axum::extract::State;
use axum::Json;
use serde::{Deserialize, Serialize};

use aquafarm_core::{PaymentRecord, Plan, Subscription};
use aquafarm_store::Store;

use crate::auth::AuthUser;
use crate::error::ApiError;
use crate::state::AppState;

/// Ledger entry response.
#[derive(Debug, Serialize)]
pub struct PaymentRecordResponse {
    /// Payment timestamp.
    pub date: String,
    /// Amount in cents.
    pub amount_cents: i64,
    /// Transaction ID.
    pub transaction_id: String,
    /// Payment outcome.
    pub status: String,
}

impl From<&PaymentRecord> for PaymentRecordResponse {
    fn from(record: &PaymentRecord) -> Self {
        Self {
            date: record.date.to_rfc3339(),
            amount_cents: record.amount_cents,
            transaction_id: record.transaction_id.to_string(),
            status: format!("{:?}", record.status).to_lowercase(),
        }
    }
}

/// Subscription response.
#[derive(Debug, Serialize)]
pub struct SubscriptionResponse {
    /// Owning user.
    pub user_id: String,
    /// Current plan.
    pub plan: Plan,
    /// Current status.
    pub status: String,
    /// Term start.
    pub start_date: String,
    /// Term end; absent for the free plan.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub end_date: Option<String>,
    /// Auto-renewal flag.
    pub auto_renew: bool,
    /// Plan price in cents.
    pub price_cents: i64,
    /// ISO currency code.
    pub currency: String,
    /// Append-only payment ledger, oldest first.
    pub payment_history: Vec<PaymentRecordResponse>,
}

impl From<&Subscription> for SubscriptionResponse {
    fn from(sub: &Subscription) -> Self {
        Self {
            user_id: sub.user_id.to_string(),
            plan: sub.plan,
            status: format!("{:?}", sub.status).to_lowercase(),
            start_date: sub.start_date.to_rfc3339(),
            end_date: sub.end_date.map(|d| d.to_rfc3339()),
            auto_renew: sub.auto_renew,
            price_cents: sub.price_cents,
            currency: sub.currency.clone(),
            payment_history: sub
                .payment_history
                .iter()
                .map(PaymentRecordResponse::from)
                .collect(),
        }
    }
}

/// Fetch the caller's subscription, lazily creating the free one.
///
/// The subscriptions column family is keyed by user id, so racing lazy
/// creates converge on a single document.
pub async fn get_current(
    State(state): State<Arc<AppState>>,
    auth: AuthUser,
) -> Result<Json<SubscriptionResponse>, ApiError> {
    if let Some(sub) = state.store.get_subscription(&auth.user_id)? {
        return Ok(Json(SubscriptionResponse::from(&sub)));
    }

    // If another writer created the document between the read and this
    // point, the stored one wins and is returned instead.
    let sub = state
        .store
        .put_subscription_if_absent(&Subscription::free(auth.user_id))?;

    tracing::info!(user_id = %auth.user_id, "Provisioned free subscription on first access");

    Ok(Json(SubscriptionResponse::from(&sub)))
}

/// Subscribe request body.
#[derive(Debug, Deserialize)]
pub struct SubscribeRequest {
    /// Plan name: "free", "premium", or "enterprise".
    pub plan: String,
}

/// Switch the caller to a plan, restarting the term.
///
/// Paid plans append exactly one successful ledger entry with a fresh
/// transaction id; the free plan records nothing.
pub async fn subscribe(
    State(state): State<Arc<AppState>>,
    auth: AuthUser,
    Json(body): Json<SubscribeRequest>,
) -> Result<Json<SubscriptionResponse>, ApiError> {
    let plan = Plan::parse(&body.plan)
        .ok_or_else(|| ApiError::BadRequest(format!("unknown plan: {}", body.plan)))?;

    let spec = state
        .config
        .plans
        .get(plan)
        .ok_or_else(|| ApiError::BadRequest(format!("plan not offered: {}", body.plan)))?;

    let mut sub = state
        .store
        .get_subscription(&auth.user_id)?
        .unwrap_or_else(|| Subscription::free(auth.user_id));

    // The version guard turns a concurrent ledger append into a 409
    // instead of silently dropping one of the entries.
    let expected_version = sub.version;
    sub.apply_plan(plan, spec.price_cents, spec.currency.clone());
    sub.version += 1;
    state.store.put_subscription_guarded(&sub, expected_version)?;

    tracing::info!(
        user_id = %auth.user_id,
        plan = %plan.as_str(),
        price_cents = %spec.price_cents,
        ledger_len = %sub.payment_history.len(),
        "Subscription plan applied"
    );

    Ok(Json(SubscriptionResponse::from(&sub)))
}

/// Cancel the caller's subscription.
///
/// Fails on the free plan (nothing to cancel). The plan value stays as-is;
/// the downgrade at period end belongs to a scheduled job, not this path.
pub async fn cancel(
    State(state): State<Arc<AppState>>,
    auth: AuthUser,
) -> Result<Json<SubscriptionResponse>, ApiError> {
    let mut sub = state
        .store
        .get_subscription(&auth.user_id)?
        .ok_or_else(|| ApiError::NotFound("no subscription".into()))?;

    if sub.plan.is_free() {
        return Err(ApiError::InvalidState(
            "free plan has nothing to cancel".into(),
        ));
    }

    let expected_version = sub.version;
    sub.cancel();
    sub.version += 1;
    state.store.put_subscription_guarded(&sub, expected_version)?;

    tracing::info!(user_id = %auth.user_id, "Subscription cancelled");

    Ok(Json(SubscriptionResponse::from(&sub)))
}
