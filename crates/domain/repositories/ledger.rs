use anyhow::Result;
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use mockall::automock;
use uuid::Uuid;

use crate::domain::value_objects::enums::{
    account_statuses::AccountStatus, account_tiers::AccountTier,
};

#[async_trait]
#[automock]
pub trait LedgerRepository {
    /// Guarded single-statement decrement: succeeds iff `credits_remaining > 0`.
    /// `Ok(false)` is the normal insufficient-credit outcome, not an error.
    async fn reserve_credit(&self, account_id: Uuid) -> Result<bool>;

    /// Unconditional add on an existing account row. The caller guarantees at
    /// most one refund per failed job. Returns whether a row was updated.
    async fn refund_credits(&self, account_id: Uuid, amount: i32) -> Result<bool>;

    /// Upsert-add: creates the account on first entitlement event.
    async fn refill_credits(&self, account_id: Uuid, amount: i32) -> Result<bool>;

    /// Idempotent upsert of tier/status/subscription handle. Safe to call
    /// concurrently with reserve/refund.
    async fn upsert_entitlement(
        &self,
        account_id: Uuid,
        tier: AccountTier,
        status: AccountStatus,
        external_subscription_id: Option<String>,
        renews_at: Option<DateTime<Utc>>,
    ) -> Result<()>;
}
