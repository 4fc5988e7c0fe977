use chrono::{DateTime, Utc};
use serde::Serialize;
use uuid::Uuid;

use crate::domain::value_objects::enums::{
    account_statuses::AccountStatus, account_tiers::AccountTier,
};

/// Outcome of ingesting one provider event. `Duplicate` is a normal result,
/// not an error: the dedup row already existed and no mutation was applied.
#[derive(Debug, Clone, Copy, Serialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum IngestOutcome {
    Applied,
    Duplicate,
}

/// Ledger mutation derived from a verified provider event. Applied inside the
/// same transaction as the dedup-row insert, so a failed effect rolls back the
/// marker and a redelivery can retry legitimately.
#[derive(Debug, Clone, PartialEq)]
pub enum LedgerEffect {
    Refill {
        account_id: Uuid,
        amount: i32,
    },
    UpsertEntitlement {
        account_id: Uuid,
        tier: AccountTier,
        status: AccountStatus,
        external_subscription_id: Option<String>,
        renews_at: Option<DateTime<Utc>>,
        refill: Option<i32>,
    },
    None,
}

impl LedgerEffect {
    pub fn account_id(&self) -> Option<Uuid> {
        match self {
            LedgerEffect::Refill { account_id, .. } => Some(*account_id),
            LedgerEffect::UpsertEntitlement { account_id, .. } => Some(*account_id),
            LedgerEffect::None => None,
        }
    }
}
