use chrono::{DateTime, NaiveDate, Utc};
use diesel::prelude::*;
use uuid::Uuid;

use crate::infra::db::postgres::schema::accounts;

#[derive(Debug, Clone, Identifiable, Selectable, Queryable)]
#[diesel(table_name = accounts)]
pub struct AccountEntity {
    pub id: Uuid,
    pub tier: String,
    pub status: String,
    pub credits_remaining: i32,
    pub external_subscription_id: Option<String>,
    pub renews_at: Option<DateTime<Utc>>,
    pub current_streak: i32,
    pub longest_streak: i32,
    pub last_check_in_date: Option<NaiveDate>,
    pub weekly_nudge_count: i32,
    pub nudge_window_started_at: Option<DateTime<Utc>>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Insertable)]
#[diesel(table_name = accounts)]
pub struct InsertAccountEntity {
    pub id: Uuid,
    pub tier: String,
    pub status: String,
    pub credits_remaining: i32,
    pub external_subscription_id: Option<String>,
    pub renews_at: Option<DateTime<Utc>>,
    pub current_streak: i32,
    pub longest_streak: i32,
    pub last_check_in_date: Option<NaiveDate>,
    pub weekly_nudge_count: i32,
    pub nudge_window_started_at: Option<DateTime<Utc>>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl InsertAccountEntity {
    /// Default row for an account seen for the first time (free tier, no credits).
    pub fn free(account_id: Uuid) -> Self {
        let now = Utc::now();
        Self {
            id: account_id,
            tier: crate::domain::value_objects::enums::account_tiers::AccountTier::Free
                .to_string(),
            status: crate::domain::value_objects::enums::account_statuses::AccountStatus::Active
                .to_string(),
            credits_remaining: 0,
            external_subscription_id: None,
            renews_at: None,
            current_streak: 0,
            longest_streak: 0,
            last_check_in_date: None,
            weekly_nudge_count: 0,
            nudge_window_started_at: None,
            created_at: now,
            updated_at: now,
        }
    }
}
