use serde::Serialize;
use uuid::Uuid;

use crate::domain::entities::accounts::AccountEntity;
use crate::domain::value_objects::enums::{
    account_statuses::AccountStatus, account_tiers::AccountTier,
};

#[derive(Debug, Clone, Serialize, PartialEq)]
pub struct AccountSummaryDto {
    pub account_id: Uuid,
    pub tier: AccountTier,
    pub status: AccountStatus,
    pub credits_remaining: i32,
    pub current_streak: i32,
    pub longest_streak: i32,
}

impl From<AccountEntity> for AccountSummaryDto {
    fn from(value: AccountEntity) -> Self {
        Self {
            account_id: value.id,
            tier: AccountTier::from_str(&value.tier),
            status: AccountStatus::from_str(&value.status),
            credits_remaining: value.credits_remaining,
            current_streak: value.current_streak,
            longest_streak: value.longest_streak,
        }
    }
}
