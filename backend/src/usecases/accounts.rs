use std::sync::Arc;

use crates::domain::{
    repositories::accounts::AccountRepository, value_objects::accounts::AccountSummaryDto,
};
use thiserror::Error;
use tracing::{error, info};
use uuid::Uuid;

#[derive(Debug, Error)]
pub enum AccountError {
    #[error("account not found")]
    NotFound,
    #[error("internal server error")]
    Internal(#[from] anyhow::Error),
}

impl AccountError {
    pub fn status_code(&self) -> axum::http::StatusCode {
        use axum::http::StatusCode;
        match self {
            AccountError::NotFound => StatusCode::NOT_FOUND,
            AccountError::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

pub type UseCaseResult<T> = std::result::Result<T, AccountError>;

pub struct AccountUseCase<A>
where
    A: AccountRepository + Send + Sync + 'static,
{
    account_repo: Arc<A>,
}

impl<A> AccountUseCase<A>
where
    A: AccountRepository + Send + Sync + 'static,
{
    pub fn new(account_repo: Arc<A>) -> Self {
        Self { account_repo }
    }

    /// Pure read used by presentation layers; no side effects.
    pub async fn get_summary(&self, account_id: Uuid) -> UseCaseResult<AccountSummaryDto> {
        let account = self
            .account_repo
            .find_by_id(account_id)
            .await
            .map_err(|err| {
                error!(%account_id, db_error = ?err, "accounts: failed to load account");
                AccountError::Internal(err)
            })?
            .ok_or_else(|| {
                info!(%account_id, "accounts: account not found");
                AccountError::NotFound
            })?;

        Ok(AccountSummaryDto::from(account))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Utc;
    use crates::domain::{
        entities::accounts::AccountEntity,
        repositories::accounts::MockAccountRepository,
        value_objects::enums::{account_statuses::AccountStatus, account_tiers::AccountTier},
    };
    use mockall::predicate::eq;

    fn sample_account(account_id: Uuid) -> AccountEntity {
        let now = Utc::now();
        AccountEntity {
            id: account_id,
            tier: AccountTier::Subscription.to_string(),
            status: AccountStatus::Active.to_string(),
            credits_remaining: 7,
            external_subscription_id: Some("sub_42".to_string()),
            renews_at: None,
            current_streak: 3,
            longest_streak: 9,
            last_check_in_date: None,
            weekly_nudge_count: 0,
            nudge_window_started_at: None,
            created_at: now,
            updated_at: now,
        }
    }

    #[tokio::test]
    async fn summary_maps_account_fields() {
        let account_id = Uuid::new_v4();

        let mut account_repo = MockAccountRepository::new();
        let account = sample_account(account_id);
        account_repo
            .expect_find_by_id()
            .with(eq(account_id))
            .returning(move |_| {
                let account = account.clone();
                Box::pin(async move { Ok(Some(account)) })
            });

        let usecase = AccountUseCase::new(Arc::new(account_repo));

        let summary = usecase.get_summary(account_id).await.unwrap();
        assert_eq!(summary.tier, AccountTier::Subscription);
        assert_eq!(summary.status, AccountStatus::Active);
        assert_eq!(summary.credits_remaining, 7);
        assert_eq!(summary.current_streak, 3);
        assert_eq!(summary.longest_streak, 9);
    }

    #[tokio::test]
    async fn summary_returns_not_found_for_unknown_account() {
        let account_id = Uuid::new_v4();

        let mut account_repo = MockAccountRepository::new();
        account_repo
            .expect_find_by_id()
            .with(eq(account_id))
            .returning(|_| Box::pin(async { Ok(None) }));

        let usecase = AccountUseCase::new(Arc::new(account_repo));

        let result = usecase.get_summary(account_id).await;
        assert!(matches!(result, Err(AccountError::NotFound)));
    }
}
