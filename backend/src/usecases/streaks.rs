use std::sync::Arc;

use chrono::{NaiveDate, Utc};
use crates::domain::{
    repositories::streaks::StreakRepository, value_objects::streaks::CheckInResult,
};
use thiserror::Error;
use tracing::{error, info};
use uuid::Uuid;

#[derive(Debug, Error)]
pub enum StreakError {
    #[error("internal server error")]
    Internal(#[from] anyhow::Error),
}

impl StreakError {
    pub fn status_code(&self) -> axum::http::StatusCode {
        use axum::http::StatusCode;
        match self {
            StreakError::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

pub type UseCaseResult<T> = std::result::Result<T, StreakError>;

pub struct StreakUseCase<S>
where
    S: StreakRepository + Send + Sync + 'static,
{
    streak_repo: Arc<S>,
}

impl<S> StreakUseCase<S>
where
    S: StreakRepository + Send + Sync + 'static,
{
    pub fn new(streak_repo: Arc<S>) -> Self {
        Self { streak_repo }
    }

    pub async fn check_in(&self, account_id: Uuid) -> UseCaseResult<CheckInResult> {
        self.check_in_on(account_id, Utc::now().date_naive()).await
    }

    /// Split out so tests can pin the calendar day.
    pub async fn check_in_on(
        &self,
        account_id: Uuid,
        today: NaiveDate,
    ) -> UseCaseResult<CheckInResult> {
        let result = self
            .streak_repo
            .check_in(account_id, today)
            .await
            .map_err(|err| {
                error!(%account_id, db_error = ?err, "streaks: check-in failed");
                StreakError::Internal(err)
            })?;

        info!(
            %account_id,
            streak = result.streak,
            is_first_check_in_today = result.is_first_check_in_today,
            "streaks: check-in recorded"
        );

        Ok(result)
    }

    pub async fn record_audio_nudge(&self, account_id: Uuid) -> UseCaseResult<i32> {
        let count = self
            .streak_repo
            .record_audio_nudge(account_id, Utc::now())
            .await
            .map_err(|err| {
                error!(%account_id, db_error = ?err, "streaks: audio nudge failed");
                StreakError::Internal(err)
            })?;

        info!(%account_id, nudge_count = count, "streaks: audio nudge recorded");

        Ok(count)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crates::domain::repositories::streaks::MockStreakRepository;
    use mockall::predicate::eq;

    #[tokio::test]
    async fn check_in_passes_the_pinned_day_through() {
        let account_id = Uuid::new_v4();
        let today = NaiveDate::from_ymd_opt(2025, 6, 2).unwrap();

        let mut streak_repo = MockStreakRepository::new();
        streak_repo
            .expect_check_in()
            .with(eq(account_id), eq(today))
            .times(1)
            .returning(|_, _| {
                Box::pin(async {
                    Ok(CheckInResult {
                        streak: 2,
                        longest_streak: 4,
                        is_first_check_in_today: true,
                    })
                })
            });

        let usecase = StreakUseCase::new(Arc::new(streak_repo));

        let result = usecase.check_in_on(account_id, today).await.unwrap();
        assert_eq!(result.streak, 2);
        assert_eq!(result.longest_streak, 4);
        assert!(result.is_first_check_in_today);
    }

    #[tokio::test]
    async fn audio_nudge_returns_window_count() {
        let account_id = Uuid::new_v4();

        let mut streak_repo = MockStreakRepository::new();
        streak_repo
            .expect_record_audio_nudge()
            .times(1)
            .returning(|_, _| Box::pin(async { Ok(3) }));

        let usecase = StreakUseCase::new(Arc::new(streak_repo));

        assert_eq!(usecase.record_audio_nudge(account_id).await.unwrap(), 3);
    }
}
