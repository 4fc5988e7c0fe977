use anyhow::Result;
use async_trait::async_trait;
use chrono::{DateTime, NaiveDate, Utc};
use mockall::automock;
use uuid::Uuid;

use crate::domain::value_objects::streaks::CheckInResult;

#[async_trait]
#[automock]
pub trait StreakRepository {
    /// Row-locked check-in. Lazily creates the account, applies the day-gap
    /// rules and persists `last_check_in_date = today`. Re-entry on the same
    /// calendar day leaves the streak unchanged.
    async fn check_in(&self, account_id: Uuid, today: NaiveDate) -> Result<CheckInResult>;

    /// Increments the weekly audio-nudge counter, resetting it when the
    /// rolling 7-day window has elapsed. Returns the count within the window.
    async fn record_audio_nudge(&self, account_id: Uuid, now: DateTime<Utc>) -> Result<i32>;
}
