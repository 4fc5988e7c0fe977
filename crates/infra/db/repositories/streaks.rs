use anyhow::Result;
use async_trait::async_trait;
use chrono::{DateTime, NaiveDate, Utc};
use diesel::prelude::*;
use std::sync::Arc;
use uuid::Uuid;

use crate::{
    domain,
    infra::db::postgres::{postgres_connection::PgPoolSquad, schema::accounts},
};
use domain::{
    entities::accounts::{AccountEntity, InsertAccountEntity},
    repositories::streaks::StreakRepository,
    value_objects::streaks::{self, CheckInResult, StreakDecision},
};

pub struct StreakPostgres {
    db_pool: Arc<PgPoolSquad>,
}

impl StreakPostgres {
    pub fn new(db_pool: Arc<PgPoolSquad>) -> Self {
        Self { db_pool }
    }

    /// Inserts the default free row when the account is new, then locks it.
    fn lock_account(
        conn: &mut PgConnection,
        account_id: Uuid,
    ) -> std::result::Result<AccountEntity, diesel::result::Error> {
        diesel::insert_into(accounts::table)
            .values(&InsertAccountEntity::free(account_id))
            .on_conflict(accounts::id)
            .do_nothing()
            .execute(conn)?;

        accounts::table
            .find(account_id)
            .select(AccountEntity::as_select())
            .for_update()
            .first::<AccountEntity>(conn)
    }
}

#[async_trait]
impl StreakRepository for StreakPostgres {
    async fn check_in(&self, account_id: Uuid, today: NaiveDate) -> Result<CheckInResult> {
        let mut conn = Arc::clone(&self.db_pool).get()?;

        let result = conn.transaction::<CheckInResult, diesel::result::Error, _>(|conn| {
            let account = Self::lock_account(conn, account_id)?;

            let streak = match streaks::decide_check_in(account.last_check_in_date, today) {
                StreakDecision::SameDay => {
                    return Ok(CheckInResult {
                        streak: account.current_streak,
                        longest_streak: account.longest_streak,
                        is_first_check_in_today: false,
                    });
                }
                StreakDecision::Extend => account.current_streak + 1,
                StreakDecision::Reset => 1,
            };
            let longest_streak = account.longest_streak.max(streak);

            diesel::update(accounts::table.find(account_id))
                .set((
                    accounts::current_streak.eq(streak),
                    accounts::longest_streak.eq(longest_streak),
                    accounts::last_check_in_date.eq(Some(today)),
                    accounts::updated_at.eq(Utc::now()),
                ))
                .execute(conn)?;

            Ok(CheckInResult {
                streak,
                longest_streak,
                is_first_check_in_today: true,
            })
        })?;

        Ok(result)
    }

    async fn record_audio_nudge(&self, account_id: Uuid, now: DateTime<Utc>) -> Result<i32> {
        let mut conn = Arc::clone(&self.db_pool).get()?;

        let count = conn.transaction::<i32, diesel::result::Error, _>(|conn| {
            let account = Self::lock_account(conn, account_id)?;

            let (count, window_started_at) =
                if streaks::nudge_window_expired(account.nudge_window_started_at, now) {
                    (1, now)
                } else {
                    (
                        account.weekly_nudge_count + 1,
                        account.nudge_window_started_at.unwrap_or(now),
                    )
                };

            diesel::update(accounts::table.find(account_id))
                .set((
                    accounts::weekly_nudge_count.eq(count),
                    accounts::nudge_window_started_at.eq(Some(window_started_at)),
                    accounts::updated_at.eq(Utc::now()),
                ))
                .execute(conn)?;

            Ok(count)
        })?;

        Ok(count)
    }
}
