use anyhow::Result;
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use diesel::prelude::*;
use std::sync::Arc;
use uuid::Uuid;

use crate::{
    domain,
    infra::db::postgres::{postgres_connection::PgPoolSquad, schema::accounts},
};
use domain::{
    entities::accounts::InsertAccountEntity,
    repositories::ledger::LedgerRepository,
    value_objects::enums::{account_statuses::AccountStatus, account_tiers::AccountTier},
};

pub struct LedgerPostgres {
    db_pool: Arc<PgPoolSquad>,
}

impl LedgerPostgres {
    pub fn new(db_pool: Arc<PgPoolSquad>) -> Self {
        Self { db_pool }
    }
}

/// Unconditional credit add on an existing account row. Shared with the
/// billing-event transaction so webhook effects reuse the exact same SQL.
pub(crate) fn add_credits(
    conn: &mut PgConnection,
    account_id: Uuid,
    amount: i32,
) -> std::result::Result<usize, diesel::result::Error> {
    diesel::update(accounts::table.filter(accounts::id.eq(account_id)))
        .set((
            accounts::credits_remaining.eq(accounts::credits_remaining + amount),
            accounts::updated_at.eq(Utc::now()),
        ))
        .execute(conn)
}

/// Upsert-add: creates the account with the given balance when it does not
/// exist yet, otherwise adds to the existing balance in a single statement.
pub(crate) fn upsert_add_credits(
    conn: &mut PgConnection,
    account_id: Uuid,
    amount: i32,
) -> std::result::Result<usize, diesel::result::Error> {
    let mut insert = InsertAccountEntity::free(account_id);
    insert.credits_remaining = amount;

    diesel::insert_into(accounts::table)
        .values(&insert)
        .on_conflict(accounts::id)
        .do_update()
        .set((
            accounts::credits_remaining.eq(accounts::credits_remaining + amount),
            accounts::updated_at.eq(Utc::now()),
        ))
        .execute(conn)
}

pub(crate) fn upsert_entitlement_row(
    conn: &mut PgConnection,
    account_id: Uuid,
    tier: AccountTier,
    status: AccountStatus,
    external_subscription_id: Option<String>,
    renews_at: Option<DateTime<Utc>>,
) -> std::result::Result<usize, diesel::result::Error> {
    let mut insert = InsertAccountEntity::free(account_id);
    insert.tier = tier.to_string();
    insert.status = status.to_string();
    insert.external_subscription_id = external_subscription_id.clone();
    insert.renews_at = renews_at;

    diesel::insert_into(accounts::table)
        .values(&insert)
        .on_conflict(accounts::id)
        .do_update()
        .set((
            accounts::tier.eq(tier.to_string()),
            accounts::status.eq(status.to_string()),
            accounts::external_subscription_id.eq(external_subscription_id),
            accounts::renews_at.eq(renews_at),
            accounts::updated_at.eq(Utc::now()),
        ))
        .execute(conn)
}

#[async_trait]
impl LedgerRepository for LedgerPostgres {
    async fn reserve_credit(&self, account_id: Uuid) -> Result<bool> {
        let mut conn = Arc::clone(&self.db_pool).get()?;

        // Single conditional statement; the store arbitrates concurrent
        // reservations, so two callers racing on the last credit get exactly
        // one success. Zero rows is the normal insufficient-credit outcome.
        let updated_rows = diesel::update(
            accounts::table
                .filter(accounts::id.eq(account_id))
                .filter(accounts::credits_remaining.gt(0)),
        )
        .set((
            accounts::credits_remaining.eq(accounts::credits_remaining - 1),
            accounts::updated_at.eq(Utc::now()),
        ))
        .execute(&mut conn)?;

        Ok(updated_rows == 1)
    }

    async fn refund_credits(&self, account_id: Uuid, amount: i32) -> Result<bool> {
        let mut conn = Arc::clone(&self.db_pool).get()?;

        let updated_rows = add_credits(&mut conn, account_id, amount)?;
        Ok(updated_rows == 1)
    }

    async fn refill_credits(&self, account_id: Uuid, amount: i32) -> Result<bool> {
        let mut conn = Arc::clone(&self.db_pool).get()?;

        let updated_rows = upsert_add_credits(&mut conn, account_id, amount)?;
        Ok(updated_rows == 1)
    }

    async fn upsert_entitlement(
        &self,
        account_id: Uuid,
        tier: AccountTier,
        status: AccountStatus,
        external_subscription_id: Option<String>,
        renews_at: Option<DateTime<Utc>>,
    ) -> Result<()> {
        let mut conn = Arc::clone(&self.db_pool).get()?;

        upsert_entitlement_row(
            &mut conn,
            account_id,
            tier,
            status,
            external_subscription_id,
            renews_at,
        )?;

        Ok(())
    }
}
