use anyhow::Result;
use async_trait::async_trait;
use diesel::prelude::*;
use std::sync::Arc;

use crate::{
    domain,
    infra::db::{
        postgres::{postgres_connection::PgPoolSquad, schema::processed_events},
        repositories::ledger,
    },
};
use domain::{
    entities::processed_events::InsertProcessedEventEntity,
    repositories::billing_events::BillingEventRepository,
    value_objects::billing_events::{IngestOutcome, LedgerEffect},
};

pub struct BillingEventPostgres {
    db_pool: Arc<PgPoolSquad>,
}

impl BillingEventPostgres {
    pub fn new(db_pool: Arc<PgPoolSquad>) -> Self {
        Self { db_pool }
    }
}

#[async_trait]
impl BillingEventRepository for BillingEventPostgres {
    async fn apply_once(
        &self,
        event: InsertProcessedEventEntity,
        effect: LedgerEffect,
    ) -> Result<IngestOutcome> {
        let mut conn = Arc::clone(&self.db_pool).get()?;

        // Dedup row and ledger effect commit together: if the effect fails,
        // the marker rolls back and a redelivery can retry legitimately.
        // The primary key on the provider event id is the race arbiter.
        let outcome = conn.transaction::<IngestOutcome, diesel::result::Error, _>(|conn| {
            let inserted_rows = diesel::insert_into(processed_events::table)
                .values(&event)
                .on_conflict(processed_events::id)
                .do_nothing()
                .execute(conn)?;

            if inserted_rows == 0 {
                return Ok(IngestOutcome::Duplicate);
            }

            match effect {
                LedgerEffect::Refill { account_id, amount } => {
                    ledger::upsert_add_credits(conn, account_id, amount)?;
                }
                LedgerEffect::UpsertEntitlement {
                    account_id,
                    tier,
                    status,
                    external_subscription_id,
                    renews_at,
                    refill,
                } => {
                    ledger::upsert_entitlement_row(
                        conn,
                        account_id,
                        tier,
                        status,
                        external_subscription_id,
                        renews_at,
                    )?;
                    if let Some(amount) = refill {
                        ledger::add_credits(conn, account_id, amount)?;
                    }
                }
                LedgerEffect::None => {}
            }

            Ok(IngestOutcome::Applied)
        })?;

        Ok(outcome)
    }
}
