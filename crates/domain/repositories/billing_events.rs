use anyhow::Result;
use async_trait::async_trait;
use mockall::automock;

use crate::domain::entities::processed_events::InsertProcessedEventEntity;
use crate::domain::value_objects::billing_events::{IngestOutcome, LedgerEffect};

#[async_trait]
#[automock]
pub trait BillingEventRepository {
    /// Inserts the dedup row and applies the ledger effect in one transaction.
    /// A conflict on the provider event id means the event was already applied:
    /// returns `Duplicate` without touching anything else. Two concurrent
    /// deliveries of the same event race only on the primary-key constraint.
    async fn apply_once(
        &self,
        event: InsertProcessedEventEntity,
        effect: LedgerEffect,
    ) -> Result<IngestOutcome>;
}
