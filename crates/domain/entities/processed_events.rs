use chrono::{DateTime, Utc};
use diesel::prelude::*;
use serde_json::Value;
use uuid::Uuid;

use crate::infra::db::postgres::schema::processed_events;

// Keyed by the payment provider's own event id. Rows are written once and
// never updated or deleted; the primary key is the dedup arbiter.
#[derive(Debug, Clone, Identifiable, Selectable, Queryable)]
#[diesel(table_name = processed_events)]
pub struct ProcessedEventEntity {
    pub id: String,
    pub account_id: Option<Uuid>,
    pub raw_payload: Value,
    pub applied_effect: String,
    pub received_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Insertable)]
#[diesel(table_name = processed_events)]
pub struct InsertProcessedEventEntity {
    pub id: String,
    pub account_id: Option<Uuid>,
    pub raw_payload: Value,
    pub applied_effect: String,
    pub received_at: DateTime<Utc>,
}
