use chrono::{DateTime, Utc};
use diesel::prelude::*;
use serde_json::Value;
use uuid::Uuid;

use crate::infra::db::postgres::schema::generation_jobs;

#[derive(Debug, Clone, Identifiable, Selectable, Queryable)]
#[diesel(table_name = generation_jobs)]
pub struct GenerationJobEntity {
    pub id: Uuid,
    pub account_id: Uuid,
    pub type_: String,
    pub payload: Value,
    pub status: String,
    pub attempts: i32,
    pub result_ref: Option<String>,
    pub error: Option<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Insertable)]
#[diesel(table_name = generation_jobs)]
pub struct InsertGenerationJobEntity {
    pub account_id: Uuid,
    pub type_: String,
    pub payload: Value,
    pub status: String,
    pub attempts: i32,
    pub result_ref: Option<String>,
    pub error: Option<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl InsertGenerationJobEntity {
    pub fn pending(
        account_id: Uuid,
        kind: crate::domain::value_objects::enums::generation_kinds::GenerationKind,
        payload: Value,
    ) -> Self {
        let now = Utc::now();
        Self {
            account_id,
            type_: kind.to_string(),
            payload,
            status: crate::domain::value_objects::enums::job_statuses::JobStatus::Pending
                .to_string(),
            attempts: 0,
            result_ref: None,
            error: None,
            created_at: now,
            updated_at: now,
        }
    }
}
