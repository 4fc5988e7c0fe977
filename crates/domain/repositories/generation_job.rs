use anyhow::Result;
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use mockall::automock;
use uuid::Uuid;

use crate::domain::entities::generation_jobs::{GenerationJobEntity, InsertGenerationJobEntity};

#[async_trait]
#[automock]
pub trait GenerationJobRepository {
    async fn enqueue(&self, insert_job: InsertGenerationJobEntity) -> Result<Uuid>;

    /// Atomically claims one `pending` job: `FOR UPDATE SKIP LOCKED` plus the
    /// `pending -> processing` transition with `attempts + 1`, so under any
    /// number of concurrent workers each job is handed to exactly one caller.
    async fn claim_next(&self) -> Result<Option<GenerationJobEntity>>;

    /// `processing -> succeeded`. Returns `false` when the job was not in
    /// `processing` (stale transition), which the caller logs and ignores.
    async fn mark_succeeded(&self, job_id: Uuid, result_ref: &str) -> Result<bool>;

    /// `processing -> failed`. Returns `false` on a stale transition; the
    /// worker refunds the reserved credit only when this returns `true`.
    async fn mark_failed(&self, job_id: Uuid, error: &str) -> Result<bool>;

    async fn find_by_id(&self, job_id: Uuid) -> Result<Option<GenerationJobEntity>>;

    /// Jobs stuck in `processing` since before `older_than`, for the external
    /// reconciliation sweep. The queue itself never re-enqueues them.
    async fn find_stuck(&self, older_than: DateTime<Utc>) -> Result<Vec<GenerationJobEntity>>;
}
