use anyhow::Result;
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use diesel::prelude::*;
use std::sync::Arc;
use uuid::Uuid;

use crate::{
    domain,
    infra::db::postgres::{postgres_connection::PgPoolSquad, schema::generation_jobs},
};
use domain::{
    entities::generation_jobs::{GenerationJobEntity, InsertGenerationJobEntity},
    repositories::generation_job::GenerationJobRepository,
    value_objects::enums::job_statuses::JobStatus,
};

pub struct GenerationJobPostgres {
    db_pool: Arc<PgPoolSquad>,
}

impl GenerationJobPostgres {
    pub fn new(db_pool: Arc<PgPoolSquad>) -> Self {
        Self { db_pool }
    }
}

#[async_trait]
impl GenerationJobRepository for GenerationJobPostgres {
    async fn enqueue(&self, insert_job: InsertGenerationJobEntity) -> Result<Uuid> {
        let mut conn = Arc::clone(&self.db_pool).get()?;

        let job_id = diesel::insert_into(generation_jobs::table)
            .values(&insert_job)
            .returning(generation_jobs::id)
            .get_result::<Uuid>(&mut conn)?;

        Ok(job_id)
    }

    async fn claim_next(&self) -> Result<Option<GenerationJobEntity>> {
        let mut conn = Arc::clone(&self.db_pool).get()?;
        let current_time = Utc::now();

        // SKIP LOCKED keeps concurrent workers from ever selecting the same
        // candidate row; the claim itself happens inside the same transaction
        // so the pending -> processing transition is observed by one worker.
        let job = conn.transaction::<Option<GenerationJobEntity>, diesel::result::Error, _>(
            |conn| {
                let candidate: Option<GenerationJobEntity> = generation_jobs::table
                    .select(GenerationJobEntity::as_select())
                    .filter(generation_jobs::status.eq(JobStatus::Pending.to_string()))
                    .order(generation_jobs::created_at.asc())
                    .for_update()
                    .skip_locked()
                    .first::<GenerationJobEntity>(conn)
                    .optional()?;

                if let Some(job) = candidate {
                    let claimed_job = diesel::update(generation_jobs::table.find(job.id))
                        .set((
                            generation_jobs::status.eq(JobStatus::Processing.to_string()),
                            generation_jobs::attempts.eq(generation_jobs::attempts + 1),
                            generation_jobs::updated_at.eq(current_time),
                        ))
                        .returning(GenerationJobEntity::as_select())
                        .get_result::<GenerationJobEntity>(conn)?;
                    Ok(Some(claimed_job))
                } else {
                    Ok(None)
                }
            },
        )?;

        Ok(job)
    }

    async fn mark_succeeded(&self, job_id: Uuid, result_ref: &str) -> Result<bool> {
        let mut conn = Arc::clone(&self.db_pool).get()?;

        // Guarded by the current status so a delayed success arriving after
        // the job was failed out by another path is a no-op.
        let updated_rows = diesel::update(
            generation_jobs::table
                .find(job_id)
                .filter(generation_jobs::status.eq(JobStatus::Processing.to_string())),
        )
        .set((
            generation_jobs::status.eq(JobStatus::Succeeded.to_string()),
            generation_jobs::result_ref.eq(Some(result_ref)),
            generation_jobs::updated_at.eq(Utc::now()),
        ))
        .execute(&mut conn)?;

        Ok(updated_rows == 1)
    }

    async fn mark_failed(&self, job_id: Uuid, error: &str) -> Result<bool> {
        let mut conn = Arc::clone(&self.db_pool).get()?;

        let updated_rows = diesel::update(
            generation_jobs::table
                .find(job_id)
                .filter(generation_jobs::status.eq(JobStatus::Processing.to_string())),
        )
        .set((
            generation_jobs::status.eq(JobStatus::Failed.to_string()),
            generation_jobs::error.eq(Some(error)),
            generation_jobs::updated_at.eq(Utc::now()),
        ))
        .execute(&mut conn)?;

        Ok(updated_rows == 1)
    }

    async fn find_by_id(&self, job_id: Uuid) -> Result<Option<GenerationJobEntity>> {
        let mut conn = Arc::clone(&self.db_pool).get()?;

        let job = generation_jobs::table
            .find(job_id)
            .select(GenerationJobEntity::as_select())
            .first::<GenerationJobEntity>(&mut conn)
            .optional()?;

        Ok(job)
    }

    async fn find_stuck(&self, older_than: DateTime<Utc>) -> Result<Vec<GenerationJobEntity>> {
        let mut conn = Arc::clone(&self.db_pool).get()?;

        let jobs = generation_jobs::table
            .select(GenerationJobEntity::as_select())
            .filter(generation_jobs::status.eq(JobStatus::Processing.to_string()))
            .filter(generation_jobs::updated_at.lt(older_than))
            .order(generation_jobs::updated_at.asc())
            .load::<GenerationJobEntity>(&mut conn)?;

        Ok(jobs)
    }
}
