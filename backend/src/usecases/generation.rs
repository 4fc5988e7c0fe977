use std::sync::Arc;

use chrono::{DateTime, Utc};
use crates::domain::{
    entities::generation_jobs::InsertGenerationJobEntity,
    repositories::{generation_job::GenerationJobRepository, ledger::LedgerRepository},
    value_objects::{
        enums::generation_kinds::GenerationKind,
        generation::{GenerationJobDto, GenerationRequestOutcome},
    },
};
use serde_json::Value;
use thiserror::Error;
use tracing::{error, info, warn};
use uuid::Uuid;

#[derive(Debug, Error)]
pub enum GenerationError {
    #[error("job not found")]
    JobNotFound,
    #[error("internal server error")]
    Internal(#[from] anyhow::Error),
}

impl GenerationError {
    pub fn status_code(&self) -> axum::http::StatusCode {
        use axum::http::StatusCode;
        match self {
            GenerationError::JobNotFound => StatusCode::NOT_FOUND,
            GenerationError::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

pub type UseCaseResult<T> = std::result::Result<T, GenerationError>;

/// The only consumer-facing surface of the fulfillment core: reserves a
/// credit, enqueues the job, and exposes terminal-state reads. The refund on
/// a failed job is issued by the worker holding the claim.
pub struct GenerationUseCase<L, J>
where
    L: LedgerRepository + Send + Sync + 'static,
    J: GenerationJobRepository + Send + Sync + 'static,
{
    ledger_repo: Arc<L>,
    job_repo: Arc<J>,
}

impl<L, J> GenerationUseCase<L, J>
where
    L: LedgerRepository + Send + Sync + 'static,
    J: GenerationJobRepository + Send + Sync + 'static,
{
    pub fn new(ledger_repo: Arc<L>, job_repo: Arc<J>) -> Self {
        Self {
            ledger_repo,
            job_repo,
        }
    }

    pub async fn request_generation(
        &self,
        account_id: Uuid,
        kind: GenerationKind,
        payload: Value,
    ) -> UseCaseResult<GenerationRequestOutcome> {
        info!(%account_id, kind = %kind, "generation: request received");

        let reserved = self
            .ledger_repo
            .reserve_credit(account_id)
            .await
            .map_err(|err| {
                error!(
                    %account_id,
                    db_error = ?err,
                    "generation: failed to reserve credit"
                );
                GenerationError::Internal(err)
            })?;

        if !reserved {
            info!(%account_id, "generation: reservation denied, insufficient credits");
            return Ok(GenerationRequestOutcome::denied());
        }

        let insert_job = InsertGenerationJobEntity::pending(account_id, kind, payload);
        match self.job_repo.enqueue(insert_job).await {
            Ok(job_id) => {
                info!(%account_id, %job_id, kind = %kind, "generation: job enqueued");
                Ok(GenerationRequestOutcome::accepted(job_id))
            }
            Err(err) => {
                // The credit was already spent; give it back before failing.
                error!(
                    %account_id,
                    db_error = ?err,
                    "generation: enqueue failed after reservation, refunding credit"
                );
                if let Err(refund_err) = self.ledger_repo.refund_credits(account_id, 1).await {
                    error!(
                        %account_id,
                        db_error = ?refund_err,
                        "generation: refund after enqueue failure also failed"
                    );
                }
                Err(GenerationError::Internal(err))
            }
        }
    }

    pub async fn get_job(&self, job_id: Uuid) -> UseCaseResult<GenerationJobDto> {
        let job = self
            .job_repo
            .find_by_id(job_id)
            .await
            .map_err(|err| {
                error!(%job_id, db_error = ?err, "generation: failed to load job");
                GenerationError::Internal(err)
            })?
            .ok_or_else(|| {
                warn!(%job_id, "generation: job not found");
                GenerationError::JobNotFound
            })?;

        Ok(GenerationJobDto::from(job))
    }

    /// Read surface for the reconciliation sweep: jobs still `processing`
    /// since before `older_than`. The core never re-enqueues them itself.
    pub async fn list_stuck(
        &self,
        older_than: DateTime<Utc>,
    ) -> UseCaseResult<Vec<GenerationJobDto>> {
        let jobs = self.job_repo.find_stuck(older_than).await.map_err(|err| {
            error!(db_error = ?err, "generation: failed to list stuck jobs");
            GenerationError::Internal(err)
        })?;

        Ok(jobs.into_iter().map(GenerationJobDto::from).collect())
    }
}
