use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::domain::entities::generation_jobs::GenerationJobEntity;
use crate::domain::value_objects::enums::job_statuses::JobStatus;

/// Result handed back by the external generation collaborator: an opaque
/// reference to the produced artifact (storage key, provider asset id, ...).
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct GenerationOutput {
    pub result_ref: String,
}

#[derive(Debug, Clone, Serialize, PartialEq)]
pub struct GenerationRequestOutcome {
    pub accepted: bool,
    pub job_id: Option<Uuid>,
}

impl GenerationRequestOutcome {
    pub fn accepted(job_id: Uuid) -> Self {
        Self {
            accepted: true,
            job_id: Some(job_id),
        }
    }

    /// The ledger denied the reservation: a paywall signal, not an error.
    pub fn denied() -> Self {
        Self {
            accepted: false,
            job_id: None,
        }
    }
}

#[derive(Debug, Clone, Serialize, PartialEq)]
pub struct GenerationJobDto {
    pub job_id: Uuid,
    pub account_id: Uuid,
    pub kind: String,
    pub status: Option<JobStatus>,
    pub attempts: i32,
    pub result_ref: Option<String>,
    pub error: Option<String>,
}

impl From<GenerationJobEntity> for GenerationJobDto {
    fn from(value: GenerationJobEntity) -> Self {
        Self {
            job_id: value.id,
            account_id: value.account_id,
            kind: value.type_.clone(),
            status: JobStatus::from_str(&value.status),
            attempts: value.attempts,
            result_ref: value.result_ref,
            error: value.error,
        }
    }
}
