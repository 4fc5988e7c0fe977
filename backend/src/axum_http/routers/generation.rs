use crate::usecases::generation::GenerationUseCase;
use axum::{
    Json, Router,
    extract::{Path, Query, State},
    http::StatusCode,
    response::IntoResponse,
    routing::{get, post},
};
use chrono::{Duration, Utc};
use crates::{
    domain::{
        repositories::{generation_job::GenerationJobRepository, ledger::LedgerRepository},
        value_objects::enums::generation_kinds::GenerationKind,
    },
    infra::db::{
        postgres::postgres_connection::PgPoolSquad,
        repositories::{generation_job::GenerationJobPostgres, ledger::LedgerPostgres},
    },
};
use serde::Deserialize;
use serde_json::Value;
use std::sync::Arc;
use uuid::Uuid;

const DEFAULT_STUCK_AFTER_SECS: i64 = 600;

#[derive(Debug, Deserialize)]
pub struct GenerationRequestModel {
    pub account_id: Uuid,
    pub kind: GenerationKind,
    pub payload: Value,
}

#[derive(Debug, Deserialize)]
pub struct StuckJobsQuery {
    older_than_secs: Option<i64>,
}

pub fn routes(db_pool: Arc<PgPoolSquad>) -> Router {
    let ledger_repository = LedgerPostgres::new(Arc::clone(&db_pool));
    let job_repository = GenerationJobPostgres::new(Arc::clone(&db_pool));
    let usecase = GenerationUseCase::new(Arc::new(ledger_repository), Arc::new(job_repository));

    Router::new()
        .route("/", post(request_generation))
        .route("/stuck", get(list_stuck_jobs))
        .route("/:job_id", get(get_job))
        .with_state(Arc::new(usecase))
}

pub async fn request_generation<L, J>(
    State(usecase): State<Arc<GenerationUseCase<L, J>>>,
    Json(request): Json<GenerationRequestModel>,
) -> impl IntoResponse
where
    L: LedgerRepository + Send + Sync + 'static,
    J: GenerationJobRepository + Send + Sync + 'static,
{
    match usecase
        .request_generation(request.account_id, request.kind, request.payload)
        .await
    {
        Ok(outcome) if outcome.accepted => (StatusCode::ACCEPTED, Json(outcome)).into_response(),
        // Paywall signal: the ledger denied the reservation.
        Ok(outcome) => (StatusCode::PAYMENT_REQUIRED, Json(outcome)).into_response(),
        Err(err) => (err.status_code(), err.to_string()).into_response(),
    }
}

pub async fn get_job<L, J>(
    State(usecase): State<Arc<GenerationUseCase<L, J>>>,
    Path(job_id): Path<Uuid>,
) -> impl IntoResponse
where
    L: LedgerRepository + Send + Sync + 'static,
    J: GenerationJobRepository + Send + Sync + 'static,
{
    match usecase.get_job(job_id).await {
        Ok(job) => (StatusCode::OK, Json(job)).into_response(),
        Err(err) => (err.status_code(), err.to_string()).into_response(),
    }
}

pub async fn list_stuck_jobs<L, J>(
    State(usecase): State<Arc<GenerationUseCase<L, J>>>,
    Query(query): Query<StuckJobsQuery>,
) -> impl IntoResponse
where
    L: LedgerRepository + Send + Sync + 'static,
    J: GenerationJobRepository + Send + Sync + 'static,
{
    let older_than_secs = query.older_than_secs.unwrap_or(DEFAULT_STUCK_AFTER_SECS);
    if older_than_secs <= 0 {
        return (
            StatusCode::BAD_REQUEST,
            "older_than_secs must be a positive number".to_string(),
        )
            .into_response();
    }

    let older_than = Utc::now() - Duration::seconds(older_than_secs);
    match usecase.list_stuck(older_than).await {
        Ok(jobs) => (StatusCode::OK, Json(jobs)).into_response(),
        Err(err) => (err.status_code(), err.to_string()).into_response(),
    }
}
