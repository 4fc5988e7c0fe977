use crate::usecases::streaks::StreakUseCase;
use axum::{
    Json, Router, extract::State, http::StatusCode, response::IntoResponse, routing::post,
};
use crates::{
    domain::repositories::streaks::StreakRepository,
    infra::db::{
        postgres::postgres_connection::PgPoolSquad, repositories::streaks::StreakPostgres,
    },
};
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use uuid::Uuid;

#[derive(Debug, Deserialize)]
pub struct CheckInModel {
    pub account_id: Uuid,
}

#[derive(Debug, Serialize)]
pub struct AudioNudgeDto {
    pub nudge_count: i32,
}

pub fn routes(db_pool: Arc<PgPoolSquad>) -> Router {
    let streak_repository = StreakPostgres::new(Arc::clone(&db_pool));
    let usecase = StreakUseCase::new(Arc::new(streak_repository));

    Router::new()
        .route("/check-in", post(check_in))
        .route("/audio-nudge", post(record_audio_nudge))
        .with_state(Arc::new(usecase))
}

pub async fn check_in<S>(
    State(usecase): State<Arc<StreakUseCase<S>>>,
    Json(request): Json<CheckInModel>,
) -> impl IntoResponse
where
    S: StreakRepository + Send + Sync + 'static,
{
    match usecase.check_in(request.account_id).await {
        Ok(result) => (StatusCode::OK, Json(result)).into_response(),
        Err(err) => (err.status_code(), err.to_string()).into_response(),
    }
}

pub async fn record_audio_nudge<S>(
    State(usecase): State<Arc<StreakUseCase<S>>>,
    Json(request): Json<CheckInModel>,
) -> impl IntoResponse
where
    S: StreakRepository + Send + Sync + 'static,
{
    match usecase.record_audio_nudge(request.account_id).await {
        Ok(nudge_count) => (StatusCode::OK, Json(AudioNudgeDto { nudge_count })).into_response(),
        Err(err) => (err.status_code(), err.to_string()).into_response(),
    }
}
