use crate::usecases::accounts::AccountUseCase;
use axum::{
    Json, Router,
    extract::{Path, State},
    http::StatusCode,
    response::IntoResponse,
    routing::get,
};
use crates::{
    domain::repositories::accounts::AccountRepository,
    infra::db::{
        postgres::postgres_connection::PgPoolSquad, repositories::accounts::AccountPostgres,
    },
};
use std::sync::Arc;
use uuid::Uuid;

pub fn routes(db_pool: Arc<PgPoolSquad>) -> Router {
    let account_repository = AccountPostgres::new(Arc::clone(&db_pool));
    let usecase = AccountUseCase::new(Arc::new(account_repository));

    Router::new()
        .route("/:account_id/summary", get(get_summary))
        .with_state(Arc::new(usecase))
}

pub async fn get_summary<A>(
    State(usecase): State<Arc<AccountUseCase<A>>>,
    Path(account_id): Path<Uuid>,
) -> impl IntoResponse
where
    A: AccountRepository + Send + Sync + 'static,
{
    match usecase.get_summary(account_id).await {
        Ok(summary) => (StatusCode::OK, Json(summary)).into_response(),
        Err(err) => (err.status_code(), err.to_string()).into_response(),
    }
}
