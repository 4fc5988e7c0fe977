use crate::{
    config::config_model::DotEnvyConfig,
    usecases::billing_webhook::{BillingGateway, BillingWebhookUseCase},
};
use axum::{
    Json, Router,
    body::Bytes,
    extract::State,
    http::{HeaderMap, StatusCode},
    response::IntoResponse,
    routing::post,
};
use crates::{
    domain::repositories::billing_events::BillingEventRepository,
    infra::db::{
        postgres::postgres_connection::PgPoolSquad,
        repositories::billing_events::BillingEventPostgres,
    },
    payments::billing_client::BillingClient,
};
use std::sync::Arc;

pub fn routes(db_pool: Arc<PgPoolSquad>, config: Arc<DotEnvyConfig>) -> Router {
    let event_repository = BillingEventPostgres::new(Arc::clone(&db_pool));
    let billing_client = BillingClient::new(config.billing.webhook_secret.clone());
    let usecase = BillingWebhookUseCase::new(Arc::new(event_repository), Arc::new(billing_client));

    Router::new()
        .route("/webhook", post(handle_billing_webhook))
        .with_state(Arc::new(usecase))
}

pub async fn handle_billing_webhook<E, G>(
    State(usecase): State<Arc<BillingWebhookUseCase<E, G>>>,
    headers: HeaderMap,
    body: Bytes,
) -> impl IntoResponse
where
    E: BillingEventRepository + Send + Sync + 'static,
    G: BillingGateway + Send + Sync + 'static,
{
    let signature = headers
        .get("billing-signature")
        .and_then(|value| value.to_str().ok())
        .unwrap_or_default();

    // Once ingestion has been attempted the provider always gets a 200, even
    // for duplicates; only a bad signature or an unreachable store (dedup row
    // not committed, retry legitimate) is surfaced as an error.
    match usecase.handle_webhook(&body, signature).await {
        Ok(outcome) => (StatusCode::OK, Json(outcome)).into_response(),
        Err(err) => (err.status_code(), err.to_string()).into_response(),
    }
}
