use anyhow::Result;
use crates::domain::repositories::{
    generation::GenerationClient, generation_job::GenerationJobRepository,
    ledger::LedgerRepository,
};
use crates::infra::{
    db::{
        postgres::postgres_connection,
        repositories::{generation_job::GenerationJobPostgres, ledger::LedgerPostgres},
    },
    generation::http_client::HttpGenerationClient,
};
use std::{sync::Arc, time::Duration};
use tracing::{error, info};
use worker::{config, generation};

#[tokio::main]
async fn main() -> Result<()> {
    if let Err(error) = run().await {
        error!("Worker exited with error: {}", error);
        std::process::exit(1);
    }
    Ok(())
}

async fn run() -> Result<()> {
    dotenvy::dotenv().ok();
    crates::observability::init_observability("worker")?;

    let dotenvy_env = Arc::new(config::config_loader::load()?);
    info!("ENV has been loaded");

    let postgres_pool = postgres_connection::establish_connection(&dotenvy_env.database.url)?;
    info!("Postgres connection has been established");

    let db_pool_arc = Arc::new(postgres_pool);

    let job_repository: Arc<dyn GenerationJobRepository + Send + Sync> =
        Arc::new(GenerationJobPostgres::new(Arc::clone(&db_pool_arc)));

    let ledger_repository: Arc<dyn LedgerRepository + Send + Sync> =
        Arc::new(LedgerPostgres::new(Arc::clone(&db_pool_arc)));

    let generation_client: Arc<dyn GenerationClient + Send + Sync> =
        Arc::new(HttpGenerationClient::new(
            dotenvy_env.generation_api.base_url.clone(),
            dotenvy_env.generation_api.api_key.clone(),
        ));

    let generation_loop = tokio::spawn(generation::worker::run(
        job_repository,
        ledger_repository,
        generation_client,
        Duration::from_secs(dotenvy_env.worker.poll_interval_secs),
    ));

    generation_loop.await??;

    Ok(())
}
