use anyhow::{Ok, Result};

use super::config_model::DotEnvyConfig;

pub fn load() -> Result<DotEnvyConfig> {
    dotenvy::dotenv().ok();

    let database = super::config_model::Database {
        url: std::env::var("DATABASE_URL").expect("DATABASE_URL is invalid"),
    };

    let generation_api = super::config_model::GenerationApi {
        base_url: std::env::var("GENERATION_API_BASE_URL")
            .expect("GENERATION_API_BASE_URL is invalid"),
        api_key: std::env::var("GENERATION_API_KEY").expect("GENERATION_API_KEY is invalid"),
    };

    let worker = super::config_model::Worker {
        poll_interval_secs: std::env::var("WORKER_POLL_INTERVAL_SECS")
            .unwrap_or_else(|_| "5".to_string())
            .parse()?,
    };

    Ok(DotEnvyConfig {
        database,
        generation_api,
        worker,
    })
}
