#[derive(Debug, Clone)]
pub struct DotEnvyConfig {
    pub database: Database,
    pub generation_api: GenerationApi,
    pub worker: Worker,
}

#[derive(Debug, Clone)]
pub struct Database {
    pub url: String,
}

#[derive(Debug, Clone)]
pub struct GenerationApi {
    pub base_url: String,
    pub api_key: String,
}

#[derive(Debug, Clone)]
pub struct Worker {
    pub poll_interval_secs: u64,
}
