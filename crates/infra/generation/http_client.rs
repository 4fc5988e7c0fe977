use anyhow::Result;
use async_trait::async_trait;
use reqwest::header::AUTHORIZATION;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use tracing::error;

use crate::domain::{
    repositories::generation::GenerationClient,
    value_objects::{enums::generation_kinds::GenerationKind, generation::GenerationOutput},
};

/// HTTP client for the external generation service. The request/response
/// bodies are opaque to this core beyond the result reference.
pub struct HttpGenerationClient {
    http: reqwest::Client,
    base_url: String,
    api_key: String,
}

#[derive(Debug, Serialize)]
struct GenerateRequest {
    kind: String,
    payload: Value,
}

#[derive(Debug, Deserialize)]
struct GenerateResponse {
    result_ref: String,
}

impl HttpGenerationClient {
    pub fn new(base_url: String, api_key: String) -> Self {
        Self {
            http: reqwest::Client::new(),
            base_url,
            api_key,
        }
    }

    async fn ensure_success(resp: reqwest::Response, context: &str) -> Result<reqwest::Response> {
        if resp.status().is_success() {
            return Ok(resp);
        }

        let status = resp.status();
        let body = match resp.text().await {
            Ok(text) if !text.is_empty() => text,
            Ok(_) => "<empty response body>".to_string(),
            Err(err) => format!("<failed to read response body: {err}>"),
        };

        error!(
            status = %status,
            response_body = %body,
            context = %context,
            "generation api request failed"
        );

        anyhow::bail!(
            "generation API request failed: {} (status {})",
            context,
            status
        );
    }
}

#[async_trait]
impl GenerationClient for HttpGenerationClient {
    async fn generate(&self, kind: GenerationKind, payload: Value) -> Result<GenerationOutput> {
        let body = GenerateRequest {
            kind: kind.to_string(),
            payload,
        };

        let resp = self
            .http
            .post(format!("{}/v1/generate", self.base_url))
            .header(AUTHORIZATION, format!("Bearer {}", self.api_key))
            .json(&body)
            .send()
            .await?;
        let resp = Self::ensure_success(resp, "generate").await?;

        let parsed: GenerateResponse = resp.json().await?;
        Ok(GenerationOutput {
            result_ref: parsed.result_ref,
        })
    }
}
