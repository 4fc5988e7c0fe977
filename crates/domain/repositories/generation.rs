use anyhow::Result;
use async_trait::async_trait;
use mockall::automock;
use serde_json::Value;

use crate::domain::value_objects::{
    enums::generation_kinds::GenerationKind, generation::GenerationOutput,
};

/// External generation collaborator (AI provider). The payload is opaque to
/// this core and passed through unchanged.
#[async_trait]
#[automock]
pub trait GenerationClient {
    async fn generate(&self, kind: GenerationKind, payload: Value) -> Result<GenerationOutput>;
}
