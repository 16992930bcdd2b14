//! Text generation models

use async_trait::async_trait;

use crate::errors::Result;
use crate::models::client::OllamaClient;

/// Produces an answer for a fully composed prompt
#[async_trait]
pub trait Generator: Send + Sync {
    fn model_id(&self) -> &str;

    async fn generate(&self, prompt: &str) -> Result<String>;
}

/// Generation via a local Ollama model (e.g. `llama3.2`)
pub struct OllamaGenerator {
    client: OllamaClient,
    model: String,
}

impl OllamaGenerator {
    pub fn new(client: OllamaClient, model: impl Into<String>) -> Self {
        Self {
            client,
            model: model.into(),
        }
    }
}

#[async_trait]
impl Generator for OllamaGenerator {
    fn model_id(&self) -> &str {
        &self.model
    }

    async fn generate(&self, prompt: &str) -> Result<String> {
        self.client.generate(&self.model, prompt).await
    }
}
