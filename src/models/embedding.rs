//! Embedding models
//!
//! The same [`Embedder`] must be used at index time and query time; its
//! [`Embedder::model_id`] is stamped into the index manifest.

use async_trait::async_trait;

use crate::errors::{RagError, Result};
use crate::models::client::OllamaClient;

/// Turns text into fixed-length vectors
#[async_trait]
pub trait Embedder: Send + Sync {
    /// Identifier recorded in the index manifest
    fn model_id(&self) -> &str;

    /// Embed several texts; output order matches input order
    async fn embed_batch(&self, texts: &[String]) -> Result<Vec<Vec<f32>>>;

    /// Embed a single text
    async fn embed(&self, text: &str) -> Result<Vec<f32>> {
        let mut vectors = self.embed_batch(&[text.to_string()]).await?;
        vectors
            .pop()
            .ok_or_else(|| RagError::OllamaApiError("Empty embedding response".to_string()))
    }
}

/// Embeddings served by a local Ollama model (e.g. `mxbai-embed-large`)
pub struct OllamaEmbedder {
    client: OllamaClient,
    model: String,
}

impl OllamaEmbedder {
    pub fn new(client: OllamaClient, model: impl Into<String>) -> Self {
        Self {
            client,
            model: model.into(),
        }
    }
}

#[async_trait]
impl Embedder for OllamaEmbedder {
    fn model_id(&self) -> &str {
        &self.model
    }

    async fn embed_batch(&self, texts: &[String]) -> Result<Vec<Vec<f32>>> {
        self.client.embed(&self.model, texts).await
    }
}
