//! Ollama API client
//!
//! Thin reqwest wrapper over the three endpoints the pipeline needs:
//! - `POST /api/embed` for embeddings
//! - `POST /api/generate` (non-streaming) for answers
//! - `GET /api/tags` for installed models

use crate::errors::{RagError, Result};
use reqwest::Client;
use serde::{Deserialize, Serialize};
use std::time::Duration;

/// HTTP client for Ollama API
#[derive(Debug, Clone)]
pub struct OllamaClient {
    client: Client,
    base_url: String,
}

impl OllamaClient {
    /// Create a client; `timeout` of `None` lets requests block indefinitely
    pub fn new(base_url: &str, timeout: Option<Duration>) -> Result<Self> {
        let mut builder = Client::builder();
        if let Some(timeout) = timeout {
            builder = builder.timeout(timeout);
        }
        let client = builder.build().map_err(RagError::HttpError)?;

        Ok(Self {
            client,
            base_url: base_url.trim_end_matches('/').to_string(),
        })
    }

    /// Embed a batch of texts with the named model, preserving input order
    pub async fn embed(&self, model: &str, input: &[String]) -> Result<Vec<Vec<f32>>> {
        if input.is_empty() {
            return Ok(Vec::new());
        }

        let url = format!("{}/api/embed", self.base_url);
        let request = EmbedRequest { model, input };

        let response = self
            .client
            .post(&url)
            .json(&request)
            .send()
            .await
            .map_err(|e| RagError::OllamaApiError(format!("Failed to send embed request: {}", e)))?;

        let response = Self::check_status(response).await?;

        let body: EmbedResponse = response
            .json()
            .await
            .map_err(|e| RagError::OllamaApiError(format!("Failed to parse embeddings: {}", e)))?;

        if body.embeddings.len() != input.len() {
            return Err(RagError::OllamaApiError(format!(
                "Expected {} embeddings, got {}",
                input.len(),
                body.embeddings.len()
            )));
        }

        Ok(body.embeddings)
    }

    /// Single blocking generation call; no streaming, no retries
    pub async fn generate(&self, model: &str, prompt: &str) -> Result<String> {
        let url = format!("{}/api/generate", self.base_url);
        let request = GenerateRequest {
            model,
            prompt,
            stream: false,
        };

        let response = self
            .client
            .post(&url)
            .json(&request)
            .send()
            .await
            .map_err(|e| RagError::OllamaApiError(format!("Failed to send request: {}", e)))?;

        let response = Self::check_status(response).await?;

        let body: GenerateResponse = response
            .json()
            .await
            .map_err(|e| RagError::OllamaApiError(format!("Failed to parse response: {}", e)))?;

        Ok(body.response)
    }

    /// Check if Ollama is reachable
    pub async fn health_check(&self) -> bool {
        let url = format!("{}/api/tags", self.base_url);

        match self.client.get(&url).timeout(Duration::from_secs(5)).send().await {
            Ok(response) => response.status().is_success(),
            Err(_) => false,
        }
    }

    /// List installed model names
    pub async fn list_models(&self) -> Result<Vec<String>> {
        let url = format!("{}/api/tags", self.base_url);

        let response = self
            .client
            .get(&url)
            .send()
            .await
            .map_err(|e| RagError::OllamaApiError(format!("Failed to list models: {}", e)))?;

        let response = Self::check_status(response).await?;

        let tags: TagsResponse = response
            .json()
            .await
            .map_err(|e| RagError::OllamaApiError(format!("Failed to parse models: {}", e)))?;

        Ok(tags.models.into_iter().map(|m| m.name).collect())
    }

    /// Get base URL
    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    async fn check_status(response: reqwest::Response) -> Result<reqwest::Response> {
        if response.status().is_success() {
            return Ok(response);
        }

        let status = response.status();
        let error_text = response
            .text()
            .await
            .unwrap_or_else(|_| "Unknown error".to_string());
        Err(RagError::OllamaApiError(format!("HTTP {}: {}", status, error_text)))
    }
}

#[derive(Debug, Serialize)]
struct EmbedRequest<'a> {
    model: &'a str,
    input: &'a [String],
}

#[derive(Debug, Deserialize)]
struct EmbedResponse {
    embeddings: Vec<Vec<f32>>,
}

#[derive(Debug, Serialize)]
struct GenerateRequest<'a> {
    model: &'a str,
    prompt: &'a str,
    stream: bool,
}

#[derive(Debug, Deserialize)]
struct GenerateResponse {
    response: String,
}

#[derive(Debug, Deserialize)]
struct TagsResponse {
    models: Vec<ModelInfo>,
}

#[derive(Debug, Deserialize)]
struct ModelInfo {
    name: String,
}
