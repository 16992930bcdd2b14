//! Startup health checks
//!
//! Confirms Ollama is reachable and that the configured embedding and
//! generation models are installed before any indexing or querying starts.

use crate::errors::Result;
use crate::models::OllamaClient;

/// Bootstrap check result
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum BootstrapStatus {
    Ready,
    OllamaNotRunning,
    ModelsNotAvailable(Vec<String>),
}

impl BootstrapStatus {
    pub fn is_ready(&self) -> bool {
        matches!(self, BootstrapStatus::Ready)
    }

    /// What the user should run to fix the problem
    pub fn hint(&self) -> Option<String> {
        match self {
            BootstrapStatus::Ready => None,
            BootstrapStatus::OllamaNotRunning => Some("Start Ollama with: ollama serve".to_string()),
            BootstrapStatus::ModelsNotAvailable(models) => Some(
                models
                    .iter()
                    .map(|m| format!("ollama pull {}", m))
                    .collect::<Vec<_>>()
                    .join("\n"),
            ),
        }
    }
}

/// Ollama detector
pub struct Bootstrap {
    client: OllamaClient,
    required_models: Vec<String>,
}

impl Bootstrap {
    pub fn new(client: OllamaClient, required_models: Vec<String>) -> Self {
        Self {
            client,
            required_models,
        }
    }

    /// Run complete bootstrap check
    pub async fn check(&self) -> Result<BootstrapStatus> {
        if !self.client.health_check().await {
            return Ok(BootstrapStatus::OllamaNotRunning);
        }

        let installed = self.client.list_models().await?;
        let missing = missing_models(&self.required_models, &installed);

        if missing.is_empty() {
            Ok(BootstrapStatus::Ready)
        } else {
            Ok(BootstrapStatus::ModelsNotAvailable(missing))
        }
    }

    pub fn required_models(&self) -> &[String] {
        &self.required_models
    }
}

/// An untagged name like `llama3.2` also matches `llama3.2:latest`
pub fn model_installed(required: &str, installed: &[String]) -> bool {
    installed.iter().any(|name| {
        name == required || (!required.contains(':') && *name == format!("{}:latest", required))
    })
}

fn missing_models(required: &[String], installed: &[String]) -> Vec<String> {
    required
        .iter()
        .filter(|m| !model_installed(m, installed))
        .cloned()
        .collect()
}
