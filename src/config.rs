use anyhow::{bail, Context, Result};
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};

use crate::rag::context::{DEFAULT_MAX_CONTEXT_CHARS, DEFAULT_TEMPLATE};

/// Default Ollama API endpoint
pub const DEFAULT_OLLAMA_URL: &str = "http://127.0.0.1:11434";

/// Config file looked up in the working directory before the home directory
pub const LOCAL_CONFIG_FILE: &str = "reviewbuddy.toml";

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Config {
    #[serde(default)]
    pub ollama: OllamaConfig,
    #[serde(default)]
    pub index: IndexConfig,
    #[serde(default)]
    pub retrieval: RetrievalConfig,
    #[serde(default)]
    pub prompt: PromptConfig,
    #[serde(default)]
    pub bench: BenchConfig,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct OllamaConfig {
    pub url: String,
    pub embedding_model: String,
    pub generation_model: String,
    /// Unset means requests may block indefinitely
    pub request_timeout_secs: Option<u64>,
}

impl Default for OllamaConfig {
    fn default() -> Self {
        Self {
            url: DEFAULT_OLLAMA_URL.to_string(),
            embedding_model: "mxbai-embed-large".to_string(),
            generation_model: "llama3.2".to_string(),
            request_timeout_secs: None,
        }
    }
}

/// Which vector store implementation backs the index
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum StoreBackend {
    /// Flat file inside the store directory
    Local,
    /// Remote Qdrant server; the store directory only holds the manifest
    Qdrant,
}

impl StoreBackend {
    pub fn as_str(&self) -> &'static str {
        match self {
            StoreBackend::Local => "local",
            StoreBackend::Qdrant => "qdrant",
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct IndexConfig {
    pub dataset_path: PathBuf,
    pub store_path: PathBuf,
    pub collection: String,
    pub batch_size: usize,
    pub backend: StoreBackend,
    pub qdrant_url: String,
}

impl Default for IndexConfig {
    fn default() -> Self {
        Self {
            dataset_path: PathBuf::from("realistic_restaurant_reviews.csv"),
            store_path: PathBuf::from("reviewbuddy_db"),
            collection: "restaurant_reviews".to_string(),
            batch_size: 50,
            backend: StoreBackend::Local,
            qdrant_url: "http://localhost:6334".to_string(),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct RetrievalConfig {
    pub top_k: usize,
}

impl Default for RetrievalConfig {
    fn default() -> Self {
        Self { top_k: 5 }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct PromptConfig {
    /// Must contain `{reviews}` and `{question}`
    pub template: String,
    pub max_context_chars: usize,
}

impl Default for PromptConfig {
    fn default() -> Self {
        Self {
            template: DEFAULT_TEMPLATE.to_string(),
            max_context_chars: DEFAULT_MAX_CONTEXT_CHARS,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct BenchConfig {
    pub report_path: PathBuf,
    pub queries: Vec<String>,
}

impl Default for BenchConfig {
    fn default() -> Self {
        Self {
            report_path: PathBuf::from("BENCHMARKS.md"),
            queries: crate::bench::DEFAULT_QUERIES
                .iter()
                .map(|q| q.to_string())
                .collect(),
        }
    }
}

impl Config {
    /// Load configuration, falling back to built-in defaults
    ///
    /// An explicit path must exist. Otherwise `./reviewbuddy.toml` is tried,
    /// then `~/.reviewbuddy/config.toml`.
    pub fn load(explicit: Option<&Path>) -> Result<Self> {
        if let Some(path) = explicit {
            return Self::load_from(path);
        }

        let local = PathBuf::from(LOCAL_CONFIG_FILE);
        if local.exists() {
            return Self::load_from(&local);
        }

        if let Some(home) = Self::home_config_path() {
            if home.exists() {
                return Self::load_from(&home);
            }
        }

        Ok(Config::default())
    }

    /// Load and validate a specific file
    pub fn load_from(path: &Path) -> Result<Self> {
        let contents = fs::read_to_string(path)
            .with_context(|| format!("Failed to read config file {}", path.display()))?;

        let config: Config = toml::from_str(&contents)
            .with_context(|| format!("Failed to parse config file {}", path.display()))?;

        config.validate()?;
        Ok(config)
    }

    /// Save configuration to file
    pub fn save(&self, path: &Path) -> Result<()> {
        if let Some(parent) = path.parent() {
            if !parent.as_os_str().is_empty() {
                fs::create_dir_all(parent).context("Failed to create config directory")?;
            }
        }

        let toml_string = toml::to_string_pretty(self).context("Failed to serialize config")?;
        fs::write(path, toml_string).context("Failed to write config file")?;

        Ok(())
    }

    /// `~/.reviewbuddy/config.toml`, if a home directory is known
    pub fn home_config_path() -> Option<PathBuf> {
        dirs::home_dir().map(|home| home.join(".reviewbuddy").join("config.toml"))
    }

    pub fn validate(&self) -> Result<()> {
        if self.retrieval.top_k == 0 {
            bail!("retrieval.top_k must be at least 1");
        }
        if self.index.batch_size == 0 {
            bail!("index.batch_size must be at least 1");
        }
        if self.index.collection.trim().is_empty() {
            bail!("index.collection must not be empty");
        }
        for placeholder in ["{reviews}", "{question}"] {
            if !self.prompt.template.contains(placeholder) {
                bail!("prompt.template must contain {}", placeholder);
            }
        }
        Ok(())
    }

    /// Base URL without a trailing slash
    pub fn ollama_url(&self) -> &str {
        self.ollama.url.trim_end_matches('/')
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn test_config_default() {
        let config = Config::default();
        assert_eq!(config.ollama.embedding_model, "mxbai-embed-large");
        assert_eq!(config.ollama.generation_model, "llama3.2");
        assert_eq!(config.retrieval.top_k, 5);
        assert_eq!(config.index.batch_size, 50);
        assert_eq!(config.index.backend, StoreBackend::Local);
        assert_eq!(config.bench.queries.len(), 5);
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_partial_file_keeps_defaults() {
        let toml_string = r#"
            [ollama]
            generation_model = "qwen2.5:7b-instruct"

            [index]
            backend = "qdrant"
        "#;

        let config: Config = toml::from_str(toml_string).unwrap();
        assert_eq!(config.ollama.generation_model, "qwen2.5:7b-instruct");
        assert_eq!(config.ollama.embedding_model, "mxbai-embed-large");
        assert_eq!(config.index.backend, StoreBackend::Qdrant);
        assert_eq!(config.index.collection, "restaurant_reviews");
    }

    #[test]
    fn test_validate_rejects_template_without_placeholders() {
        let mut config = Config::default();
        config.prompt.template = "Answer this: {question}".to_string();
        let err = config.validate().unwrap_err();
        assert!(err.to_string().contains("{reviews}"));
    }

    #[test]
    fn test_validate_rejects_zero_top_k() {
        let mut config = Config::default();
        config.retrieval.top_k = 0;
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_save_and_load() {
        let temp_dir = TempDir::new().unwrap();
        let path = temp_dir.path().join("nested").join("reviewbuddy.toml");

        let mut config = Config::default();
        config.retrieval.top_k = 3;
        config.ollama.request_timeout_secs = Some(90);
        config.save(&path).unwrap();

        let loaded = Config::load(Some(&path)).unwrap();
        assert_eq!(loaded.retrieval.top_k, 3);
        assert_eq!(loaded.ollama.request_timeout_secs, Some(90));
        assert_eq!(loaded.prompt.template, config.prompt.template);
    }

    #[test]
    fn test_load_missing_explicit_path_fails() {
        let temp_dir = TempDir::new().unwrap();
        let result = Config::load(Some(&temp_dir.path().join("missing.toml")));
        assert!(result.is_err());
    }

    #[test]
    fn test_ollama_url_trims_slash() {
        let mut config = Config::default();
        config.ollama.url = "http://localhost:11434/".to_string();
        assert_eq!(config.ollama_url(), "http://localhost:11434");
    }
}
