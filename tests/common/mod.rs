//! Shared stubs for integration tests
//!
//! Nothing here talks to Ollama: embeddings are keyword counts and answers
//! are canned, so every test runs offline and deterministically.

#![allow(dead_code)]

use async_trait::async_trait;
use std::fs;
use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;

use reviewbuddy::config::Config;
use reviewbuddy::memory::{LocalVectorStore, VectorStore};
use reviewbuddy::models::{Embedder, Generator};
use reviewbuddy::{AppContext, RagError, Result};

/// Terms the keyword embedder counts, one dimension each
pub const VOCABULARY: [&str; 8] = [
    "pasta",
    "service",
    "pizza",
    "slow",
    "price",
    "atmosphere",
    "vegan",
    "dessert",
];

/// Embeds text as lowercase keyword counts plus a constant bias dimension
pub struct KeywordEmbedder {
    model: String,
    pub calls: AtomicUsize,
}

impl KeywordEmbedder {
    pub fn new(model: &str) -> Self {
        Self {
            model: model.to_string(),
            calls: AtomicUsize::new(0),
        }
    }

    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }

    pub fn vector_for(text: &str) -> Vec<f32> {
        let lower = text.to_lowercase();
        let mut vector: Vec<f32> = VOCABULARY
            .iter()
            .map(|term| lower.matches(term).count() as f32)
            .collect();
        vector.push(0.1);
        vector
    }
}

#[async_trait]
impl Embedder for KeywordEmbedder {
    fn model_id(&self) -> &str {
        &self.model
    }

    async fn embed_batch(&self, texts: &[String]) -> Result<Vec<Vec<f32>>> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        Ok(texts.iter().map(|t| Self::vector_for(t)).collect())
    }
}

/// Returns a canned answer, or fails every call when `failing`
pub struct CannedGenerator {
    failing: bool,
    pub calls: AtomicUsize,
}

impl CannedGenerator {
    pub fn answering() -> Self {
        Self {
            failing: false,
            calls: AtomicUsize::new(0),
        }
    }

    pub fn failing() -> Self {
        Self {
            failing: true,
            calls: AtomicUsize::new(0),
        }
    }

    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl Generator for CannedGenerator {
    fn model_id(&self) -> &str {
        "canned"
    }

    async fn generate(&self, prompt: &str) -> Result<String> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        if self.failing {
            return Err(RagError::OllamaApiError("model not loaded".to_string()));
        }
        Ok(format!("Canned answer to a {} character prompt", prompt.chars().count()))
    }
}

/// Reviews used across tests; row 0 is the only one about pasta and service
pub const SAMPLE_ROWS: [(&str, &str, u8, &str); 6] = [
    ("Great Pasta", "The pasta was amazing and the service was quick", 5, "2024-01-05"),
    ("Pizza night", "Thin crust pizza with a smoky oven flavour", 4, "2024-02-11"),
    ("Too slow", "Waited an hour, slow kitchen and cold food", 2, "2024-03-02"),
    ("Fair price", "Good price for the portion sizes", 4, "2024-03-20"),
    ("Lovely atmosphere", "Candles, jazz and a warm atmosphere", 5, "2024-04-07"),
    ("Vegan options", "Plenty of vegan dishes and a great vegan dessert", 4, "2024-05-15"),
];

pub fn write_csv(path: &Path, rows: &[(&str, &str, u8, &str)]) {
    let mut csv = String::from("Title,Review,Rating,Date\n");
    for (title, review, rating, date) in rows {
        csv.push_str(&format!("\"{}\",\"{}\",{},{}\n", title, review, rating, date));
    }
    fs::write(path, csv).unwrap();
}

pub fn write_sample_dataset(dir: &Path) -> PathBuf {
    let path = dir.join("realistic_restaurant_reviews.csv");
    write_csv(&path, &SAMPLE_ROWS);
    path
}

/// Config pointing at a temp dataset and store
pub fn test_config(dir: &Path) -> Config {
    let mut config = Config::default();
    config.index.dataset_path = write_sample_dataset(dir);
    config.index.store_path = dir.join("db");
    config
}

/// Context wired from stubs over a local store
pub fn stub_context(
    config: Config,
    embedder: Arc<KeywordEmbedder>,
    generator: Arc<CannedGenerator>,
) -> AppContext {
    let store: Arc<dyn VectorStore> = Arc::new(
        LocalVectorStore::open(&config.index.store_path, &config.index.collection).unwrap(),
    );
    AppContext::from_parts(config, embedder, generator, store)
}
