// Retriever: embed the question, ask the store for its nearest reviews
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use tracing::debug;

use crate::errors::{RagError, Result};
use crate::memory::vector_db::{QueryResult, VectorStore};
use crate::models::Embedder;

/// Reviews returned per question unless configured otherwise
pub const DEFAULT_TOP_K: usize = 5;

/// Retrieved review with metadata
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RetrievedReview {
    pub id: String,
    pub content: String,
    pub rating: f64,
    pub date: String,
    pub score: f32,
}

impl From<QueryResult> for RetrievedReview {
    fn from(result: QueryResult) -> Self {
        Self {
            id: result.id,
            content: result.document,
            rating: result.metadata.rating,
            date: result.metadata.date,
            score: result.score,
        }
    }
}

/// Similarity search over the review index
///
/// Must share its [`Embedder`] with the indexer that built the store.
pub struct Retriever {
    embedder: Arc<dyn Embedder>,
    store: Arc<dyn VectorStore>,
    top_k: usize,
}

impl Retriever {
    pub fn new(embedder: Arc<dyn Embedder>, store: Arc<dyn VectorStore>) -> Self {
        Self {
            embedder,
            store,
            top_k: DEFAULT_TOP_K,
        }
    }

    pub fn with_top_k(mut self, top_k: usize) -> Self {
        self.top_k = top_k.max(1);
        self
    }

    /// Top-k reviews for the query, nearest first
    pub async fn retrieve(&self, query: &str) -> Result<Vec<RetrievedReview>> {
        self.retrieve_k(query, self.top_k).await
    }

    /// Retrieve with an explicit `k`; returns `min(k, indexed)` reviews
    pub async fn retrieve_k(&self, query: &str, k: usize) -> Result<Vec<RetrievedReview>> {
        if query.trim().is_empty() {
            return Err(RagError::EmptyQuery);
        }

        let vector = self.embedder.embed(query).await?;
        let results = self.store.query(&vector, k).await?;
        debug!(k, returned = results.len(), "similarity search complete");

        Ok(results.into_iter().map(RetrievedReview::from).collect())
    }

    pub fn top_k(&self) -> usize {
        self.top_k
    }
}
