//! Vector storage for embedded reviews
//!
//! [`VectorStore`] is the seam between the indexer/retriever and whatever
//! holds the vectors. Two implementations ship:
//! - [`LocalVectorStore`]: JSON lines on disk, exhaustive cosine scoring
//! - [`QdrantVectorStore`]: a Qdrant server collection

pub mod local;
pub mod qdrant;

use async_trait::async_trait;
use serde::{Deserialize, Serialize};

use crate::errors::Result;

pub use local::LocalVectorStore;
pub use qdrant::QdrantVectorStore;

/// Metadata carried alongside each review vector
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ReviewMetadata {
    pub rating: f64,
    pub date: String,
}

/// A review as stored in the index
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EmbeddedDocument {
    /// Source row index as a string
    pub id: String,
    pub vector: Vec<f32>,
    pub text: String,
    pub metadata: ReviewMetadata,
}

/// Query result from vector search
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct QueryResult {
    pub id: String,
    pub score: f32,
    pub document: String,
    pub metadata: ReviewMetadata,
}

#[async_trait]
pub trait VectorStore: Send + Sync {
    /// Short backend name for reports
    fn backend(&self) -> &'static str;

    fn collection(&self) -> &str;

    /// Number of stored documents
    async fn count(&self) -> Result<u64>;

    /// Vector length of the stored documents; `None` while empty
    async fn dimension(&self) -> Result<Option<usize>>;

    /// Insert a batch; documents already inserted stay if a later batch fails
    async fn add_batch(&self, documents: Vec<EmbeddedDocument>) -> Result<()>;

    /// Up to `k` documents, most similar first
    async fn query(&self, vector: &[f32], k: usize) -> Result<Vec<QueryResult>>;

    /// Remove every document from the collection
    async fn clear(&self) -> Result<()>;
}

/// Cosine similarity; zero-length vectors score 0
pub fn cosine_similarity(a: &[f32], b: &[f32]) -> f32 {
    let dot: f32 = a.iter().zip(b.iter()).map(|(x, y)| x * y).sum();
    let norm_a: f32 = a.iter().map(|x| x * x).sum::<f32>().sqrt();
    let norm_b: f32 = b.iter().map(|x| x * x).sum::<f32>().sqrt();
    if norm_a == 0.0 || norm_b == 0.0 {
        0.0
    } else {
        dot / (norm_a * norm_b)
    }
}
