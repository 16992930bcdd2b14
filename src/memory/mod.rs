//! Persistent semantic index of reviews
//!
//! Components:
//! - Vector DB: where embedded reviews live ([`vector_db`])
//! - Manifest: record of a completed build ([`manifest`])
//! - Indexer: one-time ingestion of the dataset ([`indexer`])

pub mod indexer;
pub mod manifest;
pub mod vector_db;

pub use indexer::{IndexReport, IndexStatus, ReviewIndexer};
pub use manifest::{IndexManifest, ManifestCheck};
pub use vector_db::{
    EmbeddedDocument, LocalVectorStore, QdrantVectorStore, QueryResult, ReviewMetadata,
    VectorStore,
};
