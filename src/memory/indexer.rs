//! Review indexer
//!
//! Turns the review dataset into embedded documents exactly once per dataset
//! snapshot. On later runs the manifest is checked and the existing store is
//! reopened without touching it.

use chrono::Utc;
use indicatif::{ProgressBar, ProgressStyle};
use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::time::Instant;
use tracing::{info, warn};

use crate::corpus::{dataset_checksum, load_reviews, ReviewRecord};
use crate::errors::{RagError, Result};
use crate::memory::manifest::{IndexManifest, ManifestCheck};
use crate::memory::vector_db::{EmbeddedDocument, ReviewMetadata, VectorStore};
use crate::models::Embedder;

/// Rows embedded and inserted per request
pub const DEFAULT_BATCH_SIZE: usize = 50;

/// What `initialize` did
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum IndexStatus {
    /// Fresh build into an empty store
    Built,
    /// Existing index matched the manifest; nothing ingested
    Reopened,
    /// Existing contents were discarded and rebuilt
    Rebuilt { reason: String },
}

#[derive(Debug, Clone, PartialEq)]
pub struct IndexReport {
    pub status: IndexStatus,
    pub document_count: u64,
    pub dimension: usize,
    pub elapsed_ms: f64,
}

impl IndexReport {
    pub fn ingested(&self) -> bool {
        !matches!(self.status, IndexStatus::Reopened)
    }
}

pub struct ReviewIndexer {
    embedder: Arc<dyn Embedder>,
    store: Arc<dyn VectorStore>,
    store_dir: PathBuf,
    batch_size: usize,
    show_progress: bool,
}

impl ReviewIndexer {
    pub fn new(
        embedder: Arc<dyn Embedder>,
        store: Arc<dyn VectorStore>,
        store_dir: impl Into<PathBuf>,
    ) -> Self {
        Self {
            embedder,
            store,
            store_dir: store_dir.into(),
            batch_size: DEFAULT_BATCH_SIZE,
            show_progress: false,
        }
    }

    pub fn with_batch_size(mut self, batch_size: usize) -> Self {
        self.batch_size = batch_size.max(1);
        self
    }

    /// Draw a progress bar on stderr while ingesting
    pub fn with_progress(mut self, show_progress: bool) -> Self {
        self.show_progress = show_progress;
        self
    }

    /// Build the index if needed, otherwise reopen it
    pub async fn initialize(&self, dataset_path: &Path) -> Result<IndexReport> {
        self.initialize_with(dataset_path, false).await
    }

    /// Like [`initialize`](Self::initialize); `force_rebuild` discards any existing index
    pub async fn initialize_with(
        &self,
        dataset_path: &Path,
        force_rebuild: bool,
    ) -> Result<IndexReport> {
        let start = Instant::now();
        let records = load_reviews(dataset_path)?;
        let checksum = dataset_checksum(dataset_path)?;
        let stored = self.store.count().await?;
        let stored_dimension = self.store.dimension().await?;

        let status = match IndexManifest::load(&self.store_dir)? {
            _ if force_rebuild => IndexStatus::Rebuilt {
                reason: "rebuild requested".to_string(),
            },
            Some(manifest) => match manifest.check(
                self.embedder.model_id(),
                self.store.collection(),
                &checksum,
                stored,
                stored_dimension,
            ) {
                ManifestCheck::Current => {
                    info!(
                        documents = stored,
                        collection = self.store.collection(),
                        "loaded existing vector store"
                    );
                    return Ok(IndexReport {
                        status: IndexStatus::Reopened,
                        document_count: stored,
                        dimension: manifest.dimension,
                        elapsed_ms: start.elapsed().as_secs_f64() * 1000.0,
                    });
                }
                ManifestCheck::ModelMismatch { found } => {
                    return Err(RagError::EmbeddingModelMismatch {
                        expected: self.embedder.model_id().to_string(),
                        found,
                    });
                }
                ManifestCheck::Stale { reason } => {
                    warn!(%reason, "index is stale, rebuilding");
                    IndexStatus::Rebuilt { reason }
                }
            },
            None if stored > 0 => {
                warn!(documents = stored, "store has documents but no manifest, rebuilding");
                IndexStatus::Rebuilt {
                    reason: "previous build did not complete".to_string(),
                }
            }
            None => IndexStatus::Built,
        };

        if stored > 0 || matches!(status, IndexStatus::Rebuilt { .. }) {
            IndexManifest::remove(&self.store_dir)?;
            self.store.clear().await?;
        }

        let dimension = self.ingest(&records).await?;
        let document_count = self.store.count().await?;

        IndexManifest {
            collection: self.store.collection().to_string(),
            embedding_model: self.embedder.model_id().to_string(),
            dimension,
            document_count,
            dataset_checksum: checksum,
            created_at: Utc::now(),
        }
        .save(&self.store_dir)?;

        info!(documents = document_count, "vector store created successfully");

        Ok(IndexReport {
            status,
            document_count,
            dimension,
            elapsed_ms: start.elapsed().as_secs_f64() * 1000.0,
        })
    }

    /// Embed and insert all records in batches; returns the vector dimension
    async fn ingest(&self, records: &[ReviewRecord]) -> Result<usize> {
        let total = records.len();
        info!(documents = total, batch_size = self.batch_size, "adding documents to vector store");

        let progress = if self.show_progress {
            let pb = ProgressBar::new(total as u64);
            if let Ok(style) = ProgressStyle::default_bar()
                .template("{spinner:.cyan} Indexing [{bar:40.cyan/blue}] {pos}/{len} reviews")
            {
                pb.set_style(style.progress_chars("=>-"));
            }
            pb
        } else {
            ProgressBar::hidden()
        };

        let mut dimension = 0;
        for (batch_index, chunk) in records.chunks(self.batch_size).enumerate() {
            let offset = batch_index * self.batch_size;
            let texts: Vec<String> = chunk.iter().map(|r| r.document_text()).collect();
            let vectors = self.embedder.embed_batch(&texts).await?;

            if vectors.len() != chunk.len() {
                return Err(RagError::OllamaApiError(format!(
                    "Expected {} embeddings, got {}",
                    chunk.len(),
                    vectors.len()
                )));
            }

            let documents: Vec<EmbeddedDocument> = chunk
                .iter()
                .zip(texts)
                .zip(vectors)
                .enumerate()
                .map(|(i, ((record, text), vector))| EmbeddedDocument {
                    id: (offset + i).to_string(),
                    vector,
                    text,
                    metadata: ReviewMetadata {
                        rating: record.rating,
                        date: record.date.clone(),
                    },
                })
                .collect();

            if let Some(first) = documents.first() {
                dimension = first.vector.len();
            }

            self.store.add_batch(documents).await?;

            let added = (offset + chunk.len()).min(total);
            progress.set_position(added as u64);
            info!("added {}/{}", added, total);
        }

        progress.finish_and_clear();
        Ok(dimension)
    }

    pub fn store_dir(&self) -> &Path {
        &self.store_dir
    }
}
