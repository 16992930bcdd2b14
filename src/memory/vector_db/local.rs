//! File-backed vector store
//!
//! Documents live in `<store_dir>/<collection>.jsonl`, one JSON object per
//! line, and are held in memory for scoring. Each batch is appended and
//! flushed before it becomes visible, so an interrupted build leaves the
//! earlier batches on disk. A line torn by an interrupted write is skipped
//! on open; the indexer then sees a partial store and rebuilds it.

use async_trait::async_trait;
use std::cmp::Ordering;
use std::fs::{self, File, OpenOptions};
use std::io::{BufRead, BufReader, Write};
use std::path::{Path, PathBuf};
use tokio::sync::RwLock;
use tracing::{debug, warn};

use crate::errors::{RagError, Result};
use crate::memory::vector_db::{
    cosine_similarity, EmbeddedDocument, QueryResult, VectorStore,
};

pub struct LocalVectorStore {
    collection: String,
    file_path: PathBuf,
    documents: RwLock<Vec<EmbeddedDocument>>,
}

impl LocalVectorStore {
    /// Open (or create) the collection file inside `store_dir`
    pub fn open(store_dir: &Path, collection: &str) -> Result<Self> {
        fs::create_dir_all(store_dir)?;
        let file_path = store_dir.join(format!("{}.jsonl", collection));

        let documents = if file_path.exists() {
            Self::read_documents(&file_path)?
        } else {
            Vec::new()
        };

        debug!(
            collection,
            documents = documents.len(),
            path = %file_path.display(),
            "opened local vector store"
        );

        Ok(Self {
            collection: collection.to_string(),
            file_path,
            documents: RwLock::new(documents),
        })
    }

    fn read_documents(path: &Path) -> Result<Vec<EmbeddedDocument>> {
        let reader = BufReader::new(File::open(path)?);
        let mut documents = Vec::new();

        for (number, line) in reader.lines().enumerate() {
            let line = line?;
            if line.trim().is_empty() {
                continue;
            }
            match serde_json::from_str(&line) {
                Ok(document) => documents.push(document),
                Err(e) => warn!(
                    path = %path.display(),
                    line = number + 1,
                    error = %e,
                    "skipping unreadable document"
                ),
            }
        }

        Ok(documents)
    }

    /// Path of the backing JSON lines file
    pub fn file_path(&self) -> &Path {
        &self.file_path
    }
}

#[async_trait]
impl VectorStore for LocalVectorStore {
    fn backend(&self) -> &'static str {
        "local"
    }

    fn collection(&self) -> &str {
        &self.collection
    }

    async fn count(&self) -> Result<u64> {
        Ok(self.documents.read().await.len() as u64)
    }

    async fn dimension(&self) -> Result<Option<usize>> {
        Ok(self.documents.read().await.first().map(|d| d.vector.len()))
    }

    async fn add_batch(&self, batch: Vec<EmbeddedDocument>) -> Result<()> {
        if batch.is_empty() {
            return Ok(());
        }

        let mut documents = self.documents.write().await;

        let expected = documents
            .first()
            .map(|d| d.vector.len())
            .unwrap_or_else(|| batch[0].vector.len());
        if let Some(bad) = batch.iter().find(|d| d.vector.len() != expected) {
            return Err(RagError::DimensionMismatch {
                expected,
                actual: bad.vector.len(),
            });
        }

        let mut buffer = String::new();
        for document in &batch {
            buffer.push_str(&serde_json::to_string(document)?);
            buffer.push('\n');
        }

        let mut file = OpenOptions::new()
            .create(true)
            .append(true)
            .open(&self.file_path)?;
        file.write_all(buffer.as_bytes())?;
        file.flush()?;

        documents.extend(batch);
        Ok(())
    }

    async fn query(&self, vector: &[f32], k: usize) -> Result<Vec<QueryResult>> {
        let documents = self.documents.read().await;

        if let Some(first) = documents.first() {
            if first.vector.len() != vector.len() {
                return Err(RagError::DimensionMismatch {
                    expected: first.vector.len(),
                    actual: vector.len(),
                });
            }
        }

        let mut scored: Vec<(usize, f32)> = documents
            .iter()
            .enumerate()
            .map(|(idx, doc)| (idx, cosine_similarity(vector, &doc.vector)))
            .collect();

        // Stable sort: equal scores keep insertion order
        scored.sort_by(|a, b| b.1.partial_cmp(&a.1).unwrap_or(Ordering::Equal));
        scored.truncate(k);

        Ok(scored
            .into_iter()
            .map(|(idx, score)| {
                let doc = &documents[idx];
                QueryResult {
                    id: doc.id.clone(),
                    score,
                    document: doc.text.clone(),
                    metadata: doc.metadata.clone(),
                }
            })
            .collect())
    }

    async fn clear(&self) -> Result<()> {
        let mut documents = self.documents.write().await;
        File::create(&self.file_path)?;
        documents.clear();
        Ok(())
    }
}
