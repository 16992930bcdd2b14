//! Application context
//!
//! Builds each long-lived component once from [`Config`] and hands them out
//! explicitly. Tests assemble the same pieces from stubs with
//! [`AppContext::from_parts`].

use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;

use crate::config::{Config, StoreBackend};
use crate::errors::Result;
use crate::memory::{LocalVectorStore, QdrantVectorStore, ReviewIndexer, VectorStore};
use crate::models::{Embedder, Generator, OllamaClient, OllamaEmbedder, OllamaGenerator};
use crate::rag::{PromptComposer, RagPipeline, Retriever};

pub struct AppContext {
    pub config: Config,
    pub embedder: Arc<dyn Embedder>,
    pub generator: Arc<dyn Generator>,
    pub store: Arc<dyn VectorStore>,
}

impl AppContext {
    /// Wire up Ollama models and the configured vector store
    pub fn from_config(config: Config) -> Result<Self> {
        let timeout = config.ollama.request_timeout_secs.map(Duration::from_secs);
        let client = OllamaClient::new(config.ollama_url(), timeout)?;

        let embedder: Arc<dyn Embedder> = Arc::new(OllamaEmbedder::new(
            client.clone(),
            config.ollama.embedding_model.clone(),
        ));
        let generator: Arc<dyn Generator> = Arc::new(OllamaGenerator::new(
            client,
            config.ollama.generation_model.clone(),
        ));

        let store: Arc<dyn VectorStore> = match config.index.backend {
            StoreBackend::Local => Arc::new(LocalVectorStore::open(
                &config.index.store_path,
                &config.index.collection,
            )?),
            StoreBackend::Qdrant => Arc::new(QdrantVectorStore::connect(
                &config.index.qdrant_url,
                &config.index.collection,
            )?),
        };

        Ok(Self::from_parts(config, embedder, generator, store))
    }

    pub fn from_parts(
        config: Config,
        embedder: Arc<dyn Embedder>,
        generator: Arc<dyn Generator>,
        store: Arc<dyn VectorStore>,
    ) -> Self {
        Self {
            config,
            embedder,
            generator,
            store,
        }
    }

    pub fn indexer(&self, show_progress: bool) -> ReviewIndexer {
        ReviewIndexer::new(
            self.embedder.clone(),
            self.store.clone(),
            self.config.index.store_path.clone(),
        )
        .with_batch_size(self.config.index.batch_size)
        .with_progress(show_progress)
    }

    pub fn pipeline(&self) -> Result<RagPipeline> {
        let retriever = Retriever::new(self.embedder.clone(), self.store.clone())
            .with_top_k(self.config.retrieval.top_k);
        let composer = PromptComposer::new(
            self.config.prompt.template.clone(),
            self.config.prompt.max_context_chars,
        )?;
        Ok(RagPipeline::new(retriever, composer, self.generator.clone()))
    }

    pub fn dataset_path(&self) -> PathBuf {
        self.config.index.dataset_path.clone()
    }
}
