// Qdrant-backed review collection
//
// Uses the long-standing `QdrantClient` API; it is deprecated upstream in
// favour of the builder-based `Qdrant` client.
#![allow(deprecated)]

use async_trait::async_trait;
use qdrant_client::{
    client::QdrantClient,
    qdrant::{
        point_id::PointIdOptions, value::Kind, vectors_config::Config, with_payload_selector::SelectorOptions,
        CreateCollection, Distance, PointId, PointStruct, SearchPoints, Value as QdrantValue,
        VectorParams, VectorsConfig, WithPayloadSelector,
    },
};
use std::collections::HashMap;
use tracing::info;

use crate::errors::{RagError, Result};
use crate::memory::vector_db::{EmbeddedDocument, QueryResult, ReviewMetadata, VectorStore};

const DOCUMENT_KEY: &str = "document";
const RATING_KEY: &str = "rating";
const DATE_KEY: &str = "date";

/// Vector store living in a Qdrant collection
pub struct QdrantVectorStore {
    client: QdrantClient,
    collection: String,
}

impl QdrantVectorStore {
    /// Connect to a Qdrant server; the collection is created on first insert
    pub fn connect(url: &str, collection: &str) -> Result<Self> {
        let client = QdrantClient::from_url(url)
            .build()
            .map_err(|e| store_error("Failed to create Qdrant client", e))?;

        Ok(Self {
            client,
            collection: collection.to_string(),
        })
    }

    async fn exists(&self) -> Result<bool> {
        self.client
            .has_collection(&self.collection)
            .await
            .map_err(|e| store_error("Failed to check collection", e))
    }

    /// Create the collection with cosine distance if it is missing
    async fn ensure_collection(&self, dimension: usize) -> Result<()> {
        if self.exists().await? {
            return Ok(());
        }

        info!(collection = %self.collection, dimension, "creating Qdrant collection");
        self.client
            .create_collection(&CreateCollection {
                collection_name: self.collection.clone(),
                vectors_config: Some(VectorsConfig {
                    config: Some(Config::Params(VectorParams {
                        size: dimension as u64,
                        distance: Distance::Cosine.into(),
                        ..Default::default()
                    })),
                }),
                ..Default::default()
            })
            .await
            .map_err(|e| store_error("Failed to create collection", e))?;

        Ok(())
    }
}

#[async_trait]
impl VectorStore for QdrantVectorStore {
    fn backend(&self) -> &'static str {
        "qdrant"
    }

    fn collection(&self) -> &str {
        &self.collection
    }

    async fn count(&self) -> Result<u64> {
        if !self.exists().await? {
            return Ok(0);
        }

        let info = self
            .client
            .collection_info(&self.collection)
            .await
            .map_err(|e| store_error("Failed to get collection info", e))?;

        Ok(info.result.and_then(|r| r.points_count).unwrap_or(0))
    }

    async fn dimension(&self) -> Result<Option<usize>> {
        if !self.exists().await? {
            return Ok(None);
        }

        let info = self
            .client
            .collection_info(&self.collection)
            .await
            .map_err(|e| store_error("Failed to get collection info", e))?;

        let size = info
            .result
            .and_then(|r| r.config)
            .and_then(|c| c.params)
            .and_then(|p| p.vectors_config)
            .and_then(|v| v.config)
            .and_then(|config| match config {
                Config::Params(params) => Some(params.size as usize),
                _ => None,
            });
        Ok(size)
    }

    async fn add_batch(&self, documents: Vec<EmbeddedDocument>) -> Result<()> {
        let Some(first) = documents.first() else {
            return Ok(());
        };
        self.ensure_collection(first.vector.len()).await?;

        let mut points = Vec::with_capacity(documents.len());
        for document in documents {
            // Qdrant ids must be unsigned integers or UUIDs; row indices are integers
            let id: u64 = document.id.parse().map_err(|_| {
                RagError::VectorStoreError(format!("Non-numeric document id: {}", document.id))
            })?;

            let mut payload: HashMap<String, QdrantValue> = HashMap::new();
            payload.insert(DOCUMENT_KEY.to_string(), QdrantValue::from(document.text));
            payload.insert(RATING_KEY.to_string(), QdrantValue::from(document.metadata.rating));
            payload.insert(DATE_KEY.to_string(), QdrantValue::from(document.metadata.date));

            points.push(PointStruct::new(id, document.vector, payload));
        }

        self.client
            .upsert_points_blocking(&self.collection, None, points, None)
            .await
            .map_err(|e| store_error("Failed to batch upsert points", e))?;

        Ok(())
    }

    async fn query(&self, vector: &[f32], k: usize) -> Result<Vec<QueryResult>> {
        if !self.exists().await? {
            return Ok(Vec::new());
        }

        let search_result = self
            .client
            .search_points(&SearchPoints {
                collection_name: self.collection.clone(),
                vector: vector.to_vec(),
                limit: k as u64,
                with_payload: Some(WithPayloadSelector {
                    selector_options: Some(SelectorOptions::Enable(true)),
                }),
                ..Default::default()
            })
            .await
            .map_err(|e| store_error("Failed to search points", e))?;

        Ok(search_result
            .result
            .into_iter()
            .map(|point| {
                let payload = point.payload;
                QueryResult {
                    id: point_id_to_string(&point.id),
                    score: point.score,
                    document: payload
                        .get(DOCUMENT_KEY)
                        .and_then(value_as_string)
                        .unwrap_or_default(),
                    metadata: ReviewMetadata {
                        rating: payload.get(RATING_KEY).and_then(value_as_f64).unwrap_or(0.0),
                        date: payload.get(DATE_KEY).and_then(value_as_string).unwrap_or_default(),
                    },
                }
            })
            .collect())
    }

    async fn clear(&self) -> Result<()> {
        if self.exists().await? {
            self.client
                .delete_collection(&self.collection)
                .await
                .map_err(|e| store_error("Failed to delete collection", e))?;
        }
        Ok(())
    }
}

fn store_error(action: &str, err: impl std::fmt::Display) -> RagError {
    RagError::VectorStoreError(format!("{}: {}", action, err))
}

fn value_as_string(value: &QdrantValue) -> Option<String> {
    match value.kind.as_ref()? {
        Kind::StringValue(s) => Some(s.clone()),
        _ => None,
    }
}

fn value_as_f64(value: &QdrantValue) -> Option<f64> {
    match value.kind.as_ref()? {
        Kind::DoubleValue(f) => Some(*f),
        Kind::IntegerValue(i) => Some(*i as f64),
        _ => None,
    }
}

fn point_id_to_string(point_id: &Option<PointId>) -> String {
    point_id
        .as_ref()
        .and_then(|id| id.point_id_options.as_ref())
        .map(|options| match options {
            PointIdOptions::Num(n) => n.to_string(),
            PointIdOptions::Uuid(u) => u.clone(),
        })
        .unwrap_or_else(|| "unknown".to_string())
}
